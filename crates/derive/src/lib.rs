//! # Pathmodel Derive
//!
//! Induces a routing schema from paths that already exist, so a messy data
//! lake can be described by the same decision trees the router walks.
//!
//! ## Pipeline
//!
//! ```text
//! paths ──> PathFeatures (positional key=value pairs, literals, depths)
//!             │
//!             ├─> FeatureSpace ──> Array2 (key presence │ literal presence │ depth)
//!             │                      │
//!             │                      └─> WardLinkage ──(unavailable)──> ValueBuckets
//!             │
//!             └─> per-group build_group_schema ──> merge (largest group is the base)
//!                                                   │
//!                                                   └─> DerivedSchema { _structure, _stats }
//! ```
//!
//! Derivation never fails: unparseable segments are literals and grouping
//! degrades to value buckets when clustering cannot run.
//!
//! ## Example
//!
//! ```rust
//! use pathmodel_derive::derive_schema;
//!
//! let derived = derive_schema(
//!     &[
//!         "data/region=us-east/sensor=lidar/0.parquet",
//!         "data/region=us-west/sensor=thermal/1.parquet",
//!     ],
//!     5,
//! );
//! assert_eq!(derived.stats().path_count, 2);
//! assert!(derived.keys().contains(&"region".to_string()));
//!
//! let schema = derived.into_schema();
//! assert!(schema.keys().contains(&"sensor".to_string()));
//! ```

mod builder;
mod config;
mod corpus;
mod derived;
mod error;
mod features;
mod grouping;
mod inducer;
mod merge;
mod vectorize;

pub use builder::build_group_schema;
pub use config::DeriveConfig;
pub use corpus::collect_corpus;
pub use derived::{DerivationStats, DerivedSchema, GroupSummary};
pub use error::{DeriveError, Result};
pub use features::{ParsedPath, PathFeatures, PathSegment};
pub use grouping::{GroupingStrategy, ValueBuckets, WardLinkage};
pub use inducer::{derive_schema, SchemaInducer};
pub use merge::merge_group_schemas;
pub use vectorize::FeatureSpace;
