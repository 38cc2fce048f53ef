//! # Pathmodel Schema
//!
//! The routing schema: a nested decision tree whose internal nodes test
//! packet attributes and whose leaves are filename templates.
//!
//! ## Shape
//!
//! ```text
//! Schema (root mapping)
//!     │
//!     └──> key ──> Branch Map
//!                    ├─> "lidar"  ──> Internal { altitude ──> ... }
//!                    ├─> ">100"   ──> Leaf "{timestamp}_high.parquet"
//!                    └─> "r/^ab/" ──> Leaf "{id}.json"
//! ```
//!
//! Branch labels are compiled when the schema is loaded:
//!
//! - **Categorical** labels match by string equality
//! - **Numeric** labels (`>0.5`, `<=100`, `10-20`) match numbers
//! - **Pattern** labels (`r/<regex>/`) match strings by prefix-anchored regex
//!
//! Keys that are not a single path component and invalid pattern bodies are
//! rejected here, so that routing a packet never fails. Text that only
//! resembles a predicate (`1.0.0-1`) is categorical.
//!
//! ## Example
//!
//! ```rust
//! use pathmodel_schema::Schema;
//!
//! let schema = Schema::from_json_str(
//!     r#"{"metric": {">0.5": "high/{name}.json", "<=0.5": "low/{name}.json"}}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(schema.keys(), vec!["metric"]);
//! ```

mod error;
mod label;
mod node;
mod schema;

pub use error::{Result, SchemaError};
pub use label::{BranchLabel, Comparator, LabelKind, NumericPredicate};
pub use node::{is_plain_key, Branch, BranchMap, Entry, InternalNode, SchemaNode};
pub use schema::{DivergentNode, Schema};
