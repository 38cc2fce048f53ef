//! # Pathmodel Router
//!
//! Storage as classification: a packet of attributes walks a routing schema
//! and the walk *is* its destination path. The same schema turns a partial
//! intent into a wildcard pattern for reading the data back.
//!
//! ## Architecture
//!
//! ```text
//! Packet ──> Schema Walker (route / transmit)
//!     │          ├─> Predicate Matcher (categorical → numeric → pattern)
//!     │          ├─> Path Sanitizer (label → key=segment)
//!     │          └─> Template rendering ({name}, {name=default})
//!     │
//!     └──> root/key=segment/.../filename
//!          or root/_intake/<sink-class>/<id>_<stamp>
//!
//! Intent ──> Intent Projector (project / project_family)
//!     │
//!     └──> root/key=segment/key=*/.../*  ──> PatternEnumerator ──> files
//! ```
//!
//! Unresolvable packets are never errors: they land in a sink so that
//! misrouted data stays retrievable.
//!
//! ## Example
//!
//! ```rust
//! use pathmodel_router::{Packet, RoutingEngine};
//! use pathmodel_schema::Schema;
//!
//! let schema = Schema::from_json_str(
//!     r#"{"metric": {">0.5": "high/{name}.json", "<=0.5": "low/{name}.json"}}"#,
//! )
//! .unwrap();
//! let engine = RoutingEngine::new(schema, "lake");
//!
//! let routed = engine.route(&Packet::new().with("metric", 0.8).with("name", "x"));
//! assert_eq!(routed.path.to_str(), Some("lake/metric=gt_0.5/high/x.json"));
//!
//! assert_eq!(engine.project(&Packet::new()), "lake/metric=*/*");
//! ```

mod config;
mod engine;
mod enumerate;
mod error;
mod matcher;
mod packet;
mod projector;
mod sanitize;
mod sink;
mod template;
mod walker;

pub use config::{EngineConfig, RouteMode, RouterConfig};
pub use engine::{RouteOutcome, Routed, RoutingEngine};
pub use enumerate::PatternEnumerator;
pub use error::{Result, RouterError};
pub use matcher::match_branch;
pub use packet::{render_value, Packet};
pub use sanitize::sanitize_segment;
pub use sink::{Clock, FixedClock, SinkClass, SystemClock};
pub use template::{render_template, MissingPlaceholder};
