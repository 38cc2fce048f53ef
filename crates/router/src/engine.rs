use crate::config::{RouteMode, RouterConfig};
use crate::error::Result;
use crate::packet::Packet;
use crate::sanitize::sanitize_segment;
use crate::sink::{Clock, SinkClass, SystemClock};
use pathmodel_schema::Schema;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a routed packet ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "sink", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// A leaf was reached and its template rendered
    Resolved,
    /// The packet was diverted; the path is still well-formed and under root
    Sink(SinkClass),
}

/// Destination computed for a packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Routed {
    pub path: PathBuf,
    pub outcome: RouteOutcome,
}

impl Routed {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self.outcome, RouteOutcome::Resolved)
    }

    #[must_use]
    pub const fn sink(&self) -> Option<SinkClass> {
        match self.outcome {
            RouteOutcome::Sink(class) => Some(class),
            RouteOutcome::Resolved => None,
        }
    }
}

/// A routing schema bound to a storage root.
///
/// Engines are plain values: build one per schema + root pair and pass it
/// to whoever routes or projects. Routing reads only the packet and the
/// schema; the optional directory creation in `transmit` is the only side
/// effect.
#[derive(Clone)]
pub struct RoutingEngine {
    pub(crate) schema: Schema,
    pub(crate) config: RouterConfig,
    pub(crate) clock: Arc<dyn Clock>,
}

impl RoutingEngine {
    /// Engine with default settings rooted at `root`
    pub fn new(schema: Schema, root: impl Into<PathBuf>) -> Self {
        Self {
            schema,
            config: RouterConfig::with_root(root),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_config(schema: Schema, config: RouterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            schema,
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Builder: replace the timestamp source used for sink filenames
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Route using the configured mode
    pub fn transmit(&self, packet: &Packet) -> Result<Routed> {
        self.transmit_with(packet, self.config.mode)
    }

    /// Route, creating the containing directories when `mode` asks for it
    pub fn transmit_with(&self, packet: &Packet, mode: RouteMode) -> Result<Routed> {
        let routed = self.route(packet);

        if mode == RouteMode::CreateDirs {
            if let Some(parent) = routed.path.parent() {
                std::fs::create_dir_all(parent)?;
                log::debug!("Ensured directory {}", parent.display());
            }
        }

        Ok(routed)
    }

    /// `root/<sink_dir>/<class>/<id>_<stamp>`
    pub(crate) fn sink_path(&self, class: SinkClass, packet: &Packet) -> PathBuf {
        self.config
            .root
            .join(&self.config.sink_dir)
            .join(class.as_str())
            .join(format!("{}_{}", self.packet_id(packet), self.clock.stamp()))
    }

    /// Filename used in place of a leaf template that could not be rendered
    pub(crate) fn unrendered_filename(&self, placeholder: &str, packet: &Packet) -> String {
        let placeholder = sanitize_segment(placeholder);
        format!(
            "{}_{}_{}_{}",
            SinkClass::UnrenderedTemplate.as_str(),
            if placeholder.is_empty() { "empty" } else { &placeholder },
            self.packet_id(packet),
            self.clock.stamp()
        )
    }

    fn packet_id(&self, packet: &Packet) -> String {
        packet
            .text(&self.config.id_key)
            .map(|id| sanitize_segment(&id))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl fmt::Debug for RoutingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingEngine")
            .field("config", &self.config)
            .field("keys", &self.schema.keys())
            .finish_non_exhaustive()
    }
}
