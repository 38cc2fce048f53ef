use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a packet could not reach a concrete leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SinkClass {
    /// A key the walk reached is absent from the packet
    MissingAttribute,
    /// The packet carries the key but no label matches its value
    NoMatchingBranch,
    /// The leaf template references an absent attribute
    UnrenderedTemplate,
}

impl SinkClass {
    /// Sink directory / filename prefix for this class
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingAttribute => "missing-attribute",
            Self::NoMatchingBranch => "no-matching-branch",
            Self::UnrenderedTemplate => "unrendered-template",
        }
    }
}

impl fmt::Display for SinkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of the timestamp embedded in sink filenames
pub trait Clock: Send + Sync {
    fn stamp(&self) -> String;
}

/// Local wall-clock time, filesystem safe (`20260112T090000.123456`)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn stamp(&self) -> String {
        chrono::Local::now().format("%Y%m%dT%H%M%S%.6f").to_string()
    }
}

/// Always returns the same stamp; makes sink paths reproducible
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl FixedClock {
    pub fn new(stamp: impl Into<String>) -> Self {
        Self(stamp.into())
    }
}

impl Clock for FixedClock {
    fn stamp(&self) -> String {
        self.0.clone()
    }
}
