use crate::error::{Result, SchemaError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// A decimal with at most one point: `10`, `0.5`, `5.`, `.5`
const NUMBER: &str = r"([0-9]+(?:\.[0-9]*)?|\.[0-9]+)";

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^{NUMBER}\s*-\s*{NUMBER}$")).expect("valid range regex")
});

static COMPARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^([><=!]+)\s*{NUMBER}$")).expect("valid comparator regex")
});

/// Comparison operator of a numeric predicate label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Ne,
}

impl Comparator {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Gte),
            "<=" => Some(Self::Lte),
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    #[must_use]
    pub fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Gt => value > threshold,
            Self::Lt => value < threshold,
            Self::Gte => value >= threshold,
            Self::Lte => value <= threshold,
            Self::Eq => value == threshold,
            Self::Ne => value != threshold,
        }
    }
}

/// Numeric predicate parsed from a label such as `>100`, `<=0.5` or `10-20`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericPredicate {
    Compare { op: Comparator, threshold: f64 },
    /// Inclusive on both ends
    Range { low: f64, high: f64 },
}

impl NumericPredicate {
    /// Parse a label as a numeric predicate.
    ///
    /// Returns `None` when the label is not predicate-shaped or uses an
    /// unknown operator. Bounds must be plain decimals, so version-like text
    /// such as `1.0.0-1` is not a range and stays categorical.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();

        if let Some(caps) = RANGE_RE.captures(trimmed) {
            let low = caps[1].parse().ok()?;
            let high = caps[2].parse().ok()?;
            return Some(Self::Range { low, high });
        }

        let caps = COMPARE_RE.captures(trimmed)?;
        let threshold = caps[2].parse().ok()?;
        Comparator::from_token(&caps[1]).map(|op| Self::Compare { op, threshold })
    }

    #[must_use]
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Self::Compare { op, threshold } => op.apply(value, threshold),
            Self::Range { low, high } => low <= value && value <= high,
        }
    }
}

/// How a label is tried beyond plain equality
#[derive(Debug, Clone)]
pub enum LabelKind {
    Categorical,
    Numeric(NumericPredicate),
    /// `r/<body>/`, compiled prefix-anchored
    Pattern(Regex),
}

/// A branch label with its interpretation compiled once at schema load.
///
/// Every label takes part in categorical (exact string) matching; numeric
/// and pattern labels are additionally tried against numbers and strings.
#[derive(Debug, Clone)]
pub struct BranchLabel {
    raw: String,
    kind: LabelKind,
}

impl BranchLabel {
    /// Compile a label, rejecting invalid regex bodies
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();

        if let Some(body) = pattern_body(&raw) {
            let regex = Regex::new(&format!("^(?:{body})")).map_err(|source| {
                SchemaError::InvalidPattern {
                    label: raw.clone(),
                    source,
                }
            })?;
            return Ok(Self {
                raw,
                kind: LabelKind::Pattern(regex),
            });
        }

        let kind = match NumericPredicate::parse(&raw) {
            Some(predicate) => LabelKind::Numeric(predicate),
            None => LabelKind::Categorical,
        };
        Ok(Self { raw, kind })
    }

    /// A label matched by equality only, whatever it looks like
    pub fn literal(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: LabelKind::Categorical,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub const fn kind(&self) -> &LabelKind {
        &self.kind
    }

    #[must_use]
    pub fn predicate(&self) -> Option<&NumericPredicate> {
        match &self.kind {
            LabelKind::Numeric(predicate) => Some(predicate),
            _ => None,
        }
    }

    #[must_use]
    pub fn pattern(&self) -> Option<&Regex> {
        match &self.kind {
            LabelKind::Pattern(regex) => Some(regex),
            _ => None,
        }
    }
}

/// Body of `r/<body>/`; the bare `r/` is an empty body
fn pattern_body(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix("r/")?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_suffix('/')
    }
}

impl PartialEq for BranchLabel {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for BranchLabel {}

impl fmt::Display for BranchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
