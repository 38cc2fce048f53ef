use crate::engine::RoutingEngine;
use crate::error::{Result, RouterError};
use anyhow::{anyhow, Context};
use pathmodel_schema::Schema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What `transmit` does besides computing the path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    /// Only compute the destination string
    #[default]
    DryRun,
    /// Also create the containing directories (create-if-absent)
    CreateDirs,
}

/// Configuration of a routing engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Directory every routed path lives under
    pub root: PathBuf,

    /// Sink subdirectory under `root` for unresolved packets
    pub sink_dir: String,

    /// Packet attribute used to name sink files
    pub id_key: String,

    /// Default mode for `transmit`
    pub mode: RouteMode,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data_lake"),
            sink_dir: "_intake".to_string(),
            id_key: "id".to_string(),
            mode: RouteMode::DryRun,
        }
    }
}

impl RouterConfig {
    /// Default configuration rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(RouterError::invalid_config("root must not be empty"));
        }

        if self.sink_dir.is_empty() {
            return Err(RouterError::invalid_config("sink_dir must not be empty"));
        }

        if self.sink_dir.contains(&['/', '\\'][..])
            || self.sink_dir == "."
            || self.sink_dir == ".."
        {
            return Err(RouterError::invalid_config(format!(
                "sink_dir must be a single path segment, got '{}'",
                self.sink_dir
            )));
        }

        if self.id_key.is_empty() {
            return Err(RouterError::invalid_config("id_key must not be empty"));
        }

        Ok(())
    }
}

/// Router settings plus the schema they route with, as read from a TOML file.
///
/// ```toml
/// schema_path = "schema.json"   # or an inline [schema] table
///
/// [router]
/// root = "drone_data"
/// mode = "create_dirs"
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub router: RouterConfig,
    pub schema: Schema,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    #[serde(default)]
    router: RouterConfig,
    schema: Option<toml::Table>,
    schema_path: Option<PathBuf>,
}

impl EngineConfig {
    /// Load from a TOML file; a relative `schema_path` resolves against the file's directory
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, base)
            .with_context(|| format!("invalid engine config {}", path.display()))
    }

    pub fn from_toml_str(text: &str, base_dir: &Path) -> anyhow::Result<Self> {
        let raw: RawEngineConfig = toml::from_str(text).context("failed to parse TOML")?;

        let schema = match (raw.schema, raw.schema_path) {
            (Some(_), Some(_)) => {
                return Err(anyhow!("set either [schema] or schema_path, not both"));
            }
            (Some(table), None) => {
                let value = serde_json::to_value(table).context("failed to convert schema")?;
                Schema::from_value(&value).context("invalid inline schema")?
            }
            (None, Some(schema_path)) => {
                let resolved = if schema_path.is_absolute() {
                    schema_path
                } else {
                    base_dir.join(schema_path)
                };
                Schema::load(&resolved)
                    .with_context(|| format!("failed to load schema {}", resolved.display()))?
            }
            (None, None) => return Err(anyhow!("missing [schema] table or schema_path")),
        };

        raw.router.validate()?;
        Ok(Self {
            router: raw.router,
            schema,
        })
    }

    pub fn into_engine(self) -> Result<RoutingEngine> {
        RoutingEngine::with_config(self.schema, self.router)
    }
}
