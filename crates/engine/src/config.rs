//! Session configuration via `dbkit.toml`
//!
//! Names the provider, the connection string and the query scopes to load.
//! Relative scope files resolve against the directory holding the config
//! file.

use std::path::{Path, PathBuf};

use dbkit_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Config file name looked up by default.
pub const CONFIG_FILE_NAME: &str = "dbkit.toml";

/// A scope loaded when the session is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScopeConfig {
    /// Scope name
    pub name: String,
    /// Query file
    pub file: PathBuf,
}

/// Session configuration loaded from `dbkit.toml`.
///
/// # Example
///
/// ```toml
/// provider = "sqlite"
/// connection_string = "Data Source=app.db"
///
/// [[scopes]]
/// name = "reports"
/// file = "queries/reports.xml"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Registered provider name.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Provider-specific connection string.
    pub connection_string: String,
    /// Query scopes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<ScopeConfig>,
    /// Directory relative scope files resolve against.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_provider() -> String {
    "sqlite".to_string()
}

impl SessionConfig {
    /// A config with no scopes.
    pub fn new(provider: impl Into<String>, connection_string: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            connection_string: connection_string.into(),
            scopes: Vec::new(),
            base_dir: None,
        }
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# dbkit session configuration
#
# Provider registered in the process (the sqlite provider registers as "sqlite")
provider = "sqlite"

# Provider connection string. For sqlite: a path, "Data Source=<path>" or ":memory:"
connection_string = "Data Source=dbkit.db"

# Named query scopes. Relative paths resolve against this file's directory.
# [[scopes]]
# name = "reports"
# file = "queries/reports.xml"
"#
    }

    /// Parse config text.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the text is not valid TOML for this structure.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(text).map_err(|e| Error::Config {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let mut config = Self::from_toml(&content).map_err(|e| match e {
            Error::Config { reason } => Error::Config {
                reason: format!("failed to parse config file '{}': {}", path.display(), reason),
            },
            other => other,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Config {
                reason: format!("failed to write default config file '{}': {}", path.display(), e),
            })?;
        }
        Ok(())
    }

    /// Resolve a scope file against the config directory.
    pub fn resolve(&self, file: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.to_path_buf(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.provider.trim().is_empty() {
            return Err(Error::Config {
                reason: "provider must not be empty".to_string(),
            });
        }
        if self.connection_string.trim().is_empty() {
            return Err(Error::Config {
                reason: "connection_string must not be empty".to_string(),
            });
        }
        let mut names: Vec<&str> = self.scopes.iter().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::Config {
                reason: format!("scope '{}' listed twice", pair[0]),
            });
        }
        Ok(())
    }
}
