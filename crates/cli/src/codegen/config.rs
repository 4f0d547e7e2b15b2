//! Generator input (`codegen.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::naming::{is_type_name, NameStyle};

/// Parsed generator input.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Database to describe
    pub connection: ConnectionConfig,
    /// Output options
    #[serde(default)]
    pub settings: Settings,
    /// Objects to generate
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    pub connection_string: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub output: PathBuf,
    pub name_style: NameStyle,
    pub parameter_char: String,
    pub nullable: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("generated"),
            name_style: NameStyle::default(),
            parameter_char: "@".to_string(),
            nullable: true,
        }
    }
}

/// One generated record type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectConfig {
    /// Struct name, e.g. `UserGroup`
    pub name: String,
    /// Table the generated queries target
    pub table: String,
    /// Query whose result columns define the record; defaults to `SELECT * FROM <table>`
    #[serde(default)]
    pub columns_query: Option<String>,
}

impl ObjectConfig {
    /// The query used to discover columns.
    pub fn columns_query(&self) -> String {
        self.columns_query
            .clone()
            .unwrap_or_else(|| format!("SELECT * FROM {}", self.table))
    }
}

fn default_provider() -> String {
    "sqlite".to_string()
}

impl GeneratorConfig {
    /// Parse generator input from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: GeneratorConfig = toml::from_str(text).context("Invalid generator input")?;
        config.validate()?;
        Ok(config)
    }

    /// Read an input file; relative paths inside it resolve against its directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read generator input {}", path.display()))?;
        let mut config = Self::from_toml(&text)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Directory generated files are written to.
    pub fn output_dir(&self) -> PathBuf {
        if self.settings.output.is_absolute() {
            self.settings.output.clone()
        } else {
            self.base_dir.join(&self.settings.output)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.objects.is_empty() {
            bail!("Generator input declares no objects");
        }
        if self.settings.parameter_char.chars().count() != 1 {
            bail!(
                "parameter_char must be a single character, got '{}'",
                self.settings.parameter_char
            );
        }
        let mut seen = std::collections::HashSet::new();
        for object in &self.objects {
            if !is_type_name(&object.name) {
                bail!("Object name '{}' is not a valid type name", object.name);
            }
            if object.table.trim().is_empty() {
                bail!("Object '{}' has an empty table name", object.name);
            }
            if !seen.insert(object.name.as_str()) {
                bail!("Object '{}' is declared twice", object.name);
            }
        }
        Ok(())
    }
}
