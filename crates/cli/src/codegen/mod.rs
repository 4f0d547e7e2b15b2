//! Source generator: describes each configured object's columns through a
//! session and writes a record struct, a query file and an access layer per
//! object, plus a module root that registers them all.

mod config;
mod naming;
mod templates;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use dbkit::Session;
use tracing::{debug, info};

pub use config::GeneratorConfig;

use naming::snake_case;
use templates::{render_layer, render_mod, render_queries, render_record, Property};

/// Subdirectory of the output directory that holds query files.
pub const QUERIES_DIR: &str = "queries";

/// Generate sources for every object in `config`; returns the files written.
pub fn generate(config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    let mut session = Session::new(&config.connection.connection_string, &config.connection.provider)
        .context("Failed to create session")?;
    session.open().context("Failed to open connection")?;

    let output = config.output_dir();
    let queries_dir = output.join(QUERIES_DIR);
    fs::create_dir_all(&queries_dir)
        .with_context(|| format!("Failed to create {}", queries_dir.display()))?;

    let mut written = Vec::new();
    for object in &config.objects {
        let columns = session
            .describe_columns(object.columns_query().as_str())
            .with_context(|| format!("Failed to describe columns of '{}'", object.name))?;
        if columns.is_empty() {
            bail!("Query for '{}' returned no columns", object.name);
        }
        debug!(object = %object.name, columns = columns.len(), "described");

        let properties: Vec<Property> = columns
            .iter()
            .map(|c| Property::new(c, config.settings.name_style, config.settings.nullable))
            .collect();
        let stem = snake_case(&object.name).trim_start_matches("r#").to_string();

        written.push(write(
            &output.join(format!("{}.rs", stem)),
            &render_record(&object.name, &properties),
        )?);
        written.push(write(
            &queries_dir.join(format!("{}.xml", object.name)),
            &render_queries(
                &object.name,
                &object.table,
                &properties,
                &config.settings.parameter_char,
            ),
        )?);
        written.push(write(
            &output.join(format!("{}_layer.rs", stem)),
            &render_layer(&object.name, &properties),
        )?);
    }

    let names: Vec<String> = config.objects.iter().map(|o| o.name.clone()).collect();
    written.push(write(&output.join("mod.rs"), &render_mod(&names))?);

    session.close().context("Failed to close connection")?;
    info!(files = written.len(), output = %output.display(), "generated");
    Ok(written)
}

fn write(path: &Path, contents: &str) -> Result<PathBuf> {
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}
