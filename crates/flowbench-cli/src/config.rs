//! Tool config files.
//!
//! The format follows the file extension: `.toml` or `.json`. A config is
//! validated as soon as it is read, so pipelines only ever see valid options.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use flowbench_model::ToolConfig;
use tracing::debug;

/// Reads, parses and validates a tool config file.
pub fn load_tool_config(path: &Path) -> Result<ToolConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let config = match extension.as_deref() {
        Some("toml") => ToolConfig::from_toml_str(&text),
        Some("json") => ToolConfig::from_json_str(&text),
        _ => bail!(
            "unsupported config format for {} (expected .toml or .json)",
            path.display()
        ),
    }
    .with_context(|| format!("parse config {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    debug!(tool = %config.tool(), path = %path.display(), "loaded tool config");
    Ok(config)
}
