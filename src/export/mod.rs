//! Derived JSON files written alongside the database.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Pretty-print `data` to `path`, replacing any previous export.
pub fn write_json(path: &Path, data: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("encoding export")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "export written");
    Ok(())
}
