//! Loading render contexts from files
//!
//! Contexts are JSON values. TOML files are accepted as well and converted
//! through serde, which is convenient for hand-written fixtures.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Failed to read context file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse context JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse context TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Load a context file, choosing the format by extension (`.toml`, else JSON)
pub fn from_file(path: &Path) -> Result<Value, ContextError> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => from_toml_str(&content),
        _ => from_json_str(&content),
    }
}

pub fn from_json_str(content: &str) -> Result<Value, ContextError> {
    Ok(serde_json::from_str(content)?)
}

pub fn from_toml_str(content: &str) -> Result<Value, ContextError> {
    let table: toml::Table = toml::from_str(content)?;
    Ok(serde_json::to_value(table)?)
}
