//! JSON configuration of the command line tools.
//!
//! Every section is `#[serde(default)]`, so a config only has to name the
//! inputs and outputs it cares about.

pub mod depth_edges;
pub mod refine_demo;

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
