use std::{fs, path::Path};

use anyhow::anyhow;
use hd_key_deriv::EngineConfig;

/// Loads the engine config from a TOML file, or the defaults if no file is given.
///
/// ```toml
/// [bip32]
/// secret = 0x04358394
/// public = 0x043587cf
/// ```
pub(crate) fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, anyhow::Error> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let contents = fs::read_to_string(path)?;
    parse_engine_config(&contents)
}

fn parse_engine_config(contents: &str) -> Result<EngineConfig, anyhow::Error> {
    toml::from_str(contents).map_err(|e| anyhow!(format!("Failed to parse config file: {}", e)))
}
