//! Loading of [`ParserConfig`] from TOML files.

use std::fs;
use std::path::Path;

use arenalog_types::ParserConfig;

use crate::error::ConfigError;

/// Load a parser config from a TOML file. Missing keys keep their defaults.
pub fn load_config(path: &Path) -> Result<ParserConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

pub fn parse_config(contents: &str) -> Result<ParserConfig, toml::de::Error> {
    toml::from_str(contents)
}
