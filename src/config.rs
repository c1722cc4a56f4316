//! TOML configuration for the mt binary.
//!
//! A config file carries default parse and render options; flags given on
//! the command line are overlaid on top. The `--config` argument accepts
//! either a file path or inline TOML.

use marktree_core::{ParseOptions, RenderOptions};
use serde::Deserialize;
use std::io;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseOptions,
    pub render: RenderOptions,
}

impl Config {
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn parse_inline(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
