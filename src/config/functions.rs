//! Functions that load a [`Config`] from JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{Config, Error};

/// Loads and validates a configuration from a string.
pub(crate) fn load_str(s: &str) -> Result<Config, Error> {
    let config: Config = serde_json::from_str(s)?;
    config.validate()?;
    Ok(config)
}

/// Loads and validates a configuration from a file.
pub(crate) fn load_file<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: Config = serde_json::from_reader(reader)?;
    config.validate()?;
    Ok(config)
}
