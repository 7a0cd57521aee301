//! Runtime configuration for the demo CLIs (spec.md's ambient stack,
//! SPEC_FULL.md §2 "Configuration").
//!
//! The library itself stays config-free — `Resolver`/`Analyzer`/`Context`
//! all take explicit constructor arguments, the way `dfvfs`'s singletons
//! do — so this is purely a convenience for `demos/`: an optional TOML
//! file naming the scanner window and resolver cache capacity, read with
//! `serde` + `toml`, matching the teacher's dependency pair.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::definitions::DEFAULT_SCAN_WINDOW;
use crate::error::{Error, FormatError};

/// Demo-CLI-tunable settings. Every field has a default drawn from the
/// library's own constants, so an absent config file is equivalent to
/// `Config::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bytes scanned from the start and end of a stream when looking for
    /// an unbounded signature (spec.md §4.3).
    pub scan_window: u64,
    /// Capacity of the resolver context's file-system/file-object caches.
    pub resolver_cache_capacity: usize,
    /// Capacity of the analyzer's per-path-spec identification cache.
    pub analyzer_cache_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config { scan_window: DEFAULT_SCAN_WINDOW, resolver_cache_capacity: 16, analyzer_cache_capacity: 256 }
    }
}

impl Config {
    /// Loads configuration from a TOML file, falling back to
    /// [`Config::default`] field values for anything the file omits.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(None, e))?;
        toml::from_str(&text).map_err(|e| Error::Format(FormatError(format!("invalid configuration file: {e}"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_library_defaults() {
        let config = Config::default();
        assert_eq!(config.scan_window, DEFAULT_SCAN_WINDOW);
        assert_eq!(config.resolver_cache_capacity, 16);
    }

    #[test]
    fn partial_toml_fills_in_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vrs.toml");
        fs::write(&path, "scan_window = 4096\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.scan_window, 4096);
        assert_eq!(config.resolver_cache_capacity, 16);
    }

    #[test]
    fn missing_file_errors_rather_than_silently_defaulting() {
        let err = Config::load(Path::new("/nonexistent/vrs.toml"));
        assert!(err.is_err());
    }
}
