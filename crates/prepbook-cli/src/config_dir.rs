// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware configuration file resolution.

use std::path::{Path, PathBuf};

use prepbook_core::FormatConfig;
use prepbook_core::error::Result;

const CONFIG_FILE: &str = "config.json";

/// Directory holding `config.json`: `$XDG_CONFIG_HOME/prepbook`, else
/// `$HOME/.config/prepbook`.
pub fn config_dir() -> PathBuf {
    config_base().join("prepbook")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

fn config_base() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|dir| !dir.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".config");
    }
    // Last resort
    PathBuf::from(".")
}

/// Load the explicit `--config` file (which must exist), else the default
/// file when present, else the built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<FormatConfig> {
    match explicit {
        Some(path) => FormatConfig::load(path),
        None => FormatConfig::load_or_default(default_config_path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_lives_in_prepbook_dir() {
        let path = default_config_path();
        assert!(path.ends_with("prepbook/config.json"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.json"))).is_err());
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json");
        std::fs::write(&path, r#"{ "font_size_pt": 12.0 }"#).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.font_size_pt, 12.0);
        assert_eq!(config.font_name, FormatConfig::default().font_name);
    }
}
