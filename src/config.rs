//! Configuration file support for lifecyclegen
//!
//! This module provides support for loading configuration from `.lifecyclegen.toml`
//! files, allowing projects to declare their own Activity/Fragment base classes and
//! formatting preferences.
//!
//! # Example Configuration
//!
//! ```toml
//! [classify]
//! activity_base_types = ["android.app.Activity", "com.example.BaseScreen"]
//! fragment_base_types = ["androidx.fragment.app.Fragment"]
//! name_fallback = true
//! android_stubs = true
//!
//! [format]
//! indent = "    "
//! remove_unused_imports = true
//! reformat_whole_file = false
//!
//! [notify]
//! fadeout_secs = 10
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file searched for in the working directory and its parents
pub const CONFIG_FILE_NAME: &str = ".lifecyclegen.toml";

/// Main configuration structure loaded from `.lifecyclegen.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Config {
    /// Activity/Fragment classification settings
    pub classify: ClassifyConfig,

    /// Post-edit cleanup settings
    pub format: FormatConfig,

    /// Notification settings
    pub notify: NotifyConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the `.lifecyclegen.toml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents =
            fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config =
            toml::from_str(&contents).context("Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Try to load configuration from the current directory or its parents
    ///
    /// Falls back to the default configuration when no file is found.
    pub fn load_from_current_dir() -> Self {
        Self::find_and_load(".").unwrap_or_default()
    }

    /// Find and load configuration file starting from a given directory
    ///
    /// Walks up the directory tree until a `.lifecyclegen.toml` is found or the
    /// root is reached.
    pub fn find_and_load<P: AsRef<Path>>(start_dir: P) -> Option<Self> {
        let mut current_dir = start_dir.as_ref().to_path_buf();

        loop {
            let config_path = current_dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::from_file(&config_path).ok();
            }

            if !current_dir.pop() {
                break;
            }
        }

        None
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;
        fs::write(path.as_ref(), toml_string).context("Failed to write configuration file")?;
        Ok(())
    }

    /// Merge command-line arguments with configuration file settings
    ///
    /// Command-line arguments take precedence over configuration file settings.
    pub fn merge_with_args(
        &mut self,
        name_fallback: Option<bool>,
        reformat_whole_file: Option<bool>,
        fadeout_secs: Option<u64>,
    ) {
        if let Some(name_fallback) = name_fallback {
            self.classify.name_fallback = name_fallback;
        }
        if let Some(reformat_whole_file) = reformat_whole_file {
            self.format.reformat_whole_file = reformat_whole_file;
        }
        if let Some(fadeout_secs) = fadeout_secs {
            self.notify.fadeout_secs = fadeout_secs;
        }
    }
}

/// Classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Fully-qualified base types that make a class an Activity
    pub activity_base_types: Vec<String>,

    /// Fully-qualified base types that make a class a Fragment
    pub fragment_base_types: Vec<String>,

    /// Fall back to `Activity`/`Fragment` substrings in the class name
    pub name_fallback: bool,

    /// Seed the type index with the Android framework hierarchy
    pub android_stubs: bool,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            activity_base_types: vec![
                "android.app.Activity".to_string(),
                "android.support.v7.app.AppCompatActivity".to_string(),
                "androidx.appcompat.app.AppCompatActivity".to_string(),
            ],
            fragment_base_types: vec![
                "android.app.Fragment".to_string(),
                "android.support.v4.app.Fragment".to_string(),
                "androidx.fragment.app.Fragment".to_string(),
            ],
            name_fallback: true,
            android_stubs: true,
        }
    }
}

/// Post-edit cleanup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Indentation unit used when reformatting
    pub indent: String,

    /// Drop single-type imports that are no longer referenced
    pub remove_unused_imports: bool,

    /// Reformat the whole file instead of only the inserted method
    pub reformat_whole_file: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            remove_unused_imports: true,
            reformat_whole_file: false,
        }
    }
}

/// Notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// How long a notification stays visible, in seconds
    pub fadeout_secs: u64,
}

impl NotifyConfig {
    pub fn fadeout(&self) -> Duration {
        Duration::from_secs(self.fadeout_secs)
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { fadeout_secs: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.classify.activity_base_types.len(), 3);
        assert!(config.classify.name_fallback);
        assert_eq!(config.format.indent, "    ");
        assert_eq!(config.notify.fadeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_string = toml::to_string(&config).unwrap();
        assert!(toml_string.contains("activity_base_types"));
        assert!(toml_string.contains("fadeout_secs"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [classify]
            activity_base_types = ["com.example.BaseScreen"]
            name_fallback = false

            [format]
            indent = "\t"

            [notify]
            fadeout_secs = 3
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.classify.activity_base_types, vec!["com.example.BaseScreen"]);
        assert!(!config.classify.name_fallback);
        assert_eq!(config.classify.fragment_base_types.len(), 3);
        assert_eq!(config.format.indent, "\t");
        assert!(config.format.remove_unused_imports);
        assert_eq!(config.notify.fadeout_secs, 3);
    }

    #[test]
    fn test_config_merge_with_args() {
        let mut config = Config::default();
        config.merge_with_args(Some(false), Some(true), None);

        assert!(!config.classify.name_fallback);
        assert!(config.format.reformat_whole_file);
        assert_eq!(config.notify.fadeout_secs, 10);
    }

    #[test]
    fn test_config_save_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("app/src/main");
        fs::create_dir_all(&nested).unwrap();

        let mut config = Config::default();
        config.notify.fadeout_secs = 4;
        config.save_to_file(dir.path().join(CONFIG_FILE_NAME)).unwrap();

        let loaded = Config::find_and_load(&nested).unwrap();
        assert_eq!(loaded.notify.fadeout_secs, 4);
    }
}
