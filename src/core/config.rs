//! Tool configuration with layered hierarchy
//!
//! Company identity and defaults that seed new project manifests and
//! document title blocks. Loaded once per invocation and passed into the
//! pipeline stages; nothing reads it ambiently.

use serde::Deserialize;
use std::path::PathBuf;

/// KiFisher configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Company name stamped into title blocks and READMEs
    pub company: Option<String>,

    /// Contact email for generated documents
    pub email: Option<String>,

    /// Company website
    pub website: Option<String>,

    /// Default license line for new projects
    pub license: Option<String>,

    /// Default author for new projects
    pub author: Option<String>,

    /// Version recorded when `kf new` is run without --version-tag
    pub default_version: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/kifisher/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Environment variables
        if let Ok(company) = std::env::var("KF_COMPANY") {
            config.company = Some(company);
        }
        if let Ok(email) = std::env::var("KF_EMAIL") {
            config.email = Some(email);
        }
        if let Ok(website) = std::env::var("KF_WEBSITE") {
            config.website = Some(website);
        }
        if let Ok(license) = std::env::var("KF_LICENSE") {
            config.license = Some(license);
        }
        if let Ok(author) = std::env::var("KF_AUTHOR") {
            config.author = Some(author);
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "kifisher")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.company.is_some() {
            self.company = other.company;
        }
        if other.email.is_some() {
            self.email = other.email;
        }
        if other.website.is_some() {
            self.website = other.website;
        }
        if other.license.is_some() {
            self.license = other.license;
        }
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.default_version.is_some() {
            self.default_version = other.default_version;
        }
    }

    pub fn company(&self) -> String {
        self.company.clone().unwrap_or_default()
    }

    pub fn email(&self) -> String {
        self.email.clone().unwrap_or_default()
    }

    pub fn website(&self) -> String {
        self.website.clone().unwrap_or_default()
    }

    pub fn license(&self) -> String {
        self.license.clone().unwrap_or_default()
    }

    /// Version used when `kf new` is not given one explicitly
    pub fn default_version(&self) -> String {
        self.default_version
            .clone()
            .unwrap_or_else(|| "1.0".to_string())
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        // Try git config
        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        // Fall back to username
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            company: Some("Old Co".into()),
            email: Some("old@example.com".into()),
            ..Config::default()
        };
        base.merge(Config {
            company: Some("New Co".into()),
            license: Some("MIT".into()),
            ..Config::default()
        });

        assert_eq!(base.company(), "New Co");
        assert_eq!(base.email(), "old@example.com");
        assert_eq!(base.license(), "MIT");
    }

    #[test]
    fn test_default_version_fallback() {
        let config = Config::default();
        assert_eq!(config.default_version(), "1.0");

        let config = Config {
            default_version: Some("2.3".into()),
            ..Config::default()
        };
        assert_eq!(config.default_version(), "2.3");
    }

    #[test]
    fn test_yaml_deserialization_ignores_missing_fields() {
        let config: Config = serde_yml::from_str("company: Wickerbox\n").unwrap();
        assert_eq!(config.company(), "Wickerbox");
        assert!(config.email.is_none());
    }
}
