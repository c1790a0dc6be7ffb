// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration for crobot
//!
//! Thresholds, ideal sections, the rule catalog and fetch settings are all
//! plain configuration handed to the auditor at construction time.

use crate::analyzers::rules::{default_rules, RuleCatalog, RuleSpec};
use crate::analyzers::semantic::{default_ideal_sections, SemanticAnalyzer, DEFAULT_THRESHOLD};
use crate::error::{CrobotError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub semantic: SemanticConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Seconds before a fetch or render is abandoned
    pub timeout_secs: u64,
    pub user_agent: String,
    pub mode: FetchMode,
    /// Browser binary used in headless mode
    pub browser: String,
}

/// How pages are acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Rendered DOM from a headless browser
    Headless,
    /// Plain HTTP GET; scripts are not executed, so injected elements are missed
    Http,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Http => write!(f, "http"),
            FetchMode::Headless => write!(f, "headless"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Similarity strictly below this is reported as a gap
    pub threshold: f64,
    pub ideal_sections: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Compile rule patterns case-insensitively
    pub case_insensitive_patterns: bool,
    /// Replaces the standard checklist when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<Vec<RuleSpec>>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: format!("crobot/{}", env!("CARGO_PKG_VERSION")),
            mode: FetchMode::Headless,
            browser: "chromium".to_string(),
        }
    }
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            ideal_sections: default_ideal_sections(),
        }
    }
}

impl Config {
    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(CrobotError::Config("fetch.timeout_secs must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.semantic.threshold) {
            return Err(CrobotError::Config(format!(
                "semantic.threshold must be within [0, 1], got {}",
                self.semantic.threshold
            )));
        }
        if self.semantic.ideal_sections.iter().any(|s| s.trim().is_empty()) {
            return Err(CrobotError::Config(
                "semantic.ideal_sections must not contain empty entries".to_string(),
            ));
        }
        Ok(())
    }

    /// Fetch timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Compile the configured (or standard) rule catalog
    pub fn catalog(&self) -> Result<RuleCatalog> {
        let specs = self.rules.catalog.clone().unwrap_or_else(default_rules);
        RuleCatalog::new(specs, self.rules.case_insensitive_patterns)
    }

    /// Semantic analyzer with the configured sections and threshold
    pub fn semantic_analyzer(&self) -> SemanticAnalyzer {
        SemanticAnalyzer::new(self.semantic.ideal_sections.clone(), self.semantic.threshold)
    }
}

/// `<config dir>/crobot/config.yml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crobot")
        .join("config.yml")
}

/// Load and validate configuration; a missing file yields defaults
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;

    let config: Config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::from_str(&content)
            .map_err(|e| CrobotError::Config(format!("TOML parse error: {}", e)))?
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| CrobotError::Config(format!("YAML parse error: {}", e)))?
    };

    config.validate()?;
    Ok(config)
}

/// Write the default configuration, YAML or TOML by extension
pub fn write_default_config(path: &Path) -> Result<()> {
    let config = Config::default();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
        toml::to_string_pretty(&config)
            .map_err(|e| CrobotError::Config(format!("TOML serialize error: {}", e)))?
    } else {
        serde_yaml::to_string(&config)?
    };

    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.fetch.timeout_secs, 20);
        assert_eq!(config.fetch.mode, FetchMode::Headless);
        assert_eq!(config.semantic.threshold, 0.2);
        assert_eq!(config.semantic.ideal_sections.len(), 5);
        assert_eq!(config.catalog().unwrap().len(), 17);
    }

    #[test]
    fn test_default_mode_renders_scripts() {
        assert_eq!(FetchConfig::default().mode, FetchMode::Headless);
        let config: Config = serde_yaml::from_str("fetch:\n  timeout_secs: 5\n").unwrap();
        assert_eq!(config.fetch.mode, FetchMode::Headless);
        assert_eq!(config.fetch.timeout_secs, 5);
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crobot").join("config.yml");
        write_default_config(&path).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.fetch.mode, FetchMode::Headless);
        assert_eq!(config.semantic.ideal_sections, default_ideal_sections());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path).unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.fetch.browser, "chromium");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "semantic:\n  threshold: 0.35\nfetch:\n  mode: http\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.semantic.threshold, 0.35);
        assert_eq!(config.semantic.ideal_sections.len(), 5);
        assert_eq!(config.fetch.mode, FetchMode::Http);
        assert_eq!(config.fetch.timeout_secs, 20);
    }

    #[test]
    fn test_custom_catalog() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "rules:\n  catalog:\n    - name: hero\n      kind: tag_presence\n      tags: [h1]\n    - name: cta\n      kind: button_text\n      phrases: [shop now]\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.catalog().unwrap().names(), vec!["hero", "cta"]);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "semantic:\n  threshold: 1.5\n").unwrap();
        assert!(matches!(load_config(&path), Err(CrobotError::Config(_))));
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "fetch: [unclosed").unwrap();
        assert!(load_config(&path).is_err());
    }
}
