//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use fdt_core::duty::DutyConfig;
use fdt_core::limits::ComplianceConfiguration;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Regulatory limit configuration.
    #[serde(default)]
    pub compliance: ComplianceConfiguration,

    /// Duty-timer warning thresholds.
    #[serde(default)]
    pub duty: DutyConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("operation", &self.compliance.operation)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("fdt.db"),
            compliance: ComplianceConfiguration::default(),
            duty: DutyConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (FDT_*)
        figment = figment.merge(Env::prefixed("FDT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for fdt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("fdt"))
}

/// Returns the platform-specific data directory for fdt.
///
/// On Linux: `~/.local/share/fdt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("fdt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_returns_some() {
        assert!(dirs_data_path().is_some());
    }

    #[test]
    fn test_dirs_data_path_ends_with_fdt() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "fdt");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("fdt.db"));
    }

    #[test]
    fn test_default_compliance_has_enabled_categories() {
        let config = Config::default();
        assert!(!config.compliance.categories.is_empty());
        assert!(config.compliance.categories.iter().all(|c| c.enabled));
    }

    #[test]
    fn compliance_section_merges_from_toml() {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(
            r#"
            [compliance]
            warning_threshold_pct = 80.0
            "#,
        ));
        let config: Config = figment.extract().unwrap();
        assert!((config.compliance.warning_threshold_pct - 80.0).abs() < f64::EPSILON);
        // Untouched fields keep their defaults.
        assert!((config.compliance.critical_threshold_pct - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn compliance_config_serde_round_trips() {
        let config = ComplianceConfiguration::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ComplianceConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
