//! Engine configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use fuelmap_types::EngineParams;

use crate::logging::LogFormat;
use crate::EngineError;

/// Configuration for an engine instance backed by an LMDB data directory.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field is optional in TOML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in MiB.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Consensus, trust and ranking parameters.
    #[serde(default)]
    pub params: EngineParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./fuelmap_data")
}

fn default_map_size_mb() -> usize {
    64
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        let config: Self = toml::from_str(s).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.map_size_mb == 0 {
            return Err(EngineError::Config("map_size_mb must be positive".into()));
        }
        self.log_format()?;
        self.params.validate()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, EngineError> {
        self.log_format.parse()
    }

    /// LMDB map size in bytes.
    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: EngineParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = EngineConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = EngineConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.map_size_mb, 64);
        assert_eq!(config.log_format, "human");
        assert_eq!(config.params.confirmation_threshold, 3);
        assert_eq!(config.params.stale_dispute_days, 7);
        assert_eq!(config.params.min_trust_for_best_value, 6.0);
    }

    #[test]
    fn partial_params_table_overrides() {
        let toml = r#"
            data_dir = "/var/lib/fuelmap"
            log_format = "json"

            [params]
            confirmation_threshold = 5
            search_radius_km = 3.5
        "#;
        let config = EngineConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/fuelmap"));
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.params.confirmation_threshold, 5);
        assert_eq!(config.params.search_radius_km, 3.5);
        assert_eq!(config.params.competitive_price_threshold, 6.0); // default
    }

    #[test]
    fn invalid_params_are_rejected() {
        let toml = r#"
            [params]
            confirmation_threshold = 0
        "#;
        assert!(matches!(
            EngineConfig::from_toml_str(toml),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str(r#"log_format = "xml""#),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = EngineConfig::from_toml_file(Path::new("/nonexistent/fuelmap.toml"));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
