//! `skillgate.toml`: validation thresholds, readiness thresholds, the advice
//! collaborator and the data directory. Every section is optional.

pub mod paths;

use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use serde::{Serialize, Deserialize};
use crate::error::TrackerError;
use crate::readiness::ReadinessThresholds;
use crate::validation::ValidationPolicy;

pub use paths::{app_data_dir, config_path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub enabled: bool,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub cache_capacity: usize,
    pub breaker_failure_threshold: u64,
    pub breaker_cooldown_secs: u64,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        AdviceConfig {
            enabled: false,
            model: "qwen2.5:7b-instruct".to_string(),
            endpoint: "http://localhost:11434/api/generate".to_string(),
            timeout_secs: 60,
            max_attempts: 3,
            cache_capacity: 64,
            breaker_failure_threshold: 3,
            breaker_cooldown_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub validation: ValidationPolicy,
    pub readiness: ReadinessThresholds,
    pub advice: AdviceConfig,
    /// Root for the JSON store; defaults to the app-data directory.
    pub data_dir: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, TrackerError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, TrackerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrackerError::new(format!("Failed to read config: {}", e), "config")
                .with_context(format!("path: {:?}", path))
        })?;
        Self::from_toml_str(&content).map_err(|e| e.with_context(format!("path: {:?}", path)))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(app_data_dir)
    }
}

fn load_engine_config_internal() -> EngineConfig {
    let path = config_path();
    if !path.exists() {
        tracing::debug!(path = ?path, "No config file, using defaults");
        return EngineConfig::default();
    }
    match EngineConfig::load_from(&path) {
        Ok(config) => {
            tracing::info!(path = ?path, "Loaded engine config");
            config
        }
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Failed to load config, using defaults");
            EngineConfig::default()
        }
    }
}

lazy_static! {
    static ref ENGINE_CONFIG: EngineConfig = load_engine_config_internal();
}

/// Process-wide configuration, read once from [`config_path`].
pub fn get_engine_config() -> &'static EngineConfig {
    &ENGINE_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            data_dir = "/tmp/skillgate"

            [validation]
            min_hands_on_percentage = 70.0

            [validation.lab_evidence]
            min_writeup_words = 150

            [advice]
            enabled = true
            "#,
        )
        .unwrap();
        assert_eq!(config.validation.min_hands_on_percentage, 70.0);
        assert_eq!(config.validation.max_theory_percentage, 40.0);
        assert_eq!(config.validation.lab_evidence.min_writeup_words, 150);
        assert_eq!(config.validation.tool_evidence.min_description_words, 50);
        assert!(config.advice.enabled);
        assert_eq!(config.advice.max_attempts, 3);
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/skillgate"));
    }

    #[test]
    fn bad_toml_reports_config_stage() {
        let err = EngineConfig::from_toml_str("[validation\n").unwrap_err();
        assert_eq!(err.stage, "config");
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[readiness]\ncert_min_avg = 5.0").unwrap();
        let config = EngineConfig::load_from(file.path()).unwrap();
        assert_eq!(config.readiness.cert_min_avg, 5.0);

        let missing = EngineConfig::load_from(Path::new("/nonexistent/skillgate.toml")).unwrap_err();
        assert_eq!(missing.stage, "config");
        assert!(missing.context.is_some());
    }
}
