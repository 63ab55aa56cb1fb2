use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::description::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

pub const DEFAULT_CONFIG_FILE: &str = "scene-gate";
pub const ENV_PREFIX: &str = "SCENE_GATE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Simulated,
    Accelerator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriberKind {
    Simulated,
    Ollama,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    pub backend: DetectorKind,
    /// Input size override; each backend has its own default.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub threshold: f32,
    /// One label per line. Falls back to the COCO classes.
    pub labels_path: Option<PathBuf>,
    /// Artificial per-inference delay for the synthetic device.
    pub device_latency_ms: u64,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            backend: DetectorKind::Simulated,
            width: None,
            height: None,
            threshold: 0.5,
            labels_path: None,
            device_latency_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DescriberSettings {
    pub backend: DescriberKind,
    pub max_side: Option<u32>,
    /// Delay of the simulated backend.
    pub delay_ms: u64,
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for DescriberSettings {
    fn default() -> Self {
        Self {
            backend: DescriberKind::Simulated,
            max_side: None,
            delay_ms: 3000,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: String,
    pub detector: DetectorSettings,
    pub describer: DescriberSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            detector: DetectorSettings::default(),
            describer: DescriberSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (or an optional `scene-gate.*` file in the
    /// working directory), overridden by `SCENE_GATE__SECTION__KEY` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Self = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.max_log_level()?;
        Ok(settings)
    }

    /// `log_level` as a tracing level. Accepts the level names in any case.
    pub fn max_log_level(&self) -> Result<Level, ConfigError> {
        self.log_level.parse::<Level>().map_err(|_| {
            ConfigError::Message(format!("invalid log_level {:?}", self.log_level))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_use_simulated_backends() {
        let settings = Settings::default();
        assert_eq!(settings.detector.backend, DetectorKind::Simulated);
        assert_eq!(settings.describer.backend, DescriberKind::Simulated);
        assert_eq!(settings.describer.delay_ms, 3000);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let settings = from_toml(
            r#"
            [detector]
            backend = "accelerator"
            threshold = 0.25

            [describer]
            backend = "ollama"
            model = "llava"
            "#,
        );
        assert_eq!(settings.detector.backend, DetectorKind::Accelerator);
        assert_eq!(settings.detector.threshold, 0.25);
        assert_eq!(settings.detector.width, None);
        assert_eq!(settings.describer.backend, DescriberKind::Ollama);
        assert_eq!(settings.describer.model, "llava");
        assert_eq!(settings.describer.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result: Result<Settings, _> = Config::builder()
            .add_source(File::from_str(
                "[detector]\nbackend = \"gpu\"",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize();
        assert!(result.is_err());
    }

    #[test]
    fn log_level_is_parsed_case_insensitively() {
        let settings = from_toml("log_level = \"DEBUG\"");
        assert_eq!(settings.max_log_level().unwrap(), Level::DEBUG);
        assert_eq!(Settings::default().max_log_level().unwrap(), Level::INFO);
    }

    #[test]
    fn unknown_log_level_is_rejected_on_load() {
        let path = std::env::temp_dir().join(format!("scene-gate-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "log_level = \"loud\"\n").unwrap();
        let result = Settings::load(Some(&path));
        std::fs::remove_file(&path).unwrap();

        match result {
            Err(ConfigError::Message(message)) => assert!(message.contains("loud")),
            other => panic!("expected a log level error, got {:?}", other),
        }
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/scene-gate.toml"))).is_err());
    }
}
