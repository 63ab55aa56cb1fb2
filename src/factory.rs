use std::time::Duration;
use tracing::info;

use crate::analysis::Analyzer;
use crate::config::{DescriberKind, DescriberSettings, DetectorKind, DetectorSettings, Settings};
use crate::description::{Describer, OllamaBackend, SimulatedDescriptionBackend};
use crate::detection::{
    AcceleratorBackend, Detector, SimulatedDetectionBackend, SyntheticDevice, coco_labels,
    load_labels,
};
use crate::error::AppError;

pub fn build_detector(settings: &DetectorSettings) -> Result<Detector, AppError> {
    let detector = match settings.backend {
        DetectorKind::Simulated => Detector::new(Box::new(
            SimulatedDetectionBackend::new().with_input_size(
                settings.width.unwrap_or(300),
                settings.height.unwrap_or(300),
            ),
        )),
        DetectorKind::Accelerator => {
            let labels = match &settings.labels_path {
                Some(path) => load_labels(path)?,
                None => coco_labels(),
            };
            if labels.is_empty() {
                return Err(AppError::Backend("label list is empty".to_string()));
            }
            let mut device = SyntheticDevice::new(
                settings.width.unwrap_or(640),
                settings.height.unwrap_or(640),
                labels.len(),
            );
            if settings.device_latency_ms > 0 {
                device = device.with_latency(Duration::from_millis(settings.device_latency_ms));
            }
            Detector::new(Box::new(
                AcceleratorBackend::spawn(device, labels).with_threshold(settings.threshold),
            ))
        }
    };
    info!(
        "Using detection backend {} at {:?}",
        detector.backend_name(),
        detector.input_size()
    );
    Ok(detector)
}

pub fn build_describer(settings: &DescriberSettings) -> Result<Describer, AppError> {
    let describer = match settings.backend {
        DescriberKind::Simulated => {
            let mut backend = SimulatedDescriptionBackend::new()
                .with_delay(Duration::from_millis(settings.delay_ms));
            if let Some(max_side) = settings.max_side {
                backend = backend.with_max_side(max_side);
            }
            Describer::new(Box::new(backend))
        }
        DescriberKind::Ollama => {
            let mut backend = OllamaBackend::new(
                &settings.endpoint,
                &settings.model,
                Duration::from_secs(settings.timeout_secs),
            )
            .map_err(|e| AppError::Backend(e.to_string()))?;
            if let Some(max_side) = settings.max_side {
                backend = backend.with_max_side(max_side);
            }
            info!("Describing with Ollama model {}", backend.model());
            Describer::new(Box::new(backend))
        }
    };
    info!("Using description backend {}", describer.backend_name());
    Ok(describer)
}

pub fn build_analyzer(settings: &Settings) -> Result<Analyzer, AppError> {
    Ok(Analyzer::new(
        build_detector(&settings.detector)?,
        build_describer(&settings.describer)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_build_simulated_backends() {
        let analyzer = build_analyzer(&Settings::default()).unwrap();
        assert_eq!(analyzer.detector().backend_name(), "simulated");
        assert_eq!(analyzer.detector().input_size(), (300, 300));
        assert_eq!(analyzer.describer().backend_name(), "simulated");
    }

    #[test]
    fn accelerator_defaults_to_coco_at_640() {
        let settings = DetectorSettings {
            backend: DetectorKind::Accelerator,
            ..DetectorSettings::default()
        };
        let detector = build_detector(&settings).unwrap();
        assert_eq!(detector.backend_name(), "accelerator");
        assert_eq!(detector.input_size(), (640, 640));
    }

    #[test]
    fn missing_labels_file_fails() {
        let settings = DetectorSettings {
            backend: DetectorKind::Accelerator,
            labels_path: Some("/nonexistent/labels.txt".into()),
            ..DetectorSettings::default()
        };
        assert!(matches!(build_detector(&settings), Err(AppError::Io(_))));
    }

    #[test]
    fn ollama_describer_builds_without_network() {
        let settings = DescriberSettings {
            backend: DescriberKind::Ollama,
            ..DescriberSettings::default()
        };
        let describer = build_describer(&settings).unwrap();
        assert_eq!(describer.backend_name(), "ollama");
    }
}
