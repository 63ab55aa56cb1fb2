use std::collections::HashMap;

use crate::common::DetectedImage;

/// How many times each class name occurs in a set of detections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCounts(HashMap<String, usize>);

impl ClassCounts {
    pub fn of(image: &DetectedImage) -> Self {
        let mut counts = HashMap::new();
        for detection in image.detections() {
            *counts.entry(detection.class_name.clone()).or_insert(0) += 1;
        }
        Self(counts)
    }

    pub fn get(&self, class_name: &str) -> usize {
        self.0.get(class_name).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Whether `current` shows a different scene from `previous`.
///
/// Scenes are compared by the multiset of detected class names; box
/// positions, scores and detection order are ignored. Having no previous
/// scene always counts as different.
pub fn is_different(current: &DetectedImage, previous: Option<&DetectedImage>) -> bool {
    match previous {
        None => true,
        Some(previous) => ClassCounts::of(current) != ClassCounts::of(previous),
    }
}
