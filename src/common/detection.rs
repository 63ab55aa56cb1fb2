use serde::Serialize;

/// One localized, classified object produced by a detection backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Normalized `[ymin, xmin, ymax, xmax]`, each in `0..=1`.
    pub bbox: [f32; 4],
    pub score: f32,
    pub class_id: u32,
    pub class_name: String,
}

impl Detection {
    pub fn new(bbox: [f32; 4], score: f32, class_id: u32, class_name: impl Into<String>) -> Self {
        Self {
            bbox,
            score,
            class_id,
            class_name: class_name.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} {:.0}%", self.class_name, self.score * 100.0)
    }
}
