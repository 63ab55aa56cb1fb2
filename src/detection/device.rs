use image::RgbImage;
use std::time::Duration;

use crate::detection::preprocessing::PADDING_COLOR;
use crate::error::DeviceError;

/// Raw output tensor handed back by an inference device.
///
/// Devices report detections grouped by class: tensor `i` holds the rows
/// for class `i`, shaped `[n, 5]` with rows `[ymin, xmin, ymax, xmax, score]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl OutputTensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self { shape, data }
    }

    pub fn empty_rows(columns: usize) -> Self {
        Self::new(vec![0, columns], Vec::new())
    }

    pub fn from_rows(rows: &[[f32; 5]]) -> Self {
        Self::new(
            vec![rows.len(), 5],
            rows.iter().flat_map(|r| r.iter().copied()).collect(),
        )
    }
}

/// Synchronous, single-capacity accelerator.
///
/// Devices are owned by exactly one worker thread and are never shared;
/// `infer` blocks that thread for the duration of one inference.
pub trait InferenceDevice: Send + 'static {
    fn name(&self) -> &'static str;

    fn input_size(&self) -> (u32, u32);

    fn infer(&mut self, image: &RgbImage) -> Result<Vec<OutputTensor>, DeviceError>;

    /// Optional warm-up hook, run once on the worker before the first request.
    fn warm_up(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// Deterministic software device.
///
/// Finds the non-padding region of the input, buckets its mean red value
/// into one of `classes` and reports a single detection for that class
/// covering the region.
pub struct SyntheticDevice {
    width: u32,
    height: u32,
    classes: usize,
    latency: Option<Duration>,
}

impl SyntheticDevice {
    pub fn new(width: u32, height: u32, classes: usize) -> Self {
        Self {
            width,
            height,
            classes: classes.max(1),
            latency: None,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Class bucket a given mean red value lands in.
    pub fn class_for_red(&self, red: u8) -> usize {
        red as usize * self.classes / 256
    }
}

impl InferenceDevice for SyntheticDevice {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn infer(&mut self, image: &RgbImage) -> Result<Vec<OutputTensor>, DeviceError> {
        let (width, height) = image.dimensions();
        if (width, height) != (self.width, self.height) {
            return Err(DeviceError::InputShape {
                width,
                height,
                expected_width: self.width,
                expected_height: self.height,
            });
        }

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let mut outputs: Vec<OutputTensor> =
            (0..self.classes).map(|_| OutputTensor::empty_rows(5)).collect();

        let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0u32, 0u32);
        let (mut red_sum, mut count) = (0u64, 0u64);
        for (x, y, pixel) in image.enumerate_pixels() {
            if *pixel == PADDING_COLOR {
                continue;
            }
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
            red_sum += pixel[0] as u64;
            count += 1;
        }

        if count == 0 {
            return Ok(outputs);
        }

        let mean_red = (red_sum / count) as u8;
        let class = self.class_for_red(mean_red);
        let row = [
            y0 as f32 / height as f32,
            x0 as f32 / width as f32,
            (y1 + 1) as f32 / height as f32,
            (x1 + 1) as f32 / width as f32,
            0.9,
        ];
        outputs[class] = OutputTensor::from_rows(&[row]);
        Ok(outputs)
    }
}
