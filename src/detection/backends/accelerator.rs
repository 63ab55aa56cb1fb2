use async_trait::async_trait;
use image::RgbImage;
use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

use crate::common::Detection;
use crate::detection::backend::DetectionBackend;
use crate::detection::device::{InferenceDevice, OutputTensor};
use crate::error::{DetectError, DeviceError};

type DeviceOutput = Result<Vec<OutputTensor>, DeviceError>;

/// Input/output queues to the worker. Results carry no request id and come
/// back strictly in submission order.
struct QueuePair {
    input: Option<std_mpsc::Sender<RgbImage>>,
    output: mpsc::UnboundedReceiver<DeviceOutput>,
    // submitted but not yet collected
    pending: usize,
}

/// Backend for a single-capacity accelerator.
///
/// The device lives on a dedicated worker thread. Callers reach it through a
/// queue pair guarded by an async mutex that is held from submission until
/// the matching result is read, so concurrent callers wait their turn and
/// can never receive each other's results.
pub struct AcceleratorBackend {
    device_name: &'static str,
    width: u32,
    height: u32,
    threshold: f32,
    labels: Vec<String>,
    queues: Mutex<QueuePair>,
    worker: Option<JoinHandle<()>>,
}

impl AcceleratorBackend {
    pub fn spawn<D: InferenceDevice>(device: D, labels: Vec<String>) -> Self {
        let device_name = device.name();
        let (width, height) = device.input_size();
        let (input_tx, input_rx) = std_mpsc::channel::<RgbImage>();
        let (output_tx, output_rx) = mpsc::unbounded_channel::<DeviceOutput>();

        let worker = std::thread::spawn(move || run_worker(device, input_rx, output_tx));
        info!(
            "Started inference worker for device {} ({}x{}, {} labels)",
            device_name,
            width,
            height,
            labels.len()
        );

        Self {
            device_name,
            width,
            height,
            threshold: 0.5,
            labels,
            queues: Mutex::new(QueuePair {
                input: Some(input_tx),
                output: output_rx,
                pending: 0,
            }),
            worker: Some(worker),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Decode per-class output tensors into detections above the threshold.
    pub fn extract_detections(&self, outputs: &[OutputTensor]) -> Result<Vec<Detection>, DetectError> {
        let mut detections = Vec::new();
        for (class_idx, tensor) in outputs.iter().enumerate() {
            if tensor.shape.len() != 2 {
                return Err(DetectError::ContractViolation(format!(
                    "expected 2 dimensions in output {}, got {:?}",
                    class_idx, tensor.shape
                )));
            }
            let (rows, columns) = (tensor.shape[0], tensor.shape[1]);
            if columns < 5 {
                return Err(DetectError::ContractViolation(format!(
                    "expected at least 5 values per row in output {}, got {}",
                    class_idx, columns
                )));
            }
            if tensor.data.len() != rows * columns {
                return Err(DetectError::ContractViolation(format!(
                    "output {} has shape {:?} but {} values",
                    class_idx,
                    tensor.shape,
                    tensor.data.len()
                )));
            }

            for row in tensor.data.chunks_exact(columns) {
                let score = row[4];
                if score < self.threshold {
                    continue;
                }
                let class_name = self.labels.get(class_idx).ok_or_else(|| {
                    DetectError::ContractViolation(format!(
                        "output {} has no label ({} labels loaded)",
                        class_idx,
                        self.labels.len()
                    ))
                })?;
                detections.push(Detection::new(
                    [row[0], row[1], row[2], row[3]],
                    score,
                    class_idx as u32,
                    class_name.clone(),
                ));
            }
        }
        Ok(detections)
    }
}

fn run_worker<D: InferenceDevice>(
    mut device: D,
    input_rx: std_mpsc::Receiver<RgbImage>,
    output_tx: mpsc::UnboundedSender<DeviceOutput>,
) {
    if let Err(e) = device.warm_up() {
        error!("Inference device {} failed to warm up: {}", device.name(), e);
        return;
    }

    while let Ok(image) = input_rx.recv() {
        let outputs = device.infer(&image);
        if output_tx.send(outputs).is_err() {
            warn!("Result queue closed, stopping inference worker");
            break;
        }
    }
    debug!("Inference worker for {} exited", device.name());
}

#[async_trait]
impl DetectionBackend for AcceleratorBackend {
    fn name(&self) -> &'static str {
        "accelerator"
    }

    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    async fn detect_objects(&self, image: &RgbImage) -> Result<Vec<Detection>, DetectError> {
        let mut queues = self.queues.lock().await;

        // A caller dropped mid-flight leaves its result queued ahead of ours.
        while queues.pending > 0 {
            let _stale = queues
                .output
                .recv()
                .await
                .ok_or(DetectError::WorkerStopped)?;
            queues.pending -= 1;
            warn!("Discarded stale inference result from an abandoned request");
        }

        queues
            .input
            .as_ref()
            .ok_or(DetectError::WorkerStopped)?
            .send(image.clone())
            .map_err(|_| DetectError::WorkerStopped)?;
        queues.pending += 1;

        let outputs = queues
            .output
            .recv()
            .await
            .ok_or(DetectError::WorkerStopped)?;
        queues.pending -= 1;
        drop(queues);

        self.extract_detections(&outputs?)
    }
}

fn join_worker(worker: JoinHandle<()>, device_name: &'static str) {
    if worker.join().is_err() {
        error!("Inference worker for {} panicked", device_name);
    }
}

impl Drop for AcceleratorBackend {
    fn drop(&mut self) {
        // Closing the input queue ends the worker loop once the current inference returns.
        self.queues.get_mut().input.take();
        let Some(worker) = self.worker.take() else {
            return;
        };
        let device_name = self.device_name;
        match tokio::runtime::Handle::try_current() {
            // Never park an executor thread on a running inference.
            Ok(handle) => {
                handle.spawn_blocking(move || join_worker(worker, device_name));
            }
            Err(_) => join_worker(worker, device_name),
        }
    }
}
