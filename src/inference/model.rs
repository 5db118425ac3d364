use std::sync::Mutex;

use ndarray::Array4;
use tch::nn::ModuleT;
use tch::{CModule, Device, Kind, Tensor};

use crate::inference::{InferenceError, argmax};

/// Seam between handlers and the loaded image classifier, so handlers can be
/// exercised with fixed probability vectors in tests.
pub trait ImageClassifier: Send + Sync {
    /// Output dimension the model was trained with.
    fn class_count(&self) -> usize;

    /// Probability distribution over the known classes.
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}

pub trait CropPredictor: Send + Sync {
    /// Crop label for a fixed-order soil/climate feature vector.
    fn predict(&self, features: &[f32]) -> Result<String, InferenceError>;
}

/// TorchScript image classifier loaded once at startup.
pub struct TorchImageModel {
    module: Mutex<CModule>,
    device: Device,
    class_count: usize,
}

impl TorchImageModel {
    pub fn load(model_path: &str, class_count: usize) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let module = CModule::load_on_device(model_path, device)?;
        Ok(Self {
            module: Mutex::new(module),
            device,
            class_count,
        })
    }
}

impl ImageClassifier for TorchImageModel {
    fn class_count(&self) -> usize {
        self.class_count
    }

    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let flat = input
            .as_slice()
            .ok_or_else(|| InferenceError::Shape("non-contiguous input array".into()))?;
        let (batch, height, width, channels) = input.dim();
        let tensor = Tensor::from_slice(flat)
            .view([batch as i64, height as i64, width as i64, channels as i64])
            .to_device(self.device);

        let output = self.module.lock().unwrap().forward_t(&tensor, false);
        let output = output.softmax(-1, Kind::Float).view([-1]);
        let len = output.size()[0] as usize;
        let mut probs = vec![0.0f32; len];
        output.to_kind(Kind::Float).copy_data(&mut probs, len);
        Ok(probs)
    }
}

/// TorchScript tabular predictor plus its sidecar label list.
pub struct TorchCropModel {
    module: Mutex<CModule>,
    device: Device,
    labels: Vec<String>,
}

impl TorchCropModel {
    pub fn load(model_path: &str, labels_path: &str) -> Result<Self, InferenceError> {
        let device = Device::cuda_if_available();
        let module = CModule::load_on_device(model_path, device)?;
        let labels = load_labels(labels_path)?;
        Ok(Self {
            module: Mutex::new(module),
            device,
            labels,
        })
    }
}

impl CropPredictor for TorchCropModel {
    fn predict(&self, features: &[f32]) -> Result<String, InferenceError> {
        let tensor = Tensor::from_slice(features)
            .view([1, features.len() as i64])
            .to_device(self.device);

        let output = self.module.lock().unwrap().forward_t(&tensor, false);
        let output = output.to_kind(Kind::Float).view([-1]);
        let len = output.size()[0] as usize;
        let mut scores = vec![0.0f32; len];
        output.copy_data(&mut scores, len);

        let (index, _) = argmax(&scores).ok_or(InferenceError::EmptyOutput)?;
        self.labels
            .get(index)
            .cloned()
            .ok_or(InferenceError::InvalidOutput {
                index,
                bound: self.labels.len(),
            })
    }
}

fn load_labels(path: &str) -> Result<Vec<String>, InferenceError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| InferenceError::Labels(format!("{}: {}", path, e)))?;
    let labels: Vec<String> = contents
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if labels.is_empty() {
        return Err(InferenceError::Labels(format!("{}: no labels found", path)));
    }
    Ok(labels)
}
