use image::imageops::{self, FilterType};
use ndarray::Array4;

use crate::inference::InferenceError;

pub const IMAGE_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;

/// Decodes uploaded image bytes and prepares them for the classifier:
/// RGB, 224x224 (no aspect-ratio preservation), values scaled to [0,1],
/// leading batch dimension of 1.
pub fn prepare_image(bytes: &[u8]) -> Result<Array4<f32>, InferenceError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded.to_rgb8();
    let resized = imageops::resize(&rgb, IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle);

    let mut batch = Array4::<f32>::zeros((1, IMAGE_SIZE as usize, IMAGE_SIZE as usize, CHANNELS));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..CHANNELS {
            batch[[0, y as usize, x as usize, channel]] = pixel[channel] as f32 / 255.0;
        }
    }

    Ok(batch)
}
