//! Radiograph loading and preprocessing.

use std::path::Path;

use burn::prelude::*;
use image::imageops::FilterType;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

/// Decode an image file as 8-bit RGB.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| DataError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(img.to_rgb8())
}

/// Resizes and normalizes radiographs into `(1, 3, size, size)` tensors.
///
/// Defaults follow the CLIP preprocessing used by the vision tower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProcessor {
    /// Square side length fed to the vision tower.
    pub size: usize,
    /// Per-channel mean.
    pub mean: [f32; 3],
    /// Per-channel standard deviation.
    pub std: [f32; 3],
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self {
            size: 336,
            mean: [0.481_454_66, 0.457_827_5, 0.408_210_73],
            std: [0.268_629_54, 0.261_302_58, 0.275_777_11],
        }
    }
}

impl ImageProcessor {
    /// Processor with CLIP statistics for the given input size.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Channel-major normalized pixel values (`3 * size * size`).
    pub fn pixel_values(&self, image: &RgbImage) -> Result<Vec<f32>> {
        if self.size == 0 {
            return Err(DataError::InvalidInput("image size must be positive".into()));
        }
        if self.std.iter().any(|s| *s <= 0.0) {
            return Err(DataError::InvalidInput(format!(
                "std must be positive, got {:?}",
                self.std
            )));
        }

        let side = self.size as u32;
        let resized = image::imageops::resize(image, side, side, FilterType::Triangle);
        let plane = self.size * self.size;
        let mut values = vec![0.0f32; 3 * plane];

        for (x, y, pixel) in resized.enumerate_pixels() {
            let idx = y as usize * self.size + x as usize;
            for c in 0..3 {
                let v = f32::from(pixel[c]) / 255.0;
                values[c * plane + idx] = (v - self.mean[c]) / self.std[c];
            }
        }
        Ok(values)
    }

    /// Batch of one image as a `(1, 3, size, size)` tensor.
    pub fn to_tensor<B: Backend>(&self, image: &RgbImage, device: &B::Device) -> Result<Tensor<B, 4>> {
        let values = self.pixel_values(image)?;
        Ok(Tensor::<B, 1>::from_floats(values.as_slice(), device).reshape([
            1,
            3,
            self.size,
            self.size,
        ]))
    }

    /// Load and preprocess the image at `path`.
    pub fn preprocess<B: Backend>(&self, path: impl AsRef<Path>, device: &B::Device) -> Result<Tensor<B, 4>> {
        let image = load_rgb(path)?;
        self.to_tensor(&image, device)
    }
}
