//! Per-layer capture buffers for the explainer.

use std::collections::HashMap;

use burn::prelude::*;

/// Token features of shape (batch, tokens, dim) keyed by layer name.
///
/// Holds at most one tensor per layer; storing again replaces it.
#[derive(Debug, Clone)]
pub struct LayerCapture<B: Backend> {
    layers: HashMap<String, Tensor<B, 3>>,
}

/// Layer outputs seen during the forward pass.
pub type ActivationCapture<B> = LayerCapture<B>;

/// Gradients of the explained score with respect to layer outputs.
pub type GradientCapture<B> = LayerCapture<B>;

impl<B: Backend> LayerCapture<B> {
    /// Empty buffer.
    pub fn new() -> Self {
        Self {
            layers: HashMap::new(),
        }
    }

    /// Keep `features` for `layer`.
    pub fn store(&mut self, layer: &str, features: Tensor<B, 3>) {
        self.layers.insert(layer.to_string(), features);
    }

    /// Features captured for `layer`.
    pub fn get(&self, layer: &str) -> Option<&Tensor<B, 3>> {
        self.layers.get(layer)
    }

    /// Drop every captured layer.
    pub fn clear(&mut self) {
        self.layers.clear();
    }
}

impl<B: Backend> Default for LayerCapture<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    #[test]
    fn test_store_get_clear() {
        let device = Default::default();
        let mut capture: ActivationCapture<NdArray> = ActivationCapture::new();
        assert!(capture.get("vision_tower").is_none());

        capture.store("vision_tower", Tensor::zeros([1, 4, 2], &device));
        assert_eq!(capture.get("vision_tower").map(|t| t.dims()), Some([1, 4, 2]));

        capture.clear();
        assert!(capture.get("vision_tower").is_none());
    }

    #[test]
    fn test_store_replaces() {
        let device = Default::default();
        let mut capture: GradientCapture<NdArray> = GradientCapture::default();
        capture.store("vision_tower", Tensor::zeros([1, 4, 2], &device));
        capture.store("vision_tower", Tensor::ones([1, 9, 2], &device));

        assert_eq!(capture.get("vision_tower").map(|t| t.dims()), Some([1, 9, 2]));
    }
}
