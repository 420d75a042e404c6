//! Grad-CAM attribution maps.

use burn::prelude::*;
use dxai_core::Heatmap;

use crate::error::{ExplainError, Result};

/// Attribution over a spatial grid, shape (batch, 1, height, width).
#[derive(Debug, Clone)]
pub struct AttributionMap<B: Backend> {
    /// Attribution values.
    pub values: Tensor<B, 4>,
    /// Token whose logit was explained.
    pub target_token: Option<u32>,
}

impl<B: Backend> AttributionMap<B> {
    /// Wrap attribution values.
    pub fn new(values: Tensor<B, 4>) -> Self {
        Self {
            values,
            target_token: None,
        }
    }

    /// Record the explained token.
    #[must_use]
    pub fn with_target_token(mut self, token: u32) -> Self {
        self.target_token = Some(token);
        self
    }

    /// Shape of the map.
    pub fn shape(&self) -> [usize; 4] {
        self.values.dims()
    }

    /// Min-max scale into [0, 1].
    ///
    /// A flat map becomes all ones when positive and all zeros otherwise.
    pub fn normalize(&self) -> Self {
        let min_val: f32 = self.values.clone().min().into_scalar().elem();
        let max_val: f32 = self.values.clone().max().into_scalar().elem();
        let range = max_val - min_val;

        let normalized = if range > 1e-8 {
            (self.values.clone() - min_val) / range
        } else if max_val > 0.0 {
            self.values.ones_like()
        } else {
            self.values.zeros_like()
        };

        Self {
            values: normalized,
            target_token: self.target_token,
        }
    }

    /// First batch item as a [`Heatmap`].
    pub fn to_heatmap(&self) -> Result<Heatmap> {
        let [_, _, height, width] = self.values.dims();
        let values = self
            .values
            .clone()
            .slice([0..1, 0..1, 0..height, 0..width])
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| ExplainError::Tensor(format!("{e:?}")))?;
        Ok(Heatmap::new(width, height, values)?)
    }
}

/// Grad-CAM over a convolution-shaped layer output.
///
/// # Arguments
///
/// * `activations` - Layer output (batch, channels, height, width)
/// * `gradients` - Gradient of the target score w.r.t. the layer output,
///   same shape
///
/// # Returns
///
/// Rectified map of shape (batch, 1, height, width). Channel weights are the
/// gradient mean over the batch and spatial dimensions.
pub fn grad_cam<B: Backend>(activations: Tensor<B, 4>, gradients: Tensor<B, 4>) -> AttributionMap<B> {
    // (B, C, H, W) -> (1, C, 1, 1)
    let weights = gradients.mean_dim(0).mean_dim(2).mean_dim(3);

    let weighted = activations * weights;
    let cam = weighted.sum_dim(1);

    AttributionMap::new(cam.clamp_min(0.0))
}
