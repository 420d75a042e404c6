//! Vision tower.

use burn::nn::{
    conv::{Conv2d, Conv2dConfig},
    Embedding, EmbeddingConfig, LayerNorm, LayerNormConfig,
};
use burn::prelude::*;

use crate::config::DentalVlmConfig;
use crate::layers::{positions, EncoderLayer};

/// ViT-style encoder turning a radiograph into one feature vector per patch.
///
/// Its output (after the final layer norm) is the layer explained by the
/// saliency maps, so patch order is row-major over the patch grid.
#[derive(Module, Debug)]
pub struct VisionTower<B: Backend> {
    patch_embed: Conv2d<B>,
    position_embed: Embedding<B>,
    pre_norm: LayerNorm<B>,
    layers: Vec<EncoderLayer<B>>,
    post_norm: LayerNorm<B>,
}

impl<B: Backend> VisionTower<B> {
    /// Create a vision tower.
    pub fn new(config: &DentalVlmConfig, device: &B::Device) -> Self {
        let p = config.patch_size;
        let patch_embed = Conv2dConfig::new([3, config.vision_dim], [p, p])
            .with_stride([p, p])
            .with_bias(false)
            .init(device);
        let position_embed = EmbeddingConfig::new(config.n_image_tokens(), config.vision_dim).init(device);
        let layers = (0..config.vision_layers)
            .map(|_| {
                EncoderLayer::new(
                    config.vision_dim,
                    config.vision_heads,
                    config.vision_mlp_dim,
                    device,
                )
            })
            .collect();

        Self {
            patch_embed,
            position_embed,
            pre_norm: LayerNormConfig::new(config.vision_dim).init(device),
            layers,
            post_norm: LayerNormConfig::new(config.vision_dim).init(device),
        }
    }

    /// Forward pass.
    ///
    /// # Arguments
    ///
    /// * `pixels` - Normalized images of shape (batch, 3, H, W)
    ///
    /// # Returns
    ///
    /// Patch features of shape (batch, n_patches, vision_dim)
    pub fn forward(&self, pixels: Tensor<B, 4>) -> Tensor<B, 3> {
        let x = self.patch_embed.forward(pixels);
        let [batch, dim, gh, gw] = x.dims();
        let n_patches = gh * gw;
        let x = x.reshape([batch, dim, n_patches]).swap_dims(1, 2);

        let pos = positions::<B>(batch, n_patches, &x.device());
        let mut x = self.pre_norm.forward(x + self.position_embed.forward(pos));

        for layer in &self.layers {
            x = layer.forward(x, None);
        }
        self.post_norm.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    #[test]
    fn test_vision_tower_shape() {
        let device = Default::default();
        let config = DentalVlmConfig::tiny(10);
        let tower = VisionTower::<NdArray>::new(&config, &device);
        let pixels = Tensor::<NdArray, 4>::zeros([1, 3, 32, 32], &device);

        assert_eq!(tower.forward(pixels).dims(), [1, 16, 16]);
    }
}
