//! Shared transformer building blocks.

use burn::nn::{
    attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
    Gelu, LayerNorm, LayerNormConfig, Linear, LinearConfig,
};
use burn::prelude::*;

/// Pre-norm transformer layer: `x + attn(ln1(x))`, then `x + mlp(ln2(x))`.
#[derive(Module, Debug)]
pub struct EncoderLayer<B: Backend> {
    layer_norm1: LayerNorm<B>,
    self_attn: MultiHeadAttention<B>,
    layer_norm2: LayerNorm<B>,
    fc1: Linear<B>,
    fc2: Linear<B>,
    activation: Gelu,
}

impl<B: Backend> EncoderLayer<B> {
    /// Create a layer of width `d_model`.
    pub fn new(d_model: usize, n_heads: usize, d_mlp: usize, device: &B::Device) -> Self {
        Self {
            layer_norm1: LayerNormConfig::new(d_model).init(device),
            self_attn: MultiHeadAttentionConfig::new(d_model, n_heads)
                .with_dropout(0.0)
                .init(device),
            layer_norm2: LayerNormConfig::new(d_model).init(device),
            fc1: LinearConfig::new(d_model, d_mlp).init(device),
            fc2: LinearConfig::new(d_mlp, d_model).init(device),
            activation: Gelu::new(),
        }
    }

    /// Forward pass over `(batch, seq, d_model)`.
    ///
    /// `mask` marks positions that may not be attended to (`true` = masked).
    pub fn forward(&self, x: Tensor<B, 3>, mask: Option<Tensor<B, 3, Bool>>) -> Tensor<B, 3> {
        let h = self.layer_norm1.forward(x.clone());
        let mut input = MhaInput::self_attn(h);
        if let Some(mask) = mask {
            input = input.mask_attn(mask);
        }
        let x = x + self.self_attn.forward(input).context;

        let h = self.layer_norm2.forward(x.clone());
        let h = self.fc2.forward(self.activation.forward(self.fc1.forward(h)));
        x + h
    }
}

/// Position indices `0..len` as a `(batch, len)` tensor.
pub(crate) fn positions<B: Backend>(batch: usize, len: usize, device: &B::Device) -> Tensor<B, 2, Int> {
    Tensor::<B, 1, Int>::arange(0..len as i64, device)
        .reshape([1, len])
        .repeat_dim(0, batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::nn::attention::generate_autoregressive_mask;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_encoder_layer_shape() {
        let device = Default::default();
        let layer = EncoderLayer::<TestBackend>::new(8, 2, 16, &device);
        let x = Tensor::<TestBackend, 3>::ones([1, 5, 8], &device);
        assert_eq!(layer.forward(x, None).dims(), [1, 5, 8]);
    }

    #[test]
    fn test_encoder_layer_causal() {
        let device = Default::default();
        let layer = EncoderLayer::<TestBackend>::new(8, 2, 16, &device);
        let x = Tensor::<TestBackend, 3>::random(
            [1, 4, 8],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let mask = generate_autoregressive_mask::<TestBackend>(1, 4, &device);
        let full = layer.forward(x.clone(), Some(mask.clone()));

        // Output at position 0 must not depend on later positions.
        let prefix = layer.forward(x.slice([0..1, 0..1, 0..8]), Some(mask.slice([0..1, 0..1, 0..1])));
        let a: Vec<f32> = full.slice([0..1, 0..1, 0..8]).into_data().to_vec().unwrap();
        let b: Vec<f32> = prefix.into_data().to_vec().unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-4);
        }
    }

    #[test]
    fn test_positions() {
        let device = Default::default();
        let pos = positions::<TestBackend>(2, 3, &device);
        assert_eq!(pos.dims(), [2, 3]);
        let values: Vec<i64> = pos.into_data().to_vec().unwrap();
        assert_eq!(values, vec![0, 1, 2, 0, 1, 2]);
    }
}
