//! Multimodal projector and causal language decoder.

use burn::nn::{
    attention::generate_autoregressive_mask, Embedding, EmbeddingConfig, Gelu, LayerNorm,
    LayerNormConfig, Linear, LinearConfig,
};
use burn::prelude::*;

use crate::config::DentalVlmConfig;
use crate::layers::{positions, EncoderLayer};

/// Two-layer MLP mapping vision features into the language embedding space.
#[derive(Module, Debug)]
pub struct Projector<B: Backend> {
    linear_1: Linear<B>,
    activation: Gelu,
    linear_2: Linear<B>,
}

impl<B: Backend> Projector<B> {
    /// Create a projector.
    pub fn new(config: &DentalVlmConfig, device: &B::Device) -> Self {
        Self {
            linear_1: LinearConfig::new(config.vision_dim, config.text_dim).init(device),
            activation: Gelu::new(),
            linear_2: LinearConfig::new(config.text_dim, config.text_dim).init(device),
        }
    }

    /// (batch, n, vision_dim) -> (batch, n, text_dim)
    pub fn forward(&self, features: Tensor<B, 3>) -> Tensor<B, 3> {
        self.linear_2
            .forward(self.activation.forward(self.linear_1.forward(features)))
    }
}

/// Decoder-only language model over mixed image and token embeddings.
#[derive(Module, Debug)]
pub struct LanguageDecoder<B: Backend> {
    token_embed: Embedding<B>,
    position_embed: Embedding<B>,
    layers: Vec<EncoderLayer<B>>,
    norm: LayerNorm<B>,
    lm_head: Linear<B>,
    max_positions: usize,
}

impl<B: Backend> LanguageDecoder<B> {
    /// Create a decoder.
    pub fn new(config: &DentalVlmConfig, device: &B::Device) -> Self {
        let layers = (0..config.text_layers)
            .map(|_| {
                EncoderLayer::new(
                    config.text_dim,
                    config.text_heads,
                    config.text_mlp_dim,
                    device,
                )
            })
            .collect();

        Self {
            token_embed: EmbeddingConfig::new(config.vocab_size, config.text_dim).init(device),
            position_embed: EmbeddingConfig::new(config.max_positions, config.text_dim).init(device),
            layers,
            norm: LayerNormConfig::new(config.text_dim).init(device),
            lm_head: LinearConfig::new(config.text_dim, config.vocab_size)
                .with_bias(false)
                .init(device),
            max_positions: config.max_positions,
        }
    }

    /// Longest sequence the position table supports.
    pub fn max_positions(&self) -> usize {
        self.max_positions
    }

    /// Embed token ids: (batch, len) -> (batch, len, text_dim).
    pub fn embed_tokens(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        self.token_embed.forward(tokens)
    }

    /// Run the causal stack over embeddings and return logits
    /// of shape (batch, len, vocab_size).
    ///
    /// Callers must keep `len <= max_positions`.
    pub fn forward(&self, embeddings: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch, len, _] = embeddings.dims();
        let device = embeddings.device();

        let pos = positions::<B>(batch, len, &device);
        let mut x = embeddings + self.position_embed.forward(pos);
        let mask = generate_autoregressive_mask::<B>(batch, len, &device);

        for layer in &self.layers {
            x = layer.forward(x, Some(mask.clone()));
        }
        self.lm_head.forward(self.norm.forward(x))
    }
}
