//! The full vision-language model.

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::config::DentalVlmConfig;
use crate::error::{ModelError, Result};
use crate::language::{LanguageDecoder, Projector};
use crate::vision::VisionTower;

/// Weights replaced by a fine-tuning adapter.
///
/// The vision tower stays frozen; the projector and the language decoder are
/// what the dental fine-tune changes.
#[derive(Module, Debug)]
pub struct VlmAdapter<B: Backend> {
    /// Multimodal projector.
    pub projector: Projector<B>,
    /// Language decoder.
    pub decoder: LanguageDecoder<B>,
}

/// Vision-language model writing narratives about radiographs.
///
/// The forward pass is available in one piece ([`DentalVlm::forward`]) or
/// split at the vision tower output ([`DentalVlm::vision_features`] +
/// [`DentalVlm::forward_from_features`]), which is how saliency maps get
/// gradients with respect to that layer.
#[derive(Module, Debug)]
pub struct DentalVlm<B: Backend> {
    /// Vision tower.
    pub vision: VisionTower<B>,
    /// Multimodal projector.
    pub projector: Projector<B>,
    /// Language decoder.
    pub decoder: LanguageDecoder<B>,
}

impl<B: Backend> DentalVlm<B> {
    /// Create a model with random weights.
    pub fn new(config: &DentalVlmConfig, device: &B::Device) -> Self {
        Self {
            vision: VisionTower::new(config, device),
            projector: Projector::new(config, device),
            decoder: LanguageDecoder::new(config, device),
        }
    }

    /// Copy of the fine-tunable part.
    pub fn adapter(&self) -> VlmAdapter<B> {
        VlmAdapter {
            projector: self.projector.clone(),
            decoder: self.decoder.clone(),
        }
    }

    /// Replace the fine-tunable part.
    #[must_use]
    pub fn with_adapter(mut self, adapter: VlmAdapter<B>) -> Self {
        self.projector = adapter.projector;
        self.decoder = adapter.decoder;
        self
    }

    /// Output of the vision tower: (1, n_patches, vision_dim).
    pub fn vision_features(&self, pixels: Tensor<B, 4>) -> Tensor<B, 3> {
        self.vision.forward(pixels)
    }

    /// Length of the multimodal sequence for a token prompt.
    ///
    /// The first image placeholder is swapped for all image positions; without
    /// a placeholder the image positions are prepended.
    pub fn sequence_len(tokens: &[u32], image_token_id: u32, n_image_tokens: usize) -> usize {
        if tokens.contains(&image_token_id) {
            tokens.len() - 1 + n_image_tokens
        } else {
            tokens.len() + n_image_tokens
        }
    }

    fn embed(&self, tokens: &[u32], device: &B::Device) -> Tensor<B, 3> {
        let ids: Vec<i64> = tokens.iter().map(|&t| i64::from(t)).collect();
        let ids = Tensor::<B, 2, Int>::from_data(TensorData::new(ids, [1, tokens.len()]), device);
        self.decoder.embed_tokens(ids)
    }

    /// Logits for `tokens` given vision features.
    ///
    /// # Arguments
    ///
    /// * `features` - Vision tower output of shape (1, n_patches, vision_dim)
    /// * `tokens` - Prompt token ids, optionally containing the image placeholder
    /// * `image_token_id` - Id of the image placeholder
    ///
    /// # Returns
    ///
    /// Logits of shape (1, seq_len, vocab_size)
    pub fn forward_from_features(
        &self,
        features: Tensor<B, 3>,
        tokens: &[u32],
        image_token_id: u32,
    ) -> Result<Tensor<B, 3>> {
        let [_, n_image, _] = features.dims();
        let len = Self::sequence_len(tokens, image_token_id, n_image);
        let max = self.decoder.max_positions();
        if len > max {
            return Err(ModelError::SequenceTooLong { len, max });
        }

        let device = features.device();
        let image = self.projector.forward(features);

        let (prefix, suffix) = match tokens.iter().position(|&t| t == image_token_id) {
            Some(idx) => (&tokens[..idx], &tokens[idx + 1..]),
            None => (&tokens[..0], tokens),
        };

        let mut parts = Vec::with_capacity(3);
        if !prefix.is_empty() {
            parts.push(self.embed(prefix, &device));
        }
        parts.push(image);
        if !suffix.is_empty() {
            parts.push(self.embed(suffix, &device));
        }

        Ok(self.decoder.forward(Tensor::cat(parts, 1)))
    }

    /// Logits for an image and a token prompt.
    pub fn forward(&self, pixels: Tensor<B, 4>, tokens: &[u32], image_token_id: u32) -> Result<Tensor<B, 3>> {
        self.forward_from_features(self.vision_features(pixels), tokens, image_token_id)
    }
}
