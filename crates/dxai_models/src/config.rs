//! Model hyper-parameters.

use std::path::Path;

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::vlm::DentalVlm;

/// Configuration of [`DentalVlm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DentalVlmConfig {
    /// Square input side length in pixels.
    pub image_size: usize,
    /// Patch side length; `image_size` must be a multiple of it.
    pub patch_size: usize,
    /// Vision tower width.
    pub vision_dim: usize,
    /// Vision tower depth.
    pub vision_layers: usize,
    /// Vision attention heads.
    pub vision_heads: usize,
    /// Vision MLP hidden width.
    pub vision_mlp_dim: usize,
    /// Language decoder width.
    pub text_dim: usize,
    /// Language decoder depth.
    pub text_layers: usize,
    /// Language attention heads.
    pub text_heads: usize,
    /// Language MLP hidden width.
    pub text_mlp_dim: usize,
    /// Vocabulary size; must match the tokenizer.
    pub vocab_size: usize,
    /// Maximum multimodal sequence length.
    pub max_positions: usize,
}

impl Default for DentalVlmConfig {
    fn default() -> Self {
        Self {
            image_size: 336,
            patch_size: 14,
            vision_dim: 256,
            vision_layers: 4,
            vision_heads: 4,
            vision_mlp_dim: 1024,
            text_dim: 256,
            text_layers: 4,
            text_heads: 4,
            text_mlp_dim: 1024,
            vocab_size: 4096,
            max_positions: 1024,
        }
    }
}

impl DentalVlmConfig {
    /// Default architecture for a given vocabulary.
    pub fn new(vocab_size: usize) -> Self {
        Self {
            vocab_size,
            ..Default::default()
        }
    }

    /// A very small model, handy for smoke runs and tests.
    pub fn tiny(vocab_size: usize) -> Self {
        Self {
            image_size: 32,
            patch_size: 8,
            vision_dim: 16,
            vision_layers: 1,
            vision_heads: 2,
            vision_mlp_dim: 32,
            text_dim: 16,
            text_layers: 1,
            text_heads: 2,
            text_mlp_dim: 32,
            vocab_size,
            max_positions: 128,
        }
    }

    /// Patches per side.
    pub fn grid_size(&self) -> usize {
        self.image_size / self.patch_size
    }

    /// Number of image positions inserted into the language sequence.
    pub fn n_image_tokens(&self) -> usize {
        self.grid_size() * self.grid_size()
    }

    /// Check structural constraints.
    pub fn validate(&self) -> Result<()> {
        if self.patch_size == 0 || self.image_size % self.patch_size != 0 {
            return Err(ModelError::InvalidConfig(format!(
                "image_size {} is not a multiple of patch_size {}",
                self.image_size, self.patch_size
            )));
        }
        if self.vision_heads == 0 || self.vision_dim % self.vision_heads != 0 {
            return Err(ModelError::InvalidConfig(format!(
                "vision_dim {} is not divisible by {} heads",
                self.vision_dim, self.vision_heads
            )));
        }
        if self.text_heads == 0 || self.text_dim % self.text_heads != 0 {
            return Err(ModelError::InvalidConfig(format!(
                "text_dim {} is not divisible by {} heads",
                self.text_dim, self.text_heads
            )));
        }
        if self.vocab_size == 0 {
            return Err(ModelError::InvalidConfig("vocab_size is zero".into()));
        }
        if self.max_positions <= self.n_image_tokens() {
            return Err(ModelError::InvalidConfig(format!(
                "max_positions {} leaves no room after {} image tokens",
                self.max_positions,
                self.n_image_tokens()
            )));
        }
        Ok(())
    }

    /// Read a config from JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Initialize a model with random weights.
    pub fn init<B: Backend>(&self, device: &B::Device) -> DentalVlm<B> {
        DentalVlm::new(self, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let config = DentalVlmConfig::default();
        assert_eq!(config.grid_size(), 24);
        assert_eq!(config.n_image_tokens(), 576);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tiny_is_valid() {
        let config = DentalVlmConfig::tiny(40);
        assert_eq!(config.grid_size(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_patch() {
        let mut config = DentalVlmConfig::tiny(40);
        config.patch_size = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_heads() {
        let mut config = DentalVlmConfig::tiny(40);
        config.text_heads = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_positions() {
        let mut config = DentalVlmConfig::tiny(40);
        config.max_positions = 16;
        assert!(config.validate().is_err());
    }
}
