//! The burn-backed [`NarrativeModel`].

use std::path::{Path, PathBuf};

use burn::module::AutodiffModule;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use dxai_core::{GenerationSettings, Heatmap, NarrativeError, NarrativeModel, Seed};
use dxai_data::ImageProcessor;
use dxai_explain::KeywordExplainer;
use dxai_models::{load_pretrained, narrate, DentalVlm, DentalVlmConfig, Tokenizer};

use crate::error::Result;

/// Dental VLM with its tokenizer, preprocessing and explainer.
///
/// Narratives are generated on the inner (non-autodiff) backend; heatmaps
/// run on the autodiff backend so gradients reach the vision tower output.
pub struct VlmAssistant<B: AutodiffBackend> {
    model: DentalVlm<B>,
    inference: DentalVlm<B::InnerBackend>,
    tokenizer: Tokenizer,
    processor: ImageProcessor,
    generation: GenerationSettings,
    explainer: KeywordExplainer<B>,
    device: B::Device,
    pixels: Option<(PathBuf, Tensor<B, 4>)>,
}

impl<B: AutodiffBackend> VlmAssistant<B> {
    /// Wrap an initialized model.
    pub fn new(
        config: &DentalVlmConfig,
        model: DentalVlm<B>,
        tokenizer: Tokenizer,
        generation: GenerationSettings,
        device: B::Device,
    ) -> Self {
        Self {
            inference: model.valid(),
            model,
            tokenizer,
            processor: ImageProcessor::new(config.image_size),
            generation,
            explainer: KeywordExplainer::new(),
            device,
            pixels: None,
        }
    }

    /// Load a base model directory and an optional adapter.
    pub fn from_pretrained(
        base_dir: impl AsRef<Path>,
        adapter_dir: Option<&Path>,
        generation: GenerationSettings,
        device: B::Device,
    ) -> Result<Self> {
        let pretrained = load_pretrained::<B>(base_dir, adapter_dir, &device)?;
        Ok(Self::new(
            &pretrained.config,
            pretrained.model,
            pretrained.tokenizer,
            generation,
            device,
        ))
    }

    /// Tokenizer in use.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Sampling settings in use.
    pub fn generation(&self) -> &GenerationSettings {
        &self.generation
    }

    /// Preprocessed radiograph, reused while the path stays the same.
    fn pixels(&mut self, image_path: &Path) -> std::result::Result<Tensor<B, 4>, NarrativeError> {
        if let Some((path, pixels)) = &self.pixels {
            if path == image_path {
                return Ok(pixels.clone());
            }
        }
        if !image_path.is_file() {
            return Err(NarrativeError::ImageNotFound(image_path.display().to_string()));
        }
        let pixels = self
            .processor
            .preprocess::<B>(image_path, &self.device)
            .map_err(|e| NarrativeError::Generation(e.to_string()))?;
        self.pixels = Some((image_path.to_path_buf(), pixels.clone()));
        Ok(pixels)
    }
}

impl<B: AutodiffBackend> NarrativeModel for VlmAssistant<B> {
    fn generate_narrative(
        &mut self,
        image_path: &Path,
        instruction: &str,
        seed: Seed,
    ) -> std::result::Result<String, NarrativeError> {
        let pixels = self.pixels(image_path)?.inner();
        narrate(
            &self.inference,
            &self.tokenizer,
            pixels,
            instruction,
            &self.generation,
            seed,
        )
    }

    fn keyword_heatmap(&mut self, image_path: &Path, full_text: &str, keyword: &str) -> Option<Heatmap> {
        let pixels = match self.pixels(image_path) {
            Ok(pixels) => pixels,
            Err(e) => {
                tracing::warn!("Error computing heatmap for '{}': {}", keyword, e);
                return None;
            }
        };
        self.explainer
            .explain(&self.model, &self.tokenizer, pixels, full_text, keyword)
    }
}
