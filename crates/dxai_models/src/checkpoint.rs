//! Base model directories and fine-tuned adapters on disk.
//!
//! Weights use burn's named MessagePack recorder at full precision. A base
//! directory holds the config, tokenizer and full weights; an adapter
//! directory holds only the fine-tuned projector and decoder.

use std::path::{Path, PathBuf};

use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};

use crate::config::DentalVlmConfig;
use crate::error::{ModelError, Result};
use crate::tokenizer::Tokenizer;
use crate::vlm::{DentalVlm, VlmAdapter};

/// Model config file name.
pub const CONFIG_FILE: &str = "config.json";
/// Tokenizer file name.
pub const TOKENIZER_FILE: &str = "tokenizer.json";
/// Full weights file name.
pub const WEIGHTS_FILE: &str = "model.mpk";
/// Adapter weights file name.
pub const ADAPTER_FILE: &str = "adapter.mpk";

/// A model together with its config and tokenizer.
#[derive(Debug)]
pub struct PretrainedVlm<B: Backend> {
    /// Architecture.
    pub config: DentalVlmConfig,
    /// Vocabulary.
    pub tokenizer: Tokenizer,
    /// Weights.
    pub model: DentalVlm<B>,
}

/// The recorder adds the extension itself.
fn record_path(dir: &Path, file: &str) -> PathBuf {
    dir.join(file).with_extension("")
}

/// Load a base model, optionally merged with a fine-tuned adapter.
pub fn load_pretrained<B: Backend>(
    base_dir: impl AsRef<Path>,
    adapter_dir: Option<&Path>,
    device: &B::Device,
) -> Result<PretrainedVlm<B>> {
    let base_dir = base_dir.as_ref();
    let config = DentalVlmConfig::load(base_dir.join(CONFIG_FILE))?;
    let tokenizer = Tokenizer::from_file(base_dir.join(TOKENIZER_FILE))?;

    if tokenizer.len() != config.vocab_size {
        return Err(ModelError::Checkpoint(format!(
            "tokenizer has {} tokens but the model expects {}",
            tokenizer.len(),
            config.vocab_size
        )));
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record: <DentalVlm<B> as Module<B>>::Record = recorder
        .load(record_path(base_dir, WEIGHTS_FILE), device)
        .map_err(|e| ModelError::Checkpoint(format!("Failed to load base weights: {}", e)))?;
    let mut model = config.init::<B>(device).load_record(record);
    tracing::info!("Loaded base model from {}", base_dir.display());

    if let Some(adapter_dir) = adapter_dir {
        let record: <VlmAdapter<B> as Module<B>>::Record = recorder
            .load(record_path(adapter_dir, ADAPTER_FILE), device)
            .map_err(|e| ModelError::Checkpoint(format!("Failed to load adapter: {}", e)))?;
        let adapter = model.adapter().load_record(record);
        model = model.with_adapter(adapter);
        tracing::info!("Applied adapter from {}", adapter_dir.display());
    }

    Ok(PretrainedVlm {
        config,
        tokenizer,
        model,
    })
}

/// Write config, tokenizer and full weights into `dir`.
pub fn save_pretrained<B: Backend>(
    dir: impl AsRef<Path>,
    config: &DentalVlmConfig,
    tokenizer: &Tokenizer,
    model: &DentalVlm<B>,
) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    config.save(dir.join(CONFIG_FILE))?;
    tokenizer.save(dir.join(TOKENIZER_FILE))?;

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(model.clone().into_record(), record_path(dir, WEIGHTS_FILE))
        .map_err(|e| ModelError::Checkpoint(format!("Failed to save model: {}", e)))
}

/// Write the fine-tunable weights of `model` into `dir`.
pub fn save_adapter<B: Backend>(dir: impl AsRef<Path>, model: &DentalVlm<B>) -> Result<()> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(model.adapter().into_record(), record_path(dir, ADAPTER_FILE))
        .map_err(|e| ModelError::Checkpoint(format!("Failed to save adapter: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray;

    fn logits(model: &DentalVlm<TestBackend>) -> Vec<f32> {
        let device = Default::default();
        let pixels = Tensor::<TestBackend, 4>::ones([1, 3, 32, 32], &device);
        model
            .forward(pixels, &[1, 4, 5], 4)
            .unwrap()
            .into_data()
            .to_vec::<f32>()
            .unwrap()
    }

    fn setup() -> (DentalVlmConfig, Tokenizer, DentalVlm<TestBackend>) {
        let tokenizer = Tokenizer::from_corpus(["caries on the incisor"]);
        let config = DentalVlmConfig::tiny(tokenizer.len());
        let model = config.init::<TestBackend>(&Default::default());
        (config, tokenizer, model)
    }

    #[test]
    fn test_save_and_load_pretrained() {
        let dir = tempfile::tempdir().unwrap();
        let (config, tokenizer, model) = setup();
        save_pretrained(dir.path(), &config, &tokenizer, &model).unwrap();
        assert!(dir.path().join(WEIGHTS_FILE).exists());

        let loaded = load_pretrained::<TestBackend>(dir.path(), None, &Default::default()).unwrap();
        assert_eq!(loaded.config, config);
        assert_eq!(loaded.tokenizer, tokenizer);

        let (a, b) = (logits(&model), logits(&loaded.model));
        assert!(a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-5));
    }

    #[test]
    fn test_adapter_replaces_decoder() {
        let base_dir = tempfile::tempdir().unwrap();
        let adapter_dir = tempfile::tempdir().unwrap();
        let (config, tokenizer, base) = setup();
        let tuned = config.init::<TestBackend>(&Default::default());

        save_pretrained(base_dir.path(), &config, &tokenizer, &base).unwrap();
        save_adapter(adapter_dir.path(), &tuned).unwrap();
        assert!(adapter_dir.path().join(ADAPTER_FILE).exists());

        let merged = load_pretrained::<TestBackend>(
            base_dir.path(),
            Some(adapter_dir.path()),
            &Default::default(),
        )
        .unwrap();
        let expected = base.with_adapter(tuned.adapter());

        let (a, b) = (logits(&expected), logits(&merged.model));
        assert!(a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-5));
    }

    #[test]
    fn test_vocab_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (_, tokenizer, model) = setup();
        let config = DentalVlmConfig::tiny(tokenizer.len() + 3);
        save_pretrained(dir.path(), &config, &tokenizer, &model).unwrap();

        assert!(matches!(
            load_pretrained::<TestBackend>(dir.path(), None, &Default::default()),
            Err(ModelError::Checkpoint(_))
        ));
    }

    #[test]
    fn test_missing_weights() {
        let dir = tempfile::tempdir().unwrap();
        let (config, tokenizer, _) = setup();
        config.save(dir.path().join(CONFIG_FILE)).unwrap();
        tokenizer.save(dir.path().join(TOKENIZER_FILE)).unwrap();

        assert!(load_pretrained::<TestBackend>(dir.path(), None, &Default::default()).is_err());
    }
}
