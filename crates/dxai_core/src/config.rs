//! Evaluation run configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::keywords::KeywordVocabulary;
use crate::seed::Seed;

/// Instruction given to the model for every radiograph.
pub const DEFAULT_INSTRUCTION: &str = "You are an expert specializing in dentistry. \
Describe the condition of the anterior teeth in this dentistry with clinical accuracy, \
mentioning any anatomy, pathology, or restorations.";

/// Sampling settings for narrative generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Maximum number of tokens appended to the prompt.
    pub max_new_tokens: usize,
    /// Sample from the distribution instead of taking the argmax.
    pub do_sample: bool,
    /// Softmax temperature.
    pub temperature: f32,
    /// Keep only the `top_k` most likely tokens (0 disables the filter).
    pub top_k: usize,
    /// Penalty applied to logits of tokens already in the sequence.
    pub repetition_penalty: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            do_sample: true,
            temperature: 0.7,
            top_k: 50,
            repetition_penalty: 1.2,
        }
    }
}

impl GenerationSettings {
    /// Greedy decoding with the same limits.
    #[must_use]
    pub fn greedy(mut self) -> Self {
        self.do_sample = false;
        self
    }

    /// Set the token budget.
    #[must_use]
    pub fn with_max_new_tokens(mut self, max_new_tokens: usize) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.do_sample && self.temperature <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "temperature must be positive when sampling, got {}",
                self.temperature
            )));
        }
        if self.repetition_penalty <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "repetition_penalty must be positive, got {}",
                self.repetition_penalty
            )));
        }
        Ok(())
    }
}

/// Configuration of an evaluation run.
///
/// Every field has a default, so a config file only needs the values it
/// changes:
///
/// ```json
/// { "eval_data_dir": "evaluation_dataset/posterior_teeth/", "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Directory with the base model (`config.json`, `tokenizer.json`, `model.mpk`).
    pub base_model_path: PathBuf,
    /// Directory with the fine-tuned adapter (`adapter.mpk`).
    pub adapter_path: Option<PathBuf>,
    /// Directory scanned for ground-truth `*.json` files.
    pub eval_data_dir: PathBuf,
    /// Root of all outputs.
    pub output_dir: PathBuf,
    /// Instruction placed in the user turn.
    pub instruction: String,
    /// Keywords considered for heatmaps and summaries.
    pub keywords: KeywordVocabulary,
    /// Narrative sampling settings.
    pub generation: GenerationSettings,
    /// Run seed; each case derives its own stream from it.
    pub seed: Seed,
    /// Heatmap weight when blending onto the radiograph.
    pub overlay_alpha: f32,
    /// File extension of heatmap overlays (`jpg` or `png`).
    pub heatmap_extension: String,
    /// Compute keyword heatmaps.
    pub generate_heatmaps: bool,
    /// Render the summary matrices after the run.
    pub create_summary: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            base_model_path: PathBuf::from("llava-1.5-7b-hf-bnb-4bit"),
            adapter_path: Some(PathBuf::from("adapter")),
            eval_data_dir: PathBuf::from("evaluation_dataset/anterior_teeth/"),
            output_dir: PathBuf::from("evaluation_results/"),
            instruction: DEFAULT_INSTRUCTION.to_string(),
            keywords: KeywordVocabulary::default(),
            generation: GenerationSettings::default(),
            seed: Seed::default(),
            overlay_alpha: 0.5,
            heatmap_extension: "jpg".to_string(),
            generate_heatmaps: true,
            create_summary: true,
        }
    }
}

impl EvalConfig {
    /// Load a config from a JSON file; missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.instruction.trim().is_empty() {
            return Err(CoreError::InvalidConfig("instruction is empty".into()));
        }
        if self.keywords.is_empty() {
            return Err(CoreError::InvalidConfig("keyword vocabulary is empty".into()));
        }
        if !(0.0..=1.0).contains(&self.overlay_alpha) {
            return Err(CoreError::InvalidConfig(format!(
                "overlay_alpha must be within [0, 1], got {}",
                self.overlay_alpha
            )));
        }
        match self.heatmap_extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" => {}
            other => {
                return Err(CoreError::InvalidConfig(format!(
                    "unsupported heatmap extension '{other}'"
                )))
            }
        }
        self.generation.validate()
    }

    /// Set the data directory.
    #[must_use]
    pub fn with_eval_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.eval_data_dir = dir.into();
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the run seed.
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = seed.into();
        self
    }
}
