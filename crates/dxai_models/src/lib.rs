//! # dxai_models
//!
//! The dental vision-language model used to write radiograph narratives.
//!
//! This crate provides:
//! - [`Tokenizer`] - word-level vocabulary with chat special tokens
//! - [`DentalVlm`] - vision tower, multimodal projector and causal language decoder
//! - [`generate`] / [`narrate`] - seeded autoregressive decoding with
//!   temperature, top-k and repetition penalty
//! - Checkpoint helpers for base model directories and fine-tuned adapters
//!
//! ## Model directory layout
//!
//! ```text
//! base_model/
//!   config.json      DentalVlmConfig
//!   tokenizer.json   vocabulary
//!   model.mpk        full weights
//! adapter/
//!   adapter.mpk      fine-tuned projector + language decoder weights
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use dxai_models::{load_pretrained, narrate};
//!
//! let vlm = load_pretrained::<NdArray>("base_model", Some("adapter".as_ref()), &device)?;
//! let text = narrate(&vlm.model, &vlm.tokenizer, pixels, instruction, &settings, seed)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checkpoint;
mod config;
mod error;
pub mod generation;
mod language;
mod layers;
mod tokenizer;
mod vision;
mod vlm;

pub use checkpoint::{
    load_pretrained, save_adapter, save_pretrained, PretrainedVlm, ADAPTER_FILE, CONFIG_FILE,
    TOKENIZER_FILE, WEIGHTS_FILE,
};
pub use config::DentalVlmConfig;
pub use error::{ModelError, Result};
pub use generation::{generate, narrate, select_next_token};
pub use language::{LanguageDecoder, Projector};
pub use layers::EncoderLayer;
pub use tokenizer::{Tokenizer, BOS_TOKEN, EOS_TOKEN, PAD_TOKEN, SPECIAL_TOKENS, UNK_TOKEN};
pub use vision::VisionTower;
pub use vlm::{DentalVlm, VlmAdapter};
