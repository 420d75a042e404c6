//! # dxai
//!
//! Evaluation harness for vision-language models that describe dental
//! radiographs.
//!
//! dxai provides:
//!
//! - **Core**: records, prompt format, keyword vocabulary, run configuration
//! - **Data**: case discovery, result files, radiograph preprocessing
//! - **Models**: tokenizer, burn vision-language model, seeded generation,
//!   checkpoints and adapters
//! - **Explainability**: keyword-conditioned Grad-CAM over the vision tower
//! - **Analysis**: ROUGE, keyword coverage, evaluation report
//! - **Visualization**: heatmap overlays, SVG/CSV summary matrices
//! - **Evaluation**: the end-to-end runner
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dxai::prelude::*;
//! use burn_autodiff::Autodiff;
//! use burn_ndarray::NdArray;
//!
//! let config = EvalConfig::from_file("eval.json")?;
//! let model = VlmAssistant::<Autodiff<NdArray>>::from_pretrained(
//!     &config.base_model_path,
//!     config.adapter_path.as_deref(),
//!     config.generation.clone(),
//!     Default::default(),
//! )?;
//!
//! let summary = Evaluator::new(config, model)
//!     .with_observer(ProgressObserver::new())
//!     .run()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub use dxai_analysis as analysis;
pub use dxai_core as core;
pub use dxai_data as data;
pub use dxai_eval as eval;
pub use dxai_explain as explain;
pub use dxai_models as models;
pub use dxai_viz as viz;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use dxai::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use dxai_core::{
        build_prompt, build_xai_prompt, extract_response, CaseResult, EvalConfig,
        GenerationSettings, GroundTruthCase, Heatmap, KeywordVocabulary, NarrativeError,
        NarrativeModel, RougeScores, Seed,
    };

    // Data
    pub use dxai_data::{discover_cases, load_results, write_result, ImageProcessor};

    // Models
    pub use dxai_models::{load_pretrained, narrate, DentalVlm, DentalVlmConfig, Tokenizer};

    // Explain
    pub use dxai_explain::{grad_cam, AttributionMap, KeywordExplainer};

    // Analysis
    pub use dxai_analysis::{
        heatmap_keywords, rouge_scores, CoverageMatrix, EvaluationReport, KeywordStatus,
        RougeMatrix,
    };

    // Evaluation
    pub use dxai_eval::{EvalObserver, Evaluator, ProgressObserver, RunSummary, VlmAssistant};
}
