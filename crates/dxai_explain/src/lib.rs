//! # dxai_explain
//!
//! Saliency maps tying generated keywords to radiograph regions.
//!
//! This crate provides:
//! - Activation and gradient capture buffers for the target layer
//! - Grad-CAM attribution maps
//! - [`KeywordExplainer`], a keyword-conditioned Grad-CAM over the vision
//!   tower of a [`dxai_models::DentalVlm`]

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod activation;
mod attribution;
mod error;
mod explainer;

pub use activation::{ActivationCapture, GradientCapture, LayerCapture};
pub use attribution::{grad_cam, AttributionMap};
pub use error::{ExplainError, Result};
pub use explainer::{KeywordExplainer, VISION_TOWER_LAYER};
