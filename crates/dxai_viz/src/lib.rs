//! # dxai_viz
//!
//! Rendering for evaluation outputs.
//!
//! This crate provides:
//! - Jet, YlGnBu and keyword-status colormaps
//! - Heatmap resizing and overlay onto radiographs
//! - SVG rendering of the keyword coverage and ROUGE matrices
//! - CSV export of both matrices

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod colormap;
mod csv;
mod error;
mod overlay;
mod svg;

pub use csv::{coverage_csv, rouge_csv, save_coverage_csv, save_rouge_csv};
pub use error::{Result, VizError};
pub use overlay::{image_format, resize_heatmap, save_overlay, superimpose};
pub use svg::{
    coverage_svg, rouge_svg, save_coverage_svg, save_rouge_svg, COVERAGE_TITLE, ROUGE_TITLE,
};
