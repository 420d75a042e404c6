//! # dxai_data
//!
//! Input and output handling for dxai evaluation runs.
//!
//! This crate provides:
//! - Discovery of ground-truth case files in a data directory
//! - Reading and writing per-case result JSON files
//! - Output directory setup
//! - Radiograph loading and preprocessing into model-ready tensors
//!
//! ## Example
//!
//! ```rust,ignore
//! use dxai_data::{discover_cases, prepare_output_dirs};
//!
//! let dirs = prepare_output_dirs("evaluation_results/")?;
//! for case in discover_cases("evaluation_dataset/anterior_teeth/")? {
//!     println!("{} -> {:?}", case.name, case.ground_truth.image_path);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod cases;
mod error;
mod radiograph;
mod results;

pub use cases::{discover_cases, load_ground_truth, CaseFile};
pub use error::{DataError, Result};
pub use radiograph::{load_rgb, ImageProcessor};
pub use results::{
    load_results, prepare_output_dirs, read_result, result_file_name, write_result, OutputDirs,
};

/// Suffix of per-case result files.
pub const RESULT_SUFFIX: &str = "_result.json";
