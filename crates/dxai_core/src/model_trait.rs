//! The model seam used by the evaluation runner.

use std::path::Path;

use crate::error::NarrativeError;
use crate::heatmap::Heatmap;
use crate::seed::Seed;

/// A model that describes radiographs and explains its wording.
///
/// The runner only talks to this trait, so a burn-backed model and a
/// scripted stand-in are interchangeable.
pub trait NarrativeModel {
    /// Generate a narrative for the radiograph at `image_path`.
    ///
    /// # Arguments
    ///
    /// * `image_path` - Radiograph to describe
    /// * `instruction` - Text placed in the user turn
    /// * `seed` - Seed for this case's sampling stream
    fn generate_narrative(
        &mut self,
        image_path: &Path,
        instruction: &str,
        seed: Seed,
    ) -> Result<String, NarrativeError>;

    /// Saliency of the image regions behind `keyword`, given the full
    /// conversation text (prompt plus narrative).
    ///
    /// Returns `None` when no heatmap can be produced; failures are logged by
    /// the implementation.
    fn keyword_heatmap(&mut self, image_path: &Path, full_text: &str, keyword: &str)
        -> Option<Heatmap>;
}
