//! Keyword-conditioned Grad-CAM over the vision tower.

use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use dxai_core::{has_assistant_response, Heatmap};
use dxai_models::{DentalVlm, Tokenizer};

use crate::activation::{ActivationCapture, GradientCapture};
use crate::attribution::grad_cam;
use crate::error::{ExplainError, Result};

/// Name under which the vision tower output is captured.
pub const VISION_TOWER_LAYER: &str = "vision_tower";

/// Computes how strongly each image patch drives the prediction of a keyword.
///
/// The forward pass is split at the vision tower output. That output re-enters
/// the graph as a fresh leaf that requires gradients, so the gradient of the
/// leaf is the gradient flowing into the layer.
///
/// ```rust,ignore
/// let mut explainer = KeywordExplainer::new();
/// let full_text = build_xai_prompt(instruction, &narrative);
/// let heatmap = explainer.explain(&model, &tokenizer, pixels, &full_text, "caries");
/// ```
#[derive(Debug)]
pub struct KeywordExplainer<B: AutodiffBackend> {
    activations: ActivationCapture<B::InnerBackend>,
    gradients: GradientCapture<B::InnerBackend>,
}

impl<B: AutodiffBackend> KeywordExplainer<B> {
    /// Create an explainer with empty capture buffers.
    pub fn new() -> Self {
        Self {
            activations: ActivationCapture::new(),
            gradients: GradientCapture::new(),
        }
    }

    /// Vision tower output captured by the last computation.
    pub fn activations(&self) -> &ActivationCapture<B::InnerBackend> {
        &self.activations
    }

    /// Gradients captured by the last computation.
    pub fn gradients(&self) -> &GradientCapture<B::InnerBackend> {
        &self.gradients
    }

    /// Heatmap for `keyword` over the patch grid, values in [0, 1].
    ///
    /// Returns `None` when the text has no assistant response, the keyword
    /// does not tokenize, or the computation fails. Failures are logged.
    pub fn explain(
        &mut self,
        model: &DentalVlm<B>,
        tokenizer: &Tokenizer,
        pixels: Tensor<B, 4>,
        full_text: &str,
        keyword: &str,
    ) -> Option<Heatmap> {
        match self.try_explain(model, tokenizer, pixels, full_text, keyword) {
            Ok(heatmap) => Some(heatmap),
            Err(ExplainError::NoResponse) => {
                tracing::warn!("XAI prompt does not contain a valid narrative. Skipping heatmap.");
                None
            }
            Err(e) => {
                tracing::warn!("Error computing heatmap for '{}': {}", keyword, e);
                None
            }
        }
    }

    /// Fallible form of [`KeywordExplainer::explain`].
    pub fn try_explain(
        &mut self,
        model: &DentalVlm<B>,
        tokenizer: &Tokenizer,
        pixels: Tensor<B, 4>,
        full_text: &str,
        keyword: &str,
    ) -> Result<Heatmap> {
        self.activations.clear();
        self.gradients.clear();

        if !has_assistant_response(full_text) {
            return Err(ExplainError::NoResponse);
        }

        let target = tokenizer
            .encode(keyword, false)
            .last()
            .copied()
            .ok_or_else(|| ExplainError::EmptyKeyword(keyword.to_string()))?;
        let ids = tokenizer.encode(full_text, true);

        let features = model.vision_features(pixels).detach().require_grad();
        self.activations
            .store(VISION_TOWER_LAYER, features.clone().inner());

        let logits = model.forward_from_features(features.clone(), &ids, tokenizer.image_token_id())?;
        let [_, seq_len, _] = logits.dims();
        if seq_len < 2 {
            return Err(ExplainError::SequenceTooShort(seq_len));
        }

        let target_idx = target as usize;
        let score = logits
            .slice([0..1, seq_len - 2..seq_len - 1, target_idx..target_idx + 1])
            .sum();
        let grads = score.backward();
        let gradient = features
            .grad(&grads)
            .ok_or_else(|| ExplainError::MissingGradient(VISION_TOWER_LAYER.to_string()))?;
        self.gradients.store(VISION_TOWER_LAYER, gradient);

        self.heatmap(target)
    }

    fn heatmap(&self, target: u32) -> Result<Heatmap> {
        let missing = || ExplainError::MissingGradient(VISION_TOWER_LAYER.to_string());
        let activations = self.activations.get(VISION_TOWER_LAYER).ok_or_else(missing)?;
        let gradients = self.gradients.get(VISION_TOWER_LAYER).ok_or_else(missing)?;

        let map = grad_cam(to_grid(activations.clone())?, to_grid(gradients.clone())?)
            .with_target_token(target)
            .normalize();
        map.to_heatmap()
    }
}

impl<B: AutodiffBackend> Default for KeywordExplainer<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// (batch, tokens, dim) patch features -> (batch, dim, rows, cols).
fn to_grid<B: Backend>(tokens: Tensor<B, 3>) -> Result<Tensor<B, 4>> {
    let [batch, n_tokens, dim] = tokens.dims();
    let side = (n_tokens as f64).sqrt().round() as usize;
    if side * side != n_tokens {
        return Err(ExplainError::NonSquareGrid(n_tokens));
    }
    Ok(tokens.swap_dims(1, 2).reshape([batch, dim, side, side]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::{Distribution, TensorData};
    use burn_autodiff::Autodiff;
    use burn_ndarray::NdArray;
    use dxai_core::{build_prompt, build_xai_prompt};
    use dxai_models::DentalVlmConfig;

    type TestBackend = Autodiff<NdArray>;

    const INSTRUCTION: &str = "Describe the teeth.";

    fn setup() -> (Tokenizer, DentalVlm<TestBackend>, Tensor<TestBackend, 4>) {
        let device = Default::default();
        let tokenizer = Tokenizer::from_corpus([
            build_prompt(INSTRUCTION).as_str(),
            "Caries on the central incisor with a periapical lesion.",
        ]);
        let model = DentalVlmConfig::tiny(tokenizer.len()).init::<TestBackend>(&device);
        let pixels = Tensor::random([1, 3, 32, 32], Distribution::Normal(0.0, 1.0), &device);
        (tokenizer, model, pixels)
    }

    #[test]
    fn test_to_grid_row_major() {
        let tokens = Tensor::<NdArray, 3>::from_data(
            TensorData::new(vec![0.0f32, 10.0, 1.0, 11.0, 2.0, 12.0, 3.0, 13.0], [1, 4, 2]),
            &Default::default(),
        );
        let grid = to_grid(tokens).unwrap();
        assert_eq!(grid.dims(), [1, 2, 2, 2]);

        let values = grid.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn test_to_grid_non_square() {
        let tokens = Tensor::<NdArray, 3>::zeros([1, 6, 2], &Default::default());
        assert!(matches!(to_grid(tokens), Err(ExplainError::NonSquareGrid(6))));
    }

    #[test]
    fn test_heatmap_over_patch_grid() {
        let (tokenizer, model, pixels) = setup();
        let full_text = build_xai_prompt(INSTRUCTION, "Caries on the central incisor.");
        let mut explainer = KeywordExplainer::<TestBackend>::new();

        let heatmap = explainer
            .explain(&model, &tokenizer, pixels, &full_text, "caries")
            .expect("heatmap");

        assert_eq!(heatmap.width(), 4);
        assert_eq!(heatmap.height(), 4);
        assert!(heatmap.values().iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(
            explainer.gradients().get(VISION_TOWER_LAYER).map(|g| g.dims()),
            Some([1, 16, 16])
        );
    }

    #[test]
    fn test_multi_word_keyword_uses_last_token() {
        let (tokenizer, model, pixels) = setup();
        let full_text = build_xai_prompt(INSTRUCTION, "A periapical lesion.");
        let mut explainer = KeywordExplainer::<TestBackend>::new();

        assert!(explainer
            .explain(&model, &tokenizer, pixels, &full_text, "periapical lesion")
            .is_some());
    }

    fn gradient_values(explainer: &KeywordExplainer<TestBackend>) -> Vec<f32> {
        explainer
            .gradients()
            .get(VISION_TOWER_LAYER)
            .expect("gradient")
            .clone()
            .into_data()
            .to_vec::<f32>()
            .unwrap()
    }

    /// Gradient of `logits[0, position, target]` w.r.t. the vision features.
    fn logit_gradient(
        model: &DentalVlm<TestBackend>,
        tokenizer: &Tokenizer,
        pixels: Tensor<TestBackend, 4>,
        full_text: &str,
        target: u32,
        position_from_end: usize,
    ) -> Vec<f32> {
        let ids = tokenizer.encode(full_text, true);
        let features = model.vision_features(pixels).detach().require_grad();
        let logits = model
            .forward_from_features(features.clone(), &ids, tokenizer.image_token_id())
            .unwrap();
        let [_, seq_len, _] = logits.dims();
        let pos = seq_len - position_from_end;
        let t = target as usize;
        let grads = logits.slice([0..1, pos..pos + 1, t..t + 1]).sum().backward();
        features
            .grad(&grads)
            .unwrap()
            .into_data()
            .to_vec::<f32>()
            .unwrap()
    }

    fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
        assert_eq!(a.len(), b.len());
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f32::max)
    }

    #[test]
    fn test_backward_from_second_to_last_position() {
        let (tokenizer, model, pixels) = setup();
        let full_text = build_xai_prompt(INSTRUCTION, "A periapical lesion.");
        let target = tokenizer.token_id("lesion").unwrap();
        let mut explainer = KeywordExplainer::<TestBackend>::new();

        explainer
            .try_explain(&model, &tokenizer, pixels.clone(), &full_text, "lesion")
            .unwrap();
        let captured = gradient_values(&explainer);

        let expected = logit_gradient(&model, &tokenizer, pixels.clone(), &full_text, target, 2);
        assert!(max_abs_diff(&captured, &expected) < 1e-6);

        let last = logit_gradient(&model, &tokenizer, pixels, &full_text, target, 1);
        assert!(max_abs_diff(&captured, &last) > 1e-9);
    }

    #[test]
    fn test_target_is_last_keyword_token() {
        let (tokenizer, model, pixels) = setup();
        let full_text = build_xai_prompt(INSTRUCTION, "Caries on the central incisor.");
        let mut explainer = KeywordExplainer::<TestBackend>::new();

        explainer
            .try_explain(&model, &tokenizer, pixels.clone(), &full_text, "central incisor")
            .unwrap();
        let phrase = gradient_values(&explainer);

        explainer
            .try_explain(&model, &tokenizer, pixels.clone(), &full_text, "incisor")
            .unwrap();
        let last_word = gradient_values(&explainer);

        explainer
            .try_explain(&model, &tokenizer, pixels, &full_text, "central")
            .unwrap();
        let first_word = gradient_values(&explainer);

        assert!(max_abs_diff(&phrase, &last_word) < 1e-6);
        assert!(max_abs_diff(&phrase, &first_word) > 1e-9);
    }

    #[test]
    fn test_single_patch_grid_is_normalized() {
        let device = Default::default();
        let tokenizer = Tokenizer::from_corpus([
            build_prompt(INSTRUCTION).as_str(),
            "The crown has a periapical lesion.",
        ]);
        let config = DentalVlmConfig {
            image_size: 8,
            patch_size: 8,
            ..DentalVlmConfig::tiny(tokenizer.len())
        };
        let model = config.init::<TestBackend>(&device);
        let pixels = Tensor::random([1, 3, 8, 8], Distribution::Normal(0.0, 1.0), &device);
        let full_text = build_xai_prompt(INSTRUCTION, "The crown has a periapical lesion.");
        let mut explainer = KeywordExplainer::<TestBackend>::new();

        for keyword in ["lesion", "crown"] {
            let heatmap = explainer
                .explain(&model, &tokenizer, pixels.clone(), &full_text, keyword)
                .expect("heatmap");
            assert_eq!((heatmap.width(), heatmap.height()), (1, 1));
            let value = heatmap.values()[0];
            assert!(value == 0.0 || value == 1.0, "got {value}");
        }
    }

    #[test]
    fn test_captures_cleared_before_each_heatmap() {
        let (tokenizer, model, pixels) = setup();
        let full_text = build_xai_prompt(INSTRUCTION, "A periapical lesion.");
        let mut explainer = KeywordExplainer::<TestBackend>::new();

        assert!(explainer
            .explain(&model, &tokenizer, pixels.clone(), &full_text, "lesion")
            .is_some());
        assert!(explainer.activations().get(VISION_TOWER_LAYER).is_some());
        assert!(explainer.gradients().get(VISION_TOWER_LAYER).is_some());

        assert!(matches!(
            explainer.try_explain(&model, &tokenizer, pixels, "no markers here", "lesion"),
            Err(ExplainError::NoResponse)
        ));
        assert!(explainer.activations().get(VISION_TOWER_LAYER).is_none());
        assert!(explainer.gradients().get(VISION_TOWER_LAYER).is_none());
    }

    #[test]
    fn test_no_response_gives_none() {
        let (tokenizer, model, pixels) = setup();
        let mut explainer = KeywordExplainer::<TestBackend>::new();

        assert!(explainer
            .explain(&model, &tokenizer, pixels.clone(), &build_prompt(INSTRUCTION), "caries")
            .is_none());
        assert!(matches!(
            explainer.try_explain(&model, &tokenizer, pixels, "no markers here", "caries"),
            Err(ExplainError::NoResponse)
        ));
    }

    #[test]
    fn test_empty_keyword_gives_none() {
        let (tokenizer, model, pixels) = setup();
        let full_text = build_xai_prompt(INSTRUCTION, "Caries.");
        let mut explainer = KeywordExplainer::<TestBackend>::new();

        assert!(matches!(
            explainer.try_explain(&model, &tokenizer, pixels, &full_text, "  "),
            Err(ExplainError::EmptyKeyword(_))
        ));
    }
}
