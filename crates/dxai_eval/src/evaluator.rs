//! The evaluation runner.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dxai_analysis::{heatmap_keywords, is_mentioned};
use dxai_core::{
    build_xai_prompt, CaseResult, EvalConfig, NarrativeModel, XaiExplanation, NOT_AVAILABLE,
};
use dxai_data::{discover_cases, load_rgb, prepare_output_dirs, write_result, CaseFile, OutputDirs};
use dxai_viz::save_overlay;
use image::RgbImage;

use crate::artifacts::{score_result, write_summaries};
use crate::error::Result;
use crate::observer::{CaseContext, EvalObserver, ObserverList};
use crate::summary::RunSummary;

/// File name of a heatmap overlay.
///
/// Spaces in the keyword become underscores; keywords the narrative does not
/// mention get an `_omitted` suffix.
pub fn heatmap_file_name(case_name: &str, keyword: &str, mentioned: bool, extension: &str) -> String {
    let keyword = keyword.replace(' ', "_");
    let suffix = if mentioned { "" } else { "_omitted" };
    format!("{case_name}_heatmap_{keyword}{suffix}.{extension}")
}

/// Radiograph path of a case.
///
/// Relative paths are taken as given first, then relative to the directory
/// of the ground-truth file.
pub fn resolve_image_path(case: &CaseFile) -> Option<PathBuf> {
    let raw = case.ground_truth.image_path.as_deref()?.trim();
    if raw.is_empty() {
        return None;
    }
    let path = PathBuf::from(raw);
    if path.exists() || path.is_absolute() {
        return Some(path);
    }
    let sibling = case.path.parent().map(|dir| dir.join(&path));
    match sibling {
        Some(candidate) if candidate.exists() => Some(candidate),
        _ => Some(path),
    }
}

/// Runs a [`NarrativeModel`] over every case of a data directory.
///
/// # Example
///
/// ```rust,ignore
/// let mut evaluator = Evaluator::new(config, model).with_observer(ProgressObserver::new());
/// let summary = evaluator.run()?;
/// ```
pub struct Evaluator<M: NarrativeModel> {
    config: EvalConfig,
    model: M,
    observers: ObserverList,
}

impl<M: NarrativeModel> Evaluator<M> {
    /// Create an evaluator without observers.
    pub fn new(config: EvalConfig, model: M) -> Self {
        Self {
            config,
            model,
            observers: ObserverList::new(),
        }
    }

    /// Add an observer.
    #[must_use]
    pub fn with_observer<O: EvalObserver + 'static>(mut self, observer: O) -> Self {
        self.observers.add(observer);
        self
    }

    /// Run configuration.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Give back the wrapped model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// Evaluate every case, then render the summaries if enabled.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.config.validate()?;
        let dirs = prepare_output_dirs(&self.config.output_dir)?;
        let cases = discover_cases(&self.config.eval_data_dir)?;

        let mut summary = RunSummary {
            cases_found: cases.len(),
            ..RunSummary::default()
        };
        self.observers.on_run_start(cases.len())?;

        for (index, case) in cases.iter().enumerate() {
            let ctx = CaseContext {
                case_name: &case.name,
                index,
                n_cases: cases.len(),
            };
            self.observers.on_case_start(&ctx)?;

            let Some(image_path) = resolve_image_path(case).filter(|p| p.is_file()) else {
                let shown = case.ground_truth.image_path.as_deref().unwrap_or("None");
                tracing::warn!("Image for {} not found at {}. Skipping.", case.name, shown);
                self.observers
                    .on_case_skipped(&ctx, &format!("image not found at {shown}"))?;
                summary.cases_skipped += 1;
                continue;
            };

            let result = self.evaluate_case(&ctx, case, &image_path, &dirs, &mut summary)?;
            let path = write_result(&dirs.results, &result)?;
            tracing::info!("Saved results to {}", path.display());
            summary.result_files.push(path);
            summary.cases_evaluated += 1;
            self.observers.on_case_end(&ctx, &result)?;
        }

        if self.config.create_summary && summary.cases_evaluated > 0 {
            let (files, report) =
                write_summaries(&dirs.results, &dirs.root, &self.config.keywords)?;
            tracing::info!("\n{}", report.to_string_table());
            summary.summary_files = Some(files);
            summary.report = Some(report);
        }

        self.observers.on_run_end(&summary)?;
        Ok(summary)
    }

    fn evaluate_case(
        &mut self,
        ctx: &CaseContext<'_>,
        case: &CaseFile,
        image_path: &Path,
        dirs: &OutputDirs,
        summary: &mut RunSummary,
    ) -> Result<CaseResult> {
        let gt = &case.ground_truth;
        let seed = self.config.seed.derive(&case.name);
        let generated =
            self.model
                .generate_narrative(image_path, &self.config.instruction, seed);

        let narrative = match &generated {
            Ok(text) => text.clone(),
            Err(e) => e.to_string(),
        };
        self.observers.on_narrative(ctx, &narrative)?;

        let mut result = CaseResult {
            case_name: case.name.clone(),
            image_path: image_path.display().to_string(),
            ground_truth_path: case.path.display().to_string(),
            analysis_focus: gt
                .analysis_focus
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            generated_narrative: narrative.clone(),
            expert_narrative: gt
                .expert_narrative
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            xai_explanations: BTreeMap::new(),
            rouge_scores: None,
        };

        if generated.is_err() {
            tracing::warn!("Narrative generation failed for {}. Skipping XAI.", case.name);
            summary.narratives_failed += 1;
            return Ok(result);
        }

        result.rouge_scores = score_result(&result);

        if self.config.generate_heatmaps {
            result.xai_explanations =
                self.explain_case(ctx, case, image_path, &narrative, dirs, summary)?;
        }
        Ok(result)
    }

    fn explain_case(
        &mut self,
        ctx: &CaseContext<'_>,
        case: &CaseFile,
        image_path: &Path,
        narrative: &str,
        dirs: &OutputDirs,
        summary: &mut RunSummary,
    ) -> Result<BTreeMap<String, XaiExplanation>> {
        let expected = case.ground_truth.expected_keywords();
        let keywords = heatmap_keywords(narrative, &expected, &self.config.keywords);
        tracing::info!("Generating heatmaps for keywords: {:?}", keywords);

        let full_text = build_xai_prompt(&self.config.instruction, narrative);
        let mut radiograph: Option<RgbImage> = None;
        let mut explanations = BTreeMap::new();

        for keyword in keywords {
            let Some(heatmap) = self.model.keyword_heatmap(image_path, &full_text, &keyword) else {
                tracing::info!("No heatmap for '{}'", keyword);
                summary.heatmaps_failed += 1;
                continue;
            };
            let heatmap = heatmap.normalized();

            if radiograph.is_none() {
                match load_rgb(image_path) {
                    Ok(image) => radiograph = Some(image),
                    Err(e) => {
                        tracing::warn!("Could not load {} for overlays: {}", image_path.display(), e);
                        summary.heatmaps_failed += 1;
                        break;
                    }
                }
            }
            let Some(image) = radiograph.as_ref() else {
                break;
            };

            let mentioned = is_mentioned(&keyword, narrative);
            let file_name =
                heatmap_file_name(&case.name, &keyword, mentioned, &self.config.heatmap_extension);
            let path = dirs.heatmaps.join(file_name);

            if let Err(e) = save_overlay(&path, image, &heatmap, self.config.overlay_alpha) {
                tracing::warn!("Could not save heatmap for '{}': {}", keyword, e);
                summary.heatmaps_failed += 1;
                continue;
            }

            self.observers.on_heatmap(ctx, &keyword, &path)?;
            summary.heatmaps_written += 1;
            explanations.insert(
                keyword,
                XaiExplanation {
                    path: path.display().to_string(),
                    mentioned_in_narrative: mentioned,
                },
            );
        }

        Ok(explanations)
    }
}
