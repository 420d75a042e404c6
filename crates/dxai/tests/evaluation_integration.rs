//! Integration tests for the evaluation pipeline.
//!
//! A scripted model covers the runner's bookkeeping; a tiny random burn model
//! covers the real generation and heatmap path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use image::{Rgb, RgbImage};
use serde_json::json;

use dxai::prelude::*;
use dxai_data::read_result;
use dxai_eval::{COVERAGE_FILE_STEM, ROUGE_FILE_STEM};
use dxai_models::save_pretrained;

type EvalBackend = Autodiff<NdArray>;

const TINY_INSTRUCTION: &str = "Describe the anterior teeth.";

/// Narratives keyed by image file name, heatmaps for every keyword but one.
struct ScriptedModel {
    narratives: HashMap<String, Result<String, NarrativeError>>,
    seeds: Vec<Seed>,
    heatmap_calls: Vec<(String, String)>,
    unexplainable: &'static str,
}

impl ScriptedModel {
    fn new() -> Self {
        Self {
            narratives: HashMap::new(),
            seeds: Vec::new(),
            heatmap_calls: Vec::new(),
            unexplainable: "fracture",
        }
    }

    fn with(mut self, image: &str, narrative: Result<&str, NarrativeError>) -> Self {
        self.narratives
            .insert(image.to_string(), narrative.map(str::to_string));
        self
    }
}

impl NarrativeModel for ScriptedModel {
    fn generate_narrative(
        &mut self,
        image_path: &Path,
        _instruction: &str,
        seed: Seed,
    ) -> Result<String, NarrativeError> {
        self.seeds.push(seed);
        let name = image_path.file_name().unwrap().to_str().unwrap();
        self.narratives
            .get(name)
            .cloned()
            .unwrap_or(Err(NarrativeError::Unparsable))
    }

    fn keyword_heatmap(&mut self, _image_path: &Path, full_text: &str, keyword: &str) -> Option<Heatmap> {
        self.heatmap_calls
            .push((full_text.to_string(), keyword.to_string()));
        if keyword == self.unexplainable {
            return None;
        }
        Some(Heatmap::from_rows(&[vec![0.0, 0.5], vec![0.5, 1.0]]).unwrap())
    }
}

fn write_image(path: &Path) {
    RgbImage::from_fn(24, 24, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 60]))
        .save(path)
        .unwrap();
}

fn write_case(dir: &Path, name: &str, value: serde_json::Value) {
    std::fs::write(dir.join(format!("{name}.json")), value.to_string()).unwrap();
}

struct Workspace {
    _tmp: tempfile::TempDir,
    data: PathBuf,
    out: PathBuf,
}

fn workspace() -> Workspace {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let out = tmp.path().join("out");
    std::fs::create_dir_all(&data).unwrap();

    for image in ["xray1.png", "xray3.png", "xray4.png"] {
        write_image(&data.join(image));
    }

    write_case(
        &data,
        "case_01",
        json!({
            "image_path": data.join("xray1.png"),
            "expert_narrative": "The crown is intact with a periapical lesion.",
            "key_keywords_expected": ["crown", "lesion", "periapical"],
            "analysis_focus": "anterior teeth"
        }),
    );
    write_case(
        &data,
        "case_02",
        json!({
            "image_path": data.join("missing.png"),
            "expert_narrative": "Normal."
        }),
    );
    write_case(
        &data,
        "case_03",
        json!({
            "image_path": "xray3.png",
            "expert_narrative": "Fracture of the incisor.",
            "key_keywords_expected": ["fracture"]
        }),
    );
    write_case(
        &data,
        "case_04",
        json!({
            "image_path": data.join("xray4.png"),
            "key_keywords_expected": ["fracture"]
        }),
    );

    Workspace {
        _tmp: tmp,
        data,
        out,
    }
}

fn config(ws: &Workspace) -> EvalConfig {
    let mut config = EvalConfig::default()
        .with_eval_data_dir(&ws.data)
        .with_output_dir(&ws.out)
        .with_seed(7u64);
    config.heatmap_extension = "png".to_string();
    config
}

#[test]
fn test_scripted_run_end_to_end() {
    let ws = workspace();
    let model = ScriptedModel::new()
        .with("xray1.png", Ok("The crown is intact."))
        .with("xray3.png", Err(NarrativeError::EmptyResponse))
        .with("xray4.png", Ok("Normal bone levels."));

    let mut evaluator = Evaluator::new(config(&ws), model).with_observer(ProgressObserver::new());
    let summary = evaluator.run().unwrap();

    assert_eq!(summary.cases_found, 4);
    assert_eq!(summary.cases_evaluated, 3);
    assert_eq!(summary.cases_skipped, 1);
    assert_eq!(summary.narratives_failed, 1);
    // case_01: crown, lesion, periapical; case_04: bone, normal written, fracture failed
    assert_eq!(summary.heatmaps_written, 5);
    assert_eq!(summary.heatmaps_failed, 1);

    let results = ws.out.join("results_json");
    assert!(!results.join("case_02_result.json").exists());

    let case_01 = read_result(results.join("case_01_result.json")).unwrap();
    assert_eq!(case_01.analysis_focus, "anterior teeth");
    assert_eq!(case_01.generated_narrative, "The crown is intact.");
    assert!(case_01.rouge_scores.unwrap().rouge1 > 0.0);
    assert_eq!(
        case_01.xai_explanations.keys().collect::<Vec<_>>(),
        vec!["crown", "lesion", "periapical"]
    );
    assert!(case_01.xai_explanations["crown"].mentioned_in_narrative);
    assert!(!case_01.xai_explanations["lesion"].mentioned_in_narrative);

    let heatmaps = ws.out.join("heatmaps");
    assert!(heatmaps.join("case_01_heatmap_crown.png").is_file());
    assert!(heatmaps.join("case_01_heatmap_lesion_omitted.png").is_file());
    assert!(heatmaps.join("case_04_heatmap_bone.png").is_file());
    assert!(!heatmaps.join("case_04_heatmap_fracture_omitted.png").exists());

    let case_03 = read_result(results.join("case_03_result.json")).unwrap();
    assert_eq!(
        case_03.generated_narrative,
        "Error: Model returned an empty response after 'ASSISTANT:'."
    );
    assert!(case_03.image_path.ends_with("xray3.png"));
    assert!(case_03.rouge_scores.is_none());
    assert!(case_03.xai_explanations.is_empty());

    let case_04 = read_result(results.join("case_04_result.json")).unwrap();
    assert_eq!(case_04.expert_narrative, "N/A");
    assert!(case_04.rouge_scores.is_none());

    let files = summary.summary_files.unwrap();
    assert_eq!(
        files.coverage_svg,
        Some(ws.out.join(format!("{COVERAGE_FILE_STEM}.svg")))
    );
    assert!(ws.out.join(format!("{COVERAGE_FILE_STEM}.csv")).is_file());
    assert!(ws.out.join(format!("{ROUGE_FILE_STEM}.svg")).is_file());

    let report = summary.report.unwrap();
    assert_eq!(report.cases, 3);
    assert_eq!(report.scored_cases, 1);
    assert_eq!(report.narratives_failed, 1);

    let model = evaluator.into_model();
    assert_eq!(model.seeds.len(), 3);
    assert_eq!(model.seeds[0], Seed::new(7).derive("case_01"));
    assert!(model
        .heatmap_calls
        .iter()
        .all(|(text, _)| text.ends_with("ASSISTANT: The crown is intact.")
            || text.ends_with("ASSISTANT: Normal bone levels.")));
}

#[test]
fn test_coverage_matrix_from_run() {
    let ws = workspace();
    let model = ScriptedModel::new()
        .with("xray1.png", Ok("The crown is intact."))
        .with("xray3.png", Ok("Fracture of the incisor."))
        .with("xray4.png", Ok("Normal bone levels."));

    let mut config = config(&ws);
    config.generate_heatmaps = false;
    let summary = Evaluator::new(config.clone(), model).run().unwrap();
    assert_eq!(summary.heatmaps_written, 0);

    let results: Vec<CaseResult> = load_results(ws.out.join("results_json"))
        .unwrap()
        .into_iter()
        .map(|(_, r)| r)
        .collect();
    let matrix = CoverageMatrix::from_results(&results, &config.keywords);

    assert_eq!(matrix.cases, vec!["case_01", "case_03", "case_04"]);
    assert_eq!(matrix.status("case_01", "crown"), Some(KeywordStatus::Mentioned));
    assert_eq!(matrix.status("case_01", "periapical"), Some(KeywordStatus::Omission));
    assert_eq!(matrix.status("case_03", "fracture"), Some(KeywordStatus::Mentioned));
    assert_eq!(matrix.status("case_04", "fracture"), Some(KeywordStatus::Omission));
    assert_eq!(matrix.status("case_04", "canine"), Some(KeywordStatus::NotApplicable));

    let csv = std::fs::read_to_string(ws.out.join(format!("{COVERAGE_FILE_STEM}.csv"))).unwrap();
    assert!(csv.starts_with("case,anterior,bone,canine,central incisor,crown"));
    assert_eq!(csv.lines().count(), 4);
}

#[test]
fn test_no_cases_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = EvalConfig::default()
        .with_eval_data_dir(tmp.path().join("empty"))
        .with_output_dir(tmp.path().join("out"));

    assert!(Evaluator::new(config, ScriptedModel::new()).run().is_err());
}

#[test]
fn test_tiny_model_run() {
    let ws = workspace();
    let instruction = TINY_INSTRUCTION;
    let tokenizer = Tokenizer::from_corpus([
        build_prompt(instruction).as_str(),
        "The crown is intact with a periapical lesion. Normal bone.",
    ]);
    let model_config = DentalVlmConfig::tiny(tokenizer.len());
    let device = Default::default();

    let model_dir = ws.out.join("model");
    let model = model_config.init::<EvalBackend>(&device);
    save_pretrained(&model_dir, &model_config, &tokenizer, &model).unwrap();

    let generation = GenerationSettings::default().greedy().with_max_new_tokens(6);
    let assistant =
        VlmAssistant::<EvalBackend>::from_pretrained(&model_dir, None, generation, device).unwrap();

    let data = ws.out.join("one_case");
    std::fs::create_dir_all(&data).unwrap();
    write_image(&data.join("xray.png"));
    write_case(
        &data,
        "case_tiny",
        json!({
            "image_path": data.join("xray.png"),
            "expert_narrative": "The crown is intact.",
            "key_keywords_expected": ["crown"]
        }),
    );

    let mut config = config(&ws).with_eval_data_dir(&data);
    config.instruction = instruction.to_string();
    config.generation = GenerationSettings::default().greedy().with_max_new_tokens(6);

    let summary = Evaluator::new(config, assistant).run().unwrap();
    assert_eq!(summary.cases_evaluated, 1);

    let result = read_result(&summary.result_files[0]).unwrap();
    if result.has_narrative() {
        let crown = &result.xai_explanations["crown"];
        assert!(Path::new(&crown.path).is_file());
    } else {
        assert!(result.xai_explanations.is_empty());
    }
}
