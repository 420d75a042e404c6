//! dxai CLI: evaluate a dental narrative model and summarize its results.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use burn_autodiff::Autodiff;
use dxai_core::backend::NdArray;
use dxai_core::{EvalConfig, KeywordVocabulary, Seed};
use dxai_eval::{
    read_results, rescore_results, write_coverage_summary, write_rouge_summary, Evaluator,
    ProgressObserver, VlmAssistant, COVERAGE_FILE_STEM, ROUGE_FILE_STEM,
};

/// Backend for inference and heatmaps.
type EvalBackend = Autodiff<NdArray>;

#[derive(Parser)]
#[command(name = "dxai")]
#[command(author, version)]
#[command(about = "Evaluate a dental radiograph narrative model with keyword heatmaps")]
#[command(long_about = "dxai: narrative generation, ROUGE scoring and Grad-CAM keyword heatmaps
for a fine-tuned dental vision-language model.

EXAMPLES:
  # Evaluate with the default directories
  dxai -v evaluate

  # Evaluate another dataset with a config file
  dxai evaluate --config eval.json --data-dir evaluation_dataset/posterior_teeth/

  # Redraw the keyword coverage matrix from existing results
  dxai summary --results-dir evaluation_results/results_json

  # Recompute ROUGE for existing results, then draw the ROUGE matrix
  dxai score --results-dir evaluation_results/results_json
  dxai rouge-matrix --results-dir evaluation_results/results_json")]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate narratives, scores and heatmaps for every case
    Evaluate {
        /// JSON run configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Directory with ground-truth case files
        #[arg(long, value_name = "DIR")]
        data_dir: Option<PathBuf>,

        /// Output directory
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Base model directory
        #[arg(long, value_name = "DIR")]
        base_model: Option<PathBuf>,

        /// Fine-tuned adapter directory
        #[arg(long, value_name = "DIR", conflicts_with = "no_adapter")]
        adapter: Option<PathBuf>,

        /// Use the base model without an adapter
        #[arg(long)]
        no_adapter: bool,

        /// Run seed
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Skip keyword heatmaps
        #[arg(long)]
        no_heatmaps: bool,

        /// Skip the summary matrices
        #[arg(long)]
        no_summary: bool,
    },
    /// Draw the keyword coverage matrix from result files
    Summary {
        /// Directory with `*_result.json` files
        #[arg(long, value_name = "DIR")]
        results_dir: PathBuf,

        /// Output SVG (a CSV is written next to it)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// JSON run configuration providing the keyword vocabulary
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Draw the ROUGE score matrix from result files
    RougeMatrix {
        /// Directory with `*_result.json` files
        #[arg(long, value_name = "DIR")]
        results_dir: PathBuf,

        /// Output SVG (a CSV is written next to it)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Recompute ROUGE scores in existing result files
    Score {
        /// Directory with `*_result.json` files
        #[arg(long, value_name = "DIR")]
        results_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Evaluate {
            config,
            data_dir,
            output_dir,
            base_model,
            adapter,
            no_adapter,
            seed,
            no_heatmaps,
            no_summary,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(dir) = data_dir {
                config.eval_data_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(dir) = base_model {
                config.base_model_path = dir;
            }
            if adapter.is_some() {
                config.adapter_path = adapter;
            }
            if no_adapter {
                config.adapter_path = None;
            }
            if let Some(seed) = seed {
                config.seed = Seed::new(seed);
            }
            config.generate_heatmaps &= !no_heatmaps;
            config.create_summary &= !no_summary;
            handle_evaluate(config)
        }
        Commands::Summary {
            results_dir,
            output,
            config,
        } => {
            let vocabulary = load_config(config.as_deref())?.keywords;
            handle_summary(&results_dir, output, &vocabulary)
        }
        Commands::RougeMatrix {
            results_dir,
            output,
        } => handle_rouge_matrix(&results_dir, output),
        Commands::Score { results_dir } => handle_score(&results_dir),
    }
}

fn load_config(path: Option<&Path>) -> Result<EvalConfig> {
    match path {
        Some(path) => EvalConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(EvalConfig::default()),
    }
}

fn handle_evaluate(config: EvalConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    if !config.base_model_path.is_dir() {
        bail!(
            "Base model directory not found: {}",
            config.base_model_path.display()
        );
    }

    tracing::info!("Loading model from {}", config.base_model_path.display());
    let device = Default::default();
    let assistant = VlmAssistant::<EvalBackend>::from_pretrained(
        &config.base_model_path,
        config.adapter_path.as_deref(),
        config.generation.clone(),
        device,
    )
    .context("Failed to load model")?;
    tracing::info!("Model loaded successfully.");

    let mut evaluator = Evaluator::new(config, assistant).with_observer(ProgressObserver::new());
    let summary = evaluator.run().context("Evaluation failed")?;

    println!(
        "Evaluated {} of {} cases ({} skipped, {} narrative failures, {} heatmaps).",
        summary.cases_evaluated,
        summary.cases_found,
        summary.cases_skipped,
        summary.narratives_failed,
        summary.heatmaps_written
    );
    if let Some(report) = &summary.report {
        println!("\n{}", report.to_string_table());
    }
    Ok(())
}

fn handle_summary(results_dir: &Path, output: Option<PathBuf>, vocabulary: &KeywordVocabulary) -> Result<()> {
    let results = read_results(results_dir)
        .with_context(|| format!("Failed to read results from {}", results_dir.display()))?;
    let output = output.unwrap_or_else(|| PathBuf::from(format!("{COVERAGE_FILE_STEM}.svg")));

    let matrix = write_coverage_summary(&results, vocabulary, &output)?;
    println!("{}", matrix.to_string_table());
    println!("Summary heatmap saved to {}", output.display());
    Ok(())
}

fn handle_rouge_matrix(results_dir: &Path, output: Option<PathBuf>) -> Result<()> {
    let results = read_results(results_dir)
        .with_context(|| format!("Failed to read results from {}", results_dir.display()))?;
    let output = output.unwrap_or_else(|| PathBuf::from(format!("{ROUGE_FILE_STEM}.svg")));

    match write_rouge_summary(&results, &output)? {
        Some(matrix) => {
            println!("{}", matrix.to_string_table());
            println!("ROUGE score matrix saved to {}", output.display());
        }
        None => println!("No ROUGE scores found in {}.", results_dir.display()),
    }
    Ok(())
}

fn handle_score(results_dir: &Path) -> Result<()> {
    let (written, scored) = rescore_results(results_dir)
        .with_context(|| format!("Failed to rescore results in {}", results_dir.display()))?;
    println!("Scored {} of {} result files.", scored, written.len());
    Ok(())
}
