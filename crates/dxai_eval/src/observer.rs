//! Observer hooks for evaluation runs.

use std::path::Path;

use dxai_core::CaseResult;

use crate::error::Result;
use crate::summary::RunSummary;

/// Position of the case being evaluated.
#[derive(Debug, Clone, Copy)]
pub struct CaseContext<'a> {
    /// Case name.
    pub case_name: &'a str,
    /// Index of the case (0-indexed).
    pub index: usize,
    /// Total number of cases.
    pub n_cases: usize,
}

impl CaseContext<'_> {
    /// Fraction of cases started, including this one.
    pub fn progress(&self) -> f32 {
        if self.n_cases == 0 {
            return 1.0;
        }
        (self.index + 1) as f32 / self.n_cases as f32
    }
}

/// Hooks called at the stages of an evaluation run.
pub trait EvalObserver {
    /// Called once the cases are known.
    fn on_run_start(&mut self, _n_cases: usize) -> Result<()> {
        Ok(())
    }

    /// Called before a case is evaluated.
    fn on_case_start(&mut self, _ctx: &CaseContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called with the generated narrative or error text.
    fn on_narrative(&mut self, _ctx: &CaseContext<'_>, _narrative: &str) -> Result<()> {
        Ok(())
    }

    /// Called after a heatmap overlay was written.
    fn on_heatmap(&mut self, _ctx: &CaseContext<'_>, _keyword: &str, _path: &Path) -> Result<()> {
        Ok(())
    }

    /// Called when a case is skipped without a result file.
    fn on_case_skipped(&mut self, _ctx: &CaseContext<'_>, _reason: &str) -> Result<()> {
        Ok(())
    }

    /// Called after a case's result file was written.
    fn on_case_end(&mut self, _ctx: &CaseContext<'_>, _result: &CaseResult) -> Result<()> {
        Ok(())
    }

    /// Called after all cases and the summary.
    fn on_run_end(&mut self, _summary: &RunSummary) -> Result<()> {
        Ok(())
    }

    /// Observer name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A list of observers, called in insertion order.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Box<dyn EvalObserver>>,
}

impl ObserverList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer.
    pub fn add<O: EvalObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Call `on_run_start` on all observers.
    pub fn on_run_start(&mut self, n_cases: usize) -> Result<()> {
        for o in &mut self.observers {
            o.on_run_start(n_cases)?;
        }
        Ok(())
    }

    /// Call `on_case_start` on all observers.
    pub fn on_case_start(&mut self, ctx: &CaseContext<'_>) -> Result<()> {
        for o in &mut self.observers {
            o.on_case_start(ctx)?;
        }
        Ok(())
    }

    /// Call `on_narrative` on all observers.
    pub fn on_narrative(&mut self, ctx: &CaseContext<'_>, narrative: &str) -> Result<()> {
        for o in &mut self.observers {
            o.on_narrative(ctx, narrative)?;
        }
        Ok(())
    }

    /// Call `on_heatmap` on all observers.
    pub fn on_heatmap(&mut self, ctx: &CaseContext<'_>, keyword: &str, path: &Path) -> Result<()> {
        for o in &mut self.observers {
            o.on_heatmap(ctx, keyword, path)?;
        }
        Ok(())
    }

    /// Call `on_case_skipped` on all observers.
    pub fn on_case_skipped(&mut self, ctx: &CaseContext<'_>, reason: &str) -> Result<()> {
        for o in &mut self.observers {
            o.on_case_skipped(ctx, reason)?;
        }
        Ok(())
    }

    /// Call `on_case_end` on all observers.
    pub fn on_case_end(&mut self, ctx: &CaseContext<'_>, result: &CaseResult) -> Result<()> {
        for o in &mut self.observers {
            o.on_case_end(ctx, result)?;
        }
        Ok(())
    }

    /// Call `on_run_end` on all observers.
    pub fn on_run_end(&mut self, summary: &RunSummary) -> Result<()> {
        for o in &mut self.observers {
            o.on_run_end(summary)?;
        }
        Ok(())
    }
}

/// Logs run progress through `tracing`.
#[derive(Debug, Default)]
pub struct ProgressObserver;

impl ProgressObserver {
    /// Create a progress observer.
    pub fn new() -> Self {
        Self
    }
}

impl EvalObserver for ProgressObserver {
    fn on_run_start(&mut self, n_cases: usize) -> Result<()> {
        tracing::info!("Found {} evaluation cases.", n_cases);
        Ok(())
    }

    fn on_case_start(&mut self, ctx: &CaseContext<'_>) -> Result<()> {
        tracing::info!(
            "--- Processing Case {}/{}: {} ({:.0}%) ---",
            ctx.index + 1,
            ctx.n_cases,
            ctx.case_name,
            ctx.progress() * 100.0
        );
        Ok(())
    }

    fn on_narrative(&mut self, _ctx: &CaseContext<'_>, narrative: &str) -> Result<()> {
        tracing::info!("Generated Narrative: {}", narrative);
        Ok(())
    }

    fn on_heatmap(&mut self, _ctx: &CaseContext<'_>, keyword: &str, path: &Path) -> Result<()> {
        tracing::info!("Saved heatmap for '{}' to {}", keyword, path.display());
        Ok(())
    }

    fn on_case_skipped(&mut self, ctx: &CaseContext<'_>, reason: &str) -> Result<()> {
        tracing::warn!("Skipping {}: {}", ctx.case_name, reason);
        Ok(())
    }

    fn on_run_end(&mut self, summary: &RunSummary) -> Result<()> {
        tracing::info!(
            "Evaluation complete: {} evaluated, {} skipped, {} heatmaps",
            summary.cases_evaluated,
            summary.cases_skipped,
            summary.heatmaps_written
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "ProgressObserver"
    }
}
