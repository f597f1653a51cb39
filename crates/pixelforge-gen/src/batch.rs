//! Batch runs
//!
//! Selects jobs from a manifest, expands them into tasks, and runs the tasks
//! on the worker pool. Each task is resolved, generated and written
//! independently; its error becomes a recorded failure and never stops the
//! rest of the run.

use crate::executor::{clamp_workers, run_pool};
use crate::manifest::Manifest;
use crate::output::{commit_artifact, SavedArtifact};
use crate::provider::{ImageProvider, ImageRequest};
use crate::report::{RunReport, TaskFailure, TaskOutcome, TaskPreview, TaskReport};
use crate::task::{expand, Defaults, Overrides, ResolveContext, Task, TaskSpec};
use pixelforge_core::{ForgeError, Result};
use std::path::Path;

/// Whether tasks reach the provider
#[derive(Clone, Copy)]
pub enum RunMode<'a> {
    /// Resolve and preview every task; no remote call, no writes
    DryRun,
    Generate(&'a dyn ImageProvider),
}

impl RunMode<'_> {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, RunMode::DryRun)
    }
}

/// Settings for one batch run
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Comma-separated job ids; `None` runs every job
    pub job_filter: Option<String>,
    pub overrides: Overrides,
    pub defaults: Defaults,
    pub concurrency: usize,
    pub print_prompts: bool,
}

/// Run every selected job of `manifest`.
///
/// Fails before any task starts if the selection is empty. `on_report` is
/// called on the calling thread as each task finishes.
pub fn run_batch<F>(
    root: &Path,
    manifest: &Manifest,
    options: &BatchOptions,
    mode: RunMode<'_>,
    mut on_report: F,
) -> Result<RunReport>
where
    F: FnMut(&TaskReport),
{
    let jobs = manifest.select(options.job_filter.as_deref())?;
    let specs = expand(&jobs);

    let ctx = ResolveContext {
        root,
        manifest,
        overrides: &options.overrides,
        defaults: &options.defaults,
    };

    tracing::info!(
        jobs = jobs.len(),
        tasks = specs.len(),
        workers = clamp_workers(options.concurrency, specs.len()),
        dry_run = mode.is_dry_run(),
        "starting batch"
    );

    let mut report = RunReport::new();
    run_pool(
        &specs,
        options.concurrency,
        |spec| run_task(spec, &ctx, mode, options.print_prompts),
        |task_report| {
            report.record(&task_report.outcome);
            on_report(&task_report);
        },
    );

    Ok(report)
}

fn run_task(
    spec: &TaskSpec<'_>,
    ctx: &ResolveContext<'_>,
    mode: RunMode<'_>,
    print_prompts: bool,
) -> TaskReport {
    let task = match spec.resolve(ctx) {
        Ok(task) => task,
        Err(e) => {
            let outcome = if mode.is_dry_run() {
                tracing::warn!(job_id = %spec.job.job_id, variant = spec.variant, error = %e, "dry run could not resolve task");
                TaskOutcome::Skipped {
                    job_id: spec.job.job_id.clone(),
                    variant_index: spec.variant,
                    reason: e.to_string(),
                }
            } else {
                failure(&spec.job.job_id, spec.variant, &e)
            };
            return TaskReport {
                preview: None,
                outcome,
            };
        }
    };

    let preview = (print_prompts || mode.is_dry_run())
        .then(|| TaskPreview::from_task(&task, print_prompts));

    let outcome = match mode {
        RunMode::DryRun => TaskOutcome::Planned {
            job_id: task.job_id.clone(),
            variant_index: task.variant_index,
            output_path: task.output_path.clone(),
        },
        RunMode::Generate(provider) => match generate_task(provider, &task) {
            Ok(saved) => TaskOutcome::Success {
                job_id: task.job_id.clone(),
                variant_index: task.variant_index,
                resolved_path: saved
                    .path
                    .strip_prefix(ctx.root)
                    .map(Path::to_path_buf)
                    .unwrap_or(saved.path.clone()),
                mime_type: saved.mime_type,
                content_hash: saved.hash,
            },
            Err(e) => failure(&task.job_id, task.variant_index, &e),
        },
    };

    TaskReport { preview, outcome }
}

/// Call the provider for one resolved task and write the result
pub fn generate_task(provider: &dyn ImageProvider, task: &Task) -> Result<SavedArtifact> {
    let image = provider.generate(&ImageRequest {
        prompt: &task.prompt,
        model: &task.model,
        aspect: &task.aspect,
        size: &task.size,
    })?;

    if let Some(text) = &image.text {
        tracing::debug!(job_id = %task.job_id, variant = task.variant_index, text = %text, "model text");
    }

    commit_artifact(&task.output_path, &image)
}

fn failure(job_id: &str, variant_index: u32, error: &ForgeError) -> TaskOutcome {
    TaskOutcome::Failure(TaskFailure {
        job_id: job_id.to_string(),
        variant_index,
        message: error.to_string(),
    })
}
