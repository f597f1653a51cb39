//! Manifest-driven batch generation

use anyhow::Result;
use clap::Args;
use pixelforge_gen::config::resolve_credential;
use pixelforge_gen::providers::{create_provider, requires_credential};
use pixelforge_gen::task::{Defaults, Overrides};
use pixelforge_gen::{run_batch, BatchOptions, ForgeConfig, Manifest, RunMode, TaskReport};
use std::path::PathBuf;

#[derive(Args)]
pub struct BatchArgs {
    /// Manifest path (JSON, or TOML with a .toml extension)
    #[arg(long)]
    pub manifest: Option<String>,

    /// Run only these comma-separated job ids
    #[arg(long)]
    pub job: Option<String>,

    /// Override model for all jobs
    #[arg(long)]
    pub model: Option<String>,

    /// Override image size for all jobs (1K, 2K, 4K)
    #[arg(long)]
    pub size: Option<String>,

    /// Override aspect ratio for all jobs (e.g. 1:1, 16:9)
    #[arg(long)]
    pub aspect: Option<String>,

    /// Parallel task count (default: 4)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Provider to use (gemini, mock)
    #[arg(long)]
    pub provider: Option<String>,

    /// Build prompts and resolve outputs only (no API call)
    #[arg(long)]
    pub dry_run: bool,

    /// Print the full prompt for every task
    #[arg(long)]
    pub print_prompts: bool,

    /// Project root that manifest paths are relative to
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

pub fn run(args: BatchArgs) -> Result<()> {
    let root = args.root;
    let config = ForgeConfig::load(&root)?;

    let manifest_path = root.join(args.manifest.as_deref().unwrap_or(config.manifest_path()));
    let manifest = Manifest::load(&manifest_path)?;

    let selected = manifest.select(args.job.as_deref())?.len();
    for id in manifest.unmatched_ids(args.job.as_deref()) {
        tracing::warn!(job_id = %id, "selected job id is not in the manifest");
    }
    tracing::debug!(manifest = %manifest_path.display(), selected, "manifest loaded");

    let provider = if args.dry_run {
        None
    } else {
        let provider_name = args.provider.as_deref().unwrap_or(config.provider_name());
        let credential = if requires_credential(provider_name) {
            resolve_credential(&root)
        } else {
            None
        };
        Some(create_provider(provider_name, &config, credential)?)
    };

    let concurrency = match args.concurrency {
        Some(n) => usize::try_from(n)?,
        None => config.concurrency(),
    };
    if concurrency == 0 {
        anyhow::bail!("Config error: concurrency must be at least 1");
    }

    let options = BatchOptions {
        job_filter: args.job,
        overrides: Overrides {
            model: args.model,
            size: args.size,
            aspect: args.aspect,
        },
        defaults: Defaults {
            model: config.default_model().to_string(),
            size: config.default_size().to_string(),
        },
        concurrency,
        print_prompts: args.print_prompts,
    };

    let mode = match &provider {
        Some(p) => RunMode::Generate(p.as_ref()),
        None => RunMode::DryRun,
    };

    let report = run_batch(&root, &manifest, &options, mode, print_task_report)?;

    if report.has_failures() {
        eprintln!();
        for line in report.summary_lines() {
            eprintln!("{}", line);
        }
        anyhow::bail!("{} of {} task(s) failed", report.failures.len(), report.attempted);
    }

    println!();
    for line in report.summary_lines() {
        println!("{}", line);
    }
    Ok(())
}

fn print_task_report(task_report: &TaskReport) {
    if let Some(preview) = &task_report.preview {
        for line in preview.lines() {
            println!("{}", line);
        }
    }

    if let Some(line) = task_report.outcome.line() {
        if task_report.outcome.is_failure() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}
