//! pixelforge gen - manifest-driven image asset generation
//!
//! Expands a job manifest into per-variant tasks, builds prompts from
//! component specs and shared context documents, and runs the tasks on a
//! bounded worker pool against an image provider. Per-task failures are
//! collected into a [`RunReport`] instead of aborting the run.

pub mod batch;
pub mod component;
pub mod config;
pub mod executor;
pub mod manifest;
pub mod output;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod report;
pub mod single;
pub mod task;

pub use batch::{run_batch, BatchOptions, RunMode};
pub use component::ComponentSpec;
pub use config::{resolve_credential, Credential, ForgeConfig};
pub use manifest::{Job, Manifest};
pub use provider::{ImageFormat, ImageProvider, ImageRequest, InlineImage};
pub use report::{RunReport, TaskFailure, TaskOutcome, TaskPreview, TaskReport};
pub use task::{AspectRatio, Defaults, Overrides, Task};
