//! Task outcomes and the run report

use crate::task::Task;
use pixelforge_core::ContentHash;
use std::path::PathBuf;

/// Terminal state of one task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Success {
        job_id: String,
        variant_index: u32,
        resolved_path: PathBuf,
        mime_type: String,
        content_hash: ContentHash,
    },
    /// Dry run only: fully resolved, nothing sent
    Planned {
        job_id: String,
        variant_index: u32,
        output_path: PathBuf,
    },
    /// Dry run only: inputs could not be read, nothing was attempted
    Skipped {
        job_id: String,
        variant_index: u32,
        reason: String,
    },
    Failure(TaskFailure),
}

/// A failed task, as listed in the final summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub job_id: String,
    pub variant_index: u32,
    pub message: String,
}

impl TaskOutcome {
    /// One-line console form of this outcome. Planned tasks print their
    /// preview instead.
    pub fn line(&self) -> Option<String> {
        let line = match self {
            TaskOutcome::Success {
                job_id,
                variant_index,
                resolved_path,
                mime_type,
                content_hash,
            } => format!(
                "[ok] {} v{} -> {} ({}, {})",
                job_id,
                variant_index,
                resolved_path.display(),
                mime_type,
                content_hash
            ),
            TaskOutcome::Planned { .. } => return None,
            TaskOutcome::Skipped {
                job_id,
                variant_index,
                reason,
            } => format!("[skipped] {} v{}: {}", job_id, variant_index, reason),
            TaskOutcome::Failure(f) => {
                format!("[failed] {} v{}: {}", f.job_id, f.variant_index, f.message)
            }
        };
        Some(line)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failure(_))
    }
}

/// What a dry run or `--print-prompts` shows for a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPreview {
    pub job_id: String,
    pub variant_index: u32,
    pub target: String,
    pub model: String,
    pub aspect: String,
    pub size: String,
    pub prompt: Option<String>,
}

impl TaskPreview {
    pub fn from_task(task: &Task, with_prompt: bool) -> Self {
        Self {
            job_id: task.job_id.clone(),
            variant_index: task.variant_index,
            target: task.target.clone(),
            model: task.model.clone(),
            aspect: task.aspect.clone(),
            size: task.size.clone(),
            prompt: with_prompt.then(|| task.prompt.clone()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            String::new(),
            format!("[{}][v{}]", self.job_id, self.variant_index),
            format!("out: {}", self.target),
            format!(
                "model: {}, aspect: {}, size: {}",
                self.model, self.aspect, self.size
            ),
        ];
        if let Some(prompt) = &self.prompt {
            lines.push("--- prompt ---".to_string());
            lines.push(prompt.clone());
            lines.push("--- end prompt ---".to_string());
        }
        lines
    }
}

/// Everything a worker sends back for one task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskReport {
    pub preview: Option<TaskPreview>,
    pub outcome: TaskOutcome,
}

/// Aggregated outcomes of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub planned: usize,
    pub skipped: usize,
    /// In arrival order
    pub failures: Vec<TaskFailure>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &TaskOutcome) {
        self.attempted += 1;
        match outcome {
            TaskOutcome::Success { .. } => self.succeeded += 1,
            TaskOutcome::Planned { .. } => self.planned += 1,
            TaskOutcome::Skipped { .. } => self.skipped += 1,
            TaskOutcome::Failure(f) => self.failures.push(f.clone()),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Closing summary
    pub fn summary_lines(&self) -> Vec<String> {
        if self.has_failures() {
            let mut lines = vec![format!(
                "Completed with {} failure(s).",
                self.failures.len()
            )];
            lines.extend(
                self.failures
                    .iter()
                    .map(|f| format!("- {} v{}: {}", f.job_id, f.variant_index, f.message)),
            );
            lines
        } else if self.planned + self.skipped > 0 {
            // Only dry runs plan or skip
            vec![format!(
                "Dry run: {} task(s) planned, {} skipped.",
                self.planned, self.skipped
            )]
        } else {
            vec![format!("Completed {} generation task(s).", self.attempted)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(job: &str, v: u32) -> TaskOutcome {
        TaskOutcome::Success {
            job_id: job.to_string(),
            variant_index: v,
            resolved_path: PathBuf::from(format!("assets/{}.png", job)),
            mime_type: "image/png".to_string(),
            content_hash: ContentHash::from_bytes(b"x"),
        }
    }

    fn failure(job: &str, v: u32, msg: &str) -> TaskOutcome {
        TaskOutcome::Failure(TaskFailure {
            job_id: job.to_string(),
            variant_index: v,
            message: msg.to_string(),
        })
    }

    #[test]
    fn test_all_success() {
        let mut report = RunReport::new();
        report.record(&success("a", 1));
        report.record(&success("a", 2));

        assert!(!report.has_failures());
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.summary_lines(), vec!["Completed 2 generation task(s)."]);
    }

    #[test]
    fn test_failures_kept_in_arrival_order() {
        let mut report = RunReport::new();
        report.record(&failure("b", 2, "API error (500): boom"));
        report.record(&success("a", 1));
        report.record(&failure("a", 3, "Data error: empty"));

        assert!(report.has_failures());
        assert_eq!(report.attempted, 3);
        assert_eq!(
            report.summary_lines(),
            vec![
                "Completed with 2 failure(s).",
                "- b v2: API error (500): boom",
                "- a v3: Data error: empty",
            ]
        );
    }

    #[test]
    fn test_skipped_is_not_a_failure() {
        let mut report = RunReport::new();
        report.record(&TaskOutcome::Skipped {
            job_id: "a".to_string(),
            variant_index: 1,
            reason: "missing".to_string(),
        });
        assert!(!report.has_failures());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_dry_run_summary_counts_planned_and_skipped() {
        let mut report = RunReport::new();
        for v in 1..=2 {
            report.record(&TaskOutcome::Planned {
                job_id: "a".to_string(),
                variant_index: v,
                output_path: PathBuf::from(format!("assets/a_v{}.png", v)),
            });
        }
        report.record(&TaskOutcome::Skipped {
            job_id: "b".to_string(),
            variant_index: 1,
            reason: "missing".to_string(),
        });

        assert_eq!(
            report.summary_lines(),
            vec!["Dry run: 2 task(s) planned, 1 skipped."]
        );
    }

    #[test]
    fn test_outcome_lines() {
        assert!(success("a", 1)
            .line()
            .unwrap()
            .starts_with("[ok] a v1 -> assets/a.png (image/png, sha256:"));
        assert_eq!(
            failure("a", 2, "nope").line().as_deref(),
            Some("[failed] a v2: nope")
        );
        let planned = TaskOutcome::Planned {
            job_id: "a".to_string(),
            variant_index: 1,
            output_path: PathBuf::from("assets/a.png"),
        };
        assert_eq!(planned.line(), None);
    }

    #[test]
    fn test_preview_lines() {
        let preview = TaskPreview {
            job_id: "icon".to_string(),
            variant_index: 2,
            target: "assets/icon_v2.png".to_string(),
            model: "m".to_string(),
            aspect: "1:1".to_string(),
            size: "1K".to_string(),
            prompt: Some("PROMPT".to_string()),
        };
        assert_eq!(
            preview.lines(),
            vec![
                "",
                "[icon][v2]",
                "out: assets/icon_v2.png",
                "model: m, aspect: 1:1, size: 1K",
                "--- prompt ---",
                "PROMPT",
                "--- end prompt ---",
            ]
        );
    }
}
