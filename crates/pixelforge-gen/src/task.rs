//! Task expansion and resolution
//!
//! Expansion is pure: every selected job yields one [`TaskSpec`] per variant.
//! Resolution reads the component and context files for a single spec and
//! produces the executable [`Task`]; a missing file fails only that task.

use crate::component::ComponentSpec;
use crate::manifest::{Job, Manifest};
use crate::prompt::build_prompt;
use pixelforge_core::{ForgeError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_SIZE: &str = "1K";

/// Supported aspect ratios, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Landscape,
    Portrait,
    Wide,
    Tall,
}

impl AspectRatio {
    pub const CANDIDATES: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Wide,
        AspectRatio::Tall,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
        }
    }

    pub fn ratio(self) -> f64 {
        match self {
            AspectRatio::Square => 1.0,
            AspectRatio::Landscape => 4.0 / 3.0,
            AspectRatio::Portrait => 3.0 / 4.0,
            AspectRatio::Wide => 16.0 / 9.0,
            AspectRatio::Tall => 9.0 / 16.0,
        }
    }

    /// Pick the closest supported ratio for a `WIDTHxHEIGHT` size hint.
    /// Anything unparsable falls back to square.
    pub fn infer(size_hint: Option<&str>) -> Self {
        let Some((width, height)) = size_hint.and_then(parse_dimensions) else {
            return AspectRatio::Square;
        };

        let ratio = width as f64 / height as f64;
        let mut best = AspectRatio::Square;
        let mut best_diff = (best.ratio() - ratio).abs();
        for candidate in &Self::CANDIDATES[1..] {
            let diff = (candidate.ratio() - ratio).abs();
            if diff < best_diff {
                best = *candidate;
                best_diff = diff;
            }
        }
        best
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `^\d+[xX]\d+$` with both sides non-zero
fn parse_dimensions(hint: &str) -> Option<(u64, u64)> {
    let (w, h) = hint.split_once(['x', 'X'])?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(w) || !all_digits(h) {
        return None;
    }
    let width: u64 = w.parse().ok()?;
    let height: u64 = h.parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// Run-wide overrides; these beat every per-job value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub size: Option<String>,
    pub aspect: Option<String>,
}

/// Fallbacks used when neither an override nor the job sets a value
#[derive(Debug, Clone)]
pub struct Defaults {
    pub model: String,
    pub size: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            size: DEFAULT_SIZE.to_string(),
        }
    }
}

/// Everything resolution needs besides the spec itself
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Relative manifest paths resolve against this directory
    pub root: &'a Path,
    pub manifest: &'a Manifest,
    pub overrides: &'a Overrides,
    pub defaults: &'a Defaults,
}

/// One (job, variant) pair before any file has been read
#[derive(Debug, Clone, Copy)]
pub struct TaskSpec<'a> {
    pub job: &'a Job,
    /// 1-based
    pub variant: u32,
    pub variants: u32,
}

/// A fully resolved generation task
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub job_id: String,
    pub variant_index: u32,
    pub prompt: String,
    pub model: String,
    pub size: String,
    pub aspect: String,
    /// Output path as written in the manifest (after variant suffixing)
    pub target: String,
    /// `target` resolved against the project root
    pub output_path: PathBuf,
}

/// Expand jobs into one spec per variant, in manifest then variant order
pub fn expand<'a>(jobs: &[&'a Job]) -> Vec<TaskSpec<'a>> {
    jobs.iter()
        .flat_map(|&job| {
            let variants = job.variants();
            (1..=variants).map(move |variant| TaskSpec {
                job,
                variant,
                variants,
            })
        })
        .collect()
}

impl TaskSpec<'_> {
    /// Output path template with the variant suffix applied
    pub fn target(&self) -> String {
        with_variant_suffix(&self.job.target_image, self.variant, self.variants)
    }

    /// Read inputs, build the prompt and settle model, size, aspect and path
    pub fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Task> {
        let job = self.job;

        let component_raw = read_job_file(ctx.root, &job.job_id, "component", &job.component_file)?;
        let component = ComponentSpec::parse(&component_raw);

        let context_texts = ctx
            .manifest
            .context_refs_for(job)
            .iter()
            .map(|r| read_job_file(ctx.root, &job.job_id, "context", r).map(|t| t.trim().to_string()))
            .collect::<Result<Vec<_>>>()?;

        let prompt = build_prompt(&context_texts, &component);

        let model = pick(&ctx.overrides.model, &job.model).unwrap_or(&ctx.defaults.model);
        let size = pick(&ctx.overrides.size, &job.size)
            .unwrap_or(&ctx.defaults.size)
            .to_uppercase();
        let aspect = match pick(&ctx.overrides.aspect, &job.aspect) {
            Some(a) => a.to_string(),
            None => AspectRatio::infer(component.meta("size_hint")).to_string(),
        };

        let target = self.target();
        let output_path = ctx.root.join(&target);

        Ok(Task {
            job_id: job.job_id.clone(),
            variant_index: self.variant,
            prompt,
            model: model.to_string(),
            size,
            aspect,
            target,
            output_path,
        })
    }
}

/// First non-empty value, override before job
fn pick<'a>(run: &'a Option<String>, job: &'a Option<String>) -> Option<&'a String> {
    run.as_ref()
        .filter(|s| !s.is_empty())
        .or_else(|| job.as_ref().filter(|s| !s.is_empty()))
}

fn read_job_file(root: &Path, job_id: &str, kind: &str, reference: &str) -> Result<String> {
    let path = root.join(reference);
    if !path.is_file() {
        return Err(ForgeError::MissingFile {
            job_id: job_id.to_string(),
            kind: kind.to_string(),
            path: reference.to_string(),
        });
    }
    Ok(std::fs::read_to_string(&path)?)
}

/// Insert `_v<variant>` before the extension when a job has several variants
pub fn with_variant_suffix(target: &str, variant: u32, variants: u32) -> String {
    if variants <= 1 {
        return target.to_string();
    }

    let name_start = target.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match target[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let split = name_start + dot;
            format!("{}_v{}{}", &target[..split], variant, &target[split..])
        }
        _ => format!("{}_v{}", target, variant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, n: i64) -> Job {
        Job {
            job_id: id.to_string(),
            component_file: format!("components/{}.md", id),
            context_refs: None,
            target_image: format!("assets/{}.png", id),
            model: None,
            size: None,
            aspect: None,
            n,
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pixelforge_task_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(dir.join("components")).unwrap();
        std::fs::create_dir_all(dir.join("docs")).unwrap();
        dir
    }

    #[test]
    fn test_aspect_inference() {
        assert_eq!(AspectRatio::infer(Some("1024x1024")).label(), "1:1");
        assert_eq!(AspectRatio::infer(Some("1920x1080")).label(), "16:9");
        assert_eq!(AspectRatio::infer(Some("640x480")).label(), "4:3");
        assert_eq!(AspectRatio::infer(Some("480X640")).label(), "3:4");
        assert_eq!(AspectRatio::infer(Some("1080x1920")).label(), "9:16");
    }

    #[test]
    fn test_aspect_inference_fallbacks() {
        assert_eq!(AspectRatio::infer(None), AspectRatio::Square);
        assert_eq!(AspectRatio::infer(Some("")), AspectRatio::Square);
        assert_eq!(AspectRatio::infer(Some("wide")), AspectRatio::Square);
        assert_eq!(AspectRatio::infer(Some("1920 x 1080")), AspectRatio::Square);
        assert_eq!(AspectRatio::infer(Some("0x100")), AspectRatio::Square);
        assert_eq!(AspectRatio::infer(Some("-4x3")), AspectRatio::Square);
    }

    #[test]
    fn test_expand_one_task_per_variant() {
        let a = job("a", 3);
        let b = job("b", 1);
        let specs = expand(&[&a, &b]);

        assert_eq!(specs.len(), 4);
        let a_variants: Vec<u32> = specs
            .iter()
            .filter(|s| s.job.job_id == "a")
            .map(|s| s.variant)
            .collect();
        assert_eq!(a_variants, vec![1, 2, 3]);
        assert_eq!(specs[3].job.job_id, "b");
        assert_eq!(specs[3].variant, 1);
    }

    #[test]
    fn test_variant_suffix_rules() {
        assert_eq!(with_variant_suffix("assets/foo.png", 1, 1), "assets/foo.png");
        assert_eq!(with_variant_suffix("assets/foo.png", 2, 3), "assets/foo_v2.png");
        assert_eq!(with_variant_suffix("a.b/foo", 2, 2), "a.b/foo_v2");
        assert_eq!(with_variant_suffix("assets/.hidden", 1, 2), "assets/.hidden_v1");
        assert_eq!(with_variant_suffix("foo.tar.png", 1, 2), "foo.tar_v1.png");
    }

    #[test]
    fn test_variant_paths_unique() {
        let j = job("icon", 4);
        let specs = expand(&[&j]);
        let mut targets: Vec<String> = specs.iter().map(|s| s.target()).collect();
        targets.sort();
        targets.dedup();
        assert_eq!(targets.len(), 4);
    }

    #[test]
    fn test_resolve_precedence_and_inference() {
        let dir = temp_dir();
        std::fs::write(
            dir.join("components/icon.md"),
            "component_id: icon\nsize_hint: 1920x1080\n## intent\nShiny.\n",
        )
        .unwrap();
        std::fs::write(dir.join("docs/style.md"), "  Warm palette.  \n").unwrap();

        let mut j = job("icon", 2);
        j.size = Some("2k".to_string());
        let manifest = Manifest {
            default_context_refs: Some(vec!["docs/style.md".to_string()]),
            jobs: vec![j.clone()],
        };
        let defaults = Defaults::default();

        let no_overrides = Overrides::default();
        let ctx = ResolveContext {
            root: &dir,
            manifest: &manifest,
            overrides: &no_overrides,
            defaults: &defaults,
        };
        let spec = TaskSpec {
            job: &manifest.jobs[0],
            variant: 2,
            variants: 2,
        };
        let task = spec.resolve(&ctx).unwrap();

        assert_eq!(task.model, DEFAULT_MODEL);
        assert_eq!(task.size, "2K");
        assert_eq!(task.aspect, "16:9");
        assert_eq!(task.target, "assets/icon_v2.png");
        assert_eq!(task.output_path, dir.join("assets/icon_v2.png"));
        assert!(task.prompt.contains("[GLOBAL_CONTEXT]\nWarm palette.\n"));
        assert!(task.prompt.contains("intent: Shiny."));

        let overrides = Overrides {
            model: Some("other-model".to_string()),
            size: Some("4k".to_string()),
            aspect: Some("3:4".to_string()),
        };
        let ctx = ResolveContext { overrides: &overrides, ..ctx };
        let task = spec.resolve(&ctx).unwrap();
        assert_eq!(task.model, "other-model");
        assert_eq!(task.size, "4K");
        assert_eq!(task.aspect, "3:4");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_resolve_missing_files() {
        let dir = temp_dir();
        let defaults = Defaults::default();
        let overrides = Overrides::default();

        let manifest = Manifest {
            default_context_refs: Some(vec!["docs/absent.md".to_string()]),
            jobs: vec![job("ghost", 1)],
        };
        let ctx = ResolveContext {
            root: &dir,
            manifest: &manifest,
            overrides: &overrides,
            defaults: &defaults,
        };
        let spec = TaskSpec {
            job: &manifest.jobs[0],
            variant: 1,
            variants: 1,
        };

        let err = spec.resolve(&ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[ghost] component file not found: components/ghost.md"
        );

        std::fs::write(dir.join("components/ghost.md"), "component_id: ghost\n").unwrap();
        let err = spec.resolve(&ctx).unwrap_err();
        assert!(matches!(err, ForgeError::MissingFile { ref kind, .. } if kind == "context"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
