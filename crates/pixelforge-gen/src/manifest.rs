//! Job manifest loading and selection
//!
//! The manifest lists every asset job for a run. JSON is the default
//! format; a `.toml` extension switches to TOML with the same shape.

use pixelforge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One declarative asset job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    /// Path to the component spec describing the asset
    pub component_file: String,
    /// Context documents; overrides the manifest defaults when present
    #[serde(default)]
    pub context_refs: Option<Vec<String>>,
    /// Output path template
    pub target_image: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub aspect: Option<String>,
    /// Variant count as written; see [`Job::variants`]
    #[serde(default = "default_variants")]
    pub n: i64,
}

fn default_variants() -> i64 {
    1
}

impl Job {
    /// Variant count clamped to `1..=u32::MAX`
    pub fn variants(&self) -> u32 {
        self.n.clamp(1, i64::from(u32::MAX)) as u32
    }
}

/// The full job list for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub default_context_refs: Option<Vec<String>>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl Manifest {
    /// Load a manifest from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ForgeError::ConfigError(format!(
                "Manifest not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::ConfigError(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };
        parsed.map_err(|e| match e {
            ForgeError::ConfigError(msg) => ForgeError::ConfigError(format!(
                "Failed to parse manifest {}: {}",
                path.display(),
                msg
            )),
            other => other,
        })
    }

    /// Parse a JSON manifest
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a TOML manifest
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Select jobs by a comma-separated id list.
    ///
    /// An empty or absent filter selects every job. Selected jobs keep
    /// manifest order. Fails if nothing is selected.
    pub fn select(&self, filter: Option<&str>) -> Result<Vec<&Job>> {
        let wanted: HashSet<&str> = filter
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let jobs: Vec<&Job> = self
            .jobs
            .iter()
            .filter(|job| wanted.is_empty() || wanted.contains(job.job_id.as_str()))
            .collect();

        if jobs.is_empty() {
            return Err(ForgeError::ConfigError("no jobs selected".to_string()));
        }

        Ok(jobs)
    }

    /// Ids named in `filter` that match no job, in filter order
    pub fn unmatched_ids(&self, filter: Option<&str>) -> Vec<String> {
        let mut unmatched: Vec<String> = Vec::new();
        for id in filter.unwrap_or("").split(',').map(str::trim) {
            if id.is_empty() || unmatched.iter().any(|u| u == id) {
                continue;
            }
            if !self.jobs.iter().any(|job| job.job_id == id) {
                unmatched.push(id.to_string());
            }
        }
        unmatched
    }

    /// Context refs for a job: its own list, else the manifest default, else none
    pub fn context_refs_for<'a>(&'a self, job: &'a Job) -> &'a [String] {
        job.context_refs
            .as_deref()
            .or(self.default_context_refs.as_deref())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "default_context_refs": ["docs/style.md"],
        "jobs": [
            {
                "job_id": "hero_icon",
                "component_file": "docs/components/hero.md",
                "target_image": "assets/hero.png",
                "n": 3
            },
            {
                "job_id": "stat_bar",
                "component_file": "docs/components/bar.md",
                "context_refs": [],
                "target_image": "assets/bar.png",
                "model": "custom-model",
                "size": "2k",
                "aspect": "16:9"
            }
        ]
    }"#;

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pixelforge_manifest_test_{}",
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_json_manifest() {
        let manifest = Manifest::from_json_str(MANIFEST).unwrap();
        assert_eq!(manifest.jobs.len(), 2);
        assert_eq!(manifest.jobs[0].n, 3);
        assert_eq!(manifest.jobs[1].n, 1);
        assert_eq!(manifest.jobs[1].model.as_deref(), Some("custom-model"));
    }

    #[test]
    fn test_select_all_when_filter_empty() {
        let manifest = Manifest::from_json_str(MANIFEST).unwrap();
        assert_eq!(manifest.select(None).unwrap().len(), 2);
        assert_eq!(manifest.select(Some(" , ,")).unwrap().len(), 2);
    }

    #[test]
    fn test_select_subset_keeps_manifest_order() {
        let manifest = Manifest::from_json_str(MANIFEST).unwrap();
        let jobs = manifest.select(Some(" stat_bar , hero_icon")).unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["hero_icon", "stat_bar"]);

        let jobs = manifest.select(Some("stat_bar,unknown")).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            manifest.unmatched_ids(Some("stat_bar, unknown,unknown,,other")),
            vec!["unknown".to_string(), "other".to_string()]
        );
        assert!(manifest.unmatched_ids(None).is_empty());
    }

    #[test]
    fn test_select_nothing_is_config_error() {
        let manifest = Manifest::from_json_str(MANIFEST).unwrap();
        let err = manifest.select(Some("missing_a,missing_b")).unwrap_err();
        assert!(matches!(err, ForgeError::ConfigError(ref m) if m == "no jobs selected"));

        let empty = Manifest::default();
        assert!(empty.select(None).is_err());
    }

    #[test]
    fn test_context_refs_precedence() {
        let manifest = Manifest::from_json_str(MANIFEST).unwrap();
        assert_eq!(
            manifest.context_refs_for(&manifest.jobs[0]).to_vec(),
            vec!["docs/style.md".to_string()]
        );
        assert!(manifest.context_refs_for(&manifest.jobs[1]).is_empty());

        let bare = Manifest {
            default_context_refs: None,
            jobs: manifest.jobs.clone(),
        };
        assert!(bare.context_refs_for(&bare.jobs[0]).is_empty());
    }

    #[test]
    fn test_zero_variants_clamped() {
        let manifest = Manifest::from_json_str(
            r#"{"jobs":[{"job_id":"a","component_file":"a.md","target_image":"a.png","n":0}]}"#,
        )
        .unwrap();
        assert_eq!(manifest.jobs[0].variants(), 1);
    }

    #[test]
    fn test_negative_variants_clamped() {
        let manifest = Manifest::from_json_str(
            r#"{"jobs":[{"job_id":"a","component_file":"a.md","target_image":"a.png","n":-2}]}"#,
        )
        .unwrap();
        assert_eq!(manifest.jobs[0].n, -2);
        assert_eq!(manifest.jobs[0].variants(), 1);

        let huge = Job {
            n: i64::MAX,
            ..manifest.jobs[0].clone()
        };
        assert_eq!(huge.variants(), u32::MAX);
    }

    #[test]
    fn test_parse_toml_manifest() {
        let manifest = Manifest::from_toml_str(
            r#"
[[jobs]]
job_id = "badge"
component_file = "docs/badge.md"
target_image = "assets/badge.png"
n = -1
"#,
        )
        .unwrap();
        assert!(manifest.default_context_refs.is_none());
        assert_eq!(manifest.jobs[0].job_id, "badge");
        assert_eq!(manifest.jobs[0].variants(), 1);
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = temp_dir();

        let err = Manifest::load(&dir.join("absent.json")).unwrap_err();
        assert!(matches!(err, ForgeError::ConfigError(_)));

        let bad = dir.join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            Manifest::load(&bad).unwrap_err(),
            ForgeError::ConfigError(_)
        ));

        let wrong_shape = dir.join("shape.json");
        std::fs::write(&wrong_shape, r#"{"jobs": [{"job_id": 5}]}"#).unwrap();
        assert!(Manifest::load(&wrong_shape).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_toml_manifest() {
        let dir = temp_dir();
        let path = dir.join("jobs.toml");
        std::fs::write(
            &path,
            r#"
default_context_refs = ["docs/style.md"]

[[jobs]]
job_id = "frame"
component_file = "docs/frame.md"
target_image = "assets/frame.webp"
n = 2
"#,
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.jobs.len(), 1);
        assert_eq!(manifest.jobs[0].job_id, "frame");
        assert_eq!(manifest.jobs[0].variants(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
