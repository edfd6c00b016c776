use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::identity::domain::assignment::{AssignmentPolicy, SortMode, UnknownPolicy};
use crate::placement::domain::placement::PlacementStyle;
use crate::shared::constants::{DEFAULT_DETECTION_CONFIDENCE, DEFAULT_DISTANCE_THRESHOLD};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("please select an input directory")]
    MissingInputDir,
    #[error("please select an output directory")]
    MissingOutputDir,
    #[error("supervised mode needs a reference directory")]
    MissingReferenceDir,
    #[error("{first} and {second} directories must differ (both are {})", .path.display())]
    NotDistinct {
        first: &'static str,
        second: &'static str,
        path: PathBuf,
    },
    #[error("{role} directory \"{}\" does not exist or is not a directory", .path.display())]
    NotADirectory { role: &'static str, path: PathBuf },
    #[error("output directory \"{}\" must not be inside input directory \"{}\"", .output.display(), .input.display())]
    OutputInsideInput { output: PathBuf, input: PathBuf },
    #[error("threshold must be a positive finite number, got {0}")]
    InvalidThreshold(f64),
    #[error("workers must be at least 1")]
    InvalidWorkers,
    #[error("detection confidence must be in (0, 1], got {0}")]
    InvalidConfidence(f64),
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Everything a sorting run can be told.
///
/// Deserializes from JSON with every field optional; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SortConfig {
    pub reference_dir: Option<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub mode: SortMode,
    pub threshold: f64,
    pub workers: usize,
    pub placement: PlacementStyle,
    pub unknown: UnknownPolicy,
    /// Skip files whose bytes were already seen this run.
    pub dedup: bool,
    /// Also skip files whose bytes are already in the output tree.
    pub resume: bool,
    pub confidence: f64,
    pub model_dir: Option<PathBuf>,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            reference_dir: None,
            input_dir: None,
            output_dir: None,
            mode: SortMode::Clustering,
            threshold: DEFAULT_DISTANCE_THRESHOLD,
            workers: default_workers(),
            placement: PlacementStyle::Copy,
            unknown: UnknownPolicy::Skip,
            dedup: true,
            resume: false,
            confidence: DEFAULT_DETECTION_CONFIDENCE,
            model_dir: None,
        }
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Directories of a validated run, canonicalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub reference: Option<PathBuf>,
}

impl SortConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn policy(&self) -> AssignmentPolicy {
        AssignmentPolicy {
            mode: self.mode,
            threshold: self.threshold,
            unknown: self.unknown,
        }
    }

    /// Checks every precondition of a run, failing on the first violation.
    pub fn validate(&self) -> Result<RunPaths, ConfigError> {
        let input = self.input_dir.as_deref().ok_or(ConfigError::MissingInputDir)?;
        let output = self
            .output_dir
            .as_deref()
            .ok_or(ConfigError::MissingOutputDir)?;
        let reference = self.reference_dir.as_deref();
        if self.mode == SortMode::Supervised && reference.is_none() {
            return Err(ConfigError::MissingReferenceDir);
        }

        let input = existing_dir("input", input)?;
        let output = existing_dir("output", output)?;
        let reference = reference
            .map(|r| existing_dir("reference", r))
            .transpose()?;

        let mut named = vec![("input", &input), ("output", &output)];
        if let Some(r) = &reference {
            named.push(("reference", r));
        }
        for (i, (first, a)) in named.iter().enumerate() {
            for (second, b) in &named[i + 1..] {
                if a == b {
                    return Err(ConfigError::NotDistinct {
                        first: *first,
                        second: *second,
                        path: a.to_path_buf(),
                    });
                }
            }
        }
        if output.starts_with(&input) {
            return Err(ConfigError::OutputInsideInput { output, input });
        }

        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if !(self.confidence > 0.0 && self.confidence <= 1.0) {
            return Err(ConfigError::InvalidConfidence(self.confidence));
        }

        Ok(RunPaths {
            input,
            output,
            reference,
        })
    }
}

fn existing_dir(role: &'static str, path: &Path) -> Result<PathBuf, ConfigError> {
    let not_a_dir = || ConfigError::NotADirectory {
        role,
        path: path.to_path_buf(),
    };
    if !path.is_dir() {
        return Err(not_a_dir());
    }
    path.canonicalize().map_err(|_| not_a_dir())
}
