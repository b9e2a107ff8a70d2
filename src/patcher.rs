//! Patcher - reads one file, substitutes the pattern, writes it back
//!
//! Each run is independent:
//! - Read the whole file and decode it as strict UTF-8
//! - Turn every selected match outside an existing replacement block into
//!   an edit and splice them
//! - Write back in place, only when the content actually changed
//! - Report how many replacements happened, including zero

use crate::edit::{splice, write_in_place, EditError};
use crate::pattern::ReplacementPattern;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result of running the patch against one file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOutcome should be checked for zero replacements"]
pub enum PatchOutcome {
    /// The pattern matched and the file was (or would be) rewritten
    Applied { file: PathBuf, replacements: usize },
    /// The replacement block is already in the file; nothing to do
    AlreadyApplied { file: PathBuf },
    /// The pattern matched nowhere; the file is untouched
    NoMatch { file: PathBuf },
}

impl PatchOutcome {
    pub fn file(&self) -> &Path {
        match self {
            PatchOutcome::Applied { file, .. }
            | PatchOutcome::AlreadyApplied { file }
            | PatchOutcome::NoMatch { file } => file,
        }
    }

    /// Number of spans replaced by this run.
    pub fn replacements(&self) -> usize {
        match self {
            PatchOutcome::Applied { replacements, .. } => *replacements,
            PatchOutcome::AlreadyApplied { .. } | PatchOutcome::NoMatch { .. } => 0,
        }
    }

    /// "1 replacement", "2 replacements", "0 replacements".
    pub fn replacements_label(&self) -> String {
        match self.replacements() {
            1 => "1 replacement".to_string(),
            n => format!("{n} replacements"),
        }
    }
}

impl fmt::Display for PatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOutcome::Applied { file, .. } => {
                write!(f, "Applied {} to {}", self.replacements_label(), file.display())
            }
            PatchOutcome::AlreadyApplied { file } => {
                write!(f, "Already applied to {}", file.display())
            }
            PatchOutcome::NoMatch { file } => write!(
                f,
                "Pattern matched nothing in {} ({})",
                file.display(),
                self.replacements_label()
            ),
        }
    }
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("edit rejected for {path}: {source}")]
    Edit {
        path: PathBuf,
        #[source]
        source: EditError,
    },
}

impl PatchError {
    fn from_read(path: &Path, source: std::io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            ErrorKind::NotFound => PatchError::NotFound { path },
            ErrorKind::PermissionDenied => PatchError::PermissionDenied { path, source },
            _ => PatchError::Read { path, source },
        }
    }

    fn from_write(path: &Path, source: std::io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            ErrorKind::PermissionDenied => PatchError::PermissionDenied { path, source },
            _ => PatchError::Write { path, source },
        }
    }
}

/// Everything a run computed, before and after.
#[derive(Debug, Clone)]
pub struct PatchReport {
    pub outcome: PatchOutcome,
    pub original: String,
    pub patched: String,
}

impl PatchReport {
    pub fn changed(&self) -> bool {
        self.original != self.patched
    }
}

/// Applies one [`ReplacementPattern`] to a file on disk.
#[derive(Debug, Clone)]
pub struct Patcher {
    pattern: ReplacementPattern,
}

impl Patcher {
    pub fn new(pattern: ReplacementPattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &ReplacementPattern {
        &self.pattern
    }

    /// Compute the outcome without touching the file.
    pub fn plan(&self, path: &Path) -> Result<PatchReport, PatchError> {
        let bytes = fs::read(path).map_err(|source| PatchError::from_read(path, source))?;
        debug!(file = %path.display(), bytes = bytes.len(), "read target");

        let original = String::from_utf8(bytes).map_err(|source| PatchError::Encoding {
            path: path.to_path_buf(),
            source,
        })?;

        let file = path.to_path_buf();

        let edits = self.pattern.edits(&original);
        for edit in &edits {
            debug!(start = edit.byte_start, end = edit.byte_end, "matched span");
        }

        if edits.is_empty() {
            let outcome = if self.pattern.is_applied(&original) {
                debug!(file = %path.display(), "replacement block already present");
                PatchOutcome::AlreadyApplied { file }
            } else {
                PatchOutcome::NoMatch { file }
            };
            return Ok(PatchReport {
                outcome,
                patched: original.clone(),
                original,
            });
        }

        let patched = splice(&original, &edits).map_err(|source| PatchError::Edit {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(PatchReport {
            outcome: PatchOutcome::Applied {
                file,
                replacements: edits.len(),
            },
            original,
            patched,
        })
    }

    /// Compute the outcome and write the file when it changed.
    pub fn apply(&self, path: &Path) -> Result<PatchReport, PatchError> {
        let report = self.plan(path)?;

        match &report.outcome {
            PatchOutcome::Applied { replacements, .. } => {
                write_in_place(path, report.patched.as_bytes())
                    .map_err(|source| PatchError::from_write(path, source))?;
                info!(file = %path.display(), replacements = *replacements, "patched");
            }
            PatchOutcome::AlreadyApplied { .. } => {
                info!(file = %path.display(), "already patched, left unchanged");
            }
            PatchOutcome::NoMatch { .. } => {
                warn!(
                    file = %path.display(),
                    pattern = self.pattern.as_str(),
                    "pattern matched nothing"
                );
            }
        }

        Ok(report)
    }
}

/// Apply `pattern` to the file at `path`.
pub fn patch_file(
    path: impl AsRef<Path>,
    pattern: &ReplacementPattern,
) -> Result<PatchOutcome, PatchError> {
    Patcher::new(pattern.clone())
        .apply(path.as_ref())
        .map(|report| report.outcome)
}

/// Report what [`patch_file`] would do, without writing.
pub fn check_file(
    path: impl AsRef<Path>,
    pattern: &ReplacementPattern,
) -> Result<PatchOutcome, PatchError> {
    Patcher::new(pattern.clone())
        .plan(path.as_ref())
        .map(|report| report.outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ReplacePolicy;

    fn pattern() -> ReplacementPattern {
        ReplacementPattern::new(r"handler\{.*?OLD.*?\}", "handler{ NEW }").unwrap()
    }

    #[test]
    fn test_outcome_display() {
        let applied = PatchOutcome::Applied {
            file: PathBuf::from("/tmp/Layout.jsx"),
            replacements: 1,
        };
        assert_eq!(applied.to_string(), "Applied 1 replacement to /tmp/Layout.jsx");

        let none = PatchOutcome::NoMatch {
            file: PathBuf::from("/tmp/Layout.jsx"),
        };
        assert!(none.to_string().contains("0 replacements"));
        assert_eq!(none.replacements(), 0);

        let two = PatchOutcome::Applied {
            file: PathBuf::from("/tmp/Layout.jsx"),
            replacements: 2,
        };
        assert_eq!(two.replacements_label(), "2 replacements");
    }

    #[test]
    fn test_plan_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jsx");
        fs::write(&file, "x handler{\nOLD\n} y").unwrap();

        let report = Patcher::new(pattern()).plan(&file).unwrap();
        assert_eq!(report.outcome.replacements(), 1);
        assert_eq!(report.patched, "x handler{ NEW } y");
        assert!(report.changed());
        assert_eq!(fs::read_to_string(&file).unwrap(), "x handler{\nOLD\n} y");
    }

    #[test]
    fn test_apply_first_policy() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jsx");
        fs::write(&file, "handler{OLD} handler{OLD}").unwrap();

        let patcher = Patcher::new(pattern().with_policy(ReplacePolicy::First));
        let report = patcher.apply(&file).unwrap();

        assert_eq!(report.outcome.replacements(), 1);
        assert_eq!(
            fs::read_to_string(&file).unwrap(),
            "handler{ NEW } handler{OLD}"
        );
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing.jsx");

        let result = patch_file(&file, &pattern());
        assert!(matches!(result, Err(PatchError::NotFound { .. })));
        assert!(!file.exists());
    }

    #[test]
    fn test_invalid_utf8_is_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.jsx");
        fs::write(&file, [0x68, 0xff, 0xfe, 0x00]).unwrap();

        let result = patch_file(&file, &pattern());
        assert!(matches!(result, Err(PatchError::Encoding { .. })));
        assert_eq!(fs::read(&file).unwrap(), vec![0x68, 0xff, 0xfe, 0x00]);
    }

    #[test]
    #[cfg(unix)]
    fn test_read_only_file_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.jsx");
        fs::write(&file, "x handler{OLD} y").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o444)).unwrap();

        // root ignores mode bits; nothing to check there
        if fs::OpenOptions::new().write(true).open(&file).is_ok() {
            return;
        }

        let result = patch_file(&file, &pattern());
        assert!(matches!(result, Err(PatchError::PermissionDenied { .. })));
        assert_eq!(fs::read_to_string(&file).unwrap(), "x handler{OLD} y");
    }
}
