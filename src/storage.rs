//! Workout file storage
//!
//! Filenames are derived from the workout name plus a local timestamp. The
//! store never overwrites: a taken name gets a numeric suffix instead, which
//! keeps concurrent batch writers from clobbering each other.

use chrono::{DateTime, TimeZone};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, ZwoError};

const FALLBACK_NAME: &str = "workout";
const MAX_SUFFIX: u32 = 1000;

/// Make a workout name safe to use as a filename
///
/// Reserved characters, non-ASCII characters, whitespace and control
/// characters become `_`; runs of `_` collapse and leading/trailing `_` are
/// trimmed.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for c in name.chars() {
        let mapped = match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | ' ' => '_',
            c if !c.is_ascii() || c.is_ascii_control() => '_',
            c => c,
        };
        if mapped == '_' && out.ends_with('_') {
            continue;
        }
        out.push(mapped);
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<sanitized-name>_<YYYYMMDD_HHMMSS>.<extension>`
pub fn timestamped_filename<Tz>(name: &str, at: &DateTime<Tz>, extension: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.{}",
        sanitize_filename(name),
        at.format("%Y%m%d_%H%M%S"),
        extension.trim_start_matches('.')
    )
}

/// Somewhere rendered workouts can be written to
pub trait WorkoutStore: Send + Sync {
    /// Persist `contents` under `filename` and return the final location
    fn save(&self, filename: &str, contents: &[u8]) -> Result<PathBuf>;
}

/// Store backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidate(&self, filename: &str, attempt: u32) -> PathBuf {
        if attempt == 0 {
            return self.root.join(filename);
        }

        let path = Path::new(filename);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(FALLBACK_NAME);
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.root.join(format!("{}_{}.{}", stem, attempt, ext)),
            None => self.root.join(format!("{}_{}", stem, attempt)),
        }
    }
}

impl WorkoutStore for LocalStore {
    fn save(&self, filename: &str, contents: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|err| ZwoError::Storage {
            path: self.root.clone(),
            reason: err.to_string(),
        })?;

        for attempt in 0..MAX_SUFFIX {
            let path = self.candidate(filename, attempt);

            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "File exists, trying next suffix");
                    continue;
                }
                Err(err) => {
                    return Err(ZwoError::Storage {
                        path,
                        reason: err.to_string(),
                    })
                }
            };

            file.write_all(contents).map_err(|err| ZwoError::Storage {
                path: path.clone(),
                reason: err.to_string(),
            })?;

            info!(path = %path.display(), bytes = contents.len(), "Saved workout file");
            return Ok(path);
        }

        Err(ZwoError::Storage {
            path: self.root.join(filename),
            reason: format!("no free filename after {} attempts", MAX_SUFFIX),
        })
    }
}
