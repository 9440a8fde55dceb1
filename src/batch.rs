//! Batch generation from a JSON list of workouts using rayon
//!
//! Every entry is compiled and saved independently; one bad entry is
//! recorded in the summary and does not stop the rest.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::compiler::MAX_SETS;
use crate::description::with_standard_instructions;
use crate::error::{Result, ZwoError};
use crate::generator::{GeneratedWorkout, WorkoutGenerator};
use crate::models::{Segment, WorkoutDocument};
use crate::storage::WorkoutStore;
use crate::zones::Zone;

/// One workout request in a batch file
///
/// When `sections` is present it defines the workout and `description` is
/// shown verbatim after the standard instructions; otherwise `description`
/// is compiled as notation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub workout_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<BatchSection>,
}

/// Explicit workout section, powers as fractions of FTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchSection {
    Warmup {
        duration: u32,
        power_low: Decimal,
        power_high: Decimal,
    },
    Cooldown {
        duration: u32,
        power_low: Decimal,
        power_high: Decimal,
    },
    /// `repeats` on/off pairs, each written as two steady efforts
    Intervals {
        repeats: u32,
        on_duration: u32,
        on_power: Decimal,
        off_duration: u32,
        off_power: Decimal,
    },
    /// `repeats` steady efforts, each followed by a recovery when one is given
    Tempo {
        repeats: u32,
        duration: u32,
        power: Decimal,
        #[serde(default)]
        recovery_duration: Option<u32>,
        #[serde(default)]
        recovery_power: Option<Decimal>,
    },
}

impl BatchSection {
    /// Append this section's segments in play order
    pub fn push_segments(&self, segments: &mut Vec<Segment>) -> Result<()> {
        match self {
            BatchSection::Warmup {
                duration,
                power_low,
                power_high,
            } => segments.push(Segment::warmup(*duration, *power_low, *power_high, None)),
            BatchSection::Cooldown {
                duration,
                power_low,
                power_high,
            } => segments.push(Segment::cooldown(*duration, *power_low, *power_high, None)),
            BatchSection::Intervals {
                repeats,
                on_duration,
                on_power,
                off_duration,
                off_power,
            } => {
                for _ in 0..check_repeats(*repeats)? {
                    segments.push(Segment::steady(*on_duration, *on_power, None));
                    segments.push(Segment::steady(*off_duration, *off_power, None));
                }
            }
            BatchSection::Tempo {
                repeats,
                duration,
                power,
                recovery_duration,
                recovery_power,
            } => {
                let recovery = recovery_duration.filter(|secs| *secs > 0);
                for _ in 0..check_repeats(*repeats)? {
                    segments.push(Segment::steady(*duration, *power, None));
                    if let Some(secs) = recovery {
                        let power = recovery_power.unwrap_or_else(|| Zone::Z2.power());
                        segments.push(Segment::steady(secs, power, None));
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_repeats(repeats: u32) -> Result<u32> {
    if repeats > MAX_SETS {
        return Err(ZwoError::Validation(format!(
            "Section repeats must be at most {}, got {}",
            MAX_SETS, repeats
        )));
    }
    Ok(repeats)
}

impl BatchEntry {
    /// An entry compiled from notation
    pub fn notation(workout_name: impl Into<String>, description: impl Into<String>) -> Self {
        BatchEntry {
            workout_name: workout_name.into(),
            description: description.into(),
            sections: Vec::new(),
        }
    }

    /// Sections in order, flattened into segments
    pub fn section_segments(&self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        for section in &self.sections {
            section.push_segments(&mut segments)?;
        }
        Ok(segments)
    }

    /// Build the document: explicit sections win over notation
    pub fn build_document<S: WorkoutStore>(&self, generator: &WorkoutGenerator<S>) -> Result<WorkoutDocument> {
        if self.sections.is_empty() {
            return generator.build_document(&self.workout_name, &self.description);
        }

        generator.build_from_segments(
            &self.workout_name,
            with_standard_instructions(&self.description),
            self.section_segments()?,
        )
    }
}

/// Read a JSON array of [`BatchEntry`] values
pub fn load_entries<P: AsRef<Path>>(path: P) -> Result<Vec<BatchEntry>> {
    let content = fs::read_to_string(&path)?;
    let entries: Vec<BatchEntry> = serde_json::from_str(&content)?;
    debug!(path = %path.as_ref().display(), entries = entries.len(), "Loaded batch file");
    Ok(entries)
}

/// Configuration for batch runs
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Worker threads; `None` uses one per CPU
    pub num_threads: Option<usize>,
    /// Show progress bar
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            show_progress: true,
        }
    }
}

/// Outcome for one batch entry
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub workout_name: String,
    pub path: Option<PathBuf>,
    pub segments: usize,
    pub duration_ms: u128,

    /// 2 when a transient failure was retried
    pub attempts: u32,
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a batch run, results in input order
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration_ms: u128,
    pub results: Vec<BatchItemResult>,
}

impl BatchSummary {
    fn from_results(results: Vec<BatchItemResult>, total_duration_ms: u128) -> Self {
        let succeeded = results.iter().filter(|r| r.success()).count();
        BatchSummary {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            total_duration_ms,
            results,
        }
    }

    pub fn is_fully_successful(&self) -> bool {
        self.failed == 0
    }

    pub fn to_string_pretty(&self) -> String {
        format!(
            "Batch Summary\n  \
             Total Workouts: {}\n  \
             Generated: {}\n  \
             Failed: {}\n  \
             Total Time: {:.2}s",
            self.total,
            self.succeeded,
            self.failed,
            self.total_duration_ms as f64 / 1000.0
        )
    }
}

/// Generate every entry in parallel
pub fn run_batch<S: WorkoutStore>(
    generator: &WorkoutGenerator<S>,
    entries: &[BatchEntry],
    config: &BatchConfig,
) -> Result<BatchSummary> {
    let start_time = Instant::now();
    info!("Starting batch generation of {} workouts", entries.len());

    let progress = config.show_progress.then(|| {
        let pb = ProgressBar::new(entries.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    });

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(num_threads) = config.num_threads {
        builder = builder.num_threads(num_threads);
    }
    let pool = builder
        .build()
        .map_err(|e| ZwoError::Configuration(format!("Failed to create thread pool: {}", e)))?;

    let results: Vec<BatchItemResult> = pool.install(|| {
        entries
            .par_iter()
            .map(|entry| {
                let result = generate_entry(generator, entry);
                if let Some(pb) = &progress {
                    pb.set_message(entry.workout_name.clone());
                    pb.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(pb) = progress {
        pb.finish_with_message("Complete");
    }

    let summary = BatchSummary::from_results(results, start_time.elapsed().as_millis());
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Batch generation finished"
    );
    Ok(summary)
}

fn build_and_save<S: WorkoutStore>(generator: &WorkoutGenerator<S>, entry: &BatchEntry) -> Result<GeneratedWorkout> {
    let document = entry.build_document(generator)?;
    generator.save_document(document)
}

fn generate_entry<S: WorkoutStore>(generator: &WorkoutGenerator<S>, entry: &BatchEntry) -> BatchItemResult {
    let started = Instant::now();
    let mut attempts = 1;
    let mut outcome = build_and_save(generator, entry);

    if matches!(&outcome, Err(err) if err.is_retryable()) {
        debug!(workout = %entry.workout_name, "Retrying after transient failure");
        attempts += 1;
        outcome = build_and_save(generator, entry);
    }

    match outcome {
        Ok(generated) => BatchItemResult {
            workout_name: entry.workout_name.clone(),
            path: Some(generated.path),
            segments: generated.document.segments.len(),
            duration_ms: started.elapsed().as_millis(),
            attempts,
            error: None,
        },
        Err(err) => {
            warn!(workout = %entry.workout_name, attempts, error = %err, "Failed to generate workout");
            BatchItemResult {
                workout_name: entry.workout_name.clone(),
                path: None,
                segments: 0,
                duration_ms: started.elapsed().as_millis(),
                attempts,
                error: Some(err.user_message()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorSettings;
    use crate::description::STANDARD_INSTRUCTIONS;
    use crate::storage::LocalStore;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn quiet() -> BatchConfig {
        BatchConfig {
            num_threads: Some(2),
            show_progress: false,
        }
    }

    #[test]
    fn test_load_entries_defaults_description() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"[{"workout_name": "A", "description": "Z2"}, {"workout_name": "Gavin Day"}]"#,
        )
        .unwrap();

        let entries = load_entries(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].description, "");
    }

    #[test]
    fn test_load_entries_rejects_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_entries(&path), Err(ZwoError::Serialization(_))));
        assert!(matches!(
            load_entries(dir.path().join("missing.json")),
            Err(ZwoError::Io(_))
        ));
    }

    #[test]
    fn test_batch_keeps_going_after_failure() {
        let dir = tempdir().unwrap();
        let generator = WorkoutGenerator::new(LocalStore::new(dir.path()), GeneratorSettings::default());
        let entries = vec![
            BatchEntry::notation("Same", "Z2 base"),
            BatchEntry::notation("  ", "Z2"),
            BatchEntry::notation("Same", "3x5' / 2' recovery"),
        ];

        let summary = run_batch(&generator, &entries, &quiet()).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_fully_successful());
        assert!(summary.results[1].error.is_some());
        // validation failures are not retried
        assert_eq!(summary.results[1].attempts, 1);
        assert_ne!(summary.results[0].path, summary.results[2].path);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_sections_map_to_segments() {
        let json = r#"{
            "workout_name": "Power Blocks",
            "description": "Main set notes",
            "sections": [
                {"type": "Warmup", "duration": 600, "power_low": 0.5, "power_high": 0.75},
                {"type": "Intervals", "repeats": 2, "on_duration": 30, "on_power": 1.5,
                 "off_duration": 30, "off_power": 0.6},
                {"type": "Tempo", "repeats": 2, "duration": 240, "power": 0.95,
                 "recovery_duration": 120, "recovery_power": 0.6},
                {"type": "Tempo", "repeats": 1, "duration": 300, "power": 0.85},
                {"type": "Cooldown", "duration": 600, "power_low": 0.7, "power_high": 0.5}
            ]
        }"#;
        let entry: BatchEntry = serde_json::from_str(json).unwrap();
        let segments = entry.section_segments().unwrap();

        assert_eq!(
            segments,
            vec![
                Segment::warmup(600, dec!(0.5), dec!(0.75), None),
                Segment::steady(30, dec!(1.5), None),
                Segment::steady(30, dec!(0.6), None),
                Segment::steady(30, dec!(1.5), None),
                Segment::steady(30, dec!(0.6), None),
                Segment::steady(240, dec!(0.95), None),
                Segment::steady(120, dec!(0.6), None),
                Segment::steady(240, dec!(0.95), None),
                Segment::steady(120, dec!(0.6), None),
                Segment::steady(300, dec!(0.85), None),
                Segment::cooldown(600, dec!(0.7), dec!(0.5), None),
            ]
        );
    }

    #[test]
    fn test_sections_take_precedence_over_notation() {
        let dir = tempdir().unwrap();
        let generator = WorkoutGenerator::new(LocalStore::new(dir.path()), GeneratorSettings::default());
        let entry = BatchEntry {
            workout_name: "Structured".to_string(),
            description: "6x5' / 3' recovery".to_string(),
            sections: vec![BatchSection::Tempo {
                repeats: 3,
                duration: 600,
                power: dec!(0.88),
                recovery_duration: Some(0),
                recovery_power: None,
            }],
        };

        let document = entry.build_document(&generator).unwrap();
        assert_eq!(document.segments, vec![Segment::steady(600, dec!(0.88), None); 3]);
        assert!(document.description.starts_with(STANDARD_INSTRUCTIONS));
        assert!(document.description.ends_with("6x5' / 3' recovery"));
    }

    #[test]
    fn test_section_repeats_are_bounded() {
        let section = BatchSection::Intervals {
            repeats: MAX_SETS + 1,
            on_duration: 30,
            on_power: dec!(1.2),
            off_duration: 30,
            off_power: dec!(0.5),
        };
        let mut segments = Vec::new();
        assert!(matches!(
            section.push_segments(&mut segments),
            Err(ZwoError::Validation(_))
        ));
        assert!(segments.is_empty());
    }

    /// Fails the first save with a storage error, then delegates
    struct FlakyStore {
        inner: LocalStore,
        failures_left: AtomicUsize,
    }

    impl WorkoutStore for FlakyStore {
        fn save(&self, filename: &str, contents: &[u8]) -> Result<PathBuf> {
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(ZwoError::Storage {
                    path: self.inner.root().join(filename),
                    reason: "temporarily unavailable".to_string(),
                });
            }
            self.inner.save(filename, contents)
        }
    }

    #[test]
    fn test_transient_storage_failure_is_retried_once() {
        let dir = tempdir().unwrap();
        let store = FlakyStore {
            inner: LocalStore::new(dir.path()),
            failures_left: AtomicUsize::new(1),
        };
        let generator = WorkoutGenerator::new(store, GeneratorSettings::default());
        let entries = vec![BatchEntry::notation("Retry Me", "Z2")];
        let config = BatchConfig {
            num_threads: Some(1),
            show_progress: false,
        };

        let summary = run_batch(&generator, &entries, &config).unwrap();
        assert!(summary.is_fully_successful());
        assert_eq!(summary.results[0].attempts, 2);

        generator.store().failures_left.store(2, Ordering::SeqCst);
        let summary = run_batch(&generator, &entries, &config).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results[0].attempts, 2);
        assert!(summary.results[0].error.as_ref().unwrap().contains("Could not save"));
    }
}
