//! End-to-end workout generation: compile, render, save

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::compiler::compile_workout;
use crate::config::AppConfig;
use crate::error::{Result, ZwoError};
use crate::export::zwo::{ZwoWriter, DEFAULT_AUTHOR};
use crate::models::{CompiledWorkout, Segment, WorkoutDocument};
use crate::presets;
use crate::storage::{timestamped_filename, WorkoutStore};

/// Values every generated document shares
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub author: String,
    pub ftp: u16,
    pub extension: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        GeneratorSettings {
            author: DEFAULT_AUTHOR.to_string(),
            ftp: crate::config::DEFAULT_FTP,
            extension: "zwo".to_string(),
        }
    }
}

impl GeneratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        GeneratorSettings {
            author: config.output.author.clone(),
            ftp: config.athlete.ftp,
            extension: config.output.extension.clone(),
        }
    }
}

/// A workout that was written to the store
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedWorkout {
    pub path: PathBuf,
    pub document: WorkoutDocument,
}

/// Compiles workouts and writes them through a [`WorkoutStore`]
pub struct WorkoutGenerator<S: WorkoutStore> {
    store: S,
    settings: GeneratorSettings,
    writer: ZwoWriter,
}

impl<S: WorkoutStore> WorkoutGenerator<S> {
    pub fn new(store: S, settings: GeneratorSettings) -> Self {
        let writer = ZwoWriter::new(settings.author.clone());
        WorkoutGenerator {
            store,
            settings,
            writer,
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compile free-text notation into a document
    pub fn build_document(&self, name: &str, description: &str) -> Result<WorkoutDocument> {
        let name = validate_name(name)?;
        let compiled = compile_workout(name, description, self.settings.ftp);
        Ok(WorkoutDocument::new(name, compiled))
    }

    /// Expand a named preset into a document, titled after the preset unless
    /// a name is given
    pub fn build_preset(&self, key: &str, repeats: Option<u32>, name: Option<&str>) -> Result<WorkoutDocument> {
        let preset = presets::find(key)?;
        let title = match name {
            Some(name) => validate_name(name)?,
            None => preset.title,
        };
        let compiled = preset.compile(repeats, self.settings.ftp)?;
        Ok(WorkoutDocument::new(title, compiled))
    }

    /// Wrap already-built segments in a document, skipping notation parsing
    pub fn build_from_segments(
        &self,
        name: &str,
        description: String,
        segments: Vec<Segment>,
    ) -> Result<WorkoutDocument> {
        let name = validate_name(name)?;
        let compiled = CompiledWorkout {
            description,
            segments,
            ftp: self.settings.ftp,
        };
        Ok(WorkoutDocument::new(name, compiled))
    }

    /// Serialize a document to `.zwo` XML
    pub fn render(&self, document: &WorkoutDocument) -> Result<String> {
        self.writer.render(document)
    }

    /// Render and save a document, stamped with the current local time
    pub fn save_document(&self, document: WorkoutDocument) -> Result<GeneratedWorkout> {
        self.save_document_at(document, &Local::now())
    }

    pub fn save_document_at(&self, document: WorkoutDocument, at: &DateTime<Local>) -> Result<GeneratedWorkout> {
        let xml = self.render(&document)?;
        let filename = timestamped_filename(&document.title, at, &self.settings.extension);
        let path = self.store.save(&filename, xml.as_bytes())?;

        info!(
            title = %document.title,
            path = %path.display(),
            segments = document.segments.len(),
            "Generated workout"
        );

        Ok(GeneratedWorkout { path, document })
    }

    /// Compile, render and save a free-text workout
    pub fn generate(&self, name: &str, description: &str) -> Result<GeneratedWorkout> {
        let document = self.build_document(name, description)?;
        self.save_document(document)
    }

    /// Expand, render and save a preset
    pub fn generate_preset(&self, key: &str, repeats: Option<u32>, name: Option<&str>) -> Result<GeneratedWorkout> {
        let document = self.build_preset(key, repeats, name)?;
        self.save_document(document)
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ZwoError::Validation("Workout name must not be empty".to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    fn generator(dir: &std::path::Path) -> WorkoutGenerator<LocalStore> {
        WorkoutGenerator::new(LocalStore::new(dir), GeneratorSettings::default())
    }

    #[test]
    fn test_generate_writes_zwo_file() {
        let dir = tempdir().unwrap();
        let generated = generator(dir.path())
            .generate("SFR Intervals", "6x5' / 3' recovery\n30\" max / 30\" easy")
            .unwrap();

        let name = generated.path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("SFR_Intervals_"));
        assert!(name.ends_with(".zwo"));

        let xml = fs::read_to_string(&generated.path).unwrap();
        assert!(xml.contains("<name>SFR Intervals</name>"));
        assert_eq!(xml.matches("<IntervalsT").count(), 6);
        assert_eq!(generated.document.count("IntervalsT"), 6);
    }

    #[test]
    fn test_fixed_timestamp_filename() {
        let dir = tempdir().unwrap();
        let generator = generator(dir.path());
        let document = generator.build_document("Tempo", "Z3 steady").unwrap();
        let at = Local.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap();

        let generated = generator.save_document_at(document, &at).unwrap();
        assert_eq!(generated.path, dir.path().join("Tempo_20240501_183000.zwo"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let dir = tempdir().unwrap();
        let result = generator(dir.path()).generate("   ", "Z2");
        assert!(matches!(result, Err(ZwoError::Validation(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_preset_uses_title_and_settings() {
        let dir = tempdir().unwrap();
        let settings = GeneratorSettings {
            author: "Coach K".to_string(),
            ftp: 300,
            extension: "zwo".to_string(),
        };
        let generator = WorkoutGenerator::new(LocalStore::new(dir.path()), settings);

        let generated = generator.generate_preset("gavin-special", Some(2), None).unwrap();
        let xml = fs::read_to_string(&generated.path).unwrap();

        assert!(xml.contains("<author>Coach K</author>"));
        assert_eq!(generated.document.ftp, 300);
        assert!(generated.document.description.contains("2 x 8-minute blocks"));
    }

    #[test]
    fn test_unknown_preset() {
        let dir = tempdir().unwrap();
        let result = generator(dir.path()).build_preset("nope", None, None);
        assert!(matches!(result, Err(ZwoError::UnknownPreset { .. })));
    }
}
