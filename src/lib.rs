// Library interface for zwogen modules
// The binary and the integration tests both go through this crate root

pub mod batch;
pub mod compiler;
pub mod config;
pub mod description;
pub mod error;
pub mod export;
pub mod generator;
pub mod logging;
pub mod models;
pub mod notation;
pub mod presets;
pub mod storage;
pub mod zones;

// Re-export commonly used types for convenience
pub use models::*;
pub use compiler::{compile_workout, SegmentCompiler};
pub use notation::NotationParser;
pub use export::{ExportFormat, ZwoWriter};
pub use generator::{GeneratedWorkout, GeneratorSettings, WorkoutGenerator};
pub use storage::{LocalStore, WorkoutStore};
pub use zones::{zone_to_power, Zone};
pub use error::{ZwoError, Result};
pub use logging::{LogConfig, LogLevel, LogFormat};
