use serde::{Deserialize, Serialize};

use crate::error::{Result, ZwoError};
use crate::models::WorkoutDocument;

pub mod text;
pub mod zwo;

pub use zwo::ZwoWriter;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Zwo,
    Json,
    Text,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zwo" | "xml" => Ok(ExportFormat::Zwo),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ZwoError::Validation(format!("Unsupported export format: {}", s))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Zwo => "zwo",
            ExportFormat::Json => "json",
            ExportFormat::Text => "txt",
        }
    }
}

/// Render a document in the requested format
pub fn render(document: &WorkoutDocument, format: ExportFormat, author: &str) -> Result<String> {
    match format {
        ExportFormat::Zwo => ZwoWriter::new(author).render(document),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        ExportFormat::Text => Ok(text::render_summary(document)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_workout;

    #[test]
    fn test_format_parsing() {
        assert_eq!(ExportFormat::from_str("ZWO").unwrap(), ExportFormat::Zwo);
        assert_eq!(ExportFormat::from_str("txt").unwrap(), ExportFormat::Text);
        assert!(matches!(
            ExportFormat::from_str("fit"),
            Err(ZwoError::Validation(_))
        ));
    }

    #[test]
    fn test_json_render_round_trips() {
        let document = WorkoutDocument::new("Base", compile_workout("Base", "Z2 base", 250));
        let json = render(&document, ExportFormat::Json, "Coach").unwrap();
        let parsed: WorkoutDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, document);
    }
}
