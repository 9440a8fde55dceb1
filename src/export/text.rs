use rust_decimal::Decimal;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::models::{Segment, WorkoutDocument};
use crate::zones::{describe_power, power_to_watts};

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Segment")]
    kind: &'static str,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Watts")]
    watts: String,
    #[tabled(rename = "Cadence")]
    cadence: String,
}

/// Human-readable summary of a workout, one table row per segment
pub fn render_summary(document: &WorkoutDocument) -> String {
    let rows: Vec<SegmentRow> = document
        .segments
        .iter()
        .enumerate()
        .map(|(i, segment)| segment_row(i + 1, segment, document.ftp))
        .collect();

    let mut out = format!(
        "{}\nTotal: {} | Segments: {} | FTP: {}w\n\n",
        document.title,
        format_clock(document.total_duration()),
        document.segments.len(),
        document.ftp
    );
    out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    out.push('\n');
    out
}

fn segment_row(index: usize, segment: &Segment, ftp: u16) -> SegmentRow {
    let (target, watts) = match segment {
        Segment::Warmup(ramp) | Segment::Cooldown(ramp) | Segment::Ramp(ramp) => (
            format!("{} -> {}", percent(ramp.power_low), percent(ramp.power_high)),
            format!(
                "{}-{}",
                power_to_watts(ramp.power_low, ftp),
                power_to_watts(ramp.power_high, ftp)
            ),
        ),
        Segment::SteadyState(steady) => (
            format!("{} ({})", percent(steady.power), describe_power(steady.power)),
            power_to_watts(steady.power, ftp).to_string(),
        ),
        Segment::IntervalBlock(block) => (
            format!(
                "{} x {}s @ {} / {}s @ {}",
                block.repeat,
                block.on_duration,
                percent(block.on_power),
                block.off_duration,
                percent(block.off_power)
            ),
            format!(
                "{} / {}",
                power_to_watts(block.on_power, ftp),
                power_to_watts(block.off_power, ftp)
            ),
        ),
    };

    SegmentRow {
        index,
        kind: segment.element_name(),
        duration: format_clock(segment.duration()),
        target,
        watts,
        cadence: segment
            .cadence()
            .map(|rpm| format!("{} rpm", rpm))
            .unwrap_or_else(|| "-".to_string()),
    }
}

fn percent(power: Decimal) -> String {
    format!("{}%", (power * Decimal::ONE_HUNDRED).normalize())
}

/// `m:ss` below an hour, `h:mm:ss` above
pub fn format_clock(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_workout;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(330), "5:30");
        assert_eq!(format_clock(3900), "1:05:00");
    }

    #[test]
    fn test_summary_lists_segments_in_watts() {
        let compiled = compile_workout("Tempo", "Z1-Z2 base\n1 x 20' Z3 HR, 85+ rpm", 300);
        let document = WorkoutDocument::new("Tempo", compiled);
        let summary = render_summary(&document);

        assert!(summary.starts_with("Tempo\nTotal: 40:00 | Segments: 3 | FTP: 300w\n\n"));
        assert!(summary.contains("SteadyState"));
        assert!(summary.contains("83% (Z3, RPE 4-5)"));
        assert!(summary.contains("249"));
        assert!(summary.contains("150-195"));
    }
}
