//! Segment compiler
//!
//! Maps parsed notation blocks onto playable segments, adding the framing
//! warmup and cooldown. Pure and deterministic: the same text and FTP always
//! produce the same segment sequence.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};

use crate::description::format_description;
use crate::models::{CompiledWorkout, Segment};
use crate::notation::{
    Block, BlockKind, IntervalSet, NotationParser, ParsedNotation, DEFAULT_CADENCE, MAX_EFFORT_CADENCE,
};
use crate::zones::Zone;

const FRAMING_SECS: u32 = 600;

/// Fixed max/easy sub-pattern done inside every interval set
const SUB_INTERVAL_REPEATS: u32 = 5;
const SUB_INTERVAL_SECS: u32 = 30;
const SUB_INTERVAL_ON_POWER: Decimal = dec!(1.20);

const SFR_BLOCK_SECS: u32 = 240;

/// Upper bound on expanded sets; larger counts are clamped
pub const MAX_SETS: u32 = 100;

/// Zone-based segment compiler
pub struct SegmentCompiler;

impl SegmentCompiler {
    /// Compile parsed notation into an ordered segment list
    ///
    /// Emits a Warmup first when any warmup line was seen and always ends
    /// with exactly one Cooldown.
    pub fn compile(parsed: &ParsedNotation) -> Vec<Segment> {
        let mut segments = Vec::new();

        if parsed.has_warmup() {
            segments.push(Self::warmup());
        }

        for block in &parsed.blocks {
            Self::compile_block(block, &mut segments);
        }

        segments.push(Self::cooldown());
        segments
    }

    /// 10 min ramp from Z1 to Z2
    pub fn warmup() -> Segment {
        Segment::warmup(FRAMING_SECS, Zone::Z1.power(), Zone::Z2.power(), Some(DEFAULT_CADENCE))
    }

    /// 10 min ramp from Z2 down to Z1
    pub fn cooldown() -> Segment {
        Segment::cooldown(FRAMING_SECS, Zone::Z2.power(), Zone::Z1.power(), Some(DEFAULT_CADENCE))
    }

    fn compile_block(block: &Block, segments: &mut Vec<Segment>) {
        match &block.kind {
            BlockKind::IntervalSet(set) => Self::compile_interval_set(set, segments),
            BlockKind::SteadyZone(zone) if zone.endurance => match zone.duration {
                Some(duration) => segments.push(Segment::steady(
                    duration,
                    Zone::Z3.power(),
                    Some(MAX_EFFORT_CADENCE),
                )),
                None => debug!(head = %block.head, "Endurance block without a duration, skipped"),
            },
            BlockKind::Surge(surge) => segments.extend(Segment::intervals(
                1,
                (surge.on_duration, surge.on_power),
                (surge.off_duration, surge.off_power),
                Some(surge.cadence),
                None,
            )),
            BlockKind::Sfr(sfr) => {
                segments.push(Segment::steady(sfr.duration, Zone::Z3.power(), Some(sfr.cadence)))
            }
            BlockKind::SteadyZone(_) | BlockKind::WarmupMarker => {}
        }
    }

    /// One max/easy interval block per set, an SFR effort after it when one
    /// was given, and a recovery between sets (never after the last).
    ///
    /// A missing recovery token still yields a zero-length recovery segment.
    fn compile_interval_set(set: &IntervalSet, segments: &mut Vec<Segment>) {
        let sets = set.sets.min(MAX_SETS);
        if sets < set.sets {
            warn!(requested = set.sets, sets, "Set count clamped");
        }

        for set_index in 0..sets {
            segments.extend(Segment::intervals(
                SUB_INTERVAL_REPEATS,
                (SUB_INTERVAL_SECS, SUB_INTERVAL_ON_POWER),
                (SUB_INTERVAL_SECS, Zone::Z2.power()),
                Some(MAX_EFFORT_CADENCE),
                None,
            ));

            if let Some(cadence) = set.sfr_cadence {
                segments.push(Segment::steady(SFR_BLOCK_SECS, Zone::Z3.power(), Some(cadence)));
            }

            if set_index + 1 < sets {
                segments.push(Segment::steady(set.recovery, Zone::Z2.power(), Some(DEFAULT_CADENCE)));
            }
        }
    }
}

/// Compile a titled free-text workout against an FTP baseline
pub fn compile_workout(title: &str, description: &str, ftp: u16) -> CompiledWorkout {
    let parsed = NotationParser::parse(description);
    let segments = SegmentCompiler::compile(&parsed);

    info!(
        title,
        blocks = parsed.blocks.len(),
        segments = segments.len(),
        ftp,
        "Compiled workout"
    );

    CompiledWorkout {
        description: format_description(title, description),
        segments,
        ftp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady_states(segments: &[Segment]) -> Vec<(u32, Decimal, Option<u32>)> {
        segments
            .iter()
            .filter_map(|s| match s {
                Segment::SteadyState(ss) => Some((ss.duration, ss.power, ss.cadence)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_input_is_cooldown_only() {
        let compiled = compile_workout("Empty", "", 250);
        assert_eq!(compiled.segments, vec![SegmentCompiler::cooldown()]);
    }

    #[test]
    fn test_warmup_added_for_base_line() {
        let compiled = compile_workout("Base", "Z1-Z2 base ride", 250);
        assert_eq!(
            compiled.segments,
            vec![SegmentCompiler::warmup(), SegmentCompiler::cooldown()]
        );
    }

    #[test]
    fn test_sfr_interval_set() {
        let text = "6x5' / 3' recovery done as...\n30\" max / 30\" easy\n4' SFR (50-60r, 300-330w)";
        let segments = compile_workout("SFR", text, 300).segments;

        // 6 x (intervals + sfr) + 5 recoveries + cooldown
        assert_eq!(segments.len(), 18);
        assert!(matches!(segments[0], Segment::IntervalBlock(_)));
        assert_eq!(segments[1], Segment::steady(240, dec!(0.83), Some(55)));
        assert_eq!(segments[2], Segment::steady(180, dec!(0.65), Some(85)));
        assert!(matches!(segments[15], Segment::IntervalBlock(_)));
        assert_eq!(segments[16], Segment::steady(240, dec!(0.83), Some(55)));
        assert!(segments[17].is_cooldown());
    }

    #[test]
    fn test_zero_recovery_still_emitted() {
        let segments = compile_workout("No recovery", "3x4' / hard", 250).segments;
        let recoveries = steady_states(&segments);
        assert_eq!(recoveries, vec![(0, dec!(0.65), Some(85)); 2]);
    }

    #[test]
    fn test_huge_set_count_is_clamped() {
        let segments = compile_workout("Too many", "100000x1' / 1' recovery", 250).segments;
        let blocks = segments.iter().filter(|s| matches!(s, Segment::IntervalBlock(_))).count();
        assert_eq!(blocks, MAX_SETS as usize);
    }

    #[test]
    fn test_endurance_block() {
        let segments = compile_workout("Endurance", "1 x 20' Z3 HR (150-160bpm), mostly 85+ rpm", 250).segments;
        assert_eq!(segments[0], Segment::steady(1200, dec!(0.83), Some(90)));
        assert!(segments[1].is_cooldown());
    }

    #[test]
    fn test_endurance_without_duration_is_skipped() {
        let segments = compile_workout("Endurance", "Z3 HR steady, 85+ rpm", 250).segments;
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_endurance_after_interval_set() {
        let segments = compile_workout("Mixed", "3x5' / 2' recovery\n20' Z3 HR 85+ rpm", 250).segments;
        assert_eq!(
            steady_states(&segments),
            vec![
                (120, dec!(0.65), Some(85)),
                (120, dec!(0.65), Some(85)),
                (1200, dec!(0.83), Some(90)),
            ]
        );
        assert!(segments.last().unwrap().is_cooldown());
    }

    #[test]
    fn test_endurance_after_warmup_line() {
        let segments = compile_workout("Base", "Z1-Z2 base\nZ3 85+ rpm for 20'", 250).segments;
        assert_eq!(
            segments,
            vec![
                SegmentCompiler::warmup(),
                Segment::steady(1200, dec!(0.83), Some(90)),
                SegmentCompiler::cooldown(),
            ]
        );
    }

    #[test]
    fn test_uppercase_hr_alone_is_not_endurance() {
        let skipped = compile_workout("Tempo", "1 x 20' Z3 HR steady", 250).segments;
        assert_eq!(skipped, vec![SegmentCompiler::cooldown()]);

        let kept = compile_workout("Tempo", "1 x 20' Z3 hr steady", 250).segments;
        assert_eq!(kept[0], Segment::steady(1200, dec!(0.83), Some(90)));
    }

    #[test]
    fn test_standalone_surge() {
        let segments = compile_workout("Surges", "30\" max / 30\" easy", 250).segments;
        assert_eq!(
            segments[0],
            Segment::intervals(1, (30, dec!(1.20)), (30, dec!(0.65)), Some(90), None).unwrap()
        );
    }

    #[test]
    fn test_description_is_formatted() {
        let compiled = compile_workout("Gavin", "", 250);
        assert_eq!(compiled.description, crate::description::GAVIN_TEMPLATE);
        assert_eq!(compiled.ftp, 250);
    }
}
