//! Workout notation parser
//!
//! Turns informal coach notation into an ordered list of [`Block`] tokens.
//! Recognized lexical forms:
//! - interval sets `6x5' / 3' recovery`
//! - duration marks `5'` (minutes) and `30"` (seconds), or words `5 min`, `45 sec`
//! - zone tokens `Z1`..`Z7` and `max`
//! - cadence ranges `50-60r` and the `SFR` keyword
//!
//! Every numeric extraction falls back to a documented default when its
//! pattern does not match. Parsing never fails.

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::zones::{zone_to_power, Zone};

/// Default duration when no `N min` / `N sec` is present (5 minutes)
pub const DEFAULT_DURATION_SECS: u32 = 300;
/// Cadence when nothing more specific is known
pub const DEFAULT_CADENCE: u32 = 85;
/// Low-cadence strength work
pub const SFR_CADENCE: u32 = 55;
/// Cadence for max efforts
pub const MAX_EFFORT_CADENCE: u32 = 90;

const DEFAULT_SURGE_SECS: u32 = 30;
const DEFAULT_SFR_SECS: u32 = 240;

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn set_start_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?i)^\d+\s*x")
}

fn mark_start_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r#"^\d+['"]"#)
}

fn sets_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?i)(\d+)\s*x\s*(\d+)")
}

fn recovery_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?i)(\d+)'\s*recovery")
}

fn sfr_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?i)sfr.*?(\d+)-(\d+)r")
}

fn cadence_range_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?i)(\d+)-(\d+)r")
}

fn minutes_word_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?i)(\d+)\s*min")
}

fn seconds_word_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(?i)(\d+)\s*sec")
}

fn mark_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r#"(\d+)(['"])"#)
}

fn minutes_mark_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached(&RE, r"(\d+)'")
}

fn capture_one(re: Option<&Regex>, text: &str) -> Option<u32> {
    re?.captures(text)?.get(1)?.as_str().parse().ok()
}

fn capture_pair(re: Option<&Regex>, text: &str) -> Option<(u32, u32)> {
    let caps = re?.captures(text)?;
    let first = caps.get(1)?.as_str().parse().ok()?;
    let second = caps.get(2)?.as_str().parse().ok()?;
    Some((first, second))
}

fn minutes_to_secs(minutes: u32) -> Option<u32> {
    minutes.checked_mul(60)
}

/// Parameters of an `SxM / R' recovery` interval set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalSet {
    /// Number of sets (1 when no `SxM` token is found)
    pub sets: u32,

    /// Length of one set in seconds (0 when no `SxM` token is found)
    pub interval_length: u32,

    /// Recovery between sets in seconds (0 when absent)
    pub recovery: u32,

    /// Midpoint of the SFR cadence range, if one is given
    pub sfr_cadence: Option<u32>,
}

/// A standalone `30" max / 30" easy` on/off pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surge {
    pub on_duration: u32,
    pub off_duration: u32,
    pub on_power: Decimal,
    pub off_power: Decimal,
    pub cadence: u32,
}

/// A line naming a zone, optionally with a minute duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadyZone {
    pub zone: Zone,

    /// Duration from an `N'` mark
    pub duration: Option<u32>,

    /// Z3 line with a heart-rate or `85+` cue
    pub endurance: bool,
}

/// A standalone `4' SFR (50-60r)` effort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SfrEffort {
    pub duration: u32,
    pub cadence: u32,
}

/// Recognized block kinds and their raw parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BlockKind {
    IntervalSet(IntervalSet),
    Surge(Surge),
    SteadyZone(SteadyZone),
    Sfr(SfrEffort),
    WarmupMarker,
}

impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::IntervalSet(_) => "interval_set",
            BlockKind::Surge(_) => "surge",
            BlockKind::SteadyZone(_) => "steady_zone",
            BlockKind::Sfr(_) => "sfr",
            BlockKind::WarmupMarker => "warmup_marker",
        }
    }
}

/// A block-starting line plus the detail lines that followed it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub head: String,
    pub details: Vec<String>,
}

impl Block {
    /// Head and detail lines joined with newlines
    pub fn text(&self) -> String {
        joined(&self.head, &self.details)
    }
}

/// Result of parsing a description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedNotation {
    /// Lines mentioning `base` or `z1-z2`
    pub warmup_lines: Vec<String>,

    /// Every other non-empty line
    pub main_lines: Vec<String>,

    pub blocks: Vec<Block>,
}

impl ParsedNotation {
    pub fn has_warmup(&self) -> bool {
        !self.warmup_lines.is_empty()
    }
}

fn joined(head: &str, details: &[String]) -> String {
    let mut text = head.to_string();
    for line in details {
        text.push('\n');
        text.push_str(line);
    }
    text
}

/// Whether a line belongs to the warmup/base section
pub fn is_warmup_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("base") || lower.contains("z1-z2")
}

/// `6x5'`, `1 x 20'`
pub fn starts_interval_set(line: &str) -> bool {
    set_start_regex().is_some_and(|re| re.is_match(line))
}

/// `30" max`, `4' SFR`
pub fn starts_with_mark(line: &str) -> bool {
    mark_start_regex().is_some_and(|re| re.is_match(line))
}

/// Z3 line carrying a heart-rate or `85+` cadence cue
///
/// `z3` matches in any case; `hr` and `85+` must appear as written.
pub fn is_endurance_marker(line: &str) -> bool {
    line.to_lowercase().contains("z3") && (line.contains("hr") || line.contains("85+"))
}

/// `30" max / 30" easy`, `4' SFR`: lines that spell out how a set is ridden
fn is_set_breakdown(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains('/') || lower.contains("max") || lower.contains("sfr")
}

/// Parse `SxM`, `R' recovery` and SFR cadence from interval-set text
pub fn parse_interval_set(text: &str) -> IntervalSet {
    let (sets, interval_length) = match capture_pair(sets_regex(), text)
        .and_then(|(sets, minutes)| Some((sets, minutes_to_secs(minutes)?)))
    {
        Some(parsed) => parsed,
        None => {
            trace!(text, "No SxM token, defaulting to a single set");
            (1, 0)
        }
    };

    IntervalSet {
        sets,
        interval_length,
        recovery: parse_recovery(text),
        sfr_cadence: parse_sfr_cadence(text),
    }
}

/// `3' recovery` → 180, otherwise 0
pub fn parse_recovery(text: &str) -> u32 {
    capture_one(recovery_regex(), text)
        .and_then(minutes_to_secs)
        .unwrap_or(0)
}

/// `SFR (50-60r)` → 55
pub fn parse_sfr_cadence(text: &str) -> Option<u32> {
    capture_pair(sfr_regex(), text).map(|(low, high)| midpoint(low, high))
}

/// Duration written as words (`5 min`, `45 sec`); 300 seconds when absent
pub fn parse_duration(text: &str) -> u32 {
    parse_word_duration(text).unwrap_or_else(|| {
        trace!(text, "No duration words, using default");
        DEFAULT_DURATION_SECS
    })
}

/// `N min` wins over `N sec` whenever "min" appears in the text
pub fn parse_word_duration(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    if lower.contains("min") {
        capture_one(minutes_word_regex(), &lower).and_then(minutes_to_secs)
    } else if lower.contains("sec") {
        capture_one(seconds_word_regex(), &lower)
    } else {
        None
    }
}

/// First `N'` (minutes) or `N"` (seconds) mark in the text
pub fn parse_marked_duration(text: &str) -> Option<u32> {
    let caps = mark_regex()?.captures(text)?;
    let value: u32 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2)?.as_str() {
        "'" => minutes_to_secs(value),
        _ => Some(value),
    }
}

/// Marks first, then words, then the call-site default
pub fn duration_or(text: &str, default: u32) -> u32 {
    parse_marked_duration(text)
        .or_else(|| parse_word_duration(text))
        .unwrap_or(default)
}

/// Explicit `low-highr` range, else SFR 55, else max 90, else 85
pub fn parse_cadence(text: &str) -> u32 {
    if let Some((low, high)) = capture_pair(cadence_range_regex(), text) {
        return midpoint(low, high);
    }

    let lower = text.to_lowercase();
    if lower.contains("sfr") {
        SFR_CADENCE
    } else if lower.contains("max") {
        MAX_EFFORT_CADENCE
    } else {
        DEFAULT_CADENCE
    }
}

fn midpoint(low: u32, high: u32) -> u32 {
    // u64 keeps the sum from overflowing
    ((u64::from(low) + u64::from(high)) / 2) as u32
}

struct PendingBlock {
    head: String,
    details: Vec<String>,
    warmup: bool,
}

impl PendingBlock {
    fn new(head: &str, warmup: bool) -> Self {
        PendingBlock {
            head: head.to_string(),
            details: Vec::new(),
            warmup,
        }
    }

    fn is_interval_set(&self) -> bool {
        !self.warmup && starts_interval_set(&self.head) && self.head.contains('/')
    }

    fn into_block(self) -> Block {
        let kind = if self.warmup {
            BlockKind::WarmupMarker
        } else if self.is_interval_set() {
            BlockKind::IntervalSet(parse_interval_set(&joined(&self.head, &self.details)))
        } else {
            classify_line(&self.head)
        };

        debug!(kind = kind.name(), head = %self.head, details = self.details.len(), "Recognized block");

        Block {
            kind,
            head: self.head,
            details: self.details,
        }
    }
}

/// Classify a head line that is neither a warmup marker nor an interval set
fn classify_line(head: &str) -> BlockKind {
    if is_endurance_marker(head) {
        return BlockKind::SteadyZone(SteadyZone {
            zone: Zone::Z3,
            duration: capture_one(minutes_mark_regex(), head).and_then(minutes_to_secs),
            endurance: true,
        });
    }

    if head.to_lowercase().contains("sfr") {
        return BlockKind::Sfr(SfrEffort {
            duration: duration_or(head, DEFAULT_SFR_SECS),
            cadence: parse_cadence(head),
        });
    }

    if let Some((on, off)) = head.split_once('/') {
        return BlockKind::Surge(Surge {
            on_duration: duration_or(on, DEFAULT_SURGE_SECS),
            off_duration: duration_or(off, DEFAULT_SURGE_SECS),
            on_power: zone_to_power(on),
            off_power: zone_to_power(off),
            cadence: parse_cadence(head),
        });
    }

    BlockKind::SteadyZone(SteadyZone {
        zone: Zone::from_text(head),
        duration: parse_marked_duration(head),
        endurance: false,
    })
}

/// Single-pass notation parser
pub struct NotationParser;

impl NotationParser {
    /// Split text into warmup/main lines and group it into blocks
    ///
    /// A block starts at an `Nx` line, a line opening with a duration mark, an
    /// endurance line or a warmup line; other lines become details of the open
    /// block. A warmup marker never takes details. While an interval set is
    /// open, duration-mark lines describing its on/off or SFR breakdown are
    /// its details; a blank line closes it.
    pub fn parse(text: &str) -> ParsedNotation {
        let mut parsed = ParsedNotation::default();
        let mut pending: Option<PendingBlock> = None;

        for raw in text.lines() {
            let line = raw.trim().trim_start_matches('-').trim_start();

            if line.is_empty() {
                if pending.as_ref().is_some_and(PendingBlock::is_interval_set) {
                    Self::flush(&mut pending, &mut parsed.blocks);
                }
                continue;
            }

            let warmup = is_warmup_line(line);
            if warmup {
                parsed.warmup_lines.push(line.to_string());
            } else {
                parsed.main_lines.push(line.to_string());
            }

            let in_set = pending.as_ref().is_some_and(PendingBlock::is_interval_set);
            let after_warmup = pending.as_ref().is_some_and(|open| open.warmup);
            let starts_block = warmup
                || after_warmup
                || is_endurance_marker(line)
                || starts_interval_set(line)
                || (starts_with_mark(line) && !(in_set && is_set_breakdown(line)));

            match pending.as_mut() {
                Some(open) if !starts_block => open.details.push(line.to_string()),
                _ => {
                    Self::flush(&mut pending, &mut parsed.blocks);
                    pending = Some(PendingBlock::new(line, warmup));
                }
            }
        }

        Self::flush(&mut pending, &mut parsed.blocks);
        parsed
    }

    fn flush(pending: &mut Option<PendingBlock>, blocks: &mut Vec<Block>) {
        if let Some(open) = pending.take() {
            blocks.push(open.into_block());
        }
    }
}
