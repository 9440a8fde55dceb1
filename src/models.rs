use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Progressive power change over a fixed duration (Warmup, Cooldown, Ramp)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRamp {
    /// Duration in seconds
    pub duration: u32,

    /// Starting power as a fraction of FTP
    pub power_low: Decimal,

    /// Ending power as a fraction of FTP
    pub power_high: Decimal,

    /// Target cadence in RPM
    pub cadence: Option<u32>,
}

/// Constant-power effort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadyState {
    /// Duration in seconds
    pub duration: u32,

    /// Power as a fraction of FTP
    pub power: Decimal,

    /// Target cadence in RPM
    pub cadence: Option<u32>,
}

/// Repeated on/off intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalBlock {
    /// Number of on/off pairs, always at least 1
    pub repeat: u32,

    pub on_duration: u32,
    pub off_duration: u32,
    pub on_power: Decimal,
    pub off_power: Decimal,

    /// Cadence during the on part
    pub cadence: Option<u32>,

    /// Cadence during the off part
    pub cadence_resting: Option<u32>,
}

/// One playable unit of a workout, emitted in order into the workout file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Segment {
    Warmup(PowerRamp),
    Cooldown(PowerRamp),
    Ramp(PowerRamp),
    SteadyState(SteadyState),
    IntervalBlock(IntervalBlock),
}

impl Segment {
    pub fn warmup(duration: u32, power_low: Decimal, power_high: Decimal, cadence: Option<u32>) -> Self {
        Segment::Warmup(PowerRamp {
            duration,
            power_low,
            power_high,
            cadence,
        })
    }

    pub fn cooldown(duration: u32, power_low: Decimal, power_high: Decimal, cadence: Option<u32>) -> Self {
        Segment::Cooldown(PowerRamp {
            duration,
            power_low,
            power_high,
            cadence,
        })
    }

    pub fn ramp(duration: u32, power_low: Decimal, power_high: Decimal, cadence: Option<u32>) -> Self {
        Segment::Ramp(PowerRamp {
            duration,
            power_low,
            power_high,
            cadence,
        })
    }

    pub fn steady(duration: u32, power: Decimal, cadence: Option<u32>) -> Self {
        Segment::SteadyState(SteadyState {
            duration,
            power,
            cadence,
        })
    }

    /// Build an interval block; `None` for a zero repeat count
    pub fn intervals(
        repeat: u32,
        (on_duration, on_power): (u32, Decimal),
        (off_duration, off_power): (u32, Decimal),
        cadence: Option<u32>,
        cadence_resting: Option<u32>,
    ) -> Option<Self> {
        if repeat == 0 {
            return None;
        }
        Some(Segment::IntervalBlock(IntervalBlock {
            repeat,
            on_duration,
            off_duration,
            on_power,
            off_power,
            cadence,
            cadence_resting,
        }))
    }

    /// Element name used in the workout file
    pub fn element_name(&self) -> &'static str {
        match self {
            Segment::Warmup(_) => "Warmup",
            Segment::Cooldown(_) => "Cooldown",
            Segment::Ramp(_) => "Ramp",
            Segment::SteadyState(_) => "SteadyState",
            Segment::IntervalBlock(_) => "IntervalsT",
        }
    }

    /// Total playing time in seconds
    pub fn duration(&self) -> u32 {
        match self {
            Segment::Warmup(r) | Segment::Cooldown(r) | Segment::Ramp(r) => r.duration,
            Segment::SteadyState(s) => s.duration,
            Segment::IntervalBlock(i) => i.repeat.saturating_mul(i.on_duration.saturating_add(i.off_duration)),
        }
    }

    pub fn cadence(&self) -> Option<u32> {
        match self {
            Segment::Warmup(r) | Segment::Cooldown(r) | Segment::Ramp(r) => r.cadence,
            Segment::SteadyState(s) => s.cadence,
            Segment::IntervalBlock(i) => i.cadence,
        }
    }

    pub fn is_cooldown(&self) -> bool {
        matches!(self, Segment::Cooldown(_))
    }

    pub fn is_warmup(&self) -> bool {
        matches!(self, Segment::Warmup(_))
    }
}

/// Output of the compiler: formatted description plus ordered segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledWorkout {
    pub description: String,
    pub segments: Vec<Segment>,

    /// FTP baseline (watts) the fractions refer to
    pub ftp: u16,
}

/// A complete workout ready to be serialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDocument {
    pub title: String,
    pub description: String,
    pub segments: Vec<Segment>,
    pub ftp: u16,
}

impl WorkoutDocument {
    pub fn new(title: impl Into<String>, compiled: CompiledWorkout) -> Self {
        WorkoutDocument {
            title: title.into(),
            description: compiled.description,
            segments: compiled.segments,
            ftp: compiled.ftp,
        }
    }

    /// Total workout time in seconds
    pub fn total_duration(&self) -> u32 {
        self.segments
            .iter()
            .fold(0u32, |total, segment| total.saturating_add(segment.duration()))
    }

    /// Number of segments of the given element kind
    pub fn count(&self, element_name: &str) -> usize {
        self.segments
            .iter()
            .filter(|s| s.element_name() == element_name)
            .count()
    }
}
