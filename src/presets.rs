//! Named workout presets
//!
//! Presets are fixed-structure sessions that skip notation parsing. Each one
//! is a declarative list of steps; `Repeat` steps take the caller's repeat
//! count so one template covers every variant (3x8, 4x8, ...).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::info;

use crate::description;
use crate::error::{Result, ZwoError};
use crate::models::{CompiledWorkout, IntervalBlock, Segment};

/// Largest repeat count a preset accepts
pub const MAX_REPEATS: u32 = 50;

/// One step of a preset template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PresetStep {
    /// Emitted exactly once
    Once(Segment),

    /// Body emitted a fixed number of times
    Fixed { count: u32, body: Vec<Segment> },

    /// Body emitted once per requested repeat, with `between` inserted
    /// between consecutive repeats (never after the last)
    Repeat {
        body: Vec<Segment>,
        between: Vec<Segment>,
    },
}

/// A named, fixed-structure workout
#[derive(Debug, Clone, Serialize)]
pub struct Preset {
    pub key: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub default_repeats: u32,
    steps: Vec<PresetStep>,
    #[serde(skip)]
    describe: fn(u32) -> String,
}

impl Preset {
    /// Expand the template into segments for a repeat count
    pub fn expand(&self, repeats: u32) -> Vec<Segment> {
        let mut segments = Vec::new();

        for step in &self.steps {
            match step {
                PresetStep::Once(segment) => segments.push(segment.clone()),
                PresetStep::Fixed { count, body } => {
                    for _ in 0..*count {
                        segments.extend(body.iter().cloned());
                    }
                }
                PresetStep::Repeat { body, between } => {
                    for index in 0..repeats {
                        segments.extend(body.iter().cloned());
                        if index + 1 < repeats {
                            segments.extend(between.iter().cloned());
                        }
                    }
                }
            }
        }

        segments
    }

    pub fn description(&self, repeats: u32) -> String {
        (self.describe)(repeats)
    }

    /// Compile the preset; `None` uses the preset's default repeat count
    pub fn compile(&self, repeats: Option<u32>, ftp: u16) -> Result<CompiledWorkout> {
        let repeats = repeats.unwrap_or(self.default_repeats);
        if !(1..=MAX_REPEATS).contains(&repeats) {
            return Err(ZwoError::Validation(format!(
                "Preset '{}' takes between 1 and {} repeats, got {}",
                self.key, MAX_REPEATS, repeats
            )));
        }

        let segments = self.expand(repeats);
        info!(preset = self.key, repeats, segments = segments.len(), "Expanded preset");

        Ok(CompiledWorkout {
            description: self.description(repeats),
            segments,
            ftp,
        })
    }
}

fn forty_twenty() -> Segment {
    interval(3, (40, dec!(1.2)), (20, dec!(0.65)), Some(100), None)
}

fn interval(
    repeat: u32,
    (on_duration, on_power): (u32, Decimal),
    (off_duration, off_power): (u32, Decimal),
    cadence: Option<u32>,
    cadence_resting: Option<u32>,
) -> Segment {
    Segment::IntervalBlock(IntervalBlock {
        repeat: repeat.max(1),
        on_duration,
        off_duration,
        on_power,
        off_power,
        cadence,
        cadence_resting,
    })
}

fn over_under() -> Preset {
    Preset {
        key: "30-30-over-under",
        title: "30/30 Over-Under",
        summary: "10 min blocks of 30s at 105% / 30s at 95% FTP",
        default_repeats: 3,
        steps: vec![
            PresetStep::Once(Segment::warmup(900, dec!(0.50), dec!(0.75), Some(85))),
            PresetStep::Once(Segment::steady(300, dec!(0.75), Some(90))),
            PresetStep::Repeat {
                body: vec![interval(10, (30, dec!(1.05)), (30, dec!(0.95)), Some(90), None)],
                between: vec![Segment::steady(180, dec!(0.65), Some(85))],
            },
            PresetStep::Once(Segment::cooldown(600, dec!(0.75), dec!(0.50), Some(85))),
        ],
        describe: description::over_under,
    }
}

fn gavin_special() -> Preset {
    Preset {
        key: "gavin-special",
        title: "Gavin Special",
        summary: "8 min blocks: 40/20s, 4 min Z3/Z4, 40/20s, with ramp openers",
        default_repeats: 4,
        steps: vec![
            PresetStep::Once(Segment::warmup(900, dec!(0.50), dec!(0.75), Some(85))),
            PresetStep::Once(Segment::steady(600, dec!(0.85), Some(100))),
            PresetStep::Fixed {
                count: 3,
                body: vec![
                    Segment::ramp(30, dec!(0.85), dec!(1.05), Some(95)),
                    Segment::steady(30, dec!(0.65), Some(85)),
                ],
            },
            PresetStep::Repeat {
                body: vec![
                    forty_twenty(),
                    Segment::steady(240, dec!(0.9), Some(90)),
                    forty_twenty(),
                ],
                between: vec![Segment::steady(240, dec!(0.65), Some(85))],
            },
            PresetStep::Once(Segment::cooldown(600, dec!(0.75), dec!(0.50), Some(85))),
        ],
        describe: description::gavin_special,
    }
}

fn gavin_classic() -> Preset {
    let forty_twenty = interval(3, (40, dec!(1.2)), (20, dec!(0.65)), None, None);
    Preset {
        key: "gavin-classic",
        title: "Gavin Special - 8min blocks",
        summary: "30 min framing, 40/20s around 4 min Z3/Z4 with 1:1 recovery",
        default_repeats: 3,
        steps: vec![
            PresetStep::Once(Segment::warmup(1800, dec!(0.56), dec!(0.75), None)),
            PresetStep::Repeat {
                body: vec![
                    forty_twenty.clone(),
                    Segment::steady(240, dec!(0.85), None),
                    forty_twenty,
                    Segment::steady(240, dec!(0.65), None),
                ],
                between: Vec::new(),
            },
            PresetStep::Once(Segment::cooldown(1800, dec!(0.56), dec!(0.75), None)),
        ],
        describe: description::gavin_classic,
    }
}

fn bookend_power() -> Preset {
    let pyramid = [
        Segment::steady(60, dec!(1.5), None),
        Segment::steady(60, dec!(1.15), None),
        Segment::steady(120, dec!(1.0), None),
        Segment::steady(60, dec!(1.15), None),
        Segment::steady(60, dec!(1.5), None),
    ];
    let mut set = pyramid.to_vec();
    set.push(Segment::steady(480, dec!(0.65), None));
    set.extend(pyramid);

    Preset {
        key: "bookend-power",
        title: "Bookend Power Intervals",
        summary: "Pyramid sets at both ends of a long Z2 ride",
        default_repeats: 2,
        steps: vec![
            PresetStep::Once(Segment::warmup(1800, dec!(0.56), dec!(0.75), None)),
            PresetStep::Repeat {
                body: set,
                between: vec![Segment::steady(7200, dec!(0.65), None)],
            },
            PresetStep::Once(Segment::cooldown(1800, dec!(0.56), dec!(0.75), None)),
        ],
        describe: description::bookend_power,
    }
}

fn bookend_30s() -> Preset {
    let thirty_thirty = PresetStep::Repeat {
        body: vec![
            Segment::steady(30, dec!(1.35), None),
            Segment::steady(30, dec!(0.95), None),
        ],
        between: Vec::new(),
    };

    Preset {
        key: "bookend-30s",
        title: "Bookend 30/30 Intervals",
        summary: "30/30s at both ends with tempo blocks in the middle",
        default_repeats: 10,
        steps: vec![
            PresetStep::Once(Segment::warmup(1800, dec!(0.56), dec!(0.75), None)),
            thirty_thirty.clone(),
            PresetStep::Fixed {
                count: 4,
                body: vec![
                    Segment::steady(600, dec!(1.0), None),
                    Segment::steady(1800, dec!(0.65), None),
                ],
            },
            thirty_thirty,
            PresetStep::Once(Segment::cooldown(1800, dec!(0.56), dec!(0.75), None)),
        ],
        describe: description::bookend_30s,
    }
}

fn high_intensity() -> Preset {
    Preset {
        key: "high-intensity",
        title: "High Intensity Intervals",
        summary: "Low Z3 opener then sets of 5x30/30 at 120% / 85% FTP",
        default_repeats: 3,
        steps: vec![
            PresetStep::Once(Segment::warmup(600, dec!(0.50), dec!(0.75), Some(85))),
            PresetStep::Once(Segment::steady(600, dec!(0.80), Some(95))),
            PresetStep::Once(Segment::steady(180, dec!(0.65), Some(85))),
            PresetStep::Repeat {
                body: vec![interval(5, (30, dec!(1.20)), (30, dec!(0.85)), Some(95), Some(90))],
                between: vec![Segment::steady(300, dec!(0.65), Some(85))],
            },
            PresetStep::Once(Segment::cooldown(600, dec!(0.75), dec!(0.50), Some(85))),
        ],
        describe: description::high_intensity,
    }
}

/// Every registered preset, in listing order
pub fn all() -> Vec<Preset> {
    vec![
        over_under(),
        gavin_special(),
        gavin_classic(),
        bookend_power(),
        bookend_30s(),
        high_intensity(),
    ]
}

/// Look a preset up by key (case-insensitive)
pub fn find(key: &str) -> Result<Preset> {
    let wanted = key.trim().to_lowercase();
    all()
        .into_iter()
        .find(|preset| preset.key == wanted)
        .ok_or_else(|| ZwoError::UnknownPreset {
            key: key.to_string(),
        })
}
