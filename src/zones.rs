use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Training zones recognized in workout notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Z1,
    Z2,
    Z3,
    Z4,
    Z5,
    Z6,
    Max,
}

/// Token scan order. `max` must win over any Zn token, and z1 is checked
/// before z2 so that "z1-z2" resolves to Z1.
const ZONE_TOKENS: [(&str, Zone); 8] = [
    ("max", Zone::Max),
    ("z1", Zone::Z1),
    ("z2", Zone::Z2),
    ("z3", Zone::Z3),
    ("z4", Zone::Z4),
    ("z5", Zone::Z5),
    ("z6", Zone::Z6),
    ("z7", Zone::Max),
];

impl Zone {
    /// Target power for the zone as a fraction of FTP
    ///
    /// - Z1: 50% FTP
    /// - Z2: 65% FTP
    /// - Z3: 83% FTP
    /// - Z4: 98% FTP
    /// - Z5: 113% FTP
    /// - Z6 / Max: 120% FTP
    pub fn power(self) -> Decimal {
        match self {
            Zone::Z1 => dec!(0.50),
            Zone::Z2 => dec!(0.65),
            Zone::Z3 => dec!(0.83),
            Zone::Z4 => dec!(0.98),
            Zone::Z5 => dec!(1.13),
            Zone::Z6 | Zone::Max => dec!(1.20),
        }
    }

    /// Find the highest-priority zone token in free text, if any
    pub fn detect(text: &str) -> Option<Zone> {
        let lower = text.to_lowercase();
        ZONE_TOKENS
            .iter()
            .find(|(token, _)| lower.contains(token))
            .map(|(_, zone)| *zone)
    }

    /// Zone named in the text, defaulting to Z2 when nothing matches
    pub fn from_text(text: &str) -> Zone {
        Self::detect(text).unwrap_or(Zone::Z2)
    }

    pub fn label(self) -> &'static str {
        match self {
            Zone::Z1 => "Z1",
            Zone::Z2 => "Z2",
            Zone::Z3 => "Z3",
            Zone::Z4 => "Z4",
            Zone::Z5 => "Z5",
            Zone::Z6 => "Z6",
            Zone::Max => "Max",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Convert zone notation to an FTP fraction (0.65 when no zone is named)
pub fn zone_to_power(text: &str) -> Decimal {
    Zone::from_text(text).power()
}

/// Absolute watts for an FTP fraction, rounded to the nearest watt
pub fn power_to_watts(power: Decimal, ftp: u16) -> u16 {
    (power * Decimal::from(ftp))
        .round()
        .to_u16()
        .unwrap_or(u16::MAX)
}

/// Describe an FTP fraction with its Coggan-style zone and RPE band
///
/// - Z1: <= 55% FTP (RPE 1-2)
/// - Z2: 56-75% FTP (RPE 2-3)
/// - Z3: 76-90% FTP (RPE 4-5)
/// - Z4: 91-105% FTP (RPE 6-7)
/// - Z5: 106-120% FTP (RPE 8-9)
/// - above: Max Effort (RPE 9-10)
pub fn describe_power(power: Decimal) -> &'static str {
    if power <= dec!(0.55) {
        "Z1, RPE 1-2"
    } else if power <= dec!(0.75) {
        "Z2, RPE 2-3"
    } else if power <= dec!(0.90) {
        "Z3, RPE 4-5"
    } else if power <= dec!(1.05) {
        "Z4, RPE 6-7"
    } else if power <= dec!(1.20) {
        "Z5, RPE 8-9"
    } else {
        "Max Effort, RPE 9-10"
    }
}
