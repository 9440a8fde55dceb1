//! Workout description text
//!
//! Descriptions are shown to the rider before the session starts. An empty
//! description is replaced by a canned template; a supplied one is wrapped in
//! fixed pre-activity and best-practice sections and otherwise left verbatim.

/// Template for Gavin Special sessions
pub const GAVIN_TEMPLATE: &str = "► Pre-activity Instructions:
- Focus on maintaining high cadence (100+ RPM) during the high cadence section
- During 40/20s, aim for max power output (121-151% FTP)
- Keep recovery periods easy to ensure quality of the next interval
- Pre-workout nutrition: Ensure adequate carbohydrate intake (50-75g/hour for workouts >90min)
- Hydration: Preload with sodium and water, aim for 500-1000mg sodium/hour during workout
- If you can't hit target power during intervals, stop and recover - quality over quantity
- Mix up your position during intervals (both seated and standing)

► Warm-up:
- 15 min progressive warm-up from Z1 to Z2 (RPE 1-3)
- 10 min high cadence Z3 (100-120 rpm, RPE 4-5)
- 3x30s building efforts (Z3 to Z5)

► Main Set (4 x 8-minute blocks):
- 2 min 40/20s (40s Max Effort, 20s Z2)
- 4 min @ Z3/Z4 (RPE 5-6)
- 2 min 40/20s (40s Max Effort, 20s Z2)
- 4 min recovery @ Z2 (RPE 2-3)

► Cool-down:
- 10 min easy Z1/Z2";

/// Template for 30/30 over-under sessions
pub const OVER_UNDER_TEMPLATE: &str = "► Pre-activity Instructions:
- Focus on maintaining steady cadence around 90 RPM
- Over intervals at 105% FTP, Under intervals at 95% FTP
- Keep form during both over and under segments
- Stay seated unless specified
- Hydration: Drink to thirst

► Warm-up:
- 15 min progressive warm-up
- 5 min steady state @ 75% FTP

► Main Set (3 x 10-minute blocks):
- 10 min of 30/30s (30s over, 30s under)
- 3 min recovery between sets @ 65% FTP

► Cool-down:
- 10 min easy";

/// Prepended to a supplied description
pub const PREAMBLE: &str = "► Pre-activity Instructions:
- Ensure proper fueling: eat 2-3 hours before or a light snack 30 mins before
- Hydration: Start well hydrated and plan for 1 bottle/hour
- For SFR (Slow Frequency Repetitions): Focus on smooth pedaling at low cadence
- During max efforts: Aim for max sustainable power while maintaining form
- Recovery periods are crucial - keep them easy to ensure quality intervals

► Workout Structure:
";

/// Appended to a supplied description
pub const POSTAMBLE: &str = "

► Best Practices:
- Maintain proper form throughout, especially during SFR
- If power drops significantly during intervals, end the set early
- Keep cadence high (85-95) during regular intervals, low (50-60) during SFR
- Stay seated during SFR unless specified otherwise
- Monitor heart rate during Z3 blocks to stay in target zone";

/// Prepended to descriptions of workouts built from explicit sections
pub const STANDARD_INSTRUCTIONS: &str = "► Pre-activity Instructions:
- Ensure adequate carbohydrate intake (50-75g/hour for workouts >90min)
- Hydration: Preload with sodium and water (500-1000mg sodium/hour)
- Quality over quantity - if you can't hit target power, stop and recover
- Mix up your position during intervals (seated and standing)
- Remember: Training makes you slow, sleep makes you fast
- Avoid the moral licensing effect - good training doesn't excuse poor recovery

► Warm-up:
- 15-20 min progressive warm-up from Z1 to Z2 (RPE 1-3)
- 10 min high cadence Z3 (100-120 rpm, RPE 4-5)

";

const GAVIN_KEYWORD: &str = "gavin";

/// Pick the canned template for a workout name
pub fn canned_template(workout_name: &str) -> &'static str {
    if workout_name.to_lowercase().contains(GAVIN_KEYWORD) {
        GAVIN_TEMPLATE
    } else {
        OVER_UNDER_TEMPLATE
    }
}

/// Format the description shown in the workout file
pub fn format_description(workout_name: &str, description: &str) -> String {
    if description.trim().is_empty() {
        return canned_template(workout_name).to_string();
    }

    let mut text = String::with_capacity(PREAMBLE.len() + description.len() + POSTAMBLE.len());
    text.push_str(PREAMBLE);
    text.push_str(description);
    text.push_str(POSTAMBLE);
    text
}

/// Standard instructions followed by the supplied text, unchanged
pub fn with_standard_instructions(description: &str) -> String {
    let mut text = String::with_capacity(STANDARD_INSTRUCTIONS.len() + description.len());
    text.push_str(STANDARD_INSTRUCTIONS);
    text.push_str(description);
    text
}

/// Description for the 40/20 block sessions, one per repeat count
pub fn gavin_classic(repeats: u32) -> String {
    format!(
        "► Pre-activity Instructions:
- Focus on maintaining high cadence (100+ RPM) during the high cadence section
- During 40/20s, aim for max power output (121-151% FTP)
- Keep recovery periods easy to ensure quality of the next interval
- Pre-workout nutrition: Ensure adequate carbohydrate intake (50-75g/hour for workouts >90min)
- Hydration: Preload with sodium and water, aim for 500-1000mg sodium/hour during workout
- If you can't hit target power during intervals, stop and recover - quality over quantity
- Mix up your position during intervals (both seated and standing)

► Warm-up:
- 15-20 min progressive warm-up from Z1 to Z2 (RPE 1-3)
- 10 min high cadence Z3 (100-120 rpm, RPE 4-5)

► Main Set (Repeat {repeats}x):
- 2 min 40/20s (40s Max Effort, 20s Z2, RPE 2-3)
- 4 min @ Z3/Z4 (RPE 5-6)
- 2 min 40/20s (40s Max Effort, 20s Z2, RPE 2-3)
- 4 min recovery @ Z2 (RPE 2-3) - 1:1 recovery ratio

► Cool-down:
- Z2 for remaining time (typically 90 min total, RPE 2-3)"
    )
}

/// Description for the over-under preset at any set count
pub fn over_under(repeats: u32) -> String {
    OVER_UNDER_TEMPLATE.replace(
        "► Main Set (3 x 10-minute blocks):",
        &format!("► Main Set ({} x 10-minute blocks):", repeats),
    )
}

/// Description for the Gavin Special preset at any block count
pub fn gavin_special(repeats: u32) -> String {
    GAVIN_TEMPLATE.replace(
        "► Main Set (4 x 8-minute blocks):",
        &format!("► Main Set ({} x 8-minute blocks):", repeats),
    )
}

/// Description for the bookend power blocks preset
pub fn bookend_power(repeats: u32) -> String {
    format!(
        "► Pre-activity Instructions:
- This is a bookend ride: hard sets early and late, easy volume in the middle
- Pre-workout nutrition is crucial - ensure adequate carbohydrate intake (50-75g/hour)
- Hydration: Preload with sodium and water, aim for 500-1000mg sodium/hour
- If you can't hit target power during intervals, stop and recover - quality over quantity
- Mix up your position during intervals (both seated and standing)

► Warm-up:
- 15-20 min progressive warm-up from Z1 to Z2 (RPE 1-3)
- 10 min high cadence Z3 (100-120 rpm, RPE 4-5)

► Sets ({repeats}x, separated by 2 hours of Z1-Z3):
- Two 6-minute pyramids with 8 min Z2 between:
  * 1 min @ Z6, Max Effort (RPE 9-10)
  * 1 min @ Z5 (RPE 8-9)
  * 2 min @ Z4 (RPE 7-8)
  * 1 min @ Z5 (RPE 8-9)
  * 1 min @ Z6, Max Effort (RPE 9-10)

► Cool-down:
- 30 min Z1-2 (RPE 1-3)"
    )
}

/// Description for the bookend 30/30 preset
pub fn bookend_30s(repeats: u32) -> String {
    format!(
        "► Pre-activity Instructions:
- This is a bookend ride focused on power development and fatigue resistance
- Pre-workout nutrition is crucial - ensure adequate carbohydrate intake (50-75g/hour)
- Hydration: Preload with sodium and water, aim for 500-1000mg sodium/hour
- If weather prevents climbing, accumulate 35-40 min of tempo (300-330w) on flats
- Remember: Training makes you slow, sleep makes you fast

► Warm-up:
- 15-20 min progressive warm-up from Z1 to Z2 (RPE 1-3)
- 10 min high cadence Z3 (100-120 rpm, RPE 4-5)

► Set 1:
- {repeats} x 30/30 intervals
- 30s @ 135% FTP (RPE 9-10)
- 30s @ 95% FTP (RPE 4-5)

► Middle Section:
- 4 x 10 min tempo @ 100% FTP, each followed by 30 min Z2
- Keep cadence high (90-100 rpm)

► Set 2:
- {repeats} x 30/30 intervals, same targets as set 1

► Cool-down:
- 30 min Z1-2 (RPE 1-3)
- Focus on high cadence (90-100 rpm)"
    )
}

/// Description for the high-intensity 30/30 sets preset
pub fn high_intensity(repeats: u32) -> String {
    format!(
        "60-90 min total ride time with efforts:

10 min low Z3 (280-300w), 95+ rpm

{repeats} sets of 5x30 sec ~420w / 30 sec ~300w; full recovery between."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_description_uses_gavin_template() {
        assert_eq!(format_description("The Gavin Special", ""), GAVIN_TEMPLATE);
        assert_eq!(format_description("GAVIN", "  \n"), GAVIN_TEMPLATE);
    }

    #[test]
    fn test_empty_description_uses_over_under_template() {
        assert_eq!(format_description("Tuesday 30/30s", ""), OVER_UNDER_TEMPLATE);
    }

    #[test]
    fn test_supplied_description_is_wrapped_verbatim() {
        let core = "6x5' / 3' recovery <hard> & fast";
        let formatted = format_description("SFR Intervals", core);

        assert!(formatted.starts_with(PREAMBLE));
        assert!(formatted.ends_with(POSTAMBLE));
        assert_eq!(&formatted[PREAMBLE.len()..formatted.len() - POSTAMBLE.len()], core);
    }

    #[test]
    fn test_standard_instructions_prefix() {
        let formatted = with_standard_instructions("► Main Set:\n- 4 x 8min");
        assert!(formatted.starts_with("► Pre-activity Instructions:\n- Ensure adequate carbohydrate"));
        assert!(formatted.ends_with("(100-120 rpm, RPE 4-5)\n\n► Main Set:\n- 4 x 8min"));
        assert_eq!(with_standard_instructions(""), STANDARD_INSTRUCTIONS);
    }

    #[test]
    fn test_repeat_counts_in_preset_descriptions() {
        assert!(gavin_classic(3).contains("Repeat 3x"));
        assert!(over_under(5).contains("5 x 10-minute blocks"));
        assert_eq!(over_under(3), OVER_UNDER_TEMPLATE);
        assert_eq!(gavin_special(4), GAVIN_TEMPLATE);
        assert!(bookend_30s(10).contains("10 x 30/30 intervals"));
    }
}
