use std::io::Write;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rust_decimal::Decimal;

use crate::error::{Result, ZwoError};
use crate::models::{Segment, WorkoutDocument};

pub const DEFAULT_AUTHOR: &str = "Gravel God Cycling";
const SPORT_TYPE: &str = "bike";
const ROOT: &str = "workout_file";

/// Writes `.zwo` workout files
#[derive(Debug, Clone)]
pub struct ZwoWriter {
    author: String,
}

impl Default for ZwoWriter {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR)
    }
}

impl ZwoWriter {
    pub fn new(author: impl Into<String>) -> Self {
        ZwoWriter {
            author: author.into(),
        }
    }

    /// Render the full document, XML declaration included
    pub fn render(&self, document: &WorkoutDocument) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(ROOT)))?;

        Self::write_text_element(&mut writer, "author", &self.author)?;
        Self::write_text_element(&mut writer, "name", &document.title)?;
        Self::write_description(&mut writer, &document.description)?;
        Self::write_text_element(&mut writer, "sportType", SPORT_TYPE)?;
        writer.write_event(Event::Empty(BytesStart::new("tags")))?;

        writer.write_event(Event::Start(BytesStart::new("workout")))?;
        for segment in &document.segments {
            writer.write_event(Event::Empty(segment_element(segment)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("workout")))?;

        writer.write_event(Event::End(BytesEnd::new(ROOT)))?;

        let bytes = writer.into_inner();
        String::from_utf8(bytes).map_err(|err| ZwoError::Serialization(err.to_string()))
    }

    fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Description goes out as CDATA so `<` and `&` survive unescaped
    fn write_description<W: Write>(writer: &mut Writer<W>, description: &str) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new("description")))?;
        for section in cdata_sections(description) {
            writer.write_event(Event::CData(BytesCData::new(section)))?;
        }
        writer.write_event(Event::End(BytesEnd::new("description")))?;
        Ok(())
    }
}

fn segment_element(segment: &Segment) -> BytesStart<'static> {
    let mut element = BytesStart::new(segment.element_name());

    match segment {
        Segment::Warmup(ramp) | Segment::Cooldown(ramp) | Segment::Ramp(ramp) => {
            element.push_attribute(("Duration", ramp.duration.to_string().as_str()));
            element.push_attribute(("PowerLow", format_power(ramp.power_low).as_str()));
            element.push_attribute(("PowerHigh", format_power(ramp.power_high).as_str()));
            push_cadence(&mut element, "Cadence", ramp.cadence);
        }
        Segment::SteadyState(steady) => {
            element.push_attribute(("Duration", steady.duration.to_string().as_str()));
            element.push_attribute(("Power", format_power(steady.power).as_str()));
            push_cadence(&mut element, "Cadence", steady.cadence);
        }
        Segment::IntervalBlock(block) => {
            element.push_attribute(("Repeat", block.repeat.to_string().as_str()));
            element.push_attribute(("OnDuration", block.on_duration.to_string().as_str()));
            element.push_attribute(("OffDuration", block.off_duration.to_string().as_str()));
            element.push_attribute(("OnPower", format_power(block.on_power).as_str()));
            element.push_attribute(("OffPower", format_power(block.off_power).as_str()));
            push_cadence(&mut element, "Cadence", block.cadence);
            push_cadence(&mut element, "CadenceResting", block.cadence_resting);
        }
    }

    element
}

fn push_cadence(element: &mut BytesStart<'_>, name: &str, cadence: Option<u32>) {
    if let Some(rpm) = cadence {
        element.push_attribute((name, rpm.to_string().as_str()));
    }
}

/// Plain decimal string for an FTP fraction: `0.5`, `0.65`, `1.0`
pub fn format_power(power: Decimal) -> String {
    let normalized = power.normalize();
    if normalized.scale() == 0 {
        format!("{}.0", normalized)
    } else {
        normalized.to_string()
    }
}

/// Split text so that no CDATA section contains its own terminator
pub fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompiledWorkout;
    use rust_decimal_macros::dec;

    fn document(description: &str, segments: Vec<Segment>) -> WorkoutDocument {
        WorkoutDocument::new(
            "SFR <Intervals>",
            CompiledWorkout {
                description: description.to_string(),
                segments,
                ftp: 250,
            },
        )
    }

    #[test]
    fn test_format_power() {
        assert_eq!(format_power(dec!(0.50)), "0.5");
        assert_eq!(format_power(dec!(0.65)), "0.65");
        assert_eq!(format_power(dec!(1.20)), "1.2");
        assert_eq!(format_power(dec!(1.0)), "1.0");
    }

    #[test]
    fn test_cdata_sections() {
        assert_eq!(cdata_sections("plain"), vec!["plain"]);
        assert_eq!(cdata_sections("a]]>b"), vec!["a]]", ">b"]);
        assert_eq!(cdata_sections(""), vec![""]);
    }

    #[test]
    fn test_element_order() {
        let xml = ZwoWriter::default()
            .render(&document("desc", vec![Segment::cooldown(600, dec!(0.65), dec!(0.5), Some(85))]))
            .unwrap();

        let positions: Vec<usize> = ["<?xml", "<author>", "<name>", "<description>", "<sportType>", "<tags/>", "<workout>"]
            .iter()
            .map(|tag| xml.find(tag).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(xml.contains("<author>Gravel God Cycling</author>"));
        assert!(xml.contains("<sportType>bike</sportType>"));
        assert!(xml.contains("<name>SFR &lt;Intervals&gt;</name>"));
    }

    #[test]
    fn test_description_is_cdata() {
        let xml = ZwoWriter::new("Coach")
            .render(&document("Z2 <easy> & steady", Vec::new()))
            .unwrap();
        assert!(xml.contains("<description><![CDATA[Z2 <easy> & steady]]></description>"));
        assert!(xml.contains("<author>Coach</author>"));
    }

    #[test]
    fn test_segment_attributes() {
        let segments = vec![
            Segment::warmup(600, dec!(0.50), dec!(0.65), Some(85)),
            Segment::steady(240, dec!(0.83), Some(55)),
            Segment::ramp(30, dec!(0.85), dec!(1.05), None),
            Segment::intervals(5, (30, dec!(1.20)), (30, dec!(0.85)), Some(95), Some(90)).unwrap(),
        ];
        let xml = ZwoWriter::default().render(&document("d", segments)).unwrap();

        assert!(xml.contains(r#"<Warmup Duration="600" PowerLow="0.5" PowerHigh="0.65" Cadence="85"/>"#));
        assert!(xml.contains(r#"<SteadyState Duration="240" Power="0.83" Cadence="55"/>"#));
        assert!(xml.contains(r#"<Ramp Duration="30" PowerLow="0.85" PowerHigh="1.05"/>"#));
        assert!(xml.contains(
            r#"<IntervalsT Repeat="5" OnDuration="30" OffDuration="30" OnPower="1.2" OffPower="0.85" Cadence="95" CadenceResting="90"/>"#
        ));
    }
}
