use std::collections::BTreeMap;

use scalepipe_frame::Frame;
use tracing::{debug, trace};

use crate::reading::{ChannelReading, Snapshot, TOTAL};

/// Parse one frame into a [`Snapshot`].
///
/// Interior lines are split on line-feed with carriage-returns
/// stripped; each line is parsed after removing every space. Lines
/// with no `:` separator are skipped. The `TOTAL` checksum is
/// validated against the channel sum accumulated from the lines seen
/// *before* it, exactly as the scale head's protocol behaves: a
/// `TOTAL` line that arrives before its channels validates against
/// zero. `captured_at` is attached unchanged.
pub fn parse_frame(frame: &Frame, captured_at: u64) -> Snapshot {
    let text = frame.as_text();
    // The delimiters are framing, not data.
    let body = text.strip_prefix('/').unwrap_or(&text);
    let body = body.strip_suffix('\\').unwrap_or(body);

    let mut readings = BTreeMap::new();
    let mut valid = None;
    let mut sum: u64 = 0;

    for segment in body.split('\n') {
        let line: String = segment.chars().filter(|&c| c != '\r').collect();
        if line.is_empty() {
            continue;
        }

        let Some((name, reading)) = parse_reading(&line) else {
            trace!(line, "skipping line without separator");
            continue;
        };

        if name == TOTAL {
            // Order-dependent by protocol: only channels seen so far
            // count toward the checksum.
            valid = Some(sum == reading.value);
        } else {
            sum = sum.wrapping_add(reading.value);
        }

        readings.insert(name, reading);
    }

    debug!(
        readings = readings.len(),
        ?valid,
        "parsed frame into snapshot"
    );

    Snapshot {
        readings,
        valid,
        captured_at,
    }
}

/// Parse one interior line into `(name, reading)`.
///
/// Returns `None` for lines with no `:` separator; that is a skip,
/// not an error. The value is the longest leading run of decimal
/// digits after the separator (zero when there is none). The unit is
/// the last character of the space-stripped line, preceded by the
/// character before it when that character is not a digit.
pub fn parse_reading(line: &str) -> Option<(String, ChannelReading)> {
    let stripped: String = line.chars().filter(|&c| c != ' ').collect();

    let colon = stripped.find(':')?;
    let name = stripped[..colon].to_string();
    let remainder = &stripped[colon + 1..];

    let digits: String = remainder
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let value = digits.parse::<u64>().unwrap_or(0);

    let unit = unit_of(&stripped);

    Some((name, ChannelReading { value, unit }))
}

/// Unit suffix of a space-stripped line: always the final character,
/// plus the one before it when that is not a digit.
fn unit_of(stripped: &str) -> String {
    let mut rev = stripped.chars().rev();
    let Some(last) = rev.next() else {
        return String::new();
    };
    match rev.next() {
        Some(prev) if !prev.is_ascii_digit() => {
            let mut unit = String::with_capacity(prev.len_utf8() + last.len_utf8());
            unit.push(prev);
            unit.push(last);
            unit
        }
        _ => last.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(body: &str) -> Frame {
        Frame::new(body.as_bytes().to_vec())
    }

    fn parse(body: &str) -> Snapshot {
        parse_frame(&frame(body), 42)
    }

    #[test]
    fn matching_total_validates() {
        let snap = parse("/CH1:100g\nCH2:50g\nTOTAL:150g\n\\");

        assert_eq!(snap.reading("CH1").unwrap().value, 100);
        assert_eq!(snap.reading("CH1").unwrap().unit, "g");
        assert_eq!(snap.reading("CH2").unwrap().value, 50);
        assert_eq!(snap.reading("TOTAL").unwrap().value, 150);
        assert_eq!(snap.valid, Some(true));
        assert_eq!(snap.captured_at, 42);
    }

    #[test]
    fn mismatching_total_invalidates() {
        let snap = parse("/CH1:100g\nCH2:50g\nTOTAL:140g\n\\");
        assert_eq!(snap.valid, Some(false));
    }

    #[test]
    fn total_before_channels_validates_against_zero() {
        // Protocol quirk preserved: channels after TOTAL do not count.
        let snap = parse("/TOTAL:150g\nCH1:100g\nCH2:50g\n\\");
        assert_eq!(snap.valid, Some(false));

        let snap = parse("/TOTAL:0g\nCH1:100g\n\\");
        assert_eq!(snap.valid, Some(true));
    }

    #[test]
    fn missing_total_leaves_validity_unset() {
        let snap = parse("/CH1:100g\nCH2:50g\n\\");
        assert_eq!(snap.valid, None);
        assert_eq!(snap.readings.len(), 2);
    }

    #[test]
    fn line_without_separator_is_skipped() {
        let snap = parse("/CH1:100g\nNOISE\nTOTAL:100g\n\\");
        assert!(snap.reading("NOISE").is_none());
        assert_eq!(snap.valid, Some(true));
    }

    #[test]
    fn spaces_are_stripped_before_parsing() {
        // The head pads values into fixed-width columns.
        let snap = parse("/A    :    100 Kg\r\nTOTAL:    100 Kg\r\n\\");
        let a = snap.reading("A").unwrap();
        assert_eq!(a.value, 100);
        assert_eq!(a.unit, "Kg");
        assert_eq!(snap.valid, Some(true));
    }

    #[test]
    fn carriage_returns_and_blank_lines_dropped() {
        let snap = parse("/\r\nA: 1 g\r\n\r\nTOTAL: 1 g\r\n\\");
        assert_eq!(snap.readings.len(), 2);
        assert_eq!(snap.valid, Some(true));
    }

    #[test]
    fn single_char_unit_follows_digit() {
        let (_, reading) = parse_reading("CH1:100g").unwrap();
        assert_eq!(reading.unit, "g");
    }

    #[test]
    fn two_char_unit_when_preceding_char_is_not_a_digit() {
        let (_, reading) = parse_reading("CH1:100Kg").unwrap();
        assert_eq!(reading.unit, "Kg");
    }

    #[test]
    fn unit_suffix_does_not_affect_value() {
        let (_, reading) = parse_reading("CH1: 250 Kg").unwrap();
        assert_eq!(reading.value, 250);
    }

    #[test]
    fn no_leading_digits_means_zero() {
        // Uncalibrated heads emit a sign the digit scan never reaches.
        let (_, reading) = parse_reading("A: -  123 Kg").unwrap();
        assert_eq!(reading.value, 0);
    }

    #[test]
    fn duplicate_names_keep_last_occurrence() {
        let snap = parse("/A:1g\nA:2g\nTOTAL:3g\n\\");
        assert_eq!(snap.reading("A").unwrap().value, 2);
        // Both occurrences fed the checksum sum.
        assert_eq!(snap.valid, Some(true));
    }

    #[test]
    fn empty_frame_body_yields_empty_snapshot() {
        let snap = parse("/\\");
        assert!(snap.readings.is_empty());
        assert_eq!(snap.valid, None);
    }

    #[test]
    fn snapshot_serializes_to_structured_form() {
        let snap = parse("/A:1g\nTOTAL:1g\n\\");
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["valid"], serde_json::json!(true));
        assert_eq!(json["captured_at"], serde_json::json!(42));
        assert_eq!(json["readings"]["A"]["value"], serde_json::json!(1));
        assert_eq!(json["readings"]["A"]["unit"], serde_json::json!("g"));
    }
}
