//! Parsing of `ipmitool sdr` output.
//!
//! The tool prints a pipe-delimited table, one sensor per line:
//!
//! ```text
//! CPU1 Temp        | 41 degrees C      | ok
//! FAN1             | 4560 RPM          | ok
//! PS1 Status       | 0x01              | ok
//! ```
//!
//! The whole block is split on `|` and the resulting fields are consumed two at
//! a time as (name, value) pairs. Values are then reduced to a number with
//! [`extract_value`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Field delimiter of the SDR table.
pub const FIELD_DELIMITER: char = '|';

/// Value tokens that mean "sensor present, no data" when no number is found.
pub const DEFAULT_SKIP_VALUES: &[&str] = &["no reading"];

/// Analog readings: one to three integer digits and exactly two decimals.
static DECIMAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,3}\.\d{2}").expect("decimal pattern is a valid regex")
});

/// One (sensor name, value token) pair taken from the tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReading<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Result of numeric extraction for a single value token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue {
    /// A finite number was extracted.
    Value(f64),
    /// The token is a known "no reading" sentinel.
    Skipped,
    /// No number and no sentinel.
    Invalid,
}

/// Splits raw output on the field delimiter, stripping trailing whitespace.
pub fn split_fields(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(FIELD_DELIMITER).map(str::trim_end)
}

/// Pairs fields two at a time into readings.
///
/// A trailing unpaired field is dropped. When a name field spans a line break
/// (status column of the previous row plus the next sensor name) only the text
/// after the last line break is kept. Pairs with an empty name are skipped.
pub fn pair_readings(raw: &str) -> impl Iterator<Item = RawReading<'_>> {
    let mut fields = split_fields(raw);
    std::iter::from_fn(move || loop {
        let name = fields.next()?;
        let value = fields.next()?;
        let name = normalize_name(name);
        if name.is_empty() {
            continue;
        }
        return Some(RawReading { name, value });
    })
}

fn normalize_name(field: &str) -> &str {
    match field.rfind(['\n', '\r']) {
        Some(idx) => field[idx + 1..].trim(),
        None => field.trim(),
    }
}

/// Extracts a numeric value from a value token.
///
/// Rules, first match wins:
/// 1. `\d{1,3}\.\d{2}` anywhere in the token, parsed as a float.
/// 2. The first whitespace-separated word made only of ASCII digits, parsed as
///    an integer.
/// 3. The trimmed token equals one of `skip_values`: [`SensorValue::Skipped`].
/// 4. Otherwise [`SensorValue::Invalid`].
pub fn extract_value<S: AsRef<str>>(token: &str, skip_values: &[S]) -> SensorValue {
    if let Some(m) = DECIMAL_PATTERN.find(token) {
        if let Ok(v) = m.as_str().parse::<f64>() {
            return SensorValue::Value(v);
        }
    }

    let digit_word = token
        .split_whitespace()
        .find(|w| w.bytes().all(|b| b.is_ascii_digit()));
    if let Some(word) = digit_word {
        // A digit run too long for u64 falls through to the sentinel check.
        if let Ok(v) = word.parse::<u64>() {
            return SensorValue::Value(v as f64);
        }
    }

    let trimmed = token.trim();
    if skip_values.iter().any(|s| s.as_ref().trim() == trimmed) {
        return SensorValue::Skipped;
    }

    SensorValue::Invalid
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKIP: &[&str] = DEFAULT_SKIP_VALUES;

    #[test]
    fn test_decimal_value() {
        assert_eq!(extract_value("41.00", SKIP), SensorValue::Value(41.0));
        assert_eq!(
            extract_value(" 41.00 degrees C", SKIP),
            SensorValue::Value(41.0)
        );
        assert_eq!(extract_value("12.12 Volts", SKIP), SensorValue::Value(12.12));
    }

    #[test]
    fn test_decimal_takes_precedence_over_digit_word() {
        assert_eq!(extract_value("3 at 1.50", SKIP), SensorValue::Value(1.5));
    }

    #[test]
    fn test_decimal_pattern_is_unanchored() {
        // Only the first two fraction digits belong to the match.
        assert_eq!(extract_value("1234.567", SKIP), SensorValue::Value(234.56));
    }

    #[test]
    fn test_digit_word_value() {
        assert_eq!(extract_value(" 4560 RPM", SKIP), SensorValue::Value(4560.0));
        assert_eq!(
            extract_value(" 41 degrees C", SKIP),
            SensorValue::Value(41.0)
        );
        assert_eq!(extract_value("0x01 1", SKIP), SensorValue::Value(1.0));
    }

    #[test]
    fn test_hex_only_token_is_invalid() {
        assert_eq!(extract_value(" 0x01", SKIP), SensorValue::Invalid);
    }

    #[test]
    fn test_skip_sentinel() {
        assert_eq!(extract_value(" no reading", SKIP), SensorValue::Skipped);
        assert_eq!(extract_value("no reading   ", SKIP), SensorValue::Skipped);
    }

    #[test]
    fn test_custom_skip_values() {
        let skip = vec!["disabled".to_string()];
        assert_eq!(extract_value(" disabled", &skip), SensorValue::Skipped);
        assert_eq!(extract_value(" no reading", &skip), SensorValue::Invalid);
    }

    #[test]
    fn test_invalid_value() {
        assert_eq!(extract_value(" ok", SKIP), SensorValue::Invalid);
        assert_eq!(extract_value("", SKIP), SensorValue::Invalid);
        assert_eq!(extract_value("RPM", SKIP), SensorValue::Invalid);
    }

    #[test]
    fn test_pair_readings_two_columns() {
        let raw = "CPU1 Temp | 41.00\nFAN1 | 4560 RPM";
        let pairs: Vec<_> = pair_readings(raw).collect();
        // Without a status column the newline sits inside the value field.
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].name, "CPU1 Temp");
        assert_eq!(pairs[0].value, " 41.00\nFAN1");
    }

    #[test]
    fn test_pair_readings_three_columns() {
        let raw = "CPU1 Temp        | 41 degrees C      | ok\n\
                   FAN1             | 4560 RPM          | ok\n\
                   PS1 Status       | 0x01              | ok\n";
        let pairs: Vec<_> = pair_readings(raw).collect();

        // The final status field is left unpaired and dropped.
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].name, "CPU1 Temp");
        assert_eq!(pairs[0].value, " 41 degrees C");
        assert_eq!(pairs[1].name, "FAN1");
        assert_eq!(pairs[1].value, " 4560 RPM");
        assert_eq!(pairs[2].name, "PS1 Status");
        assert_eq!(pairs[2].value, " 0x01");
    }

    #[test]
    fn test_trailing_unpaired_field_dropped() {
        let pairs: Vec<_> = pair_readings("A | 1 | B").collect();
        assert_eq!(pairs, vec![RawReading { name: "A", value: " 1" }]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(pair_readings("").count(), 0);
    }

    #[test]
    fn test_malformed_line_does_not_stop_later_lines() {
        let raw = "FAN1 | garbage | FAN2 | 3000 RPM";
        let values: Vec<_> = pair_readings(raw)
            .map(|r| (r.name, extract_value(r.value, SKIP)))
            .collect();
        assert_eq!(
            values,
            vec![
                ("FAN1", SensorValue::Invalid),
                ("FAN2", SensorValue::Value(3000.0)),
            ]
        );
    }
}
