//! Converts free-text results into canonical integer values.
//!
//! Every metric has its own grammar. The output `value_raw` is always in the
//! metric's finest unit (milliseconds, repetitions, meters, grams) and is the
//! only thing ranking ever compares; `value_display` is derived once here.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::{MetricType, TimeGrammar};

static HOURS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*(?:h|hour|hours)").expect("invalid regex"));
static MINUTES_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s*(?:m|min|mins|minute|minutes)").expect("invalid regex")
});
static SECONDS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+)\s*(?:s|sec|secs|second|seconds)").expect("invalid regex")
});
static DISTANCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]+(?:\.[0-9]+)?)\s*(km|m)?$").expect("invalid regex")
});
static COLON_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?$").expect("invalid regex"));
static DECIMAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").expect("invalid regex"));

const SMART_FORMAT_HINT: &str =
    "Use formats like '12:30', '1:12:30', '12mins 30sec', or '1h 30m'";
const STRICT_FORMAT_HINT: &str = "Use mm:ss or hh:mm:ss format only";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// The input shape is not recognised (bad tokens, wrong segment count)
    InvalidFormat,
    /// The input parsed but lies outside the metric's domain (zero, negative, too large)
    InvalidValue,
}

/// A user-facing validation failure. `message` can be shown to the submitter as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::InvalidFormat,
            message: message.into(),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self {
            kind: ParseErrorKind::InvalidValue,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParsedValue {
    pub value_raw: i64,
    pub value_display: String,
}

/// Input text tagged with the grammar that must read it.
/// Construction trims the text and rejects blank input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInput<'a> {
    Time { text: &'a str, grammar: TimeGrammar },
    Reps(&'a str),
    Distance(&'a str),
    Weight(&'a str),
}

impl<'a> ValueInput<'a> {
    pub fn new(metric: MetricType, input: &'a str, grammar: TimeGrammar) -> Result<Self, ParseError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ParseError::invalid_format("Please enter your result"));
        }

        Ok(match metric {
            MetricType::Time => Self::Time { text, grammar },
            MetricType::Reps => Self::Reps(text),
            MetricType::Distance => Self::Distance(text),
            MetricType::Weight => Self::Weight(text),
        })
    }

    pub fn parse(&self) -> Result<ParsedValue, ParseError> {
        match *self {
            Self::Time {
                text,
                grammar: TimeGrammar::Smart,
            } => parse_time_smart(text),
            Self::Time {
                text,
                grammar: TimeGrammar::Strict,
            } => parse_time_strict(text),
            Self::Reps(text) => parse_reps(text),
            Self::Distance(text) => parse_distance(text),
            Self::Weight(text) => parse_weight(text),
        }
    }
}

/// Parse `input` with the grammar for `metric`. `grammar` only matters for time.
pub fn parse_value(
    metric: MetricType,
    input: &str,
    grammar: TimeGrammar,
) -> Result<ParsedValue, ParseError> {
    ValueInput::new(metric, input, grammar)?.parse()
}

/// Render a canonical value that did not come from user input, such as an average.
pub fn format_raw(metric: MetricType, value_raw: i64) -> String {
    match metric {
        MetricType::Time => {
            let total_seconds = (value_raw.max(0) + 500) / 1000;
            TimeParts {
                hours: Decimal::from(total_seconds / 3600),
                minutes: Decimal::from((total_seconds % 3600) / 60),
                seconds: Decimal::from(total_seconds % 60),
            }
            .display()
        }
        MetricType::Reps => value_raw.to_string(),
        MetricType::Distance if value_raw.abs() >= 1000 => {
            format!("{} km", Decimal::new(value_raw, 3).normalize())
        }
        MetricType::Distance => format!("{} m", value_raw),
        MetricType::Weight => format!("{} kg", Decimal::new(value_raw, 3).normalize()),
    }
}

/// Components as written. Colon tokens may carry a fraction (`1:30.5`).
#[derive(Debug, Clone, Copy, Default)]
struct TimeParts {
    hours: Decimal,
    minutes: Decimal,
    seconds: Decimal,
}

impl TimeParts {
    fn from_colon_tokens(text: &str, hint: &str, bad_token: &str) -> Result<Self, ParseError> {
        let numbers = text
            .split(':')
            .map(|token| colon_token(token.trim(), bad_token))
            .collect::<Result<Vec<_>, _>>()?;

        match numbers.as_slice() {
            [minutes, seconds] => Ok(Self {
                hours: Decimal::ZERO,
                minutes: *minutes,
                seconds: *seconds,
            }),
            [hours, minutes, seconds] => Ok(Self {
                hours: *hours,
                minutes: *minutes,
                seconds: *seconds,
            }),
            _ => Err(ParseError::invalid_format(hint)),
        }
    }

    fn from_units(hours: Option<i64>, minutes: Option<i64>, seconds: Option<i64>) -> Self {
        Self {
            hours: Decimal::from(hours.unwrap_or(0)),
            minutes: Decimal::from(minutes.unwrap_or(0)),
            seconds: Decimal::from(seconds.unwrap_or(0)),
        }
    }

    fn into_parsed(self) -> Result<ParsedValue, ParseError> {
        if [self.hours, self.minutes, self.seconds]
            .iter()
            .any(|part| *part < Decimal::ZERO)
        {
            return Err(ParseError::invalid_value("Time components cannot be negative"));
        }

        let total_ms = self
            .hours
            .checked_mul(Decimal::from(60))
            .and_then(|m| m.checked_add(self.minutes))
            .and_then(|m| m.checked_mul(Decimal::from(60)))
            .and_then(|s| s.checked_add(self.seconds))
            .and_then(|s| s.checked_mul(Decimal::from(1000)))
            .and_then(round_to_i64)
            .ok_or_else(|| ParseError::invalid_value("Time is too large"))?;

        if total_ms <= 0 {
            return Err(ParseError::invalid_value("Time must be greater than 0"));
        }

        Ok(ParsedValue {
            value_raw: total_ms,
            value_display: self.display(),
        })
    }

    fn display(&self) -> String {
        if self.hours > Decimal::ZERO {
            format!(
                "{}:{}:{}",
                self.hours.normalize(),
                two_digits(self.minutes),
                two_digits(self.seconds)
            )
        } else {
            format!("{}:{}", self.minutes.normalize(), two_digits(self.seconds))
        }
    }
}

/// `5` as `05`, `7.25` as `07.25`
fn two_digits(part: Decimal) -> String {
    let text = part.normalize().to_string();
    if part < Decimal::TEN {
        format!("0{}", text)
    } else {
        text
    }
}

/// A colon-separated component: an optionally signed plain decimal
fn colon_token(token: &str, bad_token: &str) -> Result<Decimal, ParseError> {
    if !COLON_TOKEN_REGEX.is_match(token) {
        return Err(ParseError::invalid_format(bad_token));
    }

    Decimal::from_str(token).map_err(|_| ParseError::invalid_value("Time is too large"))
}

fn parse_time_smart(text: &str) -> Result<ParsedValue, ParseError> {
    let value = text.to_lowercase();

    let hours = unit_component(&HOURS_REGEX, &value)?;
    let minutes = unit_component(&MINUTES_REGEX, &value)?;
    let seconds = unit_component(&SECONDS_REGEX, &value)?;

    let parts = if hours.is_none() && minutes.is_none() && seconds.is_none() {
        TimeParts::from_colon_tokens(&value, SMART_FORMAT_HINT, "Invalid time format")?
    } else {
        TimeParts::from_units(hours, minutes, seconds)
    };

    parts.into_parsed()
}

fn parse_time_strict(text: &str) -> Result<ParsedValue, ParseError> {
    TimeParts::from_colon_tokens(text, STRICT_FORMAT_HINT, "Invalid time")?.into_parsed()
}

/// First match of a unit pattern, e.g. the `30` in `1h 30m` for minutes
fn unit_component(regex: &Regex, value: &str) -> Result<Option<i64>, ParseError> {
    regex
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|digits| {
            digits
                .as_str()
                .parse::<i64>()
                .map_err(|_| ParseError::invalid_value("Time is too large"))
        })
        .transpose()
}

fn parse_reps(text: &str) -> Result<ParsedValue, ParseError> {
    const MESSAGE: &str = "Enter a positive integer";

    let n = text
        .parse::<i64>()
        .map_err(|_| ParseError::invalid_value(MESSAGE))?;
    if n <= 0 {
        return Err(ParseError::invalid_value(MESSAGE));
    }

    Ok(ParsedValue {
        value_raw: n,
        value_display: n.to_string(),
    })
}

fn parse_distance(text: &str) -> Result<ParsedValue, ParseError> {
    const MESSAGE: &str = "Enter a positive number (m or km)";

    let caps = DISTANCE_REGEX
        .captures(text)
        .ok_or_else(|| ParseError::invalid_value(MESSAGE))?;
    let number = positive_decimal(&caps[1], MESSAGE)?;
    let is_km = caps
        .get(2)
        .is_some_and(|unit| unit.as_str().eq_ignore_ascii_case("km"));

    if is_km {
        Ok(ParsedValue {
            value_raw: to_canonical(number, 1000)?,
            value_display: format!("{} km", number.normalize()),
        })
    } else {
        Ok(ParsedValue {
            value_raw: to_canonical(number, 1)?,
            value_display: format!("{} m", number.normalize()),
        })
    }
}

fn parse_weight(text: &str) -> Result<ParsedValue, ParseError> {
    let kg = positive_decimal(text, "Enter a positive number (kg)")?;

    Ok(ParsedValue {
        value_raw: to_canonical(kg, 1000)?,
        value_display: format!("{} kg", kg.normalize()),
    })
}

fn positive_decimal(text: &str, message: &str) -> Result<Decimal, ParseError> {
    if !DECIMAL_REGEX.is_match(text) {
        return Err(ParseError::invalid_value(message));
    }

    let number = Decimal::from_str(text).map_err(|_| ParseError::invalid_value(message))?;
    if number <= Decimal::ZERO {
        return Err(ParseError::invalid_value(message));
    }

    Ok(number)
}

/// `round(number * factor)`, half away from zero, computed on exact decimals
fn to_canonical(number: Decimal, factor: i64) -> Result<i64, ParseError> {
    number
        .checked_mul(Decimal::from(factor))
        .and_then(round_to_i64)
        .ok_or_else(|| ParseError::invalid_value("Value is too large"))
}

fn round_to_i64(value: Decimal) -> Option<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(raw: i64, display: &str) -> ParsedValue {
        ParsedValue {
            value_raw: raw,
            value_display: display.to_string(),
        }
    }

    fn kind_of(result: Result<ParsedValue, ParseError>) -> ParseErrorKind {
        result.unwrap_err().kind
    }

    #[test]
    fn test_reps_positive_integers() {
        for n in [1_i64, 7, 42, 1000, 999_999] {
            assert_eq!(
                parse_value(MetricType::Reps, &n.to_string(), TimeGrammar::Strict).unwrap(),
                parsed(n, &n.to_string())
            );
        }
    }

    #[test]
    fn test_reps_rejects_out_of_domain() {
        for input in ["0", "-3", "12.5", "abc", "1e3"] {
            assert_eq!(
                kind_of(parse_value(MetricType::Reps, input, TimeGrammar::Strict)),
                ParseErrorKind::InvalidValue,
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_reps_leading_zeros_normalized() {
        assert_eq!(
            parse_value(MetricType::Reps, " 007 ", TimeGrammar::Strict).unwrap(),
            parsed(7, "7")
        );
    }

    #[test]
    fn test_blank_input_is_invalid_format() {
        let err = parse_value(MetricType::Weight, "   ", TimeGrammar::Strict).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidFormat);
        assert_eq!(err.message, "Please enter your result");
    }

    #[test]
    fn test_smart_time_hours_minutes() {
        assert_eq!(
            parse_value(MetricType::Time, "1h 30m", TimeGrammar::Smart).unwrap(),
            parsed(5_400_000, "1:30:00")
        );
    }

    #[test]
    fn test_smart_time_unit_words() {
        assert_eq!(
            parse_value(MetricType::Time, "12mins 30sec", TimeGrammar::Smart).unwrap(),
            parsed(750_000, "12:30")
        );
        assert_eq!(
            parse_value(MetricType::Time, "2 Hours 5 Seconds", TimeGrammar::Smart).unwrap(),
            parsed(7_205_000, "2:00:05")
        );
        assert_eq!(
            parse_value(MetricType::Time, "90 seconds", TimeGrammar::Smart).unwrap(),
            parsed(90_000, "0:90")
        );
    }

    #[test]
    fn test_smart_time_colon_fallback() {
        assert_eq!(
            parse_value(MetricType::Time, "1:12:30", TimeGrammar::Smart).unwrap(),
            parsed(4_350_000, "1:12:30")
        );
        assert_eq!(
            parse_value(MetricType::Time, "12:30", TimeGrammar::Smart).unwrap(),
            parsed(750_000, "12:30")
        );
    }

    #[test]
    fn test_smart_time_bad_shape_suggests_formats() {
        let err = parse_value(MetricType::Time, "90", TimeGrammar::Smart).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidFormat);
        for form in ["'12:30'", "'1:12:30'", "'12mins 30sec'", "'1h 30m'"] {
            assert!(err.message.contains(form), "missing {form} in {}", err.message);
        }

        assert_eq!(
            kind_of(parse_value(MetricType::Time, "soon", TimeGrammar::Smart)),
            ParseErrorKind::InvalidFormat
        );
    }

    #[test]
    fn test_smart_time_zero_is_invalid_value() {
        assert_eq!(
            kind_of(parse_value(MetricType::Time, "0h 0m", TimeGrammar::Smart)),
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            kind_of(parse_value(MetricType::Time, "0:00", TimeGrammar::Smart)),
            ParseErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_strict_time() {
        assert_eq!(
            parse_value(MetricType::Time, "12:30", TimeGrammar::Strict).unwrap(),
            parsed(750_000, "12:30")
        );
        assert_eq!(
            parse_value(MetricType::Time, "01:02:03", TimeGrammar::Strict).unwrap(),
            parsed(3_723_000, "1:02:03")
        );
        assert_eq!(
            parse_value(MetricType::Time, "0:5:07", TimeGrammar::Strict).unwrap(),
            parsed(307_000, "5:07")
        );
    }

    #[test]
    fn test_colon_time_accepts_fractional_seconds() {
        for grammar in [TimeGrammar::Smart, TimeGrammar::Strict] {
            assert_eq!(
                parse_value(MetricType::Time, "1:30.5", grammar).unwrap(),
                parsed(90_500, "1:30.5"),
                "grammar {grammar:?}"
            );
        }
        assert_eq!(
            parse_value(MetricType::Time, "1:05:07.25", TimeGrammar::Strict).unwrap(),
            parsed(3_907_250, "1:05:07.25")
        );
        assert_eq!(
            parse_value(MetricType::Time, "0:1.0005", TimeGrammar::Strict).unwrap(),
            parsed(1001, "0:01.0005")
        );
    }

    #[test]
    fn test_colon_time_rejects_malformed_decimals() {
        for input in ["1:30.", "1:.5", "1:3e1", "1:+30"] {
            assert_eq!(
                kind_of(parse_value(MetricType::Time, input, TimeGrammar::Strict)),
                ParseErrorKind::InvalidFormat,
                "input {input:?}"
            );
        }
        assert_eq!(
            kind_of(parse_value(MetricType::Time, "0:0.0004", TimeGrammar::Strict)),
            ParseErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_strict_time_rejects_other_shapes() {
        let err = parse_value(MetricType::Time, "1:2:3:4", TimeGrammar::Strict).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidFormat);
        assert!(err.message.contains("mm:ss"));
        assert!(err.message.contains("hh:mm:ss"));

        assert_eq!(
            kind_of(parse_value(MetricType::Time, "1h 30m", TimeGrammar::Strict)),
            ParseErrorKind::InvalidFormat
        );
        assert_eq!(
            kind_of(parse_value(MetricType::Time, "12:", TimeGrammar::Strict)),
            ParseErrorKind::InvalidFormat
        );
    }

    #[test]
    fn test_strict_time_applies_positivity_floor() {
        assert_eq!(
            kind_of(parse_value(MetricType::Time, "00:00", TimeGrammar::Strict)),
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            kind_of(parse_value(MetricType::Time, "-1:30", TimeGrammar::Strict)),
            ParseErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_time_overflow_is_invalid_value() {
        assert_eq!(
            kind_of(parse_value(
                MetricType::Time,
                "9223372036854775807:00",
                TimeGrammar::Strict
            )),
            ParseErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_distance_km_suffix() {
        assert_eq!(
            parse_value(MetricType::Distance, "2.5km", TimeGrammar::Strict).unwrap(),
            parsed(2500, "2.5 km")
        );
        assert_eq!(
            parse_value(MetricType::Distance, "10 KM", TimeGrammar::Strict).unwrap(),
            parsed(10_000, "10 km")
        );
        assert_eq!(
            parse_value(MetricType::Distance, "2.50 km", TimeGrammar::Strict).unwrap(),
            parsed(2500, "2.5 km")
        );
    }

    #[test]
    fn test_distance_bare_meters() {
        assert_eq!(
            parse_value(MetricType::Distance, "1500", TimeGrammar::Strict).unwrap(),
            parsed(1500, "1500 m")
        );
        assert_eq!(
            parse_value(MetricType::Distance, "1500.5", TimeGrammar::Strict).unwrap(),
            parsed(1501, "1500.5 m")
        );
        assert_eq!(
            parse_value(MetricType::Distance, "400 m", TimeGrammar::Strict).unwrap(),
            parsed(400, "400 m")
        );
    }

    #[test]
    fn test_distance_rejects_non_positive() {
        for input in ["0", "0km", "-5", "far", "5 miles"] {
            assert_eq!(
                kind_of(parse_value(MetricType::Distance, input, TimeGrammar::Strict)),
                ParseErrorKind::InvalidValue,
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_weight() {
        assert_eq!(
            parse_value(MetricType::Weight, "102.5", TimeGrammar::Strict).unwrap(),
            parsed(102_500, "102.5 kg")
        );
        assert_eq!(
            parse_value(MetricType::Weight, "1.0005", TimeGrammar::Strict).unwrap(),
            parsed(1001, "1.0005 kg")
        );
    }

    #[test]
    fn test_weight_zero_is_invalid_value() {
        assert_eq!(
            kind_of(parse_value(MetricType::Weight, "0", TimeGrammar::Strict)),
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            kind_of(parse_value(MetricType::Weight, "0.0", TimeGrammar::Strict)),
            ParseErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_value_input_trims_and_tags_grammar() {
        let input = ValueInput::new(MetricType::Time, " 1:00 ", TimeGrammar::Smart).unwrap();
        assert_eq!(
            input,
            ValueInput::Time {
                text: "1:00",
                grammar: TimeGrammar::Smart
            }
        );
    }

    #[test]
    fn test_format_raw() {
        assert_eq!(format_raw(MetricType::Time, 750_000), "12:30");
        assert_eq!(format_raw(MetricType::Time, 5_400_400), "1:30:00");
        assert_eq!(format_raw(MetricType::Time, 89_600), "1:30");
        assert_eq!(format_raw(MetricType::Reps, 12), "12");
        assert_eq!(format_raw(MetricType::Distance, 2500), "2.5 km");
        assert_eq!(format_raw(MetricType::Distance, 800), "800 m");
        assert_eq!(format_raw(MetricType::Weight, 102_500), "102.5 kg");
    }
}
