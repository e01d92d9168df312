//! Text-to-value converters for element content.
//!
//! Converters receive trimmed, non-empty text. The distinction between
//! absent content and malformed content lives in [`convert_optional`]:
//! absent or blank text is `None`, anything else must convert or fail.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::config::{validate_date_format, DEFAULT_DATE_FORMAT};
use crate::error::{FragmentError, Result};

/// Converts element text into a typed value.
pub trait Converter {
    type Output;

    /// Short name of the produced type, used in error messages.
    fn kind(&self) -> &'static str;

    /// Convert trimmed, non-empty text.
    fn convert(&self, text: &str) -> Result<Self::Output>;
}

/// Convert optional raw content.
///
/// # Returns
/// * `Ok(None)` for absent, empty or whitespace-only content
/// * `Ok(Some(value))` when the converter accepts the trimmed text
/// * `Err(FragmentError::InvalidValue)` when it does not
///
/// # Examples
/// ```
/// use sax_fragments::converters::{convert_optional, IntegerConverter};
///
/// assert_eq!(convert_optional(&IntegerConverter, Some(" 42 ")).unwrap(), Some(42));
/// assert_eq!(convert_optional(&IntegerConverter, Some("  ")).unwrap(), None);
/// assert_eq!(convert_optional(&IntegerConverter, None).unwrap(), None);
/// assert!(convert_optional(&IntegerConverter, Some("4x2")).is_err());
/// ```
pub fn convert_optional<C: Converter + ?Sized>(
    converter: &C,
    raw: Option<&str>,
) -> Result<Option<C::Output>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => converter.convert(text).map(Some),
    }
}

/// Keeps the text as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl Converter for TextConverter {
    type Output = String;

    fn kind(&self) -> &'static str {
        "text"
    }

    fn convert(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Calendar dates, ISO-8601 (`YYYY-MM-DD`) unless configured otherwise.
#[derive(Debug, Clone)]
pub struct DateConverter {
    format: String,
}

impl DateConverter {
    /// Use a custom `strftime` format.
    pub fn with_format(format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        validate_date_format(&format)?;
        Ok(Self { format })
    }

    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }
}

impl Default for DateConverter {
    fn default() -> Self {
        Self {
            format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl Converter for DateConverter {
    type Output = NaiveDate;

    fn kind(&self) -> &'static str {
        "date"
    }

    fn convert(&self, text: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(text, &self.format)
            .map_err(|e| FragmentError::invalid_value(self.kind(), text, e))
    }
}

/// RFC 3339 timestamps with offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeConverter;

impl Converter for DateTimeConverter {
    type Output = DateTime<FixedOffset>;

    fn kind(&self) -> &'static str {
        "datetime"
    }

    fn convert(&self, text: &str) -> Result<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(text)
            .map_err(|e| FragmentError::invalid_value(self.kind(), text, e))
    }
}

/// Signed 64-bit integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerConverter;

impl Converter for IntegerConverter {
    type Output = i64;

    fn kind(&self) -> &'static str {
        "integer"
    }

    fn convert(&self, text: &str) -> Result<i64> {
        text.parse()
            .map_err(|e| FragmentError::invalid_value(self.kind(), text, e))
    }
}

/// Finite decimal numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalConverter;

impl Converter for DecimalConverter {
    type Output = f64;

    fn kind(&self) -> &'static str {
        "decimal"
    }

    fn convert(&self, text: &str) -> Result<f64> {
        let value: f64 = text
            .parse()
            .map_err(|e| FragmentError::invalid_value(self.kind(), text, e))?;
        if !value.is_finite() {
            return Err(FragmentError::invalid_value(
                self.kind(),
                text,
                "not a finite number",
            ));
        }
        Ok(value)
    }
}

/// `true`/`false`/`1`/`0`, case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    type Output = bool;

    fn kind(&self) -> &'static str {
        "boolean"
    }

    fn convert(&self, text: &str) -> Result<bool> {
        if text.eq_ignore_ascii_case("true") || text == "1" {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") || text == "0" {
            Ok(false)
        } else {
            Err(FragmentError::invalid_value(
                self.kind(),
                text,
                "expected true, false, 1 or 0",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_date_iso() {
        let date = DateConverter::default().convert("2009-01-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2009, 1, 1).unwrap());
    }

    #[test]
    fn test_date_invalid_reports_content() {
        let err = DateConverter::default().convert("not-a-date").unwrap_err();
        match err {
            FragmentError::InvalidValue { kind, content, .. } => {
                assert_eq!(kind, "date");
                assert_eq!(content, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_date_rejects_impossible_day() {
        assert!(DateConverter::default().convert("2009-02-30").is_err());
    }

    #[test]
    fn test_date_custom_format() {
        let converter = DateConverter::with_format("%d-%m-%Y").unwrap();
        assert_eq!(converter.format(), "%d-%m-%Y");
        let date = converter.convert("31-12-2024").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 12, 31));
        assert!(converter.convert("2024-12-31").is_err());
    }

    #[test]
    fn test_date_invalid_format_rejected() {
        assert!(DateConverter::with_format("%Q").is_err());
    }

    #[test]
    fn test_datetime() {
        let value = DateTimeConverter.convert("2009-01-01T12:30:00+02:00").unwrap();
        assert_eq!(value.hour(), 12);
        assert_eq!(value.offset().local_minus_utc(), 7200);
        assert!(DateTimeConverter.convert("2009-01-01").is_err());
    }

    #[test]
    fn test_integer() {
        assert_eq!(IntegerConverter.convert("-17").unwrap(), -17);
        assert!(IntegerConverter.convert("1.5").is_err());
    }

    #[test]
    fn test_decimal() {
        assert!((DecimalConverter.convert("12.50").unwrap() - 12.5).abs() < f64::EPSILON);
        assert!(DecimalConverter.convert("NaN").is_err());
        assert!(DecimalConverter.convert("inf").is_err());
        assert!(DecimalConverter.convert("twelve").is_err());
    }

    #[test]
    fn test_boolean() {
        assert!(BooleanConverter.convert("TRUE").unwrap());
        assert!(BooleanConverter.convert("1").unwrap());
        assert!(!BooleanConverter.convert("False").unwrap());
        assert!(!BooleanConverter.convert("0").unwrap());
        assert!(BooleanConverter.convert("yes").is_err());
    }

    #[test]
    fn test_optional_distinguishes_empty_from_invalid() {
        let converter = DateConverter::default();
        assert_eq!(convert_optional(&converter, None).unwrap(), None);
        assert_eq!(convert_optional(&converter, Some("")).unwrap(), None);
        assert_eq!(convert_optional(&converter, Some(" \n\t")).unwrap(), None);
        assert!(convert_optional(&converter, Some("not-a-date"))
            .unwrap_err()
            .is_value_error());
    }

    #[test]
    fn test_text_kept() {
        assert_eq!(TextConverter.convert("a b").unwrap(), "a b");
    }
}
