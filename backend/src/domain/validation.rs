//! Field-level input validation.
//!
//! Payload parsing runs every check and reports all failing fields together.
//! [`FieldErrors`] accumulates messages; helpers here coerce raw strings into
//! domain values and push a readable message on failure.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::{Choice, Error};

/// Message used when a schedule ends before (or when) it starts.
pub const DATE_ORDER_MESSAGE: &str = "End date must be after start date";

/// Message used as the top-level error when several fields fail.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

/// Accumulates validation failures across the fields of one payload.
///
/// # Examples
/// ```
/// use hostel_backend::domain::{ErrorCode, FieldErrors};
///
/// let mut errors = FieldErrors::default();
/// let title = errors.required_text("title", Some("  "), 200);
/// assert!(title.is_none());
/// let err = errors.finish().expect_err("blank title");
/// assert_eq!(err.code(), ErrorCode::InvalidRequest);
/// assert_eq!(err.message(), "title is required");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    messages: Vec<String>,
}

impl FieldErrors {
    /// Record a failure message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Whether no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Recorded messages in insertion order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Convert the accumulated failures into a domain error.
    ///
    /// A single failure becomes the top-level message; several failures are
    /// summarised as `Validation failed` with every message in `details`.
    pub fn finish(self) -> Result<(), Error> {
        match self.messages.as_slice() {
            [] => Ok(()),
            [single] => Err(Error::invalid_request(single.clone()).with_details(self.messages)),
            _ => Err(Error::invalid_request(VALIDATION_FAILED_MESSAGE).with_details(self.messages)),
        }
    }

    /// Keep the value of `result`, recording its error message.
    pub fn check<T>(&mut self, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.push(message);
                None
            }
        }
    }

    /// Require a non-blank string no longer than `max_len` characters.
    pub fn required_text(&mut self, field: &str, raw: Option<&str>, max_len: usize) -> Option<String> {
        match raw.map(str::trim) {
            None | Some("") => {
                self.push(format!("{field} is required"));
                None
            }
            Some(value) => self.check(bounded(field, value, max_len)),
        }
    }

    /// Accept an optional string; blank input is treated as absent.
    pub fn optional_text(
        &mut self,
        field: &str,
        raw: Option<&str>,
        max_len: usize,
    ) -> Option<Option<String>> {
        match raw.map(str::trim) {
            None | Some("") => Some(None),
            Some(value) => self.check(bounded(field, value, max_len)).map(Some),
        }
    }

    /// Parse a required enumerated token.
    pub fn required_choice<T: Choice>(&mut self, field: &str, raw: Option<&str>) -> Option<T> {
        match raw.map(str::trim) {
            None | Some("") => {
                self.push(format!("{field} is required"));
                None
            }
            Some(value) => self.check(parse_choice(field, value)),
        }
    }

    /// Parse an optional enumerated token.
    pub fn optional_choice<T: Choice>(&mut self, field: &str, raw: Option<&str>) -> Option<Option<T>> {
        match raw.map(str::trim) {
            None | Some("") => Some(None),
            Some(value) => self.check(parse_choice(field, value)).map(Some),
        }
    }

    /// Parse a required timestamp.
    pub fn required_timestamp(&mut self, field: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
        match raw.map(str::trim) {
            None | Some("") => {
                self.push(format!("{field} is required"));
                None
            }
            Some(value) => self.check(parse_timestamp(field, value)),
        }
    }

    /// Parse an optional timestamp.
    pub fn optional_timestamp(
        &mut self,
        field: &str,
        raw: Option<&str>,
    ) -> Option<Option<DateTime<Utc>>> {
        match raw.map(str::trim) {
            None | Some("") => Some(None),
            Some(value) => self.check(parse_timestamp(field, value)).map(Some),
        }
    }

    /// Parse a required calendar day.
    pub fn required_day(&mut self, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
        match raw.map(str::trim) {
            None | Some("") => {
                self.push(format!("{field} is required"));
                None
            }
            Some(value) => self.check(parse_day(field, value)),
        }
    }

    /// Parse an optional calendar day.
    pub fn optional_day(&mut self, field: &str, raw: Option<&str>) -> Option<Option<NaiveDate>> {
        match raw.map(str::trim) {
            None | Some("") => Some(None),
            Some(value) => self.check(parse_day(field, value)).map(Some),
        }
    }

    /// Require `start < end` when both bounds parsed.
    pub fn date_order(&mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) {
        if let (Some(start), Some(end)) = (start, end)
            && start >= end
        {
            self.push(DATE_ORDER_MESSAGE);
        }
    }
}

fn bounded(field: &str, value: &str, max_len: usize) -> Result<String, String> {
    if value.chars().count() > max_len {
        return Err(format!("{field} must be at most {max_len} characters"));
    }
    Ok(value.to_owned())
}

/// Parse an enumerated token, naming the field on failure.
pub fn parse_choice<T: Choice>(field: &str, raw: &str) -> Result<T, String> {
    T::parse_token(raw).map_err(|err| format!("{field} {err}"))
}

/// Parse a timestamp in any accepted format.
///
/// Accepted inputs are RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) and a
/// bare `YYYY-MM-DD` (midnight UTC).
///
/// # Examples
/// ```
/// use hostel_backend::domain::parse_timestamp;
///
/// let ts = parse_timestamp("startDate", "2024-02-01T10:00").expect("valid");
/// assert_eq!(ts.to_rfc3339(), "2024-02-01T10:00:00+00:00");
/// assert!(parse_timestamp("startDate", "tomorrow").is_err());
/// ```
pub fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| format!("{field} must be a valid date"))
}

/// Parse a calendar day. Timestamps are accepted and truncated to their UTC
/// date.
pub fn parse_day(field: &str, raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| parse_timestamp(field, raw).map(|ts| ts.date_naive()))
        .map_err(|_| format!("{field} must be a valid date"))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ErrorCode, EventType};
    use rstest::rstest;

    #[rstest]
    #[case("2024-02-01T10:00:00Z", "2024-02-01T10:00:00+00:00")]
    #[case("2024-02-01T10:00:00+02:00", "2024-02-01T08:00:00+00:00")]
    #[case("2024-02-01T10:00", "2024-02-01T10:00:00+00:00")]
    #[case("2024-02-01T10:00:30", "2024-02-01T10:00:30+00:00")]
    #[case("2024-02-01", "2024-02-01T00:00:00+00:00")]
    fn timestamps_accept_supported_formats(#[case] raw: &str, #[case] expected: &str) {
        let parsed = parse_timestamp("startDate", raw).expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("01/02/2024")]
    #[case("2024-13-01")]
    fn timestamps_reject_garbage(#[case] raw: &str) {
        let err = parse_timestamp("startDate", raw).expect_err("invalid timestamp");
        assert_eq!(err, "startDate must be a valid date");
    }

    #[rstest]
    fn days_accept_timestamps() {
        let day = parse_day("date", "2024-03-05T23:00:00Z").expect("valid day");
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 3, 5).expect("date"));
    }

    #[rstest]
    fn single_failure_becomes_the_message() {
        let mut errors = FieldErrors::default();
        errors.date_order(
            parse_timestamp("startDate", "2024-02-01T10:00").ok(),
            parse_timestamp("endDate", "2024-02-01T09:00").ok(),
        );
        let err = errors.finish().expect_err("inverted range");
        assert_eq!(err.message(), DATE_ORDER_MESSAGE);
        assert_eq!(err.details(), [DATE_ORDER_MESSAGE]);
    }

    #[rstest]
    fn equal_bounds_are_rejected() {
        let mut errors = FieldErrors::default();
        let at = parse_timestamp("startDate", "2024-02-01").ok();
        errors.date_order(at, at);
        assert_eq!(errors.messages(), [DATE_ORDER_MESSAGE]);
    }

    #[rstest]
    fn every_failing_field_is_reported() {
        let mut errors = FieldErrors::default();
        assert!(errors.required_text("title", None, 10).is_none());
        assert!(errors.required_choice::<EventType>("type", Some("party")).is_none());
        assert!(errors.required_timestamp("startDate", Some("soon")).is_none());

        let err = errors.finish().expect_err("three failures");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), VALIDATION_FAILED_MESSAGE);
        assert_eq!(err.details().len(), 3);
        assert_eq!(err.details()[0], "title is required");
        assert!(err.details()[1].starts_with("type must be one of: academic"));
        assert_eq!(err.details()[2], "startDate must be a valid date");
    }

    #[rstest]
    fn text_is_trimmed_and_bounded() {
        let mut errors = FieldErrors::default();
        assert_eq!(
            errors.required_text("title", Some("  Movie night "), 20),
            Some("Movie night".to_owned())
        );
        assert!(errors.required_text("title", Some("abcdef"), 5).is_none());
        assert_eq!(errors.messages(), ["title must be at most 5 characters"]);
    }

    #[rstest]
    fn blank_optionals_are_absent() {
        let mut errors = FieldErrors::default();
        assert_eq!(errors.optional_text("location", Some("  "), 10), Some(None));
        assert_eq!(errors.optional_choice::<EventType>("type", None), Some(None));
        assert!(errors.is_empty());
        assert!(errors.finish().is_ok());
    }
}
