//! Shared validation helpers for inbound HTTP adapters.
//!
//! Query strings and request bodies arrive as raw strings so that every
//! failing field can be reported together through [`FieldErrors`] instead of
//! stopping at the first serde failure.

use std::str::FromStr;

use pagination::PageRequest;
use serde::{Deserialize, Deserializer};

use crate::domain::{Error, FieldErrors, IdParseError, VALIDATION_FAILED_MESSAGE};

/// Upper bound for titles and labels.
pub(crate) const TITLE_MAX: usize = 200;
/// Upper bound for descriptions, reasons and free-form remarks.
pub(crate) const TEXT_MAX: usize = 5000;
/// Upper bound for locations, destinations and room numbers.
pub(crate) const PLACE_MAX: usize = 120;

/// `?id=<uuid>` selector shared by single-record endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// Deserialize a nullable field so that an explicit `null` is told apart
/// from an absent key.
///
/// Use together with `#[serde(default)]`: absent keys stay `None`, `null`
/// becomes `Some(None)`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validate a nullable text field of a partial update.
///
/// `null` and blank strings clear the field.
pub(crate) fn patch_text(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<Option<&str>>,
    max_len: usize,
) -> Option<Option<Option<String>>> {
    match raw {
        None => Some(None),
        Some(None) => Some(Some(None)),
        Some(Some(value)) => errors.optional_text(field, Some(value), max_len).map(Some),
    }
}

/// Turn accumulated failures into the response error.
pub(crate) fn rejected(errors: FieldErrors) -> Error {
    match errors.finish() {
        Err(err) => err,
        Ok(()) => Error::invalid_request(VALIDATION_FAILED_MESSAGE),
    }
}

/// Parse a record identifier, reporting the id kind on failure.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, Error>
where
    T: FromStr<Err = IdParseError>,
{
    raw.trim()
        .parse()
        .map_err(|err: IdParseError| Error::invalid_request(err.to_string()))
}

/// Require the `id` query parameter and parse it.
pub(crate) fn require_id<T>(query: &IdQuery) -> Result<T, Error>
where
    T: FromStr<Err = IdParseError>,
{
    match query.id.as_deref().map(str::trim) {
        None | Some("") => Err(Error::invalid_request("id query parameter is required")),
        Some(raw) => parse_id(raw),
    }
}

/// Parse an optional identifier filter.
pub(crate) fn optional_id<T>(errors: &mut FieldErrors, raw: Option<&str>) -> Option<Option<T>>
where
    T: FromStr<Err = IdParseError>,
{
    match raw.map(str::trim) {
        None | Some("") => Some(None),
        Some(value) => errors
            .check(value.parse::<T>().map_err(|err| err.to_string()))
            .map(Some),
    }
}

/// Parse an optional boolean flag such as `unread=true`.
pub(crate) fn optional_flag(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<bool> {
    match raw.map(str::trim) {
        None | Some("") => Some(false),
        Some("true" | "1") => Some(true),
        Some("false" | "0") => Some(false),
        Some(_) => {
            errors.push(format!("{field} must be true or false"));
            None
        }
    }
}

fn positive(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<Option<u32>> {
    match raw.map(str::trim) {
        None | Some("") => Some(None),
        Some(value) => errors
            .check(
                value
                    .parse::<u32>()
                    .map_err(|_| format!("{field} must be a positive integer")),
            )
            .map(Some),
    }
}

/// Parse `page` and `limit`, applying the pagination defaults and bounds.
pub(crate) fn page_request(
    errors: &mut FieldErrors,
    page: Option<&str>,
    limit: Option<&str>,
) -> Option<PageRequest> {
    let page = positive(errors, "page", page)?;
    let limit = positive(errors, "limit", limit)?;
    errors.check(PageRequest::new(page, limit).map_err(|err| err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, EventId};
    use rstest::rstest;

    #[rstest]
    fn require_id_rejects_missing_selector() {
        let err = require_id::<EventId>(&IdQuery::default()).expect_err("id is required");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "id query parameter is required");
    }

    #[rstest]
    fn require_id_names_the_id_kind() {
        let query = IdQuery {
            id: Some("not-a-uuid".to_owned()),
        };
        let err = require_id::<EventId>(&query).expect_err("malformed id");
        assert_eq!(err.message(), "event id must be a valid UUID");
    }

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some("3"), Some("50"), 3, 50)]
    #[case(Some(" 2 "), None, 2, 10)]
    fn page_request_applies_defaults(
        #[case] page: Option<&str>,
        #[case] limit: Option<&str>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let mut errors = FieldErrors::default();
        let request = page_request(&mut errors, page, limit).expect("valid page");
        assert!(errors.is_empty());
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.limit(), expected_limit);
    }

    #[rstest]
    #[case(Some("0"), None, "page must be at least 1")]
    #[case(None, Some("0"), "limit must be at least 1")]
    #[case(None, Some("101"), "limit must not exceed 100")]
    #[case(Some("-1"), None, "page must be a positive integer")]
    #[case(None, Some("ten"), "limit must be a positive integer")]
    fn page_request_reports_bad_bounds(
        #[case] page: Option<&str>,
        #[case] limit: Option<&str>,
        #[case] message: &str,
    ) {
        let mut errors = FieldErrors::default();
        assert!(page_request(&mut errors, page, limit).is_none());
        assert_eq!(errors.messages(), [message]);
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        location: Option<Option<String>>,
    }

    #[rstest]
    #[case(r#"{}"#, None)]
    #[case(r#"{"location":null}"#, Some(None))]
    #[case(r#"{"location":"Hall A"}"#, Some(Some("Hall A")))]
    fn nullable_distinguishes_null_from_absent(
        #[case] body: &str,
        #[case] expected: Option<Option<&str>>,
    ) {
        let patch: Patch = serde_json::from_str(body).expect("valid json");
        assert_eq!(patch.location.as_ref().map(Option::as_deref), expected);
    }

    #[rstest]
    fn patch_text_clears_on_blank() {
        let mut errors = FieldErrors::default();
        assert_eq!(
            patch_text(&mut errors, "location", Some(Some("  ")), 10),
            Some(Some(None))
        );
        assert_eq!(patch_text(&mut errors, "location", None, 10), Some(None));
        assert!(patch_text(&mut errors, "location", Some(Some("far too long")), 5).is_none());
        assert_eq!(errors.messages(), ["location must be at most 5 characters"]);
    }

    #[rstest]
    #[case(Some("true"), Some(true))]
    #[case(Some("0"), Some(false))]
    #[case(None, Some(false))]
    #[case(Some("maybe"), None)]
    fn optional_flag_parses_booleans(#[case] raw: Option<&str>, #[case] expected: Option<bool>) {
        let mut errors = FieldErrors::default();
        assert_eq!(optional_flag(&mut errors, "unread", raw), expected);
    }
}
