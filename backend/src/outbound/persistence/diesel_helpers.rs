//! Shared helpers for the Diesel record repositories.
//!
//! - Pool and Diesel failures map onto [`RepositoryError`] with debug context.
//! - Revisions and counts cross between Postgres integers and domain types.
//! - Visibility filters translate into SQL predicates via
//!   [`filter_by_hostel!`](crate::filter_by_hostel).

use pagination::PageRequest;
use tracing::debug;

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Map pool errors to connection failures.
pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors.
///
/// Unique violations become [`RepositoryError::Duplicate`] so slot clashes
/// surface as conflicts rather than internal errors.
pub(crate) fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            RepositoryError::duplicate(
                info.constraint_name()
                    .map_or_else(|| "unique constraint violated".to_owned(), |name| {
                        format!("unique constraint {name} violated")
                    }),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::connection("database connection error")
        }
        _ => RepositoryError::query("database error"),
    }
}

/// Report a stored value the domain refuses to accept.
pub(crate) fn corrupt_row(column: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::query(format!("invalid stored {column}: {err}"))
}

/// Cast database revision (i32) to domain revision (u32).
#[expect(
    clippy::cast_sign_loss,
    reason = "revision is always non-negative in database"
)]
pub(crate) fn cast_revision(revision: i32) -> u32 {
    revision as u32
}

/// Cast domain revision (u32) to database revision (i32).
#[expect(
    clippy::cast_possible_wrap,
    reason = "revision values are always small positive integers"
)]
pub(crate) fn cast_revision_for_db(revision: u32) -> i32 {
    revision as i32
}

/// Cast a non-negative `BIGINT` count.
#[expect(
    clippy::cast_sign_loss,
    reason = "counts and sizes are never negative"
)]
pub(crate) fn cast_count(count: i64) -> u64 {
    count as u64
}

/// Cast a domain count into `BIGINT`.
pub(crate) fn cast_count_for_db(count: u64) -> Result<i64, RepositoryError> {
    i64::try_from(count).map_err(|_| RepositoryError::query("count exceeds BIGINT range"))
}

/// `LIMIT` and `OFFSET` values for a page.
pub(crate) fn page_bounds(page: &PageRequest) -> Result<(i64, i64), RepositoryError> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| RepositoryError::query("page offset exceeds BIGINT range"))?;
    Ok((i64::from(page.limit()), offset))
}

/// Resolve a zero-row conditional update into the precise failure.
pub(crate) fn disambiguate_update_failure(
    current_revision: Option<i32>,
    expected_revision: u32,
    not_found_message: &str,
) -> RepositoryError {
    match current_revision {
        Some(actual) => RepositoryError::revision_mismatch(expected_revision, cast_revision(actual)),
        None => RepositoryError::missing(not_found_message),
    }
}

/// Narrow a boxed query to the rows a [`HostelFilter`] admits.
///
/// [`HostelFilter`]: crate::domain::HostelFilter
#[macro_export]
macro_rules! filter_by_hostel {
    ($query:expr, $column:expr, $filter:expr) => {{
        use diesel::prelude::*;
        use $crate::domain::HostelFilter;

        match $filter {
            HostelFilter::Any => $query,
            HostelFilter::Nothing => {
                $query.filter(diesel::dsl::sql::<diesel::sql_types::Bool>("FALSE"))
            }
            HostelFilter::Only {
                hostel: Some(hostel),
                include_general: true,
            } => $query.filter(
                $column
                    .nullable()
                    .eq(*hostel.as_uuid())
                    .or($column.nullable().is_null()),
            ),
            HostelFilter::Only {
                hostel: Some(hostel),
                include_general: false,
            } => $query.filter($column.nullable().eq(*hostel.as_uuid())),
            HostelFilter::Only { hostel: None, .. } => $query.filter($column.nullable().is_null()),
        }
    }};
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_are_connection_failures() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, RepositoryError::connection("timed out"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(err, RepositoryError::query("record not found"));
    }

    #[rstest]
    #[case(Some(4), RepositoryError::revision_mismatch(2_u32, 4_u32))]
    #[case(None, RepositoryError::missing("event not found"))]
    fn zero_row_updates_are_disambiguated(
        #[case] current: Option<i32>,
        #[case] expected: RepositoryError,
    ) {
        assert_eq!(
            disambiguate_update_failure(current, 2, "event not found"),
            expected
        );
    }

    #[rstest]
    fn page_bounds_follow_the_request() {
        let request = PageRequest::new(Some(3), Some(50)).expect("page");
        assert_eq!(page_bounds(&request).expect("bounds"), (50, 100));
    }
}
