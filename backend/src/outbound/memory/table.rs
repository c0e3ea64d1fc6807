//! Ordered in-memory table shared by the record adapters.
//!
//! Each table owns a `BTreeMap` behind a Tokio `RwLock`. Listing clones the
//! matching rows under the read lock; writes hold the write lock for the
//! whole check-then-write sequence so revision and uniqueness checks cannot
//! race.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;

use pagination::PageRequest;
use tokio::sync::{RwLock, RwLockWriteGuard};

use crate::domain::ports::{Listing, RepositoryError};

/// A value stored in a [`Table`].
pub(crate) trait Row: Clone + Send + Sync {
    /// Primary key type.
    type Key: Ord + Copy + Display + Send + Sync;

    /// Primary key of this row.
    fn key(&self) -> Self::Key;

    /// Optimistic concurrency revision. Append-only rows have none.
    fn revision(&self) -> Option<u32> {
        None
    }

    /// Whether `self` and `other` collide on a secondary unique key.
    fn collides(&self, _other: &Self) -> bool {
        false
    }
}

pub(crate) type Rows<T> = BTreeMap<<T as Row>::Key, T>;

/// Lock-guarded map of rows keyed by primary key.
pub(crate) struct Table<T: Row> {
    rows: RwLock<Rows<T>>,
}

impl<T: Row> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

fn duplicate_error<T: Row>(row: &T) -> RepositoryError {
    RepositoryError::duplicate(format!("record {} collides with an existing entry", row.key()))
}

impl<T: Row> Table<T> {
    /// Return one page of rows passing `keep`, sorted by `order`.
    pub(crate) async fn page(
        &self,
        keep: impl Fn(&T) -> bool,
        order: impl Fn(&T, &T) -> Ordering,
        page: &PageRequest,
    ) -> Listing<T> {
        let rows = self.rows.read().await;
        let mut matched: Vec<&T> = rows.values().filter(|row| keep(row)).collect();
        matched.sort_by(|left, right| order(left, right));
        let total = matched.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Listing::new(items, total)
    }

    /// Fetch a row by key.
    pub(crate) async fn find(&self, key: &T::Key) -> Option<T> {
        self.rows.read().await.get(key).cloned()
    }

    /// Insert a new row, rejecting key and secondary-key collisions.
    pub(crate) async fn insert(&self, row: &T) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&row.key()) || rows.values().any(|existing| existing.collides(row)) {
            return Err(duplicate_error(row));
        }
        rows.insert(row.key(), row.clone());
        Ok(())
    }

    /// Replace a row when its stored revision still equals `expected`.
    pub(crate) async fn replace(&self, row: &T, expected: u32) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        let key = row.key();
        let actual = rows
            .get(&key)
            .ok_or_else(|| RepositoryError::missing(format!("record {key} not found")))?
            .revision()
            .unwrap_or_default();
        if actual != expected {
            return Err(RepositoryError::revision_mismatch(expected, actual));
        }
        if rows
            .values()
            .any(|existing| existing.key() != key && existing.collides(row))
        {
            return Err(duplicate_error(row));
        }
        rows.insert(key, row.clone());
        Ok(())
    }

    /// Mutate a row in place.
    pub(crate) async fn modify(
        &self,
        key: &T::Key,
        change: impl FnOnce(&mut T),
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .get_mut(key)
            .ok_or_else(|| RepositoryError::missing(format!("record {key} not found")))?;
        change(row);
        Ok(())
    }

    /// Mutate every row passing `keep`. Returns how many reported a change.
    pub(crate) async fn modify_matching(
        &self,
        keep: impl Fn(&T) -> bool,
        mut change: impl FnMut(&mut T) -> bool,
    ) -> u64 {
        let mut rows = self.rows.write().await;
        let mut changed = 0;
        for row in rows.values_mut().filter(|row| keep(row)) {
            if change(row) {
                changed += 1;
            }
        }
        changed
    }

    /// Remove a row. Returns `false` when it did not exist.
    pub(crate) async fn remove(&self, key: &T::Key) -> bool {
        self.rows.write().await.remove(key).is_some()
    }

    /// Clone every row in key order.
    pub(crate) async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    /// Exclusive access for bulk replacement.
    pub(crate) async fn lock(&self) -> RwLockWriteGuard<'_, Rows<T>> {
        self.rows.write().await
    }
}

/// Swap the guarded rows for `replacement`.
pub(crate) fn replace_all<T: Row>(rows: &mut Rows<T>, replacement: &[T]) {
    *rows = replacement
        .iter()
        .map(|row| (row.key(), row.clone()))
        .collect();
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Bed {
        id: u32,
        room: String,
        revision: u32,
    }

    impl Row for Bed {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }

        fn revision(&self) -> Option<u32> {
            Some(self.revision)
        }

        fn collides(&self, other: &Self) -> bool {
            self.room == other.room
        }
    }

    fn bed(id: u32, room: &str) -> Bed {
        Bed {
            id,
            room: room.to_owned(),
            revision: 1,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn pages_skip_and_count_matches() {
        let table = Table::default();
        for id in 1..=125 {
            table.insert(&bed(id, &format!("R{id}"))).await.expect("insert");
        }
        let request = PageRequest::new(Some(3), Some(50)).expect("page");
        let listing = table
            .page(|_| true, |left: &Bed, right| left.id.cmp(&right.id), &request)
            .await;
        assert_eq!(listing.total, 125);
        assert_eq!(listing.items.len(), 25);
        assert_eq!(listing.items.first().map(|row| row.id), Some(101));
    }

    #[rstest]
    #[tokio::test]
    async fn secondary_key_collisions_are_duplicates() {
        let table = Table::default();
        table.insert(&bed(1, "A1")).await.expect("insert");
        let err = table.insert(&bed(2, "A1")).await.expect_err("duplicate");
        assert!(matches!(err, RepositoryError::Duplicate { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn replace_is_conditional_on_revision() {
        let table = Table::default();
        table.insert(&bed(1, "A1")).await.expect("insert");
        let mut edited = bed(1, "A2");
        edited.revision = 2;

        let stale = table.replace(&edited, 5).await.expect_err("stale");
        assert_eq!(stale, RepositoryError::revision_mismatch(5_u32, 1_u32));

        table.replace(&edited, 1).await.expect("replace");
        assert_eq!(table.find(&1).await, Some(edited));
    }

    #[rstest]
    #[tokio::test]
    async fn replacing_missing_rows_reports_missing() {
        let table: Table<Bed> = Table::default();
        let err = table.replace(&bed(9, "Z9"), 1).await.expect_err("missing");
        assert!(matches!(err, RepositoryError::Missing { .. }));
    }
}
