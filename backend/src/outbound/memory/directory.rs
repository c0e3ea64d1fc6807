//! In-memory user directory.
//!
//! Accounts and hostels are supplied up front; the only write path is the
//! bootstrap admin upsert.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{RepositoryError, UserAccount, UserDirectory};
use crate::domain::{Hostel, User, UserId};

/// Account and hostel directory held in process memory.
#[derive(Default)]
pub struct MemoryUserDirectory {
    accounts: RwLock<BTreeMap<String, UserAccount>>,
    hostels: RwLock<Vec<Hostel>>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory holding `accounts` and `hostels`.
    pub fn with_records(
        accounts: impl IntoIterator<Item = UserAccount>,
        hostels: impl IntoIterator<Item = Hostel>,
    ) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.user.username.clone(), account))
            .collect();
        let mut hostels: Vec<Hostel> = hostels.into_iter().collect();
        hostels.sort_by(|left, right| left.name.cmp(&right.name));
        Self {
            accounts: RwLock::new(accounts),
            hostels: RwLock::new(hostels),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| &account.user.id == id)
            .map(|account| account.user.clone()))
    }

    async fn find_account(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }

    async fn list_hostels(&self) -> Result<Vec<Hostel>, RepositoryError> {
        Ok(self.hostels.read().await.clone())
    }

    async fn upsert_account(&self, account: &UserAccount) -> Result<(), RepositoryError> {
        self.accounts
            .write()
            .await
            .insert(account.user.username.clone(), account.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{HostelId, PasswordDigest, Role};
    use rstest::rstest;

    fn account(username: &str) -> UserAccount {
        UserAccount {
            user: User {
                id: UserId::random(),
                username: username.to_owned(),
                display_name: username.to_uppercase(),
                role: Role::Student,
                hostel_id: None,
                room_number: Some("B-204".to_owned()),
            },
            password_digest: PasswordDigest::derive("pw").expect("hashing succeeds"),
        }
    }

    fn hostel(name: &str) -> Hostel {
        Hostel {
            id: HostelId::random(),
            name: name.to_owned(),
            warden_id: None,
            capacity: 120,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn looks_up_accounts_by_name_and_id() {
        let stored = account("asha");
        let id = stored.user.id;
        let directory = MemoryUserDirectory::with_records([stored], []);

        let by_name = directory.find_account("asha").await.expect("lookup");
        assert_eq!(by_name.map(|a| a.user.id), Some(id));
        let by_id = directory.find_user(&id).await.expect("lookup");
        assert_eq!(by_id.map(|u| u.username), Some("asha".to_owned()));
        assert!(directory.find_account("ravi").await.expect("lookup").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn hostels_are_listed_by_name() {
        let directory =
            MemoryUserDirectory::with_records([], [hostel("Tagore"), hostel("Aravali")]);
        let names: Vec<_> = directory
            .list_hostels()
            .await
            .expect("hostels")
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, ["Aravali", "Tagore"]);
    }
}
