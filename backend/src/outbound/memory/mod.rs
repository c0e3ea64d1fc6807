//! Process-local adapters used when no database is configured.
//!
//! Every table lives behind a Tokio `RwLock`; data is lost on restart.

mod backups;
mod directory;
mod preferences;
mod records;
mod table;

pub use backups::MemoryBackupRepository;
pub use directory::MemoryUserDirectory;
pub use preferences::MemoryUserPreferencesRepository;
pub use records::MemoryRecords;
