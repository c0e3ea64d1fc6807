//! Hostels: managed residential buildings with a single warden.

use serde::{Deserialize, Serialize};

use super::{HostelId, UserId};

/// A residential building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hostel {
    /// Stable identifier.
    pub id: HostelId,
    /// Display name, unique across the university.
    pub name: String,
    /// Warden managing the hostel, if one is appointed.
    pub warden_id: Option<UserId>,
    /// Number of resident places.
    pub capacity: u32,
}
