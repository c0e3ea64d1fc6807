//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::{HostelId, Principal, Role, UserId};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, hour, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn admin() -> Principal {
    Principal::new(UserId::random(), Role::Admin, None)
}

pub(crate) fn warden_of(hostel: HostelId) -> Principal {
    Principal::new(UserId::random(), Role::Warden, Some(hostel))
}

pub(crate) fn student_of(hostel: HostelId) -> Principal {
    Principal::new(UserId::random(), Role::Student, Some(hostel))
}
