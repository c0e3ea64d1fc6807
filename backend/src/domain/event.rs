//! Hostel events.
//!
//! Events may target a single hostel or be general (`hostel_id == None`), in
//! which case every resident sees them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::DATE_ORDER_MESSAGE;
use super::{Error, EventId, HostelFilter, HostelId, Principal, UserId, choice_enum};

choice_enum! {
    /// Kind of event.
    pub enum EventType {
        /// Lectures, workshops, exams.
        Academic => "academic",
        /// Festivals and performances.
        Cultural => "cultural",
        /// Matches and tournaments.
        Sports => "sports",
        /// Resident or staff meetings.
        Meeting => "meeting",
        /// Scheduled maintenance windows.
        Maintenance => "maintenance",
        /// Anything else.
        Other => "other",
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self::Other
    }
}

/// A scheduled event.
///
/// ## Invariants
/// - `start_date < end_date`.
/// - `revision` starts at 1 and increases by one per update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identifier.
    pub id: EventId,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Start instant.
    pub start_date: DateTime<Utc>,
    /// End instant.
    pub end_date: DateTime<Utc>,
    /// Venue.
    pub location: Option<String>,
    /// Kind of event.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Target hostel; `None` for general events.
    pub hostel_id: Option<HostelId>,
    /// Author.
    pub created_by: UserId,
    /// Optimistic concurrency revision.
    pub revision: u32,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Start instant.
    pub start_date: DateTime<Utc>,
    /// End instant.
    pub end_date: DateTime<Utc>,
    /// Venue.
    pub location: Option<String>,
    /// Kind of event.
    pub event_type: EventType,
    /// Requested target hostel.
    pub hostel_id: Option<HostelId>,
}

/// Partial update for an event. `None` leaves a field unchanged; nullable
/// fields use `Some(None)` to clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New start instant.
    pub start_date: Option<DateTime<Utc>>,
    /// New end instant.
    pub end_date: Option<DateTime<Utc>>,
    /// New venue.
    pub location: Option<Option<String>>,
    /// New kind.
    pub event_type: Option<EventType>,
    /// Revision the client last saw.
    pub expected_revision: Option<u32>,
}

impl Event {
    /// Materialise a new event authored by `created_by`.
    pub fn create(
        id: EventId,
        input: NewEvent,
        hostel_id: Option<HostelId>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            location: input.location,
            event_type: input.event_type,
            hostel_id,
            created_by,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply `patch`, re-checking the schedule against the merged values.
    pub fn apply(&mut self, patch: EventPatch, now: DateTime<Utc>) -> Result<(), Error> {
        let start = patch.start_date.unwrap_or(self.start_date);
        let end = patch.end_date.unwrap_or(self.end_date);
        if start >= end {
            return Err(Error::invalid_request(DATE_ORDER_MESSAGE).with_details([DATE_ORDER_MESSAGE]));
        }

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        self.start_date = start;
        self.end_date = end;
        self.revision += 1;
        self.updated_at = now;
        Ok(())
    }
}

/// Caller-supplied list criteria for events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCriteria {
    /// Explicit hostel.
    pub hostel_id: Option<HostelId>,
    /// Only events starting at or after this instant.
    pub starts_from: Option<DateTime<Utc>>,
    /// Only events ending at or before this instant.
    pub ends_by: Option<DateTime<Utc>>,
    /// Only events of this kind.
    pub event_type: Option<EventType>,
}

impl EventCriteria {
    /// Combine with the caller's visibility.
    pub fn scoped(self, principal: &Principal) -> EventFilter {
        EventFilter {
            hostels: HostelFilter::for_principal(principal, self.hostel_id),
            starts_from: self.starts_from,
            ends_by: self.ends_by,
            event_type: self.event_type,
        }
    }
}

/// List filter for events.
///
/// Ordering is by `start_date` ascending, then identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Hostel visibility.
    pub hostels: HostelFilter,
    /// Only events starting at or after this instant.
    pub starts_from: Option<DateTime<Utc>>,
    /// Only events ending at or before this instant.
    pub ends_by: Option<DateTime<Utc>>,
    /// Only events of this kind.
    pub event_type: Option<EventType>,
}

impl EventFilter {
    /// Unfiltered view bounded by `hostels`.
    pub fn visible(hostels: HostelFilter) -> Self {
        Self {
            hostels,
            starts_from: None,
            ends_by: None,
            event_type: None,
        }
    }

    /// Whether `event` passes every predicate.
    pub fn matches(&self, event: &Event) -> bool {
        self.hostels.permits(event.hostel_id.as_ref())
            && self.starts_from.is_none_or(|from| event.start_date >= from)
            && self.ends_by.is_none_or(|by| event.end_date <= by)
            && self.event_type.is_none_or(|kind| event.event_type == kind)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, hour, 0, 0).single().expect("valid time")
    }

    #[fixture]
    fn event() -> Event {
        Event::create(
            EventId::random(),
            NewEvent {
                title: "Quiz night".to_owned(),
                description: None,
                start_date: at(18),
                end_date: at(20),
                location: Some("Common room".to_owned()),
                event_type: EventType::Cultural,
                hostel_id: None,
            },
            None,
            UserId::random(),
            at(9),
        )
    }

    #[rstest]
    fn new_events_start_at_revision_one(event: Event) {
        assert_eq!(event.revision, 1);
        assert_eq!(event.created_at, event.updated_at);
    }

    #[rstest]
    fn patch_merges_and_bumps_revision(mut event: Event) {
        let patch = EventPatch {
            title: Some("Trivia".to_owned()),
            location: Some(None),
            end_date: Some(at(21)),
            ..EventPatch::default()
        };
        event.apply(patch, at(10)).expect("valid patch");
        assert_eq!(event.title, "Trivia");
        assert_eq!(event.location, None);
        assert_eq!(event.end_date, at(21));
        assert_eq!(event.revision, 2);
        assert_eq!(event.updated_at, at(10));
    }

    #[rstest]
    fn patch_checks_merged_schedule(mut event: Event) {
        let before = event.clone();
        let patch = EventPatch {
            start_date: Some(at(22)),
            ..EventPatch::default()
        };
        let err = event.apply(patch, at(10)).expect_err("start after end");
        assert_eq!(err.message(), DATE_ORDER_MESSAGE);
        assert_eq!(event, before);
    }

    #[rstest]
    fn filter_bounds_are_inclusive(event: Event) {
        let mut filter = EventFilter::visible(HostelFilter::Any);
        filter.starts_from = Some(at(18));
        filter.ends_by = Some(at(20));
        assert!(filter.matches(&event));

        filter.starts_from = Some(at(19));
        assert!(!filter.matches(&event));
    }

    #[rstest]
    fn type_serialises_under_type_key(event: Event) {
        let json = serde_json::to_value(&event).expect("serialise");
        assert_eq!(json["type"], "cultural");
        assert!(json.get("eventType").is_none());
    }

    #[rstest]
    fn default_type_is_other() {
        assert_eq!(EventType::default(), EventType::Other);
    }
}
