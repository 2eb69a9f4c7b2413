//! Store-neutral event types.
//!
//! [`Event`] is the canonical read model assembled from store rows;
//! [`EventDraft`] is the write model. A field present on a draft overwrites
//! the stored field on save; there is no finer-grained patching.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::calendar::Calendar;
use crate::datetime::{self, DateTimeInput};
use crate::recurrence::{Frequency, RecurrenceRule, RecurrenceRuleDraft};
use crate::store::{RecordId, codes};

/// A calendar event as read back from the host store.
///
/// When `recurrence_rule` is set, `id` identifies the whole series, not a
/// single occurrence. `original_id`/`sync_id` are present only on detached
/// exception instances of a series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: RecordId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,

    #[serde(with = "datetime::serde_utc_option", default)]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(with = "datetime::serde_utc_option", default)]
    pub end_date: Option<DateTime<Utc>>,

    pub all_day: bool,

    pub availability: Availability,

    /// Legacy single-token frequency, mirroring `recurrence_rule.frequency`.
    pub recurrence: Option<Frequency>,

    pub recurrence_rule: Option<RecurrenceRule>,

    /// The owning calendar, resolved from the record's calendar reference.
    pub calendar: Option<Calendar>,

    #[serde(default)]
    pub reminders: Vec<Reminder>,

    #[serde(default)]
    pub attendees: Vec<Attendee>,

    pub original_id: Option<RecordId>,
    pub sync_id: Option<String>,
}

/// Whether an event blocks time on the owner's calendar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    #[default]
    Busy,
    Free,
    Tentative,
}

const AVAILABILITY_BUSY: &str = "busy";
const AVAILABILITY_FREE: &str = "free";
const AVAILABILITY_TENTATIVE: &str = "tentative";

impl Availability {
    /// Store-native integer code.
    pub fn to_code(self) -> i64 {
        match self {
            Availability::Busy => codes::AVAILABILITY_BUSY,
            Availability::Free => codes::AVAILABILITY_FREE,
            Availability::Tentative => codes::AVAILABILITY_TENTATIVE,
        }
    }

    /// Decode a store code. Unrecognized codes read as busy.
    pub fn from_code(code: i64) -> Self {
        Self::try_from_code(code).unwrap_or_default()
    }

    /// Decode a store code, `None` when unrecognized.
    pub fn try_from_code(code: i64) -> Option<Self> {
        match code {
            codes::AVAILABILITY_BUSY => Some(Availability::Busy),
            codes::AVAILABILITY_FREE => Some(Availability::Free),
            codes::AVAILABILITY_TENTATIVE => Some(Availability::Tentative),
            _ => None,
        }
    }

    /// Symbolic spelling some store implementations use in the
    /// allowed-availabilities column instead of the integer code.
    pub fn from_symbolic(token: &str) -> Option<Self> {
        match token {
            "AVAILABILITY_BUSY" => Some(Availability::Busy),
            "AVAILABILITY_FREE" => Some(Availability::Free),
            "AVAILABILITY_TENTATIVE" => Some(Availability::Tentative),
            _ => None,
        }
    }
}

impl AsRef<str> for Availability {
    fn as_ref(&self) -> &str {
        match self {
            Availability::Busy => AVAILABILITY_BUSY,
            Availability::Free => AVAILABILITY_FREE,
            Availability::Tentative => AVAILABILITY_TENTATIVE,
        }
    }
}

impl Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Availability {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            AVAILABILITY_BUSY => Ok(Availability::Busy),
            AVAILABILITY_FREE => Ok(Availability::Free),
            AVAILABILITY_TENTATIVE => Ok(Availability::Tentative),
            _ => Err(()),
        }
    }
}

/// A reminder child record: minutes relative to the owning event's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub minutes: i64,
}

impl Reminder {
    /// Absolute fire instant for an event starting at `start`.
    pub fn fire_date(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start + Duration::minutes(self.minutes)
    }
}

/// An attendee child record. Everything but name and email is populated by
/// the store and read-only.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub relationship: Option<String>,
    pub status: Option<String>,
    pub identity: Option<String>,
    pub id_namespace: Option<String>,
}

/// Write-side event description.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    /// Present when updating an existing record.
    pub id: Option<RecordId>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTimeInput>,
    pub end_date: Option<DateTimeInput>,
    pub all_day: Option<bool>,

    /// Legacy single-token frequency.
    pub recurrence: Option<String>,
    pub recurrence_rule: Option<RecurrenceRuleDraft>,

    pub availability: Option<Availability>,
    pub calendar_id: Option<RecordId>,

    pub time_zone: Option<String>,
    pub end_time_zone: Option<String>,

    pub alarms: Option<Vec<ReminderDraft>>,
    pub attendees: Option<Vec<AttendeeDraft>>,

    /// Interpret start/end date strings in the local zone instead of UTC.
    pub skip_utc_normalization: bool,
}

/// Write-side reminder description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderDraft {
    pub minutes: ReminderOffset,
}

/// Reminder offsets arrive from loosely-typed callers; anything that is not
/// a plain number is skipped during reconciliation rather than failing the
/// save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReminderOffset {
    Minutes(i64),
    Unsupported(serde_json::Value),
}

/// Write-side attendee description. Drafts without an email are skipped
/// during reconciliation.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendeeDraft {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_availability_codes_are_mutually_inverse() {
        for code in [
            codes::AVAILABILITY_BUSY,
            codes::AVAILABILITY_FREE,
            codes::AVAILABILITY_TENTATIVE,
        ] {
            assert_eq!(Availability::from_code(code).to_code(), code);
        }
    }

    #[test]
    fn test_availability_unknown_code_reads_as_busy() {
        assert_eq!(Availability::from_code(42), Availability::Busy);
        assert_eq!(Availability::from_code(-1), Availability::Busy);
    }

    #[test]
    fn test_availability_symbolic_variants() {
        assert_eq!(
            Availability::from_symbolic("AVAILABILITY_TENTATIVE"),
            Some(Availability::Tentative)
        );
        assert_eq!(Availability::from_symbolic("tentative"), None);
    }

    #[test]
    fn test_reminder_fire_date() {
        let start = chrono::Utc
            .with_ymd_and_hms(2025, 3, 20, 15, 0, 0)
            .unwrap();
        let reminder = Reminder { minutes: 30 };
        assert_eq!(
            reminder.fire_date(start),
            chrono::Utc.with_ymd_and_hms(2025, 3, 20, 15, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_draft_deserializes_loose_reminder_offsets() {
        let draft: EventDraft = serde_json::from_str(
            r#"{
                "startDate": "2025-03-20T15:00:00.000Z",
                "endDate": 1742484000000,
                "alarms": [{"minutes": 10}, {"minutes": "bad"}]
            }"#,
        )
        .unwrap();

        let alarms = draft.alarms.unwrap();
        assert!(matches!(alarms[0].minutes, ReminderOffset::Minutes(10)));
        assert!(matches!(alarms[1].minutes, ReminderOffset::Unsupported(_)));
    }
}
