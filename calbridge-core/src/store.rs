//! Host store interface.
//!
//! The translation layer talks to the platform calendar store through this
//! module: named-field row and value records plus the [`CalendarStore`]
//! trait a backend implements. The store is authoritative and durable; it
//! owns range queries and recurring-instance expansion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CalBridgeResult;

/// Store-assigned record identifier, opaque to this layer.
pub type RecordId = String;

/// Store-native codes shared with host backends.
pub mod codes {
    pub const AVAILABILITY_BUSY: i64 = 0;
    pub const AVAILABILITY_FREE: i64 = 1;
    pub const AVAILABILITY_TENTATIVE: i64 = 2;

    pub const CAL_ACCESS_NONE: i64 = 0;
    pub const CAL_ACCESS_FREEBUSY: i64 = 100;
    pub const CAL_ACCESS_READ: i64 = 200;
    pub const CAL_ACCESS_RESPOND: i64 = 300;
    pub const CAL_ACCESS_OVERRIDE: i64 = 400;
    pub const CAL_ACCESS_CONTRIBUTOR: i64 = 500;
    pub const CAL_ACCESS_EDITOR: i64 = 600;
    pub const CAL_ACCESS_OWNER: i64 = 700;
    pub const CAL_ACCESS_ROOT: i64 = 800;

    pub const STATUS_TENTATIVE: i64 = 0;
    pub const STATUS_CONFIRMED: i64 = 1;
    pub const STATUS_CANCELED: i64 = 2;

    pub const REMINDER_METHOD_ALERT: i64 = 1;
    pub const RELATIONSHIP_ATTENDEE: i64 = 1;

    /// Account type marker for calendars not backed by a remote account.
    pub const ACCOUNT_TYPE_LOCAL: &str = "LOCAL";
}

/// An event (or expanded instance) row as returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: RecordId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub begin_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub all_day: Option<i64>,
    pub location: Option<String>,
    pub rrule: Option<String>,
    pub calendar_id: Option<RecordId>,
    pub availability: Option<i64>,
    pub has_alarm: Option<i64>,
    /// Series record id; set only on detached exception instances.
    pub original_id: Option<RecordId>,
    pub duration: Option<String>,
    pub original_sync_id: Option<String>,
}

/// Field set for an event write. A present field overwrites the stored
/// field; an absent one leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventValues {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub begin_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub rrule: Option<String>,
    pub duration: Option<String>,
    pub all_day: Option<i64>,
    pub time_zone: Option<String>,
    pub end_time_zone: Option<String>,
    pub has_alarm: Option<i64>,
    pub availability: Option<i64>,
    pub calendar_id: Option<RecordId>,
    pub original_instance_time: Option<i64>,
    pub status: Option<i64>,
}

/// A calendar row as returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub id: RecordId,
    pub display_name: Option<String>,
    pub account_name: Option<String>,
    /// `"1"` when the calendar is the account's primary one. Stored as text
    /// by the host schema.
    pub is_primary: Option<String>,
    pub access_level: Option<i64>,
    /// Delimited availability code list.
    pub allowed_availability: Option<String>,
    pub account_type: Option<String>,
    pub color: Option<i64>,
}

/// Field set for a calendar insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarValues {
    pub account_name: Option<String>,
    pub account_type: Option<String>,
    pub color: Option<i64>,
    pub access_level: Option<i64>,
    pub owner_account: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
}

/// A reminder child row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReminderRow {
    pub id: RecordId,
    pub event_id: RecordId,
    pub minutes: Option<i64>,
}

/// Field set for a reminder insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderValues {
    pub event_id: RecordId,
    pub minutes: i64,
    pub method: i64,
}

/// An attendee child row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttendeeRow {
    pub id: RecordId,
    pub event_id: RecordId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub kind: Option<String>,
    pub relationship: Option<String>,
    pub status: Option<String>,
    pub identity: Option<String>,
    pub id_namespace: Option<String>,
}

/// Field set for an attendee insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeValues {
    pub event_id: RecordId,
    pub email: String,
    pub name: Option<String>,
    pub relationship: i64,
}

/// Scope of a write against the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteScope {
    /// Ordinary interactive write.
    #[default]
    Interactive,
    /// Authoritative write issued on behalf of the account's sync adapter.
    /// Some store implementations require this before accepting writes on
    /// another account's data.
    SyncAdapter {
        account_name: String,
        account_type: String,
    },
}

/// Range query over expanded event instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceQuery {
    /// Instances must begin before this instant (exclusive), epoch ms.
    pub begins_before_ms: i64,
    /// Instances must end at or after this instant, epoch ms.
    pub ends_at_or_after_ms: i64,
    /// Restrict to these calendars when non-empty (logical OR).
    pub calendar_ids: Vec<RecordId>,
}

/// Interface a host calendar store backend implements.
///
/// Implementations are externally synchronized; the translation layer adds
/// no locking or versioning. `instances` must already exclude invisible and
/// cancelled instances, and `event_by_id` must exclude records the store
/// has marked deleted.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    async fn calendars(&self) -> CalBridgeResult<Vec<CalendarRow>>;

    async fn calendar_by_id(&self, id: &str) -> CalBridgeResult<Option<CalendarRow>>;

    /// Insert a calendar, returning the store-assigned id.
    async fn insert_calendar(
        &self,
        values: CalendarValues,
        scope: &WriteScope,
    ) -> CalBridgeResult<RecordId>;

    /// Delete a calendar, returning the number of rows affected.
    async fn delete_calendar(&self, id: &str) -> CalBridgeResult<u64>;

    /// Mark a calendar as actively synced and visible.
    async fn mark_calendar_synced(&self, id: &str) -> CalBridgeResult<()>;

    /// Expanded instances overlapping the query range.
    async fn instances(&self, query: &InstanceQuery) -> CalBridgeResult<Vec<EventRow>>;

    async fn event_by_id(&self, id: &str) -> CalBridgeResult<Option<EventRow>>;

    /// Insert an event, returning the store-assigned id.
    async fn insert_event(
        &self,
        values: EventValues,
        scope: &WriteScope,
    ) -> CalBridgeResult<RecordId>;

    /// Update an event in place, returning the number of rows affected.
    async fn update_event(
        &self,
        id: &str,
        values: EventValues,
        scope: &WriteScope,
    ) -> CalBridgeResult<u64>;

    /// Delete an event, returning the number of rows affected.
    async fn delete_event(&self, id: &str, scope: &WriteScope) -> CalBridgeResult<u64>;

    /// Insert a detached exception record for a series, returning the new
    /// record's id. The series record itself must not be modified.
    async fn insert_exception(
        &self,
        series_id: &str,
        values: EventValues,
        scope: &WriteScope,
    ) -> CalBridgeResult<RecordId>;

    async fn reminders_for_event(&self, event_id: &str) -> CalBridgeResult<Vec<ReminderRow>>;

    async fn delete_reminder(&self, id: &str) -> CalBridgeResult<u64>;

    async fn insert_reminder(&self, values: ReminderValues) -> CalBridgeResult<RecordId>;

    async fn attendees_for_event(&self, event_id: &str) -> CalBridgeResult<Vec<AttendeeRow>>;

    async fn delete_attendee(&self, id: &str) -> CalBridgeResult<u64>;

    async fn insert_attendee(&self, values: AttendeeValues) -> CalBridgeResult<RecordId>;

    /// The store's URI for an event record, for hand-off to a viewer.
    fn event_uri(&self, id: &str) -> String;
}
