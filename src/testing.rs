//! In-memory `CalendarStore` double for the crate's tests.
//!
//! Mimics the host store's observable contract: sequential record ids,
//! field-present-overwrites update semantics, instance filtering that
//! excludes cancelled records, and a separate exception-insert path that
//! never touches the series record.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use calbridge_core::error::{CalBridgeError, CalBridgeResult};
use calbridge_core::store::{
    AttendeeRow, AttendeeValues, CalendarRow, CalendarStore, CalendarValues, EventRow, EventValues,
    InstanceQuery, RecordId, ReminderRow, ReminderValues, WriteScope, codes,
};

pub(crate) struct MemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    calendars: HashMap<RecordId, CalendarRecord>,
    events: HashMap<RecordId, EventRecord>,
    reminders: HashMap<RecordId, ReminderValues>,
    attendees: HashMap<RecordId, AttendeeValues>,
}

struct CalendarRecord {
    row: CalendarRow,
    synced: bool,
    visible: bool,
}

#[derive(Clone)]
struct EventRecord {
    values: EventValues,
    original_id: Option<RecordId>,
    last_scope: WriteScope,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
        }
    }

    /// Seed a calendar row the way a host store would report it.
    pub fn seed_calendar(&self, id: &str, account_name: &str, account_type: &str) {
        let mut state = self.state.lock().unwrap();
        state.calendars.insert(
            id.to_string(),
            CalendarRecord {
                row: CalendarRow {
                    id: id.to_string(),
                    display_name: Some(format!("Calendar {id}")),
                    account_name: Some(account_name.to_string()),
                    is_primary: Some("1".to_string()),
                    access_level: Some(codes::CAL_ACCESS_OWNER),
                    allowed_availability: Some("0,1,2".to_string()),
                    account_type: Some(account_type.to_string()),
                    color: Some(0x4F6BED),
                },
                synced: false,
                visible: true,
            },
        );
    }

    pub fn calendar_synced(&self, id: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.calendars.get(id).is_some_and(|c| c.synced && c.visible)
    }

    /// The stored value set for an event record.
    pub fn event_values(&self, id: &str) -> Option<EventValues> {
        let state = self.state.lock().unwrap();
        state.events.get(id).map(|record| record.values.clone())
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().unwrap().events.len()
    }

    pub fn calendar_count(&self) -> usize {
        self.state.lock().unwrap().calendars.len()
    }

    /// Ids of exception records attached to a series, sorted by id.
    pub fn exception_ids(&self, series_id: &str) -> Vec<RecordId> {
        let state = self.state.lock().unwrap();
        let mut ids: Vec<RecordId> = state
            .events
            .iter()
            .filter(|(_, record)| record.original_id.as_deref() == Some(series_id))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// The scope the last write on a record used.
    pub fn last_event_scope(&self, id: &str) -> Option<WriteScope> {
        let state = self.state.lock().unwrap();
        state.events.get(id).map(|record| record.last_scope.clone())
    }

    pub fn reminder_minutes(&self, event_id: &str) -> Vec<i64> {
        let state = self.state.lock().unwrap();
        let mut minutes: Vec<i64> = state
            .reminders
            .values()
            .filter(|values| values.event_id == event_id)
            .map(|values| values.minutes)
            .collect();
        minutes.sort();
        minutes
    }

    pub fn attendee_emails(&self, event_id: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut emails: Vec<String> = state
            .attendees
            .values()
            .filter(|values| values.event_id == event_id)
            .map(|values| values.email.clone())
            .collect();
        emails.sort();
        emails
    }
}

impl State {
    fn assign_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id.to_string()
    }
}

fn merge(target: &mut EventValues, incoming: EventValues) {
    macro_rules! overwrite {
        ($($field:ident),* $(,)?) => {
            $(if incoming.$field.is_some() {
                target.$field = incoming.$field;
            })*
        };
    }
    overwrite!(
        title,
        description,
        location,
        begin_ms,
        end_ms,
        rrule,
        duration,
        all_day,
        time_zone,
        end_time_zone,
        has_alarm,
        availability,
        calendar_id,
        original_instance_time,
        status,
    );
}

fn row_from_record(id: &str, record: &EventRecord) -> EventRow {
    let values = &record.values;
    EventRow {
        id: id.to_string(),
        title: values.title.clone(),
        description: values.description.clone(),
        begin_ms: values.begin_ms,
        end_ms: values.end_ms,
        all_day: values.all_day,
        location: values.location.clone(),
        rrule: values.rrule.clone(),
        calendar_id: values.calendar_id.clone(),
        availability: values.availability,
        has_alarm: values.has_alarm,
        original_id: record.original_id.clone(),
        duration: values.duration.clone(),
        original_sync_id: None,
    }
}

#[async_trait]
impl CalendarStore for MemoryStore {
    async fn calendars(&self) -> CalBridgeResult<Vec<CalendarRow>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<CalendarRow> = state.calendars.values().map(|c| c.row.clone()).collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn calendar_by_id(&self, id: &str) -> CalBridgeResult<Option<CalendarRow>> {
        let state = self.state.lock().unwrap();
        Ok(state.calendars.get(id).map(|c| c.row.clone()))
    }

    async fn insert_calendar(
        &self,
        values: CalendarValues,
        _scope: &WriteScope,
    ) -> CalBridgeResult<RecordId> {
        let mut state = self.state.lock().unwrap();
        let id = state.assign_id();
        state.calendars.insert(
            id.clone(),
            CalendarRecord {
                row: CalendarRow {
                    id: id.clone(),
                    display_name: values.display_name,
                    account_name: values.account_name,
                    is_primary: None,
                    access_level: values.access_level,
                    allowed_availability: None,
                    account_type: values.account_type,
                    color: values.color,
                },
                synced: false,
                visible: true,
            },
        );
        Ok(id)
    }

    async fn delete_calendar(&self, id: &str) -> CalBridgeResult<u64> {
        let mut state = self.state.lock().unwrap();
        Ok(if state.calendars.remove(id).is_some() { 1 } else { 0 })
    }

    async fn mark_calendar_synced(&self, id: &str) -> CalBridgeResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(calendar) = state.calendars.get_mut(id) {
            calendar.synced = true;
            calendar.visible = true;
        }
        Ok(())
    }

    async fn instances(&self, query: &InstanceQuery) -> CalBridgeResult<Vec<EventRow>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<EventRow> = state
            .events
            .iter()
            .filter(|(_, record)| record.values.status != Some(codes::STATUS_CANCELED))
            .filter(|(_, record)| {
                let Some(begin) = record.values.begin_ms else {
                    return false;
                };
                let Some(end) = record.values.end_ms else {
                    return false;
                };
                begin < query.begins_before_ms && end >= query.ends_at_or_after_ms
            })
            .filter(|(_, record)| {
                query.calendar_ids.is_empty()
                    || record
                        .values
                        .calendar_id
                        .as_ref()
                        .is_some_and(|id| query.calendar_ids.contains(id))
            })
            .map(|(id, record)| row_from_record(id, record))
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn event_by_id(&self, id: &str) -> CalBridgeResult<Option<EventRow>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .get(id)
            .map(|record| row_from_record(id, record)))
    }

    async fn insert_event(
        &self,
        values: EventValues,
        scope: &WriteScope,
    ) -> CalBridgeResult<RecordId> {
        let mut state = self.state.lock().unwrap();
        let id = state.assign_id();
        state.events.insert(
            id.clone(),
            EventRecord {
                values,
                original_id: None,
                last_scope: scope.clone(),
            },
        );
        Ok(id)
    }

    async fn update_event(
        &self,
        id: &str,
        values: EventValues,
        scope: &WriteScope,
    ) -> CalBridgeResult<u64> {
        let mut state = self.state.lock().unwrap();
        match state.events.get_mut(id) {
            Some(record) => {
                merge(&mut record.values, values);
                record.last_scope = scope.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_event(&self, id: &str, _scope: &WriteScope) -> CalBridgeResult<u64> {
        let mut state = self.state.lock().unwrap();
        Ok(if state.events.remove(id).is_some() { 1 } else { 0 })
    }

    async fn insert_exception(
        &self,
        series_id: &str,
        values: EventValues,
        scope: &WriteScope,
    ) -> CalBridgeResult<RecordId> {
        let mut state = self.state.lock().unwrap();
        if !state.events.contains_key(series_id) {
            return Err(CalBridgeError::Store(format!(
                "no series record {series_id}"
            )));
        }
        let id = state.assign_id();
        state.events.insert(
            id.clone(),
            EventRecord {
                values,
                original_id: Some(series_id.to_string()),
                last_scope: scope.clone(),
            },
        );
        Ok(id)
    }

    async fn reminders_for_event(&self, event_id: &str) -> CalBridgeResult<Vec<ReminderRow>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<ReminderRow> = state
            .reminders
            .iter()
            .filter(|(_, values)| values.event_id == event_id)
            .map(|(id, values)| ReminderRow {
                id: id.clone(),
                event_id: values.event_id.clone(),
                minutes: Some(values.minutes),
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn delete_reminder(&self, id: &str) -> CalBridgeResult<u64> {
        let mut state = self.state.lock().unwrap();
        Ok(if state.reminders.remove(id).is_some() { 1 } else { 0 })
    }

    async fn insert_reminder(&self, values: ReminderValues) -> CalBridgeResult<RecordId> {
        let mut state = self.state.lock().unwrap();
        let id = state.assign_id();
        state.reminders.insert(id.clone(), values);
        Ok(id)
    }

    async fn attendees_for_event(&self, event_id: &str) -> CalBridgeResult<Vec<AttendeeRow>> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<AttendeeRow> = state
            .attendees
            .iter()
            .filter(|(_, values)| values.event_id == event_id)
            .map(|(id, values)| AttendeeRow {
                id: id.clone(),
                event_id: values.event_id.clone(),
                name: values.name.clone(),
                email: Some(values.email.clone()),
                kind: None,
                relationship: Some(values.relationship.to_string()),
                status: None,
                identity: None,
                id_namespace: None,
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rows)
    }

    async fn delete_attendee(&self, id: &str) -> CalBridgeResult<u64> {
        let mut state = self.state.lock().unwrap();
        Ok(if state.attendees.remove(id).is_some() { 1 } else { 0 })
    }

    async fn insert_attendee(&self, values: AttendeeValues) -> CalBridgeResult<RecordId> {
        let mut state = self.state.lock().unwrap();
        let id = state.assign_id();
        state.attendees.insert(id.clone(), values);
        Ok(id)
    }

    fn event_uri(&self, id: &str) -> String {
        format!("memory://events/{id}")
    }
}
