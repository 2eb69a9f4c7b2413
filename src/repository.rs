//! Public calendar operations against a host store.
//!
//! The repository composes the codec, mapper, reconciler and exception
//! deriver into the operations an application calls. Every operation is an
//! async function producing exactly one terminal result; the dispatch
//! boundary that schedules these futures lives outside this crate, as does
//! the permission prompt flow. The repository only checks the grant it was
//! handed.

use calbridge_core::calendar::{Calendar, CalendarDraft};
use calbridge_core::datetime::DateTimeInput;
use calbridge_core::error::{CalBridgeError, CalBridgeResult};
use calbridge_core::event::{Event, EventDraft};
use calbridge_core::store::{CalendarStore, EventRow, InstanceQuery, RecordId};

use crate::config::RepositoryConfig;
use crate::exceptions::{self, SaveDisposition, SaveOptions};
use crate::{children, mapper};

/// The access the authorization subsystem has granted the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
}

impl Permissions {
    /// Full read/write access.
    pub fn granted() -> Self {
        Self {
            read: true,
            write: true,
        }
    }

    pub fn read_only() -> Self {
        Self {
            read: true,
            write: false,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// Calendar event repository over a host store backend.
pub struct EventRepository<S> {
    store: S,
    permissions: Permissions,
    config: RepositoryConfig,
}

impl<S: CalendarStore> EventRepository<S> {
    pub fn new(store: S, permissions: Permissions, config: RepositoryConfig) -> Self {
        Self {
            store,
            permissions,
            config,
        }
    }

    /// All calendars the store reports.
    pub async fn list_calendars(&self) -> CalBridgeResult<Vec<Calendar>> {
        self.require_read()?;
        let rows = self.store.calendars().await?;
        Ok(rows.iter().map(mapper::calendar_from_row).collect())
    }

    pub async fn get_calendar(&self, id: &str) -> CalBridgeResult<Option<Calendar>> {
        self.require_read()?;
        let row = self.store.calendar_by_id(id).await?;
        Ok(row.as_ref().map(mapper::calendar_from_row))
    }

    /// Create a calendar, returning the store-assigned id. Draft validation
    /// runs before any store access.
    pub async fn create_calendar(&self, draft: &CalendarDraft) -> CalBridgeResult<RecordId> {
        self.require_write()?;
        let (values, scope) = mapper::calendar_values(draft)?;
        let id = self.store.insert_calendar(values, &scope).await?;
        tracing::debug!(%id, "created calendar");
        Ok(id)
    }

    /// Delete a calendar. True iff the store removed at least one row.
    pub async fn delete_calendar(&self, id: &str) -> CalBridgeResult<bool> {
        self.require_write()?;
        Ok(self.store.delete_calendar(id).await? > 0)
    }

    /// Expanded event instances overlapping `[start, end)`, restricted to
    /// `calendar_ids` when non-empty. The store keeps invisible and
    /// cancelled instances out of the result.
    pub async fn list_events(
        &self,
        start: &DateTimeInput,
        end: &DateTimeInput,
        calendar_ids: &[RecordId],
    ) -> CalBridgeResult<Vec<Event>> {
        self.require_read()?;
        let query = InstanceQuery {
            begins_before_ms: end.to_millis("endDate", true)?,
            ends_at_or_after_ms: start.to_millis("startDate", true)?,
            calendar_ids: calendar_ids.to_vec(),
        };

        let rows = self.store.instances(&query).await?;
        tracing::debug!(count = rows.len(), "listed event instances");

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(self.assemble_event(row).await?);
        }
        Ok(events)
    }

    pub async fn get_event(&self, id: &str) -> CalBridgeResult<Option<Event>> {
        self.require_read()?;
        match self.store.event_by_id(id).await? {
            Some(row) => Ok(Some(self.assemble_event(&row).await?)),
            None => Ok(None),
        }
    }

    /// Create or update an event.
    ///
    /// With `draft.id` set the targeted record is updated in place, unless
    /// `options.exception_date` is set, in which case the series is left
    /// untouched and a detached exception record is created instead. The
    /// returned id is the series id on a direct edit and the new record's
    /// id on the exception path. Child collections are reconciled wholesale
    /// after the write.
    pub async fn save_event(
        &self,
        title: Option<&str>,
        draft: &EventDraft,
        options: &SaveOptions,
    ) -> CalBridgeResult<RecordId> {
        self.require_write()?;
        let utc = !draft.skip_utc_normalization;
        let mut values = mapper::event_values(title, draft, &self.default_time_zone())?;

        let saved_id = match &draft.id {
            Some(id) => {
                let existing = self.require_event(id).await?;
                let disposition = SaveDisposition::derive(options, utc)?;
                if options.sync {
                    if let Some(calendar) = &existing.calendar {
                        self.store.mark_calendar_synced(&calendar.id).await?;
                    }
                }
                let scope = exceptions::write_scope(options.sync, existing.calendar.as_ref());

                match disposition {
                    SaveDisposition::Direct => {
                        let rows = self.store.update_event(id, values, &scope).await?;
                        if rows == 0 {
                            return Err(CalBridgeError::Store(format!(
                                "update of event {id} affected no rows"
                            )));
                        }
                        id.clone()
                    }
                    SaveDisposition::Exception {
                        original_instance_time,
                    } => {
                        values.original_instance_time = Some(original_instance_time);
                        self.store.insert_exception(id, values, &scope).await?
                    }
                }
            }
            None => {
                let calendar = self.resolve_target_calendar(draft).await?;
                values.calendar_id = Some(
                    calendar
                        .as_ref()
                        .map(|c| c.id.clone())
                        .unwrap_or_else(|| self.config.default_calendar_id.clone()),
                );
                if options.sync {
                    if let Some(calendar) = &calendar {
                        self.store.mark_calendar_synced(&calendar.id).await?;
                    }
                }
                let scope = exceptions::write_scope(options.sync, calendar.as_ref());
                self.store.insert_event(values, &scope).await?
            }
        };

        // Children are reconciled against the id the caller addressed,
        // which on the exception path is the series, matching the store's
        // legacy contract.
        let child_target = draft.id.as_deref().unwrap_or(&saved_id);
        if let Some(alarms) = &draft.alarms {
            let kept = children::replace_reminders(&self.store, child_target, alarms).await?;
            tracing::debug!(event = child_target, kept, "reconciled reminders");
        }
        if let Some(attendees) = &draft.attendees {
            let kept = children::replace_attendees(&self.store, child_target, attendees).await?;
            tracing::debug!(event = child_target, kept, "reconciled attendees");
        }

        tracing::debug!(id = %saved_id, "saved event");
        Ok(saved_id)
    }

    /// Remove an event, or cancel a single occurrence when
    /// `options.exception_date` is set. True iff the store acknowledged the
    /// write.
    pub async fn remove_event(&self, id: &str, options: &SaveOptions) -> CalBridgeResult<bool> {
        self.require_write()?;
        let existing = self.require_event(id).await?;

        match SaveDisposition::derive(options, true)? {
            SaveDisposition::Direct => {
                if options.sync {
                    if let Some(calendar) = &existing.calendar {
                        self.store.mark_calendar_synced(&calendar.id).await?;
                    }
                }
                let scope = exceptions::write_scope(options.sync, existing.calendar.as_ref());
                let rows = self.store.delete_event(id, &scope).await?;
                Ok(rows > 0)
            }
            SaveDisposition::Exception {
                original_instance_time,
            } => {
                let scope = exceptions::write_scope(options.sync, existing.calendar.as_ref());
                let values = exceptions::cancellation_values(original_instance_time);
                self.store.insert_exception(id, values, &scope).await?;
                Ok(true)
            }
        }
    }

    /// Hand the event's store URI to the platform viewer. Best-effort: a
    /// failure is logged, never surfaced.
    pub fn open_in_external_viewer(&self, id: &str) {
        let uri = self.store.event_uri(id);
        if let Err(err) = open::that(&uri) {
            tracing::warn!(%uri, %err, "failed to open event in external viewer");
        }
    }

    async fn assemble_event(&self, row: &EventRow) -> CalBridgeResult<Event> {
        let mut event = mapper::event_from_row(row)?;

        if let Some(calendar_id) = &row.calendar_id {
            event.calendar = self
                .store
                .calendar_by_id(calendar_id)
                .await?
                .as_ref()
                .map(mapper::calendar_from_row);
        }

        event.attendees = self
            .store
            .attendees_for_event(&row.id)
            .await?
            .iter()
            .map(mapper::attendee_from_row)
            .collect();

        if row.has_alarm.unwrap_or(0) > 0 {
            event.reminders = self
                .store
                .reminders_for_event(&row.id)
                .await?
                .iter()
                .filter_map(mapper::reminder_from_row)
                .collect();
        }

        Ok(event)
    }

    async fn require_event(&self, id: &str) -> CalBridgeResult<Event> {
        match self.store.event_by_id(id).await? {
            Some(row) => self.assemble_event(&row).await,
            None => Err(CalBridgeError::EventNotFound(id.to_string())),
        }
    }

    /// The calendar a new event lands in: the draft's when it resolves,
    /// otherwise the configured well-known default.
    async fn resolve_target_calendar(&self, draft: &EventDraft) -> CalBridgeResult<Option<Calendar>> {
        let requested = draft
            .calendar_id
            .as_deref()
            .unwrap_or(&self.config.default_calendar_id);
        let row = self.store.calendar_by_id(requested).await?;
        if row.is_none() {
            tracing::debug!(
                calendar = requested,
                fallback = %self.config.default_calendar_id,
                "calendar did not resolve, using the default id"
            );
        }
        Ok(row.as_ref().map(mapper::calendar_from_row))
    }

    fn default_time_zone(&self) -> String {
        self.config
            .time_zone
            .clone()
            .or_else(|| iana_time_zone::get_timezone().ok())
            .unwrap_or_else(|| "UTC".to_string())
    }

    fn require_read(&self) -> CalBridgeResult<()> {
        if self.permissions.read {
            Ok(())
        } else {
            Err(CalBridgeError::Unauthorized(
                "calendar read access has not been granted".to_string(),
            ))
        }
    }

    fn require_write(&self) -> CalBridgeResult<()> {
        if self.permissions.write {
            Ok(())
        } else {
            Err(CalBridgeError::Unauthorized(
                "calendar write access has not been granted".to_string(),
            ))
        }
    }
}
