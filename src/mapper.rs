//! Store record mapping.
//!
//! Converts named-field store rows into canonical records, and drafts into
//! the value sets handed to the store for writes.

use calbridge_core::calendar::{self, AccessLevel, Calendar, CalendarDraft};
use calbridge_core::datetime;
use calbridge_core::error::{CalBridgeError, CalBridgeResult};
use calbridge_core::event::{Attendee, Availability, Event, EventDraft, Reminder};
use calbridge_core::recurrence::DEFAULT_DURATION;
use calbridge_core::store::{
    AttendeeRow, CalendarRow, CalendarValues, EventRow, EventValues, ReminderRow, WriteScope, codes,
};

use crate::rule;

/// Color reported when the stored value cannot be interpreted.
const FALLBACK_COLOR: &str = "#FFFFFF";

/// Convert an event row into the canonical record.
///
/// The owning calendar and the child collections are attached by the
/// repository, which owns the extra store lookups.
pub fn event_from_row(row: &EventRow) -> CalBridgeResult<Event> {
    let mut recurrence_rule = match &row.rrule {
        Some(raw) => rule::decode(raw)?,
        None => None,
    };
    if let Some(decoded) = recurrence_rule.as_mut() {
        decoded.duration = row.duration.clone();
    }

    Ok(Event {
        id: row.id.clone(),
        title: row.title.clone(),
        description: row.description.clone(),
        location: row.location.clone(),
        start_date: row.begin_ms.and_then(datetime::utc_from_millis),
        end_date: row.end_ms.and_then(datetime::utc_from_millis),
        all_day: row.all_day.unwrap_or(0) != 0,
        availability: Availability::from_code(row.availability.unwrap_or(codes::AVAILABILITY_BUSY)),
        recurrence: recurrence_rule.as_ref().map(|r| r.frequency),
        recurrence_rule,
        calendar: None,
        reminders: Vec::new(),
        attendees: Vec::new(),
        original_id: row.original_id.clone(),
        sync_id: row.original_sync_id.clone(),
    })
}

/// Convert a calendar row into the canonical record.
pub fn calendar_from_row(row: &CalendarRow) -> Calendar {
    let access_level = AccessLevel::from_code(row.access_level.unwrap_or(codes::CAL_ACCESS_NONE));

    Calendar {
        id: row.id.clone(),
        title: row.display_name.clone(),
        source: row.account_name.clone(),
        kind: row.account_type.clone(),
        is_primary: row.is_primary.as_deref().map(|flag| flag == "1"),
        access_level,
        allowed_availabilities: row
            .allowed_availability
            .as_deref()
            .map(calendar::parse_allowed_availabilities)
            .unwrap_or_default(),
        color: format_color(row),
        allows_modifications: access_level.allows_modifications(),
    }
}

fn format_color(row: &CalendarRow) -> String {
    match row.color {
        Some(value) => format!("#{:06X}", value & 0xFFFFFF),
        None => {
            tracing::debug!(calendar = %row.id, "no readable color on calendar row");
            FALLBACK_COLOR.to_string()
        }
    }
}

pub fn reminder_from_row(row: &ReminderRow) -> Option<Reminder> {
    row.minutes.map(|minutes| Reminder { minutes })
}

pub fn attendee_from_row(row: &AttendeeRow) -> Attendee {
    Attendee {
        email: row.email.clone(),
        name: row.name.clone(),
        kind: row.kind.clone(),
        relationship: row.relationship.clone(),
        status: row.status.clone(),
        identity: row.identity.clone(),
        id_namespace: row.id_namespace.clone(),
    }
}

/// Build the write value set for an event save.
///
/// A field present on the draft lands in the values; absent fields are left
/// untouched by the store. Date strings follow the draft's UTC-normalization
/// choice. `default_time_zone` fills the record's zone fields when the draft
/// sets none.
pub fn event_values(
    title: Option<&str>,
    draft: &EventDraft,
    default_time_zone: &str,
) -> CalBridgeResult<EventValues> {
    let utc = !draft.skip_utc_normalization;
    let mut values = EventValues::default();

    values.title = title.map(str::to_string);
    values.description = draft.description.clone();
    values.location = draft.location.clone();

    if let Some(start) = &draft.start_date {
        values.begin_ms = Some(start.to_millis("startDate", utc)?);
    }
    if let Some(end) = &draft.end_date {
        values.end_ms = Some(end.to_millis("endDate", utc)?);
    }

    let all_day = draft.all_day.unwrap_or(false);
    if let (Some(begin), Some(end)) = (values.begin_ms, values.end_ms) {
        if !all_day && end < begin {
            return Err(CalBridgeError::Malformed(
                "endDate",
                "must not precede startDate".to_string(),
            ));
        }
    }

    if let Some(token) = &draft.recurrence {
        if let Some(legacy) = rule::from_legacy_token(token) {
            values.rrule = Some(rule::encode(&legacy));
        }
    }

    if let Some(rule_draft) = &draft.recurrence_rule {
        if rule_draft.frequency.is_some() {
            // The duration column accompanies the rule even when the rule
            // itself turns out unusable, matching the store's legacy
            // contract.
            values.duration = Some(
                rule_draft
                    .duration
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DURATION.to_string()),
            );
        }
        if let Some(structured) = rule::from_draft(rule_draft, utc)? {
            values.rrule = Some(rule::encode(&structured));
        }
    }

    if let Some(flag) = draft.all_day {
        values.all_day = Some(if flag { 1 } else { 0 });
    }

    values.time_zone = Some(resolve_time_zone(
        draft.time_zone.as_deref(),
        default_time_zone,
    ));
    values.end_time_zone = Some(resolve_time_zone(
        draft.end_time_zone.as_deref(),
        default_time_zone,
    ));

    if draft.alarms.is_some() {
        values.has_alarm = Some(1);
    }

    if let Some(availability) = draft.availability {
        values.availability = Some(availability.to_code());
    }

    Ok(values)
}

fn resolve_time_zone(requested: Option<&str>, fallback: &str) -> String {
    match requested {
        Some(zone) => {
            if zone.parse::<chrono_tz::Tz>().is_err() {
                tracing::warn!(zone, "time zone not in the IANA database, writing as given");
            }
            zone.to_string()
        }
        None => fallback.to_string(),
    }
}

/// Validate a calendar draft and build its insert value set plus the
/// sync-adapter write scope carrying the source account.
///
/// Every failure here names the missing field and is raised before any
/// store call.
pub fn calendar_values(draft: &CalendarDraft) -> CalBridgeResult<(CalendarValues, WriteScope)> {
    let source = draft
        .source
        .as_ref()
        .ok_or_else(|| missing("source", "new calendars require a source account"))?;
    let name = draft
        .name
        .as_ref()
        .ok_or_else(|| missing("name", "new calendars require a name"))?;
    let title = draft
        .title
        .as_ref()
        .ok_or_else(|| missing("title", "new calendars require a title"))?;
    let color = draft
        .color
        .ok_or_else(|| missing("color", "new calendars require a color"))?;
    let access_level = draft
        .access_level
        .ok_or_else(|| missing("accessLevel", "new calendars require an access level"))?;
    let owner_account = draft
        .owner_account
        .as_ref()
        .ok_or_else(|| missing("ownerAccount", "new calendars require an owner account"))?;

    let source_name = source
        .name
        .as_ref()
        .ok_or_else(|| missing("source.name", "the source account requires a name"))?;
    let account_type = if source.is_local_account {
        codes::ACCOUNT_TYPE_LOCAL.to_string()
    } else {
        source
            .kind
            .clone()
            .ok_or_else(|| missing("source.type", "required unless isLocalAccount is true"))?
    };

    let values = CalendarValues {
        account_name: Some(source_name.clone()),
        account_type: Some(account_type.clone()),
        color: Some(color),
        access_level: Some(access_level.to_code()),
        owner_account: Some(owner_account.clone()),
        name: Some(name.clone()),
        display_name: Some(title.clone()),
    };

    let scope = WriteScope::SyncAdapter {
        account_name: source_name.clone(),
        account_type,
    };

    Ok((values, scope))
}

fn missing(field: &'static str, message: &str) -> CalBridgeError {
    CalBridgeError::Malformed(field, message.to_string())
}
