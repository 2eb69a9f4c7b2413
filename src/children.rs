//! Child record reconciliation.
//!
//! An event's reminders and attendees are wholly owned by the event and are
//! replaced as a value on every save: delete every existing child row, then
//! insert every desired one. There is no incremental diff; children omitted
//! from the desired list are removed.

use calbridge_core::error::CalBridgeResult;
use calbridge_core::event::{AttendeeDraft, ReminderDraft, ReminderOffset};
use calbridge_core::store::{AttendeeValues, CalendarStore, ReminderValues, codes};

/// Replace an event's reminders with the desired list.
///
/// Drafts whose offset is not a plain number are skipped rather than
/// failing the save. Returns the number of rows inserted.
pub async fn replace_reminders<S: CalendarStore + ?Sized>(
    store: &S,
    event_id: &str,
    desired: &[ReminderDraft],
) -> CalBridgeResult<usize> {
    for existing in store.reminders_for_event(event_id).await? {
        store.delete_reminder(&existing.id).await?;
    }

    let mut inserted = 0;
    for draft in desired {
        match draft.minutes {
            ReminderOffset::Minutes(minutes) => {
                store
                    .insert_reminder(ReminderValues {
                        event_id: event_id.to_string(),
                        minutes,
                        method: codes::REMINDER_METHOD_ALERT,
                    })
                    .await?;
                inserted += 1;
            }
            ReminderOffset::Unsupported(ref value) => {
                tracing::warn!(event_id, ?value, "skipping reminder with non-numeric offset");
            }
        }
    }

    Ok(inserted)
}

/// Replace an event's attendees with the desired list.
///
/// Drafts without an email are skipped. Returns the number of rows
/// inserted.
pub async fn replace_attendees<S: CalendarStore + ?Sized>(
    store: &S,
    event_id: &str,
    desired: &[AttendeeDraft],
) -> CalBridgeResult<usize> {
    for existing in store.attendees_for_event(event_id).await? {
        store.delete_attendee(&existing.id).await?;
    }

    let mut inserted = 0;
    for draft in desired {
        let Some(email) = &draft.email else {
            tracing::warn!(event_id, "skipping attendee without an email");
            continue;
        };
        store
            .insert_attendee(AttendeeValues {
                event_id: event_id.to_string(),
                email: email.clone(),
                name: draft.name.clone(),
                relationship: codes::RELATIONSHIP_ATTENDEE,
            })
            .await?;
        inserted += 1;
    }

    Ok(inserted)
}
