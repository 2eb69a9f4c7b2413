//! Exception derivation for recurring series.
//!
//! A save or delete that targets one occurrence of a recurring event must
//! not mutate the series record. This module decides, from the per-call
//! options, whether an operation applies directly to the targeted record or
//! spawns a detached exception record, and resolves the write scope the
//! store requires.

use serde::Deserialize;

use calbridge_core::calendar::Calendar;
use calbridge_core::datetime::DateTimeInput;
use calbridge_core::error::CalBridgeResult;
use calbridge_core::store::{EventValues, WriteScope, codes};

/// Per-call options for save and remove operations.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveOptions {
    /// Start instant of the single occurrence being edited or cancelled.
    /// When set, the series record is left untouched.
    pub exception_date: Option<DateTimeInput>,

    /// Mark the owning calendar synced/visible before writing, and write as
    /// the account's sync adapter.
    pub sync: bool,
}

/// How a save or delete applies to the targeted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDisposition {
    /// Mutate (or delete) the targeted record in place.
    Direct,
    /// Insert a detached exception record carrying this original instance
    /// time; the series record is untouched.
    Exception { original_instance_time: i64 },
}

impl SaveDisposition {
    /// Derive the disposition from the per-call options. String exception
    /// instants follow the caller's UTC-normalization choice.
    pub fn derive(options: &SaveOptions, utc: bool) -> CalBridgeResult<Self> {
        match &options.exception_date {
            None => Ok(SaveDisposition::Direct),
            Some(instant) => Ok(SaveDisposition::Exception {
                original_instance_time: instant.to_millis("exceptionDate", utc)?,
            }),
        }
    }
}

/// Resolve the write scope for an operation. The sync flag upgrades the
/// write to a sync-adapter write carrying the owning calendar's account.
pub fn write_scope(sync: bool, calendar: Option<&Calendar>) -> WriteScope {
    if !sync {
        return WriteScope::Interactive;
    }
    match calendar {
        Some(calendar) => WriteScope::SyncAdapter {
            account_name: calendar.source.clone().unwrap_or_default(),
            account_type: calendar.kind.clone().unwrap_or_default(),
        },
        None => {
            tracing::warn!("sync requested but the event has no resolvable calendar");
            WriteScope::Interactive
        }
    }
}

/// Minimal value set cancelling a single occurrence of a series.
pub fn cancellation_values(original_instance_time: i64) -> EventValues {
    EventValues {
        original_instance_time: Some(original_instance_time),
        status: Some(codes::STATUS_CANCELED),
        ..EventValues::default()
    }
}
