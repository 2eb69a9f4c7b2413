//! Platform-neutral calendar event persistence against a host store.
//!
//! This crate is the translation layer between the structured calendar
//! model in `calbridge-core` and a host calendar store's flat records:
//! - `rule` encodes/decodes recurrence rule strings
//! - `mapper` converts store rows to canonical records and drafts to write
//!   value sets
//! - `children` reconciles an event's reminder and attendee child records
//! - `exceptions` derives direct-vs-detached writes for recurring series
//! - `repository` composes everything into the public operations

pub mod children;
pub mod config;
pub mod exceptions;
pub mod mapper;
pub mod repository;
pub mod rule;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the shared model at the crate root for convenience.
pub use calbridge_core::calendar::{AccessLevel, AccountSource, Calendar, CalendarDraft};
pub use calbridge_core::datetime::DateTimeInput;
pub use calbridge_core::error::{CalBridgeError, CalBridgeResult};
pub use calbridge_core::event::{
    Attendee, AttendeeDraft, Availability, Event, EventDraft, Reminder, ReminderDraft,
    ReminderOffset,
};
pub use calbridge_core::recurrence::{Frequency, RecurrenceRule, RecurrenceRuleDraft, Weekday};
pub use calbridge_core::store::{CalendarStore, RecordId, WriteScope};

pub use config::RepositoryConfig;
pub use exceptions::SaveOptions;
pub use repository::{EventRepository, Permissions};
