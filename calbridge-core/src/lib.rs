//! Shared types for the calbridge translation layer.
//!
//! This crate provides the pieces shared by the translation layer and by
//! host-store backends:
//! - the canonical calendar data model (`Event`, `Calendar` and friends)
//! - the store interface: named-field rows, write value sets, schema codes
//!   and the `CalendarStore` trait a backend implements
//! - date input/format helpers and the workspace error type

pub mod calendar;
pub mod datetime;
pub mod error;
pub mod event;
pub mod recurrence;
pub mod store;

pub use error::{CalBridgeError, CalBridgeResult};
