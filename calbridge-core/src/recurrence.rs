//! Structured recurrence rules.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::{self, DateTimeInput};

/// Duration written alongside a structured rule when the caller supplies
/// none.
pub const DEFAULT_DURATION: &str = "PT1H";

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

const FREQ_DAILY: &str = "daily";
const FREQ_WEEKLY: &str = "weekly";
const FREQ_MONTHLY: &str = "monthly";
const FREQ_YEARLY: &str = "yearly";

impl Frequency {
    /// Uppercase spelling used by the store's rule grammar.
    pub fn rule_token(self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl AsRef<str> for Frequency {
    fn as_ref(&self) -> &str {
        match self {
            Frequency::Daily => FREQ_DAILY,
            Frequency::Weekly => FREQ_WEEKLY,
            Frequency::Monthly => FREQ_MONTHLY,
            Frequency::Yearly => FREQ_YEARLY,
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Frequency {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            FREQ_DAILY => Ok(Frequency::Daily),
            FREQ_WEEKLY => Ok(Frequency::Weekly),
            FREQ_MONTHLY => Ok(Frequency::Monthly),
            FREQ_YEARLY => Ok(Frequency::Yearly),
            _ => Err(()),
        }
    }
}

/// Weekday tokens as spelled in the rule grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Weekday {
    Mo,
    Tu,
    We,
    Th,
    Fr,
    Sa,
    Su,
}

impl AsRef<str> for Weekday {
    fn as_ref(&self) -> &str {
        match self {
            Weekday::Mo => "MO",
            Weekday::Tu => "TU",
            Weekday::We => "WE",
            Weekday::Th => "TH",
            Weekday::Fr => "FR",
            Weekday::Sa => "SA",
            Weekday::Su => "SU",
        }
    }
}

impl Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Weekday {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "MO" => Ok(Weekday::Mo),
            "TU" => Ok(Weekday::Tu),
            "WE" => Ok(Weekday::We),
            "TH" => Ok(Weekday::Th),
            "FR" => Ok(Weekday::Fr),
            "SA" => Ok(Weekday::Sa),
            "SU" => Ok(Weekday::Su),
            _ => Err(()),
        }
    }
}

/// A structured recurrence rule.
///
/// `end_date` and `occurrence_count` are mutually exclusive terminations;
/// both absent means the series repeats forever. `week_position_in_month`
/// is meaningful only for monthly rules and requires `days_of_week`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,

    pub interval: Option<u32>,

    #[serde(with = "datetime::serde_utc_option", default)]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(rename = "occurrence")]
    pub occurrence_count: Option<u32>,

    #[serde(default)]
    pub days_of_week: Vec<Weekday>,

    pub week_start: Option<Weekday>,

    pub week_position_in_month: Option<i32>,

    pub duration: Option<String>,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: None,
            end_date: None,
            occurrence_count: None,
            days_of_week: Vec::new(),
            week_start: None,
            week_position_in_month: None,
            duration: None,
        }
    }
}

/// Write-side recurrence description as supplied by callers. Loosely typed;
/// the rule codec turns it into a [`RecurrenceRule`] or rejects it.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecurrenceRuleDraft {
    pub frequency: Option<String>,
    pub interval: Option<u32>,
    pub end_date: Option<DateTimeInput>,
    pub occurrence: Option<u32>,
    pub days_of_week: Option<Vec<String>>,
    pub week_start: Option<String>,
    pub week_position_in_month: Option<i32>,
    pub duration: Option<String>,
}
