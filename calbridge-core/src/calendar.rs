//! Store-neutral calendar types.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::event::Availability;
use crate::store::{RecordId, codes};

/// A calendar as read back from the host store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: RecordId,
    pub title: Option<String>,

    /// Account name of the owning source.
    pub source: Option<String>,

    /// Account type of the owning source.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub is_primary: Option<bool>,

    pub access_level: AccessLevel,

    pub allowed_availabilities: Vec<Availability>,

    /// `#RRGGBB` hex string.
    pub color: String,

    /// Derived from `access_level`; true iff the caller may write events.
    pub allows_modifications: bool,
}

/// The caller's permission tier on a calendar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    None,
    FreeBusy,
    Read,
    Respond,
    Override,
    Contributor,
    Editor,
    Owner,
    Root,
}

const ACCESS_NONE: &str = "none";
const ACCESS_FREEBUSY: &str = "freebusy";
const ACCESS_READ: &str = "read";
const ACCESS_RESPOND: &str = "respond";
const ACCESS_OVERRIDE: &str = "override";
const ACCESS_CONTRIBUTOR: &str = "contributor";
const ACCESS_EDITOR: &str = "editor";
const ACCESS_OWNER: &str = "owner";
const ACCESS_ROOT: &str = "root";

impl AccessLevel {
    /// Store-native integer code.
    pub fn to_code(self) -> i64 {
        match self {
            AccessLevel::None => codes::CAL_ACCESS_NONE,
            AccessLevel::FreeBusy => codes::CAL_ACCESS_FREEBUSY,
            AccessLevel::Read => codes::CAL_ACCESS_READ,
            AccessLevel::Respond => codes::CAL_ACCESS_RESPOND,
            AccessLevel::Override => codes::CAL_ACCESS_OVERRIDE,
            AccessLevel::Contributor => codes::CAL_ACCESS_CONTRIBUTOR,
            AccessLevel::Editor => codes::CAL_ACCESS_EDITOR,
            AccessLevel::Owner => codes::CAL_ACCESS_OWNER,
            AccessLevel::Root => codes::CAL_ACCESS_ROOT,
        }
    }

    /// Decode a store code. Unrecognized codes read as no access.
    pub fn from_code(code: i64) -> Self {
        match code {
            codes::CAL_ACCESS_FREEBUSY => AccessLevel::FreeBusy,
            codes::CAL_ACCESS_READ => AccessLevel::Read,
            codes::CAL_ACCESS_RESPOND => AccessLevel::Respond,
            codes::CAL_ACCESS_OVERRIDE => AccessLevel::Override,
            codes::CAL_ACCESS_CONTRIBUTOR => AccessLevel::Contributor,
            codes::CAL_ACCESS_EDITOR => AccessLevel::Editor,
            codes::CAL_ACCESS_OWNER => AccessLevel::Owner,
            codes::CAL_ACCESS_ROOT => AccessLevel::Root,
            _ => AccessLevel::None,
        }
    }

    /// Whether this tier permits writing, editing or removing events.
    pub fn allows_modifications(self) -> bool {
        matches!(
            self,
            AccessLevel::Contributor | AccessLevel::Editor | AccessLevel::Owner | AccessLevel::Root
        )
    }
}

impl AsRef<str> for AccessLevel {
    fn as_ref(&self) -> &str {
        match self {
            AccessLevel::None => ACCESS_NONE,
            AccessLevel::FreeBusy => ACCESS_FREEBUSY,
            AccessLevel::Read => ACCESS_READ,
            AccessLevel::Respond => ACCESS_RESPOND,
            AccessLevel::Override => ACCESS_OVERRIDE,
            AccessLevel::Contributor => ACCESS_CONTRIBUTOR,
            AccessLevel::Editor => ACCESS_EDITOR,
            AccessLevel::Owner => ACCESS_OWNER,
            AccessLevel::Root => ACCESS_ROOT,
        }
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for AccessLevel {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            ACCESS_NONE => Ok(AccessLevel::None),
            ACCESS_FREEBUSY => Ok(AccessLevel::FreeBusy),
            ACCESS_READ => Ok(AccessLevel::Read),
            ACCESS_RESPOND => Ok(AccessLevel::Respond),
            ACCESS_OVERRIDE => Ok(AccessLevel::Override),
            ACCESS_CONTRIBUTOR => Ok(AccessLevel::Contributor),
            ACCESS_EDITOR => Ok(AccessLevel::Editor),
            ACCESS_OWNER => Ok(AccessLevel::Owner),
            ACCESS_ROOT => Ok(AccessLevel::Root),
            _ => Err(()),
        }
    }
}

/// Parse the store's delimited allowed-availabilities column.
///
/// Entries are integer codes, but some store implementations write the
/// symbolic spellings instead; both are accepted. Entries that are neither
/// are skipped.
pub fn parse_allowed_availabilities(raw: &str) -> Vec<Availability> {
    raw.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            match entry.parse::<i64>() {
                Ok(code) => Availability::try_from_code(code),
                Err(_) => Availability::from_symbolic(entry),
            }
        })
        .collect()
}

/// Description of a calendar to create.
///
/// Every field is required; the account source additionally needs a type
/// unless it is flagged as a local account. Validation happens before any
/// store call.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarDraft {
    pub source: Option<AccountSource>,
    /// Internal calendar name.
    pub name: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// 24-bit RGB color.
    pub color: Option<i64>,
    pub access_level: Option<AccessLevel>,
    pub owner_account: Option<String>,
}

/// The account a calendar belongs to.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountSource {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub is_local_account: bool,
}
