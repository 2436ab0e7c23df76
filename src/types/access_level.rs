//! Access levels and the capability tags they resolve to.
//!
//! An access level is the user-facing shorthand (`list`, `read`, `write`,
//! `tagging`, `permissions`, `all`). The action catalog is organised by
//! capability tags, which are the IAM access-level classifications of each
//! individual action. `list`, `read` and `write` are cumulative.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::GeneratorError;

/// The IAM classification of a single action in the catalog.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(serialize_all = "PascalCase", ascii_case_insensitive)]
pub enum Capability {
    List,
    Read,
    Write,
    Tagging,
    #[serde(alias = "Permissions management")]
    #[strum(to_string = "Permissions", serialize = "Permissions management")]
    Permissions,
}

impl Capability {
    /// Every capability tag, in catalog order.
    pub const ALL: [Capability; 5] = [
        Capability::List,
        Capability::Read,
        Capability::Write,
        Capability::Tagging,
        Capability::Permissions,
    ];
}

/// The access level requested for a service.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccessLevel {
    List,
    #[default]
    Read,
    Write,
    Tagging,
    Permissions,
    All,
}

/// What an access level resolves to when querying the action catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevels {
    /// An ordered set of capability tags.
    Levels(&'static [Capability]),
    /// Every action of the service, not an enumerable set of tags.
    FullAccess,
}

impl AccessLevels {
    /// The capability tags to request, treating full access as every tag.
    pub fn capabilities(&self) -> &'static [Capability] {
        match *self {
            AccessLevels::Levels(levels) => levels,
            AccessLevels::FullAccess => &Capability::ALL,
        }
    }

    pub fn is_full_access(&self) -> bool {
        matches!(self, AccessLevels::FullAccess)
    }
}

const LIST: &[Capability] = &[Capability::List];
const READ: &[Capability] = &[Capability::List, Capability::Read];
const WRITE: &[Capability] = &[Capability::List, Capability::Read, Capability::Write];
const TAGGING: &[Capability] = &[Capability::Tagging];
const PERMISSIONS: &[Capability] = &[Capability::Permissions];

impl AccessLevel {
    pub fn resolve(self) -> AccessLevels {
        match self {
            AccessLevel::List => AccessLevels::Levels(LIST),
            AccessLevel::Read => AccessLevels::Levels(READ),
            AccessLevel::Write => AccessLevels::Levels(WRITE),
            AccessLevel::Tagging => AccessLevels::Levels(TAGGING),
            AccessLevel::Permissions => AccessLevels::Levels(PERMISSIONS),
            AccessLevel::All => AccessLevels::FullAccess,
        }
    }

    /// Parse a user supplied access level tag.
    pub fn parse(tag: &str) -> Result<Self, GeneratorError> {
        AccessLevel::from_str(tag).map_err(|_| GeneratorError::UnknownAccessLevel(tag.to_string()))
    }
}

/// Resolve an access level tag straight to catalog capability tags.
pub fn resolve_access_level(tag: &str) -> Result<AccessLevels, GeneratorError> {
    Ok(AccessLevel::parse(tag)?.resolve())
}
