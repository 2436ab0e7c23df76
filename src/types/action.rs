//! IAM action names (`service:Verb`).

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// An IAM action such as `s3:GetObject` or a wildcard pattern such as `s3:Get*`.
///
/// Equality, hashing and ordering ignore ASCII case, matching how IAM itself
/// treats action names. The original spelling is kept for display and
/// serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionName(String);

impl ActionName {
    pub fn new(name: impl Into<String>) -> Self {
        ActionName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The service prefix, e.g. `s3` for `s3:GetObject`.
    pub fn service(&self) -> Option<&str> {
        self.0.split_once(':').map(|(service, _)| service)
    }

    /// The part after the service prefix, e.g. `GetObject` for `s3:GetObject`.
    pub fn verb(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, verb)| verb)
    }

    pub fn to_lowercase(&self) -> ActionName {
        ActionName(self.0.to_lowercase())
    }

    /// The normalized form used for case-insensitive comparisons.
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.contains(['*', '?'])
    }

    /// Whether this action, read as an IAM glob, matches `other`.
    ///
    /// `*` matches any run of characters and `?` exactly one. Matching
    /// ignores case.
    pub fn matches(&self, other: &ActionName) -> bool {
        if !self.is_wildcard() {
            return self == other;
        }
        glob_regex(&self.0).is_some_and(|re| re.is_match(&other.0))
    }
}

/// Compile an IAM glob into an anchored, case-insensitive regex.
pub(crate) fn glob_regex(pattern: &str) -> Option<Regex> {
    let escaped = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    RegexBuilder::new(&format!("^{escaped}$"))
        .case_insensitive(true)
        .build()
        .ok()
}

impl PartialEq for ActionName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for ActionName {}

impl Hash for ActionName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl PartialOrd for ActionName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ActionName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Display for ActionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActionName {
    fn from(value: &str) -> Self {
        ActionName::new(value)
    }
}

impl From<String> for ActionName {
    fn from(value: String) -> Self {
        ActionName(value)
    }
}

impl From<&String> for ActionName {
    fn from(value: &String) -> Self {
        ActionName(value.clone())
    }
}
