//! Data model for policy generation.
//!
//! Canonical forms:
//! - Action: `service:Verb`, compared without regard to case
//! - Access level: `list`, `read`, `write`, `tagging`, `permissions` or `all`
//! - Target: `service` or `service:resourceType`
//!
//! Documents serialize with IAM key names (`Version`, `Statement`, `Effect`,
//! `Action`, `Resource`, `Condition`, `Principal`).

mod access_level;
mod action;
mod one_or_many;
mod policy;
mod request;
mod statement;

pub use access_level::{AccessLevel, AccessLevels, Capability, resolve_access_level};
pub use action::ActionName;
pub(crate) use action::glob_regex;
pub use one_or_many::OneOrMany;
pub use policy::{POLICY_VERSION, PolicyDocument, create_policy};
pub use request::{AccessRequest, ActionGrant, GenerationRequest, QUALIFIER_DELIMITER};
pub use statement::{
    ANY_RESOURCE, Effect, IntoList, PermissionItem, Qualifiers, Statement, statement,
};
