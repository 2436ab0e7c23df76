//! Generate AWS IAM policy documents from access-level shorthand, explicit
//! actions and YAML manifests.
//!
//! Requests are expanded into actions through an [`ActionCatalog`], merged
//! into a minimal equivalent policy by [`collapse`], and rendered within a
//! character budget by [`shorten`], which may minimize the policy into
//! wildcard patterns along the way.

pub use catalog::{CatalogEntry, StaticCatalog};
pub use cli::Cli;
pub use collapse::{StatementGroups, collapse};
pub use config::{AssemblyOptions, DEFAULT_MAX_LENGTH, OutputOptions};
pub use error::GeneratorError;
pub use generator::PolicyGenerator;
pub use manifest::{Manifest, ManifestEntry, request_from_yaml};
pub use minimizer::CatalogMinimizer;
pub use safe_minimizer::{MAX_ATTEMPTS, minimize_with_recovery};
pub use shortener::{SHORTEN_STAGES, ShortenStage, shorten};
pub use simplify::{expand_policy, simplify};
pub use traits::{ACTION_NOT_FOUND_ERR, ActionCatalog, Minimizer, MinimizerError};
pub use types::*;

mod catalog;
mod cli;
mod collapse;
mod config;
mod error;
mod generator;
mod manifest;
mod minimizer;
mod safe_minimizer;
mod shortener;
mod simplify;
mod traits;
pub mod types;

#[cfg(test)]
mod tests;
