//! Command-line surface of the `aws-iam-generator` binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::config::{AssemblyOptions, DEFAULT_MAX_LENGTH, OutputOptions};
use crate::error::GeneratorError;
use crate::types::{AccessLevel, AccessRequest, ActionGrant, ActionName, GenerationRequest};

/// Generate AWS IAM policies from access-level shorthand, explicit actions
/// and YAML manifests.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "aws-iam-generator", version)]
pub struct Cli {
    /// YAML manifest to read requests from
    #[arg(short = 'f', long = "file", value_name = "YAML")]
    pub files: Vec<PathBuf>,

    /// Maximum length of the generated policy, in characters
    #[arg(long, env = "AWS_IAM_GENERATOR_MAX_LENGTH", default_value_t = DEFAULT_MAX_LENGTH)]
    pub max_length: usize,

    /// Minimize, then compact, until the policy fits in --max-length
    #[arg(long)]
    pub auto_shorten: bool,

    /// Collapse actions into wildcard patterns
    #[arg(short, long)]
    pub minimize: bool,

    /// Print the policy without whitespace
    #[arg(short, long)]
    pub compact: bool,

    /// Replace wildcard actions with the concrete actions they cover
    #[arg(long)]
    pub no_wildcards: bool,

    /// Grant an explicit action on any resource
    #[arg(short = 'A', long = "action", value_name = "ACTION")]
    pub actions: Vec<String>,

    /// Grant full access to service[:resourceType]
    #[arg(short = 'a', long = "full-access", value_name = "SERVICE")]
    pub full_access: Vec<String>,

    /// Grant read access (list and read) to service[:resourceType]
    #[arg(short, long, value_name = "SERVICE")]
    pub read: Vec<String>,

    /// Grant write access (list, read and write) to service[:resourceType]
    #[arg(short, long, value_name = "SERVICE")]
    pub write: Vec<String>,

    /// Grant list access to service[:resourceType]
    #[arg(short, long, value_name = "SERVICE")]
    pub list: Vec<String>,

    /// Grant tagging access to service[:resourceType]
    #[arg(long, value_name = "SERVICE")]
    pub tagging: Vec<String>,

    /// Grant permissions-management access to service[:resourceType]
    #[arg(long, value_name = "SERVICE")]
    pub permissions: Vec<String>,

    /// With a resource type, also grant actions that apply to no resource
    #[arg(long)]
    pub include_service_wide_actions: bool,

    /// JSON action catalog to use instead of the built-in one
    #[arg(long, env = "AWS_IAM_GENERATOR_CATALOG", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Log more to stderr, repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// The request the command-line flags describe, in a fixed order: list,
    /// read, write, tagging, permissions, full access, then explicit actions.
    pub fn to_request(&self) -> Result<GenerationRequest, GeneratorError> {
        let by_level = [
            (&self.list, AccessLevel::List),
            (&self.read, AccessLevel::Read),
            (&self.write, AccessLevel::Write),
            (&self.tagging, AccessLevel::Tagging),
            (&self.permissions, AccessLevel::Permissions),
            (&self.full_access, AccessLevel::All),
        ];

        let mut request = GenerationRequest::default();
        for (targets, level) in by_level {
            for target in targets {
                request.access.push(AccessRequest::parse(target, level)?);
            }
        }
        if !self.actions.is_empty() {
            let actions: Vec<ActionName> = self.actions.iter().map(ActionName::from).collect();
            request.grants.push(ActionGrant::new(actions));
        }
        Ok(request)
    }

    pub fn output_options(&self) -> OutputOptions {
        OutputOptions {
            max_length: self.max_length,
            auto_shorten: self.auto_shorten,
            minimize: self.minimize,
            compact: self.compact,
            no_wildcards: self.no_wildcards,
        }
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            include_service_wide_actions: self.include_service_wide_actions,
        }
    }

    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
