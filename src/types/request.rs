//! Generation requests, as produced by the CLI and YAML manifests.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GeneratorError;

use super::access_level::AccessLevel;
use super::action::ActionName;
use super::statement::{ANY_RESOURCE, IntoList, Statement, statement};

/// Separates a service from a resource type in `service:resourceType` targets.
pub const QUALIFIER_DELIMITER: char = ':';

/// A request for an access level on a service, optionally narrowed to one
/// resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub service: String,
    pub resource_type: Option<String>,
    pub access_level: AccessLevel,
}

impl AccessRequest {
    pub fn new(
        service: impl Into<String>,
        resource_type: Option<String>,
        access_level: AccessLevel,
    ) -> Self {
        AccessRequest {
            service: service.into(),
            resource_type: resource_type.filter(|rt| rt != ANY_RESOURCE),
            access_level,
        }
    }

    /// Parse a `service[:resourceType]` target as given on the command line.
    ///
    /// A resource type of `*` means the whole service.
    pub fn parse(target: &str, access_level: AccessLevel) -> Result<Self, GeneratorError> {
        let mut parts = target.split(QUALIFIER_DELIMITER);
        let service = parts.next().unwrap_or_default().trim();
        let resource_type = parts.next().map(str::trim);

        if parts.next().is_some() {
            return Err(GeneratorError::InvalidManifestEntry(format!(
                "'{target}' has more than one '{QUALIFIER_DELIMITER}', expected service[:resource_type]"
            )));
        }
        if service.is_empty() {
            return Err(GeneratorError::InvalidManifestEntry(format!(
                "'{target}' has an empty service name"
            )));
        }
        if resource_type.is_some_and(str::is_empty) {
            return Err(GeneratorError::InvalidManifestEntry(format!(
                "'{target}' has an empty resource type"
            )));
        }

        Ok(AccessRequest::new(
            service,
            resource_type.map(str::to_string),
            access_level,
        ))
    }
}

impl Display for AccessRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.resource_type {
            Some(rt) => write!(f, "{}:{} ({})", self.service, rt, self.access_level),
            None => write!(f, "{} ({})", self.service, self.access_level),
        }
    }
}

/// Explicit actions granted on explicit resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionGrant {
    pub actions: Vec<ActionName>,
    pub resources: Vec<String>,
    pub condition: Option<Value>,
    pub principal: Option<Value>,
}

impl ActionGrant {
    /// Actions on any resource.
    pub fn new(actions: impl IntoList<ActionName>) -> Self {
        ActionGrant {
            actions: actions.into_list(),
            resources: vec![ANY_RESOURCE.to_string()],
            condition: None,
            principal: None,
        }
    }

    pub fn on(mut self, resources: impl IntoList<String>) -> Self {
        self.resources = resources.into_list();
        self
    }

    pub fn to_statement(&self) -> Statement {
        statement(
            self.actions.clone(),
            self.resources.clone(),
            self.condition.clone(),
            self.principal.clone(),
        )
    }
}

/// Everything one input source (command line or one manifest) asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub access: Vec<AccessRequest>,
    pub grants: Vec<ActionGrant>,
}

impl GenerationRequest {
    pub fn is_empty(&self) -> bool {
        self.access.is_empty() && self.grants.is_empty()
    }
}
