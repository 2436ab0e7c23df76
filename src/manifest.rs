//! YAML manifests describing the access a policy should grant.
//!
//! ```yaml
//! policies:
//!   - service: iam
//!     resource_type: policy
//!     access_level: read
//!   - service: [lambda, cloudwatch]
//!   - service: s3
//!     access_level: all
//!   - action: ec2:DescribeRegions
//!   - action:
//!       - s3:GetObject
//!       - s3:PutObject
//!     resource: arn:aws:s3:::my-bucket/*
//! ```
//!
//! `access_level` defaults to `read`. An entry with an `action` key is an
//! explicit grant even when it also names a service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::GeneratorError;
use crate::types::{
    ANY_RESOURCE, AccessLevel, AccessRequest, ActionGrant, ActionName, GenerationRequest,
    OneOrMany, QUALIFIER_DELIMITER,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub policies: Option<Vec<ManifestEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
}

impl ManifestEntry {
    fn describe(&self, index: usize) -> String {
        let content = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        format!("entry #{index}: {content}")
    }

    fn push_into(&self, index: usize, request: &mut GenerationRequest) -> Result<(), GeneratorError> {
        if let Some(actions) = &self.action {
            let actions: Vec<ActionName> =
                actions.clone().into_vec().into_iter().map(ActionName::new).collect();
            let resources = self
                .resource
                .clone()
                .map(OneOrMany::into_vec)
                .unwrap_or_else(|| vec![ANY_RESOURCE.to_string()]);
            request.grants.push(ActionGrant {
                actions,
                resources,
                condition: self.condition.clone(),
                principal: self.principal.clone(),
            });
            return Ok(());
        }

        let Some(services) = &self.service else {
            return Err(GeneratorError::InvalidManifestEntry(format!(
                "{}, must have \"service\" or \"action\" key",
                self.describe(index)
            )));
        };

        let access_level = match &self.access_level {
            Some(tag) => AccessLevel::parse(tag)?,
            None => AccessLevel::default(),
        };
        let resource_types: Vec<Option<String>> = match &self.resource_type {
            Some(types) => types
                .clone()
                .into_vec()
                .into_iter()
                .map(|resource_type| self.check_resource_type(index, resource_type).map(Some))
                .collect::<Result<_, _>>()?,
            None => vec![None],
        };

        for service in services.clone().into_vec() {
            if service.contains(QUALIFIER_DELIMITER) {
                return Err(GeneratorError::InvalidManifestEntry(format!(
                    "{}, service '{service}' must not contain '{QUALIFIER_DELIMITER}', use \
                     the \"resource_type\" key instead",
                    self.describe(index)
                )));
            }
            if service.trim().is_empty() {
                return Err(GeneratorError::InvalidManifestEntry(format!(
                    "{}, service name is empty",
                    self.describe(index)
                )));
            }
            for resource_type in &resource_types {
                request.access.push(AccessRequest::new(
                    service.trim(),
                    resource_type.clone(),
                    access_level,
                ));
            }
        }
        Ok(())
    }

    fn check_resource_type(
        &self,
        index: usize,
        resource_type: String,
    ) -> Result<String, GeneratorError> {
        let trimmed = resource_type.trim();
        if trimmed.is_empty() {
            return Err(GeneratorError::InvalidManifestEntry(format!(
                "{}, resource type is empty",
                self.describe(index)
            )));
        }
        if trimmed.contains(QUALIFIER_DELIMITER) {
            return Err(GeneratorError::InvalidManifestEntry(format!(
                "{}, resource type '{trimmed}' must not contain '{QUALIFIER_DELIMITER}'",
                self.describe(index)
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Build the request this entry describes on its own.
    pub fn to_request(&self, index: usize) -> Result<GenerationRequest, GeneratorError> {
        let mut request = GenerationRequest::default();
        self.push_into(index, &mut request)?;
        Ok(request)
    }
}

impl Manifest {
    pub fn from_yaml(text: &str) -> Result<Self, GeneratorError> {
        if text.trim().is_empty() {
            return Ok(Manifest::default());
        }
        let manifest: Option<Manifest> = serde_yaml::from_str(text)?;
        Ok(manifest.unwrap_or_default())
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        self.policies.as_deref().unwrap_or_default()
    }

    /// Every entry's requests, in manifest order.
    pub fn into_request(self) -> Result<GenerationRequest, GeneratorError> {
        let mut request = GenerationRequest::default();
        for (index, entry) in self.entries().iter().enumerate() {
            entry.push_into(index, &mut request)?;
        }

        debug!(
            event = "Manifest",
            phase = "Parsed",
            entries = self.entries().len(),
            access_requests = request.access.len(),
            grants = request.grants.len()
        );

        Ok(request)
    }
}

/// Parse a YAML manifest straight into a generation request.
pub fn request_from_yaml(text: &str) -> Result<GenerationRequest, GeneratorError> {
    Manifest::from_yaml(text)?.into_request()
}
