//! A JSON-backed IAM action catalog.
//!
//! The catalog lists, per service, every action with its access-level
//! classification and the resource types it applies to:
//!
//! ```json
//! {"services": {"s3": [
//!     {"action": "GetObject", "access_level": "Read", "resource_types": ["object"]}
//! ]}}
//! ```
//!
//! Actions with no resource types are service-wide: they can only be granted
//! on `*`. A small catalog of common services is built into the crate; a
//! complete one can be loaded from a file.
//!
//! Services listed under `"complete"` claim to name every action the service
//! has. Only those may be minimized into prefix wildcards, since a pattern
//! over a partial list can match actions the catalog has never seen.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GeneratorError;
use crate::traits::ActionCatalog;
use crate::types::{ActionName, Capability};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

static BUILTIN: Lazy<Result<Arc<StaticCatalog>, GeneratorError>> =
    Lazy::new(|| StaticCatalog::from_json(BUILTIN_CATALOG).map(Arc::new));

/// One action of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub action: String,
    pub access_level: Capability,
    #[serde(default)]
    pub resource_types: Vec<String>,
}

impl CatalogEntry {
    pub fn is_service_wide(&self) -> bool {
        self.resource_types.is_empty()
    }

    fn applies_to(&self, resource_type: &str) -> bool {
        self.resource_types
            .iter()
            .any(|rt| rt.eq_ignore_ascii_case(resource_type))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCatalog {
    services: BTreeMap<String, Vec<CatalogEntry>>,
    #[serde(default)]
    complete: BTreeSet<String>,
}

impl StaticCatalog {
    pub fn from_json(text: &str) -> Result<Self, GeneratorError> {
        let raw: StaticCatalog =
            serde_json::from_str(text).map_err(|e| GeneratorError::InvalidCatalog(e.to_string()))?;

        let mut services = BTreeMap::new();
        for (service, entries) in raw.services {
            if service.is_empty() || service.contains(':') {
                return Err(GeneratorError::InvalidCatalog(format!(
                    "invalid service name '{service}'"
                )));
            }
            if let Some(bad) = entries
                .iter()
                .find(|e| e.action.is_empty() || e.action.contains([':', '*', '?']))
            {
                return Err(GeneratorError::InvalidCatalog(format!(
                    "invalid action name '{}' in service '{service}'",
                    bad.action
                )));
            }
            services.insert(service.to_ascii_lowercase(), entries);
        }

        let mut complete = BTreeSet::new();
        for service in raw.complete {
            let service = service.to_ascii_lowercase();
            if !services.contains_key(&service) {
                return Err(GeneratorError::InvalidCatalog(format!(
                    "service '{service}' is marked complete but is not in the catalog"
                )));
            }
            complete.insert(service);
        }

        debug!(
            event = "Catalog",
            phase = "Loaded",
            services = services.len(),
            complete = complete.len(),
            actions = services.values().map(Vec::len).sum::<usize>()
        );

        Ok(StaticCatalog { services, complete })
    }

    pub fn from_file(path: &Path) -> Result<Self, GeneratorError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GeneratorError::InvalidCatalog(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// The catalog shipped with the crate, parsed once per process.
    pub fn builtin() -> Result<Arc<StaticCatalog>, GeneratorError> {
        BUILTIN.clone()
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Whether `service` lists every action it has.
    pub fn is_complete(&self, service: &str) -> bool {
        self.complete.contains(&service.to_ascii_lowercase())
    }

    pub fn entries(&self, service: &str) -> Result<&[CatalogEntry], GeneratorError> {
        self.services
            .get(&service.to_ascii_lowercase())
            .map(Vec::as_slice)
            .ok_or_else(|| GeneratorError::UnknownService(service.to_string()))
    }

    /// Every action of a service, fully qualified.
    pub fn all_actions(&self, service: &str) -> Result<Vec<ActionName>, GeneratorError> {
        let entries = self.entries(service)?;
        Ok(entries.iter().map(|e| qualify(service, e)).collect())
    }

    fn select(
        &self,
        service: &str,
        keep: impl Fn(&CatalogEntry) -> bool,
    ) -> Result<Vec<ActionName>, GeneratorError> {
        Ok(self
            .entries(service)?
            .iter()
            .filter(|e| keep(e))
            .map(|e| qualify(service, e))
            .collect())
    }
}

fn qualify(service: &str, entry: &CatalogEntry) -> ActionName {
    ActionName::new(format!("{}:{}", service.to_ascii_lowercase(), entry.action))
}

impl ActionCatalog for StaticCatalog {
    fn actions_for_service(
        &self,
        service: &str,
        levels: &[Capability],
    ) -> Result<Vec<ActionName>, GeneratorError> {
        self.select(service, |e| levels.contains(&e.access_level))
    }

    fn full_access_actions(&self, service: &str) -> Result<Vec<ActionName>, GeneratorError> {
        self.entries(service)?;
        Ok(vec![ActionName::new(format!(
            "{}:*",
            service.to_ascii_lowercase()
        ))])
    }

    fn actions_for_resource_type(
        &self,
        service: &str,
        resource_type: &str,
        levels: &[Capability],
        include_service_wide: bool,
    ) -> Result<Vec<ActionName>, GeneratorError> {
        let entries = self.entries(service)?;
        if !entries.iter().any(|e| e.applies_to(resource_type)) {
            warn!(
                event = "Catalog",
                phase = "Lookup",
                service = service,
                resource_type = resource_type,
                "no actions apply to this resource type"
            );
        }

        self.select(service, |e| {
            levels.contains(&e.access_level)
                && (e.applies_to(resource_type) || (include_service_wide && e.is_service_wide()))
        })
    }

    fn expand(&self, pattern: &ActionName) -> Vec<ActionName> {
        if !pattern.is_wildcard() {
            return vec![pattern.clone()];
        }

        let candidates: Vec<&str> = match pattern.service() {
            Some(service) if !service.contains(['*', '?']) => self
                .services
                .keys()
                .map(String::as_str)
                .filter(|s| s.eq_ignore_ascii_case(service))
                .collect(),
            _ => self.services().collect(),
        };

        let expanded: Vec<ActionName> = candidates
            .into_iter()
            .flat_map(|service| {
                self.services[service]
                    .iter()
                    .map(move |e| qualify(service, e))
            })
            .filter(|action| pattern.matches(action))
            .collect();

        if expanded.is_empty() {
            vec![pattern.clone()]
        } else {
            expanded
        }
    }
}
