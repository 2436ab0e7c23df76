use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::StaticCatalog;
use crate::collapse::collapse;
use crate::config::{AssemblyOptions, OutputOptions};
use crate::error::GeneratorError;
use crate::minimizer::CatalogMinimizer;
use crate::shortener::shorten;
use crate::simplify::{expand_policy, simplify};
use crate::traits::{ActionCatalog, Minimizer};
use crate::types::{
    AccessLevels, AccessRequest, GenerationRequest, PolicyDocument, Statement, create_policy,
};

/// Turns generation requests into rendered IAM policies. Cheap to clone and
/// safe to share between threads.
#[derive(Clone)]
pub struct PolicyGenerator {
    catalog: Arc<dyn ActionCatalog>,
    minimizer: Arc<dyn Minimizer>,
    options: AssemblyOptions,
}

impl PolicyGenerator {
    pub fn new(catalog: Arc<dyn ActionCatalog>, minimizer: Arc<dyn Minimizer>) -> Self {
        PolicyGenerator {
            catalog,
            minimizer,
            options: AssemblyOptions::default(),
        }
    }

    /// A generator backed by one catalog for both lookups and minimization.
    pub fn from_catalog(catalog: Arc<StaticCatalog>) -> Self {
        let minimizer = Arc::new(CatalogMinimizer::new(&catalog));
        PolicyGenerator::new(catalog, minimizer)
    }

    /// A generator over the catalog built into the crate.
    pub fn builtin() -> Result<Self, GeneratorError> {
        Ok(PolicyGenerator::from_catalog(StaticCatalog::builtin()?))
    }

    pub fn from_catalog_file(path: &Path) -> Result<Self, GeneratorError> {
        let catalog = StaticCatalog::from_file(path)?;
        Ok(PolicyGenerator::from_catalog(Arc::new(catalog)))
    }

    pub fn with_options(mut self, options: AssemblyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AssemblyOptions {
        &self.options
    }

    fn policy_for_access(&self, access: &AccessRequest) -> Result<PolicyDocument, GeneratorError> {
        let service = access.service.as_str();
        let levels = access.access_level.resolve();

        let actions = match (access.resource_type.as_deref(), levels) {
            (None, AccessLevels::FullAccess) => self.catalog.full_access_actions(service)?,
            (None, levels) => self
                .catalog
                .actions_for_service(service, levels.capabilities())?,
            (Some(resource_type), levels) => self.catalog.actions_for_resource_type(
                service,
                resource_type,
                levels.capabilities(),
                self.options.include_service_wide_actions,
            )?,
        };

        debug!(
            event = "Assemble",
            phase = "Access",
            request = %access,
            actions = actions.len()
        );

        Ok(create_policy([Statement::allow(actions)]))
    }

    /// One policy for everything `request` asks for, collapsed and simplified.
    pub fn assemble(&self, request: &GenerationRequest) -> Result<PolicyDocument, GeneratorError> {
        let mut policies = Vec::with_capacity(request.access.len() + request.grants.len());
        for access in &request.access {
            policies.push(self.policy_for_access(access)?);
        }
        for grant in &request.grants {
            debug!(
                event = "Assemble",
                phase = "Grant",
                actions = grant.actions.len(),
                resources = grant.resources.len()
            );
            policies.push(create_policy([grant.to_statement()]));
        }

        Ok(simplify(&collapse(&policies)))
    }

    /// Assemble every request and merge the results into one policy.
    pub fn generate(&self, requests: &[GenerationRequest]) -> Result<PolicyDocument, GeneratorError> {
        let assembled = requests
            .iter()
            .map(|request| self.assemble(request))
            .collect::<Result<Vec<_>, _>>()?;
        let policy = simplify(&collapse(&assembled));

        info!(
            event = "Generate",
            phase = "Assembled",
            requests = requests.len(),
            statements = policy.statements.len(),
            actions = policy.actions().count()
        );

        Ok(policy)
    }

    /// Serialize `policy` within the configured length, shortening it if allowed.
    pub fn render(
        &self,
        policy: &PolicyDocument,
        options: &OutputOptions,
    ) -> Result<String, GeneratorError> {
        if options.no_wildcards {
            let expanded = expand_policy(policy, self.catalog.as_ref());
            shorten(&expanded, self.minimizer.as_ref(), options)
        } else {
            shorten(policy, self.minimizer.as_ref(), options)
        }
    }

    pub fn generate_and_render(
        &self,
        requests: &[GenerationRequest],
        options: &OutputOptions,
    ) -> Result<String, GeneratorError> {
        let policy = self.generate(requests)?;
        self.render(&policy, options)
    }
}

#[cfg(test)]
mod tests;
