use thiserror::Error;

use crate::error::GeneratorError;
use crate::types::{ActionName, Capability, PolicyDocument};

/// Anything that knows which IAM actions a service offers.
pub trait ActionCatalog: Send + Sync {
    /// Every action of `service` classified under one of `levels`.
    fn actions_for_service(
        &self,
        service: &str,
        levels: &[Capability],
    ) -> Result<Vec<ActionName>, GeneratorError>;

    /// Full access to a service, `service:*` by default.
    fn full_access_actions(&self, service: &str) -> Result<Vec<ActionName>, GeneratorError> {
        Ok(vec![ActionName::new(format!("{service}:*"))])
    }

    /// Actions of `service` under `levels` that apply to `resource_type`.
    ///
    /// With `include_service_wide`, actions that take no resource at all
    /// (and so can only be granted on `*`) are included too.
    fn actions_for_resource_type(
        &self,
        service: &str,
        resource_type: &str,
        levels: &[Capability],
        include_service_wide: bool,
    ) -> Result<Vec<ActionName>, GeneratorError>;

    /// The concrete actions an action pattern stands for. Non-wildcard
    /// actions, and patterns the catalog cannot resolve, map to themselves.
    fn expand(&self, pattern: &ActionName) -> Vec<ActionName> {
        vec![pattern.clone()]
    }
}

/// The message prefix a minimizer uses to report an action missing from its catalog.
pub const ACTION_NOT_FOUND_ERR: &str = "Desired action not found in master permission list.";

/// A failure reported by a [`Minimizer`], carrying only its message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MinimizerError(pub String);

impl MinimizerError {
    pub fn action_not_found(action: &ActionName) -> Self {
        MinimizerError(format!("{ACTION_NOT_FOUND_ERR} {action}"))
    }
}

/// Collapses the concrete actions of a policy into wildcard patterns.
///
/// Implementations may reject actions they do not know about, using
/// [`MinimizerError::action_not_found`].
pub trait Minimizer: Send + Sync {
    fn minimize(&self, policy: &PolicyDocument) -> Result<PolicyDocument, MinimizerError>;
}

impl<F> Minimizer for F
where
    F: Fn(&PolicyDocument) -> Result<PolicyDocument, MinimizerError> + Send + Sync,
{
    fn minimize(&self, policy: &PolicyDocument) -> Result<PolicyDocument, MinimizerError> {
        self(policy)
    }
}
