//! Clean-up passes run on collapsed policies.

use tracing::debug;

use crate::collapse::StatementGroups;
use crate::traits::ActionCatalog;
use crate::types::{ActionName, PolicyDocument, Statement};

fn covered_by_other(action: &ActionName, actions: &[ActionName]) -> bool {
    actions
        .iter()
        .any(|other| other.is_wildcard() && other != action && other.matches(action))
}

/// Drop statements without actions, and actions another wildcard in the same
/// statement already grants (`s3:GetObject` next to `s3:Get*`).
pub fn simplify(policy: &PolicyDocument) -> PolicyDocument {
    let statements: Vec<Statement> = policy
        .statements
        .iter()
        .map(|s| Statement {
            actions: s
                .actions
                .iter()
                .filter(|action| !covered_by_other(action, &s.actions))
                .cloned()
                .collect(),
            ..s.clone()
        })
        .filter(|s| !s.actions.is_empty())
        .collect();

    let dropped = policy.actions().count() - statements.iter().map(|s| s.actions.len()).sum::<usize>();
    if dropped > 0 {
        debug!(event = "Simplify", phase = "Done", dropped_actions = dropped);
    }

    PolicyDocument {
        version: policy.version.clone(),
        statements,
    }
}

/// Replace every wildcard action with the concrete actions the catalog has
/// for it. Patterns the catalog cannot resolve are kept as they are.
pub fn expand_policy(policy: &PolicyDocument, catalog: &dyn ActionCatalog) -> PolicyDocument {
    let mut groups = StatementGroups::default();
    for statement in &policy.statements {
        let expanded = Statement {
            actions: statement
                .actions
                .iter()
                .flat_map(|action| catalog.expand(action))
                .collect(),
            ..statement.clone()
        };
        groups.push_statement(&expanded);
    }
    groups.into_policy()
}
