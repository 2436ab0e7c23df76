//! IAM policy documents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::collapse::StatementGroups;
use crate::error::GeneratorError;

use super::action::ActionName;
use super::one_or_many::one_or_many;
use super::statement::{PermissionItem, Statement};

/// The only policy language version this crate produces.
pub const POLICY_VERSION: &str = "2012-10-17";

fn default_version() -> String {
    POLICY_VERSION.to_string()
}

/// An IAM policy document: a version and an ordered list of statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version", default = "default_version")]
    pub version: String,
    #[serde(rename = "Statement", deserialize_with = "one_or_many", default)]
    pub statements: Vec<Statement>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        PolicyDocument {
            version: default_version(),
            statements: Vec::new(),
        }
    }
}

/// Wrap statements into a document, keeping their order.
pub fn create_policy(statements: impl IntoIterator<Item = Statement>) -> PolicyDocument {
    PolicyDocument {
        version: default_version(),
        statements: statements.into_iter().collect(),
    }
}

impl PolicyDocument {
    pub fn new(statements: Vec<Statement>) -> Self {
        create_policy(statements)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionName> {
        self.statements.iter().flat_map(|s| s.actions.iter())
    }

    /// Every (action, qualifiers) pair in statement order.
    pub fn permission_items(&self) -> Vec<PermissionItem> {
        self.statements
            .iter()
            .flat_map(Statement::permission_items)
            .collect()
    }

    /// Rebuild a document from permission items, one statement per distinct
    /// set of qualifiers in first-seen order.
    pub fn from_permission_items(items: impl IntoIterator<Item = PermissionItem>) -> Self {
        let mut groups = StatementGroups::default();
        for item in items {
            groups.push_item(item);
        }
        groups.into_policy()
    }

    /// A copy with every action name lowercased.
    pub fn lowercased(&self) -> Self {
        let statements = self
            .statements
            .iter()
            .map(|s| Statement {
                actions: s.actions.iter().map(ActionName::to_lowercase).collect(),
                ..s.clone()
            })
            .collect();
        PolicyDocument {
            version: self.version.clone(),
            statements,
        }
    }

    /// Whether both documents grant exactly the same permission items,
    /// regardless of how they are split into statements or ordered.
    pub fn is_equivalent(&self, other: &PolicyDocument) -> bool {
        let ours: HashSet<PermissionItem> = self.permission_items().into_iter().collect();
        let theirs: HashSet<PermissionItem> = other.permission_items().into_iter().collect();
        ours == theirs
    }

    /// Serialize as pretty JSON (two-space indent) or compact JSON.
    pub fn to_json(&self, compact: bool) -> Result<String, GeneratorError> {
        let rendered = if compact {
            serde_json::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        Ok(rendered)
    }

    pub fn from_json(text: &str) -> Result<Self, GeneratorError> {
        Ok(serde_json::from_str(text)?)
    }
}
