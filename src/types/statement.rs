//! Policy statements, their qualifiers and permission items.

use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

use super::action::ActionName;
use super::one_or_many::one_or_many;

/// The resource every statement applies to unless told otherwise.
pub const ANY_RESOURCE: &str = "*";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// Anything that can be turned into a list: a single value, a `Vec`, a slice or an array.
pub trait IntoList<T> {
    fn into_list(self) -> Vec<T>;
}

impl<'a, T: From<&'a str>> IntoList<T> for &'a str {
    fn into_list(self) -> Vec<T> {
        vec![T::from(self)]
    }
}

impl<T: From<String>> IntoList<T> for String {
    fn into_list(self) -> Vec<T> {
        vec![T::from(self)]
    }
}

impl IntoList<ActionName> for ActionName {
    fn into_list(self) -> Vec<ActionName> {
        vec![self]
    }
}

impl<T, U: Into<T>> IntoList<T> for Vec<U> {
    fn into_list(self) -> Vec<T> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T, U: Into<T> + Clone> IntoList<T> for &[U] {
    fn into_list(self) -> Vec<T> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<T, U: Into<T>, const N: usize> IntoList<T> for [U; N] {
    fn into_list(self) -> Vec<T> {
        self.into_iter().map(Into::into).collect()
    }
}

fn default_resources() -> Vec<String> {
    vec![ANY_RESOURCE.to_string()]
}

/// A single IAM policy statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Effect", default)]
    pub effect: Effect,
    #[serde(rename = "Action", deserialize_with = "one_or_many", default)]
    pub actions: Vec<ActionName>,
    #[serde(
        rename = "Resource",
        deserialize_with = "one_or_many",
        default = "default_resources",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub resources: Vec<String>,
    #[serde(rename = "Condition", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,
    #[serde(rename = "Principal", default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
}

impl Statement {
    /// An `Allow` statement over all resources.
    pub fn allow(actions: impl IntoList<ActionName>) -> Self {
        Statement {
            effect: Effect::Allow,
            actions: actions.into_list(),
            resources: default_resources(),
            condition: None,
            principal: None,
        }
    }

    pub fn with_resources(mut self, resources: impl IntoList<String>) -> Self {
        self.resources = resources.into_list();
        self
    }

    pub fn with_condition(mut self, condition: Value) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_principal(mut self, principal: Value) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Everything about this statement except its actions.
    pub fn qualifiers(&self) -> Qualifiers {
        Qualifiers {
            effect: self.effect,
            resources: self.resources.iter().cloned().collect(),
            condition: self.condition.clone(),
            principal: self.principal.clone(),
        }
    }

    pub fn from_qualifiers(qualifiers: Qualifiers, actions: Vec<ActionName>) -> Self {
        Statement {
            effect: qualifiers.effect,
            actions,
            resources: qualifiers.resources.into_iter().collect(),
            condition: qualifiers.condition,
            principal: qualifiers.principal,
        }
    }

    /// Split into one permission item per action.
    pub fn permission_items(&self) -> impl Iterator<Item = PermissionItem> + '_ {
        let qualifiers = self.qualifiers();
        self.actions.iter().map(move |action| PermissionItem {
            action: action.clone(),
            qualifiers: qualifiers.clone(),
        })
    }
}

/// Build an `Allow` statement from one or more actions and one or more resources.
pub fn statement(
    actions: impl IntoList<ActionName>,
    resources: impl IntoList<String>,
    condition: Option<Value>,
    principal: Option<Value>,
) -> Statement {
    Statement {
        condition,
        principal,
        ..Statement::allow(actions).with_resources(resources)
    }
}

/// The merge key of a statement: two statements with equal qualifiers can
/// be combined by unioning their actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifiers {
    pub effect: Effect,
    pub resources: BTreeSet<String>,
    pub condition: Option<Value>,
    pub principal: Option<Value>,
}

impl Hash for Qualifiers {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.effect.hash(state);
        self.resources.hash(state);
        // Value maps are ordered, so the compact rendering is canonical.
        self.condition.as_ref().map(Value::to_string).hash(state);
        self.principal.as_ref().map(Value::to_string).hash(state);
    }
}

/// One action together with the qualifiers of the statement it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionItem {
    pub action: ActionName,
    pub qualifiers: Qualifiers,
}
