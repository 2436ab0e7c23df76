//! Merging several policy documents into one.
//!
//! Statements are grouped by their qualifiers (effect, resources, condition
//! and principal). Each group becomes a single statement whose actions are
//! the union of the group's actions. The originating service plays no part
//! in grouping: `lambda:*` and `cloudwatch:*` on the same resources end up in
//! the same statement.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::debug;

use crate::types::{ActionName, PermissionItem, PolicyDocument, Qualifiers, Statement};

#[derive(Debug)]
struct Group {
    qualifiers: Qualifiers,
    actions: Vec<ActionName>,
    seen: HashSet<ActionName>,
}

impl Group {
    fn new(qualifiers: Qualifiers) -> Self {
        Group {
            qualifiers,
            actions: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn add(&mut self, action: ActionName) {
        // `ActionName` hashes without case, so the first spelling wins.
        if self.seen.insert(action.clone()) {
            self.actions.push(action);
        }
    }
}

/// Accumulates statements or permission items into qualifier groups, in the
/// order each set of qualifiers is first seen.
#[derive(Debug, Default)]
pub struct StatementGroups {
    groups: Vec<Group>,
    index: HashMap<Qualifiers, usize>,
}

impl StatementGroups {
    fn group_for(&mut self, qualifiers: Qualifiers) -> &mut Group {
        let position = match self.index.get(&qualifiers) {
            Some(&position) => position,
            None => {
                let position = self.groups.len();
                self.index.insert(qualifiers.clone(), position);
                self.groups.push(Group::new(qualifiers));
                position
            }
        };
        &mut self.groups[position]
    }

    pub fn push_statement(&mut self, statement: &Statement) {
        let group = self.group_for(statement.qualifiers());
        for action in &statement.actions {
            group.add(action.clone());
        }
    }

    pub fn push_item(&mut self, item: PermissionItem) {
        self.group_for(item.qualifiers).add(item.action);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One statement per group; actions are sorted case-insensitively so the
    /// output does not depend on input order.
    pub fn into_policy(self) -> PolicyDocument {
        let statements = self
            .groups
            .into_iter()
            .map(|group| {
                let actions = group.actions.into_iter().sorted().collect();
                Statement::from_qualifiers(group.qualifiers, actions)
            })
            .collect();
        PolicyDocument::new(statements)
    }
}

/// Merge any number of documents into one minimal, equivalent document.
///
/// No documents at all yields a document with an empty statement list.
pub fn collapse<'a>(documents: impl IntoIterator<Item = &'a PolicyDocument>) -> PolicyDocument {
    let mut groups = StatementGroups::default();
    let mut statement_count = 0;
    for document in documents {
        for statement in &document.statements {
            statement_count += 1;
            groups.push_statement(statement);
        }
    }

    debug!(
        event = "Collapse",
        phase = "Grouped",
        statements = statement_count,
        groups = groups.len()
    );

    groups.into_policy()
}
