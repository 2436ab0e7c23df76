//! Wildcard minimization against an action catalog.
//!
//! Every action of a service the catalog lists completely is replaced by the
//! shortest `service:prefix*` pattern that grants nothing the statement did
//! not already ask for. Actions of other services, and wildcards that are not
//! scoped to a complete service, are kept verbatim. The catalog is indexed in
//! lowercase and lookups are case-sensitive, so callers are expected to
//! lowercase their policy first.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::catalog::StaticCatalog;
use crate::error::GeneratorError;
use crate::traits::{Minimizer, MinimizerError};
use crate::types::{ActionName, PolicyDocument, Statement, glob_regex};

#[derive(Debug, Clone)]
pub struct CatalogMinimizer {
    /// Lowercased verbs per lowercased service, for complete services only.
    verbs: HashMap<String, Vec<String>>,
    known: HashSet<String>,
}

/// What a single action of a statement stands for.
enum Desired {
    /// Concrete actions of a complete service.
    Expanded(Vec<String>),
    /// Kept as written.
    Verbatim,
}

impl CatalogMinimizer {
    pub fn new(catalog: &StaticCatalog) -> Self {
        let mut verbs: HashMap<String, Vec<String>> = HashMap::new();
        let mut known = HashSet::new();

        for service in catalog.services() {
            let Ok(entries) = catalog.entries(service) else {
                continue;
            };
            let complete = catalog.is_complete(service);
            let service = service.to_ascii_lowercase();
            for entry in entries {
                let verb = entry.action.to_ascii_lowercase();
                known.insert(format!("{service}:{verb}"));
                if complete {
                    verbs.entry(service.clone()).or_default().push(verb);
                }
            }
        }

        CatalogMinimizer { verbs, known }
    }

    pub fn builtin() -> Result<Arc<Self>, GeneratorError> {
        let catalog = StaticCatalog::builtin()?;
        Ok(Arc::new(Self::new(&catalog)))
    }

    fn desired(&self, action: &ActionName) -> Result<Desired, MinimizerError> {
        let complete_verbs = action.service().and_then(|service| self.verbs.get(service));

        if !action.is_wildcard() {
            if !self.known.contains(action.as_str()) {
                return Err(MinimizerError::action_not_found(action));
            }
            return Ok(match complete_verbs {
                Some(_) => Desired::Expanded(vec![action.as_str().to_string()]),
                None => Desired::Verbatim,
            });
        }

        let (Some(service), Some(verbs)) = (action.service(), complete_verbs) else {
            return Ok(Desired::Verbatim);
        };
        let matched: Vec<String> = match glob_regex(action.as_str()) {
            Some(re) => verbs
                .iter()
                .map(|verb| format!("{service}:{verb}"))
                .filter(|qualified| re.is_match(qualified))
                .collect(),
            None => Vec::new(),
        };

        if matched.is_empty() {
            Err(MinimizerError::action_not_found(action))
        } else {
            Ok(Desired::Expanded(matched))
        }
    }

    /// The shortest pattern for `service:verb` that stays within `desired`.
    fn shortest_pattern(&self, service: &str, verb: &str, desired: &HashSet<String>) -> String {
        let catalog_verbs = self.verbs.get(service).map(Vec::as_slice).unwrap_or_default();

        for end in (0..verb.len()).filter(|&end| verb.is_char_boundary(end)) {
            let prefix = &verb[..end];
            let covered = catalog_verbs
                .iter()
                .filter(|v| v.starts_with(prefix))
                .all(|v| desired.contains(&format!("{service}:{v}")));
            if covered {
                return format!("{service}:{prefix}*");
            }
        }

        format!("{service}:{verb}")
    }

    fn minimize_statement(&self, statement: &Statement) -> Result<Statement, MinimizerError> {
        let mut desired = HashSet::new();
        let mut verbatim = BTreeSet::new();
        for action in &statement.actions {
            match self.desired(action)? {
                Desired::Expanded(actions) => desired.extend(actions),
                Desired::Verbatim => {
                    verbatim.insert(action.as_str().to_string());
                }
            }
        }

        // Kept wildcards may already grant some of what was minimized.
        let covering: Vec<Regex> = verbatim
            .iter()
            .filter(|action| action.contains(['*', '?']))
            .filter_map(|action| glob_regex(action))
            .collect();

        let mut patterns: BTreeSet<String> = desired
            .iter()
            .filter_map(|action| action.split_once(':'))
            .map(|(service, verb)| self.shortest_pattern(service, verb, &desired))
            .filter(|pattern| !covering.iter().any(|re| re.is_match(pattern)))
            .collect();
        patterns.extend(verbatim);

        let actions: Vec<ActionName> = patterns.into_iter().map(ActionName::new).collect();
        if rendered_len(&actions) > rendered_len(&statement.actions) {
            return Ok(statement.clone());
        }

        Ok(Statement {
            actions,
            ..statement.clone()
        })
    }
}

/// Characters the action list takes up in compact JSON.
fn rendered_len(actions: &[ActionName]) -> usize {
    actions.iter().map(|a| a.as_str().chars().count() + 3).sum()
}

impl Minimizer for CatalogMinimizer {
    fn minimize(&self, policy: &PolicyDocument) -> Result<PolicyDocument, MinimizerError> {
        let statements = policy
            .statements
            .iter()
            .map(|s| self.minimize_statement(s))
            .collect::<Result<Vec<_>, _>>()?;

        let minimized = PolicyDocument {
            version: policy.version.clone(),
            statements,
        };

        debug!(
            event = "Minimize",
            phase = "Done",
            actions_in = policy.actions().count(),
            actions_out = minimized.actions().count()
        );

        Ok(minimized)
    }
}
