//! Minimization that survives actions the minimizer does not know.
//!
//! A [`Minimizer`] fails outright on the first action missing from its
//! catalog. [`minimize_with_recovery`] sets the permission items carrying
//! that action aside, retries with what is left, and appends the set-aside
//! items unchanged to the minimized result.

use tracing::{debug, warn};

use crate::collapse::StatementGroups;
use crate::error::GeneratorError;
use crate::traits::{ACTION_NOT_FOUND_ERR, Minimizer};
use crate::types::{ActionName, PermissionItem, PolicyDocument};

/// Calls to the minimizer before giving up.
pub const MAX_ATTEMPTS: usize = 100;

/// What one call to the minimizer came back with.
#[derive(Debug)]
enum Attempt {
    Minimized(PolicyDocument),
    Unrecognized(ActionName),
    Fatal(String),
}

fn attempt(minimizer: &dyn Minimizer, policy: &PolicyDocument) -> Attempt {
    match minimizer.minimize(policy) {
        Ok(minimized) => Attempt::Minimized(minimized),
        Err(err) => match err.0.strip_prefix(ACTION_NOT_FOUND_ERR).map(str::trim) {
            Some(action) if !action.is_empty() => Attempt::Unrecognized(ActionName::new(action)),
            _ => Attempt::Fatal(err.0),
        },
    }
}

/// Move every item granting `action` from `working` to `set_aside`.
/// Returns how many were moved.
fn set_aside_action(
    working: &mut Vec<PermissionItem>,
    set_aside: &mut Vec<PermissionItem>,
    action: &ActionName,
) -> usize {
    let mut moved = 0;
    while let Some(position) = working.iter().position(|item| &item.action == action) {
        set_aside.push(working.remove(position));
        moved += 1;
    }
    moved
}

/// Lowercase `policy`, minimize it, and keep whatever the minimizer rejects.
///
/// Fails with [`GeneratorError::MinimizerInternal`] when the minimizer
/// reports anything other than an unknown action, reports an action the
/// policy does not contain, or is still failing after [`MAX_ATTEMPTS`] calls.
pub fn minimize_with_recovery(
    policy: &PolicyDocument,
    minimizer: &dyn Minimizer,
) -> Result<PolicyDocument, GeneratorError> {
    let mut working = policy.lowercased().permission_items();
    let mut set_aside: Vec<PermissionItem> = Vec::new();

    for attempt_number in 1..=MAX_ATTEMPTS {
        let current = PolicyDocument::from_permission_items(working.iter().cloned());

        match attempt(minimizer, &current) {
            Attempt::Minimized(minimized) => {
                debug!(
                    event = "SafeMinimize",
                    phase = "Done",
                    attempts = attempt_number,
                    set_aside = set_aside.len()
                );

                let mut groups = StatementGroups::default();
                for statement in &minimized.statements {
                    groups.push_statement(statement);
                }
                for item in set_aside {
                    groups.push_item(item);
                }
                return Ok(groups.into_policy());
            }
            Attempt::Unrecognized(action) => {
                let moved = set_aside_action(&mut working, &mut set_aside, &action);
                if moved == 0 {
                    return Err(GeneratorError::MinimizerInternal(format!(
                        "minimizer rejected '{action}', which the policy does not contain"
                    )));
                }
                warn!(
                    event = "SafeMinimize",
                    phase = "SetAside",
                    attempt = attempt_number,
                    action = %action,
                    items = moved
                );
            }
            Attempt::Fatal(message) => {
                return Err(GeneratorError::MinimizerInternal(message));
            }
        }
    }

    Err(GeneratorError::MinimizerInternal(format!(
        "still failing after {MAX_ATTEMPTS} attempts, either the policy has too many unknown \
         actions or the minimizer reports errors in an unexpected format"
    )))
}
