//! Text-level values reconciliation.

use crate::patch::{self, ModificationSet, SkippedModification};
use crate::value::{self, ParseError};
use thiserror::Error;

/// ReconcileError represents a failure to read or write a values document.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to parse values: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to serialize values: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

/// Reconciled holds the values text produced for an upgrade.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// The values to submit, as YAML.
    pub values: String,
    /// Modifications that could not be carried over.
    pub skipped: Vec<SkippedModification>,
}

impl Reconciled {
    /// Returns true if every modification was carried over.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Computes the edits the user made to `old_defaults` to arrive at `user_values`.
///
/// Empty text on either side reads as an empty mapping.
pub fn compute_modifications(
    old_defaults: &str,
    user_values: &str,
) -> Result<ModificationSet, ReconcileError> {
    let old = value::from_yaml(old_defaults)?;
    let user = value::from_yaml(user_values)?;
    Ok(patch::diff(&old, &user))
}

/// Replays `modifications` onto `new_defaults` and returns the resulting YAML.
///
/// Only a `new_defaults` that fails to parse is an error; modifications that
/// no longer fit the new document are reported in [`Reconciled::skipped`].
pub fn apply_modifications(
    new_defaults: &str,
    modifications: &ModificationSet,
) -> Result<Reconciled, ReconcileError> {
    let mut doc = value::from_yaml(new_defaults)?;
    let skipped = patch::apply(&mut doc, modifications);
    let values = value::to_yaml(&doc).map_err(ReconcileError::Serialize)?;
    Ok(Reconciled { values, skipped })
}

/// Carries the user's edits of `old_defaults` over to `new_defaults`.
pub fn reconcile(
    old_defaults: &str,
    user_values: &str,
    new_defaults: &str,
) -> Result<Reconciled, ReconcileError> {
    let modifications = compute_modifications(old_defaults, user_values)?;
    apply_modifications(new_defaults, &modifications)
}
