//! Upgrade form state: when reconciliation may rewrite the values text.

use super::{apply_modifications, compute_modifications, ReconcileError};
use crate::patch::{ModificationSet, SkippedModification};
use tracing::debug;

/// EditState tracks whether the values text is still under automatic control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditState {
    /// Selecting a chart version rewrites the values text.
    #[default]
    Reconciling,
    /// The user typed into the values text; it is left alone.
    ManuallyOverridden,
}

/// Transition describes what a session event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The modification set was recomputed.
    Computed,
    /// The values text was replaced with reconciled values.
    Reconciled { skipped: Vec<SkippedModification> },
    /// Nothing changed because the user edited the values by hand.
    Suppressed,
}

/// UpgradeSession holds the values text of one release upgrade.
#[derive(Debug, Clone)]
pub struct UpgradeSession {
    values: String,
    modifications: ModificationSet,
    state: EditState,
}

impl UpgradeSession {
    /// Starts a session showing the release's current values.
    pub fn new(current_values: impl Into<String>) -> Self {
        UpgradeSession {
            values: current_values.into(),
            modifications: ModificationSet::new(),
            state: EditState::Reconciling,
        }
    }

    /// The values text currently shown to the user.
    pub fn values(&self) -> &str {
        &self.values
    }

    pub fn modifications(&self) -> &ModificationSet {
        &self.modifications
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_manually_modified(&self) -> bool {
        self.state == EditState::ManuallyOverridden
    }

    /// Records the deployed chart version's defaults.
    ///
    /// The user's edits are recomputed against them. On error the previous
    /// modification set is kept.
    pub fn load_deployed_defaults(
        &mut self,
        deployed_defaults: &str,
    ) -> Result<Transition, ReconcileError> {
        if self.is_manually_modified() {
            return Ok(Transition::Suppressed);
        }
        self.modifications = compute_modifications(deployed_defaults, &self.values)?;
        debug!(count = self.modifications.len(), "recomputed values modifications");
        Ok(Transition::Computed)
    }

    /// Handles selection of a new chart version with the given defaults.
    ///
    /// On error the values text is left as it was.
    pub fn select_version(&mut self, new_defaults: &str) -> Result<Transition, ReconcileError> {
        if self.is_manually_modified() {
            debug!("values were edited by hand, not reconciling");
            return Ok(Transition::Suppressed);
        }
        let reconciled = apply_modifications(new_defaults, &self.modifications)?;
        self.values = reconciled.values;
        Ok(Transition::Reconciled {
            skipped: reconciled.skipped,
        })
    }

    /// Replaces the values text with the user's own input.
    ///
    /// Stale modifications are dropped so they can never be replayed over
    /// the hand-edited text.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.values = text.into();
        self.modifications.clear();
        if self.state != EditState::ManuallyOverridden {
            debug!("values edited by hand, reconciliation suppressed");
            self.state = EditState::ManuallyOverridden;
        }
    }

    /// Starts over from a freshly selected version's defaults.
    ///
    /// The session returns to [`EditState::Reconciling`] with an empty
    /// modification set and shows `new_defaults`.
    pub fn restart(&mut self, new_defaults: &str) -> Result<Transition, ReconcileError> {
        let reconciled = apply_modifications(new_defaults, &ModificationSet::new())?;
        self.values = reconciled.values;
        self.modifications.clear();
        self.state = EditState::Reconciling;
        debug!("upgrade session restarted");
        Ok(Transition::Reconciled {
            skipped: reconciled.skipped,
        })
    }
}
