//! # Values Reconciler
//!
//! Structural diff and patch of Helm chart values for release upgrades.
//!
//! When a release is upgraded to a new chart version, the user's customized
//! values must survive while the new version's defaults are adopted. This
//! library captures the user's edits relative to the deployed chart's
//! defaults as JSON-Patch style modifications and replays them onto the new
//! chart's defaults.
//!
//! ## Modules
//!
//! - [`value`] - In-memory values tree and YAML conversion
//! - [`patch`] - JSON Pointer paths, modifications, diff and best-effort apply
//! - [`reconcile`] - Text-level reconciliation and the upgrade session state

pub mod patch;
pub mod reconcile;
pub mod value;

pub use patch::{Modification, ModificationSet, PathElement, PatchError, Pointer, SkippedModification};
pub use reconcile::{EditState, Reconciled, ReconcileError, Transition, UpgradeSession};
pub use value::{Mapping, Node, ParseError, Scalar};
