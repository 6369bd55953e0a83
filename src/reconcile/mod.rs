//! Reconcile module - Carries a user's values customizations across chart versions.
//!
//! [`compute_modifications`] captures what the user changed relative to the
//! deployed chart's defaults, [`apply_modifications`] replays those changes
//! onto a new version's defaults, and [`UpgradeSession`] decides when that
//! replay is allowed to touch the text the user sees.

mod reconciler;
mod session;


pub use reconciler::*;
pub use session::*;
