//! Patch module - Structural edits between values documents.
//!
//! Edits are JSON-Patch style `add`/`remove`/`replace` operations addressed
//! by JSON Pointers. [`diff`] derives them from two trees and [`apply`]
//! replays them, best effort, onto another tree.

mod apply;
mod diff;
mod modification;
mod pointer;



pub use apply::*;
pub use diff::*;
pub use modification::*;
pub use pointer::*;
