//! Value module - In-memory representation of chart values documents.
//!
//! A values document is a closed tree of scalars, ordered mappings and
//! sequences. This module converts it to and from YAML text, and to and from
//! the JSON values carried by JSON-Patch operations.

mod json;
mod node;
mod yaml;

pub use node::*;
pub use yaml::*;
