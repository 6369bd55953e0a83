//! Modification and ModificationSet types.

use super::Pointer;
use crate::value::Node;
use json_patch::{AddOperation, Patch, PatchOperation, RemoveOperation, ReplaceOperation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Modification is a single structural edit of a values tree.
///
/// On the wire it is a JSON-Patch operation such as
/// `{"op": "add", "path": "/c", "value": "d"}`, read and written as a
/// [`json_patch::PatchOperation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PatchOperation", into = "PatchOperation")]
pub enum Modification {
    Add { path: Pointer, value: Node },
    Remove { path: Pointer },
    Replace { path: Pointer, value: Node },
}

impl Modification {
    pub fn add(path: Pointer, value: impl Into<Node>) -> Self {
        Modification::Add {
            path,
            value: value.into(),
        }
    }

    pub fn remove(path: Pointer) -> Self {
        Modification::Remove { path }
    }

    pub fn replace(path: Pointer, value: impl Into<Node>) -> Self {
        Modification::Replace {
            path,
            value: value.into(),
        }
    }

    /// Returns the JSON-Patch operation name.
    pub fn op(&self) -> &'static str {
        match self {
            Modification::Add { .. } => "add",
            Modification::Remove { .. } => "remove",
            Modification::Replace { .. } => "replace",
        }
    }

    pub fn path(&self) -> &Pointer {
        match self {
            Modification::Add { path, .. }
            | Modification::Remove { path }
            | Modification::Replace { path, .. } => path,
        }
    }

    pub fn value(&self) -> Option<&Node> {
        match self {
            Modification::Add { value, .. } | Modification::Replace { value, .. } => Some(value),
            Modification::Remove { .. } => None,
        }
    }
}

/// UnsupportedOperation is a JSON-Patch operation with no modification form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported JSON-Patch operation '{op}' at '{path}'")]
pub struct UnsupportedOperation {
    pub op: &'static str,
    pub path: String,
}

impl From<Modification> for PatchOperation {
    fn from(modification: Modification) -> Self {
        match modification {
            Modification::Add { path, value } => PatchOperation::Add(AddOperation {
                path: path.into(),
                value: (&value).into(),
            }),
            Modification::Remove { path } => PatchOperation::Remove(RemoveOperation { path: path.into() }),
            Modification::Replace { path, value } => PatchOperation::Replace(ReplaceOperation {
                path: path.into(),
                value: (&value).into(),
            }),
        }
    }
}

impl TryFrom<PatchOperation> for Modification {
    type Error = UnsupportedOperation;

    fn try_from(operation: PatchOperation) -> Result<Self, Self::Error> {
        match operation {
            PatchOperation::Add(op) => Ok(Modification::add(op.path.into(), op.value)),
            PatchOperation::Remove(op) => Ok(Modification::remove(op.path.into())),
            PatchOperation::Replace(op) => Ok(Modification::replace(op.path.into(), op.value)),
            PatchOperation::Move(op) => Err(UnsupportedOperation::new("move", op.path.as_str())),
            PatchOperation::Copy(op) => Err(UnsupportedOperation::new("copy", op.path.as_str())),
            PatchOperation::Test(op) => Err(UnsupportedOperation::new("test", op.path.as_str())),
        }
    }
}

impl UnsupportedOperation {
    fn new(op: &'static str, path: &str) -> Self {
        UnsupportedOperation {
            op,
            path: path.to_string(),
        }
    }
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.op(), self.path())
    }
}

/// ModificationSet is an ordered list of modifications.
///
/// Order matters: a later edit may rely on structure created or removed by
/// an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModificationSet {
    modifications: Vec<Modification>,
}

impl ModificationSet {
    pub fn new() -> Self {
        ModificationSet {
            modifications: Vec::new(),
        }
    }

    pub fn push(&mut self, modification: Modification) {
        self.modifications.push(modification);
    }

    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modifications.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modification> {
        self.modifications.iter()
    }

    /// Drops every modification.
    pub fn clear(&mut self) {
        self.modifications.clear();
    }
}

impl From<Vec<Modification>> for ModificationSet {
    fn from(modifications: Vec<Modification>) -> Self {
        ModificationSet { modifications }
    }
}

impl FromIterator<Modification> for ModificationSet {
    fn from_iter<T: IntoIterator<Item = Modification>>(iter: T) -> Self {
        ModificationSet {
            modifications: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ModificationSet {
    type Item = Modification;
    type IntoIter = std::vec::IntoIter<Modification>;

    fn into_iter(self) -> Self::IntoIter {
        self.modifications.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModificationSet {
    type Item = &'a Modification;
    type IntoIter = std::slice::Iter<'a, Modification>;

    fn into_iter(self) -> Self::IntoIter {
        self.modifications.iter()
    }
}

impl From<&ModificationSet> for Patch {
    fn from(set: &ModificationSet) -> Self {
        Patch(set.iter().cloned().map(PatchOperation::from).collect())
    }
}

impl TryFrom<Patch> for ModificationSet {
    type Error = UnsupportedOperation;

    fn try_from(patch: Patch) -> Result<Self, Self::Error> {
        patch.0.into_iter().map(Modification::try_from).collect()
    }
}

impl fmt::Display for ModificationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, modification) in self.modifications.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", modification)?;
        }
        Ok(())
    }
}
