//! Best-effort application of modifications to a values tree.

use super::{Modification, ModificationSet, PathElement, Pointer};
use crate::value::Node;
use std::fmt;
use std::iter;
use thiserror::Error;
use tracing::debug;

/// PatchError explains why a single modification could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("'{path}': cannot descend into a scalar")]
    NotAContainer { path: Pointer },

    #[error("'{path}': '{token}' is not a sequence index")]
    InvalidIndex { path: Pointer, token: String },

    #[error("'{path}': index {index} is out of bounds for length {len}")]
    IndexOutOfBounds {
        path: Pointer,
        index: usize,
        len: usize,
    },
}

impl PatchError {
    fn not_a_container(path: &Pointer) -> Self {
        PatchError::NotAContainer { path: path.clone() }
    }

    fn invalid_index(path: &Pointer, token: &str) -> Self {
        PatchError::InvalidIndex {
            path: path.clone(),
            token: token.to_string(),
        }
    }

    fn out_of_bounds(path: &Pointer, index: usize, len: usize) -> Self {
        PatchError::IndexOutOfBounds {
            path: path.clone(),
            index,
            len,
        }
    }
}

/// SkippedModification is a modification that was left out of a patch run.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedModification {
    pub modification: Modification,
    pub error: PatchError,
}

impl fmt::Display for SkippedModification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {}: {}", self.modification, self.error)
    }
}

/// Applies `modifications` to `doc` in order.
///
/// A modification that cannot be applied is skipped without touching `doc`
/// and the rest of the set still runs. The skipped ones are returned for the
/// caller to report.
pub fn apply(doc: &mut Node, modifications: &ModificationSet) -> Vec<SkippedModification> {
    let mut skipped = Vec::new();
    for modification in modifications {
        let result = match modification {
            Modification::Add { path, value } => add(doc, path, value.clone()),
            Modification::Remove { path } => remove(doc, path),
            Modification::Replace { path, value } => replace(doc, path, value.clone()),
        };
        match result {
            Ok(()) => debug!(op = modification.op(), path = %modification.path(), "applied modification"),
            Err(error) => {
                debug!(op = modification.op(), path = %modification.path(), %error, "skipping modification");
                skipped.push(SkippedModification {
                    modification: modification.clone(),
                    error,
                });
            }
        }
    }
    skipped
}

fn add(doc: &mut Node, path: &Pointer, value: Node) -> Result<(), PatchError> {
    let elements = path.elements();
    let Some((last, parents)) = elements.split_last() else {
        *doc = value;
        return Ok(());
    };
    insert_at(doc, parents, last, value, path)
}

fn remove(doc: &mut Node, path: &Pointer) -> Result<(), PatchError> {
    let elements = path.elements();
    let Some((last, parents)) = elements.split_last() else {
        *doc = Node::default();
        return Ok(());
    };
    let Some(parent) = resolve_mut(doc, parents, path)? else {
        return Ok(());
    };
    match parent {
        Node::Mapping(m) => {
            m.delete(&last.as_key());
            Ok(())
        }
        Node::Sequence(items) => match last {
            PathElement::Index(i) => {
                if *i < items.len() {
                    items.remove(*i);
                }
                Ok(())
            }
            PathElement::End => Ok(()),
            PathElement::Key(k) => Err(PatchError::invalid_index(path, k)),
        },
        Node::Scalar(_) => Err(PatchError::not_a_container(path)),
    }
}

fn replace(doc: &mut Node, path: &Pointer, value: Node) -> Result<(), PatchError> {
    let elements = path.elements();
    let Some((last, parents)) = elements.split_last() else {
        *doc = value;
        return Ok(());
    };
    match resolve_mut(doc, parents, path)? {
        Some(parent) => match child_mut(parent, last, path)? {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => insert_child(parent, last, value, path),
        },
        None => add(doc, path, value),
    }
}

/// Walks `elements` down from `node`. Returns `None` at the first missing step.
fn resolve_mut<'a>(
    node: &'a mut Node,
    elements: &[PathElement],
    path: &Pointer,
) -> Result<Option<&'a mut Node>, PatchError> {
    let mut current = node;
    for element in elements {
        match child_mut(current, element, path)? {
            Some(child) => current = child,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn child_mut<'a>(
    node: &'a mut Node,
    element: &PathElement,
    path: &Pointer,
) -> Result<Option<&'a mut Node>, PatchError> {
    match node {
        Node::Mapping(m) => Ok(m.get_mut(&element.as_key())),
        Node::Sequence(items) => match element {
            PathElement::Index(i) => Ok(items.get_mut(*i)),
            PathElement::End => Ok(None),
            PathElement::Key(k) => Err(PatchError::invalid_index(path, k)),
        },
        Node::Scalar(_) => Err(PatchError::not_a_container(path)),
    }
}

fn insert_at(
    node: &mut Node,
    parents: &[PathElement],
    last: &PathElement,
    value: Node,
    path: &Pointer,
) -> Result<(), PatchError> {
    let Some((head, rest)) = parents.split_first() else {
        return insert_child(node, last, value, path);
    };
    match child_mut(node, head, path)? {
        Some(child) => insert_at(child, rest, last, value, path),
        None => {
            let subtree = build_missing(rest, last, value, path)?;
            insert_child(node, head, subtree, path)
        }
    }
}

/// Builds the containers an `add` needs below a missing parent.
///
/// The subtree is complete before anything is inserted, so a failure here
/// leaves the document untouched.
fn build_missing(
    rest: &[PathElement],
    last: &PathElement,
    value: Node,
    path: &Pointer,
) -> Result<Node, PatchError> {
    let mut node = value;
    for element in rest.iter().chain(iter::once(last)).rev() {
        node = match element {
            PathElement::Key(k) => Node::Mapping(iter::once((k.clone(), node)).collect()),
            PathElement::Index(0) | PathElement::End => Node::Sequence(vec![node]),
            PathElement::Index(i) => return Err(PatchError::out_of_bounds(path, *i, 0)),
        };
    }
    Ok(node)
}

fn insert_child(
    node: &mut Node,
    element: &PathElement,
    value: Node,
    path: &Pointer,
) -> Result<(), PatchError> {
    match node {
        Node::Mapping(m) => {
            m.set(element.as_key().into_owned(), value);
            Ok(())
        }
        Node::Sequence(items) => match element {
            PathElement::Index(i) if *i <= items.len() => {
                items.insert(*i, value);
                Ok(())
            }
            PathElement::Index(i) => Err(PatchError::out_of_bounds(path, *i, items.len())),
            PathElement::End => {
                items.push(value);
                Ok(())
            }
            PathElement::Key(k) => Err(PatchError::invalid_index(path, k)),
        },
        Node::Scalar(_) => Err(PatchError::not_a_container(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::from_yaml;
    use pretty_assertions::assert_eq;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    fn pointer(s: &str) -> Pointer {
        s.parse().unwrap()
    }

    fn run(doc: &str, modifications: Vec<Modification>) -> (Node, Vec<SkippedModification>) {
        let mut node = from_yaml(doc).unwrap();
        let skipped = apply(&mut node, &ModificationSet::from(modifications));
        (node, skipped)
    }

    #[test]
    fn test_empty_set_is_identity() {
        let (node, skipped) = run("a: 1\nb: [x, y]\n", vec![]);
        assert!(skipped.is_empty());
        assert_eq!(node, from_yaml("a: 1\nb: [x, y]\n").unwrap());
    }

    #[test]
    fn test_add_creates_missing_parents() {
        let (node, skipped) = run(
            "a: 1\n",
            vec![
                Modification::add(pointer("/ingress/hosts/0/name"), "example.com"),
                Modification::add(pointer("/tolerations/-"), "gpu"),
            ],
        );
        assert!(skipped.is_empty());
        assert_eq!(
            node,
            from_yaml("a: 1\ningress:\n  hosts:\n  - name: example.com\ntolerations: [gpu]\n").unwrap()
        );
    }

    #[test]
    fn test_add_into_sequence_shifts() {
        let (node, skipped) = run(
            "list: [a, c]\n",
            vec![
                Modification::add(pointer("/list/1"), "b"),
                Modification::add(pointer("/list/-"), "d"),
            ],
        );
        assert!(skipped.is_empty());
        assert_eq!(node, from_yaml("list: [a, b, c, d]\n").unwrap());
    }

    #[test]
    fn test_add_past_end_is_skipped() {
        let (node, skipped) = run(
            "list: [a]\n",
            vec![
                Modification::add(pointer("/list/5"), "z"),
                Modification::add(pointer("/other/3/x"), "z"),
                Modification::add(pointer("/ok"), true),
            ],
        );
        assert_eq!(node, from_yaml("list: [a]\nok: true\n").unwrap());
        assert_eq!(
            skipped.iter().map(|s| s.error.clone()).collect::<Vec<_>>(),
            vec![
                PatchError::out_of_bounds(&pointer("/list/5"), 5, 1),
                PatchError::out_of_bounds(&pointer("/other/3/x"), 3, 0),
            ]
        );
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let (node, skipped) = run(
            "a: 1\nlist: [x]\n",
            vec![
                Modification::remove(pointer("/b")),
                Modification::remove(pointer("/deep/missing/key")),
                Modification::remove(pointer("/list/4")),
                Modification::remove(pointer("/a")),
            ],
        );
        assert!(skipped.is_empty());
        assert_eq!(node, from_yaml("list: [x]\n").unwrap());
    }

    #[test]
    fn test_remove_keeps_key_order() {
        let (node, _) = run("c: 1\nb: 2\na: 3\n", vec![Modification::remove(pointer("/b"))]);
        let keys: Vec<&str> = node.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["c", "a"]);
    }

    #[test]
    fn test_replace_missing_behaves_as_add() {
        let (node, skipped) = run(
            "notFoo: bar\n",
            vec![
                Modification::replace(pointer("/foo"), "BAR"),
                Modification::replace(pointer("/nested/key"), 1i64),
            ],
        );
        assert!(skipped.is_empty());
        assert_eq!(node, from_yaml("notFoo: bar\nfoo: BAR\nnested:\n  key: 1\n").unwrap());
    }

    #[test]
    fn test_replace_keeps_position() {
        let (node, _) = run("a: 1\nb: 2\nc: 3\n", vec![Modification::replace(pointer("/b"), 20i64)]);
        assert_eq!(crate::value::to_yaml(&node).unwrap(), "a: 1\nb: 20\nc: 3\n");
    }

    #[test]
    fn test_through_scalar_is_skipped_and_rest_applies() {
        let (node, skipped) = run(
            "image: nginx\nreplicas: 1\n",
            vec![
                Modification::replace(pointer("/image/tag"), "2.0"),
                Modification::remove(pointer("/image/tag")),
                Modification::add(pointer("/image/tag"), "2.0"),
                Modification::replace(pointer("/replicas"), 3i64),
            ],
        );
        assert_eq!(node, from_yaml("image: nginx\nreplicas: 3\n").unwrap());
        assert_eq!(skipped.len(), 3);
        for s in &skipped {
            assert_eq!(
                s.error,
                PatchError::NotAContainer {
                    path: pointer("/image/tag")
                }
            );
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_at(level: Level) -> String {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let (_, skipped) = tracing::subscriber::with_default(subscriber, || {
            run("image: nginx\n", vec![Modification::add(pointer("/image/tag"), "2.0")])
        });
        assert_eq!(skipped.len(), 1);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_skips_are_returned_not_warned() {
        assert_eq!(logged_at(Level::WARN), "");
        assert!(logged_at(Level::DEBUG).contains("skipping modification"));
    }

    #[test]
    fn test_key_into_sequence_is_skipped() {
        let (node, skipped) = run("list: [a]\n", vec![Modification::add(pointer("/list/name"), "x")]);
        assert_eq!(node, from_yaml("list: [a]\n").unwrap());
        assert_eq!(
            skipped[0].error,
            PatchError::invalid_index(&pointer("/list/name"), "name")
        );
        assert_eq!(
            skipped[0].to_string(),
            "skipped add '/list/name': '/list/name': 'name' is not a sequence index"
        );
    }

    #[test]
    fn test_numeric_tokens_address_mapping_keys() {
        let (node, skipped) = run(
            "ports:\n  80: http\n",
            vec![
                Modification::replace(pointer("/ports/80"), "web"),
                Modification::add(pointer("/ports/443"), "https"),
            ],
        );
        assert!(skipped.is_empty());
        assert_eq!(node, from_yaml("ports:\n  '80': web\n  '443': https\n").unwrap());
    }

    #[test]
    fn test_root_operations() {
        let (node, _) = run("a: 1\n", vec![Modification::replace(Pointer::root(), vec![Node::from(1i64)])]);
        assert_eq!(node, Node::from(vec![Node::from(1i64)]));

        let (node, _) = run("a: 1\n", vec![Modification::remove(Pointer::root())]);
        assert_eq!(node, Node::default());
    }
}
