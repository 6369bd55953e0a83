//! Structural diff of two values trees.

use super::{Modification, ModificationSet, PathElement, Pointer};
use crate::value::Node;
use tracing::debug;

/// Computes the modifications that turn `old` into `new`.
///
/// Keys present in both mappings are compared recursively, keys only in
/// `old` are removed and keys only in `new` are added. Sequences are
/// compared position by position: a shorter sequence loses its tail from
/// the highest index down, a longer one gains its tail in ascending order.
/// Any other difference, including a change of shape, is a `replace` of
/// the whole node.
pub fn diff(old: &Node, new: &Node) -> ModificationSet {
    let mut out = ModificationSet::new();
    diff_into(old, new, &mut Pointer::root(), &mut out);
    debug!(count = out.len(), "computed modifications");
    out
}

fn diff_into(old: &Node, new: &Node, path: &mut Pointer, out: &mut ModificationSet) {
    if old == new {
        return;
    }

    match (old, new) {
        (Node::Mapping(old_map), Node::Mapping(new_map)) => {
            for (key, old_value) in old_map.iter().rev() {
                path.push(PathElement::key(key.as_str()));
                match new_map.get(key) {
                    Some(new_value) => diff_into(old_value, new_value, path, out),
                    None => out.push(Modification::remove(path.clone())),
                }
                path.pop();
            }
            for (key, new_value) in new_map {
                if !old_map.has(key) {
                    out.push(Modification::add(
                        path.with(PathElement::key(key.as_str())),
                        new_value.clone(),
                    ));
                }
            }
        }
        (Node::Sequence(old_items), Node::Sequence(new_items)) => {
            for (i, old_item) in old_items.iter().enumerate().rev() {
                path.push(PathElement::Index(i));
                match new_items.get(i) {
                    Some(new_item) => diff_into(old_item, new_item, path, out),
                    None => out.push(Modification::remove(path.clone())),
                }
                path.pop();
            }
            for (i, new_item) in new_items.iter().enumerate().skip(old_items.len()) {
                out.push(Modification::add(
                    path.with(PathElement::Index(i)),
                    new_item.clone(),
                ));
            }
        }
        _ => out.push(Modification::replace(path.clone(), new.clone())),
    }
}
