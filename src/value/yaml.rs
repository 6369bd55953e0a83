//! YAML text conversion for values documents.

use super::{Mapping, Node, Scalar};
use crate::patch::{PathElement, Pointer};
use serde_yaml::Value as Yaml;
use thiserror::Error;

/// ParseError represents values text that cannot be read as a document tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported {kind} mapping key in '{path}'")]
    UnsupportedKey { path: String, kind: &'static str },
}

impl ParseError {
    /// Creates an unsupported key error.
    pub fn unsupported_key(path: &Pointer, kind: &'static str) -> Self {
        ParseError::UnsupportedKey {
            path: path.to_string(),
            kind,
        }
    }
}

/// Parse a values document from YAML.
///
/// Blank or comment-only text, and a document that is just `null`, read as
/// an empty mapping.
pub fn from_yaml(yaml: &str) -> Result<Node, ParseError> {
    if is_blank(yaml) {
        return Ok(Node::default());
    }
    let raw: Yaml = serde_yaml::from_str(yaml)?;
    match from_yaml_value(raw)? {
        Node::Scalar(Scalar::Null) => Ok(Node::default()),
        node => Ok(node),
    }
}

/// Serialize a values document to YAML, keeping mapping key order.
pub fn to_yaml(node: &Node) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(node)
}

pub(crate) fn from_yaml_value(raw: Yaml) -> Result<Node, ParseError> {
    convert(raw, &mut Pointer::root())
}

fn is_blank(yaml: &str) -> bool {
    yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

fn convert(raw: Yaml, path: &mut Pointer) -> Result<Node, ParseError> {
    let node = match raw {
        Yaml::Null => Node::Scalar(Scalar::Null),
        Yaml::Bool(b) => Node::Scalar(Scalar::Bool(b)),
        Yaml::Number(n) => Node::Scalar(Scalar::Number(n)),
        Yaml::String(s) => Node::Scalar(Scalar::String(s)),
        Yaml::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                path.push(PathElement::Index(i));
                out.push(convert(item, path)?);
                path.pop();
            }
            Node::Sequence(out)
        }
        Yaml::Mapping(entries) => {
            let mut mapping = Mapping::with_capacity(entries.len());
            for (key, item) in entries {
                let key = mapping_key(key, path)?;
                path.push(PathElement::key(key.as_str()));
                let node = convert(item, path)?;
                path.pop();
                mapping.set(key, node);
            }
            Node::Mapping(mapping)
        }
        // Tags carry no meaning for chart values; keep the tagged value.
        Yaml::Tagged(tagged) => convert(tagged.value, path)?,
    };
    Ok(node)
}

fn mapping_key(key: Yaml, path: &Pointer) -> Result<String, ParseError> {
    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Err(ParseError::unsupported_key(path, "null")),
        Yaml::Sequence(_) => Err(ParseError::unsupported_key(path, "sequence")),
        Yaml::Mapping(_) => Err(ParseError::unsupported_key(path, "mapping")),
        Yaml::Tagged(_) => Err(ParseError::unsupported_key(path, "tagged")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_documents_are_empty_mappings() {
        for text in ["", "   \n", "# only a comment\n\n", "null\n", "~"] {
            let node = from_yaml(text).unwrap();
            assert_eq!(node, Node::default(), "input {:?}", text);
        }
    }

    #[test]
    fn test_parse_nested_document() {
        let node = from_yaml("image:\n  tag: 1.2.3\n  pullPolicy: Always\nreplicas: 3\nports:\n- 80\n- 443\n").unwrap();
        let root = node.as_mapping().unwrap();
        let keys: Vec<&str> = root.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["image", "replicas", "ports"]);

        let image = root.get("image").unwrap().as_mapping().unwrap();
        assert_eq!(image.get("tag"), Some(&Node::from("1.2.3")));
        assert_eq!(root.get("replicas"), Some(&Node::from(3i64)));
        assert_eq!(
            root.get("ports"),
            Some(&Node::from(vec![Node::from(80i64), Node::from(443i64)]))
        );
    }

    #[test]
    fn test_scalar_keys_are_stringified() {
        let node = from_yaml("1: one\ntrue: two\n").unwrap();
        let root = node.as_mapping().unwrap();
        assert_eq!(root.get("1"), Some(&Node::from("one")));
        assert_eq!(root.get("true"), Some(&Node::from("two")));
    }

    #[test]
    fn test_null_key_is_rejected() {
        let err = from_yaml("outer:\n  ~: value\n").unwrap_err();
        match err {
            ParseError::UnsupportedKey { path, kind } => {
                assert_eq!(path, "/outer");
                assert_eq!(kind, "null");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_tags_are_dropped() {
        let node = from_yaml("secret: !vault abc\n").unwrap();
        assert_eq!(node.as_mapping().unwrap().get("secret"), Some(&Node::from("abc")));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(from_yaml("foo: [bar"), Err(ParseError::Yaml(_))));
    }

    #[test]
    fn test_to_yaml_keeps_key_order() {
        let node = from_yaml("notFoo: bar\nmy: var\n").unwrap();
        assert_eq!(to_yaml(&node).unwrap(), "notFoo: bar\nmy: var\n");
    }
}
