//! Path element and JSON Pointer types.

use jsonptr::index::Index;
use jsonptr::{PointerBuf, Token};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// PathElement represents one level of navigation into a values tree.
///
/// Elements are always read from a JSON Pointer token, so a token has exactly
/// one element form: `"80"` is `Index(80)` whether it names a mapping key or
/// a sequence position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
    /// The `-` token: one past the last element of a sequence.
    End,
}

impl PathElement {
    /// Creates the element for the mapping key `name`.
    pub fn key(name: impl Into<String>) -> Self {
        PathElement::from_token(&Token::new(name.into()))
    }

    /// Creates a new index path element.
    pub fn index(i: usize) -> Self {
        PathElement::Index(i)
    }

    /// Returns the element as it addresses a mapping.
    ///
    /// Mappings have only string keys, so indices and `-` are read as text.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathElement::Key(k) => Cow::Borrowed(k),
            PathElement::Index(i) => Cow::Owned(i.to_string()),
            PathElement::End => Cow::Borrowed("-"),
        }
    }

    fn from_token(token: &Token<'_>) -> Self {
        match token.to_index() {
            Ok(Index::Num(i)) => PathElement::Index(i),
            Ok(Index::Next) => PathElement::End,
            Err(_) => PathElement::Key(token.decoded().into_owned()),
        }
    }

    fn to_token(&self) -> Token<'static> {
        Token::new(self.as_key().into_owned())
    }
}

/// PointerError represents malformed JSON Pointer text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid JSON Pointer '{pointer}': {reason}")]
pub struct PointerError {
    pub pointer: String,
    pub reason: String,
}

/// Pointer is a complete path to a position in a values tree.
///
/// It is an RFC 6901 JSON Pointer; the empty pointer addresses the document
/// root. Two pointers are equal when their encoded text is equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pointer(PointerBuf);

impl Pointer {
    /// Creates the pointer to the document root.
    pub fn root() -> Self {
        Pointer(PointerBuf::new())
    }

    /// Creates a pointer from a vector of elements.
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        elements.into_iter().collect()
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.0.tokens().count()
    }

    /// Returns true if the pointer addresses the root.
    pub fn is_root(&self) -> bool {
        self.0.is_root()
    }

    pub fn iter(&self) -> impl Iterator<Item = PathElement> + '_ {
        self.0.tokens().map(|token| PathElement::from_token(&token))
    }

    /// Returns the elements from the root down.
    pub fn elements(&self) -> Vec<PathElement> {
        self.iter().collect()
    }

    pub fn push(&mut self, element: PathElement) {
        self.0.push_back(element.to_token());
    }

    pub fn pop(&mut self) -> Option<PathElement> {
        self.0.pop_back().map(|token| PathElement::from_token(&token))
    }

    pub fn last(&self) -> Option<PathElement> {
        self.iter().last()
    }

    /// Creates a new pointer with the given element appended.
    pub fn with(&self, element: PathElement) -> Self {
        let mut child = self.clone();
        child.push(element);
        child
    }

    /// Returns the encoded pointer text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PointerBuf> for Pointer {
    fn from(buf: PointerBuf) -> Self {
        Pointer(buf)
    }
}

impl From<Pointer> for PointerBuf {
    fn from(pointer: Pointer) -> Self {
        pointer.0
    }
}

impl FromIterator<PathElement> for Pointer {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Pointer(PointerBuf::from_tokens(
            iter.into_iter().map(|element| element.to_token()),
        ))
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_token().encoded())
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<PointerBuf>().map(Pointer).map_err(|err| PointerError {
            pointer: s.to_string(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_operations() {
        let mut pointer = Pointer::root();
        assert!(pointer.is_root());

        pointer.push(PathElement::key("image"));
        pointer.push(PathElement::key("tag"));
        assert_eq!(pointer.len(), 2);
        assert_eq!(pointer.last(), Some(PathElement::Key("tag".to_string())));

        let popped = pointer.pop();
        assert_eq!(popped, Some(PathElement::Key("tag".to_string())));
        assert_eq!(pointer.len(), 1);
        assert_eq!(pointer.with(PathElement::index(2)).to_string(), "/image/2");
    }

    #[test]
    fn test_pointer_display_escapes() {
        let pointer = Pointer::from_elements(vec![
            PathElement::key("a/b"),
            PathElement::key("~c"),
            PathElement::index(0),
            PathElement::End,
        ]);
        assert_eq!(pointer.to_string(), "/a~1b/~0c/0/-");
        assert_eq!("/a~1b/~0c/0/-".parse::<Pointer>().unwrap(), pointer);
        assert_eq!(PathElement::key("a/b").to_string(), "a~1b");
    }

    #[test]
    fn test_pointer_parse_tokens() {
        let pointer: Pointer = "/foo/01/10/".parse().unwrap();
        assert_eq!(
            pointer.elements(),
            vec![
                PathElement::key("foo"),
                PathElement::key("01"),
                PathElement::index(10),
                PathElement::key(""),
            ]
        );
        assert!("".parse::<Pointer>().unwrap().is_root());
    }

    #[test]
    fn test_pointer_parse_errors() {
        let err = "foo/bar".parse::<Pointer>().unwrap_err();
        assert_eq!(err.pointer, "foo/bar");
        assert!(err.to_string().starts_with("invalid JSON Pointer 'foo/bar'"));

        let err = "/foo~2".parse::<Pointer>().unwrap_err();
        assert_eq!(err.pointer, "/foo~2");
    }

    #[test]
    fn test_numeric_key_is_canonical() {
        assert_eq!(PathElement::key("80"), PathElement::index(80));
        assert_eq!(PathElement::key("-"), PathElement::End);
        assert_eq!(PathElement::key("080"), PathElement::Key("080".to_string()));

        let built = Pointer::from_elements(vec![PathElement::key("ports"), PathElement::key("80")]);
        let parsed: Pointer = "/ports/80".parse().unwrap();
        assert_eq!(built, parsed);
        assert_eq!(built.elements(), parsed.elements());
    }

    #[test]
    fn test_path_element_as_key() {
        assert_eq!(PathElement::key("name").as_key(), "name");
        assert_eq!(PathElement::index(3).as_key(), "3");
        assert_eq!(PathElement::End.as_key(), "-");
    }

    #[test]
    fn test_pointer_serializes_as_string() {
        let pointer: Pointer = "/a~1b/0".parse().unwrap();
        assert_eq!(serde_json::to_value(&pointer).unwrap(), serde_json::json!("/a~1b/0"));
        let back: Pointer = serde_json::from_value(serde_json::json!("/a~1b/0")).unwrap();
        assert_eq!(back, pointer);
    }
}
