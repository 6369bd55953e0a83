//! Conversion between values trees and `serde_json` values.

use super::{Mapping, Node, Scalar};
use serde_json::{Number as JsonNumber, Value as Json};

impl From<&Node> for Json {
    fn from(node: &Node) -> Self {
        match node {
            Node::Scalar(Scalar::Null) => Json::Null,
            Node::Scalar(Scalar::Bool(b)) => Json::Bool(*b),
            Node::Scalar(Scalar::Number(n)) => number_to_json(n),
            Node::Scalar(Scalar::String(s)) => Json::String(s.clone()),
            Node::Mapping(m) => Json::Object(m.iter().map(|(k, v)| (k.clone(), Json::from(v))).collect()),
            Node::Sequence(items) => Json::Array(items.iter().map(Json::from).collect()),
        }
    }
}

impl From<Json> for Node {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Node::null(),
            Json::Bool(b) => Node::from(b),
            Json::Number(n) => Node::Scalar(number_from_json(&n)),
            Json::String(s) => Node::from(s),
            Json::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Json::Object(fields) => Node::Mapping(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Node::from(v)))
                    .collect::<Mapping>(),
            ),
        }
    }
}

// JSON has no NaN or infinity; those become null.
fn number_to_json(n: &serde_yaml::Number) -> Json {
    if let Some(u) = n.as_u64() {
        Json::from(u)
    } else if let Some(i) = n.as_i64() {
        Json::from(i)
    } else {
        n.as_f64()
            .and_then(JsonNumber::from_f64)
            .map_or(Json::Null, Json::Number)
    }
}

fn number_from_json(n: &JsonNumber) -> Scalar {
    if let Some(u) = n.as_u64() {
        Scalar::Number(u.into())
    } else if let Some(i) = n.as_i64() {
        Scalar::Number(i.into())
    } else {
        n.as_f64().map_or(Scalar::Null, |f| Scalar::Number(f.into()))
    }
}
