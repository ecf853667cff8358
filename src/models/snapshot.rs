//! Snapshot types: the nested configuration tree captured by a dump.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, Serializer};
use serde::{Deserialize, Deserializer};

/// A single node in a configuration tree.
///
/// `Integer(1)` and `Float(1.0)` are different values: equality is
/// structural and type-aware.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Absent / unset value.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Ordered sequence; position is significant.
    Sequence(Vec<Node>),
    /// Insertion-ordered mapping with unique keys.
    Mapping(IndexMap<String, Node>),
}

impl Node {
    /// Build a mapping node from key/value pairs (later duplicates win).
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Node>,
    {
        Node::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sequence node.
    pub fn sequence<V: Into<Node>>(items: impl IntoIterator<Item = V>) -> Self {
        Node::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for everything that is neither a mapping nor a sequence.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Node::Sequence(_) | Node::Mapping(_))
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Container nesting depth: 0 for scalars, 1 for a flat sequence or mapping.
    pub fn depth(&self) -> usize {
        match self {
            Node::Sequence(items) => 1 + items.iter().map(Node::depth).max().unwrap_or(0),
            Node::Mapping(map) => 1 + map.values().map(Node::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Short type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Integer(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Node::Bool(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Node::Integer(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Node::Integer(i64::from(v))
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Node::Float(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Node::String(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Node::String(v)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(v: Option<T>) -> Self {
        v.map_or(Node::Null, Into::into)
    }
}

impl From<Vec<Node>> for Node {
    fn from(v: Vec<Node>) -> Self {
        Node::Sequence(v)
    }
}

impl From<IndexMap<String, Node>> for Node {
    fn from(v: IndexMap<String, Node>) -> Self {
        Node::Mapping(v)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Integer(i) => serializer.serialize_i64(*i),
            Node::Float(f) if !f.is_finite() => Err(ser::Error::custom(format!(
                "non-finite float {f} cannot be represented in a dump"
            ))),
            Node::Float(f) => serializer.serialize_f64(*f),
            Node::String(s) => serializer.serialize_str(s),
            Node::Sequence(items) => serializer.collect_seq(items),
            Node::Mapping(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_unit<E>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_bool<E>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        i64::try_from(v)
            .map(Node::Integer)
            .map_err(|_| E::custom(format!("integer {v} is out of range")))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Float(v))
    }

    fn visit_str<E>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Node, A::Error> {
        let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, Node>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
            map.insert(key, value);
        }
        Ok(Node::Mapping(map))
    }
}

/// A full configuration capture: component name → that component's settings.
///
/// Every component value is a [`Node::Mapping`]; the constructors and the
/// deserializer enforce it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    components: IndexMap<String, Node>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a component and its settings.
    pub fn insert_component(&mut self, name: impl Into<String>, settings: IndexMap<String, Node>) {
        self.components.insert(name.into(), Node::Mapping(settings));
    }

    /// Builder-style variant of [`Snapshot::insert_component`].
    pub fn with_component<K, V>(
        mut self,
        name: impl Into<String>,
        settings: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Node>,
    {
        let settings = settings
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.insert_component(name, settings);
        self
    }

    /// Validate a raw top-level mapping.
    pub fn from_components(components: IndexMap<String, Node>) -> Result<Self, String> {
        for (name, value) in &components {
            if !matches!(value, Node::Mapping(_)) {
                return Err(format!(
                    "component `{name}` must be a mapping, found {}",
                    value.type_name()
                ));
            }
        }
        Ok(Self { components })
    }

    /// Settings of a single component.
    pub fn component(&self, name: &str) -> Option<&IndexMap<String, Node>> {
        self.components.get(name).and_then(Node::as_mapping)
    }

    /// The top level as a plain mapping of component → mapping node.
    pub fn as_map(&self) -> &IndexMap<String, Node> {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Nesting depth counting the top-level mapping itself.
    pub fn depth(&self) -> usize {
        1 + self.components.values().map(Node::depth).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.components)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Node::deserialize(deserializer)? {
            Node::Mapping(components) => {
                Snapshot::from_components(components).map_err(de::Error::custom)
            }
            other => Err(de::Error::custom(format!(
                "snapshot must be a mapping of components, found {}",
                other.type_name()
            ))),
        }
    }
}

/// Returns `true` when `key` looks like an identifier (`[A-Za-z_][A-Za-z0-9_]*`).
///
/// Identifier-like keys are rendered as symbols; everything else is quoted.
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_float_are_distinct() {
        assert_ne!(Node::Integer(1), Node::Float(1.0));
    }

    #[test]
    fn mapping_keeps_insertion_order() {
        let node = Node::mapping([("zeta", 1), ("alpha", 2)]);
        let keys: Vec<_> = node.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Node::from(None::<&str>), Node::Null);
        assert_eq!(Node::from(Some("x")), Node::String("x".into()));
    }

    #[test]
    fn depth_counts_nested_containers() {
        assert_eq!(Node::from(1).depth(), 0);
        assert_eq!(Node::sequence(Vec::<Node>::new()).depth(), 1);
        assert_eq!(
            Node::mapping([("a", Node::sequence([Node::mapping([("b", 1)])]))]).depth(),
            3
        );
        assert_eq!(Snapshot::new().depth(), 1);
        assert_eq!(Snapshot::new().with_component("m", [("x", 1)]).depth(), 2);
    }

    #[test]
    fn is_scalar_classification() {
        assert!(Node::Null.is_scalar());
        assert!(Node::from("x").is_scalar());
        assert!(!Node::sequence([1, 2]).is_scalar());
        assert!(!Node::mapping([("a", 1)]).is_scalar());
    }

    #[test]
    fn from_components_rejects_scalar_component() {
        let mut raw = IndexMap::new();
        raw.insert("app".to_string(), Node::Integer(3));
        let err = Snapshot::from_components(raw).unwrap_err();
        assert!(err.contains("app"), "got: {err}");
        assert!(err.contains("integer"), "got: {err}");
    }

    #[test]
    fn snapshot_component_lookup() {
        let snap = Snapshot::new().with_component("app_a", [("timeout", 30)]);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.component("app_a").unwrap()["timeout"], Node::Integer(30));
        assert!(snap.component("missing").is_none());
    }

    #[test]
    fn deserialize_rejects_top_level_array() {
        let result: Result<Snapshot, _> = serde_json::from_str("[1, 2]");
        assert!(result.is_err());
    }

    #[test]
    fn deserialize_rejects_duplicate_keys() {
        let result: Result<Node, _> = serde_json::from_str(r#"{"a": 1, "a": 2}"#);
        assert!(result.unwrap_err().to_string().contains("duplicate key"));
    }

    #[test]
    fn deserialize_rejects_u64_overflow() {
        let result: Result<Node, _> = serde_json::from_str("18446744073709551615");
        assert!(result.unwrap_err().to_string().contains("out of range"));
    }

    #[test]
    fn serialize_rejects_nan() {
        let result = serde_json::to_string(&Node::Float(f64::NAN));
        assert!(result.is_err());
    }

    #[test]
    fn identifier_detection() {
        assert!(is_identifier("app_a"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("Elixir2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("with space"));
        assert!(!is_identifier("dotted.key"));
    }
}
