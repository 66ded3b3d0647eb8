//! Generic self-describing document values
//!
//! Every sample document handed to the engine is expressed as a [`Value`]:
//! the usual JSON-like scalars and containers, plus the refinement leaves a
//! richer host runtime surfaces (timestamps, compiled patterns, error
//! objects, associative maps, unique-element sets, deferred results and raw
//! byte buffers). The refinements widen the primitive tag space but are
//! never descended into.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generic, possibly-nested document value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Numeric value (integers and floats share one tag)
    Number(f64),
    /// String
    String(String),
    /// Ordered list; the only container that contributes array structure
    List(Vec<Value>),
    /// Keyed map; the only container that contributes object structure
    Map(BTreeMap<String, Value>),
    /// Temporal value
    Timestamp(DateTime<Utc>),
    /// Compiled pattern / regex source
    Pattern(String),
    /// Error value (message only)
    Error(String),
    /// Associative map with arbitrary keys; treated as a leaf
    AssocMap(Vec<(Value, Value)>),
    /// Unique-element set; treated as a leaf
    UniqueSet(Vec<Value>),
    /// Deferred / future value; carries nothing observable
    Deferred,
    /// Raw byte buffer
    Bytes(Vec<u8>),
}

/// Runtime type tag of a non-null value.
///
/// Variants are declared in the fixed descending priority used when a union
/// label is printed (`date` first, `boolean` last). The derived `Ord`
/// therefore makes ordered-set iteration produce the deterministic label
/// order. The ordering carries no semantic weight beyond printing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TypeTag {
    Date,
    Regexp,
    Error,
    Map,
    Set,
    Deferred,
    Buffer,
    Object,
    Array,
    String,
    Number,
    Boolean,
}

impl TypeTag {
    /// Printable name of this tag, as used in union labels.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Date => "date",
            TypeTag::Regexp => "regexp",
            TypeTag::Error => "error",
            TypeTag::Map => "map",
            TypeTag::Set => "set",
            TypeTag::Deferred => "deferred",
            TypeTag::Buffer => "buffer",
            TypeTag::Object => "object",
            TypeTag::Array => "array",
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
        }
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Value {
    /// Runtime tag of this value, or `None` for null.
    pub fn tag(&self) -> Option<TypeTag> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeTag::Boolean),
            Value::Number(_) => Some(TypeTag::Number),
            Value::String(_) => Some(TypeTag::String),
            Value::List(_) => Some(TypeTag::Array),
            Value::Map(_) => Some(TypeTag::Object),
            Value::Timestamp(_) => Some(TypeTag::Date),
            Value::Pattern(_) => Some(TypeTag::Regexp),
            Value::Error(_) => Some(TypeTag::Error),
            Value::AssocMap(_) => Some(TypeTag::Map),
            Value::UniqueSet(_) => Some(TypeTag::Set),
            Value::Deferred => Some(TypeTag::Deferred),
            Value::Bytes(_) => Some(TypeTag::Buffer),
        }
    }

    /// Printable tag name (`"null"` for null).
    pub fn tag_name(&self) -> &'static str {
        self.tag().map(|t| t.name()).unwrap_or("null")
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Maximum list-nesting depth of this value.
    ///
    /// Non-list values have depth 0; `[]` has depth 1; `[[1]]` has depth 2.
    pub fn list_depth(&self) -> usize {
        match self {
            Value::List(items) => {
                1 + items.iter().map(Value::list_depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Collect the leaf tags reachable through nested lists.
    ///
    /// Descends through `List` values only; everything else contributes its
    /// own tag. Nulls inside lists are reported through the returned flag
    /// rather than as a tag.
    pub fn collect_leaf_tags(
        &self,
        tags: &mut std::collections::BTreeSet<TypeTag>,
        saw_null: &mut bool,
    ) {
        match self {
            Value::List(items) => {
                for item in items {
                    item.collect_leaf_tags(tags, saw_null);
                }
            }
            Value::Null => *saw_null = true,
            other => {
                if let Some(tag) = other.tag() {
                    tags.insert(tag);
                }
            }
        }
    }

    /// Parse a JSON document into a value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        Ok(Value::from(parsed))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_priority_order() {
        // Ordered-set iteration must follow the printed union priority.
        let mut tags = std::collections::BTreeSet::new();
        tags.insert(TypeTag::Boolean);
        tags.insert(TypeTag::String);
        tags.insert(TypeTag::Date);
        tags.insert(TypeTag::Number);

        let ordered: Vec<_> = tags.iter().copied().collect();
        assert_eq!(
            ordered,
            vec![TypeTag::Date, TypeTag::String, TypeTag::Number, TypeTag::Boolean]
        );
    }

    #[test]
    fn test_list_depth() {
        assert_eq!(Value::Number(1.0).list_depth(), 0);
        assert_eq!(Value::List(vec![]).list_depth(), 1);

        let matrix = Value::List(vec![
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)]),
            Value::List(vec![Value::Number(3.0)]),
        ]);
        assert_eq!(matrix.list_depth(), 2);
    }

    #[test]
    fn test_collect_leaf_tags_flattens_nesting() {
        let nested = Value::List(vec![
            Value::List(vec![Value::Number(1.0), Value::Null]),
            Value::String("x".to_string()),
        ]);

        let mut tags = std::collections::BTreeSet::new();
        let mut saw_null = false;
        nested.collect_leaf_tags(&mut tags, &mut saw_null);

        assert!(tags.contains(&TypeTag::Number));
        assert!(tags.contains(&TypeTag::String));
        assert!(!tags.contains(&TypeTag::Array));
        assert!(saw_null);
    }

    #[test]
    fn test_from_json() {
        let value = Value::from_json(r#"{"name": "Alice", "scores": [1, 2]}"#).unwrap();
        if let Value::Map(entries) = value {
            assert_eq!(entries["name"], Value::String("Alice".to_string()));
            assert_eq!(
                entries["scores"],
                Value::List(vec![Value::Number(1.0), Value::Number(2.0)])
            );
        } else {
            panic!("Expected map value");
        }
    }

    #[test]
    fn test_refinement_tags() {
        assert_eq!(Value::Deferred.tag(), Some(TypeTag::Deferred));
        assert_eq!(Value::Bytes(vec![1]).tag(), Some(TypeTag::Buffer));
        assert_eq!(
            Value::Pattern("^a$".to_string()).tag(),
            Some(TypeTag::Regexp)
        );
        assert_eq!(Value::Null.tag(), None);
        assert_eq!(Value::Null.tag_name(), "null");
    }
}
