//! Schema synthesis and validation
//!
//! Turns a structural prediction, enriched by the per-path type
//! predictions, into a composable validator tree. The validator vocabulary
//! is small: scalar checks, closed value sets, unions, list-of wrappers,
//! keyed-map checks with a key convention, and strict fixed shapes.
//! Synthesis mirrors the analyzer's depth cap: past it, a permissive node
//! is produced instead of recursing further.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::PredictorConfig;
use crate::error::ValidationError;
use crate::patterns::KeyPattern;
use crate::path::FlattenedPath;
use crate::structure::StructuralPrediction;
use crate::types::TypePrediction;
use crate::value::{TypeTag, Value};

/// A synthesized validator node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Schema {
    /// Accepts only null
    Null,
    /// Accepts values of exactly one runtime tag
    Scalar(TypeTag),
    /// Accepts exactly the detected literal string values
    Enum(BTreeSet<String>),
    /// Accepts a value any member accepts
    Union(Vec<Schema>),
    /// Accepts a list whose every element the inner schema accepts
    ListOf(Box<Schema>),
    /// Accepts a map whose keys follow the convention and whose values the
    /// inner schema accepts
    Dictionary {
        key_pattern: KeyPattern,
        value: Box<Schema>,
    },
    /// Accepts a map with exactly the declared fields; undeclared keys are
    /// rejected
    Shape { fields: BTreeMap<String, FieldSchema> },
    /// Accepts null or whatever the inner schema accepts
    Nullable(Box<Schema>),
    /// Accepts anything
    Any,
}

/// One declared field of a fixed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub schema: Schema,
    /// The key may be absent entirely; distinct from the value being null.
    pub optional: bool,
}

impl Schema {
    /// Check a document against this schema.
    pub fn validate(&self, document: &Value) -> Result<(), ValidationError> {
        let mut path = String::from("$");
        self.validate_at(document, &mut path)
    }

    /// Boolean convenience over [`Schema::validate`].
    pub fn is_valid(&self, document: &Value) -> bool {
        self.validate(document).is_ok()
    }

    fn validate_at(&self, value: &Value, path: &mut String) -> Result<(), ValidationError> {
        match self {
            Schema::Any => Ok(()),
            Schema::Null => {
                if value.is_null() {
                    Ok(())
                } else {
                    Err(self.mismatch(value, path))
                }
            }
            Schema::Nullable(inner) => {
                if value.is_null() {
                    Ok(())
                } else {
                    inner.validate_at(value, path)
                }
            }
            Schema::Scalar(tag) => {
                if value.tag() == Some(*tag) {
                    Ok(())
                } else {
                    Err(self.mismatch(value, path))
                }
            }
            Schema::Enum(values) => match value {
                Value::String(s) if values.contains(s) => Ok(()),
                Value::String(s) => Err(ValidationError::NotInEnum {
                    path: path.clone(),
                    value: s.clone(),
                }),
                _ => Err(self.mismatch(value, path)),
            },
            Schema::Union(members) => {
                if members.iter().any(|m| {
                    let mut scratch = path.clone();
                    m.validate_at(value, &mut scratch).is_ok()
                }) {
                    Ok(())
                } else {
                    Err(self.mismatch(value, path))
                }
            }
            Schema::ListOf(element) => match value {
                Value::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        let len = path.len();
                        path.push_str(&format!("[{index}]"));
                        let result = element.validate_at(item, path);
                        path.truncate(len);
                        result?;
                    }
                    Ok(())
                }
                _ => Err(self.mismatch(value, path)),
            },
            Schema::Dictionary { key_pattern, value: value_schema } => match value {
                Value::Map(entries) => {
                    for (key, entry) in entries {
                        if !key_pattern.matches_key(key) {
                            return Err(ValidationError::KeyPatternMismatch {
                                path: path.clone(),
                                key: key.clone(),
                                pattern: key_pattern.to_string(),
                            });
                        }
                        let len = path.len();
                        path.push('.');
                        path.push_str(key);
                        let result = value_schema.validate_at(entry, path);
                        path.truncate(len);
                        result?;
                    }
                    Ok(())
                }
                _ => Err(self.mismatch(value, path)),
            },
            Schema::Shape { fields } => match value {
                Value::Map(entries) => {
                    for key in entries.keys() {
                        if !fields.contains_key(key) {
                            return Err(ValidationError::UnexpectedKey {
                                path: path.clone(),
                                key: key.clone(),
                            });
                        }
                    }
                    for (name, field) in fields {
                        match entries.get(name) {
                            Some(entry) => {
                                let len = path.len();
                                path.push('.');
                                path.push_str(name);
                                let result = field.schema.validate_at(entry, path);
                                path.truncate(len);
                                result?;
                            }
                            None if field.optional => {}
                            None => {
                                return Err(ValidationError::MissingKey {
                                    path: path.clone(),
                                    key: name.clone(),
                                });
                            }
                        }
                    }
                    Ok(())
                }
                _ => Err(self.mismatch(value, path)),
            },
        }
    }

    fn mismatch(&self, value: &Value, path: &str) -> ValidationError {
        ValidationError::TypeMismatch {
            path: path.to_string(),
            expected: self.to_string(),
            found: value.tag_name().to_string(),
        }
    }
}

impl std::fmt::Display for Schema {
    /// Printable type label (`"string | number"`,
    /// `"enum(active | inactive)"`).
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schema::Null => write!(f, "null"),
            Schema::Scalar(tag) => write!(f, "{tag}"),
            Schema::Enum(values) => {
                let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                write!(f, "enum({})", joined.join(" | "))
            }
            Schema::Union(members) => {
                let labels: Vec<String> = members.iter().map(Schema::to_string).collect();
                write!(f, "{}", labels.join(" | "))
            }
            Schema::ListOf(element) => write!(f, "{element}[]"),
            Schema::Dictionary { key_pattern, value } => {
                write!(f, "record<{key_pattern}, {value}>")
            }
            Schema::Shape { .. } => write!(f, "object"),
            Schema::Nullable(inner) => write!(f, "{inner} | null"),
            Schema::Any => write!(f, "any"),
        }
    }
}

/// Builds validator trees from structural predictions, consulting the
/// per-path type predictions for unions and enum overrides.
pub struct SchemaSynthesizer<'a> {
    predictions: &'a BTreeMap<FlattenedPath, TypePrediction>,
    config: &'a PredictorConfig,
}

impl<'a> SchemaSynthesizer<'a> {
    pub fn new(
        predictions: &'a BTreeMap<FlattenedPath, TypePrediction>,
        config: &'a PredictorConfig,
    ) -> Self {
        Self {
            predictions,
            config,
        }
    }

    /// Synthesize the validator for a structural prediction tree.
    pub fn synthesize(&self, structure: &StructuralPrediction) -> Schema {
        self.synth_node(structure, 0)
    }

    fn synth_node(&self, node: &StructuralPrediction, depth: usize) -> Schema {
        if depth > self.config.max_depth {
            return Schema::Any;
        }

        match node {
            StructuralPrediction::Open { .. } => Schema::Any,

            StructuralPrediction::Primitive { path, tag, nullable } => {
                let prediction = self.predictions.get(path);
                let schema = self.primitive_schema(prediction, *tag);
                let nullable =
                    *nullable || prediction.map(|p| p.nullable).unwrap_or(false);
                wrap_nullable(schema, nullable)
            }

            StructuralPrediction::Array {
                path,
                element,
                depth: observed_depth,
                item_tags,
                nullable,
            } => {
                // The recursively built element schema already encodes the
                // deeper levels; the flat item-tag union does not, so it is
                // wrapped once per observed level.
                let schema = match element {
                    Some(child) => Schema::ListOf(Box::new(
                        self.synth_node(child, depth + 1),
                    )),
                    None if !item_tags.is_empty() => {
                        let mut schema = union_of_tags(item_tags);
                        for _ in 0..(*observed_depth).max(1) {
                            schema = Schema::ListOf(Box::new(schema));
                        }
                        schema
                    }
                    // No observed elements: a permissive list of anything.
                    None => Schema::ListOf(Box::new(Schema::Any)),
                };
                let prediction = self.predictions.get(path);
                let schema = self.widen_with_scalar_tags(schema, path);
                let nullable =
                    *nullable || prediction.map(|p| p.nullable).unwrap_or(false);
                wrap_nullable(schema, nullable)
            }

            StructuralPrediction::Record {
                path,
                key_pattern,
                value_tags,
                value_nullable,
                nullable,
            } => {
                let value = if value_tags.is_empty() {
                    Schema::Any
                } else {
                    union_of_tags(value_tags)
                };
                let schema = Schema::Dictionary {
                    key_pattern: key_pattern.clone(),
                    value: Box::new(wrap_nullable(value, *value_nullable)),
                };
                wrap_nullable(self.widen_with_scalar_tags(schema, path), *nullable)
            }

            StructuralPrediction::Object {
                path,
                children,
                nullable,
            } => {
                let mut fields = BTreeMap::new();
                for (name, child) in children {
                    let schema = self.synth_node(&child.prediction, depth + 1);
                    fields.insert(
                        name.clone(),
                        FieldSchema {
                            schema: wrap_nullable(schema, child.nullable),
                            optional: child.optional,
                        },
                    );
                }
                let schema = self.widen_with_scalar_tags(Schema::Shape { fields }, path);
                wrap_nullable(schema, *nullable)
            }
        }
    }

    /// Scalar, union or enum check for a primitive position.
    ///
    /// The type prediction is the richer source: it carries the full tag
    /// union and the enum override. The structural tag is the fallback when
    /// no prediction was recorded for the path.
    fn primitive_schema(
        &self,
        prediction: Option<&TypePrediction>,
        structural_tag: Option<TypeTag>,
    ) -> Schema {
        if let Some(prediction) = prediction {
            if let Some(values) = &prediction.enum_values {
                return Schema::Enum(values.clone());
            }
            if !prediction.tags.is_empty() {
                return union_of_tags(&prediction.tags);
            }
            if prediction.nullable {
                // Only nulls were ever observed at this position.
                return Schema::Null;
            }
        }
        match structural_tag {
            Some(tag) => Schema::Scalar(tag),
            None => Schema::Any,
        }
    }

    /// Widen a container schema with the scalar tags sampled directly at
    /// its path.
    ///
    /// A position classified as a container may still have held bare
    /// scalars (a list mixing `1` and `[2]`, a list mixing maps and
    /// numbers). The container classification wins structurally, but the
    /// scalar samples must stay accepted, so they join the container
    /// schema as union members.
    fn widen_with_scalar_tags(&self, schema: Schema, path: &FlattenedPath) -> Schema {
        let Some(prediction) = self.predictions.get(path) else {
            return schema;
        };
        let scalar_tags: BTreeSet<TypeTag> = prediction
            .tags
            .iter()
            .copied()
            .filter(|tag| !matches!(tag, TypeTag::Array | TypeTag::Object))
            .collect();
        if scalar_tags.is_empty() {
            return schema;
        }
        let mut members = match union_of_tags(&scalar_tags) {
            Schema::Union(members) => members,
            single => vec![single],
        };
        members.push(schema);
        Schema::Union(members)
    }
}

fn wrap_nullable(schema: Schema, nullable: bool) -> Schema {
    if !nullable {
        return schema;
    }
    match schema {
        // Already accepts null.
        Schema::Any => Schema::Any,
        Schema::Null => Schema::Null,
        Schema::Nullable(inner) => Schema::Nullable(inner),
        other => Schema::Nullable(Box::new(other)),
    }
}

/// Union over a tag set, folded to a single scalar when only one candidate
/// kind remains.
fn union_of_tags(tags: &BTreeSet<TypeTag>) -> Schema {
    let mut members: Vec<Schema> = Vec::new();
    for tag in tags {
        let candidate = Schema::Scalar(*tag);
        // Two candidates of the same validator kind with equal content are
        // one schema; skip duplicates instead of stacking a needless union.
        if !members.contains(&candidate) {
            members.push(candidate);
        }
    }
    match members.len() {
        0 => Schema::Any,
        1 => members.pop().unwrap_or(Schema::Any),
        _ => Schema::Union(members),
    }
}
