//! Per-path type prediction
//!
//! Independently of the structural analysis, every flattened path gets a
//! flat summary of the runtime tags observed there: a deterministic tag
//! union plus nullable/optional flags, array depth/element metadata, and a
//! possible closed-enumeration override for string-only paths. Structural
//! and type predictions are reconciled only at synthesis time.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::collector::SampleSet;
use crate::config::PredictorConfig;
use crate::patterns::uniform_casing;
use crate::path::{FlatSegment, FlattenedPath};
use crate::relations::RelationTree;
use crate::value::{TypeTag, Value};

/// Flat type summary of one flattened path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypePrediction {
    /// Observed runtime tags, null and missing stripped out. Iteration
    /// order is the fixed label-printing priority.
    pub tags: BTreeSet<TypeTag>,
    /// Some sample at this path was explicitly null.
    pub nullable: bool,
    /// Some sibling map at the parent position omitted this key entirely.
    /// Independent of `nullable`; a validator must distinguish the two.
    pub optional: bool,
    /// Any sample at this path was a list.
    pub is_array: bool,
    /// Deepest nested-list chain observed.
    pub array_depth: usize,
    /// Leaf tags reachable through nested lists.
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub item_tags: BTreeSet<TypeTag>,
    /// Recursively merged prediction of direct list elements.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub element: Option<Box<TypePrediction>>,
    /// Closed value set, when the string samples pass enum detection.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enum_values: Option<BTreeSet<String>>,
}

impl TypePrediction {
    /// Summarize a set of raw samples observed at one path.
    pub fn from_samples<'a, I>(samples: I, config: &PredictorConfig) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        Self::from_samples_at_depth(samples, config, 0)
    }

    fn from_samples_at_depth<'a, I>(samples: I, config: &PredictorConfig, depth: usize) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut prediction = TypePrediction::default();
        if depth > config.max_depth {
            return prediction;
        }

        let mut strings: Vec<&str> = Vec::new();
        let mut elements: Vec<&Value> = Vec::new();

        for sample in samples {
            match sample {
                Value::Null => prediction.nullable = true,
                Value::List(items) => {
                    prediction.tags.insert(TypeTag::Array);
                    prediction.is_array = true;
                    prediction.array_depth =
                        prediction.array_depth.max(sample.list_depth());
                    let mut saw_null = false;
                    sample.collect_leaf_tags(&mut prediction.item_tags, &mut saw_null);
                    elements.extend(items.iter());
                }
                other => {
                    if let Value::String(s) = other {
                        strings.push(s.as_str());
                    }
                    if let Some(tag) = other.tag() {
                        prediction.tags.insert(tag);
                    }
                }
            }
        }

        if !elements.is_empty() {
            prediction.element = Some(Box::new(Self::from_samples_at_depth(
                elements,
                config,
                depth + 1,
            )));
        }

        prediction.enum_values = detect_enum_pattern(&prediction.tags, &strings, config);
        prediction
    }

    /// Merge two predictions for the same path.
    ///
    /// Tag sets and item tags union, flags OR together, the larger array
    /// depth wins and element predictions merge recursively. Enum overrides
    /// survive only when both sides agree they hold one.
    pub fn merge_with(mut self, other: TypePrediction) -> TypePrediction {
        self.tags.extend(other.tags);
        self.item_tags.extend(other.item_tags);
        self.nullable |= other.nullable;
        self.optional |= other.optional;
        self.is_array |= other.is_array;
        self.array_depth = self.array_depth.max(other.array_depth);
        self.element = match (self.element, other.element) {
            (Some(a), Some(b)) => Some(Box::new((*a).merge_with(*b))),
            (a, b) => a.or(b),
        };
        self.enum_values = match (self.enum_values, other.enum_values) {
            (Some(mut a), Some(b)) => {
                a.extend(b);
                Some(a)
            }
            _ => None,
        };
        self
    }

    /// Printable type label, reproducible byte-for-byte.
    ///
    /// Single tags print bare (`"number"`), unions join in the fixed
    /// priority order (`"string | number"`), nullable and optional append
    /// `null` / `undefined`, and a detected enumeration overrides the plain
    /// string label (`"enum(active | inactive)"`).
    pub fn label(&self) -> String {
        if let Some(values) = &self.enum_values {
            let joined: Vec<&str> = values.iter().map(String::as_str).collect();
            let mut label = format!("enum({})", joined.join(" | "));
            if self.nullable {
                label.push_str(" | null");
            }
            if self.optional {
                label.push_str(" | undefined");
            }
            return label;
        }

        let mut parts: Vec<&str> = self.tags.iter().map(TypeTag::name).collect();
        if self.nullable {
            parts.push("null");
        }
        if self.optional {
            parts.push("undefined");
        }
        if parts.is_empty() {
            return "unknown".to_string();
        }
        parts.join(" | ")
    }
}

/// Promote deduplicated string samples to a closed enumeration.
///
/// Requires string-only samples, at least the configured number of distinct
/// values, a single casing convention, and a bounded length spread. When it
/// triggers, the plain `string` classification is overridden for that path
/// only.
pub fn detect_enum_pattern(
    tags: &BTreeSet<TypeTag>,
    strings: &[&str],
    config: &PredictorConfig,
) -> Option<BTreeSet<String>> {
    if tags.len() != 1 || !tags.contains(&TypeTag::String) {
        return None;
    }

    let distinct: BTreeSet<&str> = strings.iter().copied().collect();
    if distinct.len() < config.enum_min_values {
        return None;
    }

    let values: Vec<&str> = distinct.iter().copied().collect();
    if !uniform_casing(&values) {
        return None;
    }

    let shortest = values.iter().map(|v| v.len()).min().unwrap_or(0);
    let longest = values.iter().map(|v| v.len()).max().unwrap_or(0);
    if longest - shortest > config.enum_length_spread {
        return None;
    }

    Some(distinct.into_iter().map(str::to_string).collect())
}

/// Compute a type prediction for every observed path.
///
/// Buckets already aggregate samples across merged documents and repeated
/// list elements, so one pass over the set suffices. The optional flag is
/// an occurrence shortfall against the parent position.
pub fn predict_types(
    samples: &SampleSet,
    tree: &RelationTree,
    config: &PredictorConfig,
) -> BTreeMap<FlattenedPath, TypePrediction> {
    let mut predictions = BTreeMap::new();

    for (path, bucket) in samples.buckets() {
        let mut prediction = TypePrediction::from_samples(&bucket.samples, config);

        if matches!(path.last(), Some(FlatSegment::Key(_))) {
            if let Some(parent) = tree.get(path).and_then(|node| node.parent.as_ref()) {
                if let Some(parent_bucket) = samples.get(parent) {
                    prediction.optional = bucket.occurrences < parent_bucket.occurrences;
                }
            }
        }

        predictions.insert(path.clone(), prediction);
    }

    predictions
}
