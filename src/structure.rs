//! Structural prediction over the path-relation tree
//!
//! Classifies every node of the reconstructed path tree into one of the
//! structural shapes: a primitive leaf, an array position, an open
//! dictionary whose keys follow a naming convention, or a fixed object
//! with named children. The record-vs-object decision is deliberately
//! biased toward the closed object shape: only the strong `snake_case` and
//! prefixed conventions are accepted as evidence of an open dictionary.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::collector::{SampleBucket, SampleSet};
use crate::config::PredictorConfig;
use crate::patterns::{KeyPattern, detect_key_pattern};
use crate::path::{FlatSegment, FlattenedPath};
use crate::relations::RelationTree;
use crate::value::{TypeTag, Value};

/// Recursive shape classification of one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StructuralPrediction {
    /// Scalar leaf
    Primitive {
        path: FlattenedPath,
        /// Tag of the first non-null sample; `None` when only nulls were
        /// observed.
        tag: Option<TypeTag>,
        nullable: bool,
    },
    /// List position
    Array {
        path: FlattenedPath,
        /// Recursively predicted element shape, when elements were observed.
        element: Option<Box<StructuralPrediction>>,
        /// Deepest nested-list chain observed.
        depth: usize,
        /// Leaf tags reachable through nested lists.
        item_tags: BTreeSet<TypeTag>,
        nullable: bool,
    },
    /// Open dictionary: keys follow a convention but are not individually
    /// fixed
    Record {
        path: FlattenedPath,
        key_pattern: KeyPattern,
        value_tags: BTreeSet<TypeTag>,
        /// Some value under a record key was explicitly null.
        value_nullable: bool,
        nullable: bool,
    },
    /// Fixed shape with named children
    Object {
        path: FlattenedPath,
        children: BTreeMap<String, StructuralChild>,
        nullable: bool,
    },
    /// Depth-cap degradation: unconstrained rather than unbounded
    Open { path: FlattenedPath },
}

/// A named child of a fixed object shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralChild {
    pub prediction: StructuralPrediction,
    /// Some observed value for this key was explicitly null.
    pub nullable: bool,
    /// Some sibling map omitted this key entirely.
    pub optional: bool,
}

impl StructuralPrediction {
    pub fn path(&self) -> &FlattenedPath {
        match self {
            StructuralPrediction::Primitive { path, .. }
            | StructuralPrediction::Array { path, .. }
            | StructuralPrediction::Record { path, .. }
            | StructuralPrediction::Object { path, .. }
            | StructuralPrediction::Open { path } => path,
        }
    }
}

/// Classifies path-tree nodes into structural predictions.
pub struct StructureAnalyzer<'a> {
    samples: &'a SampleSet,
    tree: &'a RelationTree,
    config: &'a PredictorConfig,
}

impl<'a> StructureAnalyzer<'a> {
    pub fn new(
        samples: &'a SampleSet,
        tree: &'a RelationTree,
        config: &'a PredictorConfig,
    ) -> Self {
        Self {
            samples,
            tree,
            config,
        }
    }

    /// Predict the structural shape of the root.
    pub fn predict(&self) -> StructuralPrediction {
        self.predict_node(&FlattenedPath::root(), 0)
    }

    fn predict_node(&self, path: &FlattenedPath, depth: usize) -> StructuralPrediction {
        if depth > self.config.max_depth {
            return StructuralPrediction::Open { path: path.clone() };
        }

        let children: Vec<&FlattenedPath> = self.tree.children(path).collect();
        let bucket = self.samples.get(path);
        let has_list_samples = bucket.is_some_and(SampleBucket::has_list);
        let nullable = bucket.is_some_and(SampleBucket::has_null);

        let wildcard_child = children
            .iter()
            .find(|c| matches!(c.last(), Some(FlatSegment::AnyIndex)))
            .copied();

        if wildcard_child.is_some() || has_list_samples {
            return self.predict_array(path, bucket, wildcard_child, depth, nullable);
        }

        if children.is_empty() {
            let tag = bucket
                .into_iter()
                .flat_map(|b| b.samples.iter())
                .find_map(Value::tag);
            return StructuralPrediction::Primitive {
                path: path.clone(),
                tag,
                nullable,
            };
        }

        if let Some(record) = self.try_record(path, &children, nullable) {
            return record;
        }

        self.predict_object(path, &children, bucket, depth, nullable)
    }

    fn predict_array(
        &self,
        path: &FlattenedPath,
        bucket: Option<&SampleBucket>,
        wildcard_child: Option<&FlattenedPath>,
        depth: usize,
        nullable: bool,
    ) -> StructuralPrediction {
        let element = wildcard_child
            .map(|child| Box::new(self.predict_node(child, depth + 1)));

        let mut item_tags = BTreeSet::new();
        let mut observed_depth = 0;
        if let Some(bucket) = bucket {
            let mut saw_null = false;
            for sample in &bucket.samples {
                if sample.is_list() {
                    observed_depth = observed_depth.max(sample.list_depth());
                    sample.collect_leaf_tags(&mut item_tags, &mut saw_null);
                }
            }
        }

        StructuralPrediction::Array {
            path: path.clone(),
            element,
            depth: observed_depth.max(1),
            item_tags,
            nullable,
        }
    }

    /// Apply the record-pattern test to a node's children.
    ///
    /// All conditions must hold; any failure falls through to the closed
    /// object classification.
    fn try_record(
        &self,
        path: &FlattenedPath,
        children: &[&FlattenedPath],
        nullable: bool,
    ) -> Option<StructuralPrediction> {
        if children.len() < self.config.record_min_keys {
            return None;
        }

        let keys: Vec<&str> = children
            .iter()
            .filter_map(|c| c.last().and_then(FlatSegment::as_key))
            .collect();
        if keys.len() != children.len() {
            return None;
        }

        let pattern = detect_key_pattern(&keys);
        if !pattern.supports_record() {
            return None;
        }

        // A record's values must be leaves: no child may carry nested
        // structure of its own.
        let mut tag_sets: Vec<BTreeSet<TypeTag>> = Vec::new();
        let mut distinct: Vec<&Value> = Vec::new();
        let mut value_nullable = false;
        for child in children {
            let has_children = self.tree.children(child).next().is_some();
            if has_children {
                return None;
            }
            let bucket = self.samples.get(child)?;
            if bucket.samples.is_empty() || bucket.has_list() {
                return None;
            }
            value_nullable |= bucket.has_null();
            let tags = bucket.sample_tags();
            if tags.is_empty() {
                return None;
            }
            for sample in &bucket.samples {
                if !sample.is_null() && !distinct.contains(&sample) {
                    distinct.push(sample);
                }
            }
            tag_sets.push(tags);
        }

        let all_identical = tag_sets.windows(2).all(|w| w[0] == w[1]);
        let compatible_family: BTreeSet<TypeTag> = [
            TypeTag::String,
            TypeTag::Number,
            TypeTag::Boolean,
            TypeTag::Object,
        ]
        .into_iter()
        .collect();
        let union: BTreeSet<TypeTag> = tag_sets.iter().flatten().copied().collect();
        if !all_identical && !union.is_subset(&compatible_family) {
            return None;
        }

        // A handful of constant sentinel fields reads as an object, not a
        // map.
        if distinct.len() <= 1 {
            return None;
        }

        Some(StructuralPrediction::Record {
            path: path.clone(),
            key_pattern: pattern,
            value_tags: union,
            value_nullable,
            nullable,
        })
    }

    fn predict_object(
        &self,
        path: &FlattenedPath,
        children: &[&FlattenedPath],
        bucket: Option<&SampleBucket>,
        depth: usize,
        nullable: bool,
    ) -> StructuralPrediction {
        let parent_occurrences = bucket.map(|b| b.occurrences).unwrap_or(0);

        let mut named = BTreeMap::new();
        for child in children {
            let Some(name) = child.last().and_then(FlatSegment::as_key) else {
                continue;
            };
            let child_bucket = self.samples.get(child);
            let child_nullable = child_bucket.is_some_and(SampleBucket::has_null);
            let child_occurrences = child_bucket.map(|b| b.occurrences).unwrap_or(0);

            named.insert(
                name.to_string(),
                StructuralChild {
                    prediction: self.predict_node(child, depth + 1),
                    nullable: child_nullable,
                    optional: child_occurrences < parent_occurrences,
                },
            );
        }

        StructuralPrediction::Object {
            path: path.clone(),
            children: named,
            nullable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(docs: &[&str]) -> StructuralPrediction {
        let mut samples = SampleSet::new();
        for doc in docs {
            samples.add_document(&Value::from_json(doc).unwrap());
        }
        let tree = RelationTree::build(&samples);
        let config = PredictorConfig::default();
        StructureAnalyzer::new(&samples, &tree, &config).predict()
    }

    fn child<'a>(prediction: &'a StructuralPrediction, name: &str) -> &'a StructuralChild {
        if let StructuralPrediction::Object { children, .. } = prediction {
            &children[name]
        } else {
            panic!("Expected object prediction");
        }
    }

    #[test]
    fn test_flat_object() {
        let prediction = analyze(&[r#"{"id": 1, "name": "John"}"#]);

        let id = child(&prediction, "id");
        match &id.prediction {
            StructuralPrediction::Primitive { tag, nullable, .. } => {
                assert_eq!(*tag, Some(TypeTag::Number));
                assert!(!nullable);
            }
            other => panic!("Expected primitive, got {other:?}"),
        }
    }

    #[test]
    fn test_mixed_value_types_stay_object() {
        // `id`/`name` are Word keys with heterogeneous values; never a
        // record.
        let prediction = analyze(&[r#"{"id": 1, "name": "John"}"#]);
        assert!(matches!(prediction, StructuralPrediction::Object { .. }));
    }

    #[test]
    fn test_snake_case_homogeneous_record() {
        let prediction = analyze(&[r#"{"theme_dark": true, "theme_light": false}"#]);
        match prediction {
            StructuralPrediction::Record {
                key_pattern,
                value_tags,
                ..
            } => {
                assert_eq!(key_pattern, KeyPattern::SnakeCase);
                assert_eq!(value_tags.into_iter().collect::<Vec<_>>(), vec![
                    TypeTag::Boolean
                ]);
            }
            other => panic!("Expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_record_tracks_null_values() {
        let prediction = analyze(&[
            r#"{"cfg_a": "x", "cfg_b": "y"}"#,
            r#"{"cfg_a": null}"#,
        ]);
        match prediction {
            StructuralPrediction::Record { value_nullable, .. } => {
                assert!(value_nullable);
            }
            other => panic!("Expected record, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_values_stay_object() {
        // One distinct sampled value reads as sentinel fields.
        let prediction = analyze(&[r#"{"flag_a": true, "flag_b": true}"#]);
        assert!(matches!(prediction, StructuralPrediction::Object { .. }));
    }

    #[test]
    fn test_word_keys_stay_object() {
        let prediction = analyze(&[r#"{"alpha": 1, "beta": 2}"#]);
        assert!(matches!(prediction, StructuralPrediction::Object { .. }));
    }

    #[test]
    fn test_nested_child_blocks_record() {
        let prediction =
            analyze(&[r#"{"item_a": {"x": 1}, "item_b": 2, "item_c": 3}"#]);
        assert!(matches!(prediction, StructuralPrediction::Object { .. }));
    }

    #[test]
    fn test_array_with_element_prediction() {
        let prediction = analyze(&[r#"{"scores": [85, 92, 78]}"#]);
        let scores = child(&prediction, "scores");
        match &scores.prediction {
            StructuralPrediction::Array {
                element,
                depth,
                item_tags,
                ..
            } => {
                assert_eq!(*depth, 1);
                assert!(item_tags.contains(&TypeTag::Number));
                match element.as_deref() {
                    Some(StructuralPrediction::Primitive { tag, .. }) => {
                        assert_eq!(*tag, Some(TypeTag::Number));
                    }
                    other => panic!("Expected primitive element, got {other:?}"),
                }
            }
            other => panic!("Expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_matrix_depth() {
        let prediction = analyze(&[r#"{"matrix": [[1, 2], [3, 4]]}"#]);
        let matrix = child(&prediction, "matrix");
        match &matrix.prediction {
            StructuralPrediction::Array { element, depth, .. } => {
                assert_eq!(*depth, 2);
                assert!(matches!(
                    element.as_deref(),
                    Some(StructuralPrediction::Array { .. })
                ));
            }
            other => panic!("Expected array, got {other:?}"),
        }
    }

    #[test]
    fn test_nullable_vs_optional_children() {
        let prediction = analyze(&[
            r#"{"v": "a", "w": 1}"#,
            r#"{"v": null}"#,
        ]);

        let v = child(&prediction, "v");
        assert!(v.nullable);
        assert!(!v.optional);

        let w = child(&prediction, "w");
        assert!(!w.nullable);
        assert!(w.optional);
    }

    #[test]
    fn test_depth_cap_degrades_to_open() {
        let mut doc = String::from("1");
        for _ in 0..12 {
            doc = format!(r#"{{"n": {doc}}}"#);
        }
        let mut samples = SampleSet::new();
        samples.add_document(&Value::from_json(&doc).unwrap());
        let tree = RelationTree::build(&samples);
        let config = PredictorConfig::builder().max_depth(5).build();
        let prediction = StructureAnalyzer::new(&samples, &tree, &config).predict();

        fn contains_open(p: &StructuralPrediction) -> bool {
            match p {
                StructuralPrediction::Open { .. } => true,
                StructuralPrediction::Object { children, .. } => children
                    .values()
                    .any(|c| contains_open(&c.prediction)),
                StructuralPrediction::Array { element, .. } => element
                    .as_deref()
                    .map(contains_open)
                    .unwrap_or(false),
                _ => false,
            }
        }
        assert!(contains_open(&prediction));
    }
}
