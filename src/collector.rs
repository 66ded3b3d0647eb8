//! Sample collection
//!
//! Walks a document tree and groups every observed scalar and list value by
//! its flattened path. Lists are recorded twice: once as a whole (so the
//! position itself can be classified as an array) and once per element under
//! the wildcard segment (so element buckets accumulate across all elements
//! and across merged documents). Maps only mark the position as visited;
//! their shape is reconstructed later from the child paths.
//!
//! The descent is total over the value domain; collection cannot fail.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::path::{AccessPath, FlattenedPath, Segment};
use crate::value::Value;

/// Raw values observed at one flattened path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleBucket {
    /// Concrete segment sequence of the first observation of this position.
    pub access_key: AccessPath,
    /// Raw values in observation order. Maps visited at this position do not
    /// contribute samples, only occurrences.
    pub samples: Vec<Value>,
    /// Times this position was visited, map visits included. The shortfall
    /// against the parent position is what marks a key as optional.
    pub occurrences: usize,
}

impl SampleBucket {
    /// Tags of the non-null samples, in priority order.
    pub fn sample_tags(&self) -> std::collections::BTreeSet<crate::value::TypeTag> {
        self.samples.iter().filter_map(Value::tag).collect()
    }

    /// Whether any sample at this position is explicitly null.
    pub fn has_null(&self) -> bool {
        self.samples.iter().any(Value::is_null)
    }

    /// Whether any sample at this position is a list.
    pub fn has_list(&self) -> bool {
        self.samples.iter().any(Value::is_list)
    }
}

/// All sample buckets gathered from one or more documents.
///
/// Buckets are keyed by flattened path in a `BTreeMap` so iteration order,
/// and everything derived from it, is deterministic.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleSet {
    buckets: BTreeMap<FlattenedPath, SampleBucket>,
    document_count: usize,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the buckets of a single document.
    pub fn from_document(document: &Value) -> Self {
        let mut set = Self::new();
        set.add_document(document);
        set
    }

    /// Walk `document` and merge its samples into the existing buckets.
    ///
    /// Positions shared with previously added documents accumulate into the
    /// same buckets, which is what makes nullable/optional detection work
    /// across a corpus of samples.
    pub fn add_document(&mut self, document: &Value) {
        self.document_count += 1;
        let mut access = Vec::new();
        self.walk(document, &mut access, FlattenedPath::root());
    }

    fn walk(&mut self, value: &Value, access: &mut Vec<Segment>, flat: FlattenedPath) {
        match value {
            Value::Map(entries) => {
                self.touch(&flat, access);
                for (key, child) in entries {
                    access.push(Segment::Key(key.clone()));
                    self.walk(child, access, flat.child_key(key));
                    access.pop();
                }
            }
            Value::List(items) => {
                self.record(&flat, access, value);
                let element_path = flat.child_index();
                for (index, item) in items.iter().enumerate() {
                    access.push(Segment::Index(index));
                    self.walk(item, access, element_path.clone());
                    access.pop();
                }
            }
            leaf => {
                self.record(&flat, access, leaf);
            }
        }
    }

    /// Mark a position as visited without recording a sample.
    fn touch(&mut self, flat: &FlattenedPath, access: &[Segment]) {
        let bucket = self.bucket_mut(flat, access);
        bucket.occurrences += 1;
    }

    /// Append a raw sample at a position.
    fn record(&mut self, flat: &FlattenedPath, access: &[Segment], value: &Value) {
        let bucket = self.bucket_mut(flat, access);
        bucket.occurrences += 1;
        bucket.samples.push(value.clone());
    }

    fn bucket_mut(&mut self, flat: &FlattenedPath, access: &[Segment]) -> &mut SampleBucket {
        self.buckets.entry(flat.clone()).or_insert_with(|| SampleBucket {
            access_key: AccessPath(access.to_vec()),
            samples: Vec::new(),
            occurrences: 0,
        })
    }

    pub fn get(&self, path: &FlattenedPath) -> Option<&SampleBucket> {
        self.buckets.get(path)
    }

    pub fn buckets(&self) -> &BTreeMap<FlattenedPath, SampleBucket> {
        &self.buckets
    }

    /// Number of distinct flattened paths observed.
    pub fn path_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of documents merged into this set.
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeTag;

    fn doc(json: &str) -> Value {
        Value::from_json(json).unwrap()
    }

    fn path(rendered: &str) -> FlattenedPath {
        rendered.parse().unwrap()
    }

    #[test]
    fn test_collect_flat_object() {
        let samples = SampleSet::from_document(&doc(r#"{"name": "Alice", "age": 30}"#));

        let name = samples.get(&path("$.name")).unwrap();
        assert_eq!(name.samples, vec![Value::String("Alice".to_string())]);
        assert_eq!(name.access_key.to_string(), "$.name");

        // The root map is visited but contributes no sample.
        let root = samples.get(&FlattenedPath::root()).unwrap();
        assert!(root.samples.is_empty());
        assert_eq!(root.occurrences, 1);
    }

    #[test]
    fn test_list_recorded_whole_and_per_element() {
        let samples = SampleSet::from_document(&doc(r#"{"scores": [85, 92, 78]}"#));

        let whole = samples.get(&path("$.scores")).unwrap();
        assert_eq!(whole.samples.len(), 1);
        assert!(whole.samples[0].is_list());

        let elements = samples.get(&path("$.scores[]")).unwrap();
        assert_eq!(elements.samples.len(), 3);
        assert_eq!(elements.occurrences, 3);
        assert_eq!(elements.access_key.to_string(), "$.scores[0]");
        assert_eq!(
            elements.sample_tags().into_iter().collect::<Vec<_>>(),
            vec![TypeTag::Number]
        );
    }

    #[test]
    fn test_elements_accumulate_across_documents() {
        let mut samples = SampleSet::new();
        samples.add_document(&doc(r#"{"v": "a"}"#));
        samples.add_document(&doc(r#"{"v": null}"#));

        let bucket = samples.get(&path("$.v")).unwrap();
        assert_eq!(bucket.samples.len(), 2);
        assert!(bucket.has_null());
        assert_eq!(samples.document_count(), 2);
    }

    #[test]
    fn test_occurrence_shortfall_for_missing_key() {
        let mut samples = SampleSet::new();
        samples.add_document(&doc(r#"{"id": 1, "name": "A"}"#));
        samples.add_document(&doc(r#"{"id": 2}"#));

        let root = samples.get(&FlattenedPath::root()).unwrap();
        let name = samples.get(&path("$.name")).unwrap();
        assert_eq!(root.occurrences, 2);
        assert_eq!(name.occurrences, 1);
    }

    #[test]
    fn test_nested_matrix_paths() {
        let samples = SampleSet::from_document(&doc(r#"{"matrix": [[1, 2], [3, 4]]}"#));

        assert!(samples.get(&path("$.matrix")).is_some());
        let rows = samples.get(&path("$.matrix[]")).unwrap();
        assert_eq!(rows.samples.len(), 2);
        let cells = samples.get(&path("$.matrix[][]")).unwrap();
        assert_eq!(cells.samples.len(), 4);
    }

    #[test]
    fn test_scalar_root_is_recorded() {
        let samples = SampleSet::from_document(&Value::Number(5.0));
        let root = samples.get(&FlattenedPath::root()).unwrap();
        assert_eq!(root.samples, vec![Value::Number(5.0)]);
    }
}
