//! Parent/child reconstruction over flattened paths
//!
//! Sample buckets arrive as a flat map keyed by path; the analyzer needs
//! the tree those paths span. Every observed path and every ancestor of one
//! (map positions record no sample but still shape the tree) gets exactly
//! one node; the root is the empty path and has no parent.

use std::collections::{BTreeMap, BTreeSet};

use crate::collector::SampleSet;
use crate::path::{FlatSegment, FlattenedPath};

/// One node of the reconstructed path tree.
#[derive(Debug, Clone)]
pub struct PathRelation {
    pub path: FlattenedPath,
    /// Final segment, `None` for the root.
    pub key: Option<FlatSegment>,
    /// Parent path, `None` for the root.
    pub parent: Option<FlattenedPath>,
    pub children: BTreeSet<FlattenedPath>,
}

/// The tree spanned by all observed flattened paths.
#[derive(Debug, Clone, Default)]
pub struct RelationTree {
    nodes: BTreeMap<FlattenedPath, PathRelation>,
}

impl RelationTree {
    /// Build the tree from a sample set.
    ///
    /// The root node always exists, even for an empty set, so analysis has
    /// a well-defined starting point.
    pub fn build(samples: &SampleSet) -> Self {
        let mut tree = RelationTree::default();
        tree.insert(FlattenedPath::root());
        for path in samples.buckets().keys() {
            tree.insert_with_ancestors(path);
        }
        tree
    }

    fn insert_with_ancestors(&mut self, path: &FlattenedPath) {
        let mut current = path.clone();
        self.insert(current.clone());
        while let Some(parent) = current.parent() {
            self.insert(parent.clone());
            if let Some(node) = self.nodes.get_mut(&parent) {
                node.children.insert(current.clone());
            }
            current = parent;
        }
    }

    fn insert(&mut self, path: FlattenedPath) {
        if self.nodes.contains_key(&path) {
            return;
        }
        let relation = PathRelation {
            key: path.last().cloned(),
            parent: path.parent(),
            children: BTreeSet::new(),
            path: path.clone(),
        };
        self.nodes.insert(path, relation);
    }

    pub fn get(&self, path: &FlattenedPath) -> Option<&PathRelation> {
        self.nodes.get(path)
    }

    pub fn root(&self) -> &PathRelation {
        // Inserted unconditionally in `build`.
        &self.nodes[&FlattenedPath::root()]
    }

    /// Child paths of a node, empty if the path is unknown.
    pub fn children(&self, path: &FlattenedPath) -> impl Iterator<Item = &FlattenedPath> {
        self.nodes
            .get(path)
            .map(|node| node.children.iter())
            .into_iter()
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FlattenedPath, &PathRelation)> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn tree_for(json: &str) -> RelationTree {
        let doc = Value::from_json(json).unwrap();
        RelationTree::build(&SampleSet::from_document(&doc))
    }

    fn path(rendered: &str) -> FlattenedPath {
        rendered.parse().unwrap()
    }

    #[test]
    fn test_root_has_no_parent() {
        let tree = tree_for(r#"{"a": 1}"#);
        let root = tree.root();
        assert!(root.parent.is_none());
        assert!(root.key.is_none());
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_every_non_root_has_one_parent() {
        let tree = tree_for(r#"{"a": {"b": [1, 2]}, "c": "x"}"#);
        for (p, node) in tree.iter() {
            if p.is_root() {
                assert!(node.parent.is_none());
            } else {
                let parent = node.parent.clone().unwrap();
                assert!(tree.get(&parent).unwrap().children.contains(p));
            }
        }
    }

    #[test]
    fn test_wildcard_children() {
        let tree = tree_for(r#"{"items": [{"name": "a"}]}"#);
        let items = tree.get(&path("$.items")).unwrap();
        assert_eq!(items.children.len(), 1);
        assert!(items.children.contains(&path("$.items[]")));

        let element = tree.get(&path("$.items[]")).unwrap();
        assert_eq!(element.key, Some(FlatSegment::AnyIndex));
        assert!(element.children.contains(&path("$.items[].name")));
    }

    #[test]
    fn test_empty_set_still_has_root() {
        let tree = RelationTree::build(&SampleSet::new());
        assert_eq!(tree.len(), 1);
        assert!(tree.root().children.is_empty());
    }
}
