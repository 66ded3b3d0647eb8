//! Pipeline orchestration
//!
//! Runs collection, relation analysis, type prediction and schema
//! synthesis as a strict pipeline, each stage consuming only the prior
//! stage's output. Every stage is a pure, synchronous transformation over
//! immutable input; all intermediate structures live and die within one
//! `predict`/`analyze` call, so separate calls can run fully in parallel.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::collector::SampleSet;
use crate::config::PredictorConfig;
use crate::path::{AccessPath, FlattenedPath};
use crate::relations::RelationTree;
use crate::schema::{Schema, SchemaSynthesizer};
use crate::structure::{StructuralPrediction, StructureAnalyzer};
use crate::types::{TypePrediction, predict_types};
use crate::value::Value;

/// Inference artifacts for diagnostic use, short of schema synthesis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Every observed flattened path with its collection metadata.
    pub paths: Vec<PathInfo>,
    /// Structural shape of the root.
    pub structure: StructuralPrediction,
    /// Flat per-path type summaries.
    pub predictions: BTreeMap<FlattenedPath, TypePrediction>,
}

/// Collection metadata of one flattened path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathInfo {
    pub path: FlattenedPath,
    /// Concrete segment sequence of the first observation.
    pub access_key: AccessPath,
    pub sample_count: usize,
    pub occurrences: usize,
}

/// Aggregate counters over the documents fed into a predictor.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictorStats {
    /// Documents added
    pub documents_added: usize,
    /// Distinct flattened paths discovered
    pub paths_discovered: usize,
    /// Deepest flattened path observed
    pub max_path_depth: usize,
}

/// Structural type-inference engine.
///
/// Accumulates one or more sample documents and infers a schema that
/// accepts documents of their shape. Positions shared across documents
/// merge into the same sample buckets, which is how repeated samples
/// refine nullability, optionality and enumerations.
pub struct TypePredictor {
    config: PredictorConfig,
    samples: SampleSet,
}

impl TypePredictor {
    /// Create a predictor with default configuration
    pub fn new() -> Self {
        Self::with_config(PredictorConfig::default())
    }

    /// Create a predictor with custom configuration
    pub fn with_config(config: PredictorConfig) -> Self {
        Self {
            config,
            samples: SampleSet::new(),
        }
    }

    /// Add a sample document.
    pub fn add_value(&mut self, document: &Value) {
        self.samples.add_document(document);
        debug!(
            paths = self.samples.path_count(),
            documents = self.samples.document_count(),
            "collected sample document"
        );
    }

    /// Parse and add a JSON sample document.
    pub fn add_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let document = Value::from_json(json)?;
        self.add_value(&document);
        Ok(())
    }

    /// Number of documents added so far.
    pub fn document_count(&self) -> usize {
        self.samples.document_count()
    }

    /// Current aggregate counters.
    pub fn stats(&self) -> PredictorStats {
        PredictorStats {
            documents_added: self.samples.document_count(),
            paths_discovered: self.samples.path_count(),
            max_path_depth: self
                .samples
                .buckets()
                .keys()
                .map(FlattenedPath::len)
                .max()
                .unwrap_or(0),
        }
    }

    /// Infer a schema from everything added so far.
    ///
    /// With no documents added, the permissive schema is returned.
    pub fn predict(&self) -> Schema {
        if self.samples.is_empty() {
            return Schema::Any;
        }

        let tree = RelationTree::build(&self.samples);
        let predictions = predict_types(&self.samples, &tree, &self.config);
        let structure =
            StructureAnalyzer::new(&self.samples, &tree, &self.config).predict();
        debug!(
            paths = tree.len(),
            root = %structure.path(),
            "synthesizing schema"
        );
        SchemaSynthesizer::new(&predictions, &self.config).synthesize(&structure)
    }

    /// Run the pipeline but stop short of synthesis, returning the
    /// intermediate artifacts.
    pub fn analyze(&self) -> Analysis {
        let tree = RelationTree::build(&self.samples);
        let predictions = predict_types(&self.samples, &tree, &self.config);
        let structure =
            StructureAnalyzer::new(&self.samples, &tree, &self.config).predict();

        let paths = self
            .samples
            .buckets()
            .iter()
            .map(|(path, bucket)| PathInfo {
                path: path.clone(),
                access_key: bucket.access_key.clone(),
                sample_count: bucket.samples.len(),
                occurrences: bucket.occurrences,
            })
            .collect();

        Analysis {
            paths,
            structure,
            predictions,
        }
    }
}

impl Default for TypePredictor {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer a validator for a single document.
///
/// Trivial inputs short-circuit: null yields the null schema, an empty
/// list a permissive list, an empty map an empty fixed shape.
pub fn predict(document: &Value) -> Schema {
    match document {
        Value::Null => Schema::Null,
        Value::List(items) if items.is_empty() => Schema::ListOf(Box::new(Schema::Any)),
        Value::Map(entries) if entries.is_empty() => Schema::Shape {
            fields: BTreeMap::new(),
        },
        _ => {
            let mut predictor = TypePredictor::new();
            predictor.add_value(document);
            predictor.predict()
        }
    }
}

/// Run inference over a single document and return the intermediate
/// artifacts without synthesizing a schema.
pub fn analyze(document: &Value) -> Analysis {
    let mut predictor = TypePredictor::new();
    predictor.add_value(document);
    predictor.analyze()
}
