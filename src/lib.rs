//! Structural type inference and schema synthesis for self-describing
//! documents
//!
//! Given one or more sample documents built from a generic data model
//! (null, boolean, number, string, ordered list, keyed map, plus a few
//! runtime refinements), the engine infers a structural shape and
//! synthesizes a validator that accepts documents of that shape.
//!
//! ## Pipeline
//!
//! - **Sample collection** - group every observed value by its flattened
//!   path (list indices collapsed to a wildcard)
//! - **Relation analysis** - rebuild the parent/child tree among paths and
//!   classify each node as primitive, array, open dictionary or fixed
//!   object
//! - **Type prediction** - per path, unify observed runtime tags into a
//!   deterministic union with nullable/optional/array metadata, promoting
//!   repeated strings to closed enumerations
//! - **Schema synthesis** - recursively turn the structural shape into a
//!   composable validator tree
//!
//! ## Example
//!
//! ```rust
//! use type_predictor::{TypePredictor, Value};
//!
//! let mut predictor = TypePredictor::new();
//! predictor.add_json(r#"{"id": 1, "name": "Alice"}"#)?;
//! predictor.add_json(r#"{"id": 2}"#)?;
//!
//! let schema = predictor.predict();
//! assert!(schema.is_valid(&Value::from_json(r#"{"id": 3, "name": "C"}"#)?));
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod patterns;
pub mod path;
pub mod relations;
pub mod schema;
pub mod structure;
pub mod types;
pub mod value;

pub use collector::{SampleBucket, SampleSet};
pub use config::{PredictorConfig, PredictorConfigBuilder};
pub use engine::{Analysis, PathInfo, PredictorStats, TypePredictor, analyze, predict};
pub use error::ValidationError;
pub use patterns::{KeyPattern, detect_key_pattern};
pub use path::{AccessPath, FlatSegment, FlattenedPath, PathParseError, Segment};
pub use relations::{PathRelation, RelationTree};
pub use schema::{FieldSchema, Schema, SchemaSynthesizer};
pub use structure::{StructuralChild, StructuralPrediction, StructureAnalyzer};
pub use types::{TypePrediction, detect_enum_pattern, predict_types};
pub use value::{TypeTag, Value};
