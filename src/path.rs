//! Access paths and flattened paths
//!
//! An access path records how a value was reached (`$.items[0].name`); a
//! flattened path collapses every list index to a wildcard marker so that
//! the same shape position is grouped across repeated elements and merged
//! documents (`$.items[].name`). Flattened paths are the grouping key for
//! the whole pipeline: created once during collection, never mutated.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Marker rendered for a collapsed list index.
pub const WILDCARD: &str = "[]";

/// One concrete step of an access path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Map key
    Key(String),
    /// Concrete list index
    Index(usize),
}

/// One step of a flattened path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlatSegment {
    /// Map key
    Key(String),
    /// Any list index (wildcard)
    AnyIndex,
}

impl FlatSegment {
    /// Map key name, if this segment is a key.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            FlatSegment::Key(key) => Some(key),
            FlatSegment::AnyIndex => None,
        }
    }
}

/// The concrete segment sequence of the first observation of a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccessPath(pub Vec<Segment>);

impl AccessPath {
    pub fn root() -> Self {
        AccessPath(Vec::new())
    }
}

impl std::fmt::Display for AccessPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

/// A path with every list index collapsed to the wildcard marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlattenedPath(Vec<FlatSegment>);

impl FlattenedPath {
    pub fn root() -> Self {
        FlattenedPath(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[FlatSegment] {
        &self.0
    }

    /// Returns a new path with `key` appended.
    pub fn child_key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(FlatSegment::Key(key.to_string()));
        FlattenedPath(segments)
    }

    /// Returns a new path with the wildcard index appended.
    pub fn child_index(&self) -> Self {
        let mut segments = self.0.clone();
        segments.push(FlatSegment::AnyIndex);
        FlattenedPath(segments)
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(FlattenedPath(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Final segment, or `None` for the root.
    pub fn last(&self) -> Option<&FlatSegment> {
        self.0.last()
    }
}

impl From<Vec<FlatSegment>> for FlattenedPath {
    fn from(segments: Vec<FlatSegment>) -> Self {
        FlattenedPath(segments)
    }
}

impl std::fmt::Display for FlattenedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$")?;
        for segment in &self.0 {
            match segment {
                FlatSegment::Key(key) => write!(f, ".{key}")?,
                FlatSegment::AnyIndex => write!(f, "{WILDCARD}")?,
            }
        }
        Ok(())
    }
}

// Paths serialize as their rendered string so analysis artifacts stay
// readable as JSON.
impl Serialize for FlattenedPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FlattenedPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rendered = String::deserialize(deserializer)?;
        rendered
            .parse()
            .map_err(|e: PathParseError| serde::de::Error::custom(e.0))
    }
}

impl Serialize for AccessPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Failure to parse a rendered flattened path.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PathParseError(String);

impl std::str::FromStr for FlattenedPath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('$')
            .ok_or_else(|| PathParseError(format!("path must start with `$`: {s}")))?;

        let mut segments = Vec::new();
        let mut rest = rest;
        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix(WILDCARD) {
                segments.push(FlatSegment::AnyIndex);
                rest = after;
            } else if let Some(after) = rest.strip_prefix('.') {
                // Key runs until the next `.` or wildcard marker.
                let end = after
                    .find(['.', '['])
                    .unwrap_or(after.len());
                if end == 0 {
                    return Err(PathParseError(format!("empty key in path: {s}")));
                }
                segments.push(FlatSegment::Key(after[..end].to_string()));
                rest = &after[end..];
            } else {
                return Err(PathParseError(format!("unexpected segment in path: {s}")));
            }
        }
        Ok(FlattenedPath(segments))
    }
}
