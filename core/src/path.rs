//! Field paths for error reporting.
//!
//! A [`FieldPath`] records how the matcher descended from the top-level
//! record into the value that failed: named fields, sequence indices and
//! mapping keys. It renders as `car.year`, `city[0].country` or
//! `labels["en"]`.

use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field of a record.
    Field(String),
    /// An element of a sequence.
    Index(usize),
    /// An entry of a mapping, addressed by key.
    Key(String),
}

/// Location of a value inside a record, from the root down.
///
/// # Examples
///
/// ```
/// use record_schema_core::FieldPath;
///
/// let path = FieldPath::root().field("city").index(0).field("country");
/// assert_eq!(path.to_string(), "city[0].country");
///
/// let path = FieldPath::root().field("labels").key("en");
/// assert_eq!(path.to_string(), r#"labels["en"]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path, pointing at the record itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path extended by a named field.
    pub fn field(&self, name: &str) -> Self {
        self.with(PathSegment::Field(name.to_string()))
    }

    /// Returns a new path extended by a sequence index.
    pub fn index(&self, index: usize) -> Self {
        self.with(PathSegment::Index(index))
    }

    /// Returns a new path extended by a mapping key.
    pub fn key(&self, key: &str) -> Self {
        self.with(PathSegment::Key(key.to_string()))
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path segments from the root down.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}
