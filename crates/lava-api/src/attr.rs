//! Dotted attribute paths over validated instances.
//!
//! A path like `resource_limits.min_ram` is parsed once into segments and
//! then resolved against any [`ModelInstance`], descending through nested
//! models one hop at a time. Resolution does not consult the schema engine;
//! it only walks the instance tree it is given.

use crate::error::{Error, Result};
use crate::schema::{FieldValue, ModelInstance};

/// A parsed dotted path, e.g. `node_groups` or `resource_limits.min_ram`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrPath {
    raw: String,
    segments: Vec<String>,
}

impl AttrPath {
    /// Split a dotted path into segments. An empty string parses to an
    /// empty path, which resolves to nothing.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let segments = if path.is_empty() {
            Vec::new()
        } else {
            path.split('.').map(str::to_string).collect()
        };
        Self {
            raw: path.to_string(),
            segments,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk the path through `instance`, one segment per nested model hop.
    ///
    /// Fails with [`Error::MissingAttribute`] naming the first segment that
    /// is absent, or the segment at which the walk hits a non-model value
    /// with path left to consume.
    pub fn resolve<'a>(&self, instance: &'a ModelInstance) -> Result<&'a FieldValue> {
        let mut segments = self.segments.iter();
        let first = segments.next().ok_or_else(|| self.missing(""))?;
        let mut current = instance
            .get(first)
            .ok_or_else(|| self.missing(first))?;

        for segment in segments {
            let FieldValue::Model(inner) = current else {
                return Err(self.missing(segment));
            };
            current = inner.get(segment).ok_or_else(|| self.missing(segment))?;
        }
        Ok(current)
    }

    fn missing(&self, segment: &str) -> Error {
        Error::MissingAttribute {
            path: self.raw.clone(),
            segment: segment.to_string(),
        }
    }
}

impl std::fmt::Display for AttrPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType, Schema};
    use serde_json::json;
    use std::sync::LazyLock;

    // A self-referential schema gives us an arbitrarily deep tree to walk.
    static NODE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::new("Node")
            .field(FieldSpec::optional("value", FieldType::Int))
            .field(FieldSpec::optional("left", FieldType::Nested(&NODE)))
            .field(FieldSpec::optional("right", FieldType::Nested(&NODE)))
    });

    fn tree() -> ModelInstance {
        NODE.validate(&json!({
            "left": {"value": 1},
            "right": {
                "left": {"value": 2},
                "right": {"left": {"value": 3}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn resolves_single_and_multi_hop_paths() {
        let root = tree();
        assert_eq!(
            AttrPath::parse("left.value").resolve(&root).unwrap(),
            &FieldValue::Int(1)
        );
        assert_eq!(
            AttrPath::parse("right.left.value").resolve(&root).unwrap(),
            &FieldValue::Int(2)
        );
        assert_eq!(
            AttrPath::parse("right.right.left.value")
                .resolve(&root)
                .unwrap(),
            &FieldValue::Int(3)
        );
    }

    #[test]
    fn missing_segment_names_the_hop() {
        let root = tree();
        match AttrPath::parse("left.sibling").resolve(&root) {
            Err(Error::MissingAttribute { path, segment }) => {
                assert_eq!(path, "left.sibling");
                assert_eq!(segment, "sibling");
            }
            other => panic!("expected MissingAttribute, got {other:?}"),
        }
    }

    #[test]
    fn descent_through_a_leaf_fails() {
        let root = tree();
        // left.value is an Int; there is nothing under it to descend into.
        let err = AttrPath::parse("left.value.deeper")
            .resolve(&root)
            .unwrap_err();
        assert!(matches!(err, Error::MissingAttribute { .. }));
    }

    #[test]
    fn empty_path_resolves_to_nothing() {
        let root = tree();
        assert!(AttrPath::parse("").resolve(&root).is_err());
        assert!(AttrPath::parse("").segments().is_empty());
    }

    #[test]
    fn parse_is_stable() {
        let path = AttrPath::parse("a.b.c");
        assert_eq!(path.segments(), ["a", "b", "c"]);
        assert_eq!(path.to_string(), "a.b.c");
    }
}
