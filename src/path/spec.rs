//! The path specification: an immutable, composable locator chain.
//!
//! Grounded on `dfvfs/path/tsk_partition_path_spec.py` and
//! `dfvfs/path/lvm_path_spec.py` (see `examples/original_source`):
//! a node carries a type indicator, an optional parent, and a handful of
//! type-specific attributes; equality and hashing are defined entirely by
//! the `comparable` string. Rather than the original's one-class-per-type
//! hierarchy, attributes are stored generically and validated against a
//! per-type allow-list (spec.md §9 "Path specs as sum types" design note).

use std::collections::BTreeMap;
use std::fmt;

use crate::definitions::TypeIndicator;
use crate::error::PathSpecError;

/// A single path specification attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Bytes(Vec<u8>),
    Bool(bool),
}

impl AttributeValue {
    fn comparable(&self, offset_style: bool) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(n) if offset_style => format!("0x{:08x}", n),
            Self::Int(n) => n.to_string(),
            Self::Bytes(b) => b.iter().map(|byte| format!("\\x{byte:02x}")).collect(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Attribute names whose integer value is rendered as `0x%08x` rather than
/// decimal in the comparable form (spec.md §4.1).
const OFFSET_ATTRIBUTES: &[&str] = &["start_offset", "range_offset"];

/// A node in a path specification chain.
///
/// Cloning is cheap-ish (it deep-clones the parent chain) and is how
/// [`PathSpec::copy_with`] implements "copy with substitutions": the chain
/// is immutable once built, so producing a modified variant always means
/// building a new value.
#[derive(Debug, Clone)]
pub struct PathSpec {
    type_indicator: TypeIndicator,
    parent: Option<Box<PathSpec>>,
    attributes: BTreeMap<&'static str, AttributeValue>,
}

/// Known attribute names and which type indicators may carry them.
/// `&[]` means "any type with a parent may use this name" is *not* implied;
/// every name is still checked against the type's allow-list below.
fn allowed_attributes(type_indicator: TypeIndicator) -> &'static [&'static str] {
    use TypeIndicator::*;
    match type_indicator {
        Os | Fake | Mount => &["location"],
        Raw => &[],
        DataRange => &["range_offset", "range_size"],
        Tsk | Ext | Ntfs | Hfs | Apfs | Fat | Xfs => &["location", "inode", "identifier"],
        TskPartition => &["location", "volume_index", "start_offset"],
        Gpt | Apm => &["location", "volume_index"],
        Lvm | ApfsContainer | Cs => &["location", "volume_index"],
        Vshadow => &["location", "volume_index"],
        Bde | Fvde | Luksde => &["location", "encryption_method"],
        Qcow | Vhdi | Vmdk | Modi | Phdi | Ewf => &[],
        Cpio | Tar | Zip => &["location", "data_stream"],
        Gzip | Bzip2 | Xz => &[],
        CompressedStream => &["compression_method"],
        EncryptedStream => &["encryption_method"],
        EncodedStream => &["encoding_method"],
        SqliteBlob => &["table_name", "column_name", "row_index", "row_condition"],
        Overlay => &["location"],
    }
}

impl PathSpec {
    /// Constructs a new path specification node.
    ///
    /// Validates the invariants from spec.md §4.1: container types require
    /// a parent, root types (`OS`/`FAKE`/`MOUNT`) reject one, and every
    /// attribute name must be in the type's allow-list.
    pub fn new(
        type_indicator: TypeIndicator,
        parent: Option<PathSpec>,
        attributes: impl IntoIterator<Item = (&'static str, AttributeValue)>,
    ) -> Result<PathSpec, PathSpecError> {
        if type_indicator.is_root() && parent.is_some() {
            return Err(PathSpecError::UnexpectedParent {
                type_indicator: type_indicator.as_str(),
            });
        }
        if !type_indicator.is_root() && parent.is_none() {
            return Err(PathSpecError::MissingParent {
                type_indicator: type_indicator.as_str(),
            });
        }

        let allowed = allowed_attributes(type_indicator);
        let mut map = BTreeMap::new();
        for (name, value) in attributes {
            if !allowed.contains(&name) {
                return Err(PathSpecError::UnknownAttribute {
                    type_indicator: type_indicator.as_str(),
                    attribute: name.to_string(),
                });
            }
            map.insert(name, value);
        }

        Ok(PathSpec { type_indicator, parent: parent.map(Box::new), attributes: map })
    }

    pub fn type_indicator(&self) -> TypeIndicator {
        self.type_indicator
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn get_parent(&self) -> Option<&PathSpec> {
        self.parent.as_deref()
    }

    /// Walks to the outermost (root) node of the chain.
    pub fn get_root(&self) -> &PathSpec {
        let mut current = self;
        while let Some(parent) = &current.parent {
            current = parent;
        }
        current
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    pub fn location(&self) -> Option<&str> {
        match self.attribute("location") {
            Some(AttributeValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn int_attribute(&self, name: &str) -> Option<i64> {
        match self.attribute(name) {
            Some(AttributeValue::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns a new chain with the leaf node's named attributes replaced.
    /// Unknown names are rejected just like [`PathSpec::new`].
    pub fn copy_with(
        &self,
        overrides: impl IntoIterator<Item = (&'static str, AttributeValue)>,
    ) -> Result<PathSpec, PathSpecError> {
        let allowed = allowed_attributes(self.type_indicator);
        let mut attributes = self.attributes.clone();
        for (name, value) in overrides {
            if !allowed.contains(&name) {
                return Err(PathSpecError::UnknownAttribute {
                    type_indicator: self.type_indicator.as_str(),
                    attribute: name.to_string(),
                });
            }
            attributes.insert(name, value);
        }
        Ok(PathSpec { type_indicator: self.type_indicator, parent: self.parent.clone(), attributes })
    }

    /// The canonical string form used for equality, hashing, and resolver
    /// cache keys (spec.md §4.1, §3.1 invariant (c)).
    ///
    /// One line per node, root first, each line
    /// `"type: <T>, attr1: v1, attr2: v2"`, joined by `\n`. Attribute
    /// iteration order is the `BTreeMap`'s lexicographic key order, so two
    /// specs built with attributes supplied in different orders compare
    /// equal.
    pub fn comparable(&self) -> String {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(node) = current {
            chain.push(node);
            current = node.parent.as_deref();
        }
        chain.reverse();

        chain
            .into_iter()
            .map(|node| {
                let mut parts = vec![format!("type: {}", node.type_indicator.as_str())];
                for (name, value) in &node.attributes {
                    let offset_style = OFFSET_ATTRIBUTES.contains(name);
                    parts.push(format!("{name}: {}", value.comparable(offset_style)));
                }
                parts.join(", ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PartialEq for PathSpec {
    fn eq(&self, other: &Self) -> bool {
        self.comparable() == other.comparable()
    }
}

impl Eq for PathSpec {}

impl std::hash::Hash for PathSpec {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.comparable().hash(state);
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.comparable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::TypeIndicator::*;

    #[test]
    fn root_type_rejects_parent() {
        let os = PathSpec::new(Os, None, [("location", "foo".into())]).unwrap();
        let err = PathSpec::new(Os, Some(os), []).unwrap_err();
        assert!(matches!(err, PathSpecError::UnexpectedParent { .. }));
    }

    #[test]
    fn container_requires_parent() {
        let err = PathSpec::new(Tar, None, [("location", "/x".into())]).unwrap_err();
        assert!(matches!(err, PathSpecError::MissingParent { .. }));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let os = PathSpec::new(Os, None, [("location", "foo".into())]);
        let err = PathSpec::new(Os, None, [("bogus", "x".into())]);
        assert!(os.is_ok());
        assert!(matches!(err.unwrap_err(), PathSpecError::UnknownAttribute { .. }));
    }

    #[test]
    fn comparable_is_order_independent() {
        let parent = PathSpec::new(Os, None, [("location", "/img.raw".into())]).unwrap();
        let a = PathSpec::new(
            TskPartition,
            Some(parent.clone()),
            [("location", "/p2".into()), ("volume_index", 1i64.into())],
        )
        .unwrap();
        let b = PathSpec::new(
            TskPartition,
            Some(parent),
            [("volume_index", 1i64.into()), ("location", "/p2".into())],
        )
        .unwrap();
        assert_eq!(a.comparable(), b.comparable());
        assert_eq!(a, b);
    }

    #[test]
    fn comparable_nests_root_first() {
        let os = PathSpec::new(Os, None, [("location", "/img.raw".into())]).unwrap();
        let raw = PathSpec::new(Raw, Some(os), []).unwrap();
        let comparable = raw.comparable();
        let lines: Vec<_> = comparable.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("type: OS"));
        assert!(lines[1].starts_with("type: RAW"));
    }

    #[test]
    fn offset_attribute_is_hex_formatted() {
        let os = PathSpec::new(Os, None, [("location", "/img.raw".into())]).unwrap();
        let part = PathSpec::new(
            TskPartition,
            Some(os),
            [("location", "/p1".into()), ("start_offset", 512i64.into())],
        )
        .unwrap();
        assert!(part.comparable().contains("start_offset: 0x00000200"));
    }

    #[test]
    fn copy_with_replaces_leaf_attribute() {
        let os = PathSpec::new(Os, None, [("location", "/a.raw".into())]).unwrap();
        let moved = os.copy_with([("location", "/b.raw".into())]).unwrap();
        assert_eq!(moved.location(), Some("/b.raw"));
    }
}
