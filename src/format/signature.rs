//! Format specifications and signatures (spec.md §3.7, §4.3).
//!
//! Grounded on `dfvfs/analyzer/specification.py`: a `Specification` is an
//! identifier plus one or more `Signature`s, each a literal byte pattern
//! with an optional offset. Positive offsets count from the start,
//! negative from the end, `None` means "anywhere in the scan window".

/// A literal byte-string signature with an offset constraint.
#[derive(Debug, Clone)]
pub struct Signature {
    pub pattern: Vec<u8>,
    pub offset: Option<i64>,
    /// Assigned by `SpecificationStore::add_specification` as
    /// `"<format_id>:<n>"`, where `n` is the store-wide signature index.
    pub identifier: Option<String>,
}

impl Signature {
    pub fn new(pattern: impl Into<Vec<u8>>, offset: Option<i64>) -> Self {
        Signature { pattern: pattern.into(), offset, identifier: None }
    }
}

/// A named format with one or more signatures.
#[derive(Debug, Clone)]
pub struct Specification {
    pub identifier: String,
    pub signatures: Vec<Signature>,
}

impl Specification {
    pub fn new(identifier: impl Into<String>) -> Self {
        Specification { identifier: identifier.into(), signatures: Vec::new() }
    }

    pub fn with_signature(mut self, pattern: impl Into<Vec<u8>>, offset: Option<i64>) -> Self {
        self.signatures.push(Signature::new(pattern, offset));
        self
    }

    /// True when every signature of this spec has an explicit offset —
    /// the condition under which the offset-bound scanner (spec.md
    /// §4.3) may be used for it.
    pub fn is_offset_bound(&self) -> bool {
        !self.signatures.is_empty() && self.signatures.iter().all(|sig| sig.offset.is_some())
    }
}
