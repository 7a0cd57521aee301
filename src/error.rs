//! Unified error taxonomy for the crate.
//!
//! Each concern gets its own plain `enum` in the spirit of the teacher's
//! `vfs::Error`/`parser::Error` types: no `anyhow`, no `thiserror` derive
//! macro, manual `Display` impls, and a single top-level [`Error`] that
//! every module's `Result` alias collapses into at its public boundary.

use std::fmt;
use std::io;

/// Credential name, used by [`NotSupported::MissingCredentials`].
pub type CredentialName = &'static str;

/// Malformed or incompatible path specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpecError {
    /// A container type indicator was constructed without a parent.
    MissingParent { type_indicator: &'static str },
    /// A root type indicator (OS/FAKE/MOUNT) was constructed with a parent.
    UnexpectedParent { type_indicator: &'static str },
    /// An attribute name is not valid for the type indicator it was given to.
    UnknownAttribute { type_indicator: &'static str, attribute: String },
    /// The serialized form could not be parsed back into a path spec.
    Malformed(String),
}

impl fmt::Display for PathSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParent { type_indicator } => {
                write!(f, "path spec of type {type_indicator} requires a parent")
            }
            Self::UnexpectedParent { type_indicator } => {
                write!(f, "path spec of type {type_indicator} must not have a parent")
            }
            Self::UnknownAttribute { type_indicator, attribute } => {
                write!(f, "unknown attribute {attribute:?} for type {type_indicator}")
            }
            Self::Malformed(reason) => write!(f, "malformed path specification: {reason}"),
        }
    }
}

impl std::error::Error for PathSpecError {}

/// A format driver reported an error while decoding its backing format.
#[derive(Debug)]
pub enum BackEndError {
    /// Required metadata (e.g. a partition table, a volume-group header)
    /// could not be found or parsed.
    MissingMetadata(String),
    /// The backing structure is corrupt beyond what the driver tolerates.
    CorruptStructure(String),
    /// The underlying library/algorithm failed for a reason not covered above.
    Failure(String),
}

impl fmt::Display for BackEndError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetadata(m) => write!(f, "missing metadata: {m}"),
            Self::CorruptStructure(m) => write!(f, "corrupt structure: {m}"),
            Self::Failure(m) => write!(f, "back end failure: {m}"),
        }
    }
}

impl std::error::Error for BackEndError {}

/// Permission denied by the host OS or a parent back end.
#[derive(Debug)]
pub struct AccessError(pub String);

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "access denied: {}", self.0)
    }
}

impl std::error::Error for AccessError {}

/// The requested operation is unavailable on this back end.
#[derive(Debug)]
pub enum NotSupported {
    /// Write access was requested; this crate is read-only end to end.
    ReadOnly,
    /// The type indicator has no registered resolver helper.
    UnknownBackEnd(&'static str),
    /// An encrypted back end is missing one or more credentials.
    MissingCredentials(Vec<CredentialName>),
    /// The operation is simply not implemented by this driver.
    Unimplemented(&'static str),
}

impl fmt::Display for NotSupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "write access is not supported"),
            Self::UnknownBackEnd(t) => write!(f, "no resolver helper registered for {t}"),
            Self::MissingCredentials(names) => {
                write!(f, "missing credentials: {}", names.join(", "))
            }
            Self::Unimplemented(what) => write!(f, "not supported: {what}"),
        }
    }
}

impl std::error::Error for NotSupported {}

/// The resolver context's cache limit was exceeded.
#[derive(Debug)]
pub struct CacheFullError {
    pub capacity: usize,
}

impl fmt::Display for CacheFullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resolver cache exceeded its capacity of {}", self.capacity)
    }
}

impl std::error::Error for CacheFullError {}

/// A credential value was ill-typed for the name it was stored under.
#[derive(Debug)]
pub struct KeyChainError(pub String);

impl fmt::Display for KeyChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key chain error: {}", self.0)
    }
}

impl std::error::Error for KeyChainError {}

/// An underlying read/seek failed.
#[derive(Debug)]
pub struct IoError {
    pub offset: Option<u64>,
    pub source: io::Error,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "I/O error at offset {offset:#x}: {}", self.source),
            None => write!(f, "I/O error: {}", self.source),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// The scanner encountered malformed signature tables or an internal
/// inconsistency.
#[derive(Debug)]
pub struct FormatError(pub String);

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "format error: {}", self.0)
    }
}

impl std::error::Error for FormatError {}

/// The crate-wide error type. Every concern-specific error converts into
/// this without losing its identity; boundary crossings add context by
/// wrapping, never by discarding the original cause.
#[derive(Debug)]
pub enum Error {
    PathSpec(PathSpecError),
    BackEnd(BackEndError),
    Access(AccessError),
    NotSupported(NotSupported),
    CacheFull(CacheFullError),
    KeyChain(KeyChainError),
    Io(IoError),
    Format(FormatError),
    /// Context added while propagating: `(context, cause)`.
    Context(String, Box<Error>),
}

impl Error {
    /// Wraps `self` with additional context (e.g. the path spec being
    /// resolved, or the offset at which a failure occurred) without
    /// discarding the original error.
    pub fn with_context(self, context: impl Into<String>) -> Error {
        Error::Context(context.into(), Box::new(self))
    }

    pub fn io(offset: Option<u64>, source: io::Error) -> Error {
        Error::Io(IoError { offset, source })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathSpec(e) => write!(f, "{e}"),
            Self::BackEnd(e) => write!(f, "{e}"),
            Self::Access(e) => write!(f, "{e}"),
            Self::NotSupported(e) => write!(f, "{e}"),
            Self::CacheFull(e) => write!(f, "{e}"),
            Self::KeyChain(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "{e}"),
            Self::Format(e) => write!(f, "{e}"),
            Self::Context(context, cause) => write!(f, "{context}: {cause}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PathSpec(e) => Some(e),
            Self::BackEnd(e) => Some(e),
            Self::Access(e) => Some(e),
            Self::NotSupported(e) => Some(e),
            Self::CacheFull(e) => Some(e),
            Self::KeyChain(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Format(e) => Some(e),
            Self::Context(_, cause) => Some(cause.as_ref()),
        }
    }
}

macro_rules! from_variant {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Error {
            fn from(value: $ty) -> Self {
                Error::$variant(value)
            }
        }
    };
}

from_variant!(PathSpec, PathSpecError);
from_variant!(BackEnd, BackEndError);
from_variant!(Access, AccessError);
from_variant!(NotSupported, NotSupported);
from_variant!(CacheFull, CacheFullError);
from_variant!(KeyChain, KeyChainError);
from_variant!(Io, IoError);
from_variant!(Format, FormatError);

impl From<io::Error> for Error {
    fn from(source: io::Error) -> Self {
        Error::io(None, source)
    }
}

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
