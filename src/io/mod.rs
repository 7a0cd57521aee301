//! File-like object base contract and generic bounded views (spec.md
//! component E).

pub mod adapter;
pub mod bounded;
pub mod file_like;

pub use adapter::FileObjectCursor;
pub use bounded::{BoundedFileObject, InMemoryFileObject};
pub use file_like::{resolve_seek, FileLikeObject};
