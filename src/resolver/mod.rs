//! Resolver, context cache, and mount-point manager (spec.md component
//! K): turns a path specification into an open file system or
//! file-like object, threading a [`Context`] so a chain of nested back
//! ends is only opened once per resolve call.

pub mod context;
pub mod helper;
pub mod mangler;

pub use context::Context;
pub use helper::{Helper, Resolver, ResolverError};
pub use mangler::MountPointManager;
