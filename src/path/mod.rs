//! The path-specification model (spec.md §4.1).
//!
//! A [`PathSpec`] is an immutable, composable locator: a typed chain of
//! nodes that names any object regardless of nesting depth, from a bare OS
//! file up through partitions, volumes, encrypted containers, and archive
//! members.

pub mod factory;
pub mod serialize;
pub mod spec;

pub use factory::{Factory, FactoryError};
pub use spec::{AttributeValue, PathSpec};
