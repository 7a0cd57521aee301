//! Format identification (spec.md component J): matches a file-like
//! object against registered format signatures to recover its type
//! indicator before a resolver helper is chosen for it.

pub mod helper;

pub use helper::Analyzer;
