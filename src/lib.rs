//! Read-only, layered access to forensic storage artifacts (disk
//! images, partitions, volume managers, encrypted containers,
//! compressed streams, archives) as a single virtual file system.
//!
//! A caller builds a [`path::PathSpec`] chain describing where the
//! bytes they want actually live — "the TAR member at `/etc/passwd`
//! inside the GZIP stream inside partition 2 of this raw disk image" —
//! and resolves it through a [`resolver::Resolver`] to a
//! [`io::FileLikeObject`] or [`vfs::FileEntry`], without caring how many
//! layers of nesting separate the two. [`analyzer::Analyzer`] recovers
//! the type indicator for an unlabeled stream by matching it against
//! registered [`format::Signature`]s, so a path spec chain can be built
//! up automatically from raw bytes rather than hand-constructed.
//!
//! Every format driver under [`drivers`] implements the same
//! [`resolver::Helper`] contract, which is what lets the layers above
//! this module — the resolver, the analyzer, the VFS tree walkers —
//! stay entirely format agnostic.

pub mod analyzer;
pub mod config;
pub mod credentials;
pub mod definitions;
pub mod drivers;
pub mod error;
pub mod format;
pub mod io;
pub mod path;
pub mod resolver;
pub mod vfs;

pub use analyzer::Analyzer;
pub use definitions::{FormatCategory, TypeIndicator};
pub use drivers::register_default_helpers;
pub use error::{Error, Result};
pub use path::PathSpec;
pub use resolver::{Context, Resolver};

/// Builds a [`Resolver`] with every format driver this crate ships
/// already registered (spec.md §5's default resolver configuration),
/// the equivalent of `dfvfs.resolver.Resolver` being ready to use as
/// soon as its module is imported.
pub fn default_resolver() -> Resolver {
    let resolver = Resolver::new();
    register_default_helpers(&resolver);
    resolver
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::TypeIndicator;

    #[test]
    fn default_resolver_reads_a_plain_os_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("leaf.txt");
        std::fs::write(&file_path, b"hello forensic world").unwrap();

        let resolver = default_resolver();
        let context = Context::new();
        let path_spec = PathSpec::new(TypeIndicator::Os, None, [("location", file_path.to_string_lossy().into_owned().into())]).unwrap();

        let object = resolver.open_file_object(&path_spec, &context).unwrap();
        let data = object.lock().unwrap().read_to_end().unwrap();
        assert_eq!(data, b"hello forensic world");
    }
}
