//! Type-indicator constants and format categories.
//!
//! Mirrors `dfvfs.lib.definitions`: a closed set of string tags that name
//! back ends, plus the coarse format categories the analyzer groups them
//! into. The tags are part of the stable external contract (spec.md §6.1):
//! serialized path specs and `analyze()` results name back ends by these.

/// Type indicator for a node in a path specification chain.
///
/// This is the closed set from spec.md §3.1. Variants with no driver
/// ported in this crate still exist here: the resolver's dispatch table
/// simply has no row for them, which surfaces as
/// [`crate::error::NotSupported::UnknownBackEnd`] rather than a panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeIndicator {
    Os,
    Raw,
    Tsk,
    Ext,
    Ntfs,
    Hfs,
    Apfs,
    Fat,
    Xfs,
    TskPartition,
    Gpt,
    Apm,
    Lvm,
    ApfsContainer,
    Cs,
    Bde,
    Fvde,
    Luksde,
    Vshadow,
    Qcow,
    Vhdi,
    Vmdk,
    Modi,
    Phdi,
    Ewf,
    Cpio,
    Tar,
    Zip,
    Gzip,
    Bzip2,
    Xz,
    CompressedStream,
    EncryptedStream,
    EncodedStream,
    DataRange,
    SqliteBlob,
    Fake,
    Mount,
    Overlay,
}

impl TypeIndicator {
    /// Stable string name used in serialization and logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Os => "OS",
            Self::Raw => "RAW",
            Self::Tsk => "TSK",
            Self::Ext => "EXT",
            Self::Ntfs => "NTFS",
            Self::Hfs => "HFS",
            Self::Apfs => "APFS",
            Self::Fat => "FAT",
            Self::Xfs => "XFS",
            Self::TskPartition => "TSK_PARTITION",
            Self::Gpt => "GPT",
            Self::Apm => "APM",
            Self::Lvm => "LVM",
            Self::ApfsContainer => "APFS_CONTAINER",
            Self::Cs => "CS",
            Self::Bde => "BDE",
            Self::Fvde => "FVDE",
            Self::Luksde => "LUKSDE",
            Self::Vshadow => "VSHADOW",
            Self::Qcow => "QCOW",
            Self::Vhdi => "VHDI",
            Self::Vmdk => "VMDK",
            Self::Modi => "MODI",
            Self::Phdi => "PHDI",
            Self::Ewf => "EWF",
            Self::Cpio => "CPIO",
            Self::Tar => "TAR",
            Self::Zip => "ZIP",
            Self::Gzip => "GZIP",
            Self::Bzip2 => "BZIP2",
            Self::Xz => "XZ",
            Self::CompressedStream => "COMPRESSED_STREAM",
            Self::EncryptedStream => "ENCRYPTED_STREAM",
            Self::EncodedStream => "ENCODED_STREAM",
            Self::DataRange => "DATA_RANGE",
            Self::SqliteBlob => "SQLITE_BLOB",
            Self::Fake => "FAKE",
            Self::Mount => "MOUNT",
            Self::Overlay => "OVERLAY",
        }
    }

    /// Parses a type indicator from its stable string name.
    pub fn from_str(value: &str) -> Option<Self> {
        Some(match value {
            "OS" => Self::Os,
            "RAW" => Self::Raw,
            "TSK" => Self::Tsk,
            "EXT" => Self::Ext,
            "NTFS" => Self::Ntfs,
            "HFS" => Self::Hfs,
            "APFS" => Self::Apfs,
            "FAT" => Self::Fat,
            "XFS" => Self::Xfs,
            "TSK_PARTITION" => Self::TskPartition,
            "GPT" => Self::Gpt,
            "APM" => Self::Apm,
            "LVM" => Self::Lvm,
            "APFS_CONTAINER" => Self::ApfsContainer,
            "CS" => Self::Cs,
            "BDE" => Self::Bde,
            "FVDE" => Self::Fvde,
            "LUKSDE" => Self::Luksde,
            "VSHADOW" => Self::Vshadow,
            "QCOW" => Self::Qcow,
            "VHDI" => Self::Vhdi,
            "VMDK" => Self::Vmdk,
            "MODI" => Self::Modi,
            "PHDI" => Self::Phdi,
            "EWF" => Self::Ewf,
            "CPIO" => Self::Cpio,
            "TAR" => Self::Tar,
            "ZIP" => Self::Zip,
            "GZIP" => Self::Gzip,
            "BZIP2" => Self::Bzip2,
            "XZ" => Self::Xz,
            "COMPRESSED_STREAM" => Self::CompressedStream,
            "ENCRYPTED_STREAM" => Self::EncryptedStream,
            "ENCODED_STREAM" => Self::EncodedStream,
            "DATA_RANGE" => Self::DataRange,
            "SQLITE_BLOB" => Self::SqliteBlob,
            "FAKE" => Self::Fake,
            "MOUNT" => Self::Mount,
            "OVERLAY" => Self::Overlay,
            _ => return None,
        })
    }

    /// Root type indicators never take a parent; every other type requires one.
    pub const fn is_root(self) -> bool {
        matches!(self, Self::Os | Self::Fake | Self::Mount)
    }
}

impl std::fmt::Display for TypeIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse format classification used to scope the analyzer's per-category
/// scanner/specification-store caches (spec.md §4.3, §5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatCategory {
    FileSystem,
    VolumeSystem,
    StorageMediaImage,
    Archive,
    CompressedStream,
    EncryptedStream,
}

/// Default scan window (spec.md §4.3): the scanner looks at the first and
/// last `DEFAULT_SCAN_WINDOW` bytes of a stream for unbounded signatures.
pub const DEFAULT_SCAN_WINDOW: u64 = 64 * 1024;
