//! Identification of file formats by the magic number at the start of their contents.
//!
//! Nothing here touches the disk: [`classify`] only looks at the bytes it is given. Use
//! [`Path::file_kind`](crate::fs::path::Path::file_kind) to classify a file on disk.

use derive_more::{Display, IsVariant};


/// The number of leading bytes that [`classify`] needs to recognize every known format.
pub const MAGIC_LEN: usize = 8;

/// A coarse classification of a file's contents.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, IsVariant)]
pub enum FileKind {
    #[default]
    #[display("unknown")]
    Unknown,
    /// An `ar` style archive.
    #[display("archive")]
    Archive,
    /// Uncompressed bytecode.
    #[display("bytecode")]
    Bytecode,
    /// Compressed bytecode.
    #[display("compressed bytecode")]
    CompressedBytecode,
}

// Longer sequences come first, so that a magic number that happens to be a prefix of another can
// never shadow it.
const MAGIC_TABLE: &[(&[u8], FileKind)] = &[
    (b"!<arch>\n", FileKind::Archive),
    (b"llvc", FileKind::CompressedBytecode),
    (b"llvm", FileKind::Bytecode),
];

/// Classifies `bytes` by comparing its start against the known magic numbers. Input that is too
/// short for a magic number simply doesn't match it.
pub fn classify(bytes: &[u8]) -> FileKind {
    MAGIC_TABLE
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map_or(FileKind::Unknown, |(_, kind)| *kind)
}

const ELF_MAGIC: &[u8] = b"\x7fELF";
const ELF_TYPE_OFFSET: usize = 16;
const ELF_DATA_OFFSET: usize = 5;
const ELF_DATA_LSB: u8 = 1;
const ET_DYN: u16 = 3;

/// The number of leading bytes that [`is_shared_object`] inspects.
pub const ELF_HEADER_PREFIX_LEN: usize = ELF_TYPE_OFFSET + 2;

/// Whether `bytes` starts with the header of an ELF shared object (`ET_DYN`).
pub fn is_shared_object(bytes: &[u8]) -> bool {
    if bytes.len() < ELF_HEADER_PREFIX_LEN || !bytes.starts_with(ELF_MAGIC) {
        return false;
    }
    let raw = [bytes[ELF_TYPE_OFFSET], bytes[ELF_TYPE_OFFSET + 1]];
    let e_type = match bytes[ELF_DATA_OFFSET] {
        ELF_DATA_LSB => u16::from_le_bytes(raw),
        _ => u16::from_be_bytes(raw),
    };
    e_type == ET_DYN
}
