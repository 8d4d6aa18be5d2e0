//! Base types for structure of BA2 file.

use std::io::{Read, Seek};

use binrw::{BinRead, BinWrite};
use tracing::instrument;

use crate::cursor::BinaryCursor;
use crate::error::{Error, Result};

/// Signature every BA2 archive starts with
pub const MAGIC: [u8; 4] = *b"BTDX";

/// Size of the header on disk
pub const HEADER_SIZE: u64 = 24;

/// Size of a [`GeneralRecord`] on disk
pub const GENERAL_RECORD_SIZE: u64 = 36;

/// Size of a [`ChunkRecord`] on disk
pub const CHUNK_RECORD_SIZE: u64 = 24;

/// Layout of the record table following the header
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArchiveType {
    /// Plain files, optionally zlib compressed
    General,

    /// Textures stored as mip chunks
    Dx10,
}

impl ArchiveType {
    /// The four character tag identifying this type on disk
    pub const fn tag(self) -> [u8; 4] {
        match self {
            ArchiveType::General => *b"GNRL",
            ArchiveType::Dx10 => *b"DX10",
        }
    }
}

impl TryFrom<[u8; 4]> for ArchiveType {
    type Error = Error;

    fn try_from(value: [u8; 4]) -> Result<Self> {
        match &value {
            b"GNRL" => Ok(ArchiveType::General),
            b"DX10" => Ok(ArchiveType::Dx10),
            _ => Err(Error::UnknownType(value)),
        }
    }
}

impl std::fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ArchiveType::General => "general",
            ArchiveType::Dx10 => "dx10",
        })
    }
}

/// BA2 file header
///
/// Starts with "BTDX" followed by the version, the archive type tag, the number of files and
/// the absolute offset of the name table. All data is stored in little endian format.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Header {
    /// Format version, 1 in Fallout 4 archives
    pub version: u32,

    /// Which record table layout follows the header
    pub archive_type: ArchiveType,

    /// The number of records stored in the file
    pub file_count: u32,

    /// The offset from the beginning of the file where the name table starts
    pub name_table_offset: u64,
}

impl Header {
    /// Decode the header from the current position, leaving the cursor on the first record.
    #[instrument(skip(reader), err)]
    pub fn decode<R: Read + Seek + ?Sized>(reader: &mut R) -> Result<Header> {
        let magic = reader.read_tag()?;
        if magic != MAGIC {
            return Err(Error::BadMagic(magic));
        }

        let version = reader.read_le_u32()?;
        let archive_type = ArchiveType::try_from(reader.read_tag()?)?;
        let file_count = reader.read_le_u32()?;
        let name_table_offset = reader.read_le_u64()?;

        Ok(Header {
            version,
            archive_type,
            file_count,
            name_table_offset,
        })
    }
}

/// Entry of a general archive
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct GeneralRecord {
    /// Hash of the file name
    pub name_hash: u32,

    /// File extension without the dot, NUL padded
    pub extension: [u8; 4],

    /// Hash of the directory
    pub dir_hash: u32,

    pub flags: u32,

    /// Offset of the payload from the start of the file
    pub offset: u64,

    /// Size of the zlib stream, 0 when stored raw
    pub packed_len: u32,

    /// Size of the payload once inflated
    pub unpacked_len: u32,

    /// Usually `0xBAADF00D`. Holds the unpacked size when `unpacked_len` is 0.
    pub sentinel: u32,
}

impl GeneralRecord {
    /// Whether the payload is a zlib stream.
    ///
    /// A packed length equal to the unpacked length means compression did not help and the
    /// bytes were stored as they are.
    pub fn is_compressed(&self) -> bool {
        self.packed_len != 0 && self.packed_len != self.unpacked_len
    }

    /// Size of the payload after extraction
    pub fn size(&self) -> u32 {
        if self.is_compressed() && self.unpacked_len == 0 {
            self.sentinel
        } else {
            self.unpacked_len
        }
    }
}

/// One independently compressed slice of a texture's mip chain
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct ChunkRecord {
    /// Offset of the chunk from the start of the file
    pub offset: u64,

    /// Size of the zlib stream, 0 when stored raw
    pub packed_len: u32,

    /// Size of the mip data once inflated
    pub unpacked_len: u32,

    /// First mip level held by the chunk
    pub start_mip: u16,

    /// Last mip level held by the chunk
    pub end_mip: u16,

    pub reserved: u32,
}

impl ChunkRecord {
    pub fn is_compressed(&self) -> bool {
        self.packed_len != 0
    }
}

/// Entry of a DX10 archive
///
/// The fixed part is followed by `num_chunks` [`ChunkRecord`]s, so texture records have no
/// fixed stride and the table can only be read front to back.
#[derive(BinRead, BinWrite, Debug, Default, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct TextureRecord {
    /// Hash of the file name
    pub name_hash: u32,

    /// File extension without the dot, NUL padded
    pub extension: [u8; 4],

    /// Hash of the directory
    pub dir_hash: u32,

    pub unknown: u8,

    /// Number of chunk records that follow
    pub num_chunks: u8,

    /// Size of one chunk record, 24 in every known archive
    pub chunk_header_size: u16,

    pub height: u16,

    pub width: u16,

    pub num_mips: u8,

    /// DXGI_FORMAT code
    pub format: u8,

    pub reserved: u16,

    #[br(count = num_chunks)]
    pub chunks: Vec<ChunkRecord>,
}

impl TextureRecord {
    /// Size of the mip data once all chunks are inflated
    pub fn data_size(&self) -> u64 {
        self.chunks.iter().map(|c| c.unpacked_len as u64).sum()
    }
}
