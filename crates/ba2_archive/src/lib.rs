//! This library handles reading and extracting **BA2** archives used by *Fallout 4*.
//!
//! # BA2 Archive Format Documentation
//!
//! A BA2 file (magic `BTDX`) is either a *general* archive holding arbitrary files, or a *DX10*
//! archive holding textures whose DDS headers were stripped and whose mip chains were split into
//! chunks. Both kinds share the same header and the same trailing name table.
//!
//! ## File Structure
//!
//! A BA2 file consists of a header, a record table, the payloads and finally a name table.
//!
//! | Offset (bytes) | Field             | Description                                          |
//! |----------------|-------------------|------------------------------------------------------|
//! | 0x0000         | Magic number      | 4 bytes: `BTDX`                                      |
//! | 0x0004         | Version           | 4 bytes: Format version, 1 in Fallout 4 archives     |
//! | 0x0008         | Type              | 4 bytes: `GNRL` or `DX10`                            |
//! | 0x000C         | File Count        | 4 bytes: Number of records                           |
//! | 0x0010         | Name Table Offset | 8 bytes: Absolute offset of the name table           |
//!
//! ### General Records
//!
//! Each record of a `GNRL` archive is 36 bytes long.
//!
//! | Offset (bytes) | Field         | Description                                              |
//! |----------------|---------------|----------------------------------------------------------|
//! | 0x0000         | Name Hash     | 4 bytes                                                  |
//! | 0x0004         | Extension     | 4 bytes: Extension without the dot, NUL padded           |
//! | 0x0008         | Dir Hash      | 4 bytes                                                  |
//! | 0x000C         | Flags         | 4 bytes                                                  |
//! | 0x0010         | Offset        | 8 bytes: Absolute offset of the payload                  |
//! | 0x0018         | Packed Size   | 4 bytes: Size of the zlib stream, 0 when stored raw      |
//! | 0x001C         | Unpacked Size | 4 bytes: Size of the payload after extraction            |
//! | 0x0020         | Sentinel      | 4 bytes: Usually `0xBAADF00D`                            |
//!
//! ### Texture Records
//!
//! Each record of a `DX10` archive is a 24 byte texture header followed by `Chunk Count` chunk
//! records of 24 bytes each.
//!
//! | Offset (bytes) | Field             | Description                                      |
//! |----------------|-------------------|--------------------------------------------------|
//! | 0x0000         | Name Hash         | 4 bytes                                          |
//! | 0x0004         | Extension         | 4 bytes                                          |
//! | 0x0008         | Dir Hash          | 4 bytes                                          |
//! | 0x000C         | Unknown           | 1 byte                                           |
//! | 0x000D         | Chunk Count       | 1 byte                                           |
//! | 0x000E         | Chunk Header Size | 2 bytes: Always 24                               |
//! | 0x0010         | Height            | 2 bytes                                          |
//! | 0x0012         | Width             | 2 bytes                                          |
//! | 0x0014         | Mip Count         | 1 byte                                           |
//! | 0x0015         | Format            | 1 byte: `DXGI_FORMAT` code                       |
//! | 0x0016         | Reserved          | 2 bytes                                          |
//!
//! | Offset (bytes) | Field         | Description                                              |
//! |----------------|---------------|----------------------------------------------------------|
//! | 0x0000         | Offset        | 8 bytes: Absolute offset of the chunk                    |
//! | 0x0008         | Packed Size   | 4 bytes: Size of the zlib stream, 0 when stored raw      |
//! | 0x000C         | Unpacked Size | 4 bytes                                                  |
//! | 0x0010         | Start Mip     | 2 bytes                                                  |
//! | 0x0012         | End Mip       | 2 bytes                                                  |
//! | 0x0014         | Reserved      | 4 bytes                                                  |
//!
//! ### Name Table
//!
//! The name table runs from its offset to the end of the file. Every name is a 2 byte length
//! followed by that many bytes, using `\` as the path separator. The n-th name belongs to the
//! n-th record.
//!
//! ## Extraction
//!
//! General payloads are written as they are after inflating. Textures get a classic 128 byte DDS
//! header synthesized from their record, followed by every chunk in record order. See
//! [`dds::build_dds_header`] for the supported formats.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.ba2`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: zlib, per payload or per chunk
//!

pub mod compression;
mod cursor;
pub mod dds;
pub mod error;
pub mod extract;
pub mod read;
pub mod types;

pub use error::{Error, ErrorCode};
pub use extract::{ExtractOptions, ExtractSummary};
pub use read::{Ba2Archive, Records};
pub use types::ArchiveType;
