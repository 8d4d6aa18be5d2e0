//! Types for reading BA2 archives
//!

use binrw::BinRead;
use indexmap::IndexMap;
use std::{
    fs::File,
    io::{BufReader, Read, Seek, SeekFrom},
    path::Path,
};
use tracing::{debug, instrument, warn};

use crate::{
    compression::{check_size, inflate},
    cursor::BinaryCursor,
    dds::build_dds_header,
    error::{EntryNotFoundError, Error, Result},
    extract::ExtractOptions,
    types::{ArchiveType, ChunkRecord, GeneralRecord, Header, TextureRecord, CHUNK_RECORD_SIZE},
};

/// Decoded record table, its layout is picked by [`Header::archive_type`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Records {
    General(Vec<GeneralRecord>),
    Dx10(Vec<TextureRecord>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::General(r) => r.len(),
            Records::Dx10(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read `count` general records starting at the current position.
#[instrument(skip(reader), err)]
pub fn read_general_records<R: Read + Seek>(
    reader: &mut R,
    count: u32,
) -> Result<Vec<GeneralRecord>> {
    (0..count)
        .map(|_| GeneralRecord::read(reader).map_err(Error::from))
        .collect()
}

/// Read `count` texture records, each followed by its own chunk records.
#[instrument(skip(reader), err)]
pub fn read_texture_records<R: Read + Seek>(
    reader: &mut R,
    count: u32,
) -> Result<Vec<TextureRecord>> {
    (0..count)
        .map(|_| -> Result<TextureRecord> {
            let texture = TextureRecord::read(reader)?;
            if texture.chunk_header_size as u64 != CHUNK_RECORD_SIZE {
                debug!(
                    chunk_header_size = texture.chunk_header_size,
                    "unexpected chunk header size"
                );
            }
            Ok(texture)
        })
        .collect()
}

/// Read the name table at `offset` until fewer than two bytes are left in the stream.
///
/// Each name is a little endian `u16` length followed by that many bytes. The table has no
/// count of its own, so checking it against the header is left to the caller.
#[instrument(skip(reader), err)]
pub fn read_name_table<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Vec<String>> {
    let stream_len = reader.total_len()?;
    if offset > stream_len {
        return Err(Error::Truncated);
    }
    reader.seek(SeekFrom::Start(offset))?;

    let mut names = Vec::new();
    while reader.remaining(stream_len)? >= 2 {
        let len = reader.read_le_u16()?;
        if len as u64 > reader.remaining(stream_len)? {
            return Err(Error::Truncated);
        }

        let mut raw = reader.read_bytes(len as usize)?;
        if let Some(nul) = raw.iter().position(|&b| b == 0) {
            raw.truncate(nul);
        }
        names.push(String::from_utf8_lossy(&raw).into_owned());
    }

    Ok(names)
}

#[derive(Debug)]
struct Shared {
    header: Header,
    records: Records,
    names: Vec<String>,
    lookup: IndexMap<Box<str>, usize>,
    stream_len: u64,
}

/// BA2 archive reader
///
/// The reader is owned by the archive and every operation that touches it takes `&mut self`,
/// so one archive cannot be read from two places at once. Wrap it in a `Mutex` to share it
/// between threads.
///
/// ```no_run
/// use std::ops::ControlFlow;
/// use ba2_archive::{Ba2Archive, ExtractOptions};
///
/// fn unpack() -> ba2_archive::error::Result<()> {
///     let mut ba2 = Ba2Archive::open("Fallout4 - Textures1.ba2")?;
///
///     for name in ba2.file_names() {
///         println!("{name}");
///     }
///
///     ba2.extract_all("out", &ExtractOptions::default(), |_, _| ControlFlow::Continue(()))?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Ba2Archive<R> {
    reader: R,
    shared: Shared,
}

impl Ba2Archive<BufReader<File>> {
    /// Open and parse the archive at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Ba2Archive::new(BufReader::new(file))
    }
}

impl<R> Ba2Archive<R> {
    /// Number of entries contained in this archive.
    pub fn len(&self) -> usize {
        self.shared.names.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The decoded header
    pub fn header(&self) -> &Header {
        &self.shared.header
    }

    pub fn archive_type(&self) -> ArchiveType {
        self.shared.header.archive_type
    }

    /// The decoded record table, positionally aligned with [`Ba2Archive::file_names`]
    pub fn records(&self) -> &Records {
        &self.shared.records
    }

    /// Returns an iterator over all the file names in record order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.shared.names.iter().map(|s| s.as_str())
    }

    /// Get the index of a file entry by name, if it's present.
    ///
    /// Should a name appear twice, the first record wins.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.shared.lookup.get(name).copied()
    }

    /// Get the name of a file entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.shared.names.get(index).map(|s| s.as_str())
    }

    /// Total size of the files once extracted, DDS headers not included.
    pub fn decompressed_size(&self) -> Option<u128> {
        let mut total = 0u128;
        match &self.shared.records {
            Records::General(files) => {
                for file in files {
                    total = total.checked_add(file.size() as u128)?;
                }
            }
            Records::Dx10(textures) => {
                for texture in textures {
                    total = total.checked_add(texture.data_size() as u128)?;
                }
            }
        }
        Some(total)
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Release the underlying stream.
    pub fn close(self) {
        debug!(entries = self.len(), "closing archive");
    }
}

impl<R: Read + Seek> Ba2Archive<R> {
    /// Read a BA2 archive collecting the entries it contains.
    ///
    /// Nothing is returned unless the header, the whole record table and a complete name
    /// table could be decoded.
    pub fn new(mut reader: R) -> Result<Ba2Archive<R>> {
        let shared = Self::get_metadata(&mut reader)?;
        Ok(Ba2Archive { reader, shared })
    }

    #[instrument(skip(reader), err)]
    fn get_metadata(reader: &mut R) -> Result<Shared> {
        let stream_len = reader.total_len()?;
        let header = Header::decode(reader)?;
        debug!(?header, "decoded header");

        let records = match header.archive_type {
            ArchiveType::General => {
                Records::General(read_general_records(reader, header.file_count)?)
            }
            ArchiveType::Dx10 => Records::Dx10(read_texture_records(reader, header.file_count)?),
        };

        let names = if header.file_count == 0 {
            Vec::new()
        } else {
            read_name_table(reader, header.name_table_offset)?
        };

        if names.len() != header.file_count as usize {
            return Err(Error::NameCountMismatch {
                expected: header.file_count,
                found: names.len(),
            });
        }

        let mut lookup = IndexMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            if lookup.contains_key(name.as_str()) {
                warn!(name, index, "duplicate entry name");
                continue;
            }
            lookup.insert(name.as_str().into(), index);
        }

        Ok(Shared {
            header,
            records,
            names,
            lookup,
            stream_len,
        })
    }

    /// Read the extracted bytes of the entry at `index`.
    ///
    /// Textures come back as a complete DDS file.
    pub fn read_entry(&mut self, index: usize, options: &ExtractOptions) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_entry(index, &mut buffer, options)?;
        Ok(buffer)
    }

    /// Read the extracted bytes of the entry called `name`.
    pub fn read_entry_by_name(&mut self, name: &str, options: &ExtractOptions) -> Result<Vec<u8>> {
        let index = self
            .index_for_name(name)
            .ok_or_else(|| EntryNotFoundError::Name(name.to_owned()))?;
        self.read_entry(index, options)
    }

    /// Write the extracted bytes of the entry at `index` into `out`.
    ///
    /// For textures the DDS header is built before anything is written, so an unsupported
    /// format leaves `out` untouched.
    #[instrument(skip(self, out, options), err)]
    pub fn write_entry<W: std::io::Write>(
        &mut self,
        index: usize,
        out: &mut W,
        options: &ExtractOptions,
    ) -> Result<()> {
        let Shared {
            records,
            stream_len,
            ..
        } = &self.shared;

        match records {
            Records::General(files) => {
                let file = files
                    .get(index)
                    .ok_or(EntryNotFoundError::Index(index))?;
                write_general(&mut self.reader, file, *stream_len, out, options)
            }
            Records::Dx10(textures) => {
                let texture = textures
                    .get(index)
                    .ok_or(EntryNotFoundError::Index(index))?;
                write_texture(&mut self.reader, texture, *stream_len, out, options)
            }
        }
    }
}

fn write_general<R: Read + Seek, W: std::io::Write>(
    reader: &mut R,
    file: &GeneralRecord,
    stream_len: u64,
    out: &mut W,
    options: &ExtractOptions,
) -> Result<()> {
    let size = file.size();
    check_size(size as u64, options.size_limit)?;

    if file.is_compressed() {
        check_size(file.packed_len as u64, options.size_limit)?;
        reader.seek_span(file.offset, file.packed_len as u64, stream_len)?;
        let packed = reader.read_bytes(file.packed_len as usize)?;
        out.write_all(&inflate(&packed, size)?)?;
    } else {
        reader.seek_span(file.offset, size as u64, stream_len)?;
        let copied = std::io::copy(&mut reader.by_ref().take(size as u64), out)?;
        if copied != size as u64 {
            return Err(Error::Truncated);
        }
    }

    Ok(())
}

fn write_texture<R: Read + Seek, W: std::io::Write>(
    reader: &mut R,
    texture: &TextureRecord,
    stream_len: u64,
    out: &mut W,
    options: &ExtractOptions,
) -> Result<()> {
    let header = build_dds_header(
        texture.format,
        texture.width,
        texture.height,
        texture.num_mips,
        options.use_ati_fourcc,
    )?;
    check_size(texture.data_size(), options.size_limit)?;

    out.write_all(&header.to_bytes()?)?;
    for chunk in &texture.chunks {
        write_chunk(reader, chunk, stream_len, out, options)?;
    }

    Ok(())
}

fn write_chunk<R: Read + Seek, W: std::io::Write>(
    reader: &mut R,
    chunk: &ChunkRecord,
    stream_len: u64,
    out: &mut W,
    options: &ExtractOptions,
) -> Result<()> {
    if chunk.is_compressed() {
        check_size(chunk.packed_len as u64, options.size_limit)?;
        reader.seek_span(chunk.offset, chunk.packed_len as u64, stream_len)?;
        let packed = reader.read_bytes(chunk.packed_len as usize)?;
        out.write_all(&inflate(&packed, chunk.unpacked_len)?)?;
    } else {
        reader.seek_span(chunk.offset, chunk.unpacked_len as u64, stream_len)?;
        let raw = reader.read_bytes(chunk.unpacked_len as usize)?;
        out.write_all(&raw)?;
    }

    Ok(())
}
