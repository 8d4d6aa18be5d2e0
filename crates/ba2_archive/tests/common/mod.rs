#![allow(dead_code)]

use std::io::{Cursor, Write};

use ba2_archive::types::{
    ArchiveType, ChunkRecord, GeneralRecord, TextureRecord, CHUNK_RECORD_SIZE,
    GENERAL_RECORD_SIZE, HEADER_SIZE, MAGIC,
};
use binrw::BinWrite;
use flate2::{write::ZlibEncoder, Compression};

const SENTINEL: u32 = 0xBAADF00D;

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A file of a general archive
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
    pub compress: bool,
}

impl Entry {
    pub fn raw(name: &str, data: &[u8]) -> Self {
        Entry {
            name: name.into(),
            data: data.to_vec(),
            compress: false,
        }
    }

    pub fn zlib(name: &str, data: &[u8]) -> Self {
        Entry {
            name: name.into(),
            data: data.to_vec(),
            compress: true,
        }
    }

    fn stored(&self) -> Vec<u8> {
        if self.compress {
            deflate(&self.data)
        } else {
            self.data.clone()
        }
    }
}

/// One mip chunk of a texture
pub struct Chunk {
    pub data: Vec<u8>,
    pub compress: bool,
}

/// A texture of a DX10 archive
pub struct Texture {
    pub name: String,
    pub format: u8,
    pub width: u16,
    pub height: u16,
    pub num_mips: u8,
    pub chunks: Vec<Chunk>,
}

impl Texture {
    /// A single raw chunk holding `data`
    pub fn single(name: &str, format: u8, width: u16, height: u16, data: &[u8]) -> Self {
        Texture {
            name: name.into(),
            format,
            width,
            height,
            num_mips: 1,
            chunks: vec![Chunk {
                data: data.to_vec(),
                compress: false,
            }],
        }
    }
}

fn write_header(out: &mut Cursor<Vec<u8>>, archive_type: ArchiveType, count: usize, names: u64) {
    out.write_all(&MAGIC).unwrap();
    out.write_all(&1u32.to_le_bytes()).unwrap();
    out.write_all(&archive_type.tag()).unwrap();
    out.write_all(&(count as u32).to_le_bytes()).unwrap();
    out.write_all(&names.to_le_bytes()).unwrap();
}

fn write_names<'a>(out: &mut Cursor<Vec<u8>>, names: impl Iterator<Item = &'a str>) {
    for name in names {
        out.write_all(&(name.len() as u16).to_le_bytes()).unwrap();
        out.write_all(name.as_bytes()).unwrap();
    }
}

fn extension(name: &str) -> [u8; 4] {
    let mut extension = [0u8; 4];
    if let Some((_, ext)) = name.rsplit_once('.') {
        for (dst, src) in extension.iter_mut().zip(ext.bytes()) {
            *dst = src;
        }
    }
    extension
}

/// Build a complete `GNRL` archive in memory
pub fn general_archive(entries: &[Entry]) -> Vec<u8> {
    let stored = entries.iter().map(Entry::stored).collect::<Vec<_>>();

    let mut offset = HEADER_SIZE + GENERAL_RECORD_SIZE * entries.len() as u64;
    let mut records = Vec::with_capacity(entries.len());
    for (entry, payload) in entries.iter().zip(&stored) {
        records.push(GeneralRecord {
            extension: extension(&entry.name),
            offset,
            packed_len: if entry.compress { payload.len() as u32 } else { 0 },
            unpacked_len: entry.data.len() as u32,
            sentinel: SENTINEL,
            ..Default::default()
        });
        offset += payload.len() as u64;
    }

    let mut out = Cursor::new(Vec::new());
    write_header(&mut out, ArchiveType::General, entries.len(), offset);
    for record in &records {
        record.write(&mut out).unwrap();
    }
    for payload in &stored {
        out.write_all(payload).unwrap();
    }
    write_names(&mut out, entries.iter().map(|e| e.name.as_str()));

    out.into_inner()
}

/// Build a complete `DX10` archive in memory
pub fn texture_archive(textures: &[Texture]) -> Vec<u8> {
    let stored = textures
        .iter()
        .map(|t| {
            t.chunks
                .iter()
                .map(|c| if c.compress { deflate(&c.data) } else { c.data.clone() })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let table_len = textures
        .iter()
        .map(|t| 24 + CHUNK_RECORD_SIZE * t.chunks.len() as u64)
        .sum::<u64>();
    let mut offset = HEADER_SIZE + table_len;

    let mut records = Vec::with_capacity(textures.len());
    for (texture, payloads) in textures.iter().zip(&stored) {
        let mut chunks = Vec::with_capacity(texture.chunks.len());
        for (mip, (chunk, payload)) in texture.chunks.iter().zip(payloads).enumerate() {
            chunks.push(ChunkRecord {
                offset,
                packed_len: if chunk.compress { payload.len() as u32 } else { 0 },
                unpacked_len: chunk.data.len() as u32,
                start_mip: mip as u16,
                end_mip: mip as u16,
                reserved: SENTINEL,
            });
            offset += payload.len() as u64;
        }

        records.push(TextureRecord {
            extension: *b"dds\0",
            num_chunks: chunks.len() as u8,
            chunk_header_size: CHUNK_RECORD_SIZE as u16,
            height: texture.height,
            width: texture.width,
            num_mips: texture.num_mips,
            format: texture.format,
            chunks,
            ..Default::default()
        });
    }

    let mut out = Cursor::new(Vec::new());
    write_header(&mut out, ArchiveType::Dx10, textures.len(), offset);
    for record in &records {
        record.write(&mut out).unwrap();
    }
    for payload in stored.iter().flatten() {
        out.write_all(payload).unwrap();
    }
    write_names(&mut out, textures.iter().map(|t| t.name.as_str()));

    out.into_inner()
}
