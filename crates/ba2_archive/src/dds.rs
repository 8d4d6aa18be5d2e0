//! Classic DDS header synthesis for DX10 textures.
//!
//! BA2 texture records only carry the dimensions, the mip count and a `DXGI_FORMAT` code.
//! Extraction rebuilds a `DDS ` file from those fields followed by the raw mip data.
//!
//! The extended `DDS_HEADER_DXT10` block is never written. BC7 textures get the non-standard
//! FourCC `BC7\0`, which is enough for tools that only look at the dimensions.

use std::io::Cursor;

use binrw::BinWrite;

use crate::error::{Error, Result};

/// Size of [`DdsHeader`] on disk without the magic
pub const DDS_HEADER_SIZE: u32 = 124;

/// Size of [`DdsPixelFormat`] on disk
pub const DDS_PIXEL_FORMAT_SIZE: u32 = 32;

pub const DDSD_CAPS: u32 = 0x1;
pub const DDSD_HEIGHT: u32 = 0x2;
pub const DDSD_WIDTH: u32 = 0x4;
pub const DDSD_PIXELFORMAT: u32 = 0x1000;
pub const DDSD_MIPMAPCOUNT: u32 = 0x20000;
pub const DDSD_LINEARSIZE: u32 = 0x80000;

pub const DDSCAPS_COMPLEX: u32 = 0x8;
pub const DDSCAPS_TEXTURE: u32 = 0x1000;
pub const DDSCAPS_MIPMAP: u32 = 0x400000;

pub const DDPF_ALPHAPIXELS: u32 = 0x1;
pub const DDPF_FOURCC: u32 = 0x4;
pub const DDPF_RGB: u32 = 0x40;

/// The subset of `DXGI_FORMAT` that can be expressed with a classic DDS header
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum DxgiFormat {
    R8Unorm = 61,
    Bc1Unorm = 71,
    Bc2Unorm = 74,
    Bc3Unorm = 77,
    Bc5Unorm = 83,
    B8G8R8A8Unorm = 87,
    Bc7Unorm = 98,
}

impl TryFrom<u8> for DxgiFormat {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            61 => DxgiFormat::R8Unorm,
            71 => DxgiFormat::Bc1Unorm,
            74 => DxgiFormat::Bc2Unorm,
            77 => DxgiFormat::Bc3Unorm,
            83 => DxgiFormat::Bc5Unorm,
            87 => DxgiFormat::B8G8R8A8Unorm,
            98 => DxgiFormat::Bc7Unorm,
            other => return Err(Error::UnsupportedPixelFormat(other)),
        })
    }
}

/// `DDS_PIXELFORMAT`
#[derive(BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[bw(little)]
pub struct DdsPixelFormat {
    pub size: u32,
    pub flags: u32,
    pub four_cc: [u8; 4],
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    fn four_cc(four_cc: &[u8; 4]) -> Self {
        DdsPixelFormat {
            size: DDS_PIXEL_FORMAT_SIZE,
            flags: DDPF_FOURCC,
            four_cc: *four_cc,
            ..Default::default()
        }
    }
}

/// `DDS_HEADER`, written with its leading `DDS ` magic
#[derive(BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[bw(magic = b"DDS ", little)]
pub struct DdsHeader {
    pub size: u32,
    pub flags: u32,
    pub height: u32,
    pub width: u32,
    pub pitch_or_linear_size: u32,
    pub depth: u32,
    pub mip_map_count: u32,
    pub reserved1: [u32; 11],
    pub pixel_format: DdsPixelFormat,
    pub caps: u32,
    pub caps2: u32,
    pub caps3: u32,
    pub caps4: u32,
    pub reserved2: u32,
}

impl DdsHeader {
    /// Serialize the magic and the header, 128 bytes in total
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::with_capacity(4 + DDS_HEADER_SIZE as usize));
        self.write(&mut buffer)?;
        Ok(buffer.into_inner())
    }
}

/// Build the DDS header for a texture.
///
/// `use_ati_fourcc` selects `ATI2` instead of `DXT5` for BC5 textures. `ATI2` is the
/// accurate tag but few tools understand it.
pub fn build_dds_header(
    format: u8,
    width: u16,
    height: u16,
    num_mips: u8,
    use_ati_fourcc: bool,
) -> Result<DdsHeader> {
    let format = DxgiFormat::try_from(format)?;
    let area = width as u32 * height as u32;

    let (pixel_format, pitch_or_linear_size) = match format {
        DxgiFormat::Bc1Unorm => (DdsPixelFormat::four_cc(b"DXT1"), area / 2),
        DxgiFormat::Bc2Unorm => (DdsPixelFormat::four_cc(b"DXT3"), area),
        DxgiFormat::Bc3Unorm => (DdsPixelFormat::four_cc(b"DXT5"), area),
        DxgiFormat::Bc5Unorm if use_ati_fourcc => (DdsPixelFormat::four_cc(b"ATI2"), area),
        DxgiFormat::Bc5Unorm => (DdsPixelFormat::four_cc(b"DXT5"), area),
        DxgiFormat::Bc7Unorm => (DdsPixelFormat::four_cc(b"BC7\0"), area),
        DxgiFormat::B8G8R8A8Unorm => (
            DdsPixelFormat {
                size: DDS_PIXEL_FORMAT_SIZE,
                flags: DDPF_RGB | DDPF_ALPHAPIXELS,
                rgb_bit_count: 32,
                r_bit_mask: 0x00FF0000,
                g_bit_mask: 0x0000FF00,
                b_bit_mask: 0x000000FF,
                a_bit_mask: 0xFF000000,
                ..Default::default()
            },
            area.saturating_mul(4),
        ),
        DxgiFormat::R8Unorm => (
            DdsPixelFormat {
                size: DDS_PIXEL_FORMAT_SIZE,
                flags: DDPF_RGB,
                rgb_bit_count: 8,
                r_bit_mask: 0xFF,
                ..Default::default()
            },
            area,
        ),
    };

    Ok(DdsHeader {
        size: DDS_HEADER_SIZE,
        flags: DDSD_CAPS
            | DDSD_HEIGHT
            | DDSD_WIDTH
            | DDSD_PIXELFORMAT
            | DDSD_MIPMAPCOUNT
            | DDSD_LINEARSIZE,
        height: height as u32,
        width: width as u32,
        pitch_or_linear_size,
        mip_map_count: num_mips as u32,
        pixel_format,
        caps: DDSCAPS_TEXTURE | DDSCAPS_COMPLEX | DDSCAPS_MIPMAP,
        ..Default::default()
    })
}
