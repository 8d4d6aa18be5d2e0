//! Little endian primitives over a seekable stream.
//!
//! Every read either yields the full value or fails; a short stream surfaces as
//! [`Error::Truncated`] through the `From<std::io::Error>` conversion.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// Fixed width reads used by the header and name table decoders
pub(crate) trait BinaryCursor: Read + Seek {
    fn read_tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        self.read_exact(&mut tag)?;
        Ok(tag)
    }

    fn read_le_u16(&mut self) -> Result<u16> {
        Ok(self.read_u16::<LittleEndian>()?)
    }

    fn read_le_u32(&mut self) -> Result<u32> {
        Ok(self.read_u32::<LittleEndian>()?)
    }

    fn read_le_u64(&mut self) -> Result<u64> {
        Ok(self.read_u64::<LittleEndian>()?)
    }

    /// Reads exactly `len` bytes
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; len];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Total length of the stream. The cursor position is preserved.
    fn total_len(&mut self) -> Result<u64> {
        let position = self.stream_position()?;
        let len = self.seek(SeekFrom::End(0))?;
        if position != len {
            self.seek(SeekFrom::Start(position))?;
        }
        Ok(len)
    }

    /// Bytes left between the cursor and the end of the stream
    fn remaining(&mut self, len: u64) -> Result<u64> {
        Ok(len.saturating_sub(self.stream_position()?))
    }

    /// Seeks to `offset` after checking that `len` bytes starting there are inside a
    /// stream of `stream_len` bytes.
    fn seek_span(&mut self, offset: u64, len: u64, stream_len: u64) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= stream_len => {
                self.seek(SeekFrom::Start(offset))?;
                Ok(())
            }
            _ => Err(Error::Truncated),
        }
    }
}

impl<T: Read + Seek + ?Sized> BinaryCursor for T {}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::BinaryCursor;
    use crate::error::{Error, Result};

    #[test]
    fn reads_little_endian() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x42, 0x54, 0x44, 0x58,
            0x01, 0x02,
            0x01, 0x00, 0x00, 0x00,
            0x18, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
        ]);

        assert_eq!(&input.read_tag()?, b"BTDX");
        assert_eq!(input.read_le_u16()?, 0x0201);
        assert_eq!(input.read_le_u32()?, 1);
        assert_eq!(input.read_le_u64()?, 0x0100_0000_0000_0018);

        Ok(())
    }

    #[test]
    fn short_read_is_truncated() {
        let mut input = Cursor::new(vec![0x01, 0x00, 0x00]);
        assert!(matches!(input.read_le_u32(), Err(Error::Truncated)));
    }

    #[test]
    fn total_len_keeps_position() -> Result<()> {
        let mut input = Cursor::new(vec![0u8; 10]);
        input.set_position(3);

        assert_eq!(input.total_len()?, 10);
        assert_eq!(input.position(), 3);
        assert_eq!(input.remaining(10)?, 7);

        Ok(())
    }

    #[test]
    fn span_outside_stream_is_truncated() {
        let mut input = Cursor::new(vec![0u8; 10]);

        assert!(input.seek_span(4, 6, 10).is_ok());
        assert!(matches!(input.seek_span(4, 7, 10), Err(Error::Truncated)));
        assert!(matches!(
            input.seek_span(u64::MAX, 1, 10),
            Err(Error::Truncated)
        ));
    }
}
