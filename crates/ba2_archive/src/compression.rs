//! Payload decompression handling.

use flate2::{Decompress, FlushDecompress, Status};
use tracing::{instrument, trace};

use crate::error::{Error, Result};

/// Default upper bound for a single inflated payload, 1 GiB
pub const DEFAULT_SIZE_LIMIT: u64 = 1 << 30;

/// Inflate a zlib stream that is expected to produce exactly `expected_size` bytes.
///
/// The output buffer is allocated up front from `expected_size`, which comes straight from
/// the archive. Callers should check it against a limit first, see [`check_size`].
#[instrument(skip(compressed), fields(packed = compressed.len()), err)]
pub fn inflate(compressed: &[u8], expected_size: u32) -> Result<Vec<u8>> {
    let expected = expected_size as usize;
    let mut output = Vec::with_capacity(expected);
    let mut inflater = Decompress::new(true);

    let status = inflater
        .decompress_vec(compressed, &mut output, FlushDecompress::Finish)
        .map_err(Error::DecompressFailed)?;

    match status {
        Status::StreamEnd if output.len() == expected => Ok(output),
        Status::StreamEnd => Err(Error::SizeMismatch {
            expected: expected as u64,
            actual: output.len() as u64,
        }),
        // The buffer is full, either the trailer is still pending or the stream is longer
        _ if output.len() == expected => match drain(&mut inflater, compressed)? {
            actual if actual == expected as u64 => Ok(output),
            actual => Err(Error::SizeMismatch {
                expected: expected as u64,
                actual,
            }),
        },
        // Input ran out before the stream was complete
        _ => Err(Error::Truncated),
    }
}

/// Keep inflating into scratch space to learn the real size of an oversized stream.
fn drain(inflater: &mut Decompress, compressed: &[u8]) -> Result<u64> {
    let mut scratch = [0u8; 4096];
    loop {
        let consumed = inflater.total_in();
        let produced = inflater.total_out();
        let status = inflater
            .decompress(
                &compressed[consumed as usize..],
                &mut scratch,
                FlushDecompress::Finish,
            )
            .map_err(Error::DecompressFailed)?;

        let stalled = inflater.total_in() == consumed && inflater.total_out() == produced;
        if status == Status::StreamEnd || stalled {
            trace!(total = inflater.total_out(), "drained oversized stream");
            return Ok(inflater.total_out());
        }
    }
}

/// Reject size fields larger than `limit` before anything is allocated for them.
pub fn check_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(Error::SizeLimitExceeded { size, limit });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use flate2::{write::ZlibEncoder, Compression};
    use pretty_assertions::assert_eq;

    use super::{check_size, inflate};
    use crate::error::{Error, Result};

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflate_hello() -> Result<()> {
        #[rustfmt::skip]
        let compressed = [
            0x78, 0x9C, 0xCB, 0x48, 0xCD, 0xC9, 0xC9, 0x07, 0x00, 0x06, 0x2C, 0x02, 0x15,
        ];

        assert_eq!(inflate(&compressed, 5)?, b"hello");

        Ok(())
    }

    #[test]
    fn inflate_round_trip() -> Result<()> {
        let data = (0..10_000u32).flat_map(|i| (i % 251).to_le_bytes()).collect::<Vec<_>>();
        let compressed = deflate(&data);

        assert_eq!(inflate(&compressed, data.len() as u32)?, data);

        Ok(())
    }

    #[test]
    fn inflate_one_byte_short() {
        let data = b"Hello World, Hello World, Hello World";
        let compressed = deflate(data);

        match inflate(&compressed, data.len() as u32 - 1) {
            Err(Error::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, data.len() as u64 - 1);
                assert_eq!(actual, data.len() as u64);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn inflate_one_byte_long() {
        let data = b"Hello World";
        let compressed = deflate(data);

        assert!(matches!(
            inflate(&compressed, data.len() as u32 + 1),
            Err(Error::SizeMismatch {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn inflate_garbage() {
        let garbage = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert!(matches!(
            inflate(&garbage, 8),
            Err(Error::DecompressFailed(_))
        ));
    }

    #[test]
    fn inflate_cut_stream() {
        let data = (0..4096u32).flat_map(|i| i.to_le_bytes()).collect::<Vec<_>>();
        let compressed = deflate(&data);

        assert!(matches!(
            inflate(&compressed[..compressed.len() / 2], data.len() as u32),
            Err(Error::Truncated)
        ));
    }

    #[test]
    fn size_limit() {
        assert!(check_size(10, 10).is_ok());
        assert!(matches!(
            check_size(11, 10),
            Err(Error::SizeLimitExceeded { size: 11, limit: 10 })
        ));
    }
}
