//! Blocking byte-stream abstraction for raw PCM input.
//!
//! The decoder never cares whether samples come from a file or standard
//! input; it only needs "read exactly N samples, or tell me the stream ended
//! cleanly at this chunk's boundary". [`SampleSource`] is blanket-implemented
//! for any [`std::io::Read`], so `std::fs::File` and `std::io::Stdin` work
//! without a wrapper type.

use std::io::Read;

use crate::err;

/// Outcome of a single [`SampleSource::fill`] call.
#[derive(Debug, PartialEq, Eq)]
pub enum FillOutcome {
    /// `buf` was filled completely.
    Filled,
    /// The stream ended exactly at the start of this chunk: a clean EOF.
    Eof,
}

/// A blocking source of signed 16-bit little-endian PCM samples.
pub trait SampleSource {
    /// Fills `buf` with exactly `buf.len()` samples.
    ///
    /// Returns [`FillOutcome::Eof`] only if the underlying stream produced
    /// zero bytes at the very start of the read; a short read that begins
    /// mid-chunk is always a fatal [`err::Error::Io`], since the stream
    /// promised a multiple-of-two-bytes framing and broke it.
    fn fill(&mut self, buf: &mut [i16]) -> err::Result<FillOutcome>;
}

impl<R: Read> SampleSource for R {
    fn fill(&mut self, buf: &mut [i16]) -> err::Result<FillOutcome> {
        if buf.is_empty() {
            return Ok(FillOutcome::Filled);
        }

        let mut bytes = vec![0u8; buf.len() * 2];
        let mut total = 0;

        loop {
            match self.read(&mut bytes[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
            if total == bytes.len() {
                break;
            }
        }

        if total == 0 {
            return Ok(FillOutcome::Eof);
        }
        if total != bytes.len() {
            return Err(err::Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "short read: expected {} bytes, got {} (mid-chunk EOF is fatal)",
                    bytes.len(),
                    total,
                ),
            )));
        }

        for (dst, chunk) in buf.iter_mut().zip(bytes.chunks_exact(2)) {
            *dst = i16::from_le_bytes([chunk[0], chunk[1]]);
        }
        Ok(FillOutcome::Filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_reads_little_endian_samples() {
        let bytes: [u8; 4] = [0x00, 0x01, 0xff, 0xff]; // 256, -1
        let mut cursor = std::io::Cursor::new(bytes);
        let mut buf = [0i16; 2];
        assert_eq!(cursor.fill(&mut buf).unwrap(), FillOutcome::Filled);
        assert_eq!(buf, [256, -1]);
    }

    #[test]
    fn test_fill_clean_eof_at_chunk_boundary() {
        let mut cursor = std::io::Cursor::new([0u8; 0]);
        let mut buf = [0i16; 4];
        assert_eq!(cursor.fill(&mut buf).unwrap(), FillOutcome::Eof);
    }

    #[test]
    fn test_fill_mid_chunk_short_read_is_fatal() {
        let mut cursor = std::io::Cursor::new([0x01u8, 0x00, 0x02]); // 1.5 samples
        let mut buf = [0i16; 2];
        assert!(cursor.fill(&mut buf).is_err());
    }

    #[test]
    fn test_fill_empty_buf_is_a_noop() {
        let mut cursor = std::io::Cursor::new([0u8; 0]);
        let mut buf: [i16; 0] = [];
        assert_eq!(cursor.fill(&mut buf).unwrap(), FillOutcome::Filled);
    }
}
