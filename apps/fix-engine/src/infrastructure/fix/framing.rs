//! Stream framing for FIX messages.
//!
//! Splits an async byte stream into complete frames, each running from a
//! `8=` boundary through the delimiter after the CheckSum field. Garbage
//! between frames is discarded and the scanner resyncs on the next
//! boundary, so line noise never errors the stream; a frame that fails
//! message-level validation is rejected later by the codec.

use tokio_util::bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::codec::CodecError;

/// Frames larger than this are dropped as garbage rather than buffered.
pub const MAX_FRAME_BYTES: usize = 8 * 1024;

/// Byte-stream framer yielding raw frame strings.
#[derive(Debug, Clone)]
pub struct FixFrameCodec {
    delimiter: u8,
    max_frame: usize,
}

impl FixFrameCodec {
    /// Framer splitting on the given field delimiter.
    #[must_use]
    pub const fn new(delimiter: char) -> Self {
        Self {
            delimiter: delimiter as u8,
            max_frame: MAX_FRAME_BYTES,
        }
    }

    /// Override the maximum frame size.
    #[must_use]
    pub const fn with_max_frame(mut self, max_frame: usize) -> Self {
        self.max_frame = max_frame;
        self
    }

    /// Drop bytes until the buffer starts at a `8=` frame boundary.
    ///
    /// Returns true if a boundary is present at the start of the buffer.
    fn resync(&self, src: &mut BytesMut) -> bool {
        if src.starts_with(b"8=") {
            return true;
        }

        let boundary = [self.delimiter, b'8', b'='];
        if let Some(pos) = find_subsequence(src, &boundary) {
            tracing::warn!(dropped = pos + 1, "Discarded bytes before frame boundary");
            src.advance(pos + 1);
            return true;
        }

        // No boundary yet. Keep a short tail in case it is a split prefix.
        let keep = src.len().min(2);
        let dropped = src.len() - keep;
        if dropped > 0 {
            tracing::warn!(dropped, "Discarded unframeable bytes");
            src.advance(dropped);
        }
        false
    }
}

impl Decoder for FixFrameCodec {
    type Item = String;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, CodecError> {
        loop {
            if src.is_empty() {
                return Ok(None);
            }
            if !self.resync(src) {
                return Ok(None);
            }

            let trailer = [self.delimiter, b'1', b'0', b'='];
            let Some(trailer_pos) = find_subsequence(src, &trailer) else {
                if src.len() > self.max_frame {
                    // Abandon the oversized frame; the scanner will resync
                    // past its remaining bytes as they arrive.
                    tracing::warn!(
                        buffered = src.len(),
                        max = self.max_frame,
                        "Dropping oversized frame"
                    );
                    src.advance(2);
                    continue;
                }
                return Ok(None);
            };

            let value_start = trailer_pos + trailer.len();
            let Some(end_offset) = src[value_start..]
                .iter()
                .position(|b| *b == self.delimiter)
            else {
                if src.len() > self.max_frame {
                    src.advance(2);
                    continue;
                }
                return Ok(None);
            };

            let frame_len = value_start + end_offset + 1;
            let frame = src.split_to(frame_len);
            return Ok(Some(String::from_utf8_lossy(&frame).into_owned()));
        }
    }
}

impl Encoder<String> for FixFrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
