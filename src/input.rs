use std::io::Read;

use crate::error::{Error, Result};

/// How many bytes to pull from the source per refill. Gzip decompression
/// tends to hand back data in lumps unrelated to the caller's request sizes,
/// so we always ask for a fixed amount and keep what we don't use.
pub(crate) const REFILL_SIZE: usize = 2048;

/// Turns a source that may deliver bytes in arbitrary, smaller-than-requested
/// chunks into an exact-length `read(n)` and a non-consuming `peek(n)`.
///
/// The buffer grows only as far as the largest single request. Structural
/// reads (tag bytes, names, scalars) are small; large payloads go through the
/// chunked byte-array path on the reader, not through this buffer.
pub(crate) struct InputBuffer<R: Read> {
    source: R,
    buf: Vec<u8>,
    /// Offset of the first unconsumed byte in `buf`.
    offset: usize,
}

impl<R: Read> InputBuffer<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buf: Vec::new(),
            offset: 0,
        }
    }

    /// Consume exactly `n` bytes, blocking on the source as needed. Fails
    /// with `StreamUnderflow` if the source ends first.
    pub fn read(&mut self, n: usize) -> Result<&[u8]> {
        self.fill(n)?;
        let out = &self.buf[self.offset..self.offset + n];
        self.offset += n;
        Ok(out)
    }

    /// Look at the next `n` bytes without consuming them. Repeated peeks
    /// return identical bytes until a `read` advances the cursor.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        self.fill(n)?;
        Ok(&self.buf[self.offset..self.offset + n])
    }

    /// Ensure at least `n` unconsumed bytes are buffered.
    fn fill(&mut self, n: usize) -> Result<()> {
        if self.buf.len() - self.offset >= n {
            return Ok(());
        }

        // Drop the already-consumed prefix so the buffer only ever holds
        // unread bytes plus whatever the last refill over-pulled.
        self.buf.drain(..self.offset);
        self.offset = 0;

        let mut chunk = [0u8; REFILL_SIZE];
        while self.buf.len() < n {
            let pulled = self.source.read(&mut chunk)?;
            if pulled == 0 {
                return Err(Error::underflow());
            }
            self.buf.extend_from_slice(&chunk[..pulled]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Trickle;
    use crate::ErrorKind;

    #[test]
    fn exact_reads_advance() {
        let mut input = InputBuffer::new(&[1u8, 2, 3, 4, 5][..]);
        assert_eq!(input.read(2).unwrap(), &[1, 2]);
        assert_eq!(input.read(3).unwrap(), &[3, 4, 5]);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut input = InputBuffer::new(&[9u8, 8, 7][..]);
        assert_eq!(input.peek(1).unwrap(), &[9]);
        assert_eq!(input.peek(2).unwrap(), &[9, 8]);
        assert_eq!(input.peek(1).unwrap(), &[9]);
        assert_eq!(input.read(3).unwrap(), &[9, 8, 7]);
    }

    #[test]
    fn accumulates_across_short_reads() {
        let mut input = InputBuffer::new(Trickle(&[1, 2, 3, 4]));
        assert_eq!(input.read(4).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn underflow_when_source_ends() {
        let mut input = InputBuffer::new(&[1u8, 2][..]);
        let err = input.read(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StreamUnderflow);
    }

    #[test]
    fn underflow_on_peek_past_end() {
        let mut input = InputBuffer::new(Trickle(&[1]));
        assert_eq!(input.peek(1).unwrap(), &[1]);
        assert_eq!(input.peek(2).unwrap_err().kind(), ErrorKind::StreamUnderflow);
    }
}
