use std::io::Read;

mod roundtrip;

/// A source that delivers at most one byte per read call, regardless of how
/// much was asked for. Imitates the worst case of a decompressor handing
/// back data in lumps unrelated to the request size.
pub struct Trickle<'a>(pub &'a [u8]);

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.0.split_first() {
            Some((b, rest)) => {
                buf[0] = *b;
                self.0 = rest;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
