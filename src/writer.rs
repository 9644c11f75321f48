//! Push-encoding of NBT data, one tag at a time.

use std::convert::TryFrom;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{Error, Result};
use crate::Tag;

/// The structural scope the cursor currently occupies. The writer never needs
/// the element type of a list: the caller supplies concrete values and the
/// count is the only thing left to police.
enum Context {
    Compound,
    List { remaining: i32 },
}

/// Encodes an NBT stream one tag at a time, mirroring [`NbtReader`].
///
/// In a compound, stage a name with [`name`] and then call exactly one value
/// operation, which emits the entry's tag byte, the staged name and the
/// payload. In a list, call value operations directly; the header already
/// declared the element type and count, so entries are payload-only. Every
/// operation checks the structural rules of the format and fails with a
/// typed [`Error`] on the first violation, after which the writer should be
/// discarded.
///
/// The document root is always a compound, so a fresh writer starts in
/// compound context: stage a root name (conventionally empty) and
/// `start_compound`.
///
/// [`NbtReader`]: crate::NbtReader
/// [`name`]: NbtWriter::name
pub struct NbtWriter<W: Write> {
    out: W,
    stack: Vec<Context>,
    surface: Context,
    pending_name: Option<Vec<u8>>,
}

impl NbtWriter<GzEncoder<File>> {
    /// Create a gzip-compressed NBT file for writing, truncating any existing
    /// file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(GzEncoder::new(file, Compression::default())))
    }

    /// Finish the gzip stream and close the file. Skipping this loses the
    /// gzip trailer and any buffered output.
    pub fn close(self) -> Result<()> {
        self.out.finish()?;
        Ok(())
    }
}

impl<W: Write> NbtWriter<W> {
    /// Create a writer over any byte sink, emitting the uncompressed NBT
    /// encoding; use [`NbtWriter::create`] for gzip files.
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: Vec::new(),
            surface: Context::Compound,
            pending_name: None,
        }
    }

    /// Stage the name of the next compound entry. Exactly one value operation
    /// must follow before the next `name`.
    pub fn name(&mut self, name: &[u8]) -> Result<()> {
        if self.pending_name.is_some() {
            return Err(Error::name_protocol(
                "name staged twice without a value in between",
            ));
        }
        self.pending_name = Some(name.to_vec());
        Ok(())
    }

    /// Open a compound value.
    pub fn start_compound(&mut self) -> Result<()> {
        self.write_tag_header(Tag::Compound)?;
        self.push(Context::Compound);
        Ok(())
    }

    /// Close the current compound, emitting its End marker.
    pub fn end_compound(&mut self) -> Result<()> {
        match self.surface {
            Context::Compound if !self.stack.is_empty() => {}
            Context::Compound => return Err(Error::context_mismatch("no open compound to close")),
            Context::List { .. } => {
                return Err(Error::context_mismatch("closing a compound inside a list"))
            }
        }
        self.out.write_all(&[Tag::End as u8])?;
        self.pop();
        Ok(())
    }

    /// Open a list of `size` elements of type `element`. Exactly `size`
    /// element operations must follow before [`NbtWriter::end_list`].
    pub fn start_list(&mut self, size: i32, element: Tag) -> Result<()> {
        if size < 0 {
            return Err(Error::negative_list_count(size));
        }
        self.write_tag_header(Tag::List)?;
        self.out.write_all(&[element as u8])?;
        self.write_i32_payload(size)?;
        self.push(Context::List { remaining: size });
        Ok(())
    }

    /// Close the current list. All declared elements must have been written.
    pub fn end_list(&mut self) -> Result<()> {
        match self.surface {
            Context::List { remaining: 0 } => {}
            Context::List { remaining } => return Err(Error::list_unfinished(remaining)),
            Context::Compound => {
                return Err(Error::context_mismatch("closing a list inside a compound"))
            }
        }
        self.pop();
        Ok(())
    }

    pub fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_tag_header(Tag::Byte)?;
        self.out.write_all(&[value as u8])?;
        Ok(())
    }

    pub fn write_short(&mut self, value: i16) -> Result<()> {
        self.write_tag_header(Tag::Short)?;
        let mut buf = [0; 2];
        BigEndian::write_i16(&mut buf, value);
        Ok(self.out.write_all(&buf)?)
    }

    pub fn write_int(&mut self, value: i32) -> Result<()> {
        self.write_tag_header(Tag::Int)?;
        self.write_i32_payload(value)
    }

    pub fn write_long(&mut self, value: i64) -> Result<()> {
        self.write_tag_header(Tag::Long)?;
        let mut buf = [0; 8];
        BigEndian::write_i64(&mut buf, value);
        Ok(self.out.write_all(&buf)?)
    }

    pub fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_tag_header(Tag::Float)?;
        let mut buf = [0; 4];
        BigEndian::write_f32(&mut buf, value);
        Ok(self.out.write_all(&buf)?)
    }

    pub fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_tag_header(Tag::Double)?;
        let mut buf = [0; 8];
        BigEndian::write_f64(&mut buf, value);
        Ok(self.out.write_all(&buf)?)
    }

    /// Write a string value from raw bytes. The codec does not validate or
    /// convert string contents.
    pub fn write_string(&mut self, value: &[u8]) -> Result<()> {
        self.write_tag_header(Tag::String)?;
        self.write_string_payload(value)
    }

    pub fn write_byte_array(&mut self, value: &[u8]) -> Result<()> {
        self.write_tag_header(Tag::ByteArray)?;
        self.write_array_len(value.len())?;
        Ok(self.out.write_all(value)?)
    }

    pub fn write_int_array(&mut self, value: &[i32]) -> Result<()> {
        self.write_tag_header(Tag::IntArray)?;
        self.write_array_len(value.len())?;
        for &v in value {
            self.write_i32_payload(v)?;
        }
        Ok(())
    }

    pub fn write_long_array(&mut self, value: &[i64]) -> Result<()> {
        self.write_tag_header(Tag::LongArray)?;
        self.write_array_len(value.len())?;
        let mut buf = [0; 8];
        for &v in value {
            BigEndian::write_i64(&mut buf, v);
            self.out.write_all(&buf)?;
        }
        Ok(())
    }

    /// Write a byte-array value of `len` total bytes in caller-supplied
    /// chunks, so a large payload never has to be resident in full.
    ///
    /// The returned sink borrows the writer; feed it with
    /// [`ByteArraySink::write_chunk`] and then call [`ByteArraySink::finish`],
    /// which checks that exactly `len` bytes arrived. Abandoning the sink
    /// part way leaves the stream with a short payload and no way to recover.
    pub fn write_byte_array_chunks(&mut self, len: usize) -> Result<ByteArraySink<'_, W>> {
        self.write_tag_header(Tag::ByteArray)?;
        self.write_array_len(len)?;
        Ok(ByteArraySink {
            out: &mut self.out,
            remaining: len,
        })
    }

    /// Write a byte-array value of `len` total bytes by draining `reader` to
    /// the stream in chunks. Fails if `reader` yields more or fewer than
    /// `len` bytes.
    pub fn write_byte_array_from_reader(&mut self, len: usize, mut reader: impl Read) -> Result<()> {
        let mut sink = self.write_byte_array_chunks(len)?;
        let mut buf = [0u8; 2048];
        loop {
            let pulled = reader.read(&mut buf)?;
            if pulled == 0 {
                break;
            }
            sink.write_chunk(&buf[..pulled])?;
        }
        sink.finish()
    }

    /// Consume the writer, returning the underlying sink. The caller is
    /// responsible for flushing it.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// The shared step before every value operation: in a list, count the
    /// entry against the declared size; in a compound, emit the tag byte and
    /// the staged name.
    fn write_tag_header(&mut self, tag: Tag) -> Result<()> {
        if let Context::List { remaining } = &mut self.surface {
            if *remaining == 0 {
                return Err(Error::list_exhausted());
            }
            *remaining -= 1;
            return Ok(());
        }

        let name = self
            .pending_name
            .take()
            .ok_or_else(|| Error::name_protocol("no name staged for a compound entry"))?;
        self.out.write_all(&[tag as u8])?;
        self.write_string_payload(&name)
    }

    fn write_string_payload(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u16::try_from(bytes.len())
            .map_err(|_| Error::array_length("string longer than 65535 bytes"))?;
        let mut buf = [0; 2];
        BigEndian::write_u16(&mut buf, len);
        self.out.write_all(&buf)?;
        Ok(self.out.write_all(bytes)?)
    }

    fn write_array_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len)
            .map_err(|_| Error::array_length("array longer than i32::MAX elements"))?;
        self.write_i32_payload(len)
    }

    fn write_i32_payload(&mut self, value: i32) -> Result<()> {
        let mut buf = [0; 4];
        BigEndian::write_i32(&mut buf, value);
        Ok(self.out.write_all(&buf)?)
    }

    fn push(&mut self, context: Context) {
        let outer = std::mem::replace(&mut self.surface, context);
        self.stack.push(outer);
    }

    fn pop(&mut self) {
        if let Some(outer) = self.stack.pop() {
            self.surface = outer;
        }
    }
}

/// Accepts the chunks of one byte-array payload, produced by
/// [`NbtWriter::write_byte_array_chunks`].
pub struct ByteArraySink<'a, W: Write> {
    out: &'a mut W,
    remaining: usize,
}

impl<W: Write> ByteArraySink<'_, W> {
    /// Emit the next chunk. Fails if the chunk would push the total past the
    /// declared length.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        if chunk.len() > self.remaining {
            return Err(Error::array_length(format!(
                "chunk of {} bytes exceeds the {} still declared",
                chunk.len(),
                self.remaining
            )));
        }
        self.out.write_all(chunk)?;
        self.remaining -= chunk.len();
        Ok(())
    }

    /// Check that exactly the declared number of bytes was written.
    pub fn finish(self) -> Result<()> {
        if self.remaining != 0 {
            return Err(Error::array_length(format!(
                "byte array finished {} bytes short of its declared length",
                self.remaining
            )));
        }
        Ok(())
    }

    /// Bytes of the declared length not yet supplied.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}
