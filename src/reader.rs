//! Pull-decoding of NBT data, one tag at a time.

use std::convert::TryFrom;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use flate2::read::GzDecoder;

use crate::error::{Error, Result};
use crate::input::InputBuffer;
use crate::Tag;

/// A scalar or array value, as returned by [`NbtReader::read_value`].
///
/// Compounds and lists are not values here; they are entered with
/// [`NbtReader::start_compound`] and [`NbtReader::start_list`] instead.
#[derive(Debug, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(Vec<u8>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// The structural scope the cursor currently occupies.
enum Context {
    /// Inside a compound. `pending` holds the tag type declared by the last
    /// `read_name`, consumed by exactly one value operation. `done` is set
    /// once `read_name` has seen the End marker; only `end_compound` is valid
    /// after that.
    Compound { pending: Option<Tag>, done: bool },
    /// Inside a list. Every element shares `element`; `remaining` counts down
    /// from the declared size to zero.
    List { element: Tag, remaining: i32 },
}

/// Decodes an NBT stream one tag at a time, tracking only the nesting path
/// from the root to the current tag.
///
/// The reader is driven explicitly: in a compound, call [`read_name`] to
/// learn the next entry's type and name, then the matching value operation
/// (or `start_compound`/`start_list` for nested scopes); in a list, call the
/// value operation for the list's element type directly. Every operation
/// checks the structural rules of the format and fails with a typed
/// [`Error`] on the first violation. After an error the stream position is
/// unreliable and the reader should be discarded.
///
/// The document root is always a compound, so a fresh reader starts in
/// compound context: the first call is `read_name` for the root tag.
///
/// [`read_name`]: NbtReader::read_name
pub struct NbtReader<R: Read> {
    input: InputBuffer<R>,
    stack: Vec<Context>,
    surface: Context,
}

impl NbtReader<GzDecoder<File>> {
    /// Open a gzip-compressed NBT file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(GzDecoder::new(file)))
    }
}

impl<R: Read> NbtReader<R> {
    /// Create a reader over any byte source. The source must yield the
    /// uncompressed NBT encoding; use [`NbtReader::open`] for gzip files.
    pub fn new(reader: R) -> Self {
        Self {
            input: InputBuffer::new(reader),
            stack: Vec::new(),
            surface: Context::Compound {
                pending: None,
                done: false,
            },
        }
    }

    /// Read the type and name of the next compound entry, leaving its value
    /// to be read by a following operation. Returns `None` without consuming
    /// anything if the compound has no more entries, in which case the caller
    /// should `end_compound`.
    pub fn read_name(&mut self) -> Result<Option<(Tag, Vec<u8>)>> {
        match &self.surface {
            Context::List { .. } => {
                return Err(Error::context_mismatch("list entries have no names"))
            }
            Context::Compound {
                pending: Some(_), ..
            } => {
                return Err(Error::name_protocol(
                    "name already read, a value operation must consume it first",
                ))
            }
            Context::Compound { done: true, .. } => {
                return Err(Error::name_protocol(
                    "compound already reported its end, close it with end_compound",
                ))
            }
            Context::Compound { .. } => {}
        }

        if self.input.peek(1)?[0] == Tag::End as u8 {
            self.surface = Context::Compound {
                pending: None,
                done: true,
            };
            return Ok(None);
        }

        let tag = self.read_tag()?;
        self.surface = Context::Compound {
            pending: Some(tag),
            done: false,
        };
        let name = self.read_string_payload()?;
        Ok(Some((tag, name)))
    }

    /// Enter a compound value. The pending type must be `Tag::Compound`.
    pub fn start_compound(&mut self) -> Result<()> {
        self.expect(Tag::Compound)?;
        self.push(Context::Compound {
            pending: None,
            done: false,
        });
        Ok(())
    }

    /// Leave the current compound. The next byte must be the End marker.
    pub fn end_compound(&mut self) -> Result<()> {
        match self.surface {
            Context::Compound { .. } if !self.stack.is_empty() => {}
            Context::Compound { .. } => {
                return Err(Error::context_mismatch("no open compound to close"))
            }
            Context::List { .. } => {
                return Err(Error::context_mismatch("closing a compound inside a list"))
            }
        }
        let next = self.input.peek(1)?[0];
        if next != Tag::End as u8 {
            return Err(Error::expected_end_tag(next));
        }
        self.input.read(1)?;
        self.pop();
        Ok(())
    }

    /// Enter a list value, returning its element type and declared size. The
    /// pending type must be `Tag::List`. Exactly `size` element operations
    /// must follow before [`NbtReader::end_list`].
    pub fn start_list(&mut self) -> Result<(Tag, i32)> {
        self.expect(Tag::List)?;
        let element = self.read_tag()?;
        let size = self.read_i32_payload()?;
        if size < 0 {
            return Err(Error::negative_list_count(size));
        }
        self.push(Context::List {
            element,
            remaining: size,
        });
        Ok((element, size))
    }

    /// Leave the current list. All declared elements must have been read.
    pub fn end_list(&mut self) -> Result<()> {
        match self.surface {
            Context::List { remaining: 0, .. } => {}
            Context::List { remaining, .. } => return Err(Error::list_unfinished(remaining)),
            Context::Compound { .. } => {
                return Err(Error::context_mismatch("closing a list inside a compound"))
            }
        }
        self.pop();
        Ok(())
    }

    pub fn read_byte(&mut self) -> Result<i8> {
        self.expect(Tag::Byte)?;
        Ok(self.input.read(1)?[0] as i8)
    }

    pub fn read_short(&mut self) -> Result<i16> {
        self.expect(Tag::Short)?;
        Ok(BigEndian::read_i16(self.input.read(2)?))
    }

    pub fn read_int(&mut self) -> Result<i32> {
        self.expect(Tag::Int)?;
        self.read_i32_payload()
    }

    pub fn read_long(&mut self) -> Result<i64> {
        self.expect(Tag::Long)?;
        Ok(BigEndian::read_i64(self.input.read(8)?))
    }

    pub fn read_float(&mut self) -> Result<f32> {
        self.expect(Tag::Float)?;
        Ok(BigEndian::read_f32(self.input.read(4)?))
    }

    pub fn read_double(&mut self) -> Result<f64> {
        self.expect(Tag::Double)?;
        Ok(BigEndian::read_f64(self.input.read(8)?))
    }

    /// Read a string value as raw bytes. The codec does not validate or
    /// convert string contents.
    pub fn read_string(&mut self) -> Result<Vec<u8>> {
        self.expect(Tag::String)?;
        self.read_string_payload()
    }

    pub fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        self.expect(Tag::ByteArray)?;
        let len = self.read_array_len()?;
        Ok(self.input.read(len)?.to_vec())
    }

    pub fn read_int_array(&mut self) -> Result<Vec<i32>> {
        self.expect(Tag::IntArray)?;
        let len = self.read_array_len()?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(BigEndian::read_i32(self.input.read(4)?));
        }
        Ok(out)
    }

    pub fn read_long_array(&mut self) -> Result<Vec<i64>> {
        self.expect(Tag::LongArray)?;
        let len = self.read_array_len()?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(BigEndian::read_i64(self.input.read(8)?));
        }
        Ok(out)
    }

    /// Read a byte-array value in chunks of at most `chunk_size` bytes, so a
    /// large payload never has to be resident in full.
    ///
    /// The returned cursor borrows the reader; drive it with
    /// [`ByteArrayChunks::next_chunk`] until it yields `None`. Abandoning it
    /// part way leaves the stream positioned inside the payload with no way
    /// to recover — the caller must exhaust it before using the reader again.
    pub fn read_byte_array_chunks(&mut self, chunk_size: usize) -> Result<ByteArrayChunks<'_, R>> {
        self.expect(Tag::ByteArray)?;
        let remaining = self.read_array_len()?;
        Ok(ByteArrayChunks {
            input: &mut self.input,
            remaining,
            // a zero chunk size would never make progress
            chunk_size: chunk_size.max(1),
        })
    }

    /// Read whichever scalar or array value `tag` names. Convenient when
    /// dispatching on the result of [`NbtReader::read_name`] without caring
    /// about the concrete type.
    pub fn read_value(&mut self, tag: Tag) -> Result<Value> {
        Ok(match tag {
            Tag::Byte => Value::Byte(self.read_byte()?),
            Tag::Short => Value::Short(self.read_short()?),
            Tag::Int => Value::Int(self.read_int()?),
            Tag::Long => Value::Long(self.read_long()?),
            Tag::Float => Value::Float(self.read_float()?),
            Tag::Double => Value::Double(self.read_double()?),
            Tag::ByteArray => Value::ByteArray(self.read_byte_array()?),
            Tag::String => Value::String(self.read_string()?),
            Tag::IntArray => Value::IntArray(self.read_int_array()?),
            Tag::LongArray => Value::LongArray(self.read_long_array()?),
            Tag::End | Tag::List | Tag::Compound => return Err(Error::unsupported_value(tag)),
        })
    }

    /// The shared step before every value operation: in a compound, take the
    /// type declared by `read_name`; in a list, count down and use the list's
    /// fixed element type.
    fn consume_expected_type(&mut self) -> Result<Tag> {
        match &mut self.surface {
            Context::Compound { pending, .. } => pending.take().ok_or_else(|| {
                Error::name_protocol("no name read before reading a compound entry's value")
            }),
            Context::List { element, remaining } => {
                if *remaining == 0 {
                    return Err(Error::list_exhausted());
                }
                *remaining -= 1;
                Ok(*element)
            }
        }
    }

    fn expect(&mut self, tag: Tag) -> Result<()> {
        let actual = self.consume_expected_type()?;
        if actual != tag {
            return Err(Error::tag_mismatch(tag, actual));
        }
        Ok(())
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let byte = self.input.read(1)?[0];
        Tag::try_from(byte).map_err(|_| Error::invalid_tag(byte))
    }

    fn read_i32_payload(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.input.read(4)?))
    }

    fn read_array_len(&mut self) -> Result<usize> {
        let len = self.read_i32_payload()?;
        usize::try_from(len)
            .map_err(|_| Error::array_length(format!("array declared a negative length: {len}")))
    }

    fn read_string_payload(&mut self) -> Result<Vec<u8>> {
        let len = BigEndian::read_u16(self.input.read(2)?) as usize;
        Ok(self.input.read(len)?.to_vec())
    }

    fn push(&mut self, context: Context) {
        let outer = std::mem::replace(&mut self.surface, context);
        self.stack.push(outer);
    }

    fn pop(&mut self) {
        // Callers check the stack is non-empty before consuming stream bytes.
        if let Some(outer) = self.stack.pop() {
            self.surface = outer;
        }
    }
}

/// A forward-only cursor over one byte-array payload, produced by
/// [`NbtReader::read_byte_array_chunks`].
pub struct ByteArrayChunks<'a, R: Read> {
    input: &'a mut InputBuffer<R>,
    remaining: usize,
    chunk_size: usize,
}

impl<R: Read> ByteArrayChunks<'_, R> {
    /// Produce the next chunk, or `None` once the declared length has been
    /// delivered. Chunks sum to exactly the declared length; every chunk but
    /// possibly the last is `chunk_size` bytes.
    pub fn next_chunk(&mut self) -> Result<Option<Vec<u8>>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let take = self.remaining.min(self.chunk_size);
        let chunk = self.input.read(take)?.to_vec();
        self.remaining -= take;
        Ok(Some(chunk))
    }

    /// Bytes of the payload not yet delivered.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}
