//! nbtstream is a streaming codec for Minecraft's NBT format. It lets you
//! read and write gzip-compressed NBT data one tag at a time, tracking only
//! the path from the document root to the current tag, never the whole tree.
//!
//! * For pull-decoding see [`NbtReader`].
//! * For push-encoding see [`NbtWriter`].
//!
//! The caller drives the codec explicitly, matching the structure of the
//! document: read a name, then read the value of the returned tag type; or
//! stage a name, then write a value. Compounds and lists are entered and
//! left with explicit start/end calls, and the codec checks every structural
//! rule of the format as bytes flow — a mismatched tag type, an over-full
//! list or a close against the wrong scope surfaces a typed [`Error`]
//! immediately.
//!
//! Strings and names are opaque length-prefixed byte regions. The codec does
//! not validate or convert their contents.
//!
//! # Quick example
//!
//! Write a small document to a gzip-compressed file and read it back:
//!
//! ```no_run
//! use nbtstream::{NbtReader, NbtWriter, Tag};
//!
//! # fn main() -> nbtstream::Result<()> {
//! let mut writer = NbtWriter::create("player.dat")?;
//! writer.name(b"")?;
//! writer.start_compound()?;
//! writer.name(b"Health")?;
//! writer.write_int(20)?;
//! writer.end_compound()?;
//! writer.close()?;
//!
//! let mut reader = NbtReader::open("player.dat")?;
//! let (tag, _name) = reader.read_name()?.unwrap();
//! assert_eq!(tag, Tag::Compound);
//! reader.start_compound()?;
//! while let Some((tag, name)) = reader.read_name()? {
//!     assert_eq!(name, b"Health");
//!     assert_eq!(tag, Tag::Int);
//!     assert_eq!(reader.read_int()?, 20);
//! }
//! reader.end_compound()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Large byte arrays
//!
//! Byte-array payloads can be transferred in caller-sized chunks so that a
//! multi-megabyte blob never has to be resident in full. See
//! [`NbtReader::read_byte_array_chunks`] and
//! [`NbtWriter::write_byte_array_chunks`].

pub mod error;

mod input;
mod reader;
mod writer;

pub use error::{Error, ErrorKind, Result};
pub use reader::{ByteArrayChunks, NbtReader, Value};
pub use writer::{ByteArraySink, NbtWriter};

#[cfg(test)]
mod test;

use std::convert::TryFrom;

/// An NBT tag. This does not carry the value or the name of the data.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum Tag {
    /// Represents the end of a Compound object.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64.
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// Represents an array of bytes.
    ByteArray = 7,
    /// Represents a length-prefixed region of string bytes.
    String = 8,
    /// Represents a list of other values, all sharing one element type.
    List = 9,
    /// Represents a struct-like structure of named values.
    Compound = 10,
    /// Represents an array of Int (i32).
    IntArray = 11,
    /// Represents an array of Long (i64).
    LongArray = 12,
}

// Crates exist to generate this code for us, but would add to our compile
// times, so we instead write it out manually, the tags will very rarely
// change so isn't a massive burden, but saves a significant amount of
// compile time.
impl TryFrom<u8> for Tag {
    type Error = ();

    fn try_from(value: u8) -> std::result::Result<Self, ()> {
        use Tag::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13..=u8::MAX => return Err(()),
        })
    }
}
