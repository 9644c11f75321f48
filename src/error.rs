//! Contains the Error and Result type used by the reader and writer.

use crate::Tag;

/// A structural fault in the NBT stream, or a mismatch between the stream and
/// the operations the caller invoked.
///
/// Errors are surfaced synchronously at the call that detects them and are
/// never retried internally; the stream cannot be rewound. Once a reader or
/// writer has returned an error its structural state is unreliable and the
/// instance should be discarded.
#[derive(Debug)]
pub struct Error {
    msg: String,
    kind: ErrorKind,
}

/// The category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The underlying stream ended before the requested number of bytes was
    /// available.
    StreamUnderflow,

    /// The declared or pending tag type does not match the type the invoked
    /// operation expects.
    TagTypeMismatch,

    /// More or fewer elements were read or written against a list than its
    /// declared count.
    ListCountMismatch,

    /// A close operation was invoked against a scope of the wrong kind, or
    /// with no open scope left to close.
    ContextMismatch,

    /// A value operation was attempted in a compound without a preceding name
    /// declaration, or a name was declared twice without a value in between.
    NameProtocolViolation,

    /// A tag byte outside the valid range 0..=12 was encountered.
    InvalidTag,

    /// A chunked byte-array transfer supplied more bytes than declared, or
    /// was finished before the declared length was reached.
    ArrayLengthMismatch,

    /// An I/O failure in the underlying stream other than a clean
    /// end-of-stream.
    Io,
}

/// Convenience type for Result.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub(crate) fn underflow() -> Self {
        Self {
            msg: "end of NBT stream".into(),
            kind: ErrorKind::StreamUnderflow,
        }
    }

    pub(crate) fn tag_mismatch(expected: Tag, actual: Tag) -> Self {
        Self {
            msg: format!("mismatched tag type: expected {expected:?}, was {actual:?}"),
            kind: ErrorKind::TagTypeMismatch,
        }
    }

    pub(crate) fn expected_end_tag(actual: u8) -> Self {
        Self {
            msg: format!("compound not at its end: next tag byte was {actual}"),
            kind: ErrorKind::TagTypeMismatch,
        }
    }

    pub(crate) fn list_exhausted() -> Self {
        Self {
            msg: "list already has its declared number of entries".into(),
            kind: ErrorKind::ListCountMismatch,
        }
    }

    pub(crate) fn list_unfinished(remaining: i32) -> Self {
        Self {
            msg: format!("list closed with {remaining} entries outstanding"),
            kind: ErrorKind::ListCountMismatch,
        }
    }

    pub(crate) fn negative_list_count(count: i32) -> Self {
        Self {
            msg: format!("list declared a negative count: {count}"),
            kind: ErrorKind::ListCountMismatch,
        }
    }

    pub(crate) fn context_mismatch(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: ErrorKind::ContextMismatch,
        }
    }

    pub(crate) fn name_protocol(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: ErrorKind::NameProtocolViolation,
        }
    }

    pub(crate) fn unsupported_value(tag: Tag) -> Self {
        Self {
            msg: format!("{tag:?} is not a scalar or array tag"),
            kind: ErrorKind::TagTypeMismatch,
        }
    }

    pub(crate) fn invalid_tag(t: u8) -> Self {
        Self {
            msg: format!("invalid tag: {t}"),
            kind: ErrorKind::InvalidTag,
        }
    }

    pub(crate) fn array_length(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            kind: ErrorKind::ArrayLengthMismatch,
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Self {
                msg: e.to_string(),
                kind: ErrorKind::StreamUnderflow,
            },
            _ => Self {
                msg: e.to_string(),
                kind: ErrorKind::Io,
            },
        }
    }
}
