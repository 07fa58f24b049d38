//! Error types for Ion reading and writing.

use thiserror::Error;

/// Errors that can occur while reading or writing Ion data.
#[derive(Error, Debug)]
pub enum IonError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller misused the reader/writer API: a field name outside a
    /// struct, an `EndX` call that doesn't match the open container, a
    /// `Finish` call in a non-top context, a write of an unregistered
    /// symbol with no builder bound, or a typed accessor called while the
    /// cursor isn't positioned on a value of that type's accessor family.
    #[error("usage error: {0}")]
    Usage(String),

    /// Malformed text or binary input that isn't covered by a more specific
    /// variant below.
    #[error("syntax error at offset {offset}: {message}")]
    Syntax { offset: u64, message: String },

    /// The stream ended in the middle of a value or container body.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: u64 },

    /// The binary version marker named a major/minor version other than
    /// the one this crate implements (1.0).
    #[error("unsupported Ion version {major}.{minor} at offset {offset}")]
    UnsupportedVersion { major: u8, minor: u8, offset: u64 },

    /// A binary tag byte's type code / length nibble combination is
    /// reserved or otherwise invalid.
    #[error("invalid tag byte 0x{byte:02x} at offset {offset}")]
    InvalidTagByte { byte: u8, offset: u64 },

    /// A text parse failed on a specific character.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedRune { found: char, offset: u64 },

    /// A text parse failed on a specific token.
    #[error("unexpected token {found:?} at offset {offset}")]
    UnexpectedToken { found: String, offset: u64 },

    /// An integer value didn't fit the accessor's target width. The
    /// `BigInt`-returning accessor never raises this.
    #[error("value out of range for the requested accessor")]
    OutOfRange,

    /// A typed accessor (`int_value`, `string_value`, ...) was called while
    /// the reader was positioned on a value of a different Ion type.
    #[error("wrong type: expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
}

impl IonError {
    pub fn usage(message: impl Into<String>) -> Self {
        IonError::Usage(message.into())
    }

    pub fn syntax(offset: u64, message: impl Into<String>) -> Self {
        IonError::Syntax {
            offset,
            message: message.into(),
        }
    }
}

pub type IonResult<T> = std::result::Result<T, IonError>;
