use std::string::FromUtf8Error;

/// Errors that can occur while marshalling or unmarshalling.
///
/// Any error raised in the middle of a token leaves the context positioned at
/// an unknown offset; the context must not be used for further calls.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
    /// An I/O error occurred on the underlying sink or source.
    #[error("marshalling I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a declared number of bytes was read.
    #[error("{message} (expected {expected} bytes, got {actual})")]
    LengthMismatch {
        message: String,
        expected: usize,
        actual: usize,
    },

    /// A declared length was negative.
    #[error("negative length {0}")]
    NegativeLength(i32),

    /// A length exceeds what the context accepts or the format can express.
    #[error("length too large ({size}, max {max})")]
    LengthTooLarge { size: usize, max: usize },

    /// A shared string reference points at an index that was never introduced.
    #[error("unknown shared string index {0}")]
    UnknownSharedString(i32),

    /// The shared string dictionary cannot assign another index.
    #[error("too many strings in the same context")]
    TooManyStrings,

    /// No marshaller is registered for the type.
    #[error("missing object marshaller for type {0}")]
    MissingMarshaller(&'static str),

    /// No unmarshaller is registered for the type.
    #[error("missing object unmarshaller for type {0}")]
    MissingUnmarshaller(&'static str),

    /// String bytes are not valid UTF-8.
    #[error("string is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    /// A big integer rendering could not be parsed.
    #[error("invalid big integer: {0}")]
    InvalidBigInteger(String),
}

pub type Result<T> = std::result::Result<T, MarshalError>;
