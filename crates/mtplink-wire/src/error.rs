/// Errors raised while encoding or decoding MTP wire records.
///
/// A codec error makes the transaction that produced the bytes unusable,
/// but it does not by itself require tearing down the connection.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The buffer ended before the record did.
    #[error("truncated record (needed {needed} more bytes, {remaining} left)")]
    Truncated { needed: usize, remaining: usize },

    /// A string field exceeds the 254 code-point wire limit.
    #[error("string too long ({0} UTF-16 code units, max 254)")]
    StringTooLong(usize),

    /// A variant selector carried a type code this codec does not support.
    #[error("unsupported data type code 0x{0:04x}")]
    UnsupportedType(u16),

    /// A timestamp string matched neither accepted format.
    #[error("malformed timestamp {0:?}")]
    BadTimestamp(String),

    /// A command container carried more than five parameters.
    #[error("too many command parameters ({0}, max 5)")]
    TooManyParams(usize),

    /// An array length prefix exceeds what a length prefix can express.
    #[error("array too long ({len} elements, max {max})")]
    ArrayTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, WireError>;
