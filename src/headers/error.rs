//! Error types that can occur during header related operation.

/// An error that can occur in header related operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderError {
    /// Header line have no `:` separator.
    InvalidHeader,
    /// Field name is empty or followed by whitespace before the colon.
    InvalidFieldName,
    /// Field name contains a byte outside the token set.
    InvalidFieldNameCharacter(u8),
    /// Field value contains `\r` or `\n`.
    InvalidFieldValue,
}

impl std::error::Error for HeaderError {}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHeader => f.write_str("invalid header"),
            Self::InvalidFieldName => f.write_str("invalid field name"),
            Self::InvalidFieldNameCharacter(byte) => {
                write!(f, "invalid character in field name: '{}'", byte.escape_ascii())
            }
            Self::InvalidFieldValue => f.write_str("invalid field value"),
        }
    }
}
