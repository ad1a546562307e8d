//! Errors produced while decoding NTLM messages.


use std::fmt;


/// The broad category of a [`ParsingError`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    /// The signature and message type do not match any known NTLM message.
    UnrecognizedMessage,

    /// The message is truncated or one of its fields points outside of it.
    InvalidMessage,

    /// The textual (base64 or hex) representation could not be turned into bytes.
    Transcoding,
}


/// An error that may occur while decoding an NTLM message.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsingError {
    /// The magic value or the message type does not identify a known message.
    UnrecognizedMessage { signature: Vec<u8>, message_type: u32 },

    /// The message is too short to contain a fixed field.
    ShortField { offset: usize, expected_len: usize, obtained_len: usize },

    /// A security buffer points past the end of the message.
    BufferOutOfRange { offset: u32, length: u16, message_len: usize },

    /// A target information entry runs past the end of its security buffer.
    TargetInfoOutOfRange { position: usize, expected_len: usize, obtained_len: usize },

    /// A timestamp cannot be represented as a calendar time.
    InvalidTimestamp { ticks: u64 },

    /// A byte string cannot be decoded using the current OEM encoding.
    InvalidOemEncoding { value: Vec<u8> },

    /// The input is not valid base64.
    Base64(base64::DecodeError),

    /// The input is not valid hexadecimal.
    Hex(hex::FromHexError),
}
impl ParsingError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnrecognizedMessage { .. }
                => ErrorKind::UnrecognizedMessage,
            Self::ShortField { .. }
            | Self::BufferOutOfRange { .. }
            | Self::TargetInfoOutOfRange { .. }
            | Self::InvalidTimestamp { .. }
            | Self::InvalidOemEncoding { .. }
                => ErrorKind::InvalidMessage,
            Self::Base64(_)
            | Self::Hex(_)
                => ErrorKind::Transcoding,
        }
    }
}
impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedMessage { signature, message_type }
                => write!(f, "unrecognized message (signature {:?}, type {})", signature, message_type),
            Self::ShortField { offset, expected_len, obtained_len }
                => write!(f, "invalid message: field at offset {} needs {} bytes, message has {}", offset, expected_len, obtained_len),
            Self::BufferOutOfRange { offset, length, message_len }
                => write!(f, "invalid message: security buffer {}+{} exceeds message length {}", offset, length, message_len),
            Self::TargetInfoOutOfRange { position, expected_len, obtained_len }
                => write!(f, "invalid message: target info entry at {} needs {} bytes, buffer has {}", position, expected_len, obtained_len),
            Self::InvalidTimestamp { ticks }
                => write!(f, "invalid message: timestamp {} is out of range", ticks),
            Self::InvalidOemEncoding { value }
                => write!(f, "invalid message: failed to decode value with the current OEM encoding: {:?}", value),
            Self::Base64(e)
                => write!(f, "failed to decode base64: {}", e),
            Self::Hex(e)
                => write!(f, "failed to decode hex: {}", e),
        }
    }
}
impl std::error::Error for ParsingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Base64(e) => Some(e),
            Self::Hex(e) => Some(e),
            _ => None,
        }
    }
}
impl From<base64::DecodeError> for ParsingError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Base64(e)
    }
}
impl From<hex::FromHexError> for ParsingError {
    fn from(e: hex::FromHexError) -> Self {
        Self::Hex(e)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let unrecognized = ParsingError::UnrecognizedMessage { signature: b"NTLMSSP\0".to_vec(), message_type: 4 };
        assert_eq!(unrecognized.kind(), ErrorKind::UnrecognizedMessage);

        let out_of_range = ParsingError::BufferOutOfRange { offset: 40, length: 8, message_len: 44 };
        assert_eq!(out_of_range.kind(), ErrorKind::InvalidMessage);
        assert_eq!(
            out_of_range.to_string(),
            "invalid message: security buffer 40+8 exceeds message length 44",
        );

        let hex_err = ParsingError::from(hex::FromHexError::OddLength);
        assert_eq!(hex_err.kind(), ErrorKind::Transcoding);
        assert!(std::error::Error::source(&hex_err).is_some());
    }
}
