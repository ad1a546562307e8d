//! A decoder for NTLM authentication messages.
//!
//! Turns the Negotiate, Challenge and Authenticate messages of the NTLM challenge-response
//! handshake into inspectable structures, for diagnostics and protocol analysis. Decoding never
//! panics; truncated or inconsistent messages yield a [`ParsingError`].
//!
//! Sample usage:
//! ```
//! let challenge_b64 = concat!(
//!     "TlRMTVNTUAACAAAABgAGADgAAAA1goniaaCGDXCRRNUAAAAAAAAAAIIAggA+AAAACgC6RwAAAA9KAEwARwACAAYASgBM",
//!     "AEcAAQAQAEMASABPAFUAQwBIAE8AVQAEABIAagBsAGcALgBsAG8AYwBhAGwAAwAkAGMAaABvAHUAYwBoAG8AdQAuAGoA",
//!     "bABnAC4AbABvAGMAYQBsAAUAEgBqAGwAZwAuAGwAbwBjAGEAbAAHAAgAQH6UJ9691gEAAAAA",
//! );
//! let message = ntlmparse::decode_from_base64(challenge_b64)
//!     .expect("failed to decode challenge message");
//! let challenge = match message {
//!     ntlmparse::Message::Challenge(c) => c,
//!     other => panic!("wrong message: {:?}", other),
//! };
//!
//! assert_eq!(challenge.target_name, "JLG");
//! assert_eq!(challenge.challenge_hex(), "69a0860d709144d5");
//!
//! let summary = challenge.target_info_summary();
//! assert_eq!(summary.dns_computer_name.as_deref(), Some("chouchou.jlg.local"));
//! assert_eq!(
//!     challenge.os_version.map(|v| v.long_string()).as_deref(),
//!     Some("Other (10.0.18362.15)"),
//! );
//! ```


mod authenticate;
mod challenge;
mod error;
mod filetime;
mod flags;
mod negotiate;
mod os_names;
mod target_info;
mod text;
mod wire;

#[cfg(windows)]
mod encoding_windows;

#[cfg(not(windows))]
mod encoding_latin1;


use base64::prelude::{BASE64_STANDARD, Engine};
use log::debug;

pub use crate::authenticate::{AuthenticateMessage, AuthenticateVariant, SessionKeyInfo};
pub use crate::challenge::ChallengeMessage;
pub use crate::error::{ErrorKind, ParsingError};
pub use crate::filetime::{filetime_to_utc, format_timestamp};
pub use crate::flags::{FLAG_LABELS, Flags, LABEL_PREFIX, flag_labels};
pub use crate::negotiate::NegotiateMessage;
pub use crate::target_info::{
    AvFlags, TargetInfoAttribute, TargetInfoSummary, TargetInfoType, TargetInfoValue,
    decode_target_info,
};
pub use crate::text::decode_text;
pub use crate::wire::{OsVersion, SecurityBuffer};


/// The magic value at the start of every NTLMSSP data packet.
pub const NTLMSSP_MAGIC: [u8; 8] = *b"NTLMSSP\0";

/// Authentication schemes whose tokens may carry NTLM messages.
const AUTH_SCHEMES: [&str; 2] = ["NTLM", "Negotiate"];


/// An NTLM message.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Message {
    Negotiate(NegotiateMessage),
    Challenge(ChallengeMessage),
    Authenticate(AuthenticateMessage),
}
impl Message {
    /// Returns the 32-bit message number identifying the type of this message.
    pub fn message_number(&self) -> u32 {
        match self {
            Self::Negotiate(_) => 0x0000_0001,
            Self::Challenge(_) => 0x0000_0002,
            Self::Authenticate(_) => 0x0000_0003,
        }
    }

    /// Returns the protocol name of this kind of message.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Negotiate(_) => "NEGOTIATE_MESSAGE (type 1)",
            Self::Challenge(_) => "CHALLENGE_MESSAGE (type 2)",
            Self::Authenticate(_) => "AUTHENTICATE_MESSAGE (type 3)",
        }
    }

    /// Returns the negotiation flags, unless this is an Authenticate message in the first layout.
    pub fn flags(&self) -> Option<Flags> {
        match self {
            Self::Negotiate(m) => Some(m.flags),
            Self::Challenge(m) => Some(m.flags),
            Self::Authenticate(m) => m.flags(),
        }
    }

    /// Returns the operating system version, if the message carries one.
    pub fn os_version(&self) -> Option<OsVersion> {
        match self {
            Self::Negotiate(m) => m.os_version,
            Self::Challenge(m) => m.os_version,
            Self::Authenticate(m) => m.os_version(),
        }
    }
}
impl TryFrom<&[u8]> for Message {
    type Error = ParsingError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.len() < 12 {
            return Err(ParsingError::ShortField { offset: 0, expected_len: 12, obtained_len: value.len() });
        }
        let obtained_magic = &value[0..8];
        let message_type = u32::from_le_bytes([value[8], value[9], value[10], value[11]]);
        debug!("decoding message of type {} ({} bytes)", message_type, value.len());

        if obtained_magic != NTLMSSP_MAGIC {
            return Err(ParsingError::UnrecognizedMessage { signature: Vec::from(obtained_magic), message_type });
        }
        match message_type {
            0x0000_0001 => NegotiateMessage::try_from(value)
                .map(Message::Negotiate),
            0x0000_0002 => ChallengeMessage::try_from(value)
                .map(Message::Challenge),
            0x0000_0003 => AuthenticateMessage::try_from(value)
                .map(Message::Authenticate),
            other_type => Err(ParsingError::UnrecognizedMessage { signature: Vec::from(obtained_magic), message_type: other_type }),
        }
    }
}


/// Decodes an NTLM message from its binary representation.
pub fn decode_from_bytes(bytes: &[u8]) -> Result<Message, ParsingError> {
    Message::try_from(bytes)
}

/// Decodes an NTLM message from standard base64 (surrounding whitespace is ignored).
pub fn decode_from_base64(text: &str) -> Result<Message, ParsingError> {
    let bytes = BASE64_STANDARD.decode(text.trim())?;
    decode_from_bytes(&bytes)
}

/// Decodes an NTLM message from hexadecimal digits (surrounding whitespace is ignored).
pub fn decode_from_hex(text: &str) -> Result<Message, ParsingError> {
    let bytes = hex::decode(text.trim())?;
    decode_from_bytes(&bytes)
}

/// Decodes an NTLM message from the value of an HTTP authentication header.
///
/// Accepts `NTLM <base64>` and `Negotiate <base64>` (the scheme is case-insensitive) as well as a
/// bare base64 token.
pub fn decode_from_auth_header(value: &str) -> Result<Message, ParsingError> {
    let value = value.trim();
    let token = match value.split_once(' ') {
        Some((scheme, token)) if AUTH_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) => token,
        _ => value,
    };
    decode_from_base64(token)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch() {
        let negotiate = b"NTLMSSP\0\x01\x00\x00\x00\x01\x02\x00\x00";
        let message = decode_from_bytes(negotiate).unwrap();
        assert_eq!(message.message_number(), 1);
        assert_eq!(message.kind_name(), "NEGOTIATE_MESSAGE (type 1)");
        assert_eq!(message.flags(), Some(Flags::NEGOTIATE_UNICODE | Flags::NEGOTIATE_NTLM));
        assert_eq!(message.os_version(), None);
    }

    #[test]
    fn unrecognized() {
        assert_eq!(
            decode_from_bytes(b"NTLMSSP\0\x04\x00\x00\x00\x00\x00\x00\x00"),
            Err(ParsingError::UnrecognizedMessage { signature: b"NTLMSSP\0".to_vec(), message_type: 4 }),
        );
        let err = decode_from_bytes(b"NTLMSSX\0\x01\x00\x00\x00\x00\x00\x00\x00").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedMessage);
    }

    #[test]
    fn too_short() {
        let err = decode_from_bytes(b"NTLMSSP\0\x01").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMessage);
        let err = decode_from_bytes(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMessage);
    }

    #[test]
    fn auth_header() {
        let bare = "TlRMTVNTUAABAAAAB4IIogAAAAAAAAAAAAAAAAAAAAAKALpHAAAADw==";
        let expected = decode_from_base64(bare).unwrap();
        assert_eq!(decode_from_auth_header(&format!("NTLM {}", bare)).unwrap(), expected);
        assert_eq!(decode_from_auth_header(&format!("negotiate {}", bare)).unwrap(), expected);
        assert_eq!(decode_from_auth_header(bare).unwrap(), expected);

        let err = decode_from_auth_header("Basic dXNlcjpwYXNz").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transcoding);
    }

    #[test]
    fn transcoding_errors() {
        assert_eq!(decode_from_base64("not base64!").unwrap_err().kind(), ErrorKind::Transcoding);
        assert_eq!(decode_from_hex("4e544c4").unwrap_err().kind(), ErrorKind::Transcoding);
        assert_eq!(decode_from_hex("zz").unwrap_err().kind(), ErrorKind::Transcoding);
    }
}
