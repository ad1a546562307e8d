//! The Challenge (type 2) message.


use log::debug;

use crate::error::ParsingError;
use crate::flags::Flags;
use crate::target_info::{TargetInfoAttribute, TargetInfoSummary, decode_target_info};
use crate::text::decode_text;
use crate::wire::{OsVersion, SecurityBuffer, read_array, read_u32_le};


/// The contents of an NTLM Challenge message.
///
/// The Challenge message is sent by the server in response to the client's Negotiate message; the
/// client is expected to respond with an Authenticate message.
///
/// Older servers omit the trailing fixed fields. Which of them are present is inferred from the
/// offset of the target name: the payload begins right after the last fixed field.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ChallengeMessage {
    pub target_name_secbuf: SecurityBuffer,

    /// Stores which NTLM behavior has been accepted by the server from the client's request.
    pub flags: Flags,

    /// The challenge value.
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::wire::serialize_hex"))]
    pub challenge: [u8; 8],

    /// The host against which the client is authenticating.
    pub target_name: String,

    /// The context value; absent in the oldest message layout.
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::wire::serialize_hex_opt"))]
    pub context: Option<[u8; 8]>,

    pub target_info_secbuf: Option<SecurityBuffer>,

    /// Information about the targets of the authentication, in message order.
    pub target_information: Vec<TargetInfoAttribute>,

    /// Version information about the server's operating system.
    pub os_version: Option<OsVersion>,
}
impl ChallengeMessage {
    /// The challenge as a lowercase hex string.
    pub fn challenge_hex(&self) -> String {
        hex::encode(self.challenge)
    }

    /// The context as a lowercase hex string.
    pub fn context_hex(&self) -> Option<String> {
        self.context.map(hex::encode)
    }

    /// Maps the known target information entries onto named fields.
    pub fn target_info_summary(&self) -> TargetInfoSummary {
        TargetInfoSummary::from(self.target_information.as_slice())
    }
}
impl TryFrom<&[u8]> for ChallengeMessage {
    type Error = ParsingError;

    /// Decodes a Challenge message. `value` is the complete message, magic included.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let target_name_secbuf = SecurityBuffer::read_at(value, 12)?;
        let flags = Flags::from_bits_retain(read_u32_le(value, 20)?);
        let challenge: [u8; 8] = read_array(value, 24)?;
        let target_name = decode_text(target_name_secbuf.apply_to(value)?, flags)?;

        let (context, target_info_secbuf, target_information) = if target_name_secbuf.offset != 32 {
            let context: [u8; 8] = read_array(value, 32)?;
            let target_info_secbuf = SecurityBuffer::read_at(value, 40)?;
            let target_information = decode_target_info(target_info_secbuf.apply_to(value)?)?;
            (Some(context), Some(target_info_secbuf), target_information)
        } else {
            debug!("challenge without context and target info");
            (None, None, Vec::new())
        };

        let os_version = if target_name_secbuf.offset != 48 {
            Some(OsVersion::read_at(value, 48)?)
        } else {
            None
        };

        Ok(Self {
            target_name_secbuf,
            flags,
            challenge,
            target_name,
            context,
            target_info_secbuf,
            target_information,
            os_version,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::target_info::TargetInfoType;

    #[test]
    fn oldest_layout() {
        // target name directly after the challenge; no context, no target info
        let mut message = b"NTLMSSP\0\x02\x00\x00\x00".to_vec();
        message.extend_from_slice(b"\x0c\x00\x0c\x00\x20\x00\x00\x00");
        message.extend_from_slice(&0x0000_0201u32.to_le_bytes());
        message.extend_from_slice(b"\x01\x23\x45\x67\x89\xab\xcd\xef");
        message.extend_from_slice(b"D\x00O\x00M\x00A\x00I\x00N\x00");
        // pad so that the (bogus) version read at 48 stays in bounds
        message.extend_from_slice(&[0u8; 12]);

        let challenge = ChallengeMessage::try_from(message.as_slice()).unwrap();
        assert_eq!(challenge.target_name, "DOMAIN");
        assert_eq!(challenge.challenge_hex(), "0123456789abcdef");
        assert_eq!(challenge.context, None);
        assert_eq!(challenge.target_info_secbuf, None);
        assert!(challenge.target_information.is_empty());
        assert!(challenge.os_version.is_some());
    }

    #[test]
    fn oem_target_name() {
        let mut message = b"NTLMSSP\0\x02\x00\x00\x00".to_vec();
        message.extend_from_slice(b"\x06\x00\x06\x00\x30\x00\x00\x00");
        message.extend_from_slice(&0x0000_0202u32.to_le_bytes());
        message.extend_from_slice(&[0x11; 8]);
        message.extend_from_slice(&[0x00; 8]);
        message.extend_from_slice(b"\x04\x00\x04\x00\x36\x00\x00\x00");
        message.extend_from_slice(b"DOMAIN");
        message.extend_from_slice(b"\x00\x00\x00\x00");

        let challenge = ChallengeMessage::try_from(message.as_slice()).unwrap();
        assert_eq!(challenge.target_name, "DOMAIN");
        assert_eq!(challenge.context_hex().as_deref(), Some("0000000000000000"));
        assert_eq!(challenge.target_information.len(), 1);
        assert_eq!(challenge.target_information[0].kind, TargetInfoType::EndOfList);
        assert_eq!(challenge.os_version, None);
    }

    #[test]
    fn target_info_out_of_range() {
        let mut message = b"NTLMSSP\0\x02\x00\x00\x00".to_vec();
        message.extend_from_slice(b"\x00\x00\x00\x00\x30\x00\x00\x00");
        message.extend_from_slice(&0x0000_0201u32.to_le_bytes());
        message.extend_from_slice(&[0x11; 8]);
        message.extend_from_slice(&[0x00; 8]);
        message.extend_from_slice(b"\x40\x00\x40\x00\x30\x00\x00\x00");

        assert_eq!(
            ChallengeMessage::try_from(message.as_slice()),
            Err(ParsingError::BufferOutOfRange { offset: 48, length: 64, message_len: 48 }),
        );
    }
}
