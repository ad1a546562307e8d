//! The Authenticate (type 3) message.


use log::debug;

use crate::error::ParsingError;
use crate::flags::Flags;
use crate::text::decode_text;
use crate::wire::{OsVersion, SecurityBuffer, read_u32_le};


/// Payload offset of a message consisting only of the five original security buffers.
const PAYLOAD_OFFSET_V1: u32 = 52;

/// Payload offset of a message that adds the session key buffer and the flags.
const PAYLOAD_OFFSET_V2: u32 = 64;


/// The session key and flags, present from the second layout onwards.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SessionKeyInfo {
    pub session_key_secbuf: SecurityBuffer,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::wire::serialize_hex"))]
    pub session_key: Vec<u8>,
    pub flags: Flags,
}

/// The layout of an Authenticate message, inferred from where its payload begins.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AuthenticateVariant {
    /// Only the five original security buffers.
    V1,

    /// Adds the session key and the flags.
    V2(SessionKeyInfo),

    /// Adds the operating system version on top of the second layout.
    V3(SessionKeyInfo, OsVersion),
}
impl AuthenticateVariant {
    /// The layout number, 1 to 3.
    pub fn version(&self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2(_) => 2,
            Self::V3(_, _) => 3,
        }
    }

    pub fn session_key_info(&self) -> Option<&SessionKeyInfo> {
        match self {
            Self::V1 => None,
            Self::V2(info) => Some(info),
            Self::V3(info, _) => Some(info),
        }
    }

    pub fn os_version(&self) -> Option<OsVersion> {
        match self {
            Self::V3(_, os_version) => Some(*os_version),
            _ => None,
        }
    }
}


/// The contents of an NTLM Authenticate message.
///
/// The Authenticate message is sent by the client in response to the server's Challenge message;
/// once it is accepted by the server, the authentication has succeeded.
///
/// The flags field at offset 60 is read before the layout is known, so a message of the first
/// layout whose payload ends before byte 64 is rejected with [`ParsingError::ShortField`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AuthenticateMessage {
    pub lm_response_secbuf: SecurityBuffer,
    pub ntlm_response_secbuf: SecurityBuffer,
    pub domain_name_secbuf: SecurityBuffer,
    pub user_name_secbuf: SecurityBuffer,
    pub workstation_name_secbuf: SecurityBuffer,

    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::wire::serialize_hex"))]
    pub lm_response: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::wire::serialize_hex"))]
    pub ntlm_response: Vec<u8>,
    pub domain_name: String,
    pub user_name: String,
    pub workstation_name: String,

    pub variant: AuthenticateVariant,
}
impl AuthenticateMessage {
    /// The layout number, 1 to 3.
    pub fn version(&self) -> u8 {
        self.variant.version()
    }

    /// The decoded flags; the first layout does not carry any.
    pub fn flags(&self) -> Option<Flags> {
        self.variant.session_key_info().map(|info| info.flags)
    }

    pub fn session_key(&self) -> Option<&[u8]> {
        self.variant.session_key_info().map(|info| info.session_key.as_slice())
    }

    pub fn os_version(&self) -> Option<OsVersion> {
        self.variant.os_version()
    }

    pub fn lm_response_hex(&self) -> String {
        hex::encode(&self.lm_response)
    }

    pub fn ntlm_response_hex(&self) -> String {
        hex::encode(&self.ntlm_response)
    }

    pub fn session_key_hex(&self) -> Option<String> {
        self.session_key().map(hex::encode)
    }
}
impl TryFrom<&[u8]> for AuthenticateMessage {
    type Error = ParsingError;

    /// Decodes an Authenticate message. `value` is the complete message, magic included.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let lm_response_secbuf = SecurityBuffer::read_at(value, 12)?;
        let ntlm_response_secbuf = SecurityBuffer::read_at(value, 20)?;
        let domain_name_secbuf = SecurityBuffer::read_at(value, 28)?;
        let user_name_secbuf = SecurityBuffer::read_at(value, 36)?;
        let workstation_name_secbuf = SecurityBuffer::read_at(value, 44)?;

        // the first layout has no flags here, but the strings are decoded using whatever is there
        let flags = Flags::from_bits_retain(read_u32_le(value, 60)?);

        let lm_response = Vec::from(lm_response_secbuf.apply_to(value)?);
        let ntlm_response = Vec::from(ntlm_response_secbuf.apply_to(value)?);
        let domain_name = decode_text(domain_name_secbuf.apply_to(value)?, flags)?;
        let user_name = decode_text(user_name_secbuf.apply_to(value)?, flags)?;
        let workstation_name = decode_text(workstation_name_secbuf.apply_to(value)?, flags)?;

        // the payload follows the last fixed field, so the smallest offset tells us how many
        // fixed fields there are
        let payload_offset = [
            lm_response_secbuf,
            ntlm_response_secbuf,
            domain_name_secbuf,
            user_name_secbuf,
            workstation_name_secbuf,
        ].iter()
            .map(|sb| sb.offset)
            .min()
            .unwrap_or(PAYLOAD_OFFSET_V1);

        let variant = if payload_offset == PAYLOAD_OFFSET_V1 {
            AuthenticateVariant::V1
        } else {
            let session_key_secbuf = SecurityBuffer::read_at(value, 52)?;
            let session_key = Vec::from(session_key_secbuf.apply_to(value)?);
            let info = SessionKeyInfo {
                session_key_secbuf,
                session_key,
                flags,
            };
            if payload_offset == PAYLOAD_OFFSET_V2 {
                AuthenticateVariant::V2(info)
            } else {
                AuthenticateVariant::V3(info, OsVersion::read_at(value, 64)?)
            }
        };
        debug!("authenticate message: payload at {}, layout {}", payload_offset, variant.version());

        Ok(Self {
            lm_response_secbuf,
            ntlm_response_secbuf,
            domain_name_secbuf,
            user_name_secbuf,
            workstation_name_secbuf,
            lm_response,
            ntlm_response,
            domain_name,
            user_name,
            workstation_name,
            variant,
        })
    }
}
