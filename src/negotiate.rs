//! The Negotiate (type 1) message.


use log::debug;

use crate::error::ParsingError;
use crate::flags::Flags;
use crate::text::oem_bytes_to_string;
use crate::wire::{OsVersion, SecurityBuffer, read_u32_le};


/// The offset at which the payload starts if the message carries no version structure.
const PAYLOAD_OFFSET_WITHOUT_VERSION: u32 = 32;


/// The contents of an NTLM Negotiate message.
///
/// The Negotiate message is the first message in an NTLM challenge-response process and is sent by
/// the client to the server; the server is expected to respond with a Challenge message.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NegotiateMessage {
    /// Stores which information has been specified and which NTLM behavior should be negotiated.
    pub flags: Flags,

    pub supplied_domain_secbuf: SecurityBuffer,
    pub supplied_workstation_secbuf: SecurityBuffer,

    /// The domain against which the client wishes to authenticate.
    pub supplied_domain: String,

    /// The NT hostname of the client.
    pub supplied_workstation: String,

    /// Version information about the client's operating system.
    pub os_version: Option<OsVersion>,
}
impl TryFrom<&[u8]> for NegotiateMessage {
    type Error = ParsingError;

    /// Decodes a Negotiate message. `value` is the complete message, magic included.
    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let flags = Flags::from_bits_retain(read_u32_le(value, 12)?);

        if value.len() == 16 {
            // the oldest clients send nothing but the flags
            debug!("bare negotiate message");
            return Ok(Self {
                flags,
                ..Default::default()
            });
        }

        let supplied_domain_secbuf = SecurityBuffer::read_at(value, 16)?;
        let supplied_workstation_secbuf = SecurityBuffer::read_at(value, 24)?;

        // a payload that does not start right after the security buffers leaves room for the
        // version structure
        let os_version = if supplied_domain_secbuf.offset != PAYLOAD_OFFSET_WITHOUT_VERSION {
            Some(OsVersion::read_at(value, 32)?)
        } else {
            None
        };

        // both strings are always OEM, independent of the flags
        let supplied_domain = oem_bytes_to_string(supplied_domain_secbuf.apply_to(value)?)?;
        let supplied_workstation = oem_bytes_to_string(supplied_workstation_secbuf.apply_to(value)?)?;

        Ok(Self {
            flags,
            supplied_domain_secbuf,
            supplied_workstation_secbuf,
            supplied_domain,
            supplied_workstation,
            os_version,
        })
    }
}
