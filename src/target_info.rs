//! The target information (AV_PAIR) list carried by Challenge messages.


use std::fmt;

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use log::{debug, trace};

use crate::error::ParsingError;
use crate::filetime::{filetime_to_utc, format_timestamp};
use crate::text::utf16_le_bytes_to_string;


/// The type of additional target information included in the Challenge message.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TargetInfoType {
    EndOfList,
    NbComputerName,
    NbDomainName,
    DnsComputerName,
    DnsDomainName,
    DnsTreeName,
    Flags,
    Timestamp,
    SingleHost,
    TargetName,
    ChannelBindings,
    Unknown(u16),
}
impl TargetInfoType {
    /// Whether entries of this type always carry a UTF-16 string.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::NbComputerName | Self::NbDomainName | Self::DnsComputerName | Self::DnsDomainName
            | Self::DnsTreeName | Self::TargetName
        )
    }
}
impl From<TargetInfoType> for u16 {
    fn from(t: TargetInfoType) -> Self {
        match t {
            TargetInfoType::EndOfList => 0x0000,
            TargetInfoType::NbComputerName => 0x0001,
            TargetInfoType::NbDomainName => 0x0002,
            TargetInfoType::DnsComputerName => 0x0003,
            TargetInfoType::DnsDomainName => 0x0004,
            TargetInfoType::DnsTreeName => 0x0005,
            TargetInfoType::Flags => 0x0006,
            TargetInfoType::Timestamp => 0x0007,
            TargetInfoType::SingleHost => 0x0008,
            TargetInfoType::TargetName => 0x0009,
            TargetInfoType::ChannelBindings => 0x000A,
            TargetInfoType::Unknown(w) => w,
        }
    }
}
impl From<u16> for TargetInfoType {
    fn from(w: u16) -> Self {
        match w {
            0x0000 => TargetInfoType::EndOfList,
            0x0001 => TargetInfoType::NbComputerName,
            0x0002 => TargetInfoType::NbDomainName,
            0x0003 => TargetInfoType::DnsComputerName,
            0x0004 => TargetInfoType::DnsDomainName,
            0x0005 => TargetInfoType::DnsTreeName,
            0x0006 => TargetInfoType::Flags,
            0x0007 => TargetInfoType::Timestamp,
            0x0008 => TargetInfoType::SingleHost,
            0x0009 => TargetInfoType::TargetName,
            0x000A => TargetInfoType::ChannelBindings,
            other => TargetInfoType::Unknown(other),
        }
    }
}


bitflags! {
    /// Flags carried by the `MsvAvFlags` target information entry.
    #[derive(Clone, Copy, Debug, Default, Hash, Eq, Ord, PartialEq, PartialOrd)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize))]
    pub struct AvFlags: u32 {
        const CONSTRAINED_AUTHENTICATION = 0x0000_0001;
        const MIC_PRESENT = 0x0000_0002;
        const UNTRUSTED_SPN_SOURCE = 0x0000_0004;
    }
}


/// The decoded content of a target information entry.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TargetInfoValue {
    /// No content; used by the end-of-list entry.
    Empty,
    Text(String),
    Flags(AvFlags),
    Timestamp(DateTime<Utc>),

    /// Content without a dedicated decoder, or whose length does not fit its type.
    Raw(#[cfg_attr(feature = "serde", serde(serialize_with = "crate::wire::serialize_hex"))] Vec<u8>),
}
impl fmt::Display for TargetInfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => write!(f, "{}", s),
            Self::Flags(flags) => {
                write!(f, "0x{:08x}", flags.bits())?;
                let names: Vec<&str> = flags.iter_names().map(|(name, _flag)| name).collect();
                if names.len() > 0 {
                    write!(f, " ({})", names.join(" "))?;
                }
                Ok(())
            },
            Self::Timestamp(time) => write!(f, "{}", format_timestamp(time)),
            Self::Raw(bytes) => write!(f, "{}", hex::encode(bytes)),
        }
    }
}


/// An entry of additional target information included in the Challenge message.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetInfoAttribute {
    pub kind: TargetInfoType,

    /// The length of the content as declared in the entry header.
    pub length: u16,

    pub value: TargetInfoValue,
}
impl TargetInfoAttribute {
    /// Attempts to decode a target info entry at the start of `bytes`. If successful, returns the
    /// entry as well as the bytes following it.
    ///
    /// `position` is the offset of `bytes` within the target information buffer and is only used
    /// for error reporting.
    fn try_from_bytes(bytes: &[u8], position: usize) -> Result<(Self, &[u8]), ParsingError> {
        if bytes.len() < 4 {
            return Err(ParsingError::TargetInfoOutOfRange { position, expected_len: 4, obtained_len: bytes.len() });
        }

        let kind: TargetInfoType = u16::from_le_bytes([bytes[0], bytes[1]]).into();
        let length = u16::from_le_bytes([bytes[2], bytes[3]]);
        let length_usize = usize::from(length);

        if 4 + length_usize > bytes.len() {
            return Err(ParsingError::TargetInfoOutOfRange { position, expected_len: 4 + length_usize, obtained_len: bytes.len() });
        }
        let content = &bytes[4..4+length_usize];
        let value = decode_value(kind, content)?;
        trace!("target info entry at {}: {:?} ({} bytes) = {}", position, kind, length, value);

        let entry = Self {
            kind,
            length,
            value,
        };
        Ok((entry, &bytes[4+length_usize..]))
    }
}

fn decode_value(kind: TargetInfoType, content: &[u8]) -> Result<TargetInfoValue, ParsingError> {
    // always Unicode, even if the flags claim OEM
    if kind.is_text() {
        return Ok(TargetInfoValue::Text(utf16_le_bytes_to_string(content)));
    }

    let value = match (kind, content.len()) {
        (TargetInfoType::EndOfList, 0) => TargetInfoValue::Empty,
        (TargetInfoType::Flags, 4) => {
            let bits = u32::from_le_bytes([content[0], content[1], content[2], content[3]]);
            TargetInfoValue::Flags(AvFlags::from_bits_retain(bits))
        },
        (TargetInfoType::Timestamp, 8) => {
            let low = u32::from_le_bytes([content[0], content[1], content[2], content[3]]);
            let high = u32::from_le_bytes([content[4], content[5], content[6], content[7]]);
            let ticks = (u64::from(high) << 32) | u64::from(low);
            TargetInfoValue::Timestamp(filetime_to_utc(ticks)?)
        },
        (TargetInfoType::EndOfList, len) | (TargetInfoType::Flags, len) | (TargetInfoType::Timestamp, len) => {
            debug!("target info entry {:?} has unexpected length {}; keeping raw content", kind, len);
            TargetInfoValue::Raw(Vec::from(content))
        },
        _ => TargetInfoValue::Raw(Vec::from(content)),
    };
    Ok(value)
}


/// Decodes the complete target information buffer of a Challenge message.
///
/// Decoding stops once the buffer is exhausted or an end-of-list entry has been read. Either
/// condition occurring without the other is tolerated and logged.
pub fn decode_target_info(buffer: &[u8]) -> Result<Vec<TargetInfoAttribute>, ParsingError> {
    let mut attributes = Vec::new();
    let mut rest = buffer;
    while rest.len() > 0 {
        let position = buffer.len() - rest.len();
        let (attribute, next) = TargetInfoAttribute::try_from_bytes(rest, position)?;
        rest = next;

        let is_end = attribute.kind == TargetInfoType::EndOfList;
        attributes.push(attribute);
        if is_end {
            if rest.len() > 0 {
                debug!("{} bytes of target info follow the end-of-list entry", rest.len());
            }
            break;
        }
    }

    let terminated = attributes.last()
        .map(|a| a.kind == TargetInfoType::EndOfList)
        .unwrap_or(false);
    if !terminated {
        debug!("target info list ({} entries) lacks an end-of-list entry", attributes.len());
    }

    Ok(attributes)
}


/// The known target information entries, mapped onto named fields.
///
/// Entries of unknown types are not represented here. If a type occurs more than once, the last
/// occurrence wins.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TargetInfoSummary {
    pub netbios_computer_name: Option<String>,
    pub netbios_domain_name: Option<String>,
    pub dns_computer_name: Option<String>,
    pub dns_domain_name: Option<String>,
    pub dns_tree_name: Option<String>,
    pub flags: Option<AvFlags>,
    pub timestamp: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::wire::serialize_hex_opt"))]
    pub single_host: Option<Vec<u8>>,
    pub target_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(serialize_with = "crate::wire::serialize_hex_opt"))]
    pub channel_bindings: Option<Vec<u8>>,
}
impl From<&[TargetInfoAttribute]> for TargetInfoSummary {
    fn from(attributes: &[TargetInfoAttribute]) -> Self {
        let mut summary = Self::default();
        for attribute in attributes {
            match (attribute.kind, &attribute.value) {
                (TargetInfoType::NbComputerName, TargetInfoValue::Text(s)) => summary.netbios_computer_name = Some(s.clone()),
                (TargetInfoType::NbDomainName, TargetInfoValue::Text(s)) => summary.netbios_domain_name = Some(s.clone()),
                (TargetInfoType::DnsComputerName, TargetInfoValue::Text(s)) => summary.dns_computer_name = Some(s.clone()),
                (TargetInfoType::DnsDomainName, TargetInfoValue::Text(s)) => summary.dns_domain_name = Some(s.clone()),
                (TargetInfoType::DnsTreeName, TargetInfoValue::Text(s)) => summary.dns_tree_name = Some(s.clone()),
                (TargetInfoType::TargetName, TargetInfoValue::Text(s)) => summary.target_name = Some(s.clone()),
                (TargetInfoType::Flags, TargetInfoValue::Flags(f)) => summary.flags = Some(*f),
                (TargetInfoType::Timestamp, TargetInfoValue::Timestamp(t)) => summary.timestamp = Some(*t),
                (TargetInfoType::SingleHost, TargetInfoValue::Raw(b)) => summary.single_host = Some(b.clone()),
                (TargetInfoType::ChannelBindings, TargetInfoValue::Raw(b)) => summary.channel_bindings = Some(b.clone()),
                _ => {},
            }
        }
        summary
    }
}
