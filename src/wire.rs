//! Fixed-layout structures shared by all NTLM messages.
//!
//! Every read is checked against the length of the message; nothing in here indexes a slice
//! without verifying the range first.


use std::fmt;

use crate::error::ParsingError;
use crate::os_names::product_name;


/// Returns `len` bytes of `buffer` starting at `offset`.
pub(crate) fn read_bytes(buffer: &[u8], offset: usize, len: usize) -> Result<&[u8], ParsingError> {
    let end = offset.checked_add(len)
        .ok_or(ParsingError::ShortField { offset, expected_len: len, obtained_len: buffer.len() })?;
    buffer.get(offset..end)
        .ok_or(ParsingError::ShortField { offset, expected_len: len, obtained_len: buffer.len() })
}

/// Reads a fixed-size array from `buffer` at `offset`.
pub(crate) fn read_array<const N: usize>(buffer: &[u8], offset: usize) -> Result<[u8; N], ParsingError> {
    let bytes = read_bytes(buffer, offset, N)?;
    let mut ret = [0u8; N];
    ret.copy_from_slice(bytes);
    Ok(ret)
}

pub(crate) fn read_u32_le(buffer: &[u8], offset: usize) -> Result<u32, ParsingError> {
    read_array(buffer, offset).map(u32::from_le_bytes)
}


/// Serializes raw bytes as a lowercase hex string, matching the text report.
#[cfg(feature = "serde")]
pub(crate) fn serialize_hex<T: AsRef<[u8]>, S: serde::Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(value))
}

/// Serializes optional raw bytes as a lowercase hex string or `null`.
#[cfg(feature = "serde")]
pub(crate) fn serialize_hex_opt<T: AsRef<[u8]>, S: serde::Serializer>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_some(&hex::encode(v)),
        None => serializer.serialize_none(),
    }
}


/// An NTLM security buffer, pointing to data contained later in the message.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SecurityBuffer {
    /// The length of the data, in bytes.
    pub length: u16,

    /// The number of bytes allocated for the data; usually equal to `length`.
    pub allocated: u16,

    /// The offset of the data from the start of the message.
    pub offset: u32,
}
impl SecurityBuffer {
    /// The size of a security buffer header within a message.
    pub const SIZE: usize = 8;

    /// Reads the security buffer header located at `header_offset` in the message.
    pub fn read_at(buffer: &[u8], header_offset: usize) -> Result<Self, ParsingError> {
        let bytes: [u8; Self::SIZE] = read_array(buffer, header_offset)?;
        Ok(Self {
            length: u16::from_le_bytes([bytes[0], bytes[1]]),
            allocated: u16::from_le_bytes([bytes[2], bytes[3]]),
            offset: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Applies the security buffer to the complete message, extracting the data itself.
    ///
    /// Fails if the data would extend past the end of the message, even if it is empty.
    pub fn apply_to<'a>(&self, buffer: &'a [u8]) -> Result<&'a [u8], ParsingError> {
        let out_of_range = ParsingError::BufferOutOfRange {
            offset: self.offset,
            length: self.length,
            message_len: buffer.len(),
        };
        let start: usize = self.offset.try_into()
            .or(Err(out_of_range.clone()))?;
        let end = start.checked_add(usize::from(self.length))
            .ok_or_else(|| out_of_range.clone())?;
        buffer.get(start..end)
            .ok_or(out_of_range)
    }
}


/// A structure representing the version of an operating system as well as the NTLM revision used.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OsVersion {
    pub major: u8,
    pub minor: u8,
    pub build: u16,

    /// The three reserved bytes followed by the NTLM revision, read as a big-endian value.
    ///
    /// As the reserved bytes are zero in practice, this is usually the NTLM revision itself
    /// (`15` for NTLMSSP_REVISION_W2K3).
    pub reserved: u32,
}
impl OsVersion {
    /// The size of the version structure within a message.
    pub const SIZE: usize = 8;

    /// Reads the version structure located at `offset` in the message.
    pub fn read_at(buffer: &[u8], offset: usize) -> Result<Self, ParsingError> {
        let bytes: [u8; Self::SIZE] = read_array(buffer, offset)?;
        Ok(Self {
            major: bytes[0],
            minor: bytes[1],
            build: u16::from_le_bytes([bytes[2], bytes[3]]),
            reserved: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// The NTLM revision, stored in the last byte of the structure.
    pub fn ntlm_revision(&self) -> u8 {
        self.reserved.to_be_bytes()[3]
    }

    /// The name of the Windows product with this version, if known.
    pub fn product_name(&self) -> Option<&'static str> {
        product_name(self.major, self.minor, self.build)
    }

    /// Formats the version as `major.minor.build.reserved`.
    pub fn short_string(&self) -> String {
        format!("{}.{}.{}.{}", self.major, self.minor, self.build, self.reserved)
    }

    /// Formats the version as `product (major.minor.build.reserved)`; unknown products are called
    /// `Other`.
    pub fn long_string(&self) -> String {
        format!("{} ({})", self.product_name().unwrap_or("Other"), self.short_string())
    }
}
impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_string())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_buffer() {
        let message = b"\x04\x00\x04\x00\x0c\x00\x00\x00....abcd";
        let sb = SecurityBuffer::read_at(message, 0).unwrap();
        assert_eq!(sb, SecurityBuffer { length: 4, allocated: 4, offset: 12 });
        assert_eq!(sb.apply_to(message).unwrap(), b"abcd");
    }

    #[test]
    fn security_buffer_out_of_range() {
        let message = b"\x04\x00\x04\x00\x0e\x00\x00\x00....abcd";
        let sb = SecurityBuffer::read_at(message, 0).unwrap();
        assert_eq!(
            sb.apply_to(message),
            Err(ParsingError::BufferOutOfRange { offset: 14, length: 4, message_len: 16 }),
        );

        let empty_past_end = SecurityBuffer { length: 0, allocated: 0, offset: 17 };
        assert!(empty_past_end.apply_to(message).is_err());

        let huge = SecurityBuffer { length: 0xFFFF, allocated: 0xFFFF, offset: u32::MAX };
        assert!(huge.apply_to(message).is_err());

        assert_eq!(
            SecurityBuffer::read_at(message, 12),
            Err(ParsingError::ShortField { offset: 12, expected_len: SecurityBuffer::SIZE, obtained_len: 16 }),
        );
        assert!(SecurityBuffer::read_at(message, usize::MAX).is_err());
    }

    #[test]
    fn os_version() {
        let version = OsVersion::read_at(b"\x0a\x00\xba\x47\x00\x00\x00\x0f", 0).unwrap();
        assert_eq!(version, OsVersion { major: 10, minor: 0, build: 18362, reserved: 15 });
        assert_eq!(version.ntlm_revision(), 15);
        assert!(OsVersion::read_at(&[0u8; OsVersion::SIZE - 1], 0).is_err());
        assert_eq!(version.short_string(), "10.0.18362.15");
        assert_eq!(version.long_string(), "Other (10.0.18362.15)");

        let server = OsVersion { major: 10, minor: 0, build: 20348, reserved: 15 };
        assert_eq!(server.long_string(), "Windows Server 2022 (10.0.20348.15)");
    }
}
