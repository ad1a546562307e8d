//! String decoding for NTLM payloads.


use log::debug;

use crate::error::ParsingError;
use crate::flags::Flags;

#[cfg(windows)]
use crate::encoding_windows::oem_string_to_rust;

#[cfg(not(windows))]
use crate::encoding_latin1::oem_string_to_rust;


/// Converts UTF-16 values stored as bytes in little-endian format into a string.
///
/// Unpaired surrogates are replaced with U+FFFD and a dangling odd byte is ignored, so that a
/// damaged name still shows up in the decoded message.
pub fn utf16_le_bytes_to_string(bytes: &[u8]) -> String {
    if bytes.len() % 2 != 0 {
        debug!("ignoring trailing byte of odd-length UTF-16 string ({} bytes)", bytes.len());
    }
    let u16s: Vec<u16> = bytes.chunks_exact(2)
        .map(|chk| u16::from_le_bytes([chk[0], chk[1]]))
        .collect();
    String::from_utf16_lossy(&u16s)
}

/// Converts a string in the OEM code page into a Rust string.
pub fn oem_bytes_to_string(bytes: &[u8]) -> Result<String, ParsingError> {
    oem_string_to_rust(bytes)
        .ok_or_else(|| ParsingError::InvalidOemEncoding { value: Vec::from(bytes) })
}

/// Converts a string into a Rust string, using UTF-16 if `flags` negotiate Unicode and the OEM
/// code page otherwise.
pub fn decode_text(bytes: &[u8], flags: Flags) -> Result<String, ParsingError> {
    if flags.contains(Flags::NEGOTIATE_UNICODE) {
        Ok(utf16_le_bytes_to_string(bytes))
    } else {
        oem_bytes_to_string(bytes)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_selected_by_flag() {
        let utf16 = b"D\x00O\x00M\x00A\x00I\x00N\x00";
        assert_eq!(decode_text(utf16, Flags::NEGOTIATE_UNICODE | Flags::NEGOTIATE_NTLM).unwrap(), "DOMAIN");
        assert_eq!(decode_text(b"DOMAIN", Flags::NEGOTIATE_OEM).unwrap(), "DOMAIN");
        assert_eq!(decode_text(b"DOMAIN", Flags::empty()).unwrap(), "DOMAIN");

        // Unicode wins when a peer sets both bits
        assert_eq!(decode_text(utf16, Flags::NEGOTIATE_UNICODE | Flags::NEGOTIATE_OEM).unwrap(), "DOMAIN");
    }

    #[test]
    fn lossy_utf16() {
        assert_eq!(utf16_le_bytes_to_string(b"j\x00l\x00g\x00!"), "jlg");
        assert_eq!(utf16_le_bytes_to_string(b"\x00\xd8a\x00"), "\u{FFFD}a");
        assert_eq!(utf16_le_bytes_to_string(b""), "");
    }

    #[cfg(not(windows))]
    #[test]
    fn latin1_oem() {
        assert_eq!(oem_bytes_to_string(b"caf\xe9").unwrap(), "caf\u{e9}");
    }
}
