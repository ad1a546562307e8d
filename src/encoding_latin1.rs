//! OEM decoding on operating systems other than Windows.
//!
//! There is no system-wide OEM code page to consult, so bytes are taken as ISO 8859-1. This is
//! exact for the ASCII range, which covers the host and domain names seen in practice.


/// Converts the given OEM string into a Rust string.
pub fn oem_string_to_rust(oem_string: &[u8]) -> Option<String> {
    Some(oem_string.iter().map(|&b| char::from(b)).collect())
}
