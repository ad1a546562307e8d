//! Windows-specific OEM decoding.
//!
//! NTLM peers that do not negotiate Unicode send strings in the OEM code page of the client. The
//! operating system knows which code page that is and converts it to UTF-16 for us.


use windows::Win32::Globalization::{CP_OEMCP, MB_ERR_INVALID_CHARS, MultiByteToWideChar};


/// Converts the given OEM string into a Rust string.
pub fn oem_string_to_rust(oem_string: &[u8]) -> Option<String> {
    if oem_string.len() == 0 {
        return Some(String::new());
    }

    // how many characters will we require?
    let wide_char_count = unsafe {
        MultiByteToWideChar(
            CP_OEMCP,
            MB_ERR_INVALID_CHARS,
            oem_string,
            None,
        )
    };
    let wide_char_usize: usize = wide_char_count.try_into().ok()?;
    if wide_char_usize == 0 {
        return None;
    }

    let mut buf = vec![0u16; wide_char_usize];
    let chars_written = unsafe {
        MultiByteToWideChar(
            CP_OEMCP,
            MB_ERR_INVALID_CHARS,
            oem_string,
            Some(buf.as_mut_slice()),
        )
    };
    let chars_written_usize: usize = chars_written.try_into().ok()?;
    if chars_written_usize == 0 {
        return None;
    }
    buf.truncate(chars_written_usize);

    String::from_utf16(&buf).ok()
}
