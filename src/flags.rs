//! NTLM negotiation flags and their labels.


use bitflags::bitflags;


bitflags! {
    /// NTLM negotiation flags.
    ///
    /// Reserved bits are named `R1` through `R10` as in MS-NLMP so that their presence remains
    /// visible when decoding messages from misbehaving peers.
    #[derive(Clone, Copy, Debug, Default, Hash, Eq, Ord, PartialEq, PartialOrd)]
    pub struct Flags: u32 {
        const NEGOTIATE_UNICODE = 0x0000_0001;
        const NEGOTIATE_OEM = 0x0000_0002;
        const REQUEST_TARGET = 0x0000_0004;
        const R10 = 0x0000_0008;
        const NEGOTIATE_SIGN = 0x0000_0010;
        const NEGOTIATE_SEAL = 0x0000_0020;
        const NEGOTIATE_DATAGRAM = 0x0000_0040;
        const NEGOTIATE_LM_KEY = 0x0000_0080;
        const R9 = 0x0000_0100;
        const NEGOTIATE_NTLM = 0x0000_0200;
        const R8 = 0x0000_0400;
        const ANONYMOUS = 0x0000_0800;
        const NEGOTIATE_OEM_DOMAIN_SUPPLIED = 0x0000_1000;
        const NEGOTIATE_OEM_WORKSTATION_SUPPLIED = 0x0000_2000;
        const R7 = 0x0000_4000;
        const NEGOTIATE_ALWAYS_SIGN = 0x0000_8000;
        const TARGET_TYPE_DOMAIN = 0x0001_0000;
        const TARGET_TYPE_SERVER = 0x0002_0000;
        const R6 = 0x0004_0000;
        const NEGOTIATE_EXTENDED_SESSIONSECURITY = 0x0008_0000;
        const NEGOTIATE_IDENTIFY = 0x0010_0000;
        const R5 = 0x0020_0000;
        const REQUEST_NON_NT_SESSION_KEY = 0x0040_0000;
        const NEGOTIATE_TARGET_INFO = 0x0080_0000;
        const R4 = 0x0100_0000;
        const NEGOTIATE_VERSION = 0x0200_0000;
        const R3 = 0x0400_0000;
        const R2 = 0x0800_0000;
        const R1 = 0x1000_0000;
        const NEGOTIATE_128 = 0x2000_0000;
        const NEGOTIATE_KEY_EXCH = 0x4000_0000;
        const NEGOTIATE_56 = 0x8000_0000;
    }
}


/// The prefix shared by most flag labels; stripped for display.
pub const LABEL_PREFIX: &str = "NTLMSSP_NEGOTIATE_";


/// Every flag bit with its full label, in canonical order.
pub static FLAG_LABELS: [(Flags, &str); 32] = [
    (Flags::NEGOTIATE_UNICODE, "NTLMSSP_NEGOTIATE_UNICODE"),
    (Flags::NEGOTIATE_OEM, "NTLMSSP_NEGOTIATE_OEM"),
    (Flags::REQUEST_TARGET, "NTLMSSP_REQUEST_TARGET"),
    (Flags::R10, "R10"),
    (Flags::NEGOTIATE_SIGN, "NTLMSSP_NEGOTIATE_SIGN"),
    (Flags::NEGOTIATE_SEAL, "NTLMSSP_NEGOTIATE_SEAL"),
    (Flags::NEGOTIATE_DATAGRAM, "NTLMSSP_NEGOTIATE_DATAGRAM"),
    (Flags::NEGOTIATE_LM_KEY, "NTLMSSP_NEGOTIATE_LM_KEY"),
    (Flags::R9, "R9"),
    (Flags::NEGOTIATE_NTLM, "NTLMSSP_NEGOTIATE_NTLM"),
    (Flags::R8, "R8"),
    (Flags::ANONYMOUS, "ANONYMOUS_J"),
    (Flags::NEGOTIATE_OEM_DOMAIN_SUPPLIED, "NTLMSSP_NEGOTIATE_OEM_DOMAIN_SUPPLIED"),
    (Flags::NEGOTIATE_OEM_WORKSTATION_SUPPLIED, "NTLMSSP_NEGOTIATE_OEM_WORKSTATION_SUPPLIED"),
    (Flags::R7, "R7"),
    (Flags::NEGOTIATE_ALWAYS_SIGN, "NTLMSSP_NEGOTIATE_ALWAYS_SIGN"),
    (Flags::TARGET_TYPE_DOMAIN, "NTLMSSP_TARGET_TYPE_DOMAIN"),
    (Flags::TARGET_TYPE_SERVER, "NTLMSSP_TARGET_TYPE_SERVER"),
    (Flags::R6, "R6"),
    (Flags::NEGOTIATE_EXTENDED_SESSIONSECURITY, "NTLMSSP_NEGOTIATE_EXTENDED_SESSIONSECURITY"),
    (Flags::NEGOTIATE_IDENTIFY, "NTLMSSP_NEGOTIATE_IDENTIFY"),
    (Flags::R5, "R5"),
    (Flags::REQUEST_NON_NT_SESSION_KEY, "NTLMSSP_REQUEST_NON_NT_SESSION_KEY"),
    (Flags::NEGOTIATE_TARGET_INFO, "NTLMSSP_NEGOTIATE_TARGET_INFO"),
    (Flags::R4, "R4"),
    (Flags::NEGOTIATE_VERSION, "NTLMSSP_NEGOTIATE_VERSION"),
    (Flags::R3, "R3"),
    (Flags::R2, "R2"),
    (Flags::R1, "R1"),
    (Flags::NEGOTIATE_128, "NTLMSSP_NEGOTIATE_128"),
    (Flags::NEGOTIATE_KEY_EXCH, "NTLMSSP_NEGOTIATE_KEY_EXCH"),
    (Flags::NEGOTIATE_56, "NTLMSSP_NEGOTIATE_56"),
];


/// Returns the full labels of all bits set in `mask`, in canonical order.
pub fn flag_labels(mask: u32) -> Vec<&'static str> {
    FLAG_LABELS.iter()
        .filter(|(flag, _label)| mask & flag.bits() != 0)
        .map(|(_flag, label)| *label)
        .collect()
}


impl Flags {
    /// Returns the full labels of all flags set in this value, in canonical order.
    pub fn labels(&self) -> Vec<&'static str> {
        flag_labels(self.bits())
    }

    /// Returns the labels joined by spaces, with the common `NTLMSSP_NEGOTIATE_` prefix removed.
    pub fn display_labels(&self) -> String {
        self.labels()
            .into_iter()
            .map(|label| label.strip_prefix(LABEL_PREFIX).unwrap_or(label))
            .collect::<Vec<&str>>()
            .join(" ")
    }
}

/// Serialized as the list of full labels, in canonical order.
#[cfg(feature = "serde")]
impl serde::Serialize for Flags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.labels())
    }
}
