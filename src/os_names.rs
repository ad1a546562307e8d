//! Product names of known Windows builds.
//!
//! Sources: the Microsoft "Operating System Version" documentation and published build number
//! lists.


/// Known (major, minor, build) triples and the product they identify.
static KNOWN_BUILDS: &[((u8, u8, u16), &str)] = &[
    ((5, 2, 3790), "Windows Server 2003"),
    ((6, 0, 6001), "Windows Server 2008"),
    ((6, 0, 6002), "Windows Server 2008"),
    ((6, 0, 6003), "Windows Server 2008"),
    ((6, 1, 7600), "Windows Server 2008"),
    ((6, 1, 7601), "Windows Server 2008"),
    ((6, 2, 9200), "Windows Server 2012"),
    ((6, 3, 9600), "Windows Server 2012"),
    ((10, 0, 14393), "Windows Server 2016"),
    ((10, 0, 17763), "Windows Server 2019"),
    ((10, 0, 20348), "Windows Server 2022"),
];


/// Looks up the product name for the given version triple.
pub fn product_name(major: u8, minor: u8, build: u16) -> Option<&'static str> {
    KNOWN_BUILDS.iter()
        .find(|(version, _name)| *version == (major, minor, build))
        .map(|(_version, name)| *name)
}


#[cfg(test)]
mod tests {
    use super::product_name;

    #[test]
    fn lookup() {
        assert_eq!(product_name(10, 0, 17763), Some("Windows Server 2019"));
        assert_eq!(product_name(6, 1, 7601), Some("Windows Server 2008"));
        assert_eq!(product_name(10, 0, 18362), None);
    }
}
