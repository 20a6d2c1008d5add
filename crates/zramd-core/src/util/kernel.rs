//! Kernel release parsing and zram feature support checks.

use std::fmt;

/// Major and minor number of a kernel release string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct KernelVersion {
    pub major: u32,
    pub minor: u32,
}

impl KernelVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses a release such as `6.1.0-13-amd64` or `4.19.128+`.
    ///
    /// Only the leading `major.minor` pair is interpreted.
    pub fn parse(release: &str) -> Option<Self> {
        let mut parts = release.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor_raw = parts.next()?;
        let digits_end = minor_raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(minor_raw.len());
        let minor = minor_raw[..digits_end].parse().ok()?;
        Some(Self { major, minor })
    }

    /// zram swap devices need 3.14 or newer.
    pub fn supports_zram(&self) -> bool {
        *self >= Self::new(3, 14)
    }

    /// zstd compressed zram needs 4.19 or newer.
    pub fn supports_zstd(&self) -> bool {
        *self >= Self::new(4, 19)
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        assert_eq!(
            KernelVersion::parse("6.1.0-13-amd64"),
            Some(KernelVersion::new(6, 1))
        );
        assert_eq!(
            KernelVersion::parse("4.19.128+\n"),
            Some(KernelVersion::new(4, 19))
        );
        assert_eq!(
            KernelVersion::parse("5.15-rc3"),
            Some(KernelVersion::new(5, 15))
        );
    }

    #[test]
    fn test_parse_invalid_release() {
        assert_eq!(KernelVersion::parse(""), None);
        assert_eq!(KernelVersion::parse("linux"), None);
        assert_eq!(KernelVersion::parse("6"), None);
        assert_eq!(KernelVersion::parse("6.x"), None);
    }

    #[test]
    fn test_zram_support() {
        assert!(!KernelVersion::new(3, 13).supports_zram());
        assert!(KernelVersion::new(3, 14).supports_zram());
        assert!(KernelVersion::new(4, 0).supports_zram());
    }

    #[test]
    fn test_zstd_support() {
        assert!(!KernelVersion::new(4, 18).supports_zstd());
        assert!(KernelVersion::new(4, 19).supports_zstd());
        assert!(KernelVersion::new(5, 4).supports_zstd());
        assert!(!KernelVersion::new(3, 20).supports_zstd());
    }

    #[test]
    fn test_display() {
        assert_eq!(KernelVersion::new(6, 1).to_string(), "6.1");
    }
}
