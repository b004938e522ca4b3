use std::{cmp::Ordering, fmt};

/// Dotted numeric version that compares the way platform and language
/// versions embedded in solution stack names are meant to compare.
/// e.g., "v2.7.2", "17.03.1", "2017.09", "8".
#[derive(Debug, Clone, Eq)]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    /// Parses a loose version string.
    /// A leading "v" is dropped and each dotted part contributes its leading
    /// digits, stopping at the first part that has none.
    /// Input with no digits at all parses as "0".
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let mut parts = Vec::new();
        for part in trimmed.split('.') {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                break;
            }
            match digits.parse::<u64>() {
                Ok(v) => parts.push(v),
                Err(_) => break,
            }
        }
        if parts.is_empty() {
            parts.push(0);
        }
        Self { parts }
    }

    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    /// Parts with trailing zeros removed, used for equality and ordering.
    fn significant(&self) -> &[u64] {
        let mut end = self.parts.len();
        while end > 0 && self.parts[end - 1] == 0 {
            end -= 1;
        }
        &self.parts[..end]
    }
}

impl Default for Version {
    fn default() -> Self {
        Self { parts: vec![0] }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: Vec<String> = self.parts.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", s.join("."))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant().cmp(other.significant())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- version::test_version --exact --show-output
#[test]
fn test_version() {
    assert_eq!(Version::parse("v2.7.2").to_string(), "2.7.2");
    assert_eq!(Version::parse("2017.09").to_string(), "2017.9");
    assert_eq!(Version::parse("0000.01").to_string(), "0.1");
    assert_eq!(Version::parse("17.03.1").to_string(), "17.3.1");
    assert_eq!(Version::parse("2.0").to_string(), "2.0");
    assert_eq!(Version::parse("").to_string(), "0");
    assert_eq!(Version::parse("1.9.alpha").to_string(), "1.9");

    assert_eq!(Version::parse("2.0"), Version::parse("2"));
    assert!(Version::parse("v2.0.10") > Version::parse("v2.0.9"));
    assert!(Version::parse("10.0") > Version::parse("8.5"));
    assert!(Version::parse("1.12.6") < Version::parse("17.06.2"));
    assert!(Version::parse("2017.09") > Version::parse("2017.03"));

    let mut versions = vec![
        Version::parse("1.0.10"),
        Version::parse("1.0.2"),
        Version::parse("1.1.0"),
    ];
    versions.sort();
    let sorted: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
    assert_eq!(sorted, vec!["1.0.2", "1.0.10", "1.1.0"]);
}
