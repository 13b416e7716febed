//! Release version triples
//!
//! A [`Version`] is exactly three dot-separated non-negative integers.
//! Ordering is numeric per component, so `2.10.0 > 2.9.0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// An immutable `major.minor.patch` triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
}

impl Version {
    /// The "no release known" sentinel
    pub const ZERO: Version = Version::new(0, 0, 0);

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Strictly parse a triple. Surrounding whitespace is not accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.split('.');
        let (Some(major), Some(minor), Some(patch), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(parse_error(input, "expected three dot-separated components"));
        };

        Ok(Self::new(
            component(input, major)?,
            component(input, minor)?,
            component(input, patch)?,
        ))
    }
}

fn parse_error(input: &str, reason: impl Into<String>) -> Error {
    Error::Parse {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn component(input: &str, part: &str) -> Result<u64> {
    // u64::from_str alone would accept a leading '+'
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_error(
            input,
            format!("component '{part}' is not a non-negative integer"),
        ));
    }
    part.parse()
        .map_err(|_| parse_error(input, format!("component '{part}' is out of range")))
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_parse_triple() {
        let version = Version::parse("3.24.5").unwrap();
        assert_eq!(
            (version.major(), version.minor(), version.patch()),
            (3, 24, 5)
        );
    }

    #[rstest]
    #[case("")]
    #[case("1")]
    #[case("1.2")]
    #[case("1.2.3.4")]
    #[case("1..3")]
    #[case("v1.2.3")]
    #[case("1.2.3-pre")]
    #[case("3.1.0-0.1.pre")]
    #[case("+1.2.3")]
    #[case("-1.2.3")]
    #[case(" 1.2.3")]
    #[case("1.2.3\n")]
    #[case("1.2.99999999999999999999999")]
    fn test_parse_rejects(#[case] input: &str) {
        assert!(Version::parse(input).is_err(), "{input:?} should be rejected");
    }

    #[test]
    fn test_numeric_not_lexicographic_order() {
        let ten = Version::new(2, 10, 0);
        let nine = Version::new(2, 9, 0);
        assert!(ten > nine);
        assert!(ten.to_string() < nine.to_string());
    }

    #[test]
    fn test_zero_sentinel() {
        assert!(Version::ZERO.is_zero());
        assert!(Version::default().is_zero());
        assert!(!Version::new(0, 0, 1).is_zero());
    }

    #[test]
    fn test_serde_as_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            version: Version,
        }

        let json = serde_json::to_string(&Wrapper {
            version: Version::new(1, 3, 0),
        })
        .unwrap();
        assert_eq!(json, r#"{"version":"1.3.0"}"#);

        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, Version::new(1, 3, 0));
        assert!(serde_json::from_str::<Wrapper>(r#"{"version":"1.3"}"#).is_err());
    }
}
