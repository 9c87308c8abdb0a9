//! Runtime versions, and the table deciding which runtime version the code
//! emitted for a particular target must stay compatible with.

use std::{num::ParseIntError, str::FromStr};

use derive_more::Display;
use thiserror::Error;

use crate::{OsVersion, Target, TargetOs};

/// A `major.minor` version of the language runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display("{major}.{minor}")]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl RuntimeVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// The first runtime that ships the concurrency library, and therefore
    /// the first runtime that understands its standard substitutions.
    pub const CONCURRENCY: RuntimeVersion = RuntimeVersion::new(5, 5);
}

/// Errors that occur when parsing a [RuntimeVersion] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionParseError {
    /// The version string didn't have the `major.minor` shape.
    #[error("`{0}` is not a valid runtime version, expected `MAJOR.MINOR`")]
    InvalidFormat(String),

    /// One of the components wasn't a valid number.
    #[error("invalid runtime version component: {0}")]
    InvalidComponent(#[from] ParseIntError),
}

impl FromStr for RuntimeVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) =
            s.split_once('.').ok_or_else(|| VersionParseError::InvalidFormat(s.to_string()))?;

        if minor.contains('.') {
            return Err(VersionParseError::InvalidFormat(s.to_string()));
        }

        Ok(Self::new(major.parse()?, minor.parse()?))
    }
}

/// Compute the oldest runtime version that the code emitted for `target` may
/// be loaded by. This only applies to platforms where the runtime is part of
/// the operating system, on all other platforms the runtime is shipped with
/// the program and `None` is returned.
///
/// Deployment targets newer than the last row of the table also yield `None`.
pub fn runtime_compatibility_version(target: &Target) -> Option<RuntimeVersion> {
    let v = RuntimeVersion::new;

    match target.os {
        TargetOs::MacOs(OsVersion { major, minor, .. }) => match (major, minor) {
            (10, ..=14) => Some(v(5, 0)),
            (10, _) => Some(v(5, 1)),
            (..=9, _) => Some(v(5, 0)),
            (11, ..=2) => Some(v(5, 3)),
            (11, _) => Some(v(5, 4)),
            (12, _) => Some(v(5, 5)),
            (13, _) => Some(v(5, 7)),
            (14, _) => Some(v(5, 9)),
            (15, _) => Some(v(6, 0)),
            _ => None,
        },
        TargetOs::Ios(OsVersion { major, minor, .. })
        | TargetOs::TvOs(OsVersion { major, minor, .. }) => match (major, minor) {
            (..=12, _) => Some(v(5, 0)),
            (13, _) => Some(v(5, 1)),
            (14, ..=4) => Some(v(5, 3)),
            (14, _) => Some(v(5, 4)),
            (15, _) => Some(v(5, 5)),
            (16, _) => Some(v(5, 7)),
            (17, _) => Some(v(5, 9)),
            (18, _) => Some(v(6, 0)),
            _ => None,
        },
        TargetOs::WatchOs(OsVersion { major, minor, .. }) => match (major, minor) {
            (..=5, _) => Some(v(5, 0)),
            (6, _) => Some(v(5, 1)),
            (7, ..=3) => Some(v(5, 3)),
            (7, _) => Some(v(5, 4)),
            (8, _) => Some(v(5, 5)),
            (9, _) => Some(v(5, 7)),
            (10, _) => Some(v(5, 9)),
            (11, _) => Some(v(6, 0)),
            _ => None,
        },
        TargetOs::Linux | TargetOs::Windows | TargetOs::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TargetArch;

    fn compat(triple: &str) -> Option<RuntimeVersion> {
        Target::from_triple(triple).unwrap().runtime_compatibility_version()
    }

    #[test]
    fn test_parse_runtime_version() {
        assert_eq!("5.5".parse::<RuntimeVersion>(), Ok(RuntimeVersion::new(5, 5)));
        assert_eq!("6.0".parse::<RuntimeVersion>().unwrap().to_string(), "6.0");
        assert!(matches!("5".parse::<RuntimeVersion>(), Err(VersionParseError::InvalidFormat(_))));
        assert!(matches!(
            "5.5.1".parse::<RuntimeVersion>(),
            Err(VersionParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "five.5".parse::<RuntimeVersion>(),
            Err(VersionParseError::InvalidComponent(_))
        ));
    }

    #[test]
    fn test_version_parse_errors() {
        let error = "5".parse::<RuntimeVersion>().unwrap_err();
        assert_eq!(error.to_string(), "`5` is not a valid runtime version, expected `MAJOR.MINOR`");

        let error = "5.x".parse::<RuntimeVersion>().unwrap_err();
        assert!(error.to_string().starts_with("invalid runtime version component: "));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_apple_compatibility_table() {
        assert_eq!(compat("x86_64-apple-macosx10.14"), Some(RuntimeVersion::new(5, 0)));
        assert_eq!(compat("x86_64-apple-macosx10.15"), Some(RuntimeVersion::new(5, 1)));
        assert_eq!(compat("arm64-apple-macos11.0"), Some(RuntimeVersion::new(5, 3)));
        assert_eq!(compat("arm64-apple-macos11.3"), Some(RuntimeVersion::new(5, 4)));
        assert_eq!(compat("arm64-apple-macos12.0"), Some(RuntimeVersion::new(5, 5)));
        assert_eq!(compat("arm64-apple-ios14.5"), Some(RuntimeVersion::new(5, 4)));
        assert_eq!(compat("arm64-apple-ios15.0"), Some(RuntimeVersion::new(5, 5)));
        assert_eq!(compat("arm64-apple-tvos13.0"), Some(RuntimeVersion::new(5, 1)));
        assert_eq!(compat("armv7k-apple-watchos7.4"), Some(RuntimeVersion::new(5, 4)));
        assert_eq!(compat("arm64-apple-macos99.0"), None);
    }

    #[test]
    fn test_no_constraint_without_os_runtime() {
        assert_eq!(compat("x86_64-unknown-linux-gnu"), None);
        assert_eq!(
            Target::new(TargetArch::X86_64, TargetOs::Windows).runtime_compatibility_version(),
            None
        );
    }

    #[test]
    fn test_concurrency_threshold_ordering() {
        assert!(RuntimeVersion::new(5, 4) < RuntimeVersion::CONCURRENCY);
        assert!(RuntimeVersion::new(5, 10) > RuntimeVersion::CONCURRENCY);
        assert!(RuntimeVersion::new(6, 0) > RuntimeVersion::CONCURRENCY);
    }
}
