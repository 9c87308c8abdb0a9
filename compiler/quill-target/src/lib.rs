//! Definitions to describe the target of Quill compilation.

pub mod version;

use std::{
    env::consts::{ARCH, OS},
    fmt::{Display, Formatter},
};

use version::RuntimeVersion;

/// The target that the compiler should compile for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    /// The size of the pointer for the target in bytes.
    pub pointer_width: usize,

    /// The architecture of the target.
    pub arch: TargetArch,

    /// The operating system of the target, including the minimum deployment
    /// version if the platform has one.
    pub os: TargetOs,
}

/// Represents the available architectures that the compiler can compile for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArch {
    /// x86 32-bit target architecture.
    X86,

    /// x86 64-bit target architecture.
    X86_64,

    /// ARM 64-bit target architecture.
    Aarch64,

    /// ARM 32-bit target architecture.
    Arm,

    /// Used for when the target name is not known, but can
    /// still be compiled for.
    Unknown,
}

impl TargetArch {
    pub fn from_system() -> Self {
        Self::from_name(ARCH).unwrap_or(Self::Unknown)
    }

    /// Parse the architecture component of a target triple.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x86" | "i386" | "i686" => Some(Self::X86),
            "x86_64" => Some(Self::X86_64),
            "aarch64" | "arm64" | "arm64e" => Some(Self::Aarch64),
            "arm" | "armv7" | "armv7k" => Some(Self::Arm),
            _ => None,
        }
    }

    /// The pointer width of the architecture in bytes.
    pub fn pointer_width(&self) -> usize {
        match self {
            Self::X86 | Self::Arm => 4,
            Self::X86_64 | Self::Aarch64 => 8,
            Self::Unknown => std::mem::size_of::<usize>(),
        }
    }
}

impl Display for TargetArch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetArch::X86 => write!(f, "x86"),
            TargetArch::X86_64 => write!(f, "x86_64"),
            TargetArch::Aarch64 => write!(f, "aarch64"),
            TargetArch::Arm => write!(f, "arm"),
            TargetArch::Unknown => write!(f, "unknown"),
        }
    }
}

/// The operating system of a [Target]. Apple platforms carry the minimum
/// deployment version of the OS, since it decides which runtime the code
/// has to remain compatible with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    MacOs(OsVersion),
    Ios(OsVersion),
    TvOs(OsVersion),
    WatchOs(OsVersion),
    Linux,
    Windows,
    Unknown,
}

impl TargetOs {
    pub fn from_system() -> Self {
        match OS {
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            // Host builds assume a recent system runtime.
            "macos" => Self::MacOs(OsVersion::new(15, 0, 0)),
            _ => Self::Unknown,
        }
    }

    /// Whether the runtime ships with the operating system, meaning that
    /// emitted code may run against an older runtime than the compiler's.
    pub fn has_os_runtime(&self) -> bool {
        matches!(self, Self::MacOs(_) | Self::Ios(_) | Self::TvOs(_) | Self::WatchOs(_))
    }
}

impl Display for TargetOs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetOs::MacOs(version) => write!(f, "macos{version}"),
            TargetOs::Ios(version) => write!(f, "ios{version}"),
            TargetOs::TvOs(version) => write!(f, "tvos{version}"),
            TargetOs::WatchOs(version) => write!(f, "watchos{version}"),
            TargetOs::Linux => write!(f, "linux"),
            TargetOs::Windows => write!(f, "windows"),
            TargetOs::Unknown => write!(f, "unknown"),
        }
    }
}

/// A `major.minor.patch` operating system version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Constructor)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    /// Parse a version such as `11`, `10.15` or `14.5.1`. Missing components
    /// default to zero.
    pub fn parse(value: &str) -> Option<Self> {
        let mut components = value.split('.');
        let mut next = || -> Option<u32> {
            match components.next() {
                Some(component) => component.parse().ok(),
                None => Some(0),
            }
        };

        let version = Self::new(next()?, next()?, next()?);

        if components.next().is_some() {
            return None;
        }

        Some(version)
    }
}

impl Display for OsVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;

        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }

        Ok(())
    }
}

impl Target {
    /// Create a new target from the given architecture and operating system.
    pub fn new(arch: TargetArch, os: TargetOs) -> Self {
        Self { pointer_width: arch.pointer_width(), arch, os }
    }

    /// Create a target from a target triple, e.g. `arm64-apple-macos11.0` or
    /// `x86_64-unknown-linux-gnu`.
    pub fn from_triple(triple: &str) -> Option<Self> {
        let mut components = triple.split('-');
        let arch = TargetArch::from_name(components.next()?)?;
        let _vendor = components.next()?;
        let os = components.next()?;

        // `macosx` has to be tried before `macos` since it shares a prefix.
        let apple_systems: [(&str, fn(OsVersion) -> TargetOs); 5] = [
            ("macosx", TargetOs::MacOs),
            ("macos", TargetOs::MacOs),
            ("ios", TargetOs::Ios),
            ("tvos", TargetOs::TvOs),
            ("watchos", TargetOs::WatchOs),
        ];

        let apple_system = apple_systems
            .iter()
            .find_map(|(prefix, system)| Some((os.strip_prefix(prefix)?, system)));

        let os = match apple_system {
            // The version of an Apple OS decides which runtime it ships with,
            // so a version that can't be read rejects the whole triple.
            Some(("", system)) => system(OsVersion::new(0, 0, 0)),
            Some((version, system)) => system(OsVersion::parse(version)?),
            None => match os {
                "linux" => TargetOs::Linux,
                "windows" => TargetOs::Windows,
                _ => TargetOs::Unknown,
            },
        };

        Some(Self::new(arch, os))
    }

    /// The oldest runtime that code emitted for this target may run against,
    /// if the target constrains it at all. See
    /// [`version::runtime_compatibility_version`].
    pub fn runtime_compatibility_version(&self) -> Option<RuntimeVersion> {
        version::runtime_compatibility_version(self)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.arch, self.os)
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new(TargetArch::from_system(), TargetOs::from_system())
    }
}
