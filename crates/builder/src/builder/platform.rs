//! Target platforms and architectures.
//!
//! Everything that differs per platform (architecture list, driver invocation
//! style, artifact names, Rust target triples) is selected here by `match`.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target platform of a SpiderMonkey build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// macOS universal (x86_64 + aarch64) build
    #[value(name = "macos", alias = "mac")]
    Macos,
    /// Windows (MSVC) build
    #[value(name = "win", alias = "windows")]
    Win,
    /// Linux (glibc) build
    #[value(name = "linux")]
    Linux,
    /// Android NDK cross build
    #[value(name = "android")]
    Android,
}

impl Platform {
    /// Name used in object directory names (`obj-<platform>-<arch>`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Macos => "macos",
            Self::Win => "win",
            Self::Linux => "linux",
            Self::Android => "android",
        }
    }

    /// Architectures built for this platform, in build order.
    ///
    /// The first entry supplies the `dist/include` tree for packaging.
    pub const fn architectures(self) -> &'static [Arch] {
        match self {
            Self::Macos | Self::Linux => &[Arch::X86_64, Arch::Aarch64],
            Self::Win => &[Arch::X86_64, Arch::I686, Arch::Aarch64],
            Self::Android => &[Arch::X86_64, Arch::I686, Arch::Aarch64, Arch::Arm],
        }
    }

    /// Whether mach is run through the Python interpreter instead of directly.
    pub const fn mach_via_python(self) -> bool {
        matches!(self, Self::Win | Self::Android)
    }

    /// File name of the engine's static C++ library.
    pub const fn core_lib(self) -> &'static str {
        match self {
            Self::Win => "js_static.lib",
            Self::Macos | Self::Linux | Self::Android => "libjs_static.a",
        }
    }

    /// File name of the companion Rust runtime library.
    pub const fn rust_lib(self) -> &'static str {
        match self {
            Self::Win => "jsrust.lib",
            Self::Macos | Self::Linux | Self::Android => "libjsrust.a",
        }
    }

    /// Rust target triple cargo uses for `arch` on this platform.
    ///
    /// This names the directory the Rust library lands in under the object dir.
    pub fn rust_triple(self, arch: Arch) -> String {
        match (self, arch) {
            (Self::Macos, _) => format!("{arch}-apple-darwin"),
            (Self::Linux, _) => format!("{arch}-unknown-linux-gnu"),
            (Self::Win, _) => format!("{arch}-pc-windows-msvc"),
            (Self::Android, Arch::Arm) => "thumbv7neon-linux-androideabi".to_string(),
            (Self::Android, _) => format!("{arch}-linux-android"),
        }
    }

    /// Value passed to `--target=` in the mozconfig.
    pub fn configure_target(self, arch: Arch) -> String {
        match self {
            Self::Android => format!("{arch}-linux-android"),
            Self::Macos | Self::Win | Self::Linux => arch.to_string(),
        }
    }

    /// Suffix between the version and `.zip` in the archive name.
    pub fn archive_suffix(self, build_type: BuildType) -> String {
        match self {
            Self::Macos => "mac".to_string(),
            Self::Linux => "linux".to_string(),
            Self::Win => format!("win-{build_type}"),
            Self::Android => format!("android-{build_type}"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[value(name = "x86_64")]
    #[serde(rename = "x86_64")]
    X86_64,
    #[value(name = "i686")]
    I686,
    #[value(name = "aarch64")]
    Aarch64,
    #[value(name = "arm")]
    Arm,
}

impl Arch {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::I686 => "i686",
            Self::Aarch64 => "aarch64",
            Self::Arm => "arm",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debug or release; also the name of cargo's output folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    pub const fn from_debug(debug: bool) -> Self {
        if debug {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
