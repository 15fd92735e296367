//! Host toolchain locations.
//!
//! Defaults match the build machines the archives are produced on. A JSON file
//! passed with `--config` may override any of them:
//!
//! ```json
//! { "macos_sdk": "/Library/Developer/CommandLineTools/SDKs/MacOSX14.sdk" }
//! ```

use super::error::{BuildError, IoContext, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_MACOS_SDK: &str = "/Library/Developer/CommandLineTools/SDKs/MacOSX11.1.sdk";
pub const DEFAULT_MACOS_TARGET: &str = "10.13";
pub const DEFAULT_ANDROID_NDK: &str = "c:/mozilla-build/android-ndk-r27c";
pub const DEFAULT_PYTHON: &str = "python3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Toolchain {
    /// SDK passed to `--with-macos-sdk`
    pub macos_sdk: String,
    /// Minimum macOS version passed to `--enable-macos-target`
    pub macos_target: String,
    /// NDK passed to `--with-android-ndk`
    pub android_ndk: String,
    /// Interpreter used to run mach on win/android
    pub python: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            macos_sdk: DEFAULT_MACOS_SDK.to_string(),
            macos_target: DEFAULT_MACOS_TARGET.to_string(),
            android_ndk: DEFAULT_ANDROID_NDK.to_string(),
            python: DEFAULT_PYTHON.to_string(),
        }
    }
}

impl Toolchain {
    /// Load overrides from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).at(path)?;
        Self::parse(&content).map_err(|source| BuildError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}
