//! Directory layout of a build.
//!
//! All paths are derived from the base (working) directory and the gecko
//! source directory. Nothing here touches the process working directory.

use super::platform::{Arch, BuildType, Platform};
use std::path::PathBuf;

/// Name of the generated build configuration file.
pub const MOZCONFIG: &str = "MOZCONFIG";

/// Milestone file holding the gecko version, relative to the source dir.
pub const MILESTONE: &str = "config/milestone.txt";

/// Archive and manifest file name prefix.
pub const PRODUCT: &str = "spidermonkey";

/// Base and source directories of a build.
#[derive(Debug, Clone)]
pub struct Layout {
    pub base_dir: PathBuf,
    pub source_dir: PathBuf,
}

impl Layout {
    pub fn new(base_dir: impl Into<PathBuf>, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            source_dir: source_dir.into(),
        }
    }

    pub fn mozconfig(&self) -> PathBuf {
        self.base_dir.join(MOZCONFIG)
    }

    pub fn mach(&self) -> PathBuf {
        self.source_dir.join("mach")
    }

    pub fn milestone(&self) -> PathBuf {
        self.source_dir.join(MILESTONE)
    }

    /// `obj-<platform>-<arch>`, relative to the base dir.
    pub fn objdir_name(platform: Platform, arch: Arch) -> String {
        format!("obj-{platform}-{arch}")
    }

    pub fn objdir(&self, platform: Platform, arch: Arch) -> PathBuf {
        self.base_dir.join(Self::objdir_name(platform, arch))
    }

    /// Header tree exported by the build.
    pub fn include_dir(&self, platform: Platform, arch: Arch) -> PathBuf {
        self.objdir(platform, arch).join("dist").join("include")
    }

    pub fn core_lib(&self, platform: Platform, arch: Arch) -> PathBuf {
        self.objdir(platform, arch)
            .join("js/src/build")
            .join(platform.core_lib())
    }

    pub fn rust_lib(&self, platform: Platform, arch: Arch, build_type: BuildType) -> PathBuf {
        self.objdir(platform, arch)
            .join(platform.rust_triple(arch))
            .join(build_type.as_str())
            .join(platform.rust_lib())
    }

    /// Both static libraries produced for one architecture.
    pub fn libraries(&self, platform: Platform, arch: Arch, build_type: BuildType) -> [PathBuf; 2] {
        [
            self.core_lib(platform, arch),
            self.rust_lib(platform, arch, build_type),
        ]
    }

    /// `spidermonkey-<version>.<suffix>` without extension.
    pub fn artifact_stem(version: &str, platform: Platform, build_type: BuildType) -> String {
        format!("{PRODUCT}-{version}.{}", platform.archive_suffix(build_type))
    }

    pub fn archive(&self, version: &str, platform: Platform, build_type: BuildType) -> PathBuf {
        self.base_dir
            .join(format!("{}.zip", Self::artifact_stem(version, platform, build_type)))
    }

    pub fn manifest(&self, version: &str, platform: Platform, build_type: BuildType) -> PathBuf {
        self.base_dir
            .join(format!("{}.json", Self::artifact_stem(version, platform, build_type)))
    }

    /// Destination of a universal (lipo) library in the base dir.
    pub fn universal_lib(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }
}
