//! SpiderMonkey build pipeline.
//!
//! Structure:
//! - `platform` - target platforms, architectures, per-platform naming
//! - `layout` - base/source/object directory paths
//! - `mozconfig` - build configuration generation
//! - `mach` - build driver invocation
//! - `strip` - debug symbol stripping
//! - `package` - universal merge and zip archive
//! - `manifest` - JSON description of the archive
//! - `version` - milestone parsing
//! - `preflight` - tool availability checks
//! - `exec` - checked subprocess execution

pub mod error;
pub mod exec;
pub mod layout;
pub mod mach;
pub mod manifest;
pub mod mozconfig;
pub mod package;
pub mod platform;
pub mod preflight;
pub mod strip;
pub mod toolchain;
pub mod version;

use error::{BuildError, IoContext, Result};
use exec::{Invocation, Runner};
use layout::Layout;
use mozconfig::Mozconfig;
use platform::{Arch, BuildType, Platform};
use std::path::PathBuf;
use toolchain::Toolchain;
use tracing::{debug, info, warn};

/// Build options from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildFlags {
    /// Debug build without optimization
    pub debug: bool,
    /// Keep symbols in release builds
    pub symbols: bool,
    /// Link the debug CRT on Windows (implied by `debug`)
    pub debug_crt: bool,
}

impl BuildFlags {
    pub const fn build_type(self) -> BuildType {
        BuildType::from_debug(self.debug)
    }

    /// Whether produced libraries keep their debug symbols.
    pub const fn keeps_symbols(self) -> bool {
        self.debug || self.symbols
    }
}

/// Everything a build run needs.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub layout: Layout,
    pub platform: Platform,
    pub archs: Vec<Arch>,
    pub flags: BuildFlags,
    pub toolchain: Toolchain,
    /// Run `git clean -xdf` in the source dir first
    pub clobber: bool,
}

impl BuildPlan {
    /// Plan building every architecture of `platform`.
    pub fn new(layout: Layout, platform: Platform, flags: BuildFlags, toolchain: Toolchain) -> Self {
        Self {
            layout,
            platform,
            archs: platform.architectures().to_vec(),
            flags,
            toolchain,
            clobber: false,
        }
    }

    #[must_use]
    pub fn clobber(mut self, clobber: bool) -> Self {
        self.clobber = clobber;
        self
    }

    /// Restrict the build to `requested` architectures.
    ///
    /// Build order follows the platform's list. An empty selection keeps all.
    pub fn select_archs(mut self, requested: &[Arch]) -> Result<Self> {
        if requested.is_empty() {
            return Ok(self);
        }

        let supported = self.platform.architectures();
        if let Some(arch) = requested.iter().find(|a| !supported.contains(a)) {
            return Err(BuildError::UnsupportedArch {
                platform: self.platform.to_string(),
                arch: arch.to_string(),
            });
        }

        let archs: Vec<Arch> = supported
            .iter()
            .copied()
            .filter(|a| requested.contains(a))
            .collect();

        if self.platform == Platform::Macos && archs.len() != supported.len() {
            return Err(BuildError::InvalidSelection(
                "macos packages universal binaries and needs every architecture".to_string(),
            ));
        }

        self.archs = archs;
        Ok(self)
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct BuildReport {
    pub version: String,
    pub archive: PathBuf,
    /// Archive entry names; empty for dry runs
    pub entries: Vec<String>,
}

/// `git clean -xdf` in the source dir.
pub fn clobber_invocation(layout: &Layout) -> Invocation {
    Invocation::new("git", &layout.source_dir).args(["clean", "-xdf"])
}

/// Remove untracked files from the source tree, if it is writable.
pub fn clobber(runner: &mut dyn Runner, layout: &Layout) -> Result<()> {
    if !is_writable(&layout.source_dir) {
        warn!(
            "{} is not writable, skipping clean",
            layout.source_dir.display()
        );
        return Ok(());
    }

    println!("Cleaning up {} ...", layout.source_dir.display());
    runner.run(&clobber_invocation(layout))
}

/// Whether the current user may write to `path`.
#[cfg(unix)]
fn is_writable(path: &std::path::Path) -> bool {
    rustix::fs::access(path, rustix::fs::Access::WRITE_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(path: &std::path::Path) -> bool {
    std::fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

/// Configure, build and strip one architecture.
pub fn build_one(runner: &mut dyn Runner, plan: &BuildPlan, arch: Arch) -> Result<()> {
    println!("=== Building {} {} ===", plan.platform, arch);

    let objdir = plan.layout.objdir(plan.platform, arch);
    let config = Mozconfig {
        platform: plan.platform,
        arch,
        flags: plan.flags,
        toolchain: &plan.toolchain,
        objdir: &objdir,
    }
    .render();

    let path = plan.layout.mozconfig();
    if runner.is_dry_run() {
        info!("[dry-run] would write {}", path.display());
        for line in config.lines() {
            debug!("[dry-run]   {line}");
        }
    } else {
        std::fs::write(&path, &config).at(&path)?;
        debug!("wrote {}", path.display());
    }

    runner.run(&mach::invocation(
        &plan.layout,
        plan.platform,
        &plan.toolchain,
        plan.flags,
        mach::BUILD,
    ))?;

    for strip in strip::invocations(&plan.layout, plan.platform, arch, plan.flags) {
        runner.run(&strip)?;
    }

    Ok(())
}

/// Run the whole pipeline: clean, build every architecture, package.
///
/// Stops at the first failing command; nothing is packaged after a failure.
pub fn run(runner: &mut dyn Runner, plan: &BuildPlan) -> Result<BuildReport> {
    let build_type = plan.flags.build_type();
    println!(
        "=== Building SpiderMonkey for {} ({build_type}) ===\n",
        plan.platform
    );

    if plan.clobber {
        clobber(runner, &plan.layout)?;
    }

    let version = version::read(&plan.layout.milestone())?;
    info!("gecko version {version}");

    for &arch in &plan.archs {
        build_one(runner, plan, arch)?;
    }

    let archive = plan.layout.archive(&version, plan.platform, build_type);
    let entries = package::package(
        runner,
        &plan.layout,
        plan.platform,
        &plan.archs,
        build_type,
        &archive,
    )?;

    if !runner.is_dry_run() {
        let manifest_path = plan.layout.manifest(&version, plan.platform, build_type);
        manifest::Manifest::new(&version, plan.platform, &plan.archs, build_type, &entries)
            .write(&manifest_path)?;
        debug!("wrote {}", manifest_path.display());
    }

    println!("\n=== Build complete: {} ===", archive.display());

    Ok(BuildReport {
        version,
        archive,
        entries: entries.into_iter().map(|e| e.name).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(platform: Platform) -> BuildPlan {
        BuildPlan::new(
            Layout::new("/work", "/gecko"),
            platform,
            BuildFlags::default(),
            Toolchain::default(),
        )
    }

    #[test]
    fn test_select_archs_keeps_platform_order() {
        let plan = plan(Platform::Android)
            .select_archs(&[Arch::Arm, Arch::X86_64])
            .unwrap();
        assert_eq!(plan.archs, vec![Arch::X86_64, Arch::Arm]);
    }

    #[test]
    fn test_select_archs_rejects_unsupported() {
        let err = plan(Platform::Linux).select_archs(&[Arch::Arm]).unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedArch { .. }));
    }

    #[test]
    fn test_select_archs_macos_requires_all() {
        assert!(plan(Platform::Macos).select_archs(&[Arch::Aarch64]).is_err());
        assert!(plan(Platform::Macos)
            .select_archs(&[Arch::Aarch64, Arch::X86_64])
            .is_ok());
    }

    #[test]
    fn test_empty_selection_keeps_all() {
        let plan = plan(Platform::Win).select_archs(&[]).unwrap();
        assert_eq!(plan.archs.len(), 3);
    }

    #[test]
    fn test_build_flags() {
        let debug = BuildFlags {
            debug: true,
            ..BuildFlags::default()
        };
        assert_eq!(debug.build_type(), BuildType::Debug);
        assert!(debug.keeps_symbols());
        assert!(!BuildFlags::default().keeps_symbols());
    }

    #[test]
    fn test_writable_check() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_writable(dir.path()));
        assert!(!is_writable(&dir.path().join("missing")));
    }

    #[test]
    fn test_clobber_invocation() {
        let inv = clobber_invocation(&Layout::new("/work", "/gecko"));
        assert_eq!(inv.to_string(), "git clean -xdf");
        assert_eq!(inv.cwd, PathBuf::from("/gecko"));
    }
}
