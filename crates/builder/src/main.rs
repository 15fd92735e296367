//! # SpiderMonkey Builder
//!
//! Build SpiderMonkey static libraries for one platform and package them.
//!
//! ## Usage
//!
//! ```bash
//! build-spidermonkey -r ~/gecko -p linux          # release build, x86_64 + aarch64
//! build-spidermonkey -r ~/gecko -p win -d         # debug build
//! build-spidermonkey -r ~/gecko -p android --arch arm --dry-run
//! ```
//!
//! Produces `spidermonkey-<version>.<platform>.zip` in the base directory.

use anyhow::{Context, Result};
use clap::Parser;
use spidermonkey_builder::builder::exec::SystemRunner;
use spidermonkey_builder::builder::layout::Layout;
use spidermonkey_builder::builder::platform::{Arch, Platform};
use spidermonkey_builder::builder::preflight;
use spidermonkey_builder::builder::toolchain::Toolchain;
use spidermonkey_builder::{BuildFlags, BuildPlan};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "build-spidermonkey", version)]
#[command(about = "Build SpiderMonkey static libs from scratch")]
struct Cli {
    /// Working directory for the build
    #[arg(short = 'b', long, default_value = ".")]
    basedir: PathBuf,

    /// Path to the gecko source repository
    #[arg(short = 'r', long, default_value = ".")]
    sourcedir: PathBuf,

    /// Platform to build
    #[arg(short, long, value_enum, default_value_t = Platform::Macos)]
    platform: Platform,

    /// Clean the source directory (git clean -xdf) before building
    #[arg(long)]
    clobber: bool,

    /// Create a debug build (implies --debug-crt)
    #[arg(short, long)]
    debug: bool,

    /// Include symbols in release builds
    #[arg(short, long)]
    symbols: bool,

    /// Use a debug CRT on Windows
    #[arg(long)]
    debug_crt: bool,

    /// Build only these architectures (repeatable)
    #[arg(long = "arch", value_enum)]
    archs: Vec<Arch>,

    /// JSON file overriding toolchain locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print commands without running them
    #[arg(long)]
    dry_run: bool,

    /// Do not check for required tools before building
    #[arg(long)]
    skip_preflight: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .without_time()
        .init();

    let basedir = std::path::absolute(&cli.basedir)
        .with_context(|| format!("Invalid base directory: {}", cli.basedir.display()))?;
    let sourcedir = std::path::absolute(&cli.sourcedir)
        .with_context(|| format!("Invalid source directory: {}", cli.sourcedir.display()))?;

    let toolchain = match &cli.config {
        Some(path) => Toolchain::load(path)?,
        None => Toolchain::default(),
    };

    let flags = BuildFlags {
        debug: cli.debug,
        symbols: cli.symbols,
        debug_crt: cli.debug_crt,
    };

    let plan = BuildPlan::new(
        Layout::new(basedir, sourcedir),
        cli.platform,
        flags,
        toolchain,
    )
    .clobber(cli.clobber)
    .select_archs(&cli.archs)?;

    if !cli.dry_run && !cli.skip_preflight {
        preflight::check(&plan)?;
    }

    let mut runner = SystemRunner::new(cli.dry_run);
    let report = spidermonkey_builder::run(&mut runner, &plan)
        .with_context(|| format!("SpiderMonkey build for {} failed", cli.platform))?;

    if !cli.dry_run {
        println!(
            "spidermonkey {} -> {} ({} entries)",
            report.version,
            report.archive.display(),
            report.entries.len()
        );
    }

    Ok(())
}
