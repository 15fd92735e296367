//! External command execution.
//!
//! Every subprocess the builder starts is described by an [`Invocation`] and
//! handed to a [`Runner`]. The system runner checks the exit status, so a
//! failed compile or strip stops the pipeline instead of packaging stale
//! artifacts.

use super::error::{BuildError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// A fully specified external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, cwd: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: cwd.to_path_buf(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<std::ffi::OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    #[must_use]
    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }

    /// Value of an environment variable set on this invocation.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Runs external commands.
pub trait Runner {
    fn run(&mut self, invocation: &Invocation) -> Result<()>;

    /// True when commands are only logged. Callers skip file writes too.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs commands on the host, blocking until each one exits.
#[derive(Debug, Default)]
pub struct SystemRunner {
    pub dry_run: bool,
}

impl SystemRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }
}

impl Runner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        if self.dry_run {
            info!(cwd = %invocation.cwd.display(), "[dry-run] {invocation}");
            for (key, value) in &invocation.env {
                debug!("[dry-run]   {key}={value}");
            }
            return Ok(());
        }

        debug!(cwd = %invocation.cwd.display(), "running {invocation}");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&invocation.cwd)
            .status()
            .map_err(|source| BuildError::Spawn {
                program: invocation.program_name(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::CommandFailed {
                program: invocation.program_name(),
                status: status.to_string(),
            });
        }
        Ok(())
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
