use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::DependencyInstallError;

/// Adds packages to a project.
pub trait PackageManager {
    /// Short name used in messages, e.g. `"pnpm"`.
    fn name(&self) -> &str;

    /// Adds all `packages` in one invocation, run from `project_dir`.
    fn add(&self, packages: &[String], project_dir: &Path) -> Result<(), DependencyInstallError>;
}

/// The JavaScript package managers shelf knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerKind {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManagerKind {
    /// Picks the package manager from the lockfile in `project_dir`, defaulting to npm.
    pub fn detect<P: AsRef<Path>>(project_dir: P) -> Self {
        let dir = project_dir.as_ref();
        if dir.join("pnpm-lock.yaml").exists() {
            PackageManagerKind::Pnpm
        } else if dir.join("yarn.lock").exists() {
            PackageManagerKind::Yarn
        } else if dir.join("bun.lockb").exists() || dir.join("bun.lock").exists() {
            PackageManagerKind::Bun
        } else {
            PackageManagerKind::Npm
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManagerKind::Npm => "npm",
            PackageManagerKind::Pnpm => "pnpm",
            PackageManagerKind::Yarn => "yarn",
            PackageManagerKind::Bun => "bun",
        }
    }

    /// Subcommand that adds packages.
    pub fn add_verb(&self) -> &'static str {
        match self {
            PackageManagerKind::Npm => "install",
            _ => "add",
        }
    }

    #[cfg(windows)]
    fn program(&self) -> String {
        format!("{}.cmd", self.as_str())
    }
    #[cfg(not(windows))]
    fn program(&self) -> String {
        self.as_str().to_string()
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManagerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "npm" => Ok(PackageManagerKind::Npm),
            "pnpm" => Ok(PackageManagerKind::Pnpm),
            "yarn" => Ok(PackageManagerKind::Yarn),
            "bun" => Ok(PackageManagerKind::Bun),
            other => Err(format!(
                "unknown package manager '{}' (expected npm, pnpm, yarn or bun)",
                other
            )),
        }
    }
}

/// Runs a real package manager executable.
#[derive(Debug, Clone)]
pub struct NodePackageManager {
    kind: PackageManagerKind,
}

impl NodePackageManager {
    pub fn new(kind: PackageManagerKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> PackageManagerKind {
        self.kind
    }
}

impl PackageManager for NodePackageManager {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn add(&self, packages: &[String], project_dir: &Path) -> Result<(), DependencyInstallError> {
        let failure = |reason: String| DependencyInstallError {
            manager: self.kind.to_string(),
            packages: packages.to_vec(),
            reason,
        };
        // Package names never start with '-'; such an entry would be read as an option.
        if let Some(flag) = packages.iter().find(|p| p.starts_with('-')) {
            return Err(failure(format!("refusing to pass '{}' as a package name", flag)));
        }
        tracing::info!("Running {} {} {}", self.kind, self.kind.add_verb(), packages.join(" "));
        let output = Command::new(self.kind.program())
            .arg(self.kind.add_verb())
            .args(packages)
            .current_dir(project_dir)
            .output()
            .map_err(|e| failure(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(failure(reason));
        }
        Ok(())
    }
}
