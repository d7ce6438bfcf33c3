use std::path::{Path, PathBuf};
use crate::error::{DependencyInstallError, InstallError};
use crate::package_manager::PackageManager;
use crate::registry::{RegistryFile, RegistryItem};
use crate::util::is_contained_relative;

/// What happened while materialising one component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub component: String,
    /// Packages successfully handed to the package manager.
    pub packages_added: Vec<String>,
    /// Set when the package manager failed. Files are still written.
    pub dependency_error: Option<DependencyInstallError>,
    pub files_written: Vec<PathBuf>,
    /// Existing files left alone because overwriting was disabled.
    pub files_skipped: Vec<PathBuf>,
}

/// An `install_all` run that stopped part way.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct InstallFailure {
    /// Components fully installed before the failing one, in order.
    pub installed: Vec<InstallReport>,
    pub error: InstallError,
}

/// Writes components into a project.
///
/// Files land under `root`; the package manager runs in `project_dir`.
pub struct Installer<'a> {
    root: PathBuf,
    project_dir: PathBuf,
    package_manager: Option<&'a dyn PackageManager>,
    overwrite: bool,
}

impl<'a> Installer<'a> {
    /// An installer that overwrites existing files and skips package installs.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(root: P, project_dir: Q) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            project_dir: project_dir.as_ref().to_path_buf(),
            package_manager: None,
            overwrite: true,
        }
    }

    pub fn with_package_manager(mut self, package_manager: Option<&'a dyn PackageManager>) -> Self {
        self.package_manager = package_manager;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Installs one component: its packages first, then its files.
    ///
    /// All destinations are checked before anything else happens, so a
    /// component with an unsafe path neither adds packages nor writes files.
    /// A package manager failure is recorded in the report and logged; file
    /// writing goes ahead. A failed write stops the component, and the error
    /// lists what had already been written.
    pub fn install(&self, item: &RegistryItem) -> Result<InstallReport, InstallError> {
        let targets = item
            .files
            .iter()
            .map(|file| Ok((self.destination(item, file)?, file)))
            .collect::<Result<Vec<_>, InstallError>>()?;

        let mut report = InstallReport {
            component: item.name.clone(),
            ..Default::default()
        };

        if !item.dependencies.is_empty() {
            match self.package_manager {
                Some(pm) => match pm.add(&item.dependencies, &self.project_dir) {
                    Ok(()) => report.packages_added = item.dependencies.clone(),
                    Err(e) => {
                        tracing::warn!("{}: {}", item.name, e);
                        report.dependency_error = Some(e);
                    }
                },
                None => tracing::debug!(
                    "Skipping package install for {}: {}",
                    item.name,
                    item.dependencies.join(" ")
                ),
            }
        }

        for (dest, file) in targets {
            if !self.overwrite && dest.exists() {
                tracing::info!("Keeping existing {}", dest.display());
                report.files_skipped.push(dest);
                continue;
            }
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(|source| InstallError::CreateDir {
                    component: item.name.clone(),
                    path: parent.to_path_buf(),
                    written: report.files_written.clone(),
                    source,
                })?;
            }
            std::fs::write(&dest, &file.content).map_err(|source| InstallError::FileWrite {
                component: item.name.clone(),
                path: dest.clone(),
                written: report.files_written.clone(),
                source,
            })?;
            tracing::info!("Wrote {}", dest.display());
            report.files_written.push(dest);
        }
        Ok(report)
    }

    /// Installs components in order, stopping at the first component that fails.
    ///
    /// On failure the reports of the components installed before it are
    /// returned alongside the error.
    pub fn install_all(&self, items: &[RegistryItem]) -> Result<Vec<InstallReport>, InstallFailure> {
        let mut installed = Vec::with_capacity(items.len());
        for item in items {
            match self.install(item) {
                Ok(report) => installed.push(report),
                Err(error) => return Err(InstallFailure { installed, error }),
            }
        }
        Ok(installed)
    }

    fn destination(&self, item: &RegistryItem, file: &RegistryFile) -> Result<PathBuf, InstallError> {
        let relative = Path::new(file.destination());
        if !is_contained_relative(relative) {
            return Err(InstallError::UnsafePath {
                component: item.name.clone(),
                path: file.destination().to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}
