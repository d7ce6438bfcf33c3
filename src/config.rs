use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use anyhow::{bail, Context, Result};
use crate::package_manager::PackageManagerKind;
use crate::registry::RegistryLocation;
use crate::util::{get_shelf_toml, is_contained_relative};

/// Represents the contents of a `shelf.toml` file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ShelfToml {
    /// Where components are fetched from.
    #[serde(default)]
    pub registry: RegistrySection,
    /// Where and how components are installed.
    #[serde(default)]
    pub project: ProjectSection,
}

/// The `[registry]` table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RegistrySection {
    /// A directory, a bundle `.json` file, or an `http(s)://` base URL.
    pub location: String,
    pub style: String,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            location: "registry".to_string(),
            style: "default".to_string(),
        }
    }
}

/// The `[project]` table.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectSection {
    /// Install root, relative to the project directory.
    pub root: String,
    /// Detected from the lockfile when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<PackageManagerKind>,
    pub overwrite: bool,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            package_manager: None,
            overwrite: true,
        }
    }
}

impl ShelfToml {
    /// Saves the `ShelfToml` to the given file path in pretty TOML format.
    ///
    /// # Errors
    /// Returns an error if the file can't be written or serialization fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
    /// Loads a `ShelfToml` from a file path.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or deserialized.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ShelfToml> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid {}", path.display()))
    }
    /// Loads the file if it exists, otherwise returns the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<ShelfToml> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(ShelfToml::default())
        }
    }
}

/// Command-line values that take precedence over `shelf.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub registry: Option<String>,
    pub style: Option<String>,
    pub package_manager: Option<PackageManagerKind>,
    pub no_overwrite: bool,
    pub skip_deps: bool,
}

/// Fully resolved settings for one invocation, passed to every component explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfConfig {
    pub project_dir: PathBuf,
    pub install_root: PathBuf,
    pub registry: RegistryLocation,
    pub style: String,
    /// `None` means detect from the project's lockfile.
    pub package_manager: Option<PackageManagerKind>,
    pub overwrite: bool,
    pub skip_deps: bool,
}

impl ShelfConfig {
    /// Reads `shelf.toml` from `project_dir` (if any) and applies `overrides`.
    ///
    /// # Errors
    /// Returns an error if the file is malformed or the install root escapes the project.
    pub fn load<P: AsRef<Path>>(project_dir: P, overrides: &Overrides) -> Result<ShelfConfig> {
        let project_dir = project_dir.as_ref();
        let file = ShelfToml::load_or_default(get_shelf_toml(project_dir))?;
        Self::from_toml(project_dir, file, overrides)
    }

    pub fn from_toml(project_dir: &Path, file: ShelfToml, overrides: &Overrides) -> Result<ShelfConfig> {
        let root = Path::new(&file.project.root);
        if !is_contained_relative(root) {
            bail!("project.root must be a relative path inside the project, got '{}'", file.project.root);
        }
        let location = overrides
            .registry
            .clone()
            .unwrap_or(file.registry.location);
        Ok(ShelfConfig {
            project_dir: project_dir.to_path_buf(),
            install_root: project_dir.join(root),
            registry: RegistryLocation::parse(&location, project_dir),
            style: overrides.style.clone().unwrap_or(file.registry.style),
            package_manager: overrides.package_manager.or(file.project.package_manager),
            overwrite: file.project.overwrite && !overrides.no_overwrite,
            skip_deps: overrides.skip_deps,
        })
    }

    /// The configured package manager, or the one the project's lockfile points at.
    pub fn package_manager_kind(&self) -> PackageManagerKind {
        self.package_manager
            .unwrap_or_else(|| PackageManagerKind::detect(&self.project_dir))
    }
}
