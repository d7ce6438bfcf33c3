use std::path::PathBuf;

/// Errors raised while looking up, fetching or expanding registry components.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Component not found in registry: {name}")]
    NotFound { name: String },

    #[error("Component '{required_by}' depends on '{name}', which is not in the registry")]
    MissingDependency { name: String, required_by: String },

    #[error("Cyclic registry dependency: {}", chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    #[error("Failed to read manifest {path}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    #[error("Failed to parse manifest {origin}: {reason}")]
    ManifestParse { origin: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort materialising a single component.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("Refusing to write '{path}' outside of the project root")]
    UnsafePath { component: String, path: String },

    #[error("Could not create directory {path} for '{component}' (already written: {}): {source}", display_paths(written))]
    CreateDir {
        component: String,
        path: PathBuf,
        written: Vec<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write {path} for '{component}' (already written: {}): {source}", display_paths(written))]
    FileWrite {
        component: String,
        path: PathBuf,
        written: Vec<PathBuf>,
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "none".to_string();
    }
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl InstallError {
    /// The component that failed.
    pub fn component(&self) -> &str {
        match self {
            InstallError::UnsafePath { component, .. }
            | InstallError::CreateDir { component, .. }
            | InstallError::FileWrite { component, .. } => component,
        }
    }

    /// Files of the failing component that were written before the error.
    pub fn written(&self) -> &[PathBuf] {
        match self {
            InstallError::UnsafePath { .. } => &[],
            InstallError::CreateDir { written, .. } | InstallError::FileWrite { written, .. } => {
                written.as_slice()
            }
        }
    }
}

/// A package manager invocation that failed. Never fatal: file writing carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{manager} could not add {}: {reason}", packages.join(" "))]
pub struct DependencyInstallError {
    pub manager: String,
    pub packages: Vec<String>,
    pub reason: String,
}
