use std::path::{Path, PathBuf};
use crate::global::utils::get_global_cache_dir;
use anyhow::{Context, Result};

/// On-disk copies of registry documents fetched over HTTP, keyed by URL.
#[derive(Debug, Clone)]
pub struct ManifestCache {
    dir: PathBuf,
}

impl ManifestCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// The cache under the platform cache directory (`~/.cache/shelf/manifests` on Linux).
    pub fn global() -> Result<Self> {
        Ok(Self::new(get_global_cache_dir()?.join("manifests")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(cache_key(url))
    }

    pub fn get(&self, url: &str) -> Result<Option<String>> {
        let path = self.entry_path(url);
        if !path.exists() {
            return Ok(None);
        }
        let body = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not read cache file {:?}", path))?;
        Ok(Some(body))
    }

    pub fn store(&self, url: &str, body: &str) -> Result<()> {
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir)
                .with_context(|| format!("Could not create cache dir {:?}", self.dir))?;
            tracing::debug!("Cache directory created: {}", self.dir.display());
        }
        let path = self.entry_path(url);
        std::fs::write(&path, body)
            .with_context(|| format!("Could not write cache file {:?}", path))?;
        Ok(())
    }

    /// Removes every cached document. Returns how many were removed.
    pub fn clean(&self) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let count = std::fs::read_dir(&self.dir)?.count();
        std::fs::remove_dir_all(&self.dir)?;
        std::fs::create_dir_all(&self.dir)?;
        Ok(count)
    }
}

/// Flattens a URL into a single file name.
fn cache_key(url: &str) -> String {
    let stripped = url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    stripped
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}
