use reqwest::StatusCode;
use reqwest::blocking::Client;
use crate::error::RegistryError;
use crate::global::cache::ManifestCache;
use crate::registry::{check_declared_name, parse_item, IndexEntry, RegistryItem, RegistrySource};
use crate::util::is_addressable_name;

/// A registry served over HTTP.
///
/// Components live at `<base>/<style>/<name>.json` and the style index at
/// `<base>/<style>/index.json`. Successful responses are written through to
/// the global cache and served from there if the network is unreachable.
pub struct RemoteRegistry {
    base_url: String,
    style: String,
    client: Client,
    cache: Option<ManifestCache>,
}

impl RemoteRegistry {
    pub fn new(base_url: &str, style: &str) -> Result<Self, RegistryError> {
        let cache = match ManifestCache::global() {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::debug!("Manifest cache unavailable: {}", e);
                None
            }
        };
        Self::with_cache(base_url, style, cache)
    }

    pub fn with_cache(
        base_url: &str,
        style: &str,
        cache: Option<ManifestCache>,
    ) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Fetch {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            style: style.to_string(),
            client,
            cache,
        })
    }

    fn url_for(&self, document: &str) -> String {
        format!("{}/{}/{}.json", self.base_url, self.style, document)
    }

    /// Fetches a document body. `Ok(None)` on HTTP 404.
    fn get(&self, url: &str) -> Result<Option<String>, RegistryError> {
        tracing::debug!("GET {}", url);
        let response = match self.client.get(url).send() {
            Ok(response) => response,
            Err(e) => return self.cached_or(url, e.to_string()).map(Some),
        };
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RegistryError::Fetch {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }
        let body = response.text().map_err(|e| RegistryError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if let Some(cache) = &self.cache
            && let Err(e) = cache.store(url, &body)
        {
            tracing::debug!("Could not cache {}: {}", url, e);
        }
        Ok(Some(body))
    }

    fn cached_or(&self, url: &str, reason: String) -> Result<String, RegistryError> {
        let cached = self
            .cache
            .as_ref()
            .and_then(|cache| cache.get(url).ok().flatten());
        match cached {
            Some(body) => {
                tracing::warn!("{} unreachable ({}), using cached copy", url, reason);
                Ok(body)
            }
            None => Err(RegistryError::Fetch {
                url: url.to_string(),
                reason,
            }),
        }
    }
}

impl RegistrySource for RemoteRegistry {
    fn fetch(&self, name: &str) -> Result<Option<RegistryItem>, RegistryError> {
        if !is_addressable_name(name) {
            return Ok(None);
        }
        let url = self.url_for(name);
        match self.get(&url)? {
            Some(body) => {
                let item = parse_item(&body, &url)?;
                check_declared_name(item, name, &url).map(Some)
            }
            None => Ok(None),
        }
    }

    fn index(&self) -> Result<Vec<IndexEntry>, RegistryError> {
        let url = self.url_for("index");
        let body = self.get(&url)?.ok_or_else(|| RegistryError::Fetch {
            url: url.clone(),
            reason: "registry has no index".to_string(),
        })?;
        let documents: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| RegistryError::ManifestParse {
                origin: url.clone(),
                reason: e.to_string(),
            })?;
        let entries = documents
            .into_iter()
            .map(|document| {
                let name = document
                    .get("name")
                    .and_then(|name| name.as_str())
                    .unwrap_or("<unnamed>")
                    .to_string();
                match serde_json::from_value::<RegistryItem>(document) {
                    Ok(item) => IndexEntry::Loaded(item),
                    Err(e) => IndexEntry::Unavailable {
                        name,
                        reason: e.to_string(),
                    },
                }
            })
            .collect();
        Ok(entries)
    }
}
