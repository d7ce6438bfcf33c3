use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;
use crate::error::RegistryError;
use crate::remote::RemoteRegistry;
use crate::util::{is_addressable_name, is_url};

/// The kind of a registry component.
///
/// Only used to group components when listing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Atom,
    Molecule,
    Organism,
    Template,
    Block,
    Hook,
    Lib,
    Internal,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemType::Atom => "atom",
            ItemType::Molecule => "molecule",
            ItemType::Organism => "organism",
            ItemType::Template => "template",
            ItemType::Block => "block",
            ItemType::Hook => "hook",
            ItemType::Lib => "lib",
            ItemType::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// A single installable component as published in a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryItem {
    /// Unique name within one style.
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Packages handed to the package manager, e.g. `"@radix-ui/react-slot"`.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Other components of the same style that must be installed first.
    #[serde(default, rename = "registryDependencies")]
    pub registry_dependencies: Vec<String>,
    #[serde(default)]
    pub files: Vec<RegistryFile>,
}

/// A source file shipped with a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryFile {
    pub path: String,
    /// Index documents may omit contents.
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Overrides `path` as the write destination when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl RegistryFile {
    /// The project-relative path this file is written to.
    pub fn destination(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.path)
    }
}

/// One entry of a registry index.
///
/// Entries are resolved once when the index is loaded: a document that
/// cannot be read or parsed becomes `Unavailable` instead of failing the
/// whole listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEntry {
    Loaded(RegistryItem),
    Unavailable { name: String, reason: String },
}

/// Anything that can hand out registry components for one style.
pub trait RegistrySource {
    /// Looks up a single component. `Ok(None)` means the registry has no such name.
    fn fetch(&self, name: &str) -> Result<Option<RegistryItem>, RegistryError>;

    /// Every component of the style, in a stable order.
    fn index(&self) -> Result<Vec<IndexEntry>, RegistryError>;
}

impl<S: RegistrySource + ?Sized> RegistrySource for Box<S> {
    fn fetch(&self, name: &str) -> Result<Option<RegistryItem>, RegistryError> {
        (**self).fetch(name)
    }

    fn index(&self) -> Result<Vec<IndexEntry>, RegistryError> {
        (**self).index()
    }
}

/// Where components come from: a directory / bundle file, or an HTTP registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLocation {
    Path(PathBuf),
    Url(String),
}

impl RegistryLocation {
    /// Parses a configured location. Relative paths are taken relative to `base`.
    pub fn parse(location: &str, base: &Path) -> Self {
        if is_url(location) {
            RegistryLocation::Url(location.trim_end_matches('/').to_string())
        } else {
            RegistryLocation::Path(base.join(location))
        }
    }
}

impl fmt::Display for RegistryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryLocation::Path(path) => write!(f, "{}", path.display()),
            RegistryLocation::Url(url) => f.write_str(url),
        }
    }
}

/// Opens the registry at `location` for the given style.
///
/// A `.json` file is read as a bundle holding every style, a directory as a
/// [`LocalRegistry`], and an `http(s)://` URL as a [`RemoteRegistry`].
pub fn open(location: &RegistryLocation, style: &str) -> Result<Box<dyn RegistrySource>, RegistryError> {
    match location {
        RegistryLocation::Url(url) => Ok(Box::new(RemoteRegistry::new(url, style)?)),
        RegistryLocation::Path(path) if path.is_file() => {
            Ok(Box::new(Manifest::load_bundle(path, style)?))
        }
        RegistryLocation::Path(path) => Ok(Box::new(LocalRegistry::new(path, style))),
    }
}

/// An in-memory manifest, keyed by component name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    items: BTreeMap<String, RegistryItem>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a manifest from items. A later item replaces an earlier one of the same name.
    pub fn from_items<I: IntoIterator<Item = RegistryItem>>(items: I) -> Self {
        let mut manifest = Self::new();
        for item in items {
            manifest.insert(item);
        }
        manifest
    }

    pub fn insert(&mut self, item: RegistryItem) {
        self.items.insert(item.name.clone(), item);
    }

    pub fn get(&self, name: &str) -> Option<&RegistryItem> {
        self.items.get(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reads one style out of a bundle file shaped as `{ "<style>": [items...] }`.
    pub fn load_bundle<P: AsRef<Path>>(path: P, style: &str) -> Result<Manifest, RegistryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::ManifestRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut styles: BTreeMap<String, Vec<RegistryItem>> = serde_json::from_str(&content)
            .map_err(|e| RegistryError::ManifestParse {
                origin: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let items = styles.remove(style).ok_or_else(|| RegistryError::ManifestRead {
            path: path.to_path_buf(),
            reason: format!("bundle has no style '{}'", style),
        })?;
        Ok(Manifest::from_items(items))
    }
}

impl RegistrySource for Manifest {
    fn fetch(&self, name: &str) -> Result<Option<RegistryItem>, RegistryError> {
        Ok(self.items.get(name).cloned())
    }

    fn index(&self) -> Result<Vec<IndexEntry>, RegistryError> {
        Ok(self.items.values().cloned().map(IndexEntry::Loaded).collect())
    }
}

/// A registry laid out on disk as `<root>/<style>/<name>.json`.
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
    style: String,
}

impl LocalRegistry {
    pub fn new<P: AsRef<Path>>(root: P, style: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            style: style.to_string(),
        }
    }

    pub fn style_dir(&self) -> PathBuf {
        self.root.join(&self.style)
    }

    fn item_path(&self, name: &str) -> PathBuf {
        self.style_dir().join(format!("{}.json", name))
    }
}

impl RegistrySource for LocalRegistry {
    fn fetch(&self, name: &str) -> Result<Option<RegistryItem>, RegistryError> {
        if !is_addressable_name(name) {
            return Ok(None);
        }
        let path = self.item_path(name);
        if !path.is_file() {
            return Ok(None);
        }
        let item = read_item(&path)?;
        check_declared_name(item, name, &path.display().to_string()).map(Some)
    }

    fn index(&self) -> Result<Vec<IndexEntry>, RegistryError> {
        let dir = self.style_dir();
        if !dir.is_dir() {
            return Err(RegistryError::ManifestRead {
                path: dir,
                reason: "style directory does not exist".to_string(),
            });
        }
        let mut entries = Vec::new();
        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| RegistryError::ManifestRead {
                path: dir.clone(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let stem = path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            if stem == "index" {
                continue;
            }
            let loaded = read_item(path)
                .and_then(|item| check_declared_name(item, &stem, &path.display().to_string()));
            match loaded {
                Ok(item) => entries.push(IndexEntry::Loaded(item)),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    entries.push(IndexEntry::Unavailable {
                        name: stem,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(entries)
    }
}

fn read_item(path: &Path) -> Result<RegistryItem, RegistryError> {
    let content = std::fs::read_to_string(path).map_err(|e| RegistryError::ManifestRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_item(&content, &path.display().to_string())
}

/// Fails unless the document declares the name it was looked up by.
pub fn check_declared_name(item: RegistryItem, name: &str, origin: &str) -> Result<RegistryItem, RegistryError> {
    if item.name != name {
        return Err(RegistryError::ManifestParse {
            origin: origin.to_string(),
            reason: format!("declares name '{}' instead of '{}'", item.name, name),
        });
    }
    Ok(item)
}

/// Parses one component document. `origin` names the document in errors.
pub fn parse_item(content: &str, origin: &str) -> Result<RegistryItem, RegistryError> {
    serde_json::from_str(content).map_err(|e| RegistryError::ManifestParse {
        origin: origin.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const BUTTON: &str = r#"{
        "name": "button",
        "type": "atom",
        "description": "A clickable button",
        "dependencies": ["@radix-ui/react-slot"],
        "registryDependencies": ["utils"],
        "files": [{ "path": "ui/button.tsx", "content": "export {}", "type": "registry:ui" }]
    }"#;

    fn write_component(root: &Path, style: &str, name: &str, body: &str) {
        let dir = root.join(style);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.json", name)), body).unwrap();
    }

    #[test]
    fn test_parse_item_reads_camel_case_dependencies() {
        let item = parse_item(BUTTON, "button.json").unwrap();
        assert_eq!(item.kind, ItemType::Atom);
        assert_eq!(item.registry_dependencies, vec!["utils".to_string()]);
        assert_eq!(item.files[0].destination(), "ui/button.tsx");
    }

    #[test]
    fn test_parse_item_defaults_optional_lists() {
        let item = parse_item(r#"{"name":"x","type":"lib"}"#, "x.json").unwrap();
        assert!(item.dependencies.is_empty());
        assert!(item.registry_dependencies.is_empty());
        assert!(item.files.is_empty());
        assert!(item.description.is_none());
    }

    #[test]
    fn test_parse_item_rejects_unknown_type() {
        let err = parse_item(r#"{"name":"x","type":"widget"}"#, "x.json").unwrap_err();
        assert!(matches!(err, RegistryError::ManifestParse { .. }));
    }

    #[test]
    fn test_target_overrides_path() {
        let file = RegistryFile {
            path: "ui/card.tsx".into(),
            content: String::new(),
            kind: "registry:ui".into(),
            target: Some("app/card.tsx".into()),
        };
        assert_eq!(file.destination(), "app/card.tsx");
    }

    #[test]
    fn test_local_registry_fetch() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), "default", "button", BUTTON);
        let registry = LocalRegistry::new(dir.path(), "default");

        let item = registry.fetch("button").unwrap().unwrap();
        assert_eq!(item.name, "button");
        assert!(registry.fetch("card").unwrap().is_none());
    }

    #[test]
    fn test_local_registry_styles_are_independent() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), "default", "button", BUTTON);
        let registry = LocalRegistry::new(dir.path(), "new-york");
        assert!(registry.fetch("button").unwrap().is_none());
    }

    #[test]
    fn test_local_registry_rejects_mismatched_name() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), "default", "card", BUTTON);
        let registry = LocalRegistry::new(dir.path(), "default");
        assert!(matches!(
            registry.fetch("card"),
            Err(RegistryError::ManifestParse { .. })
        ));
    }

    #[test]
    fn test_local_registry_index_marks_broken_documents() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), "default", "button", BUTTON);
        write_component(dir.path(), "default", "broken", "{ not json");
        write_component(dir.path(), "default", "index", "[]");
        let registry = LocalRegistry::new(dir.path(), "default");

        let entries = registry.index().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(&entries[0], IndexEntry::Unavailable { name, .. } if name == "broken"));
        assert!(matches!(&entries[1], IndexEntry::Loaded(item) if item.name == "button"));
    }

    #[test]
    fn test_local_registry_index_marks_mismatched_names() {
        let dir = tempdir().unwrap();
        let bar = r#"{"name":"bar","type":"atom"}"#;
        write_component(dir.path(), "default", "foo", bar);
        write_component(dir.path(), "default", "baz", bar);
        let registry = LocalRegistry::new(dir.path(), "default");

        let entries = registry.index().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| matches!(
            entry,
            IndexEntry::Unavailable { reason, .. } if reason.contains("declares name 'bar'")
        )));
    }

    #[test]
    fn test_local_registry_ignores_unaddressable_names() {
        let dir = tempdir().unwrap();
        write_component(dir.path(), "default", "button", BUTTON);
        write_component(dir.path(), "default", "index", "[]");
        let registry = LocalRegistry::new(dir.path().join("default").join(".."), "default");

        for name in ["index", "../default/button", "ui/button", "", "Button"] {
            assert!(registry.fetch(name).unwrap().is_none(), "{}", name);
        }
    }

    #[test]
    fn test_bundle_resolves_names_outside_path_rules() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, r#"{ "default": [{ "name": "DataTable", "type": "organism" }] }"#).unwrap();

        let manifest = Manifest::load_bundle(&path, "default").unwrap();
        let item = crate::resolve::resolve(&manifest, "DataTable").unwrap();
        assert_eq!(item.kind, ItemType::Organism);
    }

    #[test]
    fn test_local_registry_index_requires_style_dir() {
        let dir = tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path(), "default");
        assert!(registry.index().is_err());
    }

    #[test]
    fn test_manifest_load_bundle_picks_style() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(
            &path,
            format!(r#"{{ "default": [{}], "new-york": [] }}"#, BUTTON),
        )
        .unwrap();

        let manifest = Manifest::load_bundle(&path, "default").unwrap();
        assert_eq!(manifest.len(), 1);
        assert!(manifest.get("button").is_some());
        assert!(Manifest::load_bundle(&path, "new-york").unwrap().is_empty());
        assert!(Manifest::load_bundle(&path, "missing").is_err());
    }

    #[test]
    fn test_location_parse() {
        let base = Path::new("/project");
        assert_eq!(
            RegistryLocation::parse("https://example.com/r/", base),
            RegistryLocation::Url("https://example.com/r".to_string())
        );
        assert_eq!(
            RegistryLocation::parse("registry", base),
            RegistryLocation::Path(PathBuf::from("/project/registry"))
        );
    }
}
