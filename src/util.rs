use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use regex::Regex;

static COMPONENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("component name pattern"));

/// File name of the project configuration.
pub const SHELF_TOML: &str = "shelf.toml";

/// Checks whether `name` can be a registry key.
///
/// Keys are lowercase and never contain path separators, so a name can't
/// address a document outside its style directory.
pub fn is_valid_component_name(name: &str) -> bool {
    !name.contains("..") && COMPONENT_NAME.is_match(name)
}

/// Checks whether `name` can be looked up as `<style>/<name>.json`.
///
/// `index` is reserved for the style index document.
pub fn is_addressable_name(name: &str) -> bool {
    name != "index" && is_valid_component_name(name)
}

/// Returns `true` for `http://` and `https://` locations.
pub fn is_url(location: &str) -> bool {
    location.starts_with("https://") || location.starts_with("http://")
}

/// Returns the path to `shelf.toml` in the given project directory.
pub fn get_shelf_toml<P: AsRef<Path>>(project_dir: P) -> PathBuf {
    project_dir.as_ref().join(SHELF_TOML)
}

/// Checks that a path stays below whatever directory it is joined to:
/// relative, and free of `..` and root components.
pub fn is_contained_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
