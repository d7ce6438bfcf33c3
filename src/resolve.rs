use std::collections::HashSet;
use crate::error::RegistryError;
use crate::registry::{RegistryItem, RegistrySource};

/// Looks up a component by name.
///
/// # Errors
///
/// [`RegistryError::NotFound`] if the source has no component of that name,
/// or whatever the source fails with while reading it.
pub fn resolve<S: RegistrySource + ?Sized>(source: &S, name: &str) -> Result<RegistryItem, RegistryError> {
    source
        .fetch(name)?
        .ok_or_else(|| RegistryError::NotFound { name: name.to_string() })
}

/// Expands a component into its install order: every transitive registry
/// dependency first, the component itself last.
///
/// Each name appears once even when several components depend on it.
///
/// # Errors
///
/// Fails on the first unresolvable component, with
/// [`RegistryError::MissingDependency`] when it was a transitive dependency,
/// and with [`RegistryError::CyclicDependency`] if the graph loops.
pub fn expand<S: RegistrySource + ?Sized>(source: &S, name: &str) -> Result<Vec<RegistryItem>, RegistryError> {
    expand_all(source, &[name])
}

/// Like [`expand`], for several requested components sharing one install order.
pub fn expand_all<S, N>(source: &S, names: &[N]) -> Result<Vec<RegistryItem>, RegistryError>
where
    S: RegistrySource + ?Sized,
    N: AsRef<str>,
{
    let mut expansion = Expansion::default();
    for name in names {
        expansion.visit(source, name.as_ref(), None)?;
    }
    Ok(expansion.order)
}

#[derive(Default)]
struct Expansion {
    /// Names currently being expanded, outermost first.
    path: Vec<String>,
    done: HashSet<String>,
    order: Vec<RegistryItem>,
}

impl Expansion {
    fn visit<S: RegistrySource + ?Sized>(
        &mut self,
        source: &S,
        name: &str,
        required_by: Option<&str>,
    ) -> Result<(), RegistryError> {
        if self.done.contains(name) {
            return Ok(());
        }
        if let Some(start) = self.path.iter().position(|n| n == name) {
            let mut chain = self.path[start..].to_vec();
            chain.push(name.to_string());
            return Err(RegistryError::CyclicDependency { chain });
        }

        let item = match (resolve(source, name), required_by) {
            (Err(RegistryError::NotFound { name }), Some(parent)) => {
                return Err(RegistryError::MissingDependency {
                    name,
                    required_by: parent.to_string(),
                });
            }
            (result, _) => result?,
        };
        tracing::debug!(
            "Resolved {} ({} registry dependencies)",
            item.name,
            item.registry_dependencies.len()
        );

        self.path.push(item.name.clone());
        for dependency in &item.registry_dependencies {
            self.visit(source, dependency, Some(&item.name))?;
        }
        self.path.pop();

        self.done.insert(item.name.clone());
        self.order.push(item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ItemType, Manifest};
    use pretty_assertions::assert_eq;

    fn item(name: &str, deps: &[&str]) -> RegistryItem {
        RegistryItem {
            name: name.to_string(),
            kind: ItemType::Atom,
            description: None,
            dependencies: vec![],
            registry_dependencies: deps.iter().map(|d| d.to_string()).collect(),
            files: vec![],
        }
    }

    fn names(items: &[RegistryItem]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_resolve_returns_stored_record() {
        let stored = item("button", &["utils"]);
        let manifest = Manifest::from_items([stored.clone(), item("utils", &[])]);
        assert_eq!(resolve(&manifest, "button").unwrap(), stored);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let manifest = Manifest::from_items([item("button", &[])]);
        assert!(matches!(
            resolve(&manifest, "card"),
            Err(RegistryError::NotFound { name }) if name == "card"
        ));
    }

    #[test]
    fn test_resolve_any_name_held_in_memory() {
        let stored = item("DataTable", &[]);
        let manifest = Manifest::from_items([stored.clone()]);
        assert_eq!(resolve(&manifest, "DataTable").unwrap(), stored);
        assert!(matches!(resolve(&manifest, "datatable"), Err(RegistryError::NotFound { .. })));
    }

    #[test]
    fn test_expand_puts_dependencies_first() {
        let manifest = Manifest::from_items([item("a", &["b"]), item("b", &[])]);
        let order = expand(&manifest, "a").unwrap();
        assert_eq!(names(&order), vec!["b", "a"]);
    }

    #[test]
    fn test_expand_deep_chain_in_declaration_order() {
        let manifest = Manifest::from_items([
            item("page", &["card", "button"]),
            item("card", &["utils"]),
            item("button", &["utils", "slot"]),
            item("utils", &[]),
            item("slot", &[]),
        ]);
        let order = expand(&manifest, "page").unwrap();
        assert_eq!(names(&order), vec!["utils", "card", "slot", "button", "page"]);
    }

    #[test]
    fn test_expand_installs_diamond_once() {
        let manifest = Manifest::from_items([
            item("a", &["b", "c"]),
            item("b", &["d"]),
            item("c", &["d"]),
            item("d", &[]),
        ]);
        let order = expand(&manifest, "a").unwrap();
        assert_eq!(names(&order), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_expand_detects_cycle() {
        let manifest = Manifest::from_items([item("a", &["b"]), item("b", &["a"])]);
        match expand(&manifest, "a") {
            Err(RegistryError::CyclicDependency { chain }) => {
                assert_eq!(chain, vec!["a", "b", "a"]);
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_expand_detects_self_reference() {
        let manifest = Manifest::from_items([item("a", &["a"])]);
        assert!(matches!(
            expand(&manifest, "a"),
            Err(RegistryError::CyclicDependency { chain }) if chain == vec!["a", "a"]
        ));
    }

    #[test]
    fn test_expand_reports_missing_dependency() {
        let manifest = Manifest::from_items([item("a", &["b"]), item("b", &["ghost"])]);
        match expand(&manifest, "a") {
            Err(RegistryError::MissingDependency { name, required_by }) => {
                assert_eq!(name, "ghost");
                assert_eq!(required_by, "b");
            }
            other => panic!("expected missing dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_expand_unknown_root_is_not_found() {
        let manifest = Manifest::new();
        assert!(matches!(expand(&manifest, "a"), Err(RegistryError::NotFound { .. })));
    }

    #[test]
    fn test_expand_all_shares_visited_set() {
        let manifest = Manifest::from_items([
            item("button", &["utils"]),
            item("card", &["utils"]),
            item("utils", &[]),
        ]);
        let order = expand_all(&manifest, &["button", "card"]).unwrap();
        assert_eq!(names(&order), vec!["utils", "button", "card"]);
    }
}
