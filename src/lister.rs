use std::collections::BTreeMap;
use crate::error::RegistryError;
use crate::registry::{IndexEntry, ItemType, RegistrySource};

/// One line of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub description: Option<String>,
}

/// A registry document that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unavailable {
    pub name: String,
    pub reason: String,
}

/// All components of a registry style, grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub groups: BTreeMap<ItemType, Vec<ListEntry>>,
    pub unavailable: Vec<Unavailable>,
}

impl Listing {
    /// Number of loaded components across all groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.unavailable.is_empty()
    }
}

/// Groups every component of `source` under its type, names sorted within a group.
pub fn list<S: RegistrySource + ?Sized>(source: &S) -> Result<Listing, RegistryError> {
    let mut listing = Listing::default();
    for entry in source.index()? {
        match entry {
            IndexEntry::Loaded(item) => listing.groups.entry(item.kind).or_default().push(ListEntry {
                name: item.name,
                description: item.description,
            }),
            IndexEntry::Unavailable { name, reason } => {
                listing.unavailable.push(Unavailable { name, reason })
            }
        }
    }
    for entries in listing.groups.values_mut() {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use crate::registry::{Manifest, RegistryItem};
    use pretty_assertions::assert_eq;

    fn item(name: &str, kind: ItemType) -> RegistryItem {
        RegistryItem {
            name: name.into(),
            kind,
            description: Some(format!("The {}", name)),
            dependencies: vec![],
            registry_dependencies: vec![],
            files: vec![],
        }
    }

    #[test]
    fn test_groups_by_type() {
        let manifest = Manifest::from_items([
            item("button", ItemType::Atom),
            item("badge", ItemType::Atom),
            item("dashboard", ItemType::Template),
            item("utils", ItemType::Internal),
        ]);
        let listing = list(&manifest).unwrap();

        assert_eq!(listing.groups.len(), 3);
        let atoms: Vec<_> = listing.groups[&ItemType::Atom].iter().map(|e| e.name.as_str()).collect();
        assert_eq!(atoms, vec!["badge", "button"]);
        assert_eq!(
            listing.groups[&ItemType::Template][0].description.as_deref(),
            Some("The dashboard")
        );
    }

    #[test]
    fn test_union_of_groups_is_whole_manifest() {
        let manifest = Manifest::from_items([
            item("a", ItemType::Atom),
            item("b", ItemType::Block),
            item("c", ItemType::Hook),
            item("d", ItemType::Atom),
            item("e", ItemType::Lib),
        ]);
        let listing = list(&manifest).unwrap();

        let listed: Vec<_> = listing.groups.values().flatten().map(|e| e.name.clone()).collect();
        let unique: BTreeSet<_> = listed.iter().cloned().collect();
        assert_eq!(listed.len(), manifest.len());
        assert_eq!(unique.len(), manifest.len());
        assert_eq!(listing.len(), 5);
    }

    #[test]
    fn test_empty_manifest() {
        let listing = list(&Manifest::new()).unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.len(), 0);
    }
}
