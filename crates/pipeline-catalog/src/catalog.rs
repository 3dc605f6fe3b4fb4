//! Node type catalog
//!
//! [`TypeCatalog::build`] walks the hierarchy depth-first from a root type and
//! materializes one [`CatalogEntry`] per declared type. Children are visited
//! before their parent is probed, so `is_reachable` is always computed from a
//! fully built subtree. The finished catalog is immutable and can be shared
//! across sessions behind an `Arc`.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::attributes::{probe_attributes, AttributeTable};
use crate::hierarchy::HierarchyProvider;
use crate::types::TypeName;

/// Metadata for one node type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub type_name: TypeName,
    /// The type cannot be instantiated directly
    pub is_abstract: bool,
    /// The type or one of its descendants can be instantiated
    pub is_reachable: bool,
    pub children: Vec<CatalogEntry>,
    /// Template table; empty for abstract types
    pub attributes: AttributeTable,
}

impl CatalogEntry {
    /// Whether instances of this type may be offered to callers
    pub fn is_instantiable(&self) -> bool {
        !self.is_abstract
    }

    /// Children that are reachable, in declaration order
    pub fn reachable_children(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.children.iter().filter(|c| c.is_reachable)
    }
}

/// Immutable catalog of every type below a root
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    root: CatalogEntry,
    /// type name -> child indices leading from the root to the entry
    index: HashMap<TypeName, Vec<usize>>,
}

impl TypeCatalog {
    /// Walk the hierarchy below `root` and probe every type
    pub fn build(provider: &dyn HierarchyProvider, root: &str) -> Self {
        let mut seen = HashSet::new();
        let root = build_entry(provider, root, &mut seen);

        let mut index = HashMap::new();
        let mut path = Vec::new();
        index_entry(&root, &mut path, &mut index);

        let catalog = Self { root, index };
        log::info!(
            "Built catalog for '{}': {} types, {} concrete",
            catalog.root.type_name,
            catalog.len(),
            catalog.concrete_type_names().count()
        );
        catalog
    }

    /// Root entry of the walk
    pub fn root(&self) -> &CatalogEntry {
        &self.root
    }

    /// Look up an entry by type name
    pub fn entry(&self, type_name: &str) -> Option<&CatalogEntry> {
        let path = self.index.get(type_name)?;
        path.iter()
            .try_fold(&self.root, |entry, &i| entry.children.get(i))
    }

    /// Whether the type is part of the catalog
    pub fn contains(&self, type_name: &str) -> bool {
        self.index.contains_key(type_name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Every entry, depth-first pre-order
    pub fn iter(&self) -> CatalogIter<'_> {
        CatalogIter {
            stack: vec![&self.root],
        }
    }

    /// Names of every instantiable type
    pub fn concrete_type_names(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|e| e.is_instantiable())
            .map(|e| e.type_name.as_str())
    }

    /// Whether a type exists, is concrete and reachable
    pub fn is_offerable(&self, type_name: &str) -> bool {
        self.entry(type_name)
            .is_some_and(|e| e.is_instantiable() && e.is_reachable)
    }
}

/// Depth-first pre-order iterator over catalog entries
pub struct CatalogIter<'a> {
    stack: Vec<&'a CatalogEntry>,
}

impl<'a> Iterator for CatalogIter<'a> {
    type Item = &'a CatalogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.stack.pop()?;
        self.stack.extend(entry.children.iter().rev());
        Some(entry)
    }
}

fn build_entry(
    provider: &dyn HierarchyProvider,
    type_name: &str,
    seen: &mut HashSet<TypeName>,
) -> CatalogEntry {
    seen.insert(type_name.to_string());

    let mut children = Vec::new();
    for child in provider.subtypes(type_name) {
        if seen.contains(&child) {
            log::warn!(
                "Type '{}' appears more than once in the hierarchy (under '{}'); keeping the first",
                child,
                type_name
            );
            continue;
        }
        children.push(build_entry(provider, &child, seen));
    }

    let (is_abstract, attributes) = match provider.construct(type_name) {
        Ok(mut instance) => {
            let table = probe_attributes(instance.as_mut());
            log::debug!(
                "{}: {} choices, {} toggles, {} scalars",
                type_name,
                table.choices.len(),
                table.toggles.len(),
                table.scalars.len()
            );
            (false, table)
        }
        Err(e) => {
            log::debug!("{} is abstract: {}", type_name, e);
            (true, AttributeTable::default())
        }
    };

    let is_reachable = !is_abstract || children.iter().any(|c| c.is_reachable);

    CatalogEntry {
        type_name: type_name.to_string(),
        is_abstract,
        is_reachable,
        children,
        attributes,
    }
}

fn index_entry(
    entry: &CatalogEntry,
    path: &mut Vec<usize>,
    index: &mut HashMap<TypeName, Vec<usize>>,
) {
    index.insert(entry.type_name.clone(), path.clone());
    for (i, child) in entry.children.iter().enumerate() {
        path.push(i);
        index_entry(child, path, index);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::hierarchy::memory::{StaticHierarchy, TypeDecl};
    use crate::hierarchy::NodeInstance;
    use crate::types::ScalarType;
    use serde_json::json;

    fn sample() -> StaticHierarchy {
        StaticHierarchy::new("Algorithm")
            .add_type(TypeDecl::abstract_type("Source"))
            .add_type(
                TypeDecl::concrete("SphereSource")
                    .parent("Source")
                    .scalar("Radius", ScalarType::Float, json!(0.5))
                    .toggle("Capping", true),
            )
            .add_type(TypeDecl::abstract_type("Filter"))
            .add_type(TypeDecl::abstract_type("ImageFilter").parent("Filter"))
            .add_type(
                TypeDecl::concrete("ShrinkFilter")
                    .parent("Filter")
                    .ports(1, 1, 1),
            )
            .add_type(TypeDecl::abstract_type("Orphan"))
    }

    #[test]
    fn test_abstract_and_reachable() {
        let catalog = TypeCatalog::build(&sample(), "Algorithm");

        let root = catalog.root();
        assert_eq!(root.type_name, "Algorithm");
        assert!(root.is_abstract);
        assert!(root.is_reachable);

        let source = catalog.entry("Source").unwrap();
        assert!(source.is_abstract && source.is_reachable);

        let image = catalog.entry("ImageFilter").unwrap();
        assert!(image.is_abstract);
        assert!(!image.is_reachable);

        assert!(!catalog.entry("Orphan").unwrap().is_reachable);
        assert!(catalog.entry("Missing").is_none());
    }

    #[test]
    fn test_abstract_entries_have_empty_tables() {
        let catalog = TypeCatalog::build(&sample(), "Algorithm");
        for entry in catalog.iter() {
            if entry.is_abstract {
                assert!(entry.attributes.is_empty(), "{}", entry.type_name);
                assert!(entry.attributes.plain_getters.is_empty());
            }
        }

        let sphere = catalog.entry("SphereSource").unwrap();
        assert!(sphere.attributes.scalars.contains_key("SetRadius"));
        assert!(sphere.attributes.toggles["Capping"].value);
    }

    #[test]
    fn test_iteration_order_and_index() {
        let catalog = TypeCatalog::build(&sample(), "Algorithm");
        let names: Vec<&str> = catalog.iter().map(|e| e.type_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Algorithm",
                "Source",
                "SphereSource",
                "Filter",
                "ImageFilter",
                "ShrinkFilter",
                "Orphan"
            ]
        );
        assert_eq!(catalog.len(), 7);
        assert_eq!(
            catalog.concrete_type_names().collect::<Vec<_>>(),
            vec!["SphereSource", "ShrinkFilter"]
        );

        let filter = catalog.entry("Filter").unwrap();
        let reachable: Vec<&str> = filter
            .reachable_children()
            .map(|e| e.type_name.as_str())
            .collect();
        assert_eq!(reachable, vec!["ShrinkFilter"]);

        assert!(catalog.is_offerable("ShrinkFilter"));
        assert!(!catalog.is_offerable("Filter"));
    }

    /// Provider whose hierarchy lists a type under two parents
    struct Diamond(StaticHierarchy);

    impl HierarchyProvider for Diamond {
        fn subtypes(&self, type_name: &str) -> Vec<TypeName> {
            match type_name {
                "Left" | "Right" => vec!["Shared".to_string()],
                other => self.0.subtypes(other),
            }
        }

        fn construct(&self, type_name: &str) -> Result<Box<dyn NodeInstance>> {
            self.0.construct(type_name)
        }
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let _ = env_logger::builder().is_test(true).try_init();
        let hierarchy = StaticHierarchy::new("Algorithm")
            .add_type(TypeDecl::abstract_type("Left"))
            .add_type(TypeDecl::abstract_type("Right"))
            .add_type(TypeDecl::concrete("Shared").parent("Nowhere"));
        let catalog = TypeCatalog::build(&Diamond(hierarchy), "Algorithm");

        assert_eq!(catalog.entry("Left").unwrap().children.len(), 1);
        assert!(catalog.entry("Right").unwrap().children.is_empty());
        assert!(catalog.entry("Right").unwrap().is_abstract);
        assert!(!catalog.entry("Right").unwrap().is_reachable);
        assert_eq!(catalog.len(), 4);
    }
}
