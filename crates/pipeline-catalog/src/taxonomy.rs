//! Category taxonomy and selection state
//!
//! Node types are filed into a nested [`CategoryTree`] by keyword: a type
//! whose name contains a category key is filed under it, and a type that
//! matches nothing at some level lands in a lazily created catch-all bucket
//! at that level. A manual [`CategoryOverrides`] table can route specific
//! types to an explicit category path instead. Membership is not exclusive,
//! so a type may appear under several sibling categories.
//!
//! [`SelectionTree`] mirrors the category tree with one flag per leaf and
//! holds the filter state chosen by a user.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::TypeCatalog;
use crate::error::{CatalogError, Result};
use crate::types::{ClassNames, Combinator, TypeName};

/// Built-in top-level categories used when no definition document is given
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Image", "Mapper", "Actor", "Source", "Reader", "Writer", "Streamer", "Filter", "OpenGL",
    "Polydata", "Grid",
];

/// Default name of the catch-all category
pub const DEFAULT_MISC_CATEGORY: &str = "Miscellaneous";

/// A category: either a list of member types or nested subcategories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryNode {
    Leaf(Vec<TypeName>),
    Branch(CategoryTree),
}

impl CategoryNode {
    /// Every type filed at or below this node
    pub fn class_names(&self) -> ClassNames {
        match self {
            CategoryNode::Leaf(names) => names.iter().cloned().collect(),
            CategoryNode::Branch(tree) => tree.class_names(),
        }
    }

    fn file(
        &mut self,
        name: &str,
        misc: &str,
        prefix: &mut Vec<String>,
        filed: &mut Vec<Vec<String>>,
    ) {
        match self {
            CategoryNode::Leaf(names) => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                filed.push(prefix.clone());
            }
            CategoryNode::Branch(tree) => tree.file_by_keyword(name, misc, prefix, filed),
        }
    }
}

/// Nested mapping from category name to [`CategoryNode`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTree(BTreeMap<String, CategoryNode>);

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree of empty leaf categories
    pub fn with_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            names
                .into_iter()
                .map(|n| (n.into(), CategoryNode::Leaf(Vec::new())))
                .collect(),
        )
    }

    /// The built-in default category set
    pub fn defaults() -> Self {
        Self::with_categories(DEFAULT_CATEGORIES.iter().copied())
    }

    /// Add or replace a category
    pub fn insert(&mut self, name: impl Into<String>, node: CategoryNode) {
        self.0.insert(name.into(), node);
    }

    /// First-level category
    pub fn get(&self, name: &str) -> Option<&CategoryNode> {
        self.0.get(name)
    }

    /// Follow a path of nested category names
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&CategoryNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.0.get(first.as_ref())?;
        for name in rest {
            node = match node {
                CategoryNode::Branch(tree) => tree.0.get(name.as_ref())?,
                CategoryNode::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    /// First-level category names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryNode)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every type filed anywhere in the tree
    pub fn class_names(&self) -> ClassNames {
        self.0
            .values()
            .fold(ClassNames::new(), |mut acc, node| {
                acc.extend(node.class_names());
                acc
            })
    }

    /// Same shape with every leaf emptied
    fn cleared(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(k, node)| {
                    let node = match node {
                        CategoryNode::Leaf(_) => CategoryNode::Leaf(Vec::new()),
                        CategoryNode::Branch(tree) => CategoryNode::Branch(tree.cleared()),
                    };
                    (k.clone(), node)
                })
                .collect(),
        )
    }

    /// File `name` under every matching key at this level, recursing into
    /// matching branches
    fn file_by_keyword(
        &mut self,
        name: &str,
        misc: &str,
        prefix: &mut Vec<String>,
        filed: &mut Vec<Vec<String>>,
    ) {
        let mut categorized = false;

        for (key, node) in self.0.iter_mut() {
            if key == misc || !name.contains(key.as_str()) {
                continue;
            }
            categorized = true;
            prefix.push(key.clone());
            node.file(name, misc, prefix, filed);
            prefix.pop();
        }

        if !categorized {
            prefix.push(misc.to_string());
            self.0
                .entry(misc.to_string())
                .or_insert_with(|| CategoryNode::Leaf(Vec::new()))
                .file(name, misc, prefix, filed);
            prefix.pop();
        }
    }

    /// Whether `path` can hold a type without passing through a leaf
    fn accepts_path(&self, path: &[String]) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return false;
        };
        match self.0.get(first) {
            None => true,
            Some(CategoryNode::Leaf(_)) => rest.is_empty(),
            Some(CategoryNode::Branch(tree)) => rest.is_empty() || tree.accepts_path(rest),
        }
    }

    /// File `name` at an explicit path, creating missing categories
    fn file_at_path(
        &mut self,
        name: &str,
        path: &[String],
        depth: usize,
        misc: &str,
        filed: &mut Vec<Vec<String>>,
    ) {
        let key = &path[depth];
        let last = depth + 1 == path.len();
        let node = self.0.entry(key.clone()).or_insert_with(|| {
            if last {
                CategoryNode::Leaf(Vec::new())
            } else {
                CategoryNode::Branch(CategoryTree::new())
            }
        });

        match node {
            CategoryNode::Branch(tree) if !last => {
                tree.file_at_path(name, path, depth + 1, misc, filed)
            }
            node => {
                let mut prefix = path[..=depth].to_vec();
                node.file(name, misc, &mut prefix, filed);
            }
        }
    }
}

/// Manual routing of type names to category paths
///
/// In a document a path is either a single category name or an array of
/// nested category names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, OverridePath>")]
pub struct CategoryOverrides(BTreeMap<TypeName, Vec<String>>);

/// Category path as written in an override document
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OverridePath {
    Single(String),
    Nested(Vec<String>),
}

impl From<BTreeMap<String, OverridePath>> for CategoryOverrides {
    fn from(map: BTreeMap<String, OverridePath>) -> Self {
        Self(
            map.into_iter()
                .map(|(name, path)| {
                    let path = match path {
                        OverridePath::Single(category) => vec![category],
                        OverridePath::Nested(path) => path,
                    };
                    (name, path)
                })
                .collect(),
        )
    }
}

impl CategoryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a type to a category path
    pub fn insert<I, S>(&mut self, type_name: impl Into<String>, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(type_name.into(), path.into_iter().map(Into::into).collect());
    }

    pub fn get(&self, type_name: &str) -> Option<&[String]> {
        self.0.get(type_name).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Category tree populated from a catalog
#[derive(Debug, Clone)]
pub struct CategoryTaxonomy {
    categories: CategoryTree,
    /// type name -> category paths it was filed under
    memberships: BTreeMap<TypeName, Vec<Vec<String>>>,
    misc_category: String,
}

impl CategoryTaxonomy {
    /// File every catalog entry into the definition tree
    ///
    /// Leaf contents of `definitions` are discarded; only the category
    /// shape is used. Overridden types skip keyword matching unless their
    /// path passes through a leaf category, in which case the override is
    /// ignored.
    pub fn build(
        definitions: &CategoryTree,
        overrides: &CategoryOverrides,
        catalog: &TypeCatalog,
        misc_category: &str,
    ) -> Self {
        let mut categories = definitions.cleared();
        let mut memberships = BTreeMap::new();

        for (name, _) in overrides.iter() {
            if !catalog.contains(name) {
                log::warn!("Category override names unknown type '{}'", name);
            }
        }

        for entry in catalog.iter() {
            let name = entry.type_name.as_str();
            let mut filed = Vec::new();

            let overridden = match overrides.get(name) {
                Some(path) if categories.accepts_path(path) => {
                    categories.file_at_path(name, path, 0, misc_category, &mut filed);
                    true
                }
                Some(path) => {
                    log::warn!(
                        "Ignoring category override for '{}': path '{}' is not a category",
                        name,
                        path.join("/")
                    );
                    false
                }
                None => false,
            };
            if !overridden {
                categories.file_by_keyword(name, misc_category, &mut Vec::new(), &mut filed);
            }

            memberships.insert(name.to_string(), filed);
        }

        log::info!(
            "Filed {} types into {} top-level categories",
            memberships.len(),
            categories.len()
        );

        Self {
            categories,
            memberships,
            misc_category: misc_category.to_string(),
        }
    }

    /// The populated category tree
    pub fn categories(&self) -> &CategoryTree {
        &self.categories
    }

    /// Name of the catch-all category
    pub fn misc_category(&self) -> &str {
        &self.misc_category
    }

    /// Category paths a type was filed under
    pub fn categories_of(&self, type_name: &str) -> &[Vec<String>] {
        self.memberships
            .get(type_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Types under a category path; empty if the path does not exist
    pub fn class_names_in<S: AsRef<str>>(&self, path: &[S]) -> ClassNames {
        self.categories
            .resolve(path)
            .map(CategoryNode::class_names)
            .unwrap_or_default()
    }

    /// Combine the type sets of several category paths left to right
    ///
    /// An empty path list yields an empty set.
    pub fn class_names_for<P, S>(&self, paths: &[P], combinator: Combinator) -> ClassNames
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut sets = paths.iter().map(|p| self.class_names_in(p.as_ref()));
        let Some(first) = sets.next() else {
            return ClassNames::new();
        };
        sets.fold(first, |acc, set| combinator.combine(&acc, &set))
    }

    /// Fresh selection state with every flag off
    pub fn selection_template(&self) -> SelectionTree {
        SelectionTree::from_categories(&self.categories)
    }
}

/// A selection flag or nested selection state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionNode {
    Flag(bool),
    Branch(SelectionTree),
}

impl SelectionNode {
    fn all_selected(&self) -> bool {
        match self {
            SelectionNode::Flag(on) => *on,
            SelectionNode::Branch(tree) => tree.all_selected(),
        }
    }

    fn set_all(&mut self, value: bool) {
        match self {
            SelectionNode::Flag(on) => *on = value,
            SelectionNode::Branch(tree) => tree.0.values_mut().for_each(|n| n.set_all(value)),
        }
    }
}

/// Filter state shaped like a [`CategoryTree`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionTree(BTreeMap<String, SelectionNode>);

impl SelectionTree {
    /// Mirror a category tree with every flag off
    pub fn from_categories(categories: &CategoryTree) -> Self {
        Self(
            categories
                .0
                .iter()
                .map(|(k, node)| {
                    let node = match node {
                        CategoryNode::Leaf(_) => SelectionNode::Flag(false),
                        CategoryNode::Branch(tree) => {
                            SelectionNode::Branch(Self::from_categories(tree))
                        }
                    };
                    (k.clone(), node)
                })
                .collect(),
        )
    }

    /// Flip a first-level flag
    ///
    /// Returns the new value, or `None` (leaving the state untouched) when
    /// the name is unknown or refers to a nested category.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        match self.0.get_mut(name) {
            Some(SelectionNode::Flag(on)) => {
                *on = !*on;
                Some(*on)
            }
            _ => None,
        }
    }

    /// First-level categories whose flag is on
    pub fn active_categories(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, node)| matches!(node, SelectionNode::Flag(true)))
            .map(|(k, _)| k.as_str())
            .collect()
    }

    /// Value of a first-level category; nested categories must be fully on
    pub fn is_category_selected(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(SelectionNode::all_selected)
    }

    /// Whether every flag at or below `path` is on
    ///
    /// An empty path means the whole tree; unknown paths are not selected.
    pub fn is_fully_selected<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.is_selected(path).unwrap_or(false)
    }

    /// Like [`is_fully_selected`](Self::is_fully_selected), but an unknown
    /// path is an error
    pub fn is_selected<S: AsRef<str>>(&self, path: &[S]) -> Result<bool> {
        if path.is_empty() {
            return Ok(self.all_selected());
        }
        self.resolve(path)
            .map(SelectionNode::all_selected)
            .ok_or_else(|| unknown_category(path))
    }

    /// Set every flag at or below `path`
    pub fn set_selected<S: AsRef<str>>(&mut self, path: &[S], value: bool) -> Result<()> {
        let node = self
            .resolve_mut(path)
            .ok_or_else(|| unknown_category(path))?;
        node.set_all(value);
        Ok(())
    }

    fn all_selected(&self) -> bool {
        self.0.values().all(SelectionNode::all_selected)
    }

    fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Option<&SelectionNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.0.get(first.as_ref())?;
        for name in rest {
            node = match node {
                SelectionNode::Branch(tree) => tree.0.get(name.as_ref())?,
                SelectionNode::Flag(_) => return None,
            };
        }
        Some(node)
    }

    fn resolve_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut SelectionNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.0.get_mut(first.as_ref())?;
        for name in rest {
            node = match node {
                SelectionNode::Branch(tree) => tree.0.get_mut(name.as_ref())?,
                SelectionNode::Flag(_) => return None,
            };
        }
        Some(node)
    }
}

fn unknown_category<S: AsRef<str>>(path: &[S]) -> CatalogError {
    let path: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
    CatalogError::UnknownCategory(path.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::memory::{StaticHierarchy, TypeDecl};

    fn catalog(names: &[&str]) -> TypeCatalog {
        let hierarchy = names
            .iter()
            .fold(StaticHierarchy::new("Algorithm"), |h, name| {
                h.add_type(TypeDecl::concrete(*name))
            });
        TypeCatalog::build(&hierarchy, "Algorithm")
    }

    fn names(items: &[&str]) -> ClassNames {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn taxonomy(types: &[&str]) -> CategoryTaxonomy {
        CategoryTaxonomy::build(
            &CategoryTree::defaults(),
            &CategoryOverrides::new(),
            &catalog(types),
            DEFAULT_MISC_CATEGORY,
        )
    }

    #[test]
    fn test_multi_category_membership() {
        let tax = taxonomy(&["ImageReaderSource", "PolyDataWriter", "Cutter"]);

        assert!(tax.class_names_in(&["Source"]).contains("ImageReaderSource"));
        assert!(tax.class_names_in(&["Reader"]).contains("ImageReaderSource"));
        assert!(tax.class_names_in(&["Image"]).contains("ImageReaderSource"));
        assert_eq!(tax.categories_of("ImageReaderSource").len(), 3);

        assert_eq!(tax.class_names_in(&["Writer"]), names(&["PolyDataWriter"]));
        // Keyword matching is case sensitive
        assert!(tax.class_names_in(&["Polydata"]).is_empty());
    }

    #[test]
    fn test_misc_created_lazily() {
        let tax = taxonomy(&["SphereSource"]);
        // The root type matches nothing
        assert_eq!(
            tax.class_names_in(&["Miscellaneous"]),
            names(&["Algorithm"])
        );
        assert_eq!(tax.categories_of("Algorithm"), &[vec!["Miscellaneous".to_string()]]);

        let definitions = CategoryTree::with_categories(["Algorithm", "Source"]);
        let tax = CategoryTaxonomy::build(
            &definitions,
            &CategoryOverrides::new(),
            &catalog(&["SphereSource"]),
            "Other",
        );
        assert!(tax.categories().get("Other").is_none());
        assert_eq!(tax.misc_category(), "Other");
    }

    #[test]
    fn test_nested_definitions() {
        let definitions: CategoryTree = serde_json::from_str(
            r#"{ "Source": { "Image": [], "Poly": ["Stale"] }, "Filter": [] }"#,
        )
        .unwrap();
        let tax = CategoryTaxonomy::build(
            &definitions,
            &CategoryOverrides::new(),
            &catalog(&["ImageNoiseSource", "PolySource", "ConeSource", "ShrinkFilter"]),
            DEFAULT_MISC_CATEGORY,
        );

        assert_eq!(
            tax.class_names_in(&["Source", "Image"]),
            names(&["ImageNoiseSource"])
        );
        assert_eq!(tax.class_names_in(&["Source", "Poly"]), names(&["PolySource"]));
        assert_eq!(
            tax.class_names_in(&["Source", "Miscellaneous"]),
            names(&["ConeSource"])
        );
        assert_eq!(
            tax.class_names_in(&["Source"]),
            names(&["ImageNoiseSource", "PolySource", "ConeSource"])
        );
        assert!(tax.class_names_in(&["Source", "Image", "Deeper"]).is_empty());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let overrides: CategoryOverrides = serde_json::from_str(
            r#"{ "SphereSource": "Geometry", "ConeSource": ["Shapes", "Cones"], "Nope": "X" }"#,
        )
        .unwrap();
        let tax = CategoryTaxonomy::build(
            &CategoryTree::defaults(),
            &overrides,
            &catalog(&["SphereSource", "ConeSource"]),
            DEFAULT_MISC_CATEGORY,
        );

        assert!(tax.class_names_in(&["Source"]).is_empty());
        assert_eq!(tax.class_names_in(&["Geometry"]), names(&["SphereSource"]));
        assert_eq!(tax.class_names_in(&["Shapes"]), names(&["ConeSource"]));
        assert_eq!(tax.class_names_in(&["Shapes", "Cones"]), names(&["ConeSource"]));
        assert_eq!(
            tax.categories_of("ConeSource"),
            &[vec!["Shapes".to_string(), "Cones".to_string()]]
        );
        // A leaf cannot be extended into a branch
        assert!(matches!(
            tax.categories().get("Geometry"),
            Some(CategoryNode::Leaf(_))
        ));
    }

    #[test]
    fn test_override_through_leaf_falls_back_to_keywords() {
        let mut overrides = CategoryOverrides::new();
        overrides.insert("SphereSource", ["Source", "Spheres"]);
        let tax = CategoryTaxonomy::build(
            &CategoryTree::defaults(),
            &overrides,
            &catalog(&["SphereSource"]),
            DEFAULT_MISC_CATEGORY,
        );
        assert_eq!(tax.class_names_in(&["Source"]), names(&["SphereSource"]));
    }

    #[test]
    fn test_class_names_for_combinators() {
        let tax = taxonomy(&["ImageReaderSource", "ConeSource", "PolyDataWriter"]);

        let empty: [&[&str]; 0] = [];
        assert!(tax.class_names_for(&empty, Combinator::And).is_empty());
        assert!(tax.class_names_for(&empty, Combinator::Or).is_empty());

        let paths = [vec!["Source"], vec!["Writer"]];
        assert!(tax.class_names_for(&paths, Combinator::And).is_empty());
        assert_eq!(
            tax.class_names_for(&paths, Combinator::Or),
            names(&["ImageReaderSource", "ConeSource", "PolyDataWriter"])
        );

        let and = tax.class_names_for(&[["Source"], ["Reader"]], Combinator::And);
        let reversed = tax.class_names_for(&[["Reader"], ["Source"]], Combinator::And);
        assert_eq!(and, reversed);
        assert_eq!(and, names(&["ImageReaderSource"]));

        let or = tax.class_names_for(&[["Source"], ["Reader"]], Combinator::Or);
        assert!(and.is_subset(&tax.class_names_in(&["Source"])));
        assert!(tax.class_names_in(&["Source"]).is_subset(&or));

        // Missing paths resolve to nothing
        assert!(tax
            .class_names_for(&[["Source"], ["Missing"]], Combinator::And)
            .is_empty());
    }

    #[test]
    fn test_combinators_are_associative_across_orderings() {
        let tax = taxonomy(&[
            "ImageReaderSource",
            "ConeSource",
            "PolyDataWriter",
            "XMLImageReader",
        ]);
        let (a, b, c) = (
            tax.class_names_in(&["Source"]),
            tax.class_names_in(&["Reader"]),
            tax.class_names_in(&["Image"]),
        );
        let orderings = [
            [["Source"], ["Reader"], ["Image"]],
            [["Source"], ["Image"], ["Reader"]],
            [["Reader"], ["Source"], ["Image"]],
            [["Reader"], ["Image"], ["Source"]],
            [["Image"], ["Source"], ["Reader"]],
            [["Image"], ["Reader"], ["Source"]],
        ];

        for combinator in [Combinator::And, Combinator::Or] {
            let left = combinator.combine(&combinator.combine(&a, &b), &c);
            let right = combinator.combine(&a, &combinator.combine(&b, &c));
            assert_eq!(left, right);
            for paths in &orderings {
                assert_eq!(tax.class_names_for(paths, combinator), left);
            }
        }

        assert_eq!(
            tax.class_names_for(&orderings[0], Combinator::And),
            names(&["ImageReaderSource"])
        );
        assert_eq!(
            tax.class_names_for(&orderings[0], Combinator::Or),
            names(&["ImageReaderSource", "ConeSource", "XMLImageReader"])
        );
    }

    #[test]
    fn test_tree_serialization_shape() {
        let tax = taxonomy(&["ConeSource"]);
        let json = serde_json::to_value(tax.categories()).unwrap();
        assert_eq!(json["Source"], serde_json::json!(["ConeSource"]));
        assert_eq!(json["Filter"], serde_json::json!([]));

        let back: CategoryTree = serde_json::from_value(json).unwrap();
        assert_eq!(&back, tax.categories());
    }

    fn nested_selection() -> SelectionTree {
        let categories: CategoryTree =
            serde_json::from_str(r#"{ "Source": [], "Filter": { "Image": [], "Poly": [] } }"#)
                .unwrap();
        SelectionTree::from_categories(&categories)
    }

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut selection = nested_selection();
        let before = selection.clone();

        assert_eq!(selection.toggle("Source"), Some(true));
        assert_eq!(selection.active_categories(), vec!["Source"]);
        assert_eq!(selection.toggle("Source"), Some(false));
        assert_eq!(selection, before);

        assert_eq!(selection.toggle("Filter"), None);
        assert_eq!(selection.toggle("Missing"), None);
        assert_eq!(selection, before);
    }

    #[test]
    fn test_selection_queries() {
        let mut selection = nested_selection();
        assert!(!selection.is_fully_selected::<&str>(&[]));
        assert!(!selection.is_fully_selected(&["Filter"]));
        assert!(!selection.is_fully_selected(&["Missing"]));
        assert!(matches!(
            selection.is_selected(&["Filter", "Missing"]),
            Err(CatalogError::UnknownCategory(path)) if path == "Filter/Missing"
        ));

        selection.set_selected(&["Filter", "Image"], true).unwrap();
        assert!(selection.is_fully_selected(&["Filter", "Image"]));
        assert!(!selection.is_category_selected("Filter"));

        selection.set_selected(&["Filter"], true).unwrap();
        assert!(selection.is_category_selected("Filter"));
        assert!(selection.is_selected(&["Filter"]).unwrap());
        // Nested categories are not first-level flags
        assert!(selection.active_categories().is_empty());

        selection.toggle("Source");
        assert!(selection.is_fully_selected::<&str>(&[]));
        assert!(selection.set_selected(&["Source", "Deeper"], true).is_err());
    }

    #[test]
    fn test_empty_branch_is_vacuously_selected() {
        let categories: CategoryTree = serde_json::from_str(r#"{ "Empty": {} }"#).unwrap();
        let selection = SelectionTree::from_categories(&categories);
        assert!(selection.is_fully_selected(&["Empty"]));
    }
}
