//! Catalog session
//!
//! [`CatalogSession`] is the surface used by a pipeline editor. It owns the
//! mutable per-session state (selection flags and the compatibility cache)
//! and shares the immutable catalog and taxonomy behind `Arc`s, so several
//! sessions can be opened over one build.
//!
//! # Example
//!
//! ```ignore
//! let mut session = CatalogSession::new(provider, CatalogConfig::default());
//! session.build_catalog();
//! session.toggle_category("Source")?;
//! let addable = session.selected_class_names(None)?;
//! ```

use std::sync::Arc;

use crate::attributes::AttributeTable;
use crate::catalog::{CatalogEntry, TypeCatalog};
use crate::compatibility::{CompatibilityCache, CompatibilityChecker};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::hierarchy::{HierarchyProvider, NodeInstance};
use crate::taxonomy::{CategoryOverrides, CategoryTaxonomy, CategoryTree, SelectionTree};
use crate::types::{ClassNames, Combinator};

/// A freshly created node with its own copy of the attribute table
pub struct CreatedNode {
    pub instance: Box<dyn NodeInstance>,
    pub attributes: AttributeTable,
}

struct BuiltState {
    catalog: Arc<TypeCatalog>,
    taxonomy: Arc<CategoryTaxonomy>,
    selection: SelectionTree,
    checker: CompatibilityChecker,
}

impl BuiltState {
    fn new(
        provider: Arc<dyn HierarchyProvider>,
        catalog: Arc<TypeCatalog>,
        taxonomy: Arc<CategoryTaxonomy>,
    ) -> Self {
        Self {
            selection: taxonomy.selection_template(),
            checker: CompatibilityChecker::new(provider, Arc::clone(&catalog)),
            catalog,
            taxonomy,
        }
    }
}

/// Per-session view over a node type catalog
pub struct CatalogSession {
    provider: Arc<dyn HierarchyProvider>,
    config: CatalogConfig,
    state: Option<BuiltState>,
}

impl CatalogSession {
    /// Create a session; nothing is probed until [`build_catalog`](Self::build_catalog)
    pub fn new(provider: Arc<dyn HierarchyProvider>, config: CatalogConfig) -> Self {
        Self {
            provider,
            config,
            state: None,
        }
    }

    /// Open another session over this session's catalog
    ///
    /// The new session starts with no categories selected and an empty
    /// compatibility cache.
    pub fn fork(&self) -> Result<Self> {
        let state = self.state()?;
        Ok(Self {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
            state: Some(BuiltState::new(
                Arc::clone(&self.provider),
                Arc::clone(&state.catalog),
                Arc::clone(&state.taxonomy),
            )),
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Build the catalog and taxonomy from the configured documents
    pub fn build_catalog(&mut self) -> Arc<TypeCatalog> {
        let definitions = self.config.category_definitions();
        let overrides = self.config.category_overrides();
        self.build_catalog_with(&definitions, &overrides)
    }

    /// Build the catalog and taxonomy from explicit category documents
    ///
    /// Rebuilding discards the previous selection state and cache.
    pub fn build_catalog_with(
        &mut self,
        definitions: &CategoryTree,
        overrides: &CategoryOverrides,
    ) -> Arc<TypeCatalog> {
        let catalog = Arc::new(TypeCatalog::build(
            self.provider.as_ref(),
            &self.config.root_type,
        ));
        let taxonomy = Arc::new(CategoryTaxonomy::build(
            definitions,
            overrides,
            &catalog,
            &self.config.misc_category,
        ));

        self.state = Some(BuiltState::new(
            Arc::clone(&self.provider),
            Arc::clone(&catalog),
            taxonomy,
        ));
        catalog
    }

    pub fn is_built(&self) -> bool {
        self.state.is_some()
    }

    /// The built catalog
    pub fn catalog(&self) -> Result<&TypeCatalog> {
        Ok(&self.state()?.catalog)
    }

    /// The built taxonomy
    pub fn taxonomy(&self) -> Result<&CategoryTaxonomy> {
        Ok(&self.state()?.taxonomy)
    }

    /// Catalog entry for a type name
    pub fn entry_for(&self, type_name: &str) -> Result<Option<&CatalogEntry>> {
        Ok(self.state()?.catalog.entry(type_name))
    }

    /// Types under several category paths, combined left to right
    pub fn categories_for<P, S>(&self, paths: &[P], combinator: Combinator) -> Result<ClassNames>
    where
        P: AsRef<[S]>,
        S: AsRef<str>,
    {
        Ok(self.state()?.taxonomy.class_names_for(paths, combinator))
    }

    /// Flip a first-level category filter
    ///
    /// Unknown and nested category names leave the selection unchanged and
    /// return `None`.
    pub fn toggle_category(&mut self, name: &str) -> Result<Option<bool>> {
        let toggled = self.state_mut()?.selection.toggle(name);
        log::debug!("Toggled category '{}': {:?}", name, toggled);
        Ok(toggled)
    }

    /// Set every filter at or below a category path
    pub fn set_category_selected<S: AsRef<str>>(&mut self, path: &[S], value: bool) -> Result<()> {
        self.state_mut()?.selection.set_selected(path, value)
    }

    /// Current selection state
    pub fn selection(&self) -> Result<&SelectionTree> {
        Ok(&self.state()?.selection)
    }

    /// Compatibility results cached by this session
    pub fn compatibility_cache(&self) -> Result<&CompatibilityCache> {
        Ok(self.state()?.checker.cache())
    }

    /// Types that may be added next
    ///
    /// A type must be filed under every active first-level category, be
    /// concrete and reachable, and, when a predecessor is given, be able to
    /// consume its output. A predecessor whose output cannot be produced
    /// admits nothing.
    pub fn selected_class_names(
        &mut self,
        predecessor: Option<&mut dyn NodeInstance>,
    ) -> Result<ClassNames> {
        let state = self.state_mut()?;

        let active: Vec<[&str; 1]> = state
            .selection
            .active_categories()
            .into_iter()
            .map(|c| [c])
            .collect();
        let mut names = state.taxonomy.class_names_for(&active, Combinator::And);
        names.retain(|n| state.catalog.is_offerable(n));

        let Some(predecessor) = predecessor else {
            return Ok(names);
        };

        let output = match predecessor.output_port() {
            Ok(output) => output,
            Err(e) => {
                log::debug!(
                    "Predecessor {} has no usable output: {}",
                    predecessor.type_name(),
                    e
                );
                return Ok(ClassNames::new());
            }
        };
        let predecessor_type = predecessor.type_name().to_string();

        let checker = &mut state.checker;
        names.retain(|n| checker.can_follow(n, Some(&output), Some(&predecessor_type)));
        Ok(names)
    }

    /// Whether `candidate` may follow `predecessor` (or start a chain)
    pub fn can_follow(
        &mut self,
        candidate: &str,
        predecessor: Option<&mut dyn NodeInstance>,
    ) -> Result<bool> {
        let state = self.state_mut()?;
        let Some(predecessor) = predecessor else {
            return Ok(state.checker.can_follow(candidate, None, None));
        };
        match predecessor.output_port() {
            Ok(output) => Ok(state.checker.can_follow(
                candidate,
                Some(&output),
                Some(predecessor.type_name()),
            )),
            Err(_) => Ok(false),
        }
    }

    /// Construct a node with an independent copy of its attribute table
    pub fn create_instance(&self, type_name: &str) -> Result<CreatedNode> {
        let entry = self
            .state()?
            .catalog
            .entry(type_name)
            .ok_or_else(|| CatalogError::UnknownType(type_name.to_string()))?;
        if entry.is_abstract {
            return Err(CatalogError::AbstractType(type_name.to_string()));
        }

        let instance = self.provider.construct(type_name)?;
        log::debug!("Created instance of {}", type_name);
        Ok(CreatedNode {
            instance,
            attributes: entry.attributes.clone(),
        })
    }

    fn state(&self) -> Result<&BuiltState> {
        self.state.as_ref().ok_or(CatalogError::NotBuilt)
    }

    fn state_mut(&mut self) -> Result<&mut BuiltState> {
        self.state.as_mut().ok_or(CatalogError::NotBuilt)
    }
}
