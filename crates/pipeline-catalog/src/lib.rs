//! Pipeline Catalog - Node type discovery for linear processing chains
//!
//! This crate inspects a polymorphic hierarchy of node types and answers the
//! questions a pipeline editor asks while a user builds a chain:
//!
//! - Which types exist, and which of them can be instantiated
//! - What each concrete type exposes as choice, toggle and scalar attributes
//! - Which types belong to a set of categories (AND / OR queries)
//! - Whether one type may consume the output of another
//!
//! # Architecture
//!
//! The object system is reached only through the [`HierarchyProvider`] and
//! [`NodeInstance`] traits:
//!
//! - `signature` / `classifier`: pure parsing of method names and signatures
//! - `attributes`: live probing of a disposable instance into an `AttributeTable`
//! - `catalog`: depth-first hierarchy walk producing an immutable `TypeCatalog`
//! - `taxonomy`: keyword and override driven `CategoryTree` plus selection state
//! - `compatibility`: arity rules and trial connections with a per-session cache
//! - `session`: `CatalogSession`, the surface exposed to editors
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pipeline_catalog::{CatalogConfig, CatalogSession};
//! use pipeline_catalog::hierarchy::memory::{StaticHierarchy, TypeDecl};
//!
//! let hierarchy = StaticHierarchy::new("Algorithm")
//!     .add_type(TypeDecl::concrete("ConeSource").ports(0, 0, 1));
//! let mut session = CatalogSession::new(Arc::new(hierarchy), CatalogConfig::default());
//! session.build_catalog();
//! session.toggle_category("Source")?;
//! let addable = session.selected_class_names(None)?;
//! ```

pub mod attributes;
pub mod catalog;
pub mod classifier;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod session;
pub mod signature;
pub mod taxonomy;
pub mod types;

// Re-export key types
pub use attributes::{AttributeTable, ChoiceAttribute, ScalarAttribute, ToggleAttribute};
pub use catalog::{CatalogEntry, TypeCatalog};
pub use classifier::{classify_methods, AttributeKind, MethodClassification};
pub use compatibility::{CompatibilityCache, CompatibilityChecker};
pub use config::{CatalogConfig, ConfigError};
pub use error::{CatalogError, Result};
pub use hierarchy::{HierarchyProvider, NodeInstance};
pub use session::{CatalogSession, CreatedNode};
pub use signature::{infer_types, MethodSignature, SigType};
pub use taxonomy::{CategoryOverrides, CategoryTaxonomy, CategoryTree, SelectionTree};
pub use types::{ClassNames, Combinator, OutputPort, ScalarType, TypeName};
