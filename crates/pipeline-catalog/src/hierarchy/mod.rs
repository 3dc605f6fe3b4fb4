//! Hierarchy introspection capabilities
//!
//! The catalog never talks to a concrete object system. Everything it learns
//! about node types comes through two traits:
//!
//! - [`HierarchyProvider`]: enumerates declared subtypes and attempts
//!   construction of a type.
//! - [`NodeInstance`]: a live instance that exposes its method surface,
//!   per-method signature strings, invoke-by-name, port arity, and the
//!   output/connection probes used by compatibility checks.
//!
//! Runtime failures are reported as `Err` values from the call that caused
//! them; there is no process-wide error flag to reset or poll.
//!
//! [`memory::StaticHierarchy`] is a declarative in-memory provider used by
//! tests and by hosts that describe their node types as data.

pub mod memory;

use crate::error::Result;
use crate::types::{OutputPort, TypeName};

/// Source of node types and their instances
pub trait HierarchyProvider: Send + Sync {
    /// Declared direct subtypes of a type, in declaration order
    fn subtypes(&self, type_name: &str) -> Vec<TypeName>;

    /// Attempt default construction of a type
    ///
    /// Returns `CatalogError::ConstructionRejected` when the type is
    /// declared non-instantiable or construction fails.
    fn construct(&self, type_name: &str) -> Result<Box<dyn NodeInstance>>;
}

/// A live instance of a node type
pub trait NodeInstance {
    /// Type name of this instance
    fn type_name(&self) -> &str;

    /// Every method name exposed by the instance
    fn method_names(&self) -> Vec<String>;

    /// Documentation string describing the signatures of a method
    fn signature_doc(&self, method: &str) -> Option<String>;

    /// Invoke a method by name
    fn invoke(&mut self, method: &str, args: &[serde_json::Value]) -> Result<serde_json::Value>;

    /// Number of declared input slots
    fn input_port_count(&self) -> usize;

    /// Number of input slots that must be connected
    fn required_input_count(&self) -> usize;

    /// Number of declared outputs
    fn output_port_count(&self) -> usize;

    /// Handle to this instance's output, failing when none can be produced
    fn output_port(&mut self) -> Result<OutputPort>;

    /// Connect an upstream output to this instance's first input
    fn connect_input(&mut self, upstream: &OutputPort) -> Result<()>;

    /// Propagate metadata from connected inputs
    fn update_information(&mut self) -> Result<()>;
}
