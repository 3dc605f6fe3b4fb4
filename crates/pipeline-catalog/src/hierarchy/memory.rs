//! Declarative in-memory hierarchy
//!
//! `StaticHierarchy` implements [`HierarchyProvider`] over node types that
//! are described as data. Each type declares its parent, port arity, initial
//! state and a method table; instances interpret that table when methods are
//! invoked by name.
//!
//! # Example
//!
//! ```ignore
//! let hierarchy = StaticHierarchy::new("Algorithm")
//!     .add_type(TypeDecl::abstract_type("Source").parent("Algorithm"))
//!     .add_type(
//!         TypeDecl::concrete("SphereSource")
//!             .parent("Source")
//!             .ports(0, 0, 1)
//!             .scalar("Radius", ScalarType::Float, json!(0.5))
//!             .toggle("Capping", true),
//!     );
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use super::{HierarchyProvider, NodeInstance};
use crate::error::{CatalogError, Result};
use crate::types::{OutputPort, ScalarType, TypeName};

/// What an instance does when a declared method is invoked
#[derive(Debug, Clone, PartialEq)]
pub enum MethodBehavior {
    /// Return the value of a state field
    Get { field: String },
    /// Store the first argument in a state field
    Set { field: String },
    /// Store a fixed value in a state field
    Assign { field: String, value: Value },
    /// Signal a runtime error
    Fail { message: String },
    /// Do nothing and return null
    Noop,
}

/// A declared method: behavior plus its signature documentation
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub behavior: MethodBehavior,
    pub doc: Option<String>,
}

/// Declaration of one node type
#[derive(Debug, Clone)]
pub struct TypeDecl {
    name: TypeName,
    parent: Option<TypeName>,
    is_abstract: bool,
    inputs: usize,
    required_inputs: usize,
    outputs: usize,
    state: BTreeMap<String, Value>,
    /// Methods in declaration order
    methods: Vec<(String, MethodDecl)>,
    accepts: Option<Vec<TypeName>>,
}

impl TypeDecl {
    fn new(name: impl Into<String>, is_abstract: bool) -> Self {
        Self {
            name: name.into(),
            parent: None,
            is_abstract,
            inputs: 0,
            required_inputs: 0,
            outputs: 1,
            state: BTreeMap::new(),
            methods: Vec::new(),
            accepts: None,
        }
    }

    /// Declare an instantiable type
    pub fn concrete(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// Declare a non-instantiable type
    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// Set the parent type
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set input slots, required inputs and outputs
    pub fn ports(mut self, inputs: usize, required_inputs: usize, outputs: usize) -> Self {
        self.inputs = inputs;
        self.required_inputs = required_inputs.min(inputs);
        self.outputs = outputs;
        self
    }

    /// Restrict accepted upstream producers to the given type names
    ///
    /// Without a restriction any producer is accepted.
    pub fn accepts<I, S>(mut self, producers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepts = Some(producers.into_iter().map(Into::into).collect());
        self
    }

    /// Add a method with explicit behavior and signature documentation
    ///
    /// Redeclaring a method replaces it but keeps its original position.
    pub fn method(
        mut self,
        name: impl Into<String>,
        behavior: MethodBehavior,
        doc: Option<&str>,
    ) -> Self {
        let name = name.into();
        let decl = MethodDecl {
            behavior,
            doc: doc.map(str::to_string),
        };
        match self.methods.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = decl,
            None => self.methods.push((name, decl)),
        }
        self
    }

    fn method_decl(&self, name: &str) -> Option<&MethodDecl> {
        self.methods
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, decl)| decl)
    }

    /// Add a method that always signals an error
    pub fn failing(self, name: impl Into<String>) -> Self {
        let name = name.into();
        let message = format!("{} is not supported", name);
        self.method(name, MethodBehavior::Fail { message }, None)
    }

    /// Set an initial state value
    pub fn state(mut self, field: impl Into<String>, value: Value) -> Self {
        self.state.insert(field.into(), value);
        self
    }

    /// Add a `Set<name>` / `Get<name>` pair over a primitive value
    pub fn scalar(self, name: &str, value_type: ScalarType, initial: Value) -> Self {
        let setter = format!("Set{}", name);
        let getter = format!("Get{}", name);
        let set_doc = format!("V.{}({})", setter, value_type);
        let get_doc = format!("V.{}() -> {}", getter, value_type);
        self.state(name, initial)
            .method(
                setter,
                MethodBehavior::Set { field: name.to_string() },
                Some(&set_doc),
            )
            .method(
                getter,
                MethodBehavior::Get { field: name.to_string() },
                Some(&get_doc),
            )
    }

    /// Add `Set<name>To<variant>` setters and a `Get<name>` getter
    ///
    /// The first variant whose value equals `initial` is the one active on
    /// a fresh instance.
    pub fn choice(mut self, name: &str, variants: &[(&str, Value)], initial: Value) -> Self {
        for (variant, value) in variants {
            let setter = format!("Set{}To{}", name, variant);
            let doc = format!("V.{}()", setter);
            self = self.method(
                setter,
                MethodBehavior::Assign {
                    field: name.to_string(),
                    value: value.clone(),
                },
                Some(&doc),
            );
        }
        let getter = format!("Get{}", name);
        let get_doc = format!("V.{}() -> int", getter);
        self.state(name, initial).method(
            getter,
            MethodBehavior::Get { field: name.to_string() },
            Some(&get_doc),
        )
    }

    /// Add `<name>On` / `<name>Off` switches, `Set<name>` and `Get<name>`
    pub fn toggle(self, name: &str, initial: bool) -> Self {
        let field = name.to_string();
        let on = format!("{}On", name);
        let off = format!("{}Off", name);
        let setter = format!("Set{}", name);
        let getter = format!("Get{}", name);
        let set_doc = format!("V.{}(int)", setter);
        let get_doc = format!("V.{}() -> int", getter);
        let on_doc = format!("V.{}()", on);
        let off_doc = format!("V.{}()", off);
        self.state(name, Value::from(i64::from(initial)))
            .method(
                on,
                MethodBehavior::Assign {
                    field: field.clone(),
                    value: Value::from(1),
                },
                Some(&on_doc),
            )
            .method(
                off,
                MethodBehavior::Assign {
                    field: field.clone(),
                    value: Value::from(0),
                },
                Some(&off_doc),
            )
            .method(setter, MethodBehavior::Set { field: field.clone() }, Some(&set_doc))
            .method(getter, MethodBehavior::Get { field }, Some(&get_doc))
    }

    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Call counters shared between a hierarchy and its instances
#[derive(Debug, Default)]
struct Counters {
    constructions: AtomicUsize,
    connection_probes: AtomicUsize,
}

/// In-memory hierarchy provider
pub struct StaticHierarchy {
    root: TypeName,
    types: BTreeMap<TypeName, Arc<TypeDecl>>,
    children: BTreeMap<TypeName, Vec<TypeName>>,
    counters: Arc<Counters>,
}

impl StaticHierarchy {
    /// Create a hierarchy with an abstract root type
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut types = BTreeMap::new();
        types.insert(root.clone(), Arc::new(TypeDecl::abstract_type(root.clone())));
        Self {
            root,
            types,
            children: BTreeMap::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Create a hierarchy whose root is the given declaration
    pub fn with_root(root: TypeDecl) -> Self {
        let mut hierarchy = Self::new(root.name.clone());
        hierarchy.types.insert(root.name.clone(), Arc::new(root));
        hierarchy
    }

    /// Add a type; types without a parent are attached to the root
    pub fn add_type(mut self, decl: TypeDecl) -> Self {
        let parent = decl.parent.clone().unwrap_or_else(|| self.root.clone());
        let name = decl.name.clone();
        if self.types.insert(name.clone(), Arc::new(decl)).is_none() {
            self.children.entry(parent).or_default().push(name);
        }
        self
    }

    /// Name of the root type
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of successful or attempted constructions so far
    pub fn construction_count(&self) -> usize {
        self.counters.constructions.load(Ordering::SeqCst)
    }

    /// Number of connection probes (`update_information` calls) so far
    pub fn connection_probe_count(&self) -> usize {
        self.counters.connection_probes.load(Ordering::SeqCst)
    }
}

impl HierarchyProvider for StaticHierarchy {
    fn subtypes(&self, type_name: &str) -> Vec<TypeName> {
        self.children.get(type_name).cloned().unwrap_or_default()
    }

    fn construct(&self, type_name: &str) -> Result<Box<dyn NodeInstance>> {
        self.counters.constructions.fetch_add(1, Ordering::SeqCst);
        let decl = self
            .types
            .get(type_name)
            .ok_or_else(|| CatalogError::rejected(type_name, "type is not declared"))?;
        if decl.is_abstract {
            return Err(CatalogError::rejected(type_name, "type is abstract"));
        }
        Ok(Box::new(StaticInstance {
            state: decl.state.clone(),
            decl: Arc::clone(decl),
            connected: None,
            counters: Arc::clone(&self.counters),
        }))
    }
}

/// Instance created by [`StaticHierarchy`]
pub struct StaticInstance {
    decl: Arc<TypeDecl>,
    state: BTreeMap<String, Value>,
    connected: Option<OutputPort>,
    counters: Arc<Counters>,
}

impl StaticInstance {
    /// Current value of a state field
    pub fn field(&self, field: &str) -> Option<&Value> {
        self.state.get(field)
    }
}

impl NodeInstance for StaticInstance {
    fn type_name(&self) -> &str {
        &self.decl.name
    }

    fn method_names(&self) -> Vec<String> {
        self.decl.methods.iter().map(|(n, _)| n.clone()).collect()
    }

    fn signature_doc(&self, method: &str) -> Option<String> {
        self.decl.method_decl(method).and_then(|m| m.doc.clone())
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        let decl = self
            .decl
            .method_decl(method)
            .ok_or_else(|| CatalogError::probe(method, "no such method"))?;

        match &decl.behavior {
            MethodBehavior::Get { field } => {
                Ok(self.state.get(field).cloned().unwrap_or(Value::Null))
            }
            MethodBehavior::Set { field } => {
                let value = args
                    .first()
                    .cloned()
                    .ok_or_else(|| CatalogError::probe(method, "missing argument"))?;
                self.state.insert(field.clone(), value);
                Ok(Value::Null)
            }
            MethodBehavior::Assign { field, value } => {
                self.state.insert(field.clone(), value.clone());
                Ok(Value::Null)
            }
            MethodBehavior::Fail { message } => Err(CatalogError::probe(method, message.clone())),
            MethodBehavior::Noop => Ok(Value::Null),
        }
    }

    fn input_port_count(&self) -> usize {
        self.decl.inputs
    }

    fn required_input_count(&self) -> usize {
        self.decl.required_inputs
    }

    fn output_port_count(&self) -> usize {
        self.decl.outputs
    }

    fn output_port(&mut self) -> Result<OutputPort> {
        if self.decl.outputs == 0 {
            return Err(CatalogError::probe("GetOutputPort", "instance has no outputs"));
        }
        Ok(OutputPort::new(self.decl.name.clone()))
    }

    fn connect_input(&mut self, upstream: &OutputPort) -> Result<()> {
        if self.decl.inputs == 0 {
            return Err(CatalogError::probe(
                "SetInputConnection",
                "instance has no input slots",
            ));
        }
        self.connected = Some(upstream.clone());
        Ok(())
    }

    fn update_information(&mut self) -> Result<()> {
        self.counters.connection_probes.fetch_add(1, Ordering::SeqCst);
        let (Some(upstream), Some(accepted)) = (&self.connected, &self.decl.accepts) else {
            return Ok(());
        };
        if accepted.iter().any(|p| p == &upstream.producer) {
            Ok(())
        } else {
            Err(CatalogError::probe(
                "UpdateInformation",
                format!(
                    "{} does not accept input from {}",
                    self.decl.name, upstream.producer
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> StaticHierarchy {
        StaticHierarchy::new("Algorithm")
            .add_type(TypeDecl::abstract_type("Source"))
            .add_type(
                TypeDecl::concrete("SphereSource")
                    .parent("Source")
                    .ports(0, 0, 1)
                    .scalar("Radius", ScalarType::Float, json!(0.5)),
            )
            .add_type(
                TypeDecl::concrete("ShrinkFilter")
                    .ports(1, 1, 1)
                    .accepts(["SphereSource"]),
            )
    }

    #[test]
    fn test_subtypes_in_declaration_order() {
        let hierarchy = sample();
        assert_eq!(hierarchy.subtypes("Algorithm"), vec!["Source", "ShrinkFilter"]);
        assert_eq!(hierarchy.subtypes("Source"), vec!["SphereSource"]);
        assert!(hierarchy.subtypes("SphereSource").is_empty());
    }

    #[test]
    fn test_abstract_construction_rejected() {
        let hierarchy = sample();
        let err = hierarchy.construct("Source").err().unwrap();
        assert!(matches!(err, CatalogError::ConstructionRejected { .. }));
        assert!(hierarchy.construct("Missing").is_err());
        assert_eq!(hierarchy.construction_count(), 2);
    }

    #[test]
    fn test_scalar_methods() {
        let hierarchy = sample();
        let mut sphere = hierarchy.construct("SphereSource").unwrap();

        assert_eq!(sphere.invoke("GetRadius", &[]).unwrap(), json!(0.5));
        sphere.invoke("SetRadius", &[json!(2.0)]).unwrap();
        assert_eq!(sphere.invoke("GetRadius", &[]).unwrap(), json!(2.0));
        assert_eq!(
            sphere.signature_doc("GetRadius").as_deref(),
            Some("V.GetRadius() -> float")
        );
        assert!(sphere.invoke("Missing", &[]).is_err());
    }

    #[test]
    fn test_connection_probe() {
        let hierarchy = sample();
        let mut sphere = hierarchy.construct("SphereSource").unwrap();
        let output = sphere.output_port().unwrap();

        let mut shrink = hierarchy.construct("ShrinkFilter").unwrap();
        shrink.connect_input(&output).unwrap();
        assert!(shrink.update_information().is_ok());

        let mut other = hierarchy.construct("ShrinkFilter").unwrap();
        other
            .connect_input(&OutputPort::new("ShrinkFilter"))
            .unwrap();
        assert!(other.update_information().is_err());
        assert_eq!(hierarchy.connection_probe_count(), 2);

        assert!(sphere.connect_input(&output).is_err());
    }

    #[test]
    fn test_methods_keep_declaration_order() {
        let hierarchy = StaticHierarchy::new("Algorithm").add_type(
            TypeDecl::concrete("Smoother")
                .choice("Mode", &[("Slow", json!(1)), ("Fast", json!(0))], json!(1))
                .failing("SetModeToSlow"),
        );
        let mut smoother = hierarchy.construct("Smoother").unwrap();

        assert_eq!(
            smoother.method_names(),
            vec!["SetModeToSlow", "SetModeToFast", "GetMode"]
        );
        // Redeclared method keeps its slot but takes the new behavior
        assert!(smoother.invoke("SetModeToSlow", &[]).is_err());
        assert_eq!(smoother.signature_doc("SetModeToSlow"), None);
    }

    #[test]
    fn test_toggle_methods() {
        let hierarchy = StaticHierarchy::new("Algorithm")
            .add_type(TypeDecl::concrete("ConeSource").toggle("Capping", true));
        let mut cone = hierarchy.construct("ConeSource").unwrap();

        assert_eq!(cone.invoke("GetCapping", &[]).unwrap(), json!(1));
        cone.invoke("CappingOff", &[]).unwrap();
        assert_eq!(cone.invoke("GetCapping", &[]).unwrap(), json!(0));
        assert_eq!(
            cone.method_names(),
            vec!["CappingOn", "CappingOff", "SetCapping", "GetCapping"]
        );
    }
}
