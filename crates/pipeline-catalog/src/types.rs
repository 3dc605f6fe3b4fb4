//! Core value types shared across the catalog
//!
//! These types describe node type names, primitive attribute value types,
//! the output handle passed between chained instances, and the set
//! combinator used by category queries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable identifier of a node type in the hierarchy
pub type TypeName = String;

/// Ordered set of node type names returned by queries
pub type ClassNames = BTreeSet<TypeName>;

/// Primitive value type of a scalar attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// Text value
    String,
}

impl ScalarType {
    /// Check if a dynamic value fits this scalar type
    ///
    /// Integers are accepted where floats are expected.
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        match self {
            ScalarType::Int => value.is_i64() || value.is_u64(),
            ScalarType::Float => value.is_number(),
            ScalarType::String => value.is_string(),
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarType::Int => write!(f, "int"),
            ScalarType::Float => write!(f, "float"),
            ScalarType::String => write!(f, "string"),
        }
    }
}

/// Handle to the single output of a node instance
///
/// Produced by the predecessor in a chain and handed to a candidate's
/// input during a trial connection. The payload is opaque to the catalog;
/// hierarchy providers put whatever their connection probe needs in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPort {
    /// Type name of the instance that produced this output
    pub producer: TypeName,
    /// Port index on the producer
    pub index: usize,
    /// Provider-specific description of the produced data
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl OutputPort {
    /// Create an output handle for port 0 of the given producer
    pub fn new(producer: impl Into<String>) -> Self {
        Self {
            producer: producer.into(),
            index: 0,
            payload: serde_json::Value::Null,
        }
    }
}

/// How per-path class name sets are combined in a category query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// A class must appear in every set
    And,
    /// A class may appear in any set
    Or,
}

impl Combinator {
    /// Combine two class name sets
    pub fn combine(&self, left: &ClassNames, right: &ClassNames) -> ClassNames {
        match self {
            Combinator::And => left.intersection(right).cloned().collect(),
            Combinator::Or => left.union(right).cloned().collect(),
        }
    }
}
