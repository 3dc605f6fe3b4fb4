//! Attribute tables for concrete node types
//!
//! An [`AttributeTable`] is the configurable surface of a node type: its
//! choice, toggle and scalar attributes together with the values observed on
//! a freshly constructed instance. The catalog computes one table per
//! concrete type as an immutable template; created instances receive a
//! clone they may mutate freely.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::classifier::{classify_methods, ChoiceCandidate, ScalarCandidate, ToggleCandidate};
use crate::hierarchy::NodeInstance;
use crate::signature::{infer_types, MethodSignature, SigType};
use crate::types::ScalarType;

/// One alternative of a choice attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceAlternative {
    pub setter: String,
    /// Active on a freshly constructed instance
    pub is_default: bool,
}

/// Attribute selected from mutually exclusive `Set*To*` calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceAttribute {
    pub getter: String,
    pub alternatives: Vec<ChoiceAlternative>,
}

impl ChoiceAttribute {
    /// Setter of the alternative marked as default
    pub fn default_setter(&self) -> Option<&str> {
        self.alternatives
            .iter()
            .find(|a| a.is_default)
            .map(|a| a.setter.as_str())
    }

    /// Setter names in declaration order
    pub fn setters(&self) -> impl Iterator<Item = &str> {
        self.alternatives.iter().map(|a| a.setter.as_str())
    }
}

/// Boolean attribute switched with `*On` / `*Off`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAttribute {
    pub getter: String,
    pub value: bool,
}

/// Attribute with a single setter over a primitive value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarAttribute {
    pub getter: String,
    pub value_type: ScalarType,
    pub value: Value,
    /// First documented overload of the getter
    pub getter_signature: MethodSignature,
    /// First documented overload of the setter
    pub setter_signature: MethodSignature,
}

/// Configurable surface of a concrete node type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTable {
    /// attribute name -> choice attribute
    pub choices: BTreeMap<String, ChoiceAttribute>,
    /// attribute name -> toggle attribute
    pub toggles: BTreeMap<String, ToggleAttribute>,
    /// setter name -> scalar attribute
    pub scalars: BTreeMap<String, ScalarAttribute>,
    /// Getters not explained by any attribute
    pub plain_getters: Vec<String>,
}

impl AttributeTable {
    /// True when no attribute of any kind is present
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty() && self.toggles.is_empty() && self.scalars.is_empty()
    }

    /// Total number of attributes
    pub fn len(&self) -> usize {
        self.choices.len() + self.toggles.len() + self.scalars.len()
    }
}

/// Classify and probe the attributes of a disposable instance
///
/// Getter values for toggles and scalars are read before any choice
/// alternative is invoked, so they reflect the freshly constructed state.
/// Probe failures drop the affected attribute or alternative and never abort
/// the table.
pub fn probe_attributes(instance: &mut dyn NodeInstance) -> AttributeTable {
    let names = instance.method_names();
    let classification = classify_methods(&names);

    let toggles = classification
        .toggles
        .iter()
        .filter_map(|candidate| probe_toggle(instance, candidate))
        .collect();

    let scalars = classification
        .scalars
        .iter()
        .filter_map(|candidate| probe_scalar(instance, candidate))
        .collect();

    let choices = classification
        .choices
        .iter()
        .filter_map(|candidate| probe_choice(instance, candidate))
        .collect();

    AttributeTable {
        choices,
        toggles,
        scalars,
        plain_getters: classification.plain_getters,
    }
}

fn probe_toggle(
    instance: &mut dyn NodeInstance,
    candidate: &ToggleCandidate,
) -> Option<(String, ToggleAttribute)> {
    let value = match instance.invoke(&candidate.getter, &[]) {
        Ok(value) => value,
        Err(e) => {
            log::debug!(
                "{}: dropping toggle '{}': {}",
                instance.type_name(),
                candidate.attribute,
                e
            );
            return None;
        }
    };

    let value = match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        other => {
            log::debug!(
                "{}: toggle '{}' getter returned non-boolean {}",
                instance.type_name(),
                candidate.attribute,
                other
            );
            return None;
        }
    };

    Some((
        candidate.attribute.clone(),
        ToggleAttribute {
            getter: candidate.getter.clone(),
            value,
        },
    ))
}

fn first_signature(instance: &dyn NodeInstance, method: &str) -> Option<MethodSignature> {
    let doc = instance.signature_doc(method);
    infer_types(doc.as_deref(), method).into_iter().next()
}

fn probe_scalar(
    instance: &mut dyn NodeInstance,
    candidate: &ScalarCandidate,
) -> Option<(String, ScalarAttribute)> {
    // Only the first overload is considered for either method
    let (Some(setter_signature), Some(getter_signature)) = (
        first_signature(instance, &candidate.setter),
        first_signature(instance, &candidate.getter),
    ) else {
        log::debug!(
            "{}: no signature for '{}'/'{}'",
            instance.type_name(),
            candidate.setter,
            candidate.getter
        );
        return None;
    };

    // The setter's return side is not part of the contract
    if let Err(e) = getter_signature.check(&candidate.getter) {
        log::debug!("{}: {}", instance.type_name(), e);
        return None;
    }

    let value_type = getter_signature.return_type.as_scalar()?;
    if getter_signature.arg_types != SigType::Void {
        return None;
    }
    setter_signature.arg_types.as_scalar()?;

    let value = match instance.invoke(&candidate.getter, &[]) {
        Ok(value) => value,
        Err(e) => {
            log::debug!(
                "{}: dropping scalar '{}': {}",
                instance.type_name(),
                candidate.setter,
                e
            );
            return None;
        }
    };

    Some((
        candidate.setter.clone(),
        ScalarAttribute {
            getter: candidate.getter.clone(),
            value_type,
            value,
            getter_signature,
            setter_signature,
        },
    ))
}

fn probe_choice(
    instance: &mut dyn NodeInstance,
    candidate: &ChoiceCandidate,
) -> Option<(String, ChoiceAttribute)> {
    let original = match instance.invoke(&candidate.getter, &[]) {
        Ok(value) => value,
        Err(e) => {
            log::debug!(
                "{}: dropping choice '{}': {}",
                instance.type_name(),
                candidate.attribute,
                e
            );
            return None;
        }
    };

    let mut alternatives = Vec::with_capacity(candidate.alternatives.len());
    let mut found_default = false;

    for setter in &candidate.alternatives {
        if found_default {
            alternatives.push(ChoiceAlternative {
                setter: setter.clone(),
                is_default: false,
            });
            continue;
        }

        let observed = instance
            .invoke(setter, &[])
            .and_then(|_| instance.invoke(&candidate.getter, &[]));
        match observed {
            Ok(value) => {
                found_default = value == original;
                alternatives.push(ChoiceAlternative {
                    setter: setter.clone(),
                    is_default: found_default,
                });
            }
            Err(e) => {
                log::debug!(
                    "{}: alternative '{}' unavailable: {}",
                    instance.type_name(),
                    setter,
                    e
                );
            }
        }
    }

    if alternatives.is_empty() {
        return None;
    }
    if !found_default {
        log::debug!(
            "{}: no alternative of '{}' reproduces the initial value",
            instance.type_name(),
            candidate.attribute
        );
    }

    Some((
        candidate.attribute.clone(),
        ChoiceAttribute {
            getter: candidate.getter.clone(),
            alternatives,
        },
    ))
}
