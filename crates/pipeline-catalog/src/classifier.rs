//! Method surface classification
//!
//! Partitions the method names of a node type into attribute families using
//! naming conventions alone:
//!
//! - **Choice**: `Set<Attr>To<Variant>` setters sharing a `Get<Attr>` getter
//! - **Toggle**: `<Attr>On` / `<Attr>Off` pairs with a `Get<Attr>` getter
//! - **Scalar**: remaining `Set<Attr>` setters with a `Get<Attr>` getter
//! - **Plain getter**: `Get<X>` methods not consumed by any family
//!
//! Everything here is a pure function over strings. Type checks for scalar
//! candidates and value probing happen in [`crate::attributes`].

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static SET_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Set\w+$").expect("valid regex"));
static SET_TO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Set(\w+?)To\w+$").expect("valid regex"));
static GET_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Get\w+$").expect("valid regex"));
static ON_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)On$").expect("valid regex"));
static OFF_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+)Off$").expect("valid regex"));

/// Attribute family a setter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// One of several mutually exclusive `Set*To*` calls
    Choice,
    /// Boolean `*On` / `*Off` switch
    Toggle,
    /// Single setter over a primitive value
    Scalar,
}

/// Naming role of a single method name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodRole {
    /// `Set<base>To<variant>`
    ChoiceSetter { base: String },
    /// `Set<attribute>`
    Setter { attribute: String },
    /// `Get<attribute>`
    Getter { attribute: String },
    /// Anything else (switches are only recognized in pairs)
    Other,
}

/// Determine the naming role of a method
pub fn method_role(name: &str) -> MethodRole {
    if let Some(caps) = SET_TO_PATTERN.captures(name) {
        return MethodRole::ChoiceSetter {
            base: caps[1].to_string(),
        };
    }
    if SET_PATTERN.is_match(name) {
        return MethodRole::Setter {
            attribute: name[3..].to_string(),
        };
    }
    if GET_PATTERN.is_match(name) {
        return MethodRole::Getter {
            attribute: name[3..].to_string(),
        };
    }
    MethodRole::Other
}

/// Choice attribute candidate: alternatives in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceCandidate {
    pub attribute: String,
    pub getter: String,
    pub alternatives: Vec<String>,
}

/// Toggle attribute candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCandidate {
    pub attribute: String,
    pub getter: String,
}

/// Scalar attribute candidate, still subject to signature checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarCandidate {
    pub setter: String,
    pub getter: String,
}

/// Result of classifying a method surface by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodClassification {
    pub choices: Vec<ChoiceCandidate>,
    pub toggles: Vec<ToggleCandidate>,
    pub scalars: Vec<ScalarCandidate>,
    pub plain_getters: Vec<String>,
}

impl MethodClassification {
    /// Attribute family of a setter or switch name, if it was classified
    pub fn kind_of(&self, method: &str) -> Option<AttributeKind> {
        if self
            .choices
            .iter()
            .any(|c| c.alternatives.iter().any(|a| a == method))
        {
            return Some(AttributeKind::Choice);
        }
        if self.toggles.iter().any(|t| {
            method
                .strip_prefix(t.attribute.as_str())
                .is_some_and(|rest| rest == "On" || rest == "Off")
        }) {
            return Some(AttributeKind::Toggle);
        }
        if self.scalars.iter().any(|s| s.setter == method) {
            return Some(AttributeKind::Scalar);
        }
        None
    }
}

/// Classify a method surface into attribute candidates
///
/// Each setter family keeps only members whose companion getter exists;
/// consumed getters are removed from the plain getter list, and scalar
/// setters already covered by a toggle or choice of the same name are
/// dropped.
pub fn classify_methods<S: AsRef<str>>(names: &[S]) -> MethodClassification {
    let mut seen = HashSet::new();
    let names: Vec<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|n| seen.insert(*n))
        .collect();

    let getters: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| GET_PATTERN.is_match(n))
        .collect();
    let getter_set: HashSet<&str> = getters.iter().copied().collect();
    let mut consumed: HashSet<String> = HashSet::new();

    // Choice setters, grouped by attribute in order of first appearance
    let mut choices: Vec<ChoiceCandidate> = Vec::new();
    for name in &names {
        let MethodRole::ChoiceSetter { base } = method_role(name) else {
            continue;
        };
        let getter = format!("Get{}", base);
        if !getter_set.contains(getter.as_str()) {
            continue;
        }
        consumed.insert(getter.clone());
        match choices.iter_mut().find(|c| c.attribute == base) {
            Some(choice) => choice.alternatives.push(name.to_string()),
            None => choices.push(ChoiceCandidate {
                attribute: base,
                getter,
                alternatives: vec![name.to_string()],
            }),
        }
    }

    // Toggles: only bases with both switches count
    let name_set: HashSet<&str> = names.iter().copied().collect();
    let mut toggles: Vec<ToggleCandidate> = Vec::new();
    for name in &names {
        let Some(caps) = ON_PATTERN.captures(name) else {
            continue;
        };
        let base = &caps[1];
        let off = format!("{}Off", base);
        if !name_set.contains(off.as_str()) || !OFF_PATTERN.is_match(&off) {
            continue;
        }
        let getter = format!("Get{}", base);
        if !getter_set.contains(getter.as_str()) {
            continue;
        }
        consumed.insert(getter.clone());
        toggles.push(ToggleCandidate {
            attribute: base.to_string(),
            getter,
        });
    }

    // Scalars
    let mut scalars: Vec<ScalarCandidate> = Vec::new();
    for name in &names {
        let MethodRole::Setter { attribute } = method_role(name) else {
            continue;
        };
        let getter = format!("Get{}", attribute);
        if !getter_set.contains(getter.as_str()) {
            continue;
        }
        consumed.insert(getter.clone());
        scalars.push(ScalarCandidate {
            setter: name.to_string(),
            getter,
        });
    }

    // Toggle and choice families take precedence over a scalar of the same name
    scalars.retain(|s| {
        let attribute = &s.setter[3..];
        !toggles.iter().any(|t| t.attribute == attribute)
            && !choices.iter().any(|c| c.attribute == attribute)
    });

    let plain_getters = getters
        .into_iter()
        .filter(|g| !consumed.contains(*g))
        .map(str::to_string)
        .collect();

    MethodClassification {
        choices,
        toggles,
        scalars,
        plain_getters,
    }
}
