//! Pairwise compatibility between chained node types
//!
//! [`CompatibilityChecker::can_follow`] decides whether a candidate type may
//! consume the output of a predecessor. The decision combines port arity
//! rules with a live trial connection on a disposable candidate instance;
//! results are memoized per `(candidate, predecessor type)` in an
//! append-only [`CompatibilityCache`] owned by the checker.

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::TypeCatalog;
use crate::error::Result;
use crate::hierarchy::HierarchyProvider;
use crate::types::{OutputPort, TypeName};

/// Memoized compatibility results
///
/// Entries are never invalidated for the lifetime of the cache.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityCache {
    /// candidate -> predecessor type -> verdict
    entries: HashMap<TypeName, HashMap<TypeName, bool>>,
}

impl CompatibilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached verdict for a pair, if any
    pub fn get(&self, candidate: &str, predecessor: &str) -> Option<bool> {
        self.entries.get(candidate)?.get(predecessor).copied()
    }

    /// Record a verdict; an existing entry is kept
    pub fn record(&mut self, candidate: &str, predecessor: &str, verdict: bool) -> bool {
        *self
            .entries
            .entry(candidate.to_string())
            .or_default()
            .entry(predecessor.to_string())
            .or_insert(verdict)
    }

    /// Number of cached pairs
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decides whether one node type can follow another in a linear chain
pub struct CompatibilityChecker {
    provider: Arc<dyn HierarchyProvider>,
    catalog: Arc<TypeCatalog>,
    cache: CompatibilityCache,
}

impl CompatibilityChecker {
    pub fn new(provider: Arc<dyn HierarchyProvider>, catalog: Arc<TypeCatalog>) -> Self {
        Self {
            provider,
            catalog,
            cache: CompatibilityCache::new(),
        }
    }

    /// Whether `candidate` may consume `predecessor_output`
    ///
    /// With no predecessor output the candidate is tested as a chain head.
    /// Results are cached only when both the output and the predecessor type
    /// name are known. Abstract or unknown candidates are always rejected and
    /// never cached.
    pub fn can_follow(
        &mut self,
        candidate: &str,
        predecessor_output: Option<&OutputPort>,
        predecessor_type: Option<&str>,
    ) -> bool {
        match self.catalog.entry(candidate) {
            Some(entry) if entry.is_instantiable() => {}
            Some(_) => {
                log::debug!("{} is abstract and cannot follow anything", candidate);
                return false;
            }
            None => {
                log::debug!("{} is not in the catalog", candidate);
                return false;
            }
        }

        let cache_key = match (predecessor_output, predecessor_type) {
            (Some(_), Some(predecessor)) => Some(predecessor),
            _ => None,
        };

        if let Some(predecessor) = cache_key {
            if let Some(verdict) = self.cache.get(candidate, predecessor) {
                return verdict;
            }
        }

        let verdict = match self.probe(candidate, predecessor_output) {
            Ok(verdict) => verdict,
            Err(e) => {
                log::debug!("{}: compatibility probe unavailable: {}", candidate, e);
                return false;
            }
        };

        log::debug!(
            "{} after {}: {}",
            candidate,
            predecessor_type.unwrap_or("<chain head>"),
            if verdict { "accepted" } else { "rejected" }
        );

        match cache_key {
            Some(predecessor) => self.cache.record(candidate, predecessor, verdict),
            None => verdict,
        }
    }

    /// Cache owned by this checker
    pub fn cache(&self) -> &CompatibilityCache {
        &self.cache
    }

    /// Run the arity rules and the trial connection
    ///
    /// `Err` means the candidate could not be constructed; every other
    /// failure is a rejection.
    fn probe(&self, candidate: &str, predecessor_output: Option<&OutputPort>) -> Result<bool> {
        let mut instance = self.provider.construct(candidate)?;

        if instance.output_port_count() > 1 {
            return Ok(false);
        }

        let Some(upstream) = predecessor_output else {
            return Ok(instance.required_input_count() == 0);
        };

        if instance.input_port_count() == 0 {
            return Ok(false);
        }

        let connected = instance
            .connect_input(upstream)
            .and_then(|()| instance.update_information());
        if let Err(e) = &connected {
            log::debug!("{} rejects {}: {}", candidate, upstream.producer, e);
        }
        Ok(connected.is_ok())
    }
}
