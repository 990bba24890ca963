//! Investigator capability contract and registry
//!
//! Each investigation specialty is one implementation of
//! [`DomainInvestigator`], held in a registry keyed by [`Domain`]. Adding a
//! domain means registering a capability; the orchestrator never switches on
//! domain identity.

use ora_domain::{Domain, DomainResult, InvestigationItem, ResearchError};
use std::collections::HashMap;
use std::sync::Arc;

/// One investigation specialty.
///
/// Contract for every variant: each given item is marked in-progress with a
/// start timestamp, processed, then marked completed or failed with an end
/// timestamp. A single item failure must never abort the processing of
/// sibling items in the same call.
#[async_trait::async_trait]
pub trait DomainInvestigator: Send + Sync {
    /// The domain this investigator serves
    fn domain(&self) -> Domain;

    /// Investigate the assigned items and produce a domain result
    async fn investigate(
        &self,
        items: Vec<InvestigationItem>,
    ) -> Result<DomainResult, ResearchError>;
}

/// Seam to the out-of-scope text-generation/data-collection layer.
///
/// Investigators invoke this to gather raw findings for one item; the
/// implementation behind it is opaque to this core.
#[async_trait::async_trait]
pub trait CollectorClient: Send + Sync {
    /// Collect raw findings for one item
    async fn collect(
        &self,
        domain: Domain,
        item: &InvestigationItem,
    ) -> Result<serde_json::Value, ResearchError>;
}

/// Mapping from domain to investigator capability
#[derive(Default)]
pub struct InvestigatorRegistry {
    investigators: HashMap<Domain, Arc<dyn DomainInvestigator>>,
}

impl InvestigatorRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability under its own domain, replacing any previous one
    pub fn register(&mut self, investigator: Arc<dyn DomainInvestigator>) {
        self.investigators.insert(investigator.domain(), investigator);
    }

    /// Builder-style registration
    #[must_use]
    pub fn with(mut self, investigator: Arc<dyn DomainInvestigator>) -> Self {
        self.register(investigator);
        self
    }

    /// Look up the capability for a domain
    #[inline]
    #[must_use]
    pub fn get(&self, domain: Domain) -> Option<Arc<dyn DomainInvestigator>> {
        self.investigators.get(&domain).cloned()
    }

    /// Registered domains
    #[must_use]
    pub fn domains(&self) -> Vec<Domain> {
        let mut domains: Vec<Domain> = self.investigators.keys().copied().collect();
        domains.sort_by_key(|d| std::cmp::Reverse(d.priority_rank()));
        domains
    }

    /// Number of registered capabilities
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.investigators.len()
    }

    /// Whether no capability is registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.investigators.is_empty()
    }
}

impl std::fmt::Debug for InvestigatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvestigatorRegistry")
            .field("domains", &self.domains())
            .finish()
    }
}
