//! Market investigator - the reference variant
//!
//! Collects market sizing, growth, trend, and player signals through the
//! collector seam and derives its metadata from which signals actually
//! arrived.

use crate::investigator::{CollectorClient, DomainInvestigator};
use crate::investigators::{collect_items, missing_signal_limitations, signal_score};
use chrono::Utc;
use ora_domain::{
    Confidence, Domain, DomainMetadata, DomainResult, InvestigationItem, ItemStatus, ResearchError,
};
use serde_json::{Map, Value};

/// Signal weights for market findings; thresholds (0.8 / 0.5) are the
/// uniform cross-variant contract.
const SIGNAL_WEIGHTS: &[(&str, f64)] = &[
    ("market_size", 0.3),
    ("growth_rate", 0.2),
    ("trends", 0.2),
    ("key_players", 0.2),
    ("barriers", 0.1),
];

/// Market domain investigator
#[derive(Debug)]
pub struct MarketInvestigator<C> {
    collector: C,
}

impl<C> MarketInvestigator<C> {
    /// Create with a collector capability
    #[inline]
    #[must_use]
    pub fn new(collector: C) -> Self {
        Self { collector }
    }
}

impl<C: CollectorClient> MarketInvestigator<C> {
    fn recommendations(findings: &Map<String, Value>) -> Vec<String> {
        let mut recs = Vec::new();
        if findings.contains_key("key_players") {
            recs.push("Validate positioning against the identified key players".to_string());
        }
        if findings.contains_key("barriers") {
            recs.push("Plan mitigations for the identified entry barriers".to_string());
        }
        if findings.contains_key("growth_rate") {
            recs.push("Time market entry against the projected growth rate".to_string());
        }
        if recs.is_empty() {
            recs.push("Collect additional market data before committing to sizing".to_string());
        }
        recs
    }
}

#[async_trait::async_trait]
impl<C: CollectorClient> DomainInvestigator for MarketInvestigator<C> {
    fn domain(&self) -> Domain {
        Domain::Market
    }

    async fn investigate(
        &self,
        items: Vec<InvestigationItem>,
    ) -> Result<DomainResult, ResearchError> {
        let started_at = Utc::now();
        let total = items.len();
        let (processed, findings, sources) =
            collect_items(&self.collector, Domain::Market, items).await;

        let score = signal_score(&findings, SIGNAL_WEIGHTS);
        let mut limitations = missing_signal_limitations(Domain::Market, &findings, SIGNAL_WEIGHTS);
        let failed = processed
            .iter()
            .filter(|i| i.status == ItemStatus::Failed)
            .count();
        if failed > 0 {
            limitations.push(format!("{failed} of {total} market items failed"));
        }

        let metadata = DomainMetadata::new(started_at, Utc::now())
            .with_confidence(Confidence::from_signal_score(score))
            .with_data_sources(sources)
            .with_limitations(limitations)
            .with_recommendations(Self::recommendations(&findings));

        tracing::debug!(score, completed = total - failed, "market investigation finished");
        Ok(DomainResult {
            domain: Domain::Market,
            items: processed,
            findings: Value::Object(findings),
            metadata,
        })
    }
}
