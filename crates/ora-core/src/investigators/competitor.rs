//! Competitor investigator
//!
//! Same capability contract as the market variant with competitor-specific
//! signal weights and derivations.

use crate::investigator::{CollectorClient, DomainInvestigator};
use crate::investigators::{collect_items, missing_signal_limitations, signal_score};
use chrono::Utc;
use ora_domain::{
    Confidence, Domain, DomainMetadata, DomainResult, InvestigationItem, ItemStatus, ResearchError,
};
use serde_json::{Map, Value};

const SIGNAL_WEIGHTS: &[(&str, f64)] = &[
    ("competitors", 0.35),
    ("positioning", 0.25),
    ("strengths", 0.2),
    ("weaknesses", 0.2),
];

/// Competitor domain investigator
#[derive(Debug)]
pub struct CompetitorInvestigator<C> {
    collector: C,
}

impl<C> CompetitorInvestigator<C> {
    /// Create with a collector capability
    #[inline]
    #[must_use]
    pub fn new(collector: C) -> Self {
        Self { collector }
    }
}

impl<C: CollectorClient> CompetitorInvestigator<C> {
    fn recommendations(findings: &Map<String, Value>) -> Vec<String> {
        let mut recs = Vec::new();
        if findings.contains_key("competitors") {
            recs.push("Track the identified competitors for positioning changes".to_string());
        }
        if findings.contains_key("weaknesses") {
            recs.push("Target documented competitor weaknesses in go-to-market messaging".to_string());
        }
        if findings.contains_key("strengths") {
            recs.push("Prepare counters to competitor strengths before launch".to_string());
        }
        if recs.is_empty() {
            recs.push("Collect additional competitive intelligence before drawing conclusions".to_string());
        }
        recs
    }
}

#[async_trait::async_trait]
impl<C: CollectorClient> DomainInvestigator for CompetitorInvestigator<C> {
    fn domain(&self) -> Domain {
        Domain::Competitor
    }

    async fn investigate(
        &self,
        items: Vec<InvestigationItem>,
    ) -> Result<DomainResult, ResearchError> {
        let started_at = Utc::now();
        let total = items.len();
        let (processed, findings, sources) =
            collect_items(&self.collector, Domain::Competitor, items).await;

        let score = signal_score(&findings, SIGNAL_WEIGHTS);
        let mut limitations =
            missing_signal_limitations(Domain::Competitor, &findings, SIGNAL_WEIGHTS);
        let failed = processed
            .iter()
            .filter(|i| i.status == ItemStatus::Failed)
            .count();
        if failed > 0 {
            limitations.push(format!("{failed} of {total} competitor items failed"));
        }

        let metadata = DomainMetadata::new(started_at, Utc::now())
            .with_confidence(Confidence::from_signal_score(score))
            .with_data_sources(sources)
            .with_limitations(limitations)
            .with_recommendations(Self::recommendations(&findings));

        tracing::debug!(score, completed = total - failed, "competitor investigation finished");
        Ok(DomainResult {
            domain: Domain::Competitor,
            items: processed,
            findings: Value::Object(findings),
            metadata,
        })
    }
}
