//! Testing utilities for the ORA workspace
//!
//! Shared test helpers, fixtures, and scripted capabilities.

#![allow(missing_docs)]

use chrono::Utc;
use ora_core::{CollectorClient, DomainInvestigator};
use ora_domain::{
    Confidence, Domain, DomainMetadata, DomainResult, InvestigationItem, ItemCategory,
    ResearchError, ResearchItem, ResearchPlan,
};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What a scripted investigator does with the items it receives
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    /// Complete every item and report the given findings
    Complete { findings: Value },
    /// Return a result in which every item failed
    FailAllItems { error: String },
    /// Return a domain execution error instead of a result
    Error { message: String },
}

/// Deterministic investigator for orchestration tests.
///
/// Hold it in an `Arc` and clone that into the registry to keep access to
/// the invocation counter.
#[derive(Debug)]
pub struct ScriptedInvestigator {
    domain: Domain,
    outcome: ScriptedOutcome,
    confidence: Confidence,
    recommendations: Vec<String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedInvestigator {
    pub fn completing(domain: Domain, findings: Value) -> Self {
        Self {
            domain,
            outcome: ScriptedOutcome::Complete { findings },
            confidence: Confidence::Medium,
            recommendations: Vec::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_items(domain: Domain, error: impl Into<String>) -> Self {
        Self {
            outcome: ScriptedOutcome::FailAllItems {
                error: error.into(),
            },
            ..Self::completing(domain, Value::Null)
        }
    }

    pub fn erroring(domain: Domain, message: impl Into<String>) -> Self {
        Self {
            outcome: ScriptedOutcome::Error {
                message: message.into(),
            },
            ..Self::completing(domain, Value::Null)
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// How many times `investigate` has been called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DomainInvestigator for ScriptedInvestigator {
    fn domain(&self) -> Domain {
        self.domain
    }

    async fn investigate(
        &self,
        mut items: Vec<InvestigationItem>,
    ) -> Result<DomainResult, ResearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let started_at = Utc::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.outcome {
            ScriptedOutcome::Error { message } => Err(ResearchError::domain(self.domain, message)),
            ScriptedOutcome::Complete { findings } => {
                for item in &mut items {
                    item.begin();
                    item.complete();
                }
                Ok(DomainResult {
                    domain: self.domain,
                    items,
                    findings: findings.clone(),
                    metadata: DomainMetadata::new(started_at, Utc::now())
                        .with_confidence(self.confidence)
                        .with_recommendations(self.recommendations.clone()),
                })
            }
            ScriptedOutcome::FailAllItems { error } => {
                for item in &mut items {
                    item.begin();
                    item.fail(error.clone());
                }
                Ok(DomainResult {
                    domain: self.domain,
                    items,
                    findings: Value::Null,
                    metadata: DomainMetadata::new(started_at, Utc::now())
                        .with_confidence(Confidence::Low)
                        .with_limitations(vec![error.clone()]),
                })
            }
        }
    }
}

/// Collector returning one fixed value, with optional per-item failures
#[derive(Debug, Default)]
pub struct StaticCollector {
    value: Value,
    fail_ids: HashSet<String>,
}

impl StaticCollector {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            fail_ids: HashSet::new(),
        }
    }

    #[must_use]
    pub fn failing_for(mut self, item_ids: &[&str]) -> Self {
        self.fail_ids = item_ids.iter().map(ToString::to_string).collect();
        self
    }
}

#[async_trait::async_trait]
impl CollectorClient for StaticCollector {
    async fn collect(
        &self,
        domain: Domain,
        item: &InvestigationItem,
    ) -> Result<Value, ResearchError> {
        if self.fail_ids.contains(&item.item_id) {
            return Err(ResearchError::domain(
                domain,
                format!("scripted failure for {}", item.item_id),
            ));
        }
        Ok(self.value.clone())
    }
}

pub fn research_item(
    id: &str,
    category: ItemCategory,
    title: &str,
    description: &str,
) -> ResearchItem {
    ResearchItem::new(id, category, title, description)
}

/// Six-item plan spanning market/competition, technology, and risk
pub fn sample_plan() -> ResearchPlan {
    ResearchPlan::new("plan-1", "Acme Robotics").with_items(vec![
        research_item(
            "m1",
            ItemCategory::MarketCompetition,
            "Market size",
            "Estimate the addressable market",
        ),
        research_item(
            "m2",
            ItemCategory::MarketCompetition,
            "Competitive landscape",
            "Map direct and indirect competitors",
        ),
        research_item(
            "m3",
            ItemCategory::MarketCompetition,
            "Customer segments",
            "Profile the primary buyer segments",
        ),
        research_item(
            "t1",
            ItemCategory::Technology,
            "Platform maturity",
            "Assess the core platform maturity",
        ),
        research_item(
            "t2",
            ItemCategory::Technology,
            "Build vs buy",
            "Evaluate architecture options",
        ),
        research_item(
            "r1",
            ItemCategory::RiskAnalysis,
            "Compliance exposure",
            "Identify regulatory obligations",
        ),
    ])
}

/// Single-item plan whose item matches no category or keyword route
pub fn unrelated_plan() -> ResearchPlan {
    ResearchPlan::new("plan-2", "Acme Robotics").with_items(vec![research_item(
        "u1",
        ItemCategory::Uncategorized,
        "Team briefing",
        "Founding story notes",
    )])
}

/// Initialize tracing for tests (idempotent)
pub fn init_tracing() {
    static INIT: once_cell::sync::OnceCell<()> = once_cell::sync::OnceCell::new();
    INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
