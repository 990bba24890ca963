//! Domain orchestrator
//!
//! Stateless per-run coordinator: selects the domains a request needs,
//! partitions plan items across them, executes each domain's investigation
//! under the configured concurrency/failure policy with a per-domain
//! timeout race, and hands the collected results to the transformer.
//!
//! Concurrency model: parallel mode dispatches domains in batches of
//! `max_concurrent_domains` and waits for every dispatch in a batch to
//! settle before starting the next (strict barrier). Domain futures are
//! driven inline rather than detached, so the loser of a timeout race is
//! dropped and cancelled at its next await point instead of leaking.

use crate::config::{FailureStrategy, OrchestratorConfig};
use crate::investigator::InvestigatorRegistry;
use crate::transformer;
use chrono::Utc;
use futures::future::join_all;
use ora_domain::{
    Domain, DomainResult, InvestigationItem, ResearchError, ResearchPlan, ResearchReport, RunId,
};
use ora_retry::RetryError;
use std::sync::Arc;

/// Inbound request: a plan plus optional explicit domain targets
#[derive(Debug, Clone)]
pub struct InvestigationRequest {
    /// The research plan to execute
    pub plan: ResearchPlan,
    /// Explicit target domains; `None` selects from the plan
    pub target_domains: Option<Vec<Domain>>,
}

impl InvestigationRequest {
    /// Request with domain selection derived from the plan
    #[inline]
    #[must_use]
    pub fn new(plan: ResearchPlan) -> Self {
        Self {
            plan,
            target_domains: None,
        }
    }

    /// Request with explicit target domains
    #[inline]
    #[must_use]
    pub fn with_targets(mut self, domains: Vec<Domain>) -> Self {
        self.target_domains = Some(domains);
        self
    }
}

/// Per-run lifecycle phases, traced for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Received,
    DomainsSelected,
    ItemsPartitioned,
    Executing,
    Collected,
    Done,
}

/// The domain orchestrator.
///
/// Holds no per-run state; every `run` call is independent.
#[derive(Debug)]
pub struct Orchestrator {
    registry: Arc<InvestigatorRegistry>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create orchestrator over a registry of investigator capabilities
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<InvestigatorRegistry>, config: OrchestratorConfig) -> Self {
        Self { registry, config }
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Execute one orchestration run.
    ///
    /// # Errors
    /// - `Validation` when the plan size is outside the configured bounds
    /// - `DomainExecution` / `Timeout` under `FailFast` when a domain fails
    /// - `Transformation` when required-domain coverage is missing
    pub async fn run(&self, request: InvestigationRequest) -> Result<ResearchReport, ResearchError> {
        let run_id = RunId::new();
        let executed_at = Utc::now();
        let mut phase = RunPhase::Received;
        tracing::info!(run = %run_id, plan = %request.plan.id, "run received");

        self.validate_request(&request)?;

        let domains = self.select_domains(&request);
        advance(run_id, &mut phase, RunPhase::DomainsSelected);
        tracing::info!(run = %run_id, ?domains, "domains selected");

        let partitions = self.partition_items(&request.plan, &domains);
        advance(run_id, &mut phase, RunPhase::ItemsPartitioned);

        advance(run_id, &mut phase, RunPhase::Executing);
        let results = if self.config.policy.parallel {
            self.execute_parallel(partitions).await?
        } else {
            self.execute_sequential(partitions).await?
        };
        advance(run_id, &mut phase, RunPhase::Collected);

        let report = transformer::transform(
            run_id,
            &request.plan.id,
            &request.plan.subject,
            executed_at,
            results,
        )?;
        advance(run_id, &mut phase, RunPhase::Done);
        Ok(report)
    }

    /// Execute a run wrapped by the retry executor under the configured
    /// retry policy. Retryable failures (domain errors, timeouts,
    /// sub-critical system errors) are re-attempted; validation and
    /// transformation failures abort immediately.
    ///
    /// # Errors
    /// The underlying error for terminal failures, or `RetryExhausted`
    /// carrying the attempt count and last error.
    pub async fn run_with_retry(
        &self,
        request: InvestigationRequest,
    ) -> Result<ResearchReport, ResearchError> {
        let policy = self.config.retry;
        ora_retry::execute_with_retry(&policy, || {
            let request = request.clone();
            async move { self.run(request).await }
        })
        .await
        .map_err(|err| match err {
            RetryError::Fatal(inner) => inner,
            RetryError::Exhausted { attempts, last } => ResearchError::RetryExhausted {
                attempts,
                source: Box::new(last),
            },
        })
    }

    fn validate_request(&self, request: &InvestigationRequest) -> Result<(), ResearchError> {
        let count = request.plan.items.len();
        if count < self.config.min_items || count > self.config.max_items {
            return Err(ResearchError::Validation(format!(
                "plan has {count} items, expected between {} and {}",
                self.config.min_items, self.config.max_items
            )));
        }
        Ok(())
    }

    /// Explicit targets are used verbatim (deduplicated, order preserved).
    /// Otherwise: priority domains plus every domain implied by the item
    /// categories, sorted by descending priority rank.
    fn select_domains(&self, request: &InvestigationRequest) -> Vec<Domain> {
        if let Some(targets) = &request.target_domains {
            let mut seen = Vec::new();
            for domain in targets {
                if !seen.contains(domain) {
                    seen.push(*domain);
                }
            }
            return seen;
        }

        let mut selected: Vec<Domain> = Domain::PRIORITY.to_vec();
        for item in &request.plan.items {
            for domain in Domain::for_category(item.category) {
                if !selected.contains(domain) {
                    selected.push(*domain);
                }
            }
        }
        selected.sort_by_key(|d| std::cmp::Reverse(d.priority_rank()));
        selected
    }

    /// Assign items to each selected domain by category mapping or keyword
    /// trigger. Items may land in several domains; each domain receives its
    /// own copies. A priority domain left empty by a non-empty plan gets one
    /// synthesized generic item.
    fn partition_items(
        &self,
        plan: &ResearchPlan,
        domains: &[Domain],
    ) -> Vec<(Domain, Vec<InvestigationItem>)> {
        domains
            .iter()
            .map(|&domain| {
                let mut assigned: Vec<InvestigationItem> = plan
                    .items
                    .iter()
                    .filter(|item| item_matches(item, domain))
                    .map(|item| InvestigationItem::from_item(item, domain))
                    .collect();

                if assigned.is_empty() && domain.is_priority() {
                    if let Some(first) = plan.items.first() {
                        tracing::debug!(%domain, "synthesizing generic item for priority domain");
                        assigned.push(InvestigationItem::synthesized(first, domain));
                    }
                }
                (domain, assigned)
            })
            .collect()
    }

    async fn execute_sequential(
        &self,
        partitions: Vec<(Domain, Vec<InvestigationItem>)>,
    ) -> Result<Vec<DomainResult>, ResearchError> {
        let mut results = Vec::with_capacity(partitions.len());
        for (domain, items) in partitions {
            match self.run_domain(domain, items).await {
                Ok(result) => results.push(result),
                Err(err) => match self.config.policy.failure_strategy {
                    FailureStrategy::FailFast => return Err(err),
                    FailureStrategy::ContinueOnError => {
                        tracing::warn!(%domain, error = %err, "domain failed, continuing");
                    }
                },
            }
        }
        Ok(results)
    }

    /// Batched parallel execution with a strict barrier between batches.
    ///
    /// Under `FailFast`, a failure aborts the run only after its own batch
    /// has fully settled; in-flight siblings are awaited, later batches are
    /// never started.
    async fn execute_parallel(
        &self,
        partitions: Vec<(Domain, Vec<InvestigationItem>)>,
    ) -> Result<Vec<DomainResult>, ResearchError> {
        let batch_size = self.config.policy.max_concurrent_domains.max(1);
        let mut results = Vec::with_capacity(partitions.len());

        for (index, batch) in partitions.chunks(batch_size).enumerate() {
            tracing::debug!(batch = index, domains = batch.len(), "dispatching batch");
            let settled = join_all(
                batch
                    .iter()
                    .map(|(domain, items)| self.run_domain(*domain, items.clone())),
            )
            .await;

            let mut first_failure = None;
            for outcome in settled {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(err) => match self.config.policy.failure_strategy {
                        FailureStrategy::FailFast => {
                            if first_failure.is_none() {
                                first_failure = Some(err);
                            }
                        }
                        FailureStrategy::ContinueOnError => {
                            tracing::warn!(error = %err, "domain failed, dropping from results");
                        }
                    },
                }
            }
            if let Some(err) = first_failure {
                return Err(err);
            }
        }
        Ok(results)
    }

    /// One domain dispatch: registry lookup, then the investigation raced
    /// against the domain's timeout. Whichever settles first wins; a timeout
    /// is a domain-scoped failure like any other.
    async fn run_domain(
        &self,
        domain: Domain,
        items: Vec<InvestigationItem>,
    ) -> Result<DomainResult, ResearchError> {
        let Some(investigator) = self.registry.get(domain) else {
            return Err(ResearchError::domain(domain, "no investigator registered"));
        };

        let timeout = self.config.timeout_for(domain);
        tracing::debug!(%domain, items = items.len(), ?timeout, "dispatching domain");
        match tokio::time::timeout(timeout, investigator.investigate(items)).await {
            Ok(Ok(result)) => {
                tracing::info!(
                    %domain,
                    completed = result.completed_count(),
                    "domain investigation collected"
                );
                Ok(result)
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ResearchError::Timeout {
                domain,
                elapsed: timeout,
            }),
        }
    }
}

fn advance(run_id: RunId, phase: &mut RunPhase, next: RunPhase) {
    tracing::debug!(run = %run_id, from = ?phase, to = ?next, "run phase");
    *phase = next;
}

fn item_matches(item: &ora_domain::ResearchItem, domain: Domain) -> bool {
    if Domain::for_category(item.category).contains(&domain) {
        return true;
    }
    let title = item.title.to_lowercase();
    let description = item.description.to_lowercase();
    domain
        .keywords()
        .iter()
        .any(|kw| title.contains(kw) || description.contains(kw))
}
