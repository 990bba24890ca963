//! Functional tests for the domain orchestrator and end-to-end run
//! semantics:
//! - Domain selection, partitioning, and priority-domain guarantees
//! - Batched parallel execution with failure-strategy handling
//! - Timeout racing as a domain-scoped failure
//! - Deterministic overall status on the final report

use ora_core::{
    ExecutionPolicy, FailureStrategy, InvestigationRequest, InvestigatorRegistry, Orchestrator,
    OrchestratorConfig,
};
use ora_domain::{Domain, ResearchError, RunStatus};
use ora_retry::RetryPolicy;
use ora_test_utils::{init_tracing, sample_plan, unrelated_plan, ScriptedInvestigator};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn market_findings() -> serde_json::Value {
    json!({
        "market_size": "$4.2B",
        "growth_rate": "11% CAGR",
        "trends": ["automation", "reshoring"],
        "key_players": ["Acme"],
        "barriers": ["capital intensity"],
    })
}

fn orchestrator(registry: InvestigatorRegistry, config: OrchestratorConfig) -> Orchestrator {
    init_tracing();
    Orchestrator::new(Arc::new(registry), config)
}

/// Tenet: the full happy path. Six items across three categories with no
/// explicit targets select market, competitor, technology, and regulatory;
/// two batches of two run; the report comes back `Success` with a populated
/// summary.
#[tokio::test]
async fn parallel_run_across_two_batches_succeeds() {
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Market,
            market_findings(),
        )))
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Competitor,
            json!({ "competitors": ["Acme", "Globex"] }),
        )))
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Technology,
            json!({ "stack": "rust" }),
        )))
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Regulatory,
            json!({ "regulations": ["CE marking"] }),
        )));

    let config = OrchestratorConfig::new().with_policy(
        ExecutionPolicy::default()
            .with_max_concurrent(2)
            .with_failure_strategy(FailureStrategy::ContinueOnError),
    );
    let orch = orchestrator(registry, config);

    let report = orch
        .run(InvestigationRequest::new(sample_plan()))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(report.results.len(), 4);
    let mut domains: Vec<Domain> = report.results.iter().map(|r| r.domain).collect();
    domains.sort();
    assert_eq!(
        domains,
        vec![
            Domain::Market,
            Domain::Competitor,
            Domain::Technology,
            Domain::Regulatory
        ]
    );
    assert!(report.metrics.data_points > 0);
    assert!(report
        .summary
        .key_findings
        .iter()
        .any(|f| f.contains("market_size")));
}

/// Tenet: priority domains are never dispatched empty. A single item in an
/// unrelated category still produces both priority domains, each holding a
/// synthesized domain-qualified item.
#[tokio::test]
async fn priority_domains_get_synthesized_items_for_unrelated_plans() {
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Market,
            json!({ "market_size": "unknown" }),
        )))
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Competitor,
            json!({ "competitors": [] }),
        )));

    let orch = orchestrator(registry, OrchestratorConfig::default());
    let report = orch
        .run(InvestigationRequest::new(unrelated_plan()))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(report.results.len(), 2);
    for result in &report.results {
        assert_eq!(result.items.len(), 1);
        assert!(
            result.items[0]
                .item_id
                .starts_with(result.domain.as_str()),
            "expected a domain-qualified synthesized item, got {}",
            result.items[0].item_id
        );
    }
}

/// Tenet: continue_on_error never throws, even when every domain errors.
/// The run settles into a `Failed` report instead of an exception.
#[tokio::test]
async fn continue_on_error_with_all_domains_failing_returns_failed_report() {
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(ScriptedInvestigator::erroring(
            Domain::Market,
            "upstream offline",
        )))
        .with(Arc::new(ScriptedInvestigator::erroring(
            Domain::Competitor,
            "upstream offline",
        )));

    let config = OrchestratorConfig::new().with_policy(
        ExecutionPolicy::default().with_failure_strategy(FailureStrategy::ContinueOnError),
    );
    let orch = orchestrator(registry, config);

    let report = orch
        .run(
            InvestigationRequest::new(sample_plan())
                .with_targets(vec![Domain::Market, Domain::Competitor]),
        )
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Failed);
    assert!(report.results.is_empty());
    assert_eq!(report.metrics.data_points, 0);
}

/// Tenet: under fail_fast, a failure in batch N stops the run after batch N
/// settles. Siblings in the failing batch are still dispatched; domains in
/// later batches never start.
#[tokio::test]
async fn fail_fast_never_starts_subsequent_batches() {
    let competitor = Arc::new(ScriptedInvestigator::completing(
        Domain::Competitor,
        json!({ "competitors": [] }),
    ));
    let technology = Arc::new(ScriptedInvestigator::completing(
        Domain::Technology,
        json!({ "stack": "rust" }),
    ));
    let regulatory = Arc::new(ScriptedInvestigator::completing(
        Domain::Regulatory,
        json!({ "regulations": [] }),
    ));
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(ScriptedInvestigator::erroring(
            Domain::Market,
            "hard failure",
        )))
        .with(competitor.clone())
        .with(technology.clone())
        .with(regulatory.clone());

    let config = OrchestratorConfig::new().with_policy(
        ExecutionPolicy::default()
            .with_max_concurrent(2)
            .with_failure_strategy(FailureStrategy::FailFast),
    );
    let orch = orchestrator(registry, config);

    let err = orch
        .run(InvestigationRequest::new(sample_plan()).with_targets(vec![
            Domain::Market,
            Domain::Competitor,
            Domain::Technology,
            Domain::Regulatory,
        ]))
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::DomainExecution { .. }));
    // Batch 1 sibling was dispatched; batch 2 never started.
    assert_eq!(competitor.call_count(), 1);
    assert_eq!(technology.call_count(), 0);
    assert_eq!(regulatory.call_count(), 0);
}

/// Tenet: sequential fail_fast aborts before later domains are touched.
#[tokio::test]
async fn sequential_fail_fast_skips_remaining_domains() {
    let competitor = Arc::new(ScriptedInvestigator::completing(
        Domain::Competitor,
        json!({ "competitors": [] }),
    ));
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(ScriptedInvestigator::erroring(
            Domain::Market,
            "hard failure",
        )))
        .with(competitor.clone());

    let config = OrchestratorConfig::new().with_policy(
        ExecutionPolicy::default()
            .sequential()
            .with_failure_strategy(FailureStrategy::FailFast),
    );
    let orch = orchestrator(registry, config);

    let err = orch
        .run(
            InvestigationRequest::new(sample_plan())
                .with_targets(vec![Domain::Market, Domain::Competitor]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::DomainExecution { .. }));
    assert_eq!(competitor.call_count(), 0);
}

/// Tenet: continue_on_error drops a failed non-required domain and still
/// reports `Success` when both required domains completed.
#[tokio::test]
async fn continue_on_error_drops_failed_domain_from_results() {
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Market,
            market_findings(),
        )))
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Competitor,
            json!({ "competitors": ["Acme"] }),
        )))
        .with(Arc::new(ScriptedInvestigator::erroring(
            Domain::Technology,
            "collector offline",
        )));

    let orch = orchestrator(registry, OrchestratorConfig::default());
    let report = orch
        .run(InvestigationRequest::new(sample_plan()).with_targets(vec![
            Domain::Market,
            Domain::Competitor,
            Domain::Technology,
        ]))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Success);
    assert_eq!(report.results.len(), 2);
    assert!(report
        .results
        .iter()
        .all(|r| r.domain != Domain::Technology));
}

/// Tenet: a domain that loses its timeout race fails like any other domain
/// failure and is subject to the failure strategy.
#[tokio::test(start_paused = true)]
async fn domain_timeout_is_a_domain_scoped_failure() {
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(
            ScriptedInvestigator::completing(Domain::Market, market_findings())
                .with_delay(Duration::from_secs(600)),
        ))
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Competitor,
            json!({ "competitors": [] }),
        )));

    let config = OrchestratorConfig::new()
        .with_policy(ExecutionPolicy::default().with_failure_strategy(FailureStrategy::FailFast))
        .with_timeout_for(Domain::Market, Duration::from_secs(30));
    let orch = orchestrator(registry, config);

    let err = orch
        .run(
            InvestigationRequest::new(sample_plan())
                .with_targets(vec![Domain::Market, Domain::Competitor]),
        )
        .await
        .unwrap_err();

    match err {
        ResearchError::Timeout { domain, elapsed } => {
            assert_eq!(domain, Domain::Market);
            assert_eq!(elapsed, Duration::from_secs(30));
        }
        other => panic!("expected Timeout, got {other:?}"),
    }
}

/// Tenet: a wholly failed domain degrades the run to `Partial` when both
/// required domains still completed work. Partial is a terminal state, not
/// an error.
#[tokio::test]
async fn wholly_failed_domain_yields_partial_status() {
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Market,
            market_findings(),
        )))
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Competitor,
            json!({ "competitors": ["Acme"] }),
        )))
        .with(Arc::new(ScriptedInvestigator::failing_items(
            Domain::Technology,
            "all probes failed",
        )));

    let orch = orchestrator(registry, OrchestratorConfig::default());
    let report = orch
        .run(InvestigationRequest::new(sample_plan()).with_targets(vec![
            Domain::Market,
            Domain::Competitor,
            Domain::Technology,
        ]))
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::Partial);
    let technology = report
        .results
        .iter()
        .find(|r| r.domain == Domain::Technology)
        .unwrap();
    assert!(technology.is_wholly_failed());
}

/// Tenet: a required domain that never completes an item is a hard
/// transformation failure surfaced to the caller.
#[tokio::test]
async fn missing_required_domain_coverage_propagates() {
    let registry = InvestigatorRegistry::new()
        .with(Arc::new(ScriptedInvestigator::erroring(
            Domain::Market,
            "upstream offline",
        )))
        .with(Arc::new(ScriptedInvestigator::completing(
            Domain::Competitor,
            json!({ "competitors": ["Acme"] }),
        )));

    let orch = orchestrator(registry, OrchestratorConfig::default());
    let err = orch
        .run(
            InvestigationRequest::new(sample_plan())
                .with_targets(vec![Domain::Market, Domain::Competitor]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::Transformation(_)));
}

/// Tenet: run_with_retry re-attempts retryable failures under the
/// configured policy and wraps exhaustion with the attempt count.
#[tokio::test(start_paused = true)]
async fn run_with_retry_exhausts_on_persistent_domain_failure() {
    let market = Arc::new(ScriptedInvestigator::erroring(
        Domain::Market,
        "upstream offline",
    ));
    let registry = InvestigatorRegistry::new().with(market.clone());

    let config = OrchestratorConfig::new()
        .with_policy(ExecutionPolicy::default().with_failure_strategy(FailureStrategy::FailFast))
        .with_retry(RetryPolicy::new(2).with_base_delay(Duration::from_millis(100)));
    let orch = orchestrator(registry, config);

    let err = orch
        .run_with_retry(
            InvestigationRequest::new(sample_plan()).with_targets(vec![Domain::Market]),
        )
        .await
        .unwrap_err();

    match err {
        ResearchError::RetryExhausted { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("expected RetryExhausted, got {other:?}"),
    }
    assert_eq!(market.call_count(), 2);
}

/// Tenet: validation failures are terminal; the retry wrapper does not
/// re-attempt them.
#[tokio::test]
async fn run_with_retry_does_not_retry_validation_errors() {
    let market = Arc::new(ScriptedInvestigator::completing(
        Domain::Market,
        market_findings(),
    ));
    let registry = InvestigatorRegistry::new().with(market.clone());

    let config = OrchestratorConfig::new().with_item_bounds(10, 20);
    let orch = orchestrator(registry, config);

    let err = orch
        .run_with_retry(InvestigationRequest::new(sample_plan()))
        .await
        .unwrap_err();

    assert!(matches!(err, ResearchError::Validation(_)));
    assert_eq!(market.call_count(), 0);
}
