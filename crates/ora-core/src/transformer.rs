//! Result validation, synthesis, and aggregation
//!
//! Turns the orchestrator's collected domain results into the final report:
//! - Required-domain coverage is a hard precondition (data-transformation
//!   failure, not a warning) whenever any domain produced usable output
//! - A run where every result has zero completed items is a valid terminal
//!   state and yields a `Failed` report instead of an error
//! - Summary buckets keep first-come order across domains and are truncated
//!   to fixed caps
//! - Overall status is a deterministic function of the results, never set
//!   independently

use chrono::{DateTime, Utc};
use ora_domain::{
    Domain, DomainResult, PerformanceMetrics, ResearchError, ResearchReport, ResearchSummary,
    RunId, RunStatus,
};
use serde_json::Value;

const MAX_KEY_FINDINGS: usize = 5;
const MAX_CRITICAL_RISKS: usize = 4;
const MAX_OPPORTUNITIES: usize = 4;
const MAX_NEXT_STEPS: usize = 5;

/// Validate, synthesize, and assemble the final report.
///
/// # Errors
/// `ResearchError::Transformation` when some domain produced completed
/// items but a required domain (market, competitor) did not.
pub fn transform(
    run_id: RunId,
    plan_id: &str,
    subject: &str,
    executed_at: DateTime<Utc>,
    results: Vec<DomainResult>,
) -> Result<ResearchReport, ResearchError> {
    let status = overall_status(&results);
    if status != RunStatus::Failed {
        validate_required_coverage(&results)?;
    }

    let summary = synthesize_summary(&results);
    let metrics = compute_metrics(&results);
    tracing::info!(
        run = %run_id,
        ?status,
        domains = results.len(),
        data_points = metrics.data_points,
        "report assembled"
    );

    Ok(ResearchReport {
        run_id,
        plan_id: plan_id.to_string(),
        subject: subject.to_string(),
        executed_at,
        status,
        results,
        summary,
        metrics,
    })
}

/// Overall status as a deterministic function of the domain results
#[must_use]
pub fn overall_status(results: &[DomainResult]) -> RunStatus {
    if results.iter().all(|r| r.completed_count() == 0) {
        return RunStatus::Failed;
    }
    let required_covered = Domain::PRIORITY
        .iter()
        .all(|d| results.iter().any(|r| r.domain == *d && r.completed_count() > 0));
    if required_covered && !results.iter().any(DomainResult::is_wholly_failed) {
        RunStatus::Success
    } else {
        RunStatus::Partial
    }
}

/// Cross-domain summary, buckets truncated to their caps in insertion order
#[must_use]
pub fn synthesize_summary(results: &[DomainResult]) -> ResearchSummary {
    let mut summary = ResearchSummary::default();
    for result in results {
        let keys = bucket_keys(result.domain);
        for key in keys.findings {
            push_capped(
                &mut summary.key_findings,
                extract_strings(&result.findings, key),
                MAX_KEY_FINDINGS,
            );
        }
        for key in keys.risks {
            push_capped(
                &mut summary.critical_risks,
                extract_strings(&result.findings, key),
                MAX_CRITICAL_RISKS,
            );
        }
        for key in keys.opportunities {
            push_capped(
                &mut summary.major_opportunities,
                extract_strings(&result.findings, key),
                MAX_OPPORTUNITIES,
            );
        }
        push_capped(
            &mut summary.next_steps,
            result.metadata.recommendations.clone(),
            MAX_NEXT_STEPS,
        );
    }
    summary
}

/// Aggregate performance metrics over the collected results
#[must_use]
pub fn compute_metrics(results: &[DomainResult]) -> PerformanceMetrics {
    let started = results.iter().map(|r| r.metadata.started_at).min();
    let finished = results.iter().map(|r| r.metadata.finished_at).max();
    let elapsed_hours = match (started, finished) {
        (Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 3_600_000.0,
        _ => 0.0,
    };

    let mean_confidence = if results.is_empty() {
        0.0
    } else {
        results
            .iter()
            .map(|r| r.metadata.confidence.score())
            .sum::<f64>()
            / results.len() as f64
    };

    PerformanceMetrics {
        elapsed_hours,
        domains_completed: results.len(),
        data_points: results.iter().map(DomainResult::completed_count).sum(),
        mean_confidence,
    }
}

fn validate_required_coverage(results: &[DomainResult]) -> Result<(), ResearchError> {
    if results.is_empty() {
        return Err(ResearchError::Transformation(
            "no domain results collected".to_string(),
        ));
    }
    for required in Domain::PRIORITY {
        let covered = results
            .iter()
            .any(|r| r.domain == required && r.completed_count() > 0);
        if !covered {
            return Err(ResearchError::Transformation(format!(
                "required domain {required} has no completed items"
            )));
        }
    }
    Ok(())
}

struct BucketKeys {
    findings: &'static [&'static str],
    risks: &'static [&'static str],
    opportunities: &'static [&'static str],
}

/// Domain-specific extraction routing: which findings keys feed which
/// summary bucket.
fn bucket_keys(domain: Domain) -> BucketKeys {
    match domain {
        Domain::Market => BucketKeys {
            findings: &["market_size", "growth_rate"],
            risks: &["barriers"],
            opportunities: &["trends", "opportunities"],
        },
        Domain::Competitor => BucketKeys {
            findings: &["competitors", "positioning"],
            risks: &["strengths"],
            opportunities: &["weaknesses"],
        },
        Domain::Technology => BucketKeys {
            findings: &["stack", "maturity"],
            risks: &["technical_risks"],
            opportunities: &["innovations"],
        },
        Domain::Regulatory => BucketKeys {
            findings: &["regulations"],
            risks: &["compliance_risks", "risks"],
            opportunities: &[],
        },
        Domain::Financial => BucketKeys {
            findings: &["projections"],
            risks: &["cost_risks"],
            opportunities: &["revenue_opportunities"],
        },
    }
}

/// Pull 0..N candidate strings out of one findings key.
///
/// String values are prefixed with their key for context; arrays contribute
/// their string elements as-is. Other shapes contribute nothing.
fn extract_strings(findings: &Value, key: &str) -> Vec<String> {
    match findings.get(key) {
        Some(Value::String(s)) => vec![format!("{key}: {s}")],
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| v.as_str().map(ToString::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn push_capped(bucket: &mut Vec<String>, candidates: Vec<String>, cap: usize) {
    for candidate in candidates {
        if bucket.len() >= cap {
            return;
        }
        bucket.push(candidate);
    }
}
