//! Production investigator variants
//!
//! Each variant implements the per-item lifecycle contract and derives its
//! metadata (confidence, limitations, recommendations) from the signals
//! present in its findings. Confidence thresholds are uniform across
//! variants; the signal weights are variant-specific.

use crate::investigator::CollectorClient;
use ora_domain::{Domain, InvestigationItem};
use serde_json::{Map, Value};

pub mod competitor;
pub mod market;

pub use competitor::CompetitorInvestigator;
pub use market::MarketInvestigator;

/// Drive the per-item lifecycle for one domain call.
///
/// Every item is begun, collected, and completed or failed individually;
/// one item's failure never aborts its siblings. Returns the processed
/// items, the merged findings object (first write per key wins, preserving
/// item order), and the union of data sources behind completed items.
pub(crate) async fn collect_items<C: CollectorClient>(
    collector: &C,
    domain: Domain,
    items: Vec<InvestigationItem>,
) -> (Vec<InvestigationItem>, Map<String, Value>, Vec<String>) {
    let mut processed = Vec::with_capacity(items.len());
    let mut findings = Map::new();
    let mut sources: Vec<String> = Vec::new();

    for mut item in items {
        item.begin();
        match collector.collect(domain, &item).await {
            Ok(value) => {
                absorb(&mut findings, &item, value);
                for source in &item.data_sources {
                    if !sources.contains(source) {
                        sources.push(source.clone());
                    }
                }
                item.complete();
            }
            Err(err) => {
                tracing::warn!(domain = %domain, item = %item.item_id, error = %err, "item failed");
                item.fail(err.to_string());
            }
        }
        processed.push(item);
    }

    (processed, findings, sources)
}

/// Weighted count of signal fields present in the findings
pub(crate) fn signal_score(findings: &Map<String, Value>, weights: &[(&str, f64)]) -> f64 {
    weights
        .iter()
        .filter(|(key, _)| findings.get(*key).is_some_and(|v| !v.is_null()))
        .map(|(_, weight)| weight)
        .sum()
}

/// One limitation line per expected-but-absent signal
pub(crate) fn missing_signal_limitations(
    domain: Domain,
    findings: &Map<String, Value>,
    weights: &[(&str, f64)],
) -> Vec<String> {
    weights
        .iter()
        .filter(|(key, _)| !findings.get(*key).is_some_and(|v| !v.is_null()))
        .map(|(key, _)| format!("no {key} signal collected for {domain}"))
        .collect()
}

fn absorb(findings: &mut Map<String, Value>, item: &InvestigationItem, value: Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                findings.entry(key).or_insert(val);
            }
        }
        Value::Null => {}
        other => {
            findings.entry(item.item_id.clone()).or_insert(other);
        }
    }
}
