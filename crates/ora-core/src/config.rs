//! Runtime configuration for the orchestration core
//!
//! Plain builder-style structs with environment-variable constructors.
//! Recognized keys (all optional, defaults below):
//! - `ORA_PARALLEL` - execute domains in parallel batches (bool)
//! - `ORA_MAX_CONCURRENT_DOMAINS` - batch size in parallel mode
//! - `ORA_FAILURE_STRATEGY` - `fail_fast` or `continue_on_error`
//! - `ORA_DOMAIN_TIMEOUT_SECS` - default per-domain timeout
//! - `ORA_MIN_ITEMS` / `ORA_MAX_ITEMS` - accepted plan size bounds
//! - `ORA_RETRY_MAX_ATTEMPTS` / `ORA_RETRY_BASE_DELAY_MS` /
//!   `ORA_RETRY_MAX_DELAY_MS` - retry policy for wrapped runs
//! - `ORA_SESSION_TIMEOUT_SECS` - session TTL for the session store

use ora_domain::Domain;
use ora_retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

/// What the orchestrator does when a domain fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    /// Abort the whole run on the first domain failure
    FailFast,
    /// Log, drop the failed domain, and keep going
    ContinueOnError,
}

impl FromStr for FailureStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail_fast" => Ok(Self::FailFast),
            "continue_on_error" => Ok(Self::ContinueOnError),
            other => Err(format!("unknown failure strategy: {other}")),
        }
    }
}

/// Concurrency and failure policy for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPolicy {
    /// Dispatch domains in concurrent batches
    pub parallel: bool,
    /// Batch size in parallel mode (>= 1)
    pub max_concurrent_domains: usize,
    /// Failure handling
    pub failure_strategy: FailureStrategy,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            parallel: true,
            max_concurrent_domains: 3,
            failure_strategy: FailureStrategy::ContinueOnError,
        }
    }
}

impl ExecutionPolicy {
    /// Sequential execution
    #[inline]
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// With batch size
    #[inline]
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_domains = max.max(1);
        self
    }

    /// With failure strategy
    #[inline]
    #[must_use]
    pub fn with_failure_strategy(mut self, strategy: FailureStrategy) -> Self {
        self.failure_strategy = strategy;
        self
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Execution policy
    pub policy: ExecutionPolicy,
    /// Default per-domain timeout
    pub domain_timeout: Duration,
    /// Per-domain timeout overrides
    pub domain_timeouts: HashMap<Domain, Duration>,
    /// Minimum accepted plan size
    pub min_items: usize,
    /// Maximum accepted plan size
    pub max_items: usize,
    /// Retry policy for runs wrapped by the retry executor
    pub retry: RetryPolicy,
    /// Session TTL handed to the session store
    pub session_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            policy: ExecutionPolicy::default(),
            domain_timeout: Duration::from_secs(120),
            domain_timeouts: HashMap::new(),
            min_items: 1,
            max_items: 50,
            retry: RetryPolicy::default(),
            session_timeout: Duration::from_secs(1800),
        }
    }
}

impl OrchestratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With execution policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// With default domain timeout
    #[inline]
    #[must_use]
    pub fn with_domain_timeout(mut self, timeout: Duration) -> Self {
        self.domain_timeout = timeout;
        self
    }

    /// With a per-domain timeout override
    #[inline]
    #[must_use]
    pub fn with_timeout_for(mut self, domain: Domain, timeout: Duration) -> Self {
        self.domain_timeouts.insert(domain, timeout);
        self
    }

    /// With accepted plan-size bounds
    #[inline]
    #[must_use]
    pub fn with_item_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_items = min;
        self.max_items = max;
        self
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Effective timeout for a domain
    #[inline]
    #[must_use]
    pub fn timeout_for(&self, domain: Domain) -> Duration {
        self.domain_timeouts
            .get(&domain)
            .copied()
            .unwrap_or(self.domain_timeout)
    }

    /// Build configuration from `ORA_*` environment variables, falling back
    /// to defaults for missing or unparseable values.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(parallel) = env_parse::<bool>("ORA_PARALLEL") {
            config.policy.parallel = parallel;
        }
        if let Some(max) = env_parse::<usize>("ORA_MAX_CONCURRENT_DOMAINS") {
            config.policy.max_concurrent_domains = max.max(1);
        }
        if let Some(strategy) = env_parse::<FailureStrategy>("ORA_FAILURE_STRATEGY") {
            config.policy.failure_strategy = strategy;
        }
        if let Some(secs) = env_parse::<u64>("ORA_DOMAIN_TIMEOUT_SECS") {
            config.domain_timeout = Duration::from_secs(secs);
        }
        if let Some(min) = env_parse::<usize>("ORA_MIN_ITEMS") {
            config.min_items = min;
        }
        if let Some(max) = env_parse::<usize>("ORA_MAX_ITEMS") {
            config.max_items = max;
        }
        if let Some(attempts) = env_parse::<u32>("ORA_RETRY_MAX_ATTEMPTS") {
            config.retry.max_attempts = attempts.max(1);
        }
        if let Some(ms) = env_parse::<u64>("ORA_RETRY_BASE_DELAY_MS") {
            config.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_parse::<u64>("ORA_RETRY_MAX_DELAY_MS") {
            config.retry.max_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = env_parse::<u64>("ORA_SESSION_TIMEOUT_SECS") {
            config.session_timeout = Duration::from_secs(secs);
        }
        config
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn failure_strategy_parsing() {
        assert_eq!(
            "fail_fast".parse::<FailureStrategy>().unwrap(),
            FailureStrategy::FailFast
        );
        assert_eq!(
            "continue_on_error".parse::<FailureStrategy>().unwrap(),
            FailureStrategy::ContinueOnError
        );
        assert!("abort".parse::<FailureStrategy>().is_err());
    }

    #[test]
    fn policy_builder_floors_batch_size() {
        let policy = ExecutionPolicy::default().with_max_concurrent(0);
        assert_eq!(policy.max_concurrent_domains, 1);
    }

    #[test]
    fn timeout_override_falls_back_to_default() {
        let config = OrchestratorConfig::new()
            .with_domain_timeout(Duration::from_secs(60))
            .with_timeout_for(Domain::Market, Duration::from_secs(10));

        assert_eq!(config.timeout_for(Domain::Market), Duration::from_secs(10));
        assert_eq!(
            config.timeout_for(Domain::Financial),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn defaults_are_sane() {
        let config = OrchestratorConfig::default();
        assert!(config.policy.parallel);
        assert_eq!(
            config.policy.failure_strategy,
            FailureStrategy::ContinueOnError
        );
        assert!(config.min_items <= config.max_items);
    }
}
