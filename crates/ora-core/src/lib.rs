//! ORA Core - bounded-concurrency research orchestration
//!
//! The coordination layer of the pipeline:
//! - Investigator capability contract and registry
//! - Production investigator variants (market, competitor)
//! - Domain orchestrator with batched parallelism, per-domain timeouts,
//!   and configurable failure strategy
//! - Result transformer: validation, summary synthesis, metrics, status
//!
//! # Example
//!
//! ```rust,ignore
//! use ora_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(registry: InvestigatorRegistry) -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(Arc::new(registry), OrchestratorConfig::from_env());
//! let request = InvestigationRequest::new(plan);
//! let report = orchestrator.run(request).await?;
//! println!("run finished with status {:?}", report.status);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod investigator;
pub mod investigators;
pub mod orchestrator;
pub mod transformer;

pub use config::{ExecutionPolicy, FailureStrategy, OrchestratorConfig};
pub use investigator::{CollectorClient, DomainInvestigator, InvestigatorRegistry};
pub use investigators::{CompetitorInvestigator, MarketInvestigator};
pub use orchestrator::{InvestigationRequest, Orchestrator};
pub use transformer::{compute_metrics, overall_status, synthesize_summary, transform};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the orchestration core
    pub use crate::{
        CollectorClient, DomainInvestigator, ExecutionPolicy, FailureStrategy,
        InvestigationRequest, InvestigatorRegistry, Orchestrator, OrchestratorConfig,
    };
    pub use ora_domain::{
        Domain, DomainResult, InvestigationItem, ResearchError, ResearchPlan, ResearchReport,
        RunStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
