//! ORA Domain - shared data model for the research orchestration core
//!
//! Leaf crate with no async machinery. Defines:
//! - Research plans and items (read-only upstream input)
//! - Investigation domains with their fixed routing tables
//! - Per-domain investigation records and results
//! - The final report shape and the shared error taxonomy
//!
//! # Example
//!
//! ```rust
//! use ora_domain::{Domain, ItemCategory, ResearchItem, ResearchPlan};
//!
//! let plan = ResearchPlan::new("plan-1", "Acme Robotics").with_items(vec![
//!     ResearchItem::new("i1", ItemCategory::MarketCompetition, "TAM", "Size the market"),
//! ]);
//!
//! assert_eq!(Domain::for_category(plan.items[0].category).len(), 2);
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod types;

pub use error::{ResearchError, Severity};
pub use types::{
    Confidence, Domain, DomainMetadata, DomainResult, InvestigationItem, ItemCategory, ItemStatus,
    PerformanceMetrics, Priority, ResearchItem, ResearchPlan, ResearchReport, ResearchSummary,
    RunId, RunStatus, SessionId,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
