//! Core types for the research orchestration pipeline
//!
//! Defines the fundamental data model:
//! - Research plans and their items (read-only upstream input)
//! - Investigation domains and their fixed routing tables
//! - Per-domain investigation records with lifecycle tracking
//! - Domain results, synthesis summaries, and the final report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique orchestration run identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category tags assigned to research items by the upstream planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Market sizing and competitive landscape
    MarketCompetition,
    /// Technology and platform assessment
    Technology,
    /// Risk and compliance analysis
    RiskAnalysis,
    /// Regulatory environment
    Regulatory,
    /// Financial modelling and projections
    Financial,
    /// No category assigned
    Uncategorized,
}

/// Item priority as assigned by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Must be investigated
    High,
    /// Should be investigated
    Medium,
    /// Nice to have
    Low,
}

/// A unit of inquiry produced by the upstream planning stage.
///
/// Immutable once produced; this core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchItem {
    /// Item identifier (planner-scoped)
    pub id: String,
    /// Category tag
    pub category: ItemCategory,
    /// Free-text title
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Priority
    pub priority: Priority,
    /// Allowed research methods
    pub methods: Vec<String>,
    /// Candidate data-source names
    pub data_sources: Vec<String>,
}

impl ResearchItem {
    /// Create new research item
    #[inline]
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        category: ItemCategory,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            title: title.into(),
            description: description.into(),
            priority: Priority::Medium,
            methods: Vec::new(),
            data_sources: Vec::new(),
        }
    }

    /// With priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// With data sources
    #[inline]
    #[must_use]
    pub fn with_data_sources(mut self, sources: Vec<String>) -> Self {
        self.data_sources = sources;
        self
    }
}

/// An ordered, named collection of research items.
///
/// Owned by the upstream planner; consumed by the orchestrator as input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchPlan {
    /// Plan identifier
    pub id: String,
    /// Subject under investigation
    pub subject: String,
    /// Ordered items
    pub items: Vec<ResearchItem>,
}

impl ResearchPlan {
    /// Create new plan
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            items: Vec::new(),
        }
    }

    /// With items
    #[inline]
    #[must_use]
    pub fn with_items(mut self, items: Vec<ResearchItem>) -> Self {
        self.items = items;
        self
    }
}

/// Investigation specialties (closed set).
///
/// The set is fixed at compile time; extending it means registering a new
/// investigator capability, not modifying orchestration logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Market sizing, demand, segmentation
    Market,
    /// Competitive landscape
    Competitor,
    /// Technology and platform assessment
    Technology,
    /// Regulatory and compliance environment
    Regulatory,
    /// Financial viability
    Financial,
}

impl Domain {
    /// All domains in descending priority order
    pub const ALL: [Domain; 5] = [
        Domain::Market,
        Domain::Competitor,
        Domain::Technology,
        Domain::Regulatory,
        Domain::Financial,
    ];

    /// Domains guaranteed a non-empty item assignment on every run
    pub const PRIORITY: [Domain; 2] = [Domain::Market, Domain::Competitor];

    /// Fixed priority ranking (higher runs earlier)
    #[inline]
    #[must_use]
    pub fn priority_rank(&self) -> u8 {
        match self {
            Domain::Market => 5,
            Domain::Competitor => 4,
            Domain::Technology => 3,
            Domain::Regulatory => 2,
            Domain::Financial => 1,
        }
    }

    /// Whether this domain is always selected for any run
    #[inline]
    #[must_use]
    pub fn is_priority(&self) -> bool {
        matches!(self, Domain::Market | Domain::Competitor)
    }

    /// Stable lowercase name, matching the serde representation
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Market => "market",
            Domain::Competitor => "competitor",
            Domain::Technology => "technology",
            Domain::Regulatory => "regulatory",
            Domain::Financial => "financial",
        }
    }

    /// Fixed category-to-domain routing table
    #[must_use]
    pub fn for_category(category: ItemCategory) -> &'static [Domain] {
        match category {
            ItemCategory::MarketCompetition => &[Domain::Market, Domain::Competitor],
            ItemCategory::Technology => &[Domain::Technology],
            ItemCategory::RiskAnalysis | ItemCategory::Regulatory => &[Domain::Regulatory],
            ItemCategory::Financial => &[Domain::Financial],
            ItemCategory::Uncategorized => &[],
        }
    }

    /// Keyword triggers for text-based item routing (substring, lowercase)
    #[must_use]
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Domain::Market => &["market", "industry", "demand", "segment", "customer"],
            Domain::Competitor => &["competitor", "competition", "rival", "landscape"],
            Domain::Technology => &["technology", "technical", "platform", "architecture"],
            Domain::Regulatory => &["regulat", "compliance", "legal", "policy", "risk"],
            Domain::Financial => &["financ", "revenue", "cost", "pricing", "funding"],
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a per-domain investigation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Assigned but not yet started
    Pending,
    /// Investigator is working on it
    InProgress,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

/// Per-domain wrapper around a research item.
///
/// Created by the orchestrator when it assigns an item to a domain; mutated
/// only by the investigator handling it. Each domain gets its own copies of
/// an item, so failure in one domain never corrupts another's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestigationItem {
    /// Owning domain
    pub domain: Domain,
    /// Source item id (possibly domain-qualified for synthesized items)
    pub item_id: String,
    /// Source category
    pub category: ItemCategory,
    /// Item title
    pub title: String,
    /// Item description
    pub description: String,
    /// Candidate data sources inherited from the research item
    pub data_sources: Vec<String>,
    /// Lifecycle status
    pub status: ItemStatus,
    /// When the investigator picked the item up
    pub started_at: Option<DateTime<Utc>>,
    /// When the investigator finished (either way)
    pub finished_at: Option<DateTime<Utc>>,
    /// Failure message, set only on `Failed`
    pub error: Option<String>,
}

impl InvestigationItem {
    /// Wrap a research item for a domain
    #[must_use]
    pub fn from_item(item: &ResearchItem, domain: Domain) -> Self {
        Self {
            domain,
            item_id: item.id.clone(),
            category: item.category,
            title: item.title.clone(),
            description: item.description.clone(),
            data_sources: item.data_sources.clone(),
            status: ItemStatus::Pending,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Synthesize a generic item for a priority domain that would otherwise
    /// run empty. Clones the given item under a domain-qualified id/title.
    #[must_use]
    pub fn synthesized(source: &ResearchItem, domain: Domain) -> Self {
        Self {
            domain,
            item_id: format!("{}-general-{}", domain.as_str(), source.id),
            category: source.category,
            title: format!("[{}] {}", domain.as_str(), source.title),
            description: source.description.clone(),
            data_sources: source.data_sources.clone(),
            status: ItemStatus::Pending,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    /// Mark in progress with a start timestamp
    pub fn begin(&mut self) {
        self.status = ItemStatus::InProgress;
        self.started_at = Some(Utc::now());
    }

    /// Mark completed with an end timestamp
    pub fn complete(&mut self) {
        self.status = ItemStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Mark failed with an end timestamp and error message
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = ItemStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error.into());
    }
}

/// Coarse signal-completeness score assigned per domain result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Signal score >= 0.8
    High,
    /// Signal score >= 0.5
    Medium,
    /// Everything below
    Low,
}

impl Confidence {
    /// Map a weighted signal score to a confidence level.
    ///
    /// The thresholds are uniform across all investigator variants.
    #[inline]
    #[must_use]
    pub fn from_signal_score(score: f64) -> Self {
        if score >= 0.8 {
            Confidence::High
        } else if score >= 0.5 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Numeric score used for aggregate metrics
    #[inline]
    #[must_use]
    pub fn score(&self) -> f64 {
        match self {
            Confidence::High => 1.0,
            Confidence::Medium => 0.7,
            Confidence::Low => 0.4,
        }
    }
}

/// Metadata attached to every domain result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainMetadata {
    /// When the domain investigation started
    pub started_at: DateTime<Utc>,
    /// When it finished; never earlier than `started_at`
    pub finished_at: DateTime<Utc>,
    /// Data sources actually consulted
    pub data_sources_used: Vec<String>,
    /// Signal-completeness confidence
    pub confidence: Confidence,
    /// Known gaps in the findings
    pub limitations: Vec<String>,
    /// Follow-up recommendations
    pub recommendations: Vec<String>,
}

impl DomainMetadata {
    /// Create metadata, clamping `finished_at` so it never precedes
    /// `started_at`.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: finished_at.max(started_at),
            data_sources_used: Vec::new(),
            confidence: Confidence::Low,
            limitations: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// With confidence
    #[inline]
    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    /// With data sources used
    #[inline]
    #[must_use]
    pub fn with_data_sources(mut self, sources: Vec<String>) -> Self {
        self.data_sources_used = sources;
        self
    }

    /// With limitations
    #[inline]
    #[must_use]
    pub fn with_limitations(mut self, limitations: Vec<String>) -> Self {
        self.limitations = limitations;
        self
    }

    /// With recommendations
    #[inline]
    #[must_use]
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }
}

/// One domain's findings for one orchestration run. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainResult {
    /// Owning domain
    pub domain: Domain,
    /// Items processed (with their final statuses)
    pub items: Vec<InvestigationItem>,
    /// Opaque domain-specific findings
    pub findings: serde_json::Value,
    /// Result metadata
    pub metadata: DomainMetadata,
}

impl DomainResult {
    /// Number of items that completed successfully
    #[inline]
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Completed)
            .count()
    }

    /// Whether every item in this result failed.
    ///
    /// An empty result is not wholly failed; it simply contributes zero
    /// completed items.
    #[inline]
    #[must_use]
    pub fn is_wholly_failed(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.status == ItemStatus::Failed)
    }
}

/// Cross-domain executive summary with bounded bucket lengths
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchSummary {
    /// Key findings (capped at 5)
    pub key_findings: Vec<String>,
    /// Critical risks (capped at 4)
    pub critical_risks: Vec<String>,
    /// Major opportunities (capped at 4)
    pub major_opportunities: Vec<String>,
    /// Next steps (capped at 5)
    pub next_steps: Vec<String>,
}

/// Aggregate performance metrics for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Wall-clock span of the run in hours
    pub elapsed_hours: f64,
    /// Number of domain results collected
    pub domains_completed: usize,
    /// Total completed items across all domains
    pub data_points: usize,
    /// Mean confidence mapped to a 0-1 score
    pub mean_confidence: f64,
}

/// Overall run status; a deterministic function of the domain results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Both required domains completed and no domain wholly failed
    Success,
    /// Usable output with gaps; a valid terminal state, not an error
    Partial,
    /// Every domain result has zero completed items
    Failed,
}

/// Final orchestration output handed back to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    /// Unique run id
    pub run_id: RunId,
    /// Originating plan id
    pub plan_id: String,
    /// Subject under investigation
    pub subject: String,
    /// When the run executed
    pub executed_at: DateTime<Utc>,
    /// Overall status
    pub status: RunStatus,
    /// Collected domain results
    pub results: Vec<DomainResult>,
    /// Synthesized executive summary
    pub summary: ResearchSummary,
    /// Aggregate performance metrics
    pub metrics: PerformanceMetrics,
}
