use chrono::{DateTime, NaiveDate, Utc};
use register_types::{ActorId, AuditAction, EntityKind, IssueStatus, RiskLevel};
use serde::{Deserialize, Serialize};

/// Filters for listing issues. Every populated filter is conjunctive;
/// list-valued filters match any of their values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IssueFilter {
    pub statuses: Vec<IssueStatus>,
    pub risk_levels: Vec<RiskLevel>,
    pub departments: Vec<String>,
    pub owners: Vec<String>,
    pub identified_by: Vec<String>,
    pub topics: Vec<String>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
    pub identified_from: Option<NaiveDate>,
    pub identified_to: Option<NaiveDate>,
    pub sort: IssueSort,
}

/// Sort order for issue listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueSort {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filters for reading the audit trail. All populated filters are ANDed;
/// results are returned newest-first.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    pub entity: Option<EntityKind>,
    pub entity_id: Option<i64>,
    pub actor_id: Option<ActorId>,
    pub action: Option<AuditAction>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}
