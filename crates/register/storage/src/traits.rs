use crate::model::{AuditQuery, IssueFilter};
use crate::StorageResult;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use register_types::{
    Actor, ActorId, AuditDraft, AuditEvent, DepartmentScope, Issue, IssueId, NewIssue, Role,
};
use std::sync::{PoisonError, RwLock};

/// Storage interface for issue records.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Persist a new issue, assigning its id and timestamps.
    async fn create_issue(&self, draft: NewIssue, now: DateTime<Utc>) -> StorageResult<Issue>;

    /// Get one issue by id.
    async fn get_issue(&self, id: IssueId) -> StorageResult<Option<Issue>>;

    /// Replace a stored issue, bumping `updated_at`.
    async fn update_issue(&self, issue: Issue, now: DateTime<Utc>) -> StorageResult<Issue>;

    /// Remove an issue. Returns whether anything was deleted.
    async fn delete_issue(&self, id: IssueId) -> StorageResult<bool>;

    /// List issues matching the filter, in the filter's sort order.
    async fn list_issues(&self, filter: IssueFilter) -> StorageResult<Vec<Issue>>;
}

/// Storage interface for persisted actors.
#[async_trait]
pub trait ActorStore: Send + Sync {
    /// Persist a new actor, assigning its id. Usernames are unique.
    async fn insert_actor(
        &self,
        username: String,
        role: Role,
        scope: DepartmentScope,
    ) -> StorageResult<Actor>;

    async fn get_actor(&self, id: ActorId) -> StorageResult<Option<Actor>>;

    async fn get_actor_by_username(&self, username: &str) -> StorageResult<Option<Actor>>;
}

/// Storage interface for the append-only audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append an event, assigning its sequence id and chain hash. Prior
    /// events are never mutated or removed.
    async fn append_event(
        &self,
        draft: AuditDraft,
        timestamp: DateTime<Utc>,
    ) -> StorageResult<AuditEvent>;

    /// Read events newest-first, applying the query's conjunctive filters.
    async fn query_events(&self, query: AuditQuery) -> StorageResult<Vec<AuditEvent>>;

    /// The hash anchor of the most recent event.
    async fn latest_hash(&self) -> StorageResult<Option<String>>;

    /// Total number of stored events.
    async fn count_events(&self) -> StorageResult<usize>;
}

/// Unified storage bundle consumed by the orchestrator layer.
pub trait RegisterStore: IssueStore + ActorStore + AuditStore + Send + Sync {}

impl<T> RegisterStore for T where T: IssueStore + ActorStore + AuditStore + Send + Sync {}

/// Injected time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}
