//! In-memory reference implementation of the register storage traits.
//!
//! Deterministic and test-friendly: monotonic integer ids, `RwLock`-guarded
//! tables, and a blake3 hash chain over the audit log. Production
//! deployments should use a transactional backend for source-of-truth data.

use crate::model::{AuditQuery, IssueFilter, IssueSort};
use crate::traits::{ActorStore, AuditStore, IssueStore};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use register_types::{
    Actor, ActorId, AuditDraft, AuditEvent, AuditEventId, DepartmentScope, Issue, IssueId,
    NewIssue, Role,
};
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
struct IssueTable {
    next_id: i64,
    rows: BTreeMap<IssueId, Issue>,
}

#[derive(Default)]
struct ActorTable {
    next_id: i64,
    rows: BTreeMap<ActorId, Actor>,
}

/// In-memory storage adapter implementing every register store trait.
#[derive(Default)]
pub struct InMemoryRegisterStore {
    issues: RwLock<IssueTable>,
    actors: RwLock<ActorTable>,
    audits: RwLock<Vec<AuditEvent>>,
}

impl InMemoryRegisterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(table: &str) -> StorageError {
    StorageError::Backend(format!("{table} lock poisoned"))
}

#[async_trait]
impl IssueStore for InMemoryRegisterStore {
    async fn create_issue(&self, draft: NewIssue, now: DateTime<Utc>) -> StorageResult<Issue> {
        let mut table = self.issues.write().map_err(|_| poisoned("issues"))?;
        table.next_id += 1;
        let issue = draft.into_issue(IssueId(table.next_id), now);
        table.rows.insert(issue.id, issue.clone());
        Ok(issue)
    }

    async fn get_issue(&self, id: IssueId) -> StorageResult<Option<Issue>> {
        let table = self.issues.read().map_err(|_| poisoned("issues"))?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn update_issue(&self, mut issue: Issue, now: DateTime<Utc>) -> StorageResult<Issue> {
        let mut table = self.issues.write().map_err(|_| poisoned("issues"))?;
        if !table.rows.contains_key(&issue.id) {
            return Err(StorageError::NotFound(format!("issue {}", issue.id)));
        }
        issue.updated_at = now;
        table.rows.insert(issue.id, issue.clone());
        Ok(issue)
    }

    async fn delete_issue(&self, id: IssueId) -> StorageResult<bool> {
        let mut table = self.issues.write().map_err(|_| poisoned("issues"))?;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn list_issues(&self, filter: IssueFilter) -> StorageResult<Vec<Issue>> {
        let table = self.issues.read().map_err(|_| poisoned("issues"))?;
        let mut rows: Vec<Issue> = table
            .rows
            .values()
            .filter(|issue| matches_filter(issue, &filter))
            .cloned()
            .collect();
        match filter.sort {
            IssueSort::NewestFirst => rows.sort_by(|a, b| b.id.cmp(&a.id)),
            IssueSort::OldestFirst => rows.sort_by(|a, b| a.id.cmp(&b.id)),
        }
        Ok(rows)
    }
}

fn matches_filter(issue: &Issue, filter: &IssueFilter) -> bool {
    if !filter.statuses.is_empty() && !filter.statuses.contains(&issue.status) {
        return false;
    }
    if !filter.risk_levels.is_empty() && !filter.risk_levels.contains(&issue.risk_level) {
        return false;
    }
    if !filter.departments.is_empty() {
        match issue.department.as_deref() {
            Some(dept) if filter.departments.iter().any(|d| d == dept) => {}
            _ => return false,
        }
    }
    if !filter.owners.is_empty() {
        match issue.owner.as_deref() {
            Some(owner) if filter.owners.iter().any(|o| o == owner) => {}
            _ => return false,
        }
    }
    if !filter.identified_by.is_empty() {
        match issue.identified_by.as_deref() {
            Some(name) if filter.identified_by.iter().any(|n| n == name) => {}
            _ => return false,
        }
    }
    if !filter.topics.is_empty() {
        match issue.topic.as_deref() {
            Some(topic) if filter.topics.iter().any(|t| t == topic) => {}
            _ => return false,
        }
    }
    if let Some(from) = filter.due_from {
        if !issue.due_date.is_some_and(|due| due >= from) {
            return false;
        }
    }
    if let Some(to) = filter.due_to {
        if !issue.due_date.is_some_and(|due| due <= to) {
            return false;
        }
    }
    if let Some(from) = filter.identified_from {
        if !issue.identification_date.is_some_and(|d| d >= from) {
            return false;
        }
    }
    if let Some(to) = filter.identified_to {
        if !issue.identification_date.is_some_and(|d| d <= to) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ActorStore for InMemoryRegisterStore {
    async fn insert_actor(
        &self,
        username: String,
        role: Role,
        scope: DepartmentScope,
    ) -> StorageResult<Actor> {
        let mut table = self.actors.write().map_err(|_| poisoned("actors"))?;
        if table
            .rows
            .values()
            .any(|actor| actor.username() == username)
        {
            return Err(StorageError::Conflict(format!(
                "username '{username}' already exists"
            )));
        }
        table.next_id += 1;
        let id = ActorId(table.next_id);
        let actor = Actor::persisted(id, username, role, scope);
        table.rows.insert(id, actor.clone());
        Ok(actor)
    }

    async fn get_actor(&self, id: ActorId) -> StorageResult<Option<Actor>> {
        let table = self.actors.read().map_err(|_| poisoned("actors"))?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn get_actor_by_username(&self, username: &str) -> StorageResult<Option<Actor>> {
        let table = self.actors.read().map_err(|_| poisoned("actors"))?;
        Ok(table
            .rows
            .values()
            .find(|actor| actor.username() == username)
            .cloned())
    }
}

#[async_trait]
impl AuditStore for InMemoryRegisterStore {
    async fn append_event(
        &self,
        draft: AuditDraft,
        timestamp: DateTime<Utc>,
    ) -> StorageResult<AuditEvent> {
        let mut log = self.audits.write().map_err(|_| poisoned("audit"))?;

        let previous_hash = log.last().map(|event| event.hash.clone());
        let sequence = log.len() as i64 + 1;
        let hash = compute_event_hash(&draft, previous_hash.as_deref(), sequence, timestamp)?;

        let event = AuditEvent {
            id: AuditEventId(sequence),
            actor_id: draft.actor_id,
            username: draft.username,
            action: draft.action,
            entity: draft.entity,
            entity_id: draft.entity_id,
            details: draft.details,
            timestamp,
            previous_hash,
            hash,
        };
        log.push(event.clone());
        Ok(event)
    }

    async fn query_events(&self, query: AuditQuery) -> StorageResult<Vec<AuditEvent>> {
        let log = self.audits.read().map_err(|_| poisoned("audit"))?;
        let mut events: Vec<AuditEvent> = log
            .iter()
            .filter(|event| matches_query(event, &query))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            events.truncate(limit);
        }
        Ok(events)
    }

    async fn latest_hash(&self) -> StorageResult<Option<String>> {
        let log = self.audits.read().map_err(|_| poisoned("audit"))?;
        Ok(log.last().map(|event| event.hash.clone()))
    }

    async fn count_events(&self) -> StorageResult<usize> {
        let log = self.audits.read().map_err(|_| poisoned("audit"))?;
        Ok(log.len())
    }
}

fn matches_query(event: &AuditEvent, query: &AuditQuery) -> bool {
    if query.entity.is_some_and(|e| e != event.entity) {
        return false;
    }
    if query.entity_id.is_some() && query.entity_id != event.entity_id {
        return false;
    }
    if query.actor_id.is_some() && query.actor_id != event.actor_id {
        return false;
    }
    if query.action.is_some_and(|a| a != event.action) {
        return false;
    }
    if query.from.is_some_and(|from| event.timestamp < from) {
        return false;
    }
    if query.to.is_some_and(|to| event.timestamp > to) {
        return false;
    }
    true
}

fn compute_event_hash(
    draft: &AuditDraft,
    previous_hash: Option<&str>,
    sequence: i64,
    timestamp: DateTime<Utc>,
) -> StorageResult<String> {
    let serializable = serde_json::json!({
        "previous_hash": previous_hash,
        "sequence": sequence,
        "timestamp": timestamp,
        "actor_id": draft.actor_id,
        "username": draft.username,
        "action": draft.action,
        "entity": draft.entity,
        "entity_id": draft.entity_id,
        "details": draft.details,
    });
    let serialized = serde_json::to_vec(&serializable)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(blake3::hash(&serialized).to_hex().to_string())
}
