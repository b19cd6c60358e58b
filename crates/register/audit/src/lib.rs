//! Register Audit - the immutable trail of attributed mutations.
//!
//! The trail is append-only: events get a sequence id, a timestamp, and a
//! hash link to their predecessor at write time, and are never touched
//! again. This crate has no policy knowledge; callers decide what gets
//! recorded. It is the only component permitted to write audit events.

#![deny(unsafe_code)]

use register_storage::{AuditQuery, AuditStore, Clock, StorageError};
use register_types::{Actor, AuditAction, AuditDraft, AuditEvent, EntityKind, Issue, IssueId, IssueStatus};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Keys excluded from update diffs: server-assigned, never user-written.
const IMMUTABLE_KEYS: [&str; 3] = ["id", "created_at", "updated_at"];

/// Writer/reader facade over the audit store.
#[derive(Clone)]
pub struct AuditTrail {
    store: Arc<dyn AuditStore>,
    clock: Arc<dyn Clock>,
}

impl AuditTrail {
    pub fn new(store: Arc<dyn AuditStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Append one event, assigning its id and timestamp.
    pub async fn record(&self, draft: AuditDraft) -> Result<AuditEvent, AuditError> {
        Ok(self.store.append_event(draft, self.clock.now()).await?)
    }

    /// Read events newest-first; all populated filters are conjunctive.
    pub async fn query(&self, query: AuditQuery) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(self.store.query_events(query).await?)
    }

    pub async fn count(&self) -> Result<usize, AuditError> {
        Ok(self.store.count_events().await?)
    }

    pub async fn latest_hash(&self) -> Result<Option<String>, AuditError> {
        Ok(self.store.latest_hash().await?)
    }

    /// Check that every stored event links to its predecessor's hash.
    pub async fn is_chain_linked(&self) -> Result<bool, AuditError> {
        let newest_first = self.store.query_events(AuditQuery::default()).await?;
        let mut previous: Option<&str> = None;
        for event in newest_first.iter().rev() {
            if event.previous_hash.as_deref() != previous {
                return Ok(false);
            }
            previous = Some(&event.hash);
        }
        Ok(true)
    }

    pub async fn issue_created(
        &self,
        actor: &Actor,
        issue: &Issue,
    ) -> Result<AuditEvent, AuditError> {
        self.record(AuditDraft {
            actor_id: actor.id(),
            username: actor.username().to_string(),
            action: AuditAction::Created,
            entity: EntityKind::Issue,
            entity_id: Some(issue.id.0),
            details: Some(json!({ "title": issue.title, "status": issue.status })),
        })
        .await
    }

    /// Record an update as a field-level diff of the full serialized
    /// pre- and post-images. Writes nothing when the diff is empty.
    pub async fn issue_updated(
        &self,
        actor: &Actor,
        issue_id: IssueId,
        before: &Issue,
        after: &Issue,
    ) -> Result<Option<AuditEvent>, AuditError> {
        let changes = issue_diff(before, after)?;
        if changes.is_empty() {
            return Ok(None);
        }
        let event = self
            .record(AuditDraft {
                actor_id: actor.id(),
                username: actor.username().to_string(),
                action: AuditAction::Updated,
                entity: EntityKind::Issue,
                entity_id: Some(issue_id.0),
                details: Some(json!({ "changes": changes })),
            })
            .await?;
        Ok(Some(event))
    }

    pub async fn issue_status_changed(
        &self,
        actor: &Actor,
        issue_id: IssueId,
        before: IssueStatus,
        after: IssueStatus,
    ) -> Result<AuditEvent, AuditError> {
        self.record(AuditDraft {
            actor_id: actor.id(),
            username: actor.username().to_string(),
            action: AuditAction::StatusChanged,
            entity: EntityKind::Issue,
            entity_id: Some(issue_id.0),
            details: Some(json!({ "before": before, "after": after })),
        })
        .await
    }

    pub async fn issue_deleted(
        &self,
        actor: &Actor,
        issue: &Issue,
    ) -> Result<AuditEvent, AuditError> {
        self.record(AuditDraft {
            actor_id: actor.id(),
            username: actor.username().to_string(),
            action: AuditAction::Deleted,
            entity: EntityKind::Issue,
            entity_id: Some(issue.id.0),
            details: Some(json!({ "title": issue.title })),
        })
        .await
    }

    pub async fn user_login(&self, actor: &Actor) -> Result<AuditEvent, AuditError> {
        self.session_event(actor, AuditAction::Login).await
    }

    pub async fn user_logout(&self, actor: &Actor) -> Result<AuditEvent, AuditError> {
        self.session_event(actor, AuditAction::Logout).await
    }

    async fn session_event(
        &self,
        actor: &Actor,
        action: AuditAction,
    ) -> Result<AuditEvent, AuditError> {
        self.record(AuditDraft {
            actor_id: actor.id(),
            username: actor.username().to_string(),
            action,
            entity: EntityKind::User,
            entity_id: actor.id().map(|id| id.0),
            details: None,
        })
        .await
    }

    pub async fn user_created(
        &self,
        admin: &Actor,
        created: &Actor,
    ) -> Result<AuditEvent, AuditError> {
        self.record(AuditDraft {
            actor_id: admin.id(),
            username: admin.username().to_string(),
            action: AuditAction::Created,
            entity: EntityKind::User,
            entity_id: created.id().map(|id| id.0),
            details: Some(json!({
                "username": created.username(),
                "role": created.role(),
            })),
        })
        .await
    }

    pub async fn user_updated(
        &self,
        admin: &Actor,
        updated: &Actor,
        changes: Value,
    ) -> Result<AuditEvent, AuditError> {
        self.record(AuditDraft {
            actor_id: admin.id(),
            username: admin.username().to_string(),
            action: AuditAction::Updated,
            entity: EntityKind::User,
            entity_id: updated.id().map(|id| id.0),
            details: Some(json!({
                "username": updated.username(),
                "changes": changes,
            })),
        })
        .await
    }

    pub async fn user_deleted(
        &self,
        admin: &Actor,
        deleted: &Actor,
    ) -> Result<AuditEvent, AuditError> {
        self.record(AuditDraft {
            actor_id: admin.id(),
            username: admin.username().to_string(),
            action: AuditAction::Deleted,
            entity: EntityKind::User,
            entity_id: deleted.id().map(|id| id.0),
            details: Some(json!({ "username": deleted.username() })),
        })
        .await
    }

    pub async fn settings_changed(
        &self,
        actor: &Actor,
        setting: &str,
        before: &str,
        after: &str,
    ) -> Result<AuditEvent, AuditError> {
        self.record(AuditDraft {
            actor_id: actor.id(),
            username: actor.username().to_string(),
            action: AuditAction::Changed,
            entity: EntityKind::Settings,
            entity_id: None,
            details: Some(json!({
                "setting": setting,
                "before": before,
                "after": after,
            })),
        })
        .await
    }
}

/// Field-level diff of two issue images over their full serialized form,
/// as `field -> {before, after}`. Server-assigned keys are skipped, so a
/// persisted-but-unchanged issue diffs to empty.
pub fn issue_diff(before: &Issue, after: &Issue) -> Result<Map<String, Value>, AuditError> {
    let before_value = to_object(before)?;
    let after_value = to_object(after)?;

    let mut changes = Map::new();
    for (key, after_field) in &after_value {
        if IMMUTABLE_KEYS.contains(&key.as_str()) {
            continue;
        }
        let before_field = before_value.get(key).cloned().unwrap_or(Value::Null);
        if before_field != *after_field {
            changes.insert(
                key.clone(),
                json!({ "before": before_field, "after": after_field }),
            );
        }
    }
    Ok(changes)
}

fn to_object(issue: &Issue) -> Result<Map<String, Value>, AuditError> {
    match serde_json::to_value(issue).map_err(|e| AuditError::Serialization(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(AuditError::Serialization(format!(
            "issue serialized to non-object value: {other}"
        ))),
    }
}

/// Audit-related errors.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use register_storage::{FixedClock, InMemoryRegisterStore};
    use register_types::{ActorId, DepartmentScope, RiskLevel, Role};

    fn fixtures() -> (AuditTrail, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        ));
        let store = Arc::new(InMemoryRegisterStore::new());
        (AuditTrail::new(store, clock.clone()), clock)
    }

    fn actor() -> Actor {
        Actor::persisted(
            ActorId(5),
            "jcarter",
            Role::Editor,
            DepartmentScope::unrestricted(),
        )
    }

    fn issue() -> Issue {
        Issue {
            id: IssueId(11),
            title: "Expired TLS certificate".to_string(),
            status: IssueStatus::Open,
            summary: None,
            topic: None,
            identified_by: None,
            owner: Some("N. Okafor".to_string()),
            department: Some("IT".to_string()),
            description: None,
            remediation_action: None,
            risk_description: None,
            risk_level: RiskLevel::High,
            identification_date: None,
            due_date: None,
            follow_up_date: None,
            updates: None,
            closing_date: None,
            supporting_docs: vec![],
            created_at: Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn record_assigns_id_and_clock_timestamp() {
        let (trail, clock) = fixtures();
        let event = trail.issue_created(&actor(), &issue()).await.unwrap();
        assert_eq!(event.id.0, 1);
        assert_eq!(event.timestamp, clock.now());
        assert_eq!(event.username, "jcarter");
        assert_eq!(event.actor_id, Some(ActorId(5)));
        assert_eq!(
            event.details,
            Some(json!({ "title": "Expired TLS certificate", "status": "Open" }))
        );
    }

    #[tokio::test]
    async fn identical_images_write_nothing() {
        let (trail, _clock) = fixtures();
        let subject = issue();
        let event = trail
            .issue_updated(&actor(), subject.id, &subject, &subject)
            .await
            .unwrap();
        assert!(event.is_none());
        assert_eq!(trail.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn diff_captures_auto_set_fields_but_not_timestamps() {
        let before = issue();
        let mut after = before.clone();
        after.status = IssueStatus::Closed;
        after.closing_date = chrono::NaiveDate::from_ymd_opt(2025, 6, 1);
        after.updated_at = before.updated_at + Duration::hours(2);

        let changes = issue_diff(&before, &after).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(
            changes.get("status"),
            Some(&json!({ "before": "Open", "after": "Closed" }))
        );
        assert_eq!(
            changes.get("closing_date"),
            Some(&json!({ "before": null, "after": "2025-06-01" }))
        );
        assert!(!changes.contains_key("updated_at"));
    }

    #[tokio::test]
    async fn status_change_payload_has_before_and_after() {
        let (trail, _clock) = fixtures();
        let event = trail
            .issue_status_changed(&actor(), IssueId(11), IssueStatus::Open, IssueStatus::Closed)
            .await
            .unwrap();
        assert_eq!(event.action, AuditAction::StatusChanged);
        assert_eq!(
            event.details,
            Some(json!({ "before": "Open", "after": "Closed" }))
        );
    }

    #[tokio::test]
    async fn session_events_carry_no_details() {
        let (trail, _clock) = fixtures();
        let login = trail.user_login(&actor()).await.unwrap();
        assert_eq!(login.action, AuditAction::Login);
        assert_eq!(login.entity, EntityKind::User);
        assert_eq!(login.entity_id, Some(5));
        assert_eq!(login.details, None);

        let virtual_admin = Actor::virtual_admin();
        let logout = trail.user_logout(&virtual_admin).await.unwrap();
        assert_eq!(logout.actor_id, None);
        assert_eq!(logout.username, "admin");
    }

    #[tokio::test]
    async fn user_lifecycle_events_attribute_the_admin() {
        let (trail, _clock) = fixtures();
        let admin = Actor::virtual_admin();
        let subject = Actor::persisted(
            ActorId(9),
            "nokafor",
            Role::Restricted,
            DepartmentScope::assigned(["IT"]),
        );

        let created = trail.user_created(&admin, &subject).await.unwrap();
        assert_eq!(created.action, AuditAction::Created);
        assert_eq!(created.entity, EntityKind::User);
        assert_eq!(created.entity_id, Some(9));
        assert_eq!(created.actor_id, None);
        assert_eq!(created.username, "admin");
        assert_eq!(
            created.details,
            Some(json!({ "username": "nokafor", "role": "Restricted" }))
        );

        let updated = trail
            .user_updated(&admin, &subject, json!({ "role": { "before": "Restricted", "after": "Editor" } }))
            .await
            .unwrap();
        assert_eq!(updated.action, AuditAction::Updated);
        assert_eq!(
            updated.details,
            Some(json!({
                "username": "nokafor",
                "changes": { "role": { "before": "Restricted", "after": "Editor" } },
            }))
        );

        let deleted = trail.user_deleted(&admin, &subject).await.unwrap();
        assert_eq!(deleted.action, AuditAction::Deleted);
        assert_eq!(deleted.entity_id, Some(9));
        assert_eq!(deleted.details, Some(json!({ "username": "nokafor" })));
    }

    #[tokio::test]
    async fn chain_stays_linked_across_writes() {
        let (trail, clock) = fixtures();
        trail.issue_created(&actor(), &issue()).await.unwrap();
        clock.advance(Duration::seconds(1));
        trail.issue_deleted(&actor(), &issue()).await.unwrap();
        clock.advance(Duration::seconds(1));
        trail
            .settings_changed(&actor(), "auth_enabled", "false", "true")
            .await
            .unwrap();

        assert!(trail.is_chain_linked().await.unwrap());
        assert_eq!(trail.count().await.unwrap(), 3);
        assert!(trail.latest_hash().await.unwrap().is_some());
    }
}
