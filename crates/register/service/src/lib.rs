//! Register Service - the mutation orchestrator.
//!
//! Every issue mutation flows through [`IssueService`]: it resolves the
//! actor's capabilities, validates status transitions, applies the change,
//! and records the audit event. Collaborators arrive by injection; the
//! crate holds no global state and takes no locks of its own.

#![deny(unsafe_code)]

use register_audit::{AuditError, AuditTrail};
use register_policy::PolicyResolver;
use register_storage::{ActorStore, Clock, IssueFilter, IssueStore, StorageError};
use register_types::{Actor, Issue, IssueField, IssueId, IssuePatch, IssueStatus, NewIssue};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors. Policy and validation failures are ordinary
/// return values, never panics; nothing is retried.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("field not editable for this actor: {0}")]
    FieldDenied(IssueField),

    #[error("issue {0} not found")]
    NotFound(IssueId),

    #[error("illegal status transition: {from} -> {to}")]
    InvalidTransition { from: IssueStatus, to: IssueStatus },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("audit error: {0}")]
    Audit(#[from] AuditError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Orchestrates issue mutations: capability checks, transition validation,
/// persistence, and audit recording, in that order. The mutation write and
/// the audit write are two sequential calls; the audit is best-effort.
#[derive(Clone)]
pub struct IssueService {
    policy: PolicyResolver,
    issues: Arc<dyn IssueStore>,
    audit: AuditTrail,
    clock: Arc<dyn Clock>,
}

impl IssueService {
    pub fn new(issues: Arc<dyn IssueStore>, audit: AuditTrail, clock: Arc<dyn Clock>) -> Self {
        Self {
            policy: PolicyResolver::new(),
            issues,
            audit,
            clock,
        }
    }

    /// Create an issue on the actor's behalf.
    ///
    /// A draft left at the default status starts in the actor's role
    /// default (Draft for Restricted, Open otherwise), and a missing
    /// `identification_date` defaults to today.
    pub async fn create_issue(&self, actor: &Actor, mut draft: NewIssue) -> ServiceResult<Issue> {
        if !self.policy.can_create_issue(actor) {
            debug!(actor = %actor.username(), "create denied");
            return Err(ServiceError::PermissionDenied("create issue".to_string()));
        }
        if draft.title.trim().is_empty() {
            return Err(ServiceError::Validation(
                "title must not be empty".to_string(),
            ));
        }
        if draft.status == IssueStatus::default() {
            draft.status = self.policy.default_status_for_role(actor);
        }
        if draft.identification_date.is_none() {
            draft.identification_date = Some(self.clock.today());
        }

        let issue = self.issues.create_issue(draft, self.clock.now()).await?;
        info!(issue = %issue.id, actor = %actor.username(), "issue created");
        self.audit.issue_created(actor, &issue).await?;
        Ok(issue)
    }

    /// Apply a typed partial update.
    ///
    /// The patch is all-or-nothing: if any touched field falls outside the
    /// actor's field mask, the whole update is rejected (naming the first
    /// disallowed field in canonical order) and nothing is persisted or
    /// audited. A requested status change is validated against the actor's
    /// transition graph before anything else, so an illegal transition is
    /// reported as such even when the actor could not edit the issue in
    /// its current state.
    pub async fn update_issue(
        &self,
        actor: &Actor,
        id: IssueId,
        patch: IssuePatch,
    ) -> ServiceResult<Issue> {
        let before = self.load(id).await?;

        if let Some(target) = patch.status {
            if !register_workflow::can_change_status(actor, before.status, target) {
                debug!(
                    issue = %id,
                    actor = %actor.username(),
                    from = %before.status,
                    to = %target,
                    "transition denied"
                );
                return Err(ServiceError::InvalidTransition {
                    from: before.status,
                    to: target,
                });
            }
        }

        if !self.policy.can_edit_issue(actor, &before) {
            debug!(issue = %id, actor = %actor.username(), "edit denied");
            return Err(ServiceError::PermissionDenied("edit issue".to_string()));
        }

        let editable = self.policy.editable_fields(actor, &before);
        for field in patch.touched_fields() {
            if !editable.contains(&field) {
                debug!(issue = %id, actor = %actor.username(), %field, "field denied");
                return Err(ServiceError::FieldDenied(field));
            }
        }

        let mut after = before.clone();
        patch.apply_to(&mut after);
        // Stamped whenever the patch asks for Closed, including a
        // Closed -> Closed self-transition after the date was cleared.
        if patch.status == Some(IssueStatus::Closed) && after.closing_date.is_none() {
            after.closing_date = Some(self.clock.today());
        }

        let persisted = self.issues.update_issue(after, self.clock.now()).await?;
        info!(issue = %id, actor = %actor.username(), "issue updated");
        self.audit
            .issue_updated(actor, id, &before, &persisted)
            .await?;
        if persisted.status != before.status {
            self.audit
                .issue_status_changed(actor, id, before.status, persisted.status)
                .await?;
        }
        Ok(persisted)
    }

    /// Delete an issue. Administrator only.
    pub async fn delete_issue(&self, actor: &Actor, id: IssueId) -> ServiceResult<()> {
        if !self.policy.can_delete_issue(actor) {
            debug!(issue = %id, actor = %actor.username(), "delete denied");
            return Err(ServiceError::PermissionDenied("delete issue".to_string()));
        }
        let issue = self.load(id).await?;
        if !self.issues.delete_issue(id).await? {
            return Err(ServiceError::NotFound(id));
        }
        info!(issue = %id, actor = %actor.username(), "issue deleted");
        self.audit.issue_deleted(actor, &issue).await?;
        Ok(())
    }

    /// Fetch one issue. An issue outside the actor's visibility scope is
    /// indistinguishable from a missing one.
    pub async fn get_issue(&self, actor: &Actor, id: IssueId) -> ServiceResult<Issue> {
        let issue = self.load(id).await?;
        if !self.policy.can_view_issue(actor, &issue) {
            return Err(ServiceError::NotFound(id));
        }
        Ok(issue)
    }

    /// List issues matching the filter, restricted to what the actor may see.
    pub async fn list_issues(
        &self,
        actor: &Actor,
        filter: IssueFilter,
    ) -> ServiceResult<Vec<Issue>> {
        let issues = self.issues.list_issues(filter).await?;
        Ok(self.policy.filter_visible(actor, issues))
    }

    /// Append a timestamped, attributed note to the issue's update log.
    pub async fn add_update_note(
        &self,
        actor: &Actor,
        id: IssueId,
        note: &str,
    ) -> ServiceResult<Issue> {
        let note = note.trim();
        if note.is_empty() {
            return Err(ServiceError::Validation("note must not be empty".to_string()));
        }
        let before = self.load(id).await?;
        if !self.policy.can_edit_issue(actor, &before) {
            debug!(issue = %id, actor = %actor.username(), "note denied");
            return Err(ServiceError::PermissionDenied("edit issue".to_string()));
        }

        let stamp = self.clock.now().format("%Y-%m-%d %H:%M");
        let entry = format!("[{stamp}] {}: {note}", actor.username());
        let mut after = before.clone();
        after.updates = Some(match &before.updates {
            Some(existing) => format!("{existing}\n{entry}"),
            None => entry,
        });

        let persisted = self.issues.update_issue(after, self.clock.now()).await?;
        info!(issue = %id, actor = %actor.username(), "update note added");
        self.audit
            .issue_updated(actor, id, &before, &persisted)
            .await?;
        Ok(persisted)
    }

    async fn load(&self, id: IssueId) -> ServiceResult<Issue> {
        self.issues
            .get_issue(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }
}

/// Resolves actors and records session events. Credential verification
/// happens at the caller boundary; this service only maps usernames to
/// actors and writes the login/logout trail.
#[derive(Clone)]
pub struct SessionService {
    actors: Arc<dyn ActorStore>,
    audit: AuditTrail,
}

impl SessionService {
    pub fn new(actors: Arc<dyn ActorStore>, audit: AuditTrail) -> Self {
        Self { actors, audit }
    }

    /// Resolve a username to its persisted actor and record the login.
    pub async fn login(&self, username: &str) -> ServiceResult<Actor> {
        let actor = self
            .actors
            .get_actor_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::UnknownUser(username.to_string()))?;
        info!(actor = %actor.username(), "login");
        self.audit.user_login(&actor).await?;
        Ok(actor)
    }

    pub async fn logout(&self, actor: &Actor) -> ServiceResult<()> {
        info!(actor = %actor.username(), "logout");
        self.audit.user_logout(actor).await?;
        Ok(())
    }

    /// The synthetic Administrator used when authentication is disabled.
    pub fn virtual_admin(&self) -> Actor {
        Actor::virtual_admin()
    }
}
