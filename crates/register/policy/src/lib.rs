//! Register Policy - the capability resolver.
//!
//! Pure functions mapping (actor, issue) to capability decisions and an
//! editable-field set. No side effects, no I/O; every decision is derived
//! from the actor's role and department scope plus the issue at hand.

#![deny(unsafe_code)]

use register_types::{Actor, Issue, IssueField, IssueStatus, Role};
use std::collections::BTreeSet;

/// Fields a Restricted actor may write.
pub const RESTRICTED_EDITABLE_FIELDS: [IssueField; 4] = [
    IssueField::Status,
    IssueField::Updates,
    IssueField::SupportingDocs,
    IssueField::FollowUpDate,
];

/// Stateless capability resolver.
///
/// Capability matrix:
/// - Administrator: full access, the only role that deletes issues or
///   manages users, database configuration, backups, and bulk imports.
/// - Editor: creates and edits everywhere, subject to independent
///   view/edit department scopes.
/// - Restricted: creates drafts, edits a fixed field subset inside its
///   departments, and only while the issue is neither Draft nor Closed.
/// - Viewer: read-only.
#[derive(Clone, Copy, Debug, Default)]
pub struct PolicyResolver;

impl PolicyResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn can_create_issue(&self, actor: &Actor) -> bool {
        actor.role() != Role::Viewer
    }

    pub fn can_view_issue(&self, actor: &Actor, issue: &Issue) -> bool {
        actor.can_access_department(issue.department.as_deref())
    }

    pub fn can_edit_issue(&self, actor: &Actor, issue: &Issue) -> bool {
        match actor.role() {
            Role::Viewer => false,
            Role::Administrator => true,
            Role::Editor => actor.can_edit_department(issue.department.as_deref()),
            Role::Restricted => {
                actor.can_access_department(issue.department.as_deref())
                    && !matches!(issue.status, IssueStatus::Closed | IssueStatus::Draft)
            }
        }
    }

    pub fn can_delete_issue(&self, actor: &Actor) -> bool {
        actor.role() == Role::Administrator
    }

    pub fn can_manage_users(&self, actor: &Actor) -> bool {
        actor.role() == Role::Administrator
    }

    pub fn can_configure_database(&self, actor: &Actor) -> bool {
        actor.role() == Role::Administrator
    }

    pub fn can_import_backup(&self, actor: &Actor) -> bool {
        actor.role() == Role::Administrator
    }

    pub fn can_bulk_import(&self, actor: &Actor) -> bool {
        actor.role() == Role::Administrator
    }

    pub fn can_export_data(&self, _actor: &Actor) -> bool {
        true
    }

    /// The set of fields this actor may write on this issue. Empty when
    /// the actor cannot edit the issue at all.
    pub fn editable_fields(&self, actor: &Actor, issue: &Issue) -> BTreeSet<IssueField> {
        if !self.can_edit_issue(actor, issue) {
            return BTreeSet::new();
        }
        match actor.role() {
            Role::Administrator | Role::Editor => IssueField::ALL.into_iter().collect(),
            Role::Restricted => RESTRICTED_EDITABLE_FIELDS.into_iter().collect(),
            // Unreachable through can_edit_issue, but keep the resolver total.
            Role::Viewer => BTreeSet::new(),
        }
    }

    /// Status a freshly created issue starts in for this actor: Restricted
    /// actors open Drafts, everyone else opens directly.
    pub fn default_status_for_role(&self, actor: &Actor) -> IssueStatus {
        match actor.role() {
            Role::Restricted => IssueStatus::Draft,
            _ => IssueStatus::Open,
        }
    }

    /// Drop issues this actor cannot see.
    pub fn filter_visible(&self, actor: &Actor, issues: Vec<Issue>) -> Vec<Issue> {
        issues
            .into_iter()
            .filter(|issue| self.can_view_issue(actor, issue))
            .collect()
    }
}
