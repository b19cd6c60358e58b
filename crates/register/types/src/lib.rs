//! Register Types - the shared data model for the issue register core.
//!
//! Every other crate in the workspace builds on these types: actors and
//! their department scope, issues and their typed patches, and the audit
//! event vocabulary.

#![deny(unsafe_code)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub i64);
impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IssueId(pub i64);
impl std::fmt::Display for IssueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuditEventId(pub i64);
impl std::fmt::Display for AuditEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access roles, from broadest to narrowest write authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Editor,
    Restricted,
    Viewer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Administrator => "Administrator",
            Role::Editor => "Editor",
            Role::Restricted => "Restricted",
            Role::Viewer => "Viewer",
        };
        write!(f, "{name}")
    }
}

/// Department scoping attached to a persisted actor.
///
/// An empty set means "unrestricted" for that dimension. `departments` is
/// read by Restricted and Viewer roles; `view_departments` and
/// `edit_departments` are read independently by the Editor role.
/// Administrators ignore all three.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentScope {
    pub departments: BTreeSet<String>,
    pub view_departments: BTreeSet<String>,
    pub edit_departments: BTreeSet<String>,
}

impl DepartmentScope {
    /// Scope for Restricted/Viewer actors limited to the given departments.
    pub fn assigned<I, S>(departments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            departments: departments.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Scope for Editor actors with independent view and edit sets.
    pub fn editor<I, J, S>(view: I, edit: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            departments: BTreeSet::new(),
            view_departments: view.into_iter().map(Into::into).collect(),
            edit_departments: edit.into_iter().map(Into::into).collect(),
        }
    }

    /// No restriction on any dimension.
    pub fn unrestricted() -> Self {
        Self::default()
    }
}

/// The identity performing an operation.
///
/// `Synthetic` is the virtual administrator used when authentication is
/// disabled; it carries no persisted id and no department scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    Persisted {
        id: ActorId,
        username: String,
        role: Role,
        scope: DepartmentScope,
    },
    Synthetic {
        username: String,
        role: Role,
    },
}

impl Actor {
    pub fn persisted(
        id: ActorId,
        username: impl Into<String>,
        role: Role,
        scope: DepartmentScope,
    ) -> Self {
        Actor::Persisted {
            id,
            username: username.into(),
            role,
            scope,
        }
    }

    /// The virtual administrator used when authentication is disabled.
    pub fn virtual_admin() -> Self {
        Actor::Synthetic {
            username: "admin".to_string(),
            role: Role::Administrator,
        }
    }

    pub fn id(&self) -> Option<ActorId> {
        match self {
            Actor::Persisted { id, .. } => Some(*id),
            Actor::Synthetic { .. } => None,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Actor::Persisted { username, .. } | Actor::Synthetic { username, .. } => username,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Persisted { role, .. } | Actor::Synthetic { role, .. } => *role,
        }
    }

    /// The department set that bounds this actor's visibility, if any.
    fn view_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Actor::Synthetic { .. } => None,
            Actor::Persisted { role, scope, .. } => match role {
                Role::Administrator => None,
                Role::Editor => Some(&scope.view_departments),
                Role::Restricted | Role::Viewer => Some(&scope.departments),
            },
        }
    }

    /// The department set that bounds this actor's editability, if any.
    /// `None` means unbounded; Viewers have no edit authority at all.
    fn edit_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Actor::Synthetic { .. } => None,
            Actor::Persisted { role, scope, .. } => match role {
                Role::Administrator | Role::Viewer => None,
                Role::Editor => Some(&scope.edit_departments),
                Role::Restricted => Some(&scope.departments),
            },
        }
    }

    /// Whether this actor may see issues in the given department.
    ///
    /// An issue without a department is visible to everyone; an empty
    /// scope set means unrestricted.
    pub fn can_access_department(&self, department: Option<&str>) -> bool {
        match (self.view_set(), department) {
            (None, _) => true,
            (Some(set), _) if set.is_empty() => true,
            (Some(_), None) => true,
            (Some(set), Some(dept)) => set.contains(dept),
        }
    }

    /// Whether this actor may edit issues in the given department.
    pub fn can_edit_department(&self, department: Option<&str>) -> bool {
        if self.role() == Role::Viewer {
            return false;
        }
        match (self.edit_set(), department) {
            (None, _) => true,
            (Some(set), _) if set.is_empty() => true,
            (Some(_), None) => true,
            (Some(set), Some(dept)) => set.contains(dept),
        }
    }
}

/// Issue workflow states. `Closed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueStatus {
    Draft,
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Remediated,
    Closed,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 5] = [
        IssueStatus::Draft,
        IssueStatus::Open,
        IssueStatus::InProgress,
        IssueStatus::Remediated,
        IssueStatus::Closed,
    ];

    pub fn is_terminal(self) -> bool {
        self == IssueStatus::Closed
    }
}

impl Default for IssueStatus {
    fn default() -> Self {
        IssueStatus::Draft
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IssueStatus::Draft => "Draft",
            IssueStatus::Open => "Open",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Remediated => "Remediated",
            IssueStatus::Closed => "Closed",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::None,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
    ];
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskLevel::None => "None",
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        write!(f, "{name}")
    }
}

/// A tracked issue record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    pub status: IssueStatus,
    pub summary: Option<String>,
    pub topic: Option<String>,
    pub identified_by: Option<String>,
    pub owner: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub remediation_action: Option<String>,
    pub risk_description: Option<String>,
    pub risk_level: RiskLevel,
    pub identification_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub follow_up_date: Option<NaiveDate>,
    pub updates: Option<String>,
    pub closing_date: Option<NaiveDate>,
    pub supporting_docs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            IssueStatus::Open | IssueStatus::InProgress | IssueStatus::Remediated
        )
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if self.status == IssueStatus::Closed {
            return false;
        }
        self.due_date.is_some_and(|due| due < today)
    }
}

/// Payload for creating a new issue. Id and timestamps are assigned by the
/// store at persist time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub status: IssueStatus,
    pub summary: Option<String>,
    pub topic: Option<String>,
    pub identified_by: Option<String>,
    pub owner: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub remediation_action: Option<String>,
    pub risk_description: Option<String>,
    pub risk_level: RiskLevel,
    pub identification_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub follow_up_date: Option<NaiveDate>,
    pub updates: Option<String>,
    pub closing_date: Option<NaiveDate>,
    pub supporting_docs: Vec<String>,
}

impl NewIssue {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Materialize a full issue record with store-assigned id and timestamps.
    pub fn into_issue(self, id: IssueId, created_at: DateTime<Utc>) -> Issue {
        Issue {
            id,
            title: self.title,
            status: self.status,
            summary: self.summary,
            topic: self.topic,
            identified_by: self.identified_by,
            owner: self.owner,
            department: self.department,
            description: self.description,
            remediation_action: self.remediation_action,
            risk_description: self.risk_description,
            risk_level: self.risk_level,
            identification_date: self.identification_date,
            due_date: self.due_date,
            follow_up_date: self.follow_up_date,
            updates: self.updates,
            closing_date: self.closing_date,
            supporting_docs: self.supporting_docs,
            created_at,
            updated_at: created_at,
        }
    }
}

/// The writable issue fields, in canonical order.
///
/// The canonical order decides which field name an all-or-nothing update
/// rejection reports when several requested fields are disallowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueField {
    Title,
    Status,
    Summary,
    Topic,
    IdentifiedBy,
    Owner,
    Department,
    Description,
    RemediationAction,
    RiskDescription,
    RiskLevel,
    IdentificationDate,
    DueDate,
    FollowUpDate,
    Updates,
    ClosingDate,
    SupportingDocs,
}

impl IssueField {
    pub const ALL: [IssueField; 17] = [
        IssueField::Title,
        IssueField::Status,
        IssueField::Summary,
        IssueField::Topic,
        IssueField::IdentifiedBy,
        IssueField::Owner,
        IssueField::Department,
        IssueField::Description,
        IssueField::RemediationAction,
        IssueField::RiskDescription,
        IssueField::RiskLevel,
        IssueField::IdentificationDate,
        IssueField::DueDate,
        IssueField::FollowUpDate,
        IssueField::Updates,
        IssueField::ClosingDate,
        IssueField::SupportingDocs,
    ];

    /// The serialized name of the field, matching `Issue`'s serde output.
    pub fn name(self) -> &'static str {
        match self {
            IssueField::Title => "title",
            IssueField::Status => "status",
            IssueField::Summary => "summary",
            IssueField::Topic => "topic",
            IssueField::IdentifiedBy => "identified_by",
            IssueField::Owner => "owner",
            IssueField::Department => "department",
            IssueField::Description => "description",
            IssueField::RemediationAction => "remediation_action",
            IssueField::RiskDescription => "risk_description",
            IssueField::RiskLevel => "risk_level",
            IssueField::IdentificationDate => "identification_date",
            IssueField::DueDate => "due_date",
            IssueField::FollowUpDate => "follow_up_date",
            IssueField::Updates => "updates",
            IssueField::ClosingDate => "closing_date",
            IssueField::SupportingDocs => "supporting_docs",
        }
    }
}

impl std::fmt::Display for IssueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A change to one nullable field: leave it alone, set a value, or null it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T: Clone> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    pub fn apply(&self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Set(value) => *slot = Some(value.clone()),
            Patch::Clear => *slot = None,
        }
    }
}

/// A typed partial update for an issue.
///
/// Required fields use `Option` (absent = unchanged); nullable fields use
/// [`Patch`] so "not in the request" and "explicitly cleared" stay distinct.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub status: Option<IssueStatus>,
    pub summary: Patch<String>,
    pub topic: Patch<String>,
    pub identified_by: Patch<String>,
    pub owner: Patch<String>,
    pub department: Patch<String>,
    pub description: Patch<String>,
    pub remediation_action: Patch<String>,
    pub risk_description: Patch<String>,
    pub risk_level: Option<RiskLevel>,
    pub identification_date: Patch<NaiveDate>,
    pub due_date: Patch<NaiveDate>,
    pub follow_up_date: Patch<NaiveDate>,
    pub updates: Patch<String>,
    pub closing_date: Patch<NaiveDate>,
    pub supporting_docs: Option<Vec<String>>,
}

impl IssuePatch {
    /// The fields this patch touches, in canonical order.
    pub fn touched_fields(&self) -> Vec<IssueField> {
        let mut fields = Vec::new();
        let mut touch = |touched: bool, field: IssueField| {
            if touched {
                fields.push(field);
            }
        };
        touch(self.title.is_some(), IssueField::Title);
        touch(self.status.is_some(), IssueField::Status);
        touch(!self.summary.is_keep(), IssueField::Summary);
        touch(!self.topic.is_keep(), IssueField::Topic);
        touch(!self.identified_by.is_keep(), IssueField::IdentifiedBy);
        touch(!self.owner.is_keep(), IssueField::Owner);
        touch(!self.department.is_keep(), IssueField::Department);
        touch(!self.description.is_keep(), IssueField::Description);
        touch(
            !self.remediation_action.is_keep(),
            IssueField::RemediationAction,
        );
        touch(
            !self.risk_description.is_keep(),
            IssueField::RiskDescription,
        );
        touch(self.risk_level.is_some(), IssueField::RiskLevel);
        touch(
            !self.identification_date.is_keep(),
            IssueField::IdentificationDate,
        );
        touch(!self.due_date.is_keep(), IssueField::DueDate);
        touch(!self.follow_up_date.is_keep(), IssueField::FollowUpDate);
        touch(!self.updates.is_keep(), IssueField::Updates);
        touch(!self.closing_date.is_keep(), IssueField::ClosingDate);
        touch(self.supporting_docs.is_some(), IssueField::SupportingDocs);
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.touched_fields().is_empty()
    }

    /// Apply every touched field to the given issue in place.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(title) = &self.title {
            issue.title = title.clone();
        }
        if let Some(status) = self.status {
            issue.status = status;
        }
        self.summary.apply(&mut issue.summary);
        self.topic.apply(&mut issue.topic);
        self.identified_by.apply(&mut issue.identified_by);
        self.owner.apply(&mut issue.owner);
        self.department.apply(&mut issue.department);
        self.description.apply(&mut issue.description);
        self.remediation_action.apply(&mut issue.remediation_action);
        self.risk_description.apply(&mut issue.risk_description);
        if let Some(risk_level) = self.risk_level {
            issue.risk_level = risk_level;
        }
        self.identification_date
            .apply(&mut issue.identification_date);
        self.due_date.apply(&mut issue.due_date);
        self.follow_up_date.apply(&mut issue.follow_up_date);
        self.updates.apply(&mut issue.updates);
        self.closing_date.apply(&mut issue.closing_date);
        if let Some(docs) = &self.supporting_docs {
            issue.supporting_docs = docs.clone();
        }
    }
}

/// Actions recorded in the audit trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    StatusChanged,
    Deleted,
    Login,
    Logout,
    Changed,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::StatusChanged => "status_changed",
            AuditAction::Deleted => "deleted",
            AuditAction::Login => "login",
            AuditAction::Logout => "logout",
            AuditAction::Changed => "changed",
        };
        write!(f, "{name}")
    }
}

/// Kinds of entities an audit event may refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Issue,
    User,
    Settings,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Issue => "issue",
            EntityKind::User => "user",
            EntityKind::Settings => "settings",
        };
        write!(f, "{name}")
    }
}

/// The input to the audit writer. Id, timestamp, and chain hash are
/// assigned at append time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditDraft {
    pub actor_id: Option<ActorId>,
    /// Captured at write time so historical display survives actor deletion.
    pub username: String,
    pub action: AuditAction,
    pub entity: EntityKind,
    pub entity_id: Option<i64>,
    pub details: Option<serde_json::Value>,
}

/// One immutable entry in the audit trail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub actor_id: Option<ActorId>,
    pub username: String,
    pub action: AuditAction,
    pub entity: EntityKind,
    pub entity_id: Option<i64>,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_hash: Option<String>,
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(department: Option<&str>, status: IssueStatus) -> Issue {
        Issue {
            id: IssueId(1),
            title: "Stale access reviews".to_string(),
            status,
            summary: None,
            topic: None,
            identified_by: None,
            owner: None,
            department: department.map(str::to_string),
            description: None,
            remediation_action: None,
            risk_description: None,
            risk_level: RiskLevel::Medium,
            identification_date: None,
            due_date: None,
            follow_up_date: None,
            updates: None,
            closing_date: None,
            supporting_docs: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_scope_means_unrestricted() {
        let actor = Actor::persisted(
            ActorId(1),
            "rwalker",
            Role::Restricted,
            DepartmentScope::unrestricted(),
        );
        assert!(actor.can_access_department(Some("IT")));
        assert!(actor.can_edit_department(Some("Finance")));
    }

    #[test]
    fn null_department_is_always_in_scope() {
        let actor = Actor::persisted(
            ActorId(1),
            "rwalker",
            Role::Restricted,
            DepartmentScope::assigned(["IT"]),
        );
        assert!(actor.can_access_department(None));
        assert!(!actor.can_access_department(Some("Finance")));
    }

    #[test]
    fn editor_scopes_view_and_edit_independently() {
        let actor = Actor::persisted(
            ActorId(2),
            "ebishop",
            Role::Editor,
            DepartmentScope::editor(["IT", "Finance"], ["Finance"]),
        );
        assert!(actor.can_access_department(Some("IT")));
        assert!(!actor.can_edit_department(Some("IT")));
        assert!(actor.can_edit_department(Some("Finance")));
        assert!(!actor.can_access_department(Some("HR")));
    }

    #[test]
    fn viewer_never_edits_any_department() {
        let actor = Actor::persisted(
            ActorId(3),
            "vlee",
            Role::Viewer,
            DepartmentScope::unrestricted(),
        );
        assert!(!actor.can_edit_department(None));
        assert!(!actor.can_edit_department(Some("IT")));
    }

    #[test]
    fn virtual_admin_has_no_id_and_full_access() {
        let admin = Actor::virtual_admin();
        assert_eq!(admin.id(), None);
        assert_eq!(admin.role(), Role::Administrator);
        assert_eq!(admin.username(), "admin");
        assert!(admin.can_access_department(Some("IT")));
        assert!(admin.can_edit_department(Some("IT")));
    }

    #[test]
    fn status_display_matches_stored_strings() {
        assert_eq!(IssueStatus::InProgress.to_string(), "In Progress");
        let json = serde_json::to_string(&IssueStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn patch_distinguishes_absent_from_cleared() {
        let mut target = issue(Some("IT"), IssueStatus::Open);
        target.owner = Some("J. Carter".to_string());
        target.topic = Some("Access".to_string());

        let patch = IssuePatch {
            owner: Patch::Clear,
            ..IssuePatch::default()
        };
        assert_eq!(patch.touched_fields(), vec![IssueField::Owner]);

        patch.apply_to(&mut target);
        assert_eq!(target.owner, None);
        assert_eq!(target.topic.as_deref(), Some("Access"));
    }

    #[test]
    fn touched_fields_follow_canonical_order() {
        let patch = IssuePatch {
            supporting_docs: Some(vec!["evidence.pdf".to_string()]),
            title: Some("Renamed".to_string()),
            status: Some(IssueStatus::Open),
            ..IssuePatch::default()
        };
        assert_eq!(
            patch.touched_fields(),
            vec![
                IssueField::Title,
                IssueField::Status,
                IssueField::SupportingDocs
            ]
        );
    }

    #[test]
    fn only_mid_workflow_statuses_are_active() {
        for status in IssueStatus::ALL {
            let active = issue(None, status).is_active();
            assert_eq!(
                active,
                matches!(
                    status,
                    IssueStatus::Open | IssueStatus::InProgress | IssueStatus::Remediated
                ),
                "unexpected is_active for {status}"
            );
        }
    }

    #[test]
    fn overdue_ignores_closed_issues() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut subject = issue(None, IssueStatus::Open);
        subject.due_date = NaiveDate::from_ymd_opt(2025, 5, 1);
        assert!(subject.is_overdue(today));

        subject.status = IssueStatus::Closed;
        assert!(!subject.is_overdue(today));
    }

    #[test]
    fn field_names_match_issue_serialization() {
        let value = serde_json::to_value(issue(Some("IT"), IssueStatus::Open)).unwrap();
        let object = value.as_object().unwrap();
        for field in IssueField::ALL {
            assert!(object.contains_key(field.name()), "missing {field}");
        }
    }
}
