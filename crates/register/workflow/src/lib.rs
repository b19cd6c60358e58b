//! Register Workflow - the issue status transition machine.
//!
//! A fixed directed graph gives the role-independent upper bound on legal
//! status changes; Restricted actors are further confined to a subgraph.
//! Self-transitions are treated as no-ops and are always legal.

#![deny(unsafe_code)]

use register_types::{Actor, IssueStatus, Role};

/// Legal targets from the given status, for any role.
pub fn successors(from: IssueStatus) -> &'static [IssueStatus] {
    use IssueStatus::*;
    match from {
        Draft => &[Open],
        Open => &[InProgress, Closed],
        InProgress => &[Open, Remediated, Closed],
        Remediated => &[InProgress, Closed],
        // Closed is terminal.
        Closed => &[],
    }
}

/// Legal targets from the given status for Restricted actors. They can
/// never promote a Draft and never close anything.
pub fn restricted_successors(from: IssueStatus) -> &'static [IssueStatus] {
    use IssueStatus::*;
    match from {
        Open => &[InProgress],
        InProgress => &[Open, Remediated],
        Remediated => &[InProgress],
        Draft | Closed => &[],
    }
}

/// Whether the transition exists in the global graph. A state always
/// transitions to itself.
pub fn is_legal(from: IssueStatus, to: IssueStatus) -> bool {
    from == to || successors(from).contains(&to)
}

/// Whether this actor may move an issue from one status to another.
pub fn can_change_status(actor: &Actor, from: IssueStatus, to: IssueStatus) -> bool {
    if from == to {
        return true;
    }
    match actor.role() {
        Role::Viewer => false,
        Role::Restricted => {
            successors(from).contains(&to) && restricted_successors(from).contains(&to)
        }
        Role::Administrator | Role::Editor => successors(from).contains(&to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use register_types::{ActorId, DepartmentScope};

    fn actor(role: Role) -> Actor {
        Actor::persisted(ActorId(1), "worker", role, DepartmentScope::unrestricted())
    }

    fn any_status() -> impl Strategy<Value = IssueStatus> {
        proptest::sample::select(IssueStatus::ALL.to_vec())
    }

    fn any_role() -> impl Strategy<Value = Role> {
        proptest::sample::select(vec![
            Role::Administrator,
            Role::Editor,
            Role::Restricted,
            Role::Viewer,
        ])
    }

    #[test]
    fn draft_only_opens() {
        assert_eq!(successors(IssueStatus::Draft), &[IssueStatus::Open]);
    }

    #[test]
    fn editors_follow_the_global_graph() {
        let editor = actor(Role::Editor);
        assert!(can_change_status(
            &editor,
            IssueStatus::Draft,
            IssueStatus::Open
        ));
        assert!(can_change_status(
            &editor,
            IssueStatus::Remediated,
            IssueStatus::Closed
        ));
        assert!(!can_change_status(
            &editor,
            IssueStatus::Draft,
            IssueStatus::Closed
        ));
        assert!(!can_change_status(
            &editor,
            IssueStatus::Open,
            IssueStatus::Remediated
        ));
    }

    #[test]
    fn restricted_cannot_promote_drafts_or_close() {
        let restricted = actor(Role::Restricted);
        assert!(can_change_status(
            &restricted,
            IssueStatus::Open,
            IssueStatus::InProgress
        ));
        assert!(can_change_status(
            &restricted,
            IssueStatus::InProgress,
            IssueStatus::Remediated
        ));
        assert!(can_change_status(
            &restricted,
            IssueStatus::Remediated,
            IssueStatus::InProgress
        ));
        assert!(!can_change_status(
            &restricted,
            IssueStatus::Draft,
            IssueStatus::Open
        ));
        assert!(!can_change_status(
            &restricted,
            IssueStatus::InProgress,
            IssueStatus::Closed
        ));
        assert!(!can_change_status(
            &restricted,
            IssueStatus::Remediated,
            IssueStatus::Closed
        ));
    }

    #[test]
    fn viewer_changes_nothing() {
        let viewer = actor(Role::Viewer);
        for from in IssueStatus::ALL {
            for to in IssueStatus::ALL {
                assert_eq!(can_change_status(&viewer, from, to), from == to);
            }
        }
    }

    proptest! {
        #[test]
        fn closed_is_terminal_for_everyone(role in any_role(), to in any_status()) {
            let subject = actor(role);
            let allowed = can_change_status(&subject, IssueStatus::Closed, to);
            prop_assert_eq!(allowed, to == IssueStatus::Closed);
        }

        #[test]
        fn self_transitions_are_always_legal(role in any_role(), status in any_status()) {
            let subject = actor(role);
            prop_assert!(can_change_status(&subject, status, status));
        }

        #[test]
        fn restricted_subgraph_is_contained_in_global(from in any_status(), to in any_status()) {
            let restricted = actor(Role::Restricted);
            let admin = actor(Role::Administrator);
            if can_change_status(&restricted, from, to) {
                prop_assert!(can_change_status(&admin, from, to));
            }
        }
    }
}
