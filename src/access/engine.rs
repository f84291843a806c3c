use std::collections::BTreeSet;

use crate::access::types::{
    Actor, Capability, Decision, EditMode, Evaluation, GroupId, PolicyConfig, Reason, ViewMode,
    PERMISSION_EDIT_SITECONFIG,
};

/// Decide whether `actor` may exercise `capability` under `policy`.
///
/// Pure: no I/O, no caching, inputs are only read. Never fails.
pub fn evaluate(policy: &PolicyConfig, actor: &Actor, capability: Capability) -> Decision {
    explain(policy, actor, capability).decision
}

/// Same decision as [`evaluate`], plus the branch that produced it.
pub fn explain(policy: &PolicyConfig, actor: &Actor, capability: Capability) -> Evaluation {
    // Administrators bypass every site-level restriction
    if actor.is_admin() {
        return Evaluation::allow(Reason::Administrator);
    }

    match capability {
        Capability::View => match policy.view_mode {
            ViewMode::Anyone => Evaluation::allow(Reason::OpenToAnyone),
            ViewMode::LoggedInUsers => logged_in(actor),
            ViewMode::OnlyTheseUsers => group_member(actor, &policy.viewer_groups),
        },
        Capability::Edit => restricted(policy.edit_mode, actor, &policy.editor_groups),
        Capability::CreateTopLevel => restricted(
            policy.create_top_level_mode,
            actor,
            &policy.creator_groups,
        ),
    }
}

/// Whether `actor` may change the access configuration of a site.
/// `permission_codes` are the codes held through the actor's groups.
pub fn can_manage_site_config(actor: &Actor, permission_codes: &BTreeSet<String>) -> bool {
    actor.is_admin()
        || (actor.is_authenticated() && permission_codes.contains(PERMISSION_EDIT_SITECONFIG))
}

fn restricted(mode: EditMode, actor: &Actor, groups: &BTreeSet<GroupId>) -> Evaluation {
    match mode {
        EditMode::LoggedInUsers => logged_in(actor),
        EditMode::OnlyTheseUsers => group_member(actor, groups),
    }
}

fn logged_in(actor: &Actor) -> Evaluation {
    if actor.is_authenticated() {
        Evaluation::allow(Reason::LoggedIn)
    } else {
        Evaluation::deny(Reason::NotAuthenticated)
    }
}

fn group_member(actor: &Actor, groups: &BTreeSet<GroupId>) -> Evaluation {
    if !actor.is_authenticated() {
        Evaluation::deny(Reason::NotAuthenticated)
    } else if actor.in_any_group(groups) {
        Evaluation::allow(Reason::GroupMember)
    } else {
        Evaluation::deny(Reason::NotInGroup)
    }
}
