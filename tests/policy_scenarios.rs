mod helpers;

use std::path::Path;

use helpers::{MemberBuilder, PolicyDir, SiteBuilder};
use sitegate::access::directory::ActorResolver;
use sitegate::access::errors::AccessError;
use sitegate::access::loader::load_policies;
use sitegate::access::AccessState;
use sitegate::{can_manage_site_config, evaluate, Capability, Decision, MemberId};

fn decide(state: &AccessState, site: &str, member: Option<&str>, capability: Capability) -> Decision {
    let member = member.map(MemberId::new);
    let actor = state
        .directory
        .resolve(member.as_ref())
        .expect("Failed to resolve member");
    evaluate(&state.current_site(site).policy, &actor, capability)
}

fn editors_only_site() -> PolicyDir {
    PolicyDir::new()
        .groups("groups.kdl", &["Editors", "Writers"])
        .members(
            "members.kdl",
            &[
                MemberBuilder::new("7").in_groups(&["Editors", "Writers"]),
                MemberBuilder::new("9").in_groups(&["Writers"]),
                MemberBuilder::new("1").admin(),
            ],
        )
        .site(
            "main.kdl",
            SiteBuilder::new("main")
                .title("Editorial")
                .view("OnlyTheseUsers", &["Editors"])
                .edit("LoggedInUsers", &[]),
        )
}

#[test]
fn editor_may_view_restricted_site() {
    let state = editors_only_site().load();
    assert_eq!(decide(&state, "main", Some("7"), Capability::View), Decision::Allow);
}

#[test]
fn writer_may_not_view_restricted_site() {
    let state = editors_only_site().load();
    assert_eq!(decide(&state, "main", Some("9"), Capability::View), Decision::Deny);
    assert_eq!(decide(&state, "main", None, Capability::View), Decision::Deny);
}

#[test]
fn anonymous_may_not_edit_logged_in_site() {
    let state = editors_only_site().load();
    assert_eq!(decide(&state, "main", None, Capability::Edit), Decision::Deny);
    assert_eq!(decide(&state, "main", Some("9"), Capability::Edit), Decision::Allow);
}

#[test]
fn admin_member_bypasses_every_restriction() {
    let state = editors_only_site().load();
    for capability in Capability::ALL {
        assert_eq!(decide(&state, "main", Some("1"), capability), Decision::Allow);
    }
}

#[test]
fn unconfigured_site_uses_default_policy() {
    let state = editors_only_site().load();
    assert_eq!(decide(&state, "blog", None, Capability::View), Decision::Allow);
    assert_eq!(decide(&state, "blog", None, Capability::CreateTopLevel), Decision::Deny);
    assert_eq!(decide(&state, "blog", Some("9"), Capability::CreateTopLevel), Decision::Allow);
}

#[test]
fn top_level_creation_needs_a_creator_group() {
    let state = PolicyDir::new()
        .groups("groups.kdl", &["G3", "G4"])
        .members(
            "members.kdl",
            &[
                MemberBuilder::new("30").in_groups(&["G3", "G4"]),
                MemberBuilder::new("40").in_groups(&["G4"]),
            ],
        )
        .site(
            "main.kdl",
            SiteBuilder::new("main").create_top_level("OnlyTheseUsers", &["G3"]),
        )
        .load();

    assert_eq!(decide(&state, "main", Some("30"), Capability::CreateTopLevel), Decision::Allow);
    assert_eq!(decide(&state, "main", Some("40"), Capability::CreateTopLevel), Decision::Deny);
}

#[test]
fn empty_editor_groups_lock_out_non_admins() {
    let state = PolicyDir::new()
        .groups("groups.kdl", &["Writers"])
        .members(
            "members.kdl",
            &[
                MemberBuilder::new("9").in_groups(&["Writers"]),
                MemberBuilder::new("1").admin(),
            ],
        )
        .site("main.kdl", SiteBuilder::new("main").edit("OnlyTheseUsers", &[]))
        .load();

    assert_eq!(decide(&state, "main", Some("9"), Capability::Edit), Decision::Deny);
    assert_eq!(decide(&state, "main", None, Capability::Edit), Decision::Deny);
    assert_eq!(decide(&state, "main", Some("1"), Capability::Edit), Decision::Allow);
}

#[test]
fn unknown_mode_is_rejected_at_load() {
    let dir = PolicyDir::new().file("main.kdl", "site \"main\" {\n    edit \"Anyone\"\n}\n");
    let err = load_policies(dir.path()).unwrap_err();
    assert!(matches!(err, AccessError::InvalidMode { field: "edit", .. }));
}

#[test]
fn undeclared_group_is_rejected_at_load() {
    let dir = PolicyDir::new().site(
        "main.kdl",
        SiteBuilder::new("main").view("OnlyTheseUsers", &["Nobody"]),
    );
    let err = load_policies(dir.path()).unwrap_err();
    assert!(matches!(err, AccessError::UndefinedGroup(ref g) if g == "Nobody"));
}

#[test]
fn unknown_member_fails_resolution() {
    let state = editors_only_site().load();
    let err = state
        .directory
        .resolve(Some(&MemberId::new("404")))
        .unwrap_err();
    assert!(matches!(err, AccessError::UnknownMember(_)));
}

#[test]
fn bundled_policies_load() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("policies");
    let state = load_policies(&dir).expect("Failed to load bundled policies");

    let main = state.site("main").expect("main site missing");
    assert_eq!(main.theme.as_deref(), Some("simple"));

    assert_eq!(decide(&state, "main", Some("7"), Capability::View), Decision::Allow);
    assert_eq!(decide(&state, "main", Some("9"), Capability::View), Decision::Deny);
    assert_eq!(decide(&state, "main", Some("1"), Capability::CreateTopLevel), Decision::Allow);

    let manager = MemberId::new("3");
    let actor = state.directory.resolve(Some(&manager)).unwrap();
    assert!(can_manage_site_config(&actor, &state.directory.permission_codes(&manager)));

    let writer = MemberId::new("9");
    let actor = state.directory.resolve(Some(&writer)).unwrap();
    assert!(!can_manage_site_config(&actor, &state.directory.permission_codes(&writer)));
}
