use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::access::errors::AccessError;

/// Opaque group identifier, e.g. "editors".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Member identifier as issued by the authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Permission code granting global rights to every member of a group.
pub const PERMISSION_ADMIN: &str = "ADMIN";
/// Permission code allowing a member to change a site's access configuration.
pub const PERMISSION_EDIT_SITECONFIG: &str = "EDIT_SITECONFIG";

// ---------- Modes ----------

/// Who may view pages on a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Anyone,
    LoggedInUsers,
    OnlyTheseUsers,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Anyone => "Anyone",
            ViewMode::LoggedInUsers => "LoggedInUsers",
            ViewMode::OnlyTheseUsers => "OnlyTheseUsers",
        }
    }
}

impl FromStr for ViewMode {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Anyone" => Ok(ViewMode::Anyone),
            "LoggedInUsers" => Ok(ViewMode::LoggedInUsers),
            "OnlyTheseUsers" => Ok(ViewMode::OnlyTheseUsers),
            other => Err(AccessError::InvalidMode {
                field: "view",
                value: other.to_string(),
                expected: "Anyone, LoggedInUsers, OnlyTheseUsers",
            }),
        }
    }
}

/// Who may edit pages, or create pages at the root of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditMode {
    #[default]
    LoggedInUsers,
    OnlyTheseUsers,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditMode::LoggedInUsers => "LoggedInUsers",
            EditMode::OnlyTheseUsers => "OnlyTheseUsers",
        }
    }

    /// Parse a mode string, naming `field` in the error.
    pub fn parse_for(field: &'static str, s: &str) -> Result<Self, AccessError> {
        match s {
            "LoggedInUsers" => Ok(EditMode::LoggedInUsers),
            "OnlyTheseUsers" => Ok(EditMode::OnlyTheseUsers),
            other => Err(AccessError::InvalidMode {
                field,
                value: other.to_string(),
                expected: "LoggedInUsers, OnlyTheseUsers",
            }),
        }
    }
}

impl FromStr for EditMode {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_for("edit", s)
    }
}

// ---------- Policy ----------

/// Access configuration for one site. Read-only to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub view_mode: ViewMode,
    pub edit_mode: EditMode,
    pub create_top_level_mode: EditMode,
    pub viewer_groups: BTreeSet<GroupId>,
    pub editor_groups: BTreeSet<GroupId>,
    pub creator_groups: BTreeSet<GroupId>,
}

impl PolicyConfig {
    /// Every group id the policy refers to, regardless of mode.
    pub fn referenced_groups(&self) -> impl Iterator<Item = &GroupId> {
        self.viewer_groups
            .iter()
            .chain(self.editor_groups.iter())
            .chain(self.creator_groups.iter())
    }
}

// ---------- Actor ----------

/// A fully resolved requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Anonymous,
    Authenticated {
        member_id: MemberId,
        groups: BTreeSet<GroupId>,
        is_admin: bool,
    },
}

impl Actor {
    pub fn member(
        member_id: impl Into<String>,
        groups: impl IntoIterator<Item = GroupId>,
    ) -> Self {
        Actor::Authenticated {
            member_id: MemberId::new(member_id),
            groups: groups.into_iter().collect(),
            is_admin: false,
        }
    }

    pub fn admin(member_id: impl Into<String>) -> Self {
        Actor::Authenticated {
            member_id: MemberId::new(member_id),
            groups: BTreeSet::new(),
            is_admin: true,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Actor::Authenticated { is_admin: true, .. })
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Authenticated { .. })
    }

    /// True when the actor is authenticated and shares at least one group
    /// with `allowed`. An empty `allowed` set never matches.
    pub fn in_any_group(&self, allowed: &BTreeSet<GroupId>) -> bool {
        match self {
            Actor::Anonymous => false,
            Actor::Authenticated { groups, .. } => !groups.is_disjoint(allowed),
        }
    }
}

// ---------- Capability / Decision ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Capability {
    View,
    Edit,
    CreateTopLevel,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::View,
        Capability::Edit,
        Capability::CreateTopLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::View => "view",
            Capability::Edit => "edit",
            Capability::CreateTopLevel => "create_top_level",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Capability::View),
            "edit" => Ok(Capability::Edit),
            "create_top_level" | "create-top-level" => Ok(Capability::CreateTopLevel),
            other => Err(AccessError::InvalidCapability(other.to_string())),
        }
    }
}

impl TryFrom<String> for Capability {
    type Error = AccessError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Which branch of the evaluation decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Administrator,
    OpenToAnyone,
    LoggedIn,
    GroupMember,
    NotAuthenticated,
    NotInGroup,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Administrator => "administrator",
            Reason::OpenToAnyone => "open_to_anyone",
            Reason::LoggedIn => "logged_in",
            Reason::GroupMember => "group_member",
            Reason::NotAuthenticated => "not_authenticated",
            Reason::NotInGroup => "not_in_group",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub decision: Decision,
    pub reason: Reason,
}

impl Evaluation {
    pub(crate) fn allow(reason: Reason) -> Self {
        Self {
            decision: Decision::Allow,
            reason,
        }
    }

    pub(crate) fn deny(reason: Reason) -> Self {
        Self {
            decision: Decision::Deny,
            reason,
        }
    }
}

// ---------- Directory records ----------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupDef {
    pub id: GroupId,
    pub permissions: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberDef {
    pub id: MemberId,
    pub groups: BTreeSet<GroupId>,
    /// Direct administrator flag, independent of group permissions.
    pub admin: bool,
}

/// Intermediate result from parsing a single KDL file.
#[derive(Debug, Clone, Default)]
pub struct ParsedPolicy {
    pub sites: Vec<crate::site::SiteConfig>,
    pub groups: Vec<GroupDef>,
    pub members: Vec<MemberDef>,
}

// ---------- API request/response types ----------

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Site id; the configured default site when omitted
    #[serde(default)]
    pub site: Option<String>,
    /// Member id; anonymous when omitted
    #[serde(default)]
    pub member: Option<String>,
    /// view, edit or create_top_level; parsed by the handler
    pub capability: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
    pub reason: Reason,
}

#[derive(Debug, Deserialize)]
pub struct ManageQuery {
    #[serde(default)]
    pub member: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManageResponse {
    pub allowed: bool,
}
