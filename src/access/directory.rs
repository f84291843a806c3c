//! In-memory actor resolution: member ids to fully resolved [`Actor`]s.

use std::collections::{BTreeSet, HashMap};

use crate::access::errors::AccessError;
use crate::access::types::{Actor, GroupDef, GroupId, MemberDef, MemberId, PERMISSION_ADMIN};

/// Turns a member identifier from the request context into an [`Actor`].
/// `None` means the request carried no authenticated member.
pub trait ActorResolver {
    fn resolve(&self, member: Option<&MemberId>) -> Result<Actor, AccessError>;

    /// Permission codes the member holds through its groups.
    fn permission_codes(&self, member: &MemberId) -> BTreeSet<String>;
}

/// Flat group-membership index built from policy files.
#[derive(Debug, Default)]
pub struct MemberDirectory {
    groups: HashMap<GroupId, GroupDef>,
    members: HashMap<MemberId, MemberDef>,
}

impl MemberDirectory {
    pub fn new(groups: Vec<GroupDef>, members: Vec<MemberDef>) -> Self {
        Self {
            groups: groups.into_iter().map(|g| (g.id.clone(), g)).collect(),
            members: members.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    fn codes_for(&self, member: &MemberDef) -> BTreeSet<String> {
        member
            .groups
            .iter()
            .filter_map(|g| self.groups.get(g))
            .flat_map(|g| g.permissions.iter().cloned())
            .collect()
    }
}

impl ActorResolver for MemberDirectory {
    fn resolve(&self, member: Option<&MemberId>) -> Result<Actor, AccessError> {
        let Some(id) = member else {
            return Ok(Actor::Anonymous);
        };
        let def = self
            .members
            .get(id)
            .ok_or_else(|| AccessError::UnknownMember(id.to_string()))?;

        let is_admin = def.admin || self.codes_for(def).contains(PERMISSION_ADMIN);
        Ok(Actor::Authenticated {
            member_id: def.id.clone(),
            groups: def.groups.clone(),
            is_admin,
        })
    }

    fn permission_codes(&self, member: &MemberId) -> BTreeSet<String> {
        self.members
            .get(member)
            .map(|m| self.codes_for(m))
            .unwrap_or_default()
    }
}
