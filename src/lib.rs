//! Sitegate - sitewide access policy service
//!
//! Decides who may view pages, edit pages and create top-level pages on a
//! site, from per-site policies and group memberships loaded out of KDL files.
//! It exposes all modules for testing purposes.

pub mod access;
pub mod settings;
pub mod site;
pub mod web;

pub use access::engine::{can_manage_site_config, evaluate, explain};
pub use access::types::{
    Actor, Capability, Decision, EditMode, Evaluation, GroupId, MemberId, PolicyConfig, Reason,
    ViewMode,
};
