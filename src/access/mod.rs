pub mod directory;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod policy;
pub mod types;
pub mod web;

use std::borrow::Cow;
use std::collections::HashMap;

use crate::site::SiteConfig;
use directory::MemberDirectory;

/// Fully compiled access state, loaded from KDL policy files.
/// Immutable after construction; configuration changes require a service reload.
#[derive(Debug, Default)]
pub struct AccessState {
    /// site id -> settings and policy
    pub sites: HashMap<String, SiteConfig>,
    /// Groups and members, used for actor resolution
    pub directory: MemberDirectory,
}

impl AccessState {
    pub fn site(&self, id: &str) -> Option<&SiteConfig> {
        self.sites.get(id)
    }

    /// The configured site, or a default record carrying `id` when none exists.
    pub fn current_site(&self, id: &str) -> Cow<'_, SiteConfig> {
        match self.sites.get(id) {
            Some(site) => Cow::Borrowed(site),
            None => Cow::Owned(SiteConfig::with_defaults(id)),
        }
    }
}
