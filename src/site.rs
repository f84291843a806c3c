//! Sitewide settings records and the theme catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::access::errors::AccessError;
use crate::access::types::PolicyConfig;

pub const DEFAULT_TITLE: &str = "Your Site Name";
pub const DEFAULT_TAGLINE: &str = "your tagline here";

/// Settings and access policy for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub id: String,
    pub title: String,
    pub tagline: String,
    /// Theme name; `None` means the default theme
    pub theme: Option<String>,
    pub policy: PolicyConfig,
}

impl SiteConfig {
    /// Default record used when a site has no configuration of its own.
    pub fn with_defaults(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            tagline: DEFAULT_TAGLINE.to_string(),
            theme: None,
            policy: PolicyConfig::default(),
        }
    }
}

/// Installed themes plus an explicit set of disabled ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCatalog {
    #[serde(default)]
    pub installed: BTreeSet<String>,
    #[serde(default)]
    pub disabled: BTreeSet<String>,
}

impl ThemeCatalog {
    pub fn new(
        installed: impl IntoIterator<Item = String>,
        disabled: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            installed: installed.into_iter().collect(),
            disabled: disabled.into_iter().collect(),
        }
    }

    pub fn disable(&mut self, theme: impl Into<String>) {
        self.disabled.insert(theme.into());
    }

    /// Installed themes that are not disabled, in name order.
    pub fn available(&self) -> Vec<String> {
        self.installed.difference(&self.disabled).cloned().collect()
    }

    pub fn is_available(&self, theme: &str) -> bool {
        self.installed.contains(theme) && !self.disabled.contains(theme)
    }

    /// A site naming no theme always passes; a named theme must be available.
    pub fn check_site(&self, site: &SiteConfig) -> Result<(), AccessError> {
        match site.theme.as_deref() {
            Some(theme) if !self.is_available(theme) => Err(AccessError::UnavailableTheme {
                site: site.id.clone(),
                theme: theme.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::types::{EditMode, ViewMode};

    #[test]
    fn test_site_defaults() {
        let site = SiteConfig::with_defaults("main");
        assert_eq!(site.id, "main");
        assert_eq!(site.title, "Your Site Name");
        assert_eq!(site.tagline, "your tagline here");
        assert!(site.theme.is_none());
        assert_eq!(site.policy.view_mode, ViewMode::Anyone);
        assert_eq!(site.policy.edit_mode, EditMode::LoggedInUsers);
    }

    #[test]
    fn test_disabled_themes_are_not_available() {
        let mut catalog = ThemeCatalog::new(
            ["simple", "blackcandy", "tutorial"].map(String::from),
            ["tutorial".to_string()],
        );
        assert_eq!(catalog.available(), vec!["blackcandy", "simple"]);

        catalog.disable("blackcandy");
        assert_eq!(catalog.available(), vec!["simple"]);
        assert!(catalog.is_available("simple"));
        assert!(!catalog.is_available("blackcandy"));
        // Disabling something that is not installed changes nothing
        catalog.disable("ghost");
        assert!(!catalog.is_available("ghost"));
        assert_eq!(catalog.available(), vec!["simple"]);
    }

    #[test]
    fn test_check_site_theme() {
        let catalog = ThemeCatalog::new(
            ["simple", "tutorial"].map(String::from),
            ["tutorial".to_string()],
        );
        let mut site = SiteConfig::with_defaults("main");
        assert!(catalog.check_site(&site).is_ok());

        site.theme = Some("simple".into());
        assert!(catalog.check_site(&site).is_ok());

        site.theme = Some("tutorial".into());
        let err = catalog.check_site(&site).unwrap_err();
        assert!(matches!(
            err,
            AccessError::UnavailableTheme { ref site, ref theme } if site == "main" && theme == "tutorial"
        ));

        site.theme = Some("ghost".into());
        assert!(matches!(
            catalog.check_site(&site),
            Err(AccessError::UnavailableTheme { .. })
        ));
    }
}
