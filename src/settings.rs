use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::site::ThemeCatalog;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub server: Server,
    pub policies: Policies,
    #[serde(default)]
    pub themes: ThemeCatalog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policies {
    /// Directory holding the `.kdl` policy files. Default: policies
    pub dir: PathBuf,
    /// Site used by check requests that do not name one
    pub default_site: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("policies"),
            default_site: "main".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server.host", Server::default().host)
            .into_diagnostic()?
            .set_default("server.port", Server::default().port)
            .into_diagnostic()?
            .set_default(
                "policies.dir",
                Policies::default().dir.to_string_lossy().to_string(),
            )
            .into_diagnostic()?
            .set_default("policies.default_site", Policies::default().default_site)
            .into_diagnostic()?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: SITEGATE__SERVER__PORT=9090, etc.
        builder = builder.add_source(config::Environment::with_prefix("SITEGATE").separator("__"));

        let cfg = builder.build().into_diagnostic()?;
        let mut s: Settings = cfg.try_deserialize().into_diagnostic()?;

        // Normalize policies dir to be relative to current dir
        if s.policies.dir.is_relative() {
            s.policies.dir = std::env::current_dir()
                .into_diagnostic()?
                .join(&s.policies.dir);
        }

        Ok(s)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
