use std::path::Path;

use clap::{Parser, Subcommand};
use miette::Result;
use sitegate::access::directory::ActorResolver;
use sitegate::access::loader::load_policies;
use sitegate::access::types::{Capability, MemberId};
use sitegate::settings::Settings;
use sitegate::{explain, web};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "sitegate",
    version,
    about = "Sitewide access policy service"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the access API (default)
    Serve,
    /// Evaluate one request against the loaded policies and print the decision
    Check {
        /// Site id; the configured default site when omitted
        #[arg(long)]
        site: Option<String>,
        /// Member id; anonymous when omitted
        #[arg(long)]
        member: Option<String>,
        /// view, edit or create_top_level
        capability: Capability,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    let access = load_policies(Path::new(&settings.policies.dir))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => web::serve(settings, access).await?,
        Command::Check {
            site,
            member,
            capability,
        } => {
            let site_id = site.unwrap_or_else(|| settings.policies.default_site.clone());
            let member = member.map(MemberId);
            let actor = access.directory.resolve(member.as_ref())?;
            let eval = explain(&access.current_site(&site_id).policy, &actor, capability);
            let verdict = if eval.decision.is_allowed() { "allow" } else { "deny" };
            println!("{verdict} ({})", eval.reason.as_str());
        }
    }
    Ok(())
}
