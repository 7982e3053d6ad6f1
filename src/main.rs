// ABOUTME: Main entry point for the devbox dashboard and site management CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use wpdevbox::config::DevboxConfig;
use wpdevbox::docker::{DockerClient, EngineExecRunner, UnixTransport};
use wpdevbox::server::{self, AppContext};
use wpdevbox::sites::{site_records, SiteManager};

#[derive(Parser)]
#[command(name = "devbox", version, about = "Manage a local WordPress development environment")]
struct Cli {
    /// Environment file, reread on every call
    #[arg(long, default_value = ".env", global = true)]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the dashboard API server
    Serve {
        /// Listen port, overriding DASHBOARD_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// List the sites under the sites root
    Sites,
    /// Create a site directory and its database
    AddSite { name: String },
    /// Drop a site's database and remove its directory
    RemoveSite { name: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            let config = DevboxConfig::load(&cli.env_file);
            let port = port.unwrap_or_else(|| config.dashboard_port());
            server::serve(
                AppContext {
                    env_file: cli.env_file,
                },
                port,
            )
            .await
        }
        Command::Sites => {
            let config = DevboxConfig::load(&cli.env_file);
            let records = site_records(&config)?;
            if records.is_empty() {
                println!("No sites yet. Create one with: devbox add-site <name>");
            }
            for site in records {
                let marker = if site.has_wordpress { " [wordpress]" } else { "" };
                println!("{}  {}  db={}{marker}", site.name, site.http_url, site.db_name);
            }
            Ok(())
        }
        Command::AddSite { name } => {
            site_manager(&cli.env_file).create_site(&name).await?;
            println!("Created site '{name}'");
            Ok(())
        }
        Command::RemoveSite { name } => {
            site_manager(&cli.env_file).delete_site(&name).await?;
            println!("Removed site '{name}'");
            Ok(())
        }
    }
}

fn site_manager(env_file: &Path) -> SiteManager<EngineExecRunner<UnixTransport>> {
    let config = DevboxConfig::load(env_file);
    let client = DockerClient::new(UnixTransport::new(config.docker_socket()));
    SiteManager::new(config, EngineExecRunner::new(client))
}

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devbox=info,wpdevbox=info".into()),
        )
        .init();
}
