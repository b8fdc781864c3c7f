use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stratus_core::{Category, StratusConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "stratus",
    about = "Stratus — cluster status for master-coordinated clusters",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to stratus.toml (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the active master for cluster status
    Status {
        /// Master endpoint, e.g. http://10.0.0.1:16000
        #[arg(short, long)]
        endpoint: Option<String>,
        /// Per-call timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Category to leave out; repeatable.
        ///
        /// One of: version, cluster-id, live-servers, dead-servers,
        /// master, backup-masters, master-coprocessors, balancer-on,
        /// region-state.
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<Category>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Run a development master serving the status RPC
    Master {
        /// Advertised host
        #[arg(long)]
        host: Option<String>,
        /// gRPC port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,stratus=debug")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => StratusConfig::from_file(path)?,
        None => StratusConfig::default(),
    };

    match cli.command {
        Commands::Status {
            endpoint,
            timeout_ms,
            exclude,
            format,
        } => {
            if let Some(endpoint) = endpoint {
                config.client.endpoint = endpoint;
            }
            if let Some(timeout_ms) = timeout_ms {
                config.client.timeout_ms = timeout_ms;
            }
            commands::status::run(&config.client, &exclude, &format)
        }
        Commands::Master { host, port } => {
            if let Some(host) = host {
                config.master.host = host;
            }
            if let Some(port) = port {
                config.master.port = port;
            }
            commands::master::run(config.master)
        }
    }
}
