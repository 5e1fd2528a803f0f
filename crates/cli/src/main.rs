//! # IonMan DNS
//!
//! Entry point for the per-peer DNS filtering control plane: front proxy,
//! caching resolver, query logging, and the port-blocking compiler.

mod bootstrap;
mod server;

use clap::Parser;
use ionman_dns_domain::CliOverrides;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ionman-dns")]
#[command(version)]
#[command(about = "Per-peer DNS category blocking with a caching resolver")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "config/ionman.toml")]
    config: String,

    /// Front proxy bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Front proxy port
    #[arg(short = 'd', long)]
    dns_port: Option<u16>,

    /// Resolver port
    #[arg(long)]
    resolver_port: Option<u16>,

    /// SQLite database path
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        listen_addr: cli.bind,
        listen_port: cli.dns_port,
        resolver_port: cli.resolver_port,
        db_path: cli.db,
    };

    let config = bootstrap::load_config(Some(&cli.config), overrides)?;
    bootstrap::init_logging(&config);

    let pool = bootstrap::init_database(&config).await?;

    server::run(config, pool).await
}
