use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use anyhow::{Context, Result};
use berth_cli::{echo, exercise, BerthConfig};
use clap::{Parser, Subcommand};
use log::info;

/// Berth Command Line Interface
///
/// Runs the echo server pooled connections talk to, and exercises a
/// connection pool against it.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[clap(long, global = true, default_value = "info")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the PING/PONG echo server in the foreground
    #[clap(name = "echo-server")]
    EchoServer {
        /// Path to a TOML configuration file
        #[clap(long)]
        config: Option<PathBuf>,

        /// Address to listen on
        #[clap(long)]
        addr: Option<String>,
    },

    /// Drive concurrent PING/PONG exchanges through a connection pool
    Exercise {
        /// Path to a TOML configuration file
        #[clap(long)]
        config: Option<PathBuf>,

        /// Echo server address to dial
        #[clap(long)]
        addr: Option<String>,

        /// Number of worker threads
        #[clap(long)]
        workers: Option<usize>,

        /// Exchanges per worker
        #[clap(long)]
        rounds: Option<usize>,

        /// Connections created up front
        #[clap(long)]
        initial_size: Option<usize>,

        /// Maximum idle connections kept by the pool
        #[clap(long)]
        capacity: Option<usize>,

        /// Start an in-process echo server on an ephemeral port and dial it
        #[clap(long)]
        spawn_server: bool,
    },

    /// Print the effective configuration as TOML
    #[clap(name = "show-config")]
    ShowConfig {
        /// Path to a TOML configuration file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<BerthConfig> {
    match path {
        Some(path) => BerthConfig::load(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display())),
        None => Ok(BerthConfig::default()),
    }
}

fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()
        .with_context(|| format!("Failed to resolve {}", addr))?
        .next()
        .with_context(|| format!("No address found for {}", addr))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Commands::EchoServer { config, addr } => {
            let config = load_config(config.as_ref())?;
            let addr = addr.unwrap_or(config.server.addr);
            echo::run(addr.as_str())
                .with_context(|| format!("Echo server on {} failed", addr))?;
        }
        Commands::Exercise {
            config,
            addr,
            workers,
            rounds,
            initial_size,
            capacity,
            spawn_server,
        } => {
            let mut config = load_config(config.as_ref())?;
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            if let Some(workers) = workers {
                config.exercise.workers = workers;
            }
            if let Some(rounds) = rounds {
                config.exercise.rounds = rounds;
            }
            if let Some(initial_size) = initial_size {
                config.pool.initial_size = initial_size;
            }
            if let Some(capacity) = capacity {
                config.pool.capacity = capacity;
            }
            config.validate().context("Invalid exercise settings")?;

            let target = if spawn_server {
                echo::spawn("127.0.0.1:0").context("Failed to start echo server")?
            } else {
                resolve(&config.server.addr)?
            };

            let report = exercise::run(target, config.pool, &config.exercise)?;
            info!("Exercise finished in {:?}", report.elapsed);
            println!("{}", report);
        }
        Commands::ShowConfig { config } => {
            let config = load_config(config.as_ref())?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
