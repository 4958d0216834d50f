mod handlers;
mod server;


use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use seatlock_core::config::{DEFAULT_EXPIRY_MARGIN, DEFAULT_LOCK_TTL, DEFAULT_SEAT_COUNT};

#[derive(Parser)]
#[command(
    name = "seatlock",
    about = "Seatlock — time-bound seat reservations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Seatlock HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3100")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Number of seats, numbered from 1
        #[arg(long, env = "SEATLOCK_SEATS", default_value_t = DEFAULT_SEAT_COUNT)]
        seats: u32,

        /// How long a lock holds before it expires
        #[arg(
            long,
            env = "SEATLOCK_LOCK_TTL_MS",
            default_value_t = DEFAULT_LOCK_TTL.as_millis() as u64
        )]
        lock_ttl_ms: u64,

        /// Extra delay before the expiry timer fires
        #[arg(
            long,
            env = "SEATLOCK_EXPIRY_MARGIN_MS",
            default_value_t = DEFAULT_EXPIRY_MARGIN.as_millis() as u64
        )]
        expiry_margin_ms: u64,

        /// Bearer token required on /admin routes
        #[arg(long, env = "SEATLOCK_ADMIN_KEY", hide_env_values = true)]
        admin_key: Option<String>,
    },

    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            host,
            seats,
            lock_ttl_ms,
            expiry_margin_ms,
            admin_key,
        } => {
            server::run(server::ServerConfig {
                host,
                port,
                seats,
                lock_ttl_ms,
                expiry_margin_ms,
                admin_key,
            })
            .await?;
        }
        Commands::Version => {
            println!("seatlock {}", env!("CARGO_PKG_VERSION"));
            println!("Seat reservation registry with expiring locks");
        }
    }

    Ok(())
}
