use clap::Parser;
use log::{error, info};
use server::config::{outbound_ip, ServerConfig, SessionConfig};
use server::network::Server;
use shared::{DEFAULT_PORT, MAX_MESSAGE_SIZE};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// IP address to bind to (defaults to the outbound-routable local address)
    #[arg(short = 'H', long)]
    host: Option<IpAddr>,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Refuse connections beyond this many concurrent sessions
    #[arg(long)]
    max_sessions: Option<usize>,

    /// Close sessions that send nothing for this many seconds
    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Refuse a player name while another connection is using it
    #[arg(long)]
    reject_duplicate_names: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let host = match args.host {
        Some(host) => host,
        None => outbound_ip().map_err(|e| {
            error!("Cannot determine listening address: {}", e);
            e
        })?,
    };

    let config = ServerConfig {
        bind_address: SocketAddr::new(host, args.port),
        session: SessionConfig {
            max_message_size: MAX_MESSAGE_SIZE,
            idle_timeout: args.idle_timeout_secs.map(Duration::from_secs),
            reject_duplicate_names: args.reject_duplicate_names,
        },
        max_sessions: args.max_sessions,
    };

    info!("Starting game server at {}", config.bind_address);
    let server = Server::new(config).await.map_err(|e| {
        error!("{}", e);
        e
    })?;

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
