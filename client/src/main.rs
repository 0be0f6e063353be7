use clap::Parser;
use client::network::GameClient;
use client::roster::{Avatars, Visibility};
use log::{info, warn};
use shared::Command;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address, e.g. 192.168.1.20:10018
    server: String,

    /// Name of the player to move
    player: String,

    /// Poll the server at this period in milliseconds
    #[arg(long, default_value = "10")]
    period_ms: u64,

    /// Commands queued at start, comma separated (e.g. right,right,up)
    #[arg(long, value_delimiter = ',')]
    moves: Vec<Command>,

    /// Stop after this many polls (runs until Ctrl+C otherwise)
    #[arg(long)]
    ticks: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut client = GameClient::connect(&args.server, args.player.as_str()).await?;
    info!("Playing as {}", client.player());
    for command in args.moves {
        client.queue(command);
    }

    let mut avatars = Avatars::new();
    let mut poll_interval = interval(Duration::from_millis(args.period_ms.max(1)));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls = 0u64;

    loop {
        if args.ticks.is_some_and(|limit| polls >= limit) {
            break;
        }

        tokio::select! {
            _ = poll_interval.tick() => {
                let snapshot = match client.poll().await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!("Lost connection to server: {}", e);
                        return Err(e.into());
                    }
                };
                polls += 1;

                for (name, visibility) in avatars.update(snapshot) {
                    match visibility {
                        Visibility::Shown(position) => {
                            info!("{} at ({}, {})", name, position.x, position.y)
                        }
                        Visibility::Hidden => info!("{} left", name),
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, disconnecting");
                break;
            }
        }
    }

    client.close().await?;
    Ok(())
}
