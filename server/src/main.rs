use clap::Parser;
use log::{error, info};
use server::config::GameConfig;
use server::keywords::KeywordStore;
use server::network::Server;
use shared::{DEFAULT_HOST, DEFAULT_PORT};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Number of players required to start a round
    #[arg(short = 'n', long, default_value_t = server::config::DEFAULT_PLAYERS)]
    players: usize,

    /// Guesses each player may take per round
    #[arg(short, long, default_value_t = server::config::DEFAULT_GUESS_BUDGET)]
    guesses: u32,

    /// Seconds a player has to answer on their turn
    #[arg(short, long, default_value = "60")]
    turn_timeout: u64,

    /// Seconds players have to answer the restart prompt
    #[arg(long, default_value = "30")]
    vote_timeout: u64,

    /// Seconds a new connection has to pick a nickname
    #[arg(long, default_value = "120")]
    registration_timeout: u64,

    /// Milliseconds a write to one player may block before they are dropped
    #[arg(long, default_value = "2000")]
    send_timeout_ms: u64,

    /// Keyword database file
    #[arg(short, long, default_value = "database.txt")]
    database: PathBuf,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            players: self.players,
            guess_budget: self.guesses,
            turn_timeout: Duration::from_secs(self.turn_timeout),
            vote_timeout: Duration::from_secs(self.vote_timeout),
            registration_timeout: Duration::from_secs(self.registration_timeout),
            send_timeout: Duration::from_millis(self.send_timeout_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let keywords = KeywordStore::load(&args.database)?;
    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, args.game_config(), keywords).await?;

    info!("Press Ctrl+C to stop the server");

    // Handle shutdown gracefully
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped with an error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
