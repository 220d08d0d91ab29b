use clap::Parser;
use log::info;
use server::config::{ServerConfig, DEFAULT_MAX_CLIENTS, DEFAULT_OUTBOX_CAPACITY};
use server::network::Server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Tick rate (updates per second)
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Maximum simultaneous connections, players and spectators combined
    #[arg(short, long, default_value_t = DEFAULT_MAX_CLIENTS)]
    max_clients: usize,

    /// End the match when either side reaches this score
    #[arg(short, long)]
    score_limit: Option<u32>,

    /// Seed for ball serves, for reproducible matches
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = ServerConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        tick_rate_hz: args.tick_rate,
        max_clients: args.max_clients,
        score_limit: args.score_limit,
        seed: args.seed,
        outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
    };

    let mut server = Server::new(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
