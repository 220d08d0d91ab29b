//! Headless bot client: joins a match, reports its seat, and chases the ball
//! with its paddle if it got one.

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use shared::{
    ClientEvent, Encoding, Frame, Role, ServerEvent, Snapshot, PADDLE_HEIGHT, PADDLE_VELOCITY,
};
use std::time::Duration;
use tokio::time::interval;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:3001")]
    server: String,

    /// Request path; `/bin` selects compact binary frames instead of JSON
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Milliseconds between paddle decisions
    #[arg(short, long, default_value = "50")]
    reaction_ms: u64,

    /// Disconnect after this many seconds (runs until closed if omitted)
    #[arg(short, long)]
    duration: Option<u64>,
}

/// Builds the WebSocket URL and the encoding the server will answer with.
fn endpoint(server: &str, path: &str) -> (String, Encoding) {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    let encoding = Encoding::for_path(&path);
    (format!("ws://{}{}", server, path), encoding)
}

/// Picks a paddle move that brings the paddle centre toward the ball centre.
fn chase(role: Role, snapshot: &Snapshot) -> Option<i8> {
    let paddle_y = snapshot.state.paddle_y(role)?;
    let offset = snapshot.state.ball.center_y() - (paddle_y + PADDLE_HEIGHT / 2.0);

    if offset.abs() < PADDLE_VELOCITY / 2.0 {
        None
    } else if offset < 0.0 {
        Some(-1)
    } else {
        Some(1)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let (url, encoding) = endpoint(&args.server, &args.path);

    info!("Connecting to {}", url);
    let (ws_stream, _) = connect_async(url.as_str()).await?;
    let (mut sender, mut receiver) = ws_stream.split();

    let mut role = None;
    let mut latest: Option<Snapshot> = None;
    let mut decisions = interval(Duration::from_millis(args.reaction_ms.max(1)));
    let run_for = Duration::from_secs(args.duration.unwrap_or(365 * 24 * 60 * 60));
    let deadline = tokio::time::sleep(run_for);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let message = match frame {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        warn!("Connection error: {}", e);
                        break;
                    }
                    None => break,
                };

                let event: ServerEvent = match &message {
                    Message::Text(text) => Encoding::Json.decode(text.as_bytes())?,
                    Message::Binary(bytes) => Encoding::Binary.decode(bytes)?,
                    Message::Close(frame) => {
                        info!("Server closed the connection: {:?}", frame);
                        break;
                    }
                    _ => continue,
                };

                match event {
                    ServerEvent::PlayerAssignment(assigned) => {
                        info!("Assigned role: {}", assigned.as_str());
                        role = Some(assigned);
                    }
                    ServerEvent::GameState(snapshot) => {
                        if latest.as_ref().map(|s| (s.state.left_score, s.state.right_score))
                            != Some((snapshot.state.left_score, snapshot.state.right_score))
                        {
                            info!(
                                "Score {} - {} ({:?})",
                                snapshot.state.left_score,
                                snapshot.state.right_score,
                                snapshot.state.status
                            );
                        }
                        latest = Some(snapshot);
                    }
                }
            }

            _ = decisions.tick() => {
                let (Some(role), Some(snapshot)) = (role, latest.as_ref()) else {
                    continue;
                };
                if let Some(direction) = chase(role, snapshot) {
                    let frame = encoding.encode(&ClientEvent::MovePaddle { player: role, direction })?;
                    let message = match frame {
                        Frame::Text(text) => Message::Text(text),
                        Frame::Binary(bytes) => Message::Binary(bytes),
                    };
                    sender.send(message).await?;
                }
            }

            _ = &mut deadline => {
                info!("Run time elapsed, disconnecting");
                break;
            }
        }
    }

    let _ = sender.close().await;
    Ok(())
}
