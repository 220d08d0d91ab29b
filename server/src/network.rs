//! Server network layer handling WebSocket sessions and game loop coordination

use crate::config::ServerConfig;
use crate::room::{Room, Transport};
use crate::scheduler::TickScheduler;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ConnectionId, Encoding, Frame, ServerEvent};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::accept_hdr_async;

/// Messages sent from connection tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    Connected {
        addr: SocketAddr,
        outbox: Outbox,
        reply: oneshot::Sender<Option<ConnectionId>>,
    },
    EventReceived {
        client_id: ConnectionId,
        event: ClientEvent,
    },
    Disconnected {
        client_id: ConnectionId,
    },
}

/// Write side of one connection as seen by the main loop
#[derive(Debug)]
pub struct Outbox {
    encoding: Encoding,
    sender: mpsc::Sender<Message>,
}

impl Outbox {
    pub fn new(encoding: Encoding, sender: mpsc::Sender<Message>) -> Self {
        Self { encoding, sender }
    }

    /// Queues a frame without waiting. A full or closed outbox drops it.
    fn push(&self, client_id: ConnectionId, message: Message) {
        if let Err(e) = self.sender.try_send(message) {
            debug!("Dropped frame for client {}: {}", client_id, e);
        }
    }
}

/// Connection id to outbox table, the only holder of socket write handles
#[derive(Debug, Default)]
pub struct Outboxes {
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl Outboxes {
    pub fn insert(&mut self, client_id: ConnectionId, outbox: Outbox) {
        self.outboxes.insert(client_id, outbox);
    }

    pub fn remove(&mut self, client_id: ConnectionId) -> bool {
        self.outboxes.remove(&client_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.outboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outboxes.is_empty()
    }
}

impl Transport for Outboxes {
    fn send(&mut self, to: ConnectionId, event: &ServerEvent) {
        let Some(outbox) = self.outboxes.get(&to) else {
            return;
        };

        match encode_message(outbox.encoding, event) {
            Some(message) => outbox.push(to, message),
            None => error!("Failed to encode event for client {}", to),
        }
    }

    fn broadcast(&mut self, event: &ServerEvent) {
        // Encode at most once per encoding; every client gets the same bytes.
        let mut encoded: HashMap<Encoding, Option<Message>> = HashMap::new();

        for (client_id, outbox) in &self.outboxes {
            let message = encoded
                .entry(outbox.encoding)
                .or_insert_with(|| encode_message(outbox.encoding, event));

            match message {
                Some(message) => outbox.push(*client_id, message.clone()),
                None => error!("Failed to encode broadcast for client {}", client_id),
            }
        }
    }
}

fn encode_message(encoding: Encoding, event: &ServerEvent) -> Option<Message> {
    match encoding.encode(event) {
        Ok(Frame::Text(text)) => Some(Message::Text(text)),
        Ok(Frame::Binary(bytes)) => Some(Message::Binary(bytes)),
        Err(e) => {
            error!("Failed to encode {:?} frame: {}", encoding, e);
            None
        }
    }
}

/// Decodes an inbound frame. Text is always JSON and binary is always bincode,
/// whichever encoding the connection asked for on the way in.
fn decode_message(message: &Message) -> Option<Result<ClientEvent, shared::CodecError>> {
    match message {
        Message::Text(text) => Some(Encoding::Json.decode(text.as_bytes())),
        Message::Binary(bytes) => Some(Encoding::Binary.decode(bytes)),
        _ => None,
    }
}

/// Main server coordinating networking and game simulation
pub struct Server {
    listener: Arc<TcpListener>,
    local_addr: SocketAddr,
    config: ServerConfig,
    room: Room,
    outboxes: Outboxes,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on {}", local_addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener: Arc::new(listener),
            local_addr,
            room: Room::new(&config),
            config,
            outboxes: Outboxes::default(),
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Spawns task that accepts TCP connections and hands each to its own task
    fn spawn_acceptor(&self) {
        let listener = Arc::clone(&self.listener);
        let server_tx = self.server_tx.clone();
        let outbox_capacity = self.config.outbox_capacity;

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let server_tx = server_tx.clone();
                        tokio::spawn(async move {
                            handle_connection(stream, addr, server_tx, outbox_capacity).await;
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Applies one message from a connection task to the room
    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Connected {
                addr,
                outbox,
                reply,
            } => {
                let Some((client_id, role)) = self.room.admit(addr) else {
                    warn!("Rejecting {}: server full", addr);
                    let _ = reply.send(None);
                    return;
                };

                if reply.send(Some(client_id)).is_err() {
                    // The connection task went away before registration finished.
                    self.room.leave(client_id, &mut self.outboxes);
                    return;
                }

                self.outboxes.insert(client_id, outbox);
                self.room.welcome(client_id, role, &mut self.outboxes);
            }
            ServerMessage::EventReceived { client_id, event } => {
                self.room.handle_event(client_id, event, &mut self.outboxes);
            }
            ServerMessage::Disconnected { client_id } => {
                self.outboxes.remove(client_id);
                self.room.leave(client_id, &mut self.outboxes);
            }
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_acceptor();

        let mut scheduler = TickScheduler::new(self.config.tick_duration());

        info!(
            "Server started successfully ({} Hz, max {} clients)",
            self.config.tick_rate_hz, self.config.max_clients
        );

        loop {
            tokio::select! {
                // Handle connection events
                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Handle server tick events
                fired = scheduler.tick() => {
                    self.room.tick(&mut self.outboxes);

                    // Periodic performance monitoring
                    if fired % 600 == 0 && !self.outboxes.is_empty() {
                        let snapshot = self.room.snapshot();
                        debug!(
                            "Tick {}: {} clients, match {:?}, score {} - {}",
                            snapshot.tick,
                            self.outboxes.len(),
                            snapshot.state.status,
                            snapshot.state.left_score,
                            snapshot.state.right_score
                        );
                    }
                },
            }
        }

        Ok(())
    }
}

/// Drives one WebSocket session from handshake to close
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    outbox_capacity: usize,
) {
    let mut encoding = Encoding::Json;
    let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        encoding = Encoding::for_path(request.uri().path());
        Ok(response)
    };

    let ws_stream = match accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed for {}: {}", addr, e);
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (outbox_tx, mut outbox_rx) = mpsc::channel::<Message>(outbox_capacity.max(1));
    let (reply_tx, reply_rx) = oneshot::channel();

    let registration = ServerMessage::Connected {
        addr,
        outbox: Outbox::new(encoding, outbox_tx),
        reply: reply_tx,
    };
    if server_tx.send(registration).is_err() {
        error!("Server loop is gone, dropping connection from {}", addr);
        return;
    }

    let client_id = match reply_rx.await {
        Ok(Some(client_id)) => client_id,
        _ => {
            let close = Message::Close(Some(CloseFrame {
                code: CloseCode::Again,
                reason: "Server full".into(),
            }));
            let _ = ws_sender.send(close).await;
            return;
        }
    };
    debug!("Client {} at {} uses {:?} frames", client_id, addr, encoding);

    // Frames queued before registration completed are already in the outbox.
    let writer = tokio::spawn(async move {
        while let Some(message) = outbox_rx.recv().await {
            if let Err(e) = ws_sender.send(message).await {
                debug!("Write to client {} failed: {}", client_id, e);
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    while let Some(frame) = ws_receiver.next().await {
        let message = match frame {
            Ok(Message::Close(_)) => break,
            Ok(message) => message,
            Err(e) => {
                debug!("Read from client {} failed: {}", client_id, e);
                break;
            }
        };

        match decode_message(&message) {
            Some(Ok(event)) => {
                if server_tx
                    .send(ServerMessage::EventReceived { client_id, event })
                    .is_err()
                {
                    break;
                }
            }
            Some(Err(e)) => debug!("Dropping malformed frame from client {}: {}", client_id, e),
            None => {}
        }
    }

    info!("Connection from {} (client {}) closed", addr, client_id);
    let _ = server_tx.send(ServerMessage::Disconnected { client_id });
    // The writer ends once the main loop drops this connection's outbox.
    let _ = writer.await;
}
