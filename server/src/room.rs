//! One live match together with the connections taking part in it.
//!
//! `Room` is the single injectable owner of match state. Every entry point is
//! synchronous and performs no I/O of its own: outbound events are handed to
//! a [`Transport`], which the network layer backs with real sockets and tests
//! back with a recorder.

use crate::client_manager::ClientManager;
use crate::config::ServerConfig;
use crate::game::GameState;
use log::debug;
use shared::{ClientEvent, ConnectionId, Direction, MatchStatus, Role, ServerEvent, Snapshot};
use std::net::SocketAddr;

/// Outbound side of the connection layer.
pub trait Transport {
    /// Queues an event for a single connection.
    fn send(&mut self, to: ConnectionId, event: &ServerEvent);

    /// Queues an identical event for every connection.
    fn broadcast(&mut self, event: &ServerEvent);
}

pub struct Room {
    clients: ClientManager,
    game: GameState,
}

impl Room {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            clients: ClientManager::new(config.max_clients),
            game: GameState::new(config.score_limit, config.seed),
        }
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Consistent view of the match and roster at this instant.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.game.tick,
            state: *self.game.state(),
            roster: self.clients.roster(),
        }
    }

    /// Admits a new connection, tells it its role, and broadcasts the new
    /// roster. Returns None when the room is full.
    pub fn join<T: Transport>(
        &mut self,
        addr: SocketAddr,
        transport: &mut T,
    ) -> Option<(ConnectionId, Role)> {
        let (client_id, role) = self.admit(addr)?;
        self.welcome(client_id, role, transport);
        Some((client_id, role))
    }

    /// First half of `join`: allocates the connection id and seat without
    /// sending anything, so the caller can wire up the connection's outbox.
    pub fn admit(&mut self, addr: SocketAddr) -> Option<(ConnectionId, Role)> {
        self.clients.add_client(addr)
    }

    /// Second half of `join`: announces the role to the newcomer, starts the
    /// match if both seats are now filled, and broadcasts the snapshot.
    pub fn welcome<T: Transport>(&mut self, client_id: ConnectionId, role: Role, transport: &mut T) {
        transport.send(client_id, &ServerEvent::PlayerAssignment(role));
        self.sync_status();
        self.broadcast_state(transport);
    }

    /// Drops a connection, freeing its seat. Leaving twice is harmless.
    pub fn leave<T: Transport>(&mut self, client_id: ConnectionId, transport: &mut T) -> bool {
        if self.clients.remove_client(client_id).is_none() {
            return false;
        }

        self.sync_status();
        self.broadcast_state(transport);
        true
    }

    /// Applies a client event on behalf of `client_id`.
    ///
    /// The acting role always comes from the connection table. Unauthorized
    /// or malformed requests are dropped without any reply to the sender.
    pub fn handle_event<T: Transport>(
        &mut self,
        client_id: ConnectionId,
        event: ClientEvent,
        transport: &mut T,
    ) -> bool {
        match event {
            ClientEvent::MovePaddle { player, direction } => {
                let Some(role) = self.clients.role_of(client_id) else {
                    debug!("Ignoring input from unknown client {}", client_id);
                    return false;
                };

                if player != role {
                    debug!(
                        "Client {} claimed {} but holds {}",
                        client_id,
                        player.as_str(),
                        role.as_str()
                    );
                }

                let Ok(direction) = Direction::try_from(direction) else {
                    debug!(
                        "Dropping move with invalid direction {} from client {}",
                        direction, client_id
                    );
                    return false;
                };

                if !self.game.apply_paddle_input(role, direction) {
                    debug!("Dropping move from {} client {}", role.as_str(), client_id);
                    return false;
                }

                self.broadcast_state(transport);
                true
            }
        }
    }

    /// Runs one physics tick and broadcasts the result. Does nothing unless
    /// the match is being played.
    pub fn tick<T: Transport>(&mut self, transport: &mut T) -> bool {
        if !self.game.tick() {
            return false;
        }

        self.broadcast_state(transport);
        true
    }

    fn sync_status(&mut self) {
        let seated = self.clients.seats_filled();

        match (self.game.status(), seated) {
            (MatchStatus::Waiting, true) => self.game.start(),
            (MatchStatus::Playing, false) => self.game.pause(),
            (MatchStatus::Ended, false) => self.game.reset(),
            _ => {}
        }
    }

    fn broadcast_state<T: Transport>(&self, transport: &mut T) {
        transport.broadcast(&ServerEvent::GameState(self.snapshot()));
    }
}
