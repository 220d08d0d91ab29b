//! Connection membership and role assignment for the match server
//!
//! This module owns the server-side view of who is connected and who holds
//! which seat:
//! - Connection lifecycle (connect, disconnect) and capacity enforcement
//! - Seat allocation: first free of Left, then Right, otherwise Spectator
//! - The exclusive role → connection mapping used to authorize paddle input
//!
//! Socket handles live in the network layer's own connection id → outbox
//! table.

use log::info;
use shared::{ConnectionId, Role, Roster, RosterEntry};
use std::collections::HashMap;
use std::net::SocketAddr;

/// A registered connection. Its role lives in the seat table, see
/// [`ClientManager::role_of`].
#[derive(Debug)]
pub struct Client {
    /// Unique connection identifier assigned by the server
    pub id: ConnectionId,
    /// Peer address, kept for logging
    pub addr: SocketAddr,
}

/// Manages all connected clients and the two player seats
///
/// Exactly one connection may hold Left and one may hold Right at any time.
/// A departing player frees the seat synchronously so that the next
/// connection can claim it.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<ConnectionId, Client>,
    /// Holder of the left seat
    left: Option<ConnectionId>,
    /// Holder of the right seat
    right: Option<ConnectionId>,
    /// Next available ID for new connections
    next_client_id: ConnectionId,
    /// Maximum number of concurrent connections allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty manager with the given connection limit.
    /// Connection IDs start from 1 and are never reused.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            left: None,
            right: None,
            next_client_id: 1,
            max_clients,
        }
    }

    /// Accepts a new connection and assigns its role
    ///
    /// Returns the new connection ID and role, or None if the server is at
    /// capacity.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<(ConnectionId, Role)> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        self.clients.insert(
            client_id,
            Client {
                id: client_id,
                addr,
            },
        );
        let role = self.assign_role(client_id)?;
        info!(
            "Client {} connected from {} as {}",
            client_id,
            addr,
            role.as_str()
        );

        Some((client_id, role))
    }

    /// Allocates Left if free, else Right if free, else Spectator
    ///
    /// A connection that already holds a seat keeps it. Returns None for ids
    /// that were never registered through `add_client`.
    pub fn assign_role(&mut self, client_id: ConnectionId) -> Option<Role> {
        if !self.clients.contains_key(&client_id) {
            return None;
        }
        if self.left == Some(client_id) {
            return Some(Role::Left);
        }
        if self.right == Some(client_id) {
            return Some(Role::Right);
        }

        let role = if self.left.is_none() {
            self.left = Some(client_id);
            Role::Left
        } else if self.right.is_none() {
            self.right = Some(client_id);
            Role::Right
        } else {
            Role::Spectator
        };
        Some(role)
    }

    /// Frees the seat held by a connection
    ///
    /// Returns the freed role, or None if the connection held no seat. Calling
    /// it again for the same connection is a no-op.
    pub fn release_role(&mut self, client_id: ConnectionId) -> Option<Role> {
        if self.left == Some(client_id) {
            self.left = None;
            info!("Left seat released by client {}", client_id);
            Some(Role::Left)
        } else if self.right == Some(client_id) {
            self.right = None;
            info!("Right seat released by client {}", client_id);
            Some(Role::Right)
        } else {
            None
        }
    }

    /// Removes a client and frees any seat it held
    ///
    /// Returns the removed client, or None if it was already gone.
    pub fn remove_client(&mut self, client_id: ConnectionId) -> Option<Client> {
        self.release_role(client_id);
        let client = self.clients.remove(&client_id)?;
        info!("Client {} disconnected", client.id);
        Some(client)
    }

    /// The role a live connection currently holds
    pub fn role_of(&self, client_id: ConnectionId) -> Option<Role> {
        if self.left == Some(client_id) {
            return Some(Role::Left);
        }
        if self.right == Some(client_id) {
            return Some(Role::Right);
        }
        self.clients.get(&client_id).map(|_| Role::Spectator)
    }

    /// The connection currently seated in a player role
    pub fn holder(&self, role: Role) -> Option<ConnectionId> {
        match role {
            Role::Left => self.left,
            Role::Right => self.right,
            Role::Spectator => None,
        }
    }

    /// True when both player seats are taken
    pub fn seats_filled(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub fn get(&self, client_id: ConnectionId) -> Option<&Client> {
        self.clients.get(&client_id)
    }

    /// Seated players plus the number of spectators
    pub fn roster(&self) -> Roster {
        let players = [(Role::Left, self.left), (Role::Right, self.right)]
            .into_iter()
            .filter_map(|(position, holder)| holder.map(|id| RosterEntry { position, id }))
            .collect::<Vec<_>>();
        let spectators = self.clients.len().saturating_sub(players.len()) as u32;

        Roster {
            players,
            spectators,
        }
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
