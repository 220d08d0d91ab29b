//! # Pong Match Server Library
//!
//! This library provides the authoritative server for a two-player real-time
//! Pong match. It owns the only copy of the match state, accepts paddle input
//! over persistent WebSocket connections, advances ball physics at a fixed
//! tick rate, and broadcasts the resulting state to every connected client.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Clients never simulate. Every connection receives the same full snapshot
//! after each accepted input and after each tick, and simply renders it.
//!
//! ### Seat Management
//! The first connection takes the left paddle, the second the right paddle,
//! and everyone after that watches. A departing player frees the seat for the
//! next arrival; the match pauses (keeping scores) until both seats are filled.
//!
//! ### Input Authorization
//! A paddle move is applied on behalf of the role the server assigned to the
//! sending connection. Whatever role the message itself claims is ignored, and
//! spectators cannot move anything.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! Connection tasks only decode frames and forward them over a channel. One
//! loop owns the [`room::Room`] and processes connection events and ticks
//! sequentially, so no two mutations ever interleave.
//!
//! ### Pure Physics
//! [`physics::advance`] maps one match record to the next with no I/O, which
//! keeps the simulation testable in isolation from the transport.
//!
//! ## Module Organization
//!
//! - `client_manager`: connection membership and seat assignment
//! - `game`: the authoritative match record and its two mutation paths
//! - `physics`: ball integration, collisions, scoring and serves
//! - `room`: ties seats to the match and defines the [`room::Transport`] seam
//! - `scheduler`: fixed-rate tick source that drops missed ticks
//! - `network`: WebSocket sessions, outboxes and the main loop
//! - `config`: runtime parameters
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         bind_addr: "127.0.0.1:3001".to_string(),
//!         score_limit: Some(11),
//!         ..ServerConfig::default()
//!     };
//!
//!     let mut server = Server::new(config).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod game;
pub mod network;
pub mod physics;
pub mod room;
pub mod scheduler;
