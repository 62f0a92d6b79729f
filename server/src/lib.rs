//! # Magical Wheel Game Server
//!
//! This library implements the authoritative server for The Magical Wheel, a
//! small turn-based word-guessing game played over TCP. Players register with
//! a nickname, receive a masked keyword and a hint, and take turns guessing
//! single characters or the whole keyword until someone wins or every player
//! runs out of guesses.
//!
//! ## Architecture Design
//!
//! ### Single Writer
//! Once the roster is complete, a single engine task owns every player and
//! the current round. Nothing else mutates game state, so no locks guard it.
//! Before quorum the roster is owned by a registrar task that registration
//! handlers talk to over a channel.
//!
//! ### One Reader Task per Connection
//! Every socket gets a reader task that turns the byte stream into lines and
//! queues them. The engine only ever waits on the queue of the player whose
//! turn it is, with a deadline, which makes turn timeouts cancellation safe.
//!
//! ### Tagged Protocol
//! Server messages are serialized [`shared::ServerMessage`] values, one JSON
//! object per line. Clients answer with plain text lines.
//!
//! ## Module Organization
//!
//! - `keywords`: loading the keyword database and drawing a keyword
//! - `connection`: line framing and per-connection reader tasks
//! - `player`, `registry`: roster, nickname rules and quorum
//! - `round`, `engine`: guess rules, scoring and the turn loop
//! - `messaging`: sends and broadcasts with drop-on-failure
//! - `lifecycle`: leaderboard and restart vote
//! - `network`: listener, seat limit and session coordination
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::keywords::KeywordStore;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let keywords = KeywordStore::load("database.txt")?;
//!     let server = Server::bind("127.0.0.1:5555", GameConfig::default(), keywords).await?;
//!
//!     // Runs one session: registration, rounds, restart votes, teardown
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod keywords;
pub mod lifecycle;
pub mod messaging;
pub mod network;
pub mod player;
pub mod registry;
pub mod round;
