//! # Magical Wheel Client Library
//!
//! A terminal client for The Magical Wheel. It prints everything the server
//! sends and forwards one line of input whenever the server asks for a reply.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Tracks what the client knows about the session: its player order, the
//! current hint and mask, and whether a reply is pending. Transitions are
//! driven by the kind of each server message.
//!
//! ### Network Module (`network`)
//! Owns the TCP connection and runs the main loop that multiplexes server
//! lines and user input.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::connect("127.0.0.1:5555").await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod network;
