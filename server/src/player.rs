use crate::connection::Connection;
use std::net::SocketAddr;

/// A registered participant of the session
#[derive(Debug)]
pub struct Player {
    pub nickname: String,
    /// Join order, starting at 1. Fixed for the whole session.
    pub order: usize,
    pub addr: Option<SocketAddr>,
    pub points: u32,
    pub guesses_taken: u32,
    /// False once eliminated by a wrong keyword or a lost connection
    pub active: bool,
    connection: Option<Connection>,
}

impl Player {
    pub fn new(nickname: impl Into<String>, order: usize, connection: Connection) -> Self {
        Self {
            nickname: nickname.into(),
            order,
            addr: Some(connection.addr()),
            points: 0,
            guesses_taken: 0,
            active: true,
            connection: Some(connection),
        }
    }

    /// A player without a socket, as after a disconnect
    pub fn detached(nickname: impl Into<String>, order: usize) -> Self {
        Self {
            nickname: nickname.into(),
            order,
            addr: None,
            points: 0,
            guesses_taken: 0,
            active: true,
            connection: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Whether the cursor should stop on this player
    pub fn can_play(&self, guess_budget: u32) -> bool {
        self.active && self.is_connected() && self.guesses_taken < guess_budget
    }

    pub fn guesses_left(&self, guess_budget: u32) -> u32 {
        guess_budget.saturating_sub(self.guesses_taken)
    }

    pub fn connection_mut(&mut self) -> Option<&mut Connection> {
        self.connection.as_mut()
    }

    /// Drops the socket and takes the player out of play
    pub fn disconnect(&mut self) -> Option<Connection> {
        self.active = false;
        self.connection.take()
    }

    /// Restores the start-of-round state. Disconnected players stay out.
    pub fn reset(&mut self) {
        self.points = 0;
        self.guesses_taken = 0;
        self.active = self.is_connected();
    }

    pub fn same_nickname(&self, nickname: &str) -> bool {
        self.nickname.to_lowercase() == nickname.to_lowercase()
    }
}
