//! Delivery of protocol messages to the players of a session
//!
//! All sends are best effort. A failed write disconnects that player: they
//! are marked inactive and skipped by every later broadcast, and the round
//! carries on without them.

use crate::player::Player;
use log::warn;
use shared::ServerMessage;

/// The roster of a running game, in join order
#[derive(Debug)]
pub struct Session {
    players: Vec<Player>,
}

impl Session {
    pub fn new(players: Vec<Player>) -> Self {
        Self { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn player(&self, index: usize) -> &Player {
        &self.players[index]
    }

    pub fn player_mut(&mut self, index: usize) -> &mut Player {
        &mut self.players[index]
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_connected()).count()
    }

    /// Sends to one player. Returns false if the player is (now) gone.
    pub async fn send_to(&mut self, index: usize, message: &ServerMessage) -> bool {
        let player = &mut self.players[index];
        let Some(connection) = player.connection_mut() else {
            return false;
        };

        match connection.send(message).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping {} after failed send: {}", player.nickname, e);
                player.disconnect();
                false
            }
        }
    }

    pub async fn broadcast(&mut self, message: &ServerMessage) {
        for index in 0..self.players.len() {
            self.send_to(index, message).await;
        }
    }

    /// Sends `for_player` to the player at `index` and `for_others` to
    /// everyone else
    pub async fn broadcast_except(
        &mut self,
        index: usize,
        for_player: &ServerMessage,
        for_others: &ServerMessage,
    ) {
        for other in 0..self.players.len() {
            let message = if other == index {
                for_player
            } else {
                for_others
            };
            self.send_to(other, message).await;
        }
    }

    /// Sends the farewell to every connected player and closes their sockets
    pub async fn close_all(&mut self, farewell: &ServerMessage) {
        for player in &mut self.players {
            if let Some(mut connection) = player.disconnect() {
                if let Err(e) = connection.send(farewell).await {
                    warn!("Failed to say goodbye to {}: {}", player.nickname, e);
                }
                connection.close().await;
            }
        }
    }
}
