//! Player registration and quorum
//!
//! The roster is owned by a single registrar task. Every pending connection
//! gets its own registration handler, which asks the client for a nickname
//! and submits it (together with the connection) to the registrar over a
//! channel. The registrar either keeps the connection as a new player or
//! hands it back with the reason for the rejection, so the handler can ask
//! again. Once the roster is full it is sent to the game engine exactly once.

use crate::connection::{Connection, Received};
use crate::error::RegistrationError;
use crate::player::Player;
use log::{debug, info, warn};
use shared::{ServerMessage, MAX_NICKNAME_LEN};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, OwnedSemaphorePermit};
use tokio::time::Instant;

/// A refused registration, returning the connection to its handler
#[derive(Debug)]
pub struct Rejected {
    pub error: RegistrationError,
    pub connection: Connection,
}

/// Requests served by the registrar task
#[derive(Debug)]
pub enum RegistrarCommand {
    Register {
        nickname: String,
        connection: Connection,
        reply: oneshot::Sender<Result<usize, Rejected>>,
    },
}

/// Roster of registered players in join order
pub struct Registry {
    players: Vec<Player>,
    capacity: usize,
}

impl Registry {
    pub fn new(capacity: usize) -> Self {
        Self {
            players: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Checks a proposed nickname against the current roster
    pub fn validate(&self, nickname: &str) -> Result<(), RegistrationError> {
        if self.is_full() {
            return Err(RegistrationError::RosterFull);
        }
        if nickname.is_empty() {
            return Err(RegistrationError::EmptyNickname);
        }
        if nickname.chars().count() > MAX_NICKNAME_LEN {
            return Err(RegistrationError::NicknameTooLong {
                max: MAX_NICKNAME_LEN,
            });
        }
        if self.players.iter().any(|p| p.same_nickname(nickname)) {
            return Err(RegistrationError::NicknameTaken);
        }
        Ok(())
    }

    /// Appends a player at the next join-order slot and returns that slot
    pub fn register(&mut self, nickname: &str, connection: Connection) -> Result<usize, Rejected> {
        if let Err(error) = self.validate(nickname) {
            return Err(Rejected { error, connection });
        }

        let order = self.players.len() + 1;
        info!(
            "Player {} registered as #{} from {}",
            nickname,
            order,
            connection.addr()
        );
        self.players.push(Player::new(nickname, order, connection));
        Ok(order)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    async fn send_to_last(&mut self, message: &ServerMessage) {
        if let Some(player) = self.players.last_mut() {
            let nickname = player.nickname.clone();
            if let Some(connection) = player.connection_mut() {
                if let Err(e) = connection.send(message).await {
                    warn!("Failed to greet {}: {}", nickname, e);
                }
            }
        }
    }
}

/// Registrar task. Serves registration requests until the roster is full,
/// then delivers it through `ready`.
pub async fn run_registrar(
    mut registry: Registry,
    mut commands: mpsc::Receiver<RegistrarCommand>,
    ready: oneshot::Sender<Vec<Player>>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            RegistrarCommand::Register {
                nickname,
                connection,
                reply,
            } => match registry.register(&nickname, connection) {
                Ok(order) => {
                    registry
                        .send_to_last(&ServerMessage::Registered { order })
                        .await;
                    if !registry.is_full() {
                        registry
                            .send_to_last(&ServerMessage::WaitingForPlayers {
                                registered: registry.len(),
                                required: registry.capacity(),
                            })
                            .await;
                    }
                    let _ = reply.send(Ok(order));

                    if registry.is_full() {
                        break;
                    }
                }
                Err(rejected) => {
                    debug!("Rejected nickname {:?}: {}", nickname, rejected.error);
                    if let Err(Err(rejected)) = reply.send(Err(rejected)) {
                        debug!(
                            "Registration handler for {} is gone",
                            rejected.connection.addr()
                        );
                    }
                }
            },
        }
    }

    if registry.is_full() {
        info!("All {} players registered", registry.len());
        if ready.send(registry.into_players()).is_err() {
            warn!("Game engine went away before the roster was complete");
        }
    }
}

/// Registration handler for one connection. Keeps asking for a nickname
/// until the registrar accepts one or the client disconnects. A client that
/// stays silent for `reply_timeout` after a prompt is closed and its seat
/// freed. The seat is kept for the rest of the session once the player is
/// registered.
pub async fn register_connection(
    mut connection: Connection,
    registrar: mpsc::Sender<RegistrarCommand>,
    seat: OwnedSemaphorePermit,
    reply_timeout: Duration,
) {
    let addr = connection.addr();
    if let Err(e) = connection.send(&ServerMessage::NicknamePrompt).await {
        warn!("Failed to prompt {} for a nickname: {}", addr, e);
        return;
    }

    loop {
        let nickname = match connection.recv_until(Instant::now() + reply_timeout).await {
            Received::Line(nickname) => nickname,
            Received::TimedOut => {
                info!("{} sent no nickname in time, freeing its seat", addr);
                connection.close().await;
                return;
            }
            Received::Closed => {
                info!("{} disconnected before registering", addr);
                return;
            }
        };

        let (reply, response) = oneshot::channel();
        let command = RegistrarCommand::Register {
            nickname,
            connection,
            reply,
        };
        if registrar.send(command).await.is_err() {
            debug!("Registrar closed, dropping {}", addr);
            return;
        }

        match response.await {
            Ok(Ok(_order)) => {
                seat.forget();
                return;
            }
            Ok(Err(Rejected {
                error: RegistrationError::RosterFull,
                connection: mut returned,
            })) => {
                let _ = returned.send(&ServerMessage::GameFull).await;
                returned.close().await;
                return;
            }
            Ok(Err(Rejected {
                error,
                connection: returned,
            })) => {
                connection = returned;
                let reason = error.rejection();
                if let Err(e) = connection
                    .send(&ServerMessage::NicknameRejected { reason })
                    .await
                {
                    warn!("Failed to re-prompt {}: {}", addr, e);
                    return;
                }
            }
            Err(_) => return,
        }
    }
}
