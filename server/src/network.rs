//! Server network layer: accepting connections and coordinating the session

use crate::config::GameConfig;
use crate::connection::Connection;
use crate::engine::GameEngine;
use crate::error::ServerError;
use crate::keywords::KeywordStore;
use crate::player::Player;
use crate::registry::{register_connection, run_registrar, RegistrarCommand, Registry};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::ServerMessage;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;

/// Registration requests queued for the registrar
const REGISTRAR_QUEUE: usize = 64;

/// Game server hosting exactly one session.
///
/// Connections are admitted while seats are free; each one registers in its
/// own task. When the roster is complete the game engine takes over, and
/// any further connection is told the game is full. [`Server::run`] returns
/// once the session has been torn down.
pub struct Server {
    listener: TcpListener,
    config: GameConfig,
    keywords: KeywordStore,
}

impl Server {
    pub async fn bind(
        addr: &str,
        config: GameConfig,
        keywords: KeywordStore,
    ) -> Result<Self, ServerError> {
        config.validate()?;
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            config,
            keywords,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Spawns the game task, which waits for the roster and then plays
    fn spawn_session(
        &self,
        roster: oneshot::Receiver<Vec<Player>>,
    ) -> JoinHandle<Result<(), ServerError>> {
        let keywords = self.keywords.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            let players = roster.await.map_err(|_| ServerError::RegistrarClosed)?;
            info!("Quorum reached, starting the game");
            GameEngine::new(players, keywords, config, StdRng::from_entropy())
                .run()
                .await;
            Ok(())
        })
    }

    /// Main server loop: accepts connections until the session is over
    pub async fn run(self) -> Result<(), ServerError> {
        let seats = Arc::new(Semaphore::new(self.config.players));
        let (registrar_tx, registrar_rx) = mpsc::channel(REGISTRAR_QUEUE);
        let (ready_tx, ready_rx) = oneshot::channel();

        tokio::spawn(run_registrar(
            Registry::new(self.config.players),
            registrar_rx,
            ready_tx,
        ));
        let mut session = self.spawn_session(ready_rx);

        info!(
            "Waiting for {} players ({} guesses each, {}s per turn)",
            self.config.players,
            self.config.guess_budget,
            self.config.turn_timeout.as_secs()
        );

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.admit(stream, addr, &seats, &registrar_tx),
                        Err(e) => warn!("Failed to accept connection: {}", e),
                    }
                },

                result = &mut session => {
                    return match result {
                        Ok(Ok(())) => {
                            info!("Game session ended, shutting down");
                            Ok(())
                        }
                        Ok(Err(e)) => {
                            error!("Game session failed: {}", e);
                            Err(e)
                        }
                        Err(e) => {
                            error!("Game session task panicked: {}", e);
                            Err(e.into())
                        }
                    };
                },
            }
        }
    }

    /// Hands a new connection to a registration task, or turns it away if
    /// every seat is taken
    fn admit(
        &self,
        stream: TcpStream,
        addr: SocketAddr,
        seats: &Arc<Semaphore>,
        registrar: &mpsc::Sender<RegistrarCommand>,
    ) {
        info!("Connection from {}", addr);
        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not disable Nagle for {}: {}", addr, e);
        }
        let connection = Connection::new(stream, addr).with_send_timeout(self.config.send_timeout);

        match Arc::clone(seats).try_acquire_owned() {
            Ok(seat) => {
                tokio::spawn(register_connection(
                    connection,
                    registrar.clone(),
                    seat,
                    self.config.registration_timeout,
                ));
            }
            Err(_) => {
                info!("Turning away {}: game is full", addr);
                tokio::spawn(reject_full(connection));
            }
        }
    }
}

async fn reject_full(mut connection: Connection) {
    if let Err(e) = connection.send(&ServerMessage::GameFull).await {
        debug!("Failed to notify {}: {}", connection.addr(), e);
    }
    connection.close().await;
}
