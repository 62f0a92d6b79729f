//! Game settings shared by the listener, registry and engine

use crate::error::ConfigError;

pub use crate::connection::DEFAULT_SEND_TIMEOUT;
use std::time::Duration;

/// Hard cap on the number of seats in a session
pub const MAX_PLAYERS: usize = 8;

pub const DEFAULT_PLAYERS: usize = 2;
pub const DEFAULT_GUESS_BUDGET: u32 = 5;
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_VOTE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings for one game session.
///
/// Built from command line arguments by the binary; tests construct it
/// directly with shorter timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Quorum: players required before a round starts
    pub players: usize,
    /// Guesses each player may take per round
    pub guess_budget: u32,
    /// Time a player has to answer on their turn
    pub turn_timeout: Duration,
    /// Time every player has to answer the restart prompt
    pub vote_timeout: Duration,
    /// Time a pending connection has to offer each nickname before its seat
    /// is freed
    pub registration_timeout: Duration,
    /// Longest a write to one player may block
    pub send_timeout: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: DEFAULT_PLAYERS,
            guess_budget: DEFAULT_GUESS_BUDGET,
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            vote_timeout: DEFAULT_VOTE_TIMEOUT,
            registration_timeout: DEFAULT_REGISTRATION_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }
}

impl GameConfig {
    /// Checks that the settings describe a playable session
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(ConfigError::PlayerCount {
                actual: self.players,
                max: MAX_PLAYERS,
            });
        }
        if self.guess_budget == 0 {
            return Err(ConfigError::ZeroGuesses);
        }
        if self.turn_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("turn"));
        }
        if self.vote_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("vote"));
        }
        if self.registration_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("registration"));
        }
        if self.send_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("send"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.players, 2);
        assert_eq!(config.guess_budget, 5);
        assert_eq!(config.turn_timeout, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_player_count_bounds() {
        let mut config = GameConfig {
            players: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::PlayerCount {
                actual: 0,
                max: MAX_PLAYERS
            })
        );

        config.players = MAX_PLAYERS + 1;
        assert!(config.validate().is_err());

        config.players = MAX_PLAYERS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = GameConfig {
            guess_budget: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroGuesses));

        let config = GameConfig {
            turn_timeout: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout("turn")));

        let config = GameConfig {
            registration_timeout: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("registration"))
        );

        let config = GameConfig {
            send_timeout: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout("send")));
    }
}
