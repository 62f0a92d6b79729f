//! Client-side view of the game, updated from server messages

use shared::ServerMessage;

/// Where the client is in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Registering,
    WaitingForPlayers,
    Playing,
    RoundOver,
    Finished,
}

/// Everything the client knows about the game so far.
///
/// The state machine is driven only by message kinds; the text of a message
/// is never inspected.
#[derive(Debug, Clone)]
pub struct ClientGameState {
    phase: Phase,
    order: Option<usize>,
    hint: Option<String>,
    mask: Option<String>,
    awaiting_reply: bool,
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Registering,
            order: None,
            hint: None,
            mask: None,
            awaiting_reply: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn order(&self) -> Option<usize> {
        self.order
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn mask(&self) -> Option<&str> {
        self.mask.as_deref()
    }

    /// Whether the server is waiting for a line from this client
    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::Registered { order } => {
                self.order = Some(*order);
                self.phase = Phase::WaitingForPlayers;
            }
            ServerMessage::RoundStarted { hint, mask, .. } => {
                self.phase = Phase::Playing;
                self.hint = Some(hint.clone());
                self.mask = Some(mask.clone());
            }
            ServerMessage::Occurrences { mask, .. } => {
                self.mask = Some(mask.clone());
            }
            ServerMessage::Winner { keyword, .. } | ServerMessage::NoWinner { keyword } => {
                self.mask = Some(keyword.clone());
                self.phase = Phase::RoundOver;
            }
            ServerMessage::GameEnding | ServerMessage::GameFull => {
                self.phase = Phase::Finished;
            }
            _ => {}
        }

        // Notices about other players arrive at any time and leave a pending
        // prompt open
        let keeps_prompt = matches!(
            message,
            ServerMessage::PlayerLeft { .. }
                | ServerMessage::PlayerEliminated { .. }
                | ServerMessage::WaitingForPlayers { .. }
        );
        if message.expects_reply() {
            self.awaiting_reply = true;
        } else if !keeps_prompt {
            self.awaiting_reply = false;
        }
    }

    /// Reminder of the board shown above a turn prompt
    pub fn status_line(&self) -> Option<String> {
        let mask = self.mask()?;
        match self.hint() {
            Some(hint) => Some(format!("Current Word: {} (Hint: {})", mask, hint)),
            None => Some(format!("Current Word: {}", mask)),
        }
    }

    /// Called once a line has been sent in reply
    pub fn replied(&mut self) {
        self.awaiting_reply = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::NicknameRejection;

    #[test]
    fn test_registration_flow() {
        let mut state = ClientGameState::new();
        assert_eq!(state.phase(), Phase::Registering);

        state.apply(&ServerMessage::NicknamePrompt);
        assert!(state.awaiting_reply());
        state.replied();
        assert!(!state.awaiting_reply());

        state.apply(&ServerMessage::NicknameRejected {
            reason: NicknameRejection::Taken,
        });
        assert!(state.awaiting_reply());
        state.replied();

        state.apply(&ServerMessage::Registered { order: 2 });
        assert_eq!(state.order(), Some(2));
        assert_eq!(state.phase(), Phase::WaitingForPlayers);
        assert!(!state.awaiting_reply());
    }

    #[test]
    fn test_round_updates_mask() {
        let mut state = ClientGameState::new();
        state.apply(&ServerMessage::RoundStarted {
            length: 5,
            hint: "a common fruit".to_string(),
            mask: "*****".to_string(),
        });
        assert_eq!(state.phase(), Phase::Playing);
        assert_eq!(state.hint(), Some("a common fruit"));
        assert_eq!(state.mask(), Some("*****"));

        state.apply(&ServerMessage::Occurrences {
            nickname: "bob".to_string(),
            letter: 'p',
            count: 2,
            mask: "*pp**".to_string(),
        });
        assert_eq!(state.mask(), Some("*pp**"));

        state.apply(&ServerMessage::Winner {
            nickname: "bob".to_string(),
            keyword: "apple".to_string(),
        });
        assert_eq!(state.mask(), Some("apple"));
        assert_eq!(state.phase(), Phase::RoundOver);
    }

    #[test]
    fn test_turn_prompt_lifecycle() {
        let mut state = ClientGameState::new();
        state.apply(&ServerMessage::YourTurn {
            nickname: "alice".to_string(),
            guesses_left: 5,
            whole_word_allowed: false,
            timeout_secs: 60,
        });
        assert!(state.awaiting_reply());

        // Another player leaving does not close our prompt
        state.apply(&ServerMessage::PlayerLeft {
            nickname: "bob".to_string(),
        });
        assert!(state.awaiting_reply());

        state.apply(&ServerMessage::MissedTurn);
        assert!(!state.awaiting_reply());
    }

    #[test]
    fn test_rejection_reopens_prompt() {
        let mut state = ClientGameState::new();
        state.apply(&ServerMessage::WholeWordTooEarly);
        assert!(state.awaiting_reply());
        state.replied();
        state.apply(&ServerMessage::AlreadyGuessed { letter: 'e' });
        assert!(state.awaiting_reply());
    }

    #[test]
    fn test_status_line_follows_mask() {
        let mut state = ClientGameState::new();
        assert_eq!(state.status_line(), None);

        state.apply(&ServerMessage::RoundStarted {
            length: 4,
            hint: "a language".to_string(),
            mask: "****".to_string(),
        });
        state.apply(&ServerMessage::Occurrences {
            nickname: "bob".to_string(),
            letter: 's',
            count: 1,
            mask: "**s*".to_string(),
        });
        assert_eq!(
            state.status_line().as_deref(),
            Some("Current Word: **s* (Hint: a language)")
        );
    }

    #[test]
    fn test_game_ending_finishes() {
        let mut state = ClientGameState::new();
        state.apply(&ServerMessage::RestartPrompt);
        assert!(state.awaiting_reply());
        state.replied();
        state.apply(&ServerMessage::GameEnding);
        assert!(state.is_finished());
        assert!(!state.awaiting_reply());
    }
}
