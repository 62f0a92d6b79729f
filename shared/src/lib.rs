//! Wire protocol shared by the Magical Wheel server and client.
//!
//! Clients send plain text lines (a nickname, a guess or a restart vote).
//! The server answers with one JSON object per line, each one a tagged
//! [`ServerMessage`]. Clients dispatch on the `kind` discriminant and print
//! the [`Display`](std::fmt::Display) form for humans.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5555;

/// Longest line accepted in either direction, matching the historical
/// 1024-byte reads.
pub const MAX_LINE_LEN: usize = 1024;
pub const MAX_NICKNAME_LEN: usize = 10;
pub const MASK_PLACEHOLDER: char = '*';

/// Reason a nickname was refused during registration.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NicknameRejection {
    Taken,
    TooLong,
    Empty,
}

/// One row of the end-of-round leaderboard.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Standing {
    pub rank: usize,
    pub order: usize,
    pub nickname: String,
    pub points: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerMessage {
    // Registration
    NicknamePrompt,
    NicknameRejected {
        reason: NicknameRejection,
    },
    Registered {
        order: usize,
    },
    WaitingForPlayers {
        registered: usize,
        required: usize,
    },
    GameFull,

    // Round
    RoundStarted {
        length: usize,
        hint: String,
        mask: String,
    },
    YourTurn {
        nickname: String,
        guesses_left: u32,
        whole_word_allowed: bool,
        timeout_secs: u64,
    },
    WaitingForTurn {
        nickname: String,
    },
    AlreadyGuessed {
        letter: char,
    },
    WholeWordTooEarly,
    InvalidGuess,
    Occurrences {
        nickname: String,
        letter: char,
        count: usize,
        mask: String,
    },
    NotInKeyword {
        letter: char,
    },
    Eliminated,
    PlayerEliminated {
        nickname: String,
    },
    PlayerLeft {
        nickname: String,
    },
    MissedTurn,
    Winner {
        nickname: String,
        keyword: String,
    },
    NoWinner {
        keyword: String,
    },

    // End of round
    Leaderboard {
        standings: Vec<Standing>,
    },
    RestartPrompt,
    Restarting,
    GameEnding,
}

impl ServerMessage {
    /// Whether the receiving client is expected to answer with a line.
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            ServerMessage::NicknamePrompt
                | ServerMessage::NicknameRejected { .. }
                | ServerMessage::YourTurn { .. }
                | ServerMessage::AlreadyGuessed { .. }
                | ServerMessage::WholeWordTooEarly
                | ServerMessage::InvalidGuess
                | ServerMessage::RestartPrompt
        )
    }

    /// Whether the server closes the connection right after this message.
    pub fn is_final(&self) -> bool {
        matches!(self, ServerMessage::GameEnding | ServerMessage::GameFull)
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::NicknamePrompt => {
                write!(f, "Welcome to The Magical Wheel!\nEnter a nickname: ")
            }
            ServerMessage::NicknameRejected { .. } => write!(
                f,
                "Nickname already taken or invalid length. Choose another one: "
            ),
            ServerMessage::Registered { order } => write!(
                f,
                "Registration Completed Successfully\nYou are Player {} in the game",
                order
            ),
            ServerMessage::WaitingForPlayers {
                registered,
                required,
            } => write!(
                f,
                "Waiting for other players to join ({}/{})...",
                registered, required
            ),
            ServerMessage::GameFull => write!(f, "The game is full. Please try again later."),
            ServerMessage::RoundStarted { length, hint, mask } => write!(
                f,
                "Game started!\nKeyword Length: {}\nHint: {}\nCurrent Word: {}",
                length, hint, mask
            ),
            ServerMessage::YourTurn {
                nickname,
                guesses_left,
                whole_word_allowed,
                timeout_secs,
            } => {
                write!(
                    f,
                    "Player {}, it's your turn! ({} guess(es) left, {}s to answer)\n",
                    nickname, guesses_left, timeout_secs
                )?;
                if *whole_word_allowed {
                    write!(f, "Guess a character or the whole keyword: ")
                } else {
                    write!(
                        f,
                        "Guess a character (you can guess the keyword only after the 2nd turn): "
                    )
                }
            }
            ServerMessage::WaitingForTurn { nickname } => {
                write!(f, "Waiting for {} to guess...", nickname)
            }
            ServerMessage::AlreadyGuessed { letter } => write!(
                f,
                "Character '{}' was already guessed. Pick another one: ",
                letter
            ),
            ServerMessage::WholeWordTooEarly => write!(
                f,
                "You can guess the keyword only after the 2nd turn. Guess a character: "
            ),
            ServerMessage::InvalidGuess => write!(f, "Invalid guess. Please try again: "),
            ServerMessage::Occurrences {
                nickname,
                letter,
                count,
                mask,
            } => write!(
                f,
                "{} found character '{}' with {} occurrence(s).\nCurrent Word: {}",
                nickname, letter, count, mask
            ),
            ServerMessage::NotInKeyword { letter } => {
                write!(f, "Character '{}' is not in the keyword.", letter)
            }
            ServerMessage::Eliminated => {
                write!(f, "Incorrect guess! You are out of the game.")
            }
            ServerMessage::PlayerEliminated { nickname } => {
                write!(f, "{} guessed the wrong keyword and was eliminated.", nickname)
            }
            ServerMessage::PlayerLeft { nickname } => {
                write!(f, "{} has left the game.", nickname)
            }
            ServerMessage::MissedTurn => write!(f, "Time is up, you missed your turn!"),
            ServerMessage::Winner { nickname, keyword } => write!(
                f,
                "Congratulations to {} with the correct keyword: {}",
                nickname, keyword
            ),
            ServerMessage::NoWinner { keyword } => {
                write!(f, "Nobody found it this round. The keyword was: {}", keyword)
            }
            ServerMessage::Leaderboard { standings } => {
                write!(f, "Game ended!\nPoints:")?;
                for standing in standings {
                    write!(
                        f,
                        "\n{}. {}: {}",
                        standing.rank, standing.nickname, standing.points
                    )?;
                }
                Ok(())
            }
            ServerMessage::RestartPrompt => {
                write!(f, "Do you want to restart the game? (Y/N): ")
            }
            ServerMessage::Restarting => write!(f, "Everyone is in, starting a new round!"),
            ServerMessage::GameEnding => write!(f, "Game is ending. Thank you for playing!"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encodes a message as a single newline-terminated JSON line.
pub fn encode_line(message: &ServerMessage) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(message).map_err(ProtocolError::Encode)?;
    line.push('\n');
    Ok(line)
}

/// Decodes one line produced by [`encode_line`]. Surrounding whitespace,
/// including the line terminator, is ignored.
pub fn decode_line(line: &str) -> Result<ServerMessage, ProtocolError> {
    serde_json::from_str(line.trim()).map_err(ProtocolError::Decode)
}

/// Interprets a restart vote. Only an explicit "n" declines.
pub fn is_decline(vote: &str) -> bool {
    vote.trim().eq_ignore_ascii_case("n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_line_is_tagged_json() {
        let line = encode_line(&ServerMessage::Registered { order: 2 }).unwrap();
        assert_eq!(line, "{\"kind\":\"registered\",\"order\":2}\n");

        let line = encode_line(&ServerMessage::GameEnding).unwrap();
        assert_eq!(line, "{\"kind\":\"game_ending\"}\n");
    }

    #[test]
    fn test_decode_line_handles_terminators() {
        let message = decode_line("{\"kind\":\"missed_turn\"}\r\n").unwrap();
        assert_eq!(message, ServerMessage::MissedTurn);
    }

    #[test]
    fn test_decode_line_rejects_garbage() {
        assert!(matches!(
            decode_line("it's your turn"),
            Err(ProtocolError::Decode(_))
        ));
        assert!(decode_line("{\"kind\":\"no_such_kind\"}").is_err());
    }

    #[test]
    fn test_leaderboard_survives_the_wire() {
        let message = ServerMessage::Leaderboard {
            standings: vec![
                Standing {
                    rank: 1,
                    order: 1,
                    nickname: "alice".to_string(),
                    points: 6,
                },
                Standing {
                    rank: 2,
                    order: 2,
                    nickname: "bob".to_string(),
                    points: 0,
                },
            ],
        };
        let decoded = decode_line(&encode_line(&message).unwrap()).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(
            decoded.to_string(),
            "Game ended!\nPoints:\n1. alice: 6\n2. bob: 0"
        );
    }

    #[test]
    fn test_display_keeps_trigger_phrases() {
        let turn = ServerMessage::YourTurn {
            nickname: "alice".to_string(),
            guesses_left: 5,
            whole_word_allowed: false,
            timeout_secs: 60,
        };
        assert!(turn.to_string().contains("it's your turn"));

        let found = ServerMessage::Occurrences {
            nickname: "alice".to_string(),
            letter: 'p',
            count: 2,
            mask: "*pp**".to_string(),
        };
        assert!(found.to_string().contains("occurrence"));
        assert!(found.to_string().contains("*pp**"));

        let cases = [
            (
                ServerMessage::NotInKeyword { letter: 'z' },
                "is not in the keyword",
            ),
            (ServerMessage::Eliminated, "out of the game"),
            (
                ServerMessage::AlreadyGuessed { letter: 'p' },
                "already guessed",
            ),
            (ServerMessage::MissedTurn, "missed your turn"),
            (ServerMessage::WholeWordTooEarly, "only after the 2nd turn"),
            (ServerMessage::GameEnding, "Game is ending"),
            (
                ServerMessage::Winner {
                    nickname: "alice".to_string(),
                    keyword: "apple".to_string(),
                },
                "correct keyword",
            ),
        ];
        for (message, phrase) in cases {
            assert!(
                message.to_string().contains(phrase),
                "{:?} should mention {:?}",
                message,
                phrase
            );
        }
    }

    #[test]
    fn test_round_started_field_order() {
        let text = ServerMessage::RoundStarted {
            length: 5,
            hint: "a common fruit".to_string(),
            mask: "*****".to_string(),
        }
        .to_string();

        let length_at = text.find('5').unwrap();
        let hint_at = text.find("a common fruit").unwrap();
        let mask_at = text.find("*****").unwrap();
        assert!(text.starts_with("Game started!"));
        assert!(length_at < hint_at && hint_at < mask_at);
    }

    #[test]
    fn test_expects_reply() {
        assert!(ServerMessage::NicknamePrompt.expects_reply());
        assert!(ServerMessage::RestartPrompt.expects_reply());
        assert!(ServerMessage::InvalidGuess.expects_reply());
        assert!(!ServerMessage::MissedTurn.expects_reply());
        assert!(!ServerMessage::WaitingForTurn {
            nickname: "bob".to_string()
        }
        .expects_reply());
    }

    #[test]
    fn test_is_decline() {
        assert!(is_decline("n"));
        assert!(is_decline(" N \n"));
        assert!(!is_decline("y"));
        assert!(!is_decline("no"));
        assert!(!is_decline(""));
    }
}
