//! Turn-based game engine
//!
//! The engine task is the only writer of player and round state once the
//! roster is complete. It reads from exactly one connection at a time (the
//! player whose turn it is) and broadcasts everything else.
//!
//! ```text
//! AWAITING_QUORUM ──roster──▶ ROUND_IN_PROGRESS ──win / exhausted──▶ ROUND_CONCLUDED
//!                                    ▲                                     │
//!                                    └──────────── restart vote ───────────┘
//! ```

use crate::config::GameConfig;
use crate::connection::Received;
use crate::keywords::KeywordStore;
use crate::lifecycle::{self, VoteResult};
use crate::messaging::Session;
use crate::player::Player;
use crate::round::{Round, Verdict};
use log::{debug, info};
use rand::Rng;
use shared::ServerMessage;
use tokio::time::Instant;

/// How a round came to an end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundResult {
    Won { winner: usize },
    Exhausted,
}

/// What happened during one player's turn
#[derive(Debug, Clone, PartialEq, Eq)]
enum TurnOutcome {
    Played(Verdict),
    TimedOut,
    Disconnected,
}

pub struct GameEngine<R> {
    session: Session,
    keywords: KeywordStore,
    config: GameConfig,
    rng: R,
}

impl<R: Rng> GameEngine<R> {
    pub fn new(players: Vec<Player>, keywords: KeywordStore, config: GameConfig, rng: R) -> Self {
        Self {
            session: Session::new(players),
            keywords,
            config,
            rng,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Plays rounds until the players vote to stop, then closes every
    /// connection.
    pub async fn run(mut self) {
        let mut rounds = 0u32;
        loop {
            rounds += 1;
            let result = self.play_round().await;
            info!("Round {} finished: {:?}", rounds, result);

            let standings = lifecycle::leaderboard(self.session.players());
            self.session
                .broadcast(&ServerMessage::Leaderboard { standings })
                .await;

            match lifecycle::collect_votes(&mut self.session, self.config.vote_timeout).await {
                VoteResult::Restart => {
                    lifecycle::reset(&mut self.session);
                    self.session.broadcast(&ServerMessage::Restarting).await;
                }
                VoteResult::End => break,
            }
        }

        info!("Session over after {} round(s)", rounds);
        self.session.close_all(&ServerMessage::GameEnding).await;
    }

    /// Plays one round from the start broadcast to a win or until nobody
    /// can guess any more.
    pub async fn play_round(&mut self) -> RoundResult {
        let entry = self.keywords.draw(&mut self.rng).clone();
        let mut round = Round::new(&entry);
        info!("New round: {} letters", round.len());
        debug!("Keyword for this round: {:?}", entry.keyword);

        self.session
            .broadcast(&ServerMessage::RoundStarted {
                length: round.len(),
                hint: round.hint().to_string(),
                mask: round.mask(),
            })
            .await;

        let players = self.session.len();
        let budget = self.config.guess_budget;

        while round.is_running() {
            if !self.session.players().iter().any(|p| p.can_play(budget)) {
                round.finish();
                break;
            }

            let index = round.cursor() % players;
            if !self.session.player(index).can_play(budget) {
                round.advance();
                continue;
            }

            let outcome = self.take_turn(index, &mut round).await;
            debug!(
                "Turn of {}: {:?}",
                self.session.player(index).nickname,
                outcome
            );

            if let TurnOutcome::Played(Verdict::Won { .. }) = outcome {
                return RoundResult::Won { winner: index };
            }
            round.advance();
        }

        self.session
            .broadcast(&ServerMessage::NoWinner {
                keyword: round.keyword(),
            })
            .await;
        RoundResult::Exhausted
    }

    /// Runs a single turn. Rejected guesses re-prompt the same player
    /// against the deadline set when the turn started.
    async fn take_turn(&mut self, index: usize, round: &mut Round) -> TurnOutcome {
        let budget = self.config.guess_budget;
        let timeout_secs = self.config.turn_timeout.as_secs();
        let deadline = Instant::now() + self.config.turn_timeout;

        let player = self.session.player_mut(index);
        let nickname = player.nickname.clone();
        if let Some(connection) = player.connection_mut() {
            connection.discard_pending();
        }

        let prompt = ServerMessage::YourTurn {
            nickname: nickname.clone(),
            guesses_left: player.guesses_left(budget),
            whole_word_allowed: player.guesses_taken > 0,
            timeout_secs,
        };
        let waiting = ServerMessage::WaitingForTurn {
            nickname: nickname.clone(),
        };
        self.session
            .broadcast_except(index, &prompt, &waiting)
            .await;

        loop {
            // A steady stream of rejected guesses must not outlive the turn
            let received = match self.session.player_mut(index).connection_mut() {
                Some(_) if Instant::now() >= deadline => Received::TimedOut,
                Some(connection) => connection.recv_until(deadline).await,
                None => Received::Closed,
            };

            let input = match received {
                Received::Line(line) => line,
                Received::TimedOut => {
                    info!("{} missed their turn", nickname);
                    self.session.player_mut(index).guesses_taken += 1;
                    self.session
                        .send_to(index, &ServerMessage::MissedTurn)
                        .await;
                    return TurnOutcome::TimedOut;
                }
                Received::Closed => {
                    info!("{} disconnected during their turn", nickname);
                    self.session.player_mut(index).disconnect();
                    self.session
                        .broadcast(&ServerMessage::PlayerLeft { nickname })
                        .await;
                    return TurnOutcome::Disconnected;
                }
            };

            let verdict = round.apply_guess(self.session.player_mut(index), &input);
            self.announce(index, &verdict, round).await;

            if verdict.consumes_turn() {
                return TurnOutcome::Played(verdict);
            }
        }
    }

    /// Tells the players about the result of a guess
    async fn announce(&mut self, index: usize, verdict: &Verdict, round: &Round) {
        let nickname = self.session.player(index).nickname.clone();
        match verdict {
            Verdict::AlreadyGuessed { letter } => {
                self.session
                    .send_to(index, &ServerMessage::AlreadyGuessed { letter: *letter })
                    .await;
            }
            Verdict::WholeWordTooEarly => {
                self.session
                    .send_to(index, &ServerMessage::WholeWordTooEarly)
                    .await;
            }
            Verdict::Invalid => {
                self.session
                    .send_to(index, &ServerMessage::InvalidGuess)
                    .await;
            }
            Verdict::Revealed { letter, count } => {
                self.session
                    .broadcast(&ServerMessage::Occurrences {
                        nickname,
                        letter: *letter,
                        count: *count,
                        mask: round.mask(),
                    })
                    .await;
            }
            Verdict::NotInKeyword { letter } => {
                self.session
                    .send_to(index, &ServerMessage::NotInKeyword { letter: *letter })
                    .await;
            }
            Verdict::Won { letter } => {
                if let Some((letter, count)) = letter {
                    self.session
                        .broadcast(&ServerMessage::Occurrences {
                            nickname: nickname.clone(),
                            letter: *letter,
                            count: *count,
                            mask: round.mask(),
                        })
                        .await;
                }
                info!("{} won with {:?}", nickname, round.keyword());
                self.session
                    .broadcast(&ServerMessage::Winner {
                        nickname,
                        keyword: round.keyword(),
                    })
                    .await;
            }
            Verdict::Eliminated => {
                info!("{} guessed the wrong keyword and is out", nickname);
                let eliminated = ServerMessage::PlayerEliminated { nickname };
                self.session
                    .broadcast_except(index, &ServerMessage::Eliminated, &eliminated)
                    .await;
            }
        }
    }
}
