//! Per-round game state and the rules for applying a single guess

use crate::keywords::KeywordEntry;
use crate::player::Player;
use shared::MASK_PLACEHOLDER;
use std::collections::HashSet;

/// Points for revealing at least one position with a letter guess
pub const LETTER_POINTS: u32 = 1;
/// Points for winning the round
pub const WIN_POINTS: u32 = 5;

/// A guess classified by its length in characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guess {
    Letter(char),
    Word(String),
    Invalid,
}

/// Result of a letter guess against the keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterOutcome {
    AlreadyGuessed,
    Missing,
    Revealed { count: usize },
    Completed { count: usize },
}

/// What happened to the guesser's turn
///
/// Rejections leave the round and the player untouched; every other verdict
/// consumes one guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    AlreadyGuessed { letter: char },
    WholeWordTooEarly,
    Invalid,
    Revealed { letter: char, count: usize },
    NotInKeyword { letter: char },
    /// The guess finished the keyword. `count` is set for letter guesses.
    Won { letter: Option<(char, usize)> },
    Eliminated,
}

impl Verdict {
    pub fn consumes_turn(&self) -> bool {
        !matches!(
            self,
            Verdict::AlreadyGuessed { .. } | Verdict::WholeWordTooEarly | Verdict::Invalid
        )
    }
}

#[derive(Debug, Clone)]
pub struct Round {
    keyword: Vec<char>,
    hint: String,
    mask: Vec<char>,
    guessed: HashSet<char>,
    running: bool,
    cursor: usize,
}

impl Round {
    pub fn new(entry: &KeywordEntry) -> Self {
        let keyword: Vec<char> = entry.keyword.chars().collect();
        Self {
            mask: vec![MASK_PLACEHOLDER; keyword.len()],
            keyword,
            hint: entry.hint.clone(),
            guessed: HashSet::new(),
            running: true,
            cursor: 0,
        }
    }

    pub fn keyword(&self) -> String {
        self.keyword.iter().collect()
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn len(&self) -> usize {
        self.keyword.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyword.is_empty()
    }

    pub fn mask(&self) -> String {
        self.mask.iter().collect()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn finish(&mut self) {
        self.running = false;
    }

    pub fn is_solved(&self) -> bool {
        !self.mask.contains(&MASK_PLACEHOLDER)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    pub fn classify(&self, input: &str) -> Guess {
        let input = input.trim();
        let length = input.chars().count();
        if length == 1 {
            input.chars().next().map_or(Guess::Invalid, Guess::Letter)
        } else if length == self.keyword.len() && length > 0 {
            Guess::Word(input.to_string())
        } else {
            Guess::Invalid
        }
    }

    /// Records a letter and reveals every position where it occurs.
    pub fn guess_letter(&mut self, letter: char) -> LetterOutcome {
        if !self.guessed.insert(fold(letter)) {
            return LetterOutcome::AlreadyGuessed;
        }

        let count = self
            .keyword
            .iter()
            .filter(|&&c| same_letter(c, letter))
            .count();
        if count == 0 {
            return LetterOutcome::Missing;
        }

        self.mask = reveal(&self.keyword, &self.mask, letter);
        if self.is_solved() {
            self.running = false;
            LetterOutcome::Completed { count }
        } else {
            LetterOutcome::Revealed { count }
        }
    }

    /// Compares a whole-word guess case-insensitively. A correct guess
    /// reveals the keyword and stops the round.
    pub fn guess_word(&mut self, word: &str) -> bool {
        let matches = word.chars().count() == self.keyword.len()
            && word
                .chars()
                .zip(&self.keyword)
                .all(|(guess, &actual)| same_letter(guess, actual));
        if matches {
            self.mask = self.keyword.clone();
            self.running = false;
        }
        matches
    }

    /// Applies one line of input from `player` and updates their score,
    /// guess counter and active flag according to the outcome.
    pub fn apply_guess(&mut self, player: &mut Player, input: &str) -> Verdict {
        let verdict = match self.classify(input) {
            Guess::Invalid => Verdict::Invalid,
            Guess::Letter(letter) => match self.guess_letter(letter) {
                LetterOutcome::AlreadyGuessed => Verdict::AlreadyGuessed { letter },
                LetterOutcome::Missing => Verdict::NotInKeyword { letter },
                LetterOutcome::Revealed { count } => {
                    player.points += LETTER_POINTS;
                    Verdict::Revealed { letter, count }
                }
                LetterOutcome::Completed { count } => {
                    player.points += WIN_POINTS;
                    Verdict::Won {
                        letter: Some((letter, count)),
                    }
                }
            },
            Guess::Word(_) if player.guesses_taken == 0 => Verdict::WholeWordTooEarly,
            Guess::Word(word) => {
                if self.guess_word(&word) {
                    player.points += WIN_POINTS;
                    Verdict::Won { letter: None }
                } else {
                    player.active = false;
                    Verdict::Eliminated
                }
            }
        };

        if verdict.consumes_turn() {
            player.guesses_taken += 1;
        }
        verdict
    }
}

/// Recomputes the mask: a position shows the keyword character when it
/// matches `letter` or was already revealed.
pub fn reveal(keyword: &[char], mask: &[char], letter: char) -> Vec<char> {
    keyword
        .iter()
        .zip(mask)
        .map(|(&actual, &shown)| {
            if same_letter(actual, letter) || shown != MASK_PLACEHOLDER {
                actual
            } else {
                MASK_PLACEHOLDER
            }
        })
        .collect()
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}
