//! Keyword database loading and random selection
//!
//! The database is a flat text file: the first line holds the number of
//! entries N, followed by N pairs of lines (keyword, then hint).

use crate::error::KeywordError;
use log::info;
use rand::Rng;
use std::path::Path;

/// A keyword together with the hint shown to players
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordEntry {
    pub keyword: String,
    pub hint: String,
}

impl KeywordEntry {
    pub fn new(keyword: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            hint: hint.into(),
        }
    }
}

/// Read-only list of keywords loaded once at start-up
#[derive(Debug, Clone)]
pub struct KeywordStore {
    entries: Vec<KeywordEntry>,
}

impl KeywordStore {
    /// Builds a store from already validated entries. Fails on an empty list
    /// or an entry whose keyword could not be guessed.
    pub fn from_entries(entries: Vec<KeywordEntry>) -> Result<Self, KeywordError> {
        if entries.is_empty() {
            return Err(KeywordError::Empty);
        }
        for (index, entry) in entries.iter().enumerate() {
            if !is_valid_keyword(&entry.keyword) {
                return Err(KeywordError::InvalidKeyword {
                    index: index + 1,
                    keyword: entry.keyword.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Loads and parses the database file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, KeywordError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let store = Self::parse(&contents)?;
        info!(
            "Loaded {} keywords from {}",
            store.entries.len(),
            path.display()
        );
        Ok(store)
    }

    /// Parses the database format from a string
    pub fn parse(contents: &str) -> Result<Self, KeywordError> {
        let mut lines = contents.lines().map(str::trim);

        let count_line = lines
            .by_ref()
            .find(|line| !line.is_empty())
            .ok_or(KeywordError::MissingCount)?;
        let count: usize = count_line
            .parse()
            .map_err(|_| KeywordError::InvalidCount(count_line.to_string()))?;
        if count == 0 {
            return Err(KeywordError::Empty);
        }

        let mut entries = Vec::with_capacity(count);
        while entries.len() < count {
            let (Some(keyword), Some(hint)) = (lines.next(), lines.next()) else {
                return Err(KeywordError::Truncated {
                    expected: count,
                    found: entries.len(),
                });
            };
            entries.push(KeywordEntry::new(keyword, hint));
        }

        Self::from_entries(entries)
    }

    /// Picks one entry uniformly at random
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &KeywordEntry {
        &self.entries[rng.gen_range(0..self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_valid_keyword(keyword: &str) -> bool {
    !keyword.is_empty() && !keyword.chars().any(char::is_whitespace)
}
