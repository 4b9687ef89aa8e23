use crate::{SolverError, WORD_LENGTH};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Write};
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A validated five-letter word, stored as lowercase ASCII bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word([u8; WORD_LENGTH]);

impl Word {
    /// Validates and normalizes a word (case-insensitive).
    pub fn new(word: &str) -> Result<Self, SolverError> {
        let len = word.chars().count();
        if len != WORD_LENGTH {
            return Err(SolverError::InvalidWordLength {
                expected: WORD_LENGTH,
                found: len,
            });
        }

        let mut letters = [0u8; WORD_LENGTH];
        for (slot, ch) in letters.iter_mut().zip(word.chars()) {
            if !ch.is_ascii_alphabetic() {
                return Err(SolverError::InvalidCharacters {
                    word: word.to_string(),
                });
            }
            *slot = ch.to_ascii_lowercase() as u8;
        }
        Ok(Self(letters))
    }

    /// Returns the lowercase letters of the word.
    pub fn letters(&self) -> &[u8; WORD_LENGTH] {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &letter in &self.0 {
            f.write_char(char::from(letter))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word(\"{self}\")")
    }
}

impl FromStr for Word {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Word {
    type Error = SolverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.to_string()
    }
}

/// Validates every word of a list, failing on the first malformed entry.
pub fn words<'a>(raw: impl IntoIterator<Item = &'a str>) -> Result<Vec<Word>, SolverError> {
    raw.into_iter().map(Word::new).collect()
}

/// Parses a newline separated word list.
///
/// Blank lines and entries that are not five ascii letters are skipped, and
/// duplicates keep their first position.
pub fn parse_words(text: &str) -> Vec<Word> {
    let mut seen = HashSet::new();
    text.lines()
        .filter_map(|line| {
            let word = line.trim();
            if word.is_empty() {
                return None;
            }
            Word::new(word).ok()
        })
        .filter(|word| seen.insert(*word))
        .collect()
}

/// Reads a word list from disk; see [`parse_words`] for the accepted format.
pub fn load_words(path: impl AsRef<Path>) -> io::Result<Vec<Word>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_words(&text))
}

/// The guessable words: every solution, then the extra guesses not already
/// present, truncated to `limit` words when `limit` is non-zero.
///
/// Both the solver and the precompute tool build their vocabulary here, so a
/// tree computed with a limit matches a solver run with the same limit.
pub fn merge_vocabulary(solutions: &[Word], extra: &[Word], limit: usize) -> Vec<Word> {
    let mut seen: HashSet<Word> = solutions.iter().copied().collect();
    let mut vocabulary = solutions.to_vec();
    vocabulary.extend(extra.iter().copied().filter(|word| seen.insert(*word)));
    if limit > 0 {
        vocabulary.truncate(limit);
    }
    vocabulary
}

/// A stable 64-bit FNV-1a digest of a word list.
///
/// Used as a value-based cache key: two separately built lists with the same
/// contents share a digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordListDigest(u64);

impl WordListDigest {
    /// Digest of the words in the given order.
    pub fn of_list(words: &[Word]) -> Self {
        Self(fnv1a(words.iter()))
    }

    /// Digest of the words as a set, independent of their order.
    pub fn of_set(words: &[Word]) -> Self {
        let mut sorted = words.to_vec();
        sorted.sort_unstable();
        Self(fnv1a(sorted.iter()))
    }

    /// The raw digest.
    pub fn value(self) -> u64 {
        self.0
    }
}

fn fnv1a<'a>(words: impl Iterator<Item = &'a Word>) -> u64 {
    words
        .flat_map(|word| word.letters().iter())
        .fold(FNV_OFFSET_BASIS, |hash, &byte| {
            (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
        })
}
