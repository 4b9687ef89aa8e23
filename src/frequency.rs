//! Letter frequencies by position over the answer list.
//!
//! Used to order guesses that information gain alone can not separate: a
//! word whose letters sit where answers usually have them is preferred.

use crate::{ScoredGuess, WORD_LENGTH, Word};
use std::cmp::Ordering;
use std::fmt;

const ALPHABET: usize = 26;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionalFrequency {
    counts: [[usize; ALPHABET]; WORD_LENGTH],
    solutions_count: usize,
}

impl PositionalFrequency {
    /// Counts every letter at every position of `solutions`.
    pub fn from_solutions(solutions: &[Word]) -> Self {
        let mut counts = [[0; ALPHABET]; WORD_LENGTH];
        for word in solutions {
            for (position, &letter) in word.letters().iter().enumerate() {
                counts[position][(letter - b'a') as usize] += 1;
            }
        }
        Self {
            counts,
            solutions_count: solutions.len(),
        }
    }

    /// Number of answers the counts were taken from.
    pub fn solutions_count(&self) -> usize {
        self.solutions_count
    }

    /// Occurrences of `letter` at `position` (0-based). Zero for anything out
    /// of range.
    pub fn count(&self, letter: char, position: usize) -> usize {
        match (letter_index(letter), self.counts.get(position)) {
            (Some(idx), Some(row)) => row[idx],
            _ => 0,
        }
    }

    /// Sum over positions of the share of answers with the same letter there.
    pub fn score_word(&self, word: Word) -> f64 {
        if self.solutions_count == 0 {
            return 0.0;
        }
        let total = self.solutions_count as f64;
        word.letters()
            .iter()
            .enumerate()
            .map(|(position, &letter)| self.counts[position][(letter - b'a') as usize] as f64 / total)
            .sum()
    }

    /// The `n` most common letters at `position`, most common first and
    /// alphabetical among equals. Letters that never occur are left out.
    pub fn top_letters(&self, position: usize, n: usize) -> Vec<(char, usize)> {
        let Some(row) = self.counts.get(position) else {
            return Vec::new();
        };
        let mut letters: Vec<(char, usize)> = row
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(idx, &count)| (char::from(b'a' + idx as u8), count))
            .collect();
        letters.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        letters.truncate(n);
        letters
    }

    /// Shannon entropy in bits of the letter distribution at `position`.
    pub fn position_entropy(&self, position: usize) -> f64 {
        let Some(row) = self.counts.get(position) else {
            return 0.0;
        };
        if self.solutions_count == 0 {
            return 0.0;
        }
        let total = self.solutions_count as f64;
        row.iter()
            .filter(|count| **count > 0)
            .map(|&count| {
                let p = count as f64 / total;
                -p * p.log2()
            })
            .sum()
    }

    /// Reorders guesses of equal information gain (and equal candidacy) by
    /// descending positional score. The sort is stable, so remaining ties keep
    /// their incoming order.
    pub fn rank_ties(&self, ranked: &mut [ScoredGuess]) {
        ranked.sort_by(|a, b| {
            b.info_gain
                .partial_cmp(&a.info_gain)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.is_candidate.cmp(&a.is_candidate))
                .then_with(|| {
                    self.score_word(b.word)
                        .partial_cmp(&self.score_word(a.word))
                        .unwrap_or(Ordering::Equal)
                })
        });
    }
}

fn letter_index(letter: char) -> Option<usize> {
    let lower = letter.to_ascii_lowercase();
    lower
        .is_ascii_lowercase()
        .then(|| (lower as u8 - b'a') as usize)
}

impl fmt::Display for PositionalFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Positional letter frequencies ({} solutions)",
            self.solutions_count
        )?;
        for position in 0..WORD_LENGTH {
            let letters = self
                .top_letters(position, 5)
                .iter()
                .map(|(letter, count)| format!("{letter}:{count}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                f,
                "Position {}: {letters} (entropy {:.2} bits)",
                position + 1,
                self.position_entropy(position)
            )?;
        }

        let mut overall: Vec<(char, usize)> = (0..ALPHABET)
            .map(|idx| {
                let count = self.counts.iter().map(|row| row[idx]).sum();
                (char::from(b'a' + idx as u8), count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();
        overall.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let overall = overall
            .iter()
            .take(10)
            .map(|(letter, count)| format!("{letter}:{count}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Top letters overall: {overall}")
    }
}
