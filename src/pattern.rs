use crate::{SolverError, WORD_LENGTH, Word};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ALPHABET_SIZE: usize = 26;
/// Number of distinct response patterns (3^5).
pub const PATTERN_SPACE: usize = 3usize.pow(WORD_LENGTH as u32);
const DIGIT_GRAY: u8 = 0;
const DIGIT_YELLOW: u8 = 1;
const DIGIT_GREEN: u8 = 2;

// Descending codes enumerate GGGGG, GGGGY, GGGGX, ... XXXXX.
static ALL_PATTERNS: Lazy<Vec<Pattern>> =
    Lazy::new(|| (0..PATTERN_SPACE as u8).rev().map(Pattern).collect());

/// Feedback for one letter of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    Green,
    Yellow,
    Gray,
}

impl Feedback {
    /// Single-letter wire code: `G`, `Y` or `X`.
    pub fn code(self) -> char {
        match self {
            Feedback::Green => 'G',
            Feedback::Yellow => 'Y',
            Feedback::Gray => 'X',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'G' => Some(Feedback::Green),
            'Y' => Some(Feedback::Yellow),
            'X' => Some(Feedback::Gray),
            _ => None,
        }
    }

    fn digit(self) -> u8 {
        match self {
            Feedback::Green => DIGIT_GREEN,
            Feedback::Yellow => DIGIT_YELLOW,
            Feedback::Gray => DIGIT_GRAY,
        }
    }

    fn from_digit(digit: u8) -> Self {
        match digit {
            DIGIT_GREEN => Feedback::Green,
            DIGIT_YELLOW => Feedback::Yellow,
            _ => Feedback::Gray,
        }
    }
}

/// The colored response to one guess, packed as a base-3 code in `0..243`
/// with the first letter as the most significant digit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern(u8);

impl Pattern {
    pub const ALL_GREEN: Self = Self((PATTERN_SPACE - 1) as u8);
    pub const ALL_GRAY: Self = Self(0);

    /// Scores `guess` against `target`.
    ///
    /// Greens are assigned first and consume their target letter; the
    /// remaining positions turn yellow only while an unconsumed instance of
    /// the letter is left in the target, so duplicate letters are never
    /// credited more often than the target contains them.
    pub fn compute(guess: Word, target: Word) -> Self {
        let guess = guess.letters();
        let target = target.letters();
        let mut digits = [DIGIT_GRAY; WORD_LENGTH];
        let mut leftovers = [0u8; ALPHABET_SIZE];

        for idx in 0..WORD_LENGTH {
            if guess[idx] == target[idx] {
                digits[idx] = DIGIT_GREEN;
            } else {
                leftovers[letter_index(target[idx])] += 1;
            }
        }

        for idx in 0..WORD_LENGTH {
            if digits[idx] == DIGIT_GREEN {
                continue;
            }

            let lookup = letter_index(guess[idx]);
            if leftovers[lookup] > 0 {
                digits[idx] = DIGIT_YELLOW;
                leftovers[lookup] -= 1;
            }
        }

        Self(encode(&digits))
    }

    pub fn from_feedback(feedback: [Feedback; WORD_LENGTH]) -> Self {
        let digits = feedback.map(Feedback::digit);
        Self(encode(&digits))
    }

    /// Parses the interactive response notation for `guess`: an uppercase
    /// letter is green, a lowercase letter yellow, and `?` (or any other
    /// non-letter) gray. Colored letters must match the guess.
    pub fn from_response(guess: Word, response: &str) -> Result<Self, SolverError> {
        let invalid = || SolverError::InvalidPattern {
            pattern: response.to_string(),
        };
        if response.chars().count() != WORD_LENGTH {
            return Err(invalid());
        }

        let mut feedback = [Feedback::Gray; WORD_LENGTH];
        for ((slot, ch), &letter) in feedback
            .iter_mut()
            .zip(response.chars())
            .zip(guess.letters().iter())
        {
            if !ch.is_ascii_alphabetic() {
                continue;
            }
            if ch.to_ascii_lowercase() != char::from(letter) {
                return Err(invalid());
            }
            *slot = if ch.is_ascii_uppercase() {
                Feedback::Green
            } else {
                Feedback::Yellow
            };
        }
        Ok(Self::from_feedback(feedback))
    }

    /// Renders the pattern in the interactive response notation for `guess`.
    pub fn to_response(self, guess: Word) -> String {
        self.feedback()
            .iter()
            .zip(guess.letters().iter())
            .map(|(feedback, &letter)| {
                let ch = char::from(letter);
                match feedback {
                    Feedback::Green => ch.to_ascii_uppercase(),
                    Feedback::Yellow => ch,
                    Feedback::Gray => '?',
                }
            })
            .collect()
    }

    /// Per-position feedback, first letter first.
    pub fn feedback(self) -> [Feedback; WORD_LENGTH] {
        let mut code = self.0;
        let mut feedback = [Feedback::Gray; WORD_LENGTH];
        for slot in feedback.iter_mut().rev() {
            *slot = Feedback::from_digit(code % 3);
            code /= 3;
        }
        feedback
    }

    /// The raw base-3 code.
    pub fn code(self) -> u8 {
        self.0
    }

    /// Pattern for a raw code, if it is below 243.
    pub fn from_code(code: u8) -> Option<Self> {
        (usize::from(code) < PATTERN_SPACE).then_some(Self(code))
    }

    /// Index into a 243-entry table.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// True when every letter is green.
    pub fn is_solved(self) -> bool {
        self == Self::ALL_GREEN
    }

    /// Number of green positions.
    pub fn greens(self) -> usize {
        self.feedback()
            .iter()
            .filter(|feedback| **feedback == Feedback::Green)
            .count()
    }

    /// Every possible pattern, from `GGGGG` down to `XXXXX`.
    pub fn all() -> &'static [Pattern] {
        ALL_PATTERNS.as_slice()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = self.feedback().iter().map(|fb| fb.code()).collect();
        f.write_str(&text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({self})")
    }
}

impl FromStr for Pattern {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SolverError::InvalidPattern {
            pattern: s.to_string(),
        };
        let feedback: Vec<Feedback> = s
            .chars()
            .map(Feedback::from_code)
            .collect::<Option<_>>()
            .ok_or_else(invalid)?;
        let feedback: [Feedback; WORD_LENGTH] = feedback.try_into().map_err(|_| invalid())?;
        Ok(Self::from_feedback(feedback))
    }
}

impl TryFrom<String> for Pattern {
    type Error = SolverError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.to_string()
    }
}

/// Scores a guess against a target given as plain strings.
pub fn simulate(guess: &str, target: &str) -> Result<Pattern, SolverError> {
    Ok(Pattern::compute(Word::new(guess)?, Word::new(target)?))
}

fn encode(digits: &[u8; WORD_LENGTH]) -> u8 {
    digits.iter().fold(0u8, |acc, digit| acc * 3 + digit)
}

fn letter_index(letter: u8) -> usize {
    debug_assert!(
        letter.is_ascii_lowercase(),
        "words should use only lowercase ASCII letters"
    );
    (letter - b'a') as usize
}
