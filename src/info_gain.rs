//! Shannon entropy and expected information gain of guesses.
//!
//! Every remaining candidate is treated as equally likely to be the answer,
//! so the entropy of a set of `n` candidates is simply `log2(n)`.

use crate::{SolverError, Word, WordListDigest, partition_sizes};
use log::debug;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Entropy in bits of `count` equally likely candidates.
pub fn entropy(count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        (count as f64).log2()
    }
}

/// Entropy of a candidate set.
pub fn entropy_of(candidates: &[Word]) -> f64 {
    entropy(candidates.len())
}

/// Expected reduction in entropy, in bits, from guessing `guess` when the
/// answer is one of `candidates`.
pub fn information_gain(guess: Word, candidates: &[Word]) -> f64 {
    let total = candidates.len();
    if total <= 1 {
        return 0.0;
    }
    // Any guess splits two words into at most two outcomes.
    if total == 2 {
        return 1.0;
    }

    let current_entropy = entropy(total);
    let sizes = partition_sizes(guess, candidates);
    let distinct = sizes.iter().filter(|size| **size > 0).count();
    if distinct == total {
        return current_entropy;
    }

    let expected_entropy: f64 = sizes
        .iter()
        .filter(|size| **size > 0)
        .map(|&size| size as f64 / total as f64 * entropy(size))
        .sum();
    (current_entropy - expected_entropy).max(0.0)
}

/// A vocabulary word together with its information gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredGuess {
    pub word: Word,
    pub info_gain: f64,
    /// Whether the word could itself be the answer.
    pub is_candidate: bool,
}

// Higher gain first, then words that can still win, then vocabulary order.
fn rank_order(a: &(usize, ScoredGuess), b: &(usize, ScoredGuess)) -> Ordering {
    b.1.info_gain
        .partial_cmp(&a.1.info_gain)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.1.is_candidate.cmp(&a.1.is_candidate))
        .then_with(|| a.0.cmp(&b.0))
}

fn check_inputs(solutions: &[Word], vocabulary: &[Word]) -> Result<(), SolverError> {
    if solutions.is_empty() {
        return Err(SolverError::EmptyCandidates);
    }
    if vocabulary.is_empty() {
        return Err(SolverError::EmptyVocabulary);
    }
    Ok(())
}

fn select_best(
    scored: impl Iterator<Item = (usize, ScoredGuess)>,
) -> Result<ScoredGuess, SolverError> {
    scored
        .min_by(rank_order)
        .map(|(_, guess)| guess)
        .ok_or(SolverError::EmptyVocabulary)
}

/// Finds the vocabulary word with the greatest information gain over
/// `solutions`.
///
/// Ties go to a word that is itself a solution, then to the word that comes
/// first in `vocabulary`.
pub fn best_guess(solutions: &[Word], vocabulary: &[Word]) -> Result<(Word, f64), SolverError> {
    check_inputs(solutions, vocabulary)?;
    let lookup: HashSet<Word> = solutions.iter().copied().collect();
    let best = select_best(vocabulary.iter().enumerate().map(|(idx, &word)| {
        (
            idx,
            ScoredGuess {
                word,
                info_gain: information_gain(word, solutions),
                is_candidate: lookup.contains(&word),
            },
        )
    }))?;
    Ok((best.word, best.info_gain))
}

/// [`best_guess`] spread across the rayon thread pool. Produces the same
/// answer, including tie-breaks.
pub fn par_best_guess(
    solutions: &[Word],
    vocabulary: &[Word],
) -> Result<(Word, f64), SolverError> {
    check_inputs(solutions, vocabulary)?;
    let lookup: HashSet<Word> = solutions.iter().copied().collect();
    let best = vocabulary
        .par_iter()
        .enumerate()
        .map(|(idx, &word)| {
            (
                idx,
                ScoredGuess {
                    word,
                    info_gain: information_gain(word, solutions),
                    is_candidate: lookup.contains(&word),
                },
            )
        })
        .min_by(rank_order)
        .map(|(_, guess)| guess)
        .ok_or(SolverError::EmptyVocabulary)?;
    Ok((best.word, best.info_gain))
}

/// Information gain calculator with per-instance memoization.
///
/// Results are keyed by the guess and the content digest of the sorted
/// candidate set, so equal sets built separately share entries. Hashing the
/// set costs an extra sort per lookup compared to keying on identity.
#[derive(Debug, Default)]
pub struct InformationGain {
    cache: HashMap<(Word, WordListDigest), f64>,
    first_guess: Option<(WordListDigest, ScoredGuess)>,
}

impl InformationGain {
    /// A calculator with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoised [`information_gain`].
    pub fn information_gain(&mut self, guess: Word, candidates: &[Word]) -> f64 {
        if candidates.len() <= 2 {
            return information_gain(guess, candidates);
        }
        let id = WordListDigest::of_set(candidates);
        self.cached_gain(guess, candidates, id)
    }

    fn cached_gain(&mut self, guess: Word, candidates: &[Word], id: WordListDigest) -> f64 {
        *self
            .cache
            .entry((guess, id))
            .or_insert_with(|| information_gain(guess, candidates))
    }

    /// Scores every vocabulary word and returns them best first, keeping at
    /// most `limit` entries.
    pub fn rank_guesses(
        &mut self,
        candidates: &[Word],
        vocabulary: &[Word],
        limit: usize,
    ) -> Vec<ScoredGuess> {
        let id = WordListDigest::of_set(candidates);
        let lookup: HashSet<Word> = candidates.iter().copied().collect();
        let mut scored: Vec<(usize, ScoredGuess)> = vocabulary
            .iter()
            .enumerate()
            .map(|(idx, &word)| {
                let info_gain = if candidates.len() <= 2 {
                    information_gain(word, candidates)
                } else {
                    self.cached_gain(word, candidates, id)
                };
                (
                    idx,
                    ScoredGuess {
                        word,
                        info_gain,
                        is_candidate: lookup.contains(&word),
                    },
                )
            })
            .collect();
        scored.sort_by(rank_order);
        scored.truncate(limit);
        scored.into_iter().map(|(_, guess)| guess).collect()
    }

    /// Cached counterpart of [`best_guess`].
    pub fn best_guess(
        &mut self,
        solutions: &[Word],
        vocabulary: &[Word],
    ) -> Result<(Word, f64), SolverError> {
        check_inputs(solutions, vocabulary)?;
        let best = self
            .rank_guesses(solutions, vocabulary, 1)
            .into_iter()
            .next()
            .ok_or(SolverError::EmptyVocabulary)?;
        debug!(
            "best guess {} ({:.3} bits) from {} words over {} candidates",
            best.word,
            best.info_gain,
            vocabulary.len(),
            solutions.len()
        );
        Ok((best.word, best.info_gain))
    }

    /// Best opening guess when `wordlist` is both the answer set and the
    /// vocabulary. Remembered per word list contents.
    pub fn best_first_guess(&mut self, wordlist: &[Word]) -> Result<ScoredGuess, SolverError> {
        if let [only] = wordlist {
            return Ok(ScoredGuess {
                word: *only,
                info_gain: 0.0,
                is_candidate: true,
            });
        }

        let digest = WordListDigest::of_list(wordlist);
        if let Some((cached_digest, guess)) = self.first_guess {
            if cached_digest == digest {
                debug!("first guess cache hit: {}", guess.word);
                return Ok(guess);
            }
        }

        let (word, info_gain) = par_best_guess(wordlist, wordlist)?;
        let guess = ScoredGuess {
            word,
            info_gain,
            is_candidate: true,
        };
        self.first_guess = Some((digest, guess));
        Ok(guess)
    }

    /// Number of memoised gain entries.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.first_guess = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words;
    use proptest::prelude::*;

    fn word(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    #[test]
    fn entropy_of_small_sets() {
        assert_eq!(entropy_of(&[]), 0.0);
        assert_eq!(entropy_of(&[word("crane")]), 0.0);
        assert_eq!(entropy_of(&words(["crane", "crate"]).unwrap()), 1.0);
        assert_eq!(entropy(8), 3.0);
    }

    #[test]
    fn two_candidates_always_yield_one_bit() {
        let pair = words(["crane", "crate"]).unwrap();
        assert_eq!(information_gain(word("zzzzz"), &pair), 1.0);
        assert_eq!(information_gain(word("crane"), &pair), 1.0);
    }

    #[test]
    fn zero_gain_when_answer_is_known() {
        assert_eq!(information_gain(word("crane"), &[]), 0.0);
        assert_eq!(information_gain(word("slate"), &[word("crane")]), 0.0);
    }

    #[test]
    fn crane_splits_the_crane_family() {
        let solutions = words(["crane", "crate", "craze", "grace"]).unwrap();
        let gain = information_gain(word("crane"), &solutions);
        assert!(gain > 0.0);
        assert!(gain <= 2.0);
        assert!((gain - 1.5).abs() < 1e-12);
    }

    #[test]
    fn perfect_split_returns_full_entropy() {
        let solutions = words(["crane", "slate", "chord", "pudgy"]).unwrap();
        assert_eq!(information_gain(word("crane"), &solutions), 2.0);
    }

    #[test]
    fn useless_guess_gains_nothing() {
        let solutions = words(["crane", "crate", "craze"]).unwrap();
        assert_eq!(information_gain(word("fully"), &solutions), 0.0);
    }

    #[test]
    fn cache_is_keyed_by_contents() {
        let mut calc = InformationGain::new();
        let first = words(["crane", "crate", "craze", "grace"]).unwrap();
        let mut second = first.clone();
        second.reverse();

        let a = calc.information_gain(word("crane"), &first);
        assert_eq!(calc.cache_len(), 1);
        let b = calc.information_gain(word("crane"), &second);
        assert_eq!(calc.cache_len(), 1);
        assert_eq!(a, b);

        calc.clear_cache();
        assert_eq!(calc.cache_len(), 0);
    }

    #[test]
    fn best_guess_finds_the_splitting_word() {
        let solutions = words(["crane", "crate", "craze", "grace"]).unwrap();
        let vocabulary = words(["fully", "crane", "grate", "zesty"]).unwrap();
        let (best, gain) = best_guess(&solutions, &vocabulary).unwrap();
        let expected: f64 = vocabulary
            .iter()
            .map(|&w| information_gain(w, &solutions))
            .fold(0.0, f64::max);
        assert_eq!(gain, expected);
        assert_eq!(information_gain(best, &solutions), gain);
        assert_ne!(best, word("fully"));
    }

    #[test]
    fn ties_prefer_possible_answers_then_vocabulary_order() {
        let pair = words(["crate", "craze"]).unwrap();
        let with_candidate = words(["slate", "craze"]).unwrap();
        assert_eq!(best_guess(&pair, &with_candidate).unwrap().0, word("craze"));

        let insight_only = words(["slate", "plate"]).unwrap();
        assert_eq!(best_guess(&pair, &insight_only).unwrap().0, word("slate"));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let list = words(["crane"]).unwrap();
        assert_eq!(best_guess(&[], &list), Err(SolverError::EmptyCandidates));
        assert_eq!(best_guess(&list, &[]), Err(SolverError::EmptyVocabulary));
        assert_eq!(par_best_guess(&[], &list), Err(SolverError::EmptyCandidates));
    }

    #[test]
    fn parallel_search_matches_sequential() {
        let solutions =
            words(["crane", "crate", "craze", "grace", "trace", "brace", "slate", "plate"])
                .unwrap();
        let vocabulary = words([
            "fully", "plate", "crane", "trace", "brace", "grace", "zesty", "slate", "bragt",
        ])
        .unwrap();
        assert_eq!(
            best_guess(&solutions, &vocabulary),
            par_best_guess(&solutions, &vocabulary)
        );
        let mut calc = InformationGain::new();
        assert_eq!(
            calc.best_guess(&solutions, &vocabulary),
            best_guess(&solutions, &vocabulary)
        );
    }

    #[test]
    fn ranking_is_sorted_and_truncated() {
        let solutions = words(["crane", "crate", "craze", "grace", "trace"]).unwrap();
        let vocabulary = words(["fully", "crane", "trace", "grace", "zesty"]).unwrap();
        let mut calc = InformationGain::new();
        let ranked = calc.rank_guesses(&solutions, &vocabulary, 3);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].info_gain >= w[1].info_gain));
        assert!(ranked.iter().all(|g| g.word != word("fully")));
    }

    #[test]
    fn first_guess_cache_distinguishes_lists_of_equal_length() {
        let mut calc = InformationGain::new();
        let first = words(["crane", "crate", "craze", "grace"]).unwrap();
        let second = words(["moist", "hoist", "joist", "foist"]).unwrap();

        let a = calc.best_first_guess(&first).unwrap();
        assert!(first.contains(&a.word));
        let b = calc.best_first_guess(&second).unwrap();
        assert!(second.contains(&b.word));
        assert_eq!(calc.best_first_guess(&[word("alone")]).unwrap().word, word("alone"));
    }

    proptest! {
        #[test]
        fn gain_is_bounded_by_entropy(
            guess in "[a-f]{5}",
            raw in prop::collection::vec("[a-f]{5}", 0..30),
        ) {
            let guess = Word::new(&guess).unwrap();
            let mut candidates = words(raw.iter().map(String::as_str)).unwrap();
            candidates.sort();
            candidates.dedup();
            let gain = information_gain(guess, &candidates);
            prop_assert!(gain >= 0.0);
            prop_assert!(gain <= entropy_of(&candidates) + 1e-12);
        }
    }
}
