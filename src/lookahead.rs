//! Multi-step lookahead over response partitions.
//!
//! Scores estimate how many more guesses are needed after making a guess
//! (lower is better). Small or exhausted searches fall back to fixed
//! heuristics: `1.5` when guessing one of two candidates, `2.0` for an
//! outside guess against two candidates, and `1 + log2(n)` once the depth
//! budget runs out.

use crate::{
    InformationGain, SolverError, StrategyMode, Word, WordListDigest, entropy, partition,
};
use log::debug;
use std::collections::HashMap;

/// Candidate sets larger than this search one level shallower.
pub const PRUNING_THRESHOLD: usize = 100;
/// Follow-up guesses tried per partition when recursing.
pub const RECURSION_BRANCHING: usize = 20;
/// Guesses fully evaluated by [`LookaheadEngine::get_best_move`].
pub const SEARCH_WIDTH: usize = 50;
/// Candidates pre-ranked by information gain before narrowing to
/// [`SEARCH_WIDTH`].
pub const PRE_RANK_POOL: usize = 100;

/// The outcome of a best-move search.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMove {
    pub word: Word,
    pub score: f64,
    /// Set when the answer was decided without searching (one or two
    /// candidates).
    pub deterministic: bool,
    /// Score of every evaluated guess, in evaluation order.
    pub evaluations: Vec<(Word, f64)>,
}

type EvalKey = (Word, WordListDigest, usize, StrategyMode);

/// Searches guesses by expected remaining guesses, memoising scores per
/// guess, candidate set, depth and strategy.
#[derive(Debug)]
pub struct LookaheadEngine {
    depth: usize,
    strategy: StrategyMode,
    info_gain: InformationGain,
    eval_cache: HashMap<EvalKey, f64>,
}

impl LookaheadEngine {
    /// An engine with a fresh information gain calculator.
    pub fn new(depth: usize, strategy: StrategyMode) -> Self {
        Self::with_calculator(depth, strategy, InformationGain::new())
    }

    /// Builds an engine from a strategy name such as `"balanced"`.
    pub fn from_mode_name(depth: usize, strategy: &str) -> Result<Self, SolverError> {
        Ok(Self::new(depth, strategy.parse()?))
    }

    /// An engine reusing an existing calculator and its cache.
    pub fn with_calculator(depth: usize, strategy: StrategyMode, info_gain: InformationGain) -> Self {
        Self {
            depth,
            strategy,
            info_gain,
            eval_cache: HashMap::new(),
        }
    }

    /// Default search depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Default strategy.
    pub fn strategy(&self) -> StrategyMode {
        self.strategy
    }

    /// The information gain calculator used for pre-ranking.
    pub fn calculator(&mut self) -> &mut InformationGain {
        &mut self.info_gain
    }

    /// Expected number of guesses still needed after playing `guess`.
    pub fn evaluate_move(
        &mut self,
        guess: Word,
        candidates: &[Word],
        depth: usize,
        strategy: StrategyMode,
    ) -> f64 {
        let total = candidates.len();
        if total <= 1 {
            return 1.0;
        }
        if total == 2 {
            return if candidates.contains(&guess) { 1.5 } else { 2.0 };
        }
        if depth == 0 {
            return 1.0 + entropy(total);
        }

        let key = (guess, WordListDigest::of_set(candidates), depth, strategy);
        if let Some(&score) = self.eval_cache.get(&key) {
            return score;
        }

        let effective_depth = if total > PRUNING_THRESHOLD {
            depth.saturating_sub(1).max(1)
        } else {
            depth
        };

        let partitions = partition(guess, candidates);
        let mut outcomes = Vec::with_capacity(partitions.len());
        for (_, members) in partitions.sorted() {
            let size = members.len();
            let probability = size as f64 / total as f64;
            let score = if size == 1 {
                1.0
            } else if effective_depth > 1 {
                let best_next = members
                    .iter()
                    .take(RECURSION_BRANCHING)
                    .map(|&next| self.evaluate_move(next, members, effective_depth - 1, strategy))
                    .fold(f64::INFINITY, f64::min);
                1.0 + best_next
            } else {
                1.0 + entropy(size)
            };
            outcomes.push((probability, score));
        }

        let expected = strategy.weigh(&outcomes);
        self.eval_cache.insert(key, expected);
        expected
    }

    /// Picks the guess with the lowest expected score.
    pub fn get_best_move(
        &mut self,
        candidates: &[Word],
        depth: usize,
        strategy: StrategyMode,
    ) -> Result<BestMove, SolverError> {
        match candidates {
            [] => return Err(SolverError::EmptyCandidates),
            [only] => {
                return Ok(BestMove {
                    word: *only,
                    score: 1.0,
                    deterministic: true,
                    evaluations: Vec::new(),
                });
            }
            [first, _] => {
                return Ok(BestMove {
                    word: *first,
                    score: 1.5,
                    deterministic: true,
                    evaluations: Vec::new(),
                });
            }
            _ => {}
        }

        let pool: Vec<Word> = if candidates.len() > SEARCH_WIDTH {
            let head = &candidates[..candidates.len().min(PRE_RANK_POOL)];
            self.info_gain
                .rank_guesses(candidates, head, SEARCH_WIDTH)
                .into_iter()
                .map(|guess| guess.word)
                .collect()
        } else {
            candidates.to_vec()
        };

        let mut best_word = pool[0];
        let mut best_score = f64::INFINITY;
        let mut evaluations = Vec::with_capacity(pool.len());
        for word in pool {
            let score = self.evaluate_move(word, candidates, depth, strategy);
            evaluations.push((word, score));
            if score < best_score {
                best_score = score;
                best_word = word;
            }
        }

        debug!(
            "lookahead picked {best_word} ({best_score:.3}) from {} guesses over {} candidates",
            evaluations.len(),
            candidates.len()
        );
        Ok(BestMove {
            word: best_word,
            score: best_score,
            deterministic: false,
            evaluations,
        })
    }

    /// [`get_best_move`](Self::get_best_move) with the engine's configured
    /// depth and strategy.
    pub fn best_move(&mut self, candidates: &[Word]) -> Result<BestMove, SolverError> {
        self.get_best_move(candidates, self.depth, self.strategy)
    }

    /// Number of memoised evaluations.
    pub fn cache_len(&self) -> usize {
        self.eval_cache.len()
    }

    /// Empties both the evaluation and the information gain caches.
    pub fn clear_cache(&mut self) {
        self.eval_cache.clear();
        self.info_gain.clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words;

    fn word(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    fn crane_family() -> Vec<Word> {
        words(["crane", "crate", "craze", "grace", "trace"]).unwrap()
    }

    fn synthetic(count: usize) -> Vec<Word> {
        (0..count)
            .map(|idx| {
                let first = char::from(b'a' + (idx % 26) as u8);
                let second = char::from(b'a' + (idx / 26) as u8);
                Word::new(&format!("{first}{second}xyz")).unwrap()
            })
            .collect()
    }

    #[test]
    fn two_candidates_score_one_and_a_half() {
        let mut engine = LookaheadEngine::new(1, StrategyMode::Balanced);
        let candidates = words(["crane", "crate"]).unwrap();
        let best = engine
            .get_best_move(&candidates, 1, StrategyMode::Balanced)
            .unwrap();
        assert!(candidates.contains(&best.word));
        assert_eq!(best.score, 1.5);
        assert!(best.deterministic);
    }

    #[test]
    fn single_candidate_is_solved() {
        let mut engine = LookaheadEngine::new(2, StrategyMode::Safe);
        let best = engine.best_move(&[word("crane")]).unwrap();
        assert_eq!(best.word, word("crane"));
        assert_eq!(best.score, 1.0);
    }

    #[test]
    fn empty_candidates_are_an_error() {
        let mut engine = LookaheadEngine::new(2, StrategyMode::Safe);
        assert_eq!(engine.best_move(&[]), Err(SolverError::EmptyCandidates));
    }

    #[test]
    fn invalid_mode_name_fails_construction() {
        assert!(LookaheadEngine::from_mode_name(2, "reckless").is_err());
        let engine = LookaheadEngine::from_mode_name(2, "SAFE").unwrap();
        assert_eq!(engine.strategy(), StrategyMode::Safe);
        assert_eq!(engine.depth(), 2);
    }

    #[test]
    fn base_cases_use_fixed_heuristics() {
        let mut engine = LookaheadEngine::new(2, StrategyMode::Aggressive);
        let pair = words(["crane", "crate"]).unwrap();
        let mode = StrategyMode::Aggressive;
        assert_eq!(engine.evaluate_move(word("crane"), &pair[..1], 2, mode), 1.0);
        assert_eq!(engine.evaluate_move(word("crane"), &pair, 2, mode), 1.5);
        assert_eq!(engine.evaluate_move(word("slate"), &pair, 2, mode), 2.0);

        let four = words(["crane", "crate", "craze", "grace"]).unwrap();
        assert_eq!(engine.evaluate_move(word("crane"), &four, 0, mode), 3.0);
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn strategies_weigh_uneven_splits_differently() {
        // crane splits the family into {crane}, {crate, craze}, {grace, trace}.
        let candidates = crane_family();
        let mut engine = LookaheadEngine::new(1, StrategyMode::Balanced);
        let guess = word("crane");
        let aggressive = engine.evaluate_move(guess, &candidates, 1, StrategyMode::Aggressive);
        let balanced = engine.evaluate_move(guess, &candidates, 1, StrategyMode::Balanced);
        let safe = engine.evaluate_move(guess, &candidates, 1, StrategyMode::Safe);

        assert!((aggressive - 1.8).abs() < 1e-12);
        assert!((balanced - 1.88).abs() < 1e-12);
        assert!((safe - 1.94).abs() < 1e-12);
    }

    #[test]
    fn deeper_search_recurses_into_partitions() {
        let candidates = crane_family();
        let mut engine = LookaheadEngine::new(2, StrategyMode::Aggressive);
        let score = engine.evaluate_move(word("crane"), &candidates, 2, StrategyMode::Aggressive);
        // Both pairs are finished by guessing one of their members (1.5).
        assert!((score - 2.2).abs() < 1e-12);
        assert!(engine.cache_len() > 0);

        engine.clear_cache();
        assert_eq!(engine.cache_len(), 0);
    }

    #[test]
    fn best_move_takes_the_lowest_score() {
        let candidates = crane_family();
        let mut engine = LookaheadEngine::new(1, StrategyMode::Aggressive);
        let best = engine.best_move(&candidates).unwrap();

        assert!(!best.deterministic);
        assert_eq!(best.evaluations.len(), candidates.len());
        assert!(candidates.contains(&best.word));
        assert!(best.evaluations.iter().all(|(_, score)| best.score <= *score));
        assert!(best.score <= 1.4 + 1e-12);
    }

    #[test]
    fn large_sets_are_narrowed_before_searching() {
        let candidates = synthetic(60);
        let mut engine = LookaheadEngine::new(1, StrategyMode::Aggressive);
        let best = engine.best_move(&candidates).unwrap();
        assert_eq!(best.evaluations.len(), SEARCH_WIDTH);
        assert!(candidates.contains(&best.word));
    }

    #[test]
    fn sets_above_pruning_threshold_search_one_level_shallower() {
        let candidates = synthetic(PRUNING_THRESHOLD + 30);
        let mode = StrategyMode::Aggressive;
        let guess = candidates[0];

        let mut deep = LookaheadEngine::new(2, mode);
        let mut shallow = LookaheadEngine::new(1, mode);
        let pruned = deep.evaluate_move(guess, &candidates, 2, mode);
        let single = shallow.evaluate_move(guess, &candidates, 1, mode);
        assert_eq!(pruned, single);
        // Only the top-level score is memoised; nothing was recursed into.
        assert_eq!(deep.cache_len(), 1);
    }

    #[test]
    fn recursion_tries_a_bounded_number_of_follow_ups() {
        // 30 words with no letters in common with the guess, so they all
        // share the all-gray partition.
        let candidates: Vec<Word> = (0..30)
            .map(|idx| {
                let first = char::from(b'a' + (idx % 15) as u8);
                let second = char::from(b'a' + (idx / 15) as u8);
                Word::new(&format!("{first}{second}bcd")).unwrap()
            })
            .collect();
        let mode = StrategyMode::Aggressive;
        let mut engine = LookaheadEngine::new(2, mode);
        engine.evaluate_move(word("zzzzz"), &candidates, 2, mode);

        // One entry for the guess plus one per follow-up tried.
        assert_eq!(engine.cache_len(), 1 + RECURSION_BRANCHING);
    }

    #[test]
    fn pre_ranking_only_draws_from_the_head_of_the_list() {
        let candidates = synthetic(PRE_RANK_POOL + 30);
        let mut engine = LookaheadEngine::new(1, StrategyMode::Aggressive);
        let best = engine.best_move(&candidates).unwrap();

        let head = &candidates[..PRE_RANK_POOL];
        assert_eq!(best.evaluations.len(), SEARCH_WIDTH);
        assert!(best.evaluations.iter().all(|(word, _)| head.contains(word)));
        assert!(head.contains(&best.word));
    }

    #[test]
    fn memoized_scores_are_stable() {
        let candidates = synthetic(30);
        let mut engine = LookaheadEngine::new(2, StrategyMode::Balanced);
        let first = engine.evaluate_move(candidates[3], &candidates, 2, StrategyMode::Balanced);
        let cached = engine.cache_len();
        let again = engine.evaluate_move(candidates[3], &candidates, 2, StrategyMode::Balanced);
        assert_eq!(first, again);
        assert_eq!(engine.cache_len(), cached);
    }
}
