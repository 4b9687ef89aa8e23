mod decision_tree;
mod error;
mod frequency;
mod info_gain;
mod lookahead;
mod partition;
mod pattern;
mod strategy;
mod word;

pub use decision_tree::{
    CACHE_ENV, DEFAULT_CACHE_FILE, DecisionTree, PrecomputeOptions, ResponseEntry, TREE_VERSION,
    TreeStatistics, default_cache_path,
};
pub use error::SolverError;
pub use frequency::PositionalFrequency;
pub use info_gain::{
    InformationGain, ScoredGuess, best_guess, entropy, entropy_of, information_gain,
    par_best_guess,
};
pub use lookahead::{
    BestMove, LookaheadEngine, PRE_RANK_POOL, PRUNING_THRESHOLD, RECURSION_BRANCHING,
    SEARCH_WIDTH,
};
pub use partition::{PartitionMap, filter_candidates, partition, partition_sizes};
pub use pattern::{Feedback, PATTERN_SPACE, Pattern, simulate};
pub use strategy::StrategyMode;
pub use word::{Word, WordListDigest, load_words, merge_vocabulary, parse_words, words};

/// The fixed Wordle word length.
pub const WORD_LENGTH: usize = 5;
