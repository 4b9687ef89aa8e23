//! Precomputed opening book: the best first guess and, for each response to
//! it, the best second guess.
//!
//! The table is built offline by [`DecisionTree::precompute`] and persisted
//! as JSON. A missing, unreadable or outdated cache file is never an error;
//! it simply leaves the tree not ready so callers fall back to a live search.

use crate::{
    Pattern, SolverError, Word, WordListDigest, best_guess, par_best_guess, partition,
};
use dirs::cache_dir;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub const TREE_VERSION: &str = "v1";
pub const DEFAULT_CACHE_FILE: &str = "decision_tree_v1.json";
/// Environment variable overriding the default cache location.
pub const CACHE_ENV: &str = "WORDLEBOT_CACHE";
// At or below this many remaining answers only the answers themselves are
// considered as second guesses.
const CANDIDATES_ONLY_LIMIT: usize = 10;

/// Default location of the cache file, honouring [`CACHE_ENV`].
pub fn default_cache_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CACHE_ENV) {
        return Some(PathBuf::from(path));
    }
    cache_dir().map(|dir| dir.join("wordlebot").join(DEFAULT_CACHE_FILE))
}

/// Best second guess after one particular response to the first guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub best_guess: Word,
    pub info_gain: f64,
    pub remaining_count: usize,
}

/// Settings for [`DecisionTree::precompute`].
#[derive(Debug, Clone)]
pub struct PrecomputeOptions {
    /// 1 computes only the first guess, 2 also every second guess.
    pub depth: usize,
    pub show_progress: bool,
    /// Patterns solved in parallel between checkpoints.
    pub batch_size: usize,
    /// Checked between batches; once set, precompute stops early.
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl Default for PrecomputeOptions {
    fn default() -> Self {
        Self {
            depth: 2,
            show_progress: false,
            batch_size: 16,
            interrupt: None,
        }
    }
}

impl PrecomputeOptions {
    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    version: String,
    first_guess: Option<Word>,
    first_guess_info_gain: f64,
    responses: BTreeMap<Pattern, ResponseEntry>,
    solutions_count: usize,
    #[serde(default)]
    vocabulary_count: usize,
    #[serde(default)]
    word_list_digest: Option<WordListDigest>,
    #[serde(default)]
    complete: bool,
    computed_at: Option<u64>,
    computation_time: f64,
    #[serde(skip)]
    cache_file: Option<PathBuf>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self {
            version: TREE_VERSION.to_string(),
            first_guess: None,
            first_guess_info_gain: 0.0,
            responses: BTreeMap::new(),
            solutions_count: 0,
            vocabulary_count: 0,
            word_list_digest: None,
            complete: false,
            computed_at: None,
            computation_time: 0.0,
            cache_file: None,
        }
    }
}

impl DecisionTree {
    /// An empty tree that is not backed by a file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the tree cached at `path`, or an empty tree bound to `path` when
    /// the file is missing, corrupt or from another format version.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut tree = read_cache(&path).unwrap_or_default();
        tree.cache_file = Some(path);
        tree
    }

    /// Path the tree is saved to and checkpointed at.
    pub fn cache_file(&self) -> Option<&Path> {
        self.cache_file.as_deref()
    }

    pub fn set_cache_file(&mut self, path: Option<PathBuf>) {
        self.cache_file = path;
    }

    /// Writes the tree to its cache file, if it has one.
    pub fn save(&self) -> io::Result<()> {
        match &self.cache_file {
            Some(path) => self.save_to(path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = path.with_extension("json.tmp");
        let written = File::create(&staging)
            .and_then(|file| serde_json::to_writer_pretty(file, self).map_err(io::Error::from))
            .and_then(|()| fs::rename(&staging, path));
        if let Err(err) = written {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
        debug!("saved decision tree to {}", path.display());
        Ok(())
    }

    fn checkpoint(&self) {
        if let Err(err) = self.save() {
            warn!("failed to checkpoint decision tree: {err}");
        }
    }

    /// True once a first guess has been computed.
    pub fn is_ready(&self) -> bool {
        self.first_guess.is_some()
    }

    /// Whether every response pattern has been computed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The precomputed opening guess.
    pub fn first_guess(&self) -> Option<Word> {
        self.first_guess
    }

    pub fn first_guess_info_gain(&self) -> f64 {
        self.first_guess_info_gain
    }

    pub fn solutions_count(&self) -> usize {
        self.solutions_count
    }

    pub fn responses(&self) -> &BTreeMap<Pattern, ResponseEntry> {
        &self.responses
    }

    /// Entry for the response `first_response` to the first guess.
    pub fn get_second_guess(&self, first_response: Pattern) -> Option<&ResponseEntry> {
        self.responses.get(&first_response)
    }

    /// Recommended word for the given turn (1-based), or `None` when the
    /// tree does not cover it and a live search is needed.
    pub fn get_recommendation(&self, guess_number: usize, pattern_history: &[Pattern]) -> Option<Word> {
        match guess_number {
            1 => self.first_guess,
            2 => pattern_history
                .first()
                .and_then(|pattern| self.get_second_guess(*pattern))
                .map(|entry| entry.best_guess),
            _ => None,
        }
    }

    /// Recommended next word given the guesses played so far with their
    /// responses. Second guesses are only offered when the game opened with
    /// this tree's first guess; otherwise `None`.
    pub fn recommend_after(&self, history: &[(Word, Pattern)]) -> Option<Word> {
        match history {
            [] => self.first_guess,
            [(opener, pattern)] if self.first_guess == Some(*opener) => {
                self.get_second_guess(*pattern).map(|entry| entry.best_guess)
            }
            _ => None,
        }
    }

    /// Whether the tree was computed for exactly these word lists.
    pub fn matches_word_lists(&self, solutions: &[Word], vocabulary: &[Word]) -> bool {
        self.solutions_count == solutions.len()
            && self.vocabulary_count == vocabulary.len()
            && self.word_list_digest == Some(word_lists_digest(solutions, vocabulary))
    }

    /// Computes the tree for `solutions`, considering every `vocabulary`
    /// word as a guess.
    ///
    /// Patterns are processed in batches and checkpointed to the cache file
    /// after each one. When the tree already holds a partial result for the
    /// same word lists, the recorded patterns are kept and only the missing
    /// ones are computed.
    pub fn precompute(
        &mut self,
        solutions: &[Word],
        vocabulary: &[Word],
        options: &PrecomputeOptions,
    ) -> Result<(), SolverError> {
        if solutions.is_empty() {
            return Err(SolverError::EmptyCandidates);
        }
        if vocabulary.is_empty() {
            return Err(SolverError::EmptyVocabulary);
        }

        let start = Instant::now();
        let digest = word_lists_digest(solutions, vocabulary);
        let resuming = self.is_ready() && self.matches_word_lists(solutions, vocabulary);

        let mut computed_anything = !resuming;
        let first_guess = match (resuming, self.first_guess) {
            (true, Some(word)) => {
                info!(
                    "resuming decision tree for {word} with {} patterns recorded",
                    self.responses.len()
                );
                word
            }
            _ => {
                info!(
                    "computing optimal first guess: {} solutions, {} vocabulary words",
                    solutions.len(),
                    vocabulary.len()
                );
                let (word, gain) = par_best_guess(solutions, vocabulary)?;
                info!("optimal first guess: {word} ({gain:.3} bits)");
                *self = DecisionTree {
                    first_guess: Some(word),
                    first_guess_info_gain: gain,
                    solutions_count: solutions.len(),
                    vocabulary_count: vocabulary.len(),
                    word_list_digest: Some(digest),
                    cache_file: self.cache_file.take(),
                    ..DecisionTree::default()
                };
                word
            }
        };
        let was_complete = self.complete;
        self.complete = false;

        if options.depth >= 2 {
            let partitions = partition(first_guess, solutions);
            let pending: Vec<(Pattern, &[Word])> = Pattern::all()
                .iter()
                .filter(|pattern| !self.responses.contains_key(*pattern))
                .filter_map(|&pattern| partitions.get(pattern).map(|words| (pattern, words)))
                .collect();
            if !pending.is_empty() {
                computed_anything = true;
                info!(
                    "computing second guesses for {} response patterns",
                    pending.len()
                );
            }

            let bar = progress_bar(pending.len(), options.show_progress);
            for batch in pending.chunks(options.batch_size.max(1)) {
                if options.interrupted() {
                    bar.abandon();
                    warn!(
                        "precompute interrupted with {} patterns recorded",
                        self.responses.len()
                    );
                    self.computation_time += start.elapsed().as_secs_f64();
                    self.checkpoint();
                    return Ok(());
                }

                let results = batch
                    .par_iter()
                    .map(|&(pattern, remaining)| {
                        second_guess(remaining, vocabulary).map(|entry| (pattern, entry))
                    })
                    .collect::<Result<Vec<_>, SolverError>>()?;
                self.responses.extend(results);
                bar.inc(batch.len() as u64);
                self.checkpoint();
            }
            bar.finish_and_clear();
        }

        self.complete = true;
        if !computed_anything {
            debug!("decision tree already covers every response pattern");
            if !was_complete {
                self.checkpoint();
            }
            return Ok(());
        }
        self.computed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|elapsed| elapsed.as_secs());
        self.computation_time += start.elapsed().as_secs_f64();
        info!(
            "decision tree computed in {:.1}s ({} response patterns)",
            self.computation_time,
            self.responses.len()
        );
        self.checkpoint();
        Ok(())
    }

    /// Summarises the cached responses.
    pub fn statistics(&self) -> TreeStatistics {
        let remaining: Vec<usize> = self
            .responses
            .values()
            .map(|entry| entry.remaining_count)
            .collect();
        let average_remaining = if remaining.is_empty() {
            0.0
        } else {
            remaining.iter().sum::<usize>() as f64 / remaining.len() as f64
        };

        TreeStatistics {
            first_guess: self.first_guess,
            first_guess_info_gain: self.first_guess_info_gain,
            solutions_count: self.solutions_count,
            patterns_cached: remaining.len(),
            average_remaining,
            min_remaining: remaining.iter().copied().min().unwrap_or(0),
            max_remaining: remaining.iter().copied().max().unwrap_or(0),
            complete: self.complete,
            computed_at: self.computed_at,
            computation_time: self.computation_time,
        }
    }
}

/// Summary of a decision tree, printable as a short report.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStatistics {
    pub first_guess: Option<Word>,
    pub first_guess_info_gain: f64,
    pub solutions_count: usize,
    pub patterns_cached: usize,
    pub average_remaining: f64,
    pub min_remaining: usize,
    pub max_remaining: usize,
    pub complete: bool,
    pub computed_at: Option<u64>,
    pub computation_time: f64,
}

impl fmt::Display for TreeStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Decision Tree Statistics")?;
        writeln!(f, "{}", "=".repeat(50))?;
        let Some(first_guess) = self.first_guess else {
            return write!(f, "Tree not computed yet");
        };

        writeln!(
            f,
            "First guess: {first_guess} ({:.3} bits)",
            self.first_guess_info_gain
        )?;
        writeln!(f, "Solutions analyzed: {}", self.solutions_count)?;
        writeln!(f, "Response patterns cached: {}", self.patterns_cached)?;
        if self.patterns_cached > 0 {
            writeln!(f, "After first guess:")?;
            writeln!(f, "  Average remaining: {:.1}", self.average_remaining)?;
            writeln!(f, "  Min remaining: {}", self.min_remaining)?;
            writeln!(f, "  Max remaining: {}", self.max_remaining)?;
        }
        if !self.complete {
            writeln!(f, "Status: partial (resume precompute to finish)")?;
        }
        if let Some(computed_at) = self.computed_at {
            writeln!(f, "Computed at: {computed_at} (unix time)")?;
        }
        write!(f, "Computation time: {:.1}s", self.computation_time)
    }
}

fn read_cache(path: &Path) -> Option<DecisionTree> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            debug!("no decision tree at {}: {err}", path.display());
            return None;
        }
    };
    let tree: DecisionTree = match serde_json::from_slice(&data) {
        Ok(tree) => tree,
        Err(err) => {
            warn!("ignoring corrupt decision tree {}: {err}", path.display());
            return None;
        }
    };
    if tree.version != TREE_VERSION {
        warn!(
            "ignoring decision tree {} with version {} (expected {TREE_VERSION})",
            path.display(),
            tree.version
        );
        return None;
    }
    Some(tree)
}

fn word_lists_digest(solutions: &[Word], vocabulary: &[Word]) -> WordListDigest {
    WordListDigest::of_list(&[solutions, vocabulary].concat())
}

fn second_guess(remaining: &[Word], vocabulary: &[Word]) -> Result<ResponseEntry, SolverError> {
    let (word, info_gain) = match remaining {
        [] => return Err(SolverError::EmptyCandidates),
        [only] => (*only, 0.0),
        [first, _] => (*first, 1.0),
        _ if remaining.len() <= CANDIDATES_ONLY_LIMIT => best_guess(remaining, remaining)?,
        _ => best_guess(remaining, vocabulary)?,
    };
    Ok(ResponseEntry {
        best_guess: word,
        info_gain,
        remaining_count: remaining.len(),
    })
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_message("Second guesses");
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{msg:<24} {bar:40.cyan/blue} {pos:>5}/{len:<5} [{elapsed_precise}<{eta_precise}]",
    ) {
        bar.set_style(style);
    }
    bar
}
