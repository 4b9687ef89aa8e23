use env_logger::Env;
use log::{info, warn};
use rand::{seq::SliceRandom, thread_rng};
use std::env;
use std::error::Error;
use std::path::PathBuf;
use wordlebot::{
    DecisionTree, InformationGain, LookaheadEngine, Pattern, PositionalFrequency, StrategyMode,
    WORD_LENGTH, Word, default_cache_path, filter_candidates, load_words, merge_vocabulary,
};

const MAX_ATTEMPTS: usize = 6;
const DEFAULT_SOLUTIONS: &str = "data/wordle_solutions.txt";
const DEFAULT_GUESSES: &str = "data/wordle_guesses.txt";
const DEFAULT_DEPTH: usize = 2;
const TOP_GUESSES: usize = 5;
// Extra ranked guesses pulled in so equal gains at the cut-off can be
// reordered by positional frequency.
const TIE_POOL: usize = 4;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Suggest,
    Play,
}

struct Config {
    command: Command,
    solutions: PathBuf,
    guesses: Option<PathBuf>,
    cache: Option<PathBuf>,
    depth: usize,
    strategy: StrategyMode,
    limit_vocab: usize,
    positional: Vec<String>,
}

/// Where a recommended word came from.
enum Source {
    OnlyCandidate,
    DecisionTree,
    Lookahead(f64),
}

struct Solver {
    solutions: Vec<Word>,
    vocabulary: Vec<Word>,
    tree: Option<DecisionTree>,
    engine: LookaheadEngine,
    calculator: InformationGain,
    frequency: PositionalFrequency,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = parse_args()?;
    let mut solver = Solver::new(&config)?;
    match config.command {
        Command::Suggest => suggest(&mut solver, &config.positional),
        Command::Play => play(&mut solver, config.positional.first().map(String::as_str)),
    }
}

impl Solver {
    fn new(config: &Config) -> Result<Self, Box<dyn Error>> {
        let solutions = load_words(&config.solutions)
            .map_err(|err| format!("cannot read {}: {err}", config.solutions.display()))?;
        if solutions.is_empty() {
            return Err(format!("no words found in {}", config.solutions.display()).into());
        }

        let extra = match &config.guesses {
            Some(path) => load_words(path).unwrap_or_else(|err| {
                warn!("skipping guess list {}: {err}", path.display());
                Vec::new()
            }),
            None => Vec::new(),
        };
        let vocabulary = merge_vocabulary(&solutions, &extra, config.limit_vocab);
        info!(
            "loaded {} solutions and {} vocabulary words",
            solutions.len(),
            vocabulary.len()
        );

        let tree = config
            .cache
            .as_ref()
            .map(DecisionTree::load)
            .filter(|tree| {
                let usable = tree.is_ready() && tree.matches_word_lists(&solutions, &vocabulary);
                if tree.is_ready() && !usable {
                    warn!("decision tree was computed for different word lists; ignoring it");
                }
                usable
            });

        Ok(Self::with_tree(
            solutions,
            vocabulary,
            tree,
            LookaheadEngine::new(config.depth, config.strategy),
        ))
    }

    fn with_tree(
        solutions: Vec<Word>,
        vocabulary: Vec<Word>,
        tree: Option<DecisionTree>,
        engine: LookaheadEngine,
    ) -> Self {
        let frequency = PositionalFrequency::from_solutions(&solutions);
        Self {
            solutions,
            vocabulary,
            tree,
            engine,
            calculator: InformationGain::new(),
            frequency,
        }
    }

    /// `history` holds every guess played so far with its response.
    fn recommend(
        &mut self,
        candidates: &[Word],
        history: &[(Word, Pattern)],
    ) -> Result<(Word, Source), Box<dyn Error>> {
        if let [only] = candidates {
            return Ok((*only, Source::OnlyCandidate));
        }

        let cached = self
            .tree
            .as_ref()
            .and_then(|tree| tree.recommend_after(history));
        if let Some(word) = cached {
            return Ok((word, Source::DecisionTree));
        }

        let best = self.engine.best_move(candidates)?;
        Ok((best.word, Source::Lookahead(best.score)))
    }
}

fn suggest(solver: &mut Solver, entries: &[String]) -> Result<(), Box<dyn Error>> {
    let mut candidates = solver.solutions.clone();
    let mut history = Vec::with_capacity(entries.len());
    for entry in entries {
        let (guess, pattern) = parse_history_entry(entry)?;
        candidates = filter_candidates(guess, pattern, &candidates);
        println!(
            "{guess} {} -> {} possible answers",
            pattern.to_response(guess),
            candidates.len()
        );
        history.push((guess, pattern));
    }

    if candidates.is_empty() {
        return Err("no answers are consistent with that feedback".into());
    }

    let (word, source) = solver.recommend(&candidates, &history)?;
    print_recommendation(word, &source, candidates.len());

    if candidates.len() > 2 && !matches!(source, Source::DecisionTree) {
        let mut top = solver.calculator.rank_guesses(
            &candidates,
            &solver.vocabulary,
            TOP_GUESSES * TIE_POOL,
        );
        solver.frequency.rank_ties(&mut top);
        top.truncate(TOP_GUESSES);
        let description = top
            .iter()
            .map(|guess| {
                format!(
                    "{} ({:.2} bits, positional {:.2}{})",
                    guess.word,
                    guess.info_gain,
                    solver.frequency.score_word(guess.word),
                    if guess.is_candidate { "" } else { ", insight" }
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("Top information guesses: {description}");
    }

    if candidates.len() <= 10 {
        let listing = candidates
            .iter()
            .map(Word::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("Remaining answers: {listing}");
    }
    Ok(())
}

fn play(solver: &mut Solver, target: Option<&str>) -> Result<(), Box<dyn Error>> {
    let target = match target {
        Some(word) => Word::new(word)?,
        None => *solver
            .solutions
            .choose(&mut thread_rng())
            .ok_or("solution list is empty")?,
    };
    if !solver.solutions.contains(&target) {
        warn!("{target} is not in the solution list; the solver can not find it");
    }

    println!("Solving for: {target}");
    let mut candidates = solver.solutions.clone();
    let mut history = Vec::new();
    for attempt in 1..=MAX_ATTEMPTS {
        if candidates.is_empty() {
            break;
        }
        let (guess, source) = solver.recommend(&candidates, &history)?;
        let pattern = Pattern::compute(guess, target);
        println!(
            "Guess {attempt}: {guess} -> {} ({}, {} candidates)",
            pattern.to_response(guess),
            source_label(&source),
            candidates.len()
        );

        if pattern.is_solved() {
            println!(
                "Solved in {attempt} guess{}.",
                if attempt == 1 { "" } else { "es" }
            );
            return Ok(());
        }
        candidates = filter_candidates(guess, pattern, &candidates);
        history.push((guess, pattern));
    }

    println!("Failed to solve {target} within {MAX_ATTEMPTS} guesses.");
    Ok(())
}

/// Accepts `guess=response` where the response is either in `G`/`Y`/`X`
/// notation or the interactive notation (`Cr??E`).
fn parse_history_entry(entry: &str) -> Result<(Word, Pattern), Box<dyn Error>> {
    let (guess, response) = entry
        .split_once('=')
        .ok_or_else(|| format!("expected GUESS=RESPONSE, got '{entry}'"))?;
    let guess = Word::new(guess)?;
    let pattern = match response.parse::<Pattern>() {
        Ok(pattern) => pattern,
        Err(_) => Pattern::from_response(guess, response)?,
    };
    Ok((guess, pattern))
}

fn source_label(source: &Source) -> String {
    match source {
        Source::OnlyCandidate => "only candidate".to_string(),
        Source::DecisionTree => "decision tree".to_string(),
        Source::Lookahead(score) => format!("lookahead, {score:.2} expected"),
    }
}

fn print_recommendation(word: Word, source: &Source, remaining: usize) {
    println!(
        "Suggested guess: {word} ({remaining} possible answers, {})",
        source_label(source)
    );
}

fn parse_args() -> Result<Config, Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut idx = 0;
    let mut config = Config {
        command: Command::Suggest,
        solutions: PathBuf::from(DEFAULT_SOLUTIONS),
        guesses: Some(PathBuf::from(DEFAULT_GUESSES)),
        cache: default_cache_path(),
        depth: DEFAULT_DEPTH,
        strategy: StrategyMode::default(),
        limit_vocab: 0,
        positional: Vec::new(),
    };

    while idx < args.len() {
        let arg = &args[idx];
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--solutions" => {
                idx += 1;
                config.solutions = PathBuf::from(value_for(&args, idx, arg)?);
            }
            "--guesses" => {
                idx += 1;
                config.guesses = Some(PathBuf::from(value_for(&args, idx, arg)?));
            }
            "--no-guesses" => config.guesses = None,
            "--cache" => {
                idx += 1;
                config.cache = Some(PathBuf::from(value_for(&args, idx, arg)?));
            }
            "--no-cache" => config.cache = None,
            "--depth" => {
                idx += 1;
                config.depth = value_for(&args, idx, arg)?
                    .parse()
                    .map_err(|err| format!("invalid --depth: {err}"))?;
            }
            "--strategy" => {
                idx += 1;
                config.strategy = value_for(&args, idx, arg)?.parse()?;
            }
            "--limit-vocab" => {
                idx += 1;
                config.limit_vocab = value_for(&args, idx, arg)?
                    .parse()
                    .map_err(|err| format!("invalid --limit-vocab: {err}"))?;
            }
            "suggest" if idx == 0 => config.command = Command::Suggest,
            "play" if idx == 0 => config.command = Command::Play,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown argument: {arg}").into());
            }
            _ => config.positional.push(arg.clone()),
        }
        idx += 1;
    }

    if config.command == Command::Play && config.positional.len() > 1 {
        return Err(String::from("multiple targets provided").into());
    }
    Ok(config)
}

fn value_for<'a>(args: &'a [String], idx: usize, flag: &str) -> Result<&'a str, Box<dyn Error>> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}").into())
}

fn print_usage() {
    println!("Suggest Wordle guesses by expected information gain.");
    println!("Usage: wordlebot [suggest] [OPTIONS] [GUESS=RESPONSE ...]");
    println!("       wordlebot play [OPTIONS] [TARGET]");
    println!();
    println!("Responses use G/Y/X (green/yellow/gray) or the {WORD_LENGTH}-letter form");
    println!("where capitals are green, lowercase yellow and '?' gray, e.g. crane=Cr??E.");
    println!();
    println!("Options:");
    println!("  --solutions PATH   answer list (default {DEFAULT_SOLUTIONS})");
    println!("  --guesses PATH     extra allowed guesses (default {DEFAULT_GUESSES})");
    println!("  --no-guesses       only guess possible answers");
    println!("  --cache PATH       decision tree file (default from $WORDLEBOT_CACHE or the cache dir)");
    println!("  --no-cache         ignore the decision tree");
    println!("  --depth N          lookahead depth (default {DEFAULT_DEPTH})");
    println!("  --strategy MODE    aggressive, safe or balanced (default balanced)");
    println!("  --limit-vocab N    keep the first N vocabulary words, as the decision tree");
    println!("                     was built with (0 = no limit)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordlebot::{PrecomputeOptions, words};

    fn solver() -> Solver {
        let solutions = words([
            "crane", "crate", "craze", "grace", "trace", "brace", "slate", "plate", "moist",
            "hoist", "joist", "pudgy", "fully", "chord", "sword",
        ])
        .unwrap();
        let vocabulary = solutions.clone();
        let mut tree = DecisionTree::new();
        tree.precompute(&solutions, &vocabulary, &PrecomputeOptions::default())
            .unwrap();
        Solver::with_tree(
            solutions,
            vocabulary,
            Some(tree),
            LookaheadEngine::new(2, StrategyMode::Balanced),
        )
    }

    #[test]
    fn tree_opens_the_game() {
        let mut solver = solver();
        let opener = solver.tree.as_ref().and_then(DecisionTree::first_guess);
        let candidates = solver.solutions.clone();
        let (word, source) = solver.recommend(&candidates, &[]).unwrap();
        assert_eq!(Some(word), opener);
        assert!(matches!(source, Source::DecisionTree));
    }

    #[test]
    fn other_openers_fall_back_to_lookahead() {
        let mut solver = solver();
        let opener = solver.tree.as_ref().and_then(DecisionTree::first_guess).unwrap();
        let guess = Word::new("fully").unwrap();
        assert_ne!(guess, opener);

        let pattern = Pattern::compute(guess, Word::new("chord").unwrap());
        let candidates = filter_candidates(guess, pattern, &solver.solutions);
        let (word, source) = solver.recommend(&candidates, &[(guess, pattern)]).unwrap();
        assert!(matches!(source, Source::Lookahead(_)));
        assert!(candidates.contains(&word));
    }

    #[test]
    fn tree_answers_the_second_guess_after_its_opener() {
        let mut solver = solver();
        let tree = solver.tree.clone().unwrap();
        let opener = tree.first_guess().unwrap();
        let (pattern, entry) = tree
            .responses()
            .iter()
            .find(|(_, entry)| entry.remaining_count > 1)
            .unwrap();
        let candidates = filter_candidates(opener, *pattern, &solver.solutions);
        let (word, source) = solver.recommend(&candidates, &[(opener, *pattern)]).unwrap();
        assert!(matches!(source, Source::DecisionTree));
        assert_eq!(word, entry.best_guess);
    }
}
