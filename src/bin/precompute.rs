use env_logger::Env;
use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use wordlebot::{
    DecisionTree, Pattern, PositionalFrequency, PrecomputeOptions, default_cache_path, load_words,
    merge_vocabulary,
};

const DEFAULT_SOLUTIONS: &str = "data/wordle_solutions.txt";
const DEFAULT_GUESSES: &str = "data/wordle_guesses.txt";
const SAMPLE_PATTERNS: [&str; 4] = ["XXXXX", "GXXXX", "XGXXX", "XXGXX"];

struct Config {
    solutions: PathBuf,
    guesses: PathBuf,
    output: PathBuf,
    depth: usize,
    solutions_only: bool,
    limit_vocab: usize,
    force: bool,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = parse_args()?;

    let solutions = load_words(&config.solutions).map_err(|err| {
        format!(
            "solutions file {} not readable: {err}",
            config.solutions.display()
        )
    })?;
    if solutions.is_empty() {
        return Err(format!("no words found in {}", config.solutions.display()).into());
    }
    println!("Solutions: {} words", solutions.len());

    let extra = if config.solutions_only {
        println!("Vocabulary: solutions only (faster, may be suboptimal)");
        Vec::new()
    } else {
        load_words(&config.guesses)?
    };
    let vocabulary = merge_vocabulary(&solutions, &extra, config.limit_vocab);
    println!("Vocabulary: {} words", vocabulary.len());
    if config.limit_vocab > 0 {
        println!(
            "Vocabulary limited to {} words; run wordlebot with the same --limit-vocab to use this tree",
            config.limit_vocab
        );
    }

    let mut tree = if config.force {
        let mut tree = DecisionTree::new();
        tree.set_cache_file(Some(config.output.clone()));
        tree
    } else {
        DecisionTree::load(&config.output)
    };

    let options = PrecomputeOptions {
        depth: config.depth,
        show_progress: true,
        ..PrecomputeOptions::default()
    };
    let start = Instant::now();
    tree.precompute(&solutions, &vocabulary, &options)?;
    println!(
        "Pre-computation finished in {:.1}s; cached to {}",
        start.elapsed().as_secs_f64(),
        config.output.display()
    );

    println!();
    println!("{}", tree.statistics());
    println!();
    if let Some(first) = tree.first_guess() {
        println!("First guess recommendation: {first}");
    }
    for sample in SAMPLE_PATTERNS {
        let pattern: Pattern = sample.parse()?;
        if let Some(entry) = tree.get_second_guess(pattern) {
            println!(
                "  After {pattern}: {} ({} remaining)",
                entry.best_guess, entry.remaining_count
            );
        }
    }
    println!();
    println!("{}", PositionalFrequency::from_solutions(&solutions));
    Ok(())
}

fn parse_args() -> Result<Config, Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut idx = 0;
    let mut config = Config {
        solutions: PathBuf::from(DEFAULT_SOLUTIONS),
        guesses: PathBuf::from(DEFAULT_GUESSES),
        output: default_cache_path().unwrap_or_default(),
        depth: 2,
        solutions_only: false,
        limit_vocab: 0,
        force: false,
    };

    while idx < args.len() {
        let arg = args[idx].as_str();
        let mut value = || {
            idx += 1;
            args.get(idx)
                .cloned()
                .ok_or_else(|| format!("missing value for {arg}"))
        };
        match arg {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--solutions" => config.solutions = PathBuf::from(value()?),
            "--guesses" => config.guesses = PathBuf::from(value()?),
            "--output" | "-o" => config.output = PathBuf::from(value()?),
            "--depth" => {
                config.depth = value()?
                    .parse()
                    .map_err(|err| format!("invalid --depth: {err}"))?
            }
            "--limit-vocab" => {
                config.limit_vocab = value()?
                    .parse()
                    .map_err(|err| format!("invalid --limit-vocab: {err}"))?
            }
            "--solutions-only" => config.solutions_only = true,
            "--force" => config.force = true,
            _ => return Err(format!("unknown argument: {arg}").into()),
        }
        idx += 1;
    }

    if config.output.as_os_str().is_empty() {
        return Err("no cache directory available; pass --output".into());
    }
    Ok(config)
}

fn print_usage() {
    println!("Pre-compute the optimal first and second guesses.");
    println!("Usage: wordlebot-precompute [OPTIONS]");
    println!("  --depth N          1 = first guess only, 2 = first two guesses (default 2)");
    println!("  --output, -o PATH  cache file (default from $WORDLEBOT_CACHE or the cache dir)");
    println!("  --solutions PATH   answer list (default {DEFAULT_SOLUTIONS})");
    println!("  --guesses PATH     extra allowed guesses (default {DEFAULT_GUESSES})");
    println!("  --solutions-only   only evaluate answers as guesses");
    println!("  --limit-vocab N    keep the first N vocabulary words (0 = no limit);");
    println!("                     wordlebot only uses the tree with the same --limit-vocab");
    println!("  --force            ignore any partial result and start over");
}
