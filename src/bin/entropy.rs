use env_logger::Env;
use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use wordlebot::{PositionalFrequency, Word, entropy_of, information_gain, load_words, partition};

const DEFAULT_SOLUTIONS: &str = "data/wordle_solutions.txt";
const LARGEST_PARTITIONS: usize = 5;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let guess = args.next().ok_or_else(|| {
        IoError::new(
            ErrorKind::InvalidInput,
            "usage: wordlebot-entropy <guess word> [solutions file]",
        )
    })?;
    let solutions_path = args.next().unwrap_or_else(|| DEFAULT_SOLUTIONS.to_string());

    let guess = Word::new(&guess)?;
    let solutions = load_words(&solutions_path)?;
    let partitions = partition(guess, &solutions);

    println!("Guess: {guess}");
    println!("Total solutions: {}", solutions.len());
    println!("Entropy before guessing: {:.4} bits", entropy_of(&solutions));
    println!("Distinct patterns: {}", partitions.len());
    println!(
        "Information gain: {:.4} bits",
        information_gain(guess, &solutions)
    );

    let frequency = PositionalFrequency::from_solutions(&solutions);
    let breakdown = guess
        .to_string()
        .chars()
        .enumerate()
        .map(|(position, letter)| format!("{letter}:{}", frequency.count(letter, position)))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "Positional score: {:.3} ({breakdown})",
        frequency.score_word(guess)
    );

    let mut largest: Vec<_> = partitions.sorted();
    largest.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
    println!("Largest partitions:");
    for (pattern, members) in largest.into_iter().take(LARGEST_PARTITIONS) {
        println!("  {pattern}  {:>5} words", members.len());
    }

    Ok(())
}
