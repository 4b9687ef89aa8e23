use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wordlebot::{InformationGain, LookaheadEngine, StrategyMode, Word, information_gain, par_best_guess};

fn random_words(count: usize, seed: u64) -> Vec<Word> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let letters: String = (0..5)
                .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
                .collect();
            Word::new(&letters).expect("generated words are five letters")
        })
        .collect()
}

fn entropy_benchmark(c: &mut Criterion) {
    let solutions = random_words(2_000, 7);
    let vocabulary = random_words(500, 11);

    c.bench_function("information_gain/2000_candidates", |b| {
        b.iter(|| {
            for &guess in vocabulary.iter().take(3) {
                black_box(information_gain(black_box(guess), &solutions));
            }
        });
    });

    c.bench_function("information_gain/cached", |b| {
        let mut calc = InformationGain::new();
        b.iter(|| calc.information_gain(black_box(vocabulary[0]), &solutions));
    });

    let sample: Vec<Word> = solutions.iter().take(500).copied().collect();
    c.bench_function("par_best_guess/500x500", |b| {
        b.iter(|| par_best_guess(black_box(&sample), &vocabulary).expect("non-empty lists"));
    });

    let small: Vec<Word> = solutions.iter().take(80).copied().collect();
    c.bench_function("lookahead/depth2_80_candidates", |b| {
        b.iter(|| {
            let mut engine = LookaheadEngine::new(2, StrategyMode::Balanced);
            engine.best_move(black_box(&small)).expect("non-empty candidates")
        });
    });
}

criterion_group!(benches, entropy_benchmark);
criterion_main!(benches);
