use thiserror::Error;

/// Errors raised by the solver when its inputs have the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("expected a {expected}-letter word, but found {found} letters")]
    InvalidWordLength { expected: usize, found: usize },
    #[error("'{word}' contains characters other than ascii letters")]
    InvalidCharacters { word: String },
    #[error("'{pattern}' is not a valid response pattern")]
    InvalidPattern { pattern: String },
    #[error("invalid strategy mode '{mode}', expected one of aggressive, safe, balanced")]
    InvalidStrategy { mode: String },
    #[error("cannot search an empty candidate set")]
    EmptyCandidates,
    #[error("cannot search an empty guess vocabulary")]
    EmptyVocabulary,
}
