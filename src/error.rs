use thiserror::Error;

/// Every way the solver can fail before it produces a verdict.
///
/// `Sat`/`Unsat` are not part of this enum: both are successful outcomes of
/// `solve`, represented by [`crate::search::SolveResult`].
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed DIMACS input: {0}")]
    Format(String),

    #[error("assignment stack capacity exceeded: {0}")]
    Resource(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;
