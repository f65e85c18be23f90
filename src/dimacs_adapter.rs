//! Converts `dimacs`-crate output into this crate's own [`Formula`], and
//! folds every parser-boundary failure into [`SolverError::Format`].

use dimacs::{Instance, Lit, Sign};

use crate::error::{Result, SolverError};
use crate::formula::Formula;
use crate::MAX_VARIABLES;

/// Parses DIMACS CNF text into a ready-to-solve [`Formula`].
///
/// Rejects (as a format error): a missing/malformed header, a literal
/// whose absolute value exceeds the declared variable count, EOF inside
/// a clause (all surfaced by the `dimacs` crate's own parser), the
/// non-CNF `p sat` variant, and a variable count above
/// [`MAX_VARIABLES`].
pub fn parse(dimacs_text: &str) -> Result<Formula> {
    let instance = dimacs::parse_dimacs(dimacs_text)
        .map_err(|err| SolverError::Format(format!("{err:?}")))?;

    let (num_vars, clauses) = match instance {
        Instance::Cnf { num_vars, clauses } => (num_vars as usize, clauses),
        Instance::Sat { .. } => {
            return Err(SolverError::Format(
                "expected DIMACS CNF format, got the `p sat` variant".into(),
            ))
        }
    };

    if num_vars > MAX_VARIABLES {
        return Err(SolverError::Format(format!(
            "too many variables: {num_vars} exceeds the cap of {MAX_VARIABLES}"
        )));
    }

    let raw_clauses = clauses
        .iter()
        .map(|clause| clause.lits().iter().map(|&lit| lit_to_i32(lit)).collect())
        .collect();

    Formula::from_clauses(num_vars, raw_clauses)
}

fn lit_to_i32(lit: Lit) -> i32 {
    let name = lit.var().to_u64() as i32;
    if lit.sign() == Sign::Pos {
        name
    } else {
        -name
    }
}
