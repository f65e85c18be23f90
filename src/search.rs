//! The search driver: the CHOOSE / FLIP / UNWIND state machine that
//! orchestrates decisions, unit propagation, and chronological
//! backtracking into a SAT/UNSAT verdict.

use log::debug;

use crate::assignment::{AssignmentKind, AssignmentStack};
use crate::backtrack::revert_top_decision;
use crate::error::Result;
use crate::formula::{Formula, VarId, VarValue};
use crate::propagate::{assign_and_propagate, unit_propagate};

/// The solver's verdict. Neither variant is an error: both are successful
/// terminations of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    Sat,
    Unsat,
}

impl std::fmt::Display for SolveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveResult::Sat => write!(f, "SAT"),
            SolveResult::Unsat => write!(f, "UNSAT"),
        }
    }
}

/// Explicit states of the chronological-backtracking DPLL loop. `Choose`
/// is both the entry point and the state returned to after every
/// conflict-free step. `Flip` carries the variable whose `true` branch
/// already conflicted and has already been reverted off the stack — by
/// the `Choose` conflict arm or by `Unwind` — so `Flip` only ever pushes
/// the `false` decision, never reverts one itself.
enum State {
    Choose,
    Flip(VarId),
    Unwind,
}

/// Runs DPLL to completion on `formula`, using `stack` as scratch space
/// for the assignment trail. `stack` should be freshly created with
/// capacity `formula.num_variables()`.
pub fn solve(formula: &mut Formula, stack: &mut AssignmentStack) -> Result<SolveResult> {
    // A vacuous (zero-literal) clause is unconditionally false and has no
    // variable for propagate to ever visit it through; catch it here
    // rather than relying on the per-variable conflict loop to find it.
    if formula.has_vacuous_clause() {
        return Ok(SolveResult::Unsat);
    }

    let mut state = State::Choose;

    loop {
        state = match state {
            State::Choose => match formula.find_unassigned_variable() {
                None => return Ok(SolveResult::Sat),
                Some(var) => {
                    debug!("decision: variable {} := true (depth {})", var.name(), stack.depth() + 1);
                    let step = assign_and_propagate(
                        formula,
                        stack,
                        var,
                        VarValue::True,
                        AssignmentKind::Decision,
                    )?;
                    let step = match step {
                        Ok(()) => unit_propagate(formula, stack)?,
                        conflict => conflict,
                    };
                    match step {
                        Ok(()) => State::Choose,
                        Err(()) => {
                            // Undo the just-pushed true decision (and any
                            // unit consequences) right here, so `Flip`
                            // never has to guess whether a revert is
                            // still owed.
                            let decision = revert_top_decision(formula, stack)?;
                            debug_assert_eq!(decision.var, var);
                            debug_assert_eq!(decision.new_value, VarValue::True);
                            State::Flip(var)
                        }
                    }
                }
            },

            State::Flip(var) => {
                debug!("decision: variable {} := false (depth {})", var.name(), stack.depth() + 1);
                let step = assign_and_propagate(
                    formula,
                    stack,
                    var,
                    VarValue::False,
                    AssignmentKind::Decision,
                )?;
                let step = match step {
                    Ok(()) => unit_propagate(formula, stack)?,
                    conflict => conflict,
                };
                match step {
                    Ok(()) => State::Choose,
                    Err(()) => State::Unwind,
                }
            }

            State::Unwind => loop {
                if stack.is_empty() {
                    return Ok(SolveResult::Unsat);
                }

                let popped = revert_top_decision(formula, stack)?;
                if popped.new_value == VarValue::True {
                    break State::Flip(popped.var);
                }
                // `new_value == False`: this level's both branches are
                // exhausted, keep unwinding to the next decision down.
            },
        };
    }
}
