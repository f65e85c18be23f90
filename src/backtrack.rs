//! Reversing propagation events: undoing a single depth's retags, and the
//! composite "undo back to the last decision" operation the search driver
//! uses when a branch conflicts.

use log::debug;

use crate::assignment::{AssignmentEntry, AssignmentKind, AssignmentStack};
use crate::error::{Result, SolverError};
use crate::formula::Formula;

/// Undoes everything a single assignment did: restores every literal it
/// retagged to `InUse` and restores its variable to `old_value`.
fn revert_at(formula: &mut Formula, entry: &AssignmentEntry) {
    formula.revert(entry.var, entry.old_value, entry.depth);
}

/// Pops the stack down through the run of `Unit` entries at the top,
/// reverting each, then pops and reverts the `Decision` entry beneath
/// them. Returns that decision entry.
///
/// # Errors
///
/// Returns `SolverError::Internal` if the stack runs out before a
/// `Decision` entry is found — that would mean I4/I5 has been violated
/// elsewhere in the driver.
pub fn revert_top_decision(
    formula: &mut Formula,
    stack: &mut AssignmentStack,
) -> Result<AssignmentEntry> {
    while !stack.is_empty() && stack.peek().kind == AssignmentKind::Unit {
        let entry = stack.pop();
        revert_at(formula, &entry);
    }

    if stack.is_empty() {
        return Err(SolverError::Internal(
            "expected a decision entry but the assignment stack was empty".into(),
        ));
    }

    let entry = stack.pop();
    if entry.kind != AssignmentKind::Decision {
        return Err(SolverError::Internal(format!(
            "expected a decision entry at depth {} but found a unit entry",
            entry.depth.get()
        )));
    }

    revert_at(formula, &entry);
    debug!(
        "backtrack: reverted decision on variable {} (was {:?})",
        entry.var.name(),
        entry.new_value
    );

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::AssignmentKind;
    use crate::formula::{Formula, VarValue};
    use crate::propagate::assign_and_propagate;

    #[test]
    fn revert_top_decision_undoes_unit_consequences_then_the_decision() {
        // (x1 ∨ x2) ∧ (¬x1 ∨ x3): deciding x1 = true forces x3 = true.
        let mut formula = Formula::from_clauses(3, vec![vec![1, 2], vec![-1, 3]]).unwrap();
        let mut stack = AssignmentStack::new(8);

        assign_and_propagate(
            &mut formula,
            &mut stack,
            crate::formula::VarId::new(1),
            VarValue::True,
            AssignmentKind::Decision,
        )
        .unwrap()
        .unwrap();
        crate::propagate::unit_propagate(&mut formula, &mut stack)
            .unwrap()
            .unwrap();

        assert_eq!(stack.depth(), 2);

        let decision = revert_top_decision(&mut formula, &mut stack).unwrap();
        assert_eq!(decision.var.name(), 1);
        assert_eq!(decision.new_value, VarValue::True);
        assert!(stack.is_empty());
        assert_eq!(formula.value(crate::formula::VarId::new(1)), VarValue::Unassigned);
        assert_eq!(formula.value(crate::formula::VarId::new(3)), VarValue::Unassigned);
    }

    #[test]
    fn revert_top_decision_on_empty_stack_is_internal_error() {
        let mut formula = Formula::from_clauses(1, vec![vec![1]]).unwrap();
        let mut stack = AssignmentStack::new(8);

        let err = revert_top_decision(&mut formula, &mut stack).unwrap_err();
        assert!(matches!(err, SolverError::Internal(_)));
    }
}
