//! Applying one assignment to the formula, and repeating that until no
//! unit clause remains.

use log::trace;

use crate::assignment::{AssignmentKind, AssignmentStack};
use crate::formula::{Formula, VarId, VarValue};

/// Pushes `(var, new_value)` as an entry of kind `kind` and applies it to
/// `formula`. Returns `Ok(())` if no clause became empty, `Err(())` on
/// conflict. The entry stays on the stack either way — the caller decides
/// whether and how to unwind it.
pub fn assign_and_propagate(
    formula: &mut Formula,
    stack: &mut AssignmentStack,
    var: VarId,
    new_value: VarValue,
    kind: AssignmentKind,
) -> crate::error::Result<Result<(), ()>> {
    let old_value = formula.value(var);
    let depth = stack.push(var, old_value, new_value, kind)?;

    let ok = formula.propagate(var, new_value, depth);
    Ok(if ok { Ok(()) } else { Err(()) })
}

/// Repeatedly finds a unit clause and propagates its forced literal until
/// no unit clause remains. Continues past a conflict so every implied
/// consequence lands on the stack before the caller unwinds — see the
/// module-level note on why the loop never returns early.
pub fn unit_propagate(
    formula: &mut Formula,
    stack: &mut AssignmentStack,
) -> crate::error::Result<Result<(), ()>> {
    let mut saw_conflict = false;

    while let Some((_clause, lit)) = formula.first_unit_clause() {
        let var = lit.var();
        let new_value = lit.satisfying_value();

        trace!("unit propagation: {:?} forced by unit clause", lit.to_i32());

        let result = assign_and_propagate(formula, stack, var, new_value, AssignmentKind::Unit)?;
        if result.is_err() {
            saw_conflict = true;
        }
    }

    Ok(if saw_conflict { Err(()) } else { Ok(()) })
}
