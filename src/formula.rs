//! The formula store: variables, clauses, and the literal-tag bookkeeping
//! that lets a tentative simplification be undone exactly.

use fixedbitset::FixedBitSet;

use crate::error::{Result, SolverError};

/// A variable's name, 1-based as in DIMACS. `VarId(1)` is the first variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(u32);

impl VarId {
    pub(crate) fn new(name: u32) -> Self {
        VarId(name)
    }

    pub fn name(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

/// A clause's position in the formula's clause list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClauseId(usize);

impl ClauseId {
    fn index(self) -> usize {
        self.0
    }
}

/// The stack depth an assignment was pushed at. 1-based; see
/// [`crate::assignment::AssignmentStack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth(u32);

impl Depth {
    pub fn new(value: u32) -> Self {
        Depth(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// A variable's current truth value under the partial assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarValue {
    Unassigned,
    False,
    True,
}

/// An occurrence of a variable inside a clause, with its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lit {
    var: VarId,
    negated: bool,
}

impl Lit {
    fn from_signed(value: i32) -> (Self, u32) {
        let negated = value < 0;
        let name = value.unsigned_abs();
        (
            Lit {
                var: VarId::new(name),
                negated,
            },
            name,
        )
    }

    pub fn var(self) -> VarId {
        self.var
    }

    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// Whether this literal evaluates to true under `value`. Unassigned
    /// never evaluates true.
    fn gives_true(self, value: VarValue) -> bool {
        matches!(
            (value, self.negated),
            (VarValue::True, false) | (VarValue::False, true)
        )
    }

    /// Whether this literal evaluates to false under `value`.
    fn gives_false(self, value: VarValue) -> bool {
        matches!(
            (value, self.negated),
            (VarValue::False, false) | (VarValue::True, true)
        )
    }

    /// The value this literal's variable must take for the literal to be true.
    pub fn satisfying_value(self) -> VarValue {
        if self.negated {
            VarValue::False
        } else {
            VarValue::True
        }
    }

    pub fn to_i32(self) -> i32 {
        let n = self.var.0 as i32;
        if self.negated {
            -n
        } else {
            n
        }
    }
}

/// A literal's tag inside its owning clause: either still active, or
/// retired at the stack depth of the assignment that retired it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    InUse,
    Removed(Depth),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClauseLit {
    lit: Lit,
    tag: Tag,
}

/// A disjunction of literals, with a running count of active literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    literals: Vec<ClauseLit>,
    n_in_use: usize,
}

impl Clause {
    pub fn n_in_use(&self) -> usize {
        self.n_in_use
    }

    pub fn active_literals(&self) -> impl Iterator<Item = Lit> + '_ {
        self.literals
            .iter()
            .filter(|cl| cl.tag == Tag::InUse)
            .map(|cl| cl.lit)
    }

    pub fn all_literals(&self) -> impl Iterator<Item = Lit> + '_ {
        self.literals.iter().map(|cl| cl.lit)
    }

    /// A clause with no literals at all is an unconditional contradiction:
    /// it has no variable to propagate through, so it can never be caught
    /// by [`Formula::propagate`]'s per-variable conflict check.
    fn is_vacuous(&self) -> bool {
        self.literals.is_empty()
    }
}

struct VarState {
    value: VarValue,
    related_clauses: Vec<ClauseId>,
}

/// Owns the variable table and clause list for one solve. Clauses are never
/// structurally removed: "deletion" is the logical retagging described in
/// the module docs, so it is always reversible.
pub struct Formula {
    vars: Vec<VarState>,
    clauses: Vec<Clause>,
    assigned: FixedBitSet,
}

impl Formula {
    /// Builds a formula from `num_vars` variables and a list of clauses,
    /// each a list of non-zero signed integers (DIMACS literal encoding,
    /// already stripped of the trailing `0` terminator).
    pub fn from_clauses(num_vars: usize, raw_clauses: Vec<Vec<i32>>) -> Result<Self> {
        let mut vars: Vec<VarState> = (0..num_vars)
            .map(|_| VarState {
                value: VarValue::Unassigned,
                related_clauses: Vec::new(),
            })
            .collect();

        let mut clauses = Vec::with_capacity(raw_clauses.len());

        for (clause_idx, raw_clause) in raw_clauses.into_iter().enumerate() {
            let clause_id = ClauseId(clause_idx);
            let mut literals = Vec::with_capacity(raw_clause.len());

            for value in raw_clause {
                if value == 0 {
                    return Err(SolverError::Format(
                        "literal 0 is not a valid variable name".into(),
                    ));
                }

                let (lit, name) = Lit::from_signed(value);
                if name == 0 || name as usize > num_vars {
                    return Err(SolverError::Format(format!(
                        "literal {value} refers to variable {name}, out of range 1..={num_vars}"
                    )));
                }

                vars[lit.var.index()].related_clauses.push(clause_id);
                literals.push(ClauseLit {
                    lit,
                    tag: Tag::InUse,
                });
            }

            let n_in_use = literals.len();
            clauses.push(Clause {
                literals,
                n_in_use,
            });
        }

        Ok(Formula {
            vars,
            clauses,
            assigned: FixedBitSet::with_capacity(num_vars),
        })
    }

    pub fn num_variables(&self) -> usize {
        self.vars.len()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns any unassigned variable, breaking ties by lowest name.
    pub fn find_unassigned_variable(&self) -> Option<VarId> {
        self.assigned.zeroes().next().map(|idx| VarId::new(idx as u32 + 1))
    }

    /// Returns any unit clause together with its sole active literal,
    /// breaking ties by lowest clause index then lowest literal position.
    pub fn first_unit_clause(&self) -> Option<(ClauseId, Lit)> {
        for (idx, clause) in self.clauses.iter().enumerate() {
            if clause.n_in_use != 1 {
                continue;
            }

            if let Some(cl) = clause.literals.iter().find(|cl| cl.tag == Tag::InUse) {
                return Some((ClauseId(idx), cl.lit));
            }
        }
        None
    }

    pub fn value(&self, var: VarId) -> VarValue {
        self.vars[var.index()].value
    }

    /// Every clause that mentions `var`, in the order its literals were
    /// first seen while building the formula. One of the formula store's
    /// exposed queries (alongside [`Formula::value`] and
    /// [`Formula::find_unassigned_variable`]); `pub(crate)` rather than
    /// fully public since nothing outside this crate holds a `ClauseId`.
    pub(crate) fn related_clauses(&self, var: VarId) -> &[ClauseId] {
        &self.vars[var.index()].related_clauses
    }

    /// Whether the formula contains a clause with zero literals — an
    /// unconditionally false disjunction that no assignment can satisfy.
    /// The search driver checks this once up front, since such a clause
    /// has no variable attached to it and so is never visited by
    /// [`Formula::propagate`]'s per-variable loop.
    pub fn has_vacuous_clause(&self) -> bool {
        self.clauses.iter().any(Clause::is_vacuous)
    }

    /// Whether every clause has at least one literal that currently
    /// evaluates true. Used to check P4 after the solver reports SAT.
    pub fn is_satisfied(&self) -> bool {
        self.clauses.iter().all(|clause| {
            clause
                .all_literals()
                .any(|lit| lit.gives_true(self.value(lit.var())))
        })
    }

    /// Applies `var := value`, retagging every clause the variable occurs
    /// in: satisfied clauses are deleted, falsified literals are shrunk
    /// out. Returns `true` iff no clause became empty.
    ///
    /// `var` and `value` must match an assignment already pushed at
    /// `depth` on the assignment stack; this method only mutates clause
    /// and variable state, it does not touch the stack itself.
    pub fn propagate(&mut self, var: VarId, value: VarValue, depth: Depth) -> bool {
        self.vars[var.index()].value = value;
        self.mark_assigned(var);

        let mut no_empty_clause = true;
        let related = self.related_clauses(var).to_vec();

        for clause_id in related {
            let clause = &mut self.clauses[clause_id.index()];

            // A clause already resolved (deleted, or every occurrence of
            // `var` in it already shrunk out) by an earlier assignment
            // has nothing left for this assignment to do. Skipping it
            // matters, not just for speed: `clause_is_empty` below can't
            // tell "already satisfied, untouched this round" apart from
            // "just became empty", so running it unconditionally would
            // re-flag an old, already-deleted clause as a fresh conflict.
            let has_active_occurrence = clause
                .literals
                .iter()
                .any(|cl| cl.lit.var() == var && cl.tag == Tag::InUse);
            if !has_active_occurrence {
                continue;
            }

            let satisfied = (0..clause.literals.len()).any(|i| {
                let cl = clause.literals[i];
                cl.lit.var() == var && cl.tag == Tag::InUse && cl.lit.gives_true(value)
            });

            if satisfied {
                delete_clause(clause, depth);
                continue;
            }

            for i in 0..clause.literals.len() {
                let cl = clause.literals[i];
                if cl.lit.var() != var || cl.tag != Tag::InUse {
                    continue;
                }
                debug_assert!(cl.lit.gives_false(value));
                clause.literals[i].tag = Tag::Removed(depth);
                clause.n_in_use -= 1;
            }

            if clause_is_empty(clause) {
                no_empty_clause = false;
            }
        }

        no_empty_clause
    }

    /// Undoes every retag performed at `depth`, and restores `var` to
    /// `old_value` if `var` is the entry that was pushed at `depth`.
    pub fn revert(&mut self, var: VarId, old_value: VarValue, depth: Depth) {
        let related = self.related_clauses(var).to_vec();

        for clause_id in related {
            let clause = &mut self.clauses[clause_id.index()];

            for i in 0..clause.literals.len() {
                if clause.literals[i].tag != Tag::Removed(depth) {
                    continue;
                }

                clause.literals[i].tag = Tag::InUse;
                clause.n_in_use += 1;

                if clause.literals[i].lit.var() == var {
                    self.vars[var.index()].value = old_value;
                }
            }
        }

        if matches!(old_value, VarValue::Unassigned) {
            self.mark_unassigned(var);
        }
    }

    fn mark_assigned(&mut self, var: VarId) {
        self.assigned.insert(var.index());
    }

    fn mark_unassigned(&mut self, var: VarId) {
        self.assigned.set(var.index(), false);
    }
}

/// Retags every active literal in `clause` with `depth` and zeroes its
/// active-literal count. The clause is now logically satisfied/deleted.
fn delete_clause(clause: &mut Clause, depth: Depth) {
    for cl in clause.literals.iter_mut() {
        if cl.tag == Tag::InUse {
            cl.tag = Tag::Removed(depth);
        }
    }
    clause.n_in_use = 0;
}

/// A clause is empty (a conflict) iff it has at least one literal at all,
/// none of which remain active, unassigned, or true.
fn clause_is_empty(clause: &Clause) -> bool {
    if clause.literals.is_empty() {
        return false;
    }
    clause.n_in_use == 0
        && !clause
            .literals
            .iter()
            .any(|cl| cl.tag == Tag::InUse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: VarId, negated: bool) -> Lit {
        Lit { var: v, negated }
    }

    fn v(name: u32) -> VarId {
        VarId::new(name)
    }

    #[test]
    fn construction_records_back_references() {
        let formula = Formula::from_clauses(2, vec![vec![1, 2], vec![-1]]).unwrap();
        assert_eq!(formula.num_variables(), 2);
        assert_eq!(formula.related_clauses(v(1)).len(), 2);
        assert_eq!(formula.related_clauses(v(2)).len(), 1);
    }

    #[test]
    fn out_of_range_literal_is_rejected() {
        let err = Formula::from_clauses(1, vec![vec![2]]).unwrap_err();
        assert!(matches!(err, SolverError::Format(_)));
    }

    #[test]
    fn find_unassigned_variable_breaks_ties_by_lowest_name() {
        let mut formula = Formula::from_clauses(3, vec![vec![1, 2, 3]]).unwrap();
        assert_eq!(formula.find_unassigned_variable(), Some(v(1)));

        formula.propagate(v(1), VarValue::True, Depth::new(1));
        assert_eq!(formula.find_unassigned_variable(), Some(v(2)));
    }

    #[test]
    fn propagate_deletes_satisfied_clause() {
        let mut formula = Formula::from_clauses(2, vec![vec![1, 2]]).unwrap();
        formula.propagate(v(1), VarValue::True, Depth::new(1));
        assert_eq!(formula.clauses()[0].n_in_use(), 0);
    }

    #[test]
    fn propagating_a_variable_in_an_already_deleted_clause_is_not_a_conflict() {
        // (1 ∨ 2) ∧ (-1 ∨ -2): deciding v1 deletes clause 0 by satisfying
        // it and shrinks clause 1. Propagating v2 afterwards still has to
        // visit clause 0 (v2 occurs there too), but clause 0 was already
        // resolved — revisiting it must not be reported as a fresh
        // conflict just because it currently has zero active literals.
        let mut formula = Formula::from_clauses(2, vec![vec![1, 2], vec![-1, -2]]).unwrap();
        let ok = formula.propagate(v(1), VarValue::True, Depth::new(1));
        assert!(ok);

        let ok = formula.propagate(v(2), VarValue::False, Depth::new(2));
        assert!(ok, "revisiting the already-deleted clause must not manufacture a conflict");
        assert_eq!(formula.clauses()[0].n_in_use(), 0);
    }

    #[test]
    fn propagate_shrinks_falsified_literal() {
        let mut formula = Formula::from_clauses(2, vec![vec![1, 2]]).unwrap();
        let ok = formula.propagate(v(1), VarValue::False, Depth::new(1));
        assert!(ok);
        assert_eq!(formula.clauses()[0].n_in_use(), 1);
    }

    #[test]
    fn propagate_reports_conflict_on_empty_clause() {
        let mut formula = Formula::from_clauses(1, vec![vec![1]]).unwrap();
        let ok = formula.propagate(v(1), VarValue::False, Depth::new(1));
        assert!(!ok);
    }

    #[test]
    fn revert_restores_shrunk_literal_and_value() {
        let mut formula = Formula::from_clauses(2, vec![vec![1, 2]]).unwrap();
        formula.propagate(v(1), VarValue::False, Depth::new(1));
        formula.revert(v(1), VarValue::Unassigned, Depth::new(1));

        assert_eq!(formula.clauses()[0].n_in_use(), 2);
        assert_eq!(formula.value(v(1)), VarValue::Unassigned);
        assert_eq!(formula.find_unassigned_variable(), Some(v(1)));
    }

    #[test]
    fn revert_restores_deleted_clause() {
        let mut formula = Formula::from_clauses(2, vec![vec![1, 2]]).unwrap();
        formula.propagate(v(1), VarValue::True, Depth::new(1));
        formula.revert(v(1), VarValue::Unassigned, Depth::new(1));

        assert_eq!(formula.clauses()[0].n_in_use(), 2);
    }

    #[test]
    fn p3_push_propagate_revert_round_trip_is_bitwise_identical() {
        use crate::assignment::{AssignmentKind, AssignmentStack};
        use crate::propagate::assign_and_propagate;

        // (1 ∨ 2) ∧ (-1 ∨ 3) ∧ (2 ∨ -3): pushing and propagating v1 := true
        // deletes clause 0 and shrinks clause 1; reverting that same push
        // must put every clause back exactly as it was, not just restore
        // the queryable summaries (`n_in_use`, `value`, `find_unassigned_variable`).
        let mut formula =
            Formula::from_clauses(3, vec![vec![1, 2], vec![-1, 3], vec![2, -3]]).unwrap();
        let mut stack = AssignmentStack::new(8);

        let before = formula.clauses().to_vec();

        assign_and_propagate(
            &mut formula,
            &mut stack,
            v(1),
            VarValue::True,
            AssignmentKind::Decision,
        )
        .unwrap()
        .unwrap();
        assert_ne!(formula.clauses(), before.as_slice());

        let entry = stack.pop();
        formula.revert(entry.var, entry.old_value, entry.depth);

        assert_eq!(formula.clauses(), before.as_slice());
        assert_eq!(formula.value(v(1)), VarValue::Unassigned);
        assert_eq!(formula.find_unassigned_variable(), Some(v(1)));
    }

    #[test]
    fn vacuous_clause_is_detected() {
        let formula = Formula::from_clauses(1, vec![vec![1], vec![]]).unwrap();
        assert!(formula.has_vacuous_clause());

        let formula = Formula::from_clauses(1, vec![vec![1]]).unwrap();
        assert!(!formula.has_vacuous_clause());
    }

    #[test]
    fn is_satisfied_checks_every_clause() {
        let mut formula = Formula::from_clauses(1, vec![vec![1], vec![-1, 1]]).unwrap();
        formula.propagate(v(1), VarValue::True, Depth::new(1));
        assert!(formula.is_satisfied());
    }

    #[test]
    fn lit_helpers() {
        let l = lit(v(1), false);
        assert_eq!(l.satisfying_value(), VarValue::True);
        assert!(l.gives_true(VarValue::True));
        assert!(l.gives_false(VarValue::False));
        assert_eq!(l.to_i32(), 1);

        let nl = lit(v(1), true);
        assert_eq!(nl.satisfying_value(), VarValue::False);
        assert_eq!(nl.to_i32(), -1);
    }
}
