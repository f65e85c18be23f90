//! The assignment stack: an append-only log of tentative assignments,
//! tagged with the depth at which they were pushed.

use crate::error::{Result, SolverError};
use crate::formula::{Depth, VarId, VarValue};

/// Whether an assignment was chosen by the search driver (`Decision`) or
/// forced by unit propagation (`Unit`). The backtracker only stops
/// unwinding at a `Decision`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentKind {
    Decision,
    Unit,
}

/// One entry in the assignment stack.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentEntry {
    pub var: VarId,
    pub old_value: VarValue,
    pub new_value: VarValue,
    pub kind: AssignmentKind,
    pub depth: Depth,
}

/// A `Vec`-backed stack with a logical capacity. Each variable contributes
/// at most one entry over the lifetime of a solve (it must be popped
/// before being pushed again), so a capacity of `num_variables` is always
/// sufficient; overflow indicates a bug elsewhere in the driver rather
/// than a normal resource limit.
pub struct AssignmentStack {
    entries: Vec<AssignmentEntry>,
    capacity: usize,
}

impl AssignmentStack {
    pub fn new(capacity: usize) -> Self {
        AssignmentStack {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pushes a new entry with its depth field set to `depth()+1`,
    /// returning the depth it was assigned.
    pub fn push(
        &mut self,
        var: VarId,
        old_value: VarValue,
        new_value: VarValue,
        kind: AssignmentKind,
    ) -> Result<Depth> {
        if self.entries.len() >= self.capacity {
            return Err(SolverError::Resource(format!(
                "assignment stack exceeded capacity {}",
                self.capacity
            )));
        }

        let depth = Depth::new(self.entries.len() as u32 + 1);
        self.entries.push(AssignmentEntry {
            var,
            old_value,
            new_value,
            kind,
            depth,
        });
        Ok(depth)
    }

    /// Returns the top entry. Callers must not call this on an empty
    /// stack; the search driver's state machine never does.
    pub fn peek(&self) -> &AssignmentEntry {
        self.entries
            .last()
            .expect("peek called on an empty assignment stack")
    }

    pub fn pop(&mut self) -> AssignmentEntry {
        self.entries
            .pop()
            .expect("pop called on an empty assignment stack")
    }
}
