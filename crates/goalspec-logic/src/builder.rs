//! Structured clause construction

use crate::clause::{Clause, CmpOp, Literal};
use crate::term::{Atom, Term};
use crate::GOAL_PREDICATE;

/// Builds clauses literal by literal.
///
/// Used instead of editing clause text when a constraint has to be added to
/// an existing specification, e.g. the atom-count bound for superset sampling.
#[derive(Debug, Clone)]
pub struct ClauseBuilder {
    head: Atom,
    body: Vec<Literal>,
}

impl ClauseBuilder {
    /// Start a clause with head `goal`
    pub fn goal() -> Self {
        Self::with_head(Atom::prop(GOAL_PREDICATE))
    }

    pub fn with_head(head: Atom) -> Self {
        Self {
            head,
            body: Vec::new(),
        }
    }

    /// Start from a copy of an existing clause
    pub fn from_clause(clause: &Clause) -> Self {
        Self {
            head: clause.head.clone(),
            body: clause.body.clone(),
        }
    }

    pub fn literal(mut self, literal: Literal) -> Self {
        self.body.push(literal);
        self
    }

    pub fn pos(self, atom: Atom) -> Self {
        self.literal(Literal::Pos(atom))
    }

    pub fn neg(self, atom: Atom) -> Self {
        self.literal(Literal::Neg(atom))
    }

    pub fn cmp(self, op: CmpOp, lhs: Term, rhs: Term) -> Self {
        self.literal(Literal::cmp(op, lhs, rhs))
    }

    /// Require more than `n` atoms in any model satisfying the clause
    pub fn with_atom_count_gt(self, n: usize) -> Self {
        self.literal(Literal::AtomCountGt(n))
    }

    pub fn build(self) -> Clause {
        Clause::new(self.head, self.body)
    }
}

/// Append the atom-count bound to every clause of a specification.
pub fn with_atom_count_gt(clauses: &[Clause], n: usize) -> Vec<Clause> {
    clauses
        .iter()
        .map(|clause| ClauseBuilder::from_clause(clause).with_atom_count_gt(n).build())
        .collect()
}
