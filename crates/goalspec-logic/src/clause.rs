//! Literals and clauses

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::term::{Atom, Bindings, Term};
use crate::GOAL_PREDICATE;

/// Comparison operator between two terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    /// Evaluate on ground terms using the ground-term order.
    pub fn holds(self, lhs: &Term, rhs: &Term) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// A body literal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    /// The atom must hold
    Pos(Atom),

    /// The atom must not hold (`not p`)
    Neg(Atom),

    /// Comparison between two terms (`X != Y`)
    Cmp { op: CmpOp, lhs: Term, rhs: Term },

    /// The model must contain more than `n` ground atoms
    AtomCountGt(usize),
}

impl Literal {
    pub fn pos(atom: Atom) -> Self {
        Self::Pos(atom)
    }

    pub fn neg(atom: Atom) -> Self {
        Self::Neg(atom)
    }

    pub fn cmp(op: CmpOp, lhs: Term, rhs: Term) -> Self {
        Self::Cmp { op, lhs, rhs }
    }

    /// Variables mentioned by the literal, in order of first appearance
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Self::Pos(atom) | Self::Neg(atom) => atom.variables(),
            Self::Cmp { lhs, rhs, .. } => {
                let mut out = Vec::new();
                for term in [lhs, rhs] {
                    if let Term::Var(name) = term {
                        if !out.contains(&name.as_str()) {
                            out.push(name.as_str());
                        }
                    }
                }
                out
            }
            Self::AtomCountGt(_) => Vec::new(),
        }
    }

    /// Evaluate a comparison under bindings. `None` for other literal kinds
    /// or when an operand is still unbound.
    pub fn eval_cmp(&self, bindings: &Bindings) -> Option<bool> {
        let Self::Cmp { op, lhs, rhs } = self else {
            return None;
        };
        let lhs = lhs.resolve(bindings);
        let rhs = rhs.resolve(bindings);
        if !lhs.is_ground() || !rhs.is_ground() {
            return None;
        }
        Some(op.holds(&lhs, &rhs))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pos(atom) => write!(f, "{}", atom),
            Self::Neg(atom) => write!(f, "not {}", atom),
            Self::Cmp { op, lhs, rhs } => write!(f, "{} {} {}", lhs, op.symbol(), rhs),
            Self::AtomCountGt(n) => write!(f, "#atoms > {}", n),
        }
    }
}

/// A rule `head :- body`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    pub head: Atom,
    pub body: Vec<Literal>,
}

impl Clause {
    pub fn new(head: Atom, body: Vec<Literal>) -> Self {
        Self { head, body }
    }

    pub fn is_goal_clause(&self) -> bool {
        self.head.predicate == GOAL_PREDICATE && self.head.args.is_empty()
    }

    /// Variables that occur in negated literals or comparisons without being
    /// bound by some positive literal.
    pub fn unsafe_variables(&self) -> Vec<String> {
        let mut bound: Vec<&str> = Vec::new();
        for lit in &self.body {
            if let Literal::Pos(atom) = lit {
                bound.extend(atom.variables());
            }
        }

        let mut out: Vec<String> = Vec::new();
        for lit in &self.body {
            if matches!(lit, Literal::Pos(_)) {
                continue;
            }
            for var in lit.variables() {
                if !bound.contains(&var) && !out.iter().any(|v| v == var) {
                    out.push(var.to_string());
                }
            }
        }
        out
    }

    /// Largest atom-count bound in the body, if any
    pub fn atom_count_bound(&self) -> Option<usize> {
        self.body
            .iter()
            .filter_map(|lit| match lit {
                Literal::AtomCountGt(n) => Some(*n),
                _ => None,
            })
            .max()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            let body: Vec<String> = self.body.iter().map(|l| l.to_string()).collect();
            write!(f, " :- {}", body.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: Term, y: Term) -> Atom {
        Atom::new("at", vec![x, y])
    }

    #[test]
    fn unsafe_variables_are_reported() {
        let clause = Clause::new(
            Atom::prop("goal"),
            vec![
                Literal::pos(at(Term::var("X"), Term::var("Y"))),
                Literal::neg(Atom::new("wall", vec![Term::var("Z")])),
                Literal::cmp(CmpOp::Ne, Term::var("X"), Term::var("W")),
            ],
        );
        assert_eq!(clause.unsafe_variables(), vec!["Z".to_string(), "W".to_string()]);
    }

    #[test]
    fn comparison_needs_bound_operands() {
        let lit = Literal::cmp(CmpOp::Lt, Term::var("X"), Term::int(3));
        assert_eq!(lit.eval_cmp(&Bindings::new()), None);

        let mut bindings = Bindings::new();
        bindings.insert("X".into(), Term::int(2));
        assert_eq!(lit.eval_cmp(&bindings), Some(true));
    }

    #[test]
    fn display_round_trips_through_readable_form() {
        let clause = Clause::new(
            Atom::prop("goal"),
            vec![
                Literal::pos(at(Term::var("X"), Term::int(1))),
                Literal::neg(Atom::new("holding", vec![Term::sym("key")])),
                Literal::AtomCountGt(2),
            ],
        );
        assert_eq!(
            clause.to_string(),
            "goal :- at(X,1), not holding(key), #atoms > 2"
        );
        assert_eq!(clause.atom_count_bound(), Some(2));
    }
}
