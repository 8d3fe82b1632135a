//! Terms and atoms
//!
//! Ground terms order integers before symbols, integers numerically and
//! symbols lexicographically. Variables sort last and never appear in models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Variable bindings produced while grounding a clause
pub type Bindings = BTreeMap<String, Term>;

/// A term: integer, symbolic constant, or variable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Integer constant
    Int(i64),

    /// Symbolic constant (`key`, `red`)
    Sym(String),

    /// Variable (`X`, `_Cell`)
    Var(String),
}

impl Term {
    pub fn int(value: i64) -> Self {
        Self::Int(value)
    }

    pub fn sym(name: impl Into<String>) -> Self {
        Self::Sym(name.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    pub fn is_ground(&self) -> bool {
        !matches!(self, Self::Var(_))
    }

    /// Replace a bound variable by its value; other terms are returned as-is.
    pub fn resolve(&self, bindings: &Bindings) -> Term {
        match self {
            Self::Var(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            other => other.clone(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Sym(s) | Self::Var(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A predicate applied to terms, e.g. `at(1,2)`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Atom {
    pub predicate: String,
    pub args: Vec<Term>,
}

impl Atom {
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// Zero-arity atom such as `goal`
    pub fn prop(predicate: impl Into<String>) -> Self {
        Self::new(predicate, Vec::new())
    }

    pub fn arity(&self) -> usize {
        self.args.len()
    }

    pub fn is_ground(&self) -> bool {
        self.args.iter().all(Term::is_ground)
    }

    /// Variable names in argument order, without duplicates
    pub fn variables(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for arg in &self.args {
            if let Term::Var(name) = arg {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        out
    }

    pub fn substitute(&self, bindings: &Bindings) -> Atom {
        Atom {
            predicate: self.predicate.clone(),
            args: self.args.iter().map(|t| t.resolve(bindings)).collect(),
        }
    }

    /// Match this (possibly non-ground) pattern against a ground atom.
    ///
    /// Returns the extended bindings on success. Bound variables must agree
    /// with the ground argument.
    pub fn unify_ground(&self, ground: &Atom, bindings: &Bindings) -> Option<Bindings> {
        if self.predicate != ground.predicate || self.args.len() != ground.args.len() {
            return None;
        }

        let mut out = bindings.clone();
        for (pattern, value) in self.args.iter().zip(&ground.args) {
            match pattern {
                Term::Var(name) => match out.get(name) {
                    Some(bound) if bound != value => return None,
                    Some(_) => {}
                    None => {
                        out.insert(name.clone(), value.clone());
                    }
                },
                constant => {
                    if constant != value {
                        return None;
                    }
                }
            }
        }
        Some(out)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.predicate)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            write!(f, "({})", args.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_terms_order_ints_before_symbols() {
        assert!(Term::int(10) < Term::sym("a"));
        assert!(Term::int(-3) < Term::int(2));
        assert!(Term::sym("a") < Term::sym("b"));
    }

    #[test]
    fn unify_binds_and_checks_variables() {
        let pattern = Atom::new("at", vec![Term::var("X"), Term::var("X")]);
        let diag = Atom::new("at", vec![Term::int(1), Term::int(1)]);
        let off = Atom::new("at", vec![Term::int(1), Term::int(2)]);

        let bindings = pattern.unify_ground(&diag, &Bindings::new()).unwrap();
        assert_eq!(bindings.get("X"), Some(&Term::int(1)));
        assert!(pattern.unify_ground(&off, &Bindings::new()).is_none());
    }

    #[test]
    fn unify_rejects_arity_and_name_mismatch() {
        let pattern = Atom::new("at", vec![Term::var("X")]);
        let other = Atom::new("at", vec![Term::int(1), Term::int(2)]);
        assert!(pattern.unify_ground(&other, &Bindings::new()).is_none());

        let renamed = Atom::new("on", vec![Term::int(1)]);
        assert!(pattern.unify_ground(&renamed, &Bindings::new()).is_none());
    }

    #[test]
    fn display_matches_source_syntax() {
        let atom = Atom::new("at", vec![Term::int(2), Term::sym("b")]);
        assert_eq!(atom.to_string(), "at(2,b)");
        assert_eq!(Atom::prop("goal").to_string(), "goal");
    }
}
