//! Clause grounding against indexed ground atoms

use std::collections::{BTreeMap, BTreeSet, HashSet};

use goalspec_logic::{Atom, Bindings, Clause, Literal, Model};

use crate::{AspError, Result};

/// Ground atoms indexed by `(predicate, arity)`
#[derive(Debug, Clone, Default)]
pub struct FactIndex {
    by_signature: BTreeMap<(String, usize), Vec<Atom>>,
    all: BTreeSet<Atom>,
}

impl FactIndex {
    pub fn new<'a>(atoms: impl IntoIterator<Item = &'a Atom>) -> Self {
        let mut index = Self::default();
        for atom in atoms {
            index.insert(atom.clone());
        }
        index
    }

    pub fn insert(&mut self, atom: Atom) {
        if !self.all.insert(atom.clone()) {
            return;
        }
        let bucket = self
            .by_signature
            .entry((atom.predicate.clone(), atom.arity()))
            .or_default();
        let pos = bucket.binary_search(&atom).unwrap_or_else(|p| p);
        bucket.insert(pos, atom);
    }

    pub fn contains(&self, atom: &Atom) -> bool {
        self.all.contains(atom)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Candidates sharing the pattern's predicate and arity, in atom order
    pub fn matching(&self, pattern: &Atom) -> &[Atom] {
        self.by_signature
            .get(&(pattern.predicate.clone(), pattern.arity()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn atoms(&self) -> &BTreeSet<Atom> {
        &self.all
    }
}

/// One ground instance of a clause body, split by what it asks of a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grounding {
    /// Non-background atoms that must be in the model
    pub required: Model,

    /// Non-background atoms that must not be in the model
    pub forbidden: BTreeSet<Atom>,

    /// The model must hold more than this many atoms
    pub atoms_gt: Option<usize>,
}

impl Grounding {
    /// Whether a concrete model satisfies this grounding
    pub fn satisfied_by(&self, model: &Model) -> bool {
        self.required.is_subset(model)
            && model.is_disjoint(&self.forbidden)
            && self.atoms_gt.is_none_or(|n| model.len() > n)
    }

    /// Smallest model size allowed by the count bound
    pub fn min_size(&self) -> usize {
        self.atoms_gt.map(|n| n + 1).unwrap_or(0)
    }
}

/// Ground one clause.
///
/// Positive literals are matched in body order, first against `background`
/// (satisfied statically) and then against `model_atoms` (becoming model
/// requirements). Negated literals over background facts falsify the
/// grounding; other negated atoms become model prohibitions.
pub fn ground_clause(
    clause: &Clause,
    background: &FactIndex,
    model_atoms: &FactIndex,
    limit: usize,
) -> Result<Vec<Grounding>> {
    let positives: Vec<&Atom> = clause
        .body
        .iter()
        .filter_map(|lit| match lit {
            Literal::Pos(atom) => Some(atom),
            _ => None,
        })
        .collect();

    let mut grounder = Grounder {
        clause,
        background,
        model_atoms,
        limit,
        visited: 0,
        seen: HashSet::new(),
        out: Vec::new(),
    };
    grounder.extend(&positives, Bindings::new(), Model::new())?;
    Ok(grounder.out)
}

struct Grounder<'a> {
    clause: &'a Clause,
    background: &'a FactIndex,
    model_atoms: &'a FactIndex,
    limit: usize,
    visited: usize,
    seen: HashSet<Grounding>,
    out: Vec<Grounding>,
}

impl Grounder<'_> {
    fn extend(&mut self, remaining: &[&Atom], bindings: Bindings, required: Model) -> Result<()> {
        self.visited += 1;
        if self.visited > self.limit {
            return Err(AspError::GroundingLimit {
                clause: self.clause.to_string(),
                limit: self.limit,
            });
        }

        let Some((pattern, rest)) = remaining.split_first() else {
            self.finish(&bindings, required);
            return Ok(());
        };

        for fact in self.background.matching(pattern) {
            if let Some(next) = pattern.unify_ground(fact, &bindings) {
                self.extend(rest, next, required.clone())?;
            }
        }

        for atom in self.model_atoms.matching(pattern) {
            if self.background.contains(atom) {
                continue;
            }
            if let Some(next) = pattern.unify_ground(atom, &bindings) {
                let mut required = required.clone();
                required.insert(atom.clone());
                self.extend(rest, next, required)?;
            }
        }
        Ok(())
    }

    fn finish(&mut self, bindings: &Bindings, required: Model) {
        let mut forbidden = BTreeSet::new();
        let mut atoms_gt: Option<usize> = None;

        for lit in &self.clause.body {
            match lit {
                Literal::Pos(_) => {}
                Literal::Neg(atom) => {
                    let ground = atom.substitute(bindings);
                    if self.background.contains(&ground) {
                        return;
                    }
                    forbidden.insert(ground);
                }
                Literal::Cmp { .. } => {
                    if lit.eval_cmp(bindings) != Some(true) {
                        return;
                    }
                }
                Literal::AtomCountGt(n) => {
                    atoms_gt = Some(atoms_gt.map_or(*n, |m| m.max(*n)));
                }
            }
        }

        if !required.is_disjoint(&forbidden) {
            return;
        }

        let grounding = Grounding {
            required,
            forbidden,
            atoms_gt,
        };
        if self.seen.insert(grounding.clone()) {
            self.out.push(grounding);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalspec_logic::{parse_clause, parse_fact};

    fn index(facts: &[&str]) -> FactIndex {
        let atoms: Vec<Atom> = facts.iter().map(|f| parse_fact(f).unwrap()).collect();
        FactIndex::new(&atoms)
    }

    #[test]
    fn background_literals_filter_groundings() {
        let clause = parse_clause("goal :- at(X,Y), red(X,Y)").unwrap();
        let background = index(&["red(1,0)", "red(2,2)"]);
        let vocab = index(&["at(0,0)", "at(1,0)", "at(2,2)"]);

        let groundings = ground_clause(&clause, &background, &vocab, 1000).unwrap();
        let required: Vec<String> = groundings.iter().map(|g| g.required.to_string()).collect();
        assert_eq!(required, vec!["{at(1,0)}", "{at(2,2)}"]);
    }

    #[test]
    fn negated_background_fact_drops_grounding() {
        let clause = parse_clause("goal :- at(X,Y), not wall(X,Y)").unwrap();
        let background = index(&["wall(0,0)"]);
        let vocab = index(&["at(0,0)", "at(1,0)"]);

        let groundings = ground_clause(&clause, &background, &vocab, 1000).unwrap();
        assert_eq!(groundings.len(), 1);
        assert_eq!(groundings[0].required.to_string(), "{at(1,0)}");
        assert_eq!(groundings[0].forbidden.len(), 1);
    }

    #[test]
    fn self_contradicting_grounding_is_dropped() {
        let clause = parse_clause("goal :- at(X,Y), not at(X,Y)").unwrap();
        let vocab = index(&["at(0,0)"]);
        let groundings = ground_clause(&clause, &FactIndex::default(), &vocab, 1000).unwrap();
        assert!(groundings.is_empty());
    }

    #[test]
    fn grounding_limit_is_enforced() {
        let clause = parse_clause("goal :- at(X,Y), at(Z,W)").unwrap();
        let vocab = index(&["at(0,0)", "at(0,1)", "at(1,0)", "at(1,1)"]);
        let err = ground_clause(&clause, &FactIndex::default(), &vocab, 5).unwrap_err();
        assert!(matches!(err, AspError::GroundingLimit { limit: 5, .. }));
    }
}
