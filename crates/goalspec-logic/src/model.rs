//! Models: ordered sets of ground atoms

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::term::Atom;

/// A set of ground atoms.
///
/// Backed by an ordered set so that iteration, comparison and hashing are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Model(BTreeSet<Atom>);

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, atom: &Atom) -> bool {
        self.0.contains(atom)
    }

    /// Insert an atom, returning `true` if it was not present
    pub fn insert(&mut self, atom: Atom) -> bool {
        self.0.insert(atom)
    }

    pub fn remove(&mut self, atom: &Atom) -> bool {
        self.0.remove(atom)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.0.iter()
    }

    pub fn atoms(&self) -> &BTreeSet<Atom> {
        &self.0
    }

    pub fn is_subset(&self, other: &Model) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_disjoint(&self, atoms: &BTreeSet<Atom>) -> bool {
        self.0.is_disjoint(atoms)
    }

    pub fn union(&self, other: &Model) -> Model {
        Model(self.0.union(&other.0).cloned().collect())
    }

    /// Copy with the given atoms removed
    pub fn without(&self, atoms: &BTreeSet<Atom>) -> Model {
        Model(self.0.difference(atoms).cloned().collect())
    }

    /// Atoms with the given predicate
    pub fn with_predicate<'a>(&'a self, predicate: &'a str) -> impl Iterator<Item = &'a Atom> {
        self.0.iter().filter(move |a| a.predicate == predicate)
    }
}

impl FromIterator<Atom> for Model {
    fn from_iter<T: IntoIterator<Item = Atom>>(iter: T) -> Self {
        Model(iter.into_iter().collect())
    }
}

impl Extend<Atom> for Model {
    fn extend<T: IntoIterator<Item = Atom>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Model {
    type Item = Atom;
    type IntoIter = std::collections::btree_set::IntoIter<Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = &'a Atom;
    type IntoIter = std::collections::btree_set::Iter<'a, Atom>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|a| a.to_string()).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;

    #[test]
    fn model_display_is_sorted() {
        let model: Model = [
            Atom::new("at", vec![Term::int(2), Term::int(1)]),
            Atom::new("at", vec![Term::int(1), Term::int(2)]),
            Atom::new("free", vec![Term::sym("key")]),
        ]
        .into_iter()
        .collect();

        assert_eq!(model.to_string(), "{at(1,2), at(2,1), free(key)}");
        assert_eq!(model.with_predicate("at").count(), 2);
    }
}
