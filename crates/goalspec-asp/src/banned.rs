use std::collections::HashSet;

use goalspec_logic::Model;

/// Append-only set of models excluded from sampling.
///
/// Keeps insertion order for deterministic iteration.
#[derive(Debug, Clone, Default)]
pub struct BannedModels {
    order: Vec<Model>,
    index: HashSet<Model>,
}

impl BannedModels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ban a model. Returns `false` if it was already banned.
    pub fn ban(&mut self, model: Model) -> bool {
        if self.index.contains(&model) {
            return false;
        }
        self.index.insert(model.clone());
        self.order.push(model);
        true
    }

    pub fn contains(&self, model: &Model) -> bool {
        self.index.contains(model)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Banned models in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.order.iter()
    }
}

impl Extend<Model> for BannedModels {
    fn extend<T: IntoIterator<Item = Model>>(&mut self, iter: T) {
        for model in iter {
            self.ban(model);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalspec_logic::parse_fact;

    #[test]
    fn banning_is_idempotent_and_ordered() {
        let a: Model = [parse_fact("at(1,1)").unwrap()].into_iter().collect();
        let b: Model = [parse_fact("at(2,2)").unwrap()].into_iter().collect();

        let mut banned = BannedModels::new();
        assert!(banned.ban(b.clone()));
        assert!(banned.ban(a.clone()));
        assert!(!banned.ban(b.clone()));

        assert_eq!(banned.len(), 2);
        assert_eq!(banned.iter().cloned().collect::<Vec<_>>(), vec![b, a]);
    }
}
