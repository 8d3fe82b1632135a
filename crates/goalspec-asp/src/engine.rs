//! Reference specification engine
//!
//! Models are drawn from a finite vocabulary of ground atoms. A model is
//! minimal when no proper subset that still contains the assumed atoms
//! satisfies the clauses and is admissible and not banned. With a downward
//! closed domain filter, every satisfying proper subset of a candidate lies in
//! the interval `[required ∪ assumed, candidate \ forbidden]` of some
//! grounding, which turns minimality into counting.

use std::collections::{BTreeSet, HashSet};

use goalspec_logic::{parse_fact, validate_spec, with_atom_count_gt, Atom, Clause, Model};
use itertools::Itertools;
use tracing::debug;

use crate::ground::{ground_clause, FactIndex, Grounding};
use crate::{
    AspConfig, AspError, BannedModels, DomainFilter, ModelSampler, ModelVerifier, Result,
    SampleRequest,
};

/// Grounding-based specification engine over a fixed vocabulary.
///
/// Built once per orchestrator invocation; background knowledge is parsed at
/// construction and reused by every sampling and verification call.
#[derive(Debug, Clone)]
pub struct SpecEngine {
    vocabulary: Vec<Atom>,
    vocab_index: FactIndex,
    background: FactIndex,
    config: AspConfig,
}

impl SpecEngine {
    /// Create an engine from ground atoms and background-knowledge lines.
    ///
    /// Each background line is empty, a `%` comment, or one ground fact.
    pub fn new(ground_atoms: Vec<Atom>, background: &[String]) -> Result<Self> {
        let mut facts = Vec::new();
        for line in background {
            let line = line.trim();
            if line.is_empty() || line.starts_with('%') {
                continue;
            }
            facts.push(parse_fact(line)?);
        }
        Self::from_facts(ground_atoms, facts)
    }

    /// Create an engine from already parsed background facts
    pub fn from_facts(ground_atoms: Vec<Atom>, facts: Vec<Atom>) -> Result<Self> {
        if let Some(atom) = ground_atoms.iter().find(|a| !a.is_ground()) {
            return Err(AspError::NonGroundVocabulary(atom.to_string()));
        }

        let vocabulary: Vec<Atom> = ground_atoms
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let vocab_index = FactIndex::new(&vocabulary);
        let background = FactIndex::new(&facts);

        debug!(
            vocabulary = vocabulary.len(),
            background = background.len(),
            "Specification engine initialized"
        );

        Ok(Self {
            vocabulary,
            vocab_index,
            background,
            config: AspConfig::default(),
        })
    }

    pub fn with_config(mut self, config: AspConfig) -> Self {
        self.config = config;
        self
    }

    pub fn vocabulary(&self) -> &[Atom] {
        &self.vocabulary
    }

    pub fn background(&self) -> &BTreeSet<Atom> {
        self.background.atoms()
    }

    fn validate(&self, clauses: &[Clause]) -> Result<()> {
        validate_spec(clauses)?;
        for clause in clauses {
            if let Some(variable) = clause.unsafe_variables().into_iter().next() {
                return Err(AspError::UnsafeVariable {
                    clause: clause.to_string(),
                    variable,
                });
            }
        }
        Ok(())
    }

    fn ground_all(&self, clauses: &[Clause], model_atoms: &FactIndex) -> Result<Vec<Grounding>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for clause in clauses {
            for grounding in ground_clause(
                clause,
                &self.background,
                model_atoms,
                self.config.max_groundings_per_clause,
            )? {
                if seen.insert(grounding.clone()) {
                    out.push(grounding);
                }
            }
        }
        Ok(out)
    }

    /// No satisfying, non-banned proper subset of `model` contains `assumed`.
    fn is_minimal(
        &self,
        model: &Model,
        assumed: &Model,
        groundings: &[Grounding],
        banned: &BannedModels,
    ) -> bool {
        for grounding in groundings {
            let lower = grounding.required.union(assumed);
            if !lower.is_subset(model) || !lower.is_disjoint(&grounding.forbidden) {
                continue;
            }

            let upper = model.without(&grounding.forbidden);
            let min_size = grounding.min_size();
            let free = upper.len() - lower.len();

            // The model itself sits in the interval when nothing was removed.
            let includes_self = upper.len() == model.len() && model.len() >= min_size;
            let banned_inside = banned
                .iter()
                .filter(|b| {
                    *b != model
                        && b.len() >= min_size
                        && lower.is_subset(b)
                        && b.is_subset(&upper)
                })
                .count() as u128;
            let blocked = banned_inside + u128::from(includes_self);

            // Count subsets S with lower ⊆ S ⊆ upper and |S| >= min_size.
            let mut total: u128 = 0;
            let mut choose: u128 = 1;
            for extra in 0..=free {
                if lower.len() + extra >= min_size {
                    total = total.saturating_add(choose);
                    if total > blocked {
                        return false;
                    }
                }
                choose = choose
                    .checked_mul((free - extra) as u128)
                    .map(|v| v / (extra as u128 + 1))
                    .unwrap_or(u128::MAX);
            }
        }
        true
    }
}

impl ModelSampler for SpecEngine {
    fn sample_models(
        &self,
        clauses: &[Clause],
        domain: &dyn DomainFilter,
        request: &SampleRequest<'_>,
    ) -> Result<Vec<Model>> {
        let clauses = match request.min_atoms_gt {
            Some(n) => with_atom_count_gt(clauses, n),
            None => clauses.to_vec(),
        };
        self.validate(&clauses)?;

        let mut out: Vec<Model> = Vec::new();
        if request.count == 0 {
            return Ok(out);
        }

        let assumed = request.assumed_true.cloned().unwrap_or_default();
        let banned = request.banned;
        let groundings = self.ground_all(&clauses, &self.vocab_index)?;
        let mut seen: HashSet<Model> = HashSet::new();

        let mut consider = |model: Model, out: &mut Vec<Model>| {
            if !seen.insert(model.clone()) {
                return;
            }
            if banned.contains(&model) || !domain.on_model(&model) {
                return;
            }
            if self.is_minimal(&model, &assumed, &groundings, banned) {
                out.push(model);
            }
        };

        for grounding in &groundings {
            let lower = grounding.required.union(&assumed);
            if !lower.is_disjoint(&grounding.forbidden) || !domain.on_model(&lower) {
                continue;
            }

            let free: Vec<&Atom> = self
                .vocabulary
                .iter()
                .filter(|a| !lower.contains(a) && !grounding.forbidden.contains(*a))
                .collect();
            let needed = grounding.min_size().saturating_sub(lower.len());
            if needed > free.len() {
                continue;
            }

            for extra in free.iter().combinations(needed) {
                let mut model = lower.clone();
                model.extend(extra.into_iter().map(|a| (*a).clone()));
                consider(model, &mut out);
                if out.len() >= request.count {
                    return Ok(out);
                }
            }

            // A larger model can only be minimal if every one-smaller subset in
            // this grounding is banned, so grow from banned models only.
            let mut size = lower.len() + needed;
            loop {
                let frontier: BTreeSet<Model> = banned
                    .iter()
                    .filter(|b| {
                        b.len() == size && lower.is_subset(b) && b.is_disjoint(&grounding.forbidden)
                    })
                    .flat_map(|b| {
                        free.iter().filter(|a| !b.contains(a)).map(move |a| {
                            let mut grown = b.clone();
                            grown.insert((*a).clone());
                            grown
                        })
                    })
                    .collect();
                if frontier.is_empty() {
                    break;
                }
                for model in frontier {
                    consider(model, &mut out);
                    if out.len() >= request.count {
                        return Ok(out);
                    }
                }
                size += 1;
            }
        }

        debug!(
            requested = request.count,
            sampled = out.len(),
            banned = banned.len(),
            "Sampled models"
        );
        Ok(out)
    }
}

impl ModelVerifier for SpecEngine {
    fn verify_model(&self, clauses: &[Clause], model: &Model) -> Result<bool> {
        self.validate(clauses)?;
        let model_index = FactIndex::new(model.iter());
        let groundings = self.ground_all(clauses, &model_index)?;
        Ok(groundings.iter().any(|g| g.satisfied_by(model)))
    }
}
