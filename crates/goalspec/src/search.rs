//! The sample → search → verify → expand loop.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use goalspec_asp::{BannedModels, ModelSampler, ModelVerifier, SampleRequest, SpecEngine};
use goalspec_logic::{Clause, Model};
use goalspec_search::{
    get_path, search_for_goals, BatchedHeuristic, Heuristic, NodeRef, SearchParams,
};
use tracing::{debug, info, warn};

use crate::{
    check_aligned, load_background, GroundedDomain, NullTraceSink, Phase, Result, SpecGoalConfig,
    SpecGoalError, Times, TraceEvent, TraceSink,
};

/// Terminal outcome of one orchestrator invocation
#[derive(Debug, Clone)]
pub struct SpecGoalOutcome<S, A> {
    pub solved: bool,
    /// Start state first; empty when unsolved
    pub path_states: Vec<S>,
    pub path_actions: Vec<A>,
    pub path_cost: Option<f64>,
    /// Models from plain (non-superset) sampling, including resamples
    pub num_models_init: usize,
    pub num_models_superset: usize,
    pub nodes_generated: usize,
    /// Number of search rounds over candidate sets
    pub rounds: u64,
    pub num_banned: usize,
    pub times: Times,
}

enum Step<S, A> {
    Sampling,
    Searching(Vec<Model>),
    Verifying(Vec<(Model, NodeRef<S, A>)>),
    Expanding(Vec<Model>),
    Solved(NodeRef<S, A>),
    Exhausted,
}

/// One invocation of the specification goal search.
///
/// Owns the banned-model set and the timing accumulator; both start empty and
/// live exactly as long as this value. [`SpecGoalSearch::run`] consumes it.
pub struct SpecGoalSearch<'a, D: GroundedDomain, E = SpecEngine> {
    domain: &'a D,
    engine: E,
    config: SpecGoalConfig,
    banned: BannedModels,
    times: Times,
    round: u64,
    num_models_init: usize,
    num_models_superset: usize,
    nodes_generated: usize,
}

impl<'a, D: GroundedDomain> SpecGoalSearch<'a, D> {
    /// Build the reference engine from the domain vocabulary and background
    /// lines, recording the time spent as `Spec init`.
    pub fn new(domain: &'a D, background: &[String], config: SpecGoalConfig) -> Result<Self> {
        config.validate()?;

        let start = Instant::now();
        let engine = SpecEngine::new(domain.ground_atoms(), background)?;
        let mut search = Self::with_engine(domain, engine, config)?;
        search.times.record(Phase::SpecInit, start.elapsed());
        Ok(search)
    }
}

impl<'a, D, E> SpecGoalSearch<'a, D, E>
where
    D: GroundedDomain,
    E: ModelSampler + ModelVerifier,
{
    pub fn with_engine(domain: &'a D, engine: E, config: SpecGoalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            domain,
            engine,
            config,
            banned: BannedModels::new(),
            times: Times::new(),
            round: 0,
            num_models_init: 0,
            num_models_superset: 0,
            nodes_generated: 0,
        })
    }

    pub fn config(&self) -> &SpecGoalConfig {
        &self.config
    }

    /// Search from `start` for a state whose model satisfies `clauses`.
    pub fn run<H>(
        mut self,
        start: &D::State,
        clauses: &[Clause],
        heuristic: &H,
        sink: &mut dyn TraceSink,
    ) -> Result<SpecGoalOutcome<D::State, D::Action>>
    where
        H: Heuristic<D> + ?Sized,
    {
        let path = match self.config.heuristic_batch_size {
            Some(max_batch) => {
                let batched = BatchedHeuristic::new(heuristic, max_batch)?;
                self.drive(start, clauses, &batched, sink)?
            }
            None => self.drive(start, clauses, heuristic, sink)?,
        };

        let path_cost = path.as_ref().map(|p| p.cost);
        let (path_states, path_actions) = path
            .map(|p| (p.states, p.actions))
            .unwrap_or_default();

        Ok(SpecGoalOutcome {
            solved: path_cost.is_some(),
            path_states,
            path_actions,
            path_cost,
            num_models_init: self.num_models_init,
            num_models_superset: self.num_models_superset,
            nodes_generated: self.nodes_generated,
            rounds: self.round,
            num_banned: self.banned.len(),
            times: self.times,
        })
    }

    fn drive<H>(
        &mut self,
        start: &D::State,
        clauses: &[Clause],
        heuristic: &H,
        sink: &mut dyn TraceSink,
    ) -> Result<Option<goalspec_search::Path<D::State, D::Action>>>
    where
        H: Heuristic<D> + ?Sized,
    {
        let params = SearchParams {
            batch_size: self.config.search_batch_size,
            weight: self.config.weight,
            max_iters: self.config.max_search_iters,
        };

        let mut step = Step::Sampling;
        loop {
            step = match step {
                Step::Sampling => {
                    let timer = Instant::now();
                    let request = SampleRequest::new(self.config.model_batch_size, &self.banned);
                    let models = self.sample(clauses, &request)?;
                    self.times.record(Phase::ModelSample, timer.elapsed());

                    self.num_models_init += models.len();
                    sink.emit(
                        TraceEvent::new(self.round, "spec.sample")
                            .with_a(models.len() as u64)
                            .with_b(self.banned.len() as u64),
                    );
                    debug!(
                        round = self.round,
                        sampled = models.len(),
                        banned = self.banned.len(),
                        "Sampled minimal models"
                    );

                    if models.is_empty() {
                        Step::Exhausted
                    } else {
                        Step::Searching(models)
                    }
                }

                Step::Searching(candidates) => {
                    self.round += 1;
                    let goals = self.domain.models_to_goals(&candidates);
                    check_aligned("goals", candidates.len(), goals.len())?;

                    let timer = Instant::now();
                    let outcome = search_for_goals(self.domain, start, &goals, &params, heuristic)?;
                    self.times.record(Phase::Search, timer.elapsed());
                    self.nodes_generated += outcome.nodes_generated;
                    check_aligned("goal nodes", candidates.len(), outcome.goal_nodes.len())?;

                    let mut reached = Vec::new();
                    for (model, node) in candidates.into_iter().zip(outcome.goal_nodes) {
                        match node {
                            Some(node) => reached.push((model, node)),
                            None => {
                                warn!(
                                    round = self.round,
                                    model = %model,
                                    max_search_iters = params.max_iters,
                                    "Candidate not reached, banning"
                                );
                                self.banned.ban(model);
                                sink.emit(
                                    TraceEvent::new(self.round, "spec.ban")
                                        .with_a(self.banned.len() as u64),
                                );
                            }
                        }
                    }

                    sink.emit(
                        TraceEvent::new(self.round, "spec.search")
                            .with_a(reached.len() as u64)
                            .with_b(outcome.iterations as u64),
                    );
                    debug!(
                        round = self.round,
                        reached = reached.len(),
                        iterations = outcome.iterations,
                        nodes_generated = outcome.nodes_generated,
                        "Searched for candidate goals"
                    );

                    if reached.is_empty() {
                        sink.emit(
                            TraceEvent::new(self.round, "spec.resample")
                                .with_a(self.banned.len() as u64),
                        );
                        Step::Sampling
                    } else {
                        Step::Verifying(reached)
                    }
                }

                Step::Verifying(reached) => {
                    let timer = Instant::now();
                    let states: Vec<D::State> =
                        reached.iter().map(|(_, node)| node.state.clone()).collect();
                    let models = self.domain.states_to_models(&states);
                    check_aligned("state models", states.len(), models.len())?;

                    // Cheapest verified goal wins; ties keep candidate order.
                    let mut verified: Option<NodeRef<D::State, D::Action>> = None;
                    for ((_, node), model) in reached.iter().zip(&models) {
                        if verified
                            .as_ref()
                            .is_some_and(|best| best.path_cost <= node.path_cost)
                        {
                            continue;
                        }
                        if self.engine.verify_model(clauses, model)? {
                            verified = Some(node.clone());
                        }
                    }
                    self.times.record(Phase::Check, timer.elapsed());

                    match verified {
                        Some(node) => Step::Solved(node),
                        None => {
                            let candidates: Vec<Model> =
                                reached.into_iter().map(|(model, _)| model).collect();
                            for (candidate, terminal) in candidates.iter().zip(&models) {
                                debug!(
                                    round = self.round,
                                    candidate = %candidate,
                                    terminal = %terminal,
                                    "Reached state does not satisfy the specification"
                                );
                                self.banned.ban(candidate.clone());
                                sink.emit(
                                    TraceEvent::new(self.round, "spec.verify.fail")
                                        .with_a(candidate.len() as u64)
                                        .with_b(self.banned.len() as u64),
                                );
                            }
                            Step::Expanding(candidates)
                        }
                    }
                }

                Step::Expanding(parents) => {
                    let timer = Instant::now();
                    let children = self.supersets(clauses, &parents)?;
                    self.times.record(Phase::ModelSuperset, timer.elapsed());

                    self.num_models_superset += children.len();
                    sink.emit(
                        TraceEvent::new(self.round, "spec.superset")
                            .with_a(children.len() as u64)
                            .with_b(parents.len() as u64),
                    );
                    debug!(
                        round = self.round,
                        parents = parents.len(),
                        supersets = children.len(),
                        "Sampled superset models"
                    );

                    if children.is_empty() {
                        sink.emit(
                            TraceEvent::new(self.round, "spec.resample")
                                .with_a(self.banned.len() as u64),
                        );
                        Step::Sampling
                    } else {
                        Step::Searching(children)
                    }
                }

                Step::Solved(node) => {
                    let path = get_path(&node);
                    info!(
                        rounds = self.round,
                        cost = path.cost,
                        length = path.actions.len(),
                        banned = self.banned.len(),
                        "Found a state satisfying the specification"
                    );
                    sink.emit(
                        TraceEvent::new(self.round, "spec.solved")
                            .with_a(path.actions.len() as u64),
                    );
                    return Ok(Some(path));
                }

                Step::Exhausted => {
                    info!(
                        rounds = self.round,
                        banned = self.banned.len(),
                        "No remaining models satisfy the specification"
                    );
                    sink.emit(
                        TraceEvent::new(self.round, "spec.exhausted")
                            .with_a(self.banned.len() as u64),
                    );
                    return Ok(None);
                }
            };
        }
    }

    fn sample(&self, clauses: &[Clause], request: &SampleRequest<'_>) -> Result<Vec<Model>> {
        let domain = self.domain;
        let admissible = |model: &Model| domain.on_model(model);
        let models = self.engine.sample_models(clauses, &admissible, request)?;

        if let Some(model) = models.iter().find(|m| self.banned.contains(m)) {
            return Err(SpecGoalError::BannedModelResampled(model.to_string()));
        }
        Ok(models)
    }

    /// Strictly larger models extending each parent, `model_batch_size` in
    /// total, split evenly with earlier parents taking the remainder.
    fn supersets(&self, clauses: &[Clause], parents: &[Model]) -> Result<Vec<Model>> {
        let shares = split_evenly(self.config.model_batch_size, parents.len());

        let mut seen = HashSet::new();
        let mut children = Vec::new();
        for (parent, share) in parents.iter().zip(shares) {
            if share == 0 {
                continue;
            }
            let request = SampleRequest::new(share, &self.banned)
                .assuming(parent)
                .with_min_atoms_gt(parent.len());

            for child in self.sample(clauses, &request)? {
                if child.len() <= parent.len() || !parent.is_subset(&child) {
                    return Err(SpecGoalError::SupersetNotLarger {
                        parent: parent.to_string(),
                        child: child.to_string(),
                    });
                }
                if seen.insert(child.clone()) {
                    children.push(child);
                }
            }
        }
        Ok(children)
    }
}

/// Split `total` into `parts` shares differing by at most one, larger first.
pub fn split_evenly(total: usize, parts: usize) -> Vec<usize> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let extra = total % parts;
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}

/// Run one specification goal search with the reference engine.
///
/// Background knowledge is the domain's facts plus the lines of `bk_extra`.
pub fn find_spec_goal<D, H>(
    domain: &D,
    start: &D::State,
    clauses: &[Clause],
    heuristic: &H,
    config: &SpecGoalConfig,
    bk_extra: Option<&Path>,
) -> Result<SpecGoalOutcome<D::State, D::Action>>
where
    D: GroundedDomain,
    H: Heuristic<D> + ?Sized,
{
    let background = load_background(domain, bk_extra)?;
    SpecGoalSearch::new(domain, &background, config.clone())?.run(
        start,
        clauses,
        heuristic,
        &mut NullTraceSink,
    )
}
