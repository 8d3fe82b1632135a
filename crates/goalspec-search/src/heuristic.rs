use tracing::trace;

use crate::{check_aligned, Result, SearchDomain, SearchError};

/// Estimated cost-to-go, evaluated in batches.
///
/// Must be pure: the same `(state, goal)` pair always yields the same value,
/// regardless of what else is in the batch.
pub trait Heuristic<D: SearchDomain> {
    fn evaluate(&self, states: &[D::State], goals: &[D::Goal]) -> Result<Vec<f64>>;
}

impl<D: SearchDomain, H: Heuristic<D> + ?Sized> Heuristic<D> for &H {
    fn evaluate(&self, states: &[D::State], goals: &[D::Goal]) -> Result<Vec<f64>> {
        (**self).evaluate(states, goals)
    }
}

/// Uninformed search: every estimate is zero
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroHeuristic;

impl<D: SearchDomain> Heuristic<D> for ZeroHeuristic {
    fn evaluate(&self, states: &[D::State], _goals: &[D::Goal]) -> Result<Vec<f64>> {
        Ok(vec![0.0; states.len()])
    }
}

/// Splits large requests into chunks of at most `max_batch` pairs.
///
/// The chunk size is independent of the search batch size, so an expensive
/// evaluator can be bounded without changing the search.
#[derive(Debug, Clone)]
pub struct BatchedHeuristic<H> {
    inner: H,
    max_batch: usize,
}

impl<H> BatchedHeuristic<H> {
    pub fn new(inner: H, max_batch: usize) -> Result<Self> {
        if max_batch == 0 {
            return Err(SearchError::InvalidBatchSize);
        }
        Ok(Self { inner, max_batch })
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<D, H> Heuristic<D> for BatchedHeuristic<H>
where
    D: SearchDomain,
    H: Heuristic<D>,
{
    fn evaluate(&self, states: &[D::State], goals: &[D::Goal]) -> Result<Vec<f64>> {
        check_aligned("heuristic goals", states.len(), goals.len())?;

        let mut out = Vec::with_capacity(states.len());
        for (s, g) in states.chunks(self.max_batch).zip(goals.chunks(self.max_batch)) {
            let values = self.inner.evaluate(s, g)?;
            check_aligned("heuristic output", s.len(), values.len())?;
            out.extend(values);
        }
        trace!(
            pairs = states.len(),
            max_batch = self.max_batch,
            "Batched heuristic"
        );
        Ok(out)
    }
}
