//! # goalspec-asp
//!
//! Specification engine for goal specifications: enumerates minimal models of
//! a clause list over a finite ground-atom vocabulary and checks concrete
//! models against the full clause semantics.
//!
//! ## Architecture
//!
//! ```text
//! clauses ──► grounding (vocabulary + background) ──► minimal models (minus banned)
//! model   ──► grounding (model + background)      ──► satisfied?
//! ```
//!
//! ## Example
//!
//! ```rust
//! use goalspec_asp::{AcceptAll, BannedModels, ModelSampler, SampleRequest, SpecEngine};
//! use goalspec_logic::{parse_clauses, parse_fact};
//!
//! let vocabulary = vec![parse_fact("at(0,0)").unwrap(), parse_fact("at(1,0)").unwrap()];
//! let engine = SpecEngine::new(vocabulary, &["red(1,0).".to_string()]).unwrap();
//! let spec = parse_clauses("goal :- at(X,Y), red(X,Y)").unwrap();
//!
//! let banned = BannedModels::new();
//! let models = engine
//!     .sample_models(&spec, &AcceptAll, &SampleRequest::new(5, &banned))
//!     .unwrap();
//! assert_eq!(models.len(), 1);
//! ```

pub mod banned;
pub mod engine;
pub mod ground;

pub use banned::BannedModels;
pub use engine::SpecEngine;
pub use ground::{FactIndex, Grounding};

use goalspec_logic::{Clause, LogicError, Model};
use thiserror::Error;

/// Errors raised by the specification engine
#[derive(Debug, Error)]
pub enum AspError {
    #[error("Logic error: {0}")]
    Logic(#[from] LogicError),

    #[error("Unsafe variable '{variable}' in clause '{clause}'")]
    UnsafeVariable { clause: String, variable: String },

    #[error("Vocabulary atom '{0}' is not ground")]
    NonGroundVocabulary(String),

    #[error("Grounding of '{clause}' exceeded {limit} bindings")]
    GroundingLimit { clause: String, limit: usize },
}

pub type Result<T> = std::result::Result<T, AspError>;

/// Configuration for the specification engine
#[derive(Debug, Clone)]
pub struct AspConfig {
    /// Maximum number of candidate bindings explored per clause
    pub max_groundings_per_clause: usize,
}

impl Default for AspConfig {
    fn default() -> Self {
        Self {
            max_groundings_per_clause: 1_000_000,
        }
    }
}

/// Domain admissibility check applied to every sampled model.
///
/// Implementations must be downward closed: if a model is admissible, so is
/// every subset of it. Minimality is decided under that assumption.
pub trait DomainFilter {
    fn on_model(&self, model: &Model) -> bool;
}

impl<F> DomainFilter for F
where
    F: Fn(&Model) -> bool,
{
    fn on_model(&self, model: &Model) -> bool {
        self(model)
    }
}

/// Admits every model
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl DomainFilter for AcceptAll {
    fn on_model(&self, _model: &Model) -> bool {
        true
    }
}

/// Parameters of one sampling call
#[derive(Debug, Clone, Copy)]
pub struct SampleRequest<'a> {
    /// Maximum number of models to return
    pub count: usize,

    /// Atoms every returned model must contain
    pub assumed_true: Option<&'a Model>,

    /// Models that must never be returned
    pub banned: &'a BannedModels,

    /// Returned models must hold more than this many atoms
    pub min_atoms_gt: Option<usize>,
}

impl<'a> SampleRequest<'a> {
    pub fn new(count: usize, banned: &'a BannedModels) -> Self {
        Self {
            count,
            assumed_true: None,
            banned,
            min_atoms_gt: None,
        }
    }

    pub fn assuming(mut self, model: &'a Model) -> Self {
        self.assumed_true = Some(model);
        self
    }

    pub fn with_min_atoms_gt(mut self, n: usize) -> Self {
        self.min_atoms_gt = Some(n);
        self
    }
}

/// Enumerates minimal models of a specification.
///
/// May return fewer than `request.count` models; that is the only signal of
/// an exhausted model space.
pub trait ModelSampler {
    fn sample_models(
        &self,
        clauses: &[Clause],
        domain: &dyn DomainFilter,
        request: &SampleRequest<'_>,
    ) -> Result<Vec<Model>>;
}

/// Full (non-minimal) satisfaction check of one concrete model
pub trait ModelVerifier {
    fn verify_model(&self, clauses: &[Clause], model: &Model) -> Result<bool>;
}
