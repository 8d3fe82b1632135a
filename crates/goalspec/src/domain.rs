use goalspec_logic::{Atom, Model};
use goalspec_search::SearchDomain;

/// A search domain that can be described in logic.
///
/// Bridges the physical state space and the model space: goals are built
/// from models, and terminal states are read back as models for
/// verification.
pub trait GroundedDomain: SearchDomain {
    /// Every atom a model may contain
    fn ground_atoms(&self) -> Vec<Atom>;

    /// Static facts, one per line, in clause syntax
    fn background_facts(&self) -> Vec<String>;

    /// Whether a model can describe some state. Must be downward closed.
    fn on_model(&self, model: &Model) -> bool;

    fn models_to_goals(&self, models: &[Model]) -> Vec<Self::Goal>;

    fn states_to_models(&self, states: &[Self::State]) -> Vec<Model>;
}
