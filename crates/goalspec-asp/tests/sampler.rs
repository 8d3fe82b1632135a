use std::collections::BTreeSet;

use goalspec_asp::{
    AcceptAll, BannedModels, DomainFilter, ModelSampler, ModelVerifier, SampleRequest, SpecEngine,
};
use goalspec_logic::{parse_clauses, with_atom_count_gt, Atom, Clause, Model};
use proptest::prelude::*;

const VOCAB_SIZE: usize = 6;

const SPECS: &[&str] = &[
    "goal :- p0",
    "goal :- p0, not p1; goal :- p2, p3",
    "goal :- p1, not p4; goal :- p1, p2",
    "goal :- p0; goal :- p1, p2, not p3",
    "goal :- p5, q(1); goal :- p2, not q(1)",
    "goal :- p3, not p0, not p2",
];

fn vocabulary() -> Vec<Atom> {
    (0..VOCAB_SIZE).map(|i| Atom::prop(format!("p{i}"))).collect()
}

fn engine() -> SpecEngine {
    SpecEngine::new(vocabulary(), &["q(1).".to_string(), "% comment".to_string()]).unwrap()
}

fn from_mask(mask: u8) -> Model {
    vocabulary()
        .into_iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, atom)| atom)
        .collect()
}

fn all_models() -> Vec<Model> {
    (0..(1u8 << VOCAB_SIZE)).map(from_mask).collect()
}

/// p0 and p1 never together
fn exclusive(model: &Model) -> bool {
    !(model.contains(&Atom::prop("p0")) && model.contains(&Atom::prop("p1")))
}

/// Exhaustive minimal models over the power set of the vocabulary
fn brute_force(
    engine: &SpecEngine,
    clauses: &[Clause],
    domain: &dyn DomainFilter,
    banned: &BannedModels,
    assumed: &Model,
) -> BTreeSet<Model> {
    let eligible = |m: &Model| {
        assumed.is_subset(m)
            && domain.on_model(m)
            && !banned.contains(m)
            && engine.verify_model(clauses, m).unwrap()
    };
    let models = all_models();
    models
        .iter()
        .filter(|m| eligible(*m))
        .filter(|m| {
            !models
                .iter()
                .any(|s| s != *m && s.is_subset(m) && eligible(s))
        })
        .cloned()
        .collect()
}

#[test]
fn sample_returns_every_minimal_model_without_bans() {
    let engine = engine();
    let banned = BannedModels::new();
    for spec in SPECS {
        let clauses = parse_clauses(spec).unwrap();
        let sampled: BTreeSet<Model> = engine
            .sample_models(&clauses, &AcceptAll, &SampleRequest::new(1000, &banned))
            .unwrap()
            .into_iter()
            .collect();
        let expected = brute_force(&engine, &clauses, &AcceptAll, &banned, &Model::new());
        assert_eq!(sampled, expected, "spec: {spec}");
    }
}

#[test]
fn sample_respects_requested_count() {
    let engine = engine();
    let banned = BannedModels::new();
    let clauses = parse_clauses("goal :- p0; goal :- p1; goal :- p2").unwrap();

    let models = engine
        .sample_models(&clauses, &AcceptAll, &SampleRequest::new(2, &banned))
        .unwrap();
    assert_eq!(models.len(), 2);

    let none = engine
        .sample_models(&clauses, &AcceptAll, &SampleRequest::new(0, &banned))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn exhausted_model_space_returns_empty() {
    let engine = engine();
    let clauses = parse_clauses("goal :- p0, not p1, not p2, not p3, not p4, not p5").unwrap();
    let mut banned = BannedModels::new();
    banned.ban(from_mask(0b000001));

    let models = engine
        .sample_models(&clauses, &AcceptAll, &SampleRequest::new(10, &banned))
        .unwrap();
    assert!(models.is_empty());
}

#[test]
fn sampling_is_deterministic() {
    let engine = engine();
    let clauses = parse_clauses(SPECS[3]).unwrap();
    let mut banned = BannedModels::new();
    banned.ban(from_mask(0b000001));

    let request = SampleRequest::new(4, &banned);
    let first = engine.sample_models(&clauses, &exclusive, &request).unwrap();
    let second = engine.sample_models(&clauses, &exclusive, &request).unwrap();
    assert_eq!(first, second);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn sampled_models_match_exhaustive_minimal_models(
        spec in 0..SPECS.len(),
        masks in prop::collection::vec(0u8..(1 << VOCAB_SIZE), 0..12),
        filtered in any::<bool>(),
    ) {
        let engine = engine();
        let clauses = parse_clauses(SPECS[spec]).unwrap();
        let mut banned = BannedModels::new();
        banned.extend(masks.into_iter().map(from_mask));
        let domain: &dyn DomainFilter = if filtered { &exclusive } else { &AcceptAll };

        let sampled = engine
            .sample_models(&clauses, domain, &SampleRequest::new(1000, &banned))
            .unwrap();

        for model in &sampled {
            prop_assert!(!banned.contains(model));
            prop_assert!(domain.on_model(model));
            prop_assert!(engine.verify_model(&clauses, model).unwrap());
        }

        let unique: BTreeSet<Model> = sampled.iter().cloned().collect();
        prop_assert_eq!(unique.len(), sampled.len());
        prop_assert_eq!(unique, brute_force(&engine, &clauses, domain, &banned, &Model::new()));
    }

    #[test]
    fn superset_samples_strictly_extend_the_parent(
        spec in 0..SPECS.len(),
        masks in prop::collection::vec(0u8..(1 << VOCAB_SIZE), 0..8),
    ) {
        let engine = engine();
        let clauses = parse_clauses(SPECS[spec]).unwrap();
        let mut banned = BannedModels::new();
        banned.extend(masks.into_iter().map(from_mask));

        let parents = engine
            .sample_models(&clauses, &AcceptAll, &SampleRequest::new(3, &banned))
            .unwrap();

        for parent in parents {
            banned.ban(parent.clone());
            let request = SampleRequest::new(1000, &banned)
                .assuming(&parent)
                .with_min_atoms_gt(parent.len());
            let children: BTreeSet<Model> = engine
                .sample_models(&clauses, &AcceptAll, &request)
                .unwrap()
                .into_iter()
                .collect();

            for child in &children {
                prop_assert!(child.len() > parent.len());
                prop_assert!(parent.is_subset(child));
                prop_assert!(!banned.contains(child));
            }

            let bounded = with_atom_count_gt(&clauses, parent.len());
            prop_assert_eq!(
                children,
                brute_force(&engine, &bounded, &AcceptAll, &banned, &parent)
            );
        }
    }
}
