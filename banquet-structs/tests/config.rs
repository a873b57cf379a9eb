use banquet_structs::config::SearchConfig;
use serde_json::{json, Map, Value};

fn params(value: Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

#[test]
fn test_defaults() {
    let config = SearchConfig::from_hyperparameters(&None).unwrap();
    assert_eq!(config, SearchConfig::default());
    assert_eq!(config.seed_recipes_per_anchor, 5);
    assert_eq!(config.agents_per_seed, 3);
    assert_eq!(config.top_recipes_considered_during_climb, 5);
    assert_eq!(config.max_climbing_rounds, 5);
    assert_eq!(config.max_quick_refine_iterations, 5);
    assert_eq!(config.precise_scoring_candidate_cap, 50);
    assert_eq!(config.max_diverse_seeds, 12);
    assert!(!config.verbose_logging);
}

#[test]
fn test_hyperparameter_overrides() {
    let config = SearchConfig::from_hyperparameters(&params(json!({
        "maxDiverseSeeds": 3,
        "verboseLogging": true
    })))
    .unwrap();
    assert_eq!(config.max_diverse_seeds, 3);
    assert!(config.verbose_logging);
    assert_eq!(config.max_climbing_rounds, 5);
}

#[test]
fn test_preset_with_override() {
    let config = SearchConfig::from_hyperparameters(&params(json!({
        "preset": "fast",
        "maxClimbingRounds": 7
    })))
    .unwrap();
    assert_eq!(config.max_diverse_seeds, SearchConfig::fast().max_diverse_seeds);
    assert_eq!(config.max_climbing_rounds, 7);
}

#[test]
fn test_rejects_bad_hyperparameters() {
    assert!(SearchConfig::from_hyperparameters(&params(json!({ "maxDiverseSeed": 3 }))).is_err());
    assert!(SearchConfig::from_hyperparameters(&params(json!({ "preset": "slow" }))).is_err());
    assert!(SearchConfig::from_hyperparameters(&params(json!({ "maxDiverseSeeds": 0 }))).is_err());
    assert!(SearchConfig::from_hyperparameters(&params(json!({ "workerThreads": 0 }))).is_err());
}
