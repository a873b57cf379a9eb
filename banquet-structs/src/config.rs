use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fs, path::Path};

/// Search tuning. Built once and handed to the optimizer and every worker.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SearchConfig {
    pub seed_recipes_per_anchor: usize,
    pub agents_per_seed: usize,
    pub top_recipes_considered_during_climb: usize,
    pub max_climbing_rounds: usize,
    pub max_quick_refine_iterations: usize,
    pub precise_scoring_candidate_cap: usize,
    pub max_diverse_seeds: usize,
    pub verbose_logging: bool,
    /// Defaults to the available hardware parallelism.
    pub worker_threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed_recipes_per_anchor: 5,
            agents_per_seed: 3,
            top_recipes_considered_during_climb: 5,
            max_climbing_rounds: 5,
            max_quick_refine_iterations: 5,
            precise_scoring_candidate_cap: 50,
            max_diverse_seeds: 12,
            verbose_logging: false,
            worker_threads: None,
        }
    }
}

impl SearchConfig {
    pub fn fast() -> Self {
        Self {
            seed_recipes_per_anchor: 3,
            agents_per_seed: 2,
            top_recipes_considered_during_climb: 3,
            max_climbing_rounds: 2,
            max_quick_refine_iterations: 2,
            precise_scoring_candidate_cap: 20,
            max_diverse_seeds: 4,
            ..Default::default()
        }
    }

    pub fn thorough() -> Self {
        Self {
            seed_recipes_per_anchor: 8,
            agents_per_seed: 5,
            top_recipes_considered_during_climb: 8,
            max_climbing_rounds: 10,
            max_quick_refine_iterations: 8,
            precise_scoring_candidate_cap: 100,
            max_diverse_seeds: 24,
            ..Default::default()
        }
    }

    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "default" => Ok(Self::default()),
            "fast" => Ok(Self::fast()),
            "thorough" => Ok(Self::thorough()),
            _ => Err(anyhow!("Unknown preset: {}", name)),
        }
    }

    /// Reads overrides from a hyperparameter map. An optional `preset` key picks the base values.
    pub fn from_hyperparameters(hyperparameters: &Option<Map<String, Value>>) -> Result<Self> {
        let Some(params) = hyperparameters else {
            return Ok(Self::default());
        };
        let mut params = params.clone();
        let base = match params.remove("preset") {
            Some(Value::String(name)) => Self::preset(&name)?,
            Some(other) => return Err(anyhow!("Invalid preset: {}", other)),
            None => Self::default(),
        };
        let mut merged = match serde_json::to_value(&base)? {
            Value::Object(map) => map,
            _ => return Err(anyhow!("Config did not serialize to an object")),
        };
        merged.extend(params);
        let config: SearchConfig =
            serde_json::from_value(Value::Object(merged)).context("Invalid hyperparameters")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: SearchConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.max_diverse_seeds > 0, "maxDiverseSeeds must be at least 1");
        anyhow::ensure!(
            self.seed_recipes_per_anchor > 0,
            "seedRecipesPerAnchor must be at least 1"
        );
        anyhow::ensure!(self.agents_per_seed > 0, "agentsPerSeed must be at least 1");
        anyhow::ensure!(
            self.worker_threads != Some(0),
            "workerThreads must be at least 1 when set"
        );
        Ok(())
    }

    pub fn help() -> &'static str {
        "Hyperparameters (all optional):
  preset                           \"default\" | \"fast\" | \"thorough\"
  seedRecipesPerAnchor             top items tried per anchor slot when seeding (5)
  agentsPerSeed                    agents tried per seed item (3)
  topRecipesConsideredDuringClimb  item candidates per sub-slot during climbing (5)
  maxClimbingRounds                climbing rounds per deep search (5)
  maxQuickRefineIterations         quick-refine passes per candidate (5)
  preciseScoringCandidateCap       candidates fully scored during ranking (50)
  maxDiverseSeeds                  seeds kept for deep search (12)
  verboseLogging                   per-seed progress at info level (false)
  workerThreads                    worker pool size (hardware parallelism)"
    }
}
