mod cancel;
mod climb;
pub mod diversity;
pub mod optimizer;
mod ranking;
pub mod seeds;
mod tables;
mod worker;

pub use cancel::CancelToken;
pub use optimizer::Optimizer;
pub use seeds::Candidate;

use banquet_structs::{api::SearchOutcome, config::SearchConfig, core::Contest};
use serde_json::{Map, Value};

/// Searches for the best assignment of `contest` with tuning read from `hyperparameters`.
pub fn solve_contest(
    contest: &Contest,
    hyperparameters: &Option<Map<String, Value>>,
) -> anyhow::Result<Option<SearchOutcome>> {
    let config = SearchConfig::from_hyperparameters(hyperparameters)?;
    Optimizer::new(contest, config).optimize()
}

pub fn help() {
    println!("{}", SearchConfig::help());
}
