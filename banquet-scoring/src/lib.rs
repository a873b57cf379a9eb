mod auras;
mod conditions;
pub mod derive;
pub mod generate;
pub mod grid;
mod intents;
pub mod resolver;
pub mod score;
pub mod verify;

pub use derive::{agent_can_perform, derive_agent, rank_tier, DerivedAgent};
pub use grid::{AgentIdx, Grid, GroupState, ItemIdx, ItemPick, SlotState};
pub use resolver::{consume, effective_requirement, resolve_max_quantity, MaterialPool};
pub use score::{score_contest, score_group, score_placement, settle_quantities, Scratch};
pub use verify::verify_grid;
