use crate::{
    core::{AgentId, ItemId},
    serializable_struct,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

serializable_struct! {
    ItemAssignment {
        item: ItemId,
        quantity: u32,
    }
}

serializable_struct! {
    SlotAssignment {
        agent: Option<AgentId>,
        items: Vec<Option<ItemAssignment>>,
    }
}

serializable_struct! {
    GroupAssignment {
        #[serde(default)]
        name: String,
        #[serde(default)]
        score: i64,
        #[serde(default)]
        satiety: i64,
        slots: Vec<SlotAssignment>,
    }
}

serializable_struct! {
    Assignment {
        groups: Vec<GroupAssignment>,
    }
}

impl Assignment {
    pub fn agent_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.slots)
            .filter(|s| s.agent.is_some())
            .count()
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupScore {
    pub score: i64,
    pub satiety: i64,
}

serializable_struct! {
    SearchOutcome {
        score: i64,
        assignment: Assignment,
        elapsed: Duration,
        /// Set when the search stopped early on request.
        #[serde(default)]
        cancelled: bool,
    }
}
