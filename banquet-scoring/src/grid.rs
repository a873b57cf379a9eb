use anyhow::{anyhow, ensure, Result};
use banquet_structs::{
    api::{Assignment, GroupAssignment, GroupScore, ItemAssignment, SlotAssignment},
    core::{AgentId, Contest, ItemId, ITEMS_PER_SLOT},
};
use banquet_utils::fingerprint;

/// Index into a group's agent pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentIdx(pub u32);

/// Index into a group's item pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemIdx(pub u32);

impl AgentIdx {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl ItemIdx {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemPick {
    pub item: ItemIdx,
    pub quantity: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SlotState {
    pub agent: Option<AgentIdx>,
    pub items: [Option<ItemPick>; ITEMS_PER_SLOT],
}

impl SlotState {
    pub fn has_items(&self) -> bool {
        self.items.iter().any(Option::is_some)
    }

    pub fn item_indices(&self) -> impl Iterator<Item = ItemIdx> + '_ {
        self.items.iter().flatten().map(|pick| pick.item)
    }
}

pub type GroupState = Vec<SlotState>;

/// Assignment of every slot of every group, by pool index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Grid {
    pub groups: Vec<GroupState>,
}

const ABSENT: u32 = u32::MAX;

impl Grid {
    pub fn empty(contest: &Contest) -> Self {
        Self {
            groups: contest
                .groups
                .iter()
                .map(|g| vec![SlotState::default(); g.slot_count()])
                .collect(),
        }
    }

    pub fn slot(&self, group: usize, slot: usize) -> Option<&SlotState> {
        self.groups.get(group).and_then(|g| g.get(slot))
    }

    /// blake3 over the agent and item indices of every slot.
    pub fn fingerprint(&self) -> [u8; 32] {
        let slots: usize = self.groups.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(slots * 16);
        for group in &self.groups {
            for slot in group {
                bytes.extend_from_slice(&slot.agent.map_or(ABSENT, |a| a.0).to_le_bytes());
                for pick in &slot.items {
                    bytes.extend_from_slice(&pick.map_or(ABSENT, |p| p.item.0).to_le_bytes());
                }
            }
        }
        fingerprint(&bytes)
    }

    /// Identities of all assigned agents, sorted.
    pub fn agent_ids(&self, contest: &Contest) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self
            .groups
            .iter()
            .zip(&contest.groups)
            .flat_map(|(state, group)| {
                state
                    .iter()
                    .filter_map(|slot| slot.agent)
                    .filter_map(|a| group.agents.get(a.get()).map(|agent| agent.id))
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn empty_slot_count(&self) -> usize {
        self.groups
            .iter()
            .flatten()
            .filter(|slot| slot.agent.is_none())
            .count()
    }

    pub fn to_assignment(&self, contest: &Contest, scores: &[GroupScore]) -> Assignment {
        let groups = self
            .groups
            .iter()
            .zip(&contest.groups)
            .enumerate()
            .map(|(g, (state, group))| {
                let score = scores.get(g).copied().unwrap_or_default();
                GroupAssignment {
                    name: group.name.clone(),
                    score: score.score,
                    satiety: score.satiety,
                    slots: state
                        .iter()
                        .map(|slot| SlotAssignment {
                            agent: slot
                                .agent
                                .and_then(|a| group.agents.get(a.get()))
                                .map(|a| a.id),
                            items: slot
                                .items
                                .iter()
                                .map(|pick| {
                                    pick.and_then(|p| {
                                        group.items.get(p.item.get()).map(|item| ItemAssignment {
                                            item: item.id,
                                            quantity: p.quantity,
                                        })
                                    })
                                })
                                .collect(),
                        })
                        .collect(),
                }
            })
            .collect();
        Assignment { groups }
    }

    pub fn from_assignment(contest: &Contest, assignment: &Assignment) -> Result<Self> {
        ensure!(
            assignment.groups.len() == contest.groups.len(),
            "Assignment has {} groups, contest has {}",
            assignment.groups.len(),
            contest.groups.len()
        );
        let mut grid = Grid::empty(contest);
        for (g, (group_assignment, group)) in
            assignment.groups.iter().zip(&contest.groups).enumerate()
        {
            ensure!(
                group_assignment.slots.len() <= group.slot_count(),
                "Group {} has {} slots, expected at most {}",
                g,
                group_assignment.slots.len(),
                group.slot_count()
            );
            for (s, slot) in group_assignment.slots.iter().enumerate() {
                ensure!(
                    slot.items.len() <= ITEMS_PER_SLOT,
                    "Group {} slot {} holds more than {} items",
                    g,
                    s,
                    ITEMS_PER_SLOT
                );
                let state = &mut grid.groups[g][s];
                state.agent = match slot.agent {
                    Some(id) => Some(find_agent(contest, g, id)?),
                    None => None,
                };
                for (k, entry) in slot.items.iter().enumerate() {
                    state.items[k] = match entry {
                        Some(entry) => Some(ItemPick {
                            item: find_item(contest, g, entry.item)?,
                            quantity: entry.quantity,
                        }),
                        None => None,
                    };
                }
            }
        }
        Ok(grid)
    }
}

fn find_agent(contest: &Contest, group: usize, id: AgentId) -> Result<AgentIdx> {
    contest.groups[group]
        .agent_position(id)
        .map(AgentIdx::new)
        .ok_or_else(|| anyhow!("Agent {} is not in the pool of group {}", id, group))
}

fn find_item(contest: &Contest, group: usize, id: ItemId) -> Result<ItemIdx> {
    contest.groups[group]
        .item_position(id)
        .map(ItemIdx::new)
        .ok_or_else(|| anyhow!("Item {} is not in the pool of group {}", id, group))
}
