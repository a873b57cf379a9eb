use banquet_scoring::{derive::baseline, DerivedAgent, ItemIdx, MaterialPool};
use banquet_structs::core::{
    AgentId, Contest, Group, IntentCatalog, IntentCondition, IntentEffect, ItemId,
};

/// Read-only lookups for one group, built once per search.
pub(crate) struct GroupTables<'a> {
    pub group: &'a Group,
    /// Owned items, in pool order.
    pub menu: Vec<ItemIdx>,
    /// Aura-free derivation of every agent, used for capability and quantity checks.
    pub baselines: Vec<DerivedAgent<'a>>,
    pub start_pool: MaterialPool,
    /// Per slot: whether an intent touching that slot depends on which item is placed.
    pub item_dependent: Vec<bool>,
}

pub(crate) struct Tables<'a> {
    pub contest: &'a Contest,
    pub groups: Vec<GroupTables<'a>>,
}

fn depends_on_item(condition: IntentCondition) -> bool {
    matches!(
        condition,
        IntentCondition::Skill(_)
            | IntentCondition::Flavor(_)
            | IntentCondition::Rarity(_)
            | IntentCondition::Rank(_)
            | IntentCondition::Group(_)
    )
}

fn item_dependent_slots(group: &Group, catalog: &IntentCatalog) -> Vec<bool> {
    let slots = group.slot_count();
    if !group.satiety_scored() {
        return vec![false; slots];
    }
    let global = group
        .global_buffs
        .iter()
        .filter_map(|id| catalog.buff(*id))
        .any(|buff| depends_on_item(buff.condition));
    (0..slots)
        .map(|s| {
            global
                || group.intents.get(s).map_or(false, |ids| {
                    ids.iter().filter_map(|id| catalog.intent(*id)).any(|intent| {
                        let spawned = match intent.effect {
                            IntentEffect::CreateIntent(child) => catalog.intent(child),
                            IntentEffect::CreateBuff(buff) => catalog.buff(buff),
                            _ => None,
                        };
                        depends_on_item(intent.condition)
                            || spawned.map_or(false, |s| depends_on_item(s.condition))
                    })
                })
        })
        .collect()
}

impl<'a> Tables<'a> {
    pub fn new(contest: &'a Contest) -> Self {
        let groups = contest
            .groups
            .iter()
            .map(|group| GroupTables {
                group,
                menu: group
                    .items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| item.owned)
                    .map(|(i, _)| ItemIdx::new(i))
                    .collect(),
                baselines: group.agents.iter().map(|a| baseline(group, a)).collect(),
                start_pool: MaterialPool::new(&group.materials),
                item_dependent: item_dependent_slots(group, &contest.catalog),
            })
            .collect();
        Self { contest, groups }
    }

    pub fn catalog(&self) -> &'a IntentCatalog {
        &self.contest.catalog
    }

    pub fn agent_id(&self, g: usize, idx: usize) -> AgentId {
        self.groups[g].group.agents[idx].id
    }

    pub fn item_id(&self, g: usize, idx: usize) -> ItemId {
        self.groups[g].group.items[idx].id
    }
}
