use crate::{
    derive::rank_tier,
    score::{Placed, ResolvedSlot},
};
use banquet_structs::core::{Agent, Condition, Item, Skill, ITEMS_PER_SLOT, SKILL_COUNT};

/// Everything a trigger condition may look at. Absent parts make dependent conditions fail.
#[derive(Clone, Copy, Default)]
pub(crate) struct ConditionContext<'s, 'a> {
    pub agent: Option<&'a Agent>,
    pub skills: Option<&'s [f64; SKILL_COUNT]>,
    pub agent_items: Option<&'s [Option<Placed<'a>>; ITEMS_PER_SLOT]>,
    pub item: Option<&'a Item>,
    pub quantity: u32,
    pub group_slots: Option<&'s [ResolvedSlot<'a>]>,
}

impl<'s, 'a> ConditionContext<'s, 'a> {
    pub fn agent_only(agent: &'a Agent) -> Self {
        Self {
            agent: Some(agent),
            ..Default::default()
        }
    }

    fn rank_of(&self, item: &Item) -> Option<u32> {
        match (self.agent, self.skills) {
            (Some(_), Some(skills)) => Some(rank_tier(skills, item).0),
            _ => None,
        }
    }
}

/// Returns the multiplier count when the condition holds.
pub(crate) fn check_condition(condition: &Condition, ctx: &ConditionContext) -> Option<u32> {
    let count = match condition {
        Condition::Always | Condition::Materials(_) | Condition::SwordsUnited => 1,
        Condition::Rank(min) => {
            let item = ctx.item?;
            u32::from(ctx.rank_of(item)? >= *min)
        }
        Condition::PerRank(min) => ctx
            .agent_items
            .map(|items| {
                items
                    .iter()
                    .flatten()
                    .filter(|placed| ctx.rank_of(placed.item).map_or(false, |r| r >= *min))
                    .count() as u32
            })
            .unwrap_or(0),
        Condition::QuantityAtLeast(min) => u32::from(ctx.item.is_some() && ctx.quantity >= *min),
        Condition::QuantityAtMost(max) => u32::from(ctx.item.is_some() && ctx.quantity <= *max),
        Condition::ItemRarity(rarities) => {
            u32::from(ctx.item.map_or(false, |item| rarities.contains(&item.rarity)))
        }
        Condition::AgentTag(tags) => u32::from(
            ctx.agent
                .map_or(false, |agent| tags.iter().any(|t| agent.has_tag(*t))),
        ),
        Condition::ItemTag(tags) => ctx
            .item
            .map(|item| tags.iter().filter(|t| item.has_tag(**t)).count() as u32)
            .unwrap_or(0),
        Condition::SameSkill => ctx.agent_items.map(shared_skill_count).unwrap_or(0),
        Condition::PerSkill(skill) => ctx
            .group_slots
            .map(|slots| {
                slots
                    .iter()
                    .flat_map(|slot| slot.items.iter().flatten())
                    .filter(|placed| placed.item.uses_skill(*skill))
                    .count() as u32
            })
            .unwrap_or(0),
    };
    (count > 0).then_some(count)
}

/// Number of skills used by all three items of a slot.
fn shared_skill_count(items: &[Option<Placed>; ITEMS_PER_SLOT]) -> u32 {
    Skill::ALL
        .iter()
        .filter(|skill| {
            items
                .iter()
                .filter(|p| p.map_or(false, |p| p.item.uses_skill(**skill)))
                .count()
                == ITEMS_PER_SLOT
        })
        .count() as u32
}
