use crate::{tables::Tables, worker::Worker};
use banquet_scoring::{AgentIdx, Grid, ItemIdx};
use banquet_structs::core::{
    EffectKind, IntentCondition, IntentEffect, Scope, Skill, ITEMS_PER_SLOT,
};
use std::collections::BTreeSet;

const AURA_AGENTS_PER_GROUP: usize = 3;
const MULTI_SKILL_ITEMS: usize = 9;

/// A complete assignment produced by seeding or refinement, with its contest total.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub grid: Grid,
    pub score: i64,
}

/// One independent unit of seed construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SeedPlan {
    /// Top items of an anchor slot, each paired with its best free agents.
    Anchor { group: usize, slot: usize },
    /// An aura agent placed at an anchor slot.
    Aura {
        group: usize,
        slot: usize,
        agent: AgentIdx,
    },
    /// Three items sharing a set of skills placed together at an anchor slot.
    MultiSkill {
        group: usize,
        slot: usize,
        items: [ItemIdx; ITEMS_PER_SLOT],
    },
}

pub(crate) fn anchor_plans(tables: &Tables) -> Vec<SeedPlan> {
    tables
        .groups
        .iter()
        .enumerate()
        .flat_map(|(group, t)| {
            (0..t.group.slot_count()).map(move |slot| SeedPlan::Anchor { group, slot })
        })
        .collect()
}

/// Owned aura agents ranked by the total magnitude of their partial and next-slot
/// basic-price ultimates, top three per group.
pub(crate) fn aura_plans(tables: &Tables) -> Vec<SeedPlan> {
    let mut plans = Vec::new();
    for (group, t) in tables.groups.iter().enumerate() {
        let mut auras: Vec<(AgentIdx, f64)> = t
            .group
            .agents
            .iter()
            .enumerate()
            .filter(|(_, agent)| agent.owned && t.group.aura_agents.contains(&agent.id))
            .map(|(i, agent)| {
                let strength: f64 = agent
                    .ultimate_effects
                    .iter()
                    .filter(|e| matches!(e.scope, Scope::Partial | Scope::Next))
                    .filter(|e| matches!(e.kind, EffectKind::BasicPrice(_)))
                    .map(|e| e.value.abs())
                    .sum();
                (AgentIdx::new(i), strength)
            })
            .filter(|(_, strength)| *strength > 0.0)
            .collect();
        auras.sort_by(|a, b| b.1.total_cmp(&a.1));
        auras.truncate(AURA_AGENTS_PER_GROUP);
        for (agent, _) in auras {
            for slot in 0..t.group.slot_count() {
                plans.push(SeedPlan::Aura { group, slot, agent });
            }
        }
    }
    plans
}

fn group_skill(condition: IntentCondition) -> Option<Skill> {
    match condition {
        IntentCondition::Group(skill) => Some(skill),
        _ => None,
    }
}

/// Skills named by group conditions on slot intents, the buffs they spawn, and global buffs.
fn demanded_skills(tables: &Tables, group: usize) -> BTreeSet<Skill> {
    let group = tables.groups[group].group;
    let catalog = tables.catalog();
    let mut skills = BTreeSet::new();
    for intent in group.intents.iter().flatten().filter_map(|id| catalog.intent(*id)) {
        skills.extend(group_skill(intent.condition));
        if let IntentEffect::CreateBuff(buff) = intent.effect {
            skills.extend(catalog.buff(buff).and_then(|b| group_skill(b.condition)));
        }
    }
    for buff in group.global_buffs.iter().filter_map(|id| catalog.buff(*id)) {
        skills.extend(group_skill(buff.condition));
    }
    skills
}

pub(crate) fn multi_skill_plans(tables: &Tables) -> Vec<SeedPlan> {
    let mut plans = Vec::new();
    for (group, t) in tables.groups.iter().enumerate() {
        let skills: Vec<Skill> = demanded_skills(tables, group).into_iter().collect();
        if skills.len() < 2 {
            continue;
        }
        let mut combos: Vec<Vec<Skill>> = Vec::new();
        for (i, a) in skills.iter().enumerate() {
            for b in &skills[i + 1..] {
                combos.push(vec![*a, *b]);
            }
        }
        if skills.len() > 2 {
            combos.push(skills.clone());
        }
        for combo in combos {
            let mut matching: Vec<ItemIdx> = t
                .menu
                .iter()
                .copied()
                .filter(|idx| {
                    let item = &t.group.items[idx.get()];
                    combo.iter().all(|skill| item.uses_skill(*skill))
                })
                .collect();
            if matching.len() < ITEMS_PER_SLOT {
                continue;
            }
            matching.sort_by(|a, b| {
                let price = |idx: &ItemIdx| t.group.items[idx.get()].price;
                price(b).total_cmp(&price(a))
            });
            matching.truncate(MULTI_SKILL_ITEMS);
            let items = [matching[0], matching[1], matching[2]];
            for slot in 0..t.group.slot_count() {
                plans.push(SeedPlan::MultiSkill { group, slot, items });
            }
        }
    }
    plans
}

impl<'a> Worker<'a> {
    fn candidate(&mut self) -> Candidate {
        Candidate {
            score: self.total_score(),
            grid: self.grid.clone(),
        }
    }

    /// Greedily fills every slot of the contest except the anchor.
    fn fill_around(&mut self, g: usize, anchor: usize) {
        for s in 0..self.slot_count(g) {
            if s != anchor {
                self.greedy_fill_slot(g, s);
            }
        }
        for other in 0..self.group_count() {
            if other != g {
                self.greedy_fill_group(other);
            }
        }
    }

    pub(crate) fn build_seeds(&mut self, plan: &SeedPlan) -> Vec<Candidate> {
        let mut seeds = Vec::new();
        if self.cancelled() {
            return seeds;
        }
        match *plan {
            SeedPlan::Anchor { group: g, slot: s } => {
                self.reset();
                let top = self.rank_items(g, s, 0, self.config.seed_recipes_per_anchor);
                for item in top {
                    if self.cancelled() {
                        break;
                    }
                    self.reset();
                    self.set_item(g, s, 0, Some(item.idx));
                    let used = self.used_agents(g, s);
                    let agents: Vec<AgentIdx> = self
                        .rank_agents(g, s)
                        .into_iter()
                        .filter(|r| {
                            r.capable && !used.contains(&self.tables.agent_id(g, r.idx.get()))
                        })
                        .map(|r| r.idx)
                        .take(self.config.agents_per_seed)
                        .collect();
                    for agent in agents {
                        self.reset();
                        self.set_agent(g, s, Some(agent));
                        self.set_item(g, s, 0, Some(item.idx));
                        self.greedy_fill_items(g, s);
                        self.fill_around(g, s);
                        seeds.push(self.candidate());
                    }
                }
            }
            SeedPlan::Aura {
                group: g,
                slot: s,
                agent,
            } => {
                self.reset();
                self.set_agent(g, s, Some(agent));
                self.greedy_fill_items(g, s);
                self.fill_around(g, s);
                seeds.push(self.candidate());
            }
            SeedPlan::MultiSkill {
                group: g,
                slot: s,
                items,
            } => {
                self.reset();
                for (k, item) in items.into_iter().enumerate() {
                    self.set_item(g, s, k, Some(item));
                }
                if let Some(agent) = self.pick_free_agent(g, s) {
                    self.set_agent(g, s, Some(agent));
                    self.requantify(g, s);
                    self.fill_around(g, s);
                    seeds.push(self.candidate());
                }
            }
        }
        seeds
    }
}
