use banquet_structs::core::{
    Agent, Calc, Condition, Contest, Disk, Effect, EffectKind, Flavor, Group, Ingredient, Intent,
    IntentCatalog, IntentCondition, IntentEffect, Item, Material, PriceTarget, SatietyRule, Scope,
    Skill, SKILL_COUNT,
};
use rand::{
    rngs::{SmallRng, StdRng},
    seq::SliceRandom,
    Rng, SeedableRng,
};
use serde::{Deserialize, Serialize};

/// Shape of a synthetic contest.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GenerateParams {
    pub num_groups: usize,
    pub num_agents: usize,
    pub num_items: usize,
    pub num_materials: usize,
    /// Adds satiety targets and per-slot intents to every other group.
    pub with_intents: bool,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self {
            num_groups: 2,
            num_agents: 12,
            num_items: 40,
            num_materials: 8,
            with_intents: false,
        }
    }
}

const FLAVORS: [Flavor; 6] = [
    Flavor::Sweet,
    Flavor::Sour,
    Flavor::Spicy,
    Flavor::Salty,
    Flavor::Bitter,
    Flavor::Tasty,
];

/// A random contest. Every group shares the same agent and item rosters.
pub fn generate_contest(seed: [u8; 32], params: &GenerateParams) -> Contest {
    let mut rng = SmallRng::from_seed(StdRng::from_seed(seed).gen());

    let materials: Vec<Material> = (0..params.num_materials)
        .map(|i| Material {
            id: i as u32 + 1,
            quantity: if rng.gen_bool(0.2) {
                None
            } else {
                Some(rng.gen_range(20..=200))
            },
            category: None,
            addition: 0.0,
        })
        .collect();

    let agents: Vec<Agent> = (0..params.num_agents)
        .map(|i| {
            let mut skills = [0; SKILL_COUNT];
            for level in skills.iter_mut() {
                *level = rng.gen_range(0..=40);
            }
            let mut special_effects = Vec::new();
            if rng.gen_bool(0.5) {
                let skill = *Skill::ALL.choose(&mut rng).unwrap_or(&Skill::Stirfry);
                special_effects.push(Effect::new(
                    EffectKind::Price(PriceTarget::Skill(skill)),
                    Calc::Percent,
                    rng.gen_range(1..=6) as f64 * 5.0,
                ));
            }
            Agent {
                id: i as u32 + 1,
                name: format!("agent-{}", i + 1),
                rarity: rng.gen_range(1..=5),
                addition: 0.0,
                skills,
                tags: Vec::new(),
                special_effects,
                ultimate_effects: Vec::new(),
                equipment: None,
                disk: Disk::default(),
                owned: rng.gen_bool(0.9),
            }
        })
        .collect();

    let items: Vec<Item> = (0..params.num_items)
        .map(|i| {
            let mut requirements = [0; SKILL_COUNT];
            for _ in 0..rng.gen_range(1..=2) {
                requirements[rng.gen_range(0..SKILL_COUNT)] = rng.gen_range(5..=20);
            }
            let ingredients = if materials.is_empty() {
                Vec::new()
            } else {
                (0..rng.gen_range(1..=2))
                    .map(|_| Ingredient {
                        material: rng.gen_range(1..=materials.len() as u32),
                        amount: rng.gen_range(1..=4),
                    })
                    .collect()
            };
            Item {
                id: i as u32 + 1,
                name: format!("item-{}", i + 1),
                rarity: rng.gen_range(1..=5),
                price: rng.gen_range(10..=300) as f64,
                requirements,
                ingredients,
                flavor: FLAVORS.choose(&mut rng).copied(),
                tags: Vec::new(),
                limit: rng.gen_range(5..=40),
                addition: 0.0,
                activity_addition: 0.0,
                ultimate_addition: 0.0,
                owned: rng.gen_bool(0.9),
                targets: 0,
            }
        })
        .collect();

    let mut catalog = IntentCatalog::default();
    if params.with_intents {
        catalog.buffs.insert(
            1,
            Intent {
                id: 1,
                condition: IntentCondition::Always,
                effect: IntentEffect::BasicPricePercent(20.0),
                from_buff: true,
                last_rounds: 1,
            },
        );
        catalog.intents.insert(
            1,
            Intent {
                id: 1,
                condition: IntentCondition::Rarity(3),
                effect: IntentEffect::Satiety(2.0),
                from_buff: false,
                last_rounds: 0,
            },
        );
        catalog.intents.insert(
            2,
            Intent {
                id: 2,
                condition: IntentCondition::Rank(3),
                effect: IntentEffect::CreateBuff(1),
                from_buff: false,
                last_rounds: 0,
            },
        );
    }

    let groups = (0..params.num_groups)
        .map(|g| {
            let satiety = params.with_intents && g % 2 == 1;
            let mut group = Group {
                name: format!("group-{}", g + 1),
                materials: materials.clone(),
                agents: agents.clone(),
                items: items.clone(),
                ambient_bonus: rng.gen_range(0..=4) as f64 * 5.0,
                ..Default::default()
            };
            if satiety {
                group.satiety = SatietyRule {
                    target: rng.gen_range(20..=30),
                    exact_match_reward: true,
                    reward_percent: 50.0,
                    penalty_percent: 5.0,
                };
                group.intents = (0..3).map(|s| vec![1 + (s % 2) as u32]).collect();
            }
            let aura = rng.gen_range(0..group.agents.len().max(1));
            if let Some(agent) = group.agents.get_mut(aura) {
                group.aura_agents.insert(agent.id);
                agent.ultimate_effects.push(
                    Effect::new(EffectKind::BasicPrice(PriceTarget::Any), Calc::Abs, 10.0)
                        .with_scope(Scope::Partial)
                        .with_condition(Condition::Always),
                );
            }
            group
        })
        .collect();

    let mut contest = Contest { groups, catalog };
    contest.prepare();
    contest
}
