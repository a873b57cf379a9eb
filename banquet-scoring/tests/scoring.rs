use banquet_scoring::{
    derive::baseline, rank_tier, resolve_max_quantity, score_contest, score_group,
    score_placement, settle_quantities, AgentIdx, Grid, ItemIdx, ItemPick, MaterialPool, Scratch,
    SlotState,
};
use banquet_structs::core::{
    Agent, Calc, Condition, Contest, Disk, Effect, EffectKind, Group, Ingredient, Intent,
    IntentCatalog, IntentCondition, IntentEffect, Item, Material, PriceTarget, SatietyRule, Scope,
    ScoreModifiers,
};

fn agent(id: u32, skill: u32) -> Agent {
    Agent {
        id,
        name: String::new(),
        rarity: 3,
        addition: 0.0,
        skills: [skill, 0, 0, 0, 0, 0],
        tags: Vec::new(),
        special_effects: Vec::new(),
        ultimate_effects: Vec::new(),
        equipment: None,
        disk: Disk::default(),
        owned: true,
    }
}

fn item(id: u32, price: f64) -> Item {
    Item {
        id,
        name: String::new(),
        rarity: 1,
        price,
        requirements: [10, 0, 0, 0, 0, 0],
        ingredients: Vec::new(),
        flavor: None,
        tags: Vec::new(),
        limit: 10,
        addition: 0.0,
        activity_addition: 0.0,
        ultimate_addition: 0.0,
        owned: true,
        targets: 0,
    }
}

fn prepared(mut group: Group) -> Group {
    group.prepare();
    group
}

fn pick(item: usize, quantity: u32) -> Option<ItemPick> {
    Some(ItemPick {
        item: ItemIdx::new(item),
        quantity,
    })
}

fn slot(agent: usize, items: [Option<ItemPick>; 3]) -> SlotState {
    SlotState {
        agent: Some(AgentIdx::new(agent)),
        items,
    }
}

fn full_slot(agent: usize, first_item: usize) -> SlotState {
    slot(
        agent,
        [
            pick(first_item, 1),
            pick(first_item + 1, 1),
            pick(first_item + 2, 1),
        ],
    )
}

fn score(group: &Group, catalog: &IntentCatalog, state: &[SlotState]) -> i64 {
    let mut scratch = Scratch::new();
    score_group(group, catalog, state, &mut scratch).score
}

#[test]
fn test_base_case_rounds_price_up_per_unit() {
    let group = prepared(Group {
        agents: vec![agent(1, 10)],
        items: vec![item(1, 100.4)],
        ..Default::default()
    });
    let state = vec![slot(0, [pick(0, 3), None, None])];
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 303);
}

#[test]
fn test_rank_tiers() {
    let it = item(1, 100.0);
    assert_eq!(rank_tier(&[50.0, 0.0, 0.0, 0.0, 0.0, 0.0], &it), (5, 100.0));
    assert_eq!(rank_tier(&[40.0, 0.0, 0.0, 0.0, 0.0, 0.0], &it), (4, 50.0));
    assert_eq!(rank_tier(&[39.0, 0.0, 0.0, 0.0, 0.0, 0.0], &it), (3, 30.0));
    assert_eq!(rank_tier(&[20.0, 0.0, 0.0, 0.0, 0.0, 0.0], &it), (2, 10.0));
    assert_eq!(rank_tier(&[10.0, 0.0, 0.0, 0.0, 0.0, 0.0], &it), (1, 0.0));
    assert_eq!(rank_tier(&[9.0, 0.0, 0.0, 0.0, 0.0, 0.0], &it), (0, 0.0));

    let mut free = item(2, 100.0);
    free.requirements = [0; 6];
    assert_eq!(rank_tier(&[50.0; 6], &free), (0, 0.0));
}

#[test]
fn test_rank_bonus_and_disable_toggle() {
    let mut group = prepared(Group {
        agents: vec![agent(1, 20)],
        items: vec![item(1, 100.0)],
        ..Default::default()
    });
    let state = vec![slot(0, [pick(0, 1), None, None])];
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 110);

    group.toggles.disable_skill_rank = true;
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 100);
}

#[test]
fn test_group_modifiers() {
    let mut group = prepared(Group {
        agents: vec![agent(1, 20)],
        items: vec![item(1, 100.0)],
        modifiers: ScoreModifiers {
            multiply: 2.0,
            pow: 0.0,
            add: 5,
            activity: false,
        },
        ..Default::default()
    });
    let state = vec![slot(0, [pick(0, 1), None, None])];
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 225);

    // add only applies to a non-zero score
    assert_eq!(score(&group, &IntentCatalog::default(), &[]), 0);

    group.modifiers = ScoreModifiers {
        multiply: 1.0,
        pow: 0.5,
        add: 0,
        activity: true,
    };
    // sqrt(110) = 10.488...
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 11);
}

#[test]
fn test_scoring_is_pure() {
    let group = prepared(Group {
        agents: vec![agent(1, 20), agent(2, 50)],
        items: (1..=6).map(|i| item(i, 10.0 * i as f64)).collect(),
        ..Default::default()
    });
    let state = vec![full_slot(0, 0), full_slot(1, 3)];
    let catalog = IntentCatalog::default();
    let mut scratch = Scratch::new();
    let first = score_group(&group, &catalog, &state, &mut scratch);
    let second = score_group(&group, &catalog, &state, &mut scratch);
    assert_eq!(first, second);
    assert_eq!(score(&group, &catalog, &state), first.score);
}

fn satiety_group(target: i64) -> Group {
    let mut items: Vec<Item> = (1..=3).map(|i| item(i, 100.0)).collect();
    for it in items.iter_mut() {
        it.rarity = 2;
    }
    prepared(Group {
        agents: vec![agent(1, 10)],
        items,
        intents: vec![vec![]],
        satiety: SatietyRule {
            target,
            exact_match_reward: true,
            reward_percent: 50.0,
            penalty_percent: 10.0,
        },
        ..Default::default()
    })
}

#[test]
fn test_satiety_reward_on_exact_match() {
    let group = satiety_group(6);
    let mut scratch = Scratch::new();
    let result = score_group(&group, &IntentCatalog::default(), &[full_slot(0, 0)], &mut scratch);
    assert_eq!(result.satiety, 6);
    assert_eq!(result.score, 450);
}

#[test]
fn test_satiety_penalty_scales_with_distance() {
    let group = satiety_group(8);
    assert_eq!(score(&group, &IntentCatalog::default(), &[full_slot(0, 0)]), 240);
}

#[test]
fn test_satiety_skipped_when_slots_incomplete() {
    let group = satiety_group(8);
    let state = vec![slot(0, [pick(0, 1), pick(1, 1), None])];
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 200);
}

fn intent(id: u32, condition: IntentCondition, effect: IntentEffect) -> Intent {
    Intent {
        id,
        condition,
        effect,
        from_buff: false,
        last_rounds: 0,
    }
}

fn neutral_satiety() -> SatietyRule {
    SatietyRule {
        target: 1000,
        exact_match_reward: false,
        reward_percent: 0.0,
        penalty_percent: 0.0,
    }
}

#[test]
fn test_create_intent_lands_on_next_sub_slot() {
    let mut catalog = IntentCatalog::default();
    catalog.intents.insert(
        1,
        intent(1, IntentCondition::Order(1), IntentEffect::CreateIntent(2)),
    );
    catalog.intents.insert(
        2,
        intent(2, IntentCondition::Always, IntentEffect::BasicPrice(50.0)),
    );
    let group = prepared(Group {
        agents: vec![agent(1, 10)],
        items: (1..=3).map(|i| item(i, 100.0)).collect(),
        intents: vec![vec![1]],
        satiety: neutral_satiety(),
        ..Default::default()
    });
    assert_eq!(score(&group, &catalog, &[full_slot(0, 0)]), 350);
}

#[test]
fn test_create_buff_applies_to_following_rounds() {
    let mut catalog = IntentCatalog::default();
    catalog.intents.insert(
        1,
        intent(1, IntentCondition::Always, IntentEffect::CreateBuff(7)),
    );
    catalog.buffs.insert(
        7,
        Intent {
            id: 7,
            condition: IntentCondition::Always,
            effect: IntentEffect::PricePercent(100.0),
            from_buff: true,
            last_rounds: 1,
        },
    );
    let group = prepared(Group {
        agents: vec![agent(1, 10), agent(2, 10)],
        items: (1..=6).map(|i| item(i, 100.0)).collect(),
        intents: vec![vec![1], vec![]],
        satiety: neutral_satiety(),
        ..Default::default()
    });
    let state = vec![full_slot(0, 0), full_slot(1, 3)];
    assert_eq!(score(&group, &catalog, &state), 900);
}

#[test]
fn test_intents_ignored_without_satiety() {
    let mut catalog = IntentCatalog::default();
    catalog.intents.insert(
        1,
        intent(1, IntentCondition::Always, IntentEffect::BasicPrice(50.0)),
    );
    let group = prepared(Group {
        agents: vec![agent(1, 10)],
        items: (1..=3).map(|i| item(i, 100.0)).collect(),
        intents: vec![vec![1]],
        ..Default::default()
    });
    assert_eq!(score(&group, &catalog, &[full_slot(0, 0)]), 300);
}

fn aura_group(satiety: Option<SatietyRule>) -> Group {
    let mut source = agent(2, 10);
    source.ultimate_effects.push(
        Effect::new(EffectKind::BasicPrice(PriceTarget::Any), Calc::Abs, 10.0)
            .with_scope(Scope::Partial),
    );
    let mut group = Group {
        agents: vec![agent(1, 10), source],
        items: vec![item(1, 100.0), item(2, 100.0)],
        ..Default::default()
    };
    group.aura_agents.insert(2);
    if let Some(rule) = satiety {
        group.satiety = rule;
        group.intents = vec![vec![], vec![]];
    }
    prepared(group)
}

#[test]
fn test_partial_aura_reaches_all_slots() {
    let group = aura_group(None);
    let state = vec![
        slot(0, [pick(0, 1), None, None]),
        slot(1, [pick(1, 1), None, None]),
    ];
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 220);
}

#[test]
fn test_partial_aura_only_reaches_later_slots_with_satiety() {
    let group = aura_group(Some(neutral_satiety()));
    let state = vec![
        slot(0, [pick(0, 1), None, None]),
        slot(1, [pick(1, 1), None, None]),
    ];
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 210);
}

#[test]
fn test_aura_needs_listed_agent() {
    let mut group = aura_group(None);
    group.aura_agents.clear();
    let state = vec![
        slot(0, [pick(0, 1), None, None]),
        slot(1, [pick(1, 1), None, None]),
    ];
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 200);
}

#[test]
fn test_next_aura_targets_following_slot() {
    let mut source = agent(1, 10);
    source.ultimate_effects.push(
        Effect::new(EffectKind::Price(PriceTarget::Any), Calc::Percent, 50.0)
            .with_scope(Scope::Next),
    );
    let mut group = Group {
        agents: vec![source, agent(2, 10), agent(3, 10)],
        items: vec![item(1, 100.0), item(2, 100.0), item(3, 100.0)],
        ..Default::default()
    };
    group.aura_agents.insert(1);
    let group = prepared(group);
    let state = vec![
        slot(0, [pick(0, 1), None, None]),
        slot(1, [pick(1, 1), None, None]),
        slot(2, [pick(2, 1), None, None]),
    ];
    assert_eq!(score(&group, &IntentCatalog::default(), &state), 350);
}

fn material_group(quantity: Option<u32>) -> Group {
    let mut first = item(1, 10.0);
    first.ingredients = vec![Ingredient {
        material: 1,
        amount: 3,
    }];
    let mut second = item(2, 10.0);
    second.ingredients = first.ingredients.clone();
    prepared(Group {
        agents: vec![agent(1, 10), agent(2, 10)],
        items: vec![first, second],
        materials: vec![Material {
            id: 1,
            quantity,
            category: None,
            addition: 0.0,
        }],
        ..Default::default()
    })
}

#[test]
fn test_material_reduction_raises_max_quantity() {
    let mut group = material_group(Some(10));
    let pool = MaterialPool::new(&group.materials);
    let plain = baseline(&group, &group.agents[0]);
    assert_eq!(resolve_max_quantity(&group, &group.items[0], &pool, Some(&plain)), 3);

    group.agents[0].special_effects.push(
        Effect::new(EffectKind::MaterialReduce, Calc::Abs, 1.0)
            .with_condition(Condition::Materials(vec![1])),
    );
    let reduced = baseline(&group, &group.agents[0]);
    assert_eq!(resolve_max_quantity(&group, &group.items[0], &pool, Some(&reduced)), 5);
}

#[test]
fn test_unlimited_material_uses_item_limit() {
    let group = material_group(None);
    let pool = MaterialPool::new(&group.materials);
    assert_eq!(resolve_max_quantity(&group, &group.items[0], &pool, None), 10);
}

#[test]
fn test_missing_material_gives_zero() {
    let mut group = material_group(Some(10));
    group.materials.clear();
    let pool = MaterialPool::new(&group.materials);
    assert_eq!(resolve_max_quantity(&group, &group.items[0], &pool, None), 0);
}

#[test]
fn test_depletion_follows_slot_order() {
    let group = material_group(Some(10));
    let catalog = IntentCatalog::default();
    let mut state = vec![
        slot(0, [pick(0, 5), None, None]),
        slot(1, [pick(1, 5), None, None]),
    ];
    let mut scratch = Scratch::new();
    let result = settle_quantities(&group, &catalog, &mut state, &mut scratch);
    assert_eq!(state[0].items[0].map(|p| p.quantity), Some(3));
    assert_eq!(state[1].items[0].map(|p| p.quantity), Some(0));
    assert_eq!(result.score, 30);
}

#[test]
fn test_single_placement_ignores_depletion() {
    let group = material_group(Some(10));
    let catalog = IntentCatalog::default();
    let state = vec![
        slot(0, [pick(0, 5), None, None]),
        slot(1, [pick(1, 5), None, None]),
    ];
    let mut scratch = Scratch::new();
    assert_eq!(score_placement(&group, &catalog, &state, 1, 0, &mut scratch), 30);
    assert_eq!(score_placement(&group, &catalog, &state, 1, 1, &mut scratch), 0);
}

#[test]
fn test_contest_score_sums_groups() {
    let group = prepared(Group {
        agents: vec![agent(1, 10), agent(2, 10)],
        items: vec![item(1, 100.0), item(2, 50.0)],
        ..Default::default()
    });
    let contest = Contest {
        groups: vec![group.clone(), group],
        catalog: IntentCatalog::default(),
    };
    let mut grid = Grid::empty(&contest);
    grid.groups[0][0] = slot(0, [pick(0, 1), None, None]);
    grid.groups[1][0] = slot(1, [pick(1, 2), None, None]);
    let mut scratch = Scratch::new();
    assert_eq!(score_contest(&contest, &grid, &mut scratch), 200);
}
