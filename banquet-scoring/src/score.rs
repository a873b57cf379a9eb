use crate::{
    auras::{collect_agent_auras, collect_item_auras, AuraBonus},
    conditions::{check_condition, ConditionContext},
    derive::{derive_agent, rank_tier, DerivedAgent},
    grid::{Grid, SlotState},
    intents::collect_intents,
    resolver::{consume, resolve_max_quantity, MaterialPool},
};
use banquet_structs::{
    api::GroupScore,
    core::{
        Agent, Calc, Contest, Effect, EffectKind, Group, Intent, IntentCatalog, IntentEffect, Item,
        Material, ITEMS_PER_SLOT,
    },
};
use banquet_utils::{ceil2, round2, Addition};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Placed<'a> {
    pub item: &'a Item,
    pub quantity: u32,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct ResolvedSlot<'a> {
    pub agent: Option<&'a Agent>,
    pub derived: DerivedAgent<'a>,
    pub items: [Option<Placed<'a>>; ITEMS_PER_SLOT],
}

/// Buffers reused across scoring calls. One per worker thread.
#[derive(Default)]
pub struct Scratch<'a> {
    slots: Vec<ResolvedSlot<'a>>,
    agent_auras: Vec<Vec<&'a Effect>>,
    item_auras: Vec<Vec<AuraBonus<'a>>>,
    intents: Vec<Vec<&'a Intent>>,
    pool: MaterialPool,
}

impl<'a> Scratch<'a> {
    pub fn new() -> Self {
        Self::default()
    }
}

fn resolve_slots<'a>(group: &'a Group, state: &[SlotState], slots: &mut Vec<ResolvedSlot<'a>>) {
    slots.resize_with(state.len().max(slots.len()), ResolvedSlot::default);
    slots.truncate(state.len());
    for (slot, entry) in slots.iter_mut().zip(state) {
        slot.agent = entry.agent.and_then(|a| group.agents.get(a.get()));
        slot.derived.reset();
        for (placed, pick) in slot.items.iter_mut().zip(&entry.items) {
            *placed = pick.and_then(|p| {
                group.items.get(p.item.get()).map(|item| Placed {
                    item,
                    quantity: p.quantity,
                })
            });
        }
    }
}

/// Resolves agents, auras and derivations shared by every scoring entry point.
fn prepare<'a>(group: &'a Group, state: &[SlotState], scratch: &mut Scratch<'a>) {
    let Scratch {
        slots,
        agent_auras,
        pool,
        ..
    } = scratch;
    resolve_slots(group, state, slots);
    collect_agent_auras(group, slots, agent_auras);
    for (slot, auras) in slots.iter_mut().zip(agent_auras.iter()) {
        if let Some(agent) = slot.agent {
            derive_agent(group, agent, auras, &mut slot.derived);
        }
    }
    pool.reset(&group.materials);
}

/// Clamps every quantity to what the pool allows, consuming materials in slot order.
fn clamp_quantities<'a>(group: &'a Group, slots: &mut [ResolvedSlot<'a>], pool: &mut MaterialPool) {
    for slot in slots.iter_mut() {
        let agent = slot.agent.map(|_| &slot.derived);
        for placed in slot.items.iter_mut().flatten() {
            let max = resolve_max_quantity(group, placed.item, pool, agent);
            placed.quantity = placed.quantity.min(max);
            consume(pool, placed.item, placed.quantity, agent);
        }
    }
}

/// Scores one group of the grid. Quantities above the resolvable bound are clamped, never rejected.
pub fn score_group<'a>(
    group: &'a Group,
    catalog: &'a IntentCatalog,
    state: &[SlotState],
    scratch: &mut Scratch<'a>,
) -> GroupScore {
    prepare(group, state, scratch);
    let Scratch {
        slots,
        item_auras,
        intents,
        pool,
        ..
    } = scratch;
    clamp_quantities(group, slots, pool);
    collect_intents(group, catalog, slots, intents);
    collect_item_auras(group, slots, item_auras);

    let mut raw = 0;
    let mut satiety = 0;
    let mut count = 0;
    for (ci, slot) in slots.iter().enumerate() {
        for k in 0..ITEMS_PER_SLOT {
            let Some(placed) = slot.items[k] else { continue };
            let position = ITEMS_PER_SLOT * ci + k;
            let (total, item_satiety) = score_item(
                group,
                slot,
                k,
                &item_auras[position],
                &intents[position],
            );
            raw += with_activity(total, placed.item);
            satiety += item_satiety;
            count += 1;
        }
    }
    GroupScore {
        score: apply_group_modifiers(group, raw, satiety, count),
        satiety,
    }
}

/// Sum of all group scores of a grid.
pub fn score_contest<'a>(contest: &'a Contest, grid: &Grid, scratch: &mut Scratch<'a>) -> i64 {
    contest
        .groups
        .iter()
        .zip(&grid.groups)
        .map(|(group, state)| score_group(group, &contest.catalog, state, scratch).score)
        .sum()
}

/// Exact contribution of the item at `(slot, sub)` in its full context, with its quantity
/// resolved against the untouched starting pool.
pub fn score_placement<'a>(
    group: &'a Group,
    catalog: &'a IntentCatalog,
    state: &[SlotState],
    slot: usize,
    sub: usize,
    scratch: &mut Scratch<'a>,
) -> i64 {
    if state.get(slot).and_then(|s| s.items.get(sub)).map_or(true, Option::is_none) {
        return 0;
    }
    prepare(group, state, scratch);
    let Scratch {
        slots,
        item_auras,
        intents,
        pool,
        ..
    } = scratch;
    let target = &mut slots[slot];
    let agent = target.agent.map(|_| &target.derived);
    if let Some(placed) = target.items[sub].as_mut() {
        let max = resolve_max_quantity(group, placed.item, pool, agent);
        placed.quantity = placed.quantity.min(max);
    }
    collect_intents(group, catalog, slots, intents);
    collect_item_auras(group, slots, item_auras);
    let position = ITEMS_PER_SLOT * slot + sub;
    let Some(placed) = slots[slot].items[sub] else { return 0 };
    let (total, _) = score_item(
        group,
        &slots[slot],
        sub,
        &item_auras[position],
        &intents[position],
    );
    with_activity(total, placed.item)
}

/// Scores the group and writes the clamped quantities back into `state`.
pub fn settle_quantities<'a>(
    group: &'a Group,
    catalog: &'a IntentCatalog,
    state: &mut [SlotState],
    scratch: &mut Scratch<'a>,
) -> GroupScore {
    let score = score_group(group, catalog, state, scratch);
    for (entry, slot) in state.iter_mut().zip(&scratch.slots) {
        for (pick, placed) in entry.items.iter_mut().zip(&slot.items) {
            if let (Some(pick), Some(placed)) = (pick.as_mut(), placed) {
                pick.quantity = placed.quantity;
            }
        }
    }
    score
}

fn with_activity(total: i64, item: &Item) -> i64 {
    ceil2(total as f64 * (1.0 + item.activity_addition / 100.0))
}

fn apply_price_effect(
    group: &Group,
    item: &Item,
    effect: &Effect,
    value: f64,
    count: u32,
    percent: &mut f64,
    basic: &mut Addition,
) {
    let amount = value * f64::from(count);
    match effect.kind {
        EffectKind::Price(target) if item.accepts(target) => *percent += amount,
        EffectKind::UseAll if item.rarity == effect.rarity => *percent += amount,
        EffectKind::GoldGain if group.satiety_scored() || group.modifiers.activity => {
            *percent += amount
        }
        EffectKind::BasicPrice(target) if item.accepts(target) => match effect.calc {
            Calc::Abs => basic.abs += amount,
            Calc::Percent => basic.percent += amount,
        },
        _ => {}
    }
}

fn apply_effects<'e>(
    group: &Group,
    item: &Item,
    effects: impl IntoIterator<Item = (&'e Effect, f64)>,
    ctx: &ConditionContext,
    basic: &mut Addition,
) -> f64 {
    let mut percent = 0.0;
    for (effect, value) in effects {
        if let Some(count) = check_condition(&effect.condition, ctx) {
            apply_price_effect(group, item, effect, value, count, &mut percent, basic);
        }
    }
    percent
}

fn materials_addition(item: &Item, materials: &[Material]) -> f64 {
    round2(
        item.ingredients
            .iter()
            .filter_map(|ingredient| {
                materials
                    .iter()
                    .find(|m| m.id == ingredient.material && m.addition != 0.0)
                    .map(|m| m.addition)
            })
            .sum(),
    )
}

/// Total score and satiety of the item at sub-slot `k`.
fn score_item(
    group: &Group,
    slot: &ResolvedSlot,
    k: usize,
    auras: &[AuraBonus],
    intents: &[&Intent],
) -> (i64, i64) {
    let Some(Placed { item, quantity }) = slot.items[k] else {
        return (0, 0);
    };
    let toggles = &group.toggles;
    let mut rank_percent = 0.0;
    let mut agent_percent = 0.0;
    let mut equipment_percent = 0.0;
    let mut aura_percent = 0.0;
    let mut bonus = 0.0;
    let mut basic = Addition::default();

    if let Some(agent) = slot.agent {
        let derived = &slot.derived;
        let ctx = ConditionContext {
            agent: Some(agent),
            skills: Some(&derived.skills),
            agent_items: Some(&slot.items),
            item: Some(item),
            quantity,
            group_slots: None,
        };
        if !toggles.disable_skill_rank {
            rank_percent = rank_tier(&derived.skills, item).1;
        }
        if !toggles.disable_agent_effects {
            let special = agent.special_effects.iter().map(|e| (e, e.value));
            agent_percent += apply_effects(group, item, special, &ctx, &mut basic);
            let own = derived.self_effects.iter().map(|e| (e, e.value));
            agent_percent += apply_effects(group, item, own, &ctx, &mut basic);
            for aura in auras {
                apply_price_effect(
                    group,
                    item,
                    aura.effect,
                    aura.effect.value,
                    aura.count,
                    &mut aura_percent,
                    &mut basic,
                );
            }
        }
        for effects in agent.disk.active_effects() {
            let disk = effects.iter().map(|e| (e, e.value));
            agent_percent += apply_effects(group, item, disk, &ctx, &mut basic);
        }
        if !toggles.disable_equipment_effects {
            if let Some(equipment) = &agent.equipment {
                let amplifier = derived.equipment_amplifier;
                let scaled = equipment
                    .effects
                    .iter()
                    .map(|e| (e, amplifier.map_or(e.value, |a| a.apply(e.value))));
                equipment_percent = apply_effects(group, item, scaled, &ctx, &mut basic);
            }
        }
        bonus += agent.addition;
    }

    let mut satiety = i64::from(item.rarity);
    if !intents.is_empty() {
        let intent_add: f64 = intents
            .iter()
            .filter_map(|i| match i.effect {
                IntentEffect::IntentAdd(v) => Some(v),
                _ => None,
            })
            .sum();
        let mut basic_change = Addition::default();
        let mut satiety_change = Addition::default();
        let mut price_change = 0.0;
        for intent in intents {
            let amplify = |v: f64| {
                if intent.from_buff {
                    v
                } else {
                    v * (1.0 + 0.01 * intent_add)
                }
            };
            match intent.effect {
                IntentEffect::BasicPrice(v) => basic_change.abs += amplify(v),
                IntentEffect::BasicPricePercent(v) => basic_change.percent += amplify(v),
                IntentEffect::Satiety(v) => satiety_change.abs += amplify(v),
                IntentEffect::SatietyPercent(v) => satiety_change.percent += amplify(v),
                IntentEffect::SetSatiety(v) => satiety = v as i64,
                IntentEffect::PricePercent(v) => price_change += amplify(v),
                IntentEffect::IntentAdd(_)
                | IntentEffect::CreateBuff(_)
                | IntentEffect::CreateIntent(_) => {}
            }
        }
        basic += basic_change;
        bonus += price_change / 100.0;
        satiety = satiety_change.apply(satiety as f64).ceil() as i64;
    }

    let ambient_percent = if toggles.disable_ambient_bonus {
        0.0
    } else {
        group.ambient_bonus
    };
    bonus += item.addition;
    if group.materials_bonus {
        bonus += materials_addition(item, &group.materials);
    }
    let item_percent = group.item_bonuses.get(&item.id).map_or(0.0, |v| v * 100.0);
    let tag_percent: f64 = slot.agent.map_or(0.0, |agent| {
        agent
            .tags
            .iter()
            .filter_map(|tag| group.agent_tag_bonuses.get(tag))
            .map(|v| v * 100.0)
            .sum()
    });

    let total_percent = (rank_percent
        + agent_percent
        + equipment_percent
        + ambient_percent
        + item.ultimate_addition
        + aura_percent
        + item_percent
        + tag_percent)
        / 100.0;
    let adjusted = basic.apply(item.price);
    let per_unit = ceil2(adjusted * (1.0 + total_percent + bonus));
    (per_unit * i64::from(quantity), satiety)
}

fn satiety_percent(group: &Group, satiety: i64) -> f64 {
    let rule = &group.satiety;
    if rule.exact_match_reward && satiety == rule.target {
        rule.reward_percent
    } else {
        -rule.penalty_percent * (satiety - rule.target).abs() as f64
    }
}

/// Applies the group's power, multiplier, flat add and satiety adjustment to the raw sum.
pub(crate) fn apply_group_modifiers(group: &Group, raw: i64, satiety: i64, count: usize) -> i64 {
    let modifiers = &group.modifiers;
    let multiply = if modifiers.multiply == 0.0 {
        1.0
    } else {
        modifiers.multiply
    };
    let pow = if modifiers.pow == 0.0 { 1.0 } else { modifiers.pow };
    let modified = round2((raw as f64).powf(pow) * multiply);
    let mut result = if modifiers.activity {
        modified.ceil() as i64
    } else {
        modified.floor() as i64
    };
    if result != 0 {
        result += modifiers.add;
    }
    if group.satiety_scored() && count == ITEMS_PER_SLOT * group.intents.len() {
        let percent = satiety_percent(group, satiety);
        result = ceil2(result as f64 * (1.0 + 0.01 * percent));
    }
    result
}
