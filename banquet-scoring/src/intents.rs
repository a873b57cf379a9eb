use crate::{derive::rank_tier, score::ResolvedSlot};
use banquet_structs::core::{Group, Intent, IntentCatalog, IntentCondition, IntentEffect, ITEMS_PER_SLOT};

/// Whether `intent` holds for sub-slot `sub` of `slot`. Slot-wide conditions ignore `sub`.
pub(crate) fn check_intent(intent: &Intent, slot: &ResolvedSlot, sub: Option<usize>) -> bool {
    match intent.condition {
        IntentCondition::Group(skill) => slot
            .items
            .iter()
            .all(|p| p.map_or(false, |p| p.item.uses_skill(skill))),
        IntentCondition::AgentRarity(rarity) => slot.agent.map_or(false, |a| a.rarity == rarity),
        condition => {
            let Some((sub, placed)) = sub.and_then(|s| slot.items.get(s).copied().flatten().map(|p| (s, p)))
            else {
                return false;
            };
            match condition {
                IntentCondition::Rank(min) => {
                    slot.agent.is_some() && rank_tier(&slot.derived.skills, placed.item).0 >= min
                }
                IntentCondition::Flavor(flavor) => placed.item.flavor == Some(flavor),
                IntentCondition::Skill(skill) => placed.item.uses_skill(skill),
                IntentCondition::Rarity(rarity) => placed.item.rarity == rarity,
                IntentCondition::Order(order) => sub as u32 + 1 == order,
                IntentCondition::Always => true,
                IntentCondition::Group(_) | IntentCondition::AgentRarity(_) => false,
            }
        }
    }
}

/// Intents and buffs landing on every item position, flattened as `3 * slot + sub`.
pub(crate) fn collect_intents<'a>(
    group: &Group,
    catalog: &'a IntentCatalog,
    slots: &[ResolvedSlot],
    out: &mut Vec<Vec<&'a Intent>>,
) {
    let positions = ITEMS_PER_SLOT * slots.len();
    out.resize_with(positions.max(out.len()), Vec::new);
    out.truncate(positions);
    for entry in out.iter_mut() {
        entry.clear();
    }
    if !group.satiety_scored() {
        return;
    }

    for buff in group.global_buffs.iter().filter_map(|id| catalog.buff(*id)) {
        for (o, slot) in slots.iter().enumerate() {
            for p in 0..ITEMS_PER_SLOT {
                if slot.items[p].is_some() && check_intent(buff, slot, Some(p)) {
                    out[ITEMS_PER_SLOT * o + p].push(buff);
                }
            }
        }
    }

    let rounds = group.intents.len().min(slots.len());
    for c in 0..rounds {
        let slot = &slots[c];
        for intent in group.intents[c].iter().filter_map(|id| catalog.intent(*id)) {
            let matched = match intent.condition {
                IntentCondition::Group(_) => check_intent(intent, slot, None).then_some(0),
                _ => (0..ITEMS_PER_SLOT)
                    .find(|&o| slot.items[o].is_some() && check_intent(intent, slot, Some(o))),
            };
            let Some(m) = matched else { continue };
            match intent.effect {
                IntentEffect::CreateBuff(buff_id) => {
                    let Some(buff) = catalog.buff(buff_id) else { continue };
                    for p in 1..=buff.last_rounds as usize {
                        let target = c + p;
                        if target >= rounds {
                            break;
                        }
                        for k in 0..ITEMS_PER_SLOT {
                            if check_intent(buff, &slots[target], Some(k)) {
                                out[ITEMS_PER_SLOT * target + k].push(buff);
                            }
                        }
                    }
                }
                IntentEffect::CreateIntent(child_id) if m + 1 < ITEMS_PER_SLOT => {
                    let Some(child) = catalog.intent(child_id) else { continue };
                    if check_intent(child, slot, Some(m + 1)) {
                        out[ITEMS_PER_SLOT * c + m + 1].push(child);
                    }
                }
                _ => {
                    if check_intent(intent, slot, Some(m)) {
                        out[ITEMS_PER_SLOT * c + m].push(intent);
                    }
                }
            }
        }
    }
}
