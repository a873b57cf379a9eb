use crate::{
    conditions::{check_condition, ConditionContext},
    score::ResolvedSlot,
};
use banquet_structs::core::{Effect, Group, Scope, ITEMS_PER_SLOT};

#[derive(Clone, Copy, Debug)]
pub(crate) struct AuraBonus<'a> {
    pub effect: &'a Effect,
    pub count: u32,
}

fn reset<T>(out: &mut Vec<Vec<T>>, len: usize) {
    out.resize_with(len.max(out.len()), Vec::new);
    out.truncate(len);
    for entry in out.iter_mut() {
        entry.clear();
    }
}

/// Capability effects each slot receives from aura agents elsewhere in the group.
pub(crate) fn collect_agent_auras<'a>(
    group: &'a Group,
    slots: &[ResolvedSlot<'a>],
    out: &mut Vec<Vec<&'a Effect>>,
) {
    let rounds = slots.len();
    reset(out, rounds);
    for (n, slot) in slots.iter().enumerate() {
        let Some(agent) = slot.agent else { continue };
        if !group.aura_agents.contains(&agent.id) {
            continue;
        }
        for effect in agent.ultimate_effects.iter().filter(|e| e.kind.modifies_agent()) {
            match effect.scope {
                Scope::Partial => {
                    let start = if group.satiety_scored() { n } else { 0 };
                    for receiver in &mut out[start..rounds] {
                        receiver.push(effect);
                    }
                }
                Scope::Next if n + 1 < rounds => out[n + 1].push(effect),
                _ => {}
            }
        }
    }
}

/// Price effects each item position receives from aura agents, flattened as `3 * slot + sub`.
pub(crate) fn collect_item_auras<'a>(
    group: &'a Group,
    slots: &[ResolvedSlot<'a>],
    out: &mut Vec<Vec<AuraBonus<'a>>>,
) {
    let positions = ITEMS_PER_SLOT * slots.len();
    reset(out, positions);
    let satiety = group.satiety_scored();
    for (n, source) in slots.iter().enumerate() {
        let Some(agent) = source.agent else { continue };
        if !group.aura_agents.contains(&agent.id) {
            continue;
        }
        for effect in agent.ultimate_effects.iter().filter(|e| !e.kind.modifies_agent()) {
            match effect.scope {
                Scope::Partial if effect.condition.checked_per_target() => {
                    for (c, target) in slots.iter().enumerate() {
                        if satiety && c < n {
                            continue;
                        }
                        for (d, placed) in target.items.iter().enumerate() {
                            let ctx = ConditionContext {
                                agent: target.agent,
                                skills: target.agent.map(|_| &target.derived.skills),
                                item: placed.map(|p| p.item),
                                quantity: placed.map_or(0, |p| p.quantity),
                                ..Default::default()
                            };
                            if let Some(count) = check_condition(&effect.condition, &ctx) {
                                out[ITEMS_PER_SLOT * c + d].push(AuraBonus { effect, count });
                            }
                        }
                    }
                }
                Scope::Partial => {
                    let ctx = ConditionContext {
                        agent: Some(agent),
                        skills: Some(&source.derived.skills),
                        agent_items: Some(&source.items),
                        group_slots: Some(slots),
                        ..Default::default()
                    };
                    if let Some(count) = check_condition(&effect.condition, &ctx) {
                        let start = if satiety { ITEMS_PER_SLOT * n } else { 0 };
                        for receiver in &mut out[start..positions] {
                            receiver.push(AuraBonus { effect, count });
                        }
                    }
                }
                Scope::Next if n + 1 < slots.len() => {
                    let ctx = ConditionContext {
                        agent: Some(agent),
                        skills: Some(&source.derived.skills),
                        agent_items: Some(&source.items),
                        ..Default::default()
                    };
                    if let Some(count) = check_condition(&effect.condition, &ctx) {
                        let start = ITEMS_PER_SLOT * (n + 1);
                        for receiver in &mut out[start..start + ITEMS_PER_SLOT] {
                            receiver.push(AuraBonus { effect, count });
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
