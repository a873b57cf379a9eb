use crate::conditions::{check_condition, ConditionContext};
use banquet_structs::core::{
    Agent, Calc, Effect, EffectKind, Group, Item, MaterialId, Scope, Skill, SKILL_COUNT,
};
use banquet_utils::Addition;

/// An agent's capabilities after every skill effect of its group context has been folded in.
#[derive(Clone, Debug, Default)]
pub struct DerivedAgent<'a> {
    pub skills: [f64; SKILL_COUNT],
    /// Group-specific effects of this agent, also used when pricing its items.
    pub self_effects: &'a [Effect],
    /// `(rarity, extra uses)` pairs.
    pub limit_bonuses: Vec<(u32, u32)>,
    pub reductions: Vec<(&'a Effect, f64)>,
    pub equipment_amplifier: Option<Addition>,
}

impl<'a> DerivedAgent<'a> {
    pub fn reset(&mut self) {
        self.skills = [0.0; SKILL_COUNT];
        self.self_effects = &[];
        self.limit_bonuses.clear();
        self.reductions.clear();
        self.equipment_amplifier = None;
    }

    pub fn limit_bonus(&self, rarity: u32) -> u32 {
        self.limit_bonuses
            .iter()
            .filter(|(r, _)| *r == rarity)
            .map(|(_, v)| *v)
            .sum()
    }

    /// Combined reduction for one material, accumulated with two-decimal rounding.
    pub fn reduction_for(&self, material: MaterialId) -> Addition {
        let mut total = Addition::default();
        for (effect, value) in &self.reductions {
            if effect.reduced_materials().contains(&material) {
                push(&mut total, effect.calc, *value);
            }
        }
        total
    }

    pub fn can_perform(&self, item: &Item) -> bool {
        agent_can_perform(&self.skills, item)
    }
}

fn push(addition: &mut Addition, calc: Calc, value: f64) {
    match calc {
        Calc::Abs => addition.push_abs_rounded(value),
        Calc::Percent => addition.push_percent_rounded(value),
    }
}

/// Rank of an item for the given capabilities, with its price bonus in percent.
pub fn rank_tier(skills: &[f64; SKILL_COUNT], item: &Item) -> (u32, f64) {
    let ratio = Skill::ALL
        .iter()
        .filter(|skill| item.requirements[skill.index()] > 0)
        .map(|skill| skills[skill.index()] / f64::from(item.requirements[skill.index()]))
        .fold(f64::INFINITY, f64::min);
    if ratio.is_infinite() {
        return (0, 0.0);
    }
    match ratio {
        r if r >= 5.0 => (5, 100.0),
        r if r >= 4.0 => (4, 50.0),
        r if r >= 3.0 => (3, 30.0),
        r if r >= 2.0 => (2, 10.0),
        r if r >= 1.0 => (1, 0.0),
        _ => (0, 0.0),
    }
}

pub fn agent_can_perform(skills: &[f64; SKILL_COUNT], item: &Item) -> bool {
    Skill::ALL
        .iter()
        .all(|skill| skills[skill.index()] >= f64::from(item.requirements[skill.index()]))
}

/// Equipment scaling carried by an agent's group-specific effects, first one wins.
pub fn equipment_amplifier(self_effects: &[Effect]) -> Option<Addition> {
    self_effects
        .iter()
        .find(|e| e.kind == EffectKind::EquipmentAmplifier)
        .map(|e| {
            let mut amplifier = Addition::default();
            push(&mut amplifier, e.calc, e.value);
            amplifier
        })
}

struct Accumulator<'o, 'a> {
    agent: &'a Agent,
    skills: [Addition; SKILL_COUNT],
    out: &'o mut DerivedAgent<'a>,
}

impl<'o, 'a> Accumulator<'o, 'a> {
    fn apply(&mut self, effect: &'a Effect, value: f64) {
        if let Some(tag) = effect.tag {
            if !self.agent.has_tag(tag) {
                return;
            }
        }
        let scoped = matches!(effect.scope, Scope::Own | Scope::Partial);
        match effect.kind {
            EffectKind::Skill(skill) => push(&mut self.skills[skill.index()], effect.calc, value),
            EffectKind::MaxLimit if scoped => {
                self.out.limit_bonuses.push((effect.rarity, value as u32))
            }
            EffectKind::MaterialReduce if scoped => self.out.reductions.push((effect, value)),
            _ => {}
        }
    }

    fn apply_all(&mut self, effects: &'a [Effect]) {
        for effect in effects {
            self.apply(effect, effect.value);
        }
    }
}

/// Computes an agent's effective capabilities inside `group`.
///
/// `auras` are capability effects other agents project onto this slot; each is applied
/// only when its condition holds for the receiving agent alone.
pub fn derive_agent<'a>(
    group: &'a Group,
    agent: &'a Agent,
    auras: &[&'a Effect],
    out: &mut DerivedAgent<'a>,
) {
    out.reset();
    let mut acc = Accumulator {
        agent,
        skills: [Addition::default(); SKILL_COUNT],
        out,
    };
    if !group.toggles.disable_agent_effects {
        acc.apply_all(&agent.special_effects);
        acc.apply_all(&group.global_effects);
        let self_effects = group.self_effects_of(agent.id);
        acc.out.self_effects = self_effects;
        acc.apply_all(self_effects);
        let ctx = ConditionContext::agent_only(agent);
        for aura in auras {
            if check_condition(&aura.condition, &ctx).is_some() {
                acc.apply(aura, aura.value);
            }
        }
    }
    let amplifier = equipment_amplifier(acc.out.self_effects);
    acc.out.equipment_amplifier = amplifier;
    if !group.toggles.disable_equipment_effects {
        if let Some(equipment) = &agent.equipment {
            for effect in &equipment.effects {
                let value = amplifier.map_or(effect.value, |a| a.apply(effect.value));
                acc.apply(effect, value);
            }
        }
    }
    for effects in agent.disk.active_effects() {
        acc.apply_all(effects);
    }
    for tag in &agent.tags {
        if let Some(bonus) = group.tag_skill_bonuses.get(tag) {
            for (addition, value) in acc.skills.iter_mut().zip(bonus) {
                addition.abs += value;
            }
        }
    }
    let Accumulator { skills, out, .. } = acc;
    for skill in Skill::ALL {
        let i = skill.index();
        out.skills[i] = skills[i].apply(f64::from(agent.skills[i])).ceil();
    }
}

/// Derivation without any auras, as used for capability checks during search.
pub fn baseline<'a>(group: &'a Group, agent: &'a Agent) -> DerivedAgent<'a> {
    let mut out = DerivedAgent::default();
    derive_agent(group, agent, &[], &mut out);
    out
}
