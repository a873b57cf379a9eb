use crate::serializable_struct;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type AgentId = u32;
pub type ItemId = u32;
pub type MaterialId = u32;
pub type IntentId = u32;
pub type TagId = u32;

pub const SKILL_COUNT: usize = 6;
pub const ITEMS_PER_SLOT: usize = 3;
pub const DEFAULT_SLOT_COUNT: usize = 3;

/// Levels or requirements ordered as `Skill::ALL`.
pub type SkillLevels = [u32; SKILL_COUNT];

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    Stirfry,
    Boil,
    Knife,
    Fry,
    Bake,
    Steam,
}

impl Skill {
    pub const ALL: [Skill; SKILL_COUNT] = [
        Skill::Stirfry,
        Skill::Boil,
        Skill::Knife,
        Skill::Fry,
        Skill::Bake,
        Skill::Steam,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum Flavor {
    Sweet,
    Sour,
    Spicy,
    Salty,
    Bitter,
    Tasty,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum MaterialCategory {
    Fish,
    Creation,
    Meat,
    Vegetable,
}

/// What a price effect can be keyed on. Each target owns one bit of `Item::targets`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum PriceTarget {
    Any,
    Skill(Skill),
    Flavor(Flavor),
    Category(MaterialCategory),
}

impl PriceTarget {
    pub fn bit(self) -> u32 {
        let index = match self {
            PriceTarget::Any => 0,
            PriceTarget::Skill(skill) => 1 + skill as u32,
            PriceTarget::Flavor(flavor) => 7 + flavor as u32,
            PriceTarget::Category(category) => 13 + category as u32,
        };
        1 << index
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    /// Raises one capability dimension of the agent.
    Skill(Skill),
    /// Raises the repeat limit of items whose rarity matches `Effect::rarity`.
    MaxLimit,
    /// Lowers the per-use amount of the materials listed in the condition.
    MaterialReduce,
    /// Scales the values of the agent's equipment effects.
    EquipmentAmplifier,
    Price(PriceTarget),
    BasicPrice(PriceTarget),
    /// Price bonus for items of exactly `Effect::rarity`.
    UseAll,
    /// Price bonus that only counts in satiety or activity groups.
    GoldGain,
}

impl EffectKind {
    /// Effects that feed agent derivation rather than item pricing.
    pub fn modifies_agent(self) -> bool {
        matches!(
            self,
            EffectKind::Skill(_) | EffectKind::MaxLimit | EffectKind::MaterialReduce
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Calc {
    #[default]
    Abs,
    Percent,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    #[default]
    #[serde(rename = "self")]
    Own,
    /// Applies to other slots of the group.
    Partial,
    /// Applies to the following slot only.
    Next,
    Global,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Condition {
    #[default]
    Always,
    Rank(u32),
    PerRank(u32),
    QuantityAtLeast(u32),
    QuantityAtMost(u32),
    ItemRarity(Vec<u32>),
    AgentTag(Vec<TagId>),
    ItemTag(Vec<TagId>),
    SameSkill,
    PerSkill(Skill),
    /// Carries the targets of a material reduction and always passes.
    Materials(Vec<MaterialId>),
    SwordsUnited,
}

impl Condition {
    /// Aura conditions checked against every receiving item rather than once against the source agent.
    pub fn checked_per_target(&self) -> bool {
        !matches!(
            self,
            Condition::Always | Condition::PerRank(_) | Condition::SameSkill | Condition::PerSkill(_)
        )
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    #[serde(default)]
    pub calc: Calc,
    pub value: f64,
    #[serde(default)]
    pub rarity: u32,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub tag: Option<TagId>,
}

impl Effect {
    pub fn new(kind: EffectKind, calc: Calc, value: f64) -> Self {
        Self {
            kind,
            calc,
            value,
            rarity: 0,
            scope: Scope::Own,
            condition: Condition::Always,
            tag: None,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn with_rarity(mut self, rarity: u32) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn reduced_materials(&self) -> &[MaterialId] {
        match &self.condition {
            Condition::Materials(ids) => ids,
            _ => &[],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum IntentCondition {
    Always,
    Rank(u32),
    Flavor(Flavor),
    Skill(Skill),
    Rarity(u32),
    /// 1-based position of the item within its slot.
    Order(u32),
    /// All three items of the slot use the skill.
    Group(Skill),
    AgentRarity(u32),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum IntentEffect {
    BasicPrice(f64),
    BasicPricePercent(f64),
    Satiety(f64),
    SatietyPercent(f64),
    SetSatiety(f64),
    PricePercent(f64),
    IntentAdd(f64),
    CreateBuff(IntentId),
    CreateIntent(IntentId),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Intent {
    pub id: IntentId,
    pub condition: IntentCondition,
    pub effect: IntentEffect,
    /// Buffs are never amplified by intent-add effects.
    #[serde(default)]
    pub from_buff: bool,
    #[serde(default)]
    pub last_rounds: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IntentCatalog {
    #[serde(default)]
    pub intents: BTreeMap<IntentId, Intent>,
    #[serde(default)]
    pub buffs: BTreeMap<IntentId, Intent>,
}

impl IntentCatalog {
    pub fn intent(&self, id: IntentId) -> Option<&Intent> {
        self.intents.get(&id)
    }

    pub fn buff(&self, id: IntentId) -> Option<&Intent> {
        self.buffs.get(&id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Equipment {
    pub id: u32,
    pub effects: Vec<Effect>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DiskSocket {
    /// One effect list per disk level, starting at level 1.
    pub levels: Vec<Vec<Effect>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Disk {
    pub level: u32,
    pub sockets: Vec<DiskSocket>,
}

impl Disk {
    pub fn active_effects(&self) -> impl Iterator<Item = &[Effect]> + '_ {
        let level = self.level as usize;
        self.sockets.iter().filter_map(move |socket| {
            if level == 0 {
                None
            } else {
                socket.levels.get(level - 1).map(Vec::as_slice)
            }
        })
    }
}

fn owned_by_default() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Agent {
    pub id: AgentId,
    #[serde(default)]
    pub name: String,
    pub rarity: u32,
    /// Fraction added to the price multiplier of every item the agent handles.
    #[serde(default)]
    pub addition: f64,
    pub skills: SkillLevels,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub special_effects: Vec<Effect>,
    #[serde(default)]
    pub ultimate_effects: Vec<Effect>,
    #[serde(default)]
    pub equipment: Option<Equipment>,
    #[serde(default)]
    pub disk: Disk,
    #[serde(default = "owned_by_default")]
    pub owned: bool,
}

impl Agent {
    pub fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }
}

serializable_struct! {
    Ingredient {
        material: MaterialId,
        amount: u32,
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub rarity: u32,
    pub price: f64,
    pub requirements: SkillLevels,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub flavor: Option<Flavor>,
    #[serde(default)]
    pub tags: Vec<TagId>,
    pub limit: u32,
    #[serde(default)]
    pub addition: f64,
    #[serde(default)]
    pub activity_addition: f64,
    #[serde(default)]
    pub ultimate_addition: f64,
    #[serde(default = "owned_by_default")]
    pub owned: bool,
    /// `PriceTarget` bits this item can ever receive. Filled by `Group::prepare`.
    #[serde(skip)]
    pub targets: u32,
}

impl Item {
    pub fn uses_skill(&self, skill: Skill) -> bool {
        self.requirements[skill.index()] > 0
    }

    pub fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }

    pub fn accepts(&self, target: PriceTarget) -> bool {
        self.targets & target.bit() != 0
    }

    pub fn compute_targets(&self, materials: &[Material]) -> u32 {
        let mut targets = PriceTarget::Any.bit();
        for skill in Skill::ALL {
            if self.uses_skill(skill) {
                targets |= PriceTarget::Skill(skill).bit();
            }
        }
        if let Some(flavor) = self.flavor {
            targets |= PriceTarget::Flavor(flavor).bit();
        }
        for ingredient in &self.ingredients {
            if let Some(category) = materials
                .iter()
                .find(|m| m.id == ingredient.material)
                .and_then(|m| m.category)
            {
                targets |= PriceTarget::Category(category).bit();
            }
        }
        targets
    }
}

serializable_struct! {
    Material {
        id: MaterialId,
        /// `None` is an unlimited supply.
        quantity: Option<u32>,
        category: Option<MaterialCategory>,
        #[serde(default)]
        addition: f64,
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ScoreModifiers {
    /// Treated as 1 when 0.
    pub multiply: f64,
    /// Treated as 1 when 0.
    pub pow: f64,
    pub add: i64,
    /// Round the modified score up instead of down.
    pub activity: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SatietyRule {
    /// 0 disables satiety scoring for the group.
    pub target: i64,
    pub exact_match_reward: bool,
    pub reward_percent: f64,
    pub penalty_percent: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RuleToggles {
    pub disable_multi_quantity: bool,
    pub disable_skill_rank: bool,
    pub disable_agent_effects: bool,
    pub disable_equipment_effects: bool,
    pub disable_ambient_bonus: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Group {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub satiety: SatietyRule,
    /// Intent ids required at each slot position.
    #[serde(default)]
    pub intents: Vec<Vec<IntentId>>,
    #[serde(default)]
    pub global_buffs: Vec<IntentId>,
    #[serde(default)]
    pub modifiers: ScoreModifiers,
    #[serde(default)]
    pub toggles: RuleToggles,
    #[serde(default)]
    pub ambient_bonus: f64,
    #[serde(default)]
    pub materials_bonus: bool,
    #[serde(default)]
    pub item_bonuses: BTreeMap<ItemId, f64>,
    #[serde(default)]
    pub agent_tag_bonuses: BTreeMap<TagId, f64>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub global_effects: Vec<Effect>,
    #[serde(default)]
    pub self_effects: BTreeMap<AgentId, Vec<Effect>>,
    #[serde(default)]
    pub aura_agents: BTreeSet<AgentId>,
    #[serde(default)]
    pub tag_skill_bonuses: BTreeMap<TagId, [f64; SKILL_COUNT]>,
    #[serde(default)]
    pub agents: Vec<Agent>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Group {
    pub fn satiety_scored(&self) -> bool {
        self.satiety.target != 0
    }

    /// One slot per intent position in satiety-scored groups, otherwise the default three.
    /// Intent lists on groups without a satiety target do not add slots.
    pub fn slot_count(&self) -> usize {
        if !self.satiety_scored() || self.intents.is_empty() {
            DEFAULT_SLOT_COUNT
        } else {
            self.intents.len()
        }
    }

    pub fn self_effects_of(&self, agent: AgentId) -> &[Effect] {
        self.self_effects
            .get(&agent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn agent_position(&self, id: AgentId) -> Option<usize> {
        self.agents.iter().position(|a| a.id == id)
    }

    pub fn item_position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    pub fn prepare(&mut self) {
        let materials = &self.materials;
        for item in self.items.iter_mut() {
            item.targets = item.compute_targets(materials);
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for agent in &self.agents {
            ensure!(
                seen.insert(agent.id),
                "Group '{}' lists agent {} twice",
                self.name,
                agent.id
            );
        }
        seen.clear();
        for item in &self.items {
            ensure!(
                seen.insert(item.id),
                "Group '{}' lists item {} twice",
                self.name,
                item.id
            );
        }
        seen.clear();
        for material in &self.materials {
            ensure!(
                seen.insert(material.id),
                "Group '{}' lists material {} twice",
                self.name,
                material.id
            );
        }
        ensure!(
            self.modifiers.pow >= 0.0,
            "Group '{}' has a negative score power",
            self.name
        );
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Contest {
    pub groups: Vec<Group>,
    #[serde(default)]
    pub catalog: IntentCatalog,
}

impl Contest {
    /// Computes the derived lookup data every group needs before scoring.
    pub fn prepare(&mut self) {
        for group in self.groups.iter_mut() {
            group.prepare();
        }
    }

    pub fn validate(&self) -> Result<()> {
        for group in &self.groups {
            group.validate()?;
        }
        Ok(())
    }
}
