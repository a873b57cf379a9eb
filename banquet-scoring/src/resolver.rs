use crate::derive::DerivedAgent;
use banquet_structs::core::{Group, Item, Material, MaterialId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PoolEntry {
    id: MaterialId,
    /// `None` is an unlimited supply.
    remaining: Option<i64>,
}

/// Remaining material supply of one group while its slots are resolved in order.
#[derive(Clone, Debug, Default)]
pub struct MaterialPool {
    entries: Vec<PoolEntry>,
}

impl MaterialPool {
    pub fn new(materials: &[Material]) -> Self {
        let mut pool = Self::default();
        pool.reset(materials);
        pool
    }

    /// Refills the pool to the starting supply, reusing the allocation.
    pub fn reset(&mut self, materials: &[Material]) {
        self.entries.clear();
        self.entries.extend(materials.iter().map(|m| PoolEntry {
            id: m.id,
            remaining: m.quantity.map(i64::from),
        }));
    }

    /// `None` when the material is not in the pool, `Some(None)` when unlimited.
    pub fn remaining(&self, id: MaterialId) -> Option<Option<i64>> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.remaining)
    }

    fn entry_mut(&mut self, id: MaterialId) -> Option<&mut PoolEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

/// Per-use amount of a material after the agent's reductions, never below 1.
pub fn effective_requirement(agent: Option<&DerivedAgent>, material: MaterialId, amount: u32) -> i64 {
    let amount = i64::from(amount);
    let reduced = match agent {
        Some(agent) if !agent.reductions.is_empty() => {
            agent.reduction_for(material).reduce(amount as f64).ceil() as i64
        }
        _ => amount,
    };
    reduced.max(1)
}

/// Largest quantity of `item` the pool and the agent's limit allow right now.
pub fn resolve_max_quantity(
    group: &Group,
    item: &Item,
    pool: &MaterialPool,
    agent: Option<&DerivedAgent>,
) -> u32 {
    let mut limit = if group.toggles.disable_multi_quantity {
        1
    } else {
        i64::from(item.limit) + agent.map_or(0, |a| i64::from(a.limit_bonus(item.rarity)))
    };
    for ingredient in &item.ingredients {
        match pool.remaining(ingredient.material) {
            None => return 0,
            Some(None) => {}
            Some(Some(remaining)) => {
                if remaining <= 0 {
                    return 0;
                }
                let requirement = effective_requirement(agent, ingredient.material, ingredient.amount);
                limit = limit.min(remaining / requirement);
            }
        }
    }
    limit.clamp(0, i64::from(u32::MAX)) as u32
}

/// Takes `quantity` uses of `item` out of the pool. Unlimited and exhausted materials are untouched.
pub fn consume(pool: &mut MaterialPool, item: &Item, quantity: u32, agent: Option<&DerivedAgent>) {
    for ingredient in &item.ingredients {
        let requirement = effective_requirement(agent, ingredient.material, ingredient.amount);
        if let Some(entry) = pool.entry_mut(ingredient.material) {
            if let Some(remaining) = entry.remaining.as_mut() {
                if *remaining > 0 {
                    *remaining -= requirement * i64::from(quantity);
                }
            }
        }
    }
}
