use crate::{cancel::CancelToken, tables::Tables};
use ahash::RandomState;
use banquet_scoring::{
    resolve_max_quantity, score_group, AgentIdx, Grid, ItemIdx, ItemPick, Scratch, SlotState,
};
use banquet_structs::{
    config::SearchConfig,
    core::{AgentId, ItemId, ITEMS_PER_SLOT},
};
use std::collections::HashSet;

pub(crate) type IdSet<T> = HashSet<T, RandomState>;

/// Mutable search state of one thread: the working grid, per-group score cache and scratch buffers.
pub(crate) struct Worker<'a> {
    pub tables: &'a Tables<'a>,
    pub config: &'a SearchConfig,
    pub cancel: &'a CancelToken,
    pub grid: Grid,
    pub best: Grid,
    pub best_score: i64,
    dirty: Vec<bool>,
    cache: Vec<i64>,
    scratch: Scratch<'a>,
}

impl<'a> Worker<'a> {
    pub fn new(tables: &'a Tables<'a>, config: &'a SearchConfig, cancel: &'a CancelToken) -> Self {
        let groups = tables.groups.len();
        let grid = Grid::empty(tables.contest);
        Self {
            tables,
            config,
            cancel,
            best: grid.clone(),
            grid,
            best_score: 0,
            dirty: vec![true; groups],
            cache: vec![0; groups],
            scratch: Scratch::new(),
        }
    }

    pub fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn group_count(&self) -> usize {
        self.grid.groups.len()
    }

    pub fn slot_count(&self, g: usize) -> usize {
        self.grid.groups[g].len()
    }

    pub fn slot(&self, g: usize, s: usize) -> SlotState {
        self.grid.groups[g][s]
    }

    pub fn reset(&mut self) {
        self.set_grid(Grid::empty(self.tables.contest));
    }

    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.dirty.iter_mut().for_each(|d| *d = true);
    }

    pub fn restore_best(&mut self) {
        self.set_grid(self.best.clone());
    }

    /// Starts a fresh search around `seed`, which becomes the best known grid.
    pub fn adopt(&mut self, seed: Grid) {
        self.set_grid(seed);
        self.best_score = self.total_score();
        self.best = self.grid.clone();
    }

    pub fn mark_dirty(&mut self, g: usize) {
        self.dirty[g] = true;
    }

    /// Replaces a slot wholesale, as when rolling back a rejected move.
    pub fn put_slot(&mut self, g: usize, s: usize, slot: SlotState) {
        self.mark_dirty(g);
        self.grid.groups[g][s] = slot;
    }

    pub fn clear_slot(&mut self, g: usize, s: usize) {
        self.put_slot(g, s, SlotState::default());
    }

    /// Quantities are left as they are.
    pub fn set_agent(&mut self, g: usize, s: usize, agent: Option<AgentIdx>) {
        self.mark_dirty(g);
        self.grid.groups[g][s].agent = agent;
    }

    /// Places an item at its maximum quantity for the slot's current agent and the starting pool.
    pub fn set_item(&mut self, g: usize, s: usize, k: usize, item: Option<ItemIdx>) {
        self.mark_dirty(g);
        let agent = self.grid.groups[g][s].agent;
        let pick = item.map(|item| ItemPick {
            item,
            quantity: self.quantity_for(g, agent, item),
        });
        self.grid.groups[g][s].items[k] = pick;
    }

    /// Re-resolves every item quantity of the slot for its current agent.
    pub fn requantify(&mut self, g: usize, s: usize) {
        for k in 0..ITEMS_PER_SLOT {
            if let Some(pick) = self.slot(g, s).items[k] {
                self.set_item(g, s, k, Some(pick.item));
            }
        }
    }

    pub fn quantity_for(&self, g: usize, agent: Option<AgentIdx>, item: ItemIdx) -> u32 {
        let tables = &self.tables.groups[g];
        let derived = agent.and_then(|a| tables.baselines.get(a.get()));
        match tables.group.items.get(item.get()) {
            Some(item) => resolve_max_quantity(tables.group, item, &tables.start_pool, derived),
            None => 0,
        }
    }

    /// An empty agent can take any item.
    pub fn can_perform(&self, g: usize, agent: Option<AgentIdx>, item: ItemIdx) -> bool {
        let tables = &self.tables.groups[g];
        match (agent, tables.group.items.get(item.get())) {
            (Some(agent), Some(item)) => tables
                .baselines
                .get(agent.get())
                .map_or(false, |derived| derived.can_perform(item)),
            _ => true,
        }
    }

    pub fn scratch(&mut self) -> &mut Scratch<'a> {
        &mut self.scratch
    }

    pub fn group_score(&mut self, g: usize) -> i64 {
        if self.dirty[g] {
            let tables = self.tables;
            self.cache[g] = score_group(
                tables.groups[g].group,
                tables.catalog(),
                &self.grid.groups[g],
                &mut self.scratch,
            )
            .score;
            self.dirty[g] = false;
        }
        self.cache[g]
    }

    pub fn total_score(&mut self) -> i64 {
        (0..self.group_count()).map(|g| self.group_score(g)).sum()
    }

    /// Keeps the working grid as the new best when it strictly improves on it.
    pub fn record_if_better(&mut self) -> bool {
        let total = self.total_score();
        if total > self.best_score {
            self.best_score = total;
            self.best = self.grid.clone();
            true
        } else {
            false
        }
    }

    /// Agents assigned anywhere in the contest, except at `(g, s)`.
    pub fn used_agents(&self, g: usize, s: usize) -> IdSet<AgentId> {
        let mut used = IdSet::default();
        for (gi, state) in self.grid.groups.iter().enumerate() {
            for (si, slot) in state.iter().enumerate() {
                if (gi, si) == (g, s) {
                    continue;
                }
                if let Some(agent) = slot.agent {
                    used.insert(self.tables.agent_id(gi, agent.get()));
                }
            }
        }
        used
    }

    /// Items assigned anywhere in the contest, except at `(g, s, k)`.
    pub fn used_items(&self, g: usize, s: usize, k: usize) -> IdSet<ItemId> {
        let mut used = IdSet::default();
        for (gi, state) in self.grid.groups.iter().enumerate() {
            for (si, slot) in state.iter().enumerate() {
                for (ki, pick) in slot.items.iter().enumerate() {
                    if (gi, si, ki) == (g, s, k) {
                        continue;
                    }
                    if let Some(pick) = pick {
                        used.insert(self.tables.item_id(gi, pick.item.get()));
                    }
                }
            }
        }
        used
    }
}
