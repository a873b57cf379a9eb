use crate::worker::Worker;
use banquet_scoring::{AgentIdx, Grid, ItemIdx};
use banquet_structs::core::ITEMS_PER_SLOT;

/// Fraction of the best total a cross-group candidate must reach before it is refined.
const PRUNE_RATIO: f64 = 0.9;
const CROSS_GROUP_ITEMS: usize = 5;
const CROSS_GROUP_ROUNDS: usize = 2;
const JOINT_AGENT_TRIES: usize = 3;
const JOINT_REFINE_PASSES: usize = 2;

impl<'a> Worker<'a> {
    fn all_groups(&self) -> Vec<usize> {
        (0..self.group_count()).collect()
    }

    fn prune_floor(&self) -> i64 {
        (self.best_score as f64 * PRUNE_RATIO) as i64
    }

    fn translate_agent(&self, from: usize, agent: AgentIdx, to: usize) -> Option<AgentIdx> {
        let id = self.tables.agent_id(from, agent.get());
        self.tables.groups[to]
            .group
            .agent_position(id)
            .map(AgentIdx::new)
    }

    fn translate_item(&self, from: usize, item: ItemIdx, to: usize) -> Option<ItemIdx> {
        let id = self.tables.item_id(from, item.get());
        self.tables.groups[to]
            .group
            .item_position(id)
            .map(ItemIdx::new)
    }

    /// Moves each slot to its best-ranked free agent when that raises the group score.
    pub fn climb_agents(&mut self) -> bool {
        let mut improved = false;
        for g in 0..self.group_count() {
            for s in 0..self.slot_count(g) {
                if self.cancelled() {
                    return improved;
                }
                let current = self.slot(g, s).agent;
                let used = self.used_agents(g, s);
                let baseline = self.group_score(g);
                let ranking = self.rank_agents(g, s);
                let Some(candidate) = ranking.into_iter().find(|r| {
                    r.capable
                        && Some(r.idx) != current
                        && !used.contains(&self.tables.agent_id(g, r.idx.get()))
                }) else {
                    continue;
                };
                if candidate.score <= baseline {
                    continue;
                }
                self.set_agent(g, s, Some(candidate.idx));
                if self.record_if_better() {
                    improved = true;
                } else {
                    self.set_agent(g, s, current);
                }
            }
        }
        improved
    }

    /// Exchanges the agents of every pair of occupied slots, across groups by identity.
    pub fn swap_agents(&mut self) -> bool {
        let mut improved = false;
        let positions: Vec<(usize, usize)> = (0..self.group_count())
            .flat_map(|g| (0..self.slot_count(g)).map(move |s| (g, s)))
            .filter(|&(g, s)| self.slot(g, s).agent.is_some())
            .collect();
        for (i, &(g1, s1)) in positions.iter().enumerate() {
            for &(g2, s2) in &positions[i + 1..] {
                if self.cancelled() {
                    return improved;
                }
                let (first, second) = (self.slot(g1, s1), self.slot(g2, s2));
                let (Some(a1), Some(a2)) = (first.agent, second.agent) else {
                    continue;
                };
                let (Some(into_first), Some(into_second)) = (
                    self.translate_agent(g2, a2, g1),
                    self.translate_agent(g1, a1, g2),
                ) else {
                    continue;
                };
                let fits = first
                    .item_indices()
                    .all(|item| self.can_perform(g1, Some(into_first), item))
                    && second
                        .item_indices()
                        .all(|item| self.can_perform(g2, Some(into_second), item));
                if !fits {
                    continue;
                }
                self.set_agent(g1, s1, Some(into_first));
                self.set_agent(g2, s2, Some(into_second));
                self.requantify(g1, s1);
                self.requantify(g2, s2);
                if self.record_if_better() {
                    improved = true;
                } else {
                    self.put_slot(g1, s1, first);
                    self.put_slot(g2, s2, second);
                }
            }
        }
        improved
    }

    /// Tries the best alternative item for every sub-slot.
    pub fn climb_items(&mut self) -> bool {
        let mut improved = false;
        let top_k = self.config.top_recipes_considered_during_climb;
        for g in 0..self.group_count() {
            for s in 0..self.slot_count(g) {
                if self.slot(g, s).agent.is_none() {
                    continue;
                }
                for k in 0..ITEMS_PER_SLOT {
                    if self.cancelled() {
                        return improved;
                    }
                    let saved = self.slot(g, s);
                    let current = saved.items[k].map(|p| p.item);
                    let baseline = self.group_score(g);
                    let ranking = self.rank_items(g, s, k, top_k);
                    let Some(candidate) = ranking.into_iter().find(|r| Some(r.idx) != current)
                    else {
                        continue;
                    };
                    if candidate.score <= baseline {
                        continue;
                    }
                    self.set_item(g, s, k, Some(candidate.idx));
                    if self.record_if_better() {
                        improved = true;
                    } else {
                        self.put_slot(g, s, saved);
                    }
                }
            }
        }
        improved
    }

    /// Exchanges every pair of placed items, across groups by identity, when both agents can
    /// perform what they receive.
    pub fn swap_items(&mut self) -> bool {
        let mut improved = false;
        let positions: Vec<(usize, usize, usize)> = (0..self.group_count())
            .flat_map(|g| {
                (0..self.slot_count(g))
                    .flat_map(move |s| (0..ITEMS_PER_SLOT).map(move |k| (g, s, k)))
            })
            .filter(|&(g, s, k)| self.slot(g, s).items[k].is_some())
            .collect();
        for (i, &(g1, s1, k1)) in positions.iter().enumerate() {
            for &(g2, s2, k2) in &positions[i + 1..] {
                if self.cancelled() {
                    return improved;
                }
                let (first, second) = (self.slot(g1, s1), self.slot(g2, s2));
                let (Some(p1), Some(p2)) = (first.items[k1], second.items[k2]) else {
                    continue;
                };
                if self.tables.item_id(g1, p1.item.get()) == self.tables.item_id(g2, p2.item.get())
                {
                    continue;
                }
                let (Some(into_first), Some(into_second)) = (
                    self.translate_item(g2, p2.item, g1),
                    self.translate_item(g1, p1.item, g2),
                ) else {
                    continue;
                };
                if !self.can_perform(g1, first.agent, into_first)
                    || !self.can_perform(g2, second.agent, into_second)
                {
                    continue;
                }
                self.set_item(g1, s1, k1, Some(into_first));
                self.set_item(g2, s2, k2, Some(into_second));
                if self.record_if_better() {
                    improved = true;
                } else {
                    self.put_slot(g1, s1, first);
                    self.put_slot(g2, s2, second);
                }
            }
        }
        improved
    }

    /// Best item for every sub-slot of the group, one pass. Returns whether anything changed.
    fn refine_group_items(&mut self, g: usize) -> bool {
        let mut changed = false;
        for s in 0..self.slot_count(g) {
            if self.slot(g, s).agent.is_none() {
                continue;
            }
            for k in 0..ITEMS_PER_SLOT {
                let current = self.slot(g, s).items[k].map(|p| p.item);
                if let Some(top) = self.rank_items(g, s, k, 1).first() {
                    if Some(top.idx) != current {
                        self.set_item(g, s, k, Some(top.idx));
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    /// Swaps a slot's agent and rebuilds its items around the newcomer.
    pub fn joint(&mut self) -> bool {
        let mut improved = false;
        for g in 0..self.group_count() {
            for s in 0..self.slot_count(g) {
                if self.cancelled() {
                    return improved;
                }
                let saved = self.grid.groups[g].clone();
                let current = saved[s].agent;
                let used = self.used_agents(g, s);
                let candidates: Vec<AgentIdx> = self
                    .rank_agents(g, s)
                    .into_iter()
                    .filter(|r| {
                        r.capable
                            && Some(r.idx) != current
                            && !used.contains(&self.tables.agent_id(g, r.idx.get()))
                    })
                    .map(|r| r.idx)
                    .take(JOINT_AGENT_TRIES)
                    .collect();
                let mut accepted = false;
                for agent in candidates {
                    self.grid.groups[g].clone_from(&saved);
                    self.clear_slot(g, s);
                    self.set_agent(g, s, Some(agent));
                    for k in 0..ITEMS_PER_SLOT {
                        if let Some(top) = self.rank_items(g, s, k, 1).first() {
                            self.set_item(g, s, k, Some(top.idx));
                        }
                    }
                    for _ in 0..JOINT_REFINE_PASSES {
                        if !self.refine_group_items(g) {
                            break;
                        }
                    }
                    if self.record_if_better() {
                        improved = true;
                        accepted = true;
                        break;
                    }
                }
                if !accepted {
                    self.grid.groups[g] = saved;
                    self.mark_dirty(g);
                }
            }
        }
        improved
    }

    /// Climbing rounds of the four basic moves, each starting from the best grid.
    pub fn run_climbing(&mut self) {
        for _ in 0..self.config.max_climbing_rounds {
            if self.cancelled() {
                break;
            }
            self.restore_best();
            let agents = self.climb_agents();
            self.restore_best();
            let agent_swaps = self.swap_agents();
            self.restore_best();
            let items = self.climb_items();
            self.restore_best();
            let item_swaps = self.swap_items();
            if !(agents || agent_swaps || items || item_swaps) {
                break;
            }
        }
    }

    /// Rebuilds whole groups from scratch, and each slot around each of its top items.
    pub fn cross_group(&mut self, groups: &[usize]) -> bool {
        if groups.len() < 2 {
            return false;
        }
        let mut improved = false;
        for &target in groups {
            if self.cancelled() {
                break;
            }
            self.restore_best();
            for s in 0..self.slot_count(target) {
                self.clear_slot(target, s);
            }
            self.greedy_fill_group(target);
            if self.total_score() >= self.prune_floor() {
                self.quick_refine(groups);
            }
            improved |= self.record_if_better();

            for s in 0..self.slot_count(target) {
                self.restore_best();
                self.clear_slot(target, s);
                let top = self.rank_items(target, s, 0, CROSS_GROUP_ITEMS);
                for rank in top {
                    if self.cancelled() {
                        break;
                    }
                    self.restore_best();
                    self.clear_slot(target, s);
                    self.set_item(target, s, 0, Some(rank.idx));
                    let Some(agent) = self.pick_free_agent(target, s) else {
                        continue;
                    };
                    self.set_agent(target, s, Some(agent));
                    self.requantify(target, s);
                    self.greedy_fill_items(target, s);
                    if self.total_score() < self.prune_floor() {
                        continue;
                    }
                    self.quick_refine(groups);
                    improved |= self.record_if_better();
                }
            }
        }
        if improved {
            self.restore_best();
            self.quick_refine(groups);
            self.record_if_better();
        }
        self.restore_best();
        improved
    }

    /// Full local search from one seed. Returns the best total and grid reached.
    pub fn deep_search(&mut self, seed: Grid) -> (i64, Grid) {
        self.adopt(seed);
        let groups = self.all_groups();
        self.run_climbing();
        tracing::trace!(score = self.best_score, "after climbing");

        for _ in 0..CROSS_GROUP_ROUNDS {
            if self.cancelled() || !self.cross_group(&groups) {
                break;
            }
            self.restore_best();
            self.swap_items();
            self.record_if_better();
        }
        tracing::trace!(score = self.best_score, "after cross-group");

        self.restore_best();
        self.swap_items();
        self.record_if_better();
        self.run_climbing();

        self.restore_best();
        if !self.cancelled() && self.joint() {
            self.run_climbing();
        }
        (self.best_score, self.best.clone())
    }
}
