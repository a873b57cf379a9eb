use crate::worker::Worker;
use banquet_scoring::{score_placement, AgentIdx, ItemIdx, ItemPick};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ItemRank {
    pub idx: ItemIdx,
    pub score: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AgentRank {
    pub idx: AgentIdx,
    pub score: i64,
    pub capable: bool,
}

fn sort_descending<T>(ranks: &mut [T], score: impl Fn(&T) -> i64) {
    ranks.sort_by(|a, b| score(b).cmp(&score(a)));
}

impl<'a> Worker<'a> {
    /// Best items for sub-slot `(g, s, k)`, scored by the whole group with the item in place.
    ///
    /// Candidates are pre-ordered by `price * quantity`. Slots whose intents react to the placed
    /// item get a bounded re-rank by the item's exact contribution first.
    pub fn rank_items(&mut self, g: usize, s: usize, k: usize, top_k: usize) -> Vec<ItemRank> {
        let tables = self.tables;
        let group_tables = &tables.groups[g];
        let group = group_tables.group;
        let used = self.used_items(g, s, k);
        let saved = self.slot(g, s);
        let agent = saved.agent;

        let mut ranked: Vec<(ItemRank, u32)> = group_tables
            .menu
            .iter()
            .filter(|idx| !used.contains(&group.items[idx.get()].id))
            .filter(|idx| self.can_perform(g, agent, **idx))
            .map(|idx| {
                let quantity = self.quantity_for(g, agent, *idx);
                let estimate = group.items[idx.get()].price * f64::from(quantity);
                (
                    ItemRank {
                        idx: *idx,
                        score: estimate as i64,
                    },
                    quantity,
                )
            })
            .collect();
        sort_descending(&mut ranked, |(r, _)| r.score);

        if group_tables.item_dependent.get(s).copied().unwrap_or(false) && !ranked.is_empty() {
            let window = if top_k > 0 && top_k <= 3 { 8 } else { 15 };
            let mut state = self.grid.groups[g].clone();
            for (rank, quantity) in ranked.iter_mut().take(window) {
                state[s].items[k] = Some(ItemPick {
                    item: rank.idx,
                    quantity: *quantity,
                });
                rank.score =
                    score_placement(group, tables.catalog(), &state, s, k, self.scratch());
            }
            sort_descending(&mut ranked, |(r, _)| r.score);
        }

        let cap = (2 * top_k).max(self.config.precise_scoring_candidate_cap);
        ranked.truncate(cap);
        let mut results: Vec<ItemRank> = Vec::with_capacity(ranked.len());
        for (rank, _) in ranked {
            self.set_item(g, s, k, Some(rank.idx));
            results.push(ItemRank {
                idx: rank.idx,
                score: self.group_score(g),
            });
        }
        self.put_slot(g, s, saved);

        sort_descending(&mut results, |r| r.score);
        if top_k > 0 {
            results.truncate(top_k);
        }
        results
    }

    /// Agents for slot `(g, s)`. Without items every owned agent ranks by rarity; otherwise unused
    /// agents are scored by the whole group and incapable ones trail with `capable == false`.
    pub fn rank_agents(&mut self, g: usize, s: usize) -> Vec<AgentRank> {
        let group = self.tables.groups[g].group;
        let saved = self.slot(g, s);
        let mut ranked = Vec::with_capacity(group.agents.len());
        if !saved.has_items() {
            ranked.extend(
                group
                    .agents
                    .iter()
                    .enumerate()
                    .filter(|(_, agent)| agent.owned)
                    .map(|(i, agent)| AgentRank {
                        idx: AgentIdx::new(i),
                        score: i64::from(agent.rarity),
                        capable: true,
                    }),
            );
        } else {
            let used = self.used_agents(g, s);
            for (i, agent) in group.agents.iter().enumerate() {
                if !agent.owned || used.contains(&agent.id) {
                    continue;
                }
                let idx = AgentIdx::new(i);
                if !saved.item_indices().all(|item| self.can_perform(g, Some(idx), item)) {
                    ranked.push(AgentRank {
                        idx,
                        score: -1,
                        capable: false,
                    });
                    continue;
                }
                self.set_agent(g, s, Some(idx));
                ranked.push(AgentRank {
                    idx,
                    score: self.group_score(g),
                    capable: true,
                });
            }
            self.set_agent(g, s, saved.agent);
        }
        sort_descending(&mut ranked, |r| r.score);
        ranked
    }

    /// Highest ranked agent that can take the slot and is not used elsewhere.
    pub fn pick_free_agent(&mut self, g: usize, s: usize) -> Option<AgentIdx> {
        let ranking = self.rank_agents(g, s);
        let used = self.used_agents(g, s);
        ranking
            .into_iter()
            .find(|r| r.capable && !used.contains(&self.tables.agent_id(g, r.idx.get())))
            .map(|r| r.idx)
    }

    pub fn greedy_fill_items(&mut self, g: usize, s: usize) {
        for k in 0..self.slot(g, s).items.len() {
            if self.slot(g, s).items[k].is_some() {
                continue;
            }
            if let Some(top) = self.rank_items(g, s, k, 1).first() {
                self.set_item(g, s, k, Some(top.idx));
            }
        }
    }

    /// Fills an empty slot: best first item, then the best free agent, then the other items.
    /// The slot is left empty when no free agent can take the item.
    pub fn greedy_fill_slot(&mut self, g: usize, s: usize) {
        if let Some(top) = self.rank_items(g, s, 0, 1).first() {
            self.set_item(g, s, 0, Some(top.idx));
        }
        match self.pick_free_agent(g, s) {
            Some(agent) => {
                self.set_agent(g, s, Some(agent));
                self.requantify(g, s);
                self.greedy_fill_items(g, s);
            }
            None => self.clear_slot(g, s),
        }
    }

    pub fn greedy_fill_group(&mut self, g: usize) {
        for s in 0..self.slot_count(g) {
            self.greedy_fill_slot(g, s);
        }
    }

    /// Replaces each item of the slot with its top-ranked alternative.
    fn refine_items(&mut self, g: usize, s: usize) -> bool {
        let mut changed = false;
        if self.slot(g, s).agent.is_none() {
            return changed;
        }
        for k in 0..self.slot(g, s).items.len() {
            let current = self.slot(g, s).items[k].map(|p| p.item);
            if let Some(top) = self.rank_items(g, s, k, 1).first() {
                if Some(top.idx) != current {
                    self.set_item(g, s, k, Some(top.idx));
                    changed = true;
                }
            }
        }
        changed
    }

    /// Alternating single-slot greedy passes (items, agent, items) until nothing changes.
    pub fn quick_refine(&mut self, groups: &[usize]) {
        for _ in 0..self.config.max_quick_refine_iterations {
            if self.cancelled() {
                break;
            }
            let mut changed = false;
            for &g in groups {
                for s in 0..self.slot_count(g) {
                    changed |= self.refine_items(g, s);
                    let current = self.slot(g, s).agent;
                    if let Some(agent) = self.pick_free_agent(g, s) {
                        if Some(agent) != current {
                            self.set_agent(g, s, Some(agent));
                            changed = true;
                        }
                    }
                    changed |= self.refine_items(g, s);
                }
            }
            if !changed {
                break;
            }
        }
    }
}
