use crate::{
    cancel::CancelToken,
    diversity::{dedup, select_diverse},
    seeds::{anchor_plans, aura_plans, multi_skill_plans, Candidate, SeedPlan},
    tables::Tables,
    worker::Worker,
};
use anyhow::{Context, Result};
use banquet_scoring::{settle_quantities, AgentIdx, Grid, Scratch};
use banquet_structs::{
    api::{GroupScore, SearchOutcome},
    config::SearchConfig,
    core::Contest,
};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Seeds appended per supplementary family after diversity selection.
const EXTRA_SEEDS: usize = 3;

pub struct Optimizer {
    contest: Contest,
    config: SearchConfig,
    cancel: CancelToken,
}

impl Optimizer {
    pub fn new(contest: &Contest, config: SearchConfig) -> Self {
        let mut contest = contest.clone();
        contest.prepare();
        Self {
            contest,
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs the full search on a dedicated worker pool. `Ok(None)` when no assignment could be
    /// built, or when the search was cancelled before anything completed.
    pub fn optimize(&self) -> Result<Option<SearchOutcome>> {
        self.contest.validate()?;
        self.config.validate()?;
        let threads = match self.config.worker_threads {
            Some(threads) => threads,
            None => std::thread::available_parallelism().map_or(1, |n| n.get()),
        };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build worker pool")?;
        Ok(pool.install(|| self.run()))
    }

    fn worker<'a>(&'a self, tables: &'a Tables<'a>) -> Worker<'a> {
        Worker::new(tables, &self.config, &self.cancel)
    }

    fn build(&self, tables: &Tables, plans: Vec<SeedPlan>) -> Vec<Candidate> {
        let batches: Vec<Vec<Candidate>> = plans
            .par_iter()
            .map_init(|| self.worker(tables), |worker, plan| worker.build_seeds(plan))
            .collect();
        batches.into_iter().flatten().collect()
    }

    /// Quick-refines every candidate, best first on return.
    fn refine(&self, tables: &Tables, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let groups: Vec<usize> = (0..tables.groups.len()).collect();
        let mut refined: Vec<Candidate> = candidates
            .into_par_iter()
            .map_init(
                || self.worker(tables),
                |worker, candidate| {
                    worker.set_grid(candidate.grid);
                    worker.quick_refine(&groups);
                    Candidate {
                        score: worker.total_score(),
                        grid: worker.grid.clone(),
                    }
                },
            )
            .collect();
        refined.sort_by(|a, b| b.score.cmp(&a.score));
        refined
    }

    fn run(&self) -> Option<SearchOutcome> {
        let start = Instant::now();
        let tables = Tables::new(&self.contest);
        let verbose = self.config.verbose_logging;
        info!(groups = tables.groups.len(), "starting search");

        let candidates = self.build(&tables, anchor_plans(&tables));
        info!(candidates = candidates.len(), "seed generation");
        if candidates.is_empty() {
            return None;
        }
        if verbose {
            for (i, c) in candidates.iter().enumerate() {
                info!(candidate = i, score = c.score, agents = ?c.grid.agent_ids(&self.contest), "seed");
            }
        }

        let candidates = self.refine(&tables, candidates);
        let fallback = candidates[0].clone();
        info!(best = fallback.score, "refine");
        for (i, c) in candidates.iter().take(10).enumerate() {
            if verbose {
                info!(seed = i, score = c.score, "refined seed");
            } else {
                debug!(seed = i, score = c.score, "refined seed");
            }
        }

        let mut seeds = dedup(select_diverse(
            &candidates,
            self.config.max_diverse_seeds,
            &self.contest,
        ));
        for (family, plans) in [
            ("aura", aura_plans(&tables)),
            ("multi-skill", multi_skill_plans(&tables)),
        ] {
            if plans.is_empty() {
                continue;
            }
            let extra = self.refine(&tables, self.build(&tables, plans));
            let added = extra.len().min(EXTRA_SEEDS);
            seeds.extend(extra.into_iter().take(EXTRA_SEEDS).map(|c| c.grid));
            seeds = dedup(seeds);
            debug!(family, added, "supplementary seeds");
        }
        info!(seeds = seeds.len(), "diversity selection");

        let results: Vec<Option<(i64, Grid)>> = seeds
            .into_par_iter()
            .enumerate()
            .map_init(
                || self.worker(&tables),
                |worker, (i, seed)| {
                    if worker.cancelled() {
                        return None;
                    }
                    let (score, grid) = worker.deep_search(seed);
                    info!(seed = i, score, "deep search done");
                    Some((score, grid))
                },
            )
            .collect();

        let mut winner: Option<(usize, i64, Grid)> = None;
        for (i, result) in results.into_iter().enumerate() {
            if let Some((score, grid)) = result {
                if winner.as_ref().map_or(true, |(_, best, _)| score > *best) {
                    winner = Some((i, score, grid));
                }
            }
        }
        let grid = match winner {
            Some((i, score, grid)) => {
                if verbose {
                    info!(seed = i, score, "winning seed");
                }
                grid
            }
            None => fallback.grid,
        };

        let mut worker = self.worker(&tables);
        worker.set_grid(grid);
        let patched = worker.fill_empty_slots();
        if patched > 0 {
            info!(patched, "filled empty slots");
        }
        let mut grid = worker.grid;

        let mut scratch = Scratch::new();
        let scores: Vec<GroupScore> = self
            .contest
            .groups
            .iter()
            .zip(grid.groups.iter_mut())
            .map(|(group, state)| {
                settle_quantities(group, &self.contest.catalog, state, &mut scratch)
            })
            .collect();
        let score: i64 = scores.iter().map(|s| s.score).sum();
        let elapsed = start.elapsed();
        let cancelled = self.cancel.is_cancelled();
        info!(best = score, ?elapsed, cancelled, "done");

        Some(SearchOutcome {
            score,
            assignment: grid.to_assignment(&self.contest, &scores),
            elapsed,
            cancelled,
        })
    }
}

impl<'a> Worker<'a> {
    /// Gives every agentless slot the best free capable agent and greedy items, then re-picks
    /// the agent of each patched slot by group score. Returns how many slots were patched.
    pub(crate) fn fill_empty_slots(&mut self) -> usize {
        let mut filled = Vec::new();
        for g in 0..self.group_count() {
            for s in 0..self.slot_count(g) {
                if self.slot(g, s).agent.is_some() {
                    continue;
                }
                if let Some(agent) = self.pick_free_agent(g, s) {
                    self.set_agent(g, s, Some(agent));
                    self.requantify(g, s);
                    self.greedy_fill_items(g, s);
                    filled.push((g, s));
                }
            }
        }

        for &(g, s) in &filled {
            let group = self.tables.groups[g].group;
            let used = self.used_agents(g, s);
            let mut best_slot = self.slot(g, s);
            let mut best = self.group_score(g);
            for (i, agent) in group.agents.iter().enumerate() {
                if !agent.owned || used.contains(&agent.id) {
                    continue;
                }
                self.clear_slot(g, s);
                self.set_agent(g, s, Some(AgentIdx::new(i)));
                self.greedy_fill_items(g, s);
                let score = self.group_score(g);
                if score > best {
                    best = score;
                    best_slot = self.slot(g, s);
                }
            }
            self.put_slot(g, s, best_slot);
        }
        filled.len()
    }
}
