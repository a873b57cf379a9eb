use crate::{seeds::Candidate, worker::IdSet};
use banquet_scoring::Grid;
use banquet_structs::core::{AgentId, Contest};

const SIMILARITY_LIMIT: f64 = 0.67;

fn agent_set(grid: &Grid, contest: &Contest) -> IdSet<AgentId> {
    grid.agent_ids(contest).into_iter().collect()
}

/// Share of `candidate`'s agents that also appear in `kept`. Zero for an empty candidate.
fn overlap(candidate: &IdSet<AgentId>, kept: &IdSet<AgentId>) -> f64 {
    if candidate.is_empty() {
        return 0.0;
    }
    let shared = candidate.iter().filter(|id| kept.contains(id)).count();
    shared as f64 / candidate.len() as f64
}

/// Picks up to `max_seeds` grids from candidates sorted best first.
///
/// The best candidate is always kept. A first pass admits candidates whose agent overlap with
/// every kept grid is at most 0.67; a second pass fills the remaining room with any candidate
/// that is not fully covered by a kept grid.
pub fn select_diverse(candidates: &[Candidate], max_seeds: usize, contest: &Contest) -> Vec<Grid> {
    let Some(first) = candidates.first() else {
        return Vec::new();
    };
    let sets: Vec<IdSet<AgentId>> = candidates
        .iter()
        .map(|c| agent_set(&c.grid, contest))
        .collect();
    let mut kept = vec![0];
    let mut seeds = vec![first.grid.clone()];

    for (limit, inclusive) in [(SIMILARITY_LIMIT, true), (1.0, false)] {
        for i in 1..candidates.len() {
            if seeds.len() >= max_seeds {
                return seeds;
            }
            if kept.contains(&i) {
                continue;
            }
            let admissible = kept.iter().all(|&j| {
                let o = overlap(&sets[i], &sets[j]);
                if inclusive {
                    o <= limit
                } else {
                    o < limit
                }
            });
            if admissible {
                kept.push(i);
                seeds.push(candidates[i].grid.clone());
            }
        }
    }
    seeds
}

/// Drops grids whose fingerprint was already seen, keeping first occurrences.
pub fn dedup(grids: Vec<Grid>) -> Vec<Grid> {
    let mut seen = IdSet::default();
    grids
        .into_iter()
        .filter(|grid| seen.insert(grid.fingerprint()))
        .collect()
}
