use crate::{
    derive::baseline,
    grid::Grid,
    score::{settle_quantities, Scratch},
};
use anyhow::{anyhow, bail, ensure, Result};
use banquet_structs::core::Contest;
use std::collections::HashSet;

/// Checks a grid against every hard constraint and reports the first violation.
pub fn verify_grid(contest: &Contest, grid: &Grid) -> Result<()> {
    ensure!(
        grid.groups.len() == contest.groups.len(),
        "Grid has {} groups, contest has {}",
        grid.groups.len(),
        contest.groups.len()
    );
    let mut agents = HashSet::new();
    let mut items = HashSet::new();
    let mut scratch = Scratch::new();
    for (g, (group, state)) in contest.groups.iter().zip(&grid.groups).enumerate() {
        ensure!(
            state.len() <= group.slot_count(),
            "Group {} has {} slots, expected at most {}",
            g,
            state.len(),
            group.slot_count()
        );
        for (s, slot) in state.iter().enumerate() {
            let agent = match slot.agent {
                Some(idx) => {
                    let agent = group.agents.get(idx.get()).ok_or_else(|| {
                        anyhow!("Group {} slot {}: agent index {} out of range", g, s, idx.0)
                    })?;
                    ensure!(
                        agents.insert(agent.id),
                        "Agent {} is assigned more than once",
                        agent.id
                    );
                    ensure!(agent.owned, "Agent {} is not owned", agent.id);
                    Some(agent)
                }
                None => None,
            };
            for pick in slot.items.iter().flatten() {
                let item = group.items.get(pick.item.get()).ok_or_else(|| {
                    anyhow!("Group {} slot {}: item index {} out of range", g, s, pick.item.0)
                })?;
                ensure!(items.insert(item.id), "Item {} is assigned more than once", item.id);
                ensure!(item.owned, "Item {} is not owned", item.id);
                let Some(agent) = agent else {
                    bail!("Group {} slot {}: item {} has no agent", g, s, item.id);
                };
                ensure!(
                    baseline(group, agent).can_perform(item),
                    "Agent {} cannot perform item {}",
                    agent.id,
                    item.id
                );
            }
        }

        let mut settled = state.clone();
        settle_quantities(group, &contest.catalog, &mut settled, &mut scratch);
        for (s, (slot, bound)) in state.iter().zip(&settled).enumerate() {
            for (pick, bounded) in slot.items.iter().zip(&bound.items) {
                if let (Some(pick), Some(bounded)) = (pick, bounded) {
                    ensure!(
                        pick.quantity <= bounded.quantity,
                        "Group {} slot {}: quantity {} of item index {} exceeds the available {}",
                        g,
                        s,
                        pick.quantity,
                        pick.item.0,
                        bounded.quantity
                    );
                }
            }
        }
    }
    Ok(())
}
