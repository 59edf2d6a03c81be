//! Agent composition aggregation.
//!
//! Comp identity is the set of agents fielded in one game on one map.
//! The canonical comp string (agents sorted, ", "-joined) is built here
//! rather than in SQL so the grouping key is engine-independent.

use std::collections::BTreeMap;

use rusqlite::params;

use crate::models::{AgentPick, CompositionProfile, MapComposition};
use crate::storage::{ScoutStore, StorageError};

use super::{rates, window};

pub fn team_compositions(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<CompositionProfile, StorageError> {
    let sql = window::windowed(
        "SELECT tg.game_id, tg.map_name, gc.agent, gc.agent_role
         FROM team_games tg
         JOIN game_compositions gc
           ON gc.game_id = tg.game_id AND gc.team_id = tg.team_id
         ORDER BY tg.game_id, gc.agent",
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let picks = stmt
        .query_map(params![team, last_n], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // Regroup the flat pick rows by game.
    let mut games: BTreeMap<String, (String, Vec<(String, String)>)> = BTreeMap::new();
    for (game_id, map, agent, role) in picks {
        games
            .entry(game_id)
            .or_insert_with(|| (map, Vec::new()))
            .1
            .push((agent, role));
    }
    let total_games = games.len() as u32;

    let mut games_per_map: BTreeMap<String, u32> = BTreeMap::new();
    let mut comp_counts: BTreeMap<(String, String), u32> = BTreeMap::new();
    let mut agent_counts: BTreeMap<(String, String), u32> = BTreeMap::new();
    for (_, (map, mut agents)) in games {
        agents.sort();
        let comp = agents
            .iter()
            .map(|(agent, _)| agent.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        *games_per_map.entry(map.clone()).or_default() += 1;
        *comp_counts.entry((map, comp)).or_default() += 1;
        for (agent, role) in agents {
            *agent_counts.entry((agent, role)).or_default() += 1;
        }
    }

    let mut compositions_by_map: BTreeMap<String, Vec<MapComposition>> = BTreeMap::new();
    for ((map, agents), times_played) in comp_counts {
        let games_on_map = games_per_map.get(&map).copied().unwrap_or(0);
        compositions_by_map
            .entry(map)
            .or_default()
            .push(MapComposition {
                agents,
                times_played,
                pick_rate: rates::percent(times_played, games_on_map),
            });
    }
    for comps in compositions_by_map.values_mut() {
        comps.sort_by(|a, b| {
            b.times_played
                .cmp(&a.times_played)
                .then_with(|| a.agents.cmp(&b.agents))
        });
    }

    let mut agent_picks: Vec<AgentPick> = agent_counts
        .into_iter()
        .map(|((agent, role), picks)| AgentPick {
            agent,
            role,
            picks,
            pick_rate: rates::percent(picks, total_games),
        })
        .collect();
    agent_picks.sort_by(|a, b| b.picks.cmp(&a.picks).then_with(|| a.agent.cmp(&b.agent)));

    let total_picks: u32 = agent_picks.iter().map(|p| p.picks).sum();
    let mut role_counts: BTreeMap<String, u32> = BTreeMap::new();
    for pick in &agent_picks {
        *role_counts.entry(pick.role.clone()).or_default() += pick.picks;
    }
    let role_distribution = role_counts
        .into_iter()
        .map(|(role, count)| (role, rates::percent(count, total_picks)))
        .collect();

    Ok(CompositionProfile {
        team_name: team.to_string(),
        compositions_by_map,
        agent_picks,
        role_distribution,
    })
}
