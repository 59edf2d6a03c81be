//! Per-player aggregation: combat totals, ratios, agent pools.

use std::cmp::Ordering;
use std::collections::HashMap;

use rusqlite::params;

use crate::models::{AgentUsage, PlayerProfile, PlayerStat};
use crate::storage::{ScoutStore, StorageError};

use super::{rates, window};

pub fn player_stats(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<PlayerProfile, StorageError> {
    let mut pools = agent_pools(store, team, last_n)?;

    let sql = window::windowed(
        "SELECT pt.player_name,
                COUNT(DISTINCT pt.game_id),
                SUM(pt.total_kills),
                SUM(pt.total_deaths),
                SUM(pt.total_assists)
         FROM player_game_totals pt
         JOIN team_games tg ON tg.game_id = pt.game_id AND tg.team_id = pt.team_id
         GROUP BY pt.player_name
         ORDER BY pt.player_name",
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let mut players = stmt
        .query_map(params![team, last_n], |row| {
            let name: String = row.get(0)?;
            let games = row.get::<_, i64>(1)? as u32;
            let kills = row.get::<_, i64>(2)? as u32;
            let deaths = row.get::<_, i64>(3)? as u32;
            let assists = row.get::<_, i64>(4)? as u32;
            Ok(PlayerStat {
                agent_pool: Vec::new(),
                kd_ratio: rates::kd(kills, deaths),
                kda: rates::kda(kills, assists, deaths),
                name,
                games,
                kills,
                deaths,
                assists,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for player in &mut players {
        player.agent_pool = pools.remove(&player.name).unwrap_or_default();
    }

    // Best KD first; players with no recorded deaths sort last because an
    // undefined ratio is unrankable, not infinite.
    players.sort_by(|a, b| match (a.kd_ratio, b.kd_ratio) {
        (Some(x), Some(y)) => y
            .partial_cmp(&x)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });

    Ok(PlayerProfile {
        team_name: team.to_string(),
        players,
    })
}

fn agent_pools(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<HashMap<String, Vec<AgentUsage>>, StorageError> {
    let sql = window::windowed(
        "SELECT gc.player_name, gc.agent, gc.agent_role, COUNT(*)
         FROM game_compositions gc
         JOIN team_games tg ON tg.game_id = gc.game_id AND tg.team_id = gc.team_id
         GROUP BY gc.player_name, gc.agent, gc.agent_role
         ORDER BY gc.player_name, COUNT(*) DESC, gc.agent",
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(params![team, last_n], |row| {
            Ok((
                row.get::<_, String>(0)?,
                AgentUsage {
                    agent: row.get(1)?,
                    role: row.get(2)?,
                    games: row.get::<_, i64>(3)? as u32,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut pools: HashMap<String, Vec<AgentUsage>> = HashMap::new();
    for (player, usage) in rows {
        pools.entry(player).or_default().push(usage);
    }
    Ok(pools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::fixtures;

    fn seed_one_game(store: &ScoutStore, totals: &[(&str, &str, u32, u32, u32)]) {
        let conn = store.conn();
        fixtures::series(
            conn,
            "s1",
            "VCT",
            ("100", "Sentinels"),
            ("200", "Cloud9"),
            Some("100"),
            (2, 0),
            "2026-02-01T17:00:00Z",
            true,
        );
        fixtures::game(conn, "g1", "s1", "ascent", "100", "200", (13, 7), Some("100"));
        fixtures::player_totals(conn, "g1", "100", totals);
    }

    #[test]
    fn test_players_ordered_by_kd_descending() {
        let store = ScoutStore::in_memory().unwrap();
        seed_one_game(
            &store,
            &[
                ("mid", "sova", 15, 15, 5),
                ("star", "jett", 24, 12, 4),
                ("anchor", "killjoy", 10, 14, 8),
            ],
        );

        let profile = player_stats(&store, "Sentinels", 10).unwrap();
        let names: Vec<&str> = profile.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["star", "mid", "anchor"]);
        assert_eq!(profile.players[0].kd_ratio, Some(2.0));
        assert_eq!(profile.players[1].kd_ratio, Some(1.0));
    }

    #[test]
    fn test_zero_deaths_is_undefined_and_sorts_last() {
        let store = ScoutStore::in_memory().unwrap();
        seed_one_game(
            &store,
            &[("deathless", "jett", 12, 0, 4), ("normal", "sova", 8, 10, 6)],
        );

        let profile = player_stats(&store, "Sentinels", 10).unwrap();
        assert_eq!(profile.players[0].name, "normal");

        let deathless = &profile.players[1];
        assert_eq!(deathless.kd_ratio, None);
        assert_eq!(deathless.kda, None);
        assert_eq!(deathless.kills, 12);
    }

    #[test]
    fn test_kda_weighs_assists_at_half() {
        let store = ScoutStore::in_memory().unwrap();
        seed_one_game(&store, &[("p", "omen", 10, 8, 4)]);

        let profile = player_stats(&store, "Sentinels", 10).unwrap();
        assert_eq!(profile.players[0].kd_ratio, Some(1.25));
        assert_eq!(profile.players[0].kda, Some(1.5));
    }

    #[test]
    fn test_agent_pool_ordered_by_usage() {
        let store = ScoutStore::in_memory().unwrap();
        let conn = store.conn();
        fixtures::series(
            conn,
            "s1",
            "VCT",
            ("100", "Sentinels"),
            ("200", "Cloud9"),
            Some("100"),
            (2, 1),
            "2026-02-01T17:00:00Z",
            true,
        );
        for (i, agent, role) in [
            (1u32, "jett", "Duelist"),
            (2, "jett", "Duelist"),
            (3, "raze", "Duelist"),
        ] {
            let gid = format!("g{i}");
            fixtures::game(conn, &gid, "s1", "ascent", "100", "200", (13, 7), Some("100"));
            fixtures::composition(conn, &gid, "ascent", ("100", "Sentinels"), &[("tenz", agent, role)]);
            fixtures::player_totals(conn, &gid, "100", &[("tenz", agent, 20, 10, 2)]);
        }

        let profile = player_stats(&store, "Sentinels", 10).unwrap();
        let tenz = &profile.players[0];
        assert_eq!(tenz.games, 3);
        assert_eq!(tenz.agent_pool.len(), 2);
        assert_eq!(tenz.agent_pool[0].agent, "jett");
        assert_eq!(tenz.agent_pool[0].games, 2);
        assert_eq!(tenz.agent_pool[1].agent, "raze");
    }

    #[test]
    fn test_totals_accumulate_across_games() {
        let store = ScoutStore::in_memory().unwrap();
        let conn = store.conn();
        fixtures::series(
            conn,
            "s1",
            "VCT",
            ("100", "Sentinels"),
            ("200", "Cloud9"),
            Some("100"),
            (2, 0),
            "2026-02-01T17:00:00Z",
            true,
        );
        fixtures::game(conn, "g1", "s1", "ascent", "100", "200", (13, 7), Some("100"));
        fixtures::game(conn, "g2", "s1", "haven", "100", "200", (13, 9), Some("100"));
        fixtures::player_totals(conn, "g1", "100", &[("tenz", "jett", 20, 10, 2)]);
        fixtures::player_totals(conn, "g2", "100", &[("tenz", "jett", 16, 14, 6)]);

        let profile = player_stats(&store, "Sentinels", 10).unwrap();
        let tenz = &profile.players[0];
        assert_eq!(tenz.games, 2);
        assert_eq!(tenz.kills, 36);
        assert_eq!(tenz.deaths, 24);
        assert_eq!(tenz.kd_ratio, Some(1.5));
    }
}
