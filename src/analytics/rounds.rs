//! Round pattern aggregation: win conditions and post-plant conversion.

use rusqlite::params;
use tracing::warn;

use crate::models::{
    PostPlantStat, RoundPatternProfile, Side, WinCondition, WinConditionBreakdown,
    WinConditionCount,
};
use crate::storage::{ScoutStore, StorageError};

use super::{rates, window};

pub fn round_patterns(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<RoundPatternProfile, StorageError> {
    Ok(RoundPatternProfile {
        team_name: team.to_string(),
        win_conditions: win_conditions(store, team, last_n)?,
        post_plant: post_plant(store, team, last_n)?,
    })
}

fn win_conditions(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<WinConditionBreakdown, StorageError> {
    let sql = window::windowed(
        "SELECT CASE WHEN r.attacker_team_id = tg.team_id THEN 'attack' ELSE 'defense' END,
                r.win_type,
                COUNT(*)
         FROM rounds r
         JOIN team_games tg ON tg.game_id = r.game_id
         WHERE (r.attacker_team_id = tg.team_id OR r.defender_team_id = tg.team_id)
           AND r.winner_team_id = tg.team_id
           AND r.win_type IS NOT NULL
         GROUP BY 1, r.win_type
         ORDER BY 1, COUNT(*) DESC, r.win_type",
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(params![team, last_n], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)? as u32,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut breakdown = WinConditionBreakdown::default();
    for (side, win_type, count) in rows {
        let Some(condition) = WinCondition::parse(&win_type) else {
            warn!(win_type, "unrecognized round win type, skipping");
            continue;
        };
        let bucket = if side == "attack" {
            &mut breakdown.attack
        } else {
            &mut breakdown.defense
        };
        bucket.push(WinConditionCount { condition, count });
    }
    Ok(breakdown)
}

fn post_plant(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<Vec<PostPlantStat>, StorageError> {
    let sql = window::windowed(
        "SELECT CASE WHEN r.attacker_team_id = tg.team_id THEN 'attack' ELSE 'defense' END,
                COUNT(*),
                SUM(CASE WHEN r.winner_team_id = tg.team_id THEN 1 ELSE 0 END)
         FROM rounds r
         JOIN team_games tg ON tg.game_id = r.game_id
         WHERE r.bomb_planted = 1
           AND (r.attacker_team_id = tg.team_id OR r.defender_team_id = tg.team_id)
         GROUP BY 1
         ORDER BY 1",
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let stats = stmt
        .query_map(params![team, last_n], |row| {
            let side: String = row.get(0)?;
            let situations = row.get::<_, i64>(1)? as u32;
            let wins = row.get::<_, i64>(2)? as u32;
            Ok(PostPlantStat {
                side: if side == "attack" { Side::Attack } else { Side::Defense },
                situations,
                wins,
                conversion_rate: rates::percent(wins, situations),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::fixtures;

    fn seed_game(store: &ScoutStore) -> (&'static str, &'static str) {
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
        ("g1", "s1")
    }

    #[test]
    fn test_win_conditions_count_only_winning_rounds() {
        let store = ScoutStore::in_memory().unwrap();
        let (gid, sid) = seed_game(&store);
        let conn = store.conn();
        // Attack rounds: two elim wins, one spike win, one loss.
        fixtures::round(conn, gid, sid, 1, "100", "200", "100", "opponentEliminated", false, true);
        fixtures::round(conn, gid, sid, 2, "100", "200", "100", "opponentEliminated", false, false);
        fixtures::round(conn, gid, sid, 3, "100", "200", "100", "bombExploded", true, false);
        fixtures::round(conn, gid, sid, 4, "100", "200", "200", "opponentEliminated", false, false);
        // Defense round won by defusing.
        fixtures::round(conn, gid, sid, 13, "200", "100", "100", "bombDefused", true, false);

        let profile = round_patterns(&store, "Sentinels", 10).unwrap();
        assert_eq!(profile.win_conditions.attack.len(), 2);
        assert_eq!(
            profile.win_conditions.attack[0],
            WinConditionCount { condition: WinCondition::Elimination, count: 2 }
        );
        assert_eq!(
            profile.win_conditions.attack[1],
            WinConditionCount { condition: WinCondition::BombExploded, count: 1 }
        );
        assert_eq!(
            profile.win_conditions.defense,
            vec![WinConditionCount { condition: WinCondition::BombDefused, count: 1 }]
        );
    }

    #[test]
    fn test_unknown_win_type_is_skipped_not_fatal() {
        let store = ScoutStore::in_memory().unwrap();
        let (gid, sid) = seed_game(&store);
        let conn = store.conn();
        fixtures::round(conn, gid, sid, 1, "100", "200", "100", "surrendered", false, false);
        fixtures::round(conn, gid, sid, 2, "100", "200", "100", "opponentEliminated", false, false);

        let profile = round_patterns(&store, "Sentinels", 10).unwrap();
        assert_eq!(profile.win_conditions.attack.len(), 1);
        assert_eq!(
            profile.win_conditions.attack[0].condition,
            WinCondition::Elimination
        );
    }

    #[test]
    fn test_post_plant_conversion_per_side() {
        let store = ScoutStore::in_memory().unwrap();
        let (gid, sid) = seed_game(&store);
        let conn = store.conn();
        // Attacking plants: 2 of 3 converted.
        fixtures::round(conn, gid, sid, 1, "100", "200", "100", "bombExploded", true, false);
        fixtures::round(conn, gid, sid, 2, "100", "200", "100", "bombExploded", true, false);
        fixtures::round(conn, gid, sid, 3, "100", "200", "200", "bombDefused", true, false);
        // Defending against plants: 1 of 3 retaken.
        fixtures::round(conn, gid, sid, 13, "200", "100", "100", "bombDefused", true, false);
        fixtures::round(conn, gid, sid, 14, "200", "100", "200", "bombExploded", true, false);
        fixtures::round(conn, gid, sid, 15, "200", "100", "200", "bombExploded", true, false);

        let profile = round_patterns(&store, "Sentinels", 10).unwrap();
        let attack = profile.post_plant_for(Side::Attack).unwrap();
        assert_eq!(attack.situations, 3);
        assert_eq!(attack.wins, 2);
        assert_eq!(attack.conversion_rate, 66.7);

        let defense = profile.post_plant_for(Side::Defense).unwrap();
        assert_eq!(defense.situations, 3);
        assert_eq!(defense.wins, 1);
        assert_eq!(defense.conversion_rate, 33.3);
    }

    #[test]
    fn test_no_plants_means_no_post_plant_rows() {
        let store = ScoutStore::in_memory().unwrap();
        let (gid, sid) = seed_game(&store);
        fixtures::round(
            store.conn(), gid, sid, 1, "100", "200", "100",
            "opponentEliminated", false, true,
        );

        let profile = round_patterns(&store, "Sentinels", 10).unwrap();
        assert!(profile.post_plant.is_empty());
        assert!(profile.post_plant_for(Side::Defense).is_none());
    }
}
