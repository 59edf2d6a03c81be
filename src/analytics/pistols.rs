//! Pistol round aggregation, split by side and by map.

use rusqlite::params;

use crate::models::{MapPistolStat, PistolProfile, SidePistolStats};
use crate::storage::{ScoutStore, StorageError};

use super::{rates, window};

pub fn pistol_tendencies(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<PistolProfile, StorageError> {
    let sql = window::windowed(
        "SELECT CASE WHEN r.attacker_team_id = tg.team_id THEN 'attack' ELSE 'defense' END,
                tg.map_name,
                COUNT(*),
                SUM(CASE WHEN r.winner_team_id = tg.team_id THEN 1 ELSE 0 END)
         FROM rounds r
         JOIN team_games tg ON tg.game_id = r.game_id
         WHERE r.is_pistol_round = 1
           AND (r.attacker_team_id = tg.team_id OR r.defender_team_id = tg.team_id)
         GROUP BY 1, tg.map_name
         ORDER BY 1, COUNT(*) DESC, tg.map_name",
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(params![team, last_n], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)? as u32,
                row.get::<_, i64>(3)? as u32,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut attack = SidePistolStats::default();
    let mut defense = SidePistolStats::default();
    for (side, map, rounds, wins) in rows {
        let stats = if side == "attack" { &mut attack } else { &mut defense };
        stats.total += rounds;
        stats.wins += wins;
        stats.by_map.push(MapPistolStat {
            map,
            rounds,
            wins,
            win_rate: rates::percent(wins, rounds),
        });
    }
    attack.win_rate = rates::percent(attack.wins, attack.total);
    defense.win_rate = rates::percent(defense.wins, defense.total);
    let overall = rates::percent(attack.wins + defense.wins, attack.total + defense.total);

    Ok(PistolProfile {
        team_name: team.to_string(),
        attack_pistol: attack,
        defense_pistol: defense,
        overall_pistol_win_rate: overall,
    })
}
