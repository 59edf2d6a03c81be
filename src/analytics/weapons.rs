//! Weapon kill aggregation.

use rusqlite::params;

use crate::models::{WeaponProfile, WeaponStat};
use crate::storage::{ScoutStore, StorageError};

use super::window;

/// Weapons reported, highest kill count first. Everything below the cut
/// is long-tail noise for scouting purposes.
const TOP_WEAPONS: u32 = 15;

pub fn weapon_economy(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<WeaponProfile, StorageError> {
    let tail = format!(
        "SELECT wk.weapon_name, SUM(wk.kill_count), COUNT(DISTINCT wk.game_id)
         FROM weapon_kills wk
         JOIN team_games tg ON tg.game_id = wk.game_id AND tg.team_id = wk.team_id
         GROUP BY wk.weapon_name
         ORDER BY SUM(wk.kill_count) DESC, wk.weapon_name
         LIMIT {TOP_WEAPONS}"
    );
    let sql = window::windowed(&tail);
    let mut stmt = store.conn().prepare(&sql)?;
    let weapons = stmt
        .query_map(params![team, last_n], |row| {
            Ok(WeaponStat {
                weapon: row.get(0)?,
                kills: row.get::<_, i64>(1)? as u32,
                games_used: row.get::<_, i64>(2)? as u32,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WeaponProfile {
        team_name: team.to_string(),
        weapon_usage: weapons,
    })
}
