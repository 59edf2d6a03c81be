//! Recent form and map pool for one team.

use rusqlite::params;

use crate::models::{MapStat, MatchResult, SeriesSummary, TeamOverview};
use crate::storage::{ScoutStore, StorageError};

use super::{rates, window};

/// Most recent series listed in the overview.
const RECENT_SERIES_SHOWN: usize = 5;

/// Maps with fewer sampled games than this are not reported; a
/// single-game win rate is noise.
const MIN_MAP_GAMES: u32 = 2;

struct SeriesRow {
    opponent: String,
    won: bool,
    own_score: i64,
    opp_score: i64,
    tournament: String,
}

/// Builds the overview section: series record, win rate, the most recent
/// results, and per-map performance, all over the sampling window.
pub fn team_overview(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<TeamOverview, StorageError> {
    let sql = window::windowed(
        "SELECT CASE WHEN rs.team1_name = ?1 THEN rs.team2_name ELSE rs.team1_name END,
                CASE WHEN rs.winner_team_id =
                          CASE WHEN rs.team1_name = ?1 THEN rs.team1_id ELSE rs.team2_id END
                     THEN 1 ELSE 0 END,
                CASE WHEN rs.team1_name = ?1 THEN rs.team1_score ELSE rs.team2_score END,
                CASE WHEN rs.team1_name = ?1 THEN rs.team2_score ELSE rs.team1_score END,
                rs.tournament_name
         FROM recent_series rs
         ORDER BY rs.started_at DESC, rs.series_id DESC",
    );
    let mut stmt = store.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(params![team, last_n], |row| {
            Ok(SeriesRow {
                opponent: row.get(0)?,
                won: row.get::<_, i64>(1)? != 0,
                own_score: row.get(2)?,
                opp_score: row.get(3)?,
                tournament: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let total = rows.len() as u32;
    let wins = rows.iter().filter(|r| r.won).count() as u32;

    let recent_series = rows
        .iter()
        .take(RECENT_SERIES_SHOWN)
        .map(|r| SeriesSummary {
            opponent: r.opponent.clone(),
            result: if r.won {
                MatchResult::Win
            } else {
                MatchResult::Loss
            },
            score: format!("{}-{}", r.own_score, r.opp_score),
            tournament: r.tournament.clone(),
        })
        .collect();

    Ok(TeamOverview {
        team_name: team.to_string(),
        recent_matches: last_n,
        series_record: format!("{}-{}", wins, total - wins),
        win_rate: rates::percent(wins, total),
        recent_series,
        map_stats: map_stats(store, team, last_n)?,
    })
}

fn map_stats(store: &ScoutStore, team: &str, last_n: u32) -> Result<Vec<MapStat>, StorageError> {
    let tail = format!(
        "SELECT tg.map_name,
                COUNT(*),
                SUM(CASE WHEN tg.winner_team_id = tg.team_id THEN 1 ELSE 0 END),
                SUM(CASE WHEN tg.team_id = tg.team1_id THEN tg.team1_score ELSE tg.team2_score END),
                SUM(CASE WHEN tg.team_id = tg.team1_id THEN tg.team2_score ELSE tg.team1_score END)
         FROM team_games tg
         GROUP BY tg.map_name
         HAVING COUNT(*) >= {MIN_MAP_GAMES}
         ORDER BY COUNT(*) DESC, tg.map_name"
    );
    let sql = window::windowed(&tail);
    let mut stmt = store.conn().prepare(&sql)?;
    let stats = stmt
        .query_map(params![team, last_n], |row| {
            let map: String = row.get(0)?;
            let games = row.get::<_, i64>(1)? as u32;
            let wins = row.get::<_, i64>(2)? as u32;
            let rounds_won: i64 = row.get(3)?;
            let rounds_lost: i64 = row.get(4)?;
            Ok(MapStat {
                map,
                games,
                wins,
                win_rate: rates::percent(wins, games),
                avg_round_diff: rates::mean_diff(rounds_won, rounds_lost, games),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stats)
}
