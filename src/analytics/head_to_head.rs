//! Head-to-head record between two named teams.
//!
//! Unlike the windowed sections this looks at the full shared history;
//! two teams may only meet a handful of times a year, so truncating to a
//! recent window would usually leave nothing.

use rusqlite::params;

use crate::models::{HeadToHeadMatch, HeadToHeadRecord};
use crate::storage::{ScoutStore, StorageError};

struct MeetingRow {
    tournament: String,
    team1_id: String,
    team1_name: String,
    team2_id: String,
    team2_name: String,
    winner_team_id: Option<String>,
    team1_score: i64,
    team2_score: i64,
}

/// Builds the head-to-head record for `team_a` vs `team_b`, matching
/// either participant order. Series winners are classified by resolved
/// name; a series without a recorded winner counts toward the total but
/// toward neither win column, which keeps the record symmetric under
/// argument swap.
pub fn head_to_head(
    store: &ScoutStore,
    team_a: &str,
    team_b: &str,
) -> Result<HeadToHeadRecord, StorageError> {
    let mut stmt = store.conn().prepare(
        "SELECT tournament_name, team1_id, team1_name, team2_id, team2_name,
                winner_team_id, team1_score, team2_score
         FROM series
         WHERE (team1_name = ?1 AND team2_name = ?2)
            OR (team1_name = ?2 AND team2_name = ?1)
         ORDER BY started_at ASC, series_id ASC",
    )?;
    let rows = stmt
        .query_map(params![team_a, team_b], |row| {
            Ok(MeetingRow {
                tournament: row.get(0)?,
                team1_id: row.get(1)?,
                team1_name: row.get(2)?,
                team2_id: row.get(3)?,
                team2_name: row.get(4)?,
                winner_team_id: row.get(5)?,
                team1_score: row.get(6)?,
                team2_score: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut team_a_wins = 0u32;
    let mut team_b_wins = 0u32;
    let mut matches = Vec::with_capacity(rows.len());
    for row in rows {
        let winner = row.winner_team_id.as_deref().and_then(|wid| {
            if wid == row.team1_id {
                Some(row.team1_name.clone())
            } else if wid == row.team2_id {
                Some(row.team2_name.clone())
            } else {
                None
            }
        });
        match winner.as_deref() {
            Some(name) if name == team_a => team_a_wins += 1,
            Some(name) if name == team_b => team_b_wins += 1,
            _ => {}
        }

        // Normalize the score string to team_a's perspective.
        let a_is_team1 = row.team1_name == team_a;
        let score = if a_is_team1 {
            format!("{}-{}", row.team1_score, row.team2_score)
        } else {
            format!("{}-{}", row.team2_score, row.team1_score)
        };
        matches.push(HeadToHeadMatch {
            tournament: row.tournament,
            score,
            winner,
        });
    }

    Ok(HeadToHeadRecord {
        team1: team_a.to_string(),
        team2: team_b.to_string(),
        total_matches: matches.len() as u32,
        team1_wins: team_a_wins,
        team2_wins: team_b_wins,
        matches,
    })
}
