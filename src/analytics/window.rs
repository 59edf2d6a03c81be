//! The sampling window shared by every windowed aggregation.
//!
//! Window policy: a team's sample is its N most recently started
//! *finished* series, plus every game and round inside those series.
//! Unfinished series never enter the sample, and no aggregation
//! over-fetches beyond the window. Ties on start time break by series id
//! so repeated runs over unchanged data see the identical window.
//!
//! Queries built with [`windowed`] take two parameters: `?1` is the team
//! name, `?2` the window size in series.

/// CTEs defining the window. `recent_series` is the series sample;
/// `team_games` is every game in it, with `team_id` resolved to the
/// scouted team's id for that series.
const WINDOW_CTES: &str = "\
recent_series AS (
    SELECT series_id, team1_id, team2_id, team1_name, team2_name,
           winner_team_id, team1_score, team2_score, tournament_name, started_at
    FROM series
    WHERE (team1_name = ?1 OR team2_name = ?1) AND finished = 1
    ORDER BY started_at DESC, series_id DESC
    LIMIT ?2
),
team_games AS (
    SELECT g.game_id, g.series_id, g.map_name,
           g.team1_id, g.team2_id, g.team1_score, g.team2_score,
           g.winner_team_id,
           CASE WHEN rs.team1_name = ?1 THEN rs.team1_id ELSE rs.team2_id END AS team_id
    FROM games g
    JOIN recent_series rs ON rs.series_id = g.series_id
)";

/// Prefixes `tail` with the window CTEs.
pub(crate) fn windowed(tail: &str) -> String {
    format!("WITH {WINDOW_CTES}\n{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::fixtures;
    use crate::storage::ScoutStore;
    use rusqlite::params;

    #[test]
    fn test_window_takes_most_recent_finished_series() {
        let store = ScoutStore::in_memory().unwrap();
        let conn = store.conn();
        for (id, day, finished) in [("s1", 1, true), ("s2", 2, true), ("s3", 3, false), ("s4", 4, true)] {
            fixtures::series(
                conn,
                id,
                "VCT",
                ("100", "Sentinels"),
                ("200", "Cloud9"),
                Some("100"),
                (2, 0),
                &format!("2026-02-{day:02}T17:00:00Z"),
                finished,
            );
        }

        let sql = windowed("SELECT series_id FROM recent_series ORDER BY started_at DESC");
        let mut stmt = conn.prepare(&sql).unwrap();
        let ids: Vec<String> = stmt
            .query_map(params!["Sentinels", 2], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        // s3 is unfinished, so the two most recent finished series are s4 and s2.
        assert_eq!(ids, vec!["s4", "s2"]);
    }

    #[test]
    fn test_team_games_resolves_scouted_team_id_per_series() {
        let store = ScoutStore::in_memory().unwrap();
        let conn = store.conn();
        // Sentinels appear as team1 in one series and team2 in the other.
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
        fixtures::series(
            conn,
            "s2",
            "VCT",
            ("200", "Cloud9"),
            ("100", "Sentinels"),
            Some("200"),
            (2, 1),
            "2026-02-02T17:00:00Z",
            true,
        );
        fixtures::game(conn, "g1", "s1", "ascent", "100", "200", (13, 5), Some("100"));
        fixtures::game(conn, "g2", "s2", "haven", "200", "100", (13, 11), Some("200"));

        let sql = windowed("SELECT game_id, team_id FROM team_games ORDER BY game_id");
        let mut stmt = conn.prepare(&sql).unwrap();
        let rows: Vec<(String, String)> = stmt
            .query_map(params!["Sentinels", 10], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            rows,
            vec![
                ("g1".to_string(), "100".to_string()),
                ("g2".to_string(), "100".to_string())
            ]
        );
    }
}
