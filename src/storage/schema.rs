//! SQLite schema for the match database.
//!
//! The database is produced by a separate ingestion tool; this module
//! exists so embedded and test databases can be created with the same
//! shape the aggregations expect.

use rusqlite::Connection;

/// Creates all tables and indexes if they do not already exist.
pub fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS series (
            series_id TEXT PRIMARY KEY,
            tournament_name TEXT NOT NULL,
            team1_id TEXT NOT NULL,
            team1_name TEXT NOT NULL,
            team2_id TEXT NOT NULL,
            team2_name TEXT NOT NULL,
            winner_team_id TEXT,
            team1_score INTEGER NOT NULL DEFAULT 0,
            team2_score INTEGER NOT NULL DEFAULT 0,
            best_of INTEGER,
            started_at TEXT NOT NULL,
            finished INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS games (
            game_id TEXT PRIMARY KEY,
            series_id TEXT NOT NULL REFERENCES series(series_id),
            game_number INTEGER,
            map_name TEXT NOT NULL,
            team1_id TEXT NOT NULL,
            team2_id TEXT NOT NULL,
            team1_score INTEGER NOT NULL DEFAULT 0,
            team2_score INTEGER NOT NULL DEFAULT 0,
            winner_team_id TEXT
        );

        CREATE TABLE IF NOT EXISTS game_compositions (
            game_id TEXT NOT NULL REFERENCES games(game_id),
            map_name TEXT NOT NULL,
            team_id TEXT NOT NULL,
            team_name TEXT NOT NULL,
            player_id TEXT,
            player_name TEXT NOT NULL,
            agent TEXT NOT NULL,
            agent_role TEXT NOT NULL,
            PRIMARY KEY (game_id, team_id, player_name)
        );

        CREATE TABLE IF NOT EXISTS rounds (
            game_id TEXT NOT NULL REFERENCES games(game_id),
            series_id TEXT NOT NULL,
            round_number INTEGER NOT NULL,
            attacker_team_id TEXT NOT NULL,
            defender_team_id TEXT NOT NULL,
            winner_team_id TEXT,
            win_type TEXT,
            bomb_planted INTEGER NOT NULL DEFAULT 0,
            is_pistol_round INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (game_id, round_number)
        );

        CREATE TABLE IF NOT EXISTS player_game_totals (
            game_id TEXT NOT NULL REFERENCES games(game_id),
            player_id TEXT,
            player_name TEXT NOT NULL,
            team_id TEXT NOT NULL,
            agent TEXT,
            total_kills INTEGER NOT NULL DEFAULT 0,
            total_deaths INTEGER NOT NULL DEFAULT 0,
            total_assists INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (game_id, player_name)
        );

        CREATE TABLE IF NOT EXISTS weapon_kills (
            game_id TEXT NOT NULL REFERENCES games(game_id),
            series_id TEXT NOT NULL,
            round_number INTEGER NOT NULL,
            team_id TEXT NOT NULL,
            weapon_name TEXT NOT NULL,
            kill_count INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_series_teams ON series(team1_name, team2_name);
        CREATE INDEX IF NOT EXISTS idx_series_started ON series(started_at);
        CREATE INDEX IF NOT EXISTS idx_games_series ON games(series_id);
        CREATE INDEX IF NOT EXISTS idx_comps_game ON game_compositions(game_id, team_id);
        CREATE INDEX IF NOT EXISTS idx_comps_team_name ON game_compositions(team_name);
        CREATE INDEX IF NOT EXISTS idx_rounds_game ON rounds(game_id);
        CREATE INDEX IF NOT EXISTS idx_totals_game ON player_game_totals(game_id, team_id);
        CREATE INDEX IF NOT EXISTS idx_weapon_kills_game ON weapon_kills(game_id, team_id);
        "#,
    )
}
