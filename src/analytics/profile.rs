//! Profile assembly: every section for one team in one document.

use tracing::{info, warn};

use crate::models::ScoutingProfile;
use crate::storage::{ScoutStore, StorageError};

use super::{
    compositions, overview, pistols, players, rounds, weakness, weapons, ScoutError,
};

/// Builds the complete scouting profile for `team` over its `last_n`
/// most recent finished series.
///
/// An unknown team name fails immediately with
/// [`ScoutError::TeamNotFound`]; a broken connection aborts. A query
/// failure inside a single section degrades that section to its empty
/// default so one missing table cannot take down the whole profile.
pub fn build_profile(
    store: &ScoutStore,
    team: &str,
    last_n: u32,
) -> Result<ScoutingProfile, ScoutError> {
    if !store.team_exists(team)? {
        return Err(ScoutError::TeamNotFound(team.to_string()));
    }
    info!(team, last_n, "building scouting profile");

    let overview = section("overview", overview::team_overview(store, team, last_n))?;
    let compositions = section(
        "compositions",
        compositions::team_compositions(store, team, last_n),
    )?;
    let pistol_rounds = section("pistol_rounds", pistols::pistol_tendencies(store, team, last_n))?;
    let players = section("players", players::player_stats(store, team, last_n))?;
    let round_patterns = section("round_patterns", rounds::round_patterns(store, team, last_n))?;
    let weapon_economy = section("weapon_economy", weapons::weapon_economy(store, team, last_n))?;

    let weaknesses =
        weakness::detect_weaknesses(team, &overview, &pistol_rounds, &players, &round_patterns);

    Ok(ScoutingProfile {
        team_name: team.to_string(),
        matches_analyzed: last_n,
        overview,
        compositions,
        pistol_rounds,
        players,
        round_patterns,
        weapon_economy,
        weaknesses,
    })
}

/// Degrades a failed section to its default unless the failure is a
/// connection loss, which no later section could survive either.
fn section<T: Default>(name: &str, result: Result<T, StorageError>) -> Result<T, ScoutError> {
    match result {
        Ok(value) => Ok(value),
        Err(err @ StorageError::Connection(_)) => Err(err.into()),
        Err(err) => {
            warn!(section = name, error = %err, "section failed, returning empty section");
            Ok(T::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::fixtures;

    fn seeded_store() -> ScoutStore {
        let store = ScoutStore::in_memory().unwrap();
        for idx in 1..=4 {
            fixtures::full_series(
                store.conn(),
                idx,
                ("100", "Sentinels"),
                ("200", "Cloud9"),
                idx != 2,
            );
        }
        store
    }

    #[test]
    fn test_profile_has_every_section_populated() {
        let store = seeded_store();
        let profile = build_profile(&store, "Sentinels", 10).unwrap();

        assert_eq!(profile.team_name, "Sentinels");
        assert_eq!(profile.matches_analyzed, 10);
        assert_eq!(profile.overview.series_record, "3-1");
        assert!(!profile.compositions.agent_picks.is_empty());
        assert!(profile.pistol_rounds.attack_pistol.total > 0);
        assert_eq!(profile.players.players.len(), 5);
        assert!(!profile.round_patterns.post_plant.is_empty());
        assert!(!profile.weapon_economy.weapon_usage.is_empty());
        // Weakness detection always produces a summary.
        assert!(!profile.weaknesses.summary.is_empty());
    }

    #[test]
    fn test_unknown_team_is_not_found() {
        let store = seeded_store();
        let err = build_profile(&store, "Evil Geniuses", 10).unwrap_err();
        assert!(matches!(err, ScoutError::TeamNotFound(name) if name == "Evil Geniuses"));
    }

    #[test]
    fn test_team_name_is_case_sensitive() {
        let store = seeded_store();
        assert!(build_profile(&store, "sentinels", 10).is_err());
    }

    #[test]
    fn test_missing_table_degrades_only_that_section() {
        let store = seeded_store();
        store
            .conn()
            .execute_batch("DROP TABLE weapon_kills")
            .unwrap();

        let profile = build_profile(&store, "Sentinels", 10).unwrap();
        // The broken section is present but empty.
        assert!(profile.weapon_economy.weapon_usage.is_empty());
        assert_eq!(profile.weapon_economy.team_name, "");
        // Everything else still aggregates.
        assert_eq!(profile.overview.series_record, "3-1");
        assert_eq!(profile.players.players.len(), 5);
        assert!(profile.pistol_rounds.attack_pistol.total > 0);
    }

    #[test]
    fn test_profile_is_deterministic() {
        let store = seeded_store();
        let first = build_profile(&store, "Sentinels", 10).unwrap();
        let second = build_profile(&store, "Sentinels", 10).unwrap();
        assert_eq!(first, second);

        let json = serde_json::to_string(&first).unwrap();
        let reparsed: crate::models::ScoutingProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(first, reparsed);
    }

    #[test]
    fn test_window_is_honored_end_to_end() {
        let store = seeded_store();
        // Two most recent series are s3 and s4, both wins.
        let profile = build_profile(&store, "Sentinels", 2).unwrap();
        assert_eq!(profile.overview.series_record, "2-0");
        assert_eq!(profile.overview.win_rate, 100.0);
        assert_eq!(profile.matches_analyzed, 2);
    }
}
