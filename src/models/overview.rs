//! Team overview: recent form, series record, per-map performance.

use serde::{Deserialize, Serialize};

/// Outcome of a series from the scouted team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchResult {
    Win,
    Loss,
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::Win => write!(f, "WIN"),
            MatchResult::Loss => write!(f, "LOSS"),
        }
    }
}

/// One recent series result, normalized to the scouted team's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub opponent: String,
    pub result: MatchResult,
    /// Map score, scouted team first (e.g. "2-1").
    pub score: String,
    pub tournament: String,
}

/// Per-map performance over the sampled window.
///
/// Maps with fewer than two sampled games are excluded upstream; a
/// single-game win rate is noise, not a tendency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStat {
    pub map: String,
    pub games: u32,
    pub wins: u32,
    pub win_rate: f64,
    /// Mean rounds won minus mean rounds lost, signed.
    pub avg_round_diff: f64,
}

/// Recent form and map pool for one team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamOverview {
    pub team_name: String,
    /// Number of series requested for the sampling window.
    pub recent_matches: u32,
    /// "W-L" over the sampled finished series.
    pub series_record: String,
    pub win_rate: f64,
    /// Up to five most recent series, newest first.
    pub recent_series: Vec<SeriesSummary>,
    pub map_stats: Vec<MapStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_result_serialization() {
        assert_eq!(serde_json::to_string(&MatchResult::Win).unwrap(), "\"WIN\"");
        assert_eq!(
            serde_json::to_string(&MatchResult::Loss).unwrap(),
            "\"LOSS\""
        );
    }

    #[test]
    fn test_overview_round_trip() {
        let overview = TeamOverview {
            team_name: "Sentinels".to_string(),
            recent_matches: 10,
            series_record: "6-4".to_string(),
            win_rate: 60.0,
            recent_series: vec![SeriesSummary {
                opponent: "Cloud9".to_string(),
                result: MatchResult::Win,
                score: "2-1".to_string(),
                tournament: "VCT Americas Stage 1".to_string(),
            }],
            map_stats: vec![MapStat {
                map: "ascent".to_string(),
                games: 4,
                wins: 3,
                win_rate: 75.0,
                avg_round_diff: 2.5,
            }],
        };

        let json = serde_json::to_string(&overview).unwrap();
        let parsed: TeamOverview = serde_json::from_str(&json).unwrap();
        assert_eq!(overview, parsed);
    }
}
