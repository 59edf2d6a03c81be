//! Per-player aggregates over the sampled window.

use serde::{Deserialize, Serialize};

/// How often a player ran one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentUsage {
    pub agent: String,
    pub role: String,
    pub games: u32,
}

/// Aggregated combat stats for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub name: String,
    pub games: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// Kills per death. `None` when the player has zero recorded deaths;
    /// an undefined ratio is not the same as a very good one.
    pub kd_ratio: Option<f64>,
    /// (kills + 0.5 * assists) / deaths, same zero-deaths guard.
    pub kda: Option<f64>,
    /// Agents played, most used first.
    pub agent_pool: Vec<AgentUsage>,
}

/// Roster overview for one team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub team_name: String,
    /// Players ordered by KD ratio descending, undefined ratios last.
    pub players: Vec<PlayerStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_kd_serializes_as_null() {
        let player = PlayerStat {
            name: "zekken".to_string(),
            games: 3,
            kills: 12,
            deaths: 0,
            assists: 4,
            kd_ratio: None,
            kda: None,
            agent_pool: vec![],
        };

        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["kd_ratio"], serde_json::Value::Null);
        assert_eq!(json["kda"], serde_json::Value::Null);
    }
}
