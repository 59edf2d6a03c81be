//! Agent compositions: what a team actually runs, per map and overall.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One distinct five-agent lineup on a specific map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapComposition {
    /// Canonical comp string: agents sorted alphabetically, joined with ", ".
    pub agents: String,
    pub times_played: u32,
    /// Share of the team's sampled games on this map, percent.
    pub pick_rate: f64,
}

/// How often a single agent shows up across the sampled games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPick {
    pub agent: String,
    pub role: String,
    pub picks: u32,
    /// Picks relative to total sampled games, percent.
    pub pick_rate: f64,
}

/// Composition tendencies for one team over the sampled window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionProfile {
    pub team_name: String,
    /// Comps per map, most played first within each map.
    pub compositions_by_map: BTreeMap<String, Vec<MapComposition>>,
    /// Individual agent usage, most picked first.
    pub agent_picks: Vec<AgentPick>,
    /// Share of total picks per role, percent.
    pub role_distribution: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composition_profile_round_trip() {
        let mut by_map = BTreeMap::new();
        by_map.insert(
            "ascent".to_string(),
            vec![MapComposition {
                agents: "jett, kayo, killjoy, omen, sova".to_string(),
                times_played: 3,
                pick_rate: 75.0,
            }],
        );
        let mut roles = BTreeMap::new();
        roles.insert("Duelist".to_string(), 20.0);

        let profile = CompositionProfile {
            team_name: "Cloud9".to_string(),
            compositions_by_map: by_map,
            agent_picks: vec![AgentPick {
                agent: "jett".to_string(),
                role: "Duelist".to_string(),
                picks: 8,
                pick_rate: 80.0,
            }],
            role_distribution: roles,
        };

        let json = serde_json::to_string(&profile).unwrap();
        let parsed: CompositionProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, parsed);
    }
}
