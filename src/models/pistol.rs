//! Pistol round tendencies, split by side.

use serde::{Deserialize, Serialize};

/// Pistol record on a single map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPistolStat {
    pub map: String,
    pub rounds: u32,
    pub wins: u32,
    pub win_rate: f64,
}

/// Pistol record for one side (attack or defense).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidePistolStats {
    pub total: u32,
    pub wins: u32,
    pub win_rate: f64,
    pub by_map: Vec<MapPistolStat>,
}

/// Pistol round profile for one team over the sampled window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PistolProfile {
    pub team_name: String,
    pub attack_pistol: SidePistolStats,
    pub defense_pistol: SidePistolStats,
    /// Both sides combined, percent.
    pub overall_pistol_win_rate: f64,
}
