//! Weapon usage aggregates.

use serde::{Deserialize, Serialize};

/// Kills attributed to one weapon across the sampled games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponStat {
    pub weapon: String,
    pub kills: u32,
    /// Distinct games in which the weapon recorded at least one kill.
    pub games_used: u32,
}

/// Weapon preference profile for one team, highest kill count first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub team_name: String,
    pub weapon_usage: Vec<WeaponStat>,
}
