//! The assembled scouting profile: every section in one document.

use serde::{Deserialize, Serialize};

use super::{
    CompositionProfile, PistolProfile, PlayerProfile, RoundPatternProfile, TeamOverview,
    WeaknessReport, WeaponProfile,
};

/// Complete scouting profile for one team.
///
/// Sections that failed to aggregate are present but empty; consumers can
/// rely on every key existing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoutingProfile {
    pub team_name: String,
    pub matches_analyzed: u32,
    pub overview: TeamOverview,
    pub compositions: CompositionProfile,
    pub pistol_rounds: PistolProfile,
    pub players: PlayerProfile,
    pub round_patterns: RoundPatternProfile,
    pub weapon_economy: WeaponProfile,
    pub weaknesses: WeaknessReport,
}
