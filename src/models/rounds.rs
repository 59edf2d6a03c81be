//! Round-level patterns: how a team closes rounds and converts plants.

use serde::{Deserialize, Serialize};

/// Side a team played during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Attack,
    Defense,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Attack => "attack",
            Side::Defense => "defense",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a round was won, as recorded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinCondition {
    #[serde(rename = "opponentEliminated")]
    Elimination,
    #[serde(rename = "bombExploded")]
    BombExploded,
    #[serde(rename = "bombDefused")]
    BombDefused,
    #[serde(rename = "timeExpired")]
    TimeExpired,
}

impl WinCondition {
    /// Parses the stored win type. Unknown values yield `None` so callers
    /// can skip them instead of guessing.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "opponentEliminated" => Some(WinCondition::Elimination),
            "bombExploded" => Some(WinCondition::BombExploded),
            "bombDefused" => Some(WinCondition::BombDefused),
            "timeExpired" => Some(WinCondition::TimeExpired),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WinCondition::Elimination => "opponentEliminated",
            WinCondition::BombExploded => "bombExploded",
            WinCondition::BombDefused => "bombDefused",
            WinCondition::TimeExpired => "timeExpired",
        }
    }
}

/// Frequency of one win condition on one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinConditionCount {
    pub condition: WinCondition,
    pub count: u32,
}

/// Winning-round conditions split by side, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinConditionBreakdown {
    pub attack: Vec<WinConditionCount>,
    pub defense: Vec<WinConditionCount>,
}

/// Post-plant outcomes for one side. On attack this measures holding a
/// plant to detonation, on defense it measures the retake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPlantStat {
    pub side: Side,
    pub situations: u32,
    pub wins: u32,
    pub conversion_rate: f64,
}

/// Round pattern profile for one team over the sampled window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundPatternProfile {
    pub team_name: String,
    pub win_conditions: WinConditionBreakdown,
    pub post_plant: Vec<PostPlantStat>,
}

impl RoundPatternProfile {
    /// Post-plant stats for one side, if any plants were sampled.
    pub fn post_plant_for(&self, side: Side) -> Option<&PostPlantStat> {
        self.post_plant.iter().find(|p| p.side == side)
    }
}
