//! Detected weaknesses and the severity scale behind them.

use serde::{Deserialize, Serialize};

/// Severity of a detected weakness.
///
/// Declared most severe first so the derived ordering sorts HIGH ahead
/// of MEDIUM ahead of LOW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::Low => write!(f, "LOW"),
        }
    }
}

/// Category a weakness falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaknessCategory {
    #[serde(rename = "Map Pool")]
    MapPool,
    #[serde(rename = "Pistol Rounds")]
    PistolRounds,
    #[serde(rename = "Player Performance")]
    PlayerPerformance,
    #[serde(rename = "Post-Plant")]
    PostPlant,
}

impl WeaknessCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeaknessCategory::MapPool => "Map Pool",
            WeaknessCategory::PistolRounds => "Pistol Rounds",
            WeaknessCategory::PlayerPerformance => "Player Performance",
            WeaknessCategory::PostPlant => "Post-Plant",
        }
    }
}

impl std::fmt::Display for WeaknessCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected weakness with the evidence behind it and a concrete
/// counter-strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaknessFinding {
    pub category: WeaknessCategory,
    pub severity: Severity,
    pub finding: String,
    pub details: Vec<String>,
    pub recommendation: String,
}

/// All weaknesses detected for one team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaknessReport {
    pub team_name: String,
    pub total_weaknesses: u32,
    pub weaknesses: Vec<WeaknessFinding>,
    pub summary: String,
}

impl WeaknessReport {
    /// Findings at the given severity, in detection order.
    pub fn at_severity(&self, severity: Severity) -> impl Iterator<Item = &WeaknessFinding> {
        self.weaknesses.iter().filter(move |w| w.severity == severity)
    }
}
