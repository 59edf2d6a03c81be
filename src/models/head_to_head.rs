//! Head-to-head history between two named teams.

use serde::{Deserialize, Serialize};

/// One series between the two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadMatch {
    pub tournament: String,
    /// Map score normalized so the first number belongs to `team1`.
    pub score: String,
    /// Winning team's name. `None` when the series has no recorded winner.
    pub winner: Option<String>,
}

/// Full head-to-head record, symmetric in the two team arguments:
/// swapping them swaps the win counts and flips the score strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
    pub team1: String,
    pub team2: String,
    pub total_matches: u32,
    pub team1_wins: u32,
    pub team2_wins: u32,
    /// All series between the two teams, oldest first.
    pub matches: Vec<HeadToHeadMatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_round_trip() {
        let record = HeadToHeadRecord {
            team1: "Sentinels".to_string(),
            team2: "Cloud9".to_string(),
            total_matches: 3,
            team1_wins: 2,
            team2_wins: 1,
            matches: vec![HeadToHeadMatch {
                tournament: "VCT Americas".to_string(),
                score: "2-0".to_string(),
                winner: Some("Sentinels".to_string()),
            }],
        };

        let json = serde_json::to_string(&record).unwrap();
        let parsed: HeadToHeadRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, parsed);
    }
}
