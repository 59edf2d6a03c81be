//! Rule-based weakness detection.
//!
//! Works entirely on already-aggregated sections; detection never goes
//! back to storage. Rules only fire on real samples: a side with zero
//! sampled pistol rounds is unknown, not weak. Severity is HIGH or
//! MEDIUM by rule; LOW exists on the scale for report consumers but is
//! never assigned automatically.

use std::cmp::Ordering;

use crate::models::{
    PistolProfile, PlayerProfile, RoundPatternProfile, Severity, Side, TeamOverview,
    WeaknessCategory, WeaknessFinding, WeaknessReport,
};

use super::title_case;

const MAP_MIN_GAMES: u32 = 3;
const MAP_WEAK_WR: f64 = 45.0;
const MAP_CRITICAL_WR: f64 = 35.0;
const PISTOL_WEAK_WR: f64 = 40.0;
const PISTOL_CRITICAL_WR: f64 = 30.0;
const PLAYER_MIN_GAMES: u32 = 3;
const PLAYER_WEAK_KD: f64 = 0.9;
const RETAKE_WEAK_RATE: f64 = 35.0;

/// Applies every detection rule and summarizes the result.
pub fn detect_weaknesses(
    team: &str,
    overview: &TeamOverview,
    pistols: &PistolProfile,
    players: &PlayerProfile,
    patterns: &RoundPatternProfile,
) -> WeaknessReport {
    let mut weaknesses = Vec::new();

    map_pool_rule(overview, &mut weaknesses);
    pistol_rules(pistols, &mut weaknesses);
    player_rule(players, &mut weaknesses);
    retake_rule(patterns, &mut weaknesses);

    let summary = summarize(&weaknesses);
    WeaknessReport {
        team_name: team.to_string(),
        total_weaknesses: weaknesses.len() as u32,
        weaknesses,
        summary,
    }
}

fn map_pool_rule(overview: &TeamOverview, out: &mut Vec<WeaknessFinding>) {
    let weak_maps: Vec<_> = overview
        .map_stats
        .iter()
        .filter(|m| m.games >= MAP_MIN_GAMES && m.win_rate < MAP_WEAK_WR)
        .collect();
    let Some(worst) = weak_maps
        .iter()
        .min_by(|a, b| a.win_rate.partial_cmp(&b.win_rate).unwrap_or(Ordering::Equal))
    else {
        return;
    };

    let severity = if weak_maps.iter().any(|m| m.win_rate < MAP_CRITICAL_WR) {
        Severity::High
    } else {
        Severity::Medium
    };
    out.push(WeaknessFinding {
        category: WeaknessCategory::MapPool,
        severity,
        finding: format!("Struggles on {} map(s)", weak_maps.len()),
        details: weak_maps
            .iter()
            .map(|m| {
                format!(
                    "{}: {:.1}% WR ({}/{} games)",
                    title_case(&m.map),
                    m.win_rate,
                    m.wins,
                    m.games
                )
            })
            .collect(),
        recommendation: format!("Force {} in map veto", title_case(&worst.map)),
    });
}

fn pistol_rules(pistols: &PistolProfile, out: &mut Vec<WeaknessFinding>) {
    let attack = &pistols.attack_pistol;
    let defense = &pistols.defense_pistol;

    if attack.total > 0 && attack.win_rate < PISTOL_WEAK_WR {
        out.push(WeaknessFinding {
            category: WeaknessCategory::PistolRounds,
            severity: pistol_severity(attack.win_rate),
            finding: format!("Weak attack pistol rounds ({:.1}%)", attack.win_rate),
            details: vec![format!(
                "Attack: {:.1}% vs Defense: {:.1}%",
                attack.win_rate, defense.win_rate
            )],
            recommendation: "Expect defensive pistol wins, prepare for anti-eco".to_string(),
        });
    }
    if defense.total > 0 && defense.win_rate < PISTOL_WEAK_WR {
        out.push(WeaknessFinding {
            category: WeaknessCategory::PistolRounds,
            severity: pistol_severity(defense.win_rate),
            finding: format!("Weak defense pistol rounds ({:.1}%)", defense.win_rate),
            details: vec![format!(
                "Defense: {:.1}% vs Attack: {:.1}%",
                defense.win_rate, attack.win_rate
            )],
            recommendation: "Aggressive attack pistol executes will succeed".to_string(),
        });
    }
}

fn pistol_severity(win_rate: f64) -> Severity {
    if win_rate < PISTOL_CRITICAL_WR {
        Severity::High
    } else {
        Severity::Medium
    }
}

fn player_rule(players: &PlayerProfile, out: &mut Vec<WeaknessFinding>) {
    let weak_players: Vec<_> = players
        .players
        .iter()
        .filter(|p| {
            p.games >= PLAYER_MIN_GAMES && p.kd_ratio.is_some_and(|kd| kd < PLAYER_WEAK_KD)
        })
        .collect();
    let Some(target) = weak_players.iter().min_by(|a, b| {
        a.kd_ratio
            .partial_cmp(&b.kd_ratio)
            .unwrap_or(Ordering::Equal)
    }) else {
        return;
    };

    out.push(WeaknessFinding {
        category: WeaknessCategory::PlayerPerformance,
        severity: Severity::Medium,
        finding: format!("{} player(s) underperforming (KD < 0.9)", weak_players.len()),
        details: weak_players
            .iter()
            .map(|p| format!("{}: {:.2} KD", p.name, p.kd_ratio.unwrap_or_default()))
            .collect(),
        recommendation: format!("Target {} in duels", target.name),
    });
}

fn retake_rule(patterns: &RoundPatternProfile, out: &mut Vec<WeaknessFinding>) {
    let Some(retake) = patterns.post_plant_for(Side::Defense) else {
        return;
    };
    if retake.situations == 0 || retake.conversion_rate >= RETAKE_WEAK_RATE {
        return;
    }
    out.push(WeaknessFinding {
        category: WeaknessCategory::PostPlant,
        severity: Severity::Medium,
        finding: format!("Poor retake ability ({:.1}%)", retake.conversion_rate),
        details: vec![format!("Retake: {}/{}", retake.wins, retake.situations)],
        recommendation: "Prioritize spike plants - they struggle to retake".to_string(),
    });
}

fn summarize(weaknesses: &[WeaknessFinding]) -> String {
    if weaknesses.is_empty() {
        return "No significant weaknesses identified - well-rounded team.".to_string();
    }
    let high: Vec<_> = weaknesses
        .iter()
        .filter(|w| w.severity == Severity::High)
        .collect();
    if high.is_empty() {
        format!("Found {} exploitable weakness(es)", weaknesses.len())
    } else {
        let categories = high
            .iter()
            .map(|w| w.category.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CRITICAL: {} major weakness(es) - {}",
            high.len(),
            categories
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        MapStat, PlayerStat, PostPlantStat, SidePistolStats, WinConditionBreakdown,
    };

    fn overview_with_maps(map_stats: Vec<MapStat>) -> TeamOverview {
        TeamOverview {
            team_name: "Sentinels".to_string(),
            map_stats,
            ..Default::default()
        }
    }

    fn map_stat(map: &str, games: u32, wins: u32) -> MapStat {
        MapStat {
            map: map.to_string(),
            games,
            wins,
            win_rate: crate::analytics::rates::percent(wins, games),
            avg_round_diff: 0.0,
        }
    }

    fn pistol_profile(attack: (u32, u32), defense: (u32, u32)) -> PistolProfile {
        let side = |(wins, total): (u32, u32)| SidePistolStats {
            total,
            wins,
            win_rate: crate::analytics::rates::percent(wins, total),
            by_map: vec![],
        };
        PistolProfile {
            team_name: "Sentinels".to_string(),
            attack_pistol: side(attack),
            defense_pistol: side(defense),
            overall_pistol_win_rate: 0.0,
        }
    }

    fn player(name: &str, games: u32, kills: u32, deaths: u32) -> PlayerStat {
        PlayerStat {
            name: name.to_string(),
            games,
            kills,
            deaths,
            assists: 0,
            kd_ratio: crate::analytics::rates::kd(kills, deaths),
            kda: crate::analytics::rates::kda(kills, 0, deaths),
            agent_pool: vec![],
        }
    }

    fn patterns_with_retake(wins: u32, situations: u32) -> RoundPatternProfile {
        RoundPatternProfile {
            team_name: "Sentinels".to_string(),
            win_conditions: WinConditionBreakdown::default(),
            post_plant: vec![PostPlantStat {
                side: Side::Defense,
                situations,
                wins,
                conversion_rate: crate::analytics::rates::percent(wins, situations),
            }],
        }
    }

    fn empty_report_inputs() -> (PistolProfile, PlayerProfile, RoundPatternProfile) {
        (
            pistol_profile((0, 0), (0, 0)),
            PlayerProfile::default(),
            RoundPatternProfile::default(),
        )
    }

    #[test]
    fn test_one_win_in_four_games_is_a_high_severity_map_weakness() {
        let overview = overview_with_maps(vec![map_stat("icebox", 4, 1)]);
        let (pistols, players, patterns) = empty_report_inputs();

        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert_eq!(report.total_weaknesses, 1);

        let finding = &report.weaknesses[0];
        assert_eq!(finding.category, WeaknessCategory::MapPool);
        assert_eq!(finding.severity, Severity::High);
        assert!(finding.details[0].contains("25.0% WR"), "{:?}", finding.details);
        assert_eq!(finding.recommendation, "Force Icebox in map veto");
        assert!(report.summary.starts_with("CRITICAL: 1 major weakness(es)"));
        assert!(report.summary.contains("Map Pool"));
    }

    #[test]
    fn test_map_rule_severity_steps_at_forty_five_and_thirty_five() {
        let (pistols, players, patterns) = empty_report_inputs();

        // 50% is healthy.
        let healthy = overview_with_maps(vec![map_stat("bind", 10, 5)]);
        let report = detect_weaknesses("Sentinels", &healthy, &pistols, &players, &patterns);
        assert!(report.weaknesses.is_empty());

        // 40% is weak but not critical.
        let weak = overview_with_maps(vec![map_stat("bind", 10, 4)]);
        let report = detect_weaknesses("Sentinels", &weak, &pistols, &players, &patterns);
        assert_eq!(report.weaknesses[0].severity, Severity::Medium);

        // 30% crosses the critical line.
        let critical = overview_with_maps(vec![map_stat("bind", 10, 3)]);
        let report = detect_weaknesses("Sentinels", &critical, &pistols, &players, &patterns);
        assert_eq!(report.weaknesses[0].severity, Severity::High);
    }

    #[test]
    fn test_map_rule_needs_three_games() {
        let (pistols, players, patterns) = empty_report_inputs();
        let overview = overview_with_maps(vec![map_stat("split", 2, 0)]);
        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert!(report.weaknesses.is_empty());
    }

    #[test]
    fn test_veto_recommendation_names_lowest_win_rate_map() {
        let (pistols, players, patterns) = empty_report_inputs();
        let overview = overview_with_maps(vec![
            map_stat("ascent", 5, 2),
            map_stat("icebox", 5, 1),
            map_stat("bind", 5, 2),
        ]);
        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert_eq!(report.weaknesses[0].recommendation, "Force Icebox in map veto");
    }

    #[test]
    fn test_weak_attack_pistols_point_at_defensive_pistol_advantage() {
        let overview = overview_with_maps(vec![]);
        let pistols = pistol_profile((2, 10), (6, 10));
        let (_, players, patterns) = empty_report_inputs();

        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert_eq!(report.total_weaknesses, 1);

        let finding = &report.weaknesses[0];
        assert_eq!(finding.category, WeaknessCategory::PistolRounds);
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.finding, "Weak attack pistol rounds (20.0%)");
        assert!(
            finding.recommendation.contains("defensive pistol wins"),
            "{}",
            finding.recommendation
        );
    }

    #[test]
    fn test_both_pistol_sides_can_flag_independently() {
        let overview = overview_with_maps(vec![]);
        let pistols = pistol_profile((3, 10), (3, 10));
        let (_, players, patterns) = empty_report_inputs();

        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert_eq!(report.total_weaknesses, 2);
        assert_eq!(
            report.weaknesses[1].recommendation,
            "Aggressive attack pistol executes will succeed"
        );
    }

    #[test]
    fn test_zero_pistol_sample_is_not_a_weakness() {
        let overview = overview_with_maps(vec![]);
        let (pistols, players, patterns) = empty_report_inputs();
        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert!(report.weaknesses.is_empty());
        assert_eq!(
            report.summary,
            "No significant weaknesses identified - well-rounded team."
        );
    }

    #[test]
    fn test_player_rule_targets_lowest_kd() {
        let overview = overview_with_maps(vec![]);
        let (pistols, _, patterns) = empty_report_inputs();
        let players = PlayerProfile {
            team_name: "Sentinels".to_string(),
            players: vec![
                player("fine", 5, 60, 50),
                player("shaky", 5, 40, 50),
                player("worst", 5, 30, 50),
                player("rookie", 2, 5, 20),
            ],
        };

        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert_eq!(report.total_weaknesses, 1);

        let finding = &report.weaknesses[0];
        assert_eq!(finding.severity, Severity::Medium);
        // rookie is below 0.9 but has only two sampled games.
        assert_eq!(finding.finding, "2 player(s) underperforming (KD < 0.9)");
        assert_eq!(finding.recommendation, "Target worst in duels");
    }

    #[test]
    fn test_undefined_kd_never_flags() {
        let overview = overview_with_maps(vec![]);
        let (pistols, _, patterns) = empty_report_inputs();
        let players = PlayerProfile {
            team_name: "Sentinels".to_string(),
            players: vec![player("deathless", 5, 0, 0)],
        };

        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert!(report.weaknesses.is_empty());
    }

    #[test]
    fn test_poor_retakes_flag_below_thirty_five() {
        let overview = overview_with_maps(vec![]);
        let (pistols, players, _) = empty_report_inputs();
        let patterns = patterns_with_retake(2, 10);

        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert_eq!(report.total_weaknesses, 1);

        let finding = &report.weaknesses[0];
        assert_eq!(finding.category, WeaknessCategory::PostPlant);
        assert_eq!(finding.finding, "Poor retake ability (20.0%)");
        assert_eq!(finding.details, vec!["Retake: 2/10"]);
    }

    #[test]
    fn test_healthy_retakes_do_not_flag() {
        let overview = overview_with_maps(vec![]);
        let (pistols, players, _) = empty_report_inputs();
        let patterns = patterns_with_retake(4, 10);

        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert!(report.weaknesses.is_empty());
    }

    #[test]
    fn test_summary_counts_without_high_findings() {
        let overview = overview_with_maps(vec![map_stat("bind", 10, 4)]);
        let (pistols, players, _) = empty_report_inputs();
        let patterns = patterns_with_retake(2, 10);

        let report = detect_weaknesses("Sentinels", &overview, &pistols, &players, &patterns);
        assert_eq!(report.summary, "Found 2 exploitable weakness(es)");
    }
}
