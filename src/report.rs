//! Scouting report rendering.
//!
//! The generator asks the AI backend for a narrative report built from a
//! [`ScoutingProfile`]. Every AI path has a statistical fallback so reports
//! still render with no backend configured or mid-outage.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agents::backend::{AiBackend, ChatMessage, ChatRequest};
use crate::analytics::title_case;
use crate::models::{MapStat, ScoutingProfile, Severity};

/// One question/answer exchange, passed back in by chat callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
}

/// Chat turns included as context for follow-up questions.
const CHAT_HISTORY_TURNS: usize = 5;

/// Renders narrative scouting output, with or without an AI backend.
pub struct ReportGenerator {
    backend: Option<Arc<dyn AiBackend>>,
}

impl ReportGenerator {
    pub fn new(backend: Option<Arc<dyn AiBackend>>) -> Self {
        Self { backend }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Full scouting report. AI-written when a backend is available,
    /// otherwise the statistical fallback.
    pub async fn generate(&self, profile: &ScoutingProfile) -> String {
        let Some(backend) = &self.backend else {
            return fallback_report(profile);
        };

        let request = ChatRequest::new(vec![ChatMessage::user(build_report_prompt(profile))])
            .with_temperature(0.7)
            .with_max_tokens(8192);

        match backend.chat(request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!("AI report generation failed, using fallback: {}", e);
                fallback_report(profile)
            }
        }
    }

    /// One-paragraph summary of current form.
    pub async fn quick_summary(&self, profile: &ScoutingProfile) -> String {
        let Some(backend) = &self.backend else {
            return fallback_summary(profile);
        };

        let prompt = format!(
            "In 2-3 sentences, summarize this VALORANT team's current form and key characteristics:\n\n\
             Team: {}\nData: {}\n\n\
             Be specific with numbers. Focus on win rate, best maps, and recent form.",
            profile.team_name,
            pretty(&profile.overview)
        );

        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(0.7)
            .with_max_tokens(200);

        match backend.chat(request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!("AI summary failed, using fallback: {}", e);
                fallback_summary(profile)
            }
        }
    }

    /// Answer a follow-up question about an already-built profile.
    pub async fn chat(
        &self,
        profile: &ScoutingProfile,
        question: &str,
        history: &[ChatTurn],
    ) -> String {
        let Some(backend) = &self.backend else {
            return fallback_chat(profile, question);
        };

        let prompt = build_chat_prompt(profile, question, history);
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(0.7)
            .with_max_tokens(2048);

        match backend.chat(request).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!("AI chat failed, using fallback: {}", e);
                fallback_chat(profile, question)
            }
        }
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn build_report_prompt(profile: &ScoutingProfile) -> String {
    format!(
        "You are a professional VALORANT esports analyst creating a scouting report for a \
         coaching staff.\n\n\
         Generate a comprehensive, actionable scouting report for the opponent team: **{team}**\n\n\
         Use the following data to create your analysis. Be specific with numbers and \
         percentages. Focus on actionable insights.\n\n\
         ## RAW DATA:\n\n\
         ### Team Overview\n{overview}\n\n\
         ### Team Compositions\n{compositions}\n\n\
         ### Pistol Round Performance\n{pistols}\n\n\
         ### Player Statistics\n{players}\n\n\
         ### Round Win Patterns\n{rounds}\n\n\
         ### Weapon Economy\n{weapons}\n\n\
         ### Team Weaknesses Analysis\n{weaknesses}\n\n\
         ---\n\n\
         ## REPORT FORMAT\n\n\
         Generate the scouting report with these sections:\n\n\
         ### TEAM OVERVIEW\n\
         - Recent form and series record\n\
         - Best and worst maps (with win rates)\n\
         - Overall strength assessment\n\n\
         ### COMMON STRATEGIES\n\
         - Attack-side tendencies (pistol rounds, preferred executes)\n\
         - Defense-side tendencies (setups, rotations)\n\
         - Post-plant behavior (conversion rates)\n\n\
         ### KEY PLAYER TENDENCIES\n\
         - Star players to watch (highest KD)\n\
         - Player agent pools and comfort picks\n\
         - Potential weak links\n\n\
         ### AGENT COMPOSITIONS\n\
         - Most played compositions per map\n\
         - Role distribution preferences\n\
         - Flex picks and pocket picks\n\n\
         ### WEAKNESSES & EXPLOITS (CRITICAL SECTION)\n\
         - List ALL identified weaknesses from the data\n\
         - Rate severity (HIGH/MEDIUM/LOW)\n\
         - Specific recommendations for each weakness\n\
         - This should be the most detailed section\n\n\
         ### HOW TO WIN (Counter-Strategy Recommendations)\n\
         - Exploitable weaknesses based on data\n\
         - Map veto suggestions\n\
         - Agent counter-picks\n\
         - Tactical adjustments to make\n\n\
         Be concise but thorough. Use bullet points. Include specific percentages and \
         statistics to back up every claim.",
        team = profile.team_name,
        overview = pretty(&profile.overview),
        compositions = pretty(&profile.compositions),
        pistols = pretty(&profile.pistol_rounds),
        players = pretty(&profile.players),
        rounds = pretty(&profile.round_patterns),
        weapons = pretty(&profile.weapon_economy),
        weaknesses = pretty(&profile.weaknesses),
    )
}

fn build_chat_prompt(profile: &ScoutingProfile, question: &str, history: &[ChatTurn]) -> String {
    let mut history_context = String::new();
    if !history.is_empty() {
        history_context.push_str("\n\nPrevious conversation:\n");
        let start = history.len().saturating_sub(CHAT_HISTORY_TURNS);
        for turn in &history[start..] {
            history_context.push_str(&format!(
                "User: {}\nAssistant: {}\n",
                turn.user, turn.assistant
            ));
        }
    }

    format!(
        "You are a VALORANT esports analyst assistant. Answer the user's question about {team} \
         using ONLY the data provided below.\n\n\
         Be specific with numbers and percentages. If the data doesn't contain information to \
         answer the question, say so.\n\n\
         ## TEAM DATA:\n{data}{history}\n\n\
         ## USER QUESTION:\n{question}\n\n\
         Provide a concise, data-backed answer. Use bullet points for clarity when listing \
         multiple items.",
        team = profile.team_name,
        data = pretty(profile),
        history = history_context,
        question = question,
    )
}

fn fallback_summary(profile: &ScoutingProfile) -> String {
    format!(
        "{} has a {} record ({:.1}% WR) in recent matches.",
        profile.team_name, profile.overview.series_record, profile.overview.win_rate
    )
}

fn best_map(stats: &[MapStat]) -> Option<&MapStat> {
    stats.iter().max_by(|a, b| a.win_rate.total_cmp(&b.win_rate))
}

fn worst_map(stats: &[MapStat]) -> Option<&MapStat> {
    stats.iter().min_by(|a, b| a.win_rate.total_cmp(&b.win_rate))
}

fn format_kd(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Statistical report used when no AI backend is configured or the
/// backend call fails.
fn fallback_report(profile: &ScoutingProfile) -> String {
    let overview = &profile.overview;
    let pistol = &profile.pistol_rounds;
    let mut report = format!(
        "# SCOUTING REPORT: {}\n\n---\n\n## TEAM OVERVIEW\n\n\
         **Recent Form:** {} ({:.1}% win rate)\n\n**Recent Matches:**\n",
        profile.team_name.to_uppercase(),
        overview.series_record,
        overview.win_rate
    );

    for series in overview.recent_series.iter().take(5) {
        report.push_str(&format!(
            "- vs {}: {} ({}) - {}\n",
            series.opponent, series.result, series.score, series.tournament
        ));
    }

    report.push_str("\n**Map Performance:**\n");
    for m in overview.map_stats.iter().take(5) {
        report.push_str(&format!(
            "- {}: {:.1}% WR ({}/{} games), Avg Round Diff: {:+.1}\n",
            title_case(&m.map),
            m.win_rate,
            m.wins,
            m.games,
            m.avg_round_diff
        ));
    }

    report.push_str(&format!(
        "\n---\n\n## PISTOL ROUND TENDENCIES\n\n\
         **Attack Pistol:** {:.1}% win rate ({}/{})\n\
         **Defense Pistol:** {:.1}% win rate ({}/{})\n\
         **Overall Pistol:** {:.1}%\n",
        pistol.attack_pistol.win_rate,
        pistol.attack_pistol.wins,
        pistol.attack_pistol.total,
        pistol.defense_pistol.win_rate,
        pistol.defense_pistol.wins,
        pistol.defense_pistol.total,
        pistol.overall_pistol_win_rate
    ));

    report.push_str("\n---\n\n## PLAYER STATISTICS\n\n");
    for p in profile.players.players.iter().take(5) {
        report.push_str(&format!(
            "**{}** - KD: {}, KDA: {}\n  - Stats: {}K / {}D / {}A over {} games\n",
            p.name,
            format_kd(p.kd_ratio),
            format_kd(p.kda),
            p.kills,
            p.deaths,
            p.assists,
            p.games
        ));
        if !p.agent_pool.is_empty() {
            let agents = p
                .agent_pool
                .iter()
                .take(3)
                .map(|a| format!("{} ({})", title_case(&a.agent), a.games))
                .collect::<Vec<_>>()
                .join(", ");
            report.push_str(&format!("  - Agent Pool: {}\n", agents));
        }
        report.push('\n');
    }

    report.push_str("---\n\n## AGENT COMPOSITIONS\n\n");
    for (map_name, comps) in &profile.compositions.compositions_by_map {
        report.push_str(&format!("**{}:**\n", title_case(map_name)));
        for c in comps.iter().take(2) {
            report.push_str(&format!(
                "- {} ({:.1}%, played {}x)\n",
                c.agents, c.pick_rate, c.times_played
            ));
        }
        report.push('\n');
    }

    report.push_str("**Overall Agent Picks:**\n");
    for a in profile.compositions.agent_picks.iter().take(8) {
        report.push_str(&format!(
            "- {} ({}): {:.1}% pick rate\n",
            title_case(&a.agent),
            a.role,
            a.pick_rate
        ));
    }

    report.push_str("\n---\n\n## WEAPON PREFERENCES\n\n");
    for w in profile.weapon_economy.weapon_usage.iter().take(5) {
        report.push_str(&format!(
            "- {}: {} kills across {} games\n",
            title_case(&w.weapon),
            w.kills,
            w.games_used
        ));
    }

    report.push_str("\n---\n\n## WEAKNESSES & EXPLOITS\n\n");
    let weaknesses = &profile.weaknesses;
    if weaknesses.weaknesses.is_empty() {
        report.push_str("*No significant weaknesses identified - this is a well-rounded team.*\n");
    } else {
        report.push_str(&format!("**Summary:** {}\n\n", weaknesses.summary));
        for severity in [Severity::High, Severity::Medium, Severity::Low] {
            let group: Vec<_> = weaknesses.at_severity(severity).collect();
            if group.is_empty() {
                continue;
            }
            report.push_str(&format!("### {} Priority\n", severity));
            for w in group {
                report.push_str(&format!("- **{}**: {}\n", w.category, w.finding));
                if !w.recommendation.is_empty() {
                    report.push_str(&format!("  - *Recommendation:* {}\n", w.recommendation));
                }
            }
            report.push('\n');
        }
    }

    report.push_str("---\n\n## HOW TO WIN\n\n");
    report.push_str(
        "**Note:** Configure an AI backend for detailed counter-strategy recommendations.\n\n\
         **Basic recommendations based on data:**\n",
    );

    if let (Some(best), Some(worst)) = (best_map(&overview.map_stats), worst_map(&overview.map_stats))
    {
        report.push_str(&format!(
            "- **BAN** {} ({:.1}% WR) - their best map\n",
            title_case(&best.map),
            best.win_rate
        ));
        report.push_str(&format!(
            "- **PICK** {} ({:.1}% WR) - their worst map\n",
            title_case(&worst.map),
            worst.win_rate
        ));
    }

    let attack = pistol.attack_pistol.win_rate;
    let defense = pistol.defense_pistol.win_rate;
    if attack > defense + 10.0 {
        report.push_str(&format!(
            "- Focus on winning **attack pistols** - their defense pistol is weaker \
             ({:.1}% vs {:.1}%)\n",
            defense, attack
        ));
    } else if defense > attack + 10.0 {
        report.push_str(&format!(
            "- Focus on winning **defense pistols** - their attack pistol is weaker \
             ({:.1}% vs {:.1}%)\n",
            attack, defense
        ));
    }

    report.push_str(&format!(
        "\n---\n*Report generated {} from {} analyzed series*\n",
        Utc::now().format("%Y-%m-%d %H:%M UTC"),
        profile.matches_analyzed
    ));

    report
}

/// Keyword-routed answers used when no AI backend is configured.
fn fallback_chat(profile: &ScoutingProfile, question: &str) -> String {
    let q = question.to_lowercase();
    let team = &profile.team_name;
    let contains_any = |words: &[&str]| words.iter().any(|w| q.contains(w));

    if contains_any(&["weakness", "weak", "exploit", "bad"]) {
        if profile.weaknesses.weaknesses.is_empty() {
            return format!("No significant weaknesses identified for {}.", team);
        }
        let mut response = format!("**{}'s Weaknesses:**\n\n", team);
        for w in &profile.weaknesses.weaknesses {
            response.push_str(&format!("- **{}** - {}: {}\n", w.severity, w.category, w.finding));
        }
        return response;
    }

    if contains_any(&["best map", "good map", "strongest map"]) {
        return match best_map(&profile.overview.map_stats) {
            Some(best) => format!(
                "**{}'s best map is {}** with a {:.1}% win rate ({}/{} games).",
                team,
                title_case(&best.map),
                best.win_rate,
                best.wins,
                best.games
            ),
            None => "No map data available.".to_string(),
        };
    }

    if contains_any(&["worst map", "weakest map"]) {
        return match worst_map(&profile.overview.map_stats) {
            Some(worst) => format!(
                "**{}'s worst map is {}** with a {:.1}% win rate ({}/{} games). \
                 Consider forcing this map in veto.",
                team,
                title_case(&worst.map),
                worst.win_rate,
                worst.wins,
                worst.games
            ),
            None => "No map data available.".to_string(),
        };
    }

    if contains_any(&["best player", "star", "carry", "top player"]) {
        let best = profile
            .players
            .players
            .iter()
            .max_by(|a, b| a.kd_ratio.unwrap_or(0.0).total_cmp(&b.kd_ratio.unwrap_or(0.0)));
        return match best {
            Some(p) => {
                let agents = p
                    .agent_pool
                    .iter()
                    .take(3)
                    .map(|a| title_case(&a.agent))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "**{}'s star player is {}** with a {} KD ({}K/{}D). Main agents: {}",
                    team,
                    p.name,
                    format_kd(p.kd_ratio),
                    p.kills,
                    p.deaths,
                    agents
                )
            }
            None => "No player data available.".to_string(),
        };
    }

    if contains_any(&["pistol"]) {
        let pistol = &profile.pistol_rounds;
        return format!(
            "**{}'s Pistol Performance:**\n- Attack pistol: {:.1}%\n- Defense pistol: {:.1}%\n\
             - Overall: {:.1}%",
            team,
            pistol.attack_pistol.win_rate,
            pistol.defense_pistol.win_rate,
            pistol.overall_pistol_win_rate
        );
    }

    if contains_any(&["agent", "comp", "composition", "pick"]) {
        let picks = &profile.compositions.agent_picks;
        if picks.is_empty() {
            return "No composition data available.".to_string();
        }
        let mut response = format!("**{}'s Top Agents:**\n", team);
        for a in picks.iter().take(5) {
            response.push_str(&format!(
                "- {} ({}): {:.1}% pick rate\n",
                title_case(&a.agent),
                a.role,
                a.pick_rate
            ));
        }
        return response;
    }

    if contains_any(&["record", "form", "recent", "win"]) {
        let overview = &profile.overview;
        let mut response = format!(
            "**{}'s Recent Form:** {} ({:.1}% WR)\n\n",
            team, overview.series_record, overview.win_rate
        );
        for series in overview.recent_series.iter().take(5) {
            response.push_str(&format!(
                "- vs {}: {} ({})\n",
                series.opponent, series.result, series.score
            ));
        }
        return response;
    }

    format!(
        "To answer specific questions about {}, configure an AI backend. Available topics: \
         weaknesses, maps, players, pistol rounds, compositions, recent form.",
        team
    )
}
