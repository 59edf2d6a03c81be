use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scout_agent::agents::ask::{detect_team, suggest_questions, AskOutcome, AskPipeline};
use scout_agent::agents::backend::{create_backend, AiBackend};
use scout_agent::analytics::head_to_head::head_to_head;
use scout_agent::analytics::{build_profile, title_case};
use scout_agent::config::AppConfig;
use scout_agent::models::ScoutingProfile;
use scout_agent::report::{ChatTurn, ReportGenerator};
use scout_agent::storage::{ReadOnlyDb, ScoutStore, TabularResult};

#[derive(Parser)]
#[command(name = "scout-agent")]
#[command(about = "Esports scouting report generator with AI-assisted querying")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Match database path (overrides config)
    #[arg(long)]
    db: Option<String>,

    /// Log level (trace, debug, info, warn, error); defaults to the config value
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every team in the match database
    Teams,

    /// Print a scouting profile for one team
    Scout {
        /// Team name (exact, case-sensitive)
        team: String,

        /// How many recent series to analyze
        #[arg(long)]
        matches: Option<u32>,

        /// Print the full profile as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Generate a full markdown scouting report
    Report {
        /// Team name (exact, case-sensitive)
        team: String,

        /// How many recent series to analyze
        #[arg(long)]
        matches: Option<u32>,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Head-to-head record between two teams
    HeadToHead {
        team1: String,
        team2: String,
    },

    /// Ask one natural-language question about the database
    Ask {
        question: String,

        /// Team context for the question (detected from the question if omitted)
        #[arg(long)]
        team: Option<String>,
    },

    /// Interactive chat about one team's scouting profile
    Chat {
        /// Team name (exact, case-sensitive)
        team: String,
    },

    /// Start the API server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&PathBuf::from(&cli.config))?;

    // Initialize tracing. RUST_LOG wins over the flag, the flag over config.
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting scout-agent v{}", env!("CARGO_PKG_VERSION"));

    let db_path = cli
        .db
        .map(PathBuf::from)
        .unwrap_or_else(|| config.database.path.clone());

    match cli.command {
        Commands::Teams => {
            let store = ScoutStore::open_read_only(&db_path)?;
            let teams = store.list_teams()?;
            if teams.is_empty() {
                println!("No teams found in {}", db_path.display());
            } else {
                println!("\n=== Teams ({}) ===", teams.len());
                for team in &teams {
                    println!("  {}", team);
                }
            }
        }
        Commands::Scout {
            team,
            matches,
            json,
        } => {
            let matches = clamp_matches(matches, &config);
            let store = ScoutStore::open_read_only(&db_path)?;
            let profile = build_profile(&store, &team, matches)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_profile_summary(&profile);
            }
        }
        Commands::Report {
            team,
            matches,
            output,
        } => {
            let matches = clamp_matches(matches, &config);
            let store = ScoutStore::open_read_only(&db_path)?;
            let profile = build_profile(&store, &team, matches)?;

            let generator = ReportGenerator::new(select_backend(&config));
            let report = generator.generate(&profile).await;

            match output {
                Some(path) => {
                    std::fs::write(&path, &report)?;
                    println!("Report written to {}", path);
                }
                None => println!("{}", report),
            }
        }
        Commands::HeadToHead { team1, team2 } => {
            let store = ScoutStore::open_read_only(&db_path)?;
            for name in [&team1, &team2] {
                if !store.team_exists(name)? {
                    bail!("no series recorded for team '{}'", name);
                }
            }
            let record = head_to_head(&store, &team1, &team2)?;

            println!("\n=== {} vs {} ===", record.team1, record.team2);
            println!(
                "Series: {} played, {} - {}",
                record.total_matches, record.team1_wins, record.team2_wins
            );
            for m in &record.matches {
                let winner = m.winner.as_deref().unwrap_or("no result");
                println!("  {}  {}  winner: {}", m.tournament, m.score, winner);
            }
        }
        Commands::Ask { question, team } => {
            let Some(backend) = select_backend(&config) else {
                bail!("ask requires an AI backend; set [ai] backend in {}", cli.config);
            };
            let pipeline = AskPipeline::with_min_interval(
                backend,
                Duration::from_secs(config.ai.min_call_interval_secs),
            );
            let db = ReadOnlyDb::new(db_path.clone(), config.database.busy_timeout_ms);

            let team = match team {
                Some(team) => Some(team),
                None => {
                    let store = ScoutStore::open_read_only(&db_path)?;
                    detect_team(&question, &store.list_teams()?)
                }
            };

            let outcome = pipeline.ask(&db, &question, team).await;
            print_outcome(&outcome);
        }
        Commands::Chat { team } => {
            let store = ScoutStore::open_read_only(&db_path)?;
            if !store.team_exists(&team)? {
                bail!("no series recorded for team '{}'", team);
            }
            let profile = build_profile(&store, &team, config.scouting.default_matches)?;
            let generator = ReportGenerator::new(select_backend(&config));

            println!("\n=== Scouting chat: {} ===", team);
            if !generator.is_configured() {
                println!("(no AI backend configured; answers come from the assembled profile)");
            }
            println!("Type a question, 'examples' for ideas, or 'quit' to leave.");

            let mut history: Vec<ChatTurn> = Vec::new();
            loop {
                print!("\n> ");
                std::io::stdout().flush()?;

                let mut line = String::new();
                if std::io::stdin().read_line(&mut line)? == 0 {
                    break;
                }
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                match question {
                    "quit" | "exit" => break,
                    "examples" => {
                        for q in suggest_questions(Some(&team)) {
                            println!("  - {}", q);
                        }
                        continue;
                    }
                    _ => {}
                }

                let answer = generator.chat(&profile, question, &history).await;
                println!("\n{}", answer);
                history.push(ChatTurn {
                    user: question.to_string(),
                    assistant: answer,
                });
            }
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let pipeline = select_backend(&config).map(|backend| {
                Arc::new(AskPipeline::with_min_interval(
                    backend,
                    Duration::from_secs(config.ai.min_call_interval_secs),
                ))
            });
            let state = scout_agent::api::state::AppState {
                db_path: Arc::new(db_path),
                config: Arc::new(config),
                pipeline,
            };
            let app = scout_agent::api::build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Scouting API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

/// Build the configured AI backend, if any. `backend = "none"` and
/// construction failures both disable AI features instead of aborting;
/// every command still works on the assembled data alone.
fn select_backend(config: &AppConfig) -> Option<Arc<dyn AiBackend>> {
    if config.ai.backend == "none" {
        tracing::info!("AI backend disabled by config");
        return None;
    }
    match create_backend(&config.ai) {
        Ok(backend) => {
            tracing::info!("Using {} backend ({})", backend.name(), config.ai.model);
            Some(backend)
        }
        Err(e) => {
            tracing::warn!("AI backend unavailable, continuing without it: {}", e);
            None
        }
    }
}

fn clamp_matches(requested: Option<u32>, config: &AppConfig) -> u32 {
    requested
        .unwrap_or(config.scouting.default_matches)
        .clamp(1, config.scouting.max_matches)
}

fn print_profile_summary(profile: &ScoutingProfile) {
    let overview = &profile.overview;
    println!("\n=== Scouting Profile: {} ===", profile.team_name);
    println!(
        "Record:  {} ({:.1}% win rate over the last {} series)",
        overview.series_record, overview.win_rate, profile.matches_analyzed
    );

    if !overview.recent_series.is_empty() {
        println!("\nRecent series:");
        for s in &overview.recent_series {
            println!("  vs {:<16} {}  ({})  {}", s.opponent, s.result, s.score, s.tournament);
        }
    }

    if !overview.map_stats.is_empty() {
        println!("\nMaps:");
        for map in &overview.map_stats {
            println!(
                "  {:<10} {:>5.1}% WR ({}/{} games), avg round diff {:+.1}",
                title_case(&map.map),
                map.win_rate,
                map.wins,
                map.games,
                map.avg_round_diff
            );
        }
    }

    if !profile.players.players.is_empty() {
        println!("\nPlayers:");
        for p in &profile.players.players {
            let kd = p
                .kd_ratio
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "n/a".to_string());
            let agents: Vec<String> = p
                .agent_pool
                .iter()
                .take(3)
                .map(|a| title_case(&a.agent))
                .collect();
            println!(
                "  {:<12} KD {:<5} ({}K/{}D/{}A in {} games)  {}",
                p.name,
                kd,
                p.kills,
                p.deaths,
                p.assists,
                p.games,
                agents.join(", ")
            );
        }
    }

    let pistols = &profile.pistol_rounds;
    println!(
        "\nPistols:  {:.1}% overall ({:.1}% attack, {:.1}% defense)",
        pistols.overall_pistol_win_rate, pistols.attack_pistol.win_rate, pistols.defense_pistol.win_rate
    );

    let weaknesses = &profile.weaknesses;
    if weaknesses.total_weaknesses > 0 {
        println!("\nWeaknesses ({}):", weaknesses.total_weaknesses);
        for w in &weaknesses.weaknesses {
            println!("  [{}] {}: {}", w.severity, w.category, w.finding);
        }
    } else {
        println!("\nNo significant weaknesses detected in this window.");
    }
}

fn print_outcome(outcome: &AskOutcome) {
    if let Some(ref sql) = outcome.sql {
        println!("\nSQL: {}", sql);
    }
    if let Some(ref error) = outcome.error {
        eprintln!("Error: {}", error);
        return;
    }
    if let Some(ref interpretation) = outcome.interpretation {
        println!("\n{}", interpretation);
    } else if let Some(ref results) = outcome.results {
        print_table(results);
    }
}

fn print_table(results: &TabularResult) {
    if results.is_empty() {
        println!("\n(no rows)");
        return;
    }
    println!("\n{}", results.columns.join(" | "));
    for row in &results.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
    println!("({} rows)", results.row_count);
}
