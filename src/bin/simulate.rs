use clap::Parser;
use pacman_chase::constants::{START_LIVES, TICK_RATE};
use pacman_chase::engine::ghost_system::GhostPolicy;
use pacman_chase::engine::{GameEngine, GameEngineOptions};
use pacman_chase::types::{GamePhase, GhostMode, RuntimeEvent, Snapshot, Vec2f};
use pacman_chase::world::{tile_of, GridMap, LevelError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    level: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    lives: Option<i32>,
    #[arg(long)]
    runs: Option<usize>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulationConfig {
    ticks: u64,
    lives: i32,
    runs: usize,
    ghost: GhostPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: TICK_RATE as u64 * 60 * 5,
            lives: START_LIVES,
            runs: 1,
            ghost: GhostPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
enum SetupError {
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    ticks: u64,
    lives: i32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    phase: GamePhase,
    ticks: u64,
    score: u32,
    #[serde(rename = "livesLeft")]
    lives_left: i32,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: usize,
    #[serde(rename = "pelletsLeft")]
    pellets_left: usize,
    deaths: usize,
    #[serde(rename = "cuesPlayed")]
    cues_played: usize,
    #[serde(rename = "chaseGhostTicks")]
    chase_ghost_ticks: u64,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "phaseCounts")]
    phase_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64));
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed, run_started_at_ms));

    let (grid, config) = match load_setup(&cli) {
        Ok(setup) => setup,
        Err(error) => {
            emit_log(
                "error",
                "setup_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    };

    let scenarios = resolve_scenarios(&config, seed);
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut phase_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_score = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "ticks": scenario.ticks,
                "lives": scenario.lives,
                "width": grid.width(),
                "height": grid.height(),
                "pellets": grid.pellet_count(),
            }),
        );
        let scenario_run = run_scenario(&grid, &config.ghost, &scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_score += scenario_run.result.score as u64;
        *phase_counts
            .entry(phase_key(scenario_run.result.phase))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.result.ticks),
            json!({
                "phase": scenario_run.result.phase,
                "score": scenario_run.result.score,
                "deaths": scenario_run.result.deaths,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        phase_counts,
        total_anomalies,
        total_score,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "phaseCounts": summary.phase_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn load_setup(cli: &Cli) -> Result<(GridMap, SimulationConfig), SetupError> {
    let grid = match cli.level.as_deref() {
        Some(path) => GridMap::load(path)?,
        None => GridMap::classic()?,
    };
    let mut config = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(ticks) = cli.ticks {
        config.ticks = ticks;
    }
    if let Some(lives) = cli.lives {
        config.lives = lives;
    }
    if let Some(runs) = cli.runs {
        config.runs = runs;
    }
    config.lives = config.lives.max(1);
    config.runs = config.runs.clamp(1, 100);
    Ok((grid, config))
}

fn load_config(path: &Path) -> Result<SimulationConfig, SetupError> {
    let text = std::fs::read_to_string(path).map_err(|source| SetupError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text).map_err(|source| SetupError::ConfigParse {
        path: path.display().to_string(),
        source,
    })
}

fn parse_config(text: &str) -> Result<SimulationConfig, serde_json::Error> {
    serde_json::from_str(text)
}

fn resolve_scenarios(config: &SimulationConfig, seed: u32) -> Vec<Scenario> {
    (0..config.runs)
        .map(|idx| Scenario {
            name: format!("autopilot-{}", idx + 1),
            seed: seed.wrapping_add(idx as u32),
            ticks: config.ticks,
            lives: config.lives,
        })
        .collect()
}

fn run_scenario(
    grid: &GridMap,
    ghost_policy: &GhostPolicy,
    scenario: &Scenario,
) -> ScenarioRunResult {
    let mut engine = GameEngine::new(
        grid.clone(),
        scenario.seed,
        GameEngineOptions {
            lives: scenario.lives,
            ghost_policy: *ghost_policy,
            autopilot: true,
            ..GameEngineOptions::default()
        },
    );

    let mut pellets_eaten = 0;
    let mut deaths = 0;
    let mut cues_played = 0;
    let mut chase_ghost_ticks = 0u64;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();

    while !engine.is_ended() && engine.tick() < scenario.ticks {
        engine.step();
        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(&engine.grid, &snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        chase_ghost_ticks += snapshot
            .ghosts
            .iter()
            .filter(|ghost| ghost.mode == GhostMode::Chase)
            .count() as u64;
        for event in &snapshot.events {
            match event {
                RuntimeEvent::PelletEaten { .. } => pellets_eaten += 1,
                RuntimeEvent::PlayerCaught { .. } => deaths += 1,
                RuntimeEvent::CuePlayed { .. } => cues_played += 1,
                _ => {}
            }
        }
    }

    let last = engine.build_snapshot(false);
    if last.phase == GamePhase::LevelCleared && last.pellets_left != 0 {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            last.tick,
            format!("level cleared with {} pellets left", last.pellets_left),
        );
    }

    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            phase: last.phase,
            ticks: last.tick,
            score: last.score,
            lives_left: last.lives,
            pellets_eaten,
            pellets_left: last.pellets_left,
            deaths,
            cues_played,
            chase_ghost_ticks,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies(grid: &GridMap, snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    let mut check_actor = |label: String, x: f32, y: f32| {
        if !x.is_finite() || !y.is_finite() {
            anomalies.push(format!("{label} position is not finite"));
            return;
        }
        if x < 0.0 || x >= grid.pixel_width() || y < 0.0 || y >= grid.pixel_height() {
            anomalies.push(format!("{label} left the playfield"));
            return;
        }
        let tile = tile_of(Vec2f::new(x, y));
        if !grid.is_walkable(tile.x, tile.y) {
            anomalies.push(format!("{label} inside wall at ({}, {})", tile.x, tile.y));
        }
    };

    check_actor("player".to_string(), snapshot.player.x, snapshot.player.y);
    for ghost in &snapshot.ghosts {
        check_actor(format!("ghost {}", ghost.id), ghost.x, ghost.y);
    }

    if snapshot.lives < 0 {
        anomalies.push(format!("negative lives: {}", snapshot.lives));
    }
    anomalies
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    phase_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_score: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_score = if scenario_count == 0 {
        0
    } else {
        (total_score / scenario_count as u64) as u32
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_score,
        phase_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn phase_key(phase: GamePhase) -> String {
    match phase {
        GamePhase::Playing => "playing",
        GamePhase::LevelCleared => "level_cleared",
        GamePhase::GameOver => "game_over",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
