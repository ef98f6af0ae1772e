use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use maze_chase_engine::constants::TICK_MS;
use maze_chase_engine::engine::ChaseEngine;
use maze_chase_engine::rng::Rng;
use maze_chase_engine::types::{
    Direction, EngineOptions, GameOverReason, GhostState, RuntimeEvent, Snapshot,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    ambush_offset: Option<i32>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    ticks: u64,
    seed: u32,
    #[serde(rename = "ambushOffset")]
    ambush_offset: i32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    ticks: u64,
    reason: GameOverReason,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    level: u32,
    score: i32,
    #[serde(rename = "dotsEaten")]
    dots_eaten: i32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: i32,
    #[serde(rename = "livesLost")]
    lives_lost: i32,
    #[serde(rename = "frightWindows")]
    fright_windows: i32,
    stalls: i32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
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
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let started_at = now_stamp();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| format!("sim-{seed_hint}"));

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
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
                "ambushOffset": scenario.ambush_offset,
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }
        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *reason_counts
            .entry(reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "durationMs": scenario_run.result.duration_ms,
                "level": scenario_run.result.level,
                "score": scenario_run.result.score,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let summary = RunSummary {
        match_id: match_id.clone(),
        started_at,
        finished_at: now_stamp(),
        scenario_count: scenario_results.len(),
        anomaly_count: total_anomalies,
        reason_counts,
        scenarios: scenario_results,
    };

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
            "reasonCounts": summary.reason_counts,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut engine = ChaseEngine::new(
        scenario.seed,
        EngineOptions {
            ambush_offset: scenario.ambush_offset,
            fright_ms_override: None,
        },
    );
    let mut steer_rng = Rng::new(scenario.seed ^ 0x5157_ce11);

    let mut lives_lost = 0;
    let mut fright_windows = 0;
    let mut stalls = 0;
    let mut last_dots_eaten = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;

    for _ in 0..scenario.ticks {
        if engine.is_ended() {
            break;
        }
        let dir = steer(&engine.build_snapshot(false), &mut steer_rng);
        engine.set_player_direction(dir);
        engine.step(TICK_MS);
        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;

        for event in &snapshot.events {
            match event {
                RuntimeEvent::LifeLost { .. } => lives_lost += 1,
                RuntimeEvent::EnergizerEaten { .. } => fright_windows += 1,
                RuntimeEvent::GhostStalled { .. } => stalls += 1,
                // A clear swaps in a fresh dot field mid-tick; the per-level
                // eaten counter legitimately restarts from zero.
                RuntimeEvent::LevelCleared { .. } => last_dots_eaten = 0,
                _ => {}
            }
        }
        for message in collect_snapshot_anomalies(&snapshot, last_dots_eaten) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_dots_eaten = snapshot.dots_eaten;
    }

    let summary = engine.build_summary();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            ticks: scenario.ticks,
            reason: summary.reason,
            duration_ms: summary.duration_ms,
            level: summary.level,
            score: summary.score,
            dots_eaten: summary.dots_eaten,
            ghosts_eaten: summary.ghosts_eaten,
            lives_lost,
            fright_windows,
            stalls,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

/// Steering policy for the headless player: hold the current heading most
/// ticks, rerolling occasionally (and immediately while idle) so the walk
/// covers the maze without ever consulting ghost positions.
fn steer(snapshot: &Snapshot, rng: &mut Rng) -> Direction {
    if snapshot.player.dir != Direction::None && !rng.chance(0.12) {
        return snapshot.player.dir;
    }
    match rng.index(4) {
        0 => Direction::Up,
        1 => Direction::Left,
        2 => Direction::Down,
        _ => Direction::Right,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, last_dots_eaten: i32) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.dots_remaining < 0 {
        anomalies.push(format!("negative dots remaining: {}", snapshot.dots_remaining));
    }
    if snapshot.dots_remaining == 0 {
        // clear_level refills the field within the same tick; a post-step
        // snapshot never legitimately shows an empty maze.
        anomalies.push("dot field empty without a level reset".to_string());
    }
    if snapshot.dots_eaten < last_dots_eaten {
        anomalies.push(format!(
            "eaten-dot count went backwards: {} -> {}",
            last_dots_eaten, snapshot.dots_eaten
        ));
    }
    if snapshot.player.lives < 0 {
        anomalies.push(format!("negative lives: {}", snapshot.player.lives));
    }
    if snapshot.ghosts.len() != 4 {
        anomalies.push(format!("expected 4 ghosts, saw {}", snapshot.ghosts.len()));
    }
    for ghost in &snapshot.ghosts {
        // Bounds of the standard layout the engine runs on.
        if ghost.x < 0 || ghost.y < 0 || ghost.x >= 21 || ghost.y >= 15 {
            anomalies.push(format!(
                "ghost {} out of bounds at ({},{})",
                serde_json::to_string(&ghost.role).unwrap_or_default(),
                ghost.x,
                ghost.y
            ));
        }
        if ghost.state == GhostState::Frightened && ghost.dir == Direction::None {
            anomalies.push("frightened ghost lost its facing".to_string());
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let ambush_offset = cli.ambush_offset.unwrap_or(4);

    if cli.single || cli.ticks.is_some() {
        let ticks = cli.ticks.unwrap_or(20 * 60 * 3).clamp(1, 20 * 60 * 30);
        return vec![Scenario {
            name: format!("custom-{ticks}t"),
            ticks,
            seed,
            ambush_offset,
        }];
    }

    vec![
        Scenario {
            name: "quick-check".to_string(),
            ticks: 20 * 60,
            seed,
            ambush_offset,
        },
        Scenario {
            name: "long-haul".to_string(),
            ticks: 20 * 60 * 5,
            seed: seed.wrapping_add(1),
            ambush_offset,
        },
    ]
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

fn reason_key(reason: GameOverReason) -> String {
    match reason {
        GameOverReason::OutOfLives => "out_of_lives",
        GameOverReason::Aborted => "aborted",
    }
    .to_string()
}

fn now_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
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
        timestamp: now_stamp(),
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
