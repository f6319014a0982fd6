use std::collections::{BTreeMap, BTreeSet};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::RuntimeConfig;

/// Everything the crate records about a run. Serialized with the event name in
/// an `event` field next to the envelope in [`TelemetryRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum TelemetryEvent {
    #[serde(rename = "command.started")]
    CommandStarted { profile: String },
    #[serde(rename = "command.completed")]
    CommandCompleted,
    #[serde(rename = "command.failed")]
    CommandFailed { category: String, error: String },
    #[serde(rename = "dialogue.turn")]
    DialogueTurn {
        round: u32,
        agent_index: usize,
        llm_used: String,
    },
    #[serde(rename = "dialogue.completed")]
    DialogueCompleted {
        form: String,
        turns: usize,
        providers: Vec<String>,
        latency_ms: u64,
    },
    #[serde(rename = "critique.completed")]
    CritiqueCompleted {
        judge_provider: String,
        judge_model: String,
    },
    #[serde(rename = "critique.failed")]
    CritiqueFailed {
        judge_provider: String,
        judge_model: String,
    },
    #[serde(rename = "server.started")]
    ServerStarted {
        host: String,
        port: u16,
        profile: String,
        output_dir: String,
    },
    #[serde(rename = "server.generate")]
    ServerGenerate {
        filename: String,
        use_openrouter: bool,
        critique: bool,
    },
    /// Lines written by other versions of the tool.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub ts_unix_ms: i64,
    pub run_id: String,
    pub command: String,
    #[serde(flatten)]
    pub event: TelemetryEvent,
}

/// Appends one JSON line per event. Disabled sinks drop everything; write
/// failures are logged and never abort the command.
#[derive(Debug, Clone)]
pub struct TelemetrySink {
    pub enabled: bool,
    pub path: PathBuf,
    pub run_id: String,
    pub command: String,
}

impl TelemetrySink {
    pub fn new(cfg: &RuntimeConfig, command: String) -> Self {
        Self {
            enabled: cfg.telemetry_enabled,
            path: PathBuf::from(&cfg.telemetry_path),
            run_id: format!(
                "run-{}-{}",
                chrono::Utc::now().timestamp_millis(),
                std::process::id()
            ),
            command,
        }
    }

    pub fn emit(&self, event: TelemetryEvent) {
        if !self.enabled {
            return;
        }
        let record = TelemetryRecord {
            ts_unix_ms: chrono::Utc::now().timestamp_millis(),
            run_id: self.run_id.clone(),
            command: self.command.clone(),
            event,
        };
        if let Err(err) = append_record(&self.path, &record) {
            tracing::warn!(path = %self.path.display(), error = %err, "telemetry write failed");
        }
    }
}

fn append_record(path: &Path, record: &TelemetryRecord) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create telemetry directory '{}'", parent.display()))?;
    }
    let mut line = serde_json::to_string(record).context("failed to serialize telemetry event")?;
    line.push('\n');
    // One write per line keeps concurrent server handlers from interleaving.
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(line.as_bytes()))
        .with_context(|| format!("failed to append to telemetry file '{}'", path.display()))
}

/// What the dialogue runs in a telemetry file add up to.
#[derive(Debug, Default)]
pub struct DialogueStats {
    pub total_lines: usize,
    pub parsed_events: usize,
    pub parse_errors: usize,
    pub runs: BTreeSet<String>,
    pub commands_completed: usize,
    pub commands_failed: usize,
    pub failure_categories: BTreeMap<String, usize>,
    /// Turns per `llm_used` label, e.g. "Claude (Claude Sonnet 4)".
    pub turns_by_model: BTreeMap<String, usize>,
    pub dialogues_by_form: BTreeMap<String, usize>,
    pub dialogue_latency_ms: Vec<u64>,
    /// Completed critiques per judge company.
    pub judges: BTreeMap<String, usize>,
    pub critiques_failed: usize,
    pub web_generations: usize,
    pub last_event_ts_unix_ms: Option<i64>,
}

impl DialogueStats {
    pub fn turns(&self) -> usize {
        self.turns_by_model.values().sum()
    }

    pub fn dialogues(&self) -> usize {
        self.dialogues_by_form.values().sum()
    }

    pub fn critiques(&self) -> usize {
        self.judges.values().sum()
    }

    pub fn mean_latency_ms(&self) -> Option<u64> {
        let count = self.dialogue_latency_ms.len() as u64;
        (count > 0).then(|| self.dialogue_latency_ms.iter().sum::<u64>() / count)
    }

    fn record(&mut self, record: TelemetryRecord) {
        self.parsed_events += 1;
        if !record.run_id.is_empty() {
            self.runs.insert(record.run_id);
        }
        self.last_event_ts_unix_ms = self.last_event_ts_unix_ms.max(Some(record.ts_unix_ms));

        match record.event {
            TelemetryEvent::CommandCompleted => self.commands_completed += 1,
            TelemetryEvent::CommandFailed { category, .. } => {
                self.commands_failed += 1;
                *self.failure_categories.entry(category).or_default() += 1;
            }
            TelemetryEvent::DialogueTurn { llm_used, .. } => {
                *self.turns_by_model.entry(llm_used).or_default() += 1;
            }
            TelemetryEvent::DialogueCompleted {
                form, latency_ms, ..
            } => {
                *self.dialogues_by_form.entry(form).or_default() += 1;
                self.dialogue_latency_ms.push(latency_ms);
            }
            TelemetryEvent::CritiqueCompleted { judge_provider, .. } => {
                *self.judges.entry(judge_provider).or_default() += 1;
            }
            TelemetryEvent::CritiqueFailed { .. } => self.critiques_failed += 1,
            TelemetryEvent::ServerGenerate { .. } => self.web_generations += 1,
            TelemetryEvent::CommandStarted { .. }
            | TelemetryEvent::ServerStarted { .. }
            | TelemetryEvent::Unknown => {}
        }
    }
}

/// Folds the newest `limit` lines (at least one) into [`DialogueStats`].
pub fn summarize_telemetry_lines(lines: &[String], limit: usize) -> DialogueStats {
    let mut stats = DialogueStats {
        total_lines: lines.len(),
        ..DialogueStats::default()
    };
    for line in lines.iter().rev().take(limit.max(1)) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<TelemetryRecord>(line) {
            Ok(record) => stats.record(record),
            Err(_) => stats.parse_errors += 1,
        }
    }
    stats
}

fn print_counts(heading: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    let mut ranked = counts.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    println!("{heading}:");
    for (name, count) in ranked {
        println!("- {name}: {count}");
    }
}

pub fn run_telemetry_report(
    cfg: &RuntimeConfig,
    path_override: Option<String>,
    limit: usize,
) -> Result<()> {
    let path = PathBuf::from(path_override.unwrap_or_else(|| cfg.telemetry_path.clone()));
    if !path.exists() {
        println!("No telemetry file found at '{}'.", path.display());
        return Ok(());
    }

    let file = std::fs::File::open(&path)
        .with_context(|| format!("failed to open telemetry file '{}'", path.display()))?;
    let lines = BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to read telemetry file '{}'", path.display()))?;
    let stats = summarize_telemetry_lines(&lines, limit);

    println!("Telemetry report for {}", path.display());
    println!(
        "{} events from {} runs ({} lines, {} unreadable)",
        stats.parsed_events,
        stats.runs.len(),
        stats.total_lines,
        stats.parse_errors
    );
    println!(
        "Commands: {} completed, {} failed",
        stats.commands_completed, stats.commands_failed
    );
    print_counts("Failures by category", &stats.failure_categories);
    println!(
        "Dialogues: {} ({} turns, {} from the web interface)",
        stats.dialogues(),
        stats.turns(),
        stats.web_generations
    );
    if let Some(mean) = stats.mean_latency_ms() {
        println!("Mean dialogue latency: {mean} ms");
    }
    print_counts("Forms", &stats.dialogues_by_form);
    print_counts("Turns by model", &stats.turns_by_model);
    println!(
        "Critiques: {} completed, {} failed",
        stats.critiques(),
        stats.critiques_failed
    );
    print_counts("Judges", &stats.judges);
    if let Some(ts) = stats
        .last_event_ts_unix_ms
        .and_then(chrono::DateTime::from_timestamp_millis)
    {
        println!("Last event: {}", ts.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}
