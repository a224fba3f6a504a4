use log::{debug, info, warn};

use lucky_draw::session::{DrawSession, DrawState, SessionError, SessionSettings};
use lucky_draw::session::{DEFAULT_SUSPENSE, DEFAULT_WINNERS};
use lucky_draw::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::draw::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;

#[derive(Debug, Snafu)]
pub enum DrawCliError {
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening JSON file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Cannot read a positive integer from {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("The delimiter must be a single ASCII character, got {delimiter:?}"))]
    InvalidDelimiter { delimiter: String },
    #[snafu(display("Error writing the summary to {path}: {source}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No participant file: use --input or a configuration file"))]
    MissingInput {},
    #[snafu(display("{source}"))]
    Session { source: SessionError },
    #[snafu(display("{source}"))]
    Drawing { source: DrawError },
    #[snafu(display("The draw was cancelled"))]
    Cancelled {},
    #[snafu(display("Difference detected between the draw and the reference summary"))]
    ReferenceMismatch {},
}

pub type DrawCliResult<T> = Result<T, DrawCliError>;
pub type BDrawCliResult<T> = Result<T, Box<DrawCliError>>;

/// Everything needed to run a draw, once the configuration file and the
/// command line have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DrawPlan {
    pub contest_name: Option<String>,
    pub contest_date: Option<String>,
    pub input_path: PathBuf,
    pub winners: i64,
    pub seed: Option<u64>,
    pub suspense: Duration,
    pub parse_options: ParseOptions,
    pub out: Option<String>,
    pub reference: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: Option<String>,
    pub date: Option<String>,
    pub source: String,
    pub participants: usize,
    #[serde(rename = "requestedWinners")]
    pub requested_winners: i64,
    pub seed: Option<u64>,
}

/// Merges the configuration file (if any) with the command line. The command line wins.
pub fn build_plan(args: &Args) -> BDrawCliResult<DrawPlan> {
    let config: Option<DrawConfig> = match &args.config {
        Some(path) => Some(read_config(path)?),
        None => None,
    };
    let root_dir: PathBuf = args
        .config
        .as_deref()
        .and_then(|p| Path::new(p).parent())
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    let source = config.as_ref().map(|c| &c.participant_source);
    let output = config.as_ref().map(|c| &c.output_settings);
    let rules = config.as_ref().map(|c| &c.rules);

    let input_path: PathBuf = match (&args.input, source) {
        (Some(input), _) => PathBuf::from(input),
        (None, Some(s)) => root_dir.join(&s.file_path),
        (None, None) => return Err(Box::new(DrawCliError::MissingInput {})),
    };

    let mut parse_options = ParseOptions::default();
    let config_numbers = source.and_then(|s| s.number_columns.clone());
    let config_names = source.and_then(|s| s.name_columns.clone());
    for cols in [config_numbers, args.number_column.clone()].into_iter().flatten() {
        parse_options.number_columns.extend(cols);
    }
    for cols in [config_names, args.name_column.clone()].into_iter().flatten() {
        parse_options.name_columns.extend(cols);
    }
    parse_options.delimiter = match (args.delimiter, source.and_then(|s| s.delimiter.clone())) {
        (Some(c), _) => read_delimiter(c.encode_utf8(&mut [0; 4]))?,
        (None, Some(d)) => read_delimiter(&d)?,
        (None, None) => io_csv::infer_delimiter(&input_path),
    };

    let seed = match (args.seed, rules) {
        (Some(seed), _) => Some(seed),
        (None, Some(r)) => r.random_seed()?,
        (None, None) => None,
    };

    let out = args.out.clone().or_else(|| {
        output
            .and_then(|o| o.output_directory.as_ref())
            .map(|dir| root_dir.join(dir).join("summary.json").display().to_string())
    });

    Ok(DrawPlan {
        contest_name: output.and_then(|o| o.contest_name.clone()),
        contest_date: output.and_then(|o| o.contest_date.clone()),
        input_path,
        winners: args
            .winners
            .or_else(|| rules.and_then(|r| r.number_of_winners))
            .unwrap_or(DEFAULT_WINNERS),
        seed,
        suspense: args
            .suspense_ms
            .or_else(|| rules.and_then(|r| r.suspense_millis))
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_SUSPENSE),
        parse_options,
        out,
        reference: args.reference.clone(),
    })
}

fn build_summary_js(
    plan: &DrawPlan,
    participants: &ParticipantSet,
    rejected: &[RejectedRow],
    winners: &DrawResult,
) -> JSValue {
    let c = OutputConfig {
        contest: plan.contest_name.clone(),
        date: plan.contest_date.clone(),
        source: io_common::simplify_file_name(&plan.input_path),
        participants: participants.len(),
        requested_winners: plan.winners,
        seed: plan.seed,
    };
    let results: Vec<JSValue> = winners
        .ranked()
        .map(|(rank, p)| json!({"rank": rank, "number": p.number(), "name": p.name()}))
        .collect();
    let rejected_rows: Vec<JSValue> = rejected
        .iter()
        .map(|r| match &r.reason {
            RejectReason::InvalidNumber(value) => {
                json!({"line": r.line, "reason": "invalidNumber", "value": value})
            }
            RejectReason::BlankName => json!({"line": r.line, "reason": "blankName"}),
        })
        .collect();
    json!({
        "config": c,
        "results": results,
        "rejectedRows": rejected_rows })
}

fn new_spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn write_summary(out: &str, pretty_js: &str) -> BDrawCliResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js);
        return Ok(());
    }
    let p = Path::new(out);
    if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).context(WritingSummarySnafu { path: out })?;
    }
    info!("Writing summary to {:?}", out);
    fs::write(p, pretty_js).context(WritingSummarySnafu { path: out })?;
    Ok(())
}

fn check_reference(summary_path: &str, pretty_js_stats: &str) -> BDrawCliResult<()> {
    let summary_ref = read_summary(summary_path)?;
    debug!("reference summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return Err(Box::new(DrawCliError::ReferenceMismatch {}));
    }
    Ok(())
}

/// Runs a full draw: read the participants, wait for the suspense, print the winners
/// and produce the summary.
pub async fn run_draw(args: &Args) -> BDrawCliResult<()> {
    let plan = build_plan(args)?;
    info!("plan: {:?}", plan);

    let raw = io_csv::read_participants(&plan.input_path)?;
    let mut session = DrawSession::new(SessionSettings {
        suspense: plan.suspense,
        seed: plan.seed,
        parse_options: plan.parse_options.clone(),
        ..SessionSettings::default()
    });
    session.upload(&raw).context(SessionSnafu {})?;
    for r in session.rejected_rows() {
        warn!("Line {}: row dropped: {:?}", r.line, r.reason);
    }
    session.set_requested_winners(plan.winners);

    let mut rx = session.subscribe();
    session.start_draw().context(SessionSnafu {})?;
    let spinner = new_spinner("Drawing the winners...");
    let state = tokio::select! {
        res = rx.wait_for(|s| s.state != DrawState::Drawing) => {
            res.map(|s| s.state.clone()).unwrap_or(DrawState::Idle)
        }
        _ = tokio::signal::ctrl_c() => {
            session.cancel();
            DrawState::Idle
        }
    };
    spinner.finish_and_clear();

    let winners = match state {
        DrawState::Succeeded(winners) => winners,
        DrawState::Failed(e) => return Err(e).context(DrawingSnafu {}).map_err(Box::new),
        DrawState::Idle | DrawState::Drawing => {
            return Err(Box::new(DrawCliError::Cancelled {}));
        }
    };
    for (rank, w) in winners.ranked() {
        println!("Winner {}: {}", rank, w);
    }

    let result_js = build_summary_js(
        &plan,
        session.participants(),
        session.rejected_rows(),
        &winners,
    );
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    if let Some(out) = &plan.out {
        write_summary(out, &pretty_js_stats)?;
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &plan.reference {
        check_reference(summary_p, &pretty_js_stats)?;
    }

    Ok(())
}
