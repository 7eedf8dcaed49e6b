//! CLI entry point for the leaderboard tool.
//!
//! Loads a raw score sheet (and optionally a roster), computes period,
//! season and month leaderboards, and prints, exports or publishes them.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use leaderboard::{
    config::LeaderboardConfig,
    output::{self, View},
    parser::parse_score_sheet,
    publish::{LATEST_KEY, write_json_to_s3},
    report::Leaderboard,
    roster::Roster,
    source,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "leaderboard")]
#[command(about = "Ranked, normalized leaderboards from periodic raw scores", long_about = None)]
struct Cli {
    /// Score sheet: path, http(s) URL or s3://bucket/key
    #[arg(long, env = "SCORES_SOURCE", value_name = "FILE_OR_URL")]
    scores: String,

    /// Optional roster with display names: path, http(s) URL or s3://bucket/key
    #[arg(long, env = "ROSTER_SOURCE", value_name = "FILE_OR_URL")]
    roster: Option<String>,

    /// JSON config file (best_n, months)
    #[arg(short, long, env = "LEADERBOARD_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one period's leaderboard (defaults to the latest period)
    Period {
        #[arg(value_name = "PERIOD_ID")]
        id: Option<String>,

        #[arg(long, value_enum, default_value_t = View::Final)]
        view: View,
    },
    /// Show the best-N season leaderboard
    Season {
        #[arg(long, value_enum, default_value_t = View::Final)]
        view: View,
    },
    /// Show a month leaderboard (defaults to the latest complete month)
    Month {
        #[arg(value_name = "LABEL")]
        label: Option<String>,
    },
    /// Compute everything and write it out as JSON, CSV and/or to S3
    Report {
        /// JSON file to write (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Directory to write per-leaderboard CSV files into
        #[arg(long)]
        csv_dir: Option<String>,

        /// S3 bucket to publish the JSON report to (e.g., "my-bucket")
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Gzip compress the JSON before uploading to S3
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/leaderboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("leaderboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = LeaderboardConfig::resolve(cli.config.as_deref())?;

    let scores = source::load(&cli.scores).await?;
    let sheet = parse_score_sheet(&scores.body).context("Failed to parse score sheet")?;

    let roster = match &cli.roster {
        Some(src) => Roster::from_csv(&source::load(src).await?.body)
            .context("Failed to parse roster")?,
        None => Roster::default(),
    };

    // Timestamp comes from the source; it is metadata only.
    let board = Leaderboard::compute(&sheet, &config, scores.last_modified);

    match cli.command {
        Commands::Period { id, view } => {
            let Some(period_id) = id.as_deref().or(board.latest_period()) else {
                bail!("score sheet has no periods");
            };
            let Some(results) = board.period(period_id) else {
                bail!("unknown period {period_id:?}");
            };

            print_updated(&board);
            println!("{period_id}");
            print!("{}", output::period_table(results, &roster, view));
        }
        Commands::Season { view } => {
            print_updated(&board);
            println!("best {} periods", board.best_n);
            print!("{}", output::season_table(&board.season, &roster, view));
        }
        Commands::Month { label } => {
            let Some(label) = label.as_deref().or(board.latest_month()) else {
                bail!("no complete month is configured");
            };
            let Some(month) = board.month(label) else {
                if board.skipped_months.iter().any(|m| m == label) {
                    bail!("month {label:?} still has periods without scores");
                }
                bail!("unknown month {label:?}");
            };

            print_updated(&board);
            print!("{}", output::month_table(label, month, &roster));
        }
        Commands::Report {
            output: json_path,
            csv_dir,
            s3_bucket,
            gzip,
        } => {
            match json_path {
                Some(path) => {
                    std::fs::write(&path, output::to_json(&board)?)
                        .with_context(|| format!("Failed to write {path}"))?;
                    info!(path = %path, "Report written");
                }
                None => println!("{}", output::to_json(&board)?),
            }

            if let Some(dir) = csv_dir {
                write_csv_dir(&dir, &board, &config, &roster)?;
            }

            if let Some(bucket) = s3_bucket {
                let aws = aws_config::load_from_env().await;
                let s3 = aws_sdk_s3::Client::new(&aws);
                write_json_to_s3(&s3, &bucket, LATEST_KEY, &board, gzip).await?;
            }
        }
    }

    Ok(())
}

fn print_updated(board: &Leaderboard) {
    if let Some(ts) = board.last_updated {
        println!("last updated {}", ts.format("%Y-%m-%d %H:%M UTC"));
    }
}

/// Writes `periods/<id>.csv`, `season.csv` and `months/<label>.csv` under `dir`.
#[tracing::instrument(skip(board, config, roster))]
fn write_csv_dir(
    dir: &str,
    board: &Leaderboard,
    config: &LeaderboardConfig,
    roster: &Roster,
) -> Result<()> {
    let dir = Path::new(dir);
    std::fs::create_dir_all(dir.join("periods"))?;
    std::fs::create_dir_all(dir.join("months"))?;

    for (period_id, results) in board.periods.iter() {
        output::write_records(dir.join("periods").join(format!("{period_id}.csv")), results)?;
    }

    output::write_records(dir.join("season.csv"), &output::season_rows(&board.season, roster))?;

    for (label, month_periods) in config.months() {
        if let Some(month) = board.month(label) {
            output::write_month_csv(
                dir.join("months").join(format!("{label}.csv")),
                month_periods,
                month,
                roster,
            )?;
        }
    }

    info!(
        periods = board.periods.len(),
        months = board.months.len(),
        "CSV export complete"
    );
    Ok(())
}
