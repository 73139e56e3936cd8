use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tourney_sync::config::{Config, Selectors, SourceMap};
use tourney_sync::renderer::HttpLauncher;
use tourney_sync::scraper::{ExtractOptions, LinkDiscoverer, RecordExtractor};
use tourney_sync::store::JsonStore;
use tourney_sync::{report, Monitor, Result, SyncEngine, SyncError, SyncMode};

const USAGE: &str = "\
Usage:
  tourney-sync sync <year> [interval_secs] [--full] [--limit N]
  tourney-sync report <year> [--stake X] [--round NAME]... [--json]
  tourney-sync years";

#[derive(Debug, PartialEq)]
enum Command {
    Sync {
        year: i32,
        interval: Option<Duration>,
        mode: SyncMode,
        limit: Option<usize>,
    },
    Report {
        year: i32,
        stake: f64,
        rounds: Vec<String>,
        json: bool,
    },
    Years,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> std::result::Result<Command, String> {
    let mut args = args.into_iter();
    let command = args.next().ok_or("Missing command")?;
    let mut year = None;
    let mut positional = Vec::new();
    let mut mode = SyncMode::Incremental;
    let mut limit = None;
    let mut stake = 1000.0;
    let mut rounds = Vec::new();
    let mut json = false;

    while let Some(a) = args.next() {
        match a.as_str() {
            "--full" => mode = SyncMode::Full,
            "--limit" => {
                let v = args.next().ok_or("Missing value for --limit")?;
                limit = Some(v.parse().map_err(|_| format!("Invalid limit: {v}"))?);
            }
            "--stake" => {
                let v = args.next().ok_or("Missing value for --stake")?;
                stake = tourney_sync::config::parse_decimal(&v)
                    .filter(|s| *s > 0.0)
                    .ok_or_else(|| format!("Invalid stake: {v}"))?;
            }
            "--round" => rounds.push(args.next().ok_or("Missing value for --round")?),
            "--json" => json = true,
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {flag}")),
            _ if year.is_none() => {
                year = Some(a.parse::<i32>().map_err(|_| format!("Invalid year: {a}"))?);
            }
            _ => positional.push(a),
        }
    }

    let need_year = || year.ok_or_else(|| "Missing year".to_string());
    match command.as_str() {
        "sync" => {
            let interval = match positional.as_slice() {
                [] => None,
                [secs] => Some(Duration::from_secs(
                    secs.parse::<u64>()
                        .ok()
                        .filter(|s| *s > 0)
                        .ok_or_else(|| format!("Invalid interval: {secs}"))?,
                )),
                _ => return Err("Too many arguments".into()),
            };
            Ok(Command::Sync {
                year: need_year()?,
                interval,
                mode,
                limit,
            })
        }
        "report" if positional.is_empty() => Ok(Command::Report {
            year: need_year()?,
            stake,
            rounds,
            json,
        }),
        "years" if year.is_none() => Ok(Command::Years),
        other => Err(format!("Unexpected arguments for {other}")),
    }
}

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            std::process::exit(1);
        }
    };

    match run(cfg, command).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {e}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the command succeeded.
async fn run(cfg: Config, command: Command) -> Result<bool> {
    match command {
        Command::Years => {
            let sources = SourceMap::load(&cfg.sources_file)?;
            for year in sources.years() {
                println!("{year}");
            }
            Ok(true)
        }
        Command::Report {
            year,
            stake,
            rounds,
            json,
        } => {
            let store = JsonStore::new(&cfg.data_dir);
            let dataset = store.load(year)?.ok_or_else(|| {
                SyncError::Config(format!("no data for {year} in {}", cfg.data_dir.display()))
            })?;
            let summary = report::summarize(&dataset, stake, &rounds);
            if json {
                let text = serde_json::to_string_pretty(&summary).map_err(|source| {
                    SyncError::Json {
                        path: store.path(year),
                        source,
                    }
                })?;
                println!("{text}");
            } else {
                print_summary(&summary, &report::rounds(&dataset));
            }
            Ok(true)
        }
        Command::Sync {
            year,
            interval,
            mode,
            limit,
        } => {
            let sources = SourceMap::load(&cfg.sources_file)?;
            let launcher = HttpLauncher {
                request_timeout: cfg.request_timeout,
            };
            let monitor = Monitor::new(launcher, engine(&cfg, mode, limit), &sources, year)?;
            match interval {
                Some(interval) => {
                    monitor.run_loop(interval).await;
                    Ok(true)
                }
                None => {
                    let report = monitor.run_once().await?;
                    if !report.succeeded() {
                        info!("no matches found");
                    }
                    Ok(report.succeeded())
                }
            }
        }
    }
}

fn engine(cfg: &Config, mode: SyncMode, limit: Option<usize>) -> SyncEngine {
    let selectors = Selectors::default();
    SyncEngine {
        store: JsonStore::new(&cfg.data_dir),
        discoverer: LinkDiscoverer::new(selectors.clone(), cfg.wait_timeout),
        extractor: RecordExtractor::new(ExtractOptions {
            selectors,
            bookmaker: cfg.bookmaker.clone(),
            walkover_marker: cfg.walkover_marker.clone(),
            min_odds: cfg.min_odds,
            wait_timeout: cfg.wait_timeout,
        }),
        tournament_label: cfg.tournament_label.clone(),
        mode,
        limit,
    }
}

fn print_summary(summary: &report::Summary, rounds: &[String]) {
    println!("{} - {} matches, stake {:.0}", summary.tournament, summary.matches, summary.stake);
    for (label, stats) in [("Underdog", &summary.underdog), ("Favorite", &summary.favorite)] {
        println!(
            "  {label:<9} won {:>3} lost {:>3}  win rate {:>5.1}%  profit {:>+10.0}  ROI {:>+6.1}%",
            stats.wins, stats.losses, stats.win_rate, stats.total_profit, stats.roi
        );
    }
    if let Some(upset) = &summary.biggest_upset {
        println!(
            "  Biggest upset: {} ({:.2}) beat {} in {}",
            upset.underdog, upset.odds, upset.favorite, upset.round
        );
    }
    if !rounds.is_empty() {
        println!("  Rounds: {}", rounds.join(", "));
    }
}
