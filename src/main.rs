use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use eyre::{bail, Result};
use log::info;
use triarb::arb::projection::{self, Report};
use triarb::config::Config;
use triarb::feed::SnapshotDir;
use triarb::utils::constants::{exchange_name, EXCHANGES};
use triarb::utils::logger::{level_from_env, setup_logger};
use triarb::{DetectError, Detector, ExchangeScan, FetchError};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding one `<exchange_id>.json` snapshot per exchange
    #[arg(long, global = true)]
    snapshot_dir: Option<PathBuf>,

    /// Longest cycle considered, in hops
    #[arg(long, global = true)]
    max_hops: Option<usize>,

    /// Report cycles compounding above this multiplier
    #[arg(long, global = true)]
    min_multiplier: Option<f64>,

    /// Edge visits allowed per search (0 for unlimited)
    #[arg(long, global = true)]
    max_visits: Option<u64>,

    /// Wall-clock budget per search in milliseconds (0 for unlimited)
    #[arg(long, global = true)]
    deadline_ms: Option<u64>,

    /// Number of opportunities reported per exchange
    #[arg(long, global = true)]
    top: Option<usize>,

    /// Search on the current thread only
    #[arg(long, global = true)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the given exchange ids (all known exchanges when none are given)
    Scan { exchanges: Vec<String> },
    /// List the known exchanges
    Exchanges,
}

impl Cli {
    /// Applies the command line flags on top of the environment.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.snapshot_dir {
            config.snapshot_dir.clone_from(dir);
        }
        if let Some(hops) = self.max_hops {
            config.search.max_hops = hops;
        }
        if let Some(min) = self.min_multiplier {
            config.search.min_multiplier = min;
        }
        if let Some(visits) = self.max_visits {
            config.search.max_visits = (visits > 0).then_some(visits);
        }
        if let Some(ms) = self.deadline_ms {
            config.search.deadline = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(top) = self.top {
            config.top = top;
        }
        if self.sequential {
            config.search.parallel = false;
        }
        config
    }
}

fn print_scan(scan: &ExchangeScan) {
    match &scan.result {
        Ok(detection) => {
            if detection.is_partial() {
                println!("(partial result for {}: search budget exhausted)", scan.name);
            }
            if detection.top.is_empty() {
                let (hops, multiplier) = detection.report();
                let report = Report {
                    exchange: &scan.name,
                    hops,
                    multiplier,
                };
                println!("{report}");
            }
            for opportunity in &detection.top {
                let report = Report {
                    exchange: &scan.name,
                    hops: Some(projection::hops(opportunity)),
                    multiplier: opportunity.multiplier(),
                };
                println!("{report}");
            }
        }
        Err(DetectError::Fetch {
            source: FetchError::UnknownExchange(id),
            ..
        }) => println!("Exchange ID '{id}' not found"),
        Err(e) => println!("An error occurred with {}: {e}", scan.name),
    }
}

/// Per-exchange timings, followed by their sum when benchmarking.
fn timings(scans: &[ExchangeScan], benchmark: bool) -> Vec<String> {
    let mut lines = vec!["Benchmark results (time taken per exchange):".to_string()];
    for scan in scans {
        let secs = scan.elapsed.as_secs_f64();
        lines.push(format!("{}: {secs:.2} seconds", scan.name));
    }
    if benchmark {
        let total: Duration = scans.iter().map(|scan| scan.elapsed).sum();
        let secs = total.as_secs_f64();
        lines.push(format!("Total execution time: {secs:.2} seconds."));
    }
    lines
}

async fn scan(config: &Config, ids: Vec<String>) -> Result<()> {
    let detector = Detector::new(config.search.clone())?.with_top(config.top);
    let source = SnapshotDir::new(&config.snapshot_dir);

    let exchanges: Vec<(String, String)> = if ids.is_empty() {
        EXCHANGES
            .iter()
            .map(|(name, id)| ((*name).to_string(), (*id).to_string()))
            .collect()
    } else {
        ids.into_iter()
            .map(|id| {
                let name = exchange_name(&id).map_or_else(|| id.clone(), str::to_string);
                (name, id)
            })
            .collect()
    };
    info!(
        "Scanning {} exchanges from {}",
        exchanges.len(),
        source.dir().display()
    );

    let scans = detector
        .scan_exchanges(
            &source,
            exchanges
                .iter()
                .map(|(name, id)| (name.as_str(), id.as_str())),
        )
        .await;

    for scan in &scans {
        print_scan(scan);
    }
    for line in timings(&scans, config.benchmark) {
        println!("{line}");
    }

    if !scans.is_empty() && scans.iter().all(|scan| scan.result.is_err()) {
        bail!("Every exchange scan failed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger(level_from_env(log::LevelFilter::Info))?;

    let cli = Cli::parse();
    let config = cli.apply(Config::from_env()?);

    match cli.command {
        Some(Commands::Exchanges) => {
            for (name, id) in EXCHANGES {
                println!("{name:<12} {id}");
            }
        }
        Some(Commands::Scan { exchanges }) => scan(&config, exchanges).await?,
        None => scan(&config, Vec::new()).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(name: &str, millis: u64) -> ExchangeScan {
        ExchangeScan {
            name: name.to_string(),
            id: name.to_lowercase(),
            result: Ok(triarb::Detection::default()),
            elapsed: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_timings_always_listed() {
        let scans = [scan("Binance", 1_250), scan("Kraken", 500)];
        assert_eq!(
            timings(&scans, false),
            [
                "Benchmark results (time taken per exchange):",
                "Binance: 1.25 seconds",
                "Kraken: 0.50 seconds",
            ]
        );
    }

    #[test]
    fn test_total_only_when_benchmarking() {
        let scans = [scan("Binance", 1_250), scan("Kraken", 500)];
        let lines = timings(&scans, true);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "Total execution time: 1.75 seconds.");
    }
}
