//! outbound-balancer
//!
//! Command-line front end for the outbound balancers.
//!
//! # Commands
//!
//! ```text
//! simulate   run N picks through a balancer and print the distribution
//! check      validate the config and print resolved WRR weights
//! watch      follow config changes and push new weights to live balancers
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use outbound_balancer::balancer::{BalancerManager, WeightManager};
use outbound_balancer::config::watcher::ConfigWatcher;
use outbound_balancer::config::{load_config, BalancerConfig, StrategyConfig};
use outbound_balancer::health::HealthTable;
use outbound_balancer::observability::logging;

#[derive(Parser)]
#[command(name = "outbound-balancer")]
#[command(about = "Inspect and exercise outbound balancer configurations", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "balancer.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run picks through a balancer and print how they were distributed
    Simulate {
        /// Balancer tag
        #[arg(short, long)]
        balancer: String,

        /// Number of picks
        #[arg(short, long, default_value_t = 100)]
        rounds: usize,

        /// Outbounds to report as dead
        #[arg(long)]
        dead: Vec<String>,
    },
    /// Validate the configuration and print resolved weights
    Check,
    /// Watch the configuration file and reload weights on change
    Watch,
}

#[derive(Serialize)]
struct SimulationReport {
    balancer: String,
    rounds: usize,
    picks: BTreeMap<String, usize>,
    unresolved: usize,
}

#[derive(Serialize)]
struct WeightReport {
    balancer: String,
    strategy: &'static str,
    candidates: BTreeMap<String, i64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    if let Err(e) = logging::init(&config.observability) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    tracing::info!(
        path = ?cli.config,
        balancers = config.balancers.len(),
        outbounds = config.outbounds.len(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Simulate {
            balancer,
            rounds,
            dead,
        } => {
            let report = simulate(&config, balancer, rounds, &dead).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Check => {
            let report = resolve_weights(&config);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Watch => watch(cli.config, config).await?,
    }

    Ok(())
}

async fn simulate(
    config: &BalancerConfig,
    balancer: String,
    rounds: usize,
    dead: &[String],
) -> SimulationReport {
    let table = Arc::new(HealthTable::from_config(&config.observatory));
    for tag in &config.outbounds {
        table.set_alive(tag, !dead.contains(tag));
    }

    let manager = BalancerManager::new(config, Some(table));
    if manager.get(&balancer).is_none() {
        tracing::warn!(balancer = %balancer, known = ?manager.tags(), "Unknown balancer");
    }

    let mut picks = BTreeMap::new();
    let mut unresolved = 0;
    for _ in 0..rounds {
        match manager.pick_outbound(&balancer, &config.outbounds).await {
            Some(tag) => *picks.entry(tag).or_insert(0) += 1,
            None => unresolved += 1,
        }
    }

    SimulationReport {
        balancer,
        rounds,
        picks,
        unresolved,
    }
}

fn resolve_weights(config: &BalancerConfig) -> Vec<WeightReport> {
    let manager = BalancerManager::new(config, None);

    config
        .balancers
        .iter()
        .filter_map(|group_config| {
            let group = manager.get(&group_config.tag)?;
            let weights = match &group_config.strategy {
                StrategyConfig::WeightedRoundRobin { costs } => WeightManager::new(costs, 1.0),
                _ => WeightManager::default(),
            };
            let candidates = group
                .candidates(&config.outbounds)
                .into_iter()
                .map(|tag| {
                    let weight = weights.resolve(&tag);
                    (tag, weight)
                })
                .collect();

            Some(WeightReport {
                balancer: group_config.tag.clone(),
                strategy: group_config.strategy.kind(),
                candidates,
            })
        })
        .collect()
}

async fn watch(path: PathBuf, config: BalancerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let manager = BalancerManager::new(&config, None);
    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _handle = watcher.run()?;

    loop {
        tokio::select! {
            Some(new_config) = updates.recv() => {
                manager.apply_reload(&new_config);
                for report in resolve_weights(&new_config) {
                    tracing::info!(
                        balancer = %report.balancer,
                        weights = ?report.candidates,
                        "Weights after reload"
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping watcher");
                break;
            }
        }
    }

    Ok(())
}
