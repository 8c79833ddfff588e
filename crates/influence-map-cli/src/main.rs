mod scenario;
mod spatial;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use scenario::{run_session, RunSummary, ScenarioConfig};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "influence-map",
    version,
    about = "Drive the influence map over a synthetic match"
)]
struct Cli {
    /// Scenario configuration (JSON). Missing fields take their defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one session and write its summary as JSON.
    Run {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        turns: Option<usize>,
        /// Include every cell's final value in the summary.
        #[arg(long)]
        field: bool,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run independent sessions for consecutive seeds in parallel.
    Batch {
        #[arg(long, default_value_t = 0)]
        first_seed: u64,
        #[arg(long, default_value_t = 8)]
        count: u64,
    },
    /// Print the default scenario configuration.
    DefaultConfig,
}

fn load_config(path: Option<&Path>) -> Result<ScenarioConfig> {
    let Some(path) = path else {
        return Ok(ScenarioConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: ScenarioConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

fn write_summary(summary: &RunSummary, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("failed to write summary {}", path.display()))?;
            log::info!("summary written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn seed_range_end(first_seed: u64, count: u64) -> Result<u64> {
    first_seed
        .checked_add(count)
        .with_context(|| format!("seed range {first_seed} + {count} overflows u64"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            seed,
            turns,
            field,
            output,
        } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(turns) = turns {
                config.turns = turns;
            }
            log::info!(
                "running {}x{} session, seed {}, {} turns",
                config.width,
                config.height,
                config.seed,
                config.turns
            );
            let summary = run_session(&config, field)?;
            log::info!(
                "{} ticks executed, final abs max {:.4}",
                summary.ticks,
                summary.final_stats.abs_max
            );
            write_summary(&summary, output.as_deref())?;
        }
        Command::Batch { first_seed, count } => {
            let end_seed = seed_range_end(first_seed, count)?;
            log::info!("running {count} sessions from seed {first_seed}");
            let summaries = (first_seed..end_seed)
                .into_par_iter()
                .map(|seed| {
                    let config = ScenarioConfig {
                        seed,
                        ..config.clone()
                    };
                    run_session(&config, false)
                })
                .collect::<Result<Vec<_>>>()?;
            for s in &summaries {
                println!(
                    "seed {:>6}  ticks {:>5}  total {:>9.4}  mean {:>8.4}  min {:>7.4}  max {:>7.4}",
                    s.seed,
                    s.ticks,
                    s.final_stats.total,
                    s.final_stats.mean,
                    s.final_stats.min,
                    s.final_stats.max
                );
            }
        }
        Command::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&ScenarioConfig::default())?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_range_end_rejects_overflow() {
        assert_eq!(seed_range_end(10, 8).unwrap(), 18);
        assert_eq!(seed_range_end(u64::MAX - 2, 2).unwrap(), u64::MAX);
        assert!(seed_range_end(u64::MAX, 1).is_err());
    }
}
