mod chart;
mod epidemic;
mod fetch;
mod score;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use moodgraph_core::{Config, MatchPolicy, MergeMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "moodgraph", about = "Daily emotion scoring against epidemic metrics")]
struct Cli {
    /// TOML configuration file; command line flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Overwrite,
    FillMissing,
}

impl From<Mode> for MergeMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Overwrite => MergeMode::Overwrite,
            Mode::FillMissing => MergeMode::FillMissing,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    First,
    Best,
}

#[derive(Subcommand)]
enum Command {
    /// Score day buckets and merge them into the emotion history
    Score {
        #[arg(long)]
        lexicon: Option<PathBuf>,
        /// CSV of `date,texts` day buckets
        #[arg(long)]
        buckets: Option<PathBuf>,
        /// Emotion history (.csv or .redb)
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "fill-missing")]
        mode: Mode,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long, value_enum)]
        policy: Option<Policy>,
        /// Print the scored table instead of writing the history
        #[arg(long)]
        dry_run: bool,
    },
    /// Sum an epidemiological CSV per day and merge it into the epidemic history
    Epidemic {
        /// Local path or http(s) URL
        #[arg(long, default_value = moodgraph_core::epidemic::DEFAULT_SOURCE_URL)]
        input: String,
        /// Epidemic history (.csv or .redb)
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "fill-missing")]
        mode: Mode,
    },
    /// Chart one emotion against one epidemic metric
    Chart {
        #[arg(long)]
        emotion: String,
        #[arg(long)]
        metric: String,
        /// First day (YYYY-MM-DD); defaults to the emotion history's first day
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
        /// Emotion history (.csv or .redb)
        #[arg(long, conflicts_with = "buckets")]
        emotions: Option<PathBuf>,
        /// Score these day buckets in memory instead of reading the emotion history
        #[arg(long)]
        buckets: Option<PathBuf>,
        /// Lexicon used with --buckets
        #[arg(long, requires = "buckets")]
        lexicon: Option<PathBuf>,
        #[arg(long)]
        epidemic: Option<PathBuf>,
        /// Output file; `.json` writes the figure, anything else an HTML page
        #[arg(long, default_value = "chart.html")]
        out: PathBuf,
    },
    /// Write the default configuration to a TOML file
    InitConfig {
        #[arg(default_value = "moodgraph.toml")]
        path: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => Config::load_toml(p).with_context(|| format!("load config {}", p.display())),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Score {
            lexicon,
            buckets,
            history,
            mode,
            threshold,
            policy,
            dry_run,
        } => {
            if let Some(t) = threshold {
                config.scoring.threshold = t;
            }
            if let Some(p) = policy {
                config.scoring.match_policy = match p {
                    Policy::First => MatchPolicy::FirstMatch,
                    Policy::Best => MatchPolicy::BestMatch,
                };
            }
            let paths = &mut config.paths;
            if let Some(p) = lexicon {
                paths.lexicon = p;
            }
            if let Some(p) = buckets {
                paths.day_buckets = p;
            }
            if let Some(p) = history {
                paths.emotion_history = p;
            }
            score::run(&config, mode.into(), dry_run)
        }
        Command::Epidemic {
            input,
            history,
            mode,
        } => {
            if let Some(p) = history {
                config.paths.epidemic_history = p;
            }
            epidemic::run(&input, &config.paths.epidemic_history, mode.into())
        }
        Command::Chart {
            emotion,
            metric,
            start,
            end,
            emotions,
            buckets,
            lexicon,
            epidemic,
            out,
        } => {
            let paths = &mut config.paths;
            if let Some(p) = emotions {
                paths.emotion_history = p;
            }
            if let Some(p) = lexicon {
                paths.lexicon = p;
            }
            let source = match buckets {
                Some(p) => {
                    paths.day_buckets = p;
                    chart::EmotionSource::Buckets
                }
                None => chart::EmotionSource::History,
            };
            if let Some(p) = epidemic {
                paths.epidemic_history = p;
            }
            let range = start.zip(end);
            chart::run(&config, source, &emotion, &metric, range, &out)
        }
        Command::InitConfig { path } => {
            config
                .save_toml(&path)
                .with_context(|| format!("write {}", path.display()))?;
            println!("Wrote configuration to {}", path.display());
            Ok(())
        }
    }
}
