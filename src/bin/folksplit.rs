//! CLI over the batch split and baseline entry points.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use folksplit::batch;
use folksplit::batch::SplitStrategy;
use folksplit::config::SplitConfig;
use folksplit::splits::HoldoutSelection;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    RandomPercentage,
    PerUserPercentage,
    LeaveLastOut,
    LeaveOneRandomOut,
    LeaveNOut,
    LeavePercentageOut,
}

#[derive(Debug, Parser)]
#[command(
    name = "folksplit",
    disable_help_subcommand = true,
    about = "Reproducible train/test partitioning and popularity baselines",
    long_about = "Partition a user-resource-tag interaction log into train/test samples, \
run iterative core filtering, or compute non-personalized baseline predictions."
)]
struct Cli {
    #[arg(long, default_value_t = 42, help = "Seed for all randomized strategies")]
    seed: u64,
    #[arg(long, value_name = "DIR", help = "Override the sample output directory")]
    output_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Split a sample file, or core-filter it when --core-level is set.
    Split {
        input: PathBuf,
        output_name: String,
        #[arg(long, value_enum, default_value_t = StrategyArg::LeaveLastOut)]
        strategy: StrategyArg,
        #[arg(long, default_value_t = 10, help = "Percentage parameter for percentage strategies")]
        percentage: usize,
        #[arg(long, default_value_t = 1, help = "Held-out records per user for leave-n-out")]
        n: usize,
        #[arg(long, help = "Allow single-record users to become test-only")]
        cold_start: bool,
        #[arg(long, help = "Use random instead of ranked holdout selection")]
        random_holdout: bool,
        #[arg(long, default_value_t = 1)]
        repeat: usize,
        #[arg(long, default_value_t = 0)]
        core_level: usize,
    },
    /// Probe increasing core levels until filtering empties the dataset.
    MaxCore { input: PathBuf },
    /// Write the most-popular tag baseline and its timing diagnostics.
    PopularTags {
        input: PathBuf,
        output_name: String,
        #[arg(long)]
        train_size: usize,
        #[arg(long)]
        sample_size: usize,
    },
    /// Write the most-popular unseen-resource baseline.
    PopularResources {
        input: PathBuf,
        output_name: String,
        #[arg(long)]
        train_size: usize,
    },
    /// Write the random unseen-resource baseline.
    RandomResources {
        input: PathBuf,
        output_name: String,
        #[arg(long)]
        train_size: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut config = SplitConfig {
        seed: cli.seed,
        ..SplitConfig::default()
    };
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    let result = match cli.command {
        Command::Split {
            input,
            output_name,
            strategy,
            percentage,
            n,
            cold_start,
            random_holdout,
            repeat,
            core_level,
        } => {
            let selection = if random_holdout {
                HoldoutSelection::Random
            } else {
                HoldoutSelection::Ranked(config.holdout_direction)
            };
            let strategy = match strategy {
                StrategyArg::RandomPercentage => SplitStrategy::RandomPercentage {
                    test_percentage: percentage,
                },
                StrategyArg::PerUserPercentage => SplitStrategy::PerUserPercentage { percentage },
                StrategyArg::LeaveLastOut => SplitStrategy::LeaveLastOut { cold_start },
                StrategyArg::LeaveOneRandomOut => SplitStrategy::LeaveOneRandomOut,
                StrategyArg::LeaveNOut => SplitStrategy::LeaveNOut { n },
                StrategyArg::LeavePercentageOut => SplitStrategy::LeavePercentageOut {
                    percentage,
                    selection,
                },
            };
            batch::split_sample(&input, &output_name, strategy, repeat, core_level, &config)
                .map(|size| println!("final dataset size: {size}"))
        }
        Command::MaxCore { input } => {
            batch::determine_max_core(&input).map(|level| println!("max core level: {level}"))
        }
        Command::PopularTags {
            input,
            output_name,
            train_size,
            sample_size,
        } => batch::predict_popular_tags(&input, &output_name, train_size, sample_size, &config),
        Command::PopularResources {
            input,
            output_name,
            train_size,
        } => batch::predict_popular_resources(&input, &output_name, train_size, &config),
        Command::RandomResources {
            input,
            output_name,
            train_size,
        } => batch::predict_random_resources(&input, &output_name, train_size, &config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
