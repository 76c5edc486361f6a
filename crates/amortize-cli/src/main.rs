mod commands;
mod input;
mod logging;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::currencies::CurrenciesArgs;
use commands::rates::RatesArgs;
use commands::schedule::ScheduleArgs;

/// Fixed-rate loan amortization calculator
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Fixed-rate loan amortization calculator",
    long_about = "Computes the level monthly payment of a fixed-rate loan and its \
                  month-by-month split into interest, principal and remaining \
                  balance, with decimal precision. Also lists display currencies \
                  and tabulates saved exchange-rate snapshots."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an amortization schedule
    Schedule(ScheduleArgs),
    /// List supported display currencies and their symbols
    Currencies(CurrenciesArgs),
    /// Tabulate an exchange-rate API payload
    Rates(RatesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Currencies(args) => commands::currencies::run_currencies(args),
        Commands::Rates(args) => commands::rates::run_rates(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
