//! choose-donation-assets: read asset prices and lots from stdin and print the
//! lots to donate.
//!
//! Usage:
//!   choose-donation-assets --donation 2500 < portfolio.json
//!   choose-donation-assets --donation 2500 --maximize-losses --quote-decimals < portfolio.json

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use donation_optimizer::{
    DecimalStyle, DonationDocument, DonationOptimizer, Objective, OptimizerConfig, Portfolio,
    PortfolioDocument, SelectionStrategy,
};

const ABOUT: &str = "\
choose-donation-assets reads a set of asset prices and lots
from standard input and calculates which lots you should donate
to maximize capital gains tax savings (or, optionally,
which you should sell before donating to maximize capital losses).";

const LONG_ABOUT: &str = "\
choose-donation-assets reads a set of asset prices and lots
from standard input and calculates which lots you should donate
to maximize capital gains tax savings (or, optionally,
which you should sell before donating to maximize capital losses).

The United States of America's Internal Revenue Service (IRS)
allows most taxpayers to deduct the full value of donated capital gain property
(shares of stock, bonds, ETFs, mutual funds, cryptocurrencies, and so on)
from their gross income, thus reducing their tax liability.
Two special rules apply:

1. If the donated assets were owned for more than a year
   and they have capital gains, the donors pay no taxes
   on the capital gains.
2. If donors sell assets that have capital losses and donate the cash proceeds,
   the donors can deduct the cash donations from their gross income
   and deduct the losses from their capital gains (if any).
   If capital losses exceed capital gains during a particular tax year,
   the donors can usually deduct up to $3,000 of losses
   from their gross income.

Standard input MUST be a JSON object with the following structure:

- assetSharePrices :: object -- current share (per-unit) prices keyed by
  case-sensitive asset name; each value is a number or a numeric string
- lots :: array -- asset lots, each an object with:
    - assetName :: string -- must match a key in assetSharePrices
    - date :: string -- acquisition date, used only to identify the lot
    - shares :: int -- the positive number of shares in this lot
    - shareCost :: number|numericString -- per-share cost of this lot

The program prints a JSON object to standard output:

- donation :: array -- the lots to donate, shaped like the input lots
  (the number of shares may be lower than the lot holds)
- assetSharePrices :: object -- the assetSharePrices from standard input
- totalValue :: number|numericString -- total price of the donation
- totalCapitalGains :: number|numericString -- capital gains in the donation
  (losses if negative)

The program never exceeds the donation amount; if you are comfortable giving
slightly more, try a few larger amounts.

The core algorithm runs in O(s*d) time and O(s*d) space, where s is the total
number of shares and d is the donation amount in its smallest decimal unit.

Environment: DONATION_OBJECTIVE, DONATION_STRATEGY, DONATION_MAX_TABLE_CELLS
set defaults that the flags below override. RUST_LOG controls diagnostics on
standard error; RUST_LOG_FORMAT=json switches them to JSON.";

/// Exit status for bad flags, bad input, or a failed run.
const EXIT_INPUT_ERROR: u8 = 2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// One knapsack item per share
    UnitShares,
    /// Bounded knapsack over whole lots
    Bounded,
}

impl From<StrategyArg> for SelectionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::UnitShares => SelectionStrategy::UnitShares,
            StrategyArg::Bounded => SelectionStrategy::BoundedLots,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "choose-donation-assets", about = ABOUT, long_about = LONG_ABOUT)]
struct Cli {
    /// Donation amount.
    #[arg(long, default_value = "1000.00")]
    donation: String,

    /// Maximize capital losses instead of capital gains.
    #[arg(long, default_value_t = false)]
    maximize_losses: bool,

    /// Print decimal values as JSON strings.
    #[arg(long, default_value_t = false)]
    quote_decimals: bool,

    /// Selection engine. Both pick the same shares; `bounded` uses less memory.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Refuse runs whose selection table needs more cells than this (0 = no limit).
    #[arg(long)]
    max_table_cells: Option<u64>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

fn build_config(cli: &Cli) -> Result<OptimizerConfig> {
    let mut config = OptimizerConfig::from_env().context("invalid optimizer environment")?;
    if cli.maximize_losses {
        config = config.with_objective(Objective::MaximizeLosses);
    }
    if let Some(strategy) = cli.strategy {
        config = config.with_strategy(strategy.into());
    }
    if let Some(cells) = cli.max_table_cells {
        config = config.with_max_table_cells((cells > 0).then_some(cells));
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    tracing::debug!(?config, donation = %cli.donation, "starting");

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("error reading standard input")?;
    let portfolio: Portfolio = PortfolioDocument::from_json(&input)
        .context("error decoding input JSON")?
        .into();

    let report = DonationOptimizer::new(config).optimize_str(&portfolio, &cli.donation)?;

    let style = if cli.quote_decimals {
        DecimalStyle::Quoted
    } else {
        DecimalStyle::Number
    };
    let output = DonationDocument::new(&portfolio, &report, style).to_json()?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", output)?;
    stdout.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["choose-donation-assets"]).unwrap();
        assert_eq!(cli.donation, "1000.00");
        assert!(!cli.maximize_losses);
        assert!(!cli.quote_decimals);
        assert!(cli.strategy.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "choose-donation-assets",
            "--donation",
            "250.50",
            "--maximize-losses",
            "--quote-decimals",
            "--strategy",
            "bounded",
            "--max-table-cells",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.donation, "250.50");
        assert!(cli.maximize_losses);
        assert!(cli.quote_decimals);
        assert!(matches!(cli.strategy, Some(StrategyArg::Bounded)));
        assert_eq!(cli.max_table_cells, Some(0));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["choose-donation-assets", "--greedy"]).is_err());
    }
}
