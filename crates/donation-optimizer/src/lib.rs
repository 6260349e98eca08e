//! Donation Optimizer
//!
//! Chooses which shares to donate to charity so that a target amount is met
//! without being exceeded, while maximizing the capital gains (or, optionally,
//! the capital losses) carried by the donated shares.
//!
//! The core is an exact integer knapsack: decimals are rescaled to a common
//! integer unit, ineligible lots are dropped, lots are expanded to unit shares,
//! a DP selection picks the best subset, and the shares are folded back into
//! lot-level instructions.

pub mod config;
pub mod document;
pub mod error;
pub mod expander;
pub mod filter;
pub mod knapsack;
pub mod models;
pub mod normalizer;
pub mod optimizer;
pub mod recombiner;
pub mod report;


pub use config::{DecimalStyle, OptimizerConfig, SelectionStrategy, DEFAULT_MAX_TABLE_CELLS};
pub use document::{DonationDocument, PortfolioDocument};
pub use error::{DonationError, Result};
pub use models::{
    DonationEntry, DonationReport, Lot, LotIndex, LotSelection, Objective, Portfolio,
    SelectionPath,
};
pub use normalizer::{parse_decimal, NormalizedLot, NormalizedPortfolio};
pub use optimizer::{choose_donation, DonationOptimizer};
