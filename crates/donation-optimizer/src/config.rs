//! Optimizer configuration.
//!
//! Everything that changes how a run behaves is carried in an explicit
//! [`OptimizerConfig`] value rather than process-wide flags.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{DonationError, Result};
use crate::models::Objective;

/// Default ceiling on selection table cells (about 1.6 GB of `i64`).
pub const DEFAULT_MAX_TABLE_CELLS: u64 = 200_000_000;

/// Which selection engine solves the budget problem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Expand every lot into one item per share and run a 0/1 knapsack
    #[default]
    UnitShares,
    /// Run a bounded knapsack directly over lots and their share counts
    BoundedLots,
}

impl std::str::FromStr for SelectionStrategy {
    type Err = DonationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unit-shares" | "unit_shares" | "shares" => Ok(Self::UnitShares),
            "bounded" | "bounded-lots" | "bounded_lots" | "lots" => Ok(Self::BoundedLots),
            other => Err(DonationError::Input(format!(
                "unknown selection strategy: {}",
                other
            ))),
        }
    }
}

impl std::str::FromStr for Objective {
    type Err = DonationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gains" | "maximize-gains" => Ok(Self::MaximizeGains),
            "losses" | "maximize-losses" => Ok(Self::MaximizeLosses),
            other => Err(DonationError::Input(format!("unknown objective: {}", other))),
        }
    }
}

/// How decimals are written into the output document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalStyle {
    /// Bare JSON numbers
    #[default]
    Number,
    /// JSON strings
    Quoted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub objective: Objective,
    pub strategy: SelectionStrategy,
    /// Upper bound on selection table cells. `None` disables the guard.
    pub max_table_cells: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            objective: Objective::MaximizeGains,
            strategy: SelectionStrategy::UnitShares,
            max_table_cells: Some(DEFAULT_MAX_TABLE_CELLS),
        }
    }
}

impl OptimizerConfig {
    /// Load from environment variables, falling back to defaults for unset ones.
    ///
    /// - `DONATION_OBJECTIVE`: `gains` or `losses`
    /// - `DONATION_STRATEGY`: `unit-shares` or `bounded`
    /// - `DONATION_MAX_TABLE_CELLS`: cell limit, `0` disables it
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("DONATION_OBJECTIVE").filter(|s| !s.is_empty()) {
            config.objective = value.parse()?;
        }
        if let Some(value) = lookup("DONATION_STRATEGY").filter(|s| !s.is_empty()) {
            config.strategy = value.parse()?;
        }
        if let Some(value) = lookup("DONATION_MAX_TABLE_CELLS").filter(|s| !s.is_empty()) {
            let cells: u64 = value.trim().parse().map_err(|_| {
                DonationError::Input(format!("invalid DONATION_MAX_TABLE_CELLS: {}", value))
            })?;
            config.max_table_cells = (cells > 0).then_some(cells);
        }

        Ok(config)
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_table_cells(mut self, max_table_cells: Option<u64>) -> Self {
        self.max_table_cells = max_table_cells;
        self
    }
}
