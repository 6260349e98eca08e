//! Donation Optimizer
//!
//! Runs the whole pipeline for one request:
//! normalize → filter → fast path → expand → select → recombine → assemble.

use rust_decimal::Decimal;

use crate::config::{OptimizerConfig, SelectionStrategy};
use crate::error::{DonationError, Result};
use crate::expander::{expand_lots, UnitShare};
use crate::filter::retain_eligible;
use crate::knapsack::{solve_01, solve_bounded, BoundedItem, Item};
use crate::models::{DonationReport, LotSelection, Objective, Portfolio, SelectionPath};
use crate::normalizer::{parse_decimal, NormalizedLot, NormalizedPortfolio};
use crate::recombiner::recombine;
use crate::report::assemble;

/// A whole lot seen by the bounded engine.
struct LotGroup {
    lot: NormalizedLot,
    value: i64,
}

impl Item for LotGroup {
    fn weight(&self) -> u64 {
        self.lot.weight()
    }

    fn value(&self) -> i64 {
        self.value
    }
}

impl BoundedItem for LotGroup {
    fn count(&self) -> u64 {
        self.lot.shares
    }
}

/// Picks the shares to donate for a target amount.
///
/// Stateless apart from its configuration; one instance can serve any number
/// of requests, from any thread.
#[derive(Debug, Clone, Default)]
pub struct DonationOptimizer {
    config: OptimizerConfig,
}

impl DonationOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Parse the donation amount, then optimize.
    pub fn optimize_str(&self, portfolio: &Portfolio, donation: &str) -> Result<DonationReport> {
        let donation = parse_decimal("donation", donation)?;
        self.optimize(portfolio, donation)
    }

    pub fn optimize(&self, portfolio: &Portfolio, donation: Decimal) -> Result<DonationReport> {
        let objective = self.config.objective;
        let mut normalized = NormalizedPortfolio::new(portfolio, donation)?;
        let budget = normalized.budget;
        retain_eligible(&mut normalized.lots, objective, budget);

        let (selections, path) = if normalized.lots.is_empty() {
            (Vec::new(), SelectionPath::Empty)
        } else if normalized.total_price()? <= budget as u128 {
            let all = normalized
                .lots
                .iter()
                .map(|lot| LotSelection {
                    lot: lot.index,
                    shares: lot.shares,
                })
                .collect();
            (all, SelectionPath::FastPath)
        } else {
            (self.select(&normalized.lots, budget)?, SelectionPath::Engine)
        };

        let report = assemble(portfolio, &selections, path)?;
        tracing::info!(
            %objective,
            ?path,
            lots = report.entries.len(),
            shares = report.total_shares(),
            total_value = %report.total_value,
            total_capital_gains = %report.total_capital_gains,
            "donation selected"
        );
        Ok(report)
    }

    fn select(&self, lots: &[NormalizedLot], budget: u64) -> Result<Vec<LotSelection>> {
        let objective = self.config.objective;
        let limit = self.config.max_table_cells;

        match self.config.strategy {
            SelectionStrategy::UnitShares => {
                // Expansion allocates one item per share, so check the table
                // size before building it.
                let shares: u128 = lots.iter().map(|lot| lot.shares as u128).sum();
                ensure_table_fits(shares, budget, limit)?;

                let items = expand_lots(lots, objective);
                tracing::debug!(items = items.len(), budget, "running 0/1 selection");
                let selection = solve_01(&items, budget, limit)?;
                let picked: Vec<UnitShare> =
                    selection.chosen.iter().map(|&i| items[i]).collect();
                Ok(recombine(&picked))
            }
            SelectionStrategy::BoundedLots => {
                let groups: Vec<LotGroup> = lots
                    .iter()
                    .map(|lot| LotGroup {
                        lot: *lot,
                        value: objective.signed_value(lot.unit_gain()),
                    })
                    .collect();
                tracing::debug!(groups = groups.len(), budget, "running bounded selection");
                let selection = solve_bounded(&groups, budget, limit)?;
                Ok(groups
                    .iter()
                    .zip(selection.counts)
                    .filter(|(_, shares)| *shares > 0)
                    .map(|(group, shares)| LotSelection {
                        lot: group.lot.index,
                        shares,
                    })
                    .collect())
            }
        }
    }
}

fn ensure_table_fits(rows: u128, capacity: u64, limit: Option<u64>) -> Result<()> {
    let cells = (rows + 1).saturating_mul(capacity as u128 + 1);
    match limit {
        Some(limit) if cells > limit as u128 => {
            tracing::warn!(cells, limit, "selection table exceeds cell limit");
            Err(DonationError::CapacityExceeded { cells, limit })
        }
        _ if usize::try_from(rows).is_err() => Err(DonationError::CapacityExceeded {
            cells,
            limit: usize::MAX as u64,
        }),
        _ => Ok(()),
    }
}

/// Convenience wrapper around [`DonationOptimizer::optimize`].
pub fn choose_donation(
    portfolio: &Portfolio,
    donation: Decimal,
    objective: Objective,
) -> Result<DonationReport> {
    DonationOptimizer::new(OptimizerConfig::default().with_objective(objective))
        .optimize(portfolio, donation)
}
