use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the capital gain ledger the donation should favour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Objective {
    /// Donate appreciated shares, maximizing the untaxed capital gain
    #[default]
    MaximizeGains,
    /// Sell depreciated shares and donate the proceeds, maximizing the realized loss
    MaximizeLosses,
}

impl Objective {
    /// Whether a lot with this normalized unit gain can improve the objective.
    /// Zero-gain lots never qualify.
    pub fn admits(&self, unit_gain: i64) -> bool {
        match self {
            Objective::MaximizeGains => unit_gain > 0,
            Objective::MaximizeLosses => unit_gain < 0,
        }
    }

    /// Value fed to the selection engine, which always maximizes.
    pub fn signed_value(&self, unit_gain: i64) -> i64 {
        match self {
            Objective::MaximizeGains => unit_gain,
            Objective::MaximizeLosses => -unit_gain,
        }
    }
}

impl std::fmt::Display for Objective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Objective::MaximizeGains => write!(f, "maximize gains"),
            Objective::MaximizeLosses => write!(f, "maximize losses"),
        }
    }
}

/// A batch of shares of one asset acquired at one cost basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lot {
    /// Case-sensitive asset name, must be a key of the portfolio's price map
    pub asset_name: String,
    /// Opaque acquisition label, usually a date
    pub date: String,
    pub shares: u64,
    /// Per-share acquisition cost
    pub share_cost: Decimal,
}

impl Lot {
    pub fn new(
        asset_name: impl Into<String>,
        date: impl Into<String>,
        shares: u64,
        share_cost: Decimal,
    ) -> Self {
        Self {
            asset_name: asset_name.into(),
            date: date.into(),
            shares,
            share_cost,
        }
    }
}

/// Current share prices plus the lots held.
///
/// Lots live in an arena: everything downstream of the normalizer refers to a
/// lot by its [`LotIndex`] into `lots`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Portfolio {
    pub asset_share_prices: BTreeMap<String, Decimal>,
    pub lots: Vec<Lot>,
}

impl Portfolio {
    pub fn new(asset_share_prices: BTreeMap<String, Decimal>, lots: Vec<Lot>) -> Self {
        Self {
            asset_share_prices,
            lots,
        }
    }

    pub fn share_price(&self, asset_name: &str) -> Option<Decimal> {
        self.asset_share_prices.get(asset_name).copied()
    }

    pub fn lot(&self, index: LotIndex) -> &Lot {
        &self.lots[index.0]
    }
}

/// Position of a lot in [`Portfolio::lots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LotIndex(pub usize);

/// A number of shares taken from one source lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotSelection {
    pub lot: LotIndex,
    pub shares: u64,
}

/// How the final selection was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPath {
    /// No lot survived filtering
    Empty,
    /// Every eligible share fit in the budget
    FastPath,
    /// The selection engine chose a subset
    Engine,
}

/// One line of donation instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationEntry {
    pub lot: LotIndex,
    pub asset_name: String,
    pub date: String,
    /// Shares to donate, never more than the source lot holds
    pub shares: u64,
    pub share_cost: Decimal,
    pub share_price: Decimal,
}

impl DonationEntry {
    pub fn value(&self) -> Option<Decimal> {
        self.share_price.checked_mul(Decimal::from(self.shares))
    }

    pub fn capital_gain(&self) -> Option<Decimal> {
        self.share_price
            .checked_sub(self.share_cost)?
            .checked_mul(Decimal::from(self.shares))
    }
}

/// Final donation with totals computed from the original decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationReport {
    pub entries: Vec<DonationEntry>,
    pub total_value: Decimal,
    /// Negative when the donation realizes losses
    pub total_capital_gains: Decimal,
    pub path: SelectionPath,
}

impl DonationReport {
    pub fn total_shares(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, e| total.saturating_add(e.shares))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
