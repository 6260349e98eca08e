//! Decimal Normalizer
//!
//! Rescales prices, costs and the donation target to one integer unit so the
//! selection engine can work with exact integer arithmetic.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{DonationError, Result};
use crate::models::{LotIndex, Portfolio};

/// Parse a decimal from its textual form, keeping the stated precision.
///
/// Accepts plain (`100.22`, `-3`) and exponent (`1.5e2`) notation.
pub fn parse_decimal(field: &str, text: &str) -> Result<Decimal> {
    let parse_error = || DonationError::Parse {
        field: field.to_string(),
        value: text.to_string(),
    };

    if text.is_empty() {
        return Err(parse_error());
    }
    if text.contains(['e', 'E']) {
        return Decimal::from_scientific(text).map_err(|_| parse_error());
    }
    Decimal::from_str(text).map_err(|_| parse_error())
}

/// A lot projected into the integer domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedLot {
    pub index: LotIndex,
    pub shares: u64,
    /// Per-share cost in normalized units
    pub cost: i64,
    /// Current per-share price of the lot's asset in normalized units
    pub price: i64,
}

impl NormalizedLot {
    /// Price minus cost. Both sides are non-negative so this cannot overflow.
    pub fn unit_gain(&self) -> i64 {
        self.price - self.cost
    }

    pub fn weight(&self) -> u64 {
        self.price as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPortfolio {
    pub lots: Vec<NormalizedLot>,
    /// Donation target in normalized units
    pub budget: u64,
    /// Number of decimal places every value was shifted by, i.e. `-E`
    pub scale: u32,
    pub share_prices: BTreeMap<String, i64>,
}

impl NormalizedPortfolio {
    pub fn new(portfolio: &Portfolio, donation: Decimal) -> Result<Self> {
        if donation.is_sign_negative() && !donation.is_zero() {
            return Err(DonationError::Input(format!(
                "donation must not be negative: {}",
                donation
            )));
        }

        let mut scale = donation.scale();
        for lot in &portfolio.lots {
            if !portfolio.asset_share_prices.contains_key(&lot.asset_name) {
                return Err(DonationError::Input(format!(
                    "lot has an assetName that does not appear in assetSharePrices: {}",
                    lot.asset_name
                )));
            }
            if lot.share_cost.is_sign_negative() && !lot.share_cost.is_zero() {
                return Err(DonationError::Input(format!(
                    "lot {} ({}) has a negative shareCost: {}",
                    lot.asset_name, lot.date, lot.share_cost
                )));
            }
            scale = scale.max(lot.share_cost.scale());
        }
        for (name, price) in &portfolio.asset_share_prices {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(DonationError::Input(format!(
                    "asset {} has a negative share price: {}",
                    name, price
                )));
            }
            scale = scale.max(price.scale());
        }

        let budget = u64::try_from(to_integer(donation, scale)?).map_err(|_| {
            DonationError::Overflow(format!("donation {} does not fit in u64", donation))
        })?;

        let share_prices = portfolio
            .asset_share_prices
            .iter()
            .map(|(name, price)| -> Result<(String, i64)> {
                Ok((name.clone(), to_i64(*price, scale)?))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let lots = portfolio
            .lots
            .iter()
            .enumerate()
            .map(|(m, lot)| -> Result<NormalizedLot> {
                Ok(NormalizedLot {
                    index: LotIndex(m),
                    shares: lot.shares,
                    cost: to_i64(lot.share_cost, scale)?,
                    price: share_prices[&lot.asset_name],
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            scale,
            budget,
            lots = lots.len(),
            "normalized portfolio to integer domain"
        );

        Ok(Self {
            lots,
            budget,
            scale,
            share_prices,
        })
    }

    /// Total normalized price of every share in the current lot set.
    pub fn total_price(&self) -> Result<u128> {
        self.lots.iter().try_fold(0u128, |total, lot| {
            (lot.weight() as u128)
                .checked_mul(lot.shares as u128)
                .and_then(|price| total.checked_add(price))
                .ok_or_else(|| DonationError::Overflow("total lot price".to_string()))
        })
    }
}

/// `value * 10^scale` as an exact integer. `scale` is never below the value's
/// own scale, so no fractional part is left to discard.
fn to_integer(value: Decimal, scale: u32) -> Result<i128> {
    let shift = scale.saturating_sub(value.scale());
    10i128
        .checked_pow(shift)
        .and_then(|factor| value.mantissa().checked_mul(factor))
        .ok_or_else(|| {
            DonationError::Overflow(format!("{} cannot be shifted by {} places", value, scale))
        })
}

fn to_i64(value: Decimal, scale: u32) -> Result<i64> {
    i64::try_from(to_integer(value, scale)?)
        .map_err(|_| DonationError::Overflow(format!("{} does not fit in i64", value)))
}
