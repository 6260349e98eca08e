//! JSON input and output documents.
//!
//! Decimals are read from JSON numbers or numeric strings without going through
//! `f64`, so `10.00` keeps its two decimal places. This relies on serde_json's
//! `arbitrary_precision` feature.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::config::DecimalStyle;
use crate::error::{DonationError, Result};
use crate::models::{DonationReport, Lot, Portfolio};
use crate::normalizer::parse_decimal;

fn decimal_from_value(field: &str, value: Value) -> Result<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(field, &n.to_string()),
        Value::String(s) => parse_decimal(field, &s),
        other => Err(DonationError::Parse {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}

fn deserialize_decimal<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_value("shareCost", value).map_err(D::Error::custom)
}

fn deserialize_price_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(name, value)| {
            let field = format!("assetSharePrices.{}", name);
            decimal_from_value(&field, value)
                .map(|price| (name, price))
                .map_err(D::Error::custom)
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotDocument {
    pub asset_name: String,
    pub date: String,
    pub shares: u64,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub share_cost: Decimal,
}

/// The portfolio as read from standard input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDocument {
    #[serde(deserialize_with = "deserialize_price_map")]
    pub asset_share_prices: BTreeMap<String, Decimal>,
    pub lots: Vec<LotDocument>,
}

impl PortfolioDocument {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

impl From<PortfolioDocument> for Portfolio {
    fn from(doc: PortfolioDocument) -> Self {
        let lots = doc
            .lots
            .into_iter()
            .map(|lot| Lot::new(lot.asset_name, lot.date, lot.shares, lot.share_cost))
            .collect();
        Portfolio::new(doc.asset_share_prices, lots)
    }
}

/// A decimal paired with the style it should be written in.
#[derive(Debug, Clone, Copy)]
pub struct StyledDecimal {
    value: Decimal,
    style: DecimalStyle,
}

impl Serialize for StyledDecimal {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = self.value.to_string();
        match self.style {
            DecimalStyle::Quoted => serializer.serialize_str(&text),
            DecimalStyle::Number => serde_json::Number::from_str(&text)
                .map_err(S::Error::custom)?
                .serialize(serializer),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationLotDocument {
    pub asset_name: String,
    pub date: String,
    pub shares: u64,
    pub share_cost: StyledDecimal,
}

/// The document written to standard output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationDocument {
    pub donation: Vec<DonationLotDocument>,
    pub asset_share_prices: BTreeMap<String, StyledDecimal>,
    pub total_value: StyledDecimal,
    pub total_capital_gains: StyledDecimal,
}

impl DonationDocument {
    pub fn new(portfolio: &Portfolio, report: &DonationReport, style: DecimalStyle) -> Self {
        let styled = |value: Decimal| StyledDecimal { value, style };
        Self {
            donation: report
                .entries
                .iter()
                .map(|entry| DonationLotDocument {
                    asset_name: entry.asset_name.clone(),
                    date: entry.date.clone(),
                    shares: entry.shares,
                    share_cost: styled(entry.share_cost),
                })
                .collect(),
            asset_share_prices: portfolio
                .asset_share_prices
                .iter()
                .map(|(name, price)| (name.clone(), styled(*price)))
                .collect(),
            total_value: styled(report.total_value),
            total_capital_gains: styled(report.total_capital_gains),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DonationEntry, LotIndex, SelectionPath};
    use rust_decimal_macros::dec;

    const INPUT: &str = r#"{
        "assetSharePrices": {"VTI": 100.22, "BND": "12.35"},
        "lots": [
            {"assetName": "VTI", "date": "2019-01-02", "shares": 13, "shareCost": 50.55},
            {"assetName": "BND", "date": "2019-01-03", "shares": 50, "shareCost": 10.00}
        ]
    }"#;

    #[test]
    fn test_parse_numbers_and_strings() {
        let portfolio: Portfolio = PortfolioDocument::from_json(INPUT).unwrap().into();
        assert_eq!(portfolio.share_price("VTI"), Some(dec!(100.22)));
        assert_eq!(portfolio.share_price("BND"), Some(dec!(12.35)));
        assert_eq!(portfolio.lots.len(), 2);
        assert_eq!(portfolio.lots[1].share_cost.scale(), 2);
        assert_eq!(portfolio.lots[1].share_cost.to_string(), "10.00");
    }

    #[test]
    fn test_reject_bad_decimal_and_shares() {
        let bad_price = r#"{"assetSharePrices": {"A": "abc"}, "lots": []}"#;
        assert!(PortfolioDocument::from_json(bad_price).is_err());

        let bad_shares = r#"{"assetSharePrices": {"A": 1},
            "lots": [{"assetName": "A", "date": "d", "shares": -1, "shareCost": 1}]}"#;
        assert!(PortfolioDocument::from_json(bad_shares).is_err());

        let bool_cost = r#"{"assetSharePrices": {"A": 1},
            "lots": [{"assetName": "A", "date": "d", "shares": 1, "shareCost": true}]}"#;
        assert!(PortfolioDocument::from_json(bool_cost).is_err());
    }

    fn sample() -> (Portfolio, DonationReport) {
        let portfolio: Portfolio = PortfolioDocument::from_json(INPUT).unwrap().into();
        let report = DonationReport {
            entries: vec![DonationEntry {
                lot: LotIndex(1),
                asset_name: "BND".to_string(),
                date: "2019-01-03".to_string(),
                shares: 8,
                share_cost: dec!(10.00),
                share_price: dec!(12.35),
            }],
            total_value: dec!(98.8),
            total_capital_gains: dec!(18.8),
            path: SelectionPath::Engine,
        };
        (portfolio, report)
    }

    #[test]
    fn test_output_numbers() {
        let (portfolio, report) = sample();
        let json = DonationDocument::new(&portfolio, &report, DecimalStyle::Number)
            .to_json()
            .unwrap();
        assert_eq!(
            json,
            r#"{"donation":[{"assetName":"BND","date":"2019-01-03","shares":8,"shareCost":10.00}],"assetSharePrices":{"BND":12.35,"VTI":100.22},"totalValue":98.8,"totalCapitalGains":18.8}"#
        );
    }

    #[test]
    fn test_output_quoted() {
        let (portfolio, report) = sample();
        let json = DonationDocument::new(&portfolio, &report, DecimalStyle::Quoted)
            .to_json()
            .unwrap();
        assert!(json.contains(r#""shareCost":"10.00""#));
        assert!(json.contains(r#""totalValue":"98.8""#));
        assert!(json.contains(r#""VTI":"100.22""#));
    }
}
