//! Headline financials from XBRL company facts
//!
//! Each concept maps to a list of us-gaap tag aliases tried in order. No
//! taxonomy reasoning happens here; the first tag with USD-family facts wins.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use super::client::{zero_pad_cik, EdgarClient, FACTS_TTL};
use super::types::FinancialsSnapshot;
use crate::error::Result;

/// Concept -> us-gaap tag aliases
const TAG_MAP: &[(&str, &[&str])] = &[
    (
        "Revenue",
        &[
            "Revenues",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "SalesRevenueNet",
        ],
    ),
    ("CostOfRevenue", &["CostOfRevenue"]),
    ("OperatingIncomeLoss", &["OperatingIncomeLoss"]),
    ("NetIncomeLoss", &["NetIncomeLoss"]),
    ("CashAndCashEquivalents", &["CashAndCashEquivalentsAtCarryingValue"]),
    (
        "LongTermDebt",
        &["LongTermDebtNoncurrent", "LongTermDebtAndCapitalLeaseObligations"],
    ),
    ("CurrentAssets", &["AssetsCurrent"]),
    ("CurrentLiabilities", &["LiabilitiesCurrent"]),
    ("OperatingCashFlow", &["NetCashProvidedByUsedInOperatingActivities"]),
    ("Capex", &["PaymentsToAcquirePropertyPlantAndEquipment"]),
];

const INCOME_STATEMENT: &[&str] = &["Revenue", "CostOfRevenue", "OperatingIncomeLoss", "NetIncomeLoss"];
const BALANCE_SHEET: &[&str] = &[
    "CashAndCashEquivalents",
    "LongTermDebt",
    "CurrentAssets",
    "CurrentLiabilities",
];
const CASH_FLOW: &[&str] = &["OperatingCashFlow", "Capex"];

const USD_UNITS: &[&str] = &["USD", "USD/share", "USD/shares"];

/// Fiscal year plus fiscal period label (`FY`, `Q1`..`Q4`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiscalPeriod {
    pub year: i64,
    pub period: String,
}

/// Parse `FY2023`, `Q1 2024` or `2024Q1`
pub fn parse_period(label: &str) -> Option<FiscalPeriod> {
    let compact: String = label.split_whitespace().collect::<String>().to_uppercase();
    if !compact.is_ascii() {
        return None;
    }

    let (period, year) = if let Some(year) = compact.strip_prefix("FY") {
        ("FY".to_string(), year.to_string())
    } else if compact.len() >= 6 && compact.starts_with('Q') {
        (compact[..2].to_string(), compact[2..].to_string())
    } else if compact.len() >= 6 && compact[4..].starts_with('Q') {
        (compact[4..6].to_string(), compact[..4].to_string())
    } else {
        return None;
    };

    let valid_period = period == "FY" || matches!(period.as_str(), "Q1" | "Q2" | "Q3" | "Q4");
    match (valid_period, year.parse::<i64>()) {
        (true, Ok(year)) => Some(FiscalPeriod { year, period }),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FactItem {
    val: Option<f64>,
    fy: Option<i64>,
    fp: Option<String>,
    end: Option<String>,
}

impl FactItem {
    fn sort_key(&self) -> (i64, String, String) {
        (
            self.fy.unwrap_or(0),
            self.fp.clone().unwrap_or_default(),
            self.end.clone().unwrap_or_default(),
        )
    }

    fn matches(&self, period: &FiscalPeriod) -> bool {
        self.fy == Some(period.year) && self.fp.as_deref() == Some(period.period.as_str())
    }
}

/// Value for one concept: the period's fact when present, else the latest
fn pick_fact(facts: &Value, concept: &str, period: Option<&FiscalPeriod>) -> Option<f64> {
    let aliases = TAG_MAP
        .iter()
        .find(|(name, _)| *name == concept)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[]);
    let gaap = facts.get("facts")?.get("us-gaap")?;

    for tag in aliases {
        let Some(units) = gaap.get(*tag).and_then(|node| node.get("units")).and_then(Value::as_object) else {
            continue;
        };

        for (unit, items) in units {
            if !USD_UNITS.contains(&unit.as_str()) {
                continue;
            }
            let mut items: Vec<FactItem> = match serde_json::from_value(items.clone()) {
                Ok(items) => items,
                Err(e) => {
                    tracing::debug!(tag = %tag, unit = %unit, error = %e, "Skipping malformed fact list");
                    continue;
                }
            };
            if items.is_empty() {
                continue;
            }
            items.sort_by_key(FactItem::sort_key);

            let chosen = period
                .and_then(|p| items.iter().rev().find(|item| item.matches(p)))
                .or_else(|| items.last());
            return chosen.and_then(|item| item.val);
        }
    }
    None
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Free cash flow, margins and current ratio
fn derived_metrics(
    income: &BTreeMap<String, Option<f64>>,
    balance: &BTreeMap<String, Option<f64>>,
    cash_flow: &BTreeMap<String, Option<f64>>,
) -> BTreeMap<String, Option<f64>> {
    let get = |map: &BTreeMap<String, Option<f64>>, key: &str| map.get(key).copied().flatten();

    let revenue = get(income, "Revenue");
    let cost = get(income, "CostOfRevenue");
    let operating = get(income, "OperatingIncomeLoss");
    let net = get(income, "NetIncomeLoss");
    let ocf = get(cash_flow, "OperatingCashFlow");
    let capex = get(cash_flow, "Capex");

    // Capex is reported as a positive payment
    let free_cash_flow = match (ocf, capex) {
        (Some(ocf), Some(capex)) => Some(ocf - capex),
        _ => None,
    };
    let gross = match (revenue, cost) {
        (Some(revenue), Some(cost)) => Some(revenue - cost),
        _ => None,
    };

    BTreeMap::from([
        ("free_cash_flow".to_string(), free_cash_flow),
        ("gross_margin".to_string(), ratio(gross, revenue)),
        ("operating_margin".to_string(), ratio(operating, revenue)),
        ("net_margin".to_string(), ratio(net, revenue)),
        (
            "current_ratio".to_string(),
            ratio(get(balance, "CurrentAssets"), get(balance, "CurrentLiabilities")),
        ),
    ])
}

/// Build a snapshot from a company facts document
pub fn snapshot_from_facts(facts: &Value, period_label: &str) -> FinancialsSnapshot {
    let period = parse_period(period_label);
    let statement = |concepts: &[&str]| -> BTreeMap<String, Option<f64>> {
        concepts
            .iter()
            .map(|concept| (concept.to_string(), pick_fact(facts, concept, period.as_ref())))
            .collect()
    };

    let income_statement = statement(INCOME_STATEMENT);
    let balance_sheet = statement(BALANCE_SHEET);
    let cash_flow = statement(CASH_FLOW);
    let derived = derived_metrics(&income_statement, &balance_sheet, &cash_flow);

    FinancialsSnapshot {
        period: period_label.to_string(),
        income_statement,
        balance_sheet,
        cash_flow,
        derived,
    }
}

impl EdgarClient {
    /// Headline financials for a company and fiscal period label
    pub async fn get_financials(&self, cik: &str, period: &str) -> Result<FinancialsSnapshot> {
        let cik10 = zero_pad_cik(cik)?;
        let url = self.urls.company_facts(&cik10);
        let facts = self
            .fetcher
            .fetch_json(&url, &format!("facts_{}", cik10), FACTS_TTL)
            .await?;

        Ok(snapshot_from_facts(&facts, period))
    }
}
