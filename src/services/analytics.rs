use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::database::models::{WasteEntry, WasteKind, WasteMeasure};

/// Sums over a scope-filtered set of waste entries. An empty set sums to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WasteTotals {
    Units {
        total_units: i64,
    },
    Weight {
        total_weight: Decimal,
    },
    Sale {
        total_weight: Decimal,
        total_price: Decimal,
    },
}

impl WasteTotals {
    pub fn zero(kind: WasteKind) -> Self {
        match kind {
            WasteKind::Ewaste => WasteTotals::Units { total_units: 0 },
            WasteKind::PaperWaste => WasteTotals::Weight { total_weight: Decimal::ZERO },
            WasteKind::SelledPaperWaste => WasteTotals::Sale {
                total_weight: Decimal::ZERO,
                total_price: Decimal::ZERO,
            },
        }
    }

    /// Top-level response members, keyed as clients expect them
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        let float = |d: &Decimal| json!(d.to_f64().unwrap_or_default());
        match self {
            WasteTotals::Units { total_units } => vec![("total_units", json!(total_units))],
            WasteTotals::Weight { total_weight } => vec![("total_weight", float(total_weight))],
            WasteTotals::Sale { total_weight, total_price } => vec![
                ("total_weight", float(total_weight)),
                ("total_price", float(total_price)),
            ],
        }
    }
}

/// Entries of other kinds are ignored. Sums saturate rather than overflow.
pub fn totals(kind: WasteKind, entries: &[WasteEntry]) -> WasteTotals {
    entries
        .iter()
        .fold(WasteTotals::zero(kind), |acc, entry| match (acc, &entry.measure) {
            (WasteTotals::Units { total_units }, WasteMeasure::Units { no_of_units, .. }) => {
                WasteTotals::Units { total_units: total_units.saturating_add(i64::from(*no_of_units)) }
            }
            (WasteTotals::Weight { total_weight }, WasteMeasure::Weight { weight }) => {
                WasteTotals::Weight { total_weight: total_weight.saturating_add(*weight) }
            }
            (
                WasteTotals::Sale { total_weight, total_price },
                WasteMeasure::Sale { total_weight: w, total_price: p },
            ) => WasteTotals::Sale {
                total_weight: total_weight.saturating_add(*w),
                total_price: total_price.saturating_add(*p),
            },
            (acc, _) => acc,
        })
}
