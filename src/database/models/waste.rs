use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three collection ledgers. They share one shape (a dated entry against
/// a post office) and differ only in what they measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteKind {
    Ewaste,
    PaperWaste,
    SelledPaperWaste,
}

impl WasteKind {
    pub const ALL: [WasteKind; 3] = [WasteKind::Ewaste, WasteKind::PaperWaste, WasteKind::SelledPaperWaste];

    pub fn table(&self) -> &'static str {
        match self {
            WasteKind::Ewaste => "ewaste",
            WasteKind::PaperWaste => "paper_waste",
            WasteKind::SelledPaperWaste => "selled_paper_waste",
        }
    }

    /// URL segment the resource is mounted under
    pub fn route(&self) -> &'static str {
        match self {
            WasteKind::Ewaste => "ewaste",
            WasteKind::PaperWaste => "paperwaste",
            WasteKind::SelledPaperWaste => "selledpaperwaste",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WasteKind::Ewaste => "E-waste",
            WasteKind::PaperWaste => "Paper waste",
            WasteKind::SelledPaperWaste => "Selled paper waste",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WasteMeasure {
    Units { no_of_units: i32, description: String },
    Weight { weight: Decimal },
    Sale { total_weight: Decimal, total_price: Decimal },
}

impl WasteMeasure {
    pub fn kind(&self) -> WasteKind {
        match self {
            WasteMeasure::Units { .. } => WasteKind::Ewaste,
            WasteMeasure::Weight { .. } => WasteKind::PaperWaste,
            WasteMeasure::Sale { .. } => WasteKind::SelledPaperWaste,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WasteEntry {
    pub id: Uuid,
    pub pincode: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub measure: WasteMeasure,
}

impl WasteEntry {
    pub fn kind(&self) -> WasteKind {
        self.measure.kind()
    }
}
