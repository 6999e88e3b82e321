//! Domain models for Beleg

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded purchase event with audit flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    pub vendor_name: String,
    pub date: DateTime<Utc>,
    /// Vendor-declared grand total
    pub total_amount: f64,
    /// `None` or `0` is a valid (if flaggable) value
    pub tax_amount: Option<f64>,
    /// 3-letter currency code, defaults to "EUR"
    pub currency: String,
    pub category: Option<Category>,
    pub flag_duplicate: bool,
    pub flag_suspicious: bool,
    pub flag_missing_vat: bool,
    pub flag_math_error: bool,
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    /// Whether any of the four audit flags is set
    pub fn is_flagged(&self) -> bool {
        self.flags().any()
    }

    /// The four audit flags as one value
    pub fn flags(&self) -> AuditFlags {
        AuditFlags {
            duplicate: self.flag_duplicate,
            suspicious: self.flag_suspicious,
            missing_vat: self.flag_missing_vat,
            math_error: self.flag_math_error,
        }
    }
}

/// One purchased position on a receipt
///
/// `amount` is the line total for the position (quantity already
/// multiplied out), never a per-unit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub receipt_id: i64,
    pub description: String,
    pub amount: f64,
}

/// The four audit flags of a receipt, as computed by the audit engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFlags {
    pub duplicate: bool,
    pub suspicious: bool,
    pub missing_vat: bool,
    pub math_error: bool,
}

impl AuditFlags {
    pub fn any(&self) -> bool {
        self.duplicate || self.suspicious || self.missing_vat || self.math_error
    }
}

/// Insert payload for a receipt (id assigned by the database)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReceipt {
    pub vendor_name: String,
    pub date: DateTime<Utc>,
    pub total_amount: f64,
    pub tax_amount: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub category: Option<Category>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

/// Insert payload for a line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLineItem {
    pub description: String,
    pub amount: f64,
}

/// A receipt together with its line items
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptDetail {
    #[serde(flatten)]
    pub receipt: Receipt,
    pub line_items: Vec<LineItem>,
}

/// Closed, non-hierarchical spending categories
///
/// `Uncategorized` is deliberately distinct from every concrete category
/// so that unclassified spend never masquerades as a real bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Alcohol,
    Beverages,
    Groceries,
    Meals,
    OfficeSupplies,
    Electronics,
    Furniture,
    Fuel,
    Travel,
    Hardware,
    Software,
    Other,
    Uncategorized,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alcohol => "Alcohol",
            Self::Beverages => "Beverages",
            Self::Groceries => "Groceries",
            Self::Meals => "Meals",
            Self::OfficeSupplies => "Office Supplies",
            Self::Electronics => "Electronics",
            Self::Furniture => "Furniture",
            Self::Fuel => "Fuel",
            Self::Travel => "Travel",
            Self::Hardware => "Hardware",
            Self::Software => "Software",
            Self::Other => "Other",
            Self::Uncategorized => "Uncategorized",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Alcohol,
            Self::Beverages,
            Self::Groceries,
            Self::Meals,
            Self::OfficeSupplies,
            Self::Electronics,
            Self::Furniture,
            Self::Fuel,
            Self::Travel,
            Self::Hardware,
            Self::Software,
            Self::Other,
            Self::Uncategorized,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "alcohol" => Ok(Self::Alcohol),
            "beverages" => Ok(Self::Beverages),
            "groceries" => Ok(Self::Groceries),
            "meals" => Ok(Self::Meals),
            "office supplies" | "office_supplies" => Ok(Self::OfficeSupplies),
            "electronics" => Ok(Self::Electronics),
            "furniture" => Ok(Self::Furniture),
            "fuel" => Ok(Self::Fuel),
            "travel" => Ok(Self::Travel),
            "hardware" => Ok(Self::Hardware),
            "software" => Ok(Self::Software),
            "other" => Ok(Self::Other),
            "uncategorized" => Ok(Self::Uncategorized),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query language detected from user text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    German,
    English,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::German => "de",
            Self::English => "en",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_roundtrip() {
        for cat in Category::all() {
            let parsed: Category = cat.as_str().parse().unwrap();
            assert_eq!(parsed, *cat);
        }
    }

    #[test]
    fn category_unknown_is_err() {
        assert!("lasers".parse::<Category>().is_err());
    }
}
