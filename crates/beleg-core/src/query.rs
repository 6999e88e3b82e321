//! Natural-language query parsing into structured filters
//!
//! A question like "zeig mir alle Quittungen von Shell über 50€" becomes an
//! ordered list of [`Filter`]s that are applied to the full receipt set with
//! AND semantics. Extraction runs in a fixed precedence order (amount →
//! vendor → category → date → audit); each extractor is independent and a
//! pattern that fails to match, or a numeric literal that fails to parse,
//! simply contributes no filter. Parsing never fails: nonsensical input
//! degrades to "all receipts".

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::classify::find_category_in_query;
use crate::db::Database;
use crate::error::Result;
use crate::models::{Category, Receipt};

/// Rolling date window, counted back from "now"
///
/// Deliberately not calendar-aligned: "last month" means the last 30 days,
/// not the previous calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    Week,
    Month,
    Year,
}

impl DateWindow {
    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Week => "last week",
            Self::Month => "last month",
            Self::Year => "last year",
        }
    }
}

/// Which audit flag a query asks about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditFilterKind {
    Duplicate,
    Suspicious,
    MissingVat,
    MathError,
    /// Any of the four flags set
    Any,
}

impl AuditFilterKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Duplicate => "duplicates",
            Self::Suspicious => "suspicious",
            Self::MissingVat => "missing VAT",
            Self::MathError => "math errors",
            Self::Any => "any audit issue",
        }
    }
}

/// One structured predicate extracted from a query
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    AmountUnder(f64),
    AmountOver(f64),
    AmountBetween(f64, f64),
    Vendor(String),
    Category(Category),
    Date {
        window: DateWindow,
        cutoff: DateTime<Utc>,
    },
    Audit(AuditFilterKind),
}

impl Filter {
    /// Whether a receipt passes this predicate
    pub fn matches(&self, receipt: &Receipt) -> bool {
        match self {
            Self::AmountUnder(limit) => receipt.total_amount < *limit,
            Self::AmountOver(limit) => receipt.total_amount > *limit,
            Self::AmountBetween(min, max) => {
                receipt.total_amount >= *min && receipt.total_amount <= *max
            }
            Self::Vendor(vendor) => receipt.vendor_name == *vendor,
            Self::Category(category) => receipt.category == Some(*category),
            Self::Date { cutoff, .. } => receipt.date >= *cutoff,
            Self::Audit(kind) => match kind {
                AuditFilterKind::Duplicate => receipt.flag_duplicate,
                AuditFilterKind::Suspicious => receipt.flag_suspicious,
                AuditFilterKind::MissingVat => receipt.flag_missing_vat,
                AuditFilterKind::MathError => receipt.flag_math_error,
                AuditFilterKind::Any => receipt.is_flagged(),
            },
        }
    }

    /// Human-readable description of this predicate
    pub fn describe(&self) -> String {
        match self {
            Self::AmountUnder(limit) => format!("under {:.2}€", limit),
            Self::AmountOver(limit) => format!("over {:.2}€", limit),
            Self::AmountBetween(min, max) => format!("between {:.2}€ and {:.2}€", min, max),
            Self::Vendor(vendor) => format!("vendor: {}", vendor),
            Self::Category(category) => format!("category: {}", category),
            Self::Date { window, .. } => window.label().to_string(),
            Self::Audit(kind) => kind.label().to_string(),
        }
    }
}

/// The ordered filter list parsed from one query
#[derive(Debug, Clone, Default)]
pub struct ParsedQuery {
    pub filters: Vec<Filter>,
}

/// Fixed description for a query that matched no filter pattern
pub const ALL_RECEIPTS: &str = "all receipts";

impl ParsedQuery {
    /// Apply all filters with AND semantics
    pub fn apply(&self, receipts: &[Receipt]) -> Vec<Receipt> {
        receipts
            .iter()
            .filter(|r| self.filters.iter().all(|f| f.matches(r)))
            .cloned()
            .collect()
    }

    /// Joined description of the applied filter chain
    pub fn description(&self) -> String {
        if self.filters.is_empty() {
            ALL_RECEIPTS.to_string()
        } else {
            self.filters
                .iter()
                .map(|f| f.describe())
                .collect::<Vec<_>>()
                .join(" + ")
        }
    }
}

/// Keyword sets for the rolling date windows, checked in order
const DATE_KEYWORDS: &[(&[&str], DateWindow)] = &[
    (
        &["letzte woche", "letzten woche", "last week", "this week"],
        DateWindow::Week,
    ),
    (
        &["letzter monat", "letzten monat", "last month", "this month"],
        DateWindow::Month,
    ),
    (
        &["letztes jahr", "last year", "this year"],
        DateWindow::Year,
    ),
];

/// Keyword sets for audit-flag filters; every matching set contributes a
/// filter (they are independent, not mutually exclusive)
const AUDIT_KEYWORDS: &[(&[&str], AuditFilterKind)] = &[
    (
        &["duplicate", "duplikat", "doppelt"],
        AuditFilterKind::Duplicate,
    ),
    (
        &[
            "suspicious",
            "verdächtig",
            "verdaechtig",
            "alkohol",
            "alcohol",
            "tabak",
            "tobacco",
        ],
        AuditFilterKind::Suspicious,
    ),
    (
        &[
            "missing vat",
            "fehlende mwst",
            "ohne mwst",
            "no vat",
            "keine mwst",
        ],
        AuditFilterKind::MissingVat,
    ),
    (
        &[
            "math error",
            "rechenfehler",
            "mismatch",
            "falsch berechnet",
        ],
        AuditFilterKind::MathError,
    ),
    (
        &["problem", "issue", "fehler", "flag", "audit"],
        AuditFilterKind::Any,
    ),
];

/// Parser with pre-compiled amount patterns
///
/// Construct once and reuse; `parse` itself is infallible.
pub struct QueryParser {
    re_under: Regex,
    re_over: Regex,
    re_between: Regex,
}

impl QueryParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_under: Regex::new(r"(?:under|unter|below|less than)\s+(\d+(?:[.,]\d+)?)")?,
            re_over: Regex::new(
                r"(?:über|ueber|above|over|more than|greater than)\s+(\d+(?:[.,]\d+)?)",
            )?,
            re_between: Regex::new(
                r"(?:zwischen|between)\s+(\d+(?:[.,]\d+)?)\s+(?:und|and)\s+(\d+(?:[.,]\d+)?)",
            )?,
        })
    }

    /// Parse a query against the current repository contents
    ///
    /// Reads the distinct vendor and category values so the vendor/category
    /// extractors can match what is actually stored.
    pub fn parse_query(
        &self,
        db: &Database,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ParsedQuery> {
        let vendors = db.distinct_vendors()?;
        let categories = db.distinct_categories()?;
        Ok(self.parse(text, &vendors, &categories, now))
    }

    /// Parse a query against explicit vendor/category snapshots
    pub fn parse(
        &self,
        text: &str,
        vendors: &[String],
        categories: &[Category],
        now: DateTime<Utc>,
    ) -> ParsedQuery {
        let query = text.to_lowercase();
        let mut filters = Vec::new();

        self.extract_amount_filters(&query, &mut filters);
        extract_vendor_filter(&query, vendors, &mut filters);
        extract_category_filter(&query, categories, &mut filters);
        extract_date_filter(&query, now, &mut filters);
        extract_audit_filters(&query, &mut filters);

        ParsedQuery { filters }
    }

    /// Amount filters: under, over, between (in that order)
    fn extract_amount_filters(&self, query: &str, filters: &mut Vec<Filter>) {
        if let Some(caps) = self.re_under.captures(query) {
            if let Some(limit) = parse_amount(&caps[1]) {
                filters.push(Filter::AmountUnder(limit));
            }
        }
        if let Some(caps) = self.re_over.captures(query) {
            if let Some(limit) = parse_amount(&caps[1]) {
                filters.push(Filter::AmountOver(limit));
            }
        }
        if let Some(caps) = self.re_between.captures(query) {
            if let (Some(min), Some(max)) = (parse_amount(&caps[1]), parse_amount(&caps[2])) {
                filters.push(Filter::AmountBetween(min, max));
            }
        }
    }
}

/// Parse a numeric literal with either `.` or `,` as decimal separator
fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse().ok()
}

/// Vendor filter: any stored vendor name appearing in the query
///
/// When several vendor names match (one being a substring of another, say),
/// the longest match wins instead of repository iteration order.
fn extract_vendor_filter(query: &str, vendors: &[String], filters: &mut Vec<Filter>) {
    let best = vendors
        .iter()
        .filter(|v| !v.is_empty() && query.contains(&v.to_lowercase()))
        .max_by_key(|v| v.len());
    if let Some(vendor) = best {
        filters.push(Filter::Vendor(vendor.clone()));
    }
}

/// Category filter: stored category values first, then the bilingual
/// translation table; at most one category filter per query
fn extract_category_filter(query: &str, categories: &[Category], filters: &mut Vec<Filter>) {
    let stored = categories
        .iter()
        .filter(|c| query.contains(&c.as_str().to_lowercase()))
        .max_by_key(|c| c.as_str().len())
        .copied();
    if let Some(category) = stored.or_else(|| find_category_in_query(query)) {
        filters.push(Filter::Category(category));
    }
}

/// Date filter: first matching rolling window, if any
fn extract_date_filter(query: &str, now: DateTime<Utc>, filters: &mut Vec<Filter>) {
    for (keywords, window) in DATE_KEYWORDS {
        if keywords.iter().any(|kw| query.contains(kw)) {
            filters.push(Filter::Date {
                window: *window,
                cutoff: now - Duration::days(window.days()),
            });
            return;
        }
    }
}

/// Audit filters: every keyword set that matches contributes one filter
fn extract_audit_filters(query: &str, filters: &mut Vec<Filter>) {
    for (keywords, kind) in AUDIT_KEYWORDS {
        if keywords.iter().any(|kw| query.contains(kw)) {
            filters.push(Filter::Audit(*kind));
        }
    }
}
