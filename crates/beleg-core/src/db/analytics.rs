//! Monthly and per-category spending totals

use serde::Serialize;

use super::Database;
use crate::error::Result;

/// Total spend for one calendar month ("YYYY-MM")
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub total: f64,
}

/// Total spend for one category value
#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

impl Database {
    /// Total amount per month, ascending by month
    pub fn monthly_totals(&self) -> Result<Vec<MonthlyTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT strftime('%Y-%m', date) AS month, SUM(total_amount)
             FROM receipts
             GROUP BY strftime('%Y-%m', date)
             ORDER BY strftime('%Y-%m', date)",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(MonthlyTotal {
                    month: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|mut m| {
                m.total = (m.total * 100.0).round() / 100.0;
                m
            })
            .collect())
    }

    /// Total amount per category, descending by total
    pub fn category_totals(&self) -> Result<Vec<CategoryTotal>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT category, SUM(total_amount)
             FROM receipts
             WHERE category IS NOT NULL
             GROUP BY category
             ORDER BY SUM(total_amount) DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|mut c| {
                c.total = (c.total * 100.0).round() / 100.0;
                c
            })
            .collect())
    }
}
