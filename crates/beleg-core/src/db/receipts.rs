//! Receipt and line item operations

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{
    AuditFlags, Category, LineItem, NewLineItem, NewReceipt, Receipt, ReceiptDetail,
};

impl Database {
    /// Insert a receipt together with its line items in one transaction
    ///
    /// Flags are left unset; the audit engine computes and persists them as
    /// the next step of ingestion. Returns the new receipt id and the stored
    /// line items.
    pub fn create_receipt_with_items(
        &self,
        receipt: &NewReceipt,
        items: &[NewLineItem],
        image_hash: Option<&str>,
    ) -> Result<(i64, Vec<LineItem>)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO receipts (vendor_name, date, total_amount, tax_amount, currency, category, image_hash)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                receipt.vendor_name,
                format_datetime(&receipt.date),
                receipt.total_amount,
                receipt.tax_amount,
                receipt.currency,
                receipt.category.map(|c| c.as_str()),
                image_hash,
            ],
        )?;
        let receipt_id = tx.last_insert_rowid();

        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            tx.execute(
                "INSERT INTO line_items (receipt_id, description, amount) VALUES (?, ?, ?)",
                params![receipt_id, item.description, item.amount],
            )?;
            stored.push(LineItem {
                id: tx.last_insert_rowid(),
                receipt_id,
                description: item.description.clone(),
                amount: item.amount,
            });
        }

        tx.commit()?;
        Ok((receipt_id, stored))
    }

    /// Get a receipt by id
    pub fn get_receipt(&self, id: i64) -> Result<Option<Receipt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE id = ?",
            Self::RECEIPT_SELECT
        ))?;

        let receipt = stmt
            .query_row(params![id], |row| Self::row_to_receipt(row))
            .optional()?;

        Ok(receipt)
    }

    /// Get a receipt by the content hash of its source image
    pub fn get_receipt_by_image_hash(&self, image_hash: &str) -> Result<Option<Receipt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE image_hash = ?",
            Self::RECEIPT_SELECT
        ))?;

        let receipt = stmt
            .query_row(params![image_hash], |row| Self::row_to_receipt(row))
            .optional()?;

        Ok(receipt)
    }

    /// List all receipts in insertion order
    pub fn list_receipts(&self) -> Result<Vec<Receipt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", Self::RECEIPT_SELECT))?;

        let receipts = stmt
            .query_map([], |row| Self::row_to_receipt(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(receipts)
    }

    /// List all receipts that carry at least one audit flag
    pub fn list_flagged_receipts(&self) -> Result<Vec<Receipt>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE flag_duplicate = 1 OR flag_suspicious = 1 OR flag_missing_vat = 1 OR flag_math_error = 1
             ORDER BY id ASC",
            Self::RECEIPT_SELECT
        ))?;

        let receipts = stmt
            .query_map([], |row| Self::row_to_receipt(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(receipts)
    }

    /// Get the line items of a receipt
    pub fn get_line_items(&self, receipt_id: i64) -> Result<Vec<LineItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, receipt_id, description, amount FROM line_items
             WHERE receipt_id = ? ORDER BY id ASC",
        )?;

        let items = stmt
            .query_map(params![receipt_id], |row| {
                Ok(LineItem {
                    id: row.get(0)?,
                    receipt_id: row.get(1)?,
                    description: row.get(2)?,
                    amount: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Get a receipt with its line items
    pub fn get_receipt_detail(&self, id: i64) -> Result<Option<ReceiptDetail>> {
        let Some(receipt) = self.get_receipt(id)? else {
            return Ok(None);
        };
        let line_items = self.get_line_items(id)?;
        Ok(Some(ReceiptDetail {
            receipt,
            line_items,
        }))
    }

    /// List all receipts with their line items
    pub fn list_receipt_details(&self) -> Result<Vec<ReceiptDetail>> {
        let receipts = self.list_receipts()?;
        let mut details = Vec::with_capacity(receipts.len());
        for receipt in receipts {
            let line_items = self.get_line_items(receipt.id)?;
            details.push(ReceiptDetail {
                receipt,
                line_items,
            });
        }
        Ok(details)
    }

    /// Distinct vendor names currently present, in iteration-stable order
    pub fn distinct_vendors(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT vendor_name FROM receipts ORDER BY vendor_name ASC")?;

        let vendors = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(vendors)
    }

    /// Distinct category values currently present
    pub fn distinct_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT category FROM receipts WHERE category IS NOT NULL ORDER BY category ASC",
        )?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(names.iter().filter_map(|n| n.parse().ok()).collect())
    }

    /// Whether another receipt (different id) has the same vendor, date and
    /// total — the duplicate-detection tuple
    pub fn has_duplicate(
        &self,
        vendor_name: &str,
        date: &DateTime<Utc>,
        total_amount: f64,
        exclude_id: i64,
    ) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM receipts
             WHERE vendor_name = ? AND date = ? AND total_amount = ? AND id != ?",
            params![vendor_name, format_datetime(date), total_amount, exclude_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Persist the audit flags computed for a receipt
    pub fn update_receipt_flags(&self, id: i64, flags: &AuditFlags) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE receipts SET flag_duplicate = ?, flag_suspicious = ?,
             flag_missing_vat = ?, flag_math_error = ? WHERE id = ?",
            params![
                flags.duplicate,
                flags.suspicious,
                flags.missing_vat,
                flags.math_error,
                id
            ],
        )?;
        Ok(())
    }

    /// Number of receipts in the store
    pub fn count_receipts(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM receipts", [], |row| row.get(0))?;
        Ok(count)
    }

    const RECEIPT_SELECT: &'static str =
        "SELECT id, vendor_name, date, total_amount, tax_amount, currency, category,
                flag_duplicate, flag_suspicious, flag_missing_vat, flag_math_error, created_at
         FROM receipts";

    /// Helper to convert a row to Receipt
    fn row_to_receipt(row: &rusqlite::Row) -> rusqlite::Result<Receipt> {
        let date_str: String = row.get(2)?;
        let category_str: Option<String> = row.get(6)?;
        let created_at_str: String = row.get(11)?;

        Ok(Receipt {
            id: row.get(0)?,
            vendor_name: row.get(1)?,
            date: parse_datetime(&date_str),
            total_amount: row.get(3)?,
            tax_amount: row.get(4)?,
            currency: row.get(5)?,
            category: category_str.and_then(|s| s.parse().ok()),
            flag_duplicate: row.get(7)?,
            flag_suspicious: row.get(8)?,
            flag_missing_vat: row.get(9)?,
            flag_math_error: row.get(10)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
