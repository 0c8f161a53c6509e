pub mod raw;

use crate::config::Columns;
use crate::money::Money;
use anyhow::{Context, Result};
use async_std::fs;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Structural problems with the export itself. Any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum MalformedRow {
    #[error("export is missing required column(s): {}", .columns.join(", "))]
    MissingColumn { columns: Vec<String> },
    #[error("row {line}: missing required field '{field}'")]
    MissingField { line: usize, field: &'static str },
    #[error("row {line}: invalid {field} value '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("row {line}: net sales too large to total")]
    AmountOverflow { line: usize },
    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One validated POS transaction line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRow {
    /// 1-based data row index, header excluded
    pub line: usize,
    pub date: String,
    pub item: String,
    pub qty: Decimal,
    pub net_sales: Money,
    pub category: String,
}

impl TryFrom<raw::SaleRecord> for SaleRow {
    type Error = MalformedRow;

    fn try_from(
        raw::SaleRecord {
            line,
            date,
            item,
            qty,
            net_sales,
            category,
        }: raw::SaleRecord,
    ) -> Result<Self, MalformedRow> {
        let net_sales = net_sales
            .filter(|s| !s.trim().is_empty())
            .ok_or(MalformedRow::MissingField {
                line,
                field: "net sales",
            })?;
        let net_sales = net_sales
            .parse::<Money>()
            .map_err(|_| MalformedRow::InvalidField {
                line,
                field: "net sales",
                value: net_sales.clone(),
            })?;
        // adjustments are exported with a blank quantity
        let qty = match qty.as_deref().map(str::trim) {
            None | Some("") => Decimal::ZERO,
            Some(q) => Decimal::from_str(q).map_err(|_| MalformedRow::InvalidField {
                line,
                field: "qty",
                value: q.to_owned(),
            })?,
        };
        Ok(SaleRow {
            line,
            date: date.unwrap_or_default().trim().to_owned(),
            item: item.unwrap_or_default().trim().to_owned(),
            qty,
            net_sales,
            category: category.unwrap_or_default(),
        })
    }
}

/// Exports are usually UTF-8 but older POS versions write Latin-1.
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => {
            debug!("export is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

/// Reads every row of an export. Fails on the first structural problem.
pub fn read_rows(bytes: &[u8], columns: &Columns) -> Result<Vec<SaleRow>, MalformedRow> {
    let text = decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());
    let headers = reader.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let mut missing: Vec<String> = columns
        .names()
        .into_iter()
        .filter(|name| position(name).is_none())
        .map(ToOwned::to_owned)
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(MalformedRow::MissingColumn { columns: missing });
    }
    // rename the configured headers to the raw record's field names, first match wins
    let wanted = [
        (columns.date.as_str(), "date"),
        (columns.item.as_str(), "item"),
        (columns.qty.as_str(), "qty"),
        (columns.net_sales.as_str(), "net_sales"),
        (columns.category.as_str(), "category"),
    ];
    let fields: csv::StringRecord = headers
        .iter()
        .enumerate()
        .map(|(i, _)| {
            wanted
                .iter()
                .find(|&&(name, _)| position(name) == Some(i))
                .map_or("", |&(_, field)| field)
        })
        .collect();

    reader
        .records()
        .enumerate()
        .map(|(i, record)| -> Result<SaleRow, MalformedRow> {
            let mut raw: raw::SaleRecord = record?.deserialize(Some(&fields))?;
            raw.line = i + 1;
            raw.try_into()
        })
        .collect()
}

pub async fn load_rows(path: &str, columns: &Columns) -> Result<Vec<SaleRow>> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read export {}", path))?;
    let rows = read_rows(&bytes, columns)?;
    debug!(path, rows = rows.len(), "loaded export");
    Ok(rows)
}
