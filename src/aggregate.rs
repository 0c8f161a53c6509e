use crate::category::{CategoryParser, ParseOutcome, SellerIdentity, SkipReason};
use crate::money::Money;
use crate::sale::{MalformedRow, SaleRow};
use num_traits::Zero;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// One seller's rows for the current run, in export order.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerBucket {
    pub rows: Vec<SaleRow>,
    pub total: Money,
}

impl SellerBucket {
    fn new() -> Self {
        SellerBucket {
            rows: Vec::new(),
            total: Money::zero(),
        }
    }

    fn push(&mut self, row: &SaleRow) -> Result<(), MalformedRow> {
        self.total = self
            .total
            .checked_add(row.net_sales)
            .ok_or(MalformedRow::AmountOverflow { line: row.line })?;
        self.rows.push(row.clone());
        Ok(())
    }
}

/// A row left out of every report, with enough of the row to find it in the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipReport {
    pub line: usize,
    pub category: String,
    pub reason: SkipReason,
    pub date: String,
    pub item: String,
    pub net_sales: Money,
}

/// A later category for a known seller that asked for a different rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateConflict {
    pub line: usize,
    pub seller: String,
    pub kept: u8,
    pub ignored: u8,
}

#[derive(Debug, Default)]
pub struct Aggregation {
    /// Buckets in order of first appearance
    pub buckets: Vec<(SellerIdentity, SellerBucket)>,
    pub skipped: Vec<SkipReport>,
    pub rate_conflicts: Vec<RateConflict>,
}

/// Groups classified rows by seller. Fails when the amounts in the run are too large to
/// total, so every later sum over buckets stays in range.
pub fn aggregate(parser: &CategoryParser, rows: &[SaleRow]) -> Result<Aggregation, MalformedRow> {
    let mut agg = Aggregation::default();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut magnitude = Money::zero();

    for row in rows {
        magnitude = magnitude
            .checked_add(row.net_sales.abs())
            .ok_or(MalformedRow::AmountOverflow { line: row.line })?;
        let identity = match parser.parse(&row.category) {
            ParseOutcome::Classified(identity) => identity,
            ParseOutcome::Skipped(reason) => {
                debug!(line = row.line, category = %row.category, %reason, "skipping row");
                agg.skipped.push(SkipReport {
                    line: row.line,
                    category: row.category.clone(),
                    reason,
                    date: row.date.clone(),
                    item: row.item.clone(),
                    net_sales: row.net_sales,
                });
                continue;
            }
        };
        let slot = *index.entry(identity.key()).or_insert_with(|| {
            debug!(seller = %identity.name, commission = identity.commission, "new seller");
            agg.buckets.push((identity.clone(), SellerBucket::new()));
            agg.buckets.len() - 1
        });
        let (known, bucket) = &mut agg.buckets[slot];
        // first rate seen for a seller wins
        if known.commission != identity.commission {
            warn!(
                line = row.line,
                seller = %known.name,
                kept = known.commission,
                ignored = identity.commission,
                "conflicting commission rate for seller"
            );
            agg.rate_conflicts.push(RateConflict {
                line: row.line,
                seller: known.name.clone(),
                kept: known.commission,
                ignored: identity.commission,
            });
        }
        bucket.push(row)?;
    }

    info!(
        rows = rows.len(),
        sellers = agg.buckets.len(),
        skipped = agg.skipped.len(),
        "aggregated sales"
    );
    Ok(agg)
}
