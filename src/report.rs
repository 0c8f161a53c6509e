use crate::aggregate::SellerBucket;
use crate::category::SellerIdentity;
use crate::commission::{self, CommissionSummary};
use crate::money::Money;
use crate::sale::SaleRow;
use num_traits::Zero;
use serde::Serialize;
use std::fmt;

/// Everything the renderer needs for one seller's report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub identity: SellerIdentity,
    pub rows: Vec<SaleRow>,
    pub summary: CommissionSummary,
    /// Output name, empty until filenames are allocated
    pub filename: String,
}

/// Assembles the record. The bucket's running total is used as is, rows are not re-summed.
pub fn build(identity: SellerIdentity, bucket: SellerBucket) -> ReportRecord {
    let summary = commission::compute(bucket.total, identity.commission);
    ReportRecord {
        identity,
        rows: bucket.rows,
        summary,
        filename: String::new(),
    }
}

impl ReportRecord {
    pub fn with_filename(self, filename: String) -> Self {
        ReportRecord { filename, ..self }
    }
}

const DATE_PAD: usize = 12;
const ITEM_PAD: usize = 32;
const QTY_PAD: usize = 6;
const AMT_PAD: usize = 14;

impl fmt::Display for ReportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ReportRecord {
            identity, summary, ..
        } = self;
        writeln!(f, "{}", identity.name)?;
        writeln!(f, "Commission Rate: {}%", identity.commission)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:DATE_PAD$} | {:ITEM_PAD$} | {:>QTY_PAD$} | {:>AMT_PAD$}",
            "Date", "Item", "Qty", "Net Sales"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:DATE_PAD$} | {:ITEM_PAD$} | {:>QTY_PAD$} | {:>AMT_PAD$}",
                row.date,
                row.item,
                row.qty.normalize().to_string(),
                row.net_sales
            )?;
        }
        writeln!(
            f,
            "{:DATE_PAD$} | {:ITEM_PAD$} | {:>QTY_PAD$} | {:>AMT_PAD$}",
            "", "TOTAL", "", summary.total_net_sales
        )?;
        writeln!(f)?;
        writeln!(f, "Total Net Sales: {}", summary.total_net_sales)?;
        writeln!(
            f,
            "Gallery Commission ({}%): {}",
            summary.commission, summary.gallery_commission
        )?;
        writeln!(f, "Seller Payout: {}", summary.seller_payout)
    }
}

/// Cross-seller overview, one line per record plus a grand total.
pub struct SummaryTable<'a>(pub &'a [ReportRecord]);

const NAME_PAD: usize = 32;

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:NAME_PAD$} | {:>4} | {:>AMT_PAD$} | {:>AMT_PAD$} | {:>AMT_PAD$}",
            "Seller", "Rate", "Net Sales", "Commission", "Payout"
        )?;
        let (mut sales, mut gallery, mut payout) = (Money::zero(), Money::zero(), Money::zero());
        for ReportRecord {
            identity, summary, ..
        } in self.0
        {
            let rate = format!("{}%", identity.commission);
            writeln!(
                f,
                "{:NAME_PAD$} | {:>4} | {:>AMT_PAD$} | {:>AMT_PAD$} | {:>AMT_PAD$}",
                identity.name,
                rate,
                summary.total_net_sales,
                summary.gallery_commission,
                summary.seller_payout
            )?;
            sales += summary.total_net_sales;
            gallery += summary.gallery_commission;
            payout += summary.seller_payout;
        }
        writeln!(
            f,
            "{:NAME_PAD$} | {:>4} | {:>AMT_PAD$} | {:>AMT_PAD$} | {:>AMT_PAD$}",
            "TOTAL", "", sales, gallery, payout
        )
    }
}
