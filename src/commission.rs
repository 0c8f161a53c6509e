use crate::money::Money;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommissionSummary {
    pub total_net_sales: Money,
    pub commission: u8,
    pub gallery_commission: Money,
    pub seller_payout: Money,
}

/// Splits a seller's net sales between gallery and seller.
///
/// The gallery share is rounded to the cent; the payout is whatever remains, so the two
/// always add back to `total_net_sales` exactly.
pub fn compute(total_net_sales: Money, commission: u8) -> CommissionSummary {
    let gallery_commission = total_net_sales.percent(commission).round_cents();
    CommissionSummary {
        total_net_sales,
        commission,
        gallery_commission,
        seller_payout: total_net_sales - gallery_commission,
    }
}
