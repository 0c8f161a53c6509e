use serde::Deserialize;

/// Raw record read from the POS export, before any validation.
/// `None` means the cell was blank or absent from the record.
#[derive(Debug, PartialEq, Clone, Deserialize, Default)]
pub struct SaleRecord {
    /// Set from the record's position, not read from the export
    #[serde(skip)]
    pub line: usize,
    pub date: Option<String>,
    pub item: Option<String>,
    pub qty: Option<String>,
    pub net_sales: Option<String>,
    pub category: Option<String>,
}
