use serde::{Deserialize, Serialize};

/// Raw struct deserilized from yaml
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub default_commission: Option<i64>,
    pub absence_marker: Option<String>,
    pub container: Option<String>,
    pub columns: Option<Columns>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Columns {
    pub date: Option<String>,
    pub item: Option<String>,
    pub qty: Option<String>,
    pub net_sales: Option<String>,
    pub category: Option<String>,
}
