mod raw;

use anyhow::{Context, Error, Result, bail};
use async_std::fs;
use std::str::FromStr;

pub const DEFAULT_COMMISSION: u8 = 30;
pub const ABSENCE_MARKER: &str = "None";
pub const CONTAINER: &str = "commission_reports";

/// Settings for one run. Every field has a default matching a stock Square export.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Commission percent used when a category carries no `(NN)` suffix
    pub default_commission: u8,
    /// Category text the export writes for "no category"
    pub absence_marker: String,
    /// Folder inside the archive that holds the rendered reports
    pub container: String,
    pub columns: Columns,
}

/// Header names of the export columns the pipeline reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Columns {
    pub date: String,
    pub item: String,
    pub qty: String,
    pub net_sales: String,
    pub category: String,
}

impl Columns {
    pub fn names(&self) -> Vec<&str> {
        vec![
            self.date.as_str(),
            self.item.as_str(),
            self.qty.as_str(),
            self.net_sales.as_str(),
            self.category.as_str(),
        ]
    }
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            date: "Date".to_owned(),
            item: "Item".to_owned(),
            qty: "Qty".to_owned(),
            net_sales: "Net Sales".to_owned(),
            category: "Category".to_owned(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_commission: DEFAULT_COMMISSION,
            absence_marker: ABSENCE_MARKER.to_owned(),
            container: CONTAINER.to_owned(),
            columns: Columns::default(),
        }
    }
}

impl Config {
    pub async fn from_file(file: &str) -> Result<Self> {
        let doc = fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read config {}", file))?;
        doc.parse()
    }
}

fn column(name: Option<String>, default: String, key: &str) -> Result<String> {
    match name {
        None => Ok(default),
        Some(name) if name.trim().is_empty() => bail!("Column name for '{}' is empty", key),
        Some(name) => Ok(name.trim().to_owned()),
    }
}

impl TryFrom<raw::Columns> for Columns {
    type Error = Error;

    fn try_from(
        raw::Columns {
            date,
            item,
            qty,
            net_sales,
            category,
        }: raw::Columns,
    ) -> Result<Self> {
        let default = Columns::default();
        Ok(Columns {
            date: column(date, default.date, "date")?,
            item: column(item, default.item, "item")?,
            qty: column(qty, default.qty, "qty")?,
            net_sales: column(net_sales, default.net_sales, "net_sales")?,
            category: column(category, default.category, "category")?,
        })
    }
}

impl TryFrom<raw::Config> for Config {
    type Error = Error;

    fn try_from(
        raw::Config {
            default_commission,
            absence_marker,
            container,
            columns,
        }: raw::Config,
    ) -> Result<Self> {
        let default_commission = match default_commission {
            None => DEFAULT_COMMISSION,
            Some(pct @ 0..=100) => pct as u8,
            Some(pct) => bail!("default_commission must be within 0-100, got {}", pct),
        };
        let container = container.unwrap_or_else(|| CONTAINER.to_owned());
        if container.trim().is_empty() || container.contains(['/', '\\']) {
            bail!("container must be a single non-empty folder name: '{}'", container);
        }
        Ok(Config {
            default_commission,
            absence_marker: absence_marker.unwrap_or_else(|| ABSENCE_MARKER.to_owned()),
            container,
            columns: columns.unwrap_or_default().try_into()?,
        })
    }
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(doc: &str) -> Result<Self, Self::Err> {
        // an empty file deserializes to unit, not a map
        if doc.trim().is_empty() {
            return Ok(Config::default());
        }
        let raw_config: raw::Config = serde_yaml::from_str(doc)
            .with_context(|| format!("Failed to deserialize Config:\n{}", doc))?;
        raw_config
            .try_into()
            .with_context(|| "Failed to convert Config".to_string())
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn defaults() -> Result<()> {
        let config: Config = "".parse()?;
        assert_eq!(config, Config::default());
        assert_eq!(config.default_commission, 30);
        assert_eq!(config.columns.net_sales, "Net Sales");
        Ok(())
    }

    #[test]
    fn partial_yaml() -> Result<()> {
        let config: Config = indoc! {"
            default_commission: 25
            columns:
              net_sales: Net Amount
        "}
        .parse()?;
        assert_eq!(config.default_commission, 25);
        assert_eq!(config.absence_marker, "None");
        assert_eq!(config.columns.net_sales, "Net Amount");
        assert_eq!(config.columns.category, "Category");
        Ok(())
    }

    #[test]
    fn rejects_invalid() {
        let err = "default_commission: 120".parse::<Config>().unwrap_err();
        assert!(format!("{:#}", err).contains("default_commission must be within 0-100"));
        assert!("container: a/b".parse::<Config>().is_err());
        assert!("columns: { qty: ' ' }".parse::<Config>().is_err());
        assert!("commission: 20".parse::<Config>().is_err());
    }
}
