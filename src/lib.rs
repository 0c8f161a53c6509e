pub mod aggregate;
pub mod category;
pub mod commission;
pub mod config;
pub mod filename;
pub mod money;
pub mod report;
pub mod sale;

use aggregate::{RateConflict, SkipReport};
use anyhow::Result;
use category::{CategoryParser, name_key};
use chrono::{DateTime, Local};
use config::Config;
use report::ReportRecord;
use sale::SaleRow;
use serde::Serialize;
use tracing::info;

/// Turns one POS export into commission report records.
///
/// A pipeline holds only its configuration, each run works on its own data.
pub struct Pipeline {
    pub config: Config,
    parser: CategoryParser,
}

/// The immutable result of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunBundle {
    /// One record per seller in order of first appearance, filenames allocated
    pub records: Vec<ReportRecord>,
    pub skipped: Vec<SkipReport>,
    pub rate_conflicts: Vec<RateConflict>,
}

impl RunBundle {
    /// Finds a seller's record by name, ignoring case and spacing.
    pub fn record(&self, seller: &str) -> Option<&ReportRecord> {
        let key = name_key(seller);
        self.records.iter().find(|r| r.identity.key() == key)
    }
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let parser = CategoryParser::new(config.default_commission, &config.absence_marker);
        Pipeline { config, parser }
    }

    /// Fails only when the amounts are too large to total.
    pub fn run(&self, rows: &[SaleRow]) -> Result<RunBundle, sale::MalformedRow> {
        let aggregate::Aggregation {
            buckets,
            skipped,
            rate_conflicts,
        } = aggregate::aggregate(&self.parser, rows)?;
        let records: Vec<ReportRecord> = buckets
            .into_iter()
            .map(|(identity, bucket)| report::build(identity, bucket))
            .collect();
        let filenames = filename::allocate(&records);
        let records = records
            .into_iter()
            .zip(filenames)
            .map(|(record, filename)| record.with_filename(filename))
            .collect();
        Ok(RunBundle {
            records,
            skipped,
            rate_conflicts,
        })
    }

    /// Loads and runs an export. A malformed export yields an error and no records.
    pub async fn run_file(&self, path: &str) -> Result<RunBundle> {
        let rows = sale::load_rows(path, &self.config.columns).await?;
        let bundle = self.run(&rows)?;
        info!(
            path,
            records = bundle.records.len(),
            skipped = bundle.skipped.len(),
            "processed export"
        );
        Ok(bundle)
    }

    pub fn manifest<'a>(&'a self, bundle: &'a RunBundle) -> Manifest<'a> {
        Manifest::new(&self.config.container, bundle, Local::now())
    }
}

/// Handoff to the rendering and packaging steps.
#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub generated_at: DateTime<Local>,
    pub container: &'a str,
    pub reports: Vec<ManifestEntry<'a>>,
    pub skipped: &'a [SkipReport],
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry<'a> {
    pub path: String,
    pub record: &'a ReportRecord,
}

impl<'a> Manifest<'a> {
    pub fn new(container: &'a str, bundle: &'a RunBundle, generated_at: DateTime<Local>) -> Self {
        Manifest {
            generated_at,
            container,
            reports: bundle
                .records
                .iter()
                .map(|record| ManifestEntry {
                    path: filename::archive_path(container, &record.filename),
                    record,
                })
                .collect(),
            skipped: &bundle.skipped,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
