use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command};
use commissions::{Pipeline, RunBundle, aggregate::SkipReport, config::Config, report::SummaryTable};
use tracing_subscriber::EnvFilter;

fn export_arg() -> Arg<'static> {
    Arg::new("export")
        .help("POS export in CSV format")
        .value_name("CSV")
        .takes_value(true)
        .required(true)
}

fn print_skipped(skipped: &[SkipReport]) {
    let item_pad = 24;
    let amt_pad = 12;
    skipped.iter().for_each(|s| {
        println!(
            "{:>5} | {:10} | {:item_pad$} | {:>amt_pad$} | {:24} | {}",
            s.line, s.date, s.item, s.net_sales, s.category, s.reason
        );
    });
}

fn warn_skipped(bundle: &RunBundle) {
    if !bundle.skipped.is_empty() {
        eprintln!(
            "WARNING: {} row(s) with no usable seller category are excluded from reports \
            (run `skipped` for details)",
            bundle.skipped.len()
        );
    }
    bundle.rate_conflicts.iter().for_each(|c| {
        eprintln!(
            "WARNING: row {}: {} listed at {}%, keeping first rate of {}%",
            c.line, c.seller, c.ignored, c.kept
        );
    });
}

async fn run(pipeline: &Pipeline, matches: &ArgMatches) -> Result<RunBundle> {
    let export = matches.value_of("export").context("No export given")?;
    pipeline
        .run_file(export)
        .await
        .with_context(|| format!("Failed to process {}", export))
}

#[async_std::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("Commissions")
        .version("0.1.0")
        .about("Seller commission reports from POS exports")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("YAML config file")
                .value_name("FILE")
                .takes_value(true)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("summary")
                .about("Shows commission totals per seller")
                .arg(export_arg()),
        )
        .subcommand(
            Command::new("skipped")
                .about("Lists rows excluded for unusable categories")
                .arg(export_arg()),
        )
        .subcommand(
            Command::new("statement")
                .about("Prints seller statements")
                .arg(export_arg())
                .arg(
                    Arg::new("seller")
                        .short('s')
                        .long("seller")
                        .help("Only this seller")
                        .value_name("NAME")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("manifest")
                .about("Prints the JSON manifest for rendering and packaging")
                .arg(export_arg()),
        )
        .get_matches();

    let config = match matches.value_of("config") {
        Some(file) => Config::from_file(file).await?,
        None => Config::default(),
    };
    let pipeline = Pipeline::new(config);

    if let Some(summary) = matches.subcommand_matches("summary") {
        let bundle = run(&pipeline, summary).await?;
        warn_skipped(&bundle);
        if bundle.records.is_empty() && bundle.skipped.is_empty() {
            eprintln!("WARNING: No data found in export");
        } else {
            print!("{}", SummaryTable(&bundle.records));
        }
    } else if let Some(skipped) = matches.subcommand_matches("skipped") {
        let bundle = run(&pipeline, skipped).await?;
        print_skipped(&bundle.skipped);
    } else if let Some(statement) = matches.subcommand_matches("statement") {
        let bundle = run(&pipeline, statement).await?;
        warn_skipped(&bundle);
        if let Some(seller) = statement.value_of("seller") {
            match bundle.record(seller) {
                Some(record) => print!("{record}"),
                None => bail!("No seller named '{}' in export", seller),
            }
        } else {
            bundle.records.iter().for_each(|record| {
                println!("# {}", record.filename);
                println!("{record}");
            });
        }
    } else if let Some(manifest) = matches.subcommand_matches("manifest") {
        let bundle = run(&pipeline, manifest).await?;
        warn_skipped(&bundle);
        println!("{}", pipeline.manifest(&bundle).to_json()?);
    }
    Ok(())
}
