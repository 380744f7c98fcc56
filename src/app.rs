use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum, error::ErrorKind};
use serde::Serialize;

use crate::config::{ColumnMapping, IntervalPolicy, TrackerConfig};
use crate::constants::app::BIN_NAME;
use crate::constants::workbook::DEFAULT_SHEET;
use crate::dashboard::{Dashboard, DashboardViews};
use crate::source::InputFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Auto,
    Csv,
    Tsv,
    Json,
    Xlsx,
}

impl From<FormatArg> for InputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Auto => InputFormat::Auto,
            FormatArg::Csv => InputFormat::Csv,
            FormatArg::Tsv => InputFormat::Tsv,
            FormatArg::Json => InputFormat::Json,
            FormatArg::Xlsx => InputFormat::Xlsx,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Skip,
    Reject,
    PassThrough,
}

impl From<PolicyArg> for IntervalPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Skip => IntervalPolicy::Skip,
            PolicyArg::Reject => IntervalPolicy::Reject,
            PolicyArg::PassThrough => IntervalPolicy::PassThrough,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ViewArg {
    All,
    Status,
    Timeline,
    Overview,
    Evaluations,
}

#[derive(Debug, Parser)]
#[command(
    name = BIN_NAME,
    disable_help_subcommand = true,
    about = "Derive reading-tracker view models from a book table",
    long_about = "Load a book table (spreadsheet, CSV, TSV, or JSON) once and print the status breakdown, reading timeline, and composition trees as JSON.",
    after_help = "Set RUST_LOG=debug to see per-stage summaries and data-quality warnings on stderr."
)]
/// CLI for `shelfview`.
///
/// Common usage:
/// - Everything as JSON: `shelfview --input data/Books.xlsx`
/// - Another worksheet: `shelfview --input data/Books.xlsx --sheet Archive`
/// - One view, readable: `shelfview --input books.json --view timeline --pretty`
/// - Reproducible timeline: `--as-of 2024-01-01`
struct ShelfviewCli {
    #[arg(long, value_name = "PATH", help = "Book table to load")]
    input: PathBuf,
    #[arg(
        long,
        value_enum,
        default_value = "auto",
        help = "Input encoding; auto picks by file extension"
    )]
    format: FormatArg,
    #[arg(
        long,
        value_name = "NAME",
        default_value = DEFAULT_SHEET,
        help = "Worksheet to read from spreadsheet workbooks"
    )]
    sheet: String,
    #[arg(
        long = "as-of",
        value_name = "YYYY-MM-DD",
        value_parser = parse_as_of,
        help = "End date for unfinished readings (defaults to today)"
    )]
    as_of: Option<NaiveDate>,
    #[arg(long, value_enum, default_value = "all", help = "View model to print")]
    view: ViewArg,
    #[arg(
        long = "interval-policy",
        value_enum,
        default_value = "skip",
        help = "Handling of reading intervals that end before they start"
    )]
    interval_policy: PolicyArg,
    #[arg(
        long = "ignore-column",
        value_name = "NAME",
        help = "Additional column to drop before processing, repeat as needed"
    )]
    ignore_columns: Vec<String>,
    #[arg(long, help = "Pretty-print the JSON output")]
    pretty: bool,
}

/// Run the `shelfview` command line against stdout.
pub fn run<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_writer(args_iter, &mut out)
}

/// Run the command line, writing JSON to `out`.
pub fn run_with_writer<I, W>(args_iter: I, out: &mut W) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
    W: Write,
{
    let Some(cli) =
        parse_cli::<ShelfviewCli, _>(std::iter::once(BIN_NAME.to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut columns = ColumnMapping::default();
    for column in cli.ignore_columns {
        columns = columns.with_ignored(column);
    }
    let config = TrackerConfig::default()
        .with_columns(columns)
        .with_sheet(cli.sheet)
        .with_interval_policy(cli.interval_policy.into());
    let as_of = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let views = Dashboard::open(&cli.input, cli.format.into(), as_of, &config)?;
    write_view(out, &views, cli.view, cli.pretty)?;
    Ok(())
}

fn write_view<W: Write>(
    out: &mut W,
    views: &DashboardViews,
    view: ViewArg,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    match view {
        ViewArg::All => write_json(out, views, pretty),
        ViewArg::Status => write_json(out, &views.status, pretty),
        ViewArg::Timeline => write_json(out, &views.timeline, pretty),
        ViewArg::Overview => write_json(out, &views.overview, pretty),
        ViewArg::Evaluations => write_json(out, &views.evaluations, pretty),
    }
}

fn write_json<W: Write, T: Serialize>(
    out: &mut W,
    value: &T,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn parse_as_of(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("could not parse --as-of value '{}' as YYYY-MM-DD", raw))
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
