//! Convert per-symbol minute CSV files into one Parquet partition per symbol.
//!
//! Reads every `*_minute.csv` under `SOURCE_DIR`, tags the rows with the
//! uppercase symbol taken from the filename, and writes
//! `<DATA_ROOT>/symbol=<SYMBOL>/data.parquet`. Runs standalone, out of the
//! request path; the query service picks the partitions up on its next
//! availability probe.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use tracing_subscriber::EnvFilter;

use nifty_ohlcv::config::ConverterConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ConverterConfig::from_env()?;
    let csv_files = find_minute_csvs(&config.source_dir)?;
    if csv_files.is_empty() {
        bail!(
            "no *_minute.csv files found in {}",
            config.source_dir.display()
        );
    }

    std::fs::create_dir_all(&config.data_root)
        .with_context(|| format!("failed to create {}", config.data_root.display()))?;

    let progress = ProgressBar::new(csv_files.len() as u64).with_style(
        ProgressStyle::with_template("[{pos}/{len}] {msg} {wide_bar}")?,
    );
    for csv in &csv_files {
        let symbol = symbol_from_filename(csv)?;
        progress.set_message(symbol.clone());
        convert_one(csv, &config.data_root, &symbol)
            .with_context(|| format!("conversion failed for {}", csv.display()))?;
        progress.inc(1);
    }
    progress.finish_with_message("done");

    tracing::info!(
        files = csv_files.len(),
        root = %config.data_root.display(),
        "parquet export complete"
    );
    Ok(())
}

fn find_minute_csvs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("cannot read source directory {}", dir.display()))?;
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with("_minute.csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// `RELIANCE_minute.csv` → `RELIANCE`.
fn symbol_from_filename(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("unreadable filename: {}", path.display()))?;
    let symbol = stem
        .strip_suffix("_minute")
        .with_context(|| format!("filename does not end in _minute: {}", path.display()))?;
    Ok(symbol.trim().to_uppercase())
}

fn convert_one(csv: &Path, root: &Path, symbol: &str) -> Result<()> {
    let mut df = CsvReadOptions::default()
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(csv.to_path_buf()))
        .context("failed to open CSV")?
        .finish()
        .context("failed to parse CSV")?;

    let symbols = Series::new("symbol".into(), vec![symbol; df.height()]);
    df.with_column(symbols.into_column())?;

    let out_dir = root.join(format!("symbol={symbol}"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let out_path = out_dir.join("data.parquet");
    let file = std::fs::File::create(&out_path)
        .with_context(|| format!("failed to create {}", out_path.display()))?;
    ParquetWriter::new(file)
        .finish(&mut df)
        .context("failed to write parquet")?;

    tracing::debug!(%symbol, rows = df.height(), "partition written");
    Ok(())
}
