//! One-shot SQL execution over the Parquet globs.
//!
//! Each call spins up an ephemeral DataFusion `SessionContext`, registers the
//! descriptor's glob as a table, runs exactly one statement, and drops the
//! context — the store is read-only so there is nothing to pool and no
//! transaction semantics. Predicate values are bound through `$n`
//! placeholders via `with_param_values`, never formatted into the statement.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDateTime};
use datafusion::arrow::array::{Array, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::{DataType, TimeUnit};
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::prelude::{ParquetReadOptions, SessionConfig, SessionContext};
use datafusion::scalar::ScalarValue;
use serde::Serialize;

use super::select::QueryDescriptor;

const TABLE: &str = "bars";

/// One minute bar as returned by the row-fetch query.
#[derive(Debug, Clone, Serialize)]
pub struct BarRow {
    pub date: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Aggregates over one symbol/date-range selection.
#[derive(Debug, Clone)]
pub struct StatsSummary {
    pub min_date: NaiveDateTime,
    pub max_date: NaiveDateTime,
    pub row_count: i64,
    pub min_low: f64,
    pub max_high: f64,
}

/// Register `glob`, run one statement with the given positional parameters,
/// and collect the result.
async fn run(glob: &str, sql: &str, params: &[String]) -> Result<Vec<RecordBatch>> {
    // The full-scan glob must see every file under the root, not only
    // hive-style `symbol=` directories; the availability guard counts them
    // all, so the listing has to as well.
    let config = SessionConfig::new().set_bool(
        "datafusion.execution.listing_table_ignore_subdirectory",
        false,
    );
    let ctx = SessionContext::new_with_config(config);
    ctx.register_parquet(TABLE, glob, ParquetReadOptions::default())
        .await
        .with_context(|| format!("failed to open parquet target {glob}"))?;

    let mut df = ctx
        .sql(sql)
        .await
        .with_context(|| format!("query planning failed: {sql}"))?;
    if !params.is_empty() {
        let values: Vec<ScalarValue> = params
            .iter()
            .map(|p| ScalarValue::Utf8(Some(p.clone())))
            .collect();
        df = df
            .with_param_values(values)
            .context("parameter binding failed")?;
    }
    df.collect().await.context("query execution failed")
}

/// `SELECT date, open, high, low, close, volume … ORDER BY date` with
/// pagination. `limit` and `offset` are validated integers and the only
/// values formatted into the statement.
pub async fn fetch_rows(desc: &QueryDescriptor, limit: u32, offset: u64) -> Result<Vec<BarRow>> {
    let sql = format!(
        "SELECT date, open, high, low, close, volume FROM {TABLE} \
         WHERE {} ORDER BY date LIMIT {limit} OFFSET {offset}",
        desc.predicate
    );
    let batches = run(&desc.glob, &sql, &desc.params).await?;

    let mut rows = Vec::new();
    for batch in &batches {
        let dates = timestamp_col(batch, 0)?;
        let open = f64_col(batch, 1)?;
        let high = f64_col(batch, 2)?;
        let low = f64_col(batch, 3)?;
        let close = f64_col(batch, 4)?;
        let volume = i64_col(batch, 5)?;
        for i in 0..batch.num_rows() {
            rows.push(BarRow {
                date: micros_to_datetime(dates.value(i))?,
                open: open.value(i),
                high: high.value(i),
                low: low.value(i),
                close: close.value(i),
                volume: volume.value(i),
            });
        }
    }
    Ok(rows)
}

/// Min/max date, row count and price extremes for one selection. Returns
/// `None` when the selection matched zero rows — the caller surfaces that as
/// not-found, never as an empty success.
pub async fn fetch_stats(desc: &QueryDescriptor) -> Result<Option<StatsSummary>> {
    let sql = format!(
        "SELECT MIN(date), MAX(date), COUNT(*), MIN(low), MAX(high) FROM {TABLE} WHERE {}",
        desc.predicate
    );
    let batches = run(&desc.glob, &sql, &desc.params).await?;

    let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
        return Ok(None);
    };
    let row_count = i64_col(batch, 2)?.value(0);
    if row_count == 0 {
        return Ok(None);
    }

    let dates_min = timestamp_col(batch, 0)?;
    let dates_max = timestamp_col(batch, 1)?;
    Ok(Some(StatsSummary {
        min_date: micros_to_datetime(dates_min.value(0))?,
        max_date: micros_to_datetime(dates_max.value(0))?,
        row_count,
        min_low: f64_col(batch, 3)?.value(0),
        max_high: f64_col(batch, 4)?.value(0),
    }))
}

/// All distinct symbols in the store, ascending.
pub async fn list_symbols(glob: &str) -> Result<Vec<String>> {
    let sql = format!("SELECT DISTINCT symbol FROM {TABLE} ORDER BY symbol");
    let batches = run(glob, &sql, &[]).await?;

    let mut symbols = Vec::new();
    for batch in &batches {
        let col = string_col(batch, 0)?;
        for i in 0..batch.num_rows() {
            symbols.push(col.value(i).to_string());
        }
    }
    Ok(symbols)
}

/// Earliest and latest date across the whole store.
pub async fn global_date_range(glob: &str) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let sql = format!("SELECT MIN(date), MAX(date) FROM {TABLE}");
    let batches = run(glob, &sql, &[]).await?;

    let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
        bail!("date-range query returned no rows");
    };
    let min = timestamp_col(batch, 0)?;
    let max = timestamp_col(batch, 1)?;
    if min.is_null(0) || max.is_null(0) {
        bail!("store contains no rows");
    }
    Ok((micros_to_datetime(min.value(0))?, micros_to_datetime(max.value(0))?))
}

// ---------------------------------------------------------------------------
// Arrow column extraction
//
// Physical types vary with the reader configuration (Utf8View vs Utf8,
// timestamp units), so every accessor casts to one canonical type first.
// ---------------------------------------------------------------------------

fn timestamp_col(batch: &RecordBatch, idx: usize) -> Result<TimestampMicrosecondArray> {
    let arr = cast(
        batch.column(idx),
        &DataType::Timestamp(TimeUnit::Microsecond, None),
    )
    .context("cast to timestamp failed")?;
    arr.as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .cloned()
        .ok_or_else(|| anyhow!("column {idx} is not a timestamp"))
}

fn f64_col(batch: &RecordBatch, idx: usize) -> Result<Float64Array> {
    let arr = cast(batch.column(idx), &DataType::Float64).context("cast to f64 failed")?;
    arr.as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| anyhow!("column {idx} is not a float"))
}

fn i64_col(batch: &RecordBatch, idx: usize) -> Result<Int64Array> {
    let arr = cast(batch.column(idx), &DataType::Int64).context("cast to i64 failed")?;
    arr.as_any()
        .downcast_ref::<Int64Array>()
        .cloned()
        .ok_or_else(|| anyhow!("column {idx} is not an integer"))
}

fn string_col(batch: &RecordBatch, idx: usize) -> Result<StringArray> {
    let arr = cast(batch.column(idx), &DataType::Utf8).context("cast to utf8 failed")?;
    arr.as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| anyhow!("column {idx} is not a string"))
}

fn micros_to_datetime(micros: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| anyhow!("timestamp out of range: {micros}"))
}
