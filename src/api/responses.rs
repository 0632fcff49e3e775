//! Response bodies for the Query Service endpoints.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::store::engine::{BarRow, StatsSummary};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub parquet_available: bool,
}

#[derive(Debug, Serialize)]
pub struct DateRangeResponse {
    pub min_date: String,
    pub max_date: String,
}

#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub symbol: String,
    pub data: Vec<BarRow>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DateBounds {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Serialize)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub symbol: String,
    pub date_range: DateBounds,
    pub row_count: i64,
    pub price_range: PriceBounds,
}

impl StatsResponse {
    pub fn from_summary(symbol: String, stats: &StatsSummary) -> Self {
        Self {
            symbol,
            date_range: DateBounds {
                min: format_datetime(stats.min_date),
                max: format_datetime(stats.max_date),
            },
            row_count: stats.row_count,
            price_range: PriceBounds {
                min: stats.min_low,
                max: stats.max_high,
            },
        }
    }
}

/// `2020-01-01 09:15:00` — the human-facing form used by the range fields.
pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}
