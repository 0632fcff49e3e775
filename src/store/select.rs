//! Query-path selection: partition pruning and predicate construction.
//!
//! Given a symbol and optional date bounds this decides whether the query
//! runs against one partition or the whole tree, and builds the matching
//! parameter-bound predicate. Values are never interpolated into the SQL
//! text; the predicate carries `$n` placeholders and the descriptor carries
//! the positional parameter list.

use chrono::NaiveDate;

use super::Store;

/// Everything the engine needs to run one query: where to read, what to
/// filter on, and the values to bind. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub glob: String,
    pub predicate: String,
    pub params: Vec<String>,
}

pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Date-bound conjunction with placeholders numbered from `first`.
/// Degenerates to `1=1` when no bounds are given so the caller can combine
/// clauses uniformly.
fn date_clause(start: Option<NaiveDate>, end: Option<NaiveDate>, first: usize) -> (String, Vec<String>) {
    let mut parts = Vec::new();
    let mut params = Vec::new();
    if let Some(start) = start {
        parts.push(format!("date >= ${}", first + params.len()));
        params.push(start.to_string());
    }
    if let Some(end) = end {
        parts.push(format!("date <= ${}", first + params.len()));
        params.push(end.to_string());
    }
    if parts.is_empty() {
        ("1=1".to_string(), params)
    } else {
        (parts.join(" AND "), params)
    }
}

/// Pick the file target and predicate for `symbol` within the date bounds.
///
/// With a partition the symbol clause is omitted entirely: the partition
/// directory already guarantees it. Without one the query falls back to a
/// full scan and the symbol equality is bound as `$1`, with the date clause
/// parenthesized to keep operator precedence intact.
pub fn select_target(
    store: &Store,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> QueryDescriptor {
    let symbol = normalize_symbol(symbol);
    if let Some(glob) = store.partition_glob(&symbol) {
        let (predicate, params) = date_clause(start, end, 1);
        return QueryDescriptor { glob, predicate, params };
    }

    let (dates, mut date_params) = date_clause(start, end, 2);
    let mut params = Vec::with_capacity(1 + date_params.len());
    params.push(symbol);
    params.append(&mut date_params);
    QueryDescriptor {
        glob: store.full_scan_glob(),
        predicate: format!("symbol = $1 AND ({dates})"),
        params,
    }
}
