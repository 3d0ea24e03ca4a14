//! Typed query/write helpers over the grove store.
//!
//! All functions take an explicit `&Connection` (or `&mut Connection` when
//! they need a transaction) and return `anyhow::Result<T>` with typed model
//! structs, never raw rows. Point balances are only ever mutated with
//! atomic `SET x = x + ?` increments.

pub mod completions;
pub mod groups;
pub mod tasks;
pub mod users;

use chrono::Utc;
use rusqlite::types::Type;
use std::str::FromStr;

/// Current wall-clock time as microseconds since the Unix epoch.
#[must_use]
pub fn now_us() -> i64 {
    Utc::now().timestamp_micros()
}

/// Parse a TEXT column into a typed enum, mapping failures onto the rusqlite
/// error channel so row closures stay composable.
pub(crate) fn parse_text_col<T>(index: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}
