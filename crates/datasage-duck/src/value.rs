//! DuckDB cell to JSON conversion

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use duckdb::types::{TimeUnit, ValueRef};
use serde_json::{json, Value};

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Convert a single DuckDB cell to JSON
pub fn value_ref_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => json!(i),
        ValueRef::SmallInt(i) => json!(i),
        ValueRef::Int(i) => json!(i),
        ValueRef::BigInt(i) => json!(i),
        ValueRef::HugeInt(i) => hugeint_to_json(i),
        ValueRef::UTinyInt(i) => json!(i),
        ValueRef::USmallInt(i) => json!(i),
        ValueRef::UInt(i) => json!(i),
        ValueRef::UBigInt(i) => json!(i),
        ValueRef::Float(f) => json!(f),
        ValueRef::Double(f) => json!(f),
        ValueRef::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map(|f| json!(f)).unwrap_or(Value::String(text))
        }
        ValueRef::Text(s) => Value::String(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
        ValueRef::Date32(days) => date_to_json(days),
        ValueRef::Timestamp(unit, raw) => timestamp_to_json(unit, raw),
        ValueRef::Time64(unit, raw) => time_to_json(unit, raw),
        ValueRef::Interval {
            months,
            days,
            nanos,
        } => interval_to_json(months, days, nanos),
        _ => Value::String("<unsupported>".to_string()),
    }
}

/// HUGEINT values outside the 64-bit range become strings
fn hugeint_to_json(value: i128) -> Value {
    if let Ok(i) = i64::try_from(value) {
        json!(i)
    } else if let Ok(u) = u64::try_from(value) {
        json!(u)
    } else {
        Value::String(value.to_string())
    }
}

fn date_to_json(days_since_epoch: i32) -> Value {
    days_since_epoch
        .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
        .unwrap_or_else(|| json!(days_since_epoch))
}

fn to_micros(unit: TimeUnit, raw: i64) -> Option<i64> {
    match unit {
        TimeUnit::Second => raw.checked_mul(1_000_000),
        TimeUnit::Millisecond => raw.checked_mul(1_000),
        TimeUnit::Microsecond => Some(raw),
        TimeUnit::Nanosecond => Some(raw / 1_000),
    }
}

fn timestamp_to_json(unit: TimeUnit, raw: i64) -> Value {
    to_micros(unit, raw)
        .and_then(DateTime::<Utc>::from_timestamp_micros)
        .map(|ts| Value::String(ts.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        .unwrap_or_else(|| json!(raw))
}

/// TIME as `HH:MM:SS[.ffffff]`
fn time_to_json(unit: TimeUnit, raw: i64) -> Value {
    to_micros(unit, raw)
        .filter(|micros| *micros >= 0)
        .and_then(|micros| {
            let secs = u32::try_from(micros / 1_000_000).ok()?;
            let nanos = u32::try_from(micros % 1_000_000).ok()? * 1_000;
            NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
        })
        .map(|time| Value::String(time.format("%H:%M:%S%.f").to_string()))
        .unwrap_or_else(|| json!(raw))
}

/// INTERVAL in DuckDB's own text form, e.g. `1 year 2 months 3 days 04:05:06`
fn interval_to_json(months: i32, days: i32, nanos: i64) -> Value {
    let mut parts = Vec::new();
    for (amount, unit) in [(months / 12, "year"), (months % 12, "month"), (days, "day")] {
        match amount {
            0 => {}
            1 | -1 => parts.push(format!("{} {}", amount, unit)),
            _ => parts.push(format!("{} {}s", amount, unit)),
        }
    }
    if nanos != 0 || parts.is_empty() {
        parts.push(clock(nanos));
    }
    Value::String(parts.join(" "))
}

fn clock(nanos: i64) -> String {
    let sign = if nanos < 0 { "-" } else { "" };
    let delta = Duration::nanoseconds(nanos.saturating_abs());
    let secs = delta.num_seconds();
    let micros = delta.num_microseconds().map(|m| m % 1_000_000).unwrap_or(0);

    let mut text = format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    );
    if micros != 0 {
        text.push_str(&format!(".{:06}", micros));
    }
    text
}
