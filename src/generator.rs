//! Deterministic synthetic records for filling a table.

use chrono::{Days, NaiveDate};

use crate::record::Record;

/// First partition key handed out; each following record is one day later.
const BASE_DATE: (i32, u32, u32) = (2025, 11, 10);

const FACTORIES: [&str; 3] = ["Factory_1", "Factory_2", "Factory_3"];

fn base_date() -> NaiveDate {
    let (year, month, day) = BASE_DATE;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Builds `n` records. The same `n` always yields the same records.
///
/// For the 0-based index `i`: `date` is the base date plus `i` days, `id` is
/// `i + 1`, the factory cycles with period 3 and `value` is `i * 10`.
pub fn generate(n: usize) -> Vec<Record> {
    let base = base_date();
    (0..n)
        .map(|i| Record {
            date: (base + Days::new(i as u64)).format("%Y-%m-%d").to_string(),
            id: (i + 1).to_string(),
            factory_label: FACTORIES[i % FACTORIES.len()].to_string(),
            metric_label: format!("Metric_{}", i + 1),
            value: i as i64 * 10,
        })
        .collect()
}
