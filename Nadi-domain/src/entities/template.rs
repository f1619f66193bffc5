use chrono::{Duration, NaiveDate};

use super::reading::ReadingRow;

/// Example upload table shown to users before they prepare their own data.
///
/// Two subjects, two readings each, dated relative to `today` with the
/// most recent reading landing on `today` itself.
pub fn sample_rows(today: NaiveDate) -> Vec<ReadingRow> {
    let day = |offset: i64| (today - Duration::days(offset)).format("%Y-%m-%d").to_string();

    vec![
        ReadingRow::new("Budi", 120.0, 80.0).with_timestamp(day(3)),
        ReadingRow::new("Budi", 145.0, 95.0).with_timestamp(day(1)),
        ReadingRow::new("Siti", 130.0, 85.0).with_timestamp(day(2)),
        ReadingRow::new("Siti", 170.0, 105.0).with_timestamp(day(0)),
    ]
}
