//! Forecast aggregation into hourly and daily views.

use chrono::NaiveDate;

use crate::types::{ForecastPoint, ForecastSeries};

/// The first `n` hourly points, unmodified.
pub fn bucket_hours(series: &ForecastSeries, n: usize) -> Vec<ForecastPoint> {
    series.points().take(n).collect()
}

/// One point per calendar date for the first `n` dates of the series.
///
/// Dates are taken in order of first appearance and each date is represented
/// by its first sample. A series spanning fewer than `n` dates yields what it
/// has.
pub fn bucket_days(series: &ForecastSeries, n: usize) -> Vec<ForecastPoint> {
    first_index_per_day(series, n)
        .into_iter()
        .filter_map(|i| series.point(i))
        .collect()
}

/// Index of the first sample of each of the first `n` dates.
pub fn first_index_per_day(series: &ForecastSeries, n: usize) -> Vec<usize> {
    let mut seen: Vec<NaiveDate> = Vec::new();
    let mut indices = Vec::new();

    for (i, time) in series.times().iter().enumerate() {
        if indices.len() == n {
            break;
        }
        let day = time.date();
        if !seen.contains(&day) {
            seen.push(day);
            indices.push(i);
        }
    }

    indices
}
