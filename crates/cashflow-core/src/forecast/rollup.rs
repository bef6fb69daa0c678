use chrono::Datelike;
use rust_decimal::Decimal;

use super::engine::ForecastPoint;

/// Consecutive 7-day windows starting at the first daily point. The last
/// window is shorter when the horizon is not a multiple of seven days.
pub fn weekly(daily: &[ForecastPoint]) -> Vec<ForecastPoint> {
    daily.chunks(7).filter_map(roll_window).collect()
}

/// Calendar-month windows. The first and last months are usually partial.
pub fn monthly(daily: &[ForecastPoint]) -> Vec<ForecastPoint> {
    let mut out = Vec::new();
    let mut start = 0;

    for i in 1..=daily.len() {
        let boundary = i == daily.len() || !same_month(&daily[i - 1], &daily[i]);
        if boundary {
            if let Some(point) = roll_window(&daily[start..i]) {
                out.push(point);
            }
            start = i;
        }
    }

    out
}

fn same_month(a: &ForecastPoint, b: &ForecastPoint) -> bool {
    a.date.year() == b.date.year() && a.date.month() == b.date.month()
}

/// Sum the per-day values of a window and carry the cumulative values of
/// its last day.
fn roll_window(window: &[ForecastPoint]) -> Option<ForecastPoint> {
    let first = window.first()?;
    let last = window.last()?;

    let (expected, optimistic, pessimistic) = window.iter().fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(e, o, p), point| (e + point.expected, o + point.optimistic, p + point.pessimistic),
    );

    Some(ForecastPoint {
        date: first.date,
        expected,
        optimistic,
        pessimistic,
        cumulative: last.cumulative,
        cumulative_optimistic: last.cumulative_optimistic,
        cumulative_pessimistic: last.cumulative_pessimistic,
    })
}
