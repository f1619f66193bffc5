//! One-step trajectory extrapolation.
//!
//! The forecast is labelled "RK4": a classical fourth-order Runge-Kutta step
//! applied to `dy/dt = m`, where `m` is the slope between the last two valid
//! observations. Because the slope function is constant every stage collapses
//! to `m`:
//!
//! ```text
//! k1 = k2 = k3 = k4 = m
//! next = last + (h / 6) * (k1 + 2*k2 + 2*k3 + k4) = last + h * m
//! ```
//!
//! The closed form is what gets computed, so the result is exactly
//! `last + h * (last - prev)` under IEEE arithmetic.

/// Step size: one time unit forward
pub const DEFAULT_STEP: f64 = 1.0;

/// Collapsed RK4 step from `prev` to `last`, advanced by `step`
pub fn rk4_next_value(prev: f64, last: f64, step: f64) -> f64 {
    let slope = last - prev;
    last + step * slope
}

/// Forecast the next value of `series` one step ahead.
///
/// Non-finite values are skipped before the last two are taken. Returns
/// `None` when fewer than two valid values remain.
///
/// For finite inputs the result is `last + step * (last - prev)` exactly,
/// with one exception: when that sum overflows to an infinity the result is
/// `None` instead. A forecast outside `f64` range is never reported.
pub fn extrapolate(series: &[f64]) -> Option<f64> {
    extrapolate_with_step(series, DEFAULT_STEP)
}

/// Same as [`extrapolate`] with an explicit step size
pub fn extrapolate_with_step(series: &[f64], step: f64) -> Option<f64> {
    forecast(series.iter().copied(), step)
}

/// Forecast over cells that may be missing. Missing cells are skipped.
pub fn extrapolate_cells(series: &[Option<f64>]) -> Option<f64> {
    forecast(series.iter().flatten().copied(), DEFAULT_STEP)
}

fn forecast<I>(values: I, step: f64) -> Option<f64>
where
    I: DoubleEndedIterator<Item = f64>,
{
    let mut tail = values.rev().filter(|v| v.is_finite());
    let last = tail.next()?;
    let prev = tail.next()?;

    // An overflowing forecast is no forecast at all.
    Some(rk4_next_value(prev, last, step)).filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        assert_eq!(extrapolate(&[10.0, 20.0]), Some(30.0));
        assert_eq!(extrapolate(&[120.0, 145.0]), Some(170.0));
        assert_eq!(extrapolate(&[80.0, 80.0]), Some(80.0));
    }

    #[test]
    fn test_only_last_two_values_matter() {
        assert_eq!(extrapolate(&[500.0, -3.0, 130.0, 170.0]), Some(210.0));
        assert_eq!(extrapolate(&[150.0, 140.0]), Some(130.0));
    }

    #[test]
    fn test_matches_closed_form_exactly() {
        let series = [
            (118.3, 121.7),
            (0.1, 0.2),
            (-45.5, 1e6),
            (99.999, 100.001),
            (1.0 / 3.0, 2.0 / 3.0),
        ];
        for (prev, last) in series {
            let expected = last + (last - prev);
            let got = extrapolate(&[prev, last]).unwrap();
            assert_eq!(got.to_bits(), expected.to_bits(), "prev={} last={}", prev, last);
        }
    }

    #[test]
    fn test_too_short_series_has_no_forecast() {
        assert_eq!(extrapolate(&[]), None);
        assert_eq!(extrapolate(&[120.0]), None);
    }

    #[test]
    fn test_non_finite_values_are_skipped() {
        assert_eq!(extrapolate(&[120.0, 145.0, f64::NAN]), Some(170.0));
        assert_eq!(extrapolate(&[120.0, f64::INFINITY, 145.0]), Some(170.0));
        assert_eq!(extrapolate(&[f64::NAN, 145.0]), None);
        assert_eq!(extrapolate(&[f64::NAN, f64::NEG_INFINITY]), None);
    }

    #[test]
    fn test_missing_cells_are_skipped() {
        assert_eq!(extrapolate_cells(&[Some(120.0), None, Some(145.0)]), Some(170.0));
        assert_eq!(extrapolate_cells(&[None, Some(145.0), None]), None);
        assert_eq!(extrapolate_cells(&[]), None);
    }

    #[test]
    fn test_explicit_step() {
        assert_eq!(extrapolate_with_step(&[10.0, 20.0], 2.0), Some(40.0));
        assert_eq!(extrapolate_with_step(&[10.0, 20.0], 0.5), Some(25.0));
    }

    #[test]
    fn test_overflowing_forecast_is_dropped() {
        assert_eq!(extrapolate(&[-f64::MAX, f64::MAX]), None);
    }
}
