//! Numeric helpers shared by gestures and view facets.

/// Clamp `value` into `[min, max]`.
///
/// Unlike `f64::clamp` this never panics; with `min > max` the result is `max`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Truncate to `precision` decimal places.
pub fn to_precision(value: f64, precision: i32) -> f64 {
    let pow = 10f64.powi(precision);
    (value * pow).floor() / pow
}

/// Move from `old` towards `new` by a whole number of `step`s.
///
/// The delta is rounded to the nearest step multiple, so slider values stay on
/// the `old + k * step` lattice and small pointer jitter does not leak through.
pub fn change_with_step(old: f64, new: f64, step: f64) -> f64 {
    let steps = ((new - old) / step).round();
    old + steps * step
}

/// `mm:ss`, or `hh:mm:ss` once past an hour.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_sweep() {
        let bounds = [(-1.0, 1.0), (0.0, 0.0), (0.0, 100.0), (-50.5, -10.25)];
        for (min, max) in bounds {
            for i in -300..=300 {
                let x = f64::from(i) * 0.5;
                let got = clamp(x, min, max);
                if x < min {
                    assert_eq!(got, min);
                } else if x > max {
                    assert_eq!(got, max);
                } else {
                    assert_eq!(got, x);
                }
            }
        }
    }

    #[test]
    fn test_change_with_step_is_idempotent() {
        for i in 0..=100 {
            let v = f64::from(i) / 100.0;
            assert_eq!(change_with_step(v, v, 0.01), v);
        }
    }

    #[test]
    fn test_change_with_step_rounds_delta() {
        let got = change_with_step(0.2, 0.234, 0.01);
        assert!((got - 0.23).abs() < 1e-9);

        let back = change_with_step(0.5, 0.444, 0.01);
        assert!((back - 0.44).abs() < 1e-9);
    }

    #[test]
    fn test_to_precision_truncates() {
        assert_eq!(to_precision(0.1234567, 6), 0.123456);
        assert_eq!(to_precision(1.0, 6), 1.0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(65.9), "01:05");
        assert_eq!(format_time(3725.0), "01:02:05");
        assert_eq!(format_time(f64::NAN), "00:00");
    }
}
