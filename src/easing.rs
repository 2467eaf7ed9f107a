/// Quadratic ease-in-out.
///
/// `t` is elapsed time, `b` the start value, `c` the total change and `d` the
/// duration, all in the same units as the caller's clock. `t` is clamped to
/// `[0, d]`; a zero duration jumps straight to the end value.
pub fn ease_in_out_quad(t: f64, b: f64, c: f64, d: f64) -> f64 {
    if d <= 0.0 {
        return b + c;
    }
    let t = (t.clamp(0.0, d) / d) * 2.0;
    if t < 1.0 {
        c / 2.0 * t * t + b
    } else {
        let t = t - 1.0;
        -c / 2.0 * (t * (t - 2.0) - 1.0) + b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_midpoint() {
        assert_eq!(ease_in_out_quad(0.0, 100.0, 400.0, 800.0), 100.0);
        assert_eq!(ease_in_out_quad(400.0, 100.0, 400.0, 800.0), 300.0);
        assert_eq!(ease_in_out_quad(800.0, 100.0, 400.0, 800.0), 500.0);
    }

    #[test]
    fn is_monotonic_for_positive_change() {
        let mut prev = f64::MIN;
        for step in 0..=100 {
            let v = ease_in_out_quad(step as f64 * 8.0, 0.0, 1000.0, 800.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn out_of_range_time_is_clamped() {
        assert_eq!(ease_in_out_quad(-5.0, 10.0, 20.0, 100.0), 10.0);
        assert_eq!(ease_in_out_quad(500.0, 10.0, 20.0, 100.0), 30.0);
        assert_eq!(ease_in_out_quad(5.0, 10.0, 20.0, 0.0), 30.0);
    }
}
