/// Number of series terms (after the constant 1) used by the activation
/// approximations. Changing it shifts results from the 6th decimal onward.
pub const TAYLOR_TERMS: u32 = 10;

/// `e^x` truncated to `1 + Σ_{i=1..=TAYLOR_TERMS} x^i / i!`.
///
/// Accurate near zero; callers saturate large `|x|` before calling.
pub fn exp_taylor(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    for i in 1..=TAYLOR_TERMS {
        term = term * x / f64::from(i);
        sum += term;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_at_zero() {
        assert_eq!(exp_taylor(0.0), 1.0);
    }

    #[test]
    fn close_to_exp_near_origin() {
        for &x in &[-1.0, -0.5, 0.25, 1.0] {
            assert!((exp_taylor(x) - f64::exp(x)).abs() < 1e-7, "x = {x}");
        }
    }

    #[test]
    fn truncation_is_visible_far_from_origin() {
        // Eleven-term series underestimates e^5 noticeably.
        assert!(f64::exp(5.0) - exp_taylor(5.0) > 1.0);
    }
}
