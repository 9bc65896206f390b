//! Present-value primitives for time-windowed benefit streams.
//!
//! Everything an effect earns is integrated against these closed forms; no
//! numeric quadrature anywhere. Rates within [`RATE_EPSILON`] of zero use
//! the exact zero-rate branch so results stay continuous as a rate crosses
//! zero from either side.

use crate::types::GlobalParameters;

/// Below this magnitude an annual rate is treated as exactly zero.
pub const RATE_EPSILON: f64 = 1e-9;

/// Present value, discounted at `annual_rate`, of a constant unit flow
/// active over `[start, end)` years from now.
///
/// With `d = 1/(1+r)` this is the continuous generalization of the
/// geometric sum `Σ d^t` over the window:
/// `d^start * (1 - d^(end-start)) / (r/(1+r))`.
///
/// An empty or inverted window is worth 0; a zero rate degenerates to plain
/// elapsed time `end - start`.
pub fn discounted_window_value(annual_rate: f64, start: f64, end: f64) -> f64 {
    if start >= end {
        return 0.0;
    }
    if annual_rate.abs() < RATE_EPSILON {
        return end - start;
    }
    let d = 1.0 / (1.0 + annual_rate);
    d.powf(start) * (1.0 - d.powf(end - start)) / (annual_rate / (1.0 + annual_rate))
}

/// Present value over `[start, end)` of the population factor
/// `min((1+g)^t, limit)` discounted at the global rate.
///
/// The factor is the population at time `t` as a multiple of the current
/// population; callers multiply by `current_population` for person-years.
///
/// The growing branch folds growth into an effective rate
/// `(r - g)/(1 + g)`, since `(1+g)^t / (1+r)^t = (1 + r_eff)^(-t)`. When a
/// cap is configured the window splits at the crossing time
/// `t* = ln(limit)/ln(1+g)`: growth is capped after it, decline is capped
/// before it.
pub(crate) fn capped_growth_integral(params: &GlobalParameters, start: f64, end: f64) -> f64 {
    if start >= end {
        return 0.0;
    }
    let rate = params.discount_rate;
    let growth = params.population_growth_rate;
    let effective_rate = (rate - growth) / (1.0 + growth);

    let Some(limit) = params.population_limit else {
        return discounted_window_value(effective_rate, start, end);
    };

    if growth.abs() < RATE_EPSILON {
        // flat population: the cap either always binds or never does
        return limit.min(1.0) * discounted_window_value(rate, start, end);
    }

    let crossing = limit.ln() / (1.0 + growth).ln();
    let cut = crossing.clamp(start, end);
    if growth > 0.0 {
        discounted_window_value(effective_rate, start, cut)
            + limit * discounted_window_value(rate, cut, end)
    } else {
        limit * discounted_window_value(rate, start, cut)
            + discounted_window_value(effective_rate, cut, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_with(rate: f64, growth: f64, limit: Option<f64>) -> GlobalParameters {
        GlobalParameters {
            discount_rate: rate,
            population_growth_rate: growth,
            population_limit: limit,
            ..GlobalParameters::default()
        }
    }

    #[test]
    fn test_inverted_window_is_zero() {
        assert_eq!(discounted_window_value(0.05, 10.0, 10.0), 0.0);
        assert_eq!(discounted_window_value(0.05, 10.0, 3.0), 0.0);
        assert_eq!(discounted_window_value(-0.05, 4.0, 4.0), 0.0);
    }

    #[test]
    fn test_zero_rate_is_exact_elapsed_time() {
        assert_eq!(discounted_window_value(0.0, 0.0, 7.0), 7.0);
        assert_eq!(discounted_window_value(0.0, 3.0, 10.0), 7.0);
        assert_eq!(discounted_window_value(0.0, 0.0, 0.25), 0.25);
    }

    #[test]
    fn test_continuous_across_zero_rate() {
        let at_zero = discounted_window_value(0.0, 0.0, 10.0);
        let just_above = discounted_window_value(RATE_EPSILON * 1.01, 0.0, 10.0);
        let just_below = discounted_window_value(-RATE_EPSILON * 1.01, 0.0, 10.0);

        assert!(just_above.is_finite());
        assert!(just_below.is_finite());
        assert!((just_above - at_zero).abs() < 1e-6);
        assert!((just_below - at_zero).abs() < 1e-6);
    }

    #[test]
    fn test_positive_rate_discounts_below_elapsed_time() {
        let value = discounted_window_value(0.05, 0.0, 10.0);
        assert!(value > 0.0);
        assert!(value < 10.0);
    }

    #[test]
    fn test_later_windows_are_worth_less() {
        let near = discounted_window_value(0.05, 0.0, 5.0);
        let far = discounted_window_value(0.05, 20.0, 25.0);
        assert!(far < near);
    }

    #[test]
    fn test_windows_are_additive() {
        let whole = discounted_window_value(0.03, 0.0, 10.0);
        let parts =
            discounted_window_value(0.03, 0.0, 4.0) + discounted_window_value(0.03, 4.0, 10.0);
        assert!((whole - parts).abs() < 1e-10);
    }

    #[test]
    fn test_growth_integral_without_cap_or_rates() {
        let params = params_with(0.0, 0.0, None);
        assert!((capped_growth_integral(&params, 0.0, 10.0) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_growth_integral_cap_never_reached_within_window() {
        // 1% growth takes ~22 years to reach 1.25x; a 5-year window should
        // match the uncapped closed form exactly
        let capped = params_with(0.02, 0.01, Some(1.25));
        let uncapped = params_with(0.02, 0.01, None);
        let a = capped_growth_integral(&capped, 0.0, 5.0);
        let b = capped_growth_integral(&uncapped, 0.0, 5.0);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_growth_integral_fully_capped_window() {
        // far beyond the crossing time the factor is the flat limit
        let params = params_with(0.0, 0.05, Some(1.25));
        let crossing = 1.25f64.ln() / 1.05f64.ln();
        let value = capped_growth_integral(&params, crossing + 10.0, crossing + 20.0);
        assert!((value - 1.25 * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_growth_integral_splits_at_crossing() {
        let params = params_with(0.03, 0.02, Some(1.1));
        let crossing = 1.1f64.ln() / 1.02f64.ln();
        let whole = capped_growth_integral(&params, 0.0, crossing + 10.0);
        let parts = capped_growth_integral(&params, 0.0, crossing)
            + capped_growth_integral(&params, crossing, crossing + 10.0);
        assert!((whole - parts).abs() < 1e-9);
    }

    #[test]
    fn test_growth_integral_limit_below_one_caps_immediately() {
        // a limit under 1x with growth means the cap binds from t = 0
        let params = params_with(0.0, 0.04, Some(0.5));
        let value = capped_growth_integral(&params, 0.0, 10.0);
        assert!((value - 0.5 * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_growth_integral_decline_ignores_high_cap() {
        let capped = params_with(0.01, -0.02, Some(1.25));
        let uncapped = params_with(0.01, -0.02, None);
        let a = capped_growth_integral(&capped, 0.0, 30.0);
        let b = capped_growth_integral(&uncapped, 0.0, 30.0);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_growth_integral_zero_limit_is_zero() {
        let params = params_with(0.02, 0.01, Some(0.0));
        assert_eq!(capped_growth_integral(&params, 0.0, 50.0), 0.0);
    }
}
