// stats.rs - Chi-square distribution numerics for the HWE tests

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

const MAX_ITERATIONS: usize = 500;
const EPSILON: f64 = 1e-14;
const TINY: f64 = 1e-300;

/// Natural log of the gamma function (Lanczos approximation), `x > 0`
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let mut sum = LANCZOS_COEFFICIENTS[0];
    for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Lower regularized gamma by series expansion (good for `x < a + 1`)
fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut term = 1.0 / a;
    let mut sum = term;
    for _ in 0..MAX_ITERATIONS {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * EPSILON {
            break;
        }
    }
    sum * (-x + a * x.ln() - ln_gamma(a)).exp()
}

/// Upper regularized gamma by continued fraction (good for `x >= a + 1`)
fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITERATIONS {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}

/// Upper regularized incomplete gamma `Q(a, x) = 1 - P(a, x)`
pub fn regularized_gamma_q(a: f64, x: f64) -> f64 {
    if a <= 0.0 || x.is_nan() || x < 0.0 {
        return f64::NAN;
    }
    if x == 0.0 {
        return 1.0;
    }
    if x < a + 1.0 {
        1.0 - gamma_p_series(a, x)
    } else {
        gamma_q_continued_fraction(a, x)
    }
}

/// Chi-square survival function `1 - CDF(x; df)`, clipped to `[0, 1]`
pub fn chi_square_sf(x: f64, df: f64) -> f64 {
    let p = regularized_gamma_q(df / 2.0, x / 2.0);
    p.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_gamma_known_values() {
        assert!((ln_gamma(1.0)).abs() < 1e-12);
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-10);
    }

    #[test]
    fn test_chi_square_df2_is_exponential() {
        for x in [0.1, 1.0, 2.0, 7.5, 30.0] {
            let expected = (-x / 2.0f64).exp();
            assert!((chi_square_sf(x, 2.0) - expected).abs() < 1e-10, "x = {}", x);
        }
    }

    #[test]
    fn test_chi_square_critical_values() {
        assert!((chi_square_sf(3.841_458_820_694_124, 1.0) - 0.05).abs() < 1e-8);
        assert!((chi_square_sf(11.070_497_693_516_35, 5.0) - 0.05).abs() < 1e-8);
        assert!((chi_square_sf(6.634_896_601_021_214, 1.0) - 0.01).abs() < 1e-8);
    }

    #[test]
    fn test_chi_square_edges() {
        assert_eq!(chi_square_sf(0.0, 3.0), 1.0);
        assert!(chi_square_sf(1e6, 3.0) < 1e-12);
        assert!(chi_square_sf(-1.0, 3.0).is_nan());
    }
}
