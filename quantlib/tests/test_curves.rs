//! Curve construction, interpolation and root finding through the
//! `quantlib-api` entry points.

use approx::assert_abs_diff_eq;
use quantlib_api::pricingengines::{black_scholes_merton, bond_price, bond_price_from_yield};
use quantlib_api::termstructures::{
    DepositRateHelper, FuturesRateHelper, RateHelper, SwapRateHelper,
};
use quantlib_api::{
    build_curve, find_root, interpolate, Compounding, Curve, CurveBuildConfig, Date, DayCounter,
    Error, FixedRateBond, ForwardPriceCurve, Frequency, InterpolationMethod, OptionQuote,
    OptionType, Quote, Real, RootSearch, Solver1DConfig,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn today() -> Date {
    Date::from_ymd_opt(2025, 1, 2).unwrap()
}

const METHODS: [InterpolationMethod; 3] = [
    InterpolationMethod::Linear,
    InterpolationMethod::LogLinear,
    InterpolationMethod::CubicSpline,
];

/// Deposit, future and swap quotes consistent with a flat continuous rate.
fn flat_quotes(r: Real) -> Vec<Quote> {
    let flat = Curve::flat(today(), r, DayCounter::Actual365Fixed).unwrap();
    let dep = |t: Real| DepositRateHelper::new(0.0, t).implied_quote(&flat).unwrap();
    let fut = |t: Real| FuturesRateHelper::new(0.0, t, 0.25).implied_quote(&flat).unwrap();
    let swp = |t: Real| {
        SwapRateHelper::new(0.0, t, Frequency::Annual)
            .unwrap()
            .implied_quote(&flat)
            .unwrap()
    };
    vec![
        Quote::deposit("D3M", 0.25, dep(0.25)),
        Quote::deposit("D6M", 0.5, dep(0.5)),
        Quote::future("F9M", 0.75, fut(0.75)),
        Quote::swap("S2Y", 2.0, swp(2.0)),
        Quote::swap("S5Y", 5.0, swp(5.0)),
        Quote::swap("S10Y", 10.0, swp(10.0)),
    ]
}

// ── Bootstrapping ─────────────────────────────────────────────────────────────

#[test]
fn flat_quotes_reproduce_the_flat_rate() {
    init_tracing();
    for method in METHODS {
        let curve = build_curve(today(), &flat_quotes(0.04), method, &CurveBuildConfig::default())
            .unwrap();
        for (t, _) in curve.pivots().into_iter().skip(1) {
            let z = curve.zero_rate(t, Compounding::Continuous, Frequency::Annual).unwrap();
            assert_abs_diff_eq!(z, 0.04, epsilon = 1e-8);
        }
        assert!(curve.is_arbitrage_free());
    }
}

#[test]
fn duplicate_maturity_is_rejected() {
    let quotes = [Quote::deposit("A", 1.0, 0.03), Quote::swap("B", 1.0, 0.031)];
    let err = build_curve(today(), &quotes, InterpolationMethod::Linear, &CurveBuildConfig::default())
        .unwrap_err();
    match err {
        Error::DuplicateMaturity { maturity, .. } => assert_eq!(maturity, 1.0),
        other => panic!("expected DuplicateMaturity, got {other}"),
    }
}

#[test]
fn empty_quotes_are_a_configuration_error() {
    let err = build_curve(today(), &[], InterpolationMethod::Linear, &CurveBuildConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[cfg(feature = "serde")]
#[test]
fn curve_serde_round_trip() {
    let curve = build_curve(
        today(),
        &flat_quotes(0.03),
        InterpolationMethod::CubicSpline,
        &CurveBuildConfig::default(),
    )
    .unwrap();
    let json = serde_json::to_string(&curve).unwrap();
    assert!(json.contains("\"version\":1"));
    let back: Curve = serde_json::from_str(&json).unwrap();
    assert_eq!(back.method(), curve.method());
    assert_eq!(back.valuation_date(), curve.valuation_date());
    for t in [0.1, 0.5, 1.7, 4.0, 9.9] {
        assert_abs_diff_eq!(back.discount(t).unwrap(), curve.discount(t).unwrap(), epsilon = 1e-12);
    }
}

// ── Forward price curve ───────────────────────────────────────────────────────

#[test]
fn forward_curve_recovers_parity_forwards() {
    let (s, r, q): (Real, Real, Real) = (100.0, 0.05, 0.02);
    let curve = Curve::flat(today(), r, DayCounter::Actual365Fixed).unwrap();
    let mut quotes = Vec::new();
    for t in [0.25, 0.5, 1.0] {
        for k in [90.0, 100.0, 110.0] {
            for option_type in [OptionType::Call, OptionType::Put] {
                let (price, _) = black_scholes_merton(option_type, s, k, r, q, 0.25, t);
                quotes.push(OptionQuote::new(format!("{option_type}{t}/{k}"), t, k, option_type, price));
            }
        }
    }
    let forwards = ForwardPriceCurve::from_option_quotes(&quotes, &curve).unwrap();
    for t in [0.25, 0.5, 1.0] {
        let expected = s * ((r - q) * t).exp();
        assert_abs_diff_eq!(forwards.forward(t).unwrap(), expected, epsilon = 1e-8);
    }
}

// ── Interpolation and root finding ────────────────────────────────────────────

#[test]
fn interpolation_is_exact_at_nodes() {
    let xs = [0.5, 1.0, 2.0, 5.0, 10.0];
    let ys = [0.98, 0.95, 0.90, 0.78, 0.61];
    for method in METHODS {
        for (x, y) in xs.iter().zip(ys) {
            assert_abs_diff_eq!(interpolate(&xs, &ys, method, *x).unwrap(), y, epsilon = 1e-12);
        }
    }
}

#[test]
fn malformed_interpolation_input() {
    let err = interpolate(&[1.0, 0.5], &[1.0, 2.0], InterpolationMethod::Linear, 0.7).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    let err = interpolate(&[1.0, 2.0], &[1.0], InterpolationMethod::Linear, 1.5).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn root_stays_in_bracket() {
    let cfg = Solver1DConfig::default();
    let f = |x: Real| x.powi(3) - 2.0 * x - 5.0;
    let x = find_root(f, RootSearch::Bracket { lo: 2.0, hi: 3.0 }, &cfg).unwrap();
    assert!((2.0..=3.0).contains(&x));
    assert!(f(x).abs() < 1e-10);

    let err = find_root(f, RootSearch::Bracket { lo: 3.0, hi: 4.0 }, &cfg).unwrap_err();
    assert!(matches!(err, Error::InvalidBracket { .. }));
}

// ── Bonds ─────────────────────────────────────────────────────────────────────

#[test]
fn bond_at_par_yield_prices_at_par() {
    let bond = FixedRateBond::new(100.0, 0.045, Frequency::Semiannual, 8.0, 0.0).unwrap();
    let p = bond_price_from_yield(&bond, 0.045, Compounding::Compounded).unwrap();
    assert_abs_diff_eq!(p.clean, 100.0, epsilon = 1e-10);
}

#[test]
fn bond_on_bootstrapped_curve() {
    let curve = build_curve(
        today(),
        &flat_quotes(0.04),
        InterpolationMethod::LogLinear,
        &CurveBuildConfig::default(),
    )
    .unwrap();
    let bond = FixedRateBond::zero_coupon(100.0, 5.0).unwrap();
    let p = bond_price(&bond, &curve).unwrap();
    assert_abs_diff_eq!(p.dirty, 100.0 * (-0.2_f64).exp(), epsilon = 1e-6);
}
