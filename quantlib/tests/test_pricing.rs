//! Option pricing and implied volatility through the `quantlib-api` entry
//! points.

use approx::assert_abs_diff_eq;
use quantlib_api::pricingengines::{black_scholes_merton, filter_static_arbitrage};
use quantlib_api::{
    implied_volatility, price_option, Curve, Date, DayCounter, Error, ImpliedVolConfig,
    ImpliedVolSurface, LatticeConfig, ModelParameters, MonteCarloConfig, OptionQuote, OptionSpec,
    OptionType, PricingModel, Rate,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn flat(rate: Rate) -> Curve {
    Curve::flat(Date::from_ymd_opt(2025, 1, 2).unwrap(), rate, DayCounter::Actual365Fixed).unwrap()
}

fn atm_call() -> OptionSpec {
    OptionSpec::european(100.0, 100.0, 1.0, OptionType::Call).unwrap()
}

// ── Reference scenario ────────────────────────────────────────────────────────

#[test]
fn reference_call_and_its_implied_vol() {
    init_tracing();
    let curve = flat(0.05);
    let res = price_option(&atm_call(), ModelParameters::new(0.2), &curve, &PricingModel::ClosedForm)
        .unwrap();
    assert_abs_diff_eq!(res.price, 10.45, epsilon = 0.01);

    let vol = implied_volatility(&atm_call(), &curve, res.price, &ImpliedVolConfig::default()).unwrap();
    assert_abs_diff_eq!(vol, 0.20, epsilon = 1e-4);
}

#[test]
fn zero_volatility_is_invalid() {
    let err = price_option(&atm_call(), ModelParameters::new(0.0), &flat(0.05), &PricingModel::ClosedForm)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParameter(_)));
}

#[test]
fn american_exercise_needs_a_lattice() {
    let spec = OptionSpec::american(100.0, 100.0, 1.0, OptionType::Put).unwrap();
    let err = price_option(&spec, ModelParameters::new(0.2), &flat(0.05), &PricingModel::ClosedForm)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedExerciseStyle(_)));
}

// ── Model agreement ───────────────────────────────────────────────────────────

#[test]
fn put_call_parity_closed_form() {
    let curve = flat(0.04);
    let params = ModelParameters::new(0.3).with_dividend_yield(0.01);
    let call = OptionSpec::european(95.0, 100.0, 0.75, OptionType::Call).unwrap();
    let c = price_option(&call, params, &curve, &PricingModel::ClosedForm).unwrap().price;
    let p = price_option(&call.flipped(), params, &curve, &PricingModel::ClosedForm).unwrap().price;
    let parity = 95.0 * (-0.01_f64 * 0.75).exp() - 100.0 * curve.discount(0.75).unwrap();
    assert_abs_diff_eq!(c - p, parity, epsilon = 1e-10);
}

#[test]
fn black76_parity() {
    let curve = flat(0.03);
    let forward = 102.0;
    let call = OptionSpec::european(forward, 100.0, 0.5, OptionType::Call).unwrap();
    let params = ModelParameters::new(0.25);
    let c = price_option(&call, params, &curve, &PricingModel::Black76).unwrap().price;
    let p = price_option(&call.flipped(), params, &curve, &PricingModel::Black76).unwrap().price;
    assert_abs_diff_eq!(c - p, curve.discount(0.5).unwrap() * (forward - 100.0), epsilon = 1e-10);
}

#[test]
fn american_put_worth_at_least_european() {
    let curve = flat(0.05);
    let params = ModelParameters::new(0.25);
    let model = PricingModel::Binomial(LatticeConfig::default());
    let am = OptionSpec::american(100.0, 105.0, 1.0, OptionType::Put).unwrap();
    let eu = OptionSpec::european(100.0, 105.0, 1.0, OptionType::Put).unwrap();
    let am = price_option(&am, params, &curve, &model).unwrap().price;
    let eu = price_option(&eu, params, &curve, &model).unwrap().price;
    assert!(am > eu, "American {am} vs European {eu}");
}

#[test]
fn binomial_converges_to_closed_form() {
    let curve = flat(0.05);
    let params = ModelParameters::new(0.2);
    let exact = price_option(&atm_call(), params, &curve, &PricingModel::ClosedForm).unwrap().price;
    let error = |steps: usize| {
        let model = PricingModel::Binomial(LatticeConfig {
            steps,
            ..LatticeConfig::default()
        });
        (price_option(&atm_call(), params, &curve, &model).unwrap().price - exact).abs()
    };
    assert!(error(1000) < error(50));
    assert!(error(1000) < 1e-2);
}

#[test]
fn monte_carlo_is_reproducible_and_unbiased() {
    let curve = flat(0.05);
    let params = ModelParameters::new(0.2);
    let model = PricingModel::MonteCarlo(MonteCarloConfig {
        paths: 50_000,
        ..MonteCarloConfig::default()
    });
    let a = price_option(&atm_call(), params, &curve, &model).unwrap();
    let b = price_option(&atm_call(), params, &curve, &model).unwrap();
    assert_eq!(a, b);

    let (exact, _) = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
    let se = a.std_error.unwrap();
    assert!((a.price - exact).abs() < 3.0 * se, "MC {} ± {se} vs {exact}", a.price);
}

// ── Implied volatility ────────────────────────────────────────────────────────

#[test]
fn price_above_spot_is_an_arbitrage() {
    let err = implied_volatility(&atm_call(), &flat(0.05), 101.0, &ImpliedVolConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::ArbitrageViolation(_)));
}

#[test]
fn american_implied_vol_round_trip() {
    let curve = flat(0.05);
    let spec = OptionSpec::american(100.0, 100.0, 0.5, OptionType::Put).unwrap();
    let cfg = ImpliedVolConfig {
        lattice: LatticeConfig {
            steps: 150,
            ..LatticeConfig::default()
        },
        ..ImpliedVolConfig::default()
    };
    let price = price_option(&spec, ModelParameters::new(0.3), &curve, &PricingModel::Binomial(cfg.lattice))
        .unwrap()
        .price;
    let vol = implied_volatility(&spec, &curve, price, &cfg).unwrap();
    assert_abs_diff_eq!(vol, 0.3, epsilon = 1e-6);
}

// ── Surface ───────────────────────────────────────────────────────────────────

#[test]
fn arbitrage_filter_rejects_crossed_verticals() {
    let quotes = vec![
        OptionQuote::new("C95", 1.0, 95.0, OptionType::Call, 9.0),
        OptionQuote::new("C100", 1.0, 100.0, OptionType::Call, 9.5),
        OptionQuote::new("C105", 1.0, 105.0, OptionType::Call, 4.0),
    ];
    let kept: Vec<String> = filter_static_arbitrage(&quotes).into_iter().map(|q| q.id).collect();
    assert!(!kept.contains(&"C95".to_string()));
    assert!(kept.contains(&"C105".to_string()));
}

#[test]
fn surface_from_flat_vol_quotes() {
    init_tracing();
    let curve = flat(0.02);
    let mut quotes = Vec::new();
    for t in [0.5, 1.0, 2.0] {
        for k in [85.0, 100.0, 115.0] {
            let (price, _) = black_scholes_merton(OptionType::Call, 100.0, k, 0.02, 0.0, 0.22, t);
            quotes.push(OptionQuote::new(format!("C{t}/{k}"), t, k, OptionType::Call, price));
        }
    }
    let surface = ImpliedVolSurface::construct(100.0, &quotes, &curve, 0.0, None).unwrap();
    for (t, k) in [(0.5, 85.0), (0.75, 100.0), (1.5, 110.0), (3.0, 130.0)] {
        assert_abs_diff_eq!(surface.volatility(t, k).unwrap(), 0.22, epsilon = 1e-8);
    }
}
