//! Implied-volatility surface built from quoted option premiums.
//!
//! Quotes that admit a static arbitrage are removed first, the survivors
//! are inverted to implied volatilities and stored as
//! `(maturity, ln(K/S), σ)` points.  Queries interpolate linearly in
//! log-moneyness within a maturity slice and linearly in total variance
//! `σ²t` across slices; both directions are flat outside the quoted range.

use crate::implied_volatility::{implied_volatility, implied_volatility_black76, ImpliedVolConfig};
use ql_core::{errors::Result, Price, Rate, Real, Time, Volatility};
use ql_instruments::{OptionSpec, OptionType};
use ql_math::interpolations::{Extrapolation, Interpolation, InterpolationMethod};
use ql_quotes::OptionQuote;
use ql_termstructures::{Curve, ForwardPriceCurve};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Slack on price comparisons in the arbitrage filter.
const PRICE_TOLERANCE: Price = 1.0e-10;

/// One node of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VolPoint {
    /// Years to expiry.
    pub maturity: Time,
    /// `ln(K / S)`.
    pub log_moneyness: Real,
    /// Implied Black volatility.
    pub volatility: Volatility,
}

#[derive(Debug, Clone, PartialEq)]
struct Slice {
    maturity: Time,
    points: Vec<(Real, Volatility)>,
    /// `None` with a single strike.
    smile: Option<Interpolation>,
}

impl Slice {
    fn new(maturity: Time, points: Vec<(Real, Volatility)>) -> Result<Self> {
        let smile = if points.len() < 2 {
            None
        } else {
            let (xs, vs): (Vec<Real>, Vec<Volatility>) = points.iter().copied().unzip();
            Some(Interpolation::new(InterpolationMethod::Linear, &xs, &vs)?)
        };
        Ok(Self {
            maturity,
            points,
            smile,
        })
    }

    fn volatility(&self, log_moneyness: Real) -> Result<Volatility> {
        match &self.smile {
            Some(smile) => smile.value(log_moneyness, Extrapolation::Flat),
            None => Ok(self.points[0].1),
        }
    }
}

/// Implied volatilities by maturity and log-moneyness.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpliedVolSurface {
    spot: Price,
    slices: Vec<Slice>,
}

impl ImpliedVolSurface {
    /// Build the surface from option premiums.
    ///
    /// With a forward curve each quote is inverted with Black-76 on the
    /// forward to its maturity, otherwise with Black-Scholes-Merton on
    /// `spot` and `dividend_yield`.  Quotes that fail the arbitrage filter
    /// or whose inversion fails are dropped.  A call and a put at the same
    /// strike and maturity contribute their average volatility.
    ///
    /// # Errors
    /// `InvalidParameter` for a bad spot, `Configuration` for a malformed
    /// quote or when no quote survives.
    pub fn construct(
        spot: Price,
        quotes: &[OptionQuote],
        curve: &Curve,
        dividend_yield: Rate,
        forward_curve: Option<&ForwardPriceCurve>,
    ) -> Result<Self> {
        ql_core::ensure!(
            spot.is_finite() && spot > 0.0,
            InvalidParameter,
            "spot must be positive, got {spot}"
        );
        for q in quotes {
            q.validate()?;
        }
        let accepted = filter_static_arbitrage(quotes);
        let cfg = ImpliedVolConfig {
            dividend_yield,
            ..ImpliedVolConfig::default()
        };

        // maturity -> log-moneyness -> vols
        let mut grid: BTreeMap<u64, BTreeMap<u64, Vec<Volatility>>> = BTreeMap::new();
        for q in &accepted {
            let solved = match forward_curve {
                Some(fc) => fc.forward(q.maturity).and_then(|f| {
                    let spec = OptionSpec::european(f, q.strike, q.maturity, q.option_type)?;
                    implied_volatility_black76(&spec, curve, q.price, &cfg)
                }),
                None => OptionSpec::european(spot, q.strike, q.maturity, q.option_type)
                    .and_then(|spec| implied_volatility(&spec, curve, q.price, &cfg)),
            };
            match solved {
                Ok(vol) if vol == 0.0 => debug!(id = %q.id, "quote on its lower bound dropped from surface"),
                Ok(vol) => {
                    let x = (q.strike / spot).ln();
                    grid.entry(q.maturity.to_bits())
                        .or_default()
                        .entry(order_key(x))
                        .or_default()
                        .push(vol);
                }
                Err(err) => debug!(id = %q.id, error = %err, "quote dropped from surface"),
            }
        }

        let mut slices = Vec::with_capacity(grid.len());
        for (t_bits, smile) in grid {
            let points = smile
                .into_iter()
                .map(|(x_key, vols)| {
                    let vol = vols.iter().sum::<Volatility>() / vols.len() as Real;
                    (from_order_key(x_key), vol)
                })
                .collect();
            slices.push(Slice::new(Time::from_bits(t_bits), points)?);
        }
        ql_core::ensure!(
            !slices.is_empty(),
            Configuration,
            "no option quote yields an implied volatility ({} quoted, {} passed the arbitrage filter)",
            quotes.len(),
            accepted.len()
        );
        info!(
            quotes = quotes.len(),
            accepted = accepted.len(),
            maturities = slices.len(),
            "implied volatility surface built"
        );
        Ok(Self { spot, slices })
    }

    /// The spot the log-moneyness is measured against.
    pub fn spot(&self) -> Price {
        self.spot
    }

    /// Slice maturities, ascending.
    pub fn maturities(&self) -> Vec<Time> {
        self.slices.iter().map(|s| s.maturity).collect()
    }

    /// All surface nodes, by maturity then log-moneyness.
    pub fn points(&self) -> Vec<VolPoint> {
        self.slices
            .iter()
            .flat_map(|s| {
                s.points.iter().map(move |&(log_moneyness, volatility)| VolPoint {
                    maturity: s.maturity,
                    log_moneyness,
                    volatility,
                })
            })
            .collect()
    }

    /// Volatility for expiry `t` and `strike`.
    ///
    /// # Errors
    /// `InvalidParameter` for a non-positive `t` or `strike`.
    pub fn volatility(&self, t: Time, strike: Price) -> Result<Volatility> {
        ql_core::ensure!(
            t.is_finite() && t > 0.0,
            InvalidParameter,
            "expiry must be positive, got {t}"
        );
        ql_core::ensure!(
            strike.is_finite() && strike > 0.0,
            InvalidParameter,
            "strike must be positive, got {strike}"
        );
        let x = (strike / self.spot).ln();
        let n = self.slices.len();
        let first = &self.slices[0];
        let last = &self.slices[n - 1];
        if t <= first.maturity {
            return first.volatility(x);
        }
        if t >= last.maturity {
            return last.volatility(x);
        }
        let i = self.slices.partition_point(|s| s.maturity < t);
        let (s0, s1) = (&self.slices[i - 1], &self.slices[i]);
        let w0 = s0.volatility(x)?.powi(2) * s0.maturity;
        let w1 = s1.volatility(x)?.powi(2) * s1.maturity;
        let alpha = (t - s0.maturity) / (s1.maturity - s0.maturity);
        let total_variance = w0 + alpha * (w1 - w0);
        Ok((total_variance / t).sqrt())
    }
}

/// Map a float to a key whose `u64` order is the float's numeric order.
fn order_key(x: Real) -> u64 {
    let bits = (x + 0.0).to_bits();
    if bits >> 63 == 1 {
        !bits
    } else {
        bits | (1 << 63)
    }
}

fn from_order_key(key: u64) -> Real {
    let bits = if key >> 63 == 1 { key & !(1 << 63) } else { !key };
    Real::from_bits(bits)
}

// ── Static-arbitrage filter ───────────────────────────────────────────────────

/// Drop quotes that admit a static arbitrage against their neighbours.
///
/// Quotes are grouped by option type and maturity and sorted by strike.
/// A quote is rejected when
///
/// - **vertical**: the next strike is priced above it (calls) or below it
///   (puts);
/// - **calendar**: the same strike at the next maturity quoting that strike
///   is cheaper;
/// - **butterfly**: it is the middle of three consecutive strikes and lies
///   above the chord of its neighbours (prices must be convex in strike).
///
/// Surviving quotes keep their input order.
pub fn filter_static_arbitrage(quotes: &[OptionQuote]) -> Vec<OptionQuote> {
    // (type, maturity) -> indices sorted by strike
    let mut grid: BTreeMap<(bool, u64), Vec<usize>> = BTreeMap::new();
    for (i, q) in quotes.iter().enumerate() {
        let is_call = q.option_type == OptionType::Call;
        grid.entry((is_call, q.maturity.to_bits())).or_default().push(i);
    }
    for idx in grid.values_mut() {
        idx.sort_by(|&a, &b| quotes[a].strike.total_cmp(&quotes[b].strike));
    }

    let mut rejected = vec![false; quotes.len()];
    let keys: Vec<(bool, u64)> = grid.keys().copied().collect();
    for (n, key) in keys.iter().enumerate() {
        let (is_call, _) = *key;
        let slice = &grid[key];

        for pair in slice.windows(2) {
            let (cur, next) = (&quotes[pair[0]], &quotes[pair[1]]);
            let crossed = if is_call {
                next.price > cur.price + PRICE_TOLERANCE
            } else {
                next.price < cur.price - PRICE_TOLERANCE
            };
            if crossed {
                debug!(id = %cur.id, next = %next.id, "vertical spread arbitrage");
                rejected[pair[0]] = true;
            }
        }

        for triple in slice.windows(3) {
            let (a, b, c) = (&quotes[triple[0]], &quotes[triple[1]], &quotes[triple[2]]);
            let w = (c.strike - b.strike) / (c.strike - a.strike);
            if b.price > w * a.price + (1.0 - w) * c.price + PRICE_TOLERANCE {
                debug!(id = %b.id, "butterfly spread arbitrage");
                rejected[triple[1]] = true;
            }
        }

        // Later keys of the same type are the later maturities, in order.
        let later: Vec<&Vec<usize>> = keys[n + 1..]
            .iter()
            .take_while(|k| k.0 == is_call)
            .map(|k| &grid[k])
            .collect();
        for &i in slice {
            let cur = &quotes[i];
            let next_same_strike = later
                .iter()
                .find_map(|idx| idx.iter().map(|&j| &quotes[j]).find(|q| q.strike == cur.strike));
            if let Some(long) = next_same_strike {
                if long.price < cur.price - PRICE_TOLERANCE {
                    debug!(id = %cur.id, later = %long.id, "calendar spread arbitrage");
                    rejected[i] = true;
                }
            }
        }
    }

    quotes
        .iter()
        .zip(rejected)
        .filter(|(_, r)| !r)
        .map(|(q, _)| q.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_european_engine::black_scholes_merton;
    use crate::black76_engine::black76;
    use approx::assert_abs_diff_eq;
    use ql_core::{errors::Error, Date, DayCounter};

    fn curve() -> Curve {
        Curve::flat(Date::from_ymd_opt(2025, 1, 2).unwrap(), 0.03, DayCounter::Actual365Fixed)
            .unwrap()
    }

    fn smile(t: Time, k: Price) -> Volatility {
        0.2 + 0.1 * (k / 100.0).ln().powi(2) + 0.02 * t
    }

    fn bsm_quotes() -> Vec<OptionQuote> {
        let mut quotes = Vec::new();
        for t in [0.25, 1.0] {
            for k in [80.0, 90.0, 100.0, 110.0, 120.0] {
                for option_type in [OptionType::Call, OptionType::Put] {
                    let (price, _) = black_scholes_merton(option_type, 100.0, k, 0.03, 0.0, smile(t, k), t);
                    quotes.push(OptionQuote::new(format!("{option_type}-{t}-{k}"), t, k, option_type, price));
                }
            }
        }
        quotes
    }

    #[test]
    fn recovers_quoted_volatilities() {
        let surface = ImpliedVolSurface::construct(100.0, &bsm_quotes(), &curve(), 0.0, None).unwrap();
        assert_eq!(surface.maturities(), vec![0.25, 1.0]);
        assert_eq!(surface.points().len(), 10);
        for t in [0.25, 1.0] {
            for k in [80.0, 100.0, 120.0] {
                assert_abs_diff_eq!(surface.volatility(t, k).unwrap(), smile(t, k), epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn linear_in_total_variance_between_slices() {
        let surface = ImpliedVolSurface::construct(100.0, &bsm_quotes(), &curve(), 0.0, None).unwrap();
        let (v0, v1) = (smile(0.25, 100.0), smile(1.0, 100.0));
        let t: Time = 0.5;
        let w = v0 * v0 * 0.25 + (t - 0.25) / 0.75 * (v1 * v1 * 1.0 - v0 * v0 * 0.25);
        assert_abs_diff_eq!(surface.volatility(t, 100.0).unwrap(), (w / t).sqrt(), epsilon = 1e-8);
    }

    #[test]
    fn flat_outside_quoted_range() {
        let surface = ImpliedVolSurface::construct(100.0, &bsm_quotes(), &curve(), 0.0, None).unwrap();
        let wing = surface.volatility(1.0, 120.0).unwrap();
        assert_abs_diff_eq!(surface.volatility(1.0, 500.0).unwrap(), wing, epsilon = 1e-12);
        let short = surface.volatility(0.25, 100.0).unwrap();
        assert_abs_diff_eq!(surface.volatility(0.01, 100.0).unwrap(), short, epsilon = 1e-12);
        assert!(matches!(surface.volatility(0.0, 100.0), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn black76_with_forward_curve() {
        let forwards = ForwardPriceCurve::new(vec![(0.5, 104.0)]).unwrap();
        let quotes: Vec<OptionQuote> = [95.0, 105.0, 115.0]
            .iter()
            .map(|&k| {
                let (price, _) = black76(OptionType::Call, 104.0, k, 0.03, 0.3, 0.5);
                OptionQuote::new(format!("C{k}"), 0.5, k, OptionType::Call, price)
            })
            .collect();
        let surface = ImpliedVolSurface::construct(100.0, &quotes, &curve(), 0.0, Some(&forwards)).unwrap();
        for p in surface.points() {
            assert_abs_diff_eq!(p.volatility, 0.3, epsilon = 1e-8);
        }
    }

    #[test]
    fn unsolvable_quotes_are_dropped() {
        let mut quotes = bsm_quotes();
        // above the spot: no volatility reproduces it
        quotes.push(OptionQuote::new("bad", 2.0, 100.0, OptionType::Call, 150.0));
        let surface = ImpliedVolSurface::construct(100.0, &quotes, &curve(), 0.0, None).unwrap();
        assert_eq!(surface.maturities(), vec![0.25, 1.0]);
    }

    #[test]
    fn nothing_usable_is_an_error() {
        let quotes = vec![OptionQuote::new("bad", 1.0, 100.0, OptionType::Call, 150.0)];
        let err = ImpliedVolSurface::construct(100.0, &quotes, &curve(), 0.0, None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn vertical_spread_rejects_crossed_calls() {
        let quotes = vec![
            OptionQuote::new("C90", 1.0, 90.0, OptionType::Call, 12.0),
            OptionQuote::new("C100", 1.0, 100.0, OptionType::Call, 14.0),
        ];
        let ids: Vec<String> = filter_static_arbitrage(&quotes).into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["C100"]);
    }

    #[test]
    fn vertical_spread_rejects_crossed_puts() {
        let quotes = vec![
            OptionQuote::new("P90", 1.0, 90.0, OptionType::Put, 6.0),
            OptionQuote::new("P100", 1.0, 100.0, OptionType::Put, 5.0),
        ];
        let ids: Vec<String> = filter_static_arbitrage(&quotes).into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["P100"]);
    }

    #[test]
    fn calendar_spread_rejects_dearer_short_expiry() {
        let quotes = vec![
            OptionQuote::new("C-short", 0.5, 100.0, OptionType::Call, 9.0),
            OptionQuote::new("C-long", 1.0, 100.0, OptionType::Call, 8.0),
        ];
        let ids: Vec<String> = filter_static_arbitrage(&quotes).into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["C-long"]);
    }

    #[test]
    fn calendar_spread_skips_maturities_without_the_strike() {
        let quotes = vec![
            OptionQuote::new("C100-6M", 0.5, 100.0, OptionType::Call, 9.0),
            OptionQuote::new("C120-1Y", 1.0, 120.0, OptionType::Call, 3.0),
            OptionQuote::new("C100-2Y", 2.0, 100.0, OptionType::Call, 8.0),
        ];
        let ids: Vec<String> = filter_static_arbitrage(&quotes).into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["C120-1Y", "C100-2Y"]);
    }

    #[test]
    fn butterfly_rejects_non_convex_middle() {
        let quotes = vec![
            OptionQuote::new("C90", 1.0, 90.0, OptionType::Call, 15.0),
            OptionQuote::new("C100", 1.0, 100.0, OptionType::Call, 10.0),
            OptionQuote::new("C110", 1.0, 110.0, OptionType::Call, 2.0),
        ];
        let ids: Vec<String> = filter_static_arbitrage(&quotes).into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec!["C90", "C110"]);
    }

    #[test]
    fn arbitrage_free_quotes_pass_untouched() {
        let quotes = bsm_quotes();
        assert_eq!(filter_static_arbitrage(&quotes), quotes);
    }

    #[test]
    fn order_key_preserves_order() {
        let xs = [-1.5, -0.0, 0.0, 1e-9, 2.0];
        let keys: Vec<u64> = xs.iter().map(|&x| order_key(x)).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(order_key(-0.0), order_key(0.0));
        for x in xs {
            assert_eq!(from_order_key(order_key(x)), x + 0.0);
        }
    }

    #[test]
    fn surface_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ImpliedVolSurface>();
    }
}
