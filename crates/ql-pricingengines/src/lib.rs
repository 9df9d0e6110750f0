//! # ql-pricingengines
//!
//! Pricing on top of the term structures: vanilla options under four
//! models, implied volatility and the implied-volatility surface, and
//! fixed-rate bond discounting.
//!
//! ## Engines
//!
//! - [`price_option`]: dispatches on [`PricingModel`]
//! - [`black_scholes_merton`]: closed form with analytic Greeks
//! - [`black76`]: options on futures and forwards
//! - [`binomial`]: European and American exercise on a lattice
//! - [`monte_carlo`]: seeded simulation with a standard error
//! - [`implied_volatility`] / [`implied_volatility_black76`]
//! - [`ImpliedVolSurface`]: quotes to a volatility surface
//! - [`bond_price`] / [`bond_yield`]

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european_engine;
pub mod binomial_engine;
pub mod black76_engine;
pub mod discounting_bond_engine;
pub mod implied_vol_surface;
pub mod implied_volatility;
pub mod monte_carlo_engine;
pub mod pricing_model;

pub use analytic_european_engine::{analytic_european, black_scholes_merton};
pub use binomial_engine::binomial;
pub use black76_engine::{black76, black76_option};
pub use discounting_bond_engine::{bond_price, bond_price_from_yield, bond_yield, BondPrice};
pub use implied_vol_surface::{filter_static_arbitrage, ImpliedVolSurface, VolPoint};
pub use implied_volatility::{implied_volatility, implied_volatility_black76, ImpliedVolConfig};
pub use monte_carlo_engine::monte_carlo;
pub use pricing_model::{
    price_option, Greeks, LatticeConfig, ModelParameters, PricingModel, PricingResult,
};
