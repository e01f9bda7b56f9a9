//! Seller-side profitability for products listed on Brazilian marketplaces.
//!
//! The [`pricing`] module holds the pure fee engine; [`rules`] describes the editable
//! fee schedules it reads; [`store`] and [`service`] adapt both to persistence and HTTP.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod pricing;
pub mod rules;
pub mod service;
pub mod store;
pub mod telemetry;

pub use marketplace::{Marketplace, MercadoLivreAdType};
pub use pricing::{
    calculate, quote, resolve_fee, CalculationInput, CalculationResult, FeeContext,
    FeeOverrides, FeeSource, ParsedInput, Quote, ResolvedFee,
};
pub use rules::{merge_with_defaults, MarketplaceRules};
