//! Fulfillment cost calculator.
//!
//! Prices a fulfillment order (receiving, preparation, storage, assembly,
//! declared-value fee, delivery) against a tiered, per-country tariff table
//! and produces an ordered line-item breakdown with a grand total in the
//! destination country's currency.
//!
//! # Architecture
//!
//! - [`domain`] — the pure core: tariff table and tier resolution
//!   ([`domain::tariff`]), currency resolution ([`domain::currency`]), order
//!   validation ([`domain::order`]), the cost engine ([`domain::pricing`])
//!   and the tabular formatter ([`domain::format`]).
//! - [`infra`] — the tariff feed client with in-memory and on-disk caching.
//! - [`util`] — calculation history persistence and CSV export.
//!
//! The core never performs I/O: callers load a [`domain::RateTable`]
//! snapshot (typically through [`infra::TariffClient`]) and pass it to
//! [`domain::calculate`] together with an [`domain::OrderRequest`].

pub mod domain;
pub mod infra;
pub mod util;

pub use domain::{
    calculate, format_result, CalculationResult, Country, FulfillmentModel, LineItem, Operation,
    OrderRequest, PricingError, Quantity, Rate, RateTable, ResultTable,
};
pub use infra::{TariffClient, TariffClientError};
