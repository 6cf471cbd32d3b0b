// src/provider/mod.rs

pub mod provider_trait;
pub mod synthetic;
pub mod yahoo;

#[cfg(test)]
pub(crate) mod fixture;

pub use provider_trait::MarketDataProvider;
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
