// src/types/quote.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Point-in-time field set for a security. Only the current price is read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    fields: Map<String, Value>,
}

impl QuoteSnapshot {
    /// Field name under which providers publish the latest trading price.
    pub const CURRENT_PRICE: &'static str = "currentPrice";

    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Convenience constructor for a snapshot holding just a price.
    pub fn with_price(price: f64) -> Self {
        let mut fields = Map::new();
        fields.insert(Self::CURRENT_PRICE.to_string(), Value::from(price));
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A missing or non-numeric price is reported as not available, never as an error.
    pub fn current_price(&self) -> PriceDisplay {
        match self.fields.get(Self::CURRENT_PRICE).and_then(Value::as_f64) {
            Some(price) => PriceDisplay::Price(price),
            None => PriceDisplay::NotAvailable,
        }
    }
}

/// What the price label shows after a successful run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceDisplay {
    Price(f64),
    NotAvailable,
}

impl fmt::Display for PriceDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceDisplay::Price(price) => write!(f, "{price}"),
            PriceDisplay::NotAvailable => f.write_str("N/A"),
        }
    }
}
