//! Tiered attribution of caught exceptions to the throwing sites in
//! the protected block.

mod engine;
mod tiers;
mod types;

pub use engine::AttributionEngine;
pub use types::{AttributedSource, AttributionTier, ExceptionAttribution};
