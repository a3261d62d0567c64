//! Shared types and bond reference data for the treasury back-office pipeline.
//!
//! This crate contains:
//! - Domain records and enums shared by every service (types)
//! - The fractional 32nds-with-8ths price codec (tick)
//! - Static bond reference data for the traded tenors (catalog)
//! - Yield and modified-duration analytics (analytics)

pub mod analytics;
pub mod catalog;
pub mod tick;
pub mod types;

pub use catalog::{MissingProduct, ProductCatalog};
pub use tick::{format_px, parse_px, TickParseError};
pub use types::*;
