//! Static reference data for the traded treasury tenors.
//!
//! The catalog is built once at startup, shared read-only across the
//! process, and is the numerical interface the risk service uses for
//! yield and duration.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::analytics;
use crate::types::Bond;

/// Reference-data lookup failed for an incoming product id.
#[derive(Debug, Error)]
#[error("unknown product {0:?}")]
pub struct MissingProduct(pub String);

/// Read-only store of bond terms, keyed by product id.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    bonds: HashMap<String, Bond>,
    /// Valuation date used to count remaining coupon periods.
    as_of: NaiveDate,
}

impl ProductCatalog {
    /// The standard seven-tenor treasury curve, valued as of today.
    pub fn treasuries() -> Self {
        Self::treasuries_as_of(chrono::Local::now().date_naive())
    }

    /// Same curve with an explicit valuation date (deterministic tests).
    pub fn treasuries_as_of(as_of: NaiveDate) -> Self {
        let mut catalog = Self { bonds: HashMap::new(), as_of };
        let rows: [(&str, &str, &str, Decimal, (i32, u32, u32)); 7] = [
            ("T2Y", "91282CLY5", "T 2 06/28", Decimal::new(200, 4), (2028, 6, 30)),
            ("T3Y", "91282CMB4", "T 2.25 06/29", Decimal::new(225, 4), (2029, 6, 15)),
            ("T5Y", "91282CLZ2", "T 2.5 06/31", Decimal::new(250, 4), (2031, 6, 30)),
            ("T7Y", "91282CMA6", "T 2.75 06/33", Decimal::new(275, 4), (2033, 6, 30)),
            ("T10Y", "91282CMC2", "T 3 05/36", Decimal::new(300, 4), (2036, 5, 15)),
            ("T20Y", "912810UF3", "T 3.5 05/46", Decimal::new(350, 4), (2046, 5, 15)),
            ("T30Y", "912810UG1", "T 4 05/56", Decimal::new(400, 4), (2056, 5, 15)),
        ];
        for (id, cusip, ticker, coupon, (y, m, d)) in rows {
            catalog.add(Bond {
                product_id: id.to_string(),
                cusip: cusip.to_string(),
                ticker: ticker.to_string(),
                coupon,
                maturity: NaiveDate::from_ymd_opt(y, m, d).expect("static maturity date"),
            });
        }
        catalog
    }

    pub fn add(&mut self, bond: Bond) {
        self.bonds.insert(bond.product_id.clone(), bond);
    }

    /// Look up a bond, failing for unknown product ids.
    pub fn get(&self, product_id: &str) -> Result<&Bond, MissingProduct> {
        self.bonds
            .get(product_id)
            .ok_or_else(|| MissingProduct(product_id.to_string()))
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.bonds.contains_key(product_id)
    }

    pub fn len(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty()
    }

    /// Remaining semiannual coupon periods from the valuation date.
    fn coupon_periods(&self, bond: &Bond) -> u32 {
        let days = (bond.maturity - self.as_of).num_days().max(0) as f64;
        let periods = (days / 365.25 * analytics::COUPON_FREQUENCY).round() as u32;
        periods.max(1)
    }

    /// Yield implied by a mid price, semiannual compounding.
    pub fn implied_yield(&self, bond: &Bond, mid: Decimal) -> f64 {
        let coupon = bond.coupon.to_f64().unwrap_or(0.0);
        let price = mid.to_f64().unwrap_or(analytics::FACE_VALUE);
        analytics::yield_from_price(coupon, self.coupon_periods(bond), price)
    }

    /// Modified duration at the given yield.
    pub fn modified_duration(&self, bond: &Bond, yield_rate: f64) -> f64 {
        let coupon = bond.coupon.to_f64().unwrap_or(0.0);
        analytics::modified_duration(coupon, self.coupon_periods(bond), yield_rate)
    }
}
