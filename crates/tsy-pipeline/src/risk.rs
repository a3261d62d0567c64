//! PV01 risk per product and per bucketed sector.

use std::cell::RefCell;
use std::rc::Rc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tsy_common::{BucketedSector, Position, ProductCatalog, Pv01};

use crate::bus::{Listener, ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::pricing::PricingService;
use crate::store::KeyedStore;

/// One basis point.
const BP: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Recomputes PV01 on every position change: the latest mid comes from the
/// pricing service, yield and modified duration from the catalog's bond
/// analytics, and `pv01 = duration * mid * 0.0001 * aggregate`.
///
/// A missing mid for a positioned product is a structural fault and
/// surfaces as `KeyNotFound`.
pub struct RiskService {
    store: KeyedStore<Pv01>,
    listeners: ListenerSet<Pv01>,
    pricing: Rc<RefCell<PricingService>>,
    catalog: Rc<ProductCatalog>,
}

impl RiskService {
    pub fn new(pricing: Rc<RefCell<PricingService>>, catalog: Rc<ProductCatalog>) -> Self {
        Self {
            store: KeyedStore::new("risk"),
            listeners: ListenerSet::new(),
            pricing,
            catalog,
        }
    }

    pub fn get_data(&self, product_id: &str) -> Result<Pv01, PipelineError> {
        self.store.get(product_id)
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<Pv01>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<Pv01> {
        &self.listeners
    }

    /// Risk per unit of position at the latest mid.
    fn pv01_per_unit(&self, product_id: &str) -> Result<Decimal, PipelineError> {
        let price = self.pricing.borrow().get_data(product_id)?;
        let bond = self.catalog.get(product_id)?;
        let implied_yield = self.catalog.implied_yield(bond, price.mid);
        let duration = self.catalog.modified_duration(bond, implied_yield);
        let duration = Decimal::from_f64(duration).unwrap_or_default();
        Ok(duration * price.mid * BP)
    }

    /// Recompute and publish risk for a position snapshot.
    pub fn add_position(&mut self, position: &Position) -> Result<(), PipelineError> {
        let per_unit = self.pv01_per_unit(&position.product_id)?;
        let aggregate = position.aggregate();
        let risk = Pv01 {
            product_id: position.product_id.clone(),
            pv01: per_unit * Decimal::from(aggregate),
            quantity: aggregate,
        };
        let mutation = self.store.upsert(&risk.product_id, risk.clone());
        self.listeners.notify_upsert(mutation, &risk)
    }

    /// Roll up pv01 and quantity over a sector's products; products with no
    /// stored risk contribute zero. The result is keyed by the sector name.
    pub fn bucketed_risk(&self, sector: &BucketedSector) -> Pv01 {
        let mut total = Decimal::ZERO;
        let mut quantity = 0i64;
        for product_id in &sector.products {
            if let Some(risk) = self.store.peek(product_id) {
                total += risk.pv01;
                quantity += risk.quantity;
            }
        }
        Pv01 { product_id: sector.name.clone(), pv01: total, quantity }
    }
}

impl Listener<Position> for RiskService {
    fn process_add(&mut self, record: &Position) -> Result<(), PipelineError> {
        self.add_position(record)
    }

    fn process_update(&mut self, record: &Position) -> Result<(), PipelineError> {
        self.add_position(record)
    }

    /// Reverse the position's contribution; a zeroed aggregate erases the
    /// entry.
    fn process_remove(&mut self, record: &Position) -> Result<(), PipelineError> {
        let Some(existing) = self.store.peek(&record.product_id).cloned() else {
            return Ok(());
        };
        let per_unit = self.pv01_per_unit(&record.product_id)?;
        let aggregate = record.aggregate();
        let updated = Pv01 {
            product_id: record.product_id.clone(),
            pv01: existing.pv01 - per_unit * Decimal::from(aggregate),
            quantity: existing.quantity - aggregate,
        };
        if updated.quantity == 0 {
            self.store.remove(&record.product_id);
            self.listeners.notify_remove(&updated)
        } else {
            self.store.upsert(&record.product_id, updated.clone());
            self.listeners.notify_update(&updated)
        }
    }
}
