//! Mid/spread quote store.

use tsy_common::Price;

use crate::bus::{ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

/// Keyed store of the latest `Price` per product. No derived state: every
/// ingress replaces the entry and fans out Add or Update.
pub struct PricingService {
    store: KeyedStore<Price>,
    listeners: ListenerSet<Price>,
}

impl Default for PricingService {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingService {
    pub fn new() -> Self {
        Self {
            store: KeyedStore::new("pricing"),
            listeners: ListenerSet::new(),
        }
    }

    pub fn get_data(&self, product_id: &str) -> Result<Price, PipelineError> {
        self.store.get(product_id)
    }

    pub fn on_message(&mut self, price: Price) -> Result<(), PipelineError> {
        let mutation = self.store.upsert(&price.product_id, price.clone());
        self.listeners.notify_upsert(mutation, &price)
    }

    /// Delete a product's quote, notifying listeners.
    pub fn remove(&mut self, product_id: &str) -> Result<(), PipelineError> {
        match self.store.remove(product_id) {
            Some(price) => self.listeners.notify_remove(&price),
            None => Err(PipelineError::KeyNotFound {
                service: "pricing",
                key: product_id.to_string(),
            }),
        }
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<Price>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<Price> {
        &self.listeners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::{kinds, EventKind, Recorder};
    use rust_decimal_macros::dec;

    fn px(mid: rust_decimal::Decimal) -> Price {
        Price::new("T2Y", mid, dec!(0.03125))
    }

    #[test]
    fn replay_yields_add_then_update() {
        let mut svc = PricingService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        svc.on_message(px(dec!(99.5))).unwrap();
        svc.on_message(px(dec!(99.5))).unwrap();

        assert_eq!(kinds(&recorder.borrow()), vec![EventKind::Add, EventKind::Update]);
        assert_eq!(svc.get_data("T2Y").unwrap().mid, dec!(99.5));
    }

    #[test]
    fn stored_record_tracks_latest_input() {
        let mut svc = PricingService::new();
        svc.on_message(px(dec!(99.5))).unwrap();
        svc.on_message(px(dec!(100.25))).unwrap();
        assert_eq!(svc.get_data("T2Y").unwrap().mid, dec!(100.25));
    }

    #[test]
    fn remove_notifies_and_clears() {
        let mut svc = PricingService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        svc.on_message(px(dec!(99.5))).unwrap();
        svc.remove("T2Y").unwrap();

        assert_eq!(
            kinds(&recorder.borrow()),
            vec![EventKind::Add, EventKind::Remove]
        );
        assert!(svc.get_data("T2Y").is_err());
        assert!(svc.remove("T2Y").is_err());
    }
}
