//! Two-sided stream derivation from incoming quotes.

use std::collections::HashMap;

use tsy_common::{Price, PriceStream, PriceStreamOrder, QuoteSide};

use crate::bus::{Listener, ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

const BASE_VISIBLE_QTY: i64 = 1_000_000;

/// Derives a `PriceStream` from each incoming `Price`: bid and offer sit a
/// half spread off the mid, and the visible size alternates per product
/// between 1mm and 2mm on successive updates (hidden is always double).
pub struct AlgoStreamingService {
    store: KeyedStore<PriceStream>,
    listeners: ListenerSet<PriceStream>,
    /// Per-product flag; set means the next emission uses the base size.
    next_is_base: HashMap<String, bool>,
}

impl Default for AlgoStreamingService {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgoStreamingService {
    pub fn new() -> Self {
        Self {
            store: KeyedStore::new("algo-streaming"),
            listeners: ListenerSet::new(),
            next_is_base: HashMap::new(),
        }
    }

    pub fn get_data(&self, product_id: &str) -> Result<PriceStream, PipelineError> {
        self.store.get(product_id)
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<PriceStream>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<PriceStream> {
        &self.listeners
    }

    fn next_visible_qty(&mut self, product_id: &str) -> i64 {
        let flag = self.next_is_base.entry(product_id.to_string()).or_insert(true);
        let qty = if *flag { BASE_VISIBLE_QTY } else { 2 * BASE_VISIBLE_QTY };
        *flag = !*flag;
        qty
    }

    fn publish(&mut self, price: &Price) -> Result<(), PipelineError> {
        let visible = self.next_visible_qty(&price.product_id);
        let stream = PriceStream {
            product_id: price.product_id.clone(),
            bid: PriceStreamOrder::new(price.bid(), visible, QuoteSide::Bid),
            offer: PriceStreamOrder::new(price.offer(), visible, QuoteSide::Offer),
        };
        let mutation = self.store.upsert(&stream.product_id, stream.clone());
        self.listeners.notify_upsert(mutation, &stream)
    }
}

impl Listener<Price> for AlgoStreamingService {
    fn process_add(&mut self, record: &Price) -> Result<(), PipelineError> {
        self.publish(record)
    }

    fn process_update(&mut self, record: &Price) -> Result<(), PipelineError> {
        self.publish(record)
    }

    fn process_remove(&mut self, _record: &Price) -> Result<(), PipelineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::{kinds, EventKind, Recorder};
    use rust_decimal_macros::dec;

    fn price(product: &str, mid: rust_decimal::Decimal, spread: rust_decimal::Decimal) -> Price {
        Price::new(product, mid, spread)
    }

    #[test]
    fn derives_symmetric_two_sided_stream() {
        // mid 99-16+ with a one-tick spread.
        let mut svc = AlgoStreamingService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        svc.process_add(&price("T2Y", dec!(99.515625), dec!(0.00390625)))
            .unwrap();

        let recorder = recorder.borrow();
        let (_, stream) = &recorder.events[0];
        assert_eq!(stream.bid.price, dec!(99.513671875));
        assert_eq!(stream.offer.price, dec!(99.517578125));
        assert_eq!(stream.bid.visible_qty, 1_000_000);
        assert_eq!(stream.bid.hidden_qty, 2_000_000);
        assert_eq!(stream.offer.visible_qty, 1_000_000);
        assert_eq!(stream.offer.hidden_qty, 2_000_000);
        assert_eq!(stream.bid.price + stream.offer.price, dec!(2) * dec!(99.515625));
        assert!(stream.bid.price < stream.offer.price);
    }

    #[test]
    fn visible_size_alternates_per_product() {
        let mut svc = AlgoStreamingService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        let px = price("T2Y", dec!(99.5), dec!(0.03125));
        for _ in 0..4 {
            svc.process_update(&px).unwrap();
        }
        // A second product has its own toggle starting at the base size.
        svc.process_add(&price("T5Y", dec!(100), dec!(0.03125))).unwrap();

        let recorder = recorder.borrow();
        let sizes: Vec<i64> = recorder
            .events
            .iter()
            .filter(|(_, s)| s.product_id == "T2Y")
            .map(|(_, s)| s.bid.visible_qty)
            .collect();
        assert_eq!(sizes, vec![1_000_000, 2_000_000, 1_000_000, 2_000_000]);

        let (_, t5y) = recorder
            .events
            .iter()
            .find(|(_, s)| s.product_id == "T5Y")
            .unwrap();
        assert_eq!(t5y.bid.visible_qty, 1_000_000);

        for (_, stream) in &recorder.events {
            assert_eq!(stream.bid.hidden_qty, 2 * stream.bid.visible_qty);
            assert_eq!(stream.offer.hidden_qty, 2 * stream.offer.visible_qty);
        }
    }

    #[test]
    fn first_emission_is_add_then_updates() {
        let mut svc = AlgoStreamingService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        let px = price("T2Y", dec!(99.5), dec!(0.03125));
        svc.process_add(&px).unwrap();
        svc.process_update(&px).unwrap();
        svc.process_remove(&px).unwrap();

        assert_eq!(kinds(&recorder.borrow()), vec![EventKind::Add, EventKind::Update]);
    }
}
