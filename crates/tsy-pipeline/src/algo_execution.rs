//! Spread-crossing execution signal.

use rust_decimal::Decimal;
use tracing::warn;
use tsy_common::{ExecutionOrder, OrderBook, OrderType, QuoteSide};

use crate::bus::{Listener, ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

/// Widest top-of-book spread that still gets aggressed: 1/128 of a dollar.
/// The 1/256 price grid is exact in `Decimal`, so the comparison needs no
/// tolerance.
const MAX_AGGRESS_SPREAD: Decimal = Decimal::from_parts(78_125, 0, 0, false, 7);

/// Watches each incoming book and, when the top-of-book spread is at most
/// 1/128, emits an aggressing MARKET order against one side. The aggressed
/// side alternates across the whole service, not per product, so book load
/// stays uniform.
pub struct AlgoExecutionService {
    store: KeyedStore<ExecutionOrder>,
    listeners: ListenerSet<ExecutionOrder>,
    aggress_offer_next: bool,
}

impl Default for AlgoExecutionService {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgoExecutionService {
    pub fn new() -> Self {
        Self {
            store: KeyedStore::new("algo-execution"),
            listeners: ListenerSet::new(),
            aggress_offer_next: false,
        }
    }

    pub fn get_data(&self, product_id: &str) -> Result<ExecutionOrder, PipelineError> {
        self.store.get(product_id)
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<ExecutionOrder>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<ExecutionOrder> {
        &self.listeners
    }

    fn evaluate(&mut self, book: &OrderBook) -> Result<(), PipelineError> {
        let (bid, offer) = match (book.best_bid(), book.best_offer()) {
            (Some(bid), Some(offer)) => (*bid, *offer),
            _ => {
                warn!(product = %book.product_id, "order book has an empty side, skipping");
                return Ok(());
            }
        };

        if offer.price - bid.price > MAX_AGGRESS_SPREAD {
            return Ok(());
        }

        let side = if self.aggress_offer_next {
            QuoteSide::Offer
        } else {
            QuoteSide::Bid
        };
        self.aggress_offer_next = !self.aggress_offer_next;

        let top = match side {
            QuoteSide::Bid => bid,
            QuoteSide::Offer => offer,
        };
        let order = ExecutionOrder {
            order_id: book.product_id.clone(),
            product_id: book.product_id.clone(),
            side,
            order_type: OrderType::Market,
            price: top.price,
            visible_qty: top.quantity,
            hidden_qty: 0,
            parent_order_id: None,
            is_child: false,
        };

        let mutation = self.store.upsert(&order.order_id, order.clone());
        self.listeners.notify_upsert(mutation, &order)
    }
}

impl Listener<OrderBook> for AlgoExecutionService {
    fn process_add(&mut self, record: &OrderBook) -> Result<(), PipelineError> {
        self.evaluate(record)
    }

    fn process_update(&mut self, record: &OrderBook) -> Result<(), PipelineError> {
        self.evaluate(record)
    }

    fn process_remove(&mut self, record: &OrderBook) -> Result<(), PipelineError> {
        self.store.remove(&record.product_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::{kinds, EventKind, Recorder};
    use rust_decimal_macros::dec;
    use tsy_common::DepthOrder;

    fn book(product: &str, bid: Decimal, bid_qty: i64, offer: Decimal, offer_qty: i64) -> OrderBook {
        OrderBook::new(
            product,
            vec![DepthOrder::new(bid, bid_qty, QuoteSide::Bid)],
            vec![DepthOrder::new(offer, offer_qty, QuoteSide::Offer)],
        )
    }

    #[test]
    fn wide_spread_is_ignored() {
        let mut svc = AlgoExecutionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        // 4/256 spread is wider than 1/128.
        svc.process_add(&book("T3Y", dec!(100), 5_000_000, dec!(100.015625), 4_000_000))
            .unwrap();

        assert!(recorder.borrow().events.is_empty());
        assert!(svc.get_data("T3Y").is_err());
    }

    #[test]
    fn tight_spread_aggresses_the_bid_first() {
        let mut svc = AlgoExecutionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        // 1/256 spread: inside the threshold.
        svc.process_add(&book("T3Y", dec!(100), 5_000_000, dec!(100.00390625), 4_000_000))
            .unwrap();

        let recorder = recorder.borrow();
        let (kind, order) = &recorder.events[0];
        assert_eq!(*kind, EventKind::Add);
        assert_eq!(order.side, QuoteSide::Bid);
        assert_eq!(order.price, dec!(100));
        assert_eq!(order.visible_qty, 5_000_000);
        assert_eq!(order.hidden_qty, 0);
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.order_id, "T3Y");
        assert!(order.parent_order_id.is_none());
        assert!(!order.is_child);
    }

    #[test]
    fn exact_boundary_spread_still_aggresses() {
        let mut svc = AlgoExecutionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        // Exactly 1/128.
        svc.process_add(&book("T3Y", dec!(100), 1_000, dec!(100.0078125), 1_000))
            .unwrap();
        assert_eq!(recorder.borrow().events.len(), 1);
    }

    #[test]
    fn aggressed_side_alternates_across_products() {
        let mut svc = AlgoExecutionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        let tight = |p: &str| book(p, dec!(100), 1_000, dec!(100.00390625), 2_000);
        svc.process_add(&tight("T3Y")).unwrap();
        svc.process_add(&tight("T5Y")).unwrap();
        svc.process_update(&tight("T3Y")).unwrap();

        let recorder = recorder.borrow();
        let sides: Vec<QuoteSide> = recorder.events.iter().map(|(_, o)| o.side).collect();
        assert_eq!(sides, vec![QuoteSide::Bid, QuoteSide::Offer, QuoteSide::Bid]);

        // The offer aggress takes the offer top's quantity.
        assert_eq!(recorder.events[1].1.visible_qty, 2_000);
    }

    #[test]
    fn empty_side_is_a_logged_no_op() {
        let mut svc = AlgoExecutionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        svc.process_add(&OrderBook::new("T3Y", vec![], vec![]))
            .unwrap();
        assert!(recorder.borrow().events.is_empty());
    }

    #[test]
    fn repeat_signal_for_a_product_is_an_update() {
        let mut svc = AlgoExecutionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        let tight = book("T3Y", dec!(100), 1_000, dec!(100.00390625), 2_000);
        svc.process_add(&tight).unwrap();
        svc.process_update(&tight).unwrap();

        assert_eq!(kinds(&recorder.borrow()), vec![EventKind::Add, EventKind::Update]);
    }
}
