//! Per-book position aggregation from booked trades.

use tsy_common::{Position, Trade};

use crate::bus::{Listener, ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

/// Maintains signed per-book quantities per product. Buys add, sells
/// subtract; the aggregate is the sum over books.
pub struct PositionService {
    store: KeyedStore<Position>,
    listeners: ListenerSet<Position>,
}

impl Default for PositionService {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionService {
    pub fn new() -> Self {
        Self {
            store: KeyedStore::new("position"),
            listeners: ListenerSet::new(),
        }
    }

    pub fn get_data(&self, product_id: &str) -> Result<Position, PipelineError> {
        self.store.get(product_id)
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<Position>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<Position> {
        &self.listeners
    }

    /// Apply a booked trade to the product's position.
    pub fn add_trade(&mut self, trade: &Trade) -> Result<(), PipelineError> {
        let product_id = &trade.product_id;
        let is_new = !self.store.contains(product_id);

        let mut position = self
            .store
            .peek(product_id)
            .cloned()
            .unwrap_or_else(|| Position::new(product_id.clone()));
        position.apply(&trade.book, trade.signed_quantity());
        self.store.upsert(product_id, position.clone());

        if is_new {
            self.listeners.notify_add(&position)
        } else {
            self.listeners.notify_update(&position)
        }
    }
}

impl Listener<Trade> for PositionService {
    fn process_add(&mut self, record: &Trade) -> Result<(), PipelineError> {
        self.add_trade(record)
    }

    fn process_update(&mut self, record: &Trade) -> Result<(), PipelineError> {
        self.add_trade(record)
    }

    /// A removed trade is reversed out of the position.
    fn process_remove(&mut self, record: &Trade) -> Result<(), PipelineError> {
        let Some(mut position) = self.store.peek(&record.product_id).cloned() else {
            return Ok(());
        };
        position.apply(&record.book, -record.signed_quantity());
        self.store.upsert(&record.product_id, position.clone());
        self.listeners.notify_update(&position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::{kinds, EventKind, Recorder};
    use rust_decimal_macros::dec;
    use tsy_common::Side;

    fn trade(id: &str, book: &str, qty: i64, side: Side) -> Trade {
        Trade {
            trade_id: id.to_string(),
            product_id: "T5Y".to_string(),
            price: dec!(99.5),
            book: book.to_string(),
            quantity: qty,
            side,
        }
    }

    #[test]
    fn buys_and_sells_net_across_books() {
        let mut svc = PositionService::new();
        svc.add_trade(&trade("TRADE_1", "TRSY1", 1_000, Side::Buy)).unwrap();
        svc.add_trade(&trade("TRADE_2", "TRSY2", 2_000, Side::Sell)).unwrap();

        let position = svc.get_data("T5Y").unwrap();
        assert_eq!(position.books["TRSY1"], 1_000);
        assert_eq!(position.books["TRSY2"], -2_000);
        assert_eq!(position.aggregate(), -1_000);
    }

    #[test]
    fn aggregate_equals_sum_of_signed_trades() {
        let mut svc = PositionService::new();
        let trades = [
            trade("TRADE_1", "TRSY1", 1_000, Side::Buy),
            trade("TRADE_2", "TRSY2", 500, Side::Buy),
            trade("TRADE_3", "TRSY3", 2_500, Side::Sell),
            trade("TRADE_4", "TRSY1", 750, Side::Buy),
        ];
        for t in &trades {
            svc.add_trade(t).unwrap();
        }

        let expected: i64 = trades.iter().map(|t| t.signed_quantity()).sum();
        assert_eq!(svc.get_data("T5Y").unwrap().aggregate(), expected);
    }

    #[test]
    fn first_product_is_add_then_update() {
        let mut svc = PositionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        svc.process_add(&trade("TRADE_1", "TRSY1", 100, Side::Buy)).unwrap();
        svc.process_update(&trade("TRADE_2", "TRSY1", 200, Side::Buy)).unwrap();

        assert_eq!(kinds(&recorder.borrow()), vec![EventKind::Add, EventKind::Update]);
    }

    #[test]
    fn remove_reverses_and_forwards_update() {
        let mut svc = PositionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        let t = trade("TRADE_1", "TRSY1", 1_000, Side::Buy);
        svc.process_add(&t).unwrap();
        svc.process_remove(&t).unwrap();

        assert_eq!(kinds(&recorder.borrow()), vec![EventKind::Add, EventKind::Update]);
        assert_eq!(svc.get_data("T5Y").unwrap().aggregate(), 0);
    }

    #[test]
    fn remove_for_unknown_product_is_ignored() {
        let mut svc = PositionService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());
        svc.process_remove(&trade("TRADE_1", "TRSY1", 1_000, Side::Buy)).unwrap();
        assert!(recorder.borrow().events.is_empty());
    }
}
