//! Trade capture, fed by the external trade file and by executions.

use tsy_common::Trade;

use crate::bus::{Listener, ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

/// Keyed store of booked trades. First observation of a trade id is an Add,
/// later observations are Updates; removes delete and forward.
pub struct TradeBookingService {
    store: KeyedStore<Trade>,
    listeners: ListenerSet<Trade>,
}

impl Default for TradeBookingService {
    fn default() -> Self {
        Self::new()
    }
}

impl TradeBookingService {
    pub fn new() -> Self {
        Self {
            store: KeyedStore::new("trade-booking"),
            listeners: ListenerSet::new(),
        }
    }

    pub fn get_data(&self, trade_id: &str) -> Result<Trade, PipelineError> {
        self.store.get(trade_id)
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<Trade>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<Trade> {
        &self.listeners
    }

    pub fn book_trade(&mut self, trade: Trade) -> Result<(), PipelineError> {
        self.on_message(trade)
    }

    pub fn on_message(&mut self, trade: Trade) -> Result<(), PipelineError> {
        let mutation = self.store.upsert(&trade.trade_id, trade.clone());
        self.listeners.notify_upsert(mutation, &trade)
    }
}

impl Listener<Trade> for TradeBookingService {
    fn process_add(&mut self, record: &Trade) -> Result<(), PipelineError> {
        self.book_trade(record.clone())
    }

    fn process_update(&mut self, record: &Trade) -> Result<(), PipelineError> {
        self.book_trade(record.clone())
    }

    fn process_remove(&mut self, record: &Trade) -> Result<(), PipelineError> {
        if self.store.remove(&record.trade_id).is_some() {
            self.listeners.notify_remove(record)?;
        }
        Ok(())
    }
}
