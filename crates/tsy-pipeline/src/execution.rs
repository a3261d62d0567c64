//! Multi-venue order routing and trade emission.

use std::collections::HashSet;

use tracing::warn;
use tsy_common::{ExecutionOrder, OrderType, Trade, TRADE_BOOKS, VENUES};

use crate::bus::{Listener, ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

/// Per-venue routing verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Executed,
    Cancelled,
    Rejected,
}

/// Routes each incoming order across the venue ladder and emits a `Trade`
/// on execution. Executed trades rotate across the internal accounting
/// books through a single service-wide cursor.
pub struct ExecutionService {
    store: KeyedStore<ExecutionOrder>,
    listeners: ListenerSet<Trade>,
    book_cursor: usize,
    /// Order ids that have already produced a trade, for Add vs Update.
    traded: HashSet<String>,
}

impl Default for ExecutionService {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionService {
    pub fn new() -> Self {
        Self {
            store: KeyedStore::new("execution"),
            listeners: ListenerSet::new(),
            book_cursor: 0,
            traded: HashSet::new(),
        }
    }

    pub fn get_data(&self, order_id: &str) -> Result<ExecutionOrder, PipelineError> {
        self.store.get(order_id)
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<Trade>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<Trade> {
        &self.listeners
    }

    /// Route one order across the venues.
    pub fn execute(&mut self, order: &ExecutionOrder) -> Result<(), PipelineError> {
        if order.is_child {
            let parent = order.parent_order_id.as_deref().unwrap_or_default();
            if !self.store.contains(parent) {
                warn!(
                    order_id = %order.order_id,
                    parent_id = %parent,
                    "dropping child order with unknown parent"
                );
                return Ok(());
            }
        }
        self.store.upsert(&order.order_id, order.clone());

        let effective = order.effective_qty();
        let mut verdict = Verdict::Rejected;
        for venue in VENUES {
            verdict = match order.order_type {
                OrderType::Fok => {
                    if effective >= order.visible_qty {
                        Verdict::Executed
                    } else {
                        Verdict::Cancelled
                    }
                }
                OrderType::Ioc => {
                    if effective > 0 {
                        Verdict::Executed
                    } else {
                        Verdict::Cancelled
                    }
                }
                OrderType::Market => Verdict::Executed,
                // No price-to-book comparison is made for resting types.
                OrderType::Limit | OrderType::Stop => Verdict::Rejected,
            };
            match verdict {
                Verdict::Executed => break,
                Verdict::Cancelled => {
                    warn!(order_id = %order.order_id, %venue, "order cancelled");
                    return Ok(());
                }
                Verdict::Rejected => {
                    warn!(order_id = %order.order_id, %venue, "order rejected");
                }
            }
        }
        if verdict != Verdict::Executed {
            return Ok(());
        }

        let book = TRADE_BOOKS[self.book_cursor];
        self.book_cursor = (self.book_cursor + 1) % TRADE_BOOKS.len();

        let trade = Trade {
            trade_id: format!("TRADE_{}", order.order_id),
            product_id: order.product_id.clone(),
            price: order.price,
            book: book.to_string(),
            quantity: order.visible_qty,
            side: order.side.aggressor_trade_side(),
        };

        if self.traded.insert(order.order_id.clone()) {
            self.listeners.notify_add(&trade)
        } else {
            self.listeners.notify_update(&trade)
        }
    }
}

impl Listener<ExecutionOrder> for ExecutionService {
    fn process_add(&mut self, record: &ExecutionOrder) -> Result<(), PipelineError> {
        self.execute(record)
    }

    fn process_update(&mut self, record: &ExecutionOrder) -> Result<(), PipelineError> {
        self.execute(record)
    }

    fn process_remove(&mut self, record: &ExecutionOrder) -> Result<(), PipelineError> {
        self.store.remove(&record.order_id);
        Ok(())
    }
}
