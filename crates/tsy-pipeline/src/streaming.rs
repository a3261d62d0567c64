//! Downstream republisher for derived price streams.

use tracing::warn;
use tsy_common::PriceStream;

use crate::bus::{Listener, ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

/// Destination for published streams (a market-facing gateway in a full
/// deployment; tests use an in-memory capture).
pub trait StreamPublisher {
    fn publish(&mut self, stream: &PriceStream) -> Result<(), PipelineError>;
}

/// Passthrough republisher with its own keyed store. When configured with a
/// publisher, the latest stream is additionally dispatched there; publisher
/// failures are logged and do not stop propagation.
pub struct StreamingService {
    store: KeyedStore<PriceStream>,
    listeners: ListenerSet<PriceStream>,
    publisher: Option<Box<dyn StreamPublisher>>,
}

impl Default for StreamingService {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingService {
    pub fn new() -> Self {
        Self {
            store: KeyedStore::new("streaming"),
            listeners: ListenerSet::new(),
            publisher: None,
        }
    }

    pub fn with_publisher(publisher: Box<dyn StreamPublisher>) -> Self {
        let mut svc = Self::new();
        svc.publisher = Some(publisher);
        svc
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

    /// Store and republish a two-way stream.
    pub fn publish_price(&mut self, stream: PriceStream) -> Result<(), PipelineError> {
        let mutation = self.store.upsert(&stream.product_id, stream.clone());
        if let Some(publisher) = &mut self.publisher {
            if let Err(err) = publisher.publish(&stream) {
                warn!(product = %stream.product_id, %err, "stream publisher failed");
            }
        }
        self.listeners.notify_upsert(mutation, &stream)
    }
}

impl Listener<PriceStream> for StreamingService {
    fn process_add(&mut self, record: &PriceStream) -> Result<(), PipelineError> {
        self.publish_price(record.clone())
    }

    fn process_update(&mut self, record: &PriceStream) -> Result<(), PipelineError> {
        self.publish_price(record.clone())
    }

    fn process_remove(&mut self, record: &PriceStream) -> Result<(), PipelineError> {
        if self.store.remove(&record.product_id).is_some() {
            self.listeners.notify_remove(record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::testing::{kinds, EventKind, Recorder};
    use rust_decimal_macros::dec;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tsy_common::{PriceStreamOrder, QuoteSide};

    fn stream(product: &str) -> PriceStream {
        PriceStream {
            product_id: product.to_string(),
            bid: PriceStreamOrder::new(dec!(99.4), 1_000_000, QuoteSide::Bid),
            offer: PriceStreamOrder::new(dec!(99.6), 1_000_000, QuoteSide::Offer),
        }
    }

    #[test]
    fn republish_is_add_then_update() {
        let mut svc = StreamingService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        svc.process_add(&stream("T2Y")).unwrap();
        svc.process_update(&stream("T2Y")).unwrap();

        assert_eq!(kinds(&recorder.borrow()), vec![EventKind::Add, EventKind::Update]);
        assert_eq!(svc.get_data("T2Y").unwrap(), stream("T2Y"));
    }

    #[test]
    fn dispatches_to_configured_publisher() {
        struct Capture(Rc<RefCell<Vec<String>>>);
        impl StreamPublisher for Capture {
            fn publish(&mut self, stream: &PriceStream) -> Result<(), PipelineError> {
                self.0.borrow_mut().push(stream.product_id.clone());
                Ok(())
            }
        }

        let published = Rc::new(RefCell::new(Vec::new()));
        let mut svc = StreamingService::with_publisher(Box::new(Capture(published.clone())));
        svc.publish_price(stream("T2Y")).unwrap();
        svc.publish_price(stream("T5Y")).unwrap();

        assert_eq!(*published.borrow(), vec!["T2Y".to_string(), "T5Y".to_string()]);
    }

    #[test]
    fn remove_forwards_only_when_stored() {
        let mut svc = StreamingService::new();
        let recorder = Recorder::handle();
        svc.add_listener(recorder.clone());

        svc.process_remove(&stream("T2Y")).unwrap();
        assert!(recorder.borrow().events.is_empty());

        svc.process_add(&stream("T2Y")).unwrap();
        svc.process_remove(&stream("T2Y")).unwrap();
        assert_eq!(kinds(&recorder.borrow()), vec![EventKind::Add, EventKind::Remove]);
    }
}
