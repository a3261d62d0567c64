//! Customer inquiry state machine.

use rust_decimal::Decimal;
use tsy_common::{Inquiry, InquiryState};

use crate::bus::{ListenerHandle, ListenerSet};
use crate::error::PipelineError;
use crate::store::KeyedStore;

/// The house quote for every inquiry.
const QUOTE_PRICE: Decimal = Decimal::ONE_HUNDRED;

/// Drives each inquiry through Received -> Quoted -> Done by re-entering
/// `on_message` with records built in a local first, so the keyed store
/// tolerates the overwrite-in-progress. Listeners observe exactly
/// Add(Received), Update(Quoted), Update(Done) for every received inquiry.
pub struct InquiryService {
    store: KeyedStore<Inquiry>,
    listeners: ListenerSet<Inquiry>,
}

impl Default for InquiryService {
    fn default() -> Self {
        Self::new()
    }
}

impl InquiryService {
    pub fn new() -> Self {
        Self {
            store: KeyedStore::new("inquiry"),
            listeners: ListenerSet::new(),
        }
    }

    pub fn get_data(&self, inquiry_id: &str) -> Result<Inquiry, PipelineError> {
        self.store.get(inquiry_id)
    }

    pub fn add_listener(&mut self, listener: ListenerHandle<Inquiry>) {
        self.listeners.add(listener);
    }

    pub fn listeners(&self) -> &ListenerSet<Inquiry> {
        &self.listeners
    }

    pub fn on_message(&mut self, inquiry: Inquiry) -> Result<(), PipelineError> {
        let mutation = self.store.upsert(&inquiry.inquiry_id, inquiry.clone());
        self.listeners.notify_upsert(mutation, &inquiry)?;

        match inquiry.state {
            InquiryState::Received => self.send_quote(&inquiry.inquiry_id, QUOTE_PRICE)?,
            InquiryState::Quoted => {
                let done = Inquiry { state: InquiryState::Done, ..inquiry };
                self.on_message(done)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Respond to a stored inquiry with a price, re-entering `on_message`
    /// with the quoted record.
    pub fn send_quote(&mut self, inquiry_id: &str, price: Decimal) -> Result<(), PipelineError> {
        let stored = self.store.get(inquiry_id)?;
        let quoted = Inquiry { price, state: InquiryState::Quoted, ..stored };
        self.on_message(quoted)
    }

    /// Reject a stored inquiry, publishing an Update.
    pub fn reject_inquiry(&mut self, inquiry_id: &str) -> Result<(), PipelineError> {
        let stored = self.store.get(inquiry_id)?;
        let rejected = Inquiry { state: InquiryState::Rejected, ..stored };
        self.store.upsert(inquiry_id, rejected.clone());
        self.listeners.notify_update(&rejected)
    }
}
