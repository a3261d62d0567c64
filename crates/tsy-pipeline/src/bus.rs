//! Listener wiring between services.
//!
//! Services publish typed records to listeners registered on them; a listener
//! may itself be a service, so outputs chain. Everything runs synchronously
//! on the calling stack: a handler finishes (including its own downstream
//! publications) before the next listener in registration order is invoked.
//!
//! Handles are `Rc<RefCell<…>>` because the whole graph is single-threaded.
//! A topology that routed a record back into a service already on the call
//! stack would trip `RefCell`'s borrow check immediately, which is exactly
//! the cycle rejection the pipeline contract requires.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::PipelineError;
use crate::store::Mutation;

/// Receiver of one record type's add/update/remove notifications.
///
/// Structural failures propagate; per-record problems are expected to be
/// logged by the listener and swallowed.
pub trait Listener<T> {
    fn process_add(&mut self, record: &T) -> Result<(), PipelineError>;

    fn process_update(&mut self, record: &T) -> Result<(), PipelineError>;

    fn process_remove(&mut self, record: &T) -> Result<(), PipelineError>;
}

/// Shared handle to a listener of `T`.
pub type ListenerHandle<T> = Rc<RefCell<dyn Listener<T>>>;

/// Listeners of one record type, notified in registration order.
pub struct ListenerSet<T> {
    listeners: Vec<ListenerHandle<T>>,
}

impl<T> Default for ListenerSet<T> {
    fn default() -> Self {
        Self { listeners: Vec::new() }
    }
}

impl<T> ListenerSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, listener: ListenerHandle<T>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn notify_add(&self, record: &T) -> Result<(), PipelineError> {
        for listener in &self.listeners {
            listener.borrow_mut().process_add(record)?;
        }
        Ok(())
    }

    pub fn notify_update(&self, record: &T) -> Result<(), PipelineError> {
        for listener in &self.listeners {
            listener.borrow_mut().process_update(record)?;
        }
        Ok(())
    }

    pub fn notify_remove(&self, record: &T) -> Result<(), PipelineError> {
        for listener in &self.listeners {
            listener.borrow_mut().process_remove(record)?;
        }
        Ok(())
    }

    /// Fan out Add or Update according to a store mutation.
    pub fn notify_upsert(&self, mutation: Mutation, record: &T) -> Result<(), PipelineError> {
        match mutation {
            Mutation::Added => self.notify_add(record),
            Mutation::Updated => self.notify_update(record),
        }
    }
}
