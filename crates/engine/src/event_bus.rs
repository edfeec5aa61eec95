// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe for orchestration events.
//!
//! Each subscriber gets its own unbounded channel so a slow reader never
//! blocks the emitter (monitors emit while holding the registry lock).
//! Unsubscribing is explicit and idempotent; dropping a [`Subscription`]
//! unsubscribes too.

use ah_core::Event;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: HashMap<u64, mpsc::UnboundedSender<Event>>,
}

/// Fan-out event bus
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusState>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every live subscriber.
    pub fn emit(&self, event: Event) {
        tracing::debug!(event = %event.log_summary(), "emit");
        let mut inner = self.inner.lock();
        inner
            .subscribers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.insert(id, tx);
        Subscription {
            id,
            rx,
            bus: Arc::downgrade(&self.inner),
            active: true,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

/// A registered observer; also the unsubscribe handle.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<Event>,
    bus: Weak<Mutex<BusState>>,
    active: bool,
}

impl Subscription {
    /// Next event, or `None` once unsubscribed (after draining anything
    /// already delivered) or the bus is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Event> {
        self.rx.try_recv().ok()
    }

    /// Stop receiving new events. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(bus) = self.bus.upgrade() {
            bus.lock().subscribers.remove(&self.id);
        }
        self.rx.close();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
