//! Explicit resize subscription owned by the host component.
//!
//! Replaces ambient global resize listeners: the host owns a [`ResizeBus`],
//! publishes measured container widths into it, and every subscriber holds
//! a disposer handle that unregisters on drop.

use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

type ResizeCallback = Box<dyn FnMut(f32) + Send>;

struct Subscriber {
    id: u64,
    callback: ResizeCallback,
}

#[derive(Default)]
struct BusState {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Resize fan-out owned by the host component.
#[derive(Clone, Default)]
pub struct ResizeBus {
    state: Arc<Mutex<BusState>>,
}

impl ResizeBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for width updates.
    ///
    /// Dropping the returned subscription unregisters the callback.
    pub fn subscribe(&self, callback: impl FnMut(f32) + Send + 'static) -> ResizeSubscription {
        let mut state = lock(&self.state);
        let id = state.next_id;
        state.next_id += 1;
        state.subscribers.push(Subscriber {
            id,
            callback: Box::new(callback),
        });
        ResizeSubscription {
            state: Arc::clone(&self.state),
            id,
        }
    }

    /// Publish a measured container width to live subscribers, in
    /// subscription order.
    pub fn publish(&self, width_px: f32) {
        let mut state = lock(&self.state);
        for subscriber in state.subscribers.iter_mut() {
            (subscriber.callback)(width_px);
        }
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        lock(&self.state).subscribers.len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ResizeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

/// Disposer handle for one resize subscription.
pub struct ResizeSubscription {
    state: Arc<Mutex<BusState>>,
    id: u64,
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        lock(&self.state)
            .subscribers
            .retain(|subscriber| subscriber.id != self.id);
    }
}

impl fmt::Debug for ResizeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeSubscription")
            .field("id", &self.id)
            .finish()
    }
}

fn lock(state: &Arc<Mutex<BusState>>) -> MutexGuard<'_, BusState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
