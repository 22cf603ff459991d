//! Event dispatcher
//!
//! Routes applied events to the listeners registered for their type and for every
//! ancestor type. Each listener runs as its own tokio task.

use dashmap::DashMap;
use futures::future::{self, FutureExt};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::listener::{Listener, ListenerId, RegistrationError};
use crate::events::{Event, EventType, EventVariant};

/// Per-type listener registry
pub struct EventDispatcher {
    /// Listeners by the event type they were registered for
    listeners: DashMap<EventType, Vec<(ListenerId, Listener)>>,
    /// Source of listener ids
    next_id: AtomicU64,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// Create an empty dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create an empty dispatcher wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a listener; its parameter type selects the event type
    ///
    /// Use a payload type such as `MessageEvent` for one event type, or [`Event`]
    /// to receive every event.
    pub fn add_listener<E, F, Fut>(&self, listener: F) -> ListenerId
    where
        E: EventVariant,
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.insert(
            E::TYPE,
            Arc::new(move |event: Arc<Event>| match E::from_event(&event) {
                Some(variant) => listener(variant.clone()).boxed(),
                None => future::ready(Ok(())).boxed(),
            }),
        )
    }

    /// Register a listener for an explicit event type
    pub fn add_listener_for<F, Fut>(&self, event_type: EventType, listener: F) -> ListenerId
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.insert(
            event_type,
            Arc::new(move |event: Arc<Event>| listener(event).boxed()),
        )
    }

    /// Register a listener by event type name
    pub fn add_listener_named<F, Fut>(
        &self,
        name: &str,
        listener: F,
    ) -> Result<ListenerId, RegistrationError>
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let event_type = EventType::from_name(name)
            .ok_or_else(|| RegistrationError::UnknownEventType(name.to_string()))?;
        Ok(self.add_listener_for(event_type, listener))
    }

    fn insert(&self, event_type: EventType, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .entry(event_type)
            .or_default()
            .push((id, listener));

        tracing::debug!(listener_id = %id, event_type = %event_type, "Listener registered");

        id
    }

    /// Remove a listener, returns whether it was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut removed = false;
        for mut entry in self.listeners.iter_mut() {
            let before = entry.len();
            entry.retain(|(listener_id, _)| *listener_id != id);
            removed |= entry.len() != before;
        }
        self.listeners.retain(|_, listeners| !listeners.is_empty());
        removed
    }

    /// Remove every listener
    pub fn clear(&self) {
        self.listeners.clear();
    }

    /// Number of listeners registered directly for a type
    pub fn listener_count(&self, event_type: EventType) -> usize {
        self.listeners.get(&event_type).map_or(0, |l| l.value().len())
    }

    /// Spawn every listener of the event's type and its ancestors
    ///
    /// Returns the number of listener tasks spawned. Listener errors and panics
    /// are logged and never reach the caller.
    pub fn dispatch(&self, event: Event) -> usize {
        let event = Arc::new(event);
        let event_type = event.event_type();

        // Collect first so no registry lock is held while spawning
        let targets: Vec<(ListenerId, Listener)> = event_type
            .lineage()
            .filter_map(|t| self.listeners.get(&t).map(|l| l.value().clone()))
            .flatten()
            .collect();

        tracing::trace!(
            event_type = %event.type_name(),
            listeners = targets.len(),
            "Dispatching event"
        );

        let spawned = targets.len();
        for (id, listener) in targets {
            let event = Arc::clone(&event);
            tokio::spawn(async move {
                let type_name = event.type_name().to_string();
                match AssertUnwindSafe(listener(event)).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::error!(
                            listener_id = %id,
                            event_type = %type_name,
                            error = %e,
                            "Listener failed"
                        );
                    }
                    Err(_) => {
                        tracing::error!(
                            listener_id = %id,
                            event_type = %type_name,
                            "Listener panicked"
                        );
                    }
                }
            });
        }

        spawned
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("event_types", &self.listeners.len())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}
