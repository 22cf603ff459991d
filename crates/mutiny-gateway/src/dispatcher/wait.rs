//! One-shot waits for a matching event

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use super::dispatcher::EventDispatcher;
use super::listener::ListenerId;
use crate::events::{Event, EventVariant};

/// Why a wait ended without an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WaitError {
    #[error("No matching event within {0:?}")]
    Timeout(Duration),

    #[error("Wait cancelled before a matching event arrived")]
    Cancelled,
}

/// Removes the temporary listener however the wait ends
struct ListenerGuard<'a> {
    dispatcher: &'a EventDispatcher,
    id: ListenerId,
}

impl Drop for ListenerGuard<'_> {
    fn drop(&mut self) {
        self.dispatcher.remove_listener(self.id);
    }
}

impl EventDispatcher {
    /// Wait for the next event of type `E` accepted by `predicate`
    ///
    /// With a timeout, `WaitError::Timeout` is returned once it elapses. The
    /// temporary listener is removed on success, timeout and cancellation.
    pub async fn wait_for<E, P>(
        &self,
        predicate: P,
        timeout: Option<Duration>,
    ) -> Result<E, WaitError>
    where
        E: EventVariant,
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        let (tx, rx) = oneshot::channel::<E>();
        let slot = Arc::new(Mutex::new(Some(tx)));

        let id = self.add_listener_for(E::TYPE, move |event: Arc<Event>| {
            if let Some(variant) = E::from_event(&event) {
                if predicate(variant) {
                    if let Some(tx) = slot.lock().take() {
                        // The waiter may already be gone
                        let _ = tx.send(variant.clone());
                    }
                }
            }
            futures::future::ready(Ok(()))
        });
        let _guard = ListenerGuard {
            dispatcher: self,
            id,
        };

        match timeout {
            Some(duration) => match tokio::time::timeout(duration, rx).await {
                Ok(Ok(event)) => Ok(event),
                Ok(Err(_)) => Err(WaitError::Cancelled),
                Err(_) => {
                    tracing::debug!(
                        listener_id = %id,
                        timeout_ms = duration.as_millis() as u64,
                        "Wait timed out"
                    );
                    Err(WaitError::Timeout(duration))
                }
            },
            None => rx.await.map_err(|_| WaitError::Cancelled),
        }
    }
}
