//! Heartbeat task

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::outbound::Outbound;
use crate::protocol::ClientCommand;

/// Spawn the ping loop; the first ping goes out immediately
///
/// The loop ends by itself once a send fails. The owning connection aborts it
/// on close.
pub(crate) fn spawn(outbound: Arc<Outbound>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = outbound.send(&ClientCommand::ping(None)).await {
                tracing::debug!(error = %e, "Heartbeat stopped");
                break;
            }

            tracing::trace!(interval_ms = interval.as_millis() as u64, "Heartbeat sent");
        }
    })
}
