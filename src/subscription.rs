use crate::discovery::DiscoveryEvent;
use crate::error::{AccessoryError, Result};
use tokio::sync::broadcast;

/// Receiver for discovery events
pub struct DiscoveryReceiver {
    rx: broadcast::Receiver<DiscoveryEvent>,
}

impl DiscoveryReceiver {
    /// Wrap the receiving side of a discovery service's event channel
    pub fn new(rx: broadcast::Receiver<DiscoveryEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next discovery event
    ///
    /// Returns [`AccessoryError::ChannelClosed`] once the service has dropped
    /// its sender, and [`AccessoryError::ChannelError`] if events were missed.
    pub async fn recv(&mut self) -> Result<DiscoveryEvent> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => AccessoryError::ChannelClosed,
            broadcast::error::RecvError::Lagged(n) => {
                AccessoryError::ChannelError(format!("Lagged by {} events", n))
            }
        })
    }
}
