use crate::accessory::Accessory;
use crate::device::DeviceHandle;
use crate::error::{AccessoryError, Result};
use crate::subscription::DiscoveryReceiver;
use crate::types::DiscoveredDevice;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const STOP_GRACE: Duration = Duration::from_millis(500);

/// Notification from a discovery service
#[derive(Clone)]
pub enum DiscoveryEvent {
    /// A speaker appeared on the network
    Found(Arc<dyn DeviceHandle>),
    /// A speaker went offline
    Lost(DiscoveredDevice),
}

impl fmt::Debug for DiscoveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryEvent::Found(device) => f
                .debug_struct("Found")
                .field("name", &device.name())
                .field("address", &device.address())
                .finish(),
            DiscoveryEvent::Lost(device) => f.debug_tuple("Lost").field(device).finish(),
        }
    }
}

/// Source of speaker found/lost notifications on the local network
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// Start searching and return the event stream
    async fn search(&self) -> Result<DiscoveryReceiver>;

    /// Stop delivering found events
    async fn stop_searching(&self);
}

/// What a single discovery event did to an accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The speaker was bound to the accessory
    Bound,
    /// The speaker belongs to a different room
    Ignored,
    /// The accessory already had a speaker
    AlreadyBound,
    /// A speaker went offline; nothing changed
    Lost,
}

/// Apply one discovery event to an accessory
///
/// Only a found event whose name equals the room exactly binds, and only
/// the first one. Binding stops the search.
pub async fn handle_event(
    accessory: &Accessory,
    service: &dyn DiscoveryService,
    event: DiscoveryEvent,
) -> BindOutcome {
    match event {
        DiscoveryEvent::Found(device) => {
            if device.name() != accessory.room() {
                tracing::debug!(
                    "Ignoring device {} because it does not match room {}",
                    device.name(),
                    accessory.room()
                );
                return BindOutcome::Ignored;
            }

            tracing::info!("Found Bose SoundTouch device: {}", device.name());
            if !accessory.bind(device) {
                tracing::debug!("{} is already bound, ignoring", accessory.room());
                return BindOutcome::AlreadyBound;
            }

            service.stop_searching().await;
            BindOutcome::Bound
        }
        DiscoveryEvent::Lost(device) => {
            tracing::info!(
                "Bose SoundTouch device went offline: {} ({})",
                device.name,
                device.address
            );
            BindOutcome::Lost
        }
    }
}

/// Background task binding an accessory from a discovery service
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use soundtouch_accessory::{
///     Accessory, AccessoryConfig, CachedSurface, Definitions, DiscoveryBinding, DiscoveryService,
/// };
///
/// async fn serve(discovery: Arc<dyn DiscoveryService>) -> soundtouch_accessory::Result<()> {
///     let config = AccessoryConfig::from_json(r#"{"name": "Kitchen Speaker", "room": "Kitchen"}"#)?;
///     let surface = Arc::new(CachedSurface::new());
///     let accessory = Arc::new(Accessory::new(config, &Definitions::default(), surface)?);
///
///     let mut binding = DiscoveryBinding::start(accessory.clone(), discovery).await?;
///     // ... serve property requests through `accessory` ...
///     binding.stop().await;
///     Ok(())
/// }
/// ```
pub struct DiscoveryBinding {
    stop_tx: Option<broadcast::Sender<()>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl DiscoveryBinding {
    /// Start searching and bind the accessory when its speaker appears
    ///
    /// The task keeps running after binding so that lost events are still
    /// logged; it ends when stopped or when the service closes its stream.
    pub async fn start(
        accessory: Arc<Accessory>,
        service: Arc<dyn DiscoveryService>,
    ) -> Result<Self> {
        let mut receiver = service.search().await?;
        tracing::info!("Searching for SoundTouch device in room {}", accessory.room());

        let (stop_tx, _) = broadcast::channel(1);
        let mut stop_rx = stop_tx.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop_rx.recv() => {
                        tracing::info!("Discovery binding stopped");
                        break;
                    }
                    event = receiver.recv() => match event {
                        Ok(event) => {
                            handle_event(&accessory, service.as_ref(), event).await;
                        }
                        Err(AccessoryError::ChannelError(e)) => {
                            tracing::warn!("Missed discovery events: {}", e);
                        }
                        Err(e) => {
                            tracing::debug!("Discovery stream ended: {}", e);
                            break;
                        }
                    }
                }
            }
        });

        Ok(Self {
            stop_tx: Some(stop_tx),
            task_handle: Some(handle),
        })
    }

    /// Whether the background task is still running
    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the background task
    ///
    /// A task that does not finish within the grace period is aborted.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(mut handle) = self.task_handle.take() {
            if tokio::time::timeout(STOP_GRACE, &mut handle).await.is_err() {
                tracing::warn!(
                    "Discovery binding did not stop within {:?}, aborting",
                    STOP_GRACE
                );
                handle.abort();
            }
        }
    }
}

impl Drop for DiscoveryBinding {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}
