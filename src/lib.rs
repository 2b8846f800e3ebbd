//! Home-automation accessory controller for Bose SoundTouch networked speakers
//!
//! This library bridges a home-automation host's property model to one
//! SoundTouch speaker. It provides:
//!
//! - Discovery binding: the first speaker whose name equals the configured
//!   room is bound, once
//! - Volume and mute (power) control with live reads
//! - Preset and AUX input toggles that keep sibling toggles consistent
//! - A data-driven property table built from host-supplied identifiers
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use soundtouch_accessory::{
//!     Accessory, AccessoryConfig, CachedSurface, Definitions, DiscoveryBinding,
//!     DiscoveryService, PropertyKind, PropertyValue,
//! };
//!
//! async fn run(discovery: Arc<dyn DiscoveryService>) -> soundtouch_accessory::Result<()> {
//!     let config = AccessoryConfig::from_json(r#"{"name": "Kitchen Speaker", "room": "Kitchen"}"#)?;
//!     let surface = Arc::new(CachedSurface::new());
//!     let accessory = Arc::new(Accessory::new(config, &Definitions::default(), surface.clone())?);
//!     surface.register(accessory.properties()).await;
//!
//!     let _binding = DiscoveryBinding::start(accessory.clone(), discovery).await?;
//!
//!     // Requests made before the speaker is found fail with `NotDiscovered`
//!     accessory.set(PropertyKind::Preset(2), PropertyValue::Bool(true)).await?;
//!     let volume = accessory.get(PropertyKind::Volume).await?;
//!     println!("Volume: {}", volume);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Accessory**: binding state and every property operation
//! - **Discovery**: found/lost handling and the background binding task
//! - **Property**: property identifiers, descriptors and the host-side cache
//! - **Device**: the speaker control interface implemented by transports
//! - **Protocol**: remote keys, constants and response bodies
//! - **Types**: domain types and data structures

mod accessory;
mod config;
mod device;
mod discovery;
mod error;
#[cfg(test)]
mod mock;
mod property;
mod protocol;
mod subscription;
mod types;

// Public exports
pub use accessory::Accessory;
pub use config::{AccessoryConfig, MomentaryReset};
pub use device::DeviceHandle;
pub use discovery::{handle_event, BindOutcome, DiscoveryBinding, DiscoveryEvent, DiscoveryService};
pub use error::{AccessoryError, Result};
pub use property::{
    CachedSurface, Definitions, Format, Perm, PropertyDescriptor, PropertyKind, PropertySurface,
    PropertyTable, PropertyValue, Range,
};
pub use protocol::{
    NowPlayingResponse, PresetList, PresetsResponse, RemoteKey, VolumeResponse, ACCESSORY_TYPE,
    AUX_INPUT_KEY, AUX_SOURCE, MANUFACTURER, MODEL, PLUGIN_NAME, PRESET_COUNT, PRESET_KEY_PREFIX,
};
pub use subscription::DiscoveryReceiver;
pub use types::{
    AccessoryInformation, ContentItem, DiscoveredDevice, NowPlaying, Preset, PresetIndex, Scalar,
    Volume, VolumeStatus,
};
