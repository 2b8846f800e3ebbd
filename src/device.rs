use crate::error::Result;
use crate::protocol::RemoteKey;
use crate::types::{NowPlaying, Preset, Volume, VolumeStatus};
use async_trait::async_trait;

/// Network control interface to one SoundTouch speaker
///
/// Every call resolves exactly once. Implementations report transport
/// failures as [`AccessoryError::Device`](crate::AccessoryError::Device); the
/// accessory passes them through unchanged and never retries.
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    /// Name the speaker advertises (the room name)
    fn name(&self) -> &str;

    /// Network address of the speaker
    fn address(&self) -> &str;

    /// Read the current volume state
    async fn get_volume(&self) -> Result<VolumeStatus>;

    /// Set the volume level
    async fn set_volume(&self, level: Volume) -> Result<()>;

    /// Whether the speaker is powered on and playing
    async fn is_alive(&self) -> Result<bool>;

    /// Power on; returns whether a transition occurred
    async fn power_on(&self) -> Result<bool>;

    /// Power off
    async fn power_off(&self) -> Result<()>;

    /// Resume playback
    async fn play(&self) -> Result<()>;

    /// Read the stored presets
    async fn get_presets(&self) -> Result<Vec<Preset>>;

    /// Read what is currently playing
    async fn get_now_playing(&self) -> Result<NowPlaying>;

    /// Press and release a remote-control key
    async fn press_key(&self, key: RemoteKey) -> Result<()>;
}
