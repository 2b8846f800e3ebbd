use crate::types::{NowPlaying, Preset, PresetIndex, VolumeStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of preset slots on a SoundTouch speaker
pub const PRESET_COUNT: PresetIndex = 6;

/// Prefix of the remote key that recalls a preset slot
pub const PRESET_KEY_PREFIX: &str = "PRESET_";

/// Remote key that switches to the auxiliary input
pub const AUX_INPUT_KEY: &str = "AUX_INPUT";

/// Now-playing source reported while the auxiliary input is active
pub const AUX_SOURCE: &str = "AUX";

/// Plugin identifier the accessory registers under
pub const PLUGIN_NAME: &str = "homebridge-soundtouch";

/// Accessory type name used in host configuration
pub const ACCESSORY_TYPE: &str = "SoundTouch";

/// Manufacturer reported in accessory information
pub const MANUFACTURER: &str = "Bose SoundTouch";

/// Model reported in accessory information
pub const MODEL: &str = "1.0.0";

/// Keys of the speaker's remote-control vocabulary used by the accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKey {
    /// Recall preset slot `n`
    Preset(PresetIndex),
    /// Switch to the auxiliary input
    AuxInput,
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteKey::Preset(n) => write!(f, "{}{}", PRESET_KEY_PREFIX, n),
            RemoteKey::AuxInput => f.write_str(AUX_INPUT_KEY),
        }
    }
}

impl Serialize for RemoteKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `/volume` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeResponse {
    pub volume: VolumeStatus,
}

/// `/presets` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetsResponse {
    pub presets: PresetList,
}

/// Preset list wrapper
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresetList {
    #[serde(default)]
    pub preset: Vec<Preset>,
}

/// `/now_playing` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPlayingResponse {
    #[serde(rename = "nowPlaying")]
    pub now_playing: NowPlaying,
}

impl PresetsResponse {
    /// Stored presets, ordered by slot
    pub fn into_presets(self) -> Vec<Preset> {
        let mut presets = self.presets.preset;
        presets.sort_by_key(|p| p.index);
        presets
    }
}
