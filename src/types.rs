use crate::error::{AccessoryError, Result};
use serde::{Deserialize, Serialize};

/// Speaker volume level (0-100 on SoundTouch hardware)
pub type Volume = u8;

/// Preset slot number as printed on the speaker (1-based)
pub type PresetIndex = u8;

/// Playable item or input, as reported in presets and now-playing
///
/// Two items refer to the same content when source, account and location
/// all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub source: String,

    #[serde(rename = "sourceAccount", default)]
    pub source_account: Option<String>,

    #[serde(default)]
    pub location: Option<String>,

    /// Display name, not part of content identity
    #[serde(rename = "itemName", default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
}

impl ContentItem {
    /// Create a content item for a source with no account or location
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_account: None,
            location: None,
            item_name: None,
        }
    }

    /// Set the source account
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.source_account = Some(account.into());
        self
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Whether both items identify the same content (source, account, location)
    pub fn same_content(&self, other: &ContentItem) -> bool {
        self.source == other.source
            && self.source_account == other.source_account
            && self.location == other.location
    }
}

/// Snapshot of what the speaker is currently playing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPlaying {
    #[serde(default)]
    pub source: Option<String>,

    #[serde(rename = "ContentItem", default)]
    pub content_item: Option<ContentItem>,
}

impl NowPlaying {
    /// Now-playing snapshot for the given content
    pub fn playing(item: ContentItem) -> Self {
        Self {
            source: Some(item.source.clone()),
            content_item: Some(item),
        }
    }
}

/// Stored station definition in one of the speaker's preset slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    #[serde(rename = "id")]
    pub index: PresetIndex,

    #[serde(rename = "ContentItem")]
    pub content_item: ContentItem,
}

/// Number or numeric string, as speakers report volume either way
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Coerce to a volume level
    ///
    /// Fractions are rounded to the nearest step. Values that do not fit a
    /// [`Volume`] (negative, above 255, non-finite) are rejected with
    /// [`AccessoryError::InvalidResponse`] rather than clamped.
    pub fn to_volume(&self) -> Result<Volume> {
        let value = match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                AccessoryError::InvalidResponse(format!("Volume is not numeric: {:?}", s))
            })?,
        };

        if !value.is_finite() || value < 0.0 || value > f64::from(Volume::MAX) {
            return Err(AccessoryError::InvalidResponse(format!(
                "Volume out of range: {}",
                value
            )));
        }

        Ok(value.round() as Volume)
    }
}

/// Volume state reported by the speaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeStatus {
    #[serde(rename = "actualvolume")]
    pub actual_volume: Scalar,

    #[serde(rename = "targetvolume", default)]
    pub target_volume: Option<Scalar>,

    #[serde(rename = "muteenabled", default)]
    pub mute_enabled: Option<Scalar>,
}

/// Speaker seen by a discovery service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub name: String,
    pub address: String,
}

/// Identification published alongside the accessory's properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryInformation {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}
