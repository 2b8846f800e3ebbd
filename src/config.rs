use crate::error::{AccessoryError, Result};
use crate::protocol::{ACCESSORY_TYPE, PRESET_COUNT};
use crate::types::PresetIndex;
use serde::{Deserialize, Serialize};

fn default_presets() -> PresetIndex {
    PRESET_COUNT
}

/// How momentary input toggles settle after a press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentaryReset {
    /// Drive every other input toggle back to false
    #[default]
    Siblings,
    /// Drive every input toggle back to false, including the one pressed
    All,
    /// Push nothing and leave settling to the host
    Framework,
}

/// Accessory block from the host configuration
///
/// ```json
/// { "accessory": "SoundTouch", "name": "Kitchen Speaker", "room": "Kitchen" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryConfig {
    /// Accessory type the host registered this block under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory: Option<String>,

    /// Display name (defaults to the room)
    #[serde(default)]
    pub name: Option<String>,

    /// Name of the speaker to bind to, matched exactly
    #[serde(default)]
    pub room: Option<String>,

    /// Number of preset toggles to expose
    #[serde(default = "default_presets")]
    pub presets: PresetIndex,

    #[serde(default)]
    pub momentary_reset: MomentaryReset,
}

impl AccessoryConfig {
    /// Configuration for a room with defaults for everything else
    pub fn for_room(room: impl Into<String>) -> Self {
        Self {
            accessory: None,
            name: None,
            room: Some(room.into()),
            presets: PRESET_COUNT,
            momentary_reset: MomentaryReset::default(),
        }
    }

    /// Parse an accessory block from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an accessory block from an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Room name, or a configuration error when it is missing or blank
    pub fn require_room(&self) -> Result<&str> {
        match self.room.as_deref() {
            Some(room) if !room.trim().is_empty() => Ok(room),
            _ => Err(AccessoryError::Configuration(
                "You must provide a config value for \"room\"".to_string(),
            )),
        }
    }

    /// Display name for the accessory
    pub fn display_name(&self) -> Result<String> {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(name.to_string()),
            _ => self.require_room().map(str::to_string),
        }
    }

    /// Check everything the accessory needs before it is built
    pub fn validate(&self) -> Result<()> {
        if let Some(kind) = self.accessory.as_deref() {
            if kind != ACCESSORY_TYPE {
                return Err(AccessoryError::Configuration(format!(
                    "Accessory type {:?} is not {:?}",
                    kind, ACCESSORY_TYPE
                )));
            }
        }
        self.require_room()?;
        if self.presets == 0 || self.presets > PRESET_COUNT {
            return Err(AccessoryError::Configuration(format!(
                "\"presets\" must be between 1 and {}, got {}",
                PRESET_COUNT, self.presets
            )));
        }
        Ok(())
    }
}
