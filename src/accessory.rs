use crate::config::{AccessoryConfig, MomentaryReset};
use crate::device::DeviceHandle;
use crate::error::{AccessoryError, Result};
use crate::property::{Definitions, PropertyKind, PropertySurface, PropertyTable, PropertyValue};
use crate::protocol::{RemoteKey, AUX_SOURCE, MANUFACTURER, MODEL, PLUGIN_NAME};
use crate::types::{AccessoryInformation, PresetIndex, Volume};
use futures_util::future::try_join;
use std::sync::{Arc, OnceLock};

/// Home-automation accessory backed by one SoundTouch speaker
///
/// An `Accessory` starts unbound and is bound at most once, to the first
/// discovered speaker whose name equals the configured room. Every property
/// operation fails with [`AccessoryError::NotDiscovered`] until then, without
/// touching the network.
///
/// Property reads are always live; nothing read from the speaker is cached
/// here. Selecting a preset or the AUX input also resets the sibling input
/// toggles on the [`PropertySurface`] according to the configured
/// [`MomentaryReset`] policy.
pub struct Accessory {
    name: String,
    room: String,
    momentary_reset: MomentaryReset,
    properties: PropertyTable,
    surface: Arc<dyn PropertySurface>,
    device: OnceLock<Arc<dyn DeviceHandle>>,
}

impl Accessory {
    /// Create an unbound accessory
    ///
    /// Fails with [`AccessoryError::Configuration`] when the room is missing
    /// or the property definitions are unusable.
    pub fn new(
        config: AccessoryConfig,
        definitions: &Definitions,
        surface: Arc<dyn PropertySurface>,
    ) -> Result<Self> {
        config.validate()?;
        let room = config.require_room()?.to_string();
        let name = config.display_name()?;
        let properties = PropertyTable::build(definitions, config.presets)?;

        tracing::info!(
            "Created {} accessory {} for room {} with {} properties",
            PLUGIN_NAME,
            name,
            room,
            properties.len()
        );

        Ok(Self {
            name,
            room,
            momentary_reset: config.momentary_reset,
            properties,
            surface,
            device: OnceLock::new(),
        })
    }

    /// Get the display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the room the accessory binds to
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Get the exposed properties
    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    pub fn information(&self) -> AccessoryInformation {
        AccessoryInformation {
            name: self.name.clone(),
            manufacturer: MANUFACTURER.to_string(),
            model: MODEL.to_string(),
            serial_number: self.room.clone(),
        }
    }

    pub fn identify(&self) {
        tracing::info!("Identify request for {}", self.name);
    }

    /// Whether a speaker has been bound
    pub fn is_bound(&self) -> bool {
        self.device.get().is_some()
    }

    /// Address of the bound speaker
    pub fn address(&self) -> Option<String> {
        self.device.get().map(|d| d.address().to_string())
    }

    /// Bind a speaker; returns false if one was already bound
    ///
    /// Callers are expected to have matched the speaker against [`Accessory::room`].
    pub fn bind(&self, device: Arc<dyn DeviceHandle>) -> bool {
        let name = device.name().to_string();
        let address = device.address().to_string();
        match self.device.set(device) {
            Ok(()) => {
                tracing::info!("Bound {} to SoundTouch {} at {}", self.name, name, address);
                true
            }
            Err(_) => false,
        }
    }

    fn device(&self) -> Result<&Arc<dyn DeviceHandle>> {
        self.device.get().ok_or_else(|| {
            tracing::warn!("Ignoring request; SoundTouch device has not yet been discovered");
            AccessoryError::NotDiscovered
        })
    }

    fn device_failed(&self, operation: &str, err: &AccessoryError) {
        tracing::warn!("{} failed on {}: {}", operation, self.room, err);
    }

    // ========== Host dispatch ==========

    /// Serve a property read from the host
    pub async fn get(&self, kind: PropertyKind) -> Result<PropertyValue> {
        self.device()?;
        self.properties.get(kind)?;

        match kind {
            PropertyKind::Volume => self.get_volume().await.map(PropertyValue::from),
            PropertyKind::Mute => self.is_muted().await.map(PropertyValue::from),
            PropertyKind::Aux => self.get_aux_active().await.map(PropertyValue::from),
            PropertyKind::Preset(index) => {
                self.get_preset_active(index).await.map(PropertyValue::from)
            }
        }
    }

    /// Serve a property write from the host
    pub async fn set(&self, kind: PropertyKind, value: PropertyValue) -> Result<()> {
        self.device()?;
        self.properties.get(kind)?;

        match kind {
            PropertyKind::Volume => self.set_volume(value.as_volume(kind)?).await,
            PropertyKind::Mute => self.set_mute(value.as_bool(kind)?).await,
            PropertyKind::Aux => self.set_aux_active(value.as_bool(kind)?).await,
            PropertyKind::Preset(index) => {
                self.set_preset_active(index, value.as_bool(kind)?).await
            }
        }
    }

    // ========== Volume ==========

    /// Read the live volume from the speaker
    pub async fn get_volume(&self) -> Result<Volume> {
        let device = self.device()?;
        let status = device
            .get_volume()
            .await
            .inspect_err(|e| self.device_failed("Reading volume", e))?;
        let volume = status.actual_volume.to_volume()?;
        tracing::debug!("Current volume: {}", volume);
        Ok(volume)
    }

    /// Set the speaker volume; range checking is left to the speaker
    pub async fn set_volume(&self, level: Volume) -> Result<()> {
        let device = self.device()?;
        device
            .set_volume(level)
            .await
            .inspect_err(|e| self.device_failed("Setting volume", e))?;
        tracing::debug!("Set volume to {}", level);
        Ok(())
    }

    // ========== Power / mute ==========

    /// Muted means the speaker is not alive
    pub async fn is_muted(&self) -> Result<bool> {
        let device = self.device()?;
        let alive = device
            .is_alive()
            .await
            .inspect_err(|e| self.device_failed("Reading power state", e))?;
        tracing::debug!("Speaker playing: {}", alive);
        Ok(!alive)
    }

    /// Power on and resume playback, or power off
    ///
    /// Playback is only requested after power-on has completed, whether or
    /// not the speaker was already on.
    pub async fn set_power(&self, on: bool) -> Result<()> {
        let device = self.device()?;

        if on {
            let turned_on = device
                .power_on()
                .await
                .inspect_err(|e| self.device_failed("Powering on", e))?;
            if turned_on {
                tracing::info!("Powered on {}", self.room);
            } else {
                tracing::info!("{} was already powered on", self.room);
            }
            device
                .play()
                .await
                .inspect_err(|e| self.device_failed("Starting playback", e))?;
            tracing::debug!("Playing on {}", self.room);
        } else {
            device
                .power_off()
                .await
                .inspect_err(|e| self.device_failed("Powering off", e))?;
            tracing::info!("Powered off {}", self.room);
        }

        Ok(())
    }

    pub async fn set_mute(&self, muted: bool) -> Result<()> {
        self.set_power(!muted).await
    }

    // ========== Inputs ==========

    /// Whether preset `index` is what the speaker is playing
    ///
    /// A slot with nothing stored reads as inactive.
    pub async fn get_preset_active(&self, index: PresetIndex) -> Result<bool> {
        let device = self.device()?;
        self.properties.get(PropertyKind::Preset(index))?;

        let (presets, now_playing) =
            try_join(device.get_presets(), device.get_now_playing())
                .await
                .inspect_err(|e| self.device_failed("Reading presets", e))?;

        let preset = match presets.iter().find(|p| p.index == index) {
            Some(preset) => preset,
            None => {
                tracing::debug!("No preset stored in slot {}", index);
                return Ok(false);
            }
        };

        let active = now_playing
            .content_item
            .as_ref()
            .is_some_and(|item| item.same_content(&preset.content_item));
        tracing::debug!("Preset {} active: {}", index, active);
        Ok(active)
    }

    /// Recall preset `index`, then settle the other input toggles
    ///
    /// Writing false is accepted and does nothing.
    pub async fn set_preset_active(&self, index: PresetIndex, active: bool) -> Result<()> {
        let device = self.device()?;
        let kind = PropertyKind::Preset(index);
        self.properties.get(kind)?;

        if !active {
            return Ok(());
        }

        device
            .press_key(RemoteKey::Preset(index))
            .await
            .inspect_err(|e| self.device_failed("Selecting preset", e))?;
        tracing::info!("Selected preset {} on {}", index, self.room);
        self.reconcile(kind).await
    }

    /// Whether the speaker is playing from the auxiliary input
    pub async fn get_aux_active(&self) -> Result<bool> {
        let device = self.device()?;
        let now_playing = device
            .get_now_playing()
            .await
            .inspect_err(|e| self.device_failed("Reading now playing", e))?;
        let active = now_playing
            .content_item
            .as_ref()
            .is_some_and(|item| item.source == AUX_SOURCE);
        tracing::debug!("AUX active: {}", active);
        Ok(active)
    }

    /// Switch to the auxiliary input, then settle the preset toggles
    ///
    /// Writing false is accepted and does nothing.
    pub async fn set_aux_active(&self, active: bool) -> Result<()> {
        let device = self.device()?;

        if !active {
            return Ok(());
        }

        device
            .press_key(RemoteKey::AuxInput)
            .await
            .inspect_err(|e| self.device_failed("Selecting AUX", e))?;
        tracing::info!("Selected AUX input on {}", self.room);
        self.reconcile(PropertyKind::Aux).await
    }

    /// Push input toggle states after `pressed` was activated
    async fn reconcile(&self, pressed: PropertyKind) -> Result<()> {
        let include_pressed = match self.momentary_reset {
            MomentaryReset::Framework => return Ok(()),
            MomentaryReset::Siblings => false,
            MomentaryReset::All => true,
        };

        for descriptor in self.properties.inputs() {
            if descriptor.kind == pressed && !include_pressed {
                continue;
            }
            self.surface
                .update_value(descriptor, PropertyValue::Bool(false))
                .await?;
        }

        Ok(())
    }
}
