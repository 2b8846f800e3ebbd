use crate::error::{AccessoryError, Result};
use crate::types::{PresetIndex, Volume};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Placeholder for the slot number in [`Definitions::preset_template`]
pub const PRESET_PLACEHOLDER: &str = "{n}";

/// Controllable properties of a speaker accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Volume,
    Mute,
    Aux,
    Preset(PresetIndex),
}

impl PropertyKind {
    /// Whether this is a momentary input toggle (preset or AUX)
    pub fn is_input(&self) -> bool {
        matches!(self, PropertyKind::Aux | PropertyKind::Preset(_))
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Volume => f.write_str("Volume"),
            PropertyKind::Mute => f.write_str("Mute"),
            PropertyKind::Aux => f.write_str("AUX"),
            PropertyKind::Preset(n) => write!(f, "Preset{}", n),
        }
    }
}

/// Value held by a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
}

impl PropertyValue {
    /// Interpret as a boolean, accepting 0/1 as hosts sometimes send them
    pub fn as_bool(&self, kind: PropertyKind) -> Result<bool> {
        match *self {
            PropertyValue::Bool(b) => Ok(b),
            PropertyValue::Int(0) => Ok(false),
            PropertyValue::Int(1) => Ok(true),
            other => Err(invalid(kind, other)),
        }
    }

    /// Interpret as a volume level
    pub fn as_volume(&self, kind: PropertyKind) -> Result<Volume> {
        match *self {
            PropertyValue::Int(n) => Volume::try_from(n).map_err(|_| invalid(kind, *self)),
            other => Err(invalid(kind, other)),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Volume> for PropertyValue {
    fn from(value: Volume) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Int(n) => write!(f, "{}", n),
        }
    }
}

fn invalid(kind: PropertyKind, value: PropertyValue) -> AccessoryError {
    AccessoryError::InvalidValue {
        property: kind.to_string(),
        value: value.to_string(),
    }
}

/// Value format of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Bool,
    Uint8,
}

/// Capability of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Perm {
    #[serde(rename = "pr")]
    Read,
    #[serde(rename = "pw")]
    Write,
    #[serde(rename = "ev")]
    Notify,
}

/// Inclusive value range with step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

/// Property identifiers supplied by the host framework
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Definitions {
    pub volume: Uuid,
    pub mute: Uuid,
    pub aux: Uuid,
    /// Preset identifier with `{n}` standing for the slot number
    pub preset_template: String,
}

impl Default for Definitions {
    fn default() -> Self {
        Self {
            volume: Uuid::from_u128(0x00000119_0000_1000_8000_0026BB765291),
            mute: Uuid::from_u128(0x0000011A_0000_1000_8000_0026BB765291),
            aux: Uuid::from_u128(0x00000074_0100_1000_8000_0026BB765291),
            preset_template: "00000074-{n}000-1000-8000-0026BB765291".to_string(),
        }
    }
}

impl Definitions {
    /// Identifier of preset slot `index`
    pub fn preset_uuid(&self, index: PresetIndex) -> Result<Uuid> {
        if !self.preset_template.contains(PRESET_PLACEHOLDER) {
            return Err(AccessoryError::Configuration(format!(
                "Preset template {:?} has no {} placeholder",
                self.preset_template, PRESET_PLACEHOLDER
            )));
        }

        let text = self
            .preset_template
            .replace(PRESET_PLACEHOLDER, &index.to_string());
        Uuid::parse_str(&text).map_err(|e| {
            AccessoryError::Configuration(format!("Invalid preset identifier {:?}: {}", text, e))
        })
    }
}

/// Static description of one exposed property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub kind: PropertyKind,
    pub name: String,
    pub uuid: Uuid,
    pub format: Format,
    pub perms: Vec<Perm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

impl PropertyDescriptor {
    fn new(kind: PropertyKind, uuid: Uuid) -> Self {
        let (format, range) = match kind {
            PropertyKind::Volume => (
                Format::Uint8,
                Some(Range {
                    min: 0,
                    max: 100,
                    step: 1,
                }),
            ),
            _ => (Format::Bool, None),
        };

        Self {
            kind,
            name: kind.to_string(),
            uuid,
            format,
            perms: vec![Perm::Read, Perm::Write, Perm::Notify],
            range,
        }
    }

    /// Value a freshly registered property starts with
    pub fn default_value(&self) -> PropertyValue {
        match self.format {
            Format::Bool => PropertyValue::Bool(false),
            Format::Uint8 => PropertyValue::Int(0),
        }
    }
}

/// Ordered set of properties exposed by an accessory
#[derive(Debug, Clone, Serialize)]
pub struct PropertyTable {
    descriptors: Vec<PropertyDescriptor>,
}

impl PropertyTable {
    /// Build descriptors for volume, mute, AUX and presets `1..=presets`
    pub fn build(definitions: &Definitions, presets: PresetIndex) -> Result<Self> {
        let mut rows = vec![
            (PropertyKind::Volume, definitions.volume),
            (PropertyKind::Mute, definitions.mute),
            (PropertyKind::Aux, definitions.aux),
        ];
        for index in 1..=presets {
            rows.push((PropertyKind::Preset(index), definitions.preset_uuid(index)?));
        }

        let descriptors = rows
            .into_iter()
            .map(|(kind, uuid)| PropertyDescriptor::new(kind, uuid))
            .collect();

        Ok(Self { descriptors })
    }

    /// Look up a property
    pub fn get(&self, kind: PropertyKind) -> Result<&PropertyDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.kind == kind)
            .ok_or_else(|| AccessoryError::UnknownProperty(kind.to_string()))
    }

    /// All descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.descriptors.iter()
    }

    /// Preset and AUX toggles in registration order
    pub fn inputs(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.descriptors.iter().filter(|d| d.kind.is_input())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Host-side property cache the accessory pushes values into
#[async_trait]
pub trait PropertySurface: Send + Sync {
    /// Replace the cached value of a property without a client request
    async fn update_value(&self, property: &PropertyDescriptor, value: PropertyValue)
        -> Result<()>;
}

/// In-memory [`PropertySurface`] keeping the last known value of each property
#[derive(Debug, Default)]
pub struct CachedSurface {
    values: Mutex<HashMap<PropertyKind, PropertyValue>>,
}

impl CachedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every property in the table with its default value
    pub async fn register(&self, table: &PropertyTable) {
        let mut values = self.values.lock().await;
        for descriptor in table.iter() {
            values
                .entry(descriptor.kind)
                .or_insert_with(|| descriptor.default_value());
        }
    }

    /// Last known value of a property
    pub async fn value(&self, kind: PropertyKind) -> Option<PropertyValue> {
        self.values.lock().await.get(&kind).copied()
    }

    /// Store a value written by a client
    pub async fn store(&self, kind: PropertyKind, value: PropertyValue) {
        self.values.lock().await.insert(kind, value);
    }
}

#[async_trait]
impl PropertySurface for CachedSurface {
    async fn update_value(
        &self,
        property: &PropertyDescriptor,
        value: PropertyValue,
    ) -> Result<()> {
        tracing::debug!("Updating {} to {}", property.name, value);
        self.store(property.kind, value).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_layout() {
        let table = PropertyTable::build(&Definitions::default(), 6).unwrap();
        assert_eq!(table.len(), 9);

        let kinds: Vec<_> = table.iter().map(|d| d.kind).collect();
        assert_eq!(kinds[0], PropertyKind::Volume);
        assert_eq!(kinds[1], PropertyKind::Mute);
        assert_eq!(kinds[2], PropertyKind::Aux);
        assert_eq!(kinds[8], PropertyKind::Preset(6));
        assert_eq!(table.inputs().count(), 7);
    }

    #[test]
    fn test_preset_identifiers_follow_template() {
        let table = PropertyTable::build(&Definitions::default(), 6).unwrap();
        let preset = table.get(PropertyKind::Preset(3)).unwrap();
        assert_eq!(preset.name, "Preset3");
        assert_eq!(
            preset.uuid.to_string().to_uppercase(),
            "00000074-3000-1000-8000-0026BB765291"
        );
        assert_eq!(preset.format, Format::Bool);
        assert_eq!(preset.perms, vec![Perm::Read, Perm::Write, Perm::Notify]);

        let aux = table.get(PropertyKind::Aux).unwrap();
        assert_eq!(
            aux.uuid.to_string().to_uppercase(),
            "00000074-0100-1000-8000-0026BB765291"
        );
    }

    #[test]
    fn test_bad_template_is_configuration_error() {
        let definitions = Definitions {
            preset_template: "not-a-uuid-{n}".to_string(),
            ..Definitions::default()
        };
        assert!(matches!(
            PropertyTable::build(&definitions, 2),
            Err(AccessoryError::Configuration(_))
        ));

        let definitions = Definitions {
            preset_template: "00000074-1000-1000-8000-0026BB765291".to_string(),
            ..Definitions::default()
        };
        assert!(PropertyTable::build(&definitions, 2).is_err());
    }

    #[test]
    fn test_unknown_property() {
        let table = PropertyTable::build(&Definitions::default(), 2).unwrap();
        assert!(matches!(
            table.get(PropertyKind::Preset(5)),
            Err(AccessoryError::UnknownProperty(_))
        ));
    }

    #[test]
    fn test_value_coercion() {
        assert!(PropertyValue::Int(1).as_bool(PropertyKind::Aux).unwrap());
        assert!(PropertyValue::Int(2).as_bool(PropertyKind::Aux).is_err());
        assert_eq!(
            PropertyValue::Int(55).as_volume(PropertyKind::Volume).unwrap(),
            55
        );
        assert!(PropertyValue::Int(-3).as_volume(PropertyKind::Volume).is_err());
        assert!(PropertyValue::Bool(true)
            .as_volume(PropertyKind::Volume)
            .is_err());
    }

    #[test]
    fn test_descriptor_serializes_for_host() {
        let table = PropertyTable::build(&Definitions::default(), 1).unwrap();
        let volume = serde_json::to_value(table.get(PropertyKind::Volume).unwrap()).unwrap();
        assert_eq!(volume["format"], "uint8");
        assert_eq!(volume["perms"], serde_json::json!(["pr", "pw", "ev"]));
        assert_eq!(volume["range"]["max"], 100);
    }

    #[tokio::test]
    async fn test_cached_surface() {
        let table = PropertyTable::build(&Definitions::default(), 2).unwrap();
        let surface = CachedSurface::new();
        surface.register(&table).await;

        assert_eq!(
            surface.value(PropertyKind::Preset(2)).await,
            Some(PropertyValue::Bool(false))
        );

        let aux = table.get(PropertyKind::Aux).unwrap();
        surface.update_value(aux, true.into()).await.unwrap();
        assert_eq!(
            surface.value(PropertyKind::Aux).await,
            Some(PropertyValue::Bool(true))
        );
    }
}
