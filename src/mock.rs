//! Test doubles for the device and discovery collaborators

use crate::device::DeviceHandle;
use crate::discovery::{DiscoveryEvent, DiscoveryService};
use crate::error::{AccessoryError, Result};
use crate::protocol::RemoteKey;
use crate::subscription::DiscoveryReceiver;
use crate::types::{NowPlaying, Preset, Scalar, Volume, VolumeStatus};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::io;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Log output collected by [`capture_logs`]
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route this thread's log output into a buffer until the guard is dropped
pub fn capture_logs() -> (tracing::subscriber::DefaultGuard, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (tracing::subscriber::set_default(subscriber), logs)
}

/// Device call recorded by [`MockDevice`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetVolume,
    SetVolume(Volume),
    IsAlive,
    PowerOn,
    PowerOff,
    Play,
    GetPresets,
    GetNowPlaying,
    PressKey(RemoteKey),
}

/// Speaker double that records every call
pub struct MockDevice {
    name: String,
    address: String,
    volume: VolumeStatus,
    alive: bool,
    power_transition: bool,
    presets: Vec<Preset>,
    now_playing: NowPlaying,
    failure: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl MockDevice {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            address: "192.168.1.20".to_string(),
            volume: VolumeStatus {
                actual_volume: Scalar::Number(20.0),
                target_volume: None,
                mute_enabled: None,
            },
            alive: true,
            power_transition: true,
            presets: Vec::new(),
            now_playing: NowPlaying {
                source: None,
                content_item: None,
            },
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_address(mut self, address: &str) -> Self {
        self.address = address.to_string();
        self
    }

    pub fn with_volume(mut self, volume: VolumeStatus) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_alive(mut self, alive: bool) -> Self {
        self.alive = alive;
        self
    }

    pub fn with_power_transition(mut self, transition: bool) -> Self {
        self.power_transition = transition;
        self
    }

    pub fn with_presets(mut self, presets: Vec<Preset>) -> Self {
        self.presets = presets;
        self
    }

    pub fn with_now_playing(mut self, now_playing: NowPlaying) -> Self {
        self.now_playing = now_playing;
        self
    }

    /// Make every call fail with a device error
    pub fn failing(mut self, detail: &str) -> Self {
        self.failure = Some(detail.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pressed_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::PressKey(key) => Some(key.to_string()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match &self.failure {
            Some(detail) => Err(AccessoryError::device(detail)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DeviceHandle for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn address(&self) -> &str {
        &self.address
    }

    async fn get_volume(&self) -> Result<VolumeStatus> {
        self.record(Call::GetVolume)?;
        Ok(self.volume.clone())
    }

    async fn set_volume(&self, level: Volume) -> Result<()> {
        self.record(Call::SetVolume(level))
    }

    async fn is_alive(&self) -> Result<bool> {
        self.record(Call::IsAlive)?;
        Ok(self.alive)
    }

    async fn power_on(&self) -> Result<bool> {
        self.record(Call::PowerOn)?;
        Ok(self.power_transition)
    }

    async fn power_off(&self) -> Result<()> {
        self.record(Call::PowerOff)
    }

    async fn play(&self) -> Result<()> {
        self.record(Call::Play)
    }

    async fn get_presets(&self) -> Result<Vec<Preset>> {
        self.record(Call::GetPresets)?;
        Ok(self.presets.clone())
    }

    async fn get_now_playing(&self) -> Result<NowPlaying> {
        self.record(Call::GetNowPlaying)?;
        Ok(self.now_playing.clone())
    }

    async fn press_key(&self, key: RemoteKey) -> Result<()> {
        self.record(Call::PressKey(key))
    }
}

/// Discovery double driven by [`MockDiscovery::emit`]
pub struct MockDiscovery {
    tx: Mutex<Option<broadcast::Sender<DiscoveryEvent>>>,
    searches: AtomicUsize,
    stops: AtomicUsize,
}

impl MockDiscovery {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            tx: Mutex::new(Some(tx)),
            searches: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn emit(&self, event: DiscoveryEvent) {
        if let Some(tx) = self.tx.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Drop the sender, ending every open event stream
    pub fn close(&self) {
        self.tx.lock().unwrap().take();
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryService for MockDiscovery {
    async fn search(&self) -> Result<DiscoveryReceiver> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let guard = self.tx.lock().unwrap();
        let tx = guard.as_ref().ok_or(AccessoryError::ChannelClosed)?;
        Ok(DiscoveryReceiver::new(tx.subscribe()))
    }

    async fn stop_searching(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}
