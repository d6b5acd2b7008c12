use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Inbound message envelope.
///
/// The feed multiplexes several message kinds over one channel; everything
/// that is not a `containers_update` deserializes to `Unknown` and is
/// dropped without error.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
    #[serde(rename = "containers_update")]
    ContainersUpdate { data: RawSnapshot },
    #[serde(other)]
    Unknown,
}

impl Envelope {
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Snapshot with every field still undecoded.
///
/// The fields decode one at a time in [`RawSnapshot::into_snapshot`], so a
/// garbage value costs only its own field; the rest of the message still
/// commits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSnapshot {
    pub containers: Option<Value>,
    pub host_metrics: Option<Value>,
    pub host_sparklines: Option<Value>,
    pub container_sparklines: Option<Value>,
    pub timestamp: Option<Value>,
}

impl RawSnapshot {
    /// Decode each field independently; a field that fails is logged and
    /// treated as absent.
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            containers: decode_field("containers", self.containers),
            host_metrics: decode_field("host_metrics", self.host_metrics),
            host_sparklines: decode_field("host_sparklines", self.host_sparklines),
            container_sparklines: decode_field("container_sparklines", self.container_sparklines),
            timestamp: decode_field("timestamp", self.timestamp),
        }
    }
}

fn decode_field<T: DeserializeOwned>(name: &str, value: Option<Value>) -> Option<T> {
    let value = value?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::warn!("Skipping unparseable snapshot field {}: {}", name, e);
            None
        }
    }
}

/// One telemetry snapshot covering all hosts and containers at a point in
/// time.
///
/// Every field is optional: an absent field means "no change" for the map it
/// feeds, a present field fully replaces that map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub containers: Option<Vec<ContainerStats>>,
    pub host_metrics: Option<HashMap<String, HostMetrics>>,
    pub host_sparklines: Option<HashMap<String, Sparklines>>,
    pub container_sparklines: Option<HashMap<String, Sparklines>>,
    /// ISO-8601; a missing or unparseable value falls back to receive time.
    pub timestamp: Option<String>,
}

/// Aggregated metrics for one host, replaced wholesale on each snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostMetrics {
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub mem_used_bytes: u64,
    pub mem_total_bytes: u64,
    pub net_rx_bytes_per_sec: f64,
    pub net_tx_bytes_per_sec: f64,
    pub container_count: u32,
    pub uptime_secs: u64,
}

/// Per-container stats, replaced wholesale on each snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerStats {
    pub id: String,
    pub name: String,
    pub state: String,
    pub host_id: String,
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub memory_percent: f64,
    #[serde(default)]
    pub memory_usage_bytes: u64,
    #[serde(default)]
    pub memory_limit_bytes: u64,
}

/// Named bounded series for one host or container, oldest sample first.
///
/// The producer trims these to the window length (~40 samples at a 3 second
/// cadence); the store never truncates them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sparklines {
    pub cpu: Vec<f64>,
    pub mem: Vec<f64>,
    pub net: Vec<f64>,
}

impl Sparklines {
    /// True when every series is empty.
    pub fn all_empty(&self) -> bool {
        self.cpu.is_empty() && self.mem.is_empty() && self.net.is_empty()
    }
}
