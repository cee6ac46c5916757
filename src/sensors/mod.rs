pub mod system;

use thiserror::Error;

/// Hardware device kinds the aggregator cares about. Everything else is
/// enumerated as `Other` and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Cpu,
    Memory,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Clock,
    DataVolume,
}

/// One named scalar reading. Backends may report a sensor without a value at
/// any time; the aggregator treats that the same as a missing sensor.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub name: String,
    pub kind: SensorKind,
    pub value: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Device {
    pub kind: DeviceKind,
    pub sensors: Vec<Sensor>,
}

/// Total and available physical memory in bytes, as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryFigures {
    pub total_bytes: u64,
    pub available_bytes: u64,
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor backend unavailable: {0}")]
    Backend(String),
}

/// A hardware-monitoring backend. `enumerate` refreshes every device it
/// reports before returning, so sensor values reflect the current cycle.
pub trait SensorSource {
    fn enumerate(&mut self) -> Result<Vec<Device>, SensorError>;
}

/// OS-level memory query, used only when the sensor backend yields no usable
/// memory figures for a cycle.
pub trait FallbackMemorySource {
    fn query(&mut self) -> Option<MemoryFigures>;
}

impl Sensor {
    pub fn new(name: impl Into<String>, kind: SensorKind, value: Option<f64>) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }
}
