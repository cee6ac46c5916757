use crate::sensors::{DeviceKind, FallbackMemorySource, Sensor, SensorKind, SensorSource};
use crate::state::Snapshot;
use tracing::debug;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// One tier of the CPU temperature selection policy: the sensor name must
/// contain `accept` and must not contain `reject`.
struct TempRule {
    accept: &'static str,
    reject: Option<&'static str>,
}

impl TempRule {
    fn matches(&self, name: &str) -> bool {
        name.contains(self.accept) && self.reject.map_or(true, |r| !name.contains(r))
    }
}

/// Vendors expose several candidate sensors for "the" CPU temperature; tiers
/// are tried in order and only the first name match within a tier counts.
/// Tctl/Tdie/CCX cover AMD naming, Core covers Intel (excluding the Core Max
/// aggregate).
const TEMP_PRIORITY: &[TempRule] = &[
    TempRule {
        accept: "Tctl",
        reject: None,
    },
    TempRule {
        accept: "Tdie",
        reject: None,
    },
    TempRule {
        accept: "CCX",
        reject: None,
    },
    TempRule {
        accept: "Core",
        reject: Some("Max"),
    },
];

/// Reduces one cycle of sensor enumeration into a `Snapshot`. Sampling never
/// fails: a monitoring loop must not stop over one bad reading, so every
/// internal error degrades to absent fields instead.
pub struct MetricAggregator<S, F> {
    source: S,
    fallback: F,
}

impl<S: SensorSource, F: FallbackMemorySource> MetricAggregator<S, F> {
    pub fn new(source: S, fallback: F) -> Self {
        Self { source, fallback }
    }

    pub fn sample(&mut self) -> Snapshot {
        let devices = match self.source.enumerate() {
            Ok(devices) => devices,
            Err(err) => {
                debug!(error = %err, "sensor enumeration failed, reporting empty snapshot");
                return Snapshot::default();
            }
        };

        let mut temperature_sensors: Vec<&Sensor> = Vec::new();
        let mut clock_sensors: Vec<&Sensor> = Vec::new();
        let mut memory_sensors: Vec<&Sensor> = Vec::new();
        for device in &devices {
            for sensor in &device.sensors {
                match (device.kind, sensor.kind) {
                    (DeviceKind::Cpu, SensorKind::Temperature) => {
                        temperature_sensors.push(sensor)
                    }
                    (DeviceKind::Cpu, SensorKind::Clock) => clock_sensors.push(sensor),
                    (DeviceKind::Memory, SensorKind::DataVolume) => memory_sensors.push(sensor),
                    _ => {}
                }
            }
        }

        let temperature_c = select_temperature(&temperature_sensors);

        let max_clock_mhz = clock_sensors
            .iter()
            .filter_map(|s| s.value)
            .max_by(|a, b| a.total_cmp(b))
            .filter(|mhz| *mhz > 0.0);

        let (mut memory_used_gb, mut memory_total_gb) = primary_memory(&memory_sensors);

        if memory_used_gb.is_none() {
            if let Some(figures) = self.fallback.query() {
                let total_gb = figures.total_bytes as f64 / BYTES_PER_GB;
                let available_gb = figures.available_bytes as f64 / BYTES_PER_GB;
                if total_gb > 0.0 {
                    memory_total_gb = Some(total_gb);
                    memory_used_gb = Some(total_gb - available_gb);
                }
            }
        }

        let memory_usage_percent = match (memory_used_gb, memory_total_gb) {
            (Some(used), Some(total)) if total > 0.0 => Some(used / total * 100.0),
            _ => None,
        };

        Snapshot {
            temperature_c,
            memory_used_gb,
            memory_total_gb,
            memory_usage_percent,
            max_clock_mhz,
        }
    }
}

/// Priority scan over the temperature sensor list. A tier whose candidate has
/// no value, or a non-positive one, falls through to the next tier.
fn select_temperature(sensors: &[&Sensor]) -> Option<f64> {
    for rule in TEMP_PRIORITY {
        let candidate = sensors.iter().find(|s| rule.matches(&s.name));
        if let Some(value) = candidate.and_then(|s| s.value) {
            if value > 0.0 {
                return Some(value);
            }
        }
    }
    None
}

/// Primary memory path over the memory device's data-volume sensors: the
/// first "Used"-named sensor supplies used GB, the first "Available"-named
/// one supplies the remainder of the total.
fn primary_memory(sensors: &[&Sensor]) -> (Option<f64>, Option<f64>) {
    let used = sensors
        .iter()
        .find(|s| s.name.contains("Used"))
        .and_then(|s| s.value);
    let available = sensors
        .iter()
        .find(|s| s.name.contains("Available"))
        .and_then(|s| s.value);

    let total = available.map(|avail| used.unwrap_or(0.0) + avail);
    (used, total)
}
