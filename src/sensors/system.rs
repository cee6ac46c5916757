use crate::sensors::{
    Device, DeviceKind, FallbackMemorySource, MemoryFigures, Sensor, SensorError, SensorKind,
    SensorSource,
};
#[cfg(target_os = "linux")]
use std::fs;
use sysinfo::{ComponentExt, CpuExt, System, SystemExt};
use tracing::debug;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Production sensor backend on top of `sysinfo`. Opened once at startup and
/// held for the process lifetime; dropping it releases the handle.
pub struct SysinfoSource {
    system: System,
}

impl SysinfoSource {
    pub fn open() -> Result<Self, SensorError> {
        let mut system = System::new();
        system.refresh_cpu();
        if system.cpus().is_empty() {
            return Err(SensorError::Backend(
                "no CPU reported by the system".to_string(),
            ));
        }
        Ok(Self { system })
    }
}

impl SensorSource for SysinfoSource {
    fn enumerate(&mut self) -> Result<Vec<Device>, SensorError> {
        self.system.refresh_cpu();
        self.system.refresh_memory();
        self.system.refresh_components_list();
        self.system.refresh_components();

        let mut cpu_sensors = Vec::new();
        for component in self.system.components() {
            let temp = component.temperature() as f64;
            cpu_sensors.push(Sensor::new(
                component.label(),
                SensorKind::Temperature,
                // sysinfo reports 0.0 when the component has no reading yet
                (temp > 0.0).then_some(temp),
            ));
        }
        for (i, cpu) in self.system.cpus().iter().enumerate() {
            let mhz = cpu.frequency();
            cpu_sensors.push(Sensor::new(
                format!("Core #{}", i + 1),
                SensorKind::Clock,
                (mhz > 0).then_some(mhz as f64),
            ));
        }

        // sysinfo reports memory in bytes since 0.26
        let used_gb = self.system.used_memory() as f64 / BYTES_PER_GB;
        let available_gb = self.system.available_memory() as f64 / BYTES_PER_GB;
        let memory_sensors = vec![
            Sensor::new(
                "Memory Used",
                SensorKind::DataVolume,
                (used_gb > 0.0).then_some(used_gb),
            ),
            Sensor::new(
                "Memory Available",
                SensorKind::DataVolume,
                (available_gb > 0.0).then_some(available_gb),
            ),
        ];

        debug!(
            cpu_sensors = cpu_sensors.len(),
            memory_sensors = memory_sensors.len(),
            "enumerated hardware sensors"
        );

        Ok(vec![
            Device {
                kind: DeviceKind::Cpu,
                sensors: cpu_sensors,
            },
            Device {
                kind: DeviceKind::Memory,
                sensors: memory_sensors,
            },
        ])
    }
}

/// OS-level memory figures, independent of the sensor backend. On Linux the
/// kernel's own accounting in /proc/meminfo is authoritative; elsewhere the
/// `sysinfo` numbers are used directly.
pub struct OsMemorySource {
    system: System,
}

impl OsMemorySource {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for OsMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackMemorySource for OsMemorySource {
    fn query(&mut self) -> Option<MemoryFigures> {
        #[cfg(target_os = "linux")]
        if let Some(figures) = read_meminfo() {
            return Some(figures);
        }

        self.system.refresh_memory();
        let total_bytes = self.system.total_memory();
        let available_bytes = self.system.available_memory();
        if total_bytes == 0 {
            return None;
        }
        Some(MemoryFigures {
            total_bytes,
            available_bytes,
        })
    }
}

#[cfg(target_os = "linux")]
fn read_meminfo() -> Option<MemoryFigures> {
    let text = fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo(&text)
}

#[allow(dead_code)]
fn parse_meminfo(text: &str) -> Option<MemoryFigures> {
    let mut total_kb = None;
    let mut available_kb = None;
    for line in text.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("MemTotal:") => total_kb = parts.next().and_then(|v| v.parse::<u64>().ok()),
            Some("MemAvailable:") => available_kb = parts.next().and_then(|v| v.parse::<u64>().ok()),
            _ => {}
        }
        if total_kb.is_some() && available_kb.is_some() {
            break;
        }
    }
    Some(MemoryFigures {
        total_bytes: total_kb?.saturating_mul(1024),
        available_bytes: available_kb?.saturating_mul(1024),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meminfo_parses_total_and_available() {
        let text = "MemTotal:       16384000 kB\n\
                    MemFree:         1024000 kB\n\
                    MemAvailable:    8192000 kB\n\
                    Buffers:          512000 kB\n";
        let figures = parse_meminfo(text).expect("meminfo should parse");
        assert_eq!(figures.total_bytes, 16_384_000 * 1024);
        assert_eq!(figures.available_bytes, 8_192_000 * 1024);
    }

    #[test]
    fn meminfo_without_available_yields_none() {
        let text = "MemTotal:       16384000 kB\nMemFree:         1024000 kB\n";
        assert!(parse_meminfo(text).is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn enumerated_memory_agrees_with_meminfo() {
        let text = fs::read_to_string("/proc/meminfo").expect("meminfo should be readable");
        let figures = parse_meminfo(&text).expect("meminfo should parse");
        let total_gb = figures.total_bytes as f64 / BYTES_PER_GB;

        let mut source = SysinfoSource::open().expect("backend should open");
        let devices = source.enumerate().expect("enumeration should succeed");
        let memory = devices
            .iter()
            .find(|d| d.kind == DeviceKind::Memory)
            .expect("memory device should be enumerated");

        // A unit mix-up inflates these figures by orders of magnitude, so a
        // loose bound against the kernel's own total is enough to catch it.
        for sensor in &memory.sensors {
            if let Some(gb) = sensor.value {
                assert!(
                    gb <= total_gb * 1.01,
                    "{} reports {gb:.1} GB on a {total_gb:.1} GB machine",
                    sensor.name
                );
            }
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn fallback_figures_agree_with_meminfo() {
        let text = fs::read_to_string("/proc/meminfo").expect("meminfo should be readable");
        let expected = parse_meminfo(&text).expect("meminfo should parse");

        let figures = OsMemorySource::new()
            .query()
            .expect("fallback should yield figures");
        assert_eq!(figures.total_bytes, expected.total_bytes);
        assert!(figures.available_bytes <= figures.total_bytes);
    }
}
