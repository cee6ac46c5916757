use crate::state::{AlertEvent, AlertEventKind, Snapshot, TempBand};
use tracing::{error, info, warn};

/// Output side of the pipeline. Receives every snapshot once per tick and at
/// most one alert event per tick; holds no decision logic of its own.
pub trait Presenter {
    fn on_snapshot(&mut self, snapshot: &Snapshot);
    fn on_alert(&mut self, event: &AlertEvent);
}

/// Renders each snapshot as a single status line, at a log level matching the
/// temperature band.
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        let status = status_line(snapshot);
        match snapshot.temperature_c.map(TempBand::of) {
            Some(TempBand::Critical) => error!(%status, "system status"),
            Some(TempBand::Warning) => warn!(%status, "system status"),
            _ => info!(%status, "system status"),
        }
    }

    fn on_alert(&mut self, event: &AlertEvent) {
        match event.kind {
            AlertEventKind::Raised => warn!(
                temperature_c = event.temperature_c,
                "critical CPU temperature"
            ),
            AlertEventKind::Normalized => info!(
                temperature_c = event.temperature_c,
                "CPU temperature normalized"
            ),
        }
    }
}

fn status_line(snapshot: &Snapshot) -> String {
    let mut line = match snapshot.temperature_c {
        Some(t) => format!("CPU: {t:.1}°C"),
        None => "CPU: N/A".to_string(),
    };

    match (snapshot.memory_used_gb, snapshot.memory_total_gb) {
        (Some(used), Some(total)) => {
            line.push_str(&format!(" | RAM: {used:.1}GB/{total:.1}GB"));
            if let Some(percent) = snapshot.memory_usage_percent {
                line.push_str(&format!(" ({percent:.0}%)"));
            }
        }
        _ => line.push_str(" | RAM: N/A"),
    }

    match snapshot.max_clock_mhz {
        Some(mhz) => line.push_str(&format!(" | Clock: {mhz:.0}MHz")),
        None => line.push_str(" | Clock: N/A"),
    }

    line
}
