/// One immutable reading of all monitored metrics for a single poll cycle.
/// Every field is independently optional: a value is either a genuine reading,
/// a computation derived from genuine readings, or absent. Nothing carries
/// over between cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub temperature_c: Option<f64>,
    pub memory_used_gb: Option<f64>,
    pub memory_total_gb: Option<f64>,
    pub memory_usage_percent: Option<f64>,
    pub max_clock_mhz: Option<f64>,
}

/// Raise threshold. Temperatures strictly above this are critical.
pub const CRITICAL_TEMP_C: f64 = 80.0;
/// Warning band starts strictly above this.
pub const WARNING_TEMP_C: f64 = 70.0;
/// Clear threshold. An active alert is considered resolved only at or below
/// this value, a deliberate gap below the raise threshold so that a
/// temperature oscillating around 80 does not flap raise/clear.
pub const CLEAR_TEMP_C: f64 = 75.0;
/// Minimum seconds between repeated notifications for an ongoing condition.
/// Bounds notification frequency, not the condition lifetime; independent of
/// the clear threshold above.
pub const NOTIFY_COOLDOWN_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempBand {
    Normal,
    Warning,
    Critical,
}

impl TempBand {
    pub fn of(temperature_c: f64) -> Self {
        if temperature_c > CRITICAL_TEMP_C {
            TempBand::Critical
        } else if temperature_c > WARNING_TEMP_C {
            TempBand::Warning
        } else {
            TempBand::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEventKind {
    Raised,
    Normalized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub temperature_c: f64,
    pub kind: AlertEventKind,
}

/// Alert tracking across poll cycles. Owned by the scheduler, mutated only by
/// `evaluate`; lives in process memory and resets on restart.
#[derive(Debug, Clone, Default)]
pub struct AlertState {
    pub active: bool,
    pub last_notified_at: Option<i64>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the alert state for one cycle and returns at most one event.
    /// Deterministic given the prior state, the snapshot and `now_unix`. An
    /// absent temperature neither raises nor clears anything.
    pub fn evaluate(&mut self, snapshot: &Snapshot, now_unix: i64) -> Option<AlertEvent> {
        let temperature_c = snapshot.temperature_c?;

        match TempBand::of(temperature_c) {
            TempBand::Critical => match self.last_notified_at {
                Some(last) if now_unix - last < NOTIFY_COOLDOWN_SECS => None,
                _ => {
                    self.active = true;
                    self.last_notified_at = Some(now_unix);
                    Some(AlertEvent {
                        temperature_c,
                        kind: AlertEventKind::Raised,
                    })
                }
            },
            TempBand::Warning | TempBand::Normal => {
                if self.active && temperature_c <= CLEAR_TEMP_C {
                    self.active = false;
                    Some(AlertEvent {
                        temperature_c,
                        kind: AlertEventKind::Normalized,
                    })
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(temperature_c: Option<f64>) -> Snapshot {
        Snapshot {
            temperature_c,
            ..Snapshot::default()
        }
    }

    #[test]
    fn critical_raises_once_within_cooldown() {
        let mut state = AlertState::new();

        let event = state.evaluate(&snapshot(Some(85.0)), 0);
        assert_eq!(
            event,
            Some(AlertEvent {
                temperature_c: 85.0,
                kind: AlertEventKind::Raised,
            })
        );
        assert!(state.active);

        assert!(state.evaluate(&snapshot(Some(85.0)), 60).is_none());
        assert!(state.evaluate(&snapshot(Some(85.0)), 120).is_none());
        assert!(state.active);
        assert_eq!(state.last_notified_at, Some(0));
    }

    #[test]
    fn critical_raises_again_after_cooldown() {
        let mut state = AlertState::new();
        state.evaluate(&snapshot(Some(85.0)), 0);

        assert!(state.evaluate(&snapshot(Some(85.0)), 299).is_none());

        let event = state.evaluate(&snapshot(Some(85.0)), 300);
        assert!(matches!(
            event,
            Some(AlertEvent {
                kind: AlertEventKind::Raised,
                ..
            })
        ));
        assert_eq!(state.last_notified_at, Some(300));
    }

    #[test]
    fn normal_temperature_clears_active_alert() {
        let mut state = AlertState::new();
        state.evaluate(&snapshot(Some(85.0)), 0);

        let event = state.evaluate(&snapshot(Some(60.0)), 60);
        assert_eq!(
            event,
            Some(AlertEvent {
                temperature_c: 60.0,
                kind: AlertEventKind::Normalized,
            })
        );
        assert!(!state.active);
    }

    #[test]
    fn warning_band_above_clear_threshold_holds_alert() {
        let mut state = AlertState::new();
        state.evaluate(&snapshot(Some(85.0)), 0);

        // 78 is warning band but still above the clear threshold
        assert!(state.evaluate(&snapshot(Some(78.0)), 60).is_none());
        assert!(state.active);

        let event = state.evaluate(&snapshot(Some(75.0)), 120);
        assert!(matches!(
            event,
            Some(AlertEvent {
                kind: AlertEventKind::Normalized,
                ..
            })
        ));
        assert!(!state.active);
    }

    #[test]
    fn exactly_eighty_is_not_critical() {
        let mut state = AlertState::new();
        assert!(state.evaluate(&snapshot(Some(80.0)), 0).is_none());
        assert!(!state.active);

        assert!(state.evaluate(&snapshot(Some(80.1)), 60).is_some());
    }

    #[test]
    fn absent_temperature_changes_nothing() {
        let mut state = AlertState::new();
        state.evaluate(&snapshot(Some(85.0)), 0);

        assert!(state.evaluate(&snapshot(None), 60).is_none());
        assert!(state.active);
        assert_eq!(state.last_notified_at, Some(0));
    }

    #[test]
    fn normalized_is_not_gated_by_cooldown() {
        let mut state = AlertState::new();
        state.evaluate(&snapshot(Some(85.0)), 0);

        // Clears 10 seconds after the raise; the cooldown only limits raises.
        let event = state.evaluate(&snapshot(Some(50.0)), 10);
        assert!(matches!(
            event,
            Some(AlertEvent {
                kind: AlertEventKind::Normalized,
                ..
            })
        ));
    }

    #[test]
    fn bands_have_inclusive_lower_edges() {
        assert_eq!(TempBand::of(70.0), TempBand::Normal);
        assert_eq!(TempBand::of(70.1), TempBand::Warning);
        assert_eq!(TempBand::of(80.0), TempBand::Warning);
        assert_eq!(TempBand::of(80.1), TempBand::Critical);
    }
}
