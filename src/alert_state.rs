use crate::error::Result;
use crate::store::JsonFileStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_COOLDOWN_HOURS: i64 = 3;

/// When the last rain alert went out and what it announced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RainAlertState {
    pub last_alert_time: Option<NaiveDateTime>,
    pub last_alert_type: Option<String>,
}

impl RainAlertState {
    /// Overwrite both fields; call only after the alert was delivered.
    pub fn record(&mut self, alert_type: &str, at: NaiveDateTime) {
        self.last_alert_time = Some(at);
        self.last_alert_type = Some(alert_type.to_string());
    }
}

/// Decide whether a rain alert of `candidate_type` should go out at `now`.
///
/// Always on cold start or once the cooldown has elapsed; within the
/// cooldown only when the precipitation type changed.
pub fn should_alert(
    candidate_type: &str,
    state: &RainAlertState,
    now: NaiveDateTime,
    cooldown_hours: i64,
) -> bool {
    let last_alert = match state.last_alert_time {
        Some(at) => at,
        None => return true,
    };

    if (now - last_alert).num_seconds() >= cooldown_hours * 3600 {
        return true;
    }

    state.last_alert_type.as_deref() != Some(candidate_type)
}

/// Persisted alert state; a missing file reads as the cold-start state.
pub struct AlertStateStore {
    store: JsonFileStore<RainAlertState>,
}

impl AlertStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonFileStore::new(path),
        }
    }

    pub fn load(&self) -> Result<RainAlertState> {
        Ok(self.store.load()?.unwrap_or_default())
    }

    pub fn save(&self, state: &RainAlertState) -> Result<()> {
        self.store.save(state)
    }
}
