use crate::forecast::models::{HourlyRecord, PrecipitationType};
use chrono::NaiveDateTime;

pub const DEFAULT_WINDOW_MINUTES: i64 = 60;

/// Number of leading slots the daily "does it rain" check looks at.
pub const DAILY_SLOT_LIMIT: usize = 12;

/// The next slot with falling precipitation.
#[derive(Debug, Clone, PartialEq)]
pub struct RainWindow {
    pub precipitation: PrecipitationType,
    pub at: NaiveDateTime,
    /// Whole minutes from `now` to `at`, rounded down.
    pub minutes_until: i64,
    /// Display temperature, published text preferred over the truncated value.
    pub temperature: Option<String>,
    pub rainfall: Option<String>,
}

/// Earliest slot strictly after `now` and at most `window_minutes` later that
/// carries a recognised precipitation type.
pub fn find_upcoming_rain(
    records: &[HourlyRecord],
    now: NaiveDateTime,
    window_minutes: i64,
) -> Option<RainWindow> {
    let window_seconds = window_minutes * 60;

    records.iter().find_map(|record| {
        let at = record.scheduled_at();
        let seconds = (at - now).num_seconds();

        if seconds <= 0 || seconds > window_seconds {
            return None;
        }

        match record.precipitation {
            Some(p) if alerts_on(p) => Some(RainWindow {
                precipitation: p,
                at,
                minutes_until: seconds / 60,
                temperature: record
                    .temperature_reading
                    .clone()
                    .or_else(|| record.temperature.map(|t| t.to_string())),
                rainfall: record.rainfall.clone(),
            }),
            _ => None,
        }
    })
}

/// Ultra-short PTY has no shower code (4), so it counts as no precipitation.
fn alerts_on(precipitation: PrecipitationType) -> bool {
    precipitation.is_precipitating() && precipitation != PrecipitationType::Shower
}

/// Coarse daily check over the first twelve slots.
pub fn rain_expected(records: &[HourlyRecord]) -> bool {
    records
        .iter()
        .take(DAILY_SLOT_LIMIT)
        .any(HourlyRecord::rain_likely)
}

/// First slot with an hour later than `hour` where rain is likely.
pub fn first_rainy_hour_after(records: &[HourlyRecord], hour: u32) -> Option<&HourlyRecord> {
    records
        .iter()
        .filter(|h| h.hour > hour)
        .find(|h| h.rain_likely())
}
