use crate::error::{AppError, Result};
use crate::forecast::models::{
    DailyForecast, HourlyRecord, PrecipitationType, RawForecastItem, SkyState,
};
use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use std::collections::BTreeMap;
use tracing::debug;

/// Daily announcement slots of the short-range forecast (HHMM).
const VILLAGE_BASE_TIMES: [&str; 8] = [
    "0200", "0500", "0800", "1100", "1400", "1700", "2000", "2300",
];

/// Minutes after an announcement before its data is served.
const VILLAGE_PUBLISH_DELAY: u32 = 10;

/// The ultra-short forecast for HH:30 becomes available at HH:45.
const ULTRA_SHORT_READY_MINUTE: u32 = 45;

pub struct Normalizer;

impl Normalizer {
    /// Fold raw category entries into one record per `(date, time)`, ordered by key.
    ///
    /// Each category fills exactly one field; unknown categories are skipped.
    /// A malformed numeric value fails the whole batch.
    pub fn normalize(items: &[RawForecastItem]) -> Result<Vec<HourlyRecord>> {
        let mut slots: BTreeMap<(NaiveDate, u32, u32), HourlyRecord> = BTreeMap::new();

        for item in items {
            let date = parse_date(&item.fcst_date)?;
            let (hour, minute) = parse_time(&item.fcst_time)?;

            let record = slots
                .entry((date, hour, minute))
                .or_insert_with(|| HourlyRecord::new(date, hour, minute));

            let value = item.fcst_value.as_str();
            match item.category.as_str() {
                "TMP" => record.temperature = Some(parse_int(&item.category, value)?),
                "T1H" => {
                    record.temperature = Some(parse_truncated(&item.category, value)?);
                    record.temperature_reading = Some(value.trim().to_string());
                }
                "SKY" => record.sky = Some(SkyState::from_code(value)),
                "PTY" => record.precipitation = Some(PrecipitationType::from_code(value)),
                "POP" => {
                    record.precipitation_probability = Some(parse_int(&item.category, value)?)
                }
                "REH" => record.humidity = Some(parse_int(&item.category, value)?),
                "RN1" => record.rainfall = Some(value.to_string()),
                "TMN" => record.min_temp = Some(parse_truncated(&item.category, value)?),
                "TMX" => record.max_temp = Some(parse_truncated(&item.category, value)?),
                other => debug!("Ignoring forecast category {}", other),
            }
        }

        Ok(slots.into_values().collect())
    }

    /// Split records into today/tomorrow relative to `today` and derive the range.
    ///
    /// Records for any other date are dropped. Published `TMN`/`TMX` values
    /// overwrite the min/max derived from hourly temperatures.
    pub fn build_daily(records: Vec<HourlyRecord>, today: NaiveDate) -> DailyForecast {
        let tomorrow = today.checked_add_days(Days::new(1));

        let mut today_slots = Vec::new();
        let mut tomorrow_slots = Vec::new();

        for record in records {
            if record.date == today {
                today_slots.push(record);
            } else if Some(record.date) == tomorrow {
                tomorrow_slots.push(record);
            }
        }

        let mut min_temp = today_slots.iter().filter_map(|h| h.temperature).min();
        let mut max_temp = today_slots.iter().filter_map(|h| h.temperature).max();

        for slot in &today_slots {
            if slot.min_temp.is_some() {
                min_temp = slot.min_temp;
            }
            if slot.max_temp.is_some() {
                max_temp = slot.max_temp;
            }
        }

        DailyForecast {
            date: today,
            min_temp,
            max_temp,
            today: today_slots,
            tomorrow: tomorrow_slots,
        }
    }
}

/// Latest short-range announcement that is at least ten minutes old.
///
/// Before 02:10 this is the previous day's 23:00 run.
pub fn village_base_time(now: NaiveDateTime) -> (NaiveDate, &'static str) {
    let current = now.hour() * 100 + now.minute();

    for base_time in VILLAGE_BASE_TIMES.iter().rev() {
        let slot: u32 = base_time.parse().unwrap_or(0);
        if current >= slot + VILLAGE_PUBLISH_DELAY {
            return (now.date(), *base_time);
        }
    }

    let yesterday = now.date().pred_opt().unwrap_or(now.date());
    (yesterday, "2300")
}

/// Ultra-short announcement: this hour's :30 run, or the previous hour's before :45.
pub fn ultra_short_base_time(now: NaiveDateTime) -> (NaiveDate, String) {
    let base = if now.minute() < ULTRA_SHORT_READY_MINUTE {
        now - TimeDelta::hours(1)
    } else {
        now
    };

    (base.date(), format!("{:02}30", base.hour()))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y%m%d")
        .map_err(|e| AppError::Parse(format!("Invalid forecast date '{}': {}", s, e)))
}

fn parse_time(s: &str) -> Result<(u32, u32)> {
    let s = s.trim();
    if s.len() != 4 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::Parse(format!("Invalid forecast time '{}'", s)));
    }

    let hour: u32 = s[..2]
        .parse()
        .map_err(|e| AppError::Parse(format!("Invalid forecast hour '{}': {}", s, e)))?;
    let minute: u32 = s[2..]
        .parse()
        .map_err(|e| AppError::Parse(format!("Invalid forecast minute '{}': {}", s, e)))?;

    if hour > 23 || minute > 59 {
        return Err(AppError::Parse(format!(
            "Forecast time '{}' out of range",
            s
        )));
    }

    Ok((hour, minute))
}

fn parse_int(category: &str, s: &str) -> Result<i32> {
    s.trim().parse::<i32>().map_err(|e| {
        AppError::Parse(format!("Failed to parse {} value '{}': {}", category, s, e))
    })
}

/// Parse a decimal value and drop the fraction (`"-3.7"` becomes `-3`).
fn parse_truncated(category: &str, s: &str) -> Result<i32> {
    let value = s.trim().parse::<f64>().map_err(|e| {
        AppError::Parse(format!("Failed to parse {} value '{}': {}", category, s, e))
    })?;

    if !value.is_finite() {
        return Err(AppError::Parse(format!(
            "Non-finite {} value '{}'",
            category, s
        )));
    }

    Ok(value.trunc() as i32)
}
