use crate::air_quality::AirQualityReading;
use crate::forecast::models::{DailyForecast, HourlyRecord};
use crate::rain::RainWindow;

pub const FALLBACK_ADVICE: &str = "오늘 하루도 화이팅! 💪";

const HOURLY_ROWS: usize = 8;
const SHOW_PROBABILITY_FROM: i32 = 30;

/// Up to eight slots from the current hour on, one per line.
pub fn format_hourly_forecast(hourly: &[HourlyRecord], current_hour: u32) -> String {
    hourly
        .iter()
        .filter(|h| h.hour >= current_hour)
        .take(HOURLY_ROWS)
        .map(|h| {
            let period = if h.hour < 12 { "오전" } else { "오후" };
            let display_hour = match h.hour {
                0 => 12,
                hour if hour <= 12 => hour,
                hour => hour - 12,
            };

            let icon = h.sky.map(|s| s.icon()).unwrap_or("☁️");
            let temp = h
                .temperature
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string());

            let pop = h.precipitation_probability.unwrap_or(0);
            let rain_info = if pop >= SHOW_PROBABILITY_FROM {
                format!(" 💧{}%", pop)
            } else {
                String::new()
            };

            format!("{} {}시 {} {}°C{}", period, display_hour, icon, temp, rain_info)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// PM10 and PM2.5 on one line; empty without a reading.
pub fn format_air_quality(air: Option<&AirQualityReading>) -> String {
    match air {
        Some(air) => format!(
            "미세먼지 {}㎍/㎥ {}{} | 초미세 {}㎍/㎥ {}{}",
            air.pm10,
            air.pm10_grade.label(),
            air.pm10_grade.symbol(),
            air.pm25,
            air.pm25_grade.label(),
            air.pm25_grade.symbol()
        ),
        None => String::new(),
    }
}

/// Shown only when both ends are present and non-zero.
pub fn format_temperature_range(min_temp: Option<i32>, max_temp: Option<i32>) -> String {
    match (min_temp, max_temp) {
        (Some(min), Some(max)) if min != 0 && max != 0 => {
            format!("🌡️ 최저 {}°C / 최고 {}°C", min, max)
        }
        _ => String::new(),
    }
}

pub fn format_daily_message(
    forecast: &DailyForecast,
    air: Option<&AirQualityReading>,
    advices: &[String],
    location_label: &str,
    current_hour: u32,
) -> String {
    let advice_text = if advices.is_empty() {
        FALLBACK_ADVICE.to_string()
    } else {
        advices.join("\n")
    };

    format!(
        "{}\n\n📍 {} | 📅 {}\n\n{}\n🌫️ {}\n\n⏰ 시간별 예보\n{}",
        advice_text,
        location_label,
        forecast.date.format("%m월 %d일"),
        format_temperature_range(forecast.min_temp, forecast.max_temp),
        format_air_quality(air),
        format_hourly_forecast(&forecast.today, current_hour)
    )
}

pub fn format_rain_alert(window: &RainWindow) -> String {
    let rain_type = window.precipitation.label();
    let emoji = if window.precipitation.is_snowy() {
        "🌨️"
    } else {
        "🌧️"
    };

    let minutes = window.minutes_until;
    let time_text = if minutes <= 10 {
        "곧".to_string()
    } else if minutes <= 30 {
        format!("{}분 후", minutes)
    } else {
        format!("약 {}분 후", minutes / 10 * 10)
    };

    let mut message = format!("{} {} {} 올 예정! 우산 챙겨!", emoji, time_text, rain_type);

    if let Some(temp) = &window.temperature {
        message.push_str(&format!("\n🌡️ 현재 기온: {}°C", temp));
    }

    message
}
