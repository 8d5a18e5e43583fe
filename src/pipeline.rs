use crate::advice::{AdviceContext, AdviceEngine, Gender};
use crate::air_quality::AirQualityClient;
use crate::alert_state::{should_alert, AlertStateStore};
use crate::config::Config;
use crate::error::Result;
use crate::forecast::ForecastClient;
use crate::kakao::KakaoClient;
use crate::message::{format_daily_message, format_rain_alert};
use crate::rain::find_upcoming_rain;
use chrono::{NaiveDateTime, TimeDelta, Timelike, Utc};
use std::time::Duration;
use tracing::{debug, error, info};

/// Korea Standard Time has no daylight saving; a fixed +9h shift is exact.
const KST_OFFSET_HOURS: i64 = 9;

/// Current wall-clock time in Korea, which is what every provider speaks.
pub fn kst_now() -> NaiveDateTime {
    (Utc::now() + TimeDelta::hours(KST_OFFSET_HOURS)).naive_utc()
}

/// One notification run: fetch, advise, format, send.
pub struct Pipeline {
    config: Config,
    engine: AdviceEngine,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engine: AdviceEngine::default(),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.http.timeout_seconds)
    }

    /// Build the daily message. `Ok(None)` when the forecast is unavailable;
    /// missing air quality only drops its lines.
    pub async fn compose_daily(&self, now: NaiveDateTime) -> Result<Option<String>> {
        let forecast_client =
            ForecastClient::new(&self.config.forecast, &self.config.location, self.timeout())?;

        let forecast = match forecast_client.daily_forecast(now).await? {
            Some(forecast) => forecast,
            None => return Ok(None),
        };

        if let Some(slot) = forecast.current(now.hour()) {
            debug!(
                "Current conditions at {:02}:00: temperature={:?} sky={:?} precipitation={:?} pop={:?}",
                slot.hour, slot.temperature, slot.sky, slot.precipitation, slot.precipitation_probability
            );
        }

        let air_client = AirQualityClient::new(&self.config.air_quality, self.timeout())?;
        let air_quality = air_client
            .current_by_location(&self.config.location.air_station)
            .await;

        if air_quality.is_none() {
            info!("Continuing without air quality data");
        }

        let gender = Gender::from_preference(&self.config.advice.gender);
        let ctx = AdviceContext::new(&forecast, air_quality.as_ref(), gender, now.hour());
        let advices = self.engine.generate(&ctx);

        info!("Generated {} advice lines", advices.len());

        Ok(Some(format_daily_message(
            &forecast,
            air_quality.as_ref(),
            &advices,
            &self.config.location.label,
            now.hour(),
        )))
    }

    /// Daily briefing. Returns whether a message was delivered.
    pub async fn run_daily(&self, now: NaiveDateTime) -> Result<bool> {
        info!("Starting daily weather run");

        let message = match self.compose_daily(now).await? {
            Some(message) => message,
            None => {
                error!("Failed to fetch weather data.");
                return Ok(false);
            }
        };

        let mut kakao = KakaoClient::new(&self.config.kakao, self.timeout())?;
        let sent = kakao.send_to_me(&message).await;

        if sent {
            info!("Weather update sent successfully.");
        } else {
            error!("Failed to send weather update.");
        }

        Ok(sent)
    }

    /// Rain alert for the next window. State only advances after a delivered alert.
    pub async fn run_rain_alert(&self, now: NaiveDateTime) -> Result<bool> {
        let forecast_client =
            ForecastClient::new(&self.config.forecast, &self.config.location, self.timeout())?;

        let records = forecast_client
            .ultra_short_forecast(now)
            .await?
            .unwrap_or_default();

        let window_minutes = self.config.rain_alert.window_minutes;
        let window = match find_upcoming_rain(&records, now, window_minutes) {
            Some(window) => window,
            None => {
                info!("No rain detected in the next {} minutes.", window_minutes);
                return Ok(false);
            }
        };

        let rain_type = window.precipitation.label();
        let store = AlertStateStore::new(&self.config.rain_alert.state_file);
        let mut state = store.load()?;

        if !should_alert(rain_type, &state, now, self.config.rain_alert.cooldown_hours) {
            info!(
                "Rain detected ({}) but alert was sent recently. Skipping.",
                rain_type
            );
            return Ok(false);
        }

        let message = format_rain_alert(&window);
        info!("Sending rain alert: {}", message);

        let mut kakao = KakaoClient::new(&self.config.kakao, self.timeout())?;
        if !kakao.send_to_me(&message).await {
            error!("Failed to send rain alert.");
            return Ok(false);
        }

        state.record(rain_type, now);
        store.save(&state)?;
        info!("Rain alert sent successfully.");

        Ok(true)
    }
}
