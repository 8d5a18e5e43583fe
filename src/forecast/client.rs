use crate::config::{ForecastConfig, LocationConfig};
use crate::error::{AppError, Result};
use crate::forecast::models::{DailyForecast, ForecastResponse, HourlyRecord, RawForecastItem};
use crate::forecast::normalizer::{ultra_short_base_time, village_base_time, Normalizer};
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

const RESULT_CODE_OK: &str = "00";
const VILLAGE_ROWS: &str = "1000";
const ULTRA_SHORT_ROWS: &str = "60";

/// Client for the KMA short-range and ultra-short forecast endpoints.
pub struct ForecastClient {
    client: Client,
    config: ForecastConfig,
    nx: u32,
    ny: u32,
}

impl ForecastClient {
    pub fn new(config: &ForecastConfig, location: &LocationConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("weather-notifier/0.1.0")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
            nx: location.nx,
            ny: location.ny,
        })
    }

    /// Today's and tomorrow's short-range forecast as seen at `now`.
    ///
    /// Missing credentials and transport or provider failures are logged and
    /// yield `Ok(None)`. A malformed numeric value is returned as an error.
    pub async fn daily_forecast(&self, now: NaiveDateTime) -> Result<Option<DailyForecast>> {
        if self.config.service_key.is_empty() {
            error!("KMA_SERVICE_KEY is missing.");
            return Ok(None);
        }

        let (base_date, base_time) = village_base_time(now);
        let items = match self
            .fetch_items(&self.config.village_url, base_date, base_time, VILLAGE_ROWS)
            .await
        {
            Ok(items) => items,
            Err(e) => {
                error!("Error fetching weather data: {}", e);
                return Ok(None);
            }
        };

        if items.is_empty() {
            error!("No weather items found in response.");
            return Ok(None);
        }

        let records = Normalizer::normalize(&items)?;
        let forecast = Normalizer::build_daily(records, now.date());

        info!(
            "Forecast for {}: {} slots today, {} tomorrow, min {:?} max {:?}",
            forecast.date,
            forecast.today.len(),
            forecast.tomorrow.len(),
            forecast.min_temp,
            forecast.max_temp
        );

        Ok(Some(forecast))
    }

    /// Ultra-short (six hour) forecast slots as seen at `now`, in time order.
    pub async fn ultra_short_forecast(
        &self,
        now: NaiveDateTime,
    ) -> Result<Option<Vec<HourlyRecord>>> {
        if self.config.service_key.is_empty() {
            error!("KMA_SERVICE_KEY is missing.");
            return Ok(None);
        }

        let (base_date, base_time) = ultra_short_base_time(now);
        let items = match self
            .fetch_items(
                &self.config.ultra_short_url,
                base_date,
                &base_time,
                ULTRA_SHORT_ROWS,
            )
            .await
        {
            Ok(items) => items,
            Err(e) => {
                error!("Error fetching ultra short forecast: {}", e);
                return Ok(None);
            }
        };

        if items.is_empty() {
            error!("No forecast items found.");
            return Ok(None);
        }

        Ok(Some(Normalizer::normalize(&items)?))
    }

    async fn fetch_items(
        &self,
        url: &str,
        base_date: NaiveDate,
        base_time: &str,
        rows: &str,
    ) -> Result<Vec<RawForecastItem>> {
        let base_date = base_date.format("%Y%m%d").to_string();
        let nx = self.nx.to_string();
        let ny = self.ny.to_string();

        debug!(
            "Requesting {} base {} {} grid ({}, {})",
            url, base_date, base_time, nx, ny
        );

        let response = self
            .client
            .get(url)
            .query(&[
                ("serviceKey", self.config.service_key.as_str()),
                ("pageNo", "1"),
                ("numOfRows", rows),
                ("dataType", "JSON"),
                ("base_date", base_date.as_str()),
                ("base_time", base_time),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: ForecastResponse = serde_json::from_str(&body)?;

        if parsed.response.header.result_code != RESULT_CODE_OK {
            return Err(AppError::Api(format!(
                "{} ({})",
                parsed.response.header.result_msg, parsed.response.header.result_code
            )));
        }

        Ok(parsed
            .response
            .body
            .and_then(|b| b.items)
            .map(|i| i.item)
            .unwrap_or_default())
    }
}
