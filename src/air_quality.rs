use crate::config::AirQualityConfig;
use crate::error::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

/// Sentinel shown when a concentration is not reported.
const UNMEASURED: &str = "-";

/// Neighbourhood names mapped to official AirKorea station names.
const STATION_ALIASES: [(&str, &str); 7] = [
    ("서울", "중구"),
    ("청담", "강남구"),
    ("강남", "강남구"),
    ("구의", "광진구"),
    ("광진", "광진구"),
    ("송파", "송파구"),
    ("잠실", "송파구"),
];

/// AirKorea four-level grade scale, plus a placeholder for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grade {
    Good,
    Moderate,
    Bad,
    VeryBad,
    Measuring,
}

impl Grade {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("1") => Grade::Good,
            Some("2") => Grade::Moderate,
            Some("3") => Grade::Bad,
            Some("4") => Grade::VeryBad,
            _ => Grade::Measuring,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::Good => "좋음",
            Grade::Moderate => "보통",
            Grade::Bad => "나쁨",
            Grade::VeryBad => "매우나쁨",
            Grade::Measuring => "측정중",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Grade::Good => "😊",
            Grade::Moderate => "🙂",
            Grade::Bad => "😷",
            Grade::VeryBad => "🚨",
            Grade::Measuring => "⏳",
        }
    }
}

/// `(label, symbol)` for a raw grade code. Total over all inputs.
pub fn grade(code: Option<&str>) -> (&'static str, &'static str) {
    let grade = Grade::from_code(code);
    (grade.label(), grade.symbol())
}

/// Official station name for a neighbourhood alias; unknown names pass through.
pub fn resolve_station(location: &str) -> &str {
    STATION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == location)
        .map(|(_, station)| *station)
        .unwrap_or(location)
}

/// Latest measurement at one station. Concentrations are display strings.
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityReading {
    pub station: String,
    pub pm10: String,
    pub pm10_grade: Grade,
    pub pm25: String,
    pub pm25_grade: Grade,
    pub measured_at: String,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    response: AirQualityEnvelope,
}

#[derive(Debug, Deserialize)]
struct AirQualityEnvelope {
    #[serde(default)]
    body: Option<AirQualityBody>,
}

#[derive(Debug, Deserialize)]
struct AirQualityBody {
    #[serde(default)]
    items: Vec<RawMeasurement>,
}

#[derive(Debug, Deserialize)]
struct RawMeasurement {
    #[serde(rename = "pm10Value", default)]
    pm10_value: Option<String>,
    #[serde(rename = "pm25Value", default)]
    pm25_value: Option<String>,
    #[serde(rename = "pm10Grade", default)]
    pm10_grade: Option<String>,
    #[serde(rename = "pm25Grade", default)]
    pm25_grade: Option<String>,
    #[serde(rename = "dataTime", default)]
    data_time: Option<String>,
}

pub struct AirQualityClient {
    client: Client,
    config: AirQualityConfig,
}

impl AirQualityClient {
    pub fn new(config: &AirQualityConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("weather-notifier/0.1.0")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Reading for a neighbourhood or station name, resolved through the alias table.
    pub async fn current_by_location(&self, location: &str) -> Option<AirQualityReading> {
        self.current(resolve_station(location)).await
    }

    /// Most recent reading for `station`; every failure is logged and yields `None`.
    pub async fn current(&self, station: &str) -> Option<AirQualityReading> {
        if self.config.service_key.is_empty() {
            error!("AIRKOREA_SERVICE_KEY is missing.");
            return None;
        }

        match self.fetch(station).await {
            Ok(Some(reading)) => {
                info!(
                    "Air quality at {}: PM10 {} {}, PM2.5 {} {}",
                    reading.station,
                    reading.pm10,
                    reading.pm10_grade.label(),
                    reading.pm25,
                    reading.pm25_grade.label()
                );
                Some(reading)
            }
            Ok(None) => {
                error!("No air quality data found for station: {}", station);
                None
            }
            Err(e) => {
                error!("Error fetching air quality data: {}", e);
                None
            }
        }
    }

    async fn fetch(&self, station: &str) -> Result<Option<AirQualityReading>> {
        debug!("Requesting air quality for station {}", station);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("serviceKey", self.config.service_key.as_str()),
                ("returnType", "json"),
                ("numOfRows", "1"),
                ("pageNo", "1"),
                ("stationName", station),
                ("dataTerm", "DAILY"),
                ("ver", "1.0"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let parsed: AirQualityResponse = serde_json::from_str(&body)?;

        let item = match parsed.response.body.and_then(|b| b.items.into_iter().next()) {
            Some(item) => item,
            None => return Ok(None),
        };

        Ok(Some(AirQualityReading {
            station: station.to_string(),
            pm10: item.pm10_value.unwrap_or_else(|| UNMEASURED.to_string()),
            pm10_grade: Grade::from_code(item.pm10_grade.as_deref()),
            pm25: item.pm25_value.unwrap_or_else(|| UNMEASURED.to_string()),
            pm25_grade: Grade::from_code(item.pm25_grade.as_deref()),
            measured_at: item.data_time.unwrap_or_default(),
        }))
    }
}
