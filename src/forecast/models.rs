use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

/// Sky condition (`SKY` category).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyState {
    Clear,
    PartlyCloudy,
    Overcast,
    Unknown,
}

impl SkyState {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => SkyState::Clear,
            "3" => SkyState::PartlyCloudy,
            "4" => SkyState::Overcast,
            _ => SkyState::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkyState::Clear => "맑음",
            SkyState::PartlyCloudy => "구름많음",
            SkyState::Overcast => "흐림",
            SkyState::Unknown => "알 수 없음",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SkyState::Clear => "☀️",
            SkyState::PartlyCloudy => "⛅",
            _ => "☁️",
        }
    }
}

/// Precipitation type (`PTY` category), shared by both forecast products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationType {
    None,
    Rain,
    RainSnow,
    Snow,
    Shower,
    Drizzle,
    DrizzleSnowFlurry,
    SnowFlurry,
    Unknown,
}

impl PrecipitationType {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => PrecipitationType::None,
            "1" => PrecipitationType::Rain,
            "2" => PrecipitationType::RainSnow,
            "3" => PrecipitationType::Snow,
            "4" => PrecipitationType::Shower,
            "5" => PrecipitationType::Drizzle,
            "6" => PrecipitationType::DrizzleSnowFlurry,
            "7" => PrecipitationType::SnowFlurry,
            _ => PrecipitationType::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PrecipitationType::None => "없음",
            PrecipitationType::Rain => "비",
            PrecipitationType::RainSnow => "비/눈",
            PrecipitationType::Snow => "눈",
            PrecipitationType::Shower => "소나기",
            PrecipitationType::Drizzle => "빗방울",
            PrecipitationType::DrizzleSnowFlurry => "빗방울눈날림",
            PrecipitationType::SnowFlurry => "눈날림",
            PrecipitationType::Unknown => "알 수 없음",
        }
    }

    /// True for a recognised falling-precipitation code.
    pub fn is_precipitating(&self) -> bool {
        !matches!(self, PrecipitationType::None | PrecipitationType::Unknown)
    }

    pub fn is_snowy(&self) -> bool {
        matches!(
            self,
            PrecipitationType::Snow
                | PrecipitationType::RainSnow
                | PrecipitationType::DrizzleSnowFlurry
        )
    }
}

/// One forecast slot, assembled from every category sharing its date and time.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyRecord {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
    pub temperature: Option<i32>,
    /// Ultra-short temperature (`T1H`) as published, decimals included.
    pub temperature_reading: Option<String>,
    pub sky: Option<SkyState>,
    pub precipitation: Option<PrecipitationType>,
    pub precipitation_probability: Option<i32>,
    pub humidity: Option<i32>,
    /// Hourly rainfall as published (`RN1`), display only.
    pub rainfall: Option<String>,
    /// Daily minimum (`TMN`) carried on the slot it was published with.
    pub min_temp: Option<i32>,
    /// Daily maximum (`TMX`) carried on the slot it was published with.
    pub max_temp: Option<i32>,
}

impl HourlyRecord {
    pub fn new(date: NaiveDate, hour: u32, minute: u32) -> Self {
        Self {
            date,
            hour,
            minute,
            temperature: None,
            temperature_reading: None,
            sky: None,
            precipitation: None,
            precipitation_probability: None,
            humidity: None,
            rainfall: None,
            min_temp: None,
            max_temp: None,
        }
    }

    pub fn scheduled_at(&self) -> NaiveDateTime {
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN);
        self.date.and_time(time)
    }

    /// Coarse "rain likely" test: any type other than none, or probability of 60% and up.
    pub fn rain_likely(&self) -> bool {
        let typed = matches!(self.precipitation, Some(p) if p != PrecipitationType::None);
        typed || self.precipitation_probability.unwrap_or(0) >= 60
    }
}

/// Today's and tomorrow's slots plus today's temperature range.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub min_temp: Option<i32>,
    pub max_temp: Option<i32>,
    pub today: Vec<HourlyRecord>,
    pub tomorrow: Vec<HourlyRecord>,
}

impl DailyForecast {
    /// First slot of today at or after `hour`.
    pub fn current(&self, hour: u32) -> Option<&HourlyRecord> {
        self.today.iter().find(|h| h.hour >= hour)
    }
}

// --- Provider response envelopes ---

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub response: ForecastEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ForecastEnvelope {
    pub header: ResponseHeader,
    #[serde(default)]
    pub body: Option<ForecastBody>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseHeader {
    #[serde(rename = "resultCode")]
    pub result_code: String,
    #[serde(rename = "resultMsg", default)]
    pub result_msg: String,
}

#[derive(Debug, Deserialize)]
pub struct ForecastBody {
    #[serde(default)]
    pub items: Option<ForecastItems>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItems {
    #[serde(default)]
    pub item: Vec<RawForecastItem>,
}

/// One `(date, time, category, value)` entry as published.
#[derive(Debug, Clone, Deserialize)]
pub struct RawForecastItem {
    #[serde(rename = "fcstDate")]
    pub fcst_date: String,
    #[serde(rename = "fcstTime")]
    pub fcst_time: String,
    pub category: String,
    #[serde(rename = "fcstValue")]
    pub fcst_value: String,
}

impl RawForecastItem {
    pub fn new(date: &str, time: &str, category: &str, value: &str) -> Self {
        Self {
            fcst_date: date.to_string(),
            fcst_time: time.to_string(),
            category: category.to_string(),
            fcst_value: value.to_string(),
        }
    }
}
