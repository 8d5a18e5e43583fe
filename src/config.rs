use crate::error::{AppError, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub location: LocationConfig,
    pub forecast: ForecastConfig,
    pub air_quality: AirQualityConfig,
    pub kakao: KakaoConfig,
    #[serde(default)]
    pub advice: AdviceConfig,
    #[serde(default)]
    pub rain_alert: RainAlertConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    #[serde(default = "default_location_label")]
    pub label: String,
    #[serde(default = "default_nx", deserialize_with = "deserialize_grid")]
    pub nx: u32,
    #[serde(default = "default_ny", deserialize_with = "deserialize_grid")]
    pub ny: u32,
    /// Neighbourhood or station name; resolved through the station alias table.
    #[serde(default = "default_air_station")]
    pub air_station: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            label: default_location_label(),
            nx: default_nx(),
            ny: default_ny(),
            air_station: default_air_station(),
        }
    }
}

fn default_location_label() -> String {
    "서울".to_string()
}

fn default_nx() -> u32 {
    60
}

fn default_ny() -> u32 {
    127
}

fn default_air_station() -> String {
    "중구".to_string()
}

/// Custom deserializer that handles grid coordinates as both number and string
///
/// Accepts:
/// - `nx: 60` (number)
/// - `nx: "60"` (string that parses to number)
/// - `nx: ${GRID_NX:-60}` (env var substituted to either)
fn deserialize_grid<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GridValue {
        Number(u32),
        String(String),
    }

    match GridValue::deserialize(deserializer)? {
        GridValue::Number(n) => Ok(n),
        GridValue::String(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| serde::de::Error::custom(format!("Invalid grid coordinate: '{}'", s))),
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    /// Empty when `KMA_SERVICE_KEY` is unset; checked at request time.
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_village_url")]
    pub village_url: String,
    #[serde(default = "default_ultra_short_url")]
    pub ultra_short_url: String,
}

fn default_village_url() -> String {
    "https://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getVilageFcst".to_string()
}

fn default_ultra_short_url() -> String {
    "https://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getUltraSrtFcst".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AirQualityConfig {
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_air_quality_url")]
    pub base_url: String,
}

fn default_air_quality_url() -> String {
    "https://apis.data.go.kr/B552584/ArpltnInforInqireSvc/getMsrstnAcctoRltmMesureDnsty"
        .to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct KakaoConfig {
    #[serde(default)]
    pub rest_api_key: String,
    /// Only sent when non-empty.
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    #[serde(default = "default_link_url")]
    pub link_url: String,
    #[serde(default = "default_button_title")]
    pub button_title: String,
}

fn default_redirect_uri() -> String {
    "https://localhost.com".to_string()
}

fn default_auth_url() -> String {
    "https://kauth.kakao.com".to_string()
}

fn default_api_url() -> String {
    "https://kapi.kakao.com".to_string()
}

fn default_token_file() -> PathBuf {
    PathBuf::from("kakao_tokens.json")
}

fn default_link_url() -> String {
    "https://www.weather.go.kr".to_string()
}

fn default_button_title() -> String {
    "날씨 상세보기".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdviceConfig {
    #[serde(default = "default_gender")]
    pub gender: String,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            gender: default_gender(),
        }
    }
}

fn default_gender() -> String {
    "male".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RainAlertConfig {
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_window_minutes")]
    pub window_minutes: i64,
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: i64,
}

impl Default for RainAlertConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            window_minutes: default_window_minutes(),
            cooldown_hours: default_cooldown_hours(),
        }
    }
}

fn default_state_file() -> PathBuf {
    PathBuf::from("rain_alert_state.json")
}

fn default_window_minutes() -> i64 {
    crate::rain::DEFAULT_WINDOW_MINUTES
}

fn default_cooldown_hours() -> i64 {
    crate::alert_state::DEFAULT_COOLDOWN_HOURS
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration text after substituting environment variables.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;

        serde_yaml::from_str(&expanded)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate configuration values
    ///
    /// Checks for:
    /// - Valid HTTPS endpoint URLs
    /// - Positive timeout, window and cooldown
    /// - Non-zero grid coordinates
    pub fn validate(&self) -> Result<()> {
        let endpoints = [
            ("forecast.village_url", &self.forecast.village_url),
            ("forecast.ultra_short_url", &self.forecast.ultra_short_url),
            ("air_quality.base_url", &self.air_quality.base_url),
            ("kakao.auth_url", &self.kakao.auth_url),
            ("kakao.api_url", &self.kakao.api_url),
        ];

        for (field_name, value) in &endpoints {
            let parsed = url::Url::parse(value).map_err(|e| {
                AppError::Config(format!("Invalid {} '{}': {}", field_name, value, e))
            })?;

            if parsed.scheme() != "https" {
                return Err(AppError::Config(format!(
                    "{} must use HTTPS, got: {}",
                    field_name,
                    parsed.scheme()
                )));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(AppError::Config(
                "http.timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.location.nx == 0 || self.location.ny == 0 {
            return Err(AppError::Config(format!(
                "Grid coordinates must be non-zero, got nx={} ny={}",
                self.location.nx, self.location.ny
            )));
        }

        if self.rain_alert.window_minutes <= 0 {
            return Err(AppError::Config(
                "rain_alert.window_minutes must be greater than 0".to_string(),
            ));
        }

        if self.rain_alert.cooldown_hours <= 0 {
            return Err(AppError::Config(
                "rain_alert.cooldown_hours must be greater than 0".to_string(),
            ));
        }

        // Credentials are optional at load time; each service reports its own gap.
        if self.kakao.rest_api_key.is_empty() {
            tracing::warn!("KAKAO_REST_API_KEY is not set, token refresh will fail");
        }

        Ok(())
    }
}

/// Substitute `${NAME}` and `${NAME:-default}` with environment values.
///
/// A placeholder without a default whose variable is unset is an error.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = content.to_string();
    let re = regex_lite::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:-([^}]*))?\}")
        .map_err(|e| AppError::Config(format!("Invalid placeholder pattern: {}", e)))?;

    let mut missing_vars = Vec::new();

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let value = match (std::env::var(var_name), cap.get(3)) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.as_str().to_string(),
            (Err(_), None) => {
                missing_vars.push(var_name.to_string());
                continue;
            }
        };
        result = result.replace(&cap[0], &value);
    }

    if !missing_vars.is_empty() {
        return Err(AppError::Config(format!(
            "Missing required environment variable{}: {}\n\n\
             To fix this:\n\
             1. Create a .env file in the project root (copy .env.example)\n\
             2. Set the missing variable{}: export {}=<value>\n\
             3. Or give the placeholder a default: ${{{}:-value}}",
            if missing_vars.len() > 1 { "s" } else { "" },
            missing_vars.join(", "),
            if missing_vars.len() > 1 { "s" } else { "" },
            missing_vars[0],
            missing_vars[0]
        )));
    }

    Ok(result)
}
