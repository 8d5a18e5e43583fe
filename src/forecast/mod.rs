pub mod client;
pub mod models;
pub mod normalizer;

pub use client::ForecastClient;
pub use models::{DailyForecast, HourlyRecord, PrecipitationType, RawForecastItem, SkyState};
pub use normalizer::Normalizer;
