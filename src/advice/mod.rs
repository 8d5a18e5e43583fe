//! Daily advice: independent rules evaluated in a fixed order.

pub mod outfit;
pub mod rules;

use crate::air_quality::AirQualityReading;
use crate::forecast::models::{DailyForecast, HourlyRecord};
use tracing::debug;

pub use outfit::{classify, Gender, TempBand};
pub use rules::{
    AirQualityRule, OutfitRule, SeasonalItemRule, TemperatureSwingRule, TomorrowRainRule,
    UpcomingRainRule,
};

/// Everything a rule may look at.
#[derive(Debug, Clone)]
pub struct AdviceContext<'a> {
    pub today: &'a [HourlyRecord],
    pub tomorrow: &'a [HourlyRecord],
    pub min_temp: Option<i32>,
    pub max_temp: Option<i32>,
    pub air_quality: Option<&'a AirQualityReading>,
    pub gender: Gender,
    pub current_hour: u32,
}

impl<'a> AdviceContext<'a> {
    pub fn new(
        forecast: &'a DailyForecast,
        air_quality: Option<&'a AirQualityReading>,
        gender: Gender,
        current_hour: u32,
    ) -> Self {
        Self {
            today: &forecast.today,
            tomorrow: &forecast.tomorrow,
            min_temp: forecast.min_temp,
            max_temp: forecast.max_temp,
            air_quality,
            gender,
            current_hour,
        }
    }
}

/// One advisory line, or nothing.
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, ctx: &AdviceContext) -> Option<String>;
}

pub struct AdviceEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for AdviceEngine {
    fn default() -> Self {
        Self::new(vec![
            Box::new(UpcomingRainRule),
            Box::new(OutfitRule),
            Box::new(SeasonalItemRule),
            Box::new(TemperatureSwingRule),
            Box::new(AirQualityRule),
            Box::new(TomorrowRainRule),
        ])
    }
}

impl AdviceEngine {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    /// Lines from every rule that fired, in rule order.
    pub fn generate(&self, ctx: &AdviceContext) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let advice = rule.evaluate(ctx);
                if let Some(line) = &advice {
                    debug!("Rule {} fired: {}", rule.name(), line);
                }
                advice
            })
            .collect()
    }
}
