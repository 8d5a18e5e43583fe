use super::outfit::{classify, outfit, seasonal_item};
use super::{AdviceContext, Rule};
use crate::air_quality::Grade;
use crate::forecast::models::PrecipitationType;
use crate::rain::{first_rainy_hour_after, rain_expected};

/// Minimum daily swing (°C) that warrants carrying an extra layer.
const SWING_THRESHOLD: i32 = 10;

/// A zero reading counts as missing in the temperature rules.
fn truthy(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v != 0)
}

/// `preferred` unless it is missing or zero, then `fallback` as-is.
fn prefer(preferred: Option<i32>, fallback: Option<i32>) -> Option<i32> {
    truthy(preferred).or(fallback)
}

/// Korean clock phrase for an hour of the day.
pub fn format_hour(hour: u32) -> String {
    match hour {
        0 => "자정".to_string(),
        1..=11 => format!("오전 {}시", hour),
        12 => "낮 12시".to_string(),
        _ => format!("오후 {}시", hour - 12),
    }
}

/// Warns about the first rain-likely slot later than the current hour.
pub struct UpcomingRainRule;

impl Rule for UpcomingRainRule {
    fn name(&self) -> &'static str {
        "upcoming_rain"
    }

    fn evaluate(&self, ctx: &AdviceContext) -> Option<String> {
        let first = first_rainy_hour_after(ctx.today, ctx.current_hour)?;

        let rain_type = match first.precipitation {
            Some(p) if p != PrecipitationType::None => p.label(),
            _ => PrecipitationType::Rain.label(),
        };

        Some(format!(
            "{}에 {} 온다니까 우산 챙겨! ☔",
            format_hour(first.hour),
            rain_type
        ))
    }
}

/// Outfit keyed off the day's maximum, falling back to the minimum.
pub struct OutfitRule;

impl Rule for OutfitRule {
    fn name(&self) -> &'static str {
        "outfit"
    }

    fn evaluate(&self, ctx: &AdviceContext) -> Option<String> {
        let temp = prefer(ctx.max_temp, ctx.min_temp)?;
        let outfit = outfit(ctx.gender, classify(temp))?;
        Some(format!("👔 오늘 코디: {}", outfit))
    }
}

/// Cold-weather or sun gear keyed off the minimum, falling back to the maximum.
pub struct SeasonalItemRule;

impl Rule for SeasonalItemRule {
    fn name(&self) -> &'static str {
        "seasonal_item"
    }

    fn evaluate(&self, ctx: &AdviceContext) -> Option<String> {
        let temp = prefer(ctx.min_temp, ctx.max_temp)?;
        seasonal_item(classify(temp)).map(str::to_string)
    }
}

pub struct TemperatureSwingRule;

impl Rule for TemperatureSwingRule {
    fn name(&self) -> &'static str {
        "temperature_swing"
    }

    fn evaluate(&self, ctx: &AdviceContext) -> Option<String> {
        let min = truthy(ctx.min_temp)?;
        let max = truthy(ctx.max_temp)?;

        let swing = max - min;
        if swing >= SWING_THRESHOLD {
            Some(format!("일교차 {}도니까 겉옷 챙겨! 🌡️", swing))
        } else {
            None
        }
    }
}

/// Worst of the two pollutant grades wins; "good" needs both to be good.
pub struct AirQualityRule;

impl Rule for AirQualityRule {
    fn name(&self) -> &'static str {
        "air_quality"
    }

    fn evaluate(&self, ctx: &AdviceContext) -> Option<String> {
        let air = ctx.air_quality?;
        let grades = [air.pm10_grade, air.pm25_grade];

        if grades.contains(&Grade::VeryBad) {
            Some("미세먼지 최악! 외출 자제하고 마스크 필수! 😷".to_string())
        } else if grades.contains(&Grade::Bad) {
            Some("미세먼지 나쁨, 마스크 챙겨! 😷".to_string())
        } else if grades.iter().all(|g| *g == Grade::Good) {
            Some("공기 좋아! 환기하기 좋은 날 🌬️".to_string())
        } else {
            None
        }
    }
}

/// Car-wash reminder when tomorrow's first twelve slots look wet.
pub struct TomorrowRainRule;

impl Rule for TomorrowRainRule {
    fn name(&self) -> &'static str {
        "tomorrow_rain"
    }

    fn evaluate(&self, ctx: &AdviceContext) -> Option<String> {
        if rain_expected(ctx.tomorrow) {
            Some("내일 비 온다니까 세차하지 마! 🚗".to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::Gender;
    use crate::air_quality::AirQualityReading;
    use crate::forecast::models::HourlyRecord;
    use chrono::NaiveDate;

    fn context<'a>(
        today: &'a [HourlyRecord],
        tomorrow: &'a [HourlyRecord],
        min_temp: Option<i32>,
        max_temp: Option<i32>,
    ) -> AdviceContext<'a> {
        AdviceContext {
            today,
            tomorrow,
            min_temp,
            max_temp,
            air_quality: None,
            gender: Gender::Male,
            current_hour: 8,
        }
    }

    fn reading(pm10: Grade, pm25: Grade) -> AirQualityReading {
        AirQualityReading {
            station: "중구".to_string(),
            pm10: "40".to_string(),
            pm10_grade: pm10,
            pm25: "20".to_string(),
            pm25_grade: pm25,
            measured_at: "2024-07-15 08:00".to_string(),
        }
    }

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(0), "자정");
        assert_eq!(format_hour(1), "오전 1시");
        assert_eq!(format_hour(11), "오전 11시");
        assert_eq!(format_hour(12), "낮 12시");
        assert_eq!(format_hour(13), "오후 1시");
        assert_eq!(format_hour(23), "오후 11시");
    }

    #[test]
    fn test_upcoming_rain_uses_type_label() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let mut shower = HourlyRecord::new(date, 15, 0);
        shower.precipitation = Some(PrecipitationType::Shower);
        let today = vec![shower];

        let advice = UpcomingRainRule.evaluate(&context(&today, &[], None, None));
        assert_eq!(advice.as_deref(), Some("오후 3시에 소나기 온다니까 우산 챙겨! ☔"));
    }

    #[test]
    fn test_upcoming_rain_probability_only_says_rain() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let mut cloudy = HourlyRecord::new(date, 10, 0);
        cloudy.precipitation = Some(PrecipitationType::None);
        cloudy.precipitation_probability = Some(60);
        let today = vec![cloudy];

        let advice = UpcomingRainRule.evaluate(&context(&today, &[], None, None));
        assert_eq!(advice.as_deref(), Some("오전 10시에 비 온다니까 우산 챙겨! ☔"));
    }

    #[test]
    fn test_upcoming_rain_ignores_current_hour() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let mut now_slot = HourlyRecord::new(date, 8, 0);
        now_slot.precipitation = Some(PrecipitationType::Rain);
        let today = vec![now_slot];

        assert!(UpcomingRainRule
            .evaluate(&context(&today, &[], None, None))
            .is_none());
    }

    #[test]
    fn test_outfit_prefers_max() {
        let ctx = context(&[], &[], Some(2), Some(30));
        assert_eq!(
            OutfitRule.evaluate(&ctx).as_deref(),
            Some("👔 오늘 코디: 반팔, 반바지")
        );

        let ctx = context(&[], &[], Some(2), None);
        assert_eq!(
            OutfitRule.evaluate(&ctx).as_deref(),
            Some("👔 오늘 코디: 히트텍 + 맨투맨 + 패딩, 기모바지")
        );

        assert!(OutfitRule.evaluate(&context(&[], &[], None, None)).is_none());
    }

    #[test]
    fn test_outfit_zero_max_falls_back_to_min() {
        let ctx = context(&[], &[], Some(-6), Some(0));
        assert_eq!(
            OutfitRule.evaluate(&ctx).as_deref(),
            Some("👔 오늘 코디: 히트텍 + 니트 + 롱패딩, 기모바지")
        );
    }

    #[test]
    fn test_seasonal_item_prefers_min() {
        let ctx = context(&[], &[], Some(-7), Some(3));
        assert_eq!(
            SeasonalItemRule.evaluate(&ctx).as_deref(),
            Some("🔥 손난로 챙기고 핫팩 붙여!")
        );

        let ctx = context(&[], &[], Some(12), Some(18));
        assert!(SeasonalItemRule.evaluate(&ctx).is_none());
    }

    #[test]
    fn test_seasonal_item_zero_min_treated_as_missing() {
        // min 0 would be "very cold"; it is skipped in favour of max
        let ctx = context(&[], &[], Some(0), Some(30));
        assert_eq!(
            SeasonalItemRule.evaluate(&ctx).as_deref(),
            Some("🧴 선크림 바르고 물 많이 마셔!")
        );
    }

    #[test]
    fn test_swing_threshold() {
        let ctx = context(&[], &[], Some(5), Some(15));
        assert_eq!(
            TemperatureSwingRule.evaluate(&ctx).as_deref(),
            Some("일교차 10도니까 겉옷 챙겨! 🌡️")
        );

        let ctx = context(&[], &[], Some(5), Some(14));
        assert!(TemperatureSwingRule.evaluate(&ctx).is_none());
    }

    #[test]
    fn test_swing_zero_endpoint_treated_as_missing() {
        let ctx = context(&[], &[], Some(0), Some(12));
        assert!(TemperatureSwingRule.evaluate(&ctx).is_none());

        let ctx = context(&[], &[], Some(-11), Some(0));
        assert!(TemperatureSwingRule.evaluate(&ctx).is_none());
    }

    #[test]
    fn test_air_quality_levels() {
        let mut ctx = context(&[], &[], None, None);

        let very_bad = reading(Grade::Bad, Grade::VeryBad);
        ctx.air_quality = Some(&very_bad);
        assert!(AirQualityRule.evaluate(&ctx).unwrap().contains("최악"));

        let bad = reading(Grade::Good, Grade::Bad);
        ctx.air_quality = Some(&bad);
        assert!(AirQualityRule.evaluate(&ctx).unwrap().contains("나쁨"));

        let good = reading(Grade::Good, Grade::Good);
        ctx.air_quality = Some(&good);
        assert!(AirQualityRule.evaluate(&ctx).unwrap().contains("공기 좋아"));

        let mixed = reading(Grade::Good, Grade::Moderate);
        ctx.air_quality = Some(&mixed);
        assert!(AirQualityRule.evaluate(&ctx).is_none());

        let pending = reading(Grade::Measuring, Grade::Good);
        ctx.air_quality = Some(&pending);
        assert!(AirQualityRule.evaluate(&ctx).is_none());
    }

    #[test]
    fn test_tomorrow_rain() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 16).unwrap();
        let mut wet = HourlyRecord::new(date, 6, 0);
        wet.precipitation = Some(PrecipitationType::Rain);
        let tomorrow = vec![HourlyRecord::new(date, 5, 0), wet];

        let ctx = context(&[], &tomorrow, None, None);
        assert_eq!(
            TomorrowRainRule.evaluate(&ctx).as_deref(),
            Some("내일 비 온다니까 세차하지 마! 🚗")
        );

        assert!(TomorrowRainRule
            .evaluate(&context(&[], &[], None, None))
            .is_none());
    }
}
