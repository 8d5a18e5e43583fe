pub mod advice;
pub mod air_quality;
pub mod alert_state;
pub mod config;
pub mod error;
pub mod forecast;
pub mod kakao;
pub mod message;
pub mod pipeline;
pub mod rain;
pub mod store;
