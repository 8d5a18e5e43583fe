pub mod client;
pub mod tokens;

pub use client::KakaoClient;
pub use tokens::TokenPair;
