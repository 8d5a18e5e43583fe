use crate::config::KakaoConfig;
use crate::error::{AppError, Result};
use crate::kakao::tokens::TokenPair;
use crate::store::JsonFileStore;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, error, info};

const TOKEN_PATH: &str = "/oauth/token";
const MEMO_PATH: &str = "/v2/api/talk/memo/default/send";

/// KakaoTalk "send to me" client holding the persisted token pair.
pub struct KakaoClient {
    client: Client,
    config: KakaoConfig,
    store: JsonFileStore<TokenPair>,
    tokens: Option<TokenPair>,
}

impl KakaoClient {
    /// Build the client and load tokens from the configured file, if present.
    pub fn new(config: &KakaoConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("weather-notifier/0.1.0")
            .timeout(timeout)
            .build()?;

        let store = JsonFileStore::new(&config.token_file);
        let tokens = store.load()?;

        if tokens.is_none() {
            debug!("No token file at {}", store.path().display());
        }

        Ok(Self {
            client,
            config: config.clone(),
            store,
            tokens,
        })
    }

    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    /// Trade a one-time authorization code for the initial token pair and persist it.
    pub async fn exchange_code(&mut self, code: &str) -> Result<TokenPair> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("client_id", self.config.rest_api_key.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code", code),
        ];
        if !self.config.client_secret.is_empty() {
            form.push(("client_secret", self.config.client_secret.as_str()));
        }

        let response = self
            .client
            .post(self.token_url())
            .form(&form)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!("Failed to get tokens: {}", body)));
        }

        let tokens: TokenPair = response.json().await?;
        self.store.save(&tokens)?;
        info!("Tokens saved to {}", self.store.path().display());

        self.tokens = Some(tokens.clone());
        Ok(tokens)
    }

    /// Exchange the refresh token for a new access token, merge and persist.
    pub async fn refresh(&mut self) -> Result<()> {
        let current = self
            .tokens
            .as_ref()
            .ok_or_else(|| AppError::Auth("No tokens loaded".to_string()))?;

        let refresh_token = current.refresh_token.as_deref().ok_or_else(|| {
            AppError::Auth(
                "No refresh token available. Manual authentication required.".to_string(),
            )
        })?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("client_id", self.config.rest_api_key.as_str()),
            ("refresh_token", refresh_token),
        ];
        if !self.config.client_secret.is_empty() {
            form.push(("client_secret", self.config.client_secret.as_str()));
        }

        let update: TokenPair = self
            .client
            .post(self.token_url())
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut merged = current.clone();
        merged.merge(update);
        self.store.save(&merged)?;
        self.tokens = Some(merged);

        info!("Kakao tokens refreshed successfully.");
        Ok(())
    }

    /// Send `text` to the account's own chat.
    ///
    /// A 401 triggers exactly one refresh followed by exactly one retry.
    /// Every failure is logged and reported as `false`.
    pub async fn send_to_me(&mut self, text: &str) -> bool {
        let access_token = match &self.tokens {
            Some(tokens) => tokens.access_token.clone(),
            None => {
                error!("Tokens not found. Please authenticate first.");
                return false;
            }
        };

        let template = self.template_object(text);

        let mut response = match self.post_memo(&access_token, &template).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to send message: {}", e);
                return false;
            }
        };

        if response.status() == StatusCode::UNAUTHORIZED {
            info!("Access token expired. Attempting refresh...");
            if let Err(e) = self.refresh().await {
                error!("Failed to refresh Kakao token: {}", e);
                return false;
            }

            let access_token = match &self.tokens {
                Some(tokens) => tokens.access_token.clone(),
                None => return false,
            };

            response = match self.post_memo(&access_token, &template).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Failed to send message after refresh: {}", e);
                    return false;
                }
            };
        }

        if response.status() == StatusCode::OK {
            info!("Message sent successfully.");
            true
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Failed to send message ({}): {}", status, body);
            false
        }
    }

    async fn post_memo(&self, access_token: &str, template: &str) -> Result<Response> {
        let response = self
            .client
            .post(self.memo_url())
            .bearer_auth(access_token)
            .form(&[("template_object", template)])
            .send()
            .await?;

        debug!("Memo send returned {}", response.status());
        Ok(response)
    }

    fn template_object(&self, text: &str) -> String {
        serde_json::json!({
            "object_type": "text",
            "text": text,
            "link": {
                "web_url": self.config.link_url,
                "mobile_web_url": self.config.link_url,
            },
            "button_title": self.config.button_title,
        })
        .to_string()
    }

    fn token_url(&self) -> String {
        format!("{}{}", self.config.auth_url.trim_end_matches('/'), TOKEN_PATH)
    }

    fn memo_url(&self) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), MEMO_PATH)
    }
}
