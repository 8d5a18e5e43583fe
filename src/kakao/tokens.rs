use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// OAuth credentials as returned by the token endpoint.
///
/// Fields other than the two tokens (expiry, scope, token type, ...) are kept
/// verbatim so the stored file mirrors what the provider sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenPair {
    /// Apply a refresh response: its fields win, anything it omits is kept.
    pub fn merge(&mut self, update: TokenPair) {
        self.access_token = update.access_token;
        if update.refresh_token.is_some() {
            self.refresh_token = update.refresh_token;
        }
        self.extra.extend(update.extra);
    }
}
