use std::{fmt, time::Duration};

use url::Url;

use crate::{BungieError, BungieResult};

pub const DEFAULT_BASE_URL: &str = "https://www.bungie.net";
pub const DEFAULT_USER_AGENT: &str = concat!("randblem/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const AUTHORIZE_PATH: &str = "/en/OAuth/Authorize/";

#[derive(Clone, PartialEq, Eq)]
pub struct BungieConfig {
    pub api_key: String,
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl BungieConfig {
    pub fn new(
        api_key: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn validate(&self) -> BungieResult<()> {
        let missing: Vec<&'static str> = [
            ("api-key", &self.api_key),
            ("client-id", &self.client_id),
            ("client-secret", &self.client_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key)
        .collect();
        if !missing.is_empty() {
            return Err(BungieError::MissingCredentials { keys: missing });
        }

        if self.user_agent.trim().is_empty() {
            return Err(BungieError::InvalidConfig("user_agent must be set"));
        }
        if self.request_timeout.is_zero() {
            return Err(BungieError::InvalidConfig(
                "request_timeout must be greater than zero",
            ));
        }
        self.endpoint("/")?;
        Ok(())
    }

    pub fn endpoint(&self, path: &str) -> BungieResult<Url> {
        Ok(Url::parse(&self.base_url)?.join(path)?)
    }

    pub fn authorize_url(&self, state: &str) -> BungieResult<Url> {
        let mut url = self.endpoint(AUTHORIZE_PATH)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("state", state);
        Ok(url)
    }
}

impl fmt::Debug for BungieConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BungieConfig")
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
