use std::fmt;

use async_trait::async_trait;
use randblem_core::{CharacterId, Identity, ItemInstanceId, MembershipType, ProfileSnapshot};
use reqwest::StatusCode;

use crate::{
    BungieError, BungieResult,
    api::{EquipItemBody, ProfileResponse, TokenResponse, UserMembershipData, read_envelope},
    config::BungieConfig,
};

const API_KEY_HEADER: &str = "X-API-Key";
const TOKEN_PATH: &str = "/platform/app/oauth/token/";
const MEMBERSHIPS_PATH: &str = "/Platform/User/GetMembershipsForCurrentUser/";
const EQUIP_ITEM_PATH: &str = "/Platform/Destiny2/Actions/Items/EquipItem/";

#[derive(Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EquipRequest {
    pub character_id: CharacterId,
    pub item_instance_id: ItemInstanceId,
    pub membership_type: MembershipType,
}

/// Provider OAuth token endpoint.
#[async_trait]
pub trait TokenEndpoint {
    fn authorization_url(&self, state: &str) -> BungieResult<String>;
    async fn exchange_code(&self, code: &str) -> BungieResult<TokenGrant>;
    async fn refresh(&self, refresh_token: &str) -> BungieResult<TokenGrant>;
}

/// Authorized profile and action endpoints. Each call takes the bearer token
/// to use, so a refreshed token is picked up on the very next request.
#[async_trait]
pub trait DestinyApi {
    async fn get_identity(&self, access_token: &str) -> BungieResult<Identity>;
    async fn get_profile(
        &self,
        access_token: &str,
        identity: Identity,
    ) -> BungieResult<ProfileSnapshot>;
    async fn equip_item(&self, access_token: &str, request: EquipRequest) -> BungieResult<()>;
}

#[derive(Clone, Debug)]
pub struct HttpBungieClient {
    http: reqwest::Client,
    config: BungieConfig,
}

impl HttpBungieClient {
    pub fn new(config: BungieConfig) -> BungieResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| BungieError::Transport {
                operation: "http client setup",
                source,
            })?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &BungieConfig {
        &self.config
    }

    async fn token_request(
        &self,
        operation: &'static str,
        form: &[(&str, &str)],
    ) -> BungieResult<TokenGrant> {
        log::trace!("sending {operation} request");
        let response = self
            .http
            .post(self.config.endpoint(TOKEN_PATH)?)
            .header(API_KEY_HEADER, &self.config.api_key)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await
            .map_err(|source| BungieError::AuthTransport { operation, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| BungieError::AuthTransport { operation, source })?;
        if status != StatusCode::OK {
            return Err(BungieError::AuthRejected {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        let tokens: TokenResponse = serde_json::from_str(&body)
            .map_err(|err| BungieError::malformed(operation, err.to_string()))?;
        let access_token = tokens
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(BungieError::AuthMissingField {
                operation,
                field: "access_token",
            })?;
        let refresh_token = tokens
            .refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(BungieError::AuthMissingField {
                operation,
                field: "refresh_token",
            })?;

        Ok(TokenGrant {
            access_token,
            refresh_token,
        })
    }
}

#[async_trait]
impl TokenEndpoint for HttpBungieClient {
    fn authorization_url(&self, state: &str) -> BungieResult<String> {
        Ok(self.config.authorize_url(state)?.into())
    }

    async fn exchange_code(&self, code: &str) -> BungieResult<TokenGrant> {
        self.token_request(
            "authorization code exchange",
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
            ],
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> BungieResult<TokenGrant> {
        self.token_request(
            "token refresh",
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
            ],
        )
        .await
    }
}

#[async_trait]
impl DestinyApi for HttpBungieClient {
    async fn get_identity(&self, access_token: &str) -> BungieResult<Identity> {
        const OPERATION: &str = "membership lookup";

        log::trace!("requesting memberships for current user");
        let response = self
            .http
            .get(self.config.endpoint(MEMBERSHIPS_PATH)?)
            .header(API_KEY_HEADER, &self.config.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| BungieError::Transport {
                operation: OPERATION,
                source,
            })?;

        let memberships: UserMembershipData = read_envelope(OPERATION, response).await?;
        crate::api::identity_from_memberships(&memberships)
    }

    async fn get_profile(
        &self,
        access_token: &str,
        identity: Identity,
    ) -> BungieResult<ProfileSnapshot> {
        const OPERATION: &str = "profile";

        let mut url = self.config.endpoint(&format!(
            "/Platform/Destiny2/{}/Profile/{}/",
            identity.membership_type, identity.membership_id
        ))?;
        url.query_pairs_mut().append_pair(
            "components",
            &randblem_core::destiny::profile_components_query(),
        );

        log::trace!("requesting profile {}", identity.membership_id);
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| BungieError::Transport {
                operation: OPERATION,
                source,
            })?;

        let profile: ProfileResponse = read_envelope(OPERATION, response).await?;
        profile.into_snapshot()
    }

    async fn equip_item(&self, access_token: &str, request: EquipRequest) -> BungieResult<()> {
        const OPERATION: &str = "equip item";

        let body = EquipItemBody {
            item_id: request.item_instance_id.to_string(),
            character_id: request.character_id.to_string(),
            membership_type: request.membership_type.0,
        };

        log::trace!(
            "equipping item {} on character {}",
            request.item_instance_id,
            request.character_id
        );
        let response = self
            .http
            .post(self.config.endpoint(EQUIP_ITEM_PATH)?)
            .header(API_KEY_HEADER, &self.config.api_key)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|source| BungieError::Transport {
                operation: OPERATION,
                source,
            })?;

        match read_envelope::<serde_json::Value>(OPERATION, response).await {
            Ok(_) => Ok(()),
            Err(BungieError::Upstream { status, body, .. }) => {
                Err(BungieError::Equip { status, body })
            }
            Err(err) => Err(err),
        }
    }
}
