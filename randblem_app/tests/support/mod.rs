use std::path::PathBuf;

use async_trait::async_trait;
use randblem_app::{AppError, AuthorizationCallback, AuthorizationCodeSource, RandomizerApp};
use randblem_bungie::{BungieConfig, LoginRequest};
use randblem_store::{API_KEY, CLIENT_ID, CLIENT_SECRET, JsonPreferenceStore, REFRESH_TOKEN};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

pub const MEMBERSHIP_ID: &str = "4611686018467284386";
pub const CHARACTER_ID: &str = "2305843009260718001";
pub const PROFILE_PATH: &str = "/Platform/Destiny2/3/Profile/4611686018467284386/";
pub const TOKEN_PATH: &str = "/platform/app/oauth/token/";
pub const EQUIP_PATH: &str = "/Platform/Destiny2/Actions/Items/EquipItem/";
pub const MEMBERSHIPS_PATH: &str = "/Platform/User/GetMembershipsForCurrentUser/";
pub const ORBIT_ACTIVITY_HASH: u32 = 82913930;
pub const EMBLEM_BUCKET_HASH: u32 = 4274335291;

pub struct TestHarness {
    _temp_dir: TempDir,
    preferences_path: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let _ = pretty_env_logger::try_init();
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let preferences_path = temp_dir.path().join("preferences.json");
        Self {
            _temp_dir: temp_dir,
            preferences_path,
        }
    }

    pub fn preferences(&self) -> JsonPreferenceStore {
        JsonPreferenceStore::open(&self.preferences_path).expect("open preferences")
    }

    pub fn with_credentials(self) -> Self {
        let preferences = self.preferences();
        preferences.set(API_KEY, "api-key-value").expect("set api key");
        preferences.set(CLIENT_ID, "12345").expect("set client id");
        preferences
            .set(CLIENT_SECRET, "secret-value")
            .expect("set client secret");
        self
    }

    pub fn with_refresh_token(self, refresh_token: &str) -> Self {
        self.preferences()
            .set(REFRESH_TOKEN, refresh_token)
            .expect("set refresh token");
        self
    }

    pub fn stored_refresh_token(&self) -> Option<String> {
        self.preferences()
            .get(REFRESH_TOKEN)
            .expect("read refresh token")
            .filter(|token| !token.is_empty())
    }

    pub fn app(&self) -> RandomizerApp {
        RandomizerApp::open(Some(self.preferences_path.clone())).expect("open app")
    }

    pub fn bungie_config(&self, app: &RandomizerApp, server: &MockServer) -> BungieConfig {
        app.bungie_config()
            .expect("credentials are configured")
            .with_base_url(server.uri())
    }
}

/// Approves the login immediately, echoing the expected state.
pub struct ApprovingCodeSource {
    pub code: String,
    pub calls: usize,
}

impl ApprovingCodeSource {
    pub fn new(code: &str) -> Self {
        Self {
            code: code.to_owned(),
            calls: 0,
        }
    }
}

#[async_trait]
impl AuthorizationCodeSource for ApprovingCodeSource {
    async fn authorization_code(
        &mut self,
        login: &LoginRequest,
    ) -> Result<AuthorizationCallback, AppError> {
        self.calls += 1;
        Ok(AuthorizationCallback {
            code: self.code.clone(),
            state: Some(login.state.clone()),
        })
    }
}

pub fn envelope(response: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Response": response,
        "ErrorCode": 1,
        "ErrorStatus": "Success",
        "Message": "Ok",
        "MessageData": {}
    }))
}

pub fn token_grant(access_token: &str, refresh_token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "refresh_token": refresh_token,
        "refresh_expires_in": 7776000,
        "membership_id": "14365481"
    }))
}

pub fn memberships() -> Value {
    json!({
        "destinyMemberships": [{
            "membershipId": MEMBERSHIP_ID,
            "membershipType": 3,
            "crossSaveOverride": 0,
            "applicableMembershipTypes": [3],
            "displayName": "Guardian"
        }],
        "bungieNetUser": { "membershipId": "14365481" }
    })
}

pub fn profile(activity_hash: u32, activity_started: &str) -> Value {
    json!({
        "characters": { "data": {
            CHARACTER_ID: {
                "characterId": CHARACTER_ID,
                "dateLastPlayed": "2024-05-01T18:00:00Z",
                "classType": 1
            }
        }},
        "characterActivities": { "data": {
            CHARACTER_ID: {
                "dateActivityStarted": activity_started,
                "currentActivityHash": activity_hash,
                "currentActivityModeHash": 0
            }
        }},
        "characterInventories": { "data": {
            CHARACTER_ID: { "items": [
                { "itemHash": 1, "itemInstanceId": "6917529000000000011", "bucketHash": EMBLEM_BUCKET_HASH },
                { "itemHash": 2, "itemInstanceId": "6917529000000000012", "bucketHash": EMBLEM_BUCKET_HASH },
                { "itemHash": 3, "bucketHash": 1469714392 }
            ]}
        }}
    })
}

pub async fn mount_memberships(server: &MockServer, bearer: &str) {
    Mock::given(method("GET"))
        .and(path(MEMBERSHIPS_PATH))
        .and(header("authorization", format!("Bearer {bearer}").as_str()))
        .and(header("x-api-key", "api-key-value"))
        .respond_with(envelope(memberships()))
        .mount(server)
        .await;
}

pub async fn mount_profile(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(PROFILE_PATH))
        .and(query_param("components", "200,201,204"))
        .respond_with(envelope(body))
        .mount(server)
        .await;
}

pub async fn mount_equip(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(EQUIP_PATH))
        .respond_with(envelope(json!(0)))
        .expect(expected_calls)
        .mount(server)
        .await;
}
