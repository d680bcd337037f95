use async_trait::async_trait;
use randblem_core::{Identity, ProfileSnapshot};

use crate::{
    BungieResult,
    auth::{AuthService, with_reauth},
    client::{DestinyApi, EquipRequest, TokenEndpoint},
    token_store::TokenStore,
};

/// Authenticated view of the Destiny endpoints used by the poller.
#[async_trait]
pub trait DestinyClient {
    async fn resolve_identity(&mut self) -> BungieResult<Identity>;
    async fn fetch_profile(&mut self, identity: Identity) -> BungieResult<ProfileSnapshot>;
    async fn equip_item(&mut self, request: EquipRequest) -> BungieResult<()>;
}

/// Pairs the API with the session that authorizes it. Every call goes
/// through [`with_reauth`], so a rejected access token is refreshed once.
pub struct ManagedDestinyClient<D, A, S>
where
    D: DestinyApi,
    A: TokenEndpoint,
    S: TokenStore,
{
    api: D,
    auth: AuthService<A, S>,
}

impl<D, A, S> ManagedDestinyClient<D, A, S>
where
    D: DestinyApi,
    A: TokenEndpoint,
    S: TokenStore,
{
    pub fn new(api: D, auth: AuthService<A, S>) -> Self {
        Self { api, auth }
    }

    pub fn auth(&self) -> &AuthService<A, S> {
        &self.auth
    }
}

#[async_trait]
impl<D, A, S> DestinyClient for ManagedDestinyClient<D, A, S>
where
    D: DestinyApi + Send + Sync,
    A: TokenEndpoint + Send + Sync,
    S: TokenStore + Send + Sync,
{
    async fn resolve_identity(&mut self) -> BungieResult<Identity> {
        let api = &self.api;
        with_reauth(&mut self.auth, "membership lookup", |token| async move {
            api.get_identity(&token).await
        })
        .await
    }

    async fn fetch_profile(&mut self, identity: Identity) -> BungieResult<ProfileSnapshot> {
        let api = &self.api;
        with_reauth(&mut self.auth, "profile", |token| async move {
            api.get_profile(&token, identity).await
        })
        .await
    }

    async fn equip_item(&mut self, request: EquipRequest) -> BungieResult<()> {
        let api = &self.api;
        with_reauth(&mut self.auth, "equip item", |token| async move {
            api.equip_item(&token, request).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use randblem_core::{
        CharacterId, Identity, ItemInstanceId, MembershipId, MembershipType, ProfileSnapshot,
    };

    use super::{DestinyClient, ManagedDestinyClient};
    use crate::{
        BungieError, BungieResult,
        auth::AuthService,
        client::{DestinyApi, EquipRequest, TokenEndpoint, TokenGrant},
        token_store::{MemoryTokenStore, TokenStore},
    };

    #[derive(Clone, Default)]
    struct StubEndpoint {
        refreshes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TokenEndpoint for StubEndpoint {
        fn authorization_url(&self, state: &str) -> BungieResult<String> {
            Ok(format!("https://auth.example/?state={state}"))
        }

        async fn exchange_code(&self, _code: &str) -> BungieResult<TokenGrant> {
            Err(BungieError::message("not used"))
        }

        async fn refresh(&self, _refresh_token: &str) -> BungieResult<TokenGrant> {
            let count = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TokenGrant {
                access_token: format!("access-{count}"),
                refresh_token: format!("refresh-{count}"),
            })
        }
    }

    #[derive(Default)]
    struct ScriptedApi {
        identity_results: Mutex<VecDeque<BungieResult<Identity>>>,
        equip_results: Mutex<VecDeque<BungieResult<()>>>,
        tokens_seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DestinyApi for ScriptedApi {
        async fn get_identity(&self, access_token: &str) -> BungieResult<Identity> {
            self.tokens_seen
                .lock()
                .expect("tokens lock")
                .push(access_token.to_owned());
            self.identity_results
                .lock()
                .expect("identity lock")
                .pop_front()
                .unwrap_or_else(|| Err(BungieError::message("no identity configured")))
        }

        async fn get_profile(
            &self,
            access_token: &str,
            _identity: Identity,
        ) -> BungieResult<ProfileSnapshot> {
            self.tokens_seen
                .lock()
                .expect("tokens lock")
                .push(access_token.to_owned());
            Ok(ProfileSnapshot::default())
        }

        async fn equip_item(&self, access_token: &str, _request: EquipRequest) -> BungieResult<()> {
            self.tokens_seen
                .lock()
                .expect("tokens lock")
                .push(access_token.to_owned());
            self.equip_results
                .lock()
                .expect("equip lock")
                .pop_front()
                .unwrap_or(Ok(()))
        }
    }

    fn identity() -> Identity {
        Identity {
            membership_type: MembershipType::STEAM,
            membership_id: MembershipId(4611686018467284386),
        }
    }

    fn unauthorized() -> BungieError {
        BungieError::Unauthorized {
            operation: "membership lookup",
        }
    }

    type TestClient = ManagedDestinyClient<ScriptedApi, StubEndpoint, Arc<MemoryTokenStore>>;

    fn managed(api: ScriptedApi, endpoint: StubEndpoint) -> (TestClient, Arc<MemoryTokenStore>) {
        let store = Arc::new(MemoryTokenStore::with_refresh_token("refresh-0"));
        let mut auth = AuthService::new(endpoint, Arc::clone(&store));
        auth.restore().expect("restore works");
        (ManagedDestinyClient::new(api, auth), store)
    }

    #[tokio::test]
    async fn first_call_refreshes_missing_access_token() {
        let endpoint = StubEndpoint::default();
        let api = ScriptedApi::default();
        api.identity_results
            .lock()
            .expect("identity lock")
            .push_back(Ok(identity()));
        let (mut client, _store) = managed(api, endpoint.clone());

        let resolved = client.resolve_identity().await.expect("identity resolves");

        assert_eq!(resolved, identity());
        assert_eq!(endpoint.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(
            *client.api.tokens_seen.lock().expect("tokens lock"),
            vec!["access-1".to_owned()]
        );
    }

    #[tokio::test]
    async fn rejected_token_refreshes_once_and_persists_rotated_token() {
        let endpoint = StubEndpoint::default();
        let api = ScriptedApi::default();
        api.identity_results.lock().expect("identity lock").extend([
            Ok(identity()),
            Err(unauthorized()),
            Ok(identity()),
        ]);
        let (mut client, store) = managed(api, endpoint.clone());

        client.resolve_identity().await.expect("initial call");
        client.resolve_identity().await.expect("retry after refresh");

        assert_eq!(endpoint.refreshes.load(Ordering::SeqCst), 2);
        assert_eq!(
            *client.api.tokens_seen.lock().expect("tokens lock"),
            vec![
                "access-1".to_owned(),
                "access-1".to_owned(),
                "access-2".to_owned()
            ]
        );
        assert_eq!(
            client
                .auth()
                .session()
                .refresh_token()
                .map(str::to_owned),
            Some("refresh-2".to_owned())
        );
        assert_eq!(
            store.load_refresh_token().expect("load"),
            Some("refresh-2".to_owned())
        );
    }

    #[tokio::test]
    async fn repeated_401_stops_after_one_refresh() {
        let endpoint = StubEndpoint::default();
        let api = ScriptedApi::default();
        api.identity_results.lock().expect("identity lock").extend([
            Ok(identity()),
            Err(unauthorized()),
            Err(unauthorized()),
            Ok(identity()),
        ]);
        let (mut client, _store) = managed(api, endpoint.clone());
        client.resolve_identity().await.expect("initial call");

        let err = client
            .resolve_identity()
            .await
            .expect_err("second 401 surfaces");

        assert!(matches!(err, BungieError::NotAuthenticated { .. }));
        assert_eq!(endpoint.refreshes.load(Ordering::SeqCst), 2);
        assert_eq!(client.api.tokens_seen.lock().expect("tokens lock").len(), 3);
    }

    #[tokio::test]
    async fn equip_errors_other_than_401_are_not_retried() {
        let endpoint = StubEndpoint::default();
        let api = ScriptedApi::default();
        api.equip_results
            .lock()
            .expect("equip lock")
            .push_back(Err(BungieError::Equip {
                status: 500,
                body: "DestinyItemNotFound".to_owned(),
            }));
        let (mut client, _store) = managed(api, endpoint.clone());

        let err = client
            .equip_item(EquipRequest {
                character_id: CharacterId(2305843009260718999),
                item_instance_id: ItemInstanceId(6917529123456789012),
                membership_type: MembershipType::STEAM,
            })
            .await
            .expect_err("equip fails");

        assert!(matches!(err, BungieError::Equip { status: 500, .. }));
        assert_eq!(endpoint.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(client.api.tokens_seen.lock().expect("tokens lock").len(), 1);
    }
}
