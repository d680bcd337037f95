use std::sync::Arc;

use randblem_bungie::{BungieError, BungieResult, KeyringTokenStore, TokenStore};
use randblem_store::{JsonPreferenceStore, REFRESH_TOKEN};

pub const KEYRING_SERVICE: &str = "randblem";
pub const KEYRING_ACCOUNT: &str = "refresh-token";

/// Keeps the refresh token under `refresh-token` in the preferences file.
#[derive(Clone, Debug)]
pub struct PreferenceTokenStore(Arc<JsonPreferenceStore>);

impl PreferenceTokenStore {
    pub fn new(preferences: Arc<JsonPreferenceStore>) -> Self {
        Self(preferences)
    }
}

impl TokenStore for PreferenceTokenStore {
    fn load_refresh_token(&self) -> BungieResult<Option<String>> {
        Ok(self
            .0
            .get(REFRESH_TOKEN)
            .map_err(BungieError::token_store)?
            .filter(|token| !token.trim().is_empty()))
    }

    fn save_refresh_token(&self, refresh_token: &str) -> BungieResult<()> {
        self.0
            .set(REFRESH_TOKEN, refresh_token)
            .map_err(BungieError::token_store)
    }

    fn clear_refresh_token(&self) -> BungieResult<()> {
        self.0.set(REFRESH_TOKEN, "").map_err(BungieError::token_store)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TokenBackend {
    #[default]
    Preferences,
    Keyring,
}

/// Refresh-token backend chosen at startup.
#[derive(Clone, Debug)]
pub enum RefreshTokenStore {
    Preferences(PreferenceTokenStore),
    Keyring(KeyringTokenStore),
}

impl TokenStore for RefreshTokenStore {
    fn load_refresh_token(&self) -> BungieResult<Option<String>> {
        match self {
            Self::Preferences(store) => store.load_refresh_token(),
            Self::Keyring(store) => store.load_refresh_token(),
        }
    }

    fn save_refresh_token(&self, refresh_token: &str) -> BungieResult<()> {
        match self {
            Self::Preferences(store) => store.save_refresh_token(refresh_token),
            Self::Keyring(store) => store.save_refresh_token(refresh_token),
        }
    }

    fn clear_refresh_token(&self) -> BungieResult<()> {
        match self {
            Self::Preferences(store) => store.clear_refresh_token(),
            Self::Keyring(store) => store.clear_refresh_token(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use randblem_bungie::TokenStore;
    use randblem_store::{JsonPreferenceStore, REFRESH_TOKEN};

    use super::{PreferenceTokenStore, RefreshTokenStore};

    #[test]
    fn preference_store_round_trips_and_treats_blank_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let preferences = Arc::new(
            JsonPreferenceStore::open(dir.path().join("preferences.json")).expect("open"),
        );
        let store = RefreshTokenStore::Preferences(PreferenceTokenStore::new(Arc::clone(
            &preferences,
        )));

        assert_eq!(store.load_refresh_token().expect("load"), None);

        store.save_refresh_token("refresh-1").expect("save");
        assert_eq!(
            store.load_refresh_token().expect("load").as_deref(),
            Some("refresh-1")
        );
        assert_eq!(
            preferences.get(REFRESH_TOKEN).expect("get").as_deref(),
            Some("refresh-1")
        );

        store.clear_refresh_token().expect("clear");
        assert_eq!(store.load_refresh_token().expect("load"), None);
    }
}
