use std::sync::Mutex;

use keyring::Entry;

use crate::BungieResult;

/// Durable home of the refresh token. Access tokens are never persisted.
pub trait TokenStore {
    fn load_refresh_token(&self) -> BungieResult<Option<String>>;
    fn save_refresh_token(&self, refresh_token: &str) -> BungieResult<()>;
    fn clear_refresh_token(&self) -> BungieResult<()>;
}

#[derive(Clone, Debug)]
pub struct KeyringTokenStore {
    service: String,
    account: String,
}

impl KeyringTokenStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self) -> BungieResult<Entry> {
        Ok(Entry::new(&self.service, &self.account)?)
    }
}

impl TokenStore for KeyringTokenStore {
    fn load_refresh_token(&self) -> BungieResult<Option<String>> {
        match self.entry()?.get_password() {
            Ok(raw) if raw.is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save_refresh_token(&self, refresh_token: &str) -> BungieResult<()> {
        self.entry()?.set_password(refresh_token)?;
        Ok(())
    }

    fn clear_refresh_token(&self) -> BungieResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Process-local store; the token is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    refresh_token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_refresh_token(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: Mutex::new(Some(refresh_token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        match self.refresh_token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load_refresh_token(&self) -> BungieResult<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save_refresh_token(&self, refresh_token: &str) -> BungieResult<()> {
        *self.slot() = Some(refresh_token.to_owned());
        Ok(())
    }

    fn clear_refresh_token(&self) -> BungieResult<()> {
        *self.slot() = None;
        Ok(())
    }
}

impl<T> TokenStore for std::sync::Arc<T>
where
    T: TokenStore + ?Sized,
{
    fn load_refresh_token(&self) -> BungieResult<Option<String>> {
        (**self).load_refresh_token()
    }

    fn save_refresh_token(&self, refresh_token: &str) -> BungieResult<()> {
        (**self).save_refresh_token(refresh_token)
    }

    fn clear_refresh_token(&self) -> BungieResult<()> {
        (**self).clear_refresh_token()
    }
}
