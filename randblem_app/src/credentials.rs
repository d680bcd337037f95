use std::fmt;

use randblem_bungie::BungieConfig;
use randblem_store::{API_KEY, CLIENT_ID, CLIENT_SECRET, JsonPreferenceStore};

use crate::AppError;

/// Application credentials registered with Bungie.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Reads the required keys, failing with every blank or absent key at
    /// once so the user can fix the file in one pass.
    pub fn from_preferences(preferences: &JsonPreferenceStore) -> Result<Self, AppError> {
        let missing = preferences.missing_required()?;
        if !missing.is_empty() {
            return Err(AppError::MissingCredentials {
                missing,
                path: preferences.path().to_path_buf(),
            });
        }

        let read = |key: &'static str| -> Result<String, AppError> {
            Ok(preferences.get(key)?.unwrap_or_default().trim().to_owned())
        };
        Ok(Self {
            api_key: read(API_KEY)?,
            client_id: read(CLIENT_ID)?,
            client_secret: read(CLIENT_SECRET)?,
        })
    }

    pub fn into_config(self) -> BungieConfig {
        BungieConfig::new(self.api_key, self.client_id, self.client_secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use randblem_store::{API_KEY, CLIENT_ID, CLIENT_SECRET, JsonPreferenceStore};

    use super::Credentials;
    use crate::AppError;

    #[test]
    fn reports_every_missing_key_with_the_file_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        let preferences = JsonPreferenceStore::open(&path).expect("open");
        preferences.set(CLIENT_ID, "12345").expect("set");

        let err = Credentials::from_preferences(&preferences).expect_err("incomplete");

        let AppError::MissingCredentials { missing, path: reported } = &err else {
            panic!("expected missing credentials, got {err:?}");
        };
        assert_eq!(missing, &vec![API_KEY, CLIENT_SECRET]);
        assert_eq!(reported, &path);
        let message = err.to_string();
        assert!(message.contains("api-key, client-secret"));
        assert!(message.contains(&path.display().to_string()));
    }

    #[test]
    fn builds_config_and_redacts_secrets() {
        let dir = tempfile::tempdir().expect("tempdir");
        let preferences =
            JsonPreferenceStore::open(dir.path().join("preferences.json")).expect("open");
        preferences.set(API_KEY, "api-key-value").expect("set");
        preferences.set(CLIENT_ID, " 12345 ").expect("set");
        preferences.set(CLIENT_SECRET, "secret-value").expect("set");

        let credentials = Credentials::from_preferences(&preferences).expect("complete");
        let debug = format!("{credentials:?}");
        assert!(!debug.contains("api-key-value"));
        assert!(!debug.contains("secret-value"));

        let config = credentials.into_config();
        assert_eq!(config.client_id, "12345");
        assert_eq!(config.api_key, "api-key-value");
        config.validate().expect("valid config");
    }
}
