mod error;
mod preferences;

pub use error::StoreError;
pub use preferences::{
    API_KEY, CLIENT_ID, CLIENT_SECRET, JsonPreferenceStore, REFRESH_TOKEN, REQUIRED_KEYS,
};
