//! Key/value preferences persisted as a flat JSON object.
//!
//! Every write replaces the file through a temporary sibling and a rename, so
//! a reader never observes a partially written file.

use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use tempfile::NamedTempFile;

use crate::StoreError;

pub const API_KEY: &str = "api-key";
pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const REFRESH_TOKEN: &str = "refresh-token";

/// Keys that must hold a non-blank value before the poller may start.
pub const REQUIRED_KEYS: [&str; 3] = [API_KEY, CLIENT_ID, CLIENT_SECRET];

const FILE_NAME: &str = "preferences.json";

#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonPreferenceStore {
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let dirs = directories::ProjectDirs::from("", "", "randblem")
            .ok_or(StoreError::ConfigDirUnavailable)?;
        Ok(dirs.config_dir().join(FILE_NAME))
    }

    /// Opens the preferences file, creating it when absent. Required keys
    /// that are missing are added with an empty value so the user has a
    /// template to fill in; existing keys are left untouched.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut values = if path.exists() {
            read_values(&path)?
        } else {
            log::info!("creating preferences file at {}", path.display());
            BTreeMap::new()
        };

        let mut changed = !path.exists();
        for key in REQUIRED_KEYS {
            if !values.contains_key(key) {
                values.insert(key.to_owned(), String::new());
                changed = true;
            }
        }
        if changed {
            write_atomic(&path, &values)?;
        }

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    /// Stores `value` and persists the whole file before returning.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.lock()?;
        let mut updated = values.clone();
        updated.insert(key.to_owned(), value.to_owned());
        write_atomic(&self.path, &updated)?;
        *values = updated;
        Ok(())
    }

    pub fn get_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.lock()?.clone())
    }

    /// Required keys that are absent or blank.
    pub fn missing_required(&self) -> Result<Vec<&'static str>, StoreError> {
        let values = self.lock()?;
        Ok(REQUIRED_KEYS
            .into_iter()
            .filter(|key| values.get(*key).is_none_or(|value| value.trim().is_empty()))
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.values.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let parsed: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let object = parsed
        .as_object()
        .ok_or_else(|| StoreError::NotAnObject(path.to_path_buf()))?;

    object
        .iter()
        .map(|(key, value)| {
            value
                .as_str()
                .map(|value| (key.clone(), value.to_owned()))
                .ok_or_else(|| StoreError::NotAnObject(path.to_path_buf()))
        })
        .collect()
}

fn write_atomic(path: &Path, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut body = serde_json::to_vec_pretty(values)?;
    body.push(b'\n');

    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(&body).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;
    file.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{API_KEY, CLIENT_ID, CLIENT_SECRET, JsonPreferenceStore, REFRESH_TOKEN};
    use crate::StoreError;

    #[test]
    fn open_creates_file_with_blank_required_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("preferences.json");

        let store = JsonPreferenceStore::open(&path).expect("open creates file");

        assert!(path.exists());
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(
            on_disk,
            serde_json::json!({ "api-key": "", "client-id": "", "client-secret": "" })
        );
        assert_eq!(
            store.missing_required().expect("missing"),
            vec![API_KEY, CLIENT_ID, CLIENT_SECRET]
        );
        assert_eq!(store.get(REFRESH_TOKEN).expect("get"), None);
    }

    #[test]
    fn open_fills_missing_keys_without_touching_others() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(
            &path,
            r#"{ "api-key": "abc", "refresh-token": "stored", "theme": "dark" }"#,
        )
        .expect("seed file");

        let store = JsonPreferenceStore::open(&path).expect("open");

        let all = store.get_all().expect("get all");
        assert_eq!(all.get(API_KEY).map(String::as_str), Some("abc"));
        assert_eq!(all.get(REFRESH_TOKEN).map(String::as_str), Some("stored"));
        assert_eq!(all.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(all.get(CLIENT_ID).map(String::as_str), Some(""));
        assert_eq!(
            store.missing_required().expect("missing"),
            vec![CLIENT_ID, CLIENT_SECRET]
        );
    }

    #[test]
    fn set_persists_immediately() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        let store = JsonPreferenceStore::open(&path).expect("open");

        store.set(REFRESH_TOKEN, "rotated").expect("set");
        store.set(API_KEY, "  ").expect("set blank");

        let reopened = JsonPreferenceStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get(REFRESH_TOKEN).expect("get").as_deref(),
            Some("rotated")
        );
        assert!(reopened.missing_required().expect("missing").contains(&API_KEY));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(leftovers.len(), 1, "temporary files must not remain");
    }

    #[test]
    fn rejects_non_string_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{ "api-key": 42 }"#).expect("seed file");

        let err = JsonPreferenceStore::open(&path).expect_err("numbers are rejected");
        assert!(matches!(err, StoreError::NotAnObject(_)));
    }

    #[test]
    fn rejects_invalid_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").expect("seed file");

        let err = JsonPreferenceStore::open(&path).expect_err("invalid json");
        assert!(matches!(err, StoreError::Parse { .. }));
    }
}
