use log::debug;
use thiserror::Error;
use web_sys::{window, Storage};

use crate::error::describe_js;

#[derive(Debug, Error, PartialEq)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
}

pub trait FlagStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`. Every access goes through the browser again, so a
/// storage that disappears mid-session only fails that one call.
pub struct LocalFlagStore;

impl LocalFlagStore {
    fn storage() -> Result<Storage, StorageError> {
        window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|e| StorageError::Read(describe_js(&e)))?
            .ok_or(StorageError::Unavailable)
    }
}

impl FlagStore for LocalFlagStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Read(describe_js(&e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(describe_js(&e)))
    }
}

pub fn encode_flag(on: bool) -> &'static str {
    if on {
        "1"
    } else {
        "0"
    }
}

pub fn load_flag(store: &impl FlagStore, key: &str) -> bool {
    match store.read(key) {
        Ok(value) => value.as_deref() == Some("1"),
        Err(err) => {
            debug!("reading {} failed, using default: {}", key, err);
            false
        }
    }
}

/// Best effort. Returns whether the value was persisted.
pub fn save_flag(store: &impl FlagStore, key: &str, on: bool) -> bool {
    match store.write(key, encode_flag(on)) {
        Ok(()) => true,
        Err(err) => {
            debug!("writing {} failed, keeping it for this session only: {}", key, err);
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    pub(crate) struct MemoryStore {
        pub values: RefCell<HashMap<String, String>>,
    }

    impl FlagStore for MemoryStore {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.values
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    pub(crate) struct BlockedStore;

    impl FlagStore for BlockedStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read("SecurityError".into()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write("QuotaExceededError".into()))
        }
    }

    #[test]
    fn missing_key_defaults_to_off() {
        assert!(!load_flag(&MemoryStore::default(), "raw"));
    }

    #[test]
    fn stores_one_and_zero() {
        let store = MemoryStore::default();
        assert!(save_flag(&store, "raw", true));
        assert_eq!(store.values.borrow().get("raw").map(String::as_str), Some("1"));
        assert!(load_flag(&store, "raw"));

        assert!(save_flag(&store, "raw", false));
        assert_eq!(store.values.borrow().get("raw").map(String::as_str), Some("0"));
        assert!(!load_flag(&store, "raw"));
    }

    #[test]
    fn unexpected_values_read_as_off() {
        let store = MemoryStore::default();
        store
            .values
            .borrow_mut()
            .insert("raw".into(), "true".into());
        assert!(!load_flag(&store, "raw"));
    }

    #[test]
    fn failures_are_swallowed() {
        assert!(!load_flag(&BlockedStore, "raw"));
        assert!(!save_flag(&BlockedStore, "raw", true));
    }
}
