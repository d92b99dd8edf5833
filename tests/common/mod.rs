#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{Duration, Utc};
use tonearm::auth::{AuthError, TokenRecord, TokenStore};

/// In-memory token store for tests; also counts saves so refresh-once
/// assertions stay cheap.
#[derive(Default)]
pub struct InMemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
    saves: Mutex<u32>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, record: TokenRecord) {
        *self.record.lock().expect("store lock poisoned") = Some(record);
    }

    pub fn get(&self) -> Option<TokenRecord> {
        self.record.lock().expect("store lock poisoned").clone()
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.lock().expect("store lock poisoned")
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<TokenRecord>, AuthError> {
        Ok(self.get())
    }

    fn save(&self, record: &TokenRecord) -> Result<(), AuthError> {
        *self.saves.lock().expect("store lock poisoned") += 1;
        *self.record.lock().expect("store lock poisoned") = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.record.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

pub fn record_expiring_in(access_token: &str, remaining: Duration) -> TokenRecord {
    TokenRecord {
        access_token: access_token.to_string(),
        refresh_token: Some("stored-refresh".to_string()),
        token_type: "Bearer".to_string(),
        expires_at: Utc::now() + remaining,
        scope: None,
        last_refresh: None,
    }
}

/// Record expiring comfortably in the future.
pub fn fresh_record(access_token: &str) -> TokenRecord {
    record_expiring_in(access_token, Duration::hours(1))
}
