use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Remaining lifetime (seconds) below which a record is due for refresh.
const REFRESH_MARGIN_SECS: i64 = 60;

/// OAuth credential bundle issued by the accounts service.
///
/// Replaced wholesale on every successful exchange or refresh; the
/// persisted copy always mirrors the most recent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub scope: Option<String>,
    pub last_refresh: Option<DateTime<Utc>>,
}

impl TokenRecord {
    /// Remaining lifetime of the access token.
    pub fn remaining(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// True when the access token expires within the refresh margin.
    ///
    /// This predicate is the entire freshness policy: callers check it
    /// lazily before each upstream call; nothing refreshes in the
    /// background.
    pub fn needs_refresh(&self) -> bool {
        self.remaining() < Duration::seconds(REFRESH_MARGIN_SECS)
    }
}
