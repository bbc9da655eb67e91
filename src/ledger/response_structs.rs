//! Payload structures for the Google Sheets and OAuth2 endpoints.

use serde::{Deserialize, Serialize};

/// A block of cells, as read from and written to `/values/{range}`.
///
/// The API omits `values` entirely for an empty range.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Response of the OAuth2 refresh-token exchange.
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime of the token in seconds
    pub expires_in: u64,
}
