//! Google Sheets v4 implementation of [`Ledger`].
//!
//! Requests are authenticated with an OAuth2 access token obtained from a
//! long-lived refresh token. The access token is cached until shortly before
//! it expires.

use std::time::{Duration, Instant};

use anyhow::anyhow;
use log::{debug, info};
use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::ledger::{
    Ledger,
    response_structs::{TokenResponse, ValueRange},
};

/// Seconds before expiry at which a cached access token is refreshed.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// OAuth2 client and refresh token of the account owning the spreadsheet.
#[derive(Clone, Debug)]
pub struct SheetsCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// HTTP client for one spreadsheet.
///
/// # Examples
///
/// ```no_run
/// use clanbot::ledger::{Ledger, SheetsCredentials, SheetsLedger};
///
/// # async fn example() -> anyhow::Result<()> {
/// let ledger = SheetsLedger::new(
///     "https://sheets.googleapis.com",
///     "https://oauth2.googleapis.com/token",
///     "spreadsheet-id",
///     SheetsCredentials {
///         client_id: "client-id".to_string(),
///         client_secret: "client-secret".to_string(),
///         refresh_token: "refresh-token".to_string(),
///     },
/// );
/// let roster = ledger.get("idList!A1:C99").await?;
/// # Ok(())
/// # }
/// ```
pub struct SheetsLedger {
    /// Base URL of the Sheets API
    api_url: String,
    /// OAuth2 token endpoint
    token_url: String,
    spreadsheet_id: String,
    credentials: SheetsCredentials,
    /// Cached access token
    token: Mutex<Option<AccessToken>>,
    /// HTTP client
    client: Client,
}

impl SheetsLedger {
    pub fn new(
        api_url: &str,
        token_url: &str,
        spreadsheet_id: &str,
        credentials: SheetsCredentials,
    ) -> Self {
        SheetsLedger {
            api_url: api_url.to_string(),
            token_url: token_url.to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            credentials,
            token: Mutex::new(None),
            client: Client::new(),
        }
    }

    /// Builds `{api}/v4/spreadsheets/{id}/values/{range}{suffix}`.
    fn values_url(&self, range: &str, suffix: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be used as a base url", self.api_url))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", &self.spreadsheet_id, "values"])
            .push(&format!("{}{}", range, suffix));

        Ok(url)
    }

    /// Returns a valid access token, exchanging the refresh token if needed.
    async fn access_token(&self) -> anyhow::Result<String> {
        let mut token = self.token.lock().await;

        if let Some(cached) = token.as_ref()
            && cached.expires_at > Instant::now()
        {
            return Ok(cached.value.clone());
        }

        info!("refresh sheets access token");
        let response: TokenResponse = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("access token valid for {} seconds", response.expires_in);
        let lifetime = response.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        *token = Some(AccessToken {
            value: response.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(response.access_token)
    }
}

impl Ledger for SheetsLedger {
    /// Request `GET /values/{range}`.
    ///
    /// The API answers with the non-empty part of the range:
    /// ```json
    /// { "range": "idList!A1:C99", "values": [["u1", "Kyaru", "kyaru01"]] }
    /// ```
    async fn get(&self, range: &str) -> anyhow::Result<Vec<Vec<String>>> {
        let url = self.values_url(range, "")?;
        debug!("request GET {}", url);

        let value_range: ValueRange = self
            .client
            .get(url)
            .bearer_auth(self.access_token().await?)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("response from {} -> {:?}", range, value_range.values);

        Ok(value_range.values)
    }

    async fn append(&self, range: &str, rows: Vec<Vec<String>>) -> anyhow::Result<()> {
        let url = self.values_url(range, ":append")?;
        info!("append {} rows to {}", rows.len(), range);

        self.client
            .post(url)
            .bearer_auth(self.access_token().await?)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&ValueRange { values: rows })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn update(&self, range: &str, rows: Vec<Vec<String>>) -> anyhow::Result<()> {
        let url = self.values_url(range, "")?;
        info!("update {}", range);
        debug!("update {} with {:?}", range, rows);

        self.client
            .put(url)
            .bearer_auth(self.access_token().await?)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange { values: rows })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn clear(&self, range: &str) -> anyhow::Result<()> {
        let url = self.values_url(range, ":clear")?;
        info!("clear {}", range);

        self.client
            .post(url)
            .bearer_auth(self.access_token().await?)
            .json(&serde_json::json!({}))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;

    fn credentials() -> SheetsCredentials {
        SheetsCredentials {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            refresh_token: "refresh".to_string(),
        }
    }

    fn ledger_for(server: &mockito::ServerGuard) -> SheetsLedger {
        let url = server.url();
        SheetsLedger::new(&url, &format!("{}/token", url), "sheet", credentials())
    }

    async fn mock_token(
        server: &mut mockito::ServerGuard,
        expires_in: u64,
        hits: usize,
    ) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".to_owned(), "refresh_token".to_owned()),
                Matcher::UrlEncoded("refresh_token".to_owned(), "refresh".to_owned()),
                Matcher::UrlEncoded("client_id".to_owned(), "client".to_owned()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"access_token":"tok","expires_in":{},"token_type":"Bearer"}}"#,
                expires_in
            ))
            .expect(hits)
            .create_async()
            .await
    }

    #[test]
    fn test_values_url() {
        let ledger = SheetsLedger::new("https://sheets.test/", "", "abc", credentials());
        assert_eq!(
            ledger.values_url("idList!A1:C99", "").unwrap().as_str(),
            "https://sheets.test/v4/spreadsheets/abc/values/idList!A1:C99"
        );
        assert_eq!(
            ledger.values_url("idList", ":append").unwrap().as_str(),
            "https://sheets.test/v4/spreadsheets/abc/values/idList:append"
        );
    }

    #[tokio::test]
    async fn test_get() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;

        server
            .mock("GET", "/v4/spreadsheets/sheet/values/idList!A1:C99")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"range":"idList!A1:C99","values":[["u1","Kyaru","kyaru01"]]}"#)
            .create_async()
            .await;

        let rows = ledger_for(&server).get("idList!A1:C99").await.unwrap();
        assert_eq!(rows, vec![vec!["u1", "Kyaru", "kyaru01"]]);
    }

    #[tokio::test]
    async fn test_get_empty_range() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;

        server
            .mock("GET", "/v4/spreadsheets/sheet/values/damage")
            .with_status(200)
            .with_body(r#"{"range":"damage!A1:Z1000"}"#)
            .create_async()
            .await;

        let rows = ledger_for(&server).get("damage").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_access_token_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let token = mock_token(&mut server, 3600, 1).await;

        server
            .mock("GET", "/v4/spreadsheets/sheet/values/attack")
            .with_status(200)
            .with_body(r#"{"values":[]}"#)
            .expect(2)
            .create_async()
            .await;

        let ledger = ledger_for(&server);
        ledger.get("attack").await.unwrap();
        ledger.get("attack").await.unwrap();

        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_short_lived_token_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        // Lifetime below the safety margin, so every request refreshes
        let token = mock_token(&mut server, 30, 2).await;

        server
            .mock("GET", "/v4/spreadsheets/sheet/values/attack")
            .with_status(200)
            .with_body(r#"{"values":[]}"#)
            .create_async()
            .await;

        let ledger = ledger_for(&server);
        ledger.get("attack").await.unwrap();
        ledger.get("attack").await.unwrap();

        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_append() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;

        let append = server
            .mock("POST", "/v4/spreadsheets/sheet/values/idList:append")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("valueInputOption".to_owned(), "RAW".to_owned()),
                Matcher::UrlEncoded("insertDataOption".to_owned(), "INSERT_ROWS".to_owned()),
            ]))
            .match_body(Matcher::Json(json!({"values": [["u1", "Kyaru", "kyaru01"]]})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        ledger_for(&server)
            .append(
                "idList",
                vec![vec!["u1".into(), "Kyaru".into(), "kyaru01".into()]],
            )
            .await
            .unwrap();

        append.assert_async().await;
    }

    #[tokio::test]
    async fn test_update() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;

        let update = server
            .mock("PUT", "/v4/spreadsheets/sheet/values/damage!C4")
            .match_query(Matcher::UrlEncoded(
                "valueInputOption".to_owned(),
                "RAW".to_owned(),
            ))
            .match_body(Matcher::Json(json!({"values": [["1250000"]]})))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        ledger_for(&server)
            .update("damage!C4", vec![vec!["1250000".into()]])
            .await
            .unwrap();

        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_clear() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;

        let clear = server
            .mock("POST", "/v4/spreadsheets/sheet/values/attack!B2:D30:clear")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        ledger_for(&server).clear("attack!B2:D30").await.unwrap();

        clear.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        mock_token(&mut server, 3600, 1).await;

        server
            .mock("GET", "/v4/spreadsheets/sheet/values/idList!A1:C99")
            .with_status(403)
            .create_async()
            .await;

        assert!(ledger_for(&server).get("idList!A1:C99").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_token_exchange_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        assert!(ledger_for(&server).get("idList!A1:C99").await.is_err());
    }
}
