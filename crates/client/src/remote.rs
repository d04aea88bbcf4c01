//! Access to the server-side account record.

use async_trait::async_trait;
use companion_core::credits::AccountSnapshot;
use companion_core::gallery::ContentKey;
use companion_core::roles::ROLE_ADMIN;
use companion_core::types::Credits;
use serde::Deserialize;

use crate::config::ClientConfig;
use crate::error::RemoteError;

/// The account record as held by the store, plus the role bit the view
/// controller needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteAccount {
    pub account: AccountSnapshot,
    pub is_admin: bool,
}

/// The authoritative store for the signed-in account.
#[async_trait]
pub trait AccountRemote: Send + Sync {
    async fn fetch_account(&self) -> Result<RemoteAccount, RemoteError>;

    /// Decrement the balance by `cost` and add `key` to the unlocked set.
    async fn debit_and_unlock(&self, key: &ContentKey, cost: Credits) -> Result<(), RemoteError>;
}

/// [`AccountRemote`] backed by the companion HTTP API.
///
/// The server prices the unlock from its own gallery record; `cost` is
/// only used by the local pre-check.
pub struct HttpRemote {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct AccountBody {
    #[serde(flatten)]
    account: AccountSnapshot,
    role: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

impl HttpRemote {
    pub fn new(config: &ClientConfig, access_token: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), config, access_token)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(
        client: reqwest::Client,
        config: &ClientConfig,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: format!("{}/api/v1", config.base_url),
            access_token: access_token.into(),
        }
    }

    /// Return the response unchanged on success, or the server's error
    /// code and message on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let (code, message) = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => (parsed.code, parsed.error),
            Err(_) => (String::new(), body),
        };
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            code,
            message,
        })
    }
}

#[async_trait]
impl AccountRemote for HttpRemote {
    async fn fetch_account(&self) -> Result<RemoteAccount, RemoteError> {
        let response = self
            .client
            .get(format!("{}/account", self.api_url))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let body: DataEnvelope<AccountBody> = Self::ensure_success(response).await?.json().await?;
        Ok(RemoteAccount {
            is_admin: body.data.role == ROLE_ADMIN,
            account: body.data.account,
        })
    }

    async fn debit_and_unlock(&self, key: &ContentKey, _cost: Credits) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(format!("{}/account/unlocks", self.api_url))
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({
                "companion_id": key.companion_id,
                "item_id": key.item_id,
            }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
