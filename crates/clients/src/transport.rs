//! Shared JSON-over-HTTP request plumbing.

use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Turns a configured address into a base URL.
///
/// Addresses without a scheme (`cartservice:7070`) are treated as plain
/// HTTP. Trailing slashes are dropped.
pub(crate) fn base_url(addr: &str) -> String {
    let addr = addr.trim().trim_end_matches('/');
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{addr}")
    }
}

#[derive(Debug, Clone)]
pub(crate) struct JsonTransport {
    client: Client,
    base_url: String,
}

impl JsonTransport {
    pub(crate) fn new(client: Client, addr: &str) -> Self {
        Self {
            client,
            base_url: base_url(addr),
        }
    }

    /// POSTs `body` to `operation` and decodes the JSON response.
    pub(crate) async fn call<B, R>(&self, operation: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(operation, body).await?;
        Ok(response.json::<R>().await?)
    }

    /// POSTs `body` to `operation`, ignoring any response body.
    pub(crate) async fn call_unit<B>(&self, operation: &str, body: &B) -> Result<(), ClientError>
    where
        B: Serialize + ?Sized,
    {
        self.send(operation, body).await.map(drop)
    }

    async fn send<B>(&self, operation: &str, body: &B) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}/{operation}", self.base_url);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%url, %status, "collaborator returned error status");
            return Err(ClientError::Status { status, body });
        }

        Ok(response)
    }
}
