// Nova backend HTTP client.
// Sends JSON requests and converts non-success responses into errors.

use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{NovaError, Result};

const CLIENT_USER_AGENT: &str = concat!("nova-sdk/", env!("CARGO_PKG_VERSION"));

/// JSON transport used by the loader and the registry sync.
#[derive(Debug, Clone)]
pub struct NovaClient {
    client: Client,
}

impl NovaClient {
    /// Create a client that sends JSON headers on every request.
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Create a client that also sends `Authorization: Bearer <api_key>`.
    pub fn with_api_key(api_key: &str) -> Result<Self> {
        Self::build(Some(api_key))
    }

    fn build(api_key: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        if let Some(key) = api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", key))
                    .map_err(|e| NovaError::Other(e.to_string()))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(NovaError::Http)?;

        Ok(Self { client })
    }

    /// POST a JSON body and parse the JSON response as `T`.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send_post(url, body).await?;
        Ok(response.json().await?)
    }

    /// POST a JSON body and drop whatever the backend answers.
    pub async fn post_discard<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        self.send_post(url, body).await.map(drop)
    }

    /// GET a JSON document and parse it as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let response = check_response(response)?;
        Ok(response.json().await?)
    }

    /// POST a registry payload. Rejections keep the response body for reporting.
    pub(crate) async fn post_registry(&self, url: &str, body: &Value) -> Result<Value> {
        tracing::debug!(url, "POST registry");
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(NovaError::Sync {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response> {
        tracing::debug!(url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        check_response(response)
    }
}

/// Check response status and convert failures.
fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(NovaError::Transport {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
    })
}

/// Join a base URL and an absolute endpoint path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
