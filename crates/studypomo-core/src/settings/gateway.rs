//! Remote settings store client.
//!
//! The backend exposes a single settings record per user:
//!
//! ```text
//! GET  /settings        -> zero or one record
//! POST /settings        -> created record (with id)
//! PUT  /settings/{id}   -> updated record
//! ```

use std::future::Future;

use reqwest::StatusCode;
use url::Url;

use super::model::Settings;
use crate::error::GatewayError;

/// Boundary to wherever settings are persisted.
pub trait SettingsGateway {
    /// Fetch the stored record, if any.
    fn fetch(&self) -> impl Future<Output = Result<Option<Settings>, GatewayError>> + Send;

    /// Create a new record. The returned record carries the assigned id.
    fn create(
        &self,
        settings: &Settings,
    ) -> impl Future<Output = Result<Settings, GatewayError>> + Send;

    /// Replace the record identified by `id`.
    fn update(
        &self,
        id: &str,
        settings: &Settings,
    ) -> impl Future<Output = Result<Settings, GatewayError>> + Send;
}

/// Settings gateway speaking the JSON REST contract over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSettingsGateway {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpSettingsGateway {
    /// Create a gateway rooted at `base_url` (e.g. `https://api.example.com/v1`).
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join drops the last path segment unless it ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_record(&self, builder: reqwest::RequestBuilder) -> Result<Settings, GatewayError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let value: serde_json::Value = response.json().await?;
        let record = parse_record(value)?.ok_or(GatewayError::MissingId)?;
        if record.id.is_none() {
            return Err(GatewayError::MissingId);
        }
        Ok(record)
    }
}

impl SettingsGateway for HttpSettingsGateway {
    async fn fetch(&self) -> Result<Option<Settings>, GatewayError> {
        let url = self.base_url.join("settings")?;
        let response = self.request(reqwest::Method::GET, url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let value: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| GatewayError::Malformed(e.to_string()))?;
        parse_record(value)
    }

    async fn create(&self, settings: &Settings) -> Result<Settings, GatewayError> {
        let url = self.base_url.join("settings")?;
        self.send_record(self.request(reqwest::Method::POST, url).json(settings))
            .await
    }

    async fn update(&self, id: &str, settings: &Settings) -> Result<Settings, GatewayError> {
        let mut url = self.base_url.join("settings/")?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Malformed("base URL cannot hold a path".into()))?
            .pop_if_empty()
            .push(id);
        self.send_record(self.request(reqwest::Method::PUT, url).json(settings))
            .await
    }
}

/// Interpret a response body as zero or one settings record.
///
/// Accepts a bare object, an array (first element wins), or `null`.
fn parse_record(value: serde_json::Value) -> Result<Option<Settings>, GatewayError> {
    let record = match value {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Array(items) => match items.into_iter().next() {
            Some(first) => first,
            None => return Ok(None),
        },
        other => other,
    };
    serde_json::from_value(record)
        .map(Some)
        .map_err(|e| GatewayError::Malformed(e.to_string()))
}
