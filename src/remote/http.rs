//! S3 REST store over blocking HTTP.
//!
//! Requests are presigned with AWS Signature V4 by default. Virtual-hosted AWS
//! URLs are used unless an endpoint override is configured, in which case
//! requests are path-style (`<endpoint>/<bucket>/<key>`), which is what MinIO
//! and most gateways expect. Bearer and anonymous modes skip signing.

use crate::config::sources::environment;
use crate::config::{HubConfig, RemoteAuth};
use crate::error::{HubError, RemoteError};
use crate::remote::credentials;
use crate::remote::RemoteObjectStore;
use config::Map;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use std::time::Duration;

/// Lifetime of each presigned URL; requests are sent immediately after signing.
const PRESIGN_TTL: Duration = Duration::from_secs(300);

enum Auth {
    Signed(Credentials),
    Bearer(String),
    Anonymous,
}

pub struct HttpObjectStore {
    bucket: Bucket,
    auth: Auth,
    client: Client,
}

impl HttpObjectStore {
    pub fn from_config(config: &HubConfig) -> Result<Self, HubError> {
        Self::from_config_with_vars(config, &environment::process_vars())
    }

    /// Build the store, resolving credentials from the given environment snapshot.
    pub fn from_config_with_vars(
        config: &HubConfig,
        vars: &Map<String, String>,
    ) -> Result<Self, HubError> {
        let auth = match config.remote_auth {
            RemoteAuth::Sigv4 => {
                let found = credentials::resolve(config, vars)?.ok_or_else(|| {
                    HubError::Config(
                        "No AWS credentials found for signed requests: set AWS_ACCESS_KEY_ID and \
                         AWS_SECRET_ACCESS_KEY, configure a shared credentials profile, or set \
                         remote_auth to \"bearer\" or \"anonymous\""
                            .to_string(),
                    )
                })?;
                Auth::Signed(found.to_signing())
            }
            RemoteAuth::Bearer => {
                let token = config
                    .remote_token
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| {
                        HubError::Config(
                            "AGENT_HUB_REMOTE_TOKEN must be set when remote_auth is \"bearer\""
                                .to_string(),
                        )
                    })?;
                Auth::Bearer(token)
            }
            RemoteAuth::Anonymous => Auth::Anonymous,
        };

        Ok(Self {
            bucket: bucket_for(config)?,
            auth,
            client: build_client(Duration::from_secs(config.remote_timeout_seconds))?,
        })
    }

    #[cfg(test)]
    fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub(crate) fn url_for(&self, key: &str) -> Result<Url, RemoteError> {
        self.bucket
            .object_url(key)
            .map_err(|e| RemoteError::Unavailable(format!("invalid object key {}: {}", key, e)))
    }

    fn credentials(&self) -> Option<&Credentials> {
        match &self.auth {
            Auth::Signed(credentials) => Some(credentials),
            _ => None,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Auth::Bearer(token) => request.bearer_auth(token),
            _ => request,
        }
    }
}

fn bucket_for(config: &HubConfig) -> Result<Bucket, RemoteError> {
    let (endpoint, style) = match config.endpoint.as_deref().map(str::trim) {
        Some(endpoint) if !endpoint.is_empty() => (endpoint.to_string(), UrlStyle::Path),
        _ => (
            format!("https://s3.{}.amazonaws.com", config.region),
            UrlStyle::VirtualHost,
        ),
    };
    let url = Url::parse(&endpoint)
        .map_err(|e| RemoteError::Unavailable(format!("invalid remote endpoint {}: {}", endpoint, e)))?;
    Bucket::new(url, style, config.bucket.clone(), config.region.clone())
        .map_err(|e| RemoteError::Unavailable(format!("invalid bucket {}: {}", config.bucket, e)))
}

fn build_client(timeout: Duration) -> Result<Client, RemoteError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RemoteError::Unavailable(format!("failed to initialize HTTP client: {}", e)))
}

fn status_error(key: &str, status: StatusCode) -> RemoteError {
    RemoteError::Status {
        key: key.to_string(),
        status: status.as_u16(),
    }
}

impl RemoteObjectStore for HttpObjectStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RemoteError> {
        let url = self
            .bucket
            .get_object(self.credentials(), key)
            .sign(PRESIGN_TTL);
        let response = self.authorized(self.client.get(url)).send()?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.bytes()?.to_vec())),
            status => Err(status_error(key, status)),
        }
    }

    fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), RemoteError> {
        let url = self
            .bucket
            .put_object(self.credentials(), key)
            .sign(PRESIGN_TTL);
        let response = self
            .authorized(self.client.put(url))
            .header(CONTENT_TYPE, content_type)
            .body(body.to_vec())
            .send()?;
        if !response.status().is_success() {
            return Err(status_error(key, response.status()));
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, RemoteError> {
        let url = self
            .bucket
            .head_object(self.credentials(), key)
            .sign(PRESIGN_TTL);
        let response = self.authorized(self.client.head(url)).send()?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(status_error(key, status)),
        }
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.bucket.name(), self.bucket.base_url())
    }
}
