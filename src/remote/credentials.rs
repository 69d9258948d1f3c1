//! AWS credentials for signed requests.
//!
//! Resolution order: explicit config, then `AWS_ACCESS_KEY_ID` /
//! `AWS_SECRET_ACCESS_KEY` (with optional `AWS_SESSION_TOKEN`), then the shared
//! credentials file (`AWS_SHARED_CREDENTIALS_FILE` or `~/.aws/credentials`) under
//! `aws_profile`, `AWS_PROFILE` or `default`.

use crate::config::HubConfig;
use crate::error::HubError;
use config::{Config, File, FileFormat, Map};
use rusty_s3::Credentials;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    fn from_parts(key: Option<&str>, secret: Option<&str>, token: Option<&str>) -> Option<Self> {
        let key = non_empty(key)?;
        let secret = non_empty(secret)?;
        Some(Self {
            access_key_id: key.to_string(),
            secret_access_key: secret.to_string(),
            session_token: non_empty(token).map(str::to_string),
        })
    }

    pub(crate) fn to_signing(&self) -> Credentials {
        match &self.session_token {
            Some(token) => Credentials::new_with_token(
                self.access_key_id.clone(),
                self.secret_access_key.clone(),
                token.clone(),
            ),
            None => Credentials::new(self.access_key_id.clone(), self.secret_access_key.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProfileEntry {
    aws_access_key_id: Option<String>,
    aws_secret_access_key: Option<String>,
    aws_session_token: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn var<'a>(vars: &'a Map<String, String>, name: &str) -> Option<&'a str> {
    non_empty(vars.get(name).map(String::as_str))
}

/// Find credentials for `config`, reading the environment from `vars`.
pub fn resolve(
    config: &HubConfig,
    vars: &Map<String, String>,
) -> Result<Option<AwsCredentials>, HubError> {
    if let Some(found) = AwsCredentials::from_parts(
        config.access_key_id.as_deref(),
        config.secret_access_key.as_deref(),
        config.session_token.as_deref(),
    ) {
        return Ok(Some(found));
    }

    if let Some(found) = AwsCredentials::from_parts(
        var(vars, "AWS_ACCESS_KEY_ID"),
        var(vars, "AWS_SECRET_ACCESS_KEY"),
        var(vars, "AWS_SESSION_TOKEN"),
    ) {
        return Ok(Some(found));
    }

    let Some(path) = shared_credentials_path(vars) else {
        return Ok(None);
    };
    if !path.is_file() {
        return Ok(None);
    }
    let profile = non_empty(config.aws_profile.as_deref())
        .or_else(|| var(vars, "AWS_PROFILE"))
        .unwrap_or(DEFAULT_PROFILE);
    from_shared_file(&path, profile)
}

fn shared_credentials_path(vars: &Map<String, String>) -> Option<PathBuf> {
    var(vars, "AWS_SHARED_CREDENTIALS_FILE")
        .map(PathBuf::from)
        .or_else(|| {
            directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".aws").join("credentials"))
        })
}

fn from_shared_file(path: &Path, profile: &str) -> Result<Option<AwsCredentials>, HubError> {
    let profiles: HashMap<String, ProfileEntry> = Config::builder()
        .add_source(File::from(path).format(FileFormat::Ini))
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| {
            HubError::Config(format!(
                "Failed to read AWS credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

    let entry = profiles
        .get(profile)
        .or_else(|| profiles.get(&profile.to_lowercase()));
    Ok(entry.and_then(|entry| {
        AwsCredentials::from_parts(
            entry.aws_access_key_id.as_deref(),
            entry.aws_secret_access_key.as_deref(),
            entry.aws_session_token.as_deref(),
        )
    }))
}
