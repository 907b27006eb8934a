use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use awscurl_core::{Context, Error, ProvideCredential, Result};
use ini::{Ini, Properties};
use log::debug;

const DEFAULT_PROFILE: &str = "default";
const DEFAULT_CREDENTIALS_FILE: &str = "~/.aws/credentials";
const DEFAULT_CONFIG_FILE: &str = "~/.aws/config";

/// ProfileCredentialProvider loads AWS credentials from the shared configuration files.
///
/// This provider loads credentials from:
/// - `~/.aws/credentials` (or the path specified by `AWS_SHARED_CREDENTIALS_FILE`)
/// - `~/.aws/config` (or the path specified by `AWS_CONFIG_FILE`)
///
/// The profile to use is determined by:
/// 1. The profile specified via `with_profile()`
/// 2. The `AWS_PROFILE` environment variable
/// 3. Default to "default"
#[derive(Debug, Default, Clone)]
pub struct ProfileCredentialProvider {
    profile: Option<String>,
    config_file: Option<String>,
    credentials_file: Option<String>,
}

impl ProfileCredentialProvider {
    /// Create a new ProfileCredentialProvider with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the profile name to use.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the path to the config file.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Set the path to the credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// The profile this provider reads.
    pub fn profile(&self, ctx: &Context) -> String {
        self.profile
            .clone()
            .or_else(|| ctx.env_var(AWS_PROFILE).filter(|v| !v.is_empty()))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    /// Read the `region` key of the selected profile from the config file.
    pub async fn region(&self, ctx: &Context) -> Result<Option<String>> {
        let profile = self.profile(ctx);
        let Some(conf) = self.load_config_file(ctx).await? else {
            return Ok(None);
        };

        Ok(config_section(&conf, &profile)
            .and_then(|props| props.get("region"))
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string()))
    }

    async fn load_credentials_file(&self, ctx: &Context) -> Result<Option<Ini>> {
        let path = self
            .credentials_file
            .clone()
            .or_else(|| ctx.env_var(AWS_SHARED_CREDENTIALS_FILE))
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string());
        load_ini(ctx, &path).await
    }

    async fn load_config_file(&self, ctx: &Context) -> Result<Option<Ini>> {
        let path = self
            .config_file
            .clone()
            .or_else(|| ctx.env_var(AWS_CONFIG_FILE))
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        load_ini(ctx, &path).await
    }
}

#[async_trait]
impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let profile = self.profile(ctx);

        // Try credentials file first
        if let Some(conf) = self.load_credentials_file(ctx).await? {
            match conf.section(Some(profile.as_str())) {
                Some(props) => {
                    if let Some(cred) = credential_from_props(props) {
                        return Ok(Some(cred));
                    }
                }
                None => debug!("profile {profile} not found in credentials file"),
            }
        }

        // Then try config file
        let Some(conf) = self.load_config_file(ctx).await? else {
            return Ok(None);
        };
        match config_section(&conf, &profile) {
            Some(props) => Ok(credential_from_props(props)),
            None => {
                debug!("profile {profile} not found in config file");
                Ok(None)
            }
        }
    }
}

/// Load an ini file, a missing file is not an error.
async fn load_ini(ctx: &Context, path: &str) -> Result<Option<Ini>> {
    let Some(expanded_path) = ctx.expand_home_dir(path) else {
        debug!("failed to expand homedir for path: {path}");
        return Ok(None);
    };

    let content = match ctx.file_read(&expanded_path).await {
        Ok(content) => content,
        Err(err) => {
            debug!("failed to read {expanded_path}: {err}");
            return Ok(None);
        }
    };

    let conf = Ini::load_from_str(&String::from_utf8_lossy(&content)).map_err(|e| {
        Error::config_invalid("failed to parse shared config file")
            .with_source(anyhow::Error::new(e))
            .with_context(format!("path: {expanded_path}"))
    })?;
    Ok(Some(conf))
}

/// Non default profiles live under `[profile <name>]` in the config file.
fn config_section<'a>(conf: &'a Ini, profile: &str) -> Option<&'a Properties> {
    match profile {
        DEFAULT_PROFILE => conf.section(Some(DEFAULT_PROFILE)),
        x => conf.section(Some(format!("profile {x}"))),
    }
}

fn credential_from_props(props: &Properties) -> Option<Credential> {
    let access_key_id = props.get("aws_access_key_id").filter(|v| !v.is_empty())?;
    let secret_access_key = props
        .get("aws_secret_access_key")
        .filter(|v| !v.is_empty())?;

    Some(Credential {
        access_key_id: access_key_id.to_string(),
        secret_access_key: secret_access_key.to_string(),
        session_token: props
            .get("aws_session_token")
            .filter(|v| !v.is_empty())
            .map(|s| s.to_string()),
        expires_in: None,
    })
}
