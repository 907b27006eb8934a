use crate::constants::{
    AWS_CONTAINER_AUTHORIZATION_TOKEN, AWS_CONTAINER_CREDENTIALS_FULL_URI,
    AWS_CONTAINER_CREDENTIALS_RELATIVE_URI,
};
use crate::Credential;
use async_trait::async_trait;
use awscurl_core::time::parse_rfc3339;
use awscurl_core::{Context, Error, ProvideCredential, Result};
use bytes::Bytes;
use http::{header, Method, StatusCode};
use log::debug;
use serde::Deserialize;

const ECS_METADATA_ENDPOINT: &str = "http://169.254.170.2";

/// EcsCredentialProvider will load credential from ECS task metadata endpoint.
///
/// ECS credential provider provides credentials for ECS tasks using
/// the AWS_CONTAINER_CREDENTIALS_RELATIVE_URI or AWS_CONTAINER_CREDENTIALS_FULL_URI
/// environment variables. `AWS_CONTAINER_AUTHORIZATION_TOKEN` is forwarded
/// as the `Authorization` header when set.
///
/// References:
/// - [IAM roles for tasks](https://docs.aws.amazon.com/AmazonECS/latest/developerguide/task-iam-roles.html)
#[derive(Debug, Default, Clone)]
pub struct EcsCredentialProvider;

impl EcsCredentialProvider {
    /// Create a new `EcsCredentialProvider` instance.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EcsCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let relative_uri = envs
            .get(AWS_CONTAINER_CREDENTIALS_RELATIVE_URI)
            .filter(|v| !v.is_empty());
        let full_uri = envs
            .get(AWS_CONTAINER_CREDENTIALS_FULL_URI)
            .filter(|v| !v.is_empty());

        let url = match (relative_uri, full_uri) {
            (Some(relative), _) => format!("{ECS_METADATA_ENDPOINT}{relative}"),
            (None, Some(full)) => full.to_string(),
            (None, None) => {
                debug!("not running in a container with task credentials");
                return Ok(None);
            }
        };

        let mut req = http::Request::builder().uri(&url).method(Method::GET);
        if let Some(token) = envs.get(AWS_CONTAINER_AUTHORIZATION_TOKEN) {
            req = req.header(header::AUTHORIZATION, token);
        }
        let req = req.body(Bytes::new()).map_err(|e| {
            Error::url_invalid("failed to build container metadata request")
                .with_source(e)
                .with_context(format!("url: {url}"))
        })?;

        let resp = ctx.http_send_as_string(req).await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::credential_invalid(format!(
                "request to container metadata endpoint failed: status={}",
                resp.status()
            ))
            .with_context(format!("body: {}", resp.body())));
        }

        let cred: EcsTaskCredentials = serde_json::from_str(resp.body()).map_err(|e| {
            Error::credential_invalid("failed to parse container credentials").with_source(e)
        })?;
        let expires_in = parse_rfc3339(&cred.expiration)?;

        Ok(Some(Credential {
            access_key_id: cred.access_key_id,
            secret_access_key: cred.secret_access_key,
            session_token: Some(cred.token),
            expires_in: Some(expires_in),
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EcsTaskCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,
}
