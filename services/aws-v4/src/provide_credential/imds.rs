use crate::constants::{AWS_EC2_METADATA_DISABLED, AWS_EC2_METADATA_SERVICE_ENDPOINT};
use crate::Credential;
use async_trait::async_trait;
use awscurl_core::time::parse_rfc3339;
use awscurl_core::{Context, Error, ProvideCredential, Result};
use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{Method, StatusCode};
use log::debug;
use serde::Deserialize;

const IMDS_ENDPOINT: &str = "http://169.254.169.254";
const IMDS_TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
const IMDS_TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";

/// IMDSv2CredentialProvider loads the instance role credential from the EC2
/// instance metadata service.
///
/// A session token is fetched first and sent with the role listing and the
/// credential fetch. Each call performs the full exchange, nothing is kept
/// between calls. Set `AWS_EC2_METADATA_DISABLED=true` to skip it.
#[derive(Debug, Default, Clone)]
pub struct IMDSv2CredentialProvider {
    endpoint: Option<String>,
}

impl IMDSv2CredentialProvider {
    /// Create a new `IMDSv2CredentialProvider` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint for the metadata service.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn endpoint(&self, ctx: &Context) -> String {
        self.endpoint
            .clone()
            .or_else(|| ctx.env_var(AWS_EC2_METADATA_SERVICE_ENDPOINT))
            .unwrap_or_else(|| IMDS_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    async fn fetch(
        &self,
        ctx: &Context,
        method: Method,
        url: &str,
        token: Option<&str>,
    ) -> Result<String> {
        let mut req = http::Request::builder().uri(url).method(method);
        req = match token {
            Some(token) => req.header(IMDS_TOKEN_HEADER, token),
            // 21600s (6h) is recommended by AWS.
            None => req
                .header(CONTENT_LENGTH, "0")
                .header(IMDS_TOKEN_TTL_HEADER, "21600"),
        };
        let req = req.body(Bytes::new()).map_err(|e| {
            Error::url_invalid("failed to build instance metadata request")
                .with_source(e)
                .with_context(format!("url: {url}"))
        })?;

        let resp = ctx.http_send_as_string(req).await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::credential_invalid(format!(
                "instance metadata request failed: status={}",
                resp.status()
            ))
            .with_context(format!("url: {url}"))
            .with_context(format!("body: {}", resp.body())));
        }

        Ok(resp.into_body())
    }
}

#[async_trait]
impl ProvideCredential for IMDSv2CredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        if ctx
            .env_var(AWS_EC2_METADATA_DISABLED)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            debug!("instance metadata lookup disabled by {AWS_EC2_METADATA_DISABLED}");
            return Ok(None);
        }

        let endpoint = self.endpoint(ctx);
        let token = self
            .fetch(ctx, Method::PUT, &format!("{endpoint}/latest/api/token"), None)
            .await?;

        // List all credentials that node has.
        let list_url = format!("{endpoint}/latest/meta-data/iam/security-credentials/");
        let roles = self.fetch(ctx, Method::GET, &list_url, Some(&token)).await?;
        let Some(role) = roles.lines().map(str::trim).find(|v| !v.is_empty()) else {
            return Err(Error::credential_invalid("no IAM role attached to instance")
                .with_context("hint: attach an instance profile to the instance"));
        };

        let cred_url = format!("{list_url}{role}");
        let content = self.fetch(ctx, Method::GET, &cred_url, Some(&token)).await?;
        let resp: Ec2MetadataIamSecurityCredentials =
            serde_json::from_str(&content).map_err(|e| {
                Error::credential_invalid("failed to parse instance metadata credential")
                    .with_source(e)
                    .with_context(format!("role: {role}"))
            })?;

        if resp.code != "Success" {
            return Err(Error::credential_invalid(format!(
                "instance metadata returned error: [{}] {}",
                resp.code, resp.message
            ))
            .with_context(format!("role: {role}")));
        }

        Ok(Some(Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token),
            expires_in: Some(parse_rfc3339(&resp.expiration)?),
        }))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Ec2MetadataIamSecurityCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use awscurl_core::{HttpSend, StaticEnv};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// A tiny stand-in for the metadata service.
    #[derive(Debug)]
    struct FakeImds {
        code: &'static str,
    }

    #[async_trait]
    impl HttpSend for FakeImds {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            let path = req.uri().path().to_string();
            let body = match (req.method().clone(), path.as_str()) {
                (Method::PUT, "/latest/api/token") => {
                    assert_eq!(req.headers()[IMDS_TOKEN_TTL_HEADER], "21600");
                    "imds-token".to_string()
                }
                (Method::GET, "/latest/meta-data/iam/security-credentials/") => {
                    assert_eq!(req.headers()[IMDS_TOKEN_HEADER], "imds-token");
                    "instance-role\n".to_string()
                }
                (Method::GET, "/latest/meta-data/iam/security-credentials/instance-role") => {
                    assert_eq!(req.headers()[IMDS_TOKEN_HEADER], "imds-token");
                    format!(
                        r#"{{
                            "Code": "{}",
                            "Message": "",
                            "AccessKeyId": "IMDSACCESSKEY",
                            "SecretAccessKey": "IMDSSECRETKEY",
                            "Token": "IMDSTOKEN",
                            "Expiration": "2030-01-01T00:00:00Z"
                        }}"#,
                        self.code
                    )
                }
                _ => {
                    return Ok(http::Response::builder()
                        .status(StatusCode::NOT_FOUND)
                        .body(Bytes::new())?)
                }
            };
            Ok(http::Response::new(Bytes::from(body)))
        }
    }

    fn context(code: &'static str, envs: &[(&str, &str)]) -> Context {
        Context::new()
            .with_http_send(FakeImds { code })
            .with_env(StaticEnv {
                home_dir: None,
                envs: envs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<HashMap<_, _>>(),
            })
    }

    #[tokio::test]
    async fn test_imds_credential_provider() -> anyhow::Result<()> {
        let ctx = context("Success", &[]);

        let cred = IMDSv2CredentialProvider::new()
            .with_endpoint("http://127.0.0.1:1338/")
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.access_key_id, "IMDSACCESSKEY");
        assert_eq!(cred.secret_access_key, "IMDSSECRETKEY");
        assert_eq!(cred.session_token.as_deref(), Some("IMDSTOKEN"));
        Ok(())
    }

    #[tokio::test]
    async fn test_imds_credential_provider_error_code() {
        let ctx = context("AssumeRoleUnauthorizedAccess", &[]);

        let err = IMDSv2CredentialProvider::new()
            .provide_credential(&ctx)
            .await
            .expect_err("error code must fail");
        assert_eq!(err.kind(), awscurl_core::ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_imds_credential_provider_disabled() -> anyhow::Result<()> {
        let ctx = context("Success", &[(AWS_EC2_METADATA_DISABLED, "true")]);

        assert!(IMDSv2CredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .is_none());
        Ok(())
    }
}
