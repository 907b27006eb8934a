use super::create_test_context_with_env;
use crate::signing::sign;
use anyhow::Result;
use awscurl_aws_v4::{CredentialResolver, ProvideCredentialChain, RequestSigner};
use http::{header, Method, Request};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::Write;
use tempfile::tempdir;

#[tokio::test]
async fn test_profile_credential_signs_with_profile_region() -> Result<()> {
    let dir = tempdir()?;
    let credentials = dir.path().join("credentials");
    let config = dir.path().join("config");

    let mut f = std::fs::File::create(&credentials)?;
    writeln!(f, "[staging]")?;
    writeln!(f, "aws_access_key_id = STAGINGACCESSKEY")?;
    writeln!(f, "aws_secret_access_key = STAGINGSECRETKEY")?;
    writeln!(f, "aws_session_token = STAGINGTOKEN")?;
    let mut f = std::fs::File::create(&config)?;
    writeln!(f, "[profile staging]")?;
    writeln!(f, "region = eu-north-1")?;

    let ctx = create_test_context_with_env(HashMap::from([
        (
            "AWS_SHARED_CREDENTIALS_FILE".to_string(),
            credentials.to_string_lossy().to_string(),
        ),
        (
            "AWS_CONFIG_FILE".to_string(),
            config.to_string_lossy().to_string(),
        ),
    ]));

    let resolved = CredentialResolver::new()
        .with_profile("staging")
        .with_default_provider(ProvideCredentialChain::new())
        .resolve(&ctx)
        .await?;
    assert_eq!(resolved.region, "eu-north-1");

    let signer = RequestSigner::new("execute-api", &resolved.region);
    let req = Request::builder()
        .method(Method::GET)
        .uri("https://abc123.execute-api.eu-north-1.amazonaws.com/prod")
        .body(Vec::new())?;
    let parts = sign(&signer, req, &resolved.credential).await?;

    let auth = parts.headers[header::AUTHORIZATION].to_str()?;
    assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=STAGINGACCESSKEY/"));
    assert!(auth.contains("/eu-north-1/execute-api/aws4_request, "));
    assert!(auth.contains("SignedHeaders=host;x-amz-date;x-amz-security-token, "));
    assert_eq!(parts.headers["x-amz-security-token"], "STAGINGTOKEN");
    Ok(())
}

#[tokio::test]
async fn test_missing_region_fails_at_signing() -> Result<()> {
    let ctx = create_test_context_with_env(HashMap::from([
        (
            "AWS_SHARED_CREDENTIALS_FILE".to_string(),
            "/non/existent/credentials".to_string(),
        ),
        (
            "AWS_CONFIG_FILE".to_string(),
            "/non/existent/config".to_string(),
        ),
    ]));

    let resolved = CredentialResolver::new()
        .with_access_key_id("CLIACCESSKEY")
        .with_secret_access_key("CLISECRETKEY")
        .resolve(&ctx)
        .await?;
    assert_eq!(resolved.region, "");

    let signer = RequestSigner::new("execute-api", &resolved.region);
    let req = Request::builder()
        .method(Method::GET)
        .uri("https://example.com/")
        .body(Vec::new())?;
    let err = sign(&signer, req, &resolved.credential)
        .await
        .expect_err("empty region must be rejected");
    let err = err
        .downcast::<awscurl_core::Error>()
        .expect("error must come from the signer");
    assert_eq!(err.kind(), awscurl_core::ErrorKind::SigningFailed);
    Ok(())
}
