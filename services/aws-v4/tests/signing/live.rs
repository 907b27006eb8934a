use super::sign;
use anyhow::Result;
use awscurl_aws_v4::{CredentialResolver, RequestSigner};
use awscurl_core::{Context, OsEnv};
use awscurl_file_read_tokio::TokioFileRead;
use awscurl_http_send_reqwest::ReqwestHttpSend;
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use log::{debug, warn};
use std::env;

/// Signs a request against a real endpoint.
///
/// Runs only with `AWSCURL_AWS_V4_TEST=on`. `AWSCURL_AWS_V4_URL` names the
/// endpoint, `AWSCURL_AWS_V4_SERVICE` the service (default `execute-api`).
/// Credential and region come from the usual AWS environment.
#[tokio::test]
async fn test_live_signed_request() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    if env::var("AWSCURL_AWS_V4_TEST").as_deref() != Ok("on") {
        warn!("AWSCURL_AWS_V4_TEST is not set, skipped");
        return Ok(());
    }

    let url = env::var("AWSCURL_AWS_V4_URL")?;
    let service = env::var("AWSCURL_AWS_V4_SERVICE").unwrap_or_else(|_| "execute-api".into());

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let resolved = CredentialResolver::new().resolve(&ctx).await?;
    let signer = RequestSigner::new(&service, &resolved.region);

    let req = Request::builder()
        .method(Method::GET)
        .uri(&url)
        .body(Vec::new())?;
    let parts = sign(&signer, req, &resolved.credential).await?;

    let resp = ctx
        .http_send_as_string(Request::from_parts(parts, Bytes::new()))
        .await?;
    debug!("response status: {}, body: {}", resp.status(), resp.body());
    assert_ne!(resp.status(), StatusCode::FORBIDDEN, "{}", resp.body());
    Ok(())
}
