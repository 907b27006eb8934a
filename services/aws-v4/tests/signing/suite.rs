//! Requests from the public AWS SigV4 test suite.

use super::{authorization, sign, suite_credential, suite_signer};
use anyhow::Result;
use http::{Method, Request};
use pretty_assertions::assert_eq;

fn expected(signed_headers: &str, signature: &str) -> String {
    format!(
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
         SignedHeaders={signed_headers}, Signature={signature}"
    )
}

#[tokio::test]
async fn test_get_vanilla() -> Result<()> {
    let req = Request::builder()
        .method(Method::GET)
        .uri("https://example.amazonaws.com/")
        .body(Vec::new())?;

    let parts = sign(&suite_signer(), req, &suite_credential()).await?;
    assert_eq!(
        authorization(&parts)?,
        expected(
            "host;x-amz-date",
            "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_post_vanilla() -> Result<()> {
    let req = Request::builder()
        .method(Method::POST)
        .uri("https://example.amazonaws.com/")
        .body(Vec::new())?;

    let parts = sign(&suite_signer(), req, &suite_credential()).await?;
    assert_eq!(
        authorization(&parts)?,
        expected(
            "host;x-amz-date",
            "5da7c1a2acd57cee7505fc6676e4e544621c30862966e37dddb68e92efbe5d6b"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_get_vanilla_query_order_key_case() -> Result<()> {
    let req = Request::builder()
        .method(Method::GET)
        .uri("https://example.amazonaws.com/?Param2=value2&Param1=value1")
        .body(Vec::new())?;

    let parts = sign(&suite_signer(), req, &suite_credential()).await?;
    assert_eq!(
        authorization(&parts)?,
        expected(
            "host;x-amz-date",
            "b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500"
        )
    );
    // The query goes out in the order it was signed.
    assert_eq!(
        parts.uri.to_string(),
        "https://example.amazonaws.com/?Param1=value1&Param2=value2"
    );
    Ok(())
}

#[tokio::test]
async fn test_user_agent_is_not_signed() -> Result<()> {
    let plain = Request::builder()
        .method(Method::GET)
        .uri("https://example.amazonaws.com/")
        .body(Vec::new())?;
    let with_agent = Request::builder()
        .method(Method::GET)
        .uri("https://example.amazonaws.com/")
        .header("User-Agent", "awscurl/0.1.0")
        .header("X-Amzn-Trace-Id", "Root=1-abc")
        .body(Vec::new())?;

    let plain = sign(&suite_signer(), plain, &suite_credential()).await?;
    let with_agent = sign(&suite_signer(), with_agent, &suite_credential()).await?;
    assert_eq!(authorization(&plain)?, authorization(&with_agent)?);
    assert_eq!(with_agent.headers["user-agent"], "awscurl/0.1.0");
    Ok(())
}

#[tokio::test]
async fn test_body_changes_signature() -> Result<()> {
    let first = Request::builder()
        .method(Method::POST)
        .uri("https://example.amazonaws.com/")
        .body(b"one".to_vec())?;
    let second = Request::builder()
        .method(Method::POST)
        .uri("https://example.amazonaws.com/")
        .body(b"two".to_vec())?;

    let first = sign(&suite_signer(), first, &suite_credential()).await?;
    let second = sign(&suite_signer(), second, &suite_credential()).await?;
    assert_ne!(authorization(&first)?, authorization(&second)?);
    Ok(())
}
