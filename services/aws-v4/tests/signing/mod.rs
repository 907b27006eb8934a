mod live;
mod suite;

use awscurl_aws_v4::{Credential, RequestSigner};
use awscurl_core::{Context, SignRequest};
use chrono::TimeZone;
use http::request::Parts;
use http::{header, Request};

pub const ACCESS_KEY: &str = "AKIDEXAMPLE";
pub const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

/// Credential shared by every request in the SigV4 test suite.
pub fn suite_credential() -> Credential {
    Credential {
        access_key_id: ACCESS_KEY.to_string(),
        secret_access_key: SECRET_KEY.to_string(),
        session_token: None,
        expires_in: None,
    }
}

/// Signer pinned to the SigV4 test suite clock, `20150830T123600Z`.
pub fn suite_signer() -> RequestSigner {
    let time = chrono::Utc
        .with_ymd_and_hms(2015, 8, 30, 12, 36, 0)
        .single()
        .expect("time must be valid");
    RequestSigner::new("service", "us-east-1").with_time(time)
}

/// Sign the request and return its parts.
pub async fn sign(
    signer: &RequestSigner,
    req: Request<Vec<u8>>,
    cred: &Credential,
) -> anyhow::Result<Parts> {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut parts, body) = req.into_parts();
    signer
        .sign_request(&Context::new(), &mut parts, &body, cred)
        .await?;
    Ok(parts)
}

pub fn authorization(parts: &Parts) -> anyhow::Result<String> {
    Ok(parts.headers[header::AUTHORIZATION].to_str()?.to_string())
}
