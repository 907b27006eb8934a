//! Sign a request for API Gateway and print the resulting headers.
//!
//! ```shell
//! cargo run --example sign_request -- https://abc123.execute-api.us-east-1.amazonaws.com/prod
//! ```

use awscurl_aws_v4::{CredentialResolver, RequestSigner};
use awscurl_core::{Context, OsEnv, SignRequest};
use awscurl_file_read_tokio::TokioFileRead;
use awscurl_http_send_reqwest::ReqwestHttpSend;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://abc123.execute-api.us-east-1.amazonaws.com/prod".into());

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let resolved = CredentialResolver::new().resolve(&ctx).await?;

    let signer = RequestSigner::new("execute-api", &resolved.region);
    let (mut parts, ()) = http::Request::get(&url).body(())?.into_parts();
    signer
        .sign_request(&ctx, &mut parts, b"", &resolved.credential)
        .await?;

    println!("{} {}", parts.method, parts.uri);
    for (name, value) in &parts.headers {
        if value.is_sensitive() {
            println!("{name}: <redacted>");
        } else {
            println!("{name}: {}", value.to_str()?);
        }
    }

    Ok(())
}
