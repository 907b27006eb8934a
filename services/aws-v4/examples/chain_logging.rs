//! Walk the default credential chain with debug logging.

use awscurl_aws_v4::{
    EcsCredentialProvider, EnvCredentialProvider, ProfileCredentialProvider,
    ProvideCredentialChain,
};
use awscurl_core::{Context, OsEnv, ProvideCredential};
use awscurl_file_read_tokio::TokioFileRead;
use awscurl_http_send_reqwest::ReqwestHttpSend;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    // Instance metadata is left out to avoid network calls off EC2.
    let chain = ProvideCredentialChain::new()
        .push(EnvCredentialProvider::new())
        .push(ProfileCredentialProvider::new())
        .push(EcsCredentialProvider::new());

    println!("Attempting to load credentials from chain...\n");
    match chain.provide_credential(&ctx).await? {
        Some(cred) => println!("\nFound credential: {cred:?}"),
        None => println!("\nNo credential found in any provider"),
    }

    Ok(())
}
