mod args;
mod assemble;
mod body;
mod config;
mod endpoint;
mod header;
mod transport;

use crate::args::Cli;
use crate::assemble::OutboundRequest;
use crate::body::Body;
use crate::config::Config;
use crate::transport::Transport;
use awscurl_aws_v4::RequestSigner;
use awscurl_core::{Context, OsEnv, Result};
use awscurl_file_read_tokio::TokioFileRead;
use awscurl_http_send_reqwest::ReqwestHttpSend;
use clap::Parser;
use log::debug;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::try_from(cli)?;
    debug!("running with {config:?}");

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    let endpoints = endpoint::resolve(&config.url, config.port_map)?;
    let body = Body::materialize(&ctx, &config.data).await?;
    let resolved = config.credential_resolver().resolve(&ctx).await?;
    let signer = RequestSigner::new(&config.service, &resolved.region);

    let req = OutboundRequest::new(config.method.clone(), &endpoints.logical, body)?
        .with_headers(&config.headers)
        .sign(&ctx, &signer, &resolved.credential)
        .await?
        .retarget(&endpoints.physical);

    Transport::new(config.insecure)?
        .send(req, &mut std::io::stdout())
        .await?;
    Ok(())
}
