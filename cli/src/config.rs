use crate::args::Cli;
use crate::endpoint::PortMap;
use crate::header::parse_headers;
use awscurl_aws_v4::CredentialResolver;
use awscurl_core::utils::Redact;
use awscurl_core::{Error, Result};
use http::{HeaderName, HeaderValue, Method};
use std::fmt::{self, Debug, Formatter};

/// Everything one invocation needs, validated up front and never mutated.
#[derive(Clone)]
pub struct Config {
    pub url: String,
    pub method: Method,
    pub data: String,
    pub headers: Vec<(HeaderName, HeaderValue)>,

    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub session_token: Option<String>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub service: String,

    pub insecure: bool,
    pub port_map: Option<PortMap>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("data", &self.data)
            .field("headers", &self.headers)
            .field("access_key", &Redact::from(&self.access_key))
            .field("secret_key", &Redact::from(&self.secret_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("profile", &self.profile)
            .field("region", &self.region)
            .field("service", &self.service)
            .field("insecure", &self.insecure)
            .field("port_map", &self.port_map)
            .finish()
    }
}

impl TryFrom<Cli> for Config {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let method = Method::from_bytes(cli.method.as_bytes()).map_err(|e| {
            Error::config_invalid(format!("invalid request method: {}", cli.method))
                .with_source(e)
        })?;
        let headers = parse_headers(&cli.headers)?;
        let port_map: Option<PortMap> = cli.port_map.as_deref().map(str::parse).transpose()?;

        Ok(Self {
            url: cli.url,
            method,
            data: cli.data,
            headers,

            access_key: cli.access_key,
            secret_key: cli.secret_key,
            session_token: cli.session_token,
            profile: cli.profile,
            region: cli.region,
            service: cli.service,

            insecure: cli.insecure,
            port_map,
        })
    }
}

impl Config {
    /// A resolver carrying the credential flags of this invocation.
    pub fn credential_resolver(&self) -> CredentialResolver {
        let mut resolver = CredentialResolver::new();
        if let Some(v) = &self.access_key {
            resolver = resolver.with_access_key_id(v);
        }
        if let Some(v) = &self.secret_key {
            resolver = resolver.with_secret_access_key(v);
        }
        if let Some(v) = &self.session_token {
            resolver = resolver.with_session_token(v);
        }
        if let Some(v) = &self.profile {
            resolver = resolver.with_profile(v);
        }
        if let Some(v) = &self.region {
            resolver = resolver.with_region(v);
        }
        resolver
    }
}
