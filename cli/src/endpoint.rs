use awscurl_core::{Error, Result};
use http::uri::{Authority, Scheme};
use http::Uri;
use std::fmt;
use std::str::FromStr;

/// A parsed absolute `http` or `https` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    uri: Uri,
}

impl Endpoint {
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn scheme(&self) -> &Scheme {
        // Checked in `from_str`.
        self.uri.scheme().unwrap_or(&Scheme::HTTP)
    }

    pub fn authority(&self) -> Option<&Authority> {
        self.uri.authority()
    }

    pub fn port(&self) -> Option<u16> {
        self.uri.port_u16()
    }

    /// Copy of this endpoint with the explicit port swapped.
    fn with_port(&self, port: u16) -> Result<Self> {
        let authority = self
            .authority()
            .ok_or_else(|| Error::url_invalid("url has no authority"))?;
        let Some(old) = authority.port() else {
            return Ok(self.clone());
        };

        let raw = authority.as_str();
        let base = &raw[..raw.len() - old.as_str().len() - 1];
        let mut parts = self.uri.clone().into_parts();
        parts.authority = Some(Authority::from_str(&format!("{base}:{port}"))?);

        Ok(Self {
            uri: Uri::from_parts(parts)?,
        })
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let uri = Uri::from_str(s)
            .map_err(|e| Error::url_invalid(format!("invalid url: {s}")).with_source(e))?;

        match uri.scheme_str() {
            Some("http") | Some("https") => {}
            _ => {
                return Err(Error::url_invalid(format!("invalid url: {s}"))
                    .with_context("hint: the url must start with http:// or https://"))
            }
        }
        if uri.host().map_or(true, str::is_empty) {
            return Err(Error::url_invalid(format!("url has no host: {s}")));
        }

        Ok(Self { uri })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// A `LOCAL:REMOTE` port mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortMap {
    pub local: u16,
    pub remote: u16,
}

impl FromStr for PortMap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::config_invalid(format!("invalid port map: {s}"))
                .with_context("hint: use the format LOCAL:REMOTE, for example 8443:443")
        };

        let (local, remote) = s.split_once(':').ok_or_else(invalid)?;
        let local = local
            .trim()
            .parse::<u16>()
            .map_err(|e| invalid().with_source(e))?;
        let remote = remote
            .trim()
            .parse::<u16>()
            .map_err(|e| invalid().with_source(e))?;

        Ok(Self { local, remote })
    }
}

/// Where the request is signed for and where it is sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointPair {
    /// The identity the service sees. Used for signing and the `host` header.
    pub logical: Endpoint,
    /// The socket target.
    pub physical: Endpoint,
}

/// Resolve the logical and physical endpoints for `target`.
///
/// With a mapping whose local port is the explicit port of `target`, the
/// logical endpoint carries the remote port instead. In every other case
/// both endpoints are the parsed target.
pub fn resolve(target: &str, port_map: Option<PortMap>) -> Result<EndpointPair> {
    let physical = Endpoint::from_str(target)?;

    let logical = match port_map {
        Some(map) if physical.port() == Some(map.local) => physical.with_port(map.remote)?,
        _ => physical.clone(),
    };

    Ok(EndpointPair { logical, physical })
}
