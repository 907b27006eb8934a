//! Staged construction of the outbound request.
//!
//! A request moves through three stages and can only move forward:
//!
//! - [`Built`]: method, logical url, body and user headers are set.
//! - [`Signed`]: the signer has added its headers. Headers are final.
//! - [`Ready`]: the url points at the physical endpoint.
//!
//! Only a [`Signed`] request can be retargeted, and only a [`Ready`]
//! request can be handed to the transport.

use crate::body::Body;
use crate::endpoint::Endpoint;
use awscurl_core::{Context, Result, SignRequest};
use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Uri};
use log::debug;
use std::marker::PhantomData;

#[derive(Debug)]
pub struct Built;

#[derive(Debug)]
pub struct Signed;

#[derive(Debug)]
pub struct Ready;

#[derive(Debug)]
pub struct OutboundRequest<S> {
    parts: Parts,
    body: Body,
    stage: PhantomData<S>,
}

impl<S> OutboundRequest<S> {
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    fn advance<T>(self) -> OutboundRequest<T> {
        OutboundRequest {
            parts: self.parts,
            body: self.body,
            stage: PhantomData,
        }
    }
}

impl OutboundRequest<Built> {
    /// Start a request against the logical endpoint.
    pub fn new(method: Method, logical: &Endpoint, body: Body) -> Result<Self> {
        let (parts, ()) = Request::builder()
            .method(method)
            .uri(logical.uri().clone())
            .body(())?
            .into_parts();

        Ok(Self {
            parts,
            body,
            stage: PhantomData,
        })
    }

    /// Append user headers, repeated names keep every value.
    pub fn with_headers(mut self, headers: &[(HeaderName, HeaderValue)]) -> Self {
        for (name, value) in headers {
            self.parts.headers.append(name.clone(), value.clone());
        }
        self
    }

    /// Sign the request in place.
    pub async fn sign<T: SignRequest>(
        mut self,
        ctx: &Context,
        signer: &T,
        credential: &T::Credential,
    ) -> Result<OutboundRequest<Signed>> {
        debug!(
            "signing {} {} with {} byte body, sha256 {}",
            self.parts.method,
            self.parts.uri,
            self.body.bytes().len(),
            self.body.digest()
        );
        signer
            .sign_request(ctx, &mut self.parts, self.body.bytes(), credential)
            .await?;

        Ok(self.advance())
    }
}

impl OutboundRequest<Signed> {
    /// Point the request at the physical endpoint.
    ///
    /// The url becomes the physical target as given, query untouched, since
    /// the service canonicalizes the query itself. Headers stay as signed.
    pub fn retarget(mut self, physical: &Endpoint) -> OutboundRequest<Ready> {
        self.parts.uri = physical.uri().clone();

        debug!("request retargeted to {}", self.parts.uri);
        self.advance()
    }
}

impl OutboundRequest<Ready> {
    pub fn into_request(self) -> Request<Bytes> {
        Request::from_parts(self.parts, self.body.bytes().clone())
    }
}
