//! Core components for the awscurl signing pipeline.
//!
//! This crate provides the foundational types and traits shared by the
//! credential providers, the SigV4 signer and the command line tool.
//!
//! ## Overview
//!
//! - **Context**: holds the file reader, HTTP sender and environment the
//!   pipeline may use. Nothing reads process state behind its back.
//! - **Traits**: [`ProvideCredential`] loads a credential from one source,
//!   [`SignRequest`] authenticates a request with it.
//! - **SigningRequest**: the canonical view of a request while it is being
//!   signed.
//! - **Error**: one error type whose [`ErrorKind`] tells which stage failed.
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use awscurl_core::{Context, ProvideCredential, Result, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct Token(String);
//!
//! impl SigningCredential for Token {
//!     fn is_valid(&self) -> bool {
//!         !self.0.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct TokenProvider;
//!
//! #[async_trait]
//! impl ProvideCredential for TokenProvider {
//!     type Credential = Token;
//!
//!     async fn provide_credential(&self, ctx: &Context) -> Result<Option<Token>> {
//!         Ok(ctx.env_var("MY_TOKEN").map(Token))
//!     }
//! }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: SHA256 and HMAC-SHA256 helpers
//! - [`time`]: timestamp formatting for signing
//! - [`utils`]: data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::FileRead;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopFileRead;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::SigningRequest;
