//! AWS SigV4 signing for awscurl.
//!
//! This crate resolves the credential and region for one invocation and
//! signs a request with AWS Signature Version 4.
//!
//! ## Example
//!
//! ```no_run
//! use awscurl_aws_v4::{CredentialResolver, RequestSigner};
//! use awscurl_core::{Context, OsEnv, SignRequest};
//! use awscurl_file_read_tokio::TokioFileRead;
//!
//! # async fn example() -> awscurl_core::Result<()> {
//! let ctx = Context::new().with_file_read(TokioFileRead).with_env(OsEnv);
//! let resolved = CredentialResolver::new().resolve(&ctx).await?;
//!
//! let signer = RequestSigner::new("execute-api", &resolved.region);
//! let (mut parts, _) = http::Request::get("https://api.example.com/prod/items")
//!     .body(())?
//!     .into_parts();
//! signer
//!     .sign_request(&ctx, &mut parts, b"", &resolved.credential)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};

mod credential;
pub use credential::{Credential, ResolvedCredential};

mod provide_credential;
pub use provide_credential::*;

mod resolve;
pub use resolve::CredentialResolver;

mod sign_request;
pub use sign_request::RequestSigner;
