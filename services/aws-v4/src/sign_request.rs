use crate::constants::{
    AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, UNSIGNABLE_HEADERS, X_AMZ_DATE,
    X_AMZ_SECURITY_TOKEN,
};
use crate::Credential;
use async_trait::async_trait;
use awscurl_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use awscurl_core::time::{format_date, format_iso8601, now, DateTime};
use awscurl_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::header::{self, HeaderName};
use http::request::Parts;
use http::uri::Scheme;
use http::HeaderValue;
use log::debug;
use percent_encoding::utf8_percent_encode;
use std::fmt::Write;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Every call derives its own timestamp, body digest and canonical request.
/// Nothing is cached between calls.
#[derive(Debug)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing or reproducing a signature.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        body: &[u8],
        cred: &Self::Credential,
    ) -> Result<()> {
        if self.region.is_empty() {
            return Err(Error::signing_failed("region is required for SigV4 signing")
                .with_context("hint: pass --region or set AWS_REGION"));
        }
        if self.service.is_empty() {
            return Err(Error::signing_failed("service is required for SigV4 signing"));
        }
        if cred.access_key_id.is_empty() || cred.secret_access_key.is_empty() {
            return Err(Error::credential_invalid(
                "access key id and secret access key must not be empty",
            ));
        }

        // Taken once, every later step reads this value.
        let now = self.time.unwrap_or_else(now);
        let body_digest = hex_sha256(body);
        debug!("calculated body digest: {body_digest}");

        let mut signed_req = SigningRequest::build(req)?;

        // canonicalize context
        canonicalize_header(&mut signed_req, cred, now)?;
        canonicalize_query(&mut signed_req);

        // build canonical request and string to sign.
        let signed_headers = signed_header_names(&signed_req);
        let creq = canonical_request_string(&signed_req, &self.service, &signed_headers, &body_digest)?;
        debug!("calculated canonical request: {creq}");
        let encoded_req = hex_sha256(creq.as_bytes());

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = format!(
            "{}/{}/{}/aws4_request",
            format_date(now),
            self.region,
            self.service
        );
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "AWS4-HMAC-SHA256")?;
            writeln!(f, "{}", format_iso8601(now))?;
            writeln!(f, "{}", &scope)?;
            write!(f, "{}", &encoded_req)?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let mut authorization = HeaderValue::from_str(&format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id,
            scope,
            signed_headers.join(";"),
            signature
        ))
        .map_err(|e| {
            Error::signing_failed("failed to create authorization header").with_source(e)
        })?;
        authorization.set_sensitive(true);

        signed_req
            .headers
            .insert(header::AUTHORIZATION, authorization);

        // Apply to the request.
        signed_req.apply(req)
    }
}

/// Header names taking part in the signature, sorted and lowercase.
fn signed_header_names(ctx: &SigningRequest) -> Vec<String> {
    ctx.header_name_to_vec_sorted()
        .into_iter()
        .filter(|name| !UNSIGNABLE_HEADERS.contains(name))
        .map(|name| name.to_string())
        .collect()
}

fn canonical_request_string(
    ctx: &SigningRequest,
    service: &str,
    signed_headers: &[String],
    body_digest: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{}", ctx.method)?;
    // Insert encoded path
    writeln!(f, "{}", canonical_path(ctx, service))?;
    // Insert query
    writeln!(
        f,
        "{}",
        ctx.query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    )?;
    // Insert signed headers
    for name in signed_headers {
        let value = ctx.header_value_joined(&HeaderName::from_bytes(name.as_bytes())?)?;
        writeln!(f, "{name}:{value}")?;
    }
    writeln!(f)?;
    writeln!(f, "{}", signed_headers.join(";"))?;
    write!(f, "{body_digest}")?;

    Ok(f)
}

/// S3 expects the path encoded once, every other service expects the
/// already escaped path to be escaped a second time.
fn canonical_path(ctx: &SigningRequest, service: &str) -> String {
    if ctx.path.is_empty() {
        return "/".to_string();
    }

    if service == "s3" {
        utf8_percent_encode(&ctx.path_percent_decoded(), &AWS_URI_ENCODE_SET).to_string()
    } else {
        utf8_percent_encode(&ctx.path, &AWS_URI_ENCODE_SET).to_string()
    }
}

fn canonicalize_header(ctx: &mut SigningRequest, cred: &Credential, now: DateTime) -> Result<()> {
    // Insert HOST header if not present.
    if ctx.headers.get(header::HOST).is_none() {
        let host = host_header_value(ctx);
        ctx.header_insert(header::HOST, &host).map_err(|e| {
            Error::signing_failed("failed to parse authority as header value").with_source(e)
        })?;
    }

    // The date header always carries the signing time, a stale value would
    // not match the credential scope.
    ctx.header_insert(HeaderName::from_static(X_AMZ_DATE), &format_iso8601(now))?;

    // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
    if let Some(token) = &cred.session_token {
        let mut value = HeaderValue::from_str(token).map_err(|e| {
            Error::credential_invalid("session token is not a valid header value").with_source(e)
        })?;
        // Set token value sensitive to valid leaking.
        value.set_sensitive(true);

        ctx.headers
            .insert(HeaderName::from_static(X_AMZ_SECURITY_TOKEN), value);
    }

    Ok(())
}

/// The host header drops the port when it is the scheme's default.
fn host_header_value(ctx: &SigningRequest) -> String {
    let host = ctx.authority.host();
    let default_port = if ctx.scheme == Scheme::HTTPS {
        Some(443)
    } else if ctx.scheme == Scheme::HTTP {
        Some(80)
    } else {
        None
    };

    match ctx.authority.port_u16() {
        Some(port) if Some(port) != default_port => format!("{host}:{port}"),
        _ => host.to_string(),
    }
}

fn canonicalize_query(ctx: &mut SigningRequest) {
    // Return if query is empty.
    if ctx.query.is_empty() {
        return;
    }

    ctx.query = ctx
        .query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();

    // Sort by encoded param name, then value.
    ctx.query.sort();
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}
