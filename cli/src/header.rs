use awscurl_core::{Error, Result};
use http::{HeaderName, HeaderValue};

/// Parse one `Name: Value` header argument.
///
/// The argument must contain exactly one colon. Name and value are trimmed.
/// The value may be any UTF-8 text without control characters.
pub fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let invalid = || {
        Error::header_invalid(format!("invalid header: {raw}"))
            .with_context(r#"hint: headers must be in the format "Name: Value""#)
    };

    let mut split = raw.split(':');
    let (Some(name), Some(value), None) = (split.next(), split.next(), split.next()) else {
        return Err(invalid());
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }

    let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid().with_source(e))?;
    let value = HeaderValue::from_bytes(value.trim().as_bytes())
        .map_err(|e| invalid().with_source(e))?;
    Ok((name, value))
}

/// Parse every header argument, failing on the first malformed one.
pub fn parse_headers<S: AsRef<str>>(raws: &[S]) -> Result<Vec<(HeaderName, HeaderValue)>> {
    raws.iter().map(|raw| parse_header(raw.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use awscurl_core::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_header_trims() -> anyhow::Result<()> {
        let (name, value) = parse_header("  X-Foo :   bar  ")?;

        assert_eq!(name.as_str(), "x-foo");
        assert_eq!(value, "bar");
        Ok(())
    }

    #[test]
    fn test_parse_header_utf8_value() -> anyhow::Result<()> {
        let (name, value) = parse_header("X-Name: café")?;

        assert_eq!(name.as_str(), "x-name");
        assert_eq!(value.as_bytes(), "café".as_bytes());
        Ok(())
    }

    #[test]
    fn test_parse_header_empty_value() -> anyhow::Result<()> {
        let (name, value) = parse_header("X-Empty:")?;

        assert_eq!(name.as_str(), "x-empty");
        assert_eq!(value, "");
        Ok(())
    }

    #[test]
    fn test_parse_header_rejects_malformed() {
        for raw in [
            "BadHeader",
            "a:b:c",
            "Referer: https://example.com",
            ": value",
            "Bad Name: value",
            "X-Bell: ring\u{7}",
        ] {
            let err = parse_header(raw).expect_err(raw);
            assert_eq!(err.kind(), ErrorKind::HeaderInvalid, "{raw}");
        }
    }

    #[test]
    fn test_parse_headers_keeps_order_and_duplicates() -> anyhow::Result<()> {
        let headers = parse_headers(&["X-A: 1", "X-B: 2", "X-A: 3"])?;

        let pairs: Vec<_> = headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_str().expect("ascii")))
            .collect();
        assert_eq!(pairs, vec![("x-a", "1"), ("x-b", "2"), ("x-a", "3")]);
        Ok(())
    }

    #[test]
    fn test_parse_headers_fails_on_any_bad_header() {
        let err = parse_headers(&["X-A: 1", "BadHeader"]).expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::HeaderInvalid);
    }
}
