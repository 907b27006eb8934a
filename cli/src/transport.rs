use crate::assemble::{OutboundRequest, Ready};
use awscurl_core::{Error, Result};
use http::StatusCode;
use log::{debug, info};
use reqwest::Client;
use std::io::Write;

/// Sends ready requests and prints the response body line by line.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    /// Build the transport. `insecure` turns certificate verification off entirely.
    pub fn new(insecure: bool) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(|e| Error::network("failed to build http client").with_source(e))?;

        Ok(Self { client })
    }

    /// Send the request and copy the response body to `out`.
    ///
    /// Non-success statuses are not errors, their body is printed the same way.
    pub async fn send(
        &self,
        req: OutboundRequest<Ready>,
        out: &mut impl Write,
    ) -> Result<StatusCode> {
        let uri = req.uri().to_string();
        debug!("sending request to {uri} with {} headers", req.headers().len());
        let req = req.into_request();
        let req = reqwest::Request::try_from(req).map_err(|e| {
            Error::url_invalid("failed to convert request")
                .with_source(e)
                .with_context(format!("uri: {uri}"))
        })?;

        let mut resp = self.client.execute(req).await.map_err(|e| {
            Error::network("failed to send request")
                .with_source(e)
                .with_context(format!("uri: {uri}"))
        })?;
        let status = resp.status();
        info!("{uri} responded with {status}");

        let mut printer = LinePrinter::default();
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| Error::network("failed to read response body").with_source(e))?
        {
            debug!("received {} bytes", chunk.len());
            printer.push(&chunk, out)?;
        }
        printer.finish(out)?;

        Ok(status)
    }
}

/// Splits a byte stream into lines as it arrives.
///
/// Every line is written with a trailing `\n`, a `\r` before the newline is
/// dropped, and a final line without newline is still printed.
#[derive(Debug, Default)]
struct LinePrinter {
    pending: Vec<u8>,
}

impl LinePrinter {
    fn push(&mut self, chunk: &[u8], out: &mut impl Write) -> Result<()> {
        self.pending.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(pos) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + pos;
            write_line(&self.pending[start..end], out)?;
            start = end + 1;
        }
        self.pending.drain(..start);
        Ok(())
    }

    fn finish(self, out: &mut impl Write) -> Result<()> {
        if !self.pending.is_empty() {
            write_line(&self.pending, out)?;
        }
        out.flush()?;
        Ok(())
    }
}

fn write_line(line: &[u8], out: &mut impl Write) -> Result<()> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    out.write_all(line)?;
    out.write_all(b"\n")?;
    Ok(())
}
