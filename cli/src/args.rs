use clap::Parser;

/// cURL with AWS request signing.
///
/// Sends one HTTP request and signs it with AWS Signature Version 4 before
/// it leaves the machine. More details:
/// https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html
#[derive(Parser, Debug, Clone)]
#[command(name = "awscurl", version)]
pub struct Cli {
    /// Target URL
    pub url: String,

    /// Custom request method to use
    #[arg(short = 'X', long = "request", value_name = "METHOD", default_value = "GET")]
    pub method: String,

    /// Data payload to send within a request, or `@path` to read it from a file
    #[arg(short = 'd', long = "data", default_value = "")]
    pub data: String,

    /// Extra HTTP header to include in the request, as "Name: Value". May be repeated
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// AWS Access Key ID to use for authentication
    #[arg(long)]
    pub access_key: Option<String>,

    /// AWS Secret Access Key to use for authentication
    #[arg(long)]
    pub secret_key: Option<String>,

    /// AWS Session Token to use for authentication
    #[arg(long)]
    pub session_token: Option<String>,

    /// AWS profile to use for authentication
    #[arg(long)]
    pub profile: Option<String>,

    /// AWS region to use for the request
    #[arg(long)]
    pub region: Option<String>,

    /// The name of the AWS service, used for signing the request
    #[arg(long, default_value = "execute-api")]
    pub service: String,

    /// Allow insecure server connections when using TLS
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Map the local port to the remote port, used when port-forwarding to the service
    #[arg(long, value_name = "LOCAL:REMOTE")]
    pub port_map: Option<String>,
}
