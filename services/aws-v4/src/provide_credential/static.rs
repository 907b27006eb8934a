use crate::Credential;
use async_trait::async_trait;
use awscurl_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider returns the access key pair given on the command line.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with access key ID and secret access key.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: None,
        }
    }

    /// Attach a session token.
    ///
    /// An empty token is ignored so that `--session-token ""` signs the same
    /// way as leaving the flag out.
    pub fn with_session_token(mut self, token: &str) -> Self {
        if !token.is_empty() {
            self.session_token = Some(token.to_string());
        }
        self
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(Credential {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
            expires_in: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_static_credential_provider() -> anyhow::Result<()> {
        let ctx = Context::new();

        let provider = StaticCredentialProvider::new("AKIDSTATIC", "static_secret");
        let cred = provider
            .provide_credential(&ctx)
            .await?
            .expect("static provider always yields");
        assert_eq!(cred.access_key_id, "AKIDSTATIC");
        assert_eq!(cred.secret_access_key, "static_secret");
        assert!(cred.session_token.is_none());

        let provider = StaticCredentialProvider::new("AKIDSTATIC", "static_secret")
            .with_session_token("static_token");
        let cred = provider
            .provide_credential(&ctx)
            .await?
            .expect("static provider always yields");
        assert_eq!(cred.session_token.as_deref(), Some("static_token"));

        let provider =
            StaticCredentialProvider::new("AKIDSTATIC", "static_secret").with_session_token("");
        let cred = provider
            .provide_credential(&ctx)
            .await?
            .expect("static provider always yields");
        assert!(cred.session_token.is_none());

        Ok(())
    }
}
