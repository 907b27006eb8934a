use crate::constants::{AWS_DEFAULT_REGION, AWS_REGION};
use crate::provide_credential::{
    DefaultCredentialProvider, ProfileCredentialProvider, StaticCredentialProvider,
};
use crate::{Credential, ResolvedCredential};
use awscurl_core::utils::Redact;
use awscurl_core::{Context, Error, ProvideCredential, Result, SigningCredential};
use log::debug;
use std::fmt::{Debug, Formatter};

/// CredentialResolver picks the credential and region for one invocation.
///
/// Precedence, highest first:
///
/// 1. An explicit access key **and** secret key, with the session token if given.
/// 2. A named profile. A profile that yields nothing is an error.
/// 3. The default discovery chain, see [`DefaultCredentialProvider`].
///
/// The region is the explicit one if given, then `AWS_REGION`, then
/// `AWS_DEFAULT_REGION`, then the `region` key of the selected profile.
/// Region lookup never fails; an empty region is handed to the signer as is.
pub struct CredentialResolver {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
    profile: Option<String>,
    region: Option<String>,

    default_provider: Box<dyn ProvideCredential<Credential = Credential>>,
}

impl Debug for CredentialResolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("profile", &self.profile)
            .field("region", &self.region)
            .field("default_provider", &self.default_provider)
            .finish()
    }
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialResolver {
    /// Create a resolver that only consults the default chain.
    pub fn new() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            profile: None,
            region: None,

            default_provider: Box::new(DefaultCredentialProvider::new()),
        }
    }

    /// Set the explicit access key id.
    pub fn with_access_key_id(mut self, v: impl Into<String>) -> Self {
        self.access_key_id = Some(v.into());
        self
    }

    /// Set the explicit secret access key.
    pub fn with_secret_access_key(mut self, v: impl Into<String>) -> Self {
        self.secret_access_key = Some(v.into());
        self
    }

    /// Set the session token used with the explicit key pair.
    pub fn with_session_token(mut self, v: impl Into<String>) -> Self {
        self.session_token = Some(v.into());
        self
    }

    /// Set the named profile.
    pub fn with_profile(mut self, v: impl Into<String>) -> Self {
        self.profile = Some(v.into());
        self
    }

    /// Set the explicit region.
    pub fn with_region(mut self, v: impl Into<String>) -> Self {
        self.region = Some(v.into());
        self
    }

    /// Replace the provider used when neither keys nor a profile are given.
    pub fn with_default_provider(
        mut self,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        self.default_provider = Box::new(provider);
        self
    }

    /// Resolve the credential and region.
    pub async fn resolve(&self, ctx: &Context) -> Result<ResolvedCredential> {
        let credential = self.resolve_credential(ctx).await?;
        if !credential.is_valid() {
            return Err(Error::credential_invalid("credential is expired").with_context(
                format!("expires_in: {:?}", credential.expires_in),
            ));
        }
        let region = self.resolve_region(ctx).await?;
        debug!(
            "resolved credential {} in region {region:?}",
            Redact::from(&credential.access_key_id)
        );

        Ok(ResolvedCredential { credential, region })
    }

    async fn resolve_credential(&self, ctx: &Context) -> Result<Credential> {
        let explicit = |v: &Option<String>| v.clone().filter(|v| !v.is_empty());

        if let (Some(ak), Some(sk)) = (
            explicit(&self.access_key_id),
            explicit(&self.secret_access_key),
        ) {
            debug!("using credential given on the command line");
            let mut provider = StaticCredentialProvider::new(&ak, &sk);
            if let Some(token) = &self.session_token {
                provider = provider.with_session_token(token);
            }
            return provider.provide_credential(ctx).await?.ok_or_else(|| {
                Error::unexpected("static credential provider returned nothing")
            });
        }

        if let Some(profile) = explicit(&self.profile) {
            debug!("loading credential from profile {profile}");
            return ProfileCredentialProvider::new()
                .with_profile(&profile)
                .provide_credential(ctx)
                .await
                .map_err(|e| e.with_context(format!("profile: {profile}")))?
                .ok_or_else(|| {
                    Error::credential_invalid(format!("profile {profile} has no credential"))
                        .with_context("hint: check ~/.aws/credentials and ~/.aws/config")
                });
        }

        self.default_provider
            .provide_credential(ctx)
            .await?
            .ok_or_else(|| {
                Error::credential_invalid("no credential found in any source")
                    .with_context("hint: pass --access-key and --secret-key, --profile, or set AWS_ACCESS_KEY_ID")
            })
    }

    async fn resolve_region(&self, ctx: &Context) -> Result<String> {
        if let Some(region) = self.region.clone().filter(|v| !v.is_empty()) {
            return Ok(region);
        }

        for key in [AWS_REGION, AWS_DEFAULT_REGION] {
            if let Some(region) = ctx.env_var(key).filter(|v| !v.is_empty()) {
                return Ok(region);
            }
        }

        let mut profile = ProfileCredentialProvider::new();
        if let Some(name) = self.profile.clone().filter(|v| !v.is_empty()) {
            profile = profile.with_profile(name);
        }
        // A broken config file must not block the request, the signer
        // reports the missing region instead.
        match profile.region(ctx).await {
            Ok(region) => Ok(region.unwrap_or_default()),
            Err(err) => {
                debug!("failed to read region from config file: {err}");
                Ok(String::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::provide_credential::ProvideCredentialChain;
    use async_trait::async_trait;
    use awscurl_core::time::now;
    use awscurl_core::{ErrorKind, StaticEnv};
    use awscurl_file_read_tokio::TokioFileRead;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn context(envs: &[(&str, &str)]) -> Context {
        let mut envs: HashMap<String, String> = envs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        envs.entry(AWS_SHARED_CREDENTIALS_FILE.to_string())
            .or_insert_with(|| "/non/existent/credentials".to_string());
        envs.entry(AWS_CONFIG_FILE.to_string())
            .or_insert_with(|| "/non/existent/config".to_string());

        Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs,
            })
    }

    fn shared_files() -> anyhow::Result<(NamedTempFile, NamedTempFile)> {
        let mut credentials = NamedTempFile::new()?;
        writeln!(credentials, "[default]")?;
        writeln!(credentials, "aws_access_key_id = DEFAULTACCESSKEY")?;
        writeln!(credentials, "aws_secret_access_key = DEFAULTSECRETKEY")?;
        writeln!(credentials, "[dev]")?;
        writeln!(credentials, "aws_access_key_id = DEVACCESSKEY")?;
        writeln!(credentials, "aws_secret_access_key = DEVSECRETKEY")?;

        let mut config = NamedTempFile::new()?;
        writeln!(config, "[default]")?;
        writeln!(config, "region = us-east-1")?;
        writeln!(config, "[profile dev]")?;
        writeln!(config, "region = ap-southeast-2")?;

        Ok((credentials, config))
    }

    fn no_default() -> DefaultCredentialProvider {
        DefaultCredentialProvider::with_chain(ProvideCredentialChain::new())
    }

    #[derive(Debug)]
    struct ExpiredProvider;

    #[async_trait]
    impl ProvideCredential for ExpiredProvider {
        type Credential = Credential;

        async fn provide_credential(&self, _: &Context) -> Result<Option<Credential>> {
            Ok(Some(Credential {
                access_key_id: "ASIAEXPIRED".to_string(),
                secret_access_key: "EXPIREDSECRET".to_string(),
                session_token: Some("EXPIREDTOKEN".to_string()),
                expires_in: Some(now() - chrono::TimeDelta::try_hours(1).expect("in bounds")),
            }))
        }
    }

    #[tokio::test]
    async fn test_explicit_keys_win() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let ctx = context(&[
            (AWS_ACCESS_KEY_ID, "ENVACCESSKEY"),
            (AWS_SECRET_ACCESS_KEY, "ENVSECRETKEY"),
        ]);

        let resolved = CredentialResolver::new()
            .with_access_key_id("CLIACCESSKEY")
            .with_secret_access_key("CLISECRETKEY")
            .with_session_token("CLITOKEN")
            .with_profile("dev")
            .with_region("eu-west-1")
            .resolve(&ctx)
            .await?;

        assert_eq!(resolved.credential.access_key_id, "CLIACCESSKEY");
        assert_eq!(resolved.credential.session_token.as_deref(), Some("CLITOKEN"));
        assert_eq!(resolved.region, "eu-west-1");
        Ok(())
    }

    #[tokio::test]
    async fn test_access_key_alone_is_ignored() -> anyhow::Result<()> {
        let ctx = context(&[
            (AWS_ACCESS_KEY_ID, "ENVACCESSKEY"),
            (AWS_SECRET_ACCESS_KEY, "ENVSECRETKEY"),
        ]);

        let resolved = CredentialResolver::new()
            .with_access_key_id("CLIACCESSKEY")
            .resolve(&ctx)
            .await?;
        assert_eq!(resolved.credential.access_key_id, "ENVACCESSKEY");
        Ok(())
    }

    #[tokio::test]
    async fn test_named_profile() -> anyhow::Result<()> {
        let (credentials, config) = shared_files()?;
        let credentials = credentials.path().to_string_lossy().to_string();
        let config = config.path().to_string_lossy().to_string();
        let ctx = context(&[
            (AWS_SHARED_CREDENTIALS_FILE, credentials.as_str()),
            (AWS_CONFIG_FILE, config.as_str()),
        ]);

        let resolved = CredentialResolver::new()
            .with_profile("dev")
            .with_default_provider(no_default())
            .resolve(&ctx)
            .await?;
        assert_eq!(resolved.credential.access_key_id, "DEVACCESSKEY");
        assert_eq!(resolved.region, "ap-southeast-2");
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_profile_does_not_fall_through() -> anyhow::Result<()> {
        let (credentials, config) = shared_files()?;
        let credentials = credentials.path().to_string_lossy().to_string();
        let config = config.path().to_string_lossy().to_string();
        let ctx = context(&[
            (AWS_SHARED_CREDENTIALS_FILE, credentials.as_str()),
            (AWS_CONFIG_FILE, config.as_str()),
            (AWS_ACCESS_KEY_ID, "ENVACCESSKEY"),
            (AWS_SECRET_ACCESS_KEY, "ENVSECRETKEY"),
        ]);

        let err = CredentialResolver::new()
            .with_profile("missing")
            .resolve(&ctx)
            .await
            .expect_err("unknown profile must fail");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
        Ok(())
    }

    #[tokio::test]
    async fn test_exhausted_chain() {
        let ctx = context(&[]);

        let err = CredentialResolver::new()
            .with_default_provider(no_default())
            .resolve(&ctx)
            .await
            .expect_err("nothing to resolve");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_expired_credential_is_rejected() {
        let ctx = context(&[]);

        let err = CredentialResolver::new()
            .with_default_provider(DefaultCredentialProvider::with_chain(
                ProvideCredentialChain::new().push(ExpiredProvider),
            ))
            .with_region("us-east-1")
            .resolve(&ctx)
            .await
            .expect_err("expired credential must not be used");
        assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    }

    #[tokio::test]
    async fn test_region_precedence() -> anyhow::Result<()> {
        let (credentials, config) = shared_files()?;
        let credentials = credentials.path().to_string_lossy().to_string();
        let config = config.path().to_string_lossy().to_string();
        let resolver = || {
            CredentialResolver::new()
                .with_access_key_id("CLIACCESSKEY")
                .with_secret_access_key("CLISECRETKEY")
        };

        let ctx = context(&[
            (AWS_CONFIG_FILE, config.as_str()),
            (AWS_REGION, "us-west-2"),
            (AWS_DEFAULT_REGION, "us-west-1"),
        ]);
        assert_eq!(resolver().resolve(&ctx).await?.region, "us-west-2");

        let ctx = context(&[(AWS_CONFIG_FILE, config.as_str()), (AWS_DEFAULT_REGION, "us-west-1")]);
        assert_eq!(resolver().resolve(&ctx).await?.region, "us-west-1");

        let ctx = context(&[
            (AWS_CONFIG_FILE, config.as_str()),
            (AWS_SHARED_CREDENTIALS_FILE, credentials.as_str()),
        ]);
        assert_eq!(resolver().resolve(&ctx).await?.region, "us-east-1");

        let ctx = context(&[]);
        assert_eq!(resolver().resolve(&ctx).await?.region, "");
        Ok(())
    }
}
