use super::utils::{
    config_file_path, config_section, credentials_file_path, load_ini, resolve_profile,
};
use crate::Credential;
use async_trait::async_trait;
use ini::Properties;
use log::debug;
use sigv4_core::{Context, ProvideCredential, Result};

/// ProfileCredentialProvider loads AWS credentials from the shared files.
///
/// Files are read in this order:
/// - `~/.aws/credentials` (or the path specified by `AWS_SHARED_CREDENTIALS_FILE`)
/// - `~/.aws/config` (or the path specified by `AWS_CONFIG_FILE`)
///
/// The profile to use is determined by:
/// 1. The profile specified via `with_profile()`
/// 2. The `AWS_PROFILE` environment variable
/// 3. Default to "default"
#[derive(Debug, Default, Clone)]
pub struct ProfileCredentialProvider {
    profile: Option<String>,
    config_file: Option<String>,
    credentials_file: Option<String>,
}

impl ProfileCredentialProvider {
    /// Create a new ProfileCredentialProvider with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the profile name to use.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the path to the config file.
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Set the path to the credentials file.
    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    async fn load_from_credentials_file(
        &self,
        ctx: &Context,
        profile: &str,
    ) -> Result<Option<Credential>> {
        let path = credentials_file_path(ctx, self.credentials_file.as_deref());
        let Some(conf) = load_ini(ctx, &path).await? else {
            return Ok(None);
        };

        match conf.section(Some(profile)) {
            Some(props) => Ok(credential_from(props)),
            None => {
                debug!("profile {profile} not found in credentials file");
                Ok(None)
            }
        }
    }

    async fn load_from_config_file(
        &self,
        ctx: &Context,
        profile: &str,
    ) -> Result<Option<Credential>> {
        let path = config_file_path(ctx, self.config_file.as_deref());
        let Some(conf) = load_ini(ctx, &path).await? else {
            return Ok(None);
        };

        match conf.section(Some(config_section(profile))) {
            Some(props) => Ok(credential_from(props)),
            None => {
                debug!("section {profile} not found in config file");
                Ok(None)
            }
        }
    }
}

fn credential_from(props: &Properties) -> Option<Credential> {
    let access_key_id = props.get("aws_access_key_id").filter(|v| !v.is_empty())?;
    let secret_access_key = props
        .get("aws_secret_access_key")
        .filter(|v| !v.is_empty())?;

    Some(Credential {
        access_key_id: access_key_id.to_string(),
        secret_access_key: secret_access_key.to_string(),
        session_token: props.get("aws_session_token").map(|s| s.to_string()),
        expires_in: None,
    })
}

#[async_trait]
impl ProvideCredential for ProfileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let profile = resolve_profile(ctx, self.profile.as_deref());

        // Try credentials file first
        if let Some(cred) = self.load_from_credentials_file(ctx, &profile).await? {
            return Ok(Some(cred));
        }

        // Then try config file
        self.load_from_config_file(ctx, &profile).await
    }
}

/// Read the `region` of `profile` from the shared config file.
pub(crate) async fn load_profile_region(
    ctx: &Context,
    profile: Option<&str>,
) -> Result<Option<String>> {
    let profile = resolve_profile(ctx, profile);
    let path = config_file_path(ctx, None);
    let Some(conf) = load_ini(ctx, &path).await? else {
        return Ok(None);
    };

    Ok(conf
        .section(Some(config_section(&profile)))
        .and_then(|props| props.get("region"))
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string()))
}
