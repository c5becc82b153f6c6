use crate::constants::{AWS_DEFAULT_REGION, AWS_REGION, DEFAULT_SERVICE};
use crate::provide_credential::load_profile_region;
use log::debug;
use serde::{Deserialize, Serialize, Serializer};
use sigv4_core::{Context, Error, Result};
use std::fmt::{self, Debug};

/// A secret string that never shows up in logs or serialized output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<secret>")
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str("<secret>")
    }
}

/// Configuration of one signing identity.
///
/// Every field is optional and an empty string counts as unset. Unknown
/// fields are rejected when parsing.
///
/// ```
/// use sigv4_aws_v4::SigningConfig;
///
/// let cfg = SigningConfig::from_toml_str(
///     r#"
/// region = "us-east-1"
/// role_arn = "arn:aws:iam::123456789012:role/prometheus"
/// external_id = "ext-id"
/// "#,
/// )
/// .unwrap();
/// assert_eq!(cfg.region(), Some("us-east-1"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningConfig {
    /// Region to sign for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Static access key id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    /// Static secret access key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<Secret>,
    /// Named profile in the shared AWS files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Role to assume through STS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    /// External id passed to STS when assuming `role_arn`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Service name to sign for, `aps` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|v| !v.is_empty())
}

impl SigningConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content)
            .map_err(|e| Error::config_invalid("failed to parse sigv4 config").with_source(e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a JSON document and validate it.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(content)
            .map_err(|e| Error::config_invalid("failed to parse sigv4 config").with_source(e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load the config from `path`.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    pub async fn from_file(ctx: &Context, path: &str) -> Result<Self> {
        let content = ctx
            .file_read_as_string(path)
            .await
            .map_err(|e| e.with_context(format!("config: {path}")))?;

        let cfg = if path.ends_with(".json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        cfg.map_err(|e| e.with_context(format!("config: {path}")))
    }

    /// Check the field combinations.
    pub fn validate(&self) -> Result<()> {
        match (self.access_key(), self.secret_key()) {
            (Some(_), None) => {
                return Err(Error::config_invalid(
                    "must provide a AWS SigV4 Access key and Secret Key if credentials are specified in the SigV4 config: secret_key is missing",
                ))
            }
            (None, Some(_)) => {
                return Err(Error::config_invalid(
                    "must provide a AWS SigV4 Access key and Secret Key if credentials are specified in the SigV4 config: access_key is missing",
                ))
            }
            _ => {}
        }

        if self.external_id().is_some() && self.role_arn().is_none() {
            return Err(Error::config_invalid(
                "external_id can only be used with role_arn",
            ));
        }

        Ok(())
    }

    /// Configured region.
    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    /// Configured access key id.
    pub fn access_key(&self) -> Option<&str> {
        non_empty(&self.access_key)
    }

    /// Configured secret access key.
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key
            .as_ref()
            .map(Secret::expose_secret)
            .filter(|v| !v.is_empty())
    }

    /// Configured profile.
    pub fn profile(&self) -> Option<&str> {
        non_empty(&self.profile)
    }

    /// Configured role arn.
    pub fn role_arn(&self) -> Option<&str> {
        non_empty(&self.role_arn)
    }

    /// Configured external id.
    pub fn external_id(&self) -> Option<&str> {
        non_empty(&self.external_id)
    }

    /// Service to sign for.
    pub fn service_name(&self) -> &str {
        non_empty(&self.service_name).unwrap_or(DEFAULT_SERVICE)
    }

    /// Resolve the signing region.
    ///
    /// Order: `region` from the config, `AWS_REGION`, `AWS_DEFAULT_REGION`,
    /// then the `region` of the active profile in the shared config file.
    pub async fn resolve_region(&self, ctx: &Context) -> Result<String> {
        if let Some(region) = self.region() {
            return Ok(region.to_string());
        }
        if let Some(region) = ctx
            .env_var_non_empty(AWS_REGION)
            .or_else(|| ctx.env_var_non_empty(AWS_DEFAULT_REGION))
        {
            debug!("using region {region} from environment");
            return Ok(region);
        }
        if let Some(region) = load_profile_region(ctx, self.profile()).await? {
            debug!("using region {region} from shared config");
            return Ok(region);
        }

        Err(Error::config_invalid(
            "region not configured in sigv4 config or in default credentials chain",
        ))
    }
}
