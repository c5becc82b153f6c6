use super::utils::{parse_sts_error, sts_endpoint};
use crate::Credential;
use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use quick_xml::de;
use serde::Deserialize;
use sigv4_core::time::parse_rfc3339;
use sigv4_core::{Context, Error, ProvideCredential, Result, Signer};

/// AssumeRoleCredentialProvider loads credentials via AWS STS AssumeRole.
///
/// The STS call is signed by `sts_signer`, which holds the base credential.
///
/// - [AssumeRole](https://docs.aws.amazon.com/STS/latest/APIReference/API_AssumeRole.html)
#[derive(Debug)]
pub struct AssumeRoleCredentialProvider {
    role_arn: String,
    role_session_name: String,
    external_id: Option<String>,
    duration_seconds: Option<u32>,
    region: Option<String>,

    sts_signer: Signer<Credential>,
}

impl AssumeRoleCredentialProvider {
    /// Create a new assume role loader.
    pub fn new(role_arn: impl Into<String>, sts_signer: Signer<Credential>) -> Self {
        Self {
            role_arn: role_arn.into(),
            role_session_name: "sigv4".to_string(),
            external_id: None,
            duration_seconds: Some(3600),
            region: None,
            sts_signer,
        }
    }

    /// Set the role session name.
    pub fn with_role_session_name(mut self, name: impl Into<String>) -> Self {
        self.role_session_name = name.into();
        self
    }

    /// Set the external ID.
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    /// Set the duration in seconds.
    pub fn with_duration_seconds(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Set the region of the STS endpoint.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    fn query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("Action", "AssumeRole")
            .append_pair("Version", "2011-06-15")
            .append_pair("RoleArn", &self.role_arn)
            .append_pair("RoleSessionName", &self.role_session_name);
        if let Some(external_id) = &self.external_id {
            query.append_pair("ExternalId", external_id);
        }
        if let Some(duration_seconds) = &self.duration_seconds {
            query.append_pair("DurationSeconds", &duration_seconds.to_string());
        }
        query.finish()
    }
}

#[async_trait]
impl ProvideCredential for AssumeRoleCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let endpoint = sts_endpoint(self.region.as_deref());
        let url = format!("https://{endpoint}/?{}", self.query());
        debug!("assuming role {} via {endpoint}", self.role_arn);

        let req = http::Request::get(&url)
            .header(
                http::header::CONTENT_TYPE.as_str(),
                "application/x-www-form-urlencoded",
            )
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid("failed to build STS AssumeRole request")
                    .with_source(e)
                    .with_context(format!("role_arn: {}", self.role_arn))
            })?;

        let (mut parts, body) = req.into_parts();
        self.sts_signer.sign(&mut parts, b"").await.map_err(|e| {
            e.with_context(format!("role_arn: {}", self.role_arn))
        })?;
        let req = http::Request::from_parts(parts, body);

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            e.with_context(format!("role_arn: {}", self.role_arn))
                .with_context(format!("endpoint: https://{endpoint}"))
        })?;

        let status = resp.status();
        if status != http::StatusCode::OK {
            return Err(parse_sts_error("AssumeRole", status, resp.body())
                .with_context(format!("role_arn: {}", self.role_arn)));
        }

        let body = resp.into_body();
        let resp: AssumeRoleResponse = de::from_str(&body).map_err(|e| {
            Error::unexpected("failed to parse STS AssumeRole response")
                .with_source(e)
                .with_context(format!("role_arn: {}", self.role_arn))
        })?;
        let resp_cred = resp.result.credentials;

        let cred = Credential {
            access_key_id: resp_cred.access_key_id,
            secret_access_key: resp_cred.secret_access_key,
            session_token: Some(resp_cred.session_token.trim().to_string()),
            expires_in: Some(parse_rfc3339(&resp_cred.expiration).map_err(|e| {
                e.with_context(format!("role_arn: {}", self.role_arn))
            })?),
        };

        Ok(Some(cred))
    }
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AssumeRoleResponse {
    #[serde(rename = "AssumeRoleResult")]
    result: AssumeRoleResult,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AssumeRoleResult {
    credentials: AssumeRoleCredentials,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct AssumeRoleCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    expiration: String,
}
