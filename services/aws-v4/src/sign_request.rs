use crate::Credential;
use async_trait::async_trait;
use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SigningSettings, UriPathNormalizationMode,
};
use aws_sigv4::sign::v4;
use http::request::Parts;
use log::debug;
use sigv4_core::time::{now, DateTime};
use sigv4_core::{Context, Error, Result, SignRequest};
use std::mem;
use std::time::SystemTime;

/// RequestSigner that implement AWS SigV4.
///
/// The signature itself is computed by [`aws_sigv4`]; this type adapts it to
/// [`SignRequest`] so it can be cached behind a [`sigv4_core::Signer`].
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new builder for AWS V4 signer.
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
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// The service name requests are signed for.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The region requests are signed for.
    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        payload: &[u8],
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Ok(());
        };
        let now = self.time.unwrap_or_else(now);

        let identity = aws_credential_types::Credentials::from(cred).into();
        // Sign the path exactly as it will be sent.
        let mut settings = SigningSettings::default();
        settings.uri_path_normalization_mode = UriPathNormalizationMode::Disabled;
        let params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(&self.service)
            .time(SystemTime::from(now))
            .settings(settings)
            .build()
            .map_err(|e| Error::unexpected("failed to build signing params").with_source(e))?
            .into();

        let uri = req.uri.to_string();
        let headers = req
            .headers
            .iter()
            .map(|(k, v)| Ok((k.as_str(), v.to_str()?)))
            .collect::<Result<Vec<_>>>()?;
        let signable = SignableRequest::new(
            req.method.as_str(),
            uri.as_str(),
            headers.into_iter(),
            SignableBody::Bytes(payload),
        )
        .map_err(|e| {
            Error::request_invalid("request can't be signed")
                .with_source(e)
                .with_context(format!("uri: {uri}"))
        })?;

        let (instructions, signature) = sign(signable, &params)
            .map_err(|e| Error::unexpected("failed to sign request").with_source(e))?
            .into_parts();
        debug!(
            "signed {} {} for {}/{}: {signature}",
            req.method, req.uri, self.region, self.service
        );

        let placeholder = http::Request::new(()).into_parts().0;
        let mut signed = http::Request::from_parts(mem::replace(req, placeholder), ());
        instructions.apply_to_request_http1x(&mut signed);
        *req = signed.into_parts().0;

        Ok(())
    }
}
