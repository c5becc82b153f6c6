use crate::constants::{AWS_CONFIG_FILE, AWS_PROFILE, AWS_SHARED_CREDENTIALS_FILE};
use ini::Ini;
use log::debug;
use quick_xml::de;
use serde::Deserialize;
use sigv4_core::{Context, Error, Result};

/// Resolve the STS endpoint for `region`.
///
/// Without a region the global endpoint is used.
pub fn sts_endpoint(region: Option<&str>) -> String {
    match region {
        Some(region) if region.starts_with("cn-") => format!("sts.{region}.amazonaws.com.cn"),
        Some(region) if !region.is_empty() => format!("sts.{region}.amazonaws.com"),
        _ => "sts.amazonaws.com".to_string(),
    }
}

/// The profile to read: an explicit one wins over `AWS_PROFILE`, which wins
/// over `default`.
pub fn resolve_profile(ctx: &Context, explicit: Option<&str>) -> String {
    explicit
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .or_else(|| ctx.env_var_non_empty(AWS_PROFILE))
        .unwrap_or_else(|| "default".to_string())
}

/// Path of the shared config file, `~/.aws/config` unless overridden.
pub fn config_file_path(ctx: &Context, explicit: Option<&str>) -> String {
    explicit
        .map(|v| v.to_string())
        .or_else(|| ctx.env_var_non_empty(AWS_CONFIG_FILE))
        .unwrap_or_else(|| "~/.aws/config".to_string())
}

/// Path of the shared credentials file, `~/.aws/credentials` unless overridden.
pub fn credentials_file_path(ctx: &Context, explicit: Option<&str>) -> String {
    explicit
        .map(|v| v.to_string())
        .or_else(|| ctx.env_var_non_empty(AWS_SHARED_CREDENTIALS_FILE))
        .unwrap_or_else(|| "~/.aws/credentials".to_string())
}

/// Section name of `profile` inside the shared config file.
pub fn config_section(profile: &str) -> String {
    match profile {
        "default" => "default".to_string(),
        x => format!("profile {x}"),
    }
}

/// Load an ini file, returning `None` when it can't be read.
///
/// A file that exists but doesn't parse is an error.
pub async fn load_ini(ctx: &Context, path: &str) -> Result<Option<Ini>> {
    let expanded = if path.starts_with("~/") {
        match ctx.expand_home_dir(path) {
            Some(expanded) => expanded,
            None => {
                debug!("failed to expand homedir for path: {path}");
                return Ok(None);
            }
        }
    } else {
        path.to_string()
    };

    let content = match ctx.file_read(&expanded).await {
        Ok(content) => content,
        Err(err) => {
            debug!("failed to read {expanded}: {err:?}");
            return Ok(None);
        }
    };

    let conf = Ini::load_from_str(&String::from_utf8_lossy(&content)).map_err(|e| {
        Error::config_invalid("failed to parse aws shared file")
            .with_source(anyhow::Error::new(e))
            .with_context(format!("path: {expanded}"))
    })?;
    Ok(Some(conf))
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct StsErrorResponse {
    error: StsError,
    request_id: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct StsError {
    code: String,
    message: String,
}

/// Turn a non-200 STS response into an error.
pub fn parse_sts_error(action: &str, status: http::StatusCode, body: &str) -> Error {
    let resp: StsErrorResponse = de::from_str(body).unwrap_or_default();
    let message = if resp.error.code.is_empty() {
        format!("{action} failed with status {status}")
    } else {
        format!(
            "{action} failed with {}: {}",
            resp.error.code, resp.error.message
        )
    };

    let err = match status {
        http::StatusCode::FORBIDDEN | http::StatusCode::UNAUTHORIZED => {
            Error::credential_denied(message)
        }
        s if s.is_client_error() => Error::credential_invalid(message),
        _ => Error::unexpected(message),
    };
    let err = err.with_context(format!("status: {status}"));
    if resp.request_id.is_empty() {
        err
    } else {
        err.with_context(format!("request_id: {}", resp.request_id))
    }
}
