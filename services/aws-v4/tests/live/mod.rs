//! Tests against a real endpoint, enabled with `SIGV4_AWS_V4_TEST=on`.

use log::warn;
use sigv4_aws_v4::{SigV4RoundTripper, SigningConfig};
use sigv4_core::{Body, Context, OsEnv, Result, RoundTrip};
use sigv4_file_read_tokio::TokioFileRead;
use sigv4_http_send_reqwest::ReqwestHttpSend;
use std::env;
use std::sync::Arc;

async fn init_round_tripper() -> Option<(SigV4RoundTripper, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("SIGV4_AWS_V4_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let cfg = match env::var("SIGV4_AWS_V4_CONFIG") {
        Ok(path) => SigningConfig::from_file(&ctx, &path)
            .await
            .expect("config must be valid"),
        Err(_) => SigningConfig::default(),
    };
    let rt = SigV4RoundTripper::from_config(ctx, &cfg, Arc::new(ReqwestHttpSend::default()))
        .await
        .expect("round tripper must build");
    let url = env::var("SIGV4_AWS_V4_URL").expect("env SIGV4_AWS_V4_URL must set");

    Some((rt, url))
}

#[tokio::test]
async fn test_query() -> Result<()> {
    let Some((rt, url)) = init_round_tripper().await else {
        warn!("SIGV4_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let req = http::Request::get(format!("{url}/api/v1/query?query=up")).body(Body::empty())?;
    let resp = rt.round_trip(req).await?;
    assert_eq!(resp.status(), http::StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_query_with_double_slash() -> Result<()> {
    let Some((rt, url)) = init_round_tripper().await else {
        warn!("SIGV4_AWS_V4_TEST is not set, skipped");
        return Ok(());
    };

    let req = http::Request::get(format!("{url}//api/v1//labels")).body(Body::empty())?;
    let resp = rt.round_trip(req).await?;
    assert_eq!(resp.status(), http::StatusCode::OK);
    Ok(())
}
