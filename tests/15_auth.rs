mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn missing_header_is_unauthenticated() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .anonymous()
        .get(server.url("/api/care_settings/me"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert_eq!(body["detail"], "Authorization header missing");
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthenticated() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .anonymous()
        .get(server.url("/api/reflection_notes"))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_token_is_unauthenticated() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .anonymous()
        .get(server.url("/api/care_settings/me"))
        .bearer_auth("not-a-real-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().unwrap_or_default().contains("Invalid token"));
    Ok(())
}

#[tokio::test]
async fn public_routes_need_no_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.anonymous().get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}
