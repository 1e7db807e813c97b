mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

fn log_body(date: &str) -> Value {
    json!({
        "date": date,
        "fed_morning": false,
        "fed_night": false,
        "walk_result": false,
        "walk_total_distance_m": null
    })
}

#[tokio::test]
async fn create_then_duplicate_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (user, setting_id) = server.user_with_setting().await?;

    let res = server.post(&user, "/api/care_logs", &log_body("2025-07-01")).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    assert_eq!(created["date"], "2025-07-01");
    assert_eq!(created["care_setting_id"], setting_id);

    let res = server.post(&user, "/api/care_logs", &log_body("2025-07-01")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().unwrap_or_default().contains("PATCH"));

    // The first row is untouched.
    let res = server
        .get(&user, &format!("/api/care_logs/list?care_setting_id={}", setting_id))
        .send()
        .await?;
    let list: Value = res.json().await?;
    assert_eq!(list["care_logs"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn datetime_input_is_normalized_before_duplicate_check() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (user, _) = server.user_with_setting().await?;

    let res = server
        .post(&user, "/api/care_logs", &log_body("2025-07-01T07:30:00"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?["date"], "2025-07-01");

    let res = server.post(&user, "/api/care_logs", &log_body("2025-07-01")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn create_error_statuses() -> Result<()> {
    let server = TestServer::spawn().await?;

    let ghost = common::TestUser {
        token: server.token_for("ghost").await,
        subject: "ghost".to_string(),
    };
    let res = server.post(&ghost, "/api/care_logs", &log_body("2025-07-01")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let no_setting = server.user().await;
    let res = server
        .post(&no_setting, "/api/care_logs", &log_body("2025-07-01"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn body_care_setting_id_cannot_redirect_writes() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (alice, alice_setting) = server.user_with_setting().await?;
    let (bob, bob_setting) = server.user_with_setting().await?;

    let mut body = log_body("2025-07-02");
    body["care_setting_id"] = json!(alice_setting);
    let res = server.post(&bob, "/api/care_logs", &body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await?["care_setting_id"], bob_setting);

    let res = server
        .get(&alice, &format!("/api/care_logs/list?care_setting_id={}", alice_setting))
        .send()
        .await?;
    let list: Value = res.json().await?;
    assert_eq!(list["care_logs"], json!([]));
    Ok(())
}

#[tokio::test]
async fn patch_then_by_date_reflects_partial_update() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (user, setting_id) = server.user_with_setting().await?;

    let created: Value = server
        .post(&user, "/api/care_logs", &log_body("2025-07-01"))
        .send()
        .await?
        .json()
        .await?;
    let log_id = created["id"].as_i64().expect("log id");

    let res = server
        .patch(&user, &format!("/api/care_logs/{}", log_id), &json!({ "fed_morning": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let patched: Value = res.json().await?;
    assert_eq!(patched["fed_morning"], true);
    assert_eq!(patched["fed_night"], false);

    let res = server
        .get(
            &user,
            &format!("/api/care_logs/by_date?care_setting_id={}&date=2025-07-01", setting_id),
        )
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "care_log_id": log_id, "fed_morning": true, "fed_night": false, "walked": false })
    );
    Ok(())
}

#[tokio::test]
async fn patch_on_foreign_or_missing_log_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (alice, _) = server.user_with_setting().await?;
    let (bob, _) = server.user_with_setting().await?;

    let created: Value = server
        .post(&alice, "/api/care_logs", &log_body("2025-07-01"))
        .send()
        .await?
        .json()
        .await?;
    let log_id = created["id"].as_i64().expect("log id");

    let patch = json!({ "walk_result": true });
    let res = server
        .patch(&bob, &format!("/api/care_logs/{}", log_id), &patch)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.patch(&alice, "/api/care_logs/999999", &patch).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn today_without_log_returns_zero_value() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (user, setting_id) = server.user_with_setting().await?;

    let res = server
        .get(
            &user,
            &format!("/api/care_logs/today?care_setting_id={}&date=2025-07-05", setting_id),
        )
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.json::<Value>().await?,
        json!({ "care_log_id": null, "fed_morning": false, "fed_night": false, "walked": false })
    );
    Ok(())
}

#[tokio::test]
async fn reads_scoped_by_foreign_setting_are_forbidden() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (alice, alice_setting) = server.user_with_setting().await?;
    let (bob, _) = server.user_with_setting().await?;

    server
        .post(&alice, "/api/care_logs", &log_body("2025-07-01"))
        .send()
        .await?
        .error_for_status()?;

    for path in [
        format!("/api/care_logs/today?care_setting_id={}&date=2025-07-01", alice_setting),
        format!("/api/care_logs/by_date?care_setting_id={}&date=2025-07-01", alice_setting),
        format!("/api/care_logs/list?care_setting_id={}", alice_setting),
    ] {
        let res = server.get(&bob, &path).send().await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{}", path);
        let body: Value = res.json().await?;
        assert!(body.get("care_logs").is_none());
        assert!(body["detail"].is_string());
    }
    Ok(())
}

#[tokio::test]
async fn list_is_ordered_by_date_ascending() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (user, setting_id) = server.user_with_setting().await?;

    for date in ["2025-07-03", "2025-07-01", "2025-07-04", "2025-07-02"] {
        let mut body = log_body(date);
        body["walk_result"] = json!(date == "2025-07-04");
        server
            .post(&user, "/api/care_logs", &body)
            .send()
            .await?
            .error_for_status()?;
    }

    let res = server
        .get(&user, &format!("/api/care_logs/list?care_setting_id={}", setting_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let logs = body["care_logs"].as_array().expect("care_logs array");

    let dates: Vec<&str> = logs.iter().filter_map(|l| l["date"].as_str()).collect();
    assert_eq!(dates, ["2025-07-01", "2025-07-02", "2025-07-03", "2025-07-04"]);

    let last = logs.last().expect("at least one log");
    assert_eq!(last["walk_result"], true);
    assert_eq!(last["care_setting_id"], setting_id);
    assert!(last.get("fed_morning").is_none());
    Ok(())
}

#[tokio::test]
async fn malformed_query_and_path_answer_with_detail() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (user, setting_id) = server.user_with_setting().await?;

    let res = server
        .get(&user, &format!("/api/care_logs/today?care_setting_id={}", setting_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["detail"].as_str().unwrap_or_default().contains("date"), "{body}");

    let res = server
        .patch(&user, "/api/care_logs/abc", &json!({ "fed_morning": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.json::<Value>().await?["detail"].is_string());
    Ok(())
}
