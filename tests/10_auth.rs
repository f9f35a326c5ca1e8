mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn root_reports_service_banner() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/", server.base_url)).send().await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Todo API is running");
    Ok(())
}

#[tokio::test]
async fn missing_authorization_header_yields_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/alice/tasks", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Missing authorization header"));
    Ok(())
}

#[tokio::test]
async fn non_bearer_scheme_yields_401() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/alice/tasks", server.base_url))
        .header("Authorization", "Token abc123")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert!(body["message"].as_str().unwrap().contains("Bearer"));
    Ok(())
}

#[tokio::test]
async fn garbage_token_yields_401_invalid() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/alice/tasks", server.base_url))
        .header("Authorization", "Bearer not.a.jwt")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    assert!(body["message"].as_str().unwrap().contains("Invalid token"));
    Ok(())
}

#[tokio::test]
async fn expired_token_yields_expiry_specific_reason() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/alice/tasks", server.base_url))
        .header("Authorization", common::expired_bearer_for("alice"))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    let message = body["message"].as_str().unwrap();
    // Expiry is user-actionable and must be distinguishable from a bad signature
    assert!(message.contains("expired"));
    assert!(!message.contains("Invalid token"));
    Ok(())
}

#[tokio::test]
async fn non_utf8_header_is_malformed_not_missing() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // The header is present but not valid UTF-8; that is a malformed
    // credential, not an absent one
    let header = reqwest::header::HeaderValue::from_bytes(b"Bearer t\xFFken").unwrap();
    let res = client
        .get(format!("{}/api/alice/tasks", server.base_url))
        .header("Authorization", header)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<Value>().await?;
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("Invalid authorization header format"));
    assert!(!message.contains("Missing"));
    Ok(())
}

#[tokio::test]
async fn error_responses_never_echo_the_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let header = common::expired_bearer_for("alice");
    let token = header.trim_start_matches("Bearer ").to_string();

    let res = client
        .get(format!("{}/api/alice/tasks", server.base_url))
        .header("Authorization", header)
        .send()
        .await?;

    let text = res.text().await?;
    assert!(!text.contains(&token));
    assert!(!text.contains(common::TEST_SECRET));
    Ok(())
}
