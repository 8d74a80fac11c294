mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn login_returns_a_usable_token() -> Result<()> {
    let server = common::TestServer::start().await?;
    let id = server.seed_user(ADMIN_EMAIL, ADMIN_PASSWORD, true).await?;

    let res = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["id"], id);
    assert!(body["data"]["user"].get("password_hash").is_none());
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let claims = server.state.jwt.verify(&token)?;
    assert_eq!(claims.sub, id);
    assert_eq!(claims.email, ADMIN_EMAIL);

    // The token opens protected routes
    let res = server.client.get(server.url("/api/users")).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.seed_user(ADMIN_EMAIL, ADMIN_PASSWORD, true).await?;

    for payload in [
        json!({"email": ADMIN_EMAIL, "password": "wrong"}),
        json!({"email": "nadie@sergas.ar", "password": ADMIN_PASSWORD}),
    ] {
        let res = server.client.post(server.url("/api/login")).json(&payload).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "payload {}", payload);
        let body = res.json::<Value>().await?;
        assert_eq!(body["message"], "Invalid email or password");
    }

    Ok(())
}

#[tokio::test]
async fn inactive_users_are_forbidden() -> Result<()> {
    let server = common::TestServer::start().await?;
    server.seed_user("baja@sergas.ar", "secreto", false).await?;

    let res = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({"email": "baja@sergas.ar", "password": "secreto"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn malformed_login_body_is_a_bad_request() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({"email": ADMIN_EMAIL}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "INVALID_JSON");

    Ok(())
}
