mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn users_crud_never_exposes_passwords() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.admin_token().await?;

    let res = server
        .client
        .post(server.url("/api/users"))
        .bearer_auth(&token)
        .json(&json!({
            "email": "editor@sergas.ar",
            "nombre": "Editor",
            "password": "clave",
            "rol": "editor",
            "permisos": {"proyectos": true}
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = res.json::<Value>().await?["data"]["id"].as_i64().expect("id");

    // The new user can log in
    let res = server
        .client
        .post(server.url("/api/login"))
        .json(&json!({"email": "editor@sergas.ar", "password": "clave"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .post(server.url("/api/users"))
        .bearer_auth(&token)
        .json(&json!({"email": "editor@sergas.ar", "password": "otra"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = server
        .client
        .post(server.url("/api/users"))
        .bearer_auth(&token)
        .json(&json!({"nombre": "Sin email"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert!(body["field_errors"].get("email").is_some());
    assert!(body["field_errors"].get("password").is_some());

    let res = server
        .client
        .put(server.url(&format!("/api/users/{}", id)))
        .bearer_auth(&token)
        .json(&json!({"rol": "admin", "permisos": {"users": true}}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = server
        .client
        .get(server.url("/api/users"))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    let users = body["data"].as_array().expect("users");
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none()));
    let editor = users.iter().find(|u| u["id"] == id).expect("editor");
    assert_eq!(editor["rol"], "admin");
    assert_eq!(editor["permisos"], json!({"users": true}));

    let res = server
        .client
        .delete(server.url(&format!("/api/users/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn company_upsert_and_public_read() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.admin_token().await?;

    let body = server.client.get(server.url("/api/company")).send().await?.json::<Value>().await?;
    assert_eq!(body["data"], Value::Null);

    for payload in [
        json!({"nombre": "SERGAS", "redes": {"instagram": "@sergas"}}),
        json!({"telefono": "+54 11 5555-5555"}),
    ] {
        let res = server
            .client
            .post(server.url("/api/company"))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let body = server.client.get(server.url("/api/company")).send().await?.json::<Value>().await?;
    assert_eq!(body["data"]["nombre"], "SERGAS");
    assert_eq!(body["data"]["telefono"], "+54 11 5555-5555");
    assert_eq!(body["data"]["redes"], json!({"instagram": "@sergas"}));

    // Writes stay protected
    let res = server
        .client
        .post(server.url("/api/company"))
        .json(&json!({"nombre": "Otro"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn contact_form_validates_required_fields() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/contacto"))
        .json(&json!({"nombre": "Ana", "email": "ana@example.com", "telefono": "123", "mensaje": "Presupuesto"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = server
        .client
        .post(server.url("/api/contacto"))
        .json(&json!({"nombre": "Ana"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"].get("email").is_some());
    assert!(body["field_errors"].get("mensaje").is_some());

    Ok(())
}
