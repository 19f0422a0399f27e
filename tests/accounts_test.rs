mod common;

use axum::http::StatusCode;
use common::setup;
use movies_api::utils::auth::validate_jwt;
use serde_json::{Value, json};

fn codes(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|e| e["code"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_register_and_login() {
    let t = setup().await;
    let secret = t.state.config.jwt_secret.clone();

    // 1. Register
    let response = t
        .post_json(
            "/api/accounts/create",
            None,
            json!({ "email": "ana@movies.test", "password": "Passw0rd!" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let claims = validate_jwt(body["token"].as_str().unwrap(), &secret).unwrap();
    assert_eq!(claims.email, "ana@movies.test");
    assert!(!claims.is_admin());
    assert!(body["expiration"].is_string());

    // 2. Login
    let response = t
        .post_json(
            "/api/accounts/login",
            None,
            json!({ "email": "ana@movies.test", "password": "Passw0rd!" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["token"].is_string());

    // 3. Wrong password and unknown user fail the same way
    let wrong_password = t
        .post_json(
            "/api/accounts/login",
            None,
            json!({ "email": "ana@movies.test", "password": "Wrong0ne!" }),
        )
        .await;
    let unknown_user = t
        .post_json(
            "/api/accounts/login",
            None,
            json!({ "email": "nobody@movies.test", "password": "Passw0rd!" }),
        )
        .await;
    assert_eq!(wrong_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_user.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password.body, unknown_user.body);
    assert_eq!(wrong_password.json()["error"], "Login failed");
}

#[tokio::test]
async fn test_register_reports_identity_errors() {
    let t = setup().await;
    t.register("taken@movies.test").await;

    let response = t
        .post_json(
            "/api/accounts/create",
            None,
            json!({ "email": "taken@movies.test", "password": "Passw0rd!" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(codes(&response.json()), vec!["DuplicateUserName"]);

    let response = t
        .post_json(
            "/api/accounts/create",
            None,
            json!({ "email": "fresh@movies.test", "password": "short" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let codes = codes(&response.json());
    assert!(codes.contains(&"PasswordTooShort".to_string()));
    assert!(codes.contains(&"PasswordRequiresDigit".to_string()));
    assert!(codes.contains(&"PasswordRequiresUpper".to_string()));
    assert!(codes.contains(&"PasswordRequiresNonAlphanumeric".to_string()));

    let response = t
        .post_json(
            "/api/accounts/create",
            None,
            json!({ "email": "not-an-email", "password": "Passw0rd!" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()[0]["code"], "InvalidEmail");
}

#[tokio::test]
async fn test_make_and_remove_admin() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.register("ana@movies.test").await;
    let id = t.user_id("ana@movies.test").await;

    let response = t
        .post_json("/api/accounts/makeAdmin", Some(&admin), json!(id))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!(true));

    // Already admin
    let response = t
        .post_json("/api/accounts/makeAdmin", Some(&admin), json!(id))
        .await;
    assert_eq!(response.json(), json!(false));

    // A fresh login now carries the admin claim
    let response = t
        .post_json(
            "/api/accounts/login",
            None,
            json!({ "email": "ana@movies.test", "password": "Passw0rd!" }),
        )
        .await;
    let token = response.json()["token"].as_str().unwrap().to_string();
    let claims = validate_jwt(&token, &t.state.config.jwt_secret).unwrap();
    assert!(claims.is_admin());

    let response = t
        .post_json("/api/accounts/removeAdmin", Some(&admin), json!(id))
        .await;
    assert_eq!(response.json(), json!(true));
    let response = t
        .post_json("/api/accounts/removeAdmin", Some(&admin), json!(id))
        .await;
    assert_eq!(response.json(), json!(false));

    let response = t
        .post_json("/api/accounts/makeAdmin", Some(&admin), json!("no-such-user"))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_endpoints_reject_non_admins() {
    let t = setup().await;
    let user = t.register("ana@movies.test").await;
    let id = t.user_id("ana@movies.test").await;

    let response = t
        .post_json("/api/accounts/makeAdmin", None, json!(id))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = t
        .post_json("/api/accounts/makeAdmin", Some(&user), json!(id))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = t.get("/api/accounts/listUsers", Some(&user)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_users_is_paginated_by_email() {
    let t = setup().await;
    let admin = t.admin_token().await;
    t.register("zoe@movies.test").await;
    t.register("bob@movies.test").await;

    let response = t
        .get("/api/accounts/listUsers?page=1&recordsPerPage=2", Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.total_records(), 3);

    let users = response.json();
    let emails: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["admin@movies.test", "bob@movies.test"]);
    assert!(users[0].get("password_hash").is_none());
}
