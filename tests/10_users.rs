mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{ensure_server, register_user, unique_email, PASSWORD};

#[tokio::test]
async fn register_returns_user_view_and_token() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let email = unique_email("register");

    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let user = body["user"].as_object().expect("user object");
    assert_eq!(user["email"], json!(email));
    assert!(user["id"].as_str().is_some());
    // The view carries exactly id and email; credentials never serialize
    assert_eq!(user.len(), 2);
    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicate_email() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (email, _token) = register_user(&server.base_url, "dup").await?;

    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert!(body["error"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn register_enforces_password_length_boundaries() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();

    // 7 and 33 characters fail; 8 and 32 pass
    let cases = [
        ("Ab1!Ab1", StatusCode::BAD_REQUEST),
        ("Ab1!Ab1!", StatusCode::OK),
        ("Ab1!Ab1!Ab1!Ab1!Ab1!Ab1!Ab1!Ab1!", StatusCode::OK),
        ("Ab1!Ab1!Ab1!Ab1!Ab1!Ab1!Ab1!Ab1!x", StatusCode::BAD_REQUEST),
    ];

    for (password, expected) in cases {
        let res = client
            .post(format!("{}/users", server.base_url))
            .json(&json!({ "email": unique_email("pwlen"), "password": password }))
            .send()
            .await?;
        assert_eq!(res.status(), expected, "password {:?}", password);
    }
    Ok(())
}

#[tokio::test]
async fn register_requires_every_character_class() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();

    for password in ["ab1!ab1!", "AB1!AB1!", "Abc!Abc!", "Ab1xAb1x"] {
        let res = client
            .post(format!("{}/users", server.base_url))
            .json(&json!({ "email": unique_email("pwclass"), "password": password }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "password {:?}", password);
    }
    Ok(())
}

#[tokio::test]
async fn register_rejects_malformed_email() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();

    for email in ["", "plain", "a@b", "a b@c.com"] {
        let res = client
            .post(format!("{}/users", server.base_url))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "email {:?}", email);
    }
    Ok(())
}

#[tokio::test]
async fn register_rejects_missing_body_and_fields_with_400() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();

    // No body, no content type
    let res = client.post(format!("{}/users", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Empty object
    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Missing password
    let res = client
        .post(format!("{}/users", server.base_url))
        .json(&json!({ "email": unique_email("partial") }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_issues_a_second_session() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (email, register_token) = register_user(&server.base_url, "login").await?;

    let res = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    let login_token = body["token"].as_str().expect("token").to_string();
    assert_eq!(body["user"]["email"], json!(email));
    assert_ne!(login_token, register_token);
    Ok(())
}

#[tokio::test]
async fn login_failures_share_one_error() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (email, _token) = register_user(&server.base_url, "badlogin").await?;

    let wrong_password = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "email": email, "password": "Ab1!wrong" }))
        .send()
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    let wrong_password = wrong_password.json::<Value>().await?;

    let unknown_email = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "email": unique_email("ghost"), "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
    let unknown_email = unknown_email.json::<Value>().await?;

    // Neither response reveals whether the address exists
    assert_eq!(wrong_password, unknown_email);
    Ok(())
}

#[tokio::test]
async fn me_returns_the_authenticated_user() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (email, token) = register_user(&server.base_url, "me").await?;

    let res = client
        .get(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    assert_eq!(body["email"], json!(email));
    assert_eq!(body.as_object().map(|o| o.len()), Some(2));
    Ok(())
}

#[tokio::test]
async fn me_requires_authentication() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/users/me", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "authentication required" }));
    Ok(())
}

#[tokio::test]
async fn me_patch_updates_email() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (_email, token) = register_user(&server.base_url, "patchmail").await?;
    let new_email = unique_email("patched");

    let res = client
        .patch(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "email": new_email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["email"], json!(new_email));

    // The change is visible on the next read
    let res = client
        .get(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["email"], json!(new_email));
    Ok(())
}

#[tokio::test]
async fn me_patch_rejects_unknown_fields() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (_email, token) = register_user(&server.base_url, "patchbad").await?;

    let res = client
        .patch(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "nickname": "felix" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = res.json::<Value>().await?;
    assert!(body["error"].as_str().is_some_and(|m| m.contains("nickname")));
    Ok(())
}

#[tokio::test]
async fn me_patch_rejects_taken_email() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (taken, _token) = register_user(&server.base_url, "taken").await?;
    let (_email, token) = register_user(&server.base_url, "claimer").await?;

    let res = client
        .patch(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "email": taken }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn me_patch_password_change_keeps_sessions_alive() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (email, token) = register_user(&server.base_url, "passwd").await?;
    let new_password = "Cd2@wxyz";

    let res = client
        .patch(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "password": new_password }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The session that made the change is still valid
    let res = client
        .get(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The old password no longer logs in; the new one does
    let res = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "email": email, "password": new_password }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn me_patch_enforces_password_policy() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (_email, token) = register_user(&server.base_url, "patchweak").await?;

    let res = client
        .patch(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .json(&json!({ "password": "weak" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn me_delete_removes_the_account() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();
    let (email, token) = register_user(&server.base_url, "delete").await?;

    let res = client
        .delete(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?["email"], json!(email));

    // The session died with the account
    let res = client
        .get(format!("{}/users/me", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // And the credentials no longer log in
    let res = client
        .post(format!("{}/users/login", server.base_url))
        .json(&json!({ "email": email, "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
