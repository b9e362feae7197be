use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use shopventure::domain::model::SignUpOutcome;
use shopventure::domain::ports::{
    AuthProvider, ObjectStorage, RequestContext, TableStore, UploadOptions,
};
use shopventure::domain::query::Query;
use shopventure::{SiteError, SupabaseClient};
use tokio_test::{assert_err, assert_ok};

const ANON_KEY: &str = "anon-key";

fn client_for(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(server.base_url(), ANON_KEY)
}

fn user_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "email": "bela@example.com",
        "user_metadata": { "username": "bela" }
    })
}

#[tokio::test]
async fn test_sign_in_posts_password_grant() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/v1/token")
                .query_param("grant_type", "password")
                .header("apikey", ANON_KEY)
                .json_body(json!({ "email": "bela@example.com", "password": "titok" }));
            then.status(200).json_body(json!({
                "access_token": "jwt-1",
                "refresh_token": "refresh-1",
                "expires_in": 3600,
                "token_type": "bearer",
                "user": user_json("u1")
            }));
        })
        .await;

    let session = client_for(&server)
        .sign_in_with_password("bela@example.com", "titok")
        .await?;

    mock.assert_async().await;
    assert_eq!(session.access_token, "jwt-1");
    assert_eq!(session.expires_in, Some(3600));
    assert_eq!(session.user.id, "u1");
    Ok(())
}

#[tokio::test]
async fn test_sign_in_failure_carries_backend_message() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/token");
            then.status(400).json_body(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            }));
        })
        .await;

    let err = assert_err!(
        client_for(&server)
            .sign_in_with_password("bela@example.com", "rossz")
            .await
    );

    match err {
        SiteError::BackendError { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid login credentials");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_sign_up_without_session_awaits_confirmation() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/v1/signup")
                .json_body(json!({
                    "email": "anna@example.com",
                    "password": "titok",
                    "data": { "username": "anna" }
                }));
            then.status(200).json_body(user_json("u2"));
        })
        .await;

    let outcome = client_for(&server)
        .sign_up("anna@example.com", "titok", json!({ "username": "anna" }))
        .await?;

    mock.assert_async().await;
    match outcome {
        SignUpOutcome::ConfirmationPending { user } => assert_eq!(user.id, "u2"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_sign_up_with_session_signs_in() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/signup");
            then.status(200).json_body(json!({
                "access_token": "jwt-2",
                "user": user_json("u2")
            }));
        })
        .await;

    let outcome = client_for(&server)
        .sign_up("anna@example.com", "titok", json!({ "username": "anna" }))
        .await?;

    assert!(matches!(
        outcome,
        SignUpOutcome::SignedIn { ref session } if session.access_token == "jwt-2"
    ));
    Ok(())
}

#[tokio::test]
async fn test_get_user_uses_caller_token() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/v1/user")
                .header("apikey", ANON_KEY)
                .header("authorization", "Bearer jwt-1");
            then.status(200).json_body(user_json("u1"));
        })
        .await;

    let client = client_for(&server);
    let user = client
        .get_user(&RequestContext::with_token("jwt-1"))
        .await?;

    mock.assert_async().await;
    assert_eq!(user.map(|u| u.id).as_deref(), Some("u1"));
    Ok(())
}

#[tokio::test]
async fn test_get_user_with_rejected_token_is_none() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/auth/v1/user");
            then.status(401).json_body(json!({ "msg": "invalid JWT" }));
        })
        .await;

    let client = client_for(&server);
    assert!(client
        .get_user(&RequestContext::with_token("expired"))
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_anonymous_calls_skip_auth_service() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.path_contains("/auth/v1/");
            then.status(500);
        })
        .await;

    let client = client_for(&server);
    let anonymous = RequestContext::anonymous();

    assert!(client.get_user(&anonymous).await?.is_none());
    assert_ok!(client.sign_out(&anonymous).await);
    assert!(matches!(
        client.update_password(&anonymous, "uj-jelszo").await,
        Err(SiteError::Unauthorized)
    ));

    mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_sign_out_with_stale_token_succeeds() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/v1/logout")
                .header("authorization", "Bearer stale");
            then.status(401);
        })
        .await;

    assert_ok!(
        client_for(&server)
            .sign_out(&RequestContext::with_token("stale"))
            .await
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_update_password_puts_new_password() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/auth/v1/user")
                .header("authorization", "Bearer jwt-1")
                .json_body(json!({ "password": "uj-jelszo" }));
            then.status(200).json_body(user_json("u1"));
        })
        .await;

    let user = client_for(&server)
        .update_password(&RequestContext::with_token("jwt-1"), "uj-jelszo")
        .await?;

    mock.assert_async().await;
    assert_eq!(user.id, "u1");
    Ok(())
}

#[tokio::test]
async fn test_select_sends_postgrest_params_with_anon_key() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/profiles")
                .query_param("select", "username")
                .query_param("id", "eq.u1")
                .query_param("order", "username.desc")
                .query_param("limit", "2")
                .header("apikey", ANON_KEY)
                .header("authorization", format!("Bearer {}", ANON_KEY));
            then.status(200).json_body(json!([{ "username": "bela" }]));
        })
        .await;

    let query = Query::table("profiles")
        .select("username")
        .eq("id", "u1")
        .order("username", false)
        .limit(2);
    let rows = client_for(&server)
        .select(&RequestContext::anonymous(), &query)
        .await?;

    mock.assert_async().await;
    assert_eq!(rows, vec![json!({ "username": "bela" })]);
    Ok(())
}

#[tokio::test]
async fn test_insert_asks_for_representation() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/reviews")
                .query_param("select", "*")
                .header("Prefer", "return=representation")
                .json_body(json!([{ "title": "Jó játék" }]));
            then.status(201)
                .json_body(json!([{ "id": 7, "title": "Jó játék" }]));
        })
        .await;

    let rows = client_for(&server)
        .insert(
            &RequestContext::with_token("jwt-1"),
            "reviews",
            json!([{ "title": "Jó játék" }]),
        )
        .await?;

    mock.assert_async().await;
    assert_eq!(rows[0]["id"], 7);
    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_filter_by_eq() -> Result<()> {
    let server = MockServer::start_async().await;

    let update = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/rest/v1/reviews")
                .query_param("id", "eq.7")
                .json_body(json!({ "rating": 9 }));
            then.status(200).json_body(json!([{ "id": 7, "rating": 9 }]));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/rest/v1/reviews")
                .query_param("id", "eq.7");
            then.status(200).json_body(json!([{ "id": 7 }]));
        })
        .await;

    let client = client_for(&server);
    let ctx = RequestContext::with_token("jwt-1");
    let query = Query::table("reviews").eq("id", 7);

    let updated = client.update(&ctx, &query, json!({ "rating": 9 })).await?;
    let deleted = client.delete(&ctx, &query).await?;

    update.assert_async().await;
    delete.assert_async().await;
    assert_eq!(updated[0]["rating"], 9);
    assert_eq!(deleted.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_row_level_security_rejection_is_backend_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/blog");
            then.status(403).json_body(json!({
                "code": "42501",
                "message": "new row violates row-level security policy"
            }));
        })
        .await;

    let err = assert_err!(
        client_for(&server)
            .insert(&RequestContext::anonymous(), "blog", json!([{}]))
            .await
    );
    assert!(err.is_client_error());
    assert_eq!(
        err.user_friendly_message(),
        "new row violates row-level security policy"
    );
}

#[tokio::test]
async fn test_upload_sets_cache_control_and_upsert() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/storage/v1/object/profile_pic/1700000000000-avatar.png")
                .header("Content-Type", "image/png")
                .header("Cache-Control", "max-age=3600")
                .header("x-upsert", "false")
                .header("authorization", "Bearer jwt-1")
                .body("png-bytes");
            then.status(200)
                .json_body(json!({ "Key": "profile_pic/1700000000000-avatar.png" }));
        })
        .await;

    let client = client_for(&server);
    let path = client
        .upload(
            &RequestContext::with_token("jwt-1"),
            "profile_pic",
            "1700000000000-avatar.png",
            bytes::Bytes::from_static(b"png-bytes"),
            &UploadOptions {
                content_type: "image/png".to_string(),
                cache_control_seconds: 3600,
                upsert: false,
            },
        )
        .await?;

    mock.assert_async().await;
    assert_eq!(path, "profile_pic/1700000000000-avatar.png");
    assert_eq!(
        client.public_url("profile_pic", "1700000000000-avatar.png"),
        format!(
            "{}/storage/v1/object/public/profile_pic/1700000000000-avatar.png",
            server.base_url()
        )
    );
    Ok(())
}
