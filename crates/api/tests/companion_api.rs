//! Profile listing and admin profile management over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, put_json_auth};
use companion_core::profile::default_profiles;
use companion_db::repositories::CompanionRepo;
use sqlx::PgPool;

fn profile_body(slug: &str, published: bool) -> serde_json::Value {
    serde_json::json!({
        "slug": slug,
        "name": "Tania",
        "age": 25,
        "tagline": "Coffee first",
        "persona_prompt": "You are cheerful and chatty.",
        "gallery": [
            { "id": "cafe", "kind": "image", "url": "https://cdn.example.com/cafe.jpg" },
            {
                "id": "beach",
                "kind": "image",
                "url": "https://cdn.example.com/beach.jpg",
                "exclusive": true,
                "credit_cost": 30,
                "keywords": ["beach"]
            }
        ],
        "is_published": published,
    })
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_shows_only_published_profiles(pool: PgPool) {
    let defaults = default_profiles().unwrap();
    CompanionRepo::seed_if_empty(&pool, &defaults).await.unwrap();
    let app = common::build_test_app(pool);
    let admin = common::register_admin(app.clone()).await;
    let user = common::register(app.clone(), "viewer@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/companions",
        profile_body("draft-profile", false),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let draft_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let json = body_json(get_auth(app.clone(), "/api/v1/companions", &user.token).await).await;
    let listed = json["data"].as_array().unwrap();
    assert_eq!(listed.len(), defaults.len());
    assert!(listed.iter().all(|c| c["slug"] != "draft-profile"));

    let response = get_auth(app.clone(), &format!("/api/v1/companions/{draft_id}"), &user.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(get_auth(app, "/api/v1/admin/companions", &admin.token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), defaults.len() + 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_can_update_and_delete_profiles(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::register_admin(app.clone()).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/companions",
        profile_body("tania", true),
        &admin.token,
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let mut updated = profile_body("tania", true);
    updated["name"] = "Tania R.".into();
    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/companions/{id}"),
        updated,
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Tania R.");

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/admin/companions/{id}/gallery/beach"),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let gallery = body_json(response).await["data"]["gallery"].clone();
    assert_eq!(gallery.as_array().unwrap().len(), 1);

    let response = delete_auth(app.clone(), &format!("/api/v1/admin/companions/{id}"), &admin.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, &format!("/api/v1/admin/companions/{id}"), &admin.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_profiles_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::register_admin(app.clone()).await;

    let mut minor = profile_body("young", true);
    minor["age"] = 17.into();
    let response = post_json_auth(app.clone(), "/api/v1/admin/companions", minor, &admin.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    post_json_auth(app.clone(), "/api/v1/admin/companions", profile_body("same", true), &admin.token).await;
    let response =
        post_json_auth(app, "/api/v1/admin/companions", profile_body("same", true), &admin.token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn profile_drafts_need_a_configured_model(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = common::register_admin(app.clone()).await;

    let response = post_json_auth(
        app,
        "/api/v1/admin/companions/generate",
        serde_json::json!({ "brief": "a shy librarian from Sylhet" }),
        &admin.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "GENAI_UNAVAILABLE");
}
