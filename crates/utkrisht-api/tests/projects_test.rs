//! Project administration and cascade deletion tests.
//!
//! Run with: `cargo test -p utkrisht-api --test projects_test`

mod helpers;

use axum::http::StatusCode;
use serde_json::{json, Value};
use utkrisht_core::models::{DRAFT_STATUS, PUBLISHED_STATUS};
use uuid::Uuid;

use helpers::auth::seed_admin;
use helpers::fixtures::upload_form;
use helpers::{admin_path, setup_test_app};

#[tokio::test]
async fn test_create_update_and_list_projects() {
    let app = setup_test_app();
    let admin = seed_admin(&app);

    let response = app
        .client()
        .post(&admin_path("/projects"))
        .authorization_bearer(&admin.token)
        .json(&json!({ "title": "Courtyard House", "category": "Residential" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["status"], DRAFT_STATUS);
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .client()
        .patch(&admin_path("/projects"))
        .authorization_bearer(&admin.token)
        .json(&json!({ "id": id, "status": PUBLISHED_STATUS }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["status"], PUBLISHED_STATUS);
    assert_eq!(updated["title"], "Courtyard House");

    let project_id: Uuid = id.parse().unwrap();
    app.db.seed_project_image(project_id, "https://res.mock.test/b.png", 1);
    app.db.seed_project_image(project_id, "https://res.mock.test/a.png", 0);

    let response = app
        .client()
        .get(&admin_path("/projects"))
        .authorization_bearer(&admin.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let listing: Value = response.json();
    let images = listing[0]["images"].as_array().unwrap();
    assert_eq!(listing[0]["id"], id.as_str());
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["order"], 0);
    assert_eq!(images[1]["order"], 1);
}

#[tokio::test]
async fn test_update_unknown_project_is_not_found() {
    let app = setup_test_app();
    let admin = seed_admin(&app);

    let response = app
        .client()
        .patch(&admin_path("/projects"))
        .authorization_bearer(&admin.token)
        .json(&json!({ "id": Uuid::new_v4(), "title": "Renamed" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_project_rejects_blank_title() {
    let app = setup_test_app();
    let admin = seed_admin(&app);

    let response = app
        .client()
        .post(&admin_path("/projects"))
        .authorization_bearer(&admin.token)
        .json(&json!({ "title": "", "category": "Residential" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.db.project_rows().is_empty());
}

#[tokio::test]
async fn test_delete_project_cascades_to_store_and_rows() {
    let app = setup_test_app();
    let admin = seed_admin(&app);
    let project = app.db.seed_project("Penthouse", PUBLISHED_STATUS);
    let project_id = project.id.to_string();

    for _ in 0..2 {
        let response = app
            .client()
            .post(&admin_path("/upload"))
            .authorization_bearer(&admin.token)
            .multipart(upload_form(&[("projectId", project_id.as_str())]))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }
    let unrelated = app.db.seed_media("utkrisht/hero", Some("Hero"));
    assert_eq!(app.store.objects().len(), 2);

    let response = app
        .client()
        .delete(&admin_path(&format!("/projects/{}", project.id)))
        .authorization_bearer(&admin.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!({ "success": true }));
    assert!(app.store.objects().is_empty());
    assert_eq!(
        app.store.deleted_folders(),
        vec![format!("utkrisht/projects/{}", project.id)]
    );
    assert!(app.db.project_rows().is_empty());
    assert!(app.db.project_image_rows().is_empty());

    let remaining = app.db.media_rows();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, unrelated.id);
}

#[tokio::test]
async fn test_delete_project_survives_listing_outage() {
    let app = setup_test_app();
    let admin = seed_admin(&app);
    let project = app.db.seed_project("Studio", DRAFT_STATUS);
    app.db
        .seed_media(&format!("utkrisht/projects/{}", project.id), None);
    app.store.fail_listing("connection refused");

    let response = app
        .client()
        .delete(&admin_path(&format!("/projects/{}", project.id)))
        .authorization_bearer(&admin.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.db.project_rows().is_empty());
    assert!(app.db.media_rows().is_empty());
}

#[tokio::test]
async fn test_delete_unknown_project_touches_nothing() {
    let app = setup_test_app();
    let admin = seed_admin(&app);

    let response = app
        .client()
        .delete(&admin_path(&format!("/projects/{}", Uuid::new_v4())))
        .authorization_bearer(&admin.token)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.store.total_calls(), 0);
}

#[tokio::test]
async fn test_project_images_require_project_id() {
    let app = setup_test_app();
    let admin = seed_admin(&app);

    let response = app
        .client()
        .get(&admin_path("/project-images"))
        .authorization_bearer(&admin.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let project = app.db.seed_project("Loft", DRAFT_STATUS);
    let response = app
        .client()
        .post(&admin_path("/project-images"))
        .authorization_bearer(&admin.token)
        .json(&json!({
            "projectId": project.id,
            "url": "https://res.mock.test/loft.png",
            "order": 3
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let response = app
        .client()
        .get(&admin_path("/project-images"))
        .add_query_param("projectId", project.id)
        .authorization_bearer(&admin.token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let images: Value = response.json();
    assert_eq!(images.as_array().unwrap().len(), 1);
    assert_eq!(images[0]["order"], 3);
}
