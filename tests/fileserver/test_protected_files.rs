//! Permission-gated delivery of record file fields.

use actix_web::http::StatusCode;
use actix_web::test;
use media_fileserver_lib::config::BackendKind;
use media_fileserver_lib::error::PERMISSION_DENIED_MESSAGE;
use serde_json::{Value, json};

use super::test_helpers::*;

fn seed_protected(dirs: &MediaDirs) {
    write_file(dirs.protected.path(), "account/1/me.png", b"\x89PNG me");
    write_file(dirs.protected.path(), "account/1/badge.txt", b"badge");
    write_file(dirs.protected.path(), "account/1/contract.pdf", b"%PDF contract");
    write_file(dirs.protected.path(), "account/1/intro.mp4", &patterned(2048));
}

async fn get_protected<S>(app: &S, uri: &str, key: Option<&str>) -> (StatusCode, Vec<u8>)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(key) = key {
        req = req.insert_header(("X-API-Key", key));
    }
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    (status, body.to_vec())
}

#[actix_rt::test]
async fn test_owner_can_download() {
    let dirs = MediaDirs::new();
    seed_protected(&dirs);
    let app = create_test_app(&dirs, BackendKind::Local, Some(sample_records())).await;

    let (status, body) = get_protected(
        &app,
        "/api/fileserver/protected/account/profile_image/1",
        Some(ALICE_KEY),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"\x89PNG me");
}

#[actix_rt::test]
async fn test_staff_can_download_any_owner_field() {
    let dirs = MediaDirs::new();
    seed_protected(&dirs);
    let app = create_test_app(&dirs, BackendKind::Local, Some(sample_records())).await;

    let (status, _) = get_protected(
        &app,
        "/api/fileserver/protected/account/profile_image/1",
        Some(STAFF_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get_protected(
        &app,
        "/api/fileserver/protected/account/contract/1",
        Some(STAFF_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"%PDF contract");
}

#[actix_rt::test]
async fn test_denials_share_one_body() {
    let dirs = MediaDirs::new();
    seed_protected(&dirs);
    let app = create_test_app(&dirs, BackendKind::Local, Some(sample_records())).await;

    let expected = json!({ "error": PERMISSION_DENIED_MESSAGE });

    let cases = [
        // Someone else's owner-only field
        ("/api/fileserver/protected/account/profile_image/1", Some(BOB_KEY)),
        // Anonymous caller
        ("/api/fileserver/protected/account/profile_image/1", None),
        // Staff-only field for a member
        ("/api/fileserver/protected/account/contract/1", Some(ALICE_KEY)),
        // Record that does not exist
        ("/api/fileserver/protected/account/profile_image/999", Some(ALICE_KEY)),
        // Unknown model
        ("/api/fileserver/protected/invoice/pdf/1", Some(STAFF_KEY)),
        // Field not registered for the model
        ("/api/fileserver/protected/account/password/1", Some(STAFF_KEY)),
        // Registered field holding no file
        ("/api/fileserver/protected/account/avatar/1", Some(ALICE_KEY)),
    ];

    for (uri, key) in cases {
        let (status, body) = get_protected(&app, uri, key).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {:?}", uri, key);

        let body: Value = serde_json::from_slice(&body).expect("JSON body");
        assert_eq!(body, expected, "{} {:?}", uri, key);
    }
}

#[actix_rt::test]
async fn test_public_field_allows_anonymous() {
    let dirs = MediaDirs::new();
    seed_protected(&dirs);
    let app = create_test_app(&dirs, BackendKind::Local, Some(sample_records())).await;

    let (status, body) =
        get_protected(&app, "/api/fileserver/protected/account/badge/1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"badge");
}

#[actix_rt::test]
async fn test_invalid_key_is_unauthorized() {
    let dirs = MediaDirs::new();
    seed_protected(&dirs);
    let app = create_test_app(&dirs, BackendKind::Local, Some(sample_records())).await;

    let (status, _) = get_protected(
        &app,
        "/api/fileserver/protected/account/badge/1",
        Some("mfs_not_a_real_key"),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_granted_file_missing_on_disk_is_not_found() {
    let dirs = MediaDirs::new();
    // No files written
    let app = create_test_app(&dirs, BackendKind::Local, Some(sample_records())).await;

    let (status, _) = get_protected(
        &app,
        "/api/fileserver/protected/account/profile_image/1",
        Some(ALICE_KEY),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_protected_video_streams_range() {
    let dirs = MediaDirs::new();
    seed_protected(&dirs);
    let app = create_test_app(&dirs, BackendKind::Local, Some(sample_records())).await;

    let req = test::TestRequest::get()
        .uri("/api/fileserver/protected/account/intro/1")
        .insert_header(("X-API-Key", BOB_KEY))
        .insert_header(("Range", "bytes=2000-"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        header_str(&resp, "content-range"),
        Some("bytes 2000-2047/2048")
    );
}

#[actix_rt::test]
async fn test_without_records_everything_is_denied() {
    let dirs = MediaDirs::new();
    seed_protected(&dirs);
    let app = create_test_app(&dirs, BackendKind::Local, None).await;

    let (status, _) =
        get_protected(&app, "/api/fileserver/protected/account/badge/1", None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_public_route_cannot_reach_nested_protected_root() {
    let dirs = MediaDirs::new();
    let mut settings = dirs.settings(BackendKind::Local);
    // Layout that configuration rejects; the responder must still refuse it
    let nested = dirs.public.path().join("protected");
    settings.protected_root = Some(nested.clone());
    write_file(&nested, "account/1/me.png", b"SECRET");
    let app = create_test_app_with(&settings, Some(sample_records())).await;

    for uri in [
        "/api/fileserver/protected/./account/1/me.png",
        "/api/fileserver/x/../protected/account/1/me.png",
        "/api/fileserver/protected/account//1/me.png",
    ] {
        let (status, body) = get_protected(&app, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
        assert_ne!(body, b"SECRET", "{}", uri);
    }

    // The gated route keeps working for the owner
    let (status, body) = get_protected(
        &app,
        "/api/fileserver/protected/account/profile_image/1",
        Some(ALICE_KEY),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"SECRET");
}

#[actix_rt::test]
async fn test_public_protected_directory_shadowing() {
    let dirs = MediaDirs::new();
    write_file(dirs.public.path(), "protected/readme.txt", b"public readme");
    write_file(dirs.public.path(), "protected/a/b/c", b"shadowed");
    let app = create_test_app(&dirs, BackendKind::Local, Some(sample_records())).await;

    // Fewer than three segments after `protected/` stays on the public route
    let (status, body) =
        get_protected(&app, "/api/fileserver/protected/readme.txt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"public readme");

    // Exactly three segments always go through the gate
    let (status, _) = get_protected(&app, "/api/fileserver/protected/a/b/c", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
